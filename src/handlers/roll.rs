//! The roll command: dice expressions and per-user saved rolls.

use super::{Context, Handler};
use crate::db::DbError;
use crate::error::{HandlerError, HandlerResult};
use async_trait::async_trait;
use tavern_grammar::dice::{split_flag, DiceExpression};

const HELP: &str = "```
command:
    !roll

description:
    Rolls dice for you.

    This command is whitespace-agnostic.
    (\"1d2+2\" will be processed exactly the same as \"1 d 2    +2\")

    You can specify multiple die rolls in the same command as long as they
    are separated by commas.

    You can specify a roll to be made with advantage by prepending the roll
    with the `-a` flag (or just `a`), or with disadvantage by prepending the
    roll with `-d` (or just `d`).

    You can also save a roll with a name, and then use that name later.

usage:
    !roll [ADVANTAGE/DISADVANTAGE] <HOW MANY> d <SIDES> [+/-MODIFIER] [, ... ]
    !roll [SAVE/LIST/DELETE] <NAMED ROLL>
    !roll [ADVANTAGE/DISADVANTAGE] <NAMED ROLL>

examples:
    !roll 2d6
    !roll -d 1d20-2
    !roll a 1d20+4, 4d6, -d 1d20+3
    !roll save fireballdmg 8d6
    !roll fireballdmg
    !roll list
    !roll delete fireballdmg
```";

/// Handler for the `!roll` command.
pub struct RollHandler;

#[async_trait]
impl Handler for RollHandler {
    async fn run(&self, ctx: &Context<'_>, args: &str) -> HandlerResult {
        let user = ctx.sender_name().await;
        let items: Vec<&str> = args.split(',').collect();

        let mut message = format!(
            "_*Roll result{} for {}:*_",
            if items.len() > 1 { "s" } else { "" },
            user,
        );

        for item in &items {
            message.push('\n');
            message.push_str(&self.process(ctx, item, &user).await?);
        }

        ctx.post(&message).await
    }

    fn help(&self) -> &'static str {
        HELP
    }
}

impl RollHandler {
    /// Handle one comma-separated item: either a subcommand or a roll.
    async fn process(&self, ctx: &Context<'_>, item: &str, user: &str) -> Result<String, HandlerError> {
        let tokens: Vec<&str> = item.split_whitespace().collect();

        match tokens.first() {
            None => Ok(not_a_roll(item)),
            Some(&"save") => self.save(ctx, &tokens[1..]).await,
            Some(&"list") => self.list(ctx, &tokens[1..], user).await,
            Some(&"delete") => self.delete(ctx, &tokens[1..]).await,
            Some(_) => self.make_roll(ctx, item, &tokens).await,
        }
    }

    /// Roll one expression, resolving saved-roll names first.
    ///
    /// A flag stored with the saved roll wins over a flag given at the
    /// call site.
    async fn make_roll(&self, ctx: &Context<'_>, item: &str, tokens: &[&str]) -> Result<String, HandlerError> {
        let (mut roll_str, mut flag) = split_flag(tokens);
        let mut label = None;

        if let Some(saved) = ctx.db.rolls().get(&ctx.msg.sender_id, &roll_str).await? {
            let stored_tokens: Vec<&str> = saved.expr.split_whitespace().collect();
            let (stored_str, stored_flag) = split_flag(&stored_tokens);
            roll_str = stored_str;
            flag = stored_flag.or(flag);
            label = Some(saved.name);
        }

        match DiceExpression::parse(&roll_str, flag) {
            Ok(expr) => {
                let rolled = expr.roll(&mut rand::thread_rng());
                Ok(expr.render(rolled, label.as_deref()))
            }
            Err(_) => Ok(not_a_roll(item)),
        }
    }

    /// `save NAME EXPR` - store a named roll for the requesting user.
    async fn save(&self, ctx: &Context<'_>, rest: &[&str]) -> Result<String, HandlerError> {
        let Some((name, expr_tokens)) = rest.split_first() else {
            return Ok("Not a valid Key/Pair.".to_string());
        };
        // Stored with single spaces so it re-tokenizes on use.
        let expr = expr_tokens.join(" ");
        if expr.is_empty() {
            return Ok("Not a valid Key/Pair.".to_string());
        }

        // The stored string may carry its own flag (`a 1d20`), so strip
        // one before validating the dice grammar.
        let (roll_str, flag) = split_flag(expr_tokens);
        if DiceExpression::parse(&roll_str, flag).is_err() {
            return Ok("Not a properly formatted roll string.".to_string());
        }

        match ctx.db.rolls().save(&ctx.msg.sender_id, name, &expr).await {
            Ok(saved) => Ok(format!("Successfully Saved {}: {}", saved.name, saved.expr)),
            Err(DbError::Duplicate(_)) => {
                Ok("You already have a saved roll with that name.".to_string())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// `list [N]` - the user's saved rolls, ten by default.
    async fn list(&self, ctx: &Context<'_>, rest: &[&str], user: &str) -> Result<String, HandlerError> {
        let how_many = if rest.is_empty() {
            10
        } else {
            let joined: String = rest.concat();
            match joined.parse::<i64>() {
                Ok(n) if n > 0 => n,
                _ => return Ok(format!("{} is not a valid number.", joined)),
            }
        };

        let mut message = format!("*Saved Rolls for {}:*", user);
        for roll in ctx.db.rolls().list(&ctx.msg.sender_id, how_many).await? {
            message.push_str(&format!("\n{}: {}", roll.name, roll.expr));
        }
        Ok(message)
    }

    /// `delete NAME` - remove one saved roll.
    async fn delete(&self, ctx: &Context<'_>, rest: &[&str]) -> Result<String, HandlerError> {
        let name: String = rest.concat();

        match ctx.db.rolls().delete(&ctx.msg.sender_id, &name).await {
            Ok(()) => Ok(format!("{} was successfully deleted.", name)),
            Err(DbError::NotFound(_)) => Ok(format!("Cannot find item {}", name)),
            Err(e) => Err(e.into()),
        }
    }
}

fn not_a_roll(item: &str) -> String {
    format!("'{}' is not a valid dice expression.", item.trim())
}
