//! The attr command: misc. key/value storage for player stats.

use super::{Context, Handler};
use crate::db::DbError;
use crate::error::{HandlerError, HandlerResult};
use async_trait::async_trait;

const HELP: &str = "```
Command:
    !attr + ADDITIONAL COMMAND

Additional Commands:
    set KEY VALUE
    get KEY
    list [N]
    delete KEY

Description:
    Stores miscellaneous key/value pairs, per user.
    Ideal for character statistics.

Examples:
    !attr set strength 14
    !attr get strength
    !attr list
    !attr delete strength
```";

/// Handler for the `!attr` command.
pub struct AttrHandler;

#[async_trait]
impl Handler for AttrHandler {
    async fn run(&self, ctx: &Context<'_>, args: &str) -> HandlerResult {
        let tokens: Vec<&str> = args.split_whitespace().collect();

        let message = match tokens.split_first() {
            Some((&"set", rest)) => self.set(ctx, rest).await?,
            Some((&"get", [key, ..])) => self.get(ctx, key).await?,
            Some((&"list", rest)) => self.list(ctx, rest).await?,
            Some((&"delete", [key, ..])) => self.delete(ctx, key).await?,
            _ => "Not a valid command.".to_string(),
        };

        ctx.post(&message).await
    }

    fn help(&self) -> &'static str {
        HELP
    }
}

impl AttrHandler {
    /// `set KEY VALUE...` - the value may contain spaces.
    async fn set(&self, ctx: &Context<'_>, rest: &[&str]) -> Result<String, HandlerError> {
        let Some((key, val_tokens)) = rest.split_first() else {
            return Ok("Could not save key.".to_string());
        };
        let val = val_tokens.join(" ");
        if val.is_empty() {
            return Ok("Could not save key.".to_string());
        }

        match ctx.db.attrs().set(&ctx.msg.sender_id, key, &val).await {
            Ok(attr) => Ok(format!("Saved:\n{}: {}", attr.key, attr.val)),
            Err(DbError::Duplicate(_)) => Ok("You already have a key with that name.".to_string()),
            Err(e) => Err(e.into()),
        }
    }

    async fn get(&self, ctx: &Context<'_>, key: &str) -> Result<String, HandlerError> {
        match ctx.db.attrs().get(&ctx.msg.sender_id, key).await? {
            Some(attr) => Ok(format!("{}: {}", attr.key, attr.val)),
            None => Ok(format!("Could not find {}", key)),
        }
    }

    /// `list [N]` - the user's attributes, ten by default.
    async fn list(&self, ctx: &Context<'_>, rest: &[&str]) -> Result<String, HandlerError> {
        let how_many = match rest.first() {
            Some(raw) => match raw.parse::<i64>() {
                Ok(n) if n > 0 => n,
                _ => return Ok(format!("{} is not a valid number.", raw)),
            },
            None => 10,
        };

        let mut message = format!("Listing attributes for {}", ctx.msg.sender_id);
        for attr in ctx.db.attrs().list(&ctx.msg.sender_id, how_many).await? {
            message.push_str(&format!("\n{}: {}", attr.key, attr.val));
        }
        Ok(message)
    }

    async fn delete(&self, ctx: &Context<'_>, key: &str) -> Result<String, HandlerError> {
        match ctx.db.attrs().delete(&ctx.msg.sender_id, key).await {
            Ok(()) => Ok(format!("Successfully deleted {}", key)),
            Err(DbError::NotFound(_)) => Ok("Could not delete key.".to_string()),
            Err(e) => Err(e.into()),
        }
    }
}
