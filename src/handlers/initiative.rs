//! The init command: a shared turn-order tracker.
//!
//! Batch adds commit clause by clause, left to right. A clause that
//! fails to parse or collides with an existing name is recorded and
//! skipped; the remaining clauses still run. The reply lists every
//! failure in clause order.

use super::{Context, Handler};
use crate::db::DbError;
use crate::error::{HandlerError, HandlerResult};
use async_trait::async_trait;
use rand::Rng;
use tavern_grammar::entity::{split_clauses, ClauseError, EntityMode, EntitySpec};

const HELP: &str = "```
Command:
    !init + SUBCOMMAND

Subcommands:
    get NAME (, NAME, ...)
    add NAME [ INITIATIVE | -r MODIFIER ] (, NAME [ INITIATIVE | -r MODIFIER], ...)
    remove NAME (, NAME, ...)
    list
    clear

Description:
    Manages entities in an initiative order.

    New entities can be added by either specifying an initiative value,
    or by passing the '-r' flag and a modifier to have the bot roll
    the initiative for you (if the '-r' flag is present but no modifier
    is supplied, the bot will roll a straight d20).

    The 'get', 'add', and 'remove' subcommands can all specify a single
    entity or a comma-separated list of entities.

Examples:
    !init add Beholder 16
    !init add Minsk -r +3, Boo -r +7
    !init get Boo
    !init remove Minsk
    !init remove Boo, Beholder
    !init list
    !init clear
```";

/// Handler for the `!init` command.
pub struct InitHandler;

#[async_trait]
impl Handler for InitHandler {
    async fn run(&self, ctx: &Context<'_>, args: &str) -> HandlerResult {
        let args = args.trim();
        if args.is_empty() {
            return ctx.post(HELP).await;
        }

        let (subcommand, rest) = match args.split_once(char::is_whitespace) {
            Some((sub, rest)) => (sub, rest.trim()),
            None => (args, ""),
        };

        let message = match subcommand {
            "get" if !rest.is_empty() => self.get(ctx, rest).await?,
            "add" if !rest.is_empty() => self.add(ctx, rest).await?,
            "remove" if !rest.is_empty() => self.remove(ctx, rest).await?,
            "get" | "add" | "remove" => {
                format!("'{}': this subcommand needs at least one entity.", subcommand)
            }
            "list" => self.list(ctx).await?,
            "clear" => self.clear(ctx).await?,
            other => format!("'{}': Not a valid !init subcommand.", other),
        };

        ctx.post(&message).await
    }

    fn help(&self) -> &'static str {
        HELP
    }
}

impl InitHandler {
    /// Query initiative for one or more comma-separated names.
    async fn get(&self, ctx: &Context<'_>, args: &str) -> Result<String, HandlerError> {
        let mut message = "*Initiative Query Results:*".to_string();
        for name in split_clauses(args) {
            match ctx.db.initiative().get(name).await? {
                Some(entry) => {
                    message.push_str(&format!("\n{}: {}", entry.name, entry.initiative));
                }
                None => message.push_str(&format!("\n{}: Not Found", name)),
            }
        }
        Ok(message)
    }

    /// Add one or more entities, committing each clause before moving on.
    async fn add(&self, ctx: &Context<'_>, args: &str) -> Result<String, HandlerError> {
        let mut errors = String::new();

        for clause in split_clauses(args) {
            let spec = match EntitySpec::parse(clause) {
                Ok(spec) => spec,
                Err(ClauseError::InvalidModifier) => {
                    errors.push_str(&format!(
                        "\n'{}': Modifier must be a positive or negative integer.",
                        clause
                    ));
                    continue;
                }
                Err(ClauseError::MissingOrInvalidValue) => {
                    errors.push_str(&format!("\n'{}': Value not given or not an integer.", clause));
                    continue;
                }
            };

            let initiative = match spec.mode {
                EntityMode::Fixed(value) => i64::from(value),
                // Fresh draw per entity, never shared across clauses.
                EntityMode::Roll(modifier) => {
                    i64::from(rand::thread_rng().gen_range(1..=20)) + i64::from(modifier)
                }
            };

            match ctx.db.initiative().add(&spec.name, initiative).await {
                Ok(()) => {}
                Err(DbError::Duplicate(_)) => {
                    errors.push_str(&format!("\n'{}': Duplicate entity name.", clause));
                }
                Err(e) => return Err(e.into()),
            }
        }

        if !errors.is_empty() {
            return Ok(format!(
                "Errors:{}\n\nOther entries not mentioned should have worked.",
                errors
            ));
        }
        Ok("Entity (or entities) added.".to_string())
    }

    /// Remove one or more comma-separated names.
    async fn remove(&self, ctx: &Context<'_>, args: &str) -> Result<String, HandlerError> {
        for name in split_clauses(args) {
            ctx.db.initiative().remove(name).await?;
        }
        Ok("Done.".to_string())
    }

    /// The current order, initiative descending.
    async fn list(&self, ctx: &Context<'_>) -> Result<String, HandlerError> {
        let mut message = "*Current Initiative:*".to_string();
        for entry in ctx.db.initiative().list().await? {
            message.push_str(&format!("\n> _*{}*_ -- {}", entry.initiative, entry.name));
        }
        Ok(message)
    }

    /// Drop every entity.
    async fn clear(&self, ctx: &Context<'_>) -> Result<String, HandlerError> {
        ctx.db.initiative().clear().await?;
        Ok("Initiative cleared.".to_string())
    }
}

#[cfg(test)]
mod tests {
    use crate::handlers::testing::{memory_db, message, RecordingNotifier, StaticDirectory};
    use crate::handlers::{Context, Registry};

    async fn run(db: &crate::db::Database, text: &str) -> Vec<String> {
        let notifier = RecordingNotifier::default();
        let directory = StaticDirectory::default();
        let msg = message(text);
        let ctx = Context { msg: &msg, db, notifier: &notifier, directory: &directory };
        Registry::new().dispatch(&ctx).await.unwrap();
        notifier.texts()
    }

    #[tokio::test]
    async fn batch_add_with_rolls_stays_in_range() {
        let db = memory_db().await;
        let posts = run(&db, "!init add Chuul 7, Dragon Turtle -r, Ghost -r +1, Mummy -r -1").await;
        assert_eq!(posts, ["Entity (or entities) added."]);

        let chuul = db.initiative().get("Chuul").await.unwrap().unwrap();
        assert_eq!(chuul.initiative, 7);

        let turtle = db.initiative().get("Dragon Turtle").await.unwrap().unwrap();
        assert!((1..=20).contains(&turtle.initiative));

        let ghost = db.initiative().get("Ghost").await.unwrap().unwrap();
        assert!((2..=21).contains(&ghost.initiative));

        let mummy = db.initiative().get("Mummy").await.unwrap().unwrap();
        assert!((0..=19).contains(&mummy.initiative));
    }

    #[tokio::test]
    async fn one_bad_clause_never_aborts_the_rest() {
        let db = memory_db().await;
        db.initiative().add("Flameskull", 11).await.unwrap();

        let posts =
            run(&db, "!init add Rakshasa -r +3, Flameskull -r, Quaggoth nine, Camel 18, Roc").await;

        // Successes committed despite the failures around them.
        assert!(db.initiative().get("Rakshasa").await.unwrap().is_some());
        let camel = db.initiative().get("Camel").await.unwrap().unwrap();
        assert_eq!(camel.initiative, 18);
        assert!(db.initiative().get("Quaggoth").await.unwrap().is_none());
        assert!(db.initiative().get("Roc").await.unwrap().is_none());

        // Failure report lists the three bad clauses in clause order.
        let reply = &posts[0];
        assert!(reply.starts_with("Errors:"));
        let expected = "Errors:\
            \n'Flameskull -r': Duplicate entity name.\
            \n'Quaggoth nine': Value not given or not an integer.\
            \n'Roc': Value not given or not an integer.\
            \n\nOther entries not mentioned should have worked.";
        assert_eq!(reply, expected);
    }

    #[tokio::test]
    async fn bad_modifier_is_reported_per_clause() {
        let db = memory_db().await;
        let posts = run(&db, "!init add Ghost -r lots, Boo 3").await;
        assert!(posts[0].contains("'Ghost -r lots': Modifier must be a positive or negative integer."));
        assert!(db.initiative().get("Boo").await.unwrap().is_some());
    }

    #[tokio::test]
    async fn get_reports_missing_names() {
        let db = memory_db().await;
        db.initiative().add("Boo", 7).await.unwrap();

        let posts = run(&db, "!init get Boo, Minsk").await;
        assert_eq!(posts[0], "*Initiative Query Results:*\nBoo: 7\nMinsk: Not Found");
    }

    #[tokio::test]
    async fn list_is_sorted_descending() {
        let db = memory_db().await;
        run(&db, "!init add Boo 3, Beholder 16, Minsk 9").await;

        let posts = run(&db, "!init list").await;
        assert_eq!(
            posts[0],
            "*Current Initiative:*\n> _*16*_ -- Beholder\n> _*9*_ -- Minsk\n> _*3*_ -- Boo"
        );
    }

    #[tokio::test]
    async fn remove_and_clear() {
        let db = memory_db().await;
        run(&db, "!init add Boo 3, Minsk 9").await;

        let posts = run(&db, "!init remove Boo, Nobody").await;
        assert_eq!(posts, ["Done."]);
        assert!(db.initiative().get("Boo").await.unwrap().is_none());

        let posts = run(&db, "!init clear").await;
        assert_eq!(posts, ["Initiative cleared."]);
        assert!(db.initiative().list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn unknown_subcommand_and_empty_args() {
        let db = memory_db().await;

        let posts = run(&db, "!init frobnicate now").await;
        assert_eq!(posts, ["'frobnicate': Not a valid !init subcommand."]);

        // Bare `!init` answers with the help text instead of erroring.
        let posts = run(&db, "!init").await;
        assert!(posts[0].contains("Subcommands:"));
    }
}
