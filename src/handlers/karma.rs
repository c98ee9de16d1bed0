//! Karma: suffix-driven voting plus lookup and leaderboard commands.
//!
//! Subjects are arbitrary strings. When a subject happens to be the
//! display name of a known identity in the same org as the message, the
//! stable id is stored instead, and stored ids are mapped back to
//! display names when rendering. Directory misses always fall back to
//! the literal token.

use super::{Context, Handler, SuffixHandler};
use crate::db::{DbError, KarmaEntry};
use crate::error::{HandlerError, HandlerResult};
use async_trait::async_trait;

const KARMA_HELP: &str = "```
command:
    !karma

description:
    A system for tracking imaginary internet points.

    For any string (whitespace-inclusive), you can award positive or
    negative karma by appending '++' or '--' to the end.

    Calling the '!karma' command with a specific string as an
    argument will display the karma for the string, if it exists.

    The karma system also has the following additional features:

    karma_newest
    karma_top
    karma_bottom

usage:
    <STRING>++
    <STRING>--
    !karma <STRING>

examples:
    tavernd++
    chat rooms without tavernd--
    !karma tavernd
```";

const NEWEST_HELP: &str = "```
command:
    !karma_newest

description:
    Returns the n most recently-created karma subjects, where n=5 unless
    otherwise provided.

usage:
    !karma_newest [INT]
```";

const TOP_HELP: &str = "```
command:
    !karma_top

description:
    Returns the n highest-rated karma subjects, where n=5 unless
    otherwise provided.

usage:
    !karma_top [INT]
```";

const BOTTOM_HELP: &str = "```
command:
    !karma_bottom

description:
    Returns the n lowest-rated karma subjects, where n=5 unless
    otherwise provided.

usage:
    !karma_bottom [INT]
```";

/// Map a free-text subject to a stable id when it names a known
/// identity in the message's org; otherwise keep the literal token.
async fn correlate_subject(ctx: &Context<'_>, token: &str) -> String {
    match ctx.directory.resolve_id(token).await {
        Some(entry) if entry.org_id == ctx.msg.org_id => entry.id,
        _ => token.to_string(),
    }
}

/// Map a stored subject back to a display name when it is a known id in
/// the message's org; otherwise render it as stored.
async fn display_subject(ctx: &Context<'_>, stored: &str) -> String {
    match ctx.directory.resolve_name(stored).await {
        Some(entry) if entry.org_id == ctx.msg.org_id => entry.display_name,
        _ => stored.to_string(),
    }
}

fn entry_line(name: &str, entry: &KarmaEntry) -> String {
    format!(
        "*{}* has *{}* karma _({} ++, {} --)_",
        name, entry.karma, entry.upvotes, entry.downvotes
    )
}

/// Suffix handler for `<subject>++` and `<subject>--`.
///
/// Adjusts the tally and posts nothing back.
pub struct KarmaModifyHandler;

#[async_trait]
impl SuffixHandler for KarmaModifyHandler {
    async fn run(&self, ctx: &Context<'_>, subject: &str, suffix: &str) -> HandlerResult {
        let subject = correlate_subject(ctx, subject).await;

        let (upvotes, downvotes) = if suffix == "++" { (1, 0) } else { (0, 1) };

        match ctx.db.karma().adjust(&subject, upvotes, downvotes).await {
            Ok(_) => Ok(()),
            Err(DbError::NotFound(_)) => {
                match ctx.db.karma().create(&subject, upvotes, downvotes).await {
                    Ok(_) => Ok(()),
                    // Lost a create race; the other writer's row exists now.
                    Err(DbError::Duplicate(_)) => {
                        ctx.db.karma().adjust(&subject, upvotes, downvotes).await?;
                        Ok(())
                    }
                    Err(e) => Err(e.into()),
                }
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Handler for `!karma <subject>`.
pub struct KarmaHandler;

#[async_trait]
impl Handler for KarmaHandler {
    async fn run(&self, ctx: &Context<'_>, args: &str) -> HandlerResult {
        let subject = correlate_subject(ctx, args).await;

        match ctx.db.karma().get(&subject).await? {
            Some(entry) => {
                let name = display_subject(ctx, &entry.subject).await;
                ctx.post(&entry_line(&name, &entry)).await
            }
            None => ctx.post(&format!("No entry found for *{}*.", args)).await,
        }
    }

    fn help(&self) -> &'static str {
        KARMA_HELP
    }
}

/// Which slice of the karma table a leaderboard command shows.
#[derive(Debug, Clone, Copy)]
enum Ranking {
    Newest,
    Top,
    Bottom,
}

/// Handler for `!karma_newest`, `!karma_top`, and `!karma_bottom`.
pub struct KarmaLeaderboardHandler {
    ranking: Ranking,
}

impl KarmaLeaderboardHandler {
    /// The `!karma_newest` variant.
    pub fn newest() -> Self {
        Self { ranking: Ranking::Newest }
    }

    /// The `!karma_top` variant.
    pub fn top() -> Self {
        Self { ranking: Ranking::Top }
    }

    /// The `!karma_bottom` variant.
    pub fn bottom() -> Self {
        Self { ranking: Ranking::Bottom }
    }

    fn header(&self, how_many: i64) -> String {
        let what = match self.ranking {
            Ranking::Newest => "most-recently created",
            Ranking::Top => "highest-rated",
            Ranking::Bottom => "lowest-rated",
        };
        format!("*The {} {} karma subjects:*\n\n", how_many, what)
    }

    async fn fetch(&self, ctx: &Context<'_>, how_many: i64) -> Result<Vec<KarmaEntry>, HandlerError> {
        let repo = ctx.db.karma();
        let entries = match self.ranking {
            Ranking::Newest => repo.list_newest(how_many).await?,
            Ranking::Top => repo.list_highest(how_many).await?,
            Ranking::Bottom => repo.list_lowest(how_many).await?,
        };
        Ok(entries)
    }
}

#[async_trait]
impl Handler for KarmaLeaderboardHandler {
    async fn run(&self, ctx: &Context<'_>, args: &str) -> HandlerResult {
        let args = args.trim();
        let how_many = if args.is_empty() {
            5
        } else {
            match args.parse::<i64>() {
                Ok(n) if n > 0 => n,
                Ok(n) => return ctx.post(&format!("{} is not a valid number.", n)).await,
                Err(_) => return ctx.post(&format!("{} is not a valid number.", args)).await,
            }
        };

        let mut message = self.header(how_many);
        for entry in self.fetch(ctx, how_many).await? {
            let name = display_subject(ctx, &entry.subject).await;
            message.push_str(&entry_line(&name, &entry));
            message.push('\n');
        }

        ctx.post(&message).await
    }

    fn help(&self) -> &'static str {
        match self.ranking {
            Ranking::Newest => NEWEST_HELP,
            Ranking::Top => TOP_HELP,
            Ranking::Bottom => BOTTOM_HELP,
        }
    }
}
