//! Command handlers.
//!
//! This module contains the Handler traits and command registry for
//! dispatching classified chat messages to the appropriate handler.
//!
//! Bang commands (`!roll 2d6`) always answer with exactly one reply,
//! even when the keyword is unknown. Suffix commands (`coffee++`) are
//! silent on success; an empty subject is a documented no-op.

mod attrs;
mod help;
mod initiative;
mod karma;
mod roll;

pub use attrs::AttrHandler;
pub use help::HelpHandler;
pub use initiative::InitHandler;
pub use karma::{KarmaHandler, KarmaLeaderboardHandler, KarmaModifyHandler};
pub use roll::RollHandler;

use crate::chat::{Directory, Notifier};
use crate::db::Database;
use crate::error::{HandlerError, HandlerResult};
use crate::event::RawMessage;
use async_trait::async_trait;
use std::collections::HashMap;
use tavern_grammar::{classify, Classified};
use tracing::{debug, info_span, Instrument};

/// Handler context passed to each command handler.
pub struct Context<'a> {
    /// The message being dispatched.
    pub msg: &'a RawMessage,
    /// Record store.
    pub db: &'a Database,
    /// Reply delivery.
    pub notifier: &'a dyn Notifier,
    /// Identity resolution.
    pub directory: &'a dyn Directory,
}

impl Context<'_> {
    /// Post a reply to the channel the message came from.
    pub async fn post(&self, text: &str) -> HandlerResult {
        self.notifier.post(&self.msg.channel_id, text).await?;
        Ok(())
    }

    /// Resolve the sender's display name, falling back to the raw id.
    pub async fn sender_name(&self) -> String {
        match self.directory.resolve_name(&self.msg.sender_id).await {
            Some(entry) if entry.org_id == self.msg.org_id => entry.display_name,
            _ => self.msg.sender_id.clone(),
        }
    }
}

/// Trait implemented by all bang-command handlers.
///
/// `run` receives the argument text after the keyword and is expected to
/// post exactly one reply.
#[async_trait]
pub trait Handler: Send + Sync {
    /// Handle one invocation.
    async fn run(&self, ctx: &Context<'_>, args: &str) -> HandlerResult;

    /// Help text shown by the help command.
    fn help(&self) -> &'static str;
}

/// Trait implemented by suffix-command handlers.
///
/// Suffix handlers adjust stored state and post nothing on success.
#[async_trait]
pub trait SuffixHandler: Send + Sync {
    /// Handle one invocation. `subject` is the text before the suffix,
    /// whitespace preserved and known to be non-blank.
    async fn run(&self, ctx: &Context<'_>, subject: &str, suffix: &str) -> HandlerResult;
}

/// Registry of command handlers.
///
/// Built once at startup and never mutated; handlers are stateless, so
/// concurrent dispatch across messages shares them freely.
pub struct Registry {
    bang: HashMap<&'static str, Box<dyn Handler>>,
    suffix: HashMap<&'static str, Box<dyn SuffixHandler>>,
}

impl Registry {
    /// Create a new registry with all handlers registered.
    pub fn new() -> Self {
        let mut bang: HashMap<&'static str, Box<dyn Handler>> = HashMap::new();

        bang.insert("roll", Box::new(RollHandler));
        bang.insert("init", Box::new(InitHandler));
        bang.insert("attr", Box::new(AttrHandler));
        bang.insert("karma", Box::new(KarmaHandler));
        bang.insert("karma_newest", Box::new(KarmaLeaderboardHandler::newest()));
        bang.insert("karma_top", Box::new(KarmaLeaderboardHandler::top()));
        bang.insert("karma_bottom", Box::new(KarmaLeaderboardHandler::bottom()));

        // The help switchboard snapshots every registered handler's text.
        let topics: HashMap<&'static str, &'static str> = bang
            .iter()
            .map(|(keyword, handler)| (*keyword, handler.help()))
            .collect();
        bang.insert("help", Box::new(HelpHandler::new(topics)));

        let mut suffix: HashMap<&'static str, Box<dyn SuffixHandler>> = HashMap::new();
        suffix.insert("++", Box::new(KarmaModifyHandler));
        suffix.insert("--", Box::new(KarmaModifyHandler));

        Self { bang, suffix }
    }

    /// Dispatch one message.
    ///
    /// Classification misses are free (the message just wasn't a
    /// command); registry misses on a bang keyword produce the
    /// unknown-command reply.
    pub async fn dispatch(&self, ctx: &Context<'_>) -> HandlerResult {
        match classify(&ctx.msg.text) {
            Classified::Bang { keyword, args } => {
                if let Some(handler) = self.bang.get(keyword) {
                    let span =
                        info_span!("command", keyword = %keyword, channel = %ctx.msg.channel_id);
                    handler.run(ctx, args).instrument(span).await
                } else {
                    debug!(keyword = %keyword, "Unknown bang command");
                    ctx.post(&format!("Sorry, '!{}' is not a valid command.", keyword))
                        .await
                }
            }
            Classified::Suffix { suffix, subject } => {
                // An empty subject is a no-op, not an error.
                if subject.trim().is_empty() {
                    return Ok(());
                }
                match self.suffix.get(suffix) {
                    Some(handler) => handler.run(ctx, subject, suffix).await,
                    None => Ok(()),
                }
            }
            Classified::Ignore => Ok(()),
        }
    }
}

impl Default for Registry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
pub(crate) mod testing {
    //! Shared doubles for handler tests.

    use crate::chat::{Directory, DirectoryEntry, Notifier, NotifyError};
    use crate::db::Database;
    use crate::event::RawMessage;
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Notifier that records every post for assertions.
    #[derive(Default)]
    pub struct RecordingNotifier {
        pub posts: Mutex<Vec<(String, String)>>,
    }

    impl RecordingNotifier {
        pub fn texts(&self) -> Vec<String> {
            self.posts.lock().unwrap().iter().map(|(_, t)| t.clone()).collect()
        }
    }

    #[async_trait]
    impl Notifier for RecordingNotifier {
        async fn post(&self, channel_id: &str, text: &str) -> Result<(), NotifyError> {
            self.posts
                .lock()
                .unwrap()
                .push((channel_id.to_string(), text.to_string()));
            Ok(())
        }
    }

    /// Directory with a fixed set of records.
    #[derive(Default)]
    pub struct StaticDirectory {
        pub entries: Vec<DirectoryEntry>,
    }

    #[async_trait]
    impl Directory for StaticDirectory {
        async fn resolve_id(&self, display_name: &str) -> Option<DirectoryEntry> {
            self.entries.iter().find(|e| e.display_name == display_name).cloned()
        }

        async fn resolve_name(&self, id: &str) -> Option<DirectoryEntry> {
            self.entries.iter().find(|e| e.id == id).cloned()
        }
    }

    pub fn message(text: &str) -> RawMessage {
        RawMessage {
            text: text.to_string(),
            sender_id: "U123".to_string(),
            channel_id: "C1".to_string(),
            org_id: "T1".to_string(),
        }
    }

    pub async fn memory_db() -> Database {
        Database::new(":memory:").await.expect("in-memory database")
    }
}

#[cfg(test)]
mod tests {
    use super::testing::{memory_db, message, RecordingNotifier, StaticDirectory};
    use super::*;

    #[tokio::test]
    async fn unknown_bang_command_gets_apology() {
        let db = memory_db().await;
        let notifier = RecordingNotifier::default();
        let directory = StaticDirectory::default();
        let msg = message("!frobnicate now");
        let ctx = Context { msg: &msg, db: &db, notifier: &notifier, directory: &directory };

        Registry::new().dispatch(&ctx).await.unwrap();

        assert_eq!(notifier.texts(), ["Sorry, '!frobnicate' is not a valid command."]);
    }

    #[tokio::test]
    async fn bare_bang_falls_through_to_unknown() {
        let db = memory_db().await;
        let notifier = RecordingNotifier::default();
        let directory = StaticDirectory::default();
        let msg = message("!");
        let ctx = Context { msg: &msg, db: &db, notifier: &notifier, directory: &directory };

        Registry::new().dispatch(&ctx).await.unwrap();

        assert_eq!(notifier.texts(), ["Sorry, '!' is not a valid command."]);
    }

    #[tokio::test]
    async fn non_command_is_ignored() {
        let db = memory_db().await;
        let notifier = RecordingNotifier::default();
        let directory = StaticDirectory::default();
        let msg = message("no command here");
        let ctx = Context { msg: &msg, db: &db, notifier: &notifier, directory: &directory };

        Registry::new().dispatch(&ctx).await.unwrap();

        assert!(notifier.texts().is_empty());
    }

    #[tokio::test]
    async fn bare_suffix_is_a_silent_noop() {
        let db = memory_db().await;
        let notifier = RecordingNotifier::default();
        let directory = StaticDirectory::default();
        let msg = message("++");
        let ctx = Context { msg: &msg, db: &db, notifier: &notifier, directory: &directory };

        Registry::new().dispatch(&ctx).await.unwrap();

        assert!(notifier.texts().is_empty());
        assert!(db.karma().get("").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn suffix_command_is_silent_on_success() {
        let db = memory_db().await;
        let notifier = RecordingNotifier::default();
        let directory = StaticDirectory::default();
        let msg = message("coffee++");
        let ctx = Context { msg: &msg, db: &db, notifier: &notifier, directory: &directory };

        Registry::new().dispatch(&ctx).await.unwrap();

        assert!(notifier.texts().is_empty());
        let entry = db.karma().get("coffee").await.unwrap().unwrap();
        assert_eq!(entry.karma, 1);
    }
}
