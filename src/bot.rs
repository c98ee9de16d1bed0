//! Bot wiring: owns the registry and the collaborators, dispatches one
//! message at a time.

use crate::chat::{Directory, Notifier};
use crate::db::Database;
use crate::error::HandlerResult;
use crate::event::RawMessage;
use crate::handlers::{Context, Registry};
use tracing::{debug, error};

/// The assembled bot.
///
/// Messages are dispatched independently; handlers are stateless and
/// every persisted record is keyed by a unique string, so concurrent
/// dispatch needs no locking here.
pub struct Bot {
    registry: Registry,
    db: Database,
    notifier: Box<dyn Notifier>,
    directory: Box<dyn Directory>,
    bot_user_id: Option<String>,
}

impl Bot {
    /// Assemble the bot from its collaborators.
    pub fn new(
        db: Database,
        notifier: Box<dyn Notifier>,
        directory: Box<dyn Directory>,
        bot_user_id: Option<String>,
    ) -> Self {
        Self {
            registry: Registry::new(),
            db,
            notifier,
            directory,
            bot_user_id,
        }
    }

    /// Whether an inbound event was authored by the bot itself.
    pub fn is_own_message(&self, msg: &RawMessage) -> bool {
        self.bot_user_id.as_deref() == Some(msg.sender_id.as_str())
    }

    /// Dispatch one message through the registry.
    pub async fn dispatch(&self, msg: &RawMessage) -> HandlerResult {
        let ctx = Context {
            msg,
            db: &self.db,
            notifier: self.notifier.as_ref(),
            directory: self.directory.as_ref(),
        };
        self.registry.dispatch(&ctx).await
    }

    /// Dispatch and log instead of propagating; used by the event route
    /// where nobody is left to handle the error.
    pub async fn dispatch_logged(&self, msg: RawMessage) {
        match self.dispatch(&msg).await {
            Ok(()) => debug!(sender = %msg.sender_id, channel = %msg.channel_id, "Event processed"),
            Err(e) => {
                error!(
                    sender = %msg.sender_id,
                    channel = %msg.channel_id,
                    code = e.error_code(),
                    error = %e,
                    "Command failed"
                );
            }
        }
    }
}
