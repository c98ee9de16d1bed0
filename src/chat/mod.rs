//! Chat backend collaborators: the notifier and the user directory.
//!
//! Both are behind traits so handlers stay testable and so the bot can
//! run in a non-delivering mode. The vocal/silent switch is decided at
//! construction from config, never from ambient state.

mod directory;
mod notifier;

pub use directory::{Directory, DirectoryEntry, HttpDirectory, OfflineDirectory};
pub use notifier::{Notifier, NotifyError, SilentNotifier, WebhookNotifier};
