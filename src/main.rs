//! tavernd - a chat-command bot for tabletop play.
//!
//! Dice rolls, a shared initiative order, karma, and per-user attribute
//! storage, driven by bang (`!roll 2d6`) and suffix (`coffee++`)
//! commands arriving over a chat backend's event webhook.

mod bot;
mod chat;
mod config;
mod db;
mod error;
mod event;
mod handlers;
mod http;

use crate::bot::Bot;
use crate::chat::{Directory, HttpDirectory, Notifier, OfflineDirectory, SilentNotifier, WebhookNotifier};
use crate::config::Config;
use crate::db::Database;
use std::sync::Arc;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_target(true)
        .init();

    // Load configuration
    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "config.toml".to_string());

    let config = Config::load(&config_path).map_err(|e| {
        error!(path = %config_path, error = %e, "Failed to load config");
        e
    })?;

    info!(
        name = %config.server.name,
        vocal = config.chat.vocal,
        "Starting tavernd"
    );

    // Initialize database
    let db_path = config
        .database
        .as_ref()
        .map(|d| d.path.as_str())
        .unwrap_or("tavernd.db");
    let db = Database::new(db_path).await?;

    // Chat collaborators: vocal mode talks to the backend, silent mode
    // logs replies and answers no directory lookups.
    let notifier: Box<dyn Notifier> = match (&config.chat.vocal, &config.chat.webhook_url) {
        (true, Some(url)) => Box::new(WebhookNotifier::new(url.clone(), config.chat.token.clone())),
        (true, None) => {
            warn!("chat.vocal is set but chat.webhook_url is missing; replies will only be logged");
            Box::new(SilentNotifier)
        }
        (false, _) => Box::new(SilentNotifier),
    };

    let directory: Box<dyn Directory> = match (&config.chat.vocal, &config.chat.api_url) {
        (true, Some(url)) => Box::new(HttpDirectory::new(url.clone(), config.chat.token.clone())),
        _ => Box::new(OfflineDirectory),
    };

    let bot = Arc::new(Bot::new(
        db,
        notifier,
        directory,
        config.chat.bot_user_id.clone(),
    ));

    http::run_http_server(bot, config.listen.address).await;

    Ok(())
}
