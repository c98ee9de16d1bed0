//! Configuration loading and management.

use serde::Deserialize;
use std::net::SocketAddr;
use std::path::Path;
use thiserror::Error;

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Bot configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    /// Bot identity.
    pub server: ServerConfig,
    /// Inbound event listener configuration.
    pub listen: ListenConfig,
    /// Database configuration.
    pub database: Option<DatabaseConfig>,
    /// Chat backend configuration.
    #[serde(default)]
    pub chat: ChatConfig,
}

/// Bot identity configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// Bot name (used in logs).
    pub name: String,
}

/// Inbound listener configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct ListenConfig {
    /// Address to bind to (e.g., "0.0.0.0:8080").
    pub address: SocketAddr,
}

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// Path to SQLite database file.
    pub path: String,
}

/// Chat backend configuration.
///
/// With `vocal = false` the bot never talks to the chat backend:
/// replies are logged and directory lookups come up empty. This is the
/// mode used for local development and tests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ChatConfig {
    /// Whether replies are actually delivered to the chat backend.
    #[serde(default)]
    pub vocal: bool,
    /// Webhook URL replies are posted to (vocal mode).
    pub webhook_url: Option<String>,
    /// Base URL of the chat backend's user API (vocal mode).
    pub api_url: Option<String>,
    /// Bearer token for chat API calls.
    pub token: Option<String>,
    /// The bot's own user id; events it authored are dropped.
    pub bot_user_id: Option<String>,
}

impl Config {
    /// Load configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
