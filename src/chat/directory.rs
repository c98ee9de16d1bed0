//! User directory lookups.
//!
//! The directory answers two pure queries: display name to stable id,
//! and stable id to display name. Every record carries the org/team it
//! belongs to; callers use that for tenant isolation. Lookup failures
//! are always `None`, never an error - handlers fall back to the
//! literal token.

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

/// One directory record.
#[derive(Debug, Clone, Deserialize)]
pub struct DirectoryEntry {
    /// Stable identity.
    pub id: String,
    /// Human-facing display name.
    #[serde(rename = "name")]
    pub display_name: String,
    /// Organization/team the identity belongs to.
    #[serde(rename = "team_id")]
    pub org_id: String,
}

/// Identity resolution against the chat backend.
#[async_trait]
pub trait Directory: Send + Sync {
    /// Look up an identity by display name.
    async fn resolve_id(&self, display_name: &str) -> Option<DirectoryEntry>;
    /// Look up an identity by stable id.
    async fn resolve_name(&self, id: &str) -> Option<DirectoryEntry>;
}

/// Directory backed by the chat backend's user API (vocal mode).
pub struct HttpDirectory {
    client: reqwest::Client,
    api_url: String,
    token: Option<String>,
}

impl HttpDirectory {
    /// Create a directory client for the given API base URL.
    pub fn new(api_url: String, token: Option<String>) -> Self {
        Self {
            client: reqwest::Client::new(),
            api_url,
            token,
        }
    }

    async fn lookup(&self, param: &str, value: &str) -> Option<DirectoryEntry> {
        let url = format!("{}/users.lookup", self.api_url.trim_end_matches('/'));
        let mut req = self.client.get(&url).query(&[(param, value)]);
        if let Some(token) = &self.token {
            req = req.bearer_auth(token);
        }

        match req.send().await {
            Ok(resp) if resp.status().is_success() => resp.json().await.ok(),
            Ok(resp) => {
                debug!(%param, %value, status = %resp.status(), "Directory lookup miss");
                None
            }
            Err(e) => {
                debug!(%param, %value, error = %e, "Directory lookup failed");
                None
            }
        }
    }
}

#[async_trait]
impl Directory for HttpDirectory {
    async fn resolve_id(&self, display_name: &str) -> Option<DirectoryEntry> {
        self.lookup("name", display_name).await
    }

    async fn resolve_name(&self, id: &str) -> Option<DirectoryEntry> {
        self.lookup("id", id).await
    }
}

/// Directory for silent mode: every lookup misses, so subjects are
/// always used literally.
pub struct OfflineDirectory;

#[async_trait]
impl Directory for OfflineDirectory {
    async fn resolve_id(&self, _display_name: &str) -> Option<DirectoryEntry> {
        None
    }

    async fn resolve_name(&self, _id: &str) -> Option<DirectoryEntry> {
        None
    }
}
