//! Inbound chat events.

/// One chat message as delivered by the transport layer.
///
/// Immutable input to dispatch; built once per event and discarded
/// afterwards.
#[derive(Debug, Clone)]
pub struct RawMessage {
    /// The message text, verbatim.
    pub text: String,
    /// Stable id of the author.
    pub sender_id: String,
    /// Channel the message was posted in (replies go back here).
    pub channel_id: String,
    /// Organization/team the message originated from, for tenant
    /// isolation of directory lookups.
    pub org_id: String,
}
