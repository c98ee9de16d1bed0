//! HTTP server for the inbound event route.
//!
//! The chat backend POSTs every subscribed event to `/events`. Each
//! event is acknowledged immediately and dispatched on its own task.

use crate::bot::Bot;
use crate::event::RawMessage;
use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::post;
use axum::{Json, Router};
use serde::Deserialize;
use std::net::SocketAddr;
use std::sync::Arc;

/// Envelope the chat backend wraps around each event.
#[derive(Debug, Deserialize)]
struct EventEnvelope {
    event: EventPayload,
    team_id: String,
}

/// The event itself. Non-message events lack most fields; they default
/// to empty and get dropped below.
#[derive(Debug, Deserialize)]
struct EventPayload {
    #[serde(default)]
    text: String,
    #[serde(default)]
    user: String,
    #[serde(default)]
    channel: String,
}

/// Handler for POST /events.
async fn events_handler(
    State(bot): State<Arc<Bot>>,
    Json(envelope): Json<EventEnvelope>,
) -> StatusCode {
    let msg = RawMessage {
        text: envelope.event.text,
        sender_id: envelope.event.user,
        channel_id: envelope.event.channel,
        org_id: envelope.team_id,
    };

    if msg.text.is_empty() || bot.is_own_message(&msg) {
        return StatusCode::OK;
    }

    tokio::spawn(async move { bot.dispatch_logged(msg).await });
    StatusCode::OK
}

/// Run the HTTP server for inbound events.
///
/// This is a long-running task; it only returns on bind/serve failure.
pub async fn run_http_server(bot: Arc<Bot>, addr: SocketAddr) {
    let app = Router::new()
        .route("/events", post(events_handler))
        .with_state(bot);

    tracing::info!("Event HTTP server listening on {}", addr);

    let listener = match tokio::net::TcpListener::bind(&addr).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!("Failed to bind HTTP server on {}: {}", addr, e);
            return;
        }
    };

    if let Err(e) = axum::serve(listener, app).await {
        tracing::error!("HTTP server error: {}", e);
    }
}
