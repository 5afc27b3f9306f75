//! HTTP request handlers.

use super::AppState;
use crate::engine::FOLLOW_PROMPT;
use crate::error::GatewayError;
use crate::events::{self, InboundEvent};
use crate::signature;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;
use phone_registry::RegistryStore;
use serde::Serialize;
use tracing::{debug, error, info, warn};

/// Health check response.
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub registry_healthy: bool,
}

/// Health check endpoint.
pub async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok".to_string(),
        registry_healthy: state.registry.healthy().await,
    })
}

/// Endpoint-check ping from the platform console.
pub async fn webhook_ping() -> &'static str {
    "Webhook working."
}

/// Webhook entry point: one delivery, zero or more events.
///
/// Delivery-level failures (bad signature, malformed envelope) abort
/// before any event is processed. Per-event failures are isolated:
/// they degrade to a user-facing busy reply and never abort sibling
/// events, because the platform retries failed deliveries wholesale
/// and replaying already-processed events would duplicate sends.
pub async fn callback(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<&'static str, GatewayError> {
    let signature_header = headers
        .get("x-line-signature")
        .and_then(|v| v.to_str().ok());

    if !signature::verify(&state.channel_secret, signature_header, &body) {
        warn!("Rejected delivery with bad or missing signature");
        return Err(GatewayError::InvalidSignature);
    }

    let parsed = events::parse(&body).map_err(|e| {
        error!("Malformed webhook envelope: {}", e);
        GatewayError::EnvelopeParse(e.to_string())
    })?;

    // Events of one delivery run sequentially, in payload order
    for event in parsed {
        match event {
            InboundEvent::Followed {
                user_id,
                reply_token,
            } => {
                info!(user_id = %user_id, "Follow event");
                state
                    .notifier
                    .deliver(reply_token.as_deref(), &user_id, FOLLOW_PROMPT)
                    .await;
            }
            InboundEvent::TextReceived {
                user_id,
                text,
                reply_token,
            } => {
                let outcome = state.engine.verify_text(&text).await;
                debug!(user_id = %user_id, ?outcome, "Text event processed");

                if let Some(reply) = outcome.reply() {
                    state
                        .notifier
                        .deliver(reply_token.as_deref(), &user_id, reply)
                        .await;
                }
            }
            InboundEvent::Unrecognized => {
                debug!("Skipping unrecognized event");
            }
        }
    }

    // Acknowledge once events are consumed, even if some degraded
    Ok("OK")
}
