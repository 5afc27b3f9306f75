//! Gateway error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;
use thiserror::Error;

/// Delivery-level errors. Each aborts the whole delivery before any
/// event is processed; per-event failures never surface here.
#[derive(Debug, Error)]
pub enum GatewayError {
    #[error("Invalid webhook signature")]
    InvalidSignature,

    #[error("Malformed webhook envelope: {0}")]
    EnvelopeParse(String),
}

/// Error response body.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub code: String,
}

impl IntoResponse for GatewayError {
    fn into_response(self) -> Response {
        let (status, code) = match &self {
            GatewayError::InvalidSignature => (StatusCode::UNAUTHORIZED, "INVALID_SIGNATURE"),
            GatewayError::EnvelopeParse(_) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "ENVELOPE_PARSE")
            }
        };

        let body = ErrorResponse {
            error: self.to_string(),
            code: code.to_string(),
        };

        (status, Json(body)).into_response()
    }
}
