//! Request rejection type and response synthesis.
//!
//! # Purpose
//! Every pipeline stage fails by returning a `Reject`; only the top-level
//! handler turns one into an HTTP response, so deep layers never shape
//! bodies or leak store detail. Non-2xx bodies are always
//! `{"error": <message>, "code": <transaction_id>}`.
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;

/// Per-request correlation id, echoed in error bodies and logs.
#[derive(Debug, Clone)]
pub struct TransactionId(pub String);

impl TransactionId {
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().simple().to_string())
    }
}

impl std::fmt::Display for TransactionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// A short-circuited request: status, public message, and (for the
/// not-ready case) the activation id the caller can poll for.
#[derive(Debug)]
pub struct Reject {
    pub status: StatusCode,
    pub message: String,
    pub activation_id: Option<String>,
}

impl Reject {
    fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
            activation_id: None,
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, message)
    }

    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, message)
    }

    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, message)
    }

    pub fn throttled(message: impl Into<String>) -> Self {
        Self::new(StatusCode::TOO_MANY_REQUESTS, message)
    }

    pub fn entity_too_large(message: impl Into<String>) -> Self {
        Self::new(StatusCode::PAYLOAD_TOO_LARGE, message)
    }

    pub fn media_unsupported(message: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_ACCEPTABLE, message)
    }

    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(StatusCode::INTERNAL_SERVER_ERROR, message)
    }

    /// 202: the activation was accepted but its result is not available yet.
    pub fn not_ready(activation_id: impl Into<String>) -> Self {
        Self {
            status: StatusCode::ACCEPTED,
            message: "response not ready".to_string(),
            activation_id: Some(activation_id.into()),
        }
    }

    /// Render the rejection, stamping the transaction id into the body.
    pub fn into_response(self, transaction_id: &TransactionId) -> Response {
        let body = if self.status == StatusCode::ACCEPTED {
            serde_json::json!({
                "message": self.message,
                "activationId": self.activation_id,
                "code": transaction_id.0,
            })
        } else {
            serde_json::json!({
                "error": self.message,
                "code": transaction_id.0,
            })
        };
        (self.status, Json(body)).into_response()
    }
}
