//! System/health API handlers.
//!
//! # Purpose
//! Lightweight endpoints for service metadata and liveness, separate from
//! the web-action surface.
use crate::api::error::{Reject, TransactionId};
use crate::api::types::{HealthStatus, SystemInfo};
use crate::app::AppState;
use crate::media::MediaExtension;
use axum::extract::State;
use axum::response::{IntoResponse, Response};
use axum::Json;

pub(crate) async fn system_info(State(state): State<AppState>) -> Json<SystemInfo> {
    Json(SystemInfo {
        service: "nimbus-gateway".to_string(),
        api_version: "v1".to_string(),
        extensions: MediaExtension::ALL
            .iter()
            .map(|extension| extension.suffix().to_string())
            .collect(),
        enforce_extension: state.config.enforce_extension,
    })
}

pub(crate) async fn system_health(State(state): State<AppState>) -> Response {
    match state.entities.health_check().await {
        Ok(()) => Json(HealthStatus {
            status: "ok".to_string(),
            backend: state.entities.backend_name().to_string(),
        })
        .into_response(),
        Err(err) => {
            tracing::error!(error = ?err, "entity store unavailable");
            Reject::internal("entity store unavailable")
                .into_response(&TransactionId::generate())
        }
    }
}
