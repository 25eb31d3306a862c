//! Gateway HTTP application wiring.
//!
//! # Purpose
//! Builds the axum router, configures middleware, and defines the shared
//! application state injected into handlers.
//!
//! # Notes
//! Route composition lives here so `main` stays small and the full router
//! can be driven in-process by tests.
use crate::api;
use crate::config::GatewayConfig;
use crate::observability;
use crate::store::{AuthStore, EntitlementProvider, EntityStore, Invoker};
use axum::extract::DefaultBodyLimit;
use axum::routing::any;
use axum::Router;
use std::sync::Arc;
use tower_http::timeout::RequestBodyTimeoutLayer;
use tower_http::trace::TraceLayer;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub auth: Arc<dyn AuthStore>,
    pub entities: Arc<dyn EntityStore>,
    pub entitlement: Arc<dyn EntitlementProvider>,
    pub invoker: Arc<dyn Invoker>,
}

pub fn build_router(state: AppState) -> Router {
    let trace_layer = TraceLayer::new_for_http().make_span_with(
        |request: &axum::http::Request<_>| observability::request_span(request),
    );

    let prefix = state.config.api_prefix.trim_end_matches('/');
    let web_route = format!("{prefix}/web/:namespace/:package/:action_segment");
    let projected_route = format!("{web_route}/*projection");

    Router::new()
        .route("/v1/system/info", axum::routing::get(api::system::system_info))
        .route(
            "/v1/system/health",
            axum::routing::get(api::system::system_health),
        )
        .route(&web_route, any(api::web::invoke_web_action))
        .route(&projected_route, any(api::web::invoke_web_action_projected))
        // One byte of slack so the handler can report the exact-limit 413
        // with the standard error body; the axum limit is the backstop.
        .layer(DefaultBodyLimit::max(state.config.max_entity_size + 1))
        .layer(RequestBodyTimeoutLayer::new(state.config.body_read_timeout))
        .layer(trace_layer)
        .with_state(state)
}
