//! The web-action route handler.
//!
//! # Purpose
//! Orchestrates the per-request pipeline: decode -> (identity || entity
//! resolution) -> export gate -> throttle -> merge -> blocking invocation
//! -> transcode. Any stage short-circuits with a `Reject`; only this module
//! turns one into a response, logging a single structured event with the
//! transaction id.
use crate::api::error::{Reject, TransactionId};
use crate::app::AppState;
use crate::auth::{entitlement, gate, identity};
use crate::media::{self, MediaExtension};
use crate::model::name::is_valid_entity_name;
use crate::observability;
use crate::web::context::WebContext;
use crate::web::{decode, invoke, merge, resolve, transcode};
use axum::extract::{Path, RawQuery, State};
use axum::http::{HeaderMap, Method};
use axum::response::Response;
use bytes::Bytes;

/// The pieces of the HTTP request the pipeline consumes.
struct WebRequest {
    method: Method,
    headers: HeaderMap,
    raw_query: String,
    namespace: String,
    package: String,
    action_segment: String,
    projection: String,
    body: Bytes,
}

/// Handler for `/<prefix>/web/:namespace/:package/:action_segment`.
pub(crate) async fn invoke_web_action(
    State(state): State<AppState>,
    method: Method,
    Path((namespace, package, action_segment)): Path<(String, String, String)>,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    run(
        state,
        WebRequest {
            method,
            headers,
            raw_query: raw_query.unwrap_or_default(),
            namespace,
            package,
            action_segment,
            projection: String::new(),
            body,
        },
    )
    .await
}

/// Handler for the same route with a trailing projection path.
pub(crate) async fn invoke_web_action_projected(
    State(state): State<AppState>,
    method: Method,
    Path((namespace, package, action_segment, projection)): Path<(String, String, String, String)>,
    RawQuery(raw_query): RawQuery,
    headers: HeaderMap,
    body: Bytes,
) -> Response {
    run(
        state,
        WebRequest {
            method,
            headers,
            raw_query: raw_query.unwrap_or_default(),
            namespace,
            package,
            action_segment,
            projection,
            body,
        },
    )
    .await
}

async fn run(state: AppState, request: WebRequest) -> Response {
    let transaction_id = TransactionId::generate();
    let extension = extension_label(&request.action_segment, state.config.enforce_extension);

    let response = match pipeline(&state, &request, &transaction_id).await {
        Ok(response) => response,
        Err(reject) => {
            tracing::info!(
                code = %transaction_id,
                status = reject.status.as_u16(),
                message = %reject.message,
                namespace = %request.namespace,
                package = %request.package,
                action = %request.action_segment,
                "web request rejected"
            );
            reject.into_response(&transaction_id)
        }
    };

    observability::record_web_request(response.status(), extension);
    response
}

async fn pipeline(
    state: &AppState,
    request: &WebRequest,
    transaction_id: &TransactionId,
) -> Result<Response, Reject> {
    // Segment validation and extension split. Bad names look exactly like
    // missing entities.
    if !is_valid_entity_name(&request.namespace)
        || (request.package != resolve::DEFAULT_PACKAGE
            && !is_valid_entity_name(&request.package))
    {
        return Err(Reject::not_found("resource not found"));
    }
    let (action_name, extension) = match media::split_extension(&request.action_segment) {
        Some((base, extension)) => (base, extension),
        None if state.config.enforce_extension => {
            return Err(Reject::media_unsupported("content type not supported"));
        }
        None => (request.action_segment.as_str(), MediaExtension::Http),
    };
    if !is_valid_entity_name(action_name) {
        return Err(Reject::not_found("resource not found"));
    }

    if request.body.len() > state.config.max_entity_size {
        return Err(Reject::entity_too_large(format!(
            "request entity too large, limit is {} bytes",
            state.config.max_entity_size
        )));
    }

    // Caller authentication, the owner identity, and the action record
    // have independent inputs; fetch all three concurrently. Credential
    // failures still take precedence over missing entities.
    let (caller, owner, action) = tokio::join!(
        identity::authenticate_caller(state.auth.as_ref(), &request.headers),
        identity::owner_identity(state.auth.as_ref(), &request.namespace),
        resolve::resolve_action(
            state.entities.as_ref(),
            &request.namespace,
            &request.package,
            action_name
        ),
    );
    let caller = caller?;
    let (owner, action) = (owner?, action?);

    gate::check_web_access(&action, caller.is_some())?;
    entitlement::check_throttle(state.entitlement.as_ref(), &owner).await?;

    let content_type = request
        .headers
        .get(axum::http::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok());
    let body_value = if action.raw_http() {
        decode::decode_raw_body(&request.body, content_type)
    } else {
        decode::decode_body(&request.body, content_type)?
    };

    let context = WebContext {
        method: request.method.clone(),
        headers: request
            .headers
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|value| (name.as_str().to_ascii_lowercase(), value.to_string()))
            })
            .collect(),
        path: projection_suffix(&request.projection),
        query: decode::parse_query(&request.raw_query),
        raw_query: request.raw_query.clone(),
        body: body_value,
        extension,
        on_behalf_of: caller,
    };

    merge::immutability_veto(&action, &context)?;
    let payload = merge::build_payload(&action, &context, &owner.namespace);

    tracing::debug!(
        code = %transaction_id,
        action = %action.fully_qualified_name(),
        extension = extension.suffix(),
        "invoking web action"
    );
    let activation = invoke::invoke_blocking(
        state.invoker.as_ref(),
        &owner,
        &action,
        payload,
        state.config.max_blocking_wait,
    )
    .await?;

    transcode::transcode(&activation, extension, &context.path)
}

/// The injected `__ow_path` keeps a leading slash when a suffix exists.
fn projection_suffix(projection: &str) -> String {
    if projection.is_empty() {
        String::new()
    } else {
        format!("/{}", projection.trim_start_matches('/'))
    }
}

/// Extension label for metrics, resolved the same way the pipeline does.
fn extension_label(action_segment: &str, enforce: bool) -> &'static str {
    match media::split_extension(action_segment) {
        Some((_, extension)) => extension.suffix(),
        None if enforce => "unsupported",
        None => MediaExtension::Http.suffix(),
    }
}
