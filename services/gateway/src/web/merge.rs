//! Parameter precedence merge and the immutability veto.
//!
//! # Purpose
//! Builds the invocation payload from the parameter provenance layers and
//! injects the reserved request-metadata properties. Precedence, lowest to
//! highest: package -> action -> query -> body -> injected metadata.
//! Package parameters are already folded beneath the action's by the
//! lookup stage, so the merge here starts from the action record.
use crate::api::error::Reject;
use crate::model::Action;
use crate::web::context::WebContext;
use serde_json::{Map, Value};

/// Reserved payload property: lowercased HTTP method.
pub const METHOD_PROPERTY: &str = "__ow_method";
/// Reserved payload property: lowercased-name header map.
pub const HEADERS_PROPERTY: &str = "__ow_headers";
/// Reserved payload property: projection path string.
pub const PATH_PROPERTY: &str = "__ow_path";
/// Reserved payload property: owner namespace.
pub const USER_PROPERTY: &str = "__ow_user";
/// Reserved payload property: raw query string (raw-http only).
pub const QUERY_PROPERTY: &str = "__ow_query";
/// Reserved payload property: raw request body (raw-http only).
pub const BODY_PROPERTY: &str = "__ow_body";

/// Every reserved name, regardless of raw-ness. Clients may set none of
/// these.
pub const RESERVED_PROPERTIES: [&str; 6] = [
    METHOD_PROPERTY,
    HEADERS_PROPERTY,
    PATH_PROPERTY,
    USER_PROPERTY,
    QUERY_PROPERTY,
    BODY_PROPERTY,
];

/// Reject the request when the caller attempts to set a reserved property
/// or an immutable action parameter through the query or the body.
///
/// Raw-http actions skip the check: their query and body travel as two
/// opaque reserved values and never merge by name.
pub fn immutability_veto(action: &Action, context: &WebContext) -> Result<(), Reject> {
    if action.raw_http() {
        return Ok(());
    }
    let immutable = action.immutable_parameters();
    let blocked = |name: &str| RESERVED_PROPERTIES.contains(&name) || immutable.contains(name);

    let query_offends = context.query.iter().any(|(name, _)| blocked(name));
    let body_offends = match &context.body {
        Some(Value::Object(fields)) => fields.keys().any(|name| blocked(name)),
        _ => false,
    };
    if query_offends || body_offends {
        return Err(Reject::bad_request("parameters not allowed"));
    }
    Ok(())
}

/// Assemble the invocation payload for the resolved action.
///
/// The caller must have run [`immutability_veto`] first; injection happens
/// last and would silently overwrite a same-named parameter otherwise.
/// TODO: enforce reserved-name collisions against action parameters at
/// entity creation time instead of assuming they cannot exist here.
pub fn build_payload(action: &Action, context: &WebContext, owner_namespace: &str) -> Value {
    let mut payload = Map::new();
    for (name, value) in &action.parameters {
        payload.insert(name.clone(), value.clone());
    }

    if action.raw_http() {
        payload.insert(
            QUERY_PROPERTY.to_string(),
            Value::String(context.raw_query.clone()),
        );
        payload.insert(
            BODY_PROPERTY.to_string(),
            context.body.clone().unwrap_or(Value::String(String::new())),
        );
    } else {
        for (name, value) in &context.query {
            payload.insert(name.clone(), Value::String(value.clone()));
        }
        if let Some(Value::Object(fields)) = &context.body {
            for (name, value) in fields {
                payload.insert(name.clone(), value.clone());
            }
        }
    }

    payload.insert(
        METHOD_PROPERTY.to_string(),
        Value::String(context.method.as_str().to_ascii_lowercase()),
    );
    payload.insert(
        HEADERS_PROPERTY.to_string(),
        Value::Object(header_map(&context.headers)),
    );
    payload.insert(PATH_PROPERTY.to_string(), Value::String(context.path.clone()));
    payload.insert(
        USER_PROPERTY.to_string(),
        Value::String(owner_namespace.to_string()),
    );

    Value::Object(payload)
}

fn header_map(headers: &[(String, String)]) -> Map<String, Value> {
    let mut map = Map::new();
    for (name, value) in headers {
        match map.get_mut(name) {
            Some(Value::String(existing)) => {
                existing.push_str(", ");
                existing.push_str(value);
            }
            _ => {
                map.insert(name.clone(), Value::String(value.clone()));
            }
        }
    }
    map
}
