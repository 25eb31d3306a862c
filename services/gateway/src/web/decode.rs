//! Request decoding: query strings and entity bodies.
//!
//! # Purpose
//! Turns raw request bytes into the JSON shapes the merge stage consumes.
//! Body handling depends on the Content-Type and on whether the resolved
//! action is raw-http; both paths are implemented here so the handler stays
//! a thin orchestrator.
use crate::api::error::Reject;
use crate::media::registry;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use bytes::Bytes;
use serde_json::{Map, Value};

const FORM_CONTENT_TYPE: &str = "application/x-www-form-urlencoded";
const JSON_CONTENT_TYPE: &str = "application/json";

/// Percent-decode one `application/x-www-form-urlencoded` component.
///
/// `+` means space in form encoding; `urlencoding` alone only handles the
/// percent escapes.
fn decode_component(component: &str) -> String {
    let with_spaces = component.replace('+', " ");
    urlencoding::decode(&with_spaces)
        .map(|decoded| decoded.into_owned())
        .unwrap_or(with_spaces)
}

/// Parse a query string (without the leading `?`) into ordered pairs.
pub fn parse_query(raw: &str) -> Vec<(String, String)> {
    raw.split('&')
        .filter(|pair| !pair.is_empty())
        .map(|pair| match pair.split_once('=') {
            Some((name, value)) => (decode_component(name), decode_component(value)),
            None => (decode_component(pair), String::new()),
        })
        .collect()
}

/// Decode a non-raw request body per its content type.
///
/// - JSON: must be a JSON object.
/// - Form: flat string map, wrapped as a JSON object.
/// - Anything else: a JSON string, base64 when the registry says binary or
///   the bytes are not UTF-8.
/// - Empty entity: `None`.
pub fn decode_body(bytes: &Bytes, content_type: Option<&str>) -> Result<Option<Value>, Reject> {
    if bytes.is_empty() {
        return Ok(None);
    }
    let essence = content_type.map(registry::essence);
    match essence.as_deref() {
        Some(JSON_CONTENT_TYPE) => {
            let value: Value = serde_json::from_slice(bytes)
                .map_err(|_| Reject::bad_request("request body is not valid json"))?;
            if !value.is_object() {
                return Err(Reject::bad_request("request body is not a json object"));
            }
            Ok(Some(value))
        }
        Some(FORM_CONTENT_TYPE) => {
            let text = std::str::from_utf8(bytes)
                .map_err(|_| Reject::bad_request("request body is not valid form data"))?;
            let mut fields = Map::new();
            for (name, value) in parse_query(text.trim()) {
                fields.insert(name, Value::String(value));
            }
            Ok(Some(Value::Object(fields)))
        }
        other => Ok(Some(body_as_string(bytes, other))),
    }
}

/// Decode a raw-http request body: always a single string value, base64
/// when binary, never parsed.
pub fn decode_raw_body(bytes: &Bytes, content_type: Option<&str>) -> Option<Value> {
    if bytes.is_empty() {
        return None;
    }
    let essence = content_type.map(registry::essence);
    Some(body_as_string(bytes, essence.as_deref()))
}

fn body_as_string(bytes: &Bytes, essence: Option<&str>) -> Value {
    let binary = essence.map(registry::is_binary).unwrap_or(false);
    if !binary {
        if let Ok(text) = std::str::from_utf8(bytes) {
            return Value::String(text.to_string());
        }
    }
    Value::String(BASE64.encode(bytes))
}
