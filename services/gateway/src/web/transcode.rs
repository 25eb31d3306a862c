//! Activation-result projection and media rendering.
//!
//! # Purpose
//! Turns the activation's JSON result into the HTTP response the requested
//! media extension promises: projection-path descent, the
//! application-error fold, and one renderer per extension, including full
//! HTTP response synthesis for `.http`.
use crate::api::error::Reject;
use crate::media::{registry, MediaExtension};
use crate::model::{Activation, ActivationStatus, ERROR_FIELD};
use axum::http::header::CONTENT_TYPE;
use axum::http::{HeaderName, HeaderValue, StatusCode};
use axum::response::Response;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde_json::Value;

/// Render the activation under the requested extension and projection path.
pub fn transcode(
    activation: &Activation,
    extension: MediaExtension,
    projection_path: &str,
) -> Result<Response, Reject> {
    let fields = projection_fields(activation, extension, projection_path)?;
    let result = activation
        .response
        .result
        .clone()
        .unwrap_or(Value::Object(Default::default()));
    let projected = project(result, &fields)?;

    match extension {
        MediaExtension::Json => render_json(projected),
        MediaExtension::Text => render_text(projected),
        MediaExtension::Html => render_string(projected, "text/html", "html"),
        MediaExtension::Svg => render_string(projected, "image/svg+xml", "svg"),
        MediaExtension::Http => render_http(projected),
    }
}

/// Resolve which result fields to descend into.
///
/// An application error overrides the caller's projection and folds onto
/// the standard error field; developer and system errors never reach a
/// renderer.
fn projection_fields(
    activation: &Activation,
    extension: MediaExtension,
    projection_path: &str,
) -> Result<Vec<String>, Reject> {
    match activation.response.status {
        ActivationStatus::Success => {}
        ActivationStatus::ApplicationError => return Ok(vec![ERROR_FIELD.to_string()]),
        ActivationStatus::DeveloperError | ActivationStatus::SystemError => {
            return Err(Reject::bad_request("error processing request"));
        }
    }

    let requested: Vec<String> = projection_path
        .split('/')
        .filter(|segment| !segment.is_empty())
        .map(str::to_string)
        .collect();
    if extension.projection_allowed() && !requested.is_empty() {
        return Ok(requested);
    }
    Ok(extension
        .default_projection()
        .map(|fields| fields.iter().map(|f| f.to_string()).collect())
        .unwrap_or_default())
}

/// Left-associative field descent: `/a/b/c` is `V["a"]["b"]["c"]`.
fn project(mut value: Value, fields: &[String]) -> Result<Value, Reject> {
    for field in fields {
        value = match value.get(field) {
            Some(inner) => inner.clone(),
            None => return Err(Reject::not_found("property not found")),
        };
    }
    Ok(value)
}

fn respond(status: StatusCode, content_type: &str, body: Vec<u8>) -> Result<Response, Reject> {
    Response::builder()
        .status(status)
        .header(CONTENT_TYPE, content_type)
        .body(body.into())
        .map_err(|_| Reject::internal("internal error"))
}

fn render_json(value: Value) -> Result<Response, Reject> {
    if !value.is_object() && !value.is_array() {
        return Err(Reject::bad_request("response is not valid json"));
    }
    let body = serde_json::to_vec(&value)
        .map_err(|_| Reject::internal("internal error"))?;
    respond(StatusCode::OK, "application/json", body)
}

/// `.text` renders scalars literally and structures pretty-printed; it
/// never fails. Null renders as the literal `null`.
fn render_text(value: Value) -> Result<Response, Reject> {
    let body = match value {
        Value::String(text) => text,
        Value::Bool(flag) => flag.to_string(),
        Value::Number(number) => number.to_string(),
        Value::Null => "null".to_string(),
        structured => serde_json::to_string_pretty(&structured)
            .map_err(|_| Reject::internal("internal error"))?,
    };
    respond(StatusCode::OK, "text/plain", body.into_bytes())
}

fn render_string(value: Value, content_type: &str, kind: &str) -> Result<Response, Reject> {
    match value {
        Value::String(text) => respond(StatusCode::OK, content_type, text.into_bytes()),
        _ => Err(Reject::bad_request(format!("response is not valid {kind}"))),
    }
}

/// Synthesize a full HTTP response from the result object:
/// status from `statusCode`/`code`, raw headers, optional body (base64 for
/// binary content types). Content-Type defaults to `text/html` and must be
/// known to the media-type registry.
fn render_http(value: Value) -> Result<Response, Reject> {
    let Value::Object(fields) = value else {
        return Err(Reject::bad_request("response is not valid http"));
    };

    let status = match fields.get("statusCode").or_else(|| fields.get("code")) {
        Some(code) => parse_status(code)?,
        None => StatusCode::OK,
    };
    let headers = match fields.get("headers") {
        Some(Value::Object(headers)) => parse_headers(headers)?,
        Some(_) => return Err(Reject::bad_request("http headers are not valid")),
        None => Vec::new(),
    };

    let content_type = headers
        .iter()
        .find(|(name, _)| name == CONTENT_TYPE.as_str())
        .map(|(_, value)| value.clone());
    let media_kind = match &content_type {
        Some(value) => registry::classify(value)
            .ok_or_else(|| Reject::bad_request("http unknown content type"))?,
        None => registry::MediaKind::Textual,
    };

    let body: Vec<u8> = match fields.get("body") {
        Some(Value::String(body)) => match media_kind {
            registry::MediaKind::Binary => BASE64
                .decode(body.as_bytes())
                .map_err(|_| Reject::bad_request("http body is not valid base64"))?,
            registry::MediaKind::Textual => body.clone().into_bytes(),
        },
        Some(_) => return Err(Reject::bad_request("http body is not a string")),
        None => Vec::new(),
    };

    let mut builder = Response::builder().status(status);
    let mut saw_content_type = false;
    for (name, value) in &headers {
        saw_content_type |= name == CONTENT_TYPE.as_str();
        let name = HeaderName::try_from(name.as_str())
            .map_err(|_| Reject::bad_request("http headers are not valid"))?;
        let value = HeaderValue::try_from(value.as_str())
            .map_err(|_| Reject::bad_request("http headers are not valid"))?;
        builder = builder.header(name, value);
    }
    if !saw_content_type {
        builder = builder.header(CONTENT_TYPE, registry::DEFAULT_HTTP_CONTENT_TYPE);
    }
    builder
        .body(body.into())
        .map_err(|_| Reject::internal("internal error"))
}

fn parse_status(code: &Value) -> Result<StatusCode, Reject> {
    let invalid = || Reject::bad_request("http status code is not valid");
    let number = code.as_i64().ok_or_else(invalid)?;
    let number = u16::try_from(number).map_err(|_| invalid())?;
    if !(100..=599).contains(&number) {
        return Err(invalid());
    }
    StatusCode::from_u16(number).map_err(|_| invalid())
}

/// Header values may be strings, booleans, or numbers; anything else is a
/// 400. Names are lowercased for the content-type probe.
fn parse_headers(
    headers: &serde_json::Map<String, Value>,
) -> Result<Vec<(String, String)>, Reject> {
    let mut pairs = Vec::with_capacity(headers.len());
    for (name, value) in headers {
        let rendered = match value {
            Value::String(text) => text.clone(),
            Value::Bool(flag) => flag.to_string(),
            Value::Number(number) => number.to_string(),
            _ => return Err(Reject::bad_request("http headers are not valid")),
        };
        pairs.push((name.to_ascii_lowercase(), rendered));
    }
    Ok(pairs)
}
