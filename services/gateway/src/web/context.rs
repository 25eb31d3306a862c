//! Per-request invocation context.
use crate::media::MediaExtension;
use crate::model::Identity;
use axum::http::Method;
use serde_json::Value;

/// Everything the merge and transcode stages need from the HTTP request.
///
/// Constructed by the request decoder, consumed by the invocation stage,
/// discarded when the response is written.
#[derive(Debug)]
pub struct WebContext {
    pub method: Method,
    /// Ordered `(name, value)` pairs, names lowercased. Duplicate headers
    /// keep their order; injection joins them with a comma.
    pub headers: Vec<(String, String)>,
    /// Projection suffix after the action segment, with a leading `/` when
    /// non-empty, the empty string otherwise.
    pub path: String,
    /// Decoded query pairs, in URL order.
    pub query: Vec<(String, String)>,
    /// The query string exactly as received, for the raw-http envelope.
    pub raw_query: String,
    /// Decoded body value: an object for JSON/form payloads, a string for
    /// everything else (base64 when binary), `None` for an empty entity.
    pub body: Option<Value>,
    pub extension: MediaExtension,
    /// The authenticated caller, when credentials were presented.
    pub on_behalf_of: Option<Identity>,
}
