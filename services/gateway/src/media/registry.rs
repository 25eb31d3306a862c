//! Content-type registry.
//!
//! # Purpose
//! One classification table answers two questions: whether request bytes
//! should be carried as UTF-8 text or base64, and whether a content type
//! named by an `.http` response is known at all (unknown types are a 400
//! there, never a pass-through).
/// How bytes of a given content type travel through JSON payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaKind {
    Textual,
    Binary,
}

/// Default content type for `.http` responses that name none.
pub const DEFAULT_HTTP_CONTENT_TYPE: &str = "text/html";

/// Normalize a Content-Type header value to its lowercase `type/subtype`
/// essence, dropping parameters such as `charset`.
pub fn essence(content_type: &str) -> String {
    content_type
        .split(';')
        .next()
        .unwrap_or("")
        .trim()
        .to_ascii_lowercase()
}

/// Classify a content type against the registry.
///
/// Returns `None` for types the registry does not know. Families with open
/// subtypes (`text/*`, `image/*`, ...) are always known; `application/*`
/// is a closed allowlist plus the structured `+json`/`+xml` suffixes.
pub fn classify(content_type: &str) -> Option<MediaKind> {
    let essence = essence(content_type);
    let (family, subtype) = essence.split_once('/')?;
    if subtype.is_empty() {
        return None;
    }
    match family {
        "text" => Some(MediaKind::Textual),
        "image" => Some(if subtype == "svg+xml" {
            MediaKind::Textual
        } else {
            MediaKind::Binary
        }),
        "audio" | "video" | "font" | "model" | "multipart" => Some(MediaKind::Binary),
        "application" => match subtype {
            "json" | "javascript" | "ecmascript" | "xml" | "xhtml+xml"
            | "x-www-form-urlencoded" => Some(MediaKind::Textual),
            "octet-stream" | "pdf" | "zip" | "gzip" | "x-gzip" | "x-tar" | "wasm" => {
                Some(MediaKind::Binary)
            }
            _ if subtype.ends_with("+json") || subtype.ends_with("+xml") => {
                Some(MediaKind::Textual)
            }
            _ => None,
        },
        _ => None,
    }
}

/// Request-side binary test. Types the registry does not know are carried
/// as base64 rather than risking invalid UTF-8 in a JSON string.
pub fn is_binary(content_type: &str) -> bool {
    !matches!(classify(content_type), Some(MediaKind::Textual))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn essence_strips_parameters_and_case() {
        assert_eq!(essence("Text/Plain; charset=UTF-8"), "text/plain");
        assert_eq!(essence("application/json"), "application/json");
    }

    #[test]
    fn text_family_is_textual() {
        assert_eq!(classify("text/plain"), Some(MediaKind::Textual));
        assert_eq!(classify("text/anything-at-all"), Some(MediaKind::Textual));
    }

    #[test]
    fn svg_is_the_textual_image() {
        assert_eq!(classify("image/svg+xml"), Some(MediaKind::Textual));
        assert_eq!(classify("image/png"), Some(MediaKind::Binary));
    }

    #[test]
    fn structured_suffixes_are_textual() {
        assert_eq!(classify("application/ld+json"), Some(MediaKind::Textual));
        assert_eq!(classify("application/soap+xml"), Some(MediaKind::Textual));
    }

    #[test]
    fn unknown_types_are_unclassified() {
        assert_eq!(classify("xyz/bar"), None);
        assert_eq!(classify("application/x-custom"), None);
        assert_eq!(classify("notamediatype"), None);
    }

    #[test]
    fn unknown_request_types_count_as_binary() {
        assert!(is_binary("xyz/bar"));
        assert!(is_binary("application/octet-stream"));
        assert!(!is_binary("application/json"));
    }
}
