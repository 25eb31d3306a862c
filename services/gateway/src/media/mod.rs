//! Media extensions recognized by the web route.
//!
//! # Purpose
//! The URL-encoded extension selects how an activation result is projected
//! and rendered. The table is process-wide and read-only; dispatch is a
//! tagged enum rather than one type per transcoder.
pub mod registry;

/// The five recognized media extensions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaExtension {
    Http,
    Json,
    Html,
    Svg,
    Text,
}

impl MediaExtension {
    pub const ALL: [MediaExtension; 5] = [
        MediaExtension::Http,
        MediaExtension::Json,
        MediaExtension::Html,
        MediaExtension::Svg,
        MediaExtension::Text,
    ];

    /// The URL suffix, lowercase with the leading dot.
    pub fn suffix(self) -> &'static str {
        match self {
            MediaExtension::Http => ".http",
            MediaExtension::Json => ".json",
            MediaExtension::Html => ".html",
            MediaExtension::Svg => ".svg",
            MediaExtension::Text => ".text",
        }
    }

    /// Fields projected when the request supplies no projection path.
    pub fn default_projection(self) -> Option<&'static [&'static str]> {
        match self {
            MediaExtension::Html => Some(&["html"]),
            MediaExtension::Svg => Some(&["svg"]),
            MediaExtension::Text => Some(&["text"]),
            MediaExtension::Http | MediaExtension::Json => None,
        }
    }

    /// Whether a request-supplied projection path may override the default.
    pub fn projection_allowed(self) -> bool {
        // All current extensions accept caller projection; the field exists
        // so a future extension can opt out without touching the transcoder.
        true
    }
}

/// Split an action segment into `(action_name, extension)` by
/// longest-suffix, case-insensitive match against the known extensions.
///
/// Returns `None` when no extension matches; the caller decides between the
/// `.http` default and a 406 depending on configuration.
pub fn split_extension(segment: &str) -> Option<(&str, MediaExtension)> {
    let lowered = segment.to_ascii_lowercase();
    let mut best: Option<(&str, MediaExtension)> = None;
    for ext in MediaExtension::ALL {
        let suffix = ext.suffix();
        if lowered.ends_with(suffix) {
            let base = &segment[..segment.len() - suffix.len()];
            if base.is_empty() {
                continue;
            }
            let better = match best {
                Some((_, current)) => suffix.len() > current.suffix().len(),
                None => true,
            };
            if better {
                best = Some((base, ext));
            }
        }
    }
    best
}
