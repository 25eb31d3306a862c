//! Entity-name validation.
//!
//! # Purpose
//! Namespace, package, and action segments share one grammar. Anything that
//! does not match is treated as a missing resource by the web route.
use regex::Regex;
use std::sync::OnceLock;

static ENTITY_NAME: OnceLock<Regex> = OnceLock::new();

/// Upper bound on any single entity-name segment.
pub const MAX_NAME_LENGTH: usize = 256;

fn entity_name_regex() -> &'static Regex {
    // First character must be a word character; the rest may add `@`, space,
    // dot, and dash. Mirrors the grammar enforced at entity creation time.
    ENTITY_NAME.get_or_init(|| Regex::new(r"^\w[\w@ .\-]*$").expect("entity name regex"))
}

/// Returns true when `name` is a well-formed entity-name segment.
pub fn is_valid_entity_name(name: &str) -> bool {
    !name.is_empty() && name.len() <= MAX_NAME_LENGTH && entity_name_regex().is_match(name)
}
