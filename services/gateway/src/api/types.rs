//! Shared API payload shapes.
use serde::{Deserialize, Serialize};

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct SystemInfo {
    pub service: String,
    pub api_version: String,
    /// The recognized media extensions, with their leading dot.
    pub extensions: Vec<String>,
    pub enforce_extension: bool,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct HealthStatus {
    pub status: String,
    pub backend: String,
}
