//! Gateway HTTP API module.
//!
//! # Purpose
//! Route handlers and the shared rejection/response machinery. The web
//! handler in `web` is the whole point of the service; `system` carries the
//! operational endpoints.
pub mod error;
pub mod system;
pub mod types;
pub mod web;
