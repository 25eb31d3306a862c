//! Gateway data model module.
//!
//! # Purpose
//! Re-exports the identity/package/action/activation records and the
//! entity-name grammar used by the web route.
mod activation;
mod entity;
pub mod name;

pub use activation::{Activation, ActivationResponse, ActivationStatus, ERROR_FIELD};
pub use entity::{
    Action, Annotations, AuthKey, Identity, Limits, Package, Parameters, FINAL_ANNOTATION,
    RAW_HTTP_ANNOTATION, REQUIRE_AUTH_ANNOTATION, WEB_EXPORT_ANNOTATION,
};
