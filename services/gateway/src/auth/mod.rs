//! Authentication, export gating, and entitlement checks.
//!
//! # Purpose
//! Everything between "the request names an action" and "we are allowed to
//! invoke it": caller credential validation, owner identity resolution, the
//! export/require-auth gate, and the throttle check.
pub mod entitlement;
pub mod gate;
pub mod identity;
