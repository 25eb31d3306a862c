//! Web-action request pipeline stages.
//!
//! # Purpose
//! The stages between an accepted route match and a rendered response:
//! decoding, entity resolution, parameter merging, blocking invocation, and
//! result transcoding. The `api::web` handler strings them together.
pub mod context;
pub mod decode;
pub mod invoke;
pub mod merge;
pub mod resolve;
pub mod transcode;
