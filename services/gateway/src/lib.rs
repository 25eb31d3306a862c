//! Web-action gateway service library crate.
//!
//! # Purpose
//! Exposes the web-action pipeline, collaborator interfaces, configuration,
//! and observability for use by the binary and tests.
//!
//! # Notes
//! Module boundaries mirror the request pipeline: `api` handles HTTP,
//! `auth` gates the caller, `web` transforms the request and the result,
//! `store` holds the collaborator seams.
pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod media;
pub mod model;
pub mod observability;
pub mod store;
pub mod web;
