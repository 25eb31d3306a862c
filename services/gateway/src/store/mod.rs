//! Collaborator interfaces of the gateway.
//!
//! # Purpose
//! The auth store, entity store, entitlement provider, and invoker are
//! external systems. The gateway talks to them through these async traits;
//! `memory` provides the in-process implementations used for local
//! development and tests.
use crate::model::{Action, Activation, Identity, Package};
use async_trait::async_trait;
use std::time::Duration;
use thiserror::Error;

pub mod memory;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("malformed record: {0}")]
    Malformed(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Read side of the subject/identity database.
#[async_trait]
pub trait AuthStore: Send + Sync {
    /// Resolve the owner identity of a namespace.
    async fn identity_by_namespace(&self, namespace: &str) -> StoreResult<Identity>;

    /// Validate a caller-supplied credential pair.
    async fn identity_by_auth_key(&self, uuid: &str, secret: &str) -> StoreResult<Identity>;
}

/// Read side of the artifact/entity database.
#[async_trait]
pub trait EntityStore: Send + Sync {
    async fn get_package(&self, namespace: &str, name: &str) -> StoreResult<Package>;

    /// Fetch an action. `package` is `None` for the default package.
    async fn get_action(
        &self,
        namespace: &str,
        package: Option<&str>,
        name: &str,
    ) -> StoreResult<Action>;

    async fn health_check(&self) -> StoreResult<()>;

    fn backend_name(&self) -> &'static str;
}

#[derive(Debug, Error)]
pub enum EntitlementError {
    #[error("activation quota exceeded: {0}")]
    Throttled(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// Quota oracle consulted for the action-owner identity before invocation.
#[async_trait]
pub trait EntitlementProvider: Send + Sync {
    async fn check(&self, identity: &Identity) -> Result<(), EntitlementError>;
}

/// What a blocking invocation yielded within the wait bound.
///
/// `activation` is `None` when the activation was accepted but did not
/// complete in time; callers treat that exactly like a timeout.
#[derive(Debug, Clone)]
pub struct BlockingOutcome {
    pub activation_id: String,
    pub activation: Option<Activation>,
}

#[derive(Debug, Error)]
pub enum InvokeError {
    #[error("blocking invocation timed out")]
    Timeout { activation_id: String },
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// The load-balancer/invoker seam. Implementations schedule the function
/// code; the gateway only issues blocking calls with a bounded wait.
#[async_trait]
pub trait Invoker: Send + Sync {
    async fn invoke_blocking(
        &self,
        identity: &Identity,
        action: &Action,
        payload: serde_json::Value,
        wait: Duration,
    ) -> Result<BlockingOutcome, InvokeError>;
}
