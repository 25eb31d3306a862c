//! Package and action resolution for the web route.
//!
//! # Purpose
//! Fetches the package (unless `default`) and the action, rejects bindings,
//! and folds package parameters beneath the action's. Every store failure
//! that could reveal whether an entity exists collapses to the same 404.
use crate::api::error::Reject;
use crate::model::Action;
use crate::store::{EntityStore, StoreError};

/// The literal package segment addressing the namespace's default package.
pub const DEFAULT_PACKAGE: &str = "default";

fn collapse(err: StoreError) -> Reject {
    match err {
        // Missing and malformed records are indistinguishable to callers.
        StoreError::NotFound(_) | StoreError::Malformed(_) => {
            Reject::not_found("resource not found")
        }
        StoreError::Unexpected(err) => {
            tracing::error!(error = ?err, "entity store failure");
            Reject::internal("internal error")
        }
    }
}

/// Resolve the action addressed by `/<namespace>/<package>/<action>`.
pub async fn resolve_action(
    entities: &dyn EntityStore,
    namespace: &str,
    package: &str,
    action: &str,
) -> Result<Action, Reject> {
    if package == DEFAULT_PACKAGE {
        return entities
            .get_action(namespace, None, action)
            .await
            .map_err(collapse);
    }

    let package_record = entities
        .get_package(namespace, package)
        .await
        .map_err(collapse)?;
    if package_record.binding {
        // Bindings are aliases; the web route only serves concrete packages.
        return Err(Reject::not_found("resource not found"));
    }

    let action_record = entities
        .get_action(namespace, Some(package), action)
        .await
        .map_err(collapse)?;
    Ok(action_record.inherit(&package_record.parameters))
}
