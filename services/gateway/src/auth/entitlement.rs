//! Throttle enforcement against the entitlement provider.
use crate::api::error::Reject;
use crate::model::Identity;
use crate::store::{EntitlementError, EntitlementProvider};

/// Check the action-owner identity's activation quota.
///
/// The owner is always the subject of the check; for anonymous requests no
/// caller identity exists to meter.
pub async fn check_throttle(
    provider: &dyn EntitlementProvider,
    owner: &Identity,
) -> Result<(), Reject> {
    match provider.check(owner).await {
        Ok(()) => Ok(()),
        Err(EntitlementError::Throttled(message)) => {
            tracing::info!(namespace = %owner.namespace, "activation quota exceeded");
            Err(Reject::throttled(message))
        }
        Err(EntitlementError::Unexpected(err)) => {
            tracing::error!(error = ?err, "entitlement provider failure");
            Err(Reject::internal("internal error"))
        }
    }
}
