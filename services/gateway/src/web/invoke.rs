//! Blocking invocation with a bounded wait.
use crate::api::error::Reject;
use crate::model::{Action, Activation, Identity};
use crate::observability;
use crate::store::{InvokeError, Invoker};
use serde_json::Value;
use std::time::Duration;

/// Issue the blocking call and map the three invoker outcomes:
/// completed, accepted-but-not-ready (202), and failed (500).
///
/// A timeout is a normal outcome here, not a fault; the caller gets the
/// activation id and can fetch the result through the activation API.
pub async fn invoke_blocking(
    invoker: &dyn Invoker,
    owner: &Identity,
    action: &Action,
    payload: Value,
    wait: Duration,
) -> Result<Activation, Reject> {
    match invoker.invoke_blocking(owner, action, payload, wait).await {
        Ok(outcome) => match outcome.activation {
            Some(activation) => {
                tracing::info!(
                    activation_id = %activation.activation_id,
                    namespace = %action.namespace,
                    action = %action.name,
                    "blocking invocation completed"
                );
                Ok(activation)
            }
            None => {
                tracing::info!(
                    activation_id = %outcome.activation_id,
                    namespace = %action.namespace,
                    action = %action.name,
                    "blocking invocation accepted without result"
                );
                Err(Reject::not_ready(outcome.activation_id))
            }
        },
        Err(InvokeError::Timeout { activation_id }) => {
            observability::record_invoke_timeout();
            tracing::info!(
                activation_id = %activation_id,
                namespace = %action.namespace,
                action = %action.name,
                wait_ms = wait.as_millis() as u64,
                "blocking invocation timed out"
            );
            Err(Reject::not_ready(activation_id))
        }
        Err(InvokeError::Unexpected(err)) => {
            tracing::error!(error = ?err, action = %action.fully_qualified_name(), "invoker failure");
            Err(Reject::internal("internal error"))
        }
    }
}
