//! Activation records produced by the invoker.
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Result field consulted by the application-error fold.
pub const ERROR_FIELD: &str = "error";

/// Outcome classification of a single activation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ActivationStatus {
    Success,
    ApplicationError,
    DeveloperError,
    SystemError,
}

/// The function's response portion of an activation record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ActivationResponse {
    pub status: ActivationStatus,
    pub result: Option<Value>,
}

impl ActivationResponse {
    pub fn success(result: Value) -> Self {
        Self {
            status: ActivationStatus::Success,
            result: Some(result),
        }
    }

    /// Wraps the error value under the standard error field, the shape the
    /// transcoder's error fold projects on.
    pub fn application_error(error: Value) -> Self {
        Self {
            status: ActivationStatus::ApplicationError,
            result: Some(serde_json::json!({ ERROR_FIELD: error })),
        }
    }

    pub fn developer_error(message: &str) -> Self {
        Self {
            status: ActivationStatus::DeveloperError,
            result: Some(serde_json::json!({ ERROR_FIELD: message })),
        }
    }
}

/// One execution record. The gateway only ever reads these; the invoker
/// owns creation and persistence.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Activation {
    pub activation_id: String,
    pub namespace: String,
    pub name: String,
    pub response: ActivationResponse,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn status_serializes_camel_case() {
        let status = serde_json::to_value(ActivationStatus::ApplicationError).unwrap();
        assert_eq!(status, json!("applicationError"));
        let status = serde_json::to_value(ActivationStatus::Success).unwrap();
        assert_eq!(status, json!("success"));
    }

    #[test]
    fn application_error_wraps_under_error_field() {
        let response = ActivationResponse::application_error(json!({"reason": "nope"}));
        assert_eq!(
            response.result.unwrap()[ERROR_FIELD],
            json!({"reason": "nope"})
        );
    }
}
