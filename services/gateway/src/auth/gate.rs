//! Export and authentication gate for web actions.
use crate::api::error::Reject;
use crate::model::Action;

/// Enforce the action's export and authentication annotations.
///
/// | web-export | require-auth | authenticated | result |
/// |------------|--------------|---------------|--------|
/// | false      | -            | -             | 404    |
/// | true       | false        | -             | pass   |
/// | true       | true         | true          | pass   |
/// | true       | true         | false         | 401    |
///
/// An unexported action is reported exactly like a missing one.
pub fn check_web_access(action: &Action, authenticated: bool) -> Result<(), Reject> {
    if !action.web_exported() {
        return Err(Reject::not_found("resource not found"));
    }
    if action.requires_authentication() && !authenticated {
        return Err(Reject::unauthorized("authentication required"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Annotations, Parameters, REQUIRE_AUTH_ANNOTATION, WEB_EXPORT_ANNOTATION};
    use axum::http::StatusCode;
    use serde_json::json;

    fn action(exported: Option<bool>, require_auth: bool) -> Action {
        let mut annotations = Annotations::default();
        if let Some(exported) = exported {
            annotations.set(WEB_EXPORT_ANNOTATION, json!(exported));
        }
        if require_auth {
            annotations.set(REQUIRE_AUTH_ANNOTATION, json!(true));
        }
        Action {
            namespace: "ns".to_string(),
            name: "act".to_string(),
            parameters: Parameters::new(),
            annotations,
        }
    }

    #[test]
    fn unexported_and_absent_export_are_404() {
        for action in [action(Some(false), false), action(None, false)] {
            let err = check_web_access(&action, true).unwrap_err();
            assert_eq!(err.status, StatusCode::NOT_FOUND);
        }
    }

    #[test]
    fn exported_actions_pass_anonymously() {
        assert!(check_web_access(&action(Some(true), false), false).is_ok());
    }

    #[test]
    fn require_auth_demands_an_authenticated_caller() {
        let guarded = action(Some(true), true);
        assert!(check_web_access(&guarded, true).is_ok());
        let err = check_web_access(&guarded, false).unwrap_err();
        assert_eq!(err.status, StatusCode::UNAUTHORIZED);
    }
}
