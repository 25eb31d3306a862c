//! Entity records served by the auth and entity stores.
//!
//! # Purpose
//! Owned, name-keyed copies of the identity, package, and action records the
//! gateway fetches per request. The stores own the canonical data; the
//! gateway holds these only for the lifetime of one request.
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Parameter bindings attached to a package or action.
pub type Parameters = BTreeMap<String, Value>;

/// Annotation that must be `true` for anonymous web invocation.
pub const WEB_EXPORT_ANNOTATION: &str = "web-export";
/// Annotation marking an action as receiving the unparsed request body.
pub const RAW_HTTP_ANNOTATION: &str = "raw-http";
/// Annotation restricting an exported action to authenticated callers.
pub const REQUIRE_AUTH_ANNOTATION: &str = "require-whisk-auth";
/// Annotation that freezes all bound action parameters against overrides.
pub const FINAL_ANNOTATION: &str = "final";

/// Free-form annotations attached to packages and actions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(transparent)]
pub struct Annotations(pub BTreeMap<String, Value>);

impl Annotations {
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// An annotation counts as set only when it is the JSON boolean `true`.
    pub fn is_true(&self, name: &str) -> bool {
        matches!(self.0.get(name), Some(Value::Bool(true)))
    }

    pub fn set(&mut self, name: impl Into<String>, value: Value) {
        self.0.insert(name.into(), value);
    }
}

/// Credential pair identifying a namespace owner.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AuthKey {
    pub uuid: String,
    pub secret: String,
}

/// Quota handle consumed by the entitlement provider.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Limits {
    pub activations_per_minute: Option<u32>,
}

/// Immutable owner record keyed by namespace.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Identity {
    pub subject: String,
    pub namespace: String,
    pub auth_key: AuthKey,
    #[serde(default)]
    pub limits: Limits,
}

/// Named parameter grouping inside a namespace.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Package {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(default)]
    pub binding: bool,
    #[serde(default)]
    pub publish: bool,
    #[serde(default)]
    pub annotations: Annotations,
}

/// Invokable function unit.
///
/// `namespace` is the entity path: `<ns>` for the default package or
/// `<ns>/<pkg>` for an action living inside a package.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    pub namespace: String,
    pub name: String,
    #[serde(default)]
    pub parameters: Parameters,
    #[serde(default)]
    pub annotations: Annotations,
}

impl Action {
    /// Fully-qualified name, `<ns>[/<pkg>]/<action>`.
    pub fn fully_qualified_name(&self) -> String {
        format!("{}/{}", self.namespace, self.name)
    }

    pub fn web_exported(&self) -> bool {
        self.annotations.is_true(WEB_EXPORT_ANNOTATION)
    }

    pub fn raw_http(&self) -> bool {
        self.annotations.is_true(RAW_HTTP_ANNOTATION)
    }

    pub fn requires_authentication(&self) -> bool {
        self.annotations.is_true(REQUIRE_AUTH_ANNOTATION)
    }

    /// Parameter names the caller may not override.
    ///
    /// The `final` annotation is action-level: when set, every bound action
    /// parameter (including those inherited from the package) is protected.
    pub fn immutable_parameters(&self) -> BTreeSet<String> {
        if self.annotations.is_true(FINAL_ANNOTATION) {
            self.parameters.keys().cloned().collect()
        } else {
            BTreeSet::new()
        }
    }

    /// Merge package parameters beneath the action's own bindings.
    pub fn inherit(mut self, package_parameters: &Parameters) -> Self {
        let mut merged = package_parameters.clone();
        merged.append(&mut self.parameters);
        self.parameters = merged;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn action_with_annotations(annotations: &[(&str, Value)]) -> Action {
        let mut ann = Annotations::default();
        for (name, value) in annotations {
            ann.set(*name, value.clone());
        }
        Action {
            namespace: "ns".to_string(),
            name: "act".to_string(),
            parameters: Parameters::new(),
            annotations: ann,
        }
    }

    #[test]
    fn annotations_require_boolean_true() {
        let action = action_with_annotations(&[(WEB_EXPORT_ANNOTATION, json!("true"))]);
        assert!(!action.web_exported());
        let action = action_with_annotations(&[(WEB_EXPORT_ANNOTATION, json!(true))]);
        assert!(action.web_exported());
    }

    #[test]
    fn inherit_keeps_action_bindings_on_conflict() {
        let mut package_params = Parameters::new();
        package_params.insert("x".to_string(), json!(0));
        package_params.insert("shared".to_string(), json!("pkg"));

        let mut action = action_with_annotations(&[]);
        action.parameters.insert("shared".to_string(), json!("act"));

        let merged = action.inherit(&package_params);
        assert_eq!(merged.parameters["x"], json!(0));
        assert_eq!(merged.parameters["shared"], json!("act"));
    }

    #[test]
    fn final_annotation_freezes_all_bound_parameters() {
        let mut action = action_with_annotations(&[(FINAL_ANNOTATION, json!(true))]);
        action.parameters.insert("a".to_string(), json!(1));
        action.parameters.insert("b".to_string(), json!(2));
        let frozen = action.immutable_parameters();
        assert!(frozen.contains("a") && frozen.contains("b"));

        let open = action_with_annotations(&[]).immutable_parameters();
        assert!(open.is_empty());
    }
}
