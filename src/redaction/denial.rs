//! Denial records
//!
//! One [`DenialError`] is produced per removed field. They are never fatal;
//! the orchestrator appends them to the response's `errors`.

use crate::enforcement::result::{GraphQLError, Location};
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Error code attached to every denial in the response
pub const UNAUTHORIZED_FIELD_CODE: &str = "UNAUTHORIZED_FIELD";

/// Response-key path from a traversal root to a field, e.g. `user.ssn`
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct FieldPath(Vec<String>);

impl FieldPath {
    pub fn new(segments: Vec<String>) -> Self {
        Self(segments)
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0.join("."))
    }
}

/// The traversal root a denial was found under
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum RedactionRoot {
    /// The executed operation (anonymous operations have no name)
    Operation { name: Option<String> },
    /// A named fragment definition, redacted once for all its spreads
    Fragment { name: String },
}

/// Why a field was removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DenialReason {
    /// No client selected by the caller's scopes permits the field
    NotPermitted,
    /// The request's authorization extension rejected the field
    Extension,
}

/// A removed selection
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DenialError {
    pub root: RedactionRoot,
    pub path: FieldPath,
    pub parent_type: String,
    pub field: String,
    pub location: Location,
    pub reason: DenialReason,
}

impl DenialError {
    pub fn message(&self) -> String {
        let mut message = format!(
            "Not authorized to access field '{}' of type '{}'",
            self.field, self.parent_type
        );
        if let RedactionRoot::Fragment { name } = &self.root {
            message.push_str(&format!(" in fragment '{}'", name));
        }
        message
    }

    /// The response error reported for this denial
    pub fn to_graphql_error(&self) -> GraphQLError {
        let mut extensions = Map::new();
        extensions.insert("code".into(), Value::from(UNAUTHORIZED_FIELD_CODE));
        extensions.insert("parentType".into(), Value::from(self.parent_type.clone()));
        extensions.insert("field".into(), Value::from(self.field.clone()));
        if let RedactionRoot::Fragment { name } = &self.root {
            extensions.insert("fragment".into(), Value::from(name.clone()));
        }
        if self.reason == DenialReason::Extension {
            extensions.insert("reason".into(), Value::from("extension"));
        }

        GraphQLError {
            message: self.message(),
            locations: vec![self.location],
            path: self.path.segments().iter().cloned().map(Value::from).collect(),
            extensions: Some(extensions),
        }
    }
}

impl fmt::Display for DenialError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} at '{}'", self.message(), self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn denial(root: RedactionRoot) -> DenialError {
        DenialError {
            root,
            path: FieldPath::new(vec!["user".into(), "ssn".into()]),
            parent_type: "User".into(),
            field: "ssn".into(),
            location: Location { line: 1, column: 10 },
            reason: DenialReason::NotPermitted,
        }
    }

    #[test]
    fn test_display() {
        let err = denial(RedactionRoot::Operation { name: None });
        assert_eq!(
            err.to_string(),
            "Not authorized to access field 'ssn' of type 'User' at 'user.ssn'"
        );
    }

    #[test]
    fn test_graphql_error_shape() {
        let err = denial(RedactionRoot::Fragment { name: "F".into() }).to_graphql_error();
        assert!(err.message.contains("fragment 'F'"));
        assert_eq!(err.path, vec![Value::from("user"), Value::from("ssn")]);
        assert_eq!(err.locations, vec![Location { line: 1, column: 10 }]);

        let extensions = err.extensions.unwrap();
        assert_eq!(extensions["code"], UNAUTHORIZED_FIELD_CODE);
        assert_eq!(extensions["fragment"], "F");
        assert!(!extensions.contains_key("reason"));
    }
}
