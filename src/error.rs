//! Error types for gql-authz
//!
//! This module defines the error hierarchy used throughout the crate.
//! Everything here is fatal for the operation that raised it: configuration
//! and rule errors stop startup, query errors reject a document the host
//! engine would reject as well. Denied fields are not errors in this sense;
//! they are reported as [`DenialError`](crate::redaction::DenialError) data.

use thiserror::Error;

/// Top-level error
#[derive(Error, Debug)]
pub enum AuthzError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    #[error("Query error: {0}")]
    Query(#[from] QueryError),

    #[error("Enforcement error: {0}")]
    Enforcement(#[from] EnforcementError),
}

/// Configuration-related errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid configuration: {message}")]
    Invalid { message: String },

    #[error("Missing required configuration: {field}")]
    Missing { field: String },

    #[error("Invalid scope pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Clients missing from authorization configuration")]
    EmptyClients,

    #[error("Invalid rule declaration: {0}")]
    Rule(#[from] RuleError),

    #[error("Invalid schema: {0}")]
    Schema(#[from] SchemaError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Errors raised while compiling a client's allowed-query declarations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("client '{client}': failed to parse declaration: {reason}")]
    Parse { client: String, reason: String },

    #[error("client '{client}': unknown type '{type_name}'")]
    UnknownType { client: String, type_name: String },

    #[error("client '{client}': type '{type_name}' has no field '{field}'")]
    UnknownField {
        client: String,
        type_name: String,
        field: String,
    },

    #[error("client '{client}': unknown fragment '{name}'")]
    UnknownFragment { client: String, name: String },

    #[error("client '{client}': fragment '{name}' spreads itself")]
    FragmentCycle { client: String, name: String },

    #[error("client '{client}': schema has no {operation} root type")]
    MissingRootType { client: String, operation: String },
}

/// Schema loading errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum SchemaError {
    #[error("Failed to parse schema: {0}")]
    Parse(String),

    #[error("Schema has no query root type")]
    MissingQueryType,

    #[error("Root type '{0}' is not defined in the schema")]
    UnknownRootType(String),
}

/// Per-request document errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum QueryError {
    #[error("Failed to parse query: {0}")]
    Parse(String),

    #[error("Document contains no operation")]
    NoOperation,

    #[error("Unknown operation named '{0}'")]
    UnknownOperation(String),

    #[error("Document contains several operations; an operation name is required")]
    AmbiguousOperation,
}

/// Request lifecycle errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum EnforcementError {
    #[error("Lifecycle step requires phase {expected}, but the request is {actual}")]
    OutOfOrder { expected: String, actual: String },
}

/// Result type alias for the crate
pub type Result<T> = std::result::Result<T, AuthzError>;

/// Result type alias for rule compilation
pub type RuleResult<T> = std::result::Result<T, RuleError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rule_error_names_client() {
        let err = RuleError::UnknownField {
            client: "public".into(),
            type_name: "User".into(),
            field: "email".into(),
        };
        let message = err.to_string();
        assert!(message.contains("public"));
        assert!(message.contains("User"));
        assert!(message.contains("email"));
    }

    #[test]
    fn test_rule_error_converts_to_config_error() {
        let err: ConfigError = RuleError::UnknownType {
            client: "public".into(),
            type_name: "Ghost".into(),
        }
        .into();
        assert!(matches!(err, ConfigError::Rule(RuleError::UnknownType { .. })));
        assert!(err.to_string().starts_with("Invalid rule declaration"));
    }

    #[test]
    fn test_empty_clients_message() {
        let err = AuthzError::from(ConfigError::EmptyClients);
        assert!(err.to_string().contains("Clients missing"));
    }
}
