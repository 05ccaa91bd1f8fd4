//! Configuration types for gql-authz
//!
//! This module defines the configuration structure that can be loaded from
//! TOML files and/or environment variables.

use serde::Deserialize;
use std::collections::BTreeMap;

/// Default number of cached verifiers
pub const DEFAULT_CACHE_MAX_ENTRIES: usize = 1024;

/// Root configuration structure
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthzConfig {
    /// Path to the GraphQL schema (SDL)
    pub schema: Option<String>,

    /// Allowed-query declarations, by client identifier
    pub clients: BTreeMap<String, ClientConfig>,

    /// Query redaction settings
    pub redaction: RedactionConfig,

    /// Verifier cache settings
    pub cache: CacheConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

/// One client's rule declarations
///
/// ```toml
/// [clients.partner]
/// scopes = ["partner:.*"]
/// queries = [
///     "{ user { id } }",
///     "query { search { ... on Post { title } } }",
/// ]
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Allowed queries, written in GraphQL
    pub queries: Vec<String>,

    /// Scope patterns (anchored regex) selecting this client.
    /// When empty, the scope equal to the client identifier selects it.
    pub scopes: Vec<String>,
}

impl ClientConfig {
    pub fn new<I, S>(queries: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            queries: queries.into_iter().map(Into::into).collect(),
            scopes: Vec::new(),
        }
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }
}

/// Query redaction settings
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct RedactionConfig {
    /// What to do with selection sets emptied by redaction
    pub empty_selections: EmptySelectionPolicy,
}

/// Handling of composite selections whose sub-selections were all removed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EmptySelectionPolicy {
    /// Remove the emptied field, inline fragment or fragment definition
    /// (and every spread of an emptied fragment). GraphQL does not allow
    /// empty selection sets, so this keeps the document valid.
    #[default]
    Prune,
    /// Leave the emptied selection set in place
    Keep,
}

/// Verifier cache settings
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Reuse verifiers across requests with the same scopes
    pub enabled: bool,

    /// Maximum number of cached scope sets
    pub max_entries: usize,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            max_entries: DEFAULT_CACHE_MAX_ENTRIES,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,

    /// Output format (pretty, json)
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Pretty,
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    /// Human-readable output
    #[default]
    Pretty,
    /// JSON structured output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = AuthzConfig::default();
        assert!(config.clients.is_empty());
        assert!(config.cache.enabled);
        assert_eq!(config.cache.max_entries, DEFAULT_CACHE_MAX_ENTRIES);
        assert_eq!(
            config.redaction.empty_selections,
            EmptySelectionPolicy::Prune
        );
        assert_eq!(config.logging.format, LogFormat::Pretty);
    }

    #[test]
    fn test_deserialize_empty_selection_policy() {
        let policy: EmptySelectionPolicy = serde_json::from_str(r#""keep""#).unwrap();
        assert_eq!(policy, EmptySelectionPolicy::Keep);

        let policy: EmptySelectionPolicy = serde_json::from_str(r#""prune""#).unwrap();
        assert_eq!(policy, EmptySelectionPolicy::Prune);
    }

    #[test]
    fn test_client_config_builder() {
        let client = ClientConfig::new(["{ user { id } }"]).with_scopes(["read:.*"]);
        assert_eq!(client.queries, vec!["{ user { id } }"]);
        assert_eq!(client.scopes, vec!["read:.*"]);
    }
}
