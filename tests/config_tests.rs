//! Configuration loading tests

use gql_authz::config::{
    DEFAULT_CACHE_MAX_ENTRIES, EmptySelectionPolicy, LogFormat, load_config, load_config_from_str,
};
use gql_authz::error::ConfigError;

const MINIMAL_CONFIG: &str = r#"
[clients.public]
queries = ["{ user { id } }"]
"#;

const FULL_CONFIG: &str = r#"
schema = "schema.graphql"

[clients.public]
queries = ["{ user { id name } }"]

[clients.support]
scopes = ["support:.*", "admin"]
queries = [
    "{ user { id name ssn } }",
    "query { search { ... on User { id } } }",
]

[redaction]
empty_selections = "keep"

[cache]
enabled = true
max_entries = 64

[logging]
level = "debug"
format = "json"
"#;

#[test]
fn test_minimal_config() {
    let config = load_config_from_str(MINIMAL_CONFIG).unwrap();

    assert!(config.schema.is_none());
    assert_eq!(config.clients.len(), 1);
    assert_eq!(config.clients["public"].queries, vec!["{ user { id } }"]);
}

#[test]
fn test_full_config() {
    let config = load_config_from_str(FULL_CONFIG).unwrap();

    assert_eq!(config.schema.as_deref(), Some("schema.graphql"));

    // Clients
    let support = &config.clients["support"];
    assert_eq!(support.scopes, vec!["support:.*", "admin"]);
    assert_eq!(support.queries.len(), 2);

    // Redaction
    assert_eq!(config.redaction.empty_selections, EmptySelectionPolicy::Keep);

    // Cache
    assert!(config.cache.enabled);
    assert_eq!(config.cache.max_entries, 64);

    // Logging
    assert_eq!(config.logging.level, "debug");
    assert_eq!(config.logging.format, LogFormat::Json);
}

#[test]
fn test_config_defaults() {
    let config = load_config_from_str(MINIMAL_CONFIG).unwrap();

    assert_eq!(config.redaction.empty_selections, EmptySelectionPolicy::Prune);
    assert!(config.cache.enabled);
    assert_eq!(config.cache.max_entries, DEFAULT_CACHE_MAX_ENTRIES);
    assert_eq!(config.logging.level, "info");
    assert_eq!(config.logging.format, LogFormat::Pretty);
}

#[test]
fn test_empty_clients_is_fatal() {
    let result = load_config_from_str("schema = \"schema.graphql\"\n");
    assert!(matches!(result, Err(ConfigError::EmptyClients)));
}

#[test]
fn test_zero_cache_entries_is_invalid() {
    let toml = format!("{}\n[cache]\nmax_entries = 0\n", MINIMAL_CONFIG);
    let result = load_config_from_str(&toml);
    assert!(matches!(result, Err(ConfigError::Invalid { .. })));
}

#[test]
fn test_invalid_regex_pattern() {
    let toml = r#"
[clients.partner]
scopes = ["(unclosed"]
queries = ["{ user { id } }"]
"#;

    let err = load_config_from_str(toml).unwrap_err();
    let ConfigError::InvalidPattern { pattern, reason } = err else {
        panic!("expected an invalid pattern error, got {}", err);
    };
    assert_eq!(pattern, "(unclosed");
    assert!(reason.contains("clients.partner.scopes"));
}

#[test]
fn test_unknown_policy_is_rejected() {
    let toml = format!("{}\n[redaction]\nempty_selections = \"drop\"\n", MINIMAL_CONFIG);
    assert!(matches!(
        load_config_from_str(&toml),
        Err(ConfigError::Load(_))
    ));
}

#[test]
fn test_missing_explicit_file() {
    let result = load_config(Some("/nonexistent/gql-authz.toml"));
    assert!(matches!(result, Err(ConfigError::Load(msg)) if msg.contains("not found")));
}

#[test]
#[serial_test::serial]
fn test_load_config_from_file() {
    use std::fs;
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, FULL_CONFIG).unwrap();

    let config = load_config(Some(config_path.to_str().unwrap())).unwrap();

    assert_eq!(config.clients.len(), 2);
    assert_eq!(config.cache.max_entries, 64);
}

#[test]
#[serial_test::serial]
fn test_env_vars_override_file() {
    use std::env;
    use std::fs;
    use tempfile::tempdir;

    let dir = tempdir().unwrap();
    let config_path = dir.path().join("config.toml");
    fs::write(&config_path, FULL_CONFIG).unwrap();

    unsafe {
        env::set_var("GQL_AUTHZ__CACHE__MAX_ENTRIES", "16");
        env::set_var("GQL_AUTHZ__REDACTION__EMPTY_SELECTIONS", "prune");
        env::set_var("GQL_AUTHZ__SCHEMA", "/srv/schema.graphql");
    }

    let result = load_config(Some(config_path.to_str().unwrap()));

    unsafe {
        env::remove_var("GQL_AUTHZ__CACHE__MAX_ENTRIES");
        env::remove_var("GQL_AUTHZ__REDACTION__EMPTY_SELECTIONS");
        env::remove_var("GQL_AUTHZ__SCHEMA");
    }

    let config = result.unwrap();
    assert_eq!(config.cache.max_entries, 16);
    assert_eq!(config.redaction.empty_selections, EmptySelectionPolicy::Prune);
    assert_eq!(config.schema.as_deref(), Some("/srv/schema.graphql"));
    // Untouched keys keep their file values
    assert_eq!(config.logging.level, "debug");
}
