//! Configuration loader with layered sources
//!
//! Loads configuration from multiple sources with the following precedence
//! (highest to lowest):
//! 1. Environment variables (GQL_AUTHZ__*)
//! 2. Configuration file (TOML)
//! 3. Default values

use crate::access_control::PatternMatcher;
use crate::config::types::AuthzConfig;
use crate::error::ConfigError;
use config::{Config, Environment, File, FileFormat};
use std::path::Path;

/// Default configuration file paths to check (in order)
const DEFAULT_CONFIG_PATHS: &[&str] = &[
    "gql-authz.toml",
    ".gql-authz.toml",
    "~/.config/gql-authz/config.toml",
    "/etc/gql-authz/config.toml",
];

/// Environment variable prefix, e.g. `GQL_AUTHZ__CACHE__MAX_ENTRIES`
const ENV_PREFIX: &str = "GQL_AUTHZ";

/// Load configuration from a TOML string (useful for testing)
pub fn load_config_from_str(toml_str: &str) -> Result<AuthzConfig, ConfigError> {
    let config = Config::builder()
        .add_source(File::from_str(toml_str, FileFormat::Toml))
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let authz_config: AuthzConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&authz_config)?;

    Ok(authz_config)
}

/// Load configuration from files and environment
pub fn load_config(config_path: Option<&str>) -> Result<AuthzConfig, ConfigError> {
    let mut builder = Config::builder();

    // Defaults come from serde defaults on AuthzConfig
    if let Some(path) = config_path {
        // Explicit path provided - must exist
        if !Path::new(path).exists() {
            return Err(ConfigError::Load(format!(
                "Configuration file not found: {}",
                path
            )));
        }
        builder = builder.add_source(File::new(path, FileFormat::Toml));
    } else {
        // Try default paths (first existing one wins)
        for path in DEFAULT_CONFIG_PATHS {
            let expanded = shellexpand::tilde(path);
            if Path::new(expanded.as_ref()).exists() {
                builder = builder.add_source(File::new(&expanded, FileFormat::Toml));
                break;
            }
        }
    }

    // Double underscore (__) maps to nested keys (cache.max_entries)
    builder = builder.add_source(
        Environment::with_prefix(ENV_PREFIX)
            .separator("__")
            .try_parsing(true),
    );

    let config = builder
        .build()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    let authz_config: AuthzConfig = config
        .try_deserialize()
        .map_err(|e| ConfigError::Load(e.to_string()))?;

    validate_config(&authz_config)?;

    Ok(authz_config)
}

/// Validate configuration values
fn validate_config(config: &AuthzConfig) -> Result<(), ConfigError> {
    if config.clients.is_empty() {
        return Err(ConfigError::EmptyClients);
    }

    for (client, client_config) in &config.clients {
        if client.is_empty() {
            return Err(ConfigError::Invalid {
                message: "client identifiers must not be empty".to_string(),
            });
        }
        if client_config.queries.is_empty() {
            return Err(ConfigError::Missing {
                field: format!("clients.{}.queries", client),
            });
        }
        validate_patterns(&client_config.scopes, &format!("clients.{}.scopes", client))?;
    }

    if config.cache.enabled && config.cache.max_entries == 0 {
        return Err(ConfigError::Invalid {
            message: "cache.max_entries must be greater than 0".to_string(),
        });
    }

    Ok(())
}

/// Validate that all scope patterns compile
fn validate_patterns(patterns: &[String], field_path: &str) -> Result<(), ConfigError> {
    PatternMatcher::new(patterns)
        .map(|_| ())
        .map_err(|e| match e {
            ConfigError::InvalidPattern { pattern, reason } => ConfigError::InvalidPattern {
                pattern,
                reason: format!("in {}: {}", field_path, reason),
            },
            other => other,
        })
}
