//! GraphQL field authorization
//!
//! Scope-based, field-level authorization for GraphQL queries.
//!
//! ## Features
//!
//! - **Declarative rules** - each client lists the queries it may run; the
//!   fields those queries select become its permissions
//! - **Scope-driven verifiers** - a caller's scopes select clients, whose
//!   permissions are unioned and cached per scope set
//! - **Query redaction** - denied fields are removed from the query, shared
//!   fragments are redacted once, and each removal is reported as an error
//! - **Introspection filtering** - hidden types and fields do not show up in
//!   `__schema` or `__type` results
//!
//! ## Request Flow
//!
//! ```text
//! scopes -> verifier -> redacted query -> host execution -> merged errors
//! ```
//!
//! ## Example Configuration
//!
//! ```toml
//! schema = "schema.graphql"
//!
//! [clients.public]
//! queries = ["{ user { id name } }"]
//!
//! [clients.support]
//! scopes = ["support:.*"]
//! queries = ["{ user { id name ssn } }"]
//!
//! [redaction]
//! empty_selections = "prune"
//! ```

pub mod access_control;
pub mod config;
pub mod enforcement;
pub mod error;
pub mod introspection;
pub mod query;
pub mod redaction;
pub mod rules;
pub mod schema;

// Re-export main types
pub use access_control::{PermissionVerifier, ScopeSet, VerifierFactory};
pub use config::{AuthzConfig, load_config};
pub use enforcement::{AuthzEnforcer, EnforcerOptions, ExecutionRequest, ExecutionResult};
pub use error::{AuthzError, Result};
pub use redaction::{DenialError, Redaction, RedactionEngine};
pub use schema::Schema;
