//! Authorization rules
//!
//! Each client declares the queries it may run, in GraphQL:
//!
//! ```toml
//! [clients.public]
//! queries = ["{ user { id } }"]
//! ```
//!
//! The [`QueryRuleParser`] compiles those declarations against the schema
//! into a [`PermissionSet`] of `(type, field)` rules.

pub mod parser;
pub mod permissions;

pub use parser::QueryRuleParser;
pub use permissions::{PermissionRule, PermissionSet};
