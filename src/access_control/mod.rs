//! Access control module
//!
//! Turns compiled client rules into per-request permission verifiers.
//!
//! ## Model
//!
//! 1. **Index** - every client's declarations compiled once against the schema
//! 2. **Scopes** - a caller's scopes select clients: by identifier, or by the
//!    client's `scopes` patterns when it has any
//! 3. **Verifier** - the union of the selected clients' rules; a field is
//!    allowed when any selected client permits it, and denied otherwise
//! 4. **Factory** - caches verifiers by scope set
//!
//! ## Example Configuration
//!
//! ```toml
//! [clients.public]
//! queries = ["{ user { id } }"]
//!
//! [clients.support]
//! scopes = ["support:.*"]
//! queries = ["{ user { id ssn } }"]
//! ```

pub mod factory;
pub mod index;
pub mod patterns;
pub mod scopes;
pub mod verifier;

pub use factory::{CacheStats, VerifierFactory};
pub use index::AuthorizationIndex;
pub use patterns::PatternMatcher;
pub use scopes::ScopeSet;
pub use verifier::PermissionVerifier;
