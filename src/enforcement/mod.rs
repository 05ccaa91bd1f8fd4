//! Request enforcement
//!
//! Per request, the [`AuthzEnforcer`] resolves the caller's scopes, obtains
//! a verifier, redacts the query before the host executes it, filters
//! introspection while it runs, and merges denials into the result.
//! Listeners, extensions and scope resolution are host-supplied.

pub mod context;
pub mod enforcer;
pub mod executor;
pub mod extension;
pub mod listener;
pub mod result;
pub mod state;

pub use context::{
    AttributeScopeProvider, ExecutionRequest, RequestContext, ScopeProvider, SharedScopeProvider,
    StaticScopeProvider,
};
pub use enforcer::{AuthzEnforcer, EnforcedQuery, EnforcerOptions};
pub use executor::{DataFetcher, FieldCoordinates, QueryExecutor};
pub use extension::{
    AuthorizationExtension, DefaultExtensionProvider, ExtensionProvider, NoopExtension,
};
pub use listener::{AuthzListener, NoopListener, TracingListener};
pub use result::{ExecutionResult, GraphQLError, Location};
pub use state::{RequestAuthzState, RequestPhase};
