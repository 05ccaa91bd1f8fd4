//! Request context and scope resolution
//!
//! The enforcer never inspects transports or sessions. Hosts copy whatever
//! the scope provider needs into a [`RequestContext`].

use crate::access_control::ScopeSet;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Host-supplied, per-request attributes
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    attributes: HashMap<String, String>,
}

impl RequestContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// An incoming GraphQL request
#[derive(Debug, Clone, Default)]
pub struct ExecutionRequest {
    pub query: String,
    pub operation_name: Option<String>,
    pub variables: Map<String, Value>,
    pub context: RequestContext,
}

impl ExecutionRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_operation_name(mut self, name: impl Into<String>) -> Self {
        self.operation_name = Some(name.into());
        self
    }

    pub fn with_variables(mut self, variables: Map<String, Value>) -> Self {
        self.variables = variables;
        self
    }

    pub fn with_context(mut self, context: RequestContext) -> Self {
        self.context = context;
        self
    }
}

/// Resolves the caller's scopes for a request
pub trait ScopeProvider: Send + Sync {
    fn scopes_for_request(&self, context: &RequestContext) -> ScopeSet;
}

/// Shared scope provider
pub type SharedScopeProvider = Arc<dyn ScopeProvider>;

/// Returns the same scopes for every request
#[derive(Debug, Clone, Default)]
pub struct StaticScopeProvider {
    scopes: ScopeSet,
}

impl StaticScopeProvider {
    pub fn new(scopes: ScopeSet) -> Self {
        Self { scopes }
    }
}

impl ScopeProvider for StaticScopeProvider {
    fn scopes_for_request(&self, _context: &RequestContext) -> ScopeSet {
        self.scopes.clone()
    }
}

/// Reads scopes from a request attribute such as `"public, support:read"`
///
/// A missing attribute yields no scopes.
#[derive(Debug, Clone)]
pub struct AttributeScopeProvider {
    attribute: String,
}

impl AttributeScopeProvider {
    pub const DEFAULT_ATTRIBUTE: &'static str = "scopes";

    pub fn new(attribute: impl Into<String>) -> Self {
        Self {
            attribute: attribute.into(),
        }
    }
}

impl Default for AttributeScopeProvider {
    fn default() -> Self {
        Self::new(Self::DEFAULT_ATTRIBUTE)
    }
}

impl ScopeProvider for AttributeScopeProvider {
    fn scopes_for_request(&self, context: &RequestContext) -> ScopeSet {
        context
            .attribute(&self.attribute)
            .map(ScopeSet::parse)
            .unwrap_or_default()
    }
}
