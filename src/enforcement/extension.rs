//! Authorization extensions
//!
//! An extension adds caller-defined checks on top of the static client
//! rules. It is consulted only for fields the rules already allow, so it can
//! narrow access but never widen it.

use crate::enforcement::context::ExecutionRequest;
use graphql_parser::query::Field;

/// Per-request supplementary field check
pub trait AuthorizationExtension: Send + Sync {
    /// Whether an otherwise permitted field may stay in the query
    fn is_field_authorized(&self, parent_type: &str, field: &Field<'static, String>) -> bool;
}

/// Supplies the extension for each request
pub trait ExtensionProvider: Send + Sync {
    fn extension_for(&self, request: &ExecutionRequest) -> Box<dyn AuthorizationExtension>;
}

/// Allows every field
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopExtension;

impl AuthorizationExtension for NoopExtension {
    fn is_field_authorized(&self, _parent_type: &str, _field: &Field<'static, String>) -> bool {
        true
    }
}

/// Hands out [`NoopExtension`] for every request
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultExtensionProvider;

impl ExtensionProvider for DefaultExtensionProvider {
    fn extension_for(&self, _request: &ExecutionRequest) -> Box<dyn AuthorizationExtension> {
        Box::new(NoopExtension)
    }
}
