//! Lifecycle listeners
//!
//! Observation hooks only; a listener cannot change what is enforced.

use crate::access_control::ScopeSet;
use crate::enforcement::context::ExecutionRequest;
use crate::query::QueryDocument;
use crate::redaction::DenialError;
use tracing::{debug, info};

/// Observes scope resolution and redaction for each request
pub trait AuthzListener: Send + Sync {
    /// Called once per request, before the verifier is obtained
    fn on_creating_state(&self, _scopes: &ScopeSet, _request: &ExecutionRequest) {}

    /// Called once per request after redaction
    fn on_enforcement(
        &self,
        _original: &QueryDocument,
        _redacted: &QueryDocument,
        _denials: &[DenialError],
    ) {
    }
}

/// Does nothing
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopListener;

impl AuthzListener for NoopListener {}

/// Logs lifecycle events through `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingListener;

impl AuthzListener for TracingListener {
    fn on_creating_state(&self, scopes: &ScopeSet, request: &ExecutionRequest) {
        debug!(
            scopes = %scopes,
            operation = request.operation_name.as_deref().unwrap_or("<anonymous>"),
            "Creating authorization state"
        );
    }

    fn on_enforcement(
        &self,
        original: &QueryDocument,
        redacted: &QueryDocument,
        denials: &[DenialError],
    ) {
        if denials.is_empty() {
            debug!("Query passed authorization unchanged");
            return;
        }
        info!(
            denials = denials.len(),
            fields = ?denials.iter().map(|d| d.path.to_string()).collect::<Vec<_>>(),
            "Query redacted"
        );
        debug!(original = %original, redacted = %redacted, "Redacted query");
    }
}
