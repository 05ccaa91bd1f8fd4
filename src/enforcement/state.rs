//! Per-request authorization state

use crate::access_control::{PermissionVerifier, ScopeSet};
use crate::error::EnforcementError;
use crate::redaction::DenialError;
use crate::schema::Schema;
use std::fmt;
use std::sync::Arc;

/// Lifecycle phase of one request; phases only move forward
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RequestPhase {
    /// Scopes resolved and verifier obtained
    Created,
    /// Query rewritten
    Redacted,
    /// The host ran the rewritten query
    Executed,
    /// Denials merged into the result
    Finalized,
}

impl RequestPhase {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestPhase::Created => "created",
            RequestPhase::Redacted => "redacted",
            RequestPhase::Executed => "executed",
            RequestPhase::Finalized => "finalized",
        }
    }
}

impl fmt::Display for RequestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Everything the enforcer knows about one request
///
/// Owned by the request and passed by reference through each step.
#[derive(Debug)]
pub struct RequestAuthzState {
    verifier: Arc<PermissionVerifier>,
    schema: Arc<Schema>,
    scopes: ScopeSet,
    phase: RequestPhase,
    denials: Vec<DenialError>,
}

impl RequestAuthzState {
    pub fn new(verifier: Arc<PermissionVerifier>, schema: Arc<Schema>, scopes: ScopeSet) -> Self {
        Self {
            verifier,
            schema,
            scopes,
            phase: RequestPhase::Created,
            denials: Vec::new(),
        }
    }

    pub fn verifier(&self) -> &Arc<PermissionVerifier> {
        &self.verifier
    }

    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn scopes(&self) -> &ScopeSet {
        &self.scopes
    }

    pub fn phase(&self) -> RequestPhase {
        self.phase
    }

    /// Denials recorded so far, in document order
    pub fn denials(&self) -> &[DenialError] {
        &self.denials
    }

    pub(crate) fn record_denials(&mut self, denials: impl IntoIterator<Item = DenialError>) {
        self.denials.extend(denials);
    }

    /// Fail unless the request is currently in `expected`
    pub(crate) fn require(&self, expected: RequestPhase) -> Result<(), EnforcementError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(EnforcementError::OutOfOrder {
                expected: expected.to_string(),
                actual: self.phase.to_string(),
            })
        }
    }

    /// Move from `from` to `to`
    pub(crate) fn advance(
        &mut self,
        from: RequestPhase,
        to: RequestPhase,
    ) -> Result<(), EnforcementError> {
        self.require(from)?;
        self.phase = to;
        Ok(())
    }
}
