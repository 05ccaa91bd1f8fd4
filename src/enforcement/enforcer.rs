//! Request lifecycle orchestration
//!
//! ```text
//! create_state -> enforce -> (host executes) -> mark_executed -> finalize
//!   Created        Redacted                      Executed         Finalized
//! ```
//!
//! [`AuthzEnforcer::execute`] runs every step against a [`QueryExecutor`].

use crate::access_control::{AuthorizationIndex, CacheStats, VerifierFactory};
use crate::config::{AuthzConfig, CacheConfig, EmptySelectionPolicy};
use crate::enforcement::context::{ExecutionRequest, SharedScopeProvider};
use crate::enforcement::executor::{DataFetcher, QueryExecutor};
use crate::enforcement::extension::{DefaultExtensionProvider, ExtensionProvider};
use crate::enforcement::listener::{AuthzListener, NoopListener};
use crate::enforcement::result::ExecutionResult;
use crate::enforcement::state::{RequestAuthzState, RequestPhase};
use crate::error::AuthzError;
use crate::introspection::{IntrospectionFilter, IntrospectionRedactingFetcher};
use crate::query::{QueryDocument, parse_query};
use crate::redaction::RedactionEngine;
use crate::schema::Schema;
use std::sync::Arc;
use tracing::{debug, info};

/// Optional collaborators of an [`AuthzEnforcer`]
pub struct EnforcerOptions {
    pub listener: Box<dyn AuthzListener>,
    pub extension_provider: Box<dyn ExtensionProvider>,
    /// Overrides `[redaction] empty_selections`
    pub empty_selections: Option<EmptySelectionPolicy>,
    /// Overrides `[cache]`
    pub cache: Option<CacheConfig>,
}

impl Default for EnforcerOptions {
    fn default() -> Self {
        Self {
            listener: Box::new(NoopListener),
            extension_provider: Box::new(DefaultExtensionProvider),
            empty_selections: None,
            cache: None,
        }
    }
}

impl EnforcerOptions {
    pub fn with_listener(mut self, listener: impl AuthzListener + 'static) -> Self {
        self.listener = Box::new(listener);
        self
    }

    pub fn with_extension_provider(mut self, provider: impl ExtensionProvider + 'static) -> Self {
        self.extension_provider = Box::new(provider);
        self
    }

    pub fn with_empty_selections(mut self, policy: EmptySelectionPolicy) -> Self {
        self.empty_selections = Some(policy);
        self
    }
}

/// The redacted document to hand to the host
#[derive(Debug, Clone)]
pub struct EnforcedQuery {
    pub original: QueryDocument,
    pub document: QueryDocument,
    pub operation_name: Option<String>,
}

/// Field-level authorization for every request of one schema
pub struct AuthzEnforcer {
    factory: VerifierFactory,
    scope_provider: SharedScopeProvider,
    listener: Box<dyn AuthzListener>,
    extension_provider: Box<dyn ExtensionProvider>,
    policy: EmptySelectionPolicy,
}

impl AuthzEnforcer {
    /// Compile the configured clients against `schema`
    ///
    /// Fails when no clients are configured or a declaration does not
    /// match the schema.
    pub fn new(
        config: &AuthzConfig,
        schema: Arc<Schema>,
        scope_provider: SharedScopeProvider,
        options: EnforcerOptions,
    ) -> Result<Self, AuthzError> {
        let index = Arc::new(AuthorizationIndex::build(schema, &config.clients)?);
        let cache = options.cache.unwrap_or_else(|| config.cache.clone());
        let policy = options
            .empty_selections
            .unwrap_or(config.redaction.empty_selections);

        info!(
            clients = index.len(),
            cache_enabled = cache.enabled,
            empty_selections = ?policy,
            "Authorization enforcer ready"
        );

        Ok(Self {
            factory: VerifierFactory::new(index, cache),
            scope_provider,
            listener: options.listener,
            extension_provider: options.extension_provider,
            policy,
        })
    }

    pub fn index(&self) -> &Arc<AuthorizationIndex> {
        self.factory.index()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.factory.stats()
    }

    /// Resolve scopes and the verifier for a request
    pub fn create_state(&self, request: &ExecutionRequest) -> RequestAuthzState {
        let scopes = self.scope_provider.scopes_for_request(&request.context);
        self.listener.on_creating_state(&scopes, request);
        let verifier = self.factory.verifier_for(&scopes);
        RequestAuthzState::new(verifier, Arc::clone(self.index().schema()), scopes)
    }

    /// Parse and redact the request's query, recording denials in `state`
    pub fn enforce(
        &self,
        state: &mut RequestAuthzState,
        request: &ExecutionRequest,
    ) -> Result<EnforcedQuery, AuthzError> {
        state.require(RequestPhase::Created)?;

        let original = parse_query(&request.query)?;
        let extension = self.extension_provider.extension_for(request);
        let redaction = RedactionEngine::new(state.schema(), state.verifier())
            .with_extension(extension.as_ref())
            .with_policy(self.policy)
            .redact(&original, request.operation_name.as_deref())?;

        self.listener
            .on_enforcement(&original, &redaction.document, &redaction.errors);
        state.record_denials(redaction.errors);
        state.advance(RequestPhase::Created, RequestPhase::Redacted)?;

        Ok(EnforcedQuery {
            original,
            document: redaction.document,
            operation_name: request.operation_name.clone(),
        })
    }

    /// Introspection filter bound to the request's verifier
    pub fn introspection_filter(&self, state: &RequestAuthzState) -> IntrospectionFilter {
        IntrospectionFilter::new(Arc::clone(state.verifier()))
    }

    /// Wrap a host fetcher so introspection results are filtered
    pub fn instrument_fetcher<F: DataFetcher>(
        &self,
        state: &RequestAuthzState,
        fetcher: F,
    ) -> IntrospectionRedactingFetcher<F> {
        IntrospectionRedactingFetcher::new(fetcher, self.introspection_filter(state))
    }

    /// Record that the host ran the redacted query
    pub fn mark_executed(&self, state: &mut RequestAuthzState) -> Result<(), AuthzError> {
        state.advance(RequestPhase::Redacted, RequestPhase::Executed)?;
        Ok(())
    }

    /// Append the request's denials after the host's own errors
    pub fn finalize(
        &self,
        state: &mut RequestAuthzState,
        result: ExecutionResult,
    ) -> Result<ExecutionResult, AuthzError> {
        state.advance(RequestPhase::Executed, RequestPhase::Finalized)?;

        let mut errors = result.errors;
        errors.extend(state.denials().iter().map(|d| d.to_graphql_error()));

        debug!(
            denials = state.denials().len(),
            errors = errors.len(),
            has_data = result.data.is_some(),
            "Finalized authorization"
        );

        match result.data {
            Some(data) => Ok(ExecutionResult {
                data: Some(data),
                errors,
                extensions: result.extensions,
            }),
            None => Ok(ExecutionResult::from_errors(errors)),
        }
    }

    /// Run a request through the whole lifecycle
    pub async fn execute<E>(
        &self,
        request: &ExecutionRequest,
        executor: &E,
    ) -> Result<ExecutionResult, AuthzError>
    where
        E: QueryExecutor + ?Sized,
    {
        let mut state = self.create_state(request);
        let enforced = self.enforce(&mut state, request)?;
        let result = executor
            .execute(
                &enforced.document,
                enforced.operation_name.as_deref(),
                &request.variables,
            )
            .await;
        self.mark_executed(&mut state)?;
        self.finalize(&mut state, result)
    }
}
