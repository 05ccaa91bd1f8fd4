//! Authorization index
//!
//! Compiles every client's declarations once, at startup, and keeps the
//! results bound to the schema they were compiled against. The index is
//! immutable; per-scope verifiers are derived from it.

use crate::access_control::patterns::PatternMatcher;
use crate::access_control::scopes::ScopeSet;
use crate::access_control::verifier::PermissionVerifier;
use crate::config::ClientConfig;
use crate::error::ConfigError;
use crate::rules::{PermissionSet, QueryRuleParser};
use crate::schema::Schema;
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Compiled rules of every configured client
#[derive(Debug)]
pub struct AuthorizationIndex {
    schema: Arc<Schema>,
    /// Sorted by client identifier
    clients: Vec<CompiledClient>,
}

/// Compiled client configuration
#[derive(Debug)]
struct CompiledClient {
    id: String,
    scopes: PatternMatcher,
    permissions: PermissionSet,
}

impl CompiledClient {
    /// A client without scope patterns is selected by its own identifier
    fn selected_by(&self, scopes: &ScopeSet) -> bool {
        if self.scopes.is_empty() {
            return scopes.contains(&self.id);
        }

        let matched = scopes
            .iter()
            .find_map(|scope| self.scopes.find_match(scope).map(|pattern| (scope, pattern)));
        match matched {
            Some((scope, pattern)) => {
                debug!(client = %self.id, scope, pattern, "Scope selects client");
                true
            }
            None => false,
        }
    }
}

impl AuthorizationIndex {
    /// Compile the client mapping against a schema
    ///
    /// Fails when the mapping is empty, when a client declares no queries,
    /// and when a declaration references anything the schema lacks.
    pub fn build(
        schema: Arc<Schema>,
        clients: &BTreeMap<String, ClientConfig>,
    ) -> Result<Self, ConfigError> {
        if clients.is_empty() {
            return Err(ConfigError::EmptyClients);
        }

        let parser = QueryRuleParser::new(&schema);
        let mut compiled = Vec::with_capacity(clients.len());
        for (id, client) in clients {
            if client.queries.is_empty() {
                return Err(ConfigError::Missing {
                    field: format!("clients.{}.queries", id),
                });
            }
            compiled.push(CompiledClient {
                id: id.clone(),
                scopes: PatternMatcher::new(&client.scopes)?,
                permissions: parser.parse(id, &client.queries)?,
            });
        }

        info!(
            clients = compiled.len(),
            rules = compiled
                .iter()
                .map(|c| c.permissions.rule_count())
                .sum::<usize>(),
            "Built authorization index"
        );

        Ok(Self {
            schema,
            clients: compiled,
        })
    }

    /// The schema the rules were compiled against
    pub fn schema(&self) -> &Arc<Schema> {
        &self.schema
    }

    pub fn client_ids(&self) -> impl Iterator<Item = &str> {
        self.clients.iter().map(|c| c.id.as_str())
    }

    /// A client's compiled permissions
    pub fn permissions(&self, client: &str) -> Option<&PermissionSet> {
        self.clients
            .iter()
            .find(|c| c.id == client)
            .map(|c| &c.permissions)
    }

    /// Identifiers of the clients a scope set selects, sorted
    pub fn clients_for(&self, scopes: &ScopeSet) -> Vec<&str> {
        self.clients
            .iter()
            .filter(|c| c.selected_by(scopes))
            .map(|c| c.id.as_str())
            .collect()
    }

    /// Build an (uncached) verifier for a scope set
    pub fn build_verifier(&self, scopes: &ScopeSet) -> PermissionVerifier {
        let selected: Vec<&CompiledClient> =
            self.clients.iter().filter(|c| c.selected_by(scopes)).collect();

        if selected.is_empty() {
            warn!(scopes = %scopes, "No client matches scopes; denying all fields");
        }

        PermissionVerifier::from_clients(
            selected
                .into_iter()
                .map(|c| (c.id.as_str(), &c.permissions)),
        )
    }

    pub fn len(&self) -> usize {
        self.clients.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clients.is_empty()
    }
}
