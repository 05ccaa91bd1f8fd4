//! Access control integration tests
//!
//! Covers:
//! - Default-deny for everything no selected client declares
//! - Permissive union across the clients a scope set selects
//! - Scope selection by client identifier and by scope pattern
//! - Verifier caching, including concurrent lookups

use gql_authz::access_control::{AuthorizationIndex, ScopeSet, VerifierFactory};
use gql_authz::config::{CacheConfig, ClientConfig};
use gql_authz::error::{ConfigError, RuleError};
use gql_authz::schema::Schema;
use rstest::rstest;
use std::collections::BTreeMap;
use std::sync::Arc;

// =============================================================================
// Test Helpers
// =============================================================================

const SDL: &str = r#"
    type Query {
        user(id: ID): User
        orders(first: Int, filter: OrderFilter): [Order]
    }
    type User { id: ID! name: String ssn: String orders: [Order] }
    type Order { id: ID! total: Float owner: User }
    input OrderFilter { status: Status }
    enum Status { OPEN CLOSED }
"#;

fn schema() -> Arc<Schema> {
    Arc::new(Schema::parse(SDL).unwrap())
}

fn index() -> Arc<AuthorizationIndex> {
    let clients = BTreeMap::from([
        (
            "public".to_string(),
            ClientConfig::new(["{ user { id name } }"]),
        ),
        (
            "billing".to_string(),
            ClientConfig::new(["{ orders(filter: {}) { id total } }"]),
        ),
        (
            "support".to_string(),
            ClientConfig::new(["{ user { ssn orders { id owner { id } } } }"])
                .with_scopes(["support:.*", "admin"]),
        ),
    ]);
    Arc::new(AuthorizationIndex::build(schema(), &clients).unwrap())
}

fn scopes(values: &[&str]) -> ScopeSet {
    values.iter().copied().collect()
}

// =============================================================================
// 1. Default-deny
// =============================================================================

mod default_deny {
    use super::*;

    #[rstest]
    #[case("Query", "orders")]
    #[case("User", "ssn")]
    #[case("User", "orders")]
    #[case("Order", "id")]
    #[case("Missing", "field")]
    fn test_undeclared_pairs_are_denied(#[case] parent: &str, #[case] field: &str) {
        let verifier = index().build_verifier(&scopes(&["public"]));
        assert!(!verifier.is_field_allowed(parent, field));
    }

    #[test]
    fn test_no_scopes_deny_everything() {
        let verifier = index().build_verifier(&ScopeSet::new());
        assert!(verifier.is_deny_all());
        assert!(!verifier.is_field_allowed("Query", "user"));
        assert!(verifier.clients().is_empty());
    }
}

// =============================================================================
// 2. Permissive union
// =============================================================================

mod permissive_union {
    use super::*;

    #[rstest]
    #[case(&["public"], "User", "name", true)]
    #[case(&["public"], "User", "ssn", false)]
    #[case(&["public", "support:tier1"], "User", "ssn", true)]
    #[case(&["public", "support:tier1"], "User", "name", true)]
    #[case(&["public", "billing"], "Order", "total", true)]
    #[case(&["support:tier1"], "Order", "total", false)]
    fn test_union_of_selected_clients(
        #[case] scope_values: &[&str],
        #[case] parent: &str,
        #[case] field: &str,
        #[case] expected: bool,
    ) {
        let verifier = index().build_verifier(&scopes(scope_values));
        assert_eq!(verifier.is_field_allowed(parent, field), expected);
    }

    #[test]
    fn test_contributing_clients_are_listed() {
        let verifier = index().build_verifier(&scopes(&["billing", "public", "admin"]));
        assert_eq!(verifier.clients(), ["billing", "public", "support"]);
    }
}

// =============================================================================
// 3. Scope selection
// =============================================================================

mod scope_selection {
    use super::*;

    #[rstest]
    #[case(&["public"], &["public"])]
    #[case(&["support:tier2"], &["support"])]
    #[case(&["admin"], &["support"])]
    // Patterns are anchored
    #[case(&["xsupport:tier2"], &[])]
    #[case(&["administrator"], &[])]
    // With patterns configured, the identifier no longer selects
    #[case(&["support"], &[])]
    #[case(&["unknown"], &[])]
    fn test_clients_for(#[case] scope_values: &[&str], #[case] expected: &[&str]) {
        let index = index();
        assert_eq!(index.clients_for(&scopes(scope_values)), expected);
    }
}

// =============================================================================
// 4. Visible types
// =============================================================================

mod visible_types {
    use super::*;

    #[test]
    fn test_argument_input_types_are_visible() {
        let verifier = index().build_verifier(&scopes(&["billing"]));
        assert!(verifier.is_type_visible("Order"));
        assert!(verifier.is_type_visible("OrderFilter"));
        assert!(verifier.is_type_visible("Status"));
        assert!(!verifier.is_type_visible("User"));
    }

    #[test]
    fn test_builtin_types_are_always_visible() {
        let verifier = index().build_verifier(&ScopeSet::new());
        assert!(verifier.is_type_visible("Boolean"));
        assert!(verifier.is_type_visible("__Type"));
    }
}

// =============================================================================
// 5. Index construction
// =============================================================================

mod construction {
    use super::*;

    #[test]
    fn test_empty_client_mapping_is_fatal() {
        let err = AuthorizationIndex::build(schema(), &BTreeMap::new()).unwrap_err();
        assert!(matches!(err, ConfigError::EmptyClients));
        assert_eq!(err.to_string(), "Clients missing from authorization configuration");
    }

    #[rstest]
    #[case("{ account { id } }")]
    #[case("{ user { email } }")]
    #[case("{ user { ...Missing } }")]
    #[case("{ user { ... on Account { id } } }")]
    #[case("mutation { rename }")]
    #[case("{ user { id }")]
    fn test_invalid_declarations_are_fatal(#[case] declaration: &str) {
        let clients = BTreeMap::from([("public".to_string(), ClientConfig::new([declaration]))]);
        let err = AuthorizationIndex::build(schema(), &clients).unwrap_err();
        assert!(matches!(err, ConfigError::Rule(_)), "{}", err);
    }

    #[test]
    fn test_rule_error_names_client() {
        let clients = BTreeMap::from([(
            "public".to_string(),
            ClientConfig::new(["{ user { email } }"]),
        )]);
        let err = AuthorizationIndex::build(schema(), &clients).unwrap_err();
        let ConfigError::Rule(RuleError::UnknownField {
            client,
            type_name,
            field,
        }) = err
        else {
            panic!("expected an unknown field error, got {}", err);
        };
        assert_eq!(
            (client.as_str(), type_name.as_str(), field.as_str()),
            ("public", "User", "email")
        );
    }
}

// =============================================================================
// 6. Verifier cache
// =============================================================================

mod verifier_cache {
    use super::*;

    #[test]
    fn test_permuted_scopes_share_verifier() {
        let factory = VerifierFactory::new(index(), CacheConfig::default());
        let first = factory.verifier_for(&scopes(&["public", "billing"]));
        let second = factory.verifier_for(&scopes(&["billing", "public", "billing"]));
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(factory.stats().entries, 1);
    }

    #[test]
    fn test_distinct_scopes_get_distinct_verifiers() {
        let factory = VerifierFactory::new(index(), CacheConfig::default());
        let public = factory.verifier_for(&scopes(&["public"]));
        let billing = factory.verifier_for(&scopes(&["billing"]));
        assert!(!Arc::ptr_eq(&public, &billing));
        assert_eq!(factory.stats().entries, 2);
    }

    #[test]
    fn test_concurrent_lookups_converge() {
        let factory = VerifierFactory::new(index(), CacheConfig::default());
        let key = scopes(&["public", "support:tier1"]);

        let verifiers: Vec<_> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..8)
                .map(|_| s.spawn(|| factory.verifier_for(&key)))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let cached = factory.verifier_for(&key);
        assert!(verifiers.iter().all(|v| Arc::ptr_eq(v, &cached)));
        assert_eq!(factory.stats().entries, 1);
        assert_eq!(factory.stats().hits + factory.stats().misses, 9);
    }
}
