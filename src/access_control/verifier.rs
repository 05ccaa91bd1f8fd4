//! Permission verifier
//!
//! The merged, scope-bound permission predicate used for one request.

use crate::rules::PermissionSet;
use crate::schema::Schema;

/// Answers whether a caller may select a field
///
/// Built by unioning the permission sets of every client selected by a
/// scope set: a field is allowed when *any* of those clients permits it.
/// Pairs no client permits are denied.
#[derive(Debug, Clone, Default)]
pub struct PermissionVerifier {
    /// Contributing client identifiers, sorted
    clients: Vec<String>,
    permissions: PermissionSet,
}

impl PermissionVerifier {
    /// Union the permission sets of the given clients
    pub fn from_clients<'a, I>(clients: I) -> Self
    where
        I: IntoIterator<Item = (&'a str, &'a PermissionSet)>,
    {
        let mut verifier = Self::default();
        for (client, permissions) in clients {
            verifier.clients.push(client.to_string());
            verifier.permissions.merge(permissions);
        }
        verifier.clients.sort();
        verifier
    }

    /// A verifier that allows nothing
    pub fn deny_all() -> Self {
        Self::default()
    }

    /// Whether `field` may be selected on `parent_type`
    pub fn is_field_allowed(&self, parent_type: &str, field: &str) -> bool {
        self.permissions.is_permitted(parent_type, field)
    }

    /// Whether a type may be listed by introspection.
    ///
    /// Introspection types and built-in scalars are always visible.
    pub fn is_type_visible(&self, type_name: &str) -> bool {
        type_name.starts_with("__")
            || Schema::is_builtin_scalar(type_name)
            || self.permissions.is_visible(type_name)
    }

    pub fn clients(&self) -> &[String] {
        &self.clients
    }

    pub fn permissions(&self) -> &PermissionSet {
        &self.permissions
    }

    /// True when no client contributed any rule
    pub fn is_deny_all(&self) -> bool {
        self.permissions.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn set(rules: &[(&str, &str)]) -> PermissionSet {
        let mut set = PermissionSet::new();
        for (parent, field) in rules {
            set.permit(parent, field);
            set.mark_visible(parent);
        }
        set
    }

    #[test]
    fn test_deny_all() {
        let verifier = PermissionVerifier::deny_all();
        assert!(verifier.is_deny_all());
        assert!(!verifier.is_field_allowed("Query", "user"));
        assert!(!verifier.is_type_visible("User"));
    }

    #[test]
    fn test_union_of_clients() {
        let a = set(&[("Query", "user"), ("User", "id")]);
        let b = set(&[("User", "ssn")]);
        let verifier = PermissionVerifier::from_clients([("b", &b), ("a", &a)]);

        assert!(verifier.is_field_allowed("User", "id"));
        assert!(verifier.is_field_allowed("User", "ssn"));
        assert!(!verifier.is_field_allowed("User", "email"));
        assert_eq!(verifier.clients(), ["a", "b"]);
    }

    #[test]
    fn test_builtin_and_introspection_types_are_visible() {
        let verifier = PermissionVerifier::deny_all();
        assert!(verifier.is_type_visible("String"));
        assert!(verifier.is_type_visible("__Schema"));
        assert!(!verifier.is_type_visible("DateTime"));
    }
}
