//! Compiled permission rules
//!
//! A [`PermissionSet`] is the set of `(parent type, field)` pairs a client's
//! declarations reach, plus the types those declarations make visible.
//! Inserting a rule twice is a no-op.

use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;

/// A single `(parent type, field) → permitted` fact
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PermissionRule {
    pub parent_type: String,
    pub field: String,
}

impl PermissionRule {
    pub fn new(parent_type: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            parent_type: parent_type.into(),
            field: field.into(),
        }
    }
}

impl fmt::Display for PermissionRule {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.parent_type, self.field)
    }
}

/// Field permissions and visible types for one client (or a union of clients)
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PermissionSet {
    fields: HashMap<String, HashSet<String>>,
    types: HashSet<String>,
}

impl PermissionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Permit a field; returns `false` if it was already permitted
    pub fn permit(&mut self, parent_type: &str, field: &str) -> bool {
        self.fields
            .entry(parent_type.to_string())
            .or_default()
            .insert(field.to_string())
    }

    /// Mark a type visible; returns `false` if it already was
    pub fn mark_visible(&mut self, type_name: &str) -> bool {
        self.types.insert(type_name.to_string())
    }

    pub fn is_permitted(&self, parent_type: &str, field: &str) -> bool {
        self.fields
            .get(parent_type)
            .is_some_and(|fields| fields.contains(field))
    }

    pub fn is_visible(&self, type_name: &str) -> bool {
        self.types.contains(type_name)
    }

    /// Add every rule and visible type of `other`
    pub fn merge(&mut self, other: &PermissionSet) {
        for (parent_type, fields) in &other.fields {
            self.fields
                .entry(parent_type.clone())
                .or_default()
                .extend(fields.iter().cloned());
        }
        self.types.extend(other.types.iter().cloned());
    }

    /// All rules, sorted by type then field
    pub fn rules(&self) -> Vec<PermissionRule> {
        let sorted: BTreeSet<PermissionRule> = self
            .fields
            .iter()
            .flat_map(|(parent_type, fields)| {
                fields
                    .iter()
                    .map(move |field| PermissionRule::new(parent_type.clone(), field.clone()))
            })
            .collect();
        sorted.into_iter().collect()
    }

    /// Visible type names, sorted
    pub fn visible_types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.types.iter().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn rule_count(&self) -> usize {
        self.fields.values().map(HashSet::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.rule_count() == 0
    }
}
