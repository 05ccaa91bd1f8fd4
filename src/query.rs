//! Query document helpers
//!
//! Thin accessors over `graphql-parser`'s executable document AST shared by
//! the rule parser and the redaction engine.

use crate::error::QueryError;
use crate::schema::OperationKind;
use graphql_parser::query::{Document, Field, OperationDefinition, SelectionSet};

/// An owned, parsed executable document
pub type QueryDocument = Document<'static, String>;

/// Parse an executable document into its owned form
pub fn parse_query(source: &str) -> Result<QueryDocument, QueryError> {
    graphql_parser::parse_query::<String>(source)
        .map(Document::into_static)
        .map_err(|e| QueryError::Parse(e.to_string()))
}

/// Introspection meta-fields (`__typename`, `__schema`, `__type`)
pub fn is_meta_field(name: &str) -> bool {
    name.starts_with("__")
}

/// The key a field's value is returned under: its alias, or its name
pub fn response_key<'f>(field: &'f Field<'_, String>) -> &'f str {
    field.alias.as_deref().unwrap_or(&field.name)
}

pub fn operation_kind(operation: &OperationDefinition<'_, String>) -> OperationKind {
    match operation {
        OperationDefinition::SelectionSet(_) | OperationDefinition::Query(_) => {
            OperationKind::Query
        }
        OperationDefinition::Mutation(_) => OperationKind::Mutation,
        OperationDefinition::Subscription(_) => OperationKind::Subscription,
    }
}

pub fn operation_name<'o>(operation: &'o OperationDefinition<'_, String>) -> Option<&'o str> {
    match operation {
        OperationDefinition::SelectionSet(_) => None,
        OperationDefinition::Query(query) => query.name.as_deref(),
        OperationDefinition::Mutation(mutation) => mutation.name.as_deref(),
        OperationDefinition::Subscription(subscription) => subscription.name.as_deref(),
    }
}

pub fn selection_set<'o, 'a>(
    operation: &'o OperationDefinition<'a, String>,
) -> &'o SelectionSet<'a, String> {
    match operation {
        OperationDefinition::SelectionSet(set) => set,
        OperationDefinition::Query(query) => &query.selection_set,
        OperationDefinition::Mutation(mutation) => &mutation.selection_set,
        OperationDefinition::Subscription(subscription) => &subscription.selection_set,
    }
}

pub fn selection_set_mut<'o, 'a>(
    operation: &'o mut OperationDefinition<'a, String>,
) -> &'o mut SelectionSet<'a, String> {
    match operation {
        OperationDefinition::SelectionSet(set) => set,
        OperationDefinition::Query(query) => &mut query.selection_set,
        OperationDefinition::Mutation(mutation) => &mut mutation.selection_set,
        OperationDefinition::Subscription(subscription) => &mut subscription.selection_set,
    }
}
