//! Redaction engine
//!
//! Rewrites a query document so that it only selects fields the caller's
//! verifier allows. The executed operation and every fragment definition
//! are each redacted once, in document order, as independent traversal
//! roots; a spread is kept as-is and resolves to the redacted fragment.

use crate::access_control::PermissionVerifier;
use crate::config::EmptySelectionPolicy;
use crate::enforcement::extension::AuthorizationExtension;
use crate::enforcement::result::Location;
use crate::error::QueryError;
use crate::introspection;
use crate::query::{
    QueryDocument, is_meta_field, operation_kind, operation_name, response_key, selection_set,
    selection_set_mut,
};
use crate::redaction::denial::{DenialError, DenialReason, FieldPath, RedactionRoot};
use crate::redaction::prune;
use crate::schema::{OperationKind, Schema};
use graphql_parser::query::{
    Definition, Document, Field, FragmentDefinition, FragmentSpread, InlineFragment,
    OperationDefinition, Selection, SelectionSet, TypeCondition,
};
use tracing::{debug, trace};

/// The rewritten document and the denials found while rewriting it
#[derive(Debug, Clone)]
pub struct Redaction {
    pub document: QueryDocument,
    /// Denials in document order
    pub errors: Vec<DenialError>,
}

impl Redaction {
    /// True when at least one field was removed
    pub fn has_denials(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Field-level query rewriter bound to one verifier
pub struct RedactionEngine<'r> {
    schema: &'r Schema,
    verifier: &'r PermissionVerifier,
    extension: Option<&'r dyn AuthorizationExtension>,
    policy: EmptySelectionPolicy,
}

impl<'r> RedactionEngine<'r> {
    pub fn new(schema: &'r Schema, verifier: &'r PermissionVerifier) -> Self {
        Self {
            schema,
            verifier,
            extension: None,
            policy: EmptySelectionPolicy::default(),
        }
    }

    /// Consult an extension after the static rules allow a field
    pub fn with_extension(mut self, extension: &'r dyn AuthorizationExtension) -> Self {
        self.extension = Some(extension);
        self
    }

    pub fn with_policy(mut self, policy: EmptySelectionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Redact the operation named `operation_name` (or the only operation)
    /// together with every fragment definition.
    ///
    /// Operations other than the selected one are dropped from the output.
    pub fn redact(
        &self,
        document: &QueryDocument,
        operation_name: Option<&str>,
    ) -> Result<Redaction, QueryError> {
        let selected = select_operation(document, operation_name)?;
        let mut errors = Vec::new();
        let mut definitions = Vec::with_capacity(document.definitions.len());

        for (position, definition) in document.definitions.iter().enumerate() {
            match definition {
                Definition::Operation(operation) if position == selected => {
                    let mut walker = Walker::new(
                        self,
                        RedactionRoot::Operation {
                            name: crate::query::operation_name(operation).map(String::from),
                        },
                        &mut errors,
                    );
                    let redacted = walker.redact_operation(operation);
                    definitions.push(Definition::Operation(redacted));
                }
                Definition::Operation(_) => {}
                Definition::Fragment(fragment) => {
                    let mut walker = Walker::new(
                        self,
                        RedactionRoot::Fragment {
                            name: fragment.name.clone(),
                        },
                        &mut errors,
                    );
                    let redacted = walker.redact_fragment_definition(fragment);
                    definitions.push(Definition::Fragment(redacted));
                }
            }
        }

        let mut document = Document { definitions };
        if self.policy == EmptySelectionPolicy::Prune {
            prune::prune_document(&mut document);
        }

        debug!(
            denials = errors.len(),
            clients = ?self.verifier.clients(),
            "Redacted query document"
        );

        Ok(Redaction { document, errors })
    }

    fn denial_reason(
        &self,
        parent_type: &str,
        field: &Field<'static, String>,
    ) -> Option<DenialReason> {
        if !self.verifier.is_field_allowed(parent_type, &field.name) {
            return Some(DenialReason::NotPermitted);
        }
        if let Some(extension) = self.extension
            && !extension.is_field_authorized(parent_type, field)
        {
            return Some(DenialReason::Extension);
        }
        None
    }
}

/// Index of the operation that will execute
fn select_operation(document: &QueryDocument, name: Option<&str>) -> Result<usize, QueryError> {
    let operations: Vec<(usize, &OperationDefinition<'static, String>)> = document
        .definitions
        .iter()
        .enumerate()
        .filter_map(|(position, definition)| match definition {
            Definition::Operation(operation) => Some((position, operation)),
            Definition::Fragment(_) => None,
        })
        .collect();

    match name {
        Some(name) => operations
            .iter()
            .find(|(_, operation)| operation_name(operation) == Some(name))
            .map(|(position, _)| *position)
            .ok_or_else(|| QueryError::UnknownOperation(name.to_string())),
        None => match operations.as_slice() {
            [] => Err(QueryError::NoOperation),
            [(position, _)] => Ok(*position),
            _ => Err(QueryError::AmbiguousOperation),
        },
    }
}

/// One traversal root's worth of redaction state
struct Walker<'e, 'r> {
    engine: &'e RedactionEngine<'r>,
    root: RedactionRoot,
    /// Response keys from the root to the current selection set
    path: Vec<String>,
    errors: &'e mut Vec<DenialError>,
}

impl<'e, 'r> Walker<'e, 'r> {
    fn new(
        engine: &'e RedactionEngine<'r>,
        root: RedactionRoot,
        errors: &'e mut Vec<DenialError>,
    ) -> Self {
        Self {
            engine,
            root,
            path: Vec::new(),
            errors,
        }
    }

    fn prune_emptied(&self) -> bool {
        self.engine.policy == EmptySelectionPolicy::Prune
    }

    fn redact_operation(
        &mut self,
        operation: &OperationDefinition<'static, String>,
    ) -> OperationDefinition<'static, String> {
        let kind = operation_kind(operation);
        // A root the schema lacks has no permitted fields
        let root_type = self
            .engine
            .schema
            .root_type(kind)
            .unwrap_or(default_root_name(kind))
            .to_string();
        let redacted = self.redact_selection_set(&root_type, selection_set(operation));

        let mut operation = operation.clone();
        *selection_set_mut(&mut operation) = redacted;
        operation
    }

    fn redact_fragment_definition(
        &mut self,
        fragment: &FragmentDefinition<'static, String>,
    ) -> FragmentDefinition<'static, String> {
        let TypeCondition::On(type_name) = &fragment.type_condition;
        // Only spread below introspection entry points, which are never redacted
        if introspection::is_introspection_type(type_name) {
            let mut fragment = fragment.clone();
            introspection::select_nested_names(type_name, &mut fragment.selection_set);
            return fragment;
        }

        FragmentDefinition {
            position: fragment.position,
            name: fragment.name.clone(),
            type_condition: fragment.type_condition.clone(),
            directives: fragment.directives.clone(),
            selection_set: self.redact_selection_set(type_name, &fragment.selection_set),
        }
    }

    fn redact_selection_set(
        &mut self,
        parent_type: &str,
        set: &SelectionSet<'static, String>,
    ) -> SelectionSet<'static, String> {
        let items = set
            .items
            .iter()
            .filter_map(|selection| self.redact_selection(parent_type, selection))
            .collect();
        SelectionSet {
            span: set.span,
            items,
        }
    }

    /// `None` removes the selection
    fn redact_selection(
        &mut self,
        parent_type: &str,
        selection: &Selection<'static, String>,
    ) -> Option<Selection<'static, String>> {
        match selection {
            Selection::Field(field) => self.redact_field(parent_type, field).map(Selection::Field),
            Selection::InlineFragment(fragment) => self
                .redact_inline_fragment(parent_type, fragment)
                .map(Selection::InlineFragment),
            Selection::FragmentSpread(spread) => {
                Some(Selection::FragmentSpread(redact_fragment_spread(spread)))
            }
        }
    }

    fn redact_field(
        &mut self,
        parent_type: &str,
        field: &Field<'static, String>,
    ) -> Option<Field<'static, String>> {
        if is_meta_field(&field.name) {
            let mut field = field.clone();
            introspection::select_entry_names(&mut field);
            return Some(field);
        }

        if let Some(reason) = self.engine.denial_reason(parent_type, field) {
            self.deny(parent_type, field, reason);
            return None;
        }

        let Some(definition) = self.engine.schema.field(parent_type, &field.name) else {
            self.deny(parent_type, field, DenialReason::NotPermitted);
            return None;
        };

        let selection_set = if field.selection_set.items.is_empty() {
            field.selection_set.clone()
        } else {
            let return_type = definition.type_name.clone();
            self.path.push(response_key(field).to_string());
            let redacted = self.redact_selection_set(&return_type, &field.selection_set);
            self.path.pop();
            if redacted.items.is_empty() && self.prune_emptied() {
                return None;
            }
            redacted
        };

        Some(Field {
            position: field.position,
            alias: field.alias.clone(),
            name: field.name.clone(),
            arguments: field.arguments.clone(),
            directives: field.directives.clone(),
            selection_set,
        })
    }

    fn redact_inline_fragment(
        &mut self,
        parent_type: &str,
        fragment: &InlineFragment<'static, String>,
    ) -> Option<InlineFragment<'static, String>> {
        let type_name = match &fragment.type_condition {
            Some(TypeCondition::On(type_name)) => type_name.as_str(),
            None => parent_type,
        };
        let selection_set = self.redact_selection_set(type_name, &fragment.selection_set);
        if selection_set.items.is_empty() && self.prune_emptied() {
            return None;
        }

        Some(InlineFragment {
            position: fragment.position,
            type_condition: fragment.type_condition.clone(),
            directives: fragment.directives.clone(),
            selection_set,
        })
    }

    fn deny(&mut self, parent_type: &str, field: &Field<'static, String>, reason: DenialReason) {
        let mut path = self.path.clone();
        path.push(response_key(field).to_string());
        let denial = DenialError {
            root: self.root.clone(),
            path: FieldPath::new(path),
            parent_type: parent_type.to_string(),
            field: field.name.clone(),
            location: Location {
                line: field.position.line,
                column: field.position.column,
            },
            reason,
        };
        trace!(
            parent_type = %denial.parent_type,
            field = %denial.field,
            path = %denial.path,
            reason = ?reason,
            "Field denied"
        );
        self.errors.push(denial);
    }
}

/// Spreads are resolved against the redacted fragment definition
fn redact_fragment_spread(
    spread: &FragmentSpread<'static, String>,
) -> FragmentSpread<'static, String> {
    spread.clone()
}

fn default_root_name(kind: OperationKind) -> &'static str {
    match kind {
        OperationKind::Query => "Query",
        OperationKind::Mutation => "Mutation",
        OperationKind::Subscription => "Subscription",
    }
}
