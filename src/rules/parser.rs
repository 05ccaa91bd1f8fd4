//! Allowed-query rule parser
//!
//! Compiles a client's allowed-query declarations into a [`PermissionSet`]
//! by walking each declaration against the schema:
//!
//! - a field permits `(parent type, field)` and continues with its return type
//! - an inline fragment continues with its type condition
//! - a fragment spread is inlined from the declaration's own fragments
//!
//! Any type, field or fragment the schema (or the declaration) does not
//! define is a configuration error.

use crate::error::{RuleError, RuleResult};
use crate::query;
use crate::rules::permissions::PermissionSet;
use crate::schema::{FieldDef, Schema, TypeKind};
use graphql_parser::query::{
    Definition, Document, FragmentDefinition, Selection, SelectionSet, TypeCondition,
};
use std::collections::{HashMap, HashSet};
use tracing::{debug, trace};

/// Compiles allowed-query declarations against one schema
pub struct QueryRuleParser<'s> {
    schema: &'s Schema,
}

impl<'s> QueryRuleParser<'s> {
    pub fn new(schema: &'s Schema) -> Self {
        Self { schema }
    }

    /// Compile all of a client's declarations into one permission set
    pub fn parse(&self, client: &str, declarations: &[String]) -> RuleResult<PermissionSet> {
        let mut permissions = PermissionSet::new();
        for declaration in declarations {
            self.parse_declaration(client, declaration, &mut permissions)?;
        }

        debug!(
            client,
            declarations = declarations.len(),
            rules = permissions.rule_count(),
            "Compiled client rules"
        );
        Ok(permissions)
    }

    /// Compile one declaration, adding its rules to `permissions`
    pub fn parse_declaration(
        &self,
        client: &str,
        declaration: &str,
        permissions: &mut PermissionSet,
    ) -> RuleResult<()> {
        let document = graphql_parser::parse_query::<String>(declaration)
            .map(Document::into_static)
            .map_err(|e| RuleError::Parse {
                client: client.to_string(),
                reason: e.to_string(),
            })?;

        let fragments: HashMap<&str, &FragmentDefinition<'static, String>> = document
            .definitions
            .iter()
            .filter_map(|definition| match definition {
                Definition::Fragment(fragment) => Some((fragment.name.as_str(), fragment)),
                Definition::Operation(_) => None,
            })
            .collect();

        let mut walker = DeclarationWalker {
            schema: self.schema,
            client,
            fragments,
            permissions,
            in_progress: Vec::new(),
            inlined: HashSet::new(),
        };

        for definition in &document.definitions {
            if let Definition::Operation(operation) = definition {
                let kind = query::operation_kind(operation);
                let root = self
                    .schema
                    .root_type(kind)
                    .ok_or_else(|| RuleError::MissingRootType {
                        client: client.to_string(),
                        operation: kind.to_string(),
                    })?;
                walker.permissions.mark_visible(root);
                walker.walk(root, query::selection_set(operation))?;
            }
        }

        Ok(())
    }
}

/// Walks one declaration document
struct DeclarationWalker<'w, 'd> {
    schema: &'w Schema,
    client: &'w str,
    fragments: HashMap<&'d str, &'d FragmentDefinition<'static, String>>,
    permissions: &'w mut PermissionSet,
    /// Fragments currently being inlined, for cycle detection
    in_progress: Vec<&'d str>,
    /// Fragments already inlined; a fragment's rules do not depend on the spread site
    inlined: HashSet<&'d str>,
}

impl<'w, 'd> DeclarationWalker<'w, 'd> {
    fn walk(
        &mut self,
        parent_type: &str,
        selection_set: &'d SelectionSet<'static, String>,
    ) -> RuleResult<()> {
        for selection in &selection_set.items {
            match selection {
                Selection::Field(field) => {
                    if query::is_meta_field(&field.name) {
                        continue;
                    }
                    let def = self.lookup_field(parent_type, &field.name)?;
                    self.permit_field(parent_type, def);
                    let return_type = def.type_name.as_str();
                    if !field.selection_set.items.is_empty() {
                        self.walk(return_type, &field.selection_set)?;
                    }
                }
                Selection::InlineFragment(fragment) => {
                    let target = match &fragment.type_condition {
                        Some(TypeCondition::On(name)) => self.require_type(name)?,
                        None => parent_type,
                    };
                    self.walk(target, &fragment.selection_set)?;
                }
                Selection::FragmentSpread(spread) => {
                    self.inline_fragment(&spread.fragment_name)?;
                }
            }
        }
        Ok(())
    }

    fn inline_fragment(&mut self, name: &str) -> RuleResult<()> {
        let fragment = *self
            .fragments
            .get(name)
            .ok_or_else(|| RuleError::UnknownFragment {
                client: self.client.to_string(),
                name: name.to_string(),
            })?;
        let name = fragment.name.as_str();

        if self.in_progress.contains(&name) {
            return Err(RuleError::FragmentCycle {
                client: self.client.to_string(),
                name: name.to_string(),
            });
        }
        if self.inlined.contains(name) {
            return Ok(());
        }

        let TypeCondition::On(type_name) = &fragment.type_condition;
        let target = self.require_type(type_name)?;

        trace!(client = self.client, fragment = name, "Inlining fragment");
        self.in_progress.push(name);
        let result = self.walk(target, &fragment.selection_set);
        self.in_progress.pop();
        result?;

        self.inlined.insert(name);
        Ok(())
    }

    fn lookup_field(&self, parent_type: &str, field: &str) -> RuleResult<&'w FieldDef> {
        let schema: &'w Schema = self.schema;
        schema
            .field(parent_type, field)
            .ok_or_else(|| RuleError::UnknownField {
                client: self.client.to_string(),
                type_name: parent_type.to_string(),
                field: field.to_string(),
            })
    }

    /// Check a type condition exists and mark it visible
    fn require_type<'n>(&mut self, name: &'n str) -> RuleResult<&'n str> {
        if !self.schema.contains_type(name) {
            return Err(RuleError::UnknownType {
                client: self.client.to_string(),
                type_name: name.to_string(),
            });
        }
        self.permissions.mark_visible(name);
        Ok(name)
    }

    /// Permit a field and make its return and argument types visible
    fn permit_field(&mut self, parent_type: &str, def: &FieldDef) {
        trace!(
            client = self.client,
            parent_type,
            field = %def.name,
            "Permitting field"
        );
        self.permissions.permit(parent_type, &def.name);
        self.permissions.mark_visible(&def.type_name);
        for argument in &def.arguments {
            self.mark_input_visible(&argument.type_name);
        }
    }

    fn mark_input_visible(&mut self, type_name: &str) {
        if !self.permissions.mark_visible(type_name) {
            return;
        }
        let schema: &'w Schema = self.schema;
        if let Some(def) = schema.get_type(type_name)
            && def.kind == TypeKind::InputObject
        {
            for input in &def.input_fields {
                self.mark_input_visible(&input.type_name);
            }
        }
    }
}
