//! Filtering of resolved introspection values

use crate::access_control::PermissionVerifier;
use crate::enforcement::executor::{DataFetcher, FieldCoordinates};
use crate::enforcement::result::GraphQLError;
use crate::introspection::names::NAME_KEY;
use crate::query::is_meta_field;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use tracing::trace;

const TYPE_LISTS: &[&str] = &["possibleTypes", "interfaces"];
const OPTIONAL_ROOTS: &[&str] = &["mutationType", "subscriptionType"];

/// Name of a resolved `__Type` or `__Field` object
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Name<'v> {
    Named(&'v str),
    /// `null`: a list or non-null wrapper type
    Unnamed,
    /// Neither the name key nor `name` was selected
    Unknown,
}

fn name_of(object: &Map<String, Value>) -> Name<'_> {
    match object.get(NAME_KEY).or_else(|| object.get("name")) {
        Some(Value::String(name)) => Name::Named(name),
        Some(Value::Null) => Name::Unnamed,
        _ => Name::Unknown,
    }
}

/// Filters raw introspection results for one verifier
#[derive(Debug, Clone)]
pub struct IntrospectionFilter {
    verifier: Arc<PermissionVerifier>,
}

impl IntrospectionFilter {
    pub fn new(verifier: Arc<PermissionVerifier>) -> Self {
        Self { verifier }
    }

    /// Filter the resolved value of an introspection entry point.
    ///
    /// Values of other fields are returned unchanged.
    pub fn filter(&self, field_name: &str, value: Value) -> Value {
        match (field_name, value) {
            ("__schema", Value::Object(schema)) => Value::Object(self.filter_schema(schema)),
            ("__type", value) => self.filter_type_ref(value),
            (_, value) => value,
        }
    }

    fn filter_schema(&self, mut schema: Map<String, Value>) -> Map<String, Value> {
        update(&mut schema, "types", |types| match types {
            Value::Array(types) => Value::Array(self.filter_type_list(types)),
            other => other,
        });
        // `queryType` is non-null
        update(&mut schema, "queryType", |root| match root {
            Value::Object(root) => Value::Object(self.filter_type(root)),
            other => other,
        });
        for key in OPTIONAL_ROOTS {
            update(&mut schema, key, |root| self.filter_type_ref(root));
        }
        update(&mut schema, "directives", |directives| match directives {
            Value::Array(directives) => Value::Array(
                directives
                    .into_iter()
                    .map(|directive| match directive {
                        Value::Object(mut directive) => {
                            update(&mut directive, "args", |args| self.filter_input_values(args));
                            Value::Object(directive)
                        }
                        other => other,
                    })
                    .collect(),
            ),
            other => other,
        });
        schema
    }

    /// A `__Type` in a single-valued position; `null` when hidden
    fn filter_type_ref(&self, ty: Value) -> Value {
        match ty {
            Value::Object(ty) if self.is_hidden(&ty) => {
                trace!(type_name = ?name_of(&ty), "Hiding introspected type");
                Value::Null
            }
            Value::Object(ty) => Value::Object(self.filter_type(ty)),
            other => other,
        }
    }

    fn filter_type_list(&self, types: Vec<Value>) -> Vec<Value> {
        types
            .into_iter()
            .filter_map(|ty| match ty {
                Value::Object(ty) if self.is_hidden(&ty) => None,
                Value::Object(ty) => Some(Value::Object(self.filter_type(ty))),
                other => Some(other),
            })
            .collect()
    }

    /// Drop disallowed fields and hidden types from one `__Type`, at any depth
    fn filter_type(&self, mut ty: Map<String, Value>) -> Map<String, Value> {
        let parent = match name_of(&ty) {
            Name::Named(name) => Some(name.to_string()),
            Name::Unnamed | Name::Unknown => None,
        };
        ty.remove(NAME_KEY);

        update(&mut ty, "fields", |fields| match fields {
            Value::Array(fields) => Value::Array(
                fields
                    .into_iter()
                    .filter_map(|field| match field {
                        Value::Object(field) if self.keeps_field(parent.as_deref(), &field) => {
                            Some(Value::Object(self.filter_field(field)))
                        }
                        _ => None,
                    })
                    .collect(),
            ),
            other => other,
        });
        update(&mut ty, "inputFields", |fields| self.filter_input_values(fields));
        for key in TYPE_LISTS {
            update(&mut ty, key, |types| match types {
                Value::Array(types) => Value::Array(self.filter_type_list(types)),
                other => other,
            });
        }
        update(&mut ty, "ofType", |of_type| self.filter_type_ref(of_type));

        ty
    }

    fn filter_field(&self, mut field: Map<String, Value>) -> Map<String, Value> {
        field.remove(NAME_KEY);
        update(&mut field, "args", |args| self.filter_input_values(args));
        update(&mut field, "type", |ty| self.filter_type_ref(ty));
        field
    }

    /// Arguments and input fields; entries of a hidden type are dropped
    fn filter_input_values(&self, values: Value) -> Value {
        let Value::Array(values) = values else {
            return values;
        };
        Value::Array(
            values
                .into_iter()
                .filter_map(|value| match value {
                    Value::Object(value)
                        if value.get("type").is_some_and(|ty| self.references_hidden(ty)) =>
                    {
                        None
                    }
                    Value::Object(mut value) => {
                        update(&mut value, "type", |ty| self.filter_type_ref(ty));
                        Some(Value::Object(value))
                    }
                    other => Some(other),
                })
                .collect(),
        )
    }

    /// Whether a type reference names a hidden type, through any wrappers
    fn references_hidden(&self, ty: &Value) -> bool {
        let Value::Object(ty) = ty else {
            return false;
        };
        match name_of(ty) {
            Name::Named(name) => !self.verifier.is_type_visible(name),
            Name::Unnamed | Name::Unknown => ty
                .get("ofType")
                .is_some_and(|of_type| self.references_hidden(of_type)),
        }
    }

    /// Meta fields always stay; without both names nothing else can
    fn keeps_field(&self, parent: Option<&str>, field: &Map<String, Value>) -> bool {
        let Name::Named(field_name) = name_of(field) else {
            return false;
        };
        is_meta_field(field_name)
            || parent.is_some_and(|parent| self.verifier.is_field_allowed(parent, field_name))
    }

    /// Wrapper types are never hidden; a type whose name is unknown always is
    fn is_hidden(&self, ty: &Map<String, Value>) -> bool {
        match name_of(ty) {
            Name::Named(name) => !self.verifier.is_type_visible(name),
            Name::Unnamed => false,
            Name::Unknown => true,
        }
    }
}

/// Replace `map[key]` in place, if present
fn update(map: &mut Map<String, Value>, key: &str, f: impl FnOnce(Value) -> Value) {
    if let Some(slot) = map.get_mut(key) {
        *slot = f(slot.take());
    }
}

/// Wraps a host fetcher and filters introspection entry points
pub struct IntrospectionRedactingFetcher<F> {
    inner: F,
    filter: IntrospectionFilter,
}

impl<F: DataFetcher> IntrospectionRedactingFetcher<F> {
    pub fn new(inner: F, filter: IntrospectionFilter) -> Self {
        Self { inner, filter }
    }
}

#[async_trait]
impl<F: DataFetcher> DataFetcher for IntrospectionRedactingFetcher<F> {
    async fn fetch(&self, coordinates: &FieldCoordinates) -> Result<Value, GraphQLError> {
        let value = self.inner.fetch(coordinates).await?;
        if is_meta_field(&coordinates.field) {
            Ok(self.filter.filter(&coordinates.field, value))
        } else {
            Ok(value)
        }
    }
}
