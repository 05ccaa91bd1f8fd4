//! Schema module
//!
//! Loads a GraphQL schema from SDL into the typed model used by rule
//! compilation, redaction and introspection filtering.
//!
//! ```graphql
//! type Query { user(id: ID!): User }
//! type User { id: ID! ssn: String }
//! ```

pub mod types;

pub use types::{
    BUILTIN_SCALARS, FieldDef, InputValueDef, OperationKind, TypeDef, TypeKind,
};

use crate::error::{ConfigError, SchemaError};
use graphql_parser::schema::{Definition, TypeExtension};
use std::collections::HashMap;
use std::path::Path;
use tracing::debug;

/// An immutable, typed GraphQL schema
#[derive(Debug, Clone)]
pub struct Schema {
    types: HashMap<String, TypeDef>,
    query_type: String,
    mutation_type: Option<String>,
    subscription_type: Option<String>,
}

/// Root operation type names as declared in a `schema { }` block
#[derive(Default)]
struct RootTypes {
    query: Option<String>,
    mutation: Option<String>,
    subscription: Option<String>,
}

impl Schema {
    /// Parse a schema from SDL
    pub fn parse(sdl: &str) -> Result<Self, SchemaError> {
        let document = graphql_parser::parse_schema::<String>(sdl)
            .map_err(|e| SchemaError::Parse(e.to_string()))?;

        let mut types: HashMap<String, TypeDef> = BUILTIN_SCALARS
            .iter()
            .map(|name| (name.to_string(), TypeDef::new(*name, TypeKind::Scalar)))
            .collect();
        let mut roots: Option<RootTypes> = None;
        let mut extensions = Vec::new();

        for definition in document.definitions {
            match definition {
                Definition::SchemaDefinition(schema) => {
                    roots = Some(RootTypes {
                        query: schema.query,
                        mutation: schema.mutation,
                        subscription: schema.subscription,
                    });
                }
                Definition::TypeDefinition(definition) => {
                    let def = TypeDef::from_definition(definition);
                    types.insert(def.name.clone(), def);
                }
                Definition::TypeExtension(extension) => extensions.push(extension),
                Definition::DirectiveDefinition(_) => {}
            }
        }

        for extension in extensions {
            apply_extension(&mut types, extension);
        }
        link_implementations(&mut types);

        let (query_type, mutation_type, subscription_type) = match roots {
            Some(roots) => {
                let query = roots.query.ok_or(SchemaError::MissingQueryType)?;
                for name in [Some(&query), roots.mutation.as_ref(), roots.subscription.as_ref()]
                    .into_iter()
                    .flatten()
                {
                    if !types.contains_key(name) {
                        return Err(SchemaError::UnknownRootType(name.clone()));
                    }
                }
                (query, roots.mutation, roots.subscription)
            }
            None => {
                if !types.contains_key("Query") {
                    return Err(SchemaError::MissingQueryType);
                }
                let conventional = |name: &str| types.contains_key(name).then(|| name.to_string());
                (
                    "Query".to_string(),
                    conventional("Mutation"),
                    conventional("Subscription"),
                )
            }
        };

        debug!(
            types = types.len(),
            query = %query_type,
            "Parsed schema"
        );

        Ok(Self {
            types,
            query_type,
            mutation_type,
            subscription_type,
        })
    }

    /// Read and parse a schema file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::Load(format!(
                "Schema file not found: {}",
                path.display()
            )));
        }
        let sdl = std::fs::read_to_string(path)?;
        Ok(Self::parse(&sdl)?)
    }

    /// Look up a named type
    pub fn get_type(&self, name: &str) -> Option<&TypeDef> {
        self.types.get(name)
    }

    /// Look up a field of a composite type
    pub fn field(&self, type_name: &str, field_name: &str) -> Option<&FieldDef> {
        self.types.get(type_name)?.field(field_name)
    }

    /// Name of the root type for an operation kind, if the schema has one
    pub fn root_type(&self, kind: OperationKind) -> Option<&str> {
        match kind {
            OperationKind::Query => Some(self.query_type.as_str()),
            OperationKind::Mutation => self.mutation_type.as_deref(),
            OperationKind::Subscription => self.subscription_type.as_deref(),
        }
    }

    pub fn query_type(&self) -> &str {
        &self.query_type
    }

    /// Iterate over every named type (built-in scalars included)
    pub fn types(&self) -> impl Iterator<Item = &TypeDef> {
        self.types.values()
    }

    pub fn contains_type(&self, name: &str) -> bool {
        self.types.contains_key(name)
    }

    pub fn is_builtin_scalar(name: &str) -> bool {
        BUILTIN_SCALARS.contains(&name)
    }
}

fn apply_extension(types: &mut HashMap<String, TypeDef>, extension: TypeExtension<'_, String>) {
    match extension {
        TypeExtension::Object(ext) => {
            if let Some(def) = types.get_mut(&ext.name) {
                def.interfaces.extend(ext.implements_interfaces);
                def.fields
                    .extend(ext.fields.into_iter().map(FieldDef::from_schema_field));
            }
        }
        TypeExtension::Interface(ext) => {
            if let Some(def) = types.get_mut(&ext.name) {
                def.fields
                    .extend(ext.fields.into_iter().map(FieldDef::from_schema_field));
            }
        }
        TypeExtension::Union(ext) => {
            if let Some(def) = types.get_mut(&ext.name) {
                def.possible_types.extend(ext.types);
            }
        }
        TypeExtension::InputObject(ext) => {
            if let Some(def) = types.get_mut(&ext.name) {
                def.input_fields
                    .extend(ext.fields.into_iter().map(InputValueDef::from_input_value));
            }
        }
        TypeExtension::Scalar(_) | TypeExtension::Enum(_) => {}
    }
}

/// Record each object type as a possible type of the interfaces it implements
fn link_implementations(types: &mut HashMap<String, TypeDef>) {
    let mut links: Vec<(String, String)> = types
        .values()
        .filter(|def| def.kind == TypeKind::Object)
        .flat_map(|def| {
            def.interfaces
                .iter()
                .map(move |interface| (interface.clone(), def.name.clone()))
        })
        .collect();
    links.sort();

    for (interface, object) in links {
        if let Some(def) = types.get_mut(&interface)
            && def.kind == TypeKind::Interface
        {
            def.possible_types.push(object);
        }
    }
}
