//! Schema model types
//!
//! A deliberately small model of a GraphQL schema: enough to follow field
//! return types, type conditions and argument types while compiling rules
//! and redacting queries.

use graphql_parser::schema::{self, Type};
use std::fmt;

/// Names of the scalars every schema provides.
pub const BUILTIN_SCALARS: &[&str] = &["Int", "Float", "String", "Boolean", "ID"];

/// Kind of a named type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind {
    Object,
    Interface,
    Union,
    Enum,
    Scalar,
    InputObject,
}

impl TypeKind {
    /// Get the kind as it appears in introspection (`__TypeKind`)
    pub const fn as_str(&self) -> &'static str {
        match self {
            TypeKind::Object => "OBJECT",
            TypeKind::Interface => "INTERFACE",
            TypeKind::Union => "UNION",
            TypeKind::Enum => "ENUM",
            TypeKind::Scalar => "SCALAR",
            TypeKind::InputObject => "INPUT_OBJECT",
        }
    }

    /// Composite types are the ones a selection set can be made on
    pub const fn is_composite(&self) -> bool {
        matches!(
            self,
            TypeKind::Object | TypeKind::Interface | TypeKind::Union
        )
    }
}

impl fmt::Display for TypeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operation kind, used to pick a root type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Query,
    Mutation,
    Subscription,
}

impl OperationKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            OperationKind::Query => "query",
            OperationKind::Mutation => "mutation",
            OperationKind::Subscription => "subscription",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// An argument or input object field: a name and the named type it takes
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputValueDef {
    pub name: String,
    pub type_name: String,
}

impl InputValueDef {
    pub(crate) fn from_input_value(value: schema::InputValue<'_, String>) -> Self {
        Self {
            name: value.name,
            type_name: named_type(&value.value_type),
        }
    }
}

/// A field of an object or interface type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldDef {
    pub name: String,
    /// Named return type with list and non-null wrappers removed
    pub type_name: String,
    pub arguments: Vec<InputValueDef>,
}

impl FieldDef {
    pub(crate) fn from_schema_field(field: schema::Field<'_, String>) -> Self {
        Self {
            type_name: named_type(&field.field_type),
            name: field.name,
            arguments: field
                .arguments
                .into_iter()
                .map(InputValueDef::from_input_value)
                .collect(),
        }
    }
}

/// A named type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDef {
    pub name: String,
    pub kind: TypeKind,
    /// Output fields (objects and interfaces), in declaration order
    pub fields: Vec<FieldDef>,
    /// Input fields (input objects), in declaration order
    pub input_fields: Vec<InputValueDef>,
    /// Interfaces an object or interface implements
    pub interfaces: Vec<String>,
    /// Union members, or the object types implementing an interface
    pub possible_types: Vec<String>,
}

impl TypeDef {
    pub(crate) fn new(name: impl Into<String>, kind: TypeKind) -> Self {
        Self {
            name: name.into(),
            kind,
            fields: Vec::new(),
            input_fields: Vec::new(),
            interfaces: Vec::new(),
            possible_types: Vec::new(),
        }
    }

    pub(crate) fn from_definition(definition: schema::TypeDefinition<'_, String>) -> Self {
        use schema::TypeDefinition;

        match definition {
            TypeDefinition::Scalar(scalar) => Self::new(scalar.name, TypeKind::Scalar),
            TypeDefinition::Enum(enum_type) => Self::new(enum_type.name, TypeKind::Enum),
            TypeDefinition::Object(object) => {
                let mut def = Self::new(object.name, TypeKind::Object);
                def.interfaces = object.implements_interfaces;
                def.fields = object
                    .fields
                    .into_iter()
                    .map(FieldDef::from_schema_field)
                    .collect();
                def
            }
            TypeDefinition::Interface(interface) => {
                let mut def = Self::new(interface.name, TypeKind::Interface);
                def.fields = interface
                    .fields
                    .into_iter()
                    .map(FieldDef::from_schema_field)
                    .collect();
                def
            }
            TypeDefinition::Union(union) => {
                let mut def = Self::new(union.name, TypeKind::Union);
                def.possible_types = union.types;
                def
            }
            TypeDefinition::InputObject(input) => {
                let mut def = Self::new(input.name, TypeKind::InputObject);
                def.input_fields = input
                    .fields
                    .into_iter()
                    .map(InputValueDef::from_input_value)
                    .collect();
                def
            }
        }
    }

    /// Look up an output field by name
    pub fn field(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn is_composite(&self) -> bool {
        self.kind.is_composite()
    }
}

/// Strip list and non-null wrappers from a type reference
pub(crate) fn named_type(ty: &Type<'_, String>) -> String {
    match ty {
        Type::NamedType(name) => name.clone(),
        Type::ListType(inner) | Type::NonNullType(inner) => named_type(inner),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_composite_kinds() {
        assert!(TypeKind::Object.is_composite());
        assert!(TypeKind::Interface.is_composite());
        assert!(TypeKind::Union.is_composite());
        assert!(!TypeKind::Scalar.is_composite());
        assert!(!TypeKind::Enum.is_composite());
        assert!(!TypeKind::InputObject.is_composite());
    }

    #[test]
    fn test_named_type_strips_wrappers() {
        let ty: Type<'_, String> = Type::NonNullType(Box::new(Type::ListType(Box::new(
            Type::NonNullType(Box::new(Type::NamedType("User".to_string()))),
        ))));
        assert_eq!(named_type(&ty), "User");
    }
}
