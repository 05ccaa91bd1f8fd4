//! Name selections inside introspection subtrees

use graphql_parser::query::{Field, Selection, SelectionSet, TypeCondition};

/// Response key of the `name` selection added to `__Type` and `__Field`
pub const NAME_KEY: &str = "_authzName";

pub(crate) fn is_introspection_type(type_name: &str) -> bool {
    type_name.starts_with("__")
}

/// Introspection type an entry point returns
fn entry_type(field: &str) -> Option<&'static str> {
    match field {
        "__schema" => Some("__Schema"),
        "__type" => Some("__Type"),
        _ => None,
    }
}

/// Introspection type selected by `field` of `parent`
fn child_type(parent: &str, field: &str) -> Option<&'static str> {
    match (parent, field) {
        ("__Schema", "types" | "queryType" | "mutationType" | "subscriptionType") => {
            Some("__Type")
        }
        ("__Schema", "directives") => Some("__Directive"),
        ("__Type", "fields") => Some("__Field"),
        ("__Type", "interfaces" | "possibleTypes" | "ofType") => Some("__Type"),
        ("__Type", "inputFields") => Some("__InputValue"),
        ("__Field" | "__Directive", "args") => Some("__InputValue"),
        ("__Field" | "__InputValue", "type") => Some("__Type"),
        _ => None,
    }
}

/// Add name selections below an `__schema` or `__type` field
pub(crate) fn select_entry_names(field: &mut Field<'static, String>) {
    if let Some(type_name) = entry_type(&field.name) {
        select_names(type_name, &mut field.selection_set);
    }
}

/// Add name selections below the fields of a set typed `type_name`
///
/// The set itself is left alone; it is a fragment body whose spread site
/// already selects the name.
pub(crate) fn select_nested_names(type_name: &str, set: &mut SelectionSet<'static, String>) {
    for selection in &mut set.items {
        match selection {
            Selection::Field(field) => {
                if let Some(child) = child_type(type_name, &field.name) {
                    select_names(child, &mut field.selection_set);
                }
            }
            Selection::InlineFragment(fragment) => {
                let condition = match &fragment.type_condition {
                    Some(TypeCondition::On(condition)) => condition.as_str(),
                    None => type_name,
                };
                select_nested_names(condition, &mut fragment.selection_set);
            }
            Selection::FragmentSpread(_) => {}
        }
    }
}

fn select_names(type_name: &str, set: &mut SelectionSet<'static, String>) {
    if matches!(type_name, "__Type" | "__Field")
        && !set.items.is_empty()
        && !selects_name_key(set)
    {
        let name = name_field(set);
        set.items.push(Selection::Field(name));
    }
    select_nested_names(type_name, set);
}

fn selects_name_key(set: &SelectionSet<'static, String>) -> bool {
    set.items.iter().any(|selection| {
        matches!(selection, Selection::Field(field) if field.alias.as_deref() == Some(NAME_KEY))
    })
}

fn name_field(set: &SelectionSet<'static, String>) -> Field<'static, String> {
    let (_, end) = set.span;
    Field {
        position: end,
        alias: Some(NAME_KEY.to_string()),
        name: "name".to_string(),
        arguments: Vec::new(),
        directives: Vec::new(),
        selection_set: SelectionSet {
            span: (end, end),
            items: Vec::new(),
        },
    }
}
