//! Empty selection pruning
//!
//! After redaction, fragment definitions may have lost every selection. A
//! spread of such a fragment selects nothing, so removing it can empty the
//! fragment or field that contained it. Emptied fragments are found as a
//! fixpoint, then spreads of them and the selections they emptied are
//! removed. The executed operation itself is never removed.

use crate::query::{QueryDocument, selection_set_mut};
use graphql_parser::query::{Definition, Selection, SelectionSet};
use std::collections::HashSet;
use tracing::trace;

pub(crate) fn prune_document(document: &mut QueryDocument) {
    let mut emptied: HashSet<String> = HashSet::new();

    loop {
        let mut changed = false;
        for definition in &mut document.definitions {
            if let Definition::Fragment(fragment) = definition
                && !emptied.contains(&fragment.name)
            {
                prune_selection_set(&mut fragment.selection_set, &emptied);
                if fragment.selection_set.items.is_empty() {
                    trace!(fragment = %fragment.name, "Fragment emptied by redaction");
                    emptied.insert(fragment.name.clone());
                    changed = true;
                }
            }
        }
        if !changed {
            break;
        }
    }

    for definition in &mut document.definitions {
        if let Definition::Operation(operation) = definition {
            prune_selection_set(selection_set_mut(operation), &emptied);
        }
    }

    document.definitions.retain(|definition| match definition {
        Definition::Fragment(fragment) => !emptied.contains(&fragment.name),
        Definition::Operation(_) => true,
    });
}

/// Remove spreads of emptied fragments and composite selections left empty
fn prune_selection_set(set: &mut SelectionSet<'static, String>, emptied: &HashSet<String>) {
    set.items.retain_mut(|selection| match selection {
        Selection::Field(field) => {
            // Leaf fields have nothing to lose
            if field.selection_set.items.is_empty() {
                return true;
            }
            prune_selection_set(&mut field.selection_set, emptied);
            !field.selection_set.items.is_empty()
        }
        Selection::InlineFragment(fragment) => {
            prune_selection_set(&mut fragment.selection_set, emptied);
            !fragment.selection_set.items.is_empty()
        }
        Selection::FragmentSpread(spread) => !emptied.contains(&spread.fragment_name),
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::query::parse_query;

    fn pruned(source: &str) -> String {
        let mut document = parse_query(source).unwrap();
        prune_document(&mut document);
        document
            .to_string()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn test_untouched_document() {
        assert_eq!(
            pruned("{ user { id ...F } } fragment F on User { name }"),
            "{ user { id ...F } } fragment F on User { name }"
        );
    }

    #[test]
    fn test_spread_order_does_not_matter() {
        // `A` is defined before the fragment that empties it
        let mut document =
            parse_query("{ user { id ...A } } fragment A on User { ...B } fragment B on User { name }")
                .unwrap();
        if let Definition::Fragment(fragment) = &mut document.definitions[2] {
            fragment.selection_set.items.clear();
        }
        prune_document(&mut document);

        let printed = document.to_string();
        assert!(!printed.contains("fragment"));
        assert!(!printed.contains("...A"));
        assert!(printed.contains("id"));
    }
}
