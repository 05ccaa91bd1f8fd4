//! Introspection filtering
//!
//! Redaction keeps `__schema` and `__type` selections, so their results are
//! filtered instead: types the caller cannot reach are dropped and every
//! type lists only the fields the caller may select. Filtering is silent
//! and never produces denials.
//!
//! Decisions are made on type and field names. Redaction makes every
//! `__Type` and `__Field` selection also select `name` under
//! [`NAME_KEY`]; the filter reads that key and removes it from the result.

mod filter;
mod names;

pub use filter::{IntrospectionFilter, IntrospectionRedactingFetcher};
pub use names::NAME_KEY;

pub(crate) use names::{is_introspection_type, select_entry_names, select_nested_names};
