//! Query redaction
//!
//! Removes every field selection the caller may not access, recording one
//! [`DenialError`] per removal, and optionally prunes the selections that
//! removal left empty.

pub mod denial;
pub mod engine;
mod prune;

pub use denial::{DenialError, DenialReason, FieldPath, RedactionRoot, UNAUTHORIZED_FIELD_CODE};
pub use engine::{Redaction, RedactionEngine};
