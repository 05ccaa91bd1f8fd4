//! Host execution seams

use crate::enforcement::result::{ExecutionResult, GraphQLError};
use crate::query::QueryDocument;
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::fmt;

/// The field being resolved
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct FieldCoordinates {
    pub parent_type: String,
    pub field: String,
}

impl FieldCoordinates {
    pub fn new(parent_type: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            parent_type: parent_type.into(),
            field: field.into(),
        }
    }
}

impl fmt::Display for FieldCoordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}", self.parent_type, self.field)
    }
}

/// Resolves a single field's value
#[async_trait]
pub trait DataFetcher: Send + Sync {
    async fn fetch(&self, coordinates: &FieldCoordinates) -> Result<Value, GraphQLError>;
}

/// Executes a (redacted) document on the host engine
#[async_trait]
pub trait QueryExecutor: Send + Sync {
    async fn execute(
        &self,
        document: &QueryDocument,
        operation_name: Option<&str>,
        variables: &Map<String, Value>,
    ) -> ExecutionResult;
}
