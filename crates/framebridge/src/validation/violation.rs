//! Violation types reported by the schema validator.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::schema::{Constraint, DataType};
use crate::table::Value;

/// Which check failed.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CheckKind {
    /// A declared column is absent from the table.
    ColumnInTable,
    /// A table column is not declared and the schema is strict.
    ColumnInSchema,
    /// Values could not be converted to the declared type.
    Coerce { dtype: DataType },
    /// Values do not have the declared type.
    Dtype { dtype: DataType },
    /// Null values in a non-nullable column.
    NotNullable,
    /// A declared constraint failed.
    Constraint { constraint: Constraint },
}

impl CheckKind {
    /// Check name as it appears in messages.
    pub fn name(&self) -> String {
        match self {
            CheckKind::ColumnInTable => "column_in_dataframe".to_string(),
            CheckKind::ColumnInSchema => "column_in_schema".to_string(),
            CheckKind::Coerce { dtype } => format!("coerce_dtype('{}')", dtype),
            CheckKind::Dtype { dtype } => format!("dtype('{}')", dtype),
            CheckKind::NotNullable => "not_nullable".to_string(),
            CheckKind::Constraint { constraint } => constraint.name(),
        }
    }

    /// Whether the failed check is a uniqueness constraint.
    pub fn is_uniqueness(&self) -> bool {
        matches!(
            self,
            CheckKind::Constraint {
                constraint: Constraint::Unique
            }
        )
    }
}

impl fmt::Display for CheckKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name())
    }
}

/// One offending cell.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FailureCase {
    /// Row index, absent for column-level failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    pub value: Value,
}

/// A table failed one check of its schema.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
#[error("{message}")]
pub struct SchemaViolation {
    /// Name of the schema that was checked.
    pub schema: String,
    /// Offending column.
    pub column: String,
    /// The check that failed.
    pub check: CheckKind,
    /// Sample of offending cells.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failure_cases: Vec<FailureCase>,
    /// Human-readable description.
    pub message: String,
}

impl SchemaViolation {
    pub(crate) fn new(
        schema: &str,
        column: &str,
        check: CheckKind,
        failure_cases: Vec<FailureCase>,
        total: usize,
    ) -> Self {
        let message = if failure_cases.is_empty() {
            format!(
                "column '{}' failed {} in schema '{}'",
                column,
                check.name(),
                schema
            )
        } else {
            format!(
                "column '{}' failed {} in schema '{}': {} failure case(s): {}",
                column,
                check.name(),
                schema,
                total,
                failure_cases
                    .iter()
                    .map(|c| c.value.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            )
        };

        Self {
            schema: schema.to_string(),
            column: column.to_string(),
            check,
            failure_cases,
            message,
        }
    }
}
