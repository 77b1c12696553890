//! Coercion of raw field input into validated tables.

use indexmap::IndexMap;
use serde_json::Value as JsonValue;

use crate::error::{BridgeError, Result};
use crate::model::FieldError;
use crate::schema::SchemaDefinition;
use crate::table::{Table, Value, json_kind};
use crate::validation::SchemaValidator;

/// Input handed to a table-typed field before validation.
#[derive(Debug, Clone, PartialEq)]
pub enum RawValue {
    /// No value (JSON `null` or `None`).
    Missing,
    /// JSON input: a column mapping, a row list, or a scalar.
    Json(JsonValue),
    /// Column name → values.
    Columns(IndexMap<String, Vec<Value>>),
    /// An existing table.
    Table(Table),
    /// A table already validated against the named schema.
    Wrapped { schema: String, table: Table },
}

impl RawValue {
    /// Short description of the input kind, used in error messages.
    pub fn kind(&self) -> &'static str {
        match self {
            RawValue::Missing => "null",
            RawValue::Json(value) => json_kind(value),
            RawValue::Columns(_) => "column mapping",
            RawValue::Table(_) => "Table",
            RawValue::Wrapped { .. } => "Validated",
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, RawValue::Missing)
    }
}

impl From<JsonValue> for RawValue {
    fn from(value: JsonValue) -> Self {
        match value {
            JsonValue::Null => RawValue::Missing,
            other => RawValue::Json(other),
        }
    }
}

impl From<&JsonValue> for RawValue {
    fn from(value: &JsonValue) -> Self {
        RawValue::from(value.clone())
    }
}

impl From<Table> for RawValue {
    fn from(table: Table) -> Self {
        RawValue::Table(table)
    }
}

impl From<&Table> for RawValue {
    fn from(table: &Table) -> Self {
        RawValue::Table(table.clone())
    }
}

impl From<IndexMap<String, Vec<Value>>> for RawValue {
    fn from(columns: IndexMap<String, Vec<Value>>) -> Self {
        RawValue::Columns(columns)
    }
}

impl<T: Into<RawValue>> From<Option<T>> for RawValue {
    fn from(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(RawValue::Missing)
    }
}

/// Turns raw input into a table that satisfies a schema.
#[derive(Debug, Clone, Default)]
pub struct TableCoercer {
    validator: SchemaValidator,
}

impl TableCoercer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Use a specific validator (for a custom failure-case limit).
    pub fn with_validator(validator: SchemaValidator) -> Self {
        Self { validator }
    }

    /// Build a table from `raw` and validate it against `schema`.
    ///
    /// Wrapped input is unwrapped and re-validated against `schema`, whatever
    /// schema it was validated with before. The returned table carries any
    /// column coercions the schema asked for.
    pub fn coerce(&self, raw: impl Into<RawValue>, schema: &SchemaDefinition) -> Result<Table> {
        let table = match raw.into() {
            RawValue::Missing => return Err(BridgeError::MissingValue),
            RawValue::Json(value @ (JsonValue::Object(_) | JsonValue::Array(_))) => {
                Table::from_json(&value)?
            }
            RawValue::Json(other) => {
                return Err(BridgeError::UnsupportedInputType {
                    kind: json_kind(&other).to_string(),
                });
            }
            RawValue::Columns(columns) => Table::from_columns(columns)?,
            RawValue::Table(table) => table,
            RawValue::Wrapped {
                schema: source,
                table,
            } => {
                log::debug!(
                    "re-validating table from schema '{}' against '{}'",
                    source,
                    schema.name
                );
                table
            }
        };

        let validated = self.validator.validate(&table, schema)?;
        log::debug!(
            "coerced {} row(s) into schema '{}'",
            validated.row_count(),
            schema.name
        );
        Ok(validated)
    }

    /// [`coerce`](Self::coerce) for a model field, reporting failures in the
    /// object-model vocabulary.
    pub fn coerce_field(
        &self,
        field: &str,
        raw: impl Into<RawValue>,
        schema: &SchemaDefinition,
    ) -> std::result::Result<Table, FieldError> {
        self.coerce(raw, schema)
            .map_err(|e| FieldError::from_bridge(field, e))
    }
}
