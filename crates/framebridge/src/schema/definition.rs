//! Named table schemas.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use super::column::ColumnSpec;

/// Shared handle to an immutable schema.
pub type SchemaRef = Arc<SchemaDefinition>;

/// Declarative description of a table: ordered, typed, constrained columns.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SchemaDefinition {
    /// Schema name, used in messages and registrations.
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// Columns in declaration order.
    pub columns: Vec<ColumnSpec>,
    /// Coerce every column to its declared type before checking.
    #[serde(default)]
    pub coerce: bool,
    /// Reject columns the schema does not declare.
    #[serde(default)]
    pub strict: bool,
}

impl SchemaDefinition {
    /// Start building a schema.
    pub fn builder(name: impl Into<String>) -> SchemaBuilder {
        SchemaBuilder {
            schema: SchemaDefinition {
                name: name.into(),
                description: None,
                columns: Vec::new(),
                coerce: false,
                strict: false,
            },
        }
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnSpec> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Get all column names.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// Wrap in a shared handle.
    pub fn into_ref(self) -> SchemaRef {
        Arc::new(self)
    }
}

/// Builder for [`SchemaDefinition`].
#[derive(Debug, Clone)]
pub struct SchemaBuilder {
    schema: SchemaDefinition,
}

impl SchemaBuilder {
    pub fn column(mut self, column: ColumnSpec) -> Self {
        self.schema.columns.push(column);
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.schema.description = Some(text.into());
        self
    }

    pub fn coerce(mut self, coerce: bool) -> Self {
        self.schema.coerce = coerce;
        self
    }

    pub fn strict(mut self, strict: bool) -> Self {
        self.schema.strict = strict;
        self
    }

    pub fn build(self) -> SchemaDefinition {
        self.schema
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::DataType;

    #[test]
    fn test_builder_keeps_column_order() {
        let schema = SchemaDefinition::builder("Orders")
            .column(ColumnSpec::new("order_id", DataType::Int).ge(1000.0))
            .column(ColumnSpec::new("amount", DataType::Float).ge(0.0))
            .coerce(true)
            .build();

        assert_eq!(schema.column_names(), vec!["order_id", "amount"]);
        assert!(schema.coerce);
        assert!(!schema.strict);
        assert_eq!(schema.column("amount").unwrap().dtype, DataType::Float);
    }

    #[test]
    fn test_schema_json_shape() {
        let schema = SchemaDefinition::builder("Simple")
            .column(ColumnSpec::new("str_col", DataType::Str).unique())
            .build();
        let json = serde_json::to_value(&schema).unwrap();
        assert_eq!(json["columns"][0]["constraints"][0]["type"], "unique");
    }
}
