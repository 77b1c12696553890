//! Tables bound to the schema of a dataframe model.

use std::fmt;
use std::marker::PhantomData;
use std::ops::Index;

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::bridge::{RawValue, TableCoercer};
use crate::error::{BridgeError, Result};
use crate::schema::{DataFrameModel, SchemaRef};
use crate::table::{Row, Table, Value};

static EMPTY: Lazy<Table> = Lazy::new(Table::new);

/// A table that has been validated against the schema of `S`.
///
/// Use it as a field type in any serde struct: deserializing runs the
/// schema's checks, serializing emits the column → values mapping.
///
/// [`Default`] yields an uninitialized wrapper holding no table, for
/// `#[serde(default)]` positions. It behaves like an empty table.
pub struct Validated<S: DataFrameModel> {
    table: Option<Table>,
    _marker: PhantomData<fn() -> S>,
}

impl<S: DataFrameModel> Validated<S> {
    /// Coerce `raw` into a table and validate it against `S`.
    pub fn new(raw: impl Into<RawValue>) -> Result<Self> {
        let table = TableCoercer::default().coerce(raw, &S::schema())?;
        Ok(Self::from_validated(table))
    }

    /// Re-validate another wrapper's table against `S`.
    pub fn revalidate<T: DataFrameModel>(other: Validated<T>) -> Result<Self> {
        Self::new(other)
    }

    pub(crate) fn from_validated(table: Table) -> Self {
        Self {
            table: Some(table),
            _marker: PhantomData,
        }
    }

    /// Schema the table satisfies.
    pub fn schema(&self) -> SchemaRef {
        S::schema()
    }

    pub fn is_initialized(&self) -> bool {
        self.table.is_some()
    }

    /// Column name → values; empty when uninitialized.
    pub fn to_dict(&self) -> IndexMap<String, Vec<Value>> {
        self.inner().to_column_map()
    }

    pub fn table(&self) -> Option<&Table> {
        self.table.as_ref()
    }

    pub fn into_table(self) -> Option<Table> {
        self.table
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.inner().row_count()
    }

    pub fn is_empty(&self) -> bool {
        self.inner().is_empty()
    }

    pub fn shape(&self) -> (usize, usize) {
        self.inner().shape()
    }

    /// Column names in order.
    pub fn columns(&self) -> Vec<&str> {
        self.inner().column_names()
    }

    /// Column values by name.
    ///
    /// Names with a leading underscore are treated as attribute lookups on the
    /// wrapper itself and always fail.
    pub fn column(&self, name: &str) -> Result<&[Value]> {
        if name.starts_with('_') {
            return Err(BridgeError::AttributeNotFound {
                name: name.to_string(),
            });
        }
        self.inner()
            .column(name)
            .ok_or_else(|| BridgeError::ColumnNotFound {
                name: name.to_string(),
            })
    }

    pub fn filter<F>(&self, predicate: F) -> Table
    where
        F: Fn(&Row<'_>) -> bool,
    {
        self.inner().filter(predicate)
    }

    pub fn sort_by(&self, column: &str) -> Result<Table> {
        self.inner().sort_by(column)
    }

    pub fn group_mean(&self, by: &str, value: &str, alias: &str) -> Result<Table> {
        self.inner().group_mean(by, value, alias)
    }

    fn inner(&self) -> &Table {
        self.table.as_ref().unwrap_or(&EMPTY)
    }
}

impl<S: DataFrameModel> Default for Validated<S> {
    fn default() -> Self {
        Self {
            table: None,
            _marker: PhantomData,
        }
    }
}

impl<S: DataFrameModel> Clone for Validated<S> {
    fn clone(&self) -> Self {
        Self {
            table: self.table.clone(),
            _marker: PhantomData,
        }
    }
}

impl<S: DataFrameModel> Index<&str> for Validated<S> {
    type Output = [Value];

    /// Panics when the column does not exist.
    fn index(&self, name: &str) -> &[Value] {
        match self.inner().column(name) {
            Some(values) => values,
            None => panic!("column '{}' not found in {}", name, S::name()),
        }
    }
}

impl<S: DataFrameModel, T: DataFrameModel> PartialEq<Validated<T>> for Validated<S> {
    fn eq(&self, other: &Validated<T>) -> bool {
        self.table == other.table
    }
}

/// A wrapper never equals a bare table.
impl<S: DataFrameModel> PartialEq<Table> for Validated<S> {
    fn eq(&self, _other: &Table) -> bool {
        false
    }
}

impl<S: DataFrameModel> PartialEq<JsonValue> for Validated<S> {
    fn eq(&self, _other: &JsonValue) -> bool {
        false
    }
}

impl<S: DataFrameModel> fmt::Debug for Validated<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => f
                .debug_struct("Validated")
                .field("schema", &S::name())
                .field("table", table)
                .finish(),
            None => f.write_str("Validated(uninitialized)"),
        }
    }
}

impl<S: DataFrameModel> fmt::Display for Validated<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.table {
            Some(table) => write!(f, "Validated[{}]\n{}", S::name(), table),
            None => f.write_str("Validated(uninitialized)"),
        }
    }
}

impl<S: DataFrameModel> Serialize for Validated<S> {
    fn serialize<Ser: Serializer>(&self, serializer: Ser) -> std::result::Result<Ser::Ok, Ser::Error> {
        self.inner().serialize(serializer)
    }
}

impl<'de, S: DataFrameModel> Deserialize<'de> for Validated<S> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = JsonValue::deserialize(deserializer)?;
        Self::new(raw).map_err(D::Error::custom)
    }
}

impl<S: DataFrameModel> From<Validated<S>> for RawValue {
    fn from(value: Validated<S>) -> Self {
        match value.table {
            Some(table) => RawValue::Wrapped {
                schema: S::name(),
                table,
            },
            None => RawValue::Missing,
        }
    }
}

impl<S: DataFrameModel> From<&Validated<S>> for RawValue {
    fn from(value: &Validated<S>) -> Self {
        RawValue::from(value.clone())
    }
}
