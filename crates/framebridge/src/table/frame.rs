//! In-memory columnar table.

use std::fmt;

use indexmap::IndexMap;
use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::error::{BridgeError, Result};

use super::value::Value;

/// Maximum rows printed by the `Display` implementation.
const DISPLAY_ROWS: usize = 10;

/// Columnar container: ordered column names mapped to equal-length value lists.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Table {
    columns: IndexMap<String, Vec<Value>>,
}

impl Table {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from `(name, values)` pairs.
    ///
    /// Fails when column lengths differ, a name repeats, or a column mixes
    /// incompatible kinds. Integer values in a column that also holds floats
    /// are promoted to floats.
    pub fn from_columns<I, K>(columns: I) -> Result<Self>
    where
        I: IntoIterator<Item = (K, Vec<Value>)>,
        K: Into<String>,
    {
        let mut table = Table::new();
        let mut expected_len: Option<usize> = None;

        for (name, values) in columns {
            let name = name.into();
            if table.columns.contains_key(&name) {
                return Err(BridgeError::InvalidTable(format!(
                    "duplicate column '{}'",
                    name
                )));
            }
            match expected_len {
                Some(len) if len != values.len() => {
                    return Err(BridgeError::InvalidTable(format!(
                        "column '{}' has {} values, expected {}",
                        name,
                        values.len(),
                        len
                    )));
                }
                _ => expected_len = Some(values.len()),
            }
            let values = normalize_column(&name, values)?;
            table.columns.insert(name, values);
        }

        Ok(table)
    }

    /// Build a table from row records. Columns appear in first-seen order and
    /// keys missing from a row are filled with nulls.
    pub fn from_rows(rows: &[IndexMap<String, Value>]) -> Result<Self> {
        let mut names: Vec<&str> = Vec::new();
        for row in rows {
            for key in row.keys() {
                if !names.contains(&key.as_str()) {
                    names.push(key.as_str());
                }
            }
        }

        let columns = names.iter().map(|name| {
            let values = rows
                .iter()
                .map(|row| row.get(*name).cloned().unwrap_or(Value::Null))
                .collect();
            (name.to_string(), values)
        });

        Self::from_columns(columns.collect::<Vec<_>>())
    }

    /// Build a table from JSON: either an object of column arrays or an array
    /// of row objects.
    pub fn from_json(value: &JsonValue) -> Result<Self> {
        match value {
            JsonValue::Object(map) => {
                let mut columns = Vec::with_capacity(map.len());
                for (name, column) in map {
                    let JsonValue::Array(items) = column else {
                        return Err(BridgeError::InvalidTable(format!(
                            "column '{}' is not a list",
                            name
                        )));
                    };
                    let values = items
                        .iter()
                        .map(|item| {
                            Value::from_json(item).ok_or_else(|| {
                                BridgeError::InvalidTable(format!(
                                    "column '{}' contains a nested value",
                                    name
                                ))
                            })
                        })
                        .collect::<Result<Vec<_>>>()?;
                    columns.push((name.clone(), values));
                }
                Self::from_columns(columns)
            }
            JsonValue::Array(items) => {
                let mut rows = Vec::with_capacity(items.len());
                for (idx, item) in items.iter().enumerate() {
                    let JsonValue::Object(fields) = item else {
                        return Err(BridgeError::InvalidTable(format!(
                            "row {} is not an object",
                            idx
                        )));
                    };
                    let mut row = IndexMap::with_capacity(fields.len());
                    for (name, cell) in fields {
                        let cell = Value::from_json(cell).ok_or_else(|| {
                            BridgeError::InvalidTable(format!(
                                "row {}, column '{}' contains a nested value",
                                idx, name
                            ))
                        })?;
                        row.insert(name.clone(), cell);
                    }
                    rows.push(row);
                }
                Self::from_rows(&rows)
            }
            other => Err(BridgeError::InvalidTable(format!(
                "expected an object or array, got {}",
                json_kind(other)
            ))),
        }
    }

    /// Get the number of rows.
    pub fn row_count(&self) -> usize {
        self.columns.values().next().map(Vec::len).unwrap_or(0)
    }

    /// Get the number of columns.
    pub fn column_count(&self) -> usize {
        self.columns.len()
    }

    /// `(rows, columns)`.
    pub fn shape(&self) -> (usize, usize) {
        (self.row_count(), self.column_count())
    }

    pub fn is_empty(&self) -> bool {
        self.row_count() == 0
    }

    /// Column names in order.
    pub fn column_names(&self) -> Vec<&str> {
        self.columns.keys().map(String::as_str).collect()
    }

    pub fn has_column(&self, name: &str) -> bool {
        self.columns.contains_key(name)
    }

    /// Get a column by name.
    pub fn column(&self, name: &str) -> Option<&[Value]> {
        self.columns.get(name).map(Vec::as_slice)
    }

    /// Get a specific cell value.
    pub fn get(&self, row: usize, column: &str) -> Option<&Value> {
        self.columns.get(column).and_then(|values| values.get(row))
    }

    /// Iterate over `(name, values)` pairs.
    pub fn columns(&self) -> impl Iterator<Item = (&str, &[Value])> {
        self.columns
            .iter()
            .map(|(name, values)| (name.as_str(), values.as_slice()))
    }

    /// Iterate over rows.
    pub fn rows(&self) -> impl Iterator<Item = Row<'_>> {
        (0..self.row_count()).map(move |index| Row { table: self, index })
    }

    /// Copy a column's values out as a list.
    pub fn column_to_list(&self, name: &str) -> Option<Vec<Value>> {
        self.columns.get(name).cloned()
    }

    /// Column name → list of values, the plain round-trip format.
    pub fn to_column_map(&self) -> IndexMap<String, Vec<Value>> {
        self.columns.clone()
    }

    pub fn into_column_map(self) -> IndexMap<String, Vec<Value>> {
        self.columns
    }

    /// JSON object of column arrays.
    pub fn to_json(&self) -> JsonValue {
        let map = self
            .columns
            .iter()
            .map(|(name, values)| {
                (
                    name.clone(),
                    JsonValue::Array(values.iter().map(Value::to_json).collect()),
                )
            })
            .collect();
        JsonValue::Object(map)
    }

    /// Replace a column or append it if absent.
    pub fn with_column(mut self, name: impl Into<String>, values: Vec<Value>) -> Result<Self> {
        let name = name.into();
        if self.column_count() > 0
            && !(self.column_count() == 1 && self.has_column(&name))
            && values.len() != self.row_count()
        {
            return Err(BridgeError::InvalidTable(format!(
                "column '{}' has {} values, expected {}",
                name,
                values.len(),
                self.row_count()
            )));
        }
        let values = normalize_column(&name, values)?;
        self.columns.insert(name, values);
        Ok(self)
    }

    /// Replace a column's values in place, keeping its position. Lengths are
    /// the caller's responsibility.
    pub(crate) fn replace_column(&mut self, name: &str, values: Vec<Value>) {
        if let Some(slot) = self.columns.get_mut(name) {
            *slot = values;
        }
    }

    /// Keep only the named columns, in the given order.
    pub fn select(&self, names: &[&str]) -> Result<Table> {
        let mut columns = IndexMap::with_capacity(names.len());
        for name in names {
            let values = self
                .columns
                .get(*name)
                .ok_or_else(|| BridgeError::ColumnNotFound {
                    name: name.to_string(),
                })?;
            columns.insert(name.to_string(), values.clone());
        }
        Ok(Table { columns })
    }

    /// Keep the rows for which `predicate` returns true.
    pub fn filter<F>(&self, predicate: F) -> Table
    where
        F: Fn(&Row<'_>) -> bool,
    {
        let keep: Vec<usize> = self
            .rows()
            .filter(|row| predicate(row))
            .map(|row| row.index)
            .collect();
        self.take_rows(&keep)
    }

    /// Stable sort by one column, ascending.
    pub fn sort_by(&self, column: &str) -> Result<Table> {
        let values = self
            .columns
            .get(column)
            .ok_or_else(|| BridgeError::ColumnNotFound {
                name: column.to_string(),
            })?;
        let mut order: Vec<usize> = (0..values.len()).collect();
        order.sort_by(|a, b| values[*a].compare(&values[*b]));
        Ok(self.take_rows(&order))
    }

    /// Group by `by` and average the numeric column `value` into `alias`.
    ///
    /// Groups keep first-appearance order; nulls are skipped in the mean and
    /// a group with no numeric values gets a null mean.
    pub fn group_mean(&self, by: &str, value: &str, alias: &str) -> Result<Table> {
        let keys = self.column(by).ok_or_else(|| BridgeError::ColumnNotFound {
            name: by.to_string(),
        })?;
        let values = self.column(value).ok_or_else(|| BridgeError::ColumnNotFound {
            name: value.to_string(),
        })?;

        let mut groups: IndexMap<String, (Value, f64, usize)> = IndexMap::new();
        for (key, cell) in keys.iter().zip(values) {
            let entry = groups
                .entry(key.key())
                .or_insert_with(|| (key.clone(), 0.0, 0));
            if let Some(v) = cell.as_f64() {
                entry.1 += v;
                entry.2 += 1;
            }
        }

        let (group_keys, means): (Vec<Value>, Vec<Value>) = groups
            .into_values()
            .map(|(key, sum, count)| {
                let mean = if count == 0 {
                    Value::Null
                } else {
                    Value::Float(sum / count as f64)
                };
                (key, mean)
            })
            .unzip();

        Table::from_columns(vec![(by.to_string(), group_keys), (alias.to_string(), means)])
    }

    fn take_rows(&self, indices: &[usize]) -> Table {
        let columns = self
            .columns
            .iter()
            .map(|(name, values)| {
                (
                    name.clone(),
                    indices.iter().map(|i| values[*i].clone()).collect(),
                )
            })
            .collect();
        Table { columns }
    }
}

/// A borrowed view of one row.
#[derive(Debug, Clone, Copy)]
pub struct Row<'a> {
    table: &'a Table,
    index: usize,
}

impl<'a> Row<'a> {
    /// Position of the row in its table.
    pub fn index(&self) -> usize {
        self.index
    }

    /// Cell in the named column.
    pub fn get(&self, column: &str) -> Option<&'a Value> {
        self.table.get(self.index, column)
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (rows, cols) = self.shape();
        writeln!(f, "shape: ({}, {})", rows, cols)?;
        writeln!(f, "{}", self.column_names().join(" | "))?;
        for row in self.rows().take(DISPLAY_ROWS) {
            let cells: Vec<String> = self
                .columns
                .values()
                .map(|values| values[row.index].to_string())
                .collect();
            writeln!(f, "{}", cells.join(" | "))?;
        }
        if rows > DISPLAY_ROWS {
            writeln!(f, "… {} more rows", rows - DISPLAY_ROWS)?;
        }
        Ok(())
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.columns.len()))?;
        for (name, values) in &self.columns {
            map.serialize_entry(name, values)?;
        }
        map.end()
    }
}

impl<'de> Deserialize<'de> for Table {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = JsonValue::deserialize(deserializer)?;
        Table::from_json(&raw).map_err(D::Error::custom)
    }
}

/// Promote mixed int/float columns and reject other kind mixes.
fn normalize_column(name: &str, values: Vec<Value>) -> Result<Vec<Value>> {
    let mut first_kind: Option<&'static str> = None;
    let mut has_float = false;

    for value in values.iter().filter(|v| !v.is_null()) {
        let kind = match value {
            Value::Int(_) | Value::Float(_) => "number",
            other => other.kind(),
        };
        has_float |= matches!(value, Value::Float(_));
        match first_kind {
            None => first_kind = Some(kind),
            Some(existing) if existing != kind => {
                return Err(BridgeError::InvalidTable(format!(
                    "column '{}' mixes {} and {} values",
                    name, existing, kind
                )));
            }
            _ => {}
        }
    }

    if !has_float {
        return Ok(values);
    }

    Ok(values
        .into_iter()
        .map(|v| match v {
            Value::Int(i) => Value::Float(i as f64),
            other => other,
        })
        .collect())
}

pub(crate) fn json_kind(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "bool",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
