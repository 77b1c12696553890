//! Core type definitions for schema representation.

use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::table::{Value, integral_i64};

/// Declared value type of a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataType {
    /// Whole numbers.
    Int,
    /// Floating-point numbers.
    Float,
    /// Text values.
    Str,
    /// Boolean values.
    Bool,
    /// Calendar dates.
    Date,
}

impl DataType {
    /// Returns true if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(self, DataType::Int | DataType::Float)
    }

    /// Whether a non-null value already has this type. Nulls always match.
    pub fn matches(&self, value: &Value) -> bool {
        matches!(
            (self, value),
            (_, Value::Null)
                | (DataType::Int, Value::Int(_))
                | (DataType::Float, Value::Float(_))
                | (DataType::Str, Value::Str(_))
                | (DataType::Bool, Value::Bool(_))
                | (DataType::Date, Value::Date(_))
        )
    }

    /// Convert a near-compatible value to this type.
    ///
    /// Returns `None` when the value cannot be represented. Nulls stay null.
    pub fn coerce(&self, value: &Value) -> Option<Value> {
        if value.is_null() {
            return Some(Value::Null);
        }
        match self {
            DataType::Int => match value {
                Value::Int(i) => Some(Value::Int(*i)),
                Value::Float(f) => integral_i64(*f).map(Value::Int),
                Value::Bool(b) => Some(Value::Int(i64::from(*b))),
                Value::Str(s) => s.trim().parse::<i64>().ok().map(Value::Int),
                _ => None,
            },
            DataType::Float => match value {
                Value::Int(i) => Some(Value::Float(*i as f64)),
                Value::Float(f) => Some(Value::Float(*f)),
                Value::Str(s) => s.trim().parse::<f64>().ok().map(Value::Float),
                _ => None,
            },
            DataType::Str => match value {
                Value::Str(s) => Some(Value::Str(s.clone())),
                other => Some(Value::Str(other.to_string())),
            },
            DataType::Bool => match value {
                Value::Bool(b) => Some(Value::Bool(*b)),
                Value::Int(0) => Some(Value::Bool(false)),
                Value::Int(1) => Some(Value::Bool(true)),
                Value::Str(s) => Value::parse_bool(s).map(Value::Bool),
                _ => None,
            },
            DataType::Date => match value {
                Value::Date(d) => Some(Value::Date(*d)),
                Value::Str(s) => NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d")
                    .ok()
                    .map(Value::Date),
                _ => None,
            },
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DataType::Int => "int",
            DataType::Float => "float",
            DataType::Str => "str",
            DataType::Bool => "bool",
            DataType::Date => "date",
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A constraint on column values. Nulls are never checked by constraints.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Constraint {
    /// Numeric values must lie in an inclusive range.
    Range { min: Option<f64>, max: Option<f64> },
    /// Numeric values must be strictly greater than `value`.
    GreaterThan { value: f64 },
    /// Numeric values must be strictly less than `value`.
    LessThan { value: f64 },
    /// Values must be in a specific set.
    SetMembership { values: Vec<Value> },
    /// Values must be unique.
    Unique,
    /// String values must fully match a regex pattern.
    Pattern { value: String },
    /// String length constraint.
    Length { min: Option<usize>, max: Option<usize> },
}

impl Constraint {
    /// Name of the check, as reported in violations.
    pub fn name(&self) -> String {
        match self {
            Constraint::Range {
                min: Some(min),
                max: Some(max),
            } => format!("in_range({}, {})", min, max),
            Constraint::Range {
                min: Some(min),
                max: None,
            } => format!("greater_than_or_equal_to({})", min),
            Constraint::Range {
                min: None,
                max: Some(max),
            } => format!("less_than_or_equal_to({})", max),
            Constraint::Range {
                min: None,
                max: None,
            } => "in_range(-inf, inf)".to_string(),
            Constraint::GreaterThan { value } => format!("greater_than({})", value),
            Constraint::LessThan { value } => format!("less_than({})", value),
            Constraint::SetMembership { values } => format!(
                "isin([{}])",
                values
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join(", ")
            ),
            Constraint::Unique => "field_uniqueness".to_string(),
            Constraint::Pattern { value } => format!("str_matches('{}')", value),
            Constraint::Length { min, max } => format!(
                "str_length({}, {})",
                min.map(|v| v.to_string()).unwrap_or_else(|| "None".to_string()),
                max.map(|v| v.to_string()).unwrap_or_else(|| "None".to_string())
            ),
        }
    }
}
