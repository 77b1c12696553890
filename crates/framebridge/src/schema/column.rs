//! Column definition.

use serde::{Deserialize, Serialize};

use crate::table::Value;

use super::types::{Constraint, DataType};

/// Declared shape of one column.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnSpec {
    /// Column name.
    pub name: String,
    /// Declared value type.
    pub dtype: DataType,
    /// Whether null values are allowed.
    #[serde(default)]
    pub nullable: bool,
    /// Convert near-compatible values to `dtype` before checking.
    #[serde(default)]
    pub coerce: bool,
    /// Per-value constraints.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constraints: Vec<Constraint>,
    /// Human-readable description.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ColumnSpec {
    /// Create a non-nullable column with no constraints.
    pub fn new(name: impl Into<String>, dtype: DataType) -> Self {
        Self {
            name: name.into(),
            dtype,
            nullable: false,
            coerce: false,
            constraints: Vec::new(),
            description: None,
        }
    }

    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub fn coerce(mut self) -> Self {
        self.coerce = true;
        self
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.description = Some(text.into());
        self
    }

    /// Add an arbitrary constraint.
    pub fn constraint(mut self, constraint: Constraint) -> Self {
        self.constraints.push(constraint);
        self
    }

    /// Values must be `>= min`.
    pub fn ge(self, min: f64) -> Self {
        self.constraint(Constraint::Range {
            min: Some(min),
            max: None,
        })
    }

    /// Values must be `<= max`.
    pub fn le(self, max: f64) -> Self {
        self.constraint(Constraint::Range {
            min: None,
            max: Some(max),
        })
    }

    pub fn in_range(self, min: f64, max: f64) -> Self {
        self.constraint(Constraint::Range {
            min: Some(min),
            max: Some(max),
        })
    }

    pub fn gt(self, value: f64) -> Self {
        self.constraint(Constraint::GreaterThan { value })
    }

    pub fn lt(self, value: f64) -> Self {
        self.constraint(Constraint::LessThan { value })
    }

    /// Values must be one of `values`.
    pub fn isin<I, V>(self, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.constraint(Constraint::SetMembership {
            values: values.into_iter().map(Into::into).collect(),
        })
    }

    pub fn unique(self) -> Self {
        self.constraint(Constraint::Unique)
    }

    /// Strings must fully match `pattern`.
    pub fn matches(self, pattern: impl Into<String>) -> Self {
        self.constraint(Constraint::Pattern {
            value: pattern.into(),
        })
    }

    pub fn str_length(self, min: Option<usize>, max: Option<usize>) -> Self {
        self.constraint(Constraint::Length { min, max })
    }

    /// Whether the column carries a uniqueness constraint.
    pub fn is_unique(&self) -> bool {
        self.constraints
            .iter()
            .any(|c| matches!(c, Constraint::Unique))
    }
}
