//! Object-model error vocabulary.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

use crate::error::BridgeError;
use crate::validation::SchemaViolation;

/// Category of a field failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldErrorKind {
    /// Required field absent from the input.
    Missing,
    /// Input key not declared and the model forbids extras.
    ExtraForbidden,
    /// Input has the wrong type for the field.
    TypeMismatch,
    /// The field type cannot be validated under the model's configuration.
    UnsupportedType,
    /// A pre-validation step rejected the value.
    Value,
    /// No schema is registered for a bridged field.
    NotRegistered,
}

impl FieldErrorKind {
    pub fn label(&self) -> &'static str {
        match self {
            FieldErrorKind::Missing => "missing",
            FieldErrorKind::ExtraForbidden => "extra_forbidden",
            FieldErrorKind::TypeMismatch => "type_mismatch",
            FieldErrorKind::UnsupportedType => "unsupported_type",
            FieldErrorKind::Value => "value_error",
            FieldErrorKind::NotRegistered => "not_registered",
        }
    }
}

impl fmt::Display for FieldErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Failure of a single field.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FieldError {
    /// Field name.
    pub field: String,
    pub kind: FieldErrorKind,
    pub message: String,
    /// Schema violation behind a table field failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub violation: Option<SchemaViolation>,
}

impl FieldError {
    pub fn new(field: impl Into<String>, kind: FieldErrorKind, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            kind,
            message: message.into(),
            violation: None,
        }
    }

    /// Translate a coercion failure into a field-local value error.
    pub fn from_bridge(field: impl Into<String>, error: BridgeError) -> Self {
        let field = field.into();
        match error {
            BridgeError::NotRegistered { .. } => {
                FieldError::new(field, FieldErrorKind::NotRegistered, error.to_string())
            }
            BridgeError::SchemaViolation(violation) => Self {
                message: format!("Value error, Schema validation error: {}", violation),
                field,
                kind: FieldErrorKind::Value,
                violation: Some(violation),
            },
            other => FieldError::new(
                field,
                FieldErrorKind::Value,
                format!("Value error, {}", other),
            ),
        }
    }
}

impl fmt::Display for FieldError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\n  {} [type={}]", self.field, self.message, self.kind)
    }
}

/// Every field failure of one validation call.
#[derive(Debug, Clone, PartialEq, Serialize, Error)]
pub struct ValidationError {
    /// Model name.
    pub model: String,
    pub errors: Vec<FieldError>,
}

impl ValidationError {
    pub fn new(model: impl Into<String>, errors: Vec<FieldError>) -> Self {
        Self {
            model: model.into(),
            errors,
        }
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    /// Names of the failing fields, in validation order.
    pub fn fields(&self) -> Vec<&str> {
        self.errors.iter().map(|e| e.field.as_str()).collect()
    }

    /// The first error for `field`.
    pub fn error_for(&self, field: &str) -> Option<&FieldError> {
        self.errors.iter().find(|e| e.field == field)
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} validation error{} for {}",
            self.errors.len(),
            if self.errors.len() == 1 { "" } else { "s" },
            self.model
        )?;
        for error in &self.errors {
            write!(f, "\n{}", error)?;
        }
        Ok(())
    }
}
