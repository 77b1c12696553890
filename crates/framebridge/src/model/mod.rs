//! Object models: typed fields validated as a unit.
//!
//! A [`ModelSpec`] declares fields and configuration, and validates raw input
//! into a [`ModelInstance`], aggregating per-field failures into one
//! [`ValidationError`]. Table-typed fields become usable here once
//! [`FieldBridge`](crate::FieldBridge) has rewritten them, or when they are
//! declared as [`FieldType::Wrapped`] from the start.

mod error;
mod instance;
mod spec;

pub use error::{FieldError, FieldErrorKind, ValidationError};
pub use instance::{FieldValue, ModelInstance};
pub use spec::{ExtraPolicy, FieldSpec, FieldType, ModelBuilder, ModelConfig, ModelSpec};
pub(crate) use spec::{is_dunder, merge_attributes};
