//! Schema validation engine: checks a table against a schema definition.

mod validator;
mod violation;

pub use validator::{SchemaValidator, ValidatorConfig};
pub use violation::{CheckKind, FailureCase, SchemaViolation};
