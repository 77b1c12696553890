//! framebridge: schema-validated tables as first-class fields of typed object models.
//!
//! Two validation systems meet here. A tabular schema ([`SchemaDefinition`])
//! describes columns, their types and per-column constraints. An object model
//! ([`ModelSpec`], or any `serde`-derived struct) describes typed fields. This
//! crate lets a table-typed field inside an object model validate itself
//! against its schema whenever the model validates.
//!
//! # Mechanisms
//!
//! - **Wrapper type**: [`Validated<S>`] is a table bound to the schema of a
//!   [`DataFrameModel`]. It implements `Serialize`/`Deserialize`, so it can be
//!   used directly as a field of any serde struct.
//! - **Field bridge**: [`FieldBridge`] rewrites the table-typed fields of a
//!   [`ModelSpec`] so that raw input is coerced and validated before the
//!   model's own checks run, registering each field in a [`SchemaRegistry`].
//!
//! # Example
//!
//! ```
//! use framebridge::{dataframe_model, ColumnSpec, DataType, SchemaDefinition, Validated};
//! use serde::Deserialize;
//!
//! dataframe_model! {
//!     pub struct Users => SchemaDefinition::builder("Users")
//!         .column(ColumnSpec::new("user_id", DataType::Int).ge(1.0))
//!         .column(ColumnSpec::new("username", DataType::Str).unique())
//!         .build();
//! }
//!
//! #[derive(Deserialize)]
//! struct AppData {
//!     users: Validated<Users>,
//!     app_version: String,
//! }
//!
//! let data: AppData = serde_json::from_str(
//!     r#"{"users": {"user_id": [1, 2], "username": ["alice", "bob"]}, "app_version": "1.0.0"}"#,
//! ).unwrap();
//! assert_eq!(data.users.len(), 2);
//! assert_eq!(data.app_version, "1.0.0");
//! ```

pub mod bridge;
pub mod error;
pub mod model;
pub mod schema;
pub mod table;
pub mod validation;

mod wrapper;

pub use bridge::{FieldBridge, RawValue, SchemaInfo, SchemaRegistry, TableCoercer};
pub use error::{BridgeError, Result};
pub use model::{
    ExtraPolicy, FieldError, FieldErrorKind, FieldSpec, FieldType, FieldValue, ModelConfig,
    ModelInstance, ModelSpec, ValidationError,
};
pub use schema::{ColumnSpec, Constraint, DataFrameModel, DataType, SchemaDefinition, SchemaRef};
pub use table::{CsvConfig, CsvReader, Table, Value};
pub use validation::{CheckKind, FailureCase, SchemaValidator, SchemaViolation, ValidatorConfig};
pub use wrapper::Validated;

#[doc(hidden)]
pub mod __private {
    pub use once_cell::sync::Lazy;
}
