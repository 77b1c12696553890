//! Tabular schema definitions: column types, constraints and named schemas.

mod column;
mod definition;
mod model;
mod types;

pub use column::ColumnSpec;
pub use definition::{SchemaBuilder, SchemaDefinition, SchemaRef};
pub use model::DataFrameModel;
pub use types::{Constraint, DataType};
