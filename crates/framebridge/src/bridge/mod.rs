//! Bridging tabular schemas into object-model validation.

mod coercer;
mod field_bridge;
mod registry;

pub use coercer::{RawValue, TableCoercer};
pub use field_bridge::{FieldBridge, apply_global};
pub use registry::{SchemaInfo, SchemaRegistry};
