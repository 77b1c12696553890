//! Columnar tables and the scalar values they hold.

mod frame;
mod reader;
mod value;

pub use frame::{Row, Table};
pub(crate) use frame::json_kind;
pub use reader::{CsvConfig, CsvReader};
pub use value::Value;
pub(crate) use value::integral_i64;
