//! Statically declared schemas.

use super::definition::SchemaRef;

/// A type that stands for one table schema, the "dataframe model".
///
/// Implementors are usually zero-sized marker types declared with
/// [`dataframe_model!`](crate::dataframe_model), which keeps the schema in a
/// process-lifetime static.
pub trait DataFrameModel: 'static {
    /// The schema this model declares.
    fn schema() -> SchemaRef;

    /// Schema name.
    fn name() -> String {
        Self::schema().name.clone()
    }
}

/// Declare a zero-sized [`DataFrameModel`] backed by a lazily built schema.
///
/// ```
/// use framebridge::{dataframe_model, ColumnSpec, DataFrameModel, DataType, SchemaDefinition};
///
/// dataframe_model! {
///     /// Single unique string column.
///     pub struct Simple => SchemaDefinition::builder("Simple")
///         .column(ColumnSpec::new("str_col", DataType::Str).unique())
///         .build();
/// }
///
/// assert_eq!(Simple::name(), "Simple");
/// ```
#[macro_export]
macro_rules! dataframe_model {
    ($(#[$meta:meta])* $vis:vis struct $name:ident => $schema:expr;) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
        $vis struct $name;

        impl $crate::DataFrameModel for $name {
            fn schema() -> $crate::SchemaRef {
                static SCHEMA: $crate::__private::Lazy<$crate::SchemaRef> =
                    $crate::__private::Lazy::new(|| ::std::sync::Arc::new($schema));
                SCHEMA.clone()
            }
        }
    };
}
