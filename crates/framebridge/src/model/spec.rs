//! Model definitions: fields, configuration and class-level attributes.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;

use crate::schema::{DataFrameModel, SchemaRef};

/// Attribute names the model framework regenerates itself.
const RESERVED_ATTRIBUTES: &[&str] = &["model_fields", "model_config", "__annotations__"];

/// Declared type of a model field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Int,
    Float,
    Str,
    Bool,
    /// Any JSON value or table, stored as given.
    Any,
    /// A table, optionally parameterized by the schema it should satisfy.
    ///
    /// Without bridging the model has no validator for this type: it needs
    /// `arbitrary_types_allowed` and then only checks that the input already
    /// is a [`Table`](crate::Table).
    Table(Option<SchemaRef>),
    /// Accepts any input and coerces it to a table validated by the schema
    /// before storing it. Produced by [`FieldBridge`](crate::FieldBridge).
    Bridged(SchemaRef),
    /// First-class validated table, stored together with its schema.
    Wrapped(SchemaRef),
}

impl FieldType {
    /// `Table` parameterized by a dataframe model's schema.
    pub fn table<S: DataFrameModel>() -> Self {
        FieldType::Table(Some(S::schema()))
    }

    /// `Wrapped` with a dataframe model's schema.
    pub fn wrapped<S: DataFrameModel>() -> Self {
        FieldType::Wrapped(S::schema())
    }

    /// Schema attached to the type, if any.
    pub fn schema(&self) -> Option<&SchemaRef> {
        match self {
            FieldType::Table(schema) => schema.as_ref(),
            FieldType::Bridged(schema) | FieldType::Wrapped(schema) => Some(schema),
            _ => None,
        }
    }

    pub fn label(&self) -> String {
        match self {
            FieldType::Int => "int".to_string(),
            FieldType::Float => "float".to_string(),
            FieldType::Str => "str".to_string(),
            FieldType::Bool => "bool".to_string(),
            FieldType::Any => "any".to_string(),
            FieldType::Table(None) => "Table".to_string(),
            FieldType::Table(Some(s)) => format!("Table[{}]", s.name),
            FieldType::Bridged(s) => format!("Bridged[{}]", s.name),
            FieldType::Wrapped(s) => format!("Validated[{}]", s.name),
        }
    }
}

/// One declared field.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    pub name: String,
    pub ty: FieldType,
    /// Raw value used when the input omits the field.
    pub default: Option<JsonValue>,
}

/// Handling of input keys that match no declared field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtraPolicy {
    /// Drop them.
    #[default]
    Ignore,
    /// Keep them as JSON values.
    Allow,
    /// Reject them.
    Forbid,
}

/// Model configuration flags.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct ModelConfig {
    /// Permit field types outside the model's built-in vocabulary.
    #[serde(default)]
    pub arbitrary_types_allowed: bool,
    #[serde(default)]
    pub extra: ExtraPolicy,
    /// Re-validate values passed to [`ModelInstance::set`](super::ModelInstance::set).
    #[serde(default)]
    pub validate_assignment: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// A declared object model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelSpec {
    /// Model name, used for registrations and error reports.
    pub name: String,
    /// Fields in declaration order.
    pub fields: IndexMap<String, FieldSpec>,
    pub config: ModelConfig,
    /// Class-level attributes.
    pub attributes: IndexMap<String, JsonValue>,
}

impl ModelSpec {
    /// Start declaring a model.
    pub fn builder(name: impl Into<String>) -> ModelBuilder {
        ModelBuilder {
            name: name.into(),
            fields: IndexMap::new(),
            config: None,
            attributes: IndexMap::new(),
            base: None,
        }
    }

    /// Start declaring a model that inherits from `base`.
    pub fn derive(name: impl Into<String>, base: &ModelSpec) -> ModelBuilder {
        Self::builder(name).inherit(base)
    }

    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.get(name)
    }

    pub fn field_names(&self) -> Vec<&str> {
        self.fields.keys().map(String::as_str).collect()
    }

    /// Names of fields whose type is [`FieldType::Bridged`].
    pub fn bridged_fields(&self) -> Vec<&str> {
        self.fields
            .values()
            .filter(|f| matches!(f.ty, FieldType::Bridged(_)))
            .map(|f| f.name.as_str())
            .collect()
    }
}

/// Builder for [`ModelSpec`].
#[derive(Debug, Clone)]
pub struct ModelBuilder {
    name: String,
    fields: IndexMap<String, FieldSpec>,
    config: Option<ModelConfig>,
    attributes: IndexMap<String, JsonValue>,
    base: Option<ModelSpec>,
}

impl ModelBuilder {
    /// Declare a required field. Redeclaring a name replaces it in place.
    pub fn field(self, name: impl Into<String>, ty: FieldType) -> Self {
        self.declare(name.into(), ty, None)
    }

    /// Declare a field with a default raw value.
    pub fn field_with_default(
        self,
        name: impl Into<String>,
        ty: FieldType,
        default: JsonValue,
    ) -> Self {
        self.declare(name.into(), ty, Some(default))
    }

    pub fn config(mut self, config: ModelConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set a class-level attribute.
    pub fn attribute(mut self, name: impl Into<String>, value: JsonValue) -> Self {
        self.attributes.insert(name.into(), value);
        self
    }

    /// Inherit fields, configuration and attributes from `base`.
    ///
    /// Base fields come first; fields and attributes declared on this builder
    /// win over inherited ones, and the builder's own config replaces the
    /// base config.
    pub fn inherit(mut self, base: &ModelSpec) -> Self {
        self.base = Some(base.clone());
        self
    }

    pub fn build(self) -> ModelSpec {
        let (fields, config, attributes) = match self.base {
            Some(base) => {
                let mut fields = base.fields;
                for (name, field) in self.fields {
                    fields.insert(name, field);
                }
                let mut attributes = self.attributes;
                merge_attributes(&mut attributes, &base.attributes);
                (fields, self.config.unwrap_or(base.config), attributes)
            }
            None => (
                self.fields,
                self.config.unwrap_or_default(),
                self.attributes,
            ),
        };

        ModelSpec {
            name: self.name,
            fields,
            config,
            attributes,
        }
    }

    fn declare(mut self, name: String, ty: FieldType, default: Option<JsonValue>) -> Self {
        self.fields.insert(
            name.clone(),
            FieldSpec { name, ty, default },
        );
        self
    }
}

/// Copy attributes from `source` into `target`, skipping dunder and reserved
/// names and never replacing an attribute `target` already defines.
pub(crate) fn merge_attributes(
    target: &mut IndexMap<String, JsonValue>,
    source: &IndexMap<String, JsonValue>,
) {
    for (name, value) in source {
        if is_dunder(name) || RESERVED_ATTRIBUTES.contains(&name.as_str()) {
            continue;
        }
        if !target.contains_key(name) {
            target.insert(name.clone(), value.clone());
        }
    }
}

pub(crate) fn is_dunder(name: &str) -> bool {
    name.len() > 4 && name.starts_with("__") && name.ends_with("__")
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn base() -> ModelSpec {
        ModelSpec::builder("Base")
            .field("x", FieldType::Int)
            .field("label", FieldType::Str)
            .config(ModelConfig {
                extra: ExtraPolicy::Forbid,
                ..ModelConfig::default()
            })
            .attribute("version", json!("1"))
            .attribute("shared", json!("base"))
            .attribute("__module__", json!("base_module"))
            .attribute("model_config", json!({}))
            .build()
    }

    #[test]
    fn test_derive_merges_attributes() {
        let derived = ModelSpec::derive("Derived", &base())
            .attribute("shared", json!("derived"))
            .build();

        assert_eq!(derived.attributes["version"], json!("1"));
        assert_eq!(derived.attributes["shared"], json!("derived"));
        assert!(!derived.attributes.contains_key("__module__"));
        assert!(!derived.attributes.contains_key("model_config"));
    }

    #[test]
    fn test_derive_keeps_base_fields_first() {
        let derived = ModelSpec::derive("Derived", &base())
            .field("extra_field", FieldType::Bool)
            .field("x", FieldType::Float)
            .build();

        assert_eq!(derived.field_names(), vec!["x", "label", "extra_field"]);
        assert_eq!(derived.field("x").unwrap().ty, FieldType::Float);
        assert_eq!(derived.config.extra, ExtraPolicy::Forbid);
    }

    #[test]
    fn test_is_dunder() {
        assert!(is_dunder("__module__"));
        assert!(!is_dunder("__"));
        assert!(!is_dunder("_private"));
        assert!(!is_dunder("public"));
    }
}
