//! Validating raw input into model instances.

use indexmap::IndexMap;
use serde::ser::SerializeMap;
use serde::{Serialize, Serializer};
use serde_json::Value as JsonValue;

use crate::bridge::{RawValue, SchemaRegistry, TableCoercer};
use crate::schema::SchemaRef;
use crate::table::{Table, Value, integral_i64, json_kind};

use super::error::{FieldError, FieldErrorKind, ValidationError};
use super::spec::{ExtraPolicy, FieldType, ModelSpec};

/// Field name used for failures that concern the whole input.
const ROOT_FIELD: &str = "__root__";

/// A validated field value.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Int(i64),
    Float(f64),
    Str(String),
    Bool(bool),
    Json(JsonValue),
    Table(Table),
    /// A table together with the schema that validated it.
    Validated { schema: SchemaRef, table: Table },
}

impl FieldValue {
    pub fn as_table(&self) -> Option<&Table> {
        match self {
            FieldValue::Table(table) | FieldValue::Validated { table, .. } => Some(table),
            _ => None,
        }
    }

    /// Plain data form: tables become column mappings.
    pub fn to_json(&self) -> JsonValue {
        match self {
            FieldValue::Int(i) => JsonValue::from(*i),
            FieldValue::Float(f) => serde_json::Number::from_f64(*f)
                .map(JsonValue::Number)
                .unwrap_or(JsonValue::Null),
            FieldValue::Str(s) => JsonValue::String(s.clone()),
            FieldValue::Bool(b) => JsonValue::Bool(*b),
            FieldValue::Json(v) => v.clone(),
            FieldValue::Table(table) | FieldValue::Validated { table, .. } => table.to_json(),
        }
    }

    /// Store a raw value without validating it.
    fn from_raw(raw: RawValue) -> Self {
        match raw {
            RawValue::Missing => FieldValue::Json(JsonValue::Null),
            RawValue::Json(value) => FieldValue::Json(value),
            RawValue::Columns(columns) => FieldValue::Json(JsonValue::Object(
                columns
                    .into_iter()
                    .map(|(name, values)| {
                        (name, values.iter().map(Value::to_json).collect())
                    })
                    .collect(),
            )),
            RawValue::Table(table) => FieldValue::Table(table),
            RawValue::Wrapped { table, .. } => FieldValue::Table(table),
        }
    }
}

impl Serialize for FieldValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            FieldValue::Table(table) | FieldValue::Validated { table, .. } => {
                table.serialize(serializer)
            }
            other => other.to_json().serialize(serializer),
        }
    }
}

/// A validated model.
#[derive(Debug, Clone, PartialEq)]
pub struct ModelInstance {
    spec: ModelSpec,
    values: IndexMap<String, FieldValue>,
}

impl ModelSpec {
    /// Validate raw field values into an instance.
    ///
    /// Every field is checked; all failures are reported together.
    pub fn validate(
        &self,
        input: IndexMap<String, RawValue>,
    ) -> Result<ModelInstance, ValidationError> {
        self.validate_with(input, &TableCoercer::default())
    }

    /// Validate a JSON object into an instance.
    pub fn validate_json(&self, input: &JsonValue) -> Result<ModelInstance, ValidationError> {
        let JsonValue::Object(map) = input else {
            return Err(ValidationError::new(
                &self.name,
                vec![FieldError::new(
                    ROOT_FIELD,
                    FieldErrorKind::TypeMismatch,
                    format!("Input should be an object, got {}", json_kind(input)),
                )],
            ));
        };
        let input = map
            .iter()
            .map(|(k, v)| (k.clone(), RawValue::from(v.clone())))
            .collect();
        self.validate(input)
    }

    /// Validate with a specific coercer.
    pub fn validate_with(
        &self,
        mut input: IndexMap<String, RawValue>,
        coercer: &TableCoercer,
    ) -> Result<ModelInstance, ValidationError> {
        let mut values = IndexMap::with_capacity(self.fields.len());
        let mut errors = Vec::new();

        for field in self.fields.values() {
            let raw = match input.shift_remove(&field.name) {
                Some(raw) => raw,
                None => match &field.default {
                    Some(default) => RawValue::from(default.clone()),
                    None => {
                        errors.push(FieldError::new(
                            &field.name,
                            FieldErrorKind::Missing,
                            "Field required",
                        ));
                        continue;
                    }
                },
            };

            match self.validate_field(&field.name, &field.ty, raw, coercer) {
                Ok(value) => {
                    values.insert(field.name.clone(), value);
                }
                Err(error) => errors.push(error),
            }
        }

        for (name, raw) in input {
            match self.config.extra {
                ExtraPolicy::Ignore => {}
                ExtraPolicy::Allow => {
                    values.insert(name, FieldValue::from_raw(raw));
                }
                ExtraPolicy::Forbid => errors.push(FieldError::new(
                    name,
                    FieldErrorKind::ExtraForbidden,
                    "Extra inputs are not permitted",
                )),
            }
        }

        if !errors.is_empty() {
            log::debug!(
                "model '{}' failed validation on {} field(s)",
                self.name,
                errors.len()
            );
            return Err(ValidationError::new(&self.name, errors));
        }

        Ok(ModelInstance {
            spec: self.clone(),
            values,
        })
    }

    fn validate_field(
        &self,
        name: &str,
        ty: &FieldType,
        raw: RawValue,
        coercer: &TableCoercer,
    ) -> Result<FieldValue, FieldError> {
        let mismatch = |expected: &str, raw: &RawValue| {
            FieldError::new(
                name,
                FieldErrorKind::TypeMismatch,
                format!("Input should be {}, got {}", expected, raw.kind()),
            )
        };

        match ty {
            // Integral floats such as `1.0` are accepted as integers
            FieldType::Int => match &raw {
                RawValue::Json(JsonValue::Number(n)) => n
                    .as_i64()
                    .or_else(|| n.as_f64().and_then(integral_i64))
                    .map(FieldValue::Int)
                    .ok_or_else(|| mismatch("a valid integer", &raw)),
                _ => Err(mismatch("a valid integer", &raw)),
            },
            FieldType::Float => match &raw {
                RawValue::Json(JsonValue::Number(n)) => n
                    .as_f64()
                    .map(FieldValue::Float)
                    .ok_or_else(|| mismatch("a valid number", &raw)),
                _ => Err(mismatch("a valid number", &raw)),
            },
            FieldType::Str => match raw {
                RawValue::Json(JsonValue::String(s)) => Ok(FieldValue::Str(s)),
                other => Err(mismatch("a valid string", &other)),
            },
            FieldType::Bool => match &raw {
                RawValue::Json(JsonValue::Bool(b)) => Ok(FieldValue::Bool(*b)),
                _ => Err(mismatch("a valid boolean", &raw)),
            },
            FieldType::Any => Ok(FieldValue::from_raw(raw)),
            FieldType::Table(_) => {
                if !self.config.arbitrary_types_allowed {
                    return Err(FieldError::new(
                        name,
                        FieldErrorKind::UnsupportedType,
                        format!(
                            "Unable to generate a validator for {}; set arbitrary_types_allowed or bridge the model",
                            ty.label()
                        ),
                    ));
                }
                match raw {
                    RawValue::Table(table) | RawValue::Wrapped { table, .. } => {
                        Ok(FieldValue::Table(table))
                    }
                    other => Err(mismatch("an instance of Table", &other)),
                }
            }
            FieldType::Bridged(schema) => coercer
                .coerce_field(name, raw, schema)
                .map(FieldValue::Table),
            FieldType::Wrapped(schema) => coercer
                .coerce_field(name, raw, schema)
                .map(|table| FieldValue::Validated {
                    schema: schema.clone(),
                    table,
                }),
        }
    }
}

impl ModelInstance {
    /// Name of the model this instance belongs to.
    pub fn model_name(&self) -> &str {
        &self.spec.name
    }

    pub fn spec(&self) -> &ModelSpec {
        &self.spec
    }

    pub fn get(&self, field: &str) -> Option<&FieldValue> {
        self.values.get(field)
    }

    /// Table held by a table-typed field.
    pub fn table(&self, field: &str) -> Option<&Table> {
        self.values.get(field).and_then(FieldValue::as_table)
    }

    /// Assign a field through its accessor.
    ///
    /// Bridged fields always coerce the value against the schema registered
    /// for `(model, field)`. Other declared fields are re-validated when the
    /// model sets `validate_assignment` and stored as given otherwise.
    pub fn set(
        &mut self,
        field: &str,
        raw: impl Into<RawValue>,
        registry: &SchemaRegistry,
    ) -> Result<(), ValidationError> {
        let raw = raw.into();
        let fail = |error: FieldError| ValidationError::new(&self.spec.name, vec![error]);

        let Some(spec) = self.spec.fields.get(field) else {
            if self.spec.config.extra == ExtraPolicy::Allow {
                self.values
                    .insert(field.to_string(), FieldValue::from_raw(raw));
                return Ok(());
            }
            return Err(fail(FieldError::new(
                field,
                FieldErrorKind::ExtraForbidden,
                format!("Object has no field '{}'", field),
            )));
        };

        let value = match &spec.ty {
            FieldType::Bridged(_) => {
                let info = registry
                    .lookup(&self.spec.name, field)
                    .map_err(|e| fail(FieldError::from_bridge(field, e)))?;
                TableCoercer::default()
                    .coerce_field(field, raw, &info.schema)
                    .map(FieldValue::Table)
                    .map_err(fail)?
            }
            ty if self.spec.config.validate_assignment => self
                .spec
                .validate_field(field, ty, raw, &TableCoercer::default())
                .map_err(fail)?,
            _ => FieldValue::from_raw(raw),
        };

        self.values.insert(field.to_string(), value);
        Ok(())
    }

    /// Serialize to plain data: tables become column mappings.
    pub fn to_json(&self) -> JsonValue {
        JsonValue::Object(
            self.values
                .iter()
                .map(|(name, value)| (name.clone(), value.to_json()))
                .collect(),
        )
    }

    pub fn into_values(self) -> IndexMap<String, FieldValue> {
        self.values
    }
}

impl Serialize for ModelInstance {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (name, value) in &self.values {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{ColumnSpec, DataType, SchemaDefinition};
    use crate::model::ModelConfig;
    use serde_json::json;

    fn simple() -> SchemaRef {
        SchemaDefinition::builder("SimpleSchema")
            .column(ColumnSpec::new("str_col", DataType::Str).unique())
            .build()
            .into_ref()
    }

    #[test]
    fn test_scalar_fields() {
        let spec = ModelSpec::builder("Point")
            .field("x", FieldType::Int)
            .field("y", FieldType::Float)
            .field_with_default("label", FieldType::Str, json!("origin"))
            .build();

        let instance = spec.validate_json(&json!({"x": 1, "y": 2.5})).unwrap();
        assert_eq!(instance.get("x"), Some(&FieldValue::Int(1)));
        assert_eq!(instance.get("label"), Some(&FieldValue::Str("origin".into())));
    }

    #[test]
    fn test_int_field_accepts_integral_floats() {
        let spec = ModelSpec::builder("Counter").field("n", FieldType::Int).build();

        let instance = spec.validate_json(&json!({"n": 1.0})).unwrap();
        assert_eq!(instance.get("n"), Some(&FieldValue::Int(1)));

        for bad in [json!(1.5), json!(1e20), json!(u64::MAX)] {
            let err = spec.validate_json(&json!({ "n": bad })).unwrap_err();
            assert_eq!(err.errors[0].kind, FieldErrorKind::TypeMismatch);
        }
    }

    #[test]
    fn test_errors_are_aggregated() {
        let spec = ModelSpec::builder("Point")
            .field("x", FieldType::Int)
            .field("y", FieldType::Float)
            .field("name", FieldType::Str)
            .build();

        let err = spec.validate_json(&json!({"x": "one", "y": 2})).unwrap_err();
        assert_eq!(err.fields(), vec!["x", "name"]);
        assert_eq!(err.errors[1].kind, FieldErrorKind::Missing);
        assert!(err.to_string().starts_with("2 validation errors for Point"));
    }

    #[test]
    fn test_extra_forbid() {
        let spec = ModelSpec::builder("Strict")
            .field("x", FieldType::Int)
            .config(ModelConfig {
                extra: ExtraPolicy::Forbid,
                ..ModelConfig::default()
            })
            .build();
        let err = spec.validate_json(&json!({"x": 1, "y": 2})).unwrap_err();
        assert_eq!(err.errors[0].kind, FieldErrorKind::ExtraForbidden);
        assert_eq!(err.errors[0].field, "y");
    }

    #[test]
    fn test_unbridged_table_needs_arbitrary_types() {
        let spec = ModelSpec::builder("Raw")
            .field("df", FieldType::Table(Some(simple())))
            .build();
        let err = spec
            .validate_json(&json!({"df": {"str_col": ["hello", "world"]}}))
            .unwrap_err();
        assert_eq!(err.errors[0].kind, FieldErrorKind::UnsupportedType);
    }

    #[test]
    fn test_unbridged_table_accepts_instances_only() {
        let spec = ModelSpec::builder("Raw")
            .field("df", FieldType::Table(Some(simple())))
            .config(ModelConfig {
                arbitrary_types_allowed: true,
                ..ModelConfig::default()
            })
            .build();

        let err = spec
            .validate_json(&json!({"df": {"str_col": ["hello", "world"]}}))
            .unwrap_err();
        assert_eq!(err.errors[0].kind, FieldErrorKind::TypeMismatch);

        // Instances pass through without schema validation
        let duplicated = Table::from_json(&json!({"str_col": ["hello", "hello"]})).unwrap();
        let mut input = IndexMap::new();
        input.insert("df".to_string(), RawValue::from(duplicated.clone()));
        let instance = spec.validate(input).unwrap();
        assert_eq!(instance.table("df"), Some(&duplicated));
    }

    #[test]
    fn test_wrapped_field_validates() {
        let spec = ModelSpec::builder("Holder")
            .field("df", FieldType::Wrapped(simple()))
            .build();

        let instance = spec
            .validate_json(&json!({"df": {"str_col": ["hello", "world"]}}))
            .unwrap();
        assert!(matches!(instance.get("df"), Some(FieldValue::Validated { .. })));
        assert_eq!(
            instance.to_json(),
            json!({"df": {"str_col": ["hello", "world"]}})
        );

        let err = spec
            .validate_json(&json!({"df": {"str_col": ["hello", "hello"]}}))
            .unwrap_err();
        assert!(err.errors[0].violation.is_some());
    }

    #[test]
    fn test_root_must_be_object() {
        let spec = ModelSpec::builder("Point").field("x", FieldType::Int).build();
        let err = spec.validate_json(&json!([1, 2])).unwrap_err();
        assert_eq!(err.errors[0].field, ROOT_FIELD);
    }

    #[test]
    fn test_set_without_validate_assignment_stores_raw() {
        let spec = ModelSpec::builder("Point").field("x", FieldType::Int).build();
        let mut instance = spec.validate_json(&json!({"x": 1})).unwrap();
        instance
            .set("x", json!("not a number"), &SchemaRegistry::new())
            .unwrap();
        assert_eq!(instance.get("x"), Some(&FieldValue::Json(json!("not a number"))));
    }

    #[test]
    fn test_set_with_validate_assignment() {
        let spec = ModelSpec::builder("Point")
            .field("x", FieldType::Int)
            .config(ModelConfig {
                validate_assignment: true,
                ..ModelConfig::default()
            })
            .build();
        let mut instance = spec.validate_json(&json!({"x": 1})).unwrap();
        let registry = SchemaRegistry::new();

        assert!(instance.set("x", json!("nope"), &registry).is_err());
        instance.set("x", json!(5), &registry).unwrap();
        assert_eq!(instance.get("x"), Some(&FieldValue::Int(5)));
    }
}
