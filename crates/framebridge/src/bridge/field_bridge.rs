//! Rewriting table-typed model fields into self-validating fields.

use indexmap::IndexMap;

use crate::model::{FieldType, ModelSpec, is_dunder, merge_attributes};

use super::registry::SchemaRegistry;

/// Bridges schema-parameterized table fields of a model.
///
/// Every `FieldType::Table(Some(schema))` field is registered under
/// `(model, field)` and becomes `FieldType::Bridged(schema)`, so that the
/// model coerces and validates raw input against the schema before its own
/// checks.
pub struct FieldBridge<'r> {
    registry: &'r mut SchemaRegistry,
}

impl<'r> FieldBridge<'r> {
    pub fn new(registry: &'r mut SchemaRegistry) -> Self {
        Self { registry }
    }

    /// Bridge the table fields of `spec`.
    ///
    /// A spec without schema-parameterized table fields is returned as is,
    /// which makes applying the bridge twice the same as applying it once.
    pub fn apply(&mut self, spec: ModelSpec) -> ModelSpec {
        let targets: Vec<String> = spec
            .fields
            .values()
            .filter(|f| matches!(f.ty, FieldType::Table(Some(_))))
            .map(|f| f.name.clone())
            .collect();

        if targets.is_empty() {
            return spec;
        }

        let ModelSpec {
            name,
            mut fields,
            mut config,
            attributes,
        } = spec;

        for field_name in &targets {
            let Some(field) = fields.get_mut(field_name) else {
                continue;
            };
            if let FieldType::Table(Some(schema)) = &field.ty {
                let schema = schema.clone();
                self.registry.register(&name, field_name, schema.clone());
                field.ty = FieldType::Bridged(schema);
            }
        }

        config.arbitrary_types_allowed = true;

        // Dunder attributes stay with the rebuilt model; the rest is merged in
        // like any derived model's attributes.
        let mut rebuilt: IndexMap<_, _> = attributes
            .iter()
            .filter(|(k, _)| is_dunder(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        merge_attributes(&mut rebuilt, &attributes);

        log::debug!("bridged {} field(s) of model '{}'", targets.len(), name);

        ModelSpec {
            name,
            fields,
            config,
            attributes: rebuilt,
        }
    }
}

/// Bridge `spec` using the process-wide registry.
pub fn apply_global(spec: ModelSpec) -> ModelSpec {
    let mut registry = SchemaRegistry::global()
        .write()
        .unwrap_or_else(|poisoned| poisoned.into_inner());
    FieldBridge::new(&mut registry).apply(spec)
}
