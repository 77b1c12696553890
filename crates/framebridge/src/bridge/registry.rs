//! Registry of schemas attached to bridged model fields.

use std::collections::HashMap;
use std::sync::RwLock;

use once_cell::sync::Lazy;

use crate::error::{BridgeError, Result};
use crate::schema::SchemaRef;

static GLOBAL: Lazy<RwLock<SchemaRegistry>> = Lazy::new(|| RwLock::new(SchemaRegistry::new()));

/// Schema registered for one `(model, field)` pair.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaInfo {
    pub schema: SchemaRef,
}

/// Maps `model name → field name → schema`.
///
/// Registrations are never removed. Registering the same pair again replaces
/// the previous schema.
#[derive(Debug, Clone, Default)]
pub struct SchemaRegistry {
    entries: HashMap<String, HashMap<String, SchemaInfo>>,
}

impl SchemaRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Process-wide registry.
    pub fn global() -> &'static RwLock<SchemaRegistry> {
        &GLOBAL
    }

    /// Record the schema for a model field.
    pub fn register(&mut self, model: &str, field: &str, schema: SchemaRef) {
        log::debug!(
            "registering schema '{}' for {}.{}",
            schema.name,
            model,
            field
        );
        self.entries
            .entry(model.to_string())
            .or_default()
            .insert(field.to_string(), SchemaInfo { schema });
    }

    /// Schema registered for a model field.
    pub fn lookup(&self, model: &str, field: &str) -> Result<&SchemaInfo> {
        self.entries
            .get(model)
            .and_then(|fields| fields.get(field))
            .ok_or_else(|| BridgeError::NotRegistered {
                model: model.to_string(),
                field: field.to_string(),
            })
    }

    pub fn contains(&self, model: &str, field: &str) -> bool {
        self.lookup(model, field).is_ok()
    }

    /// Registered field names of a model, sorted.
    pub fn fields_of(&self, model: &str) -> Vec<&str> {
        let mut fields: Vec<&str> = self
            .entries
            .get(model)
            .map(|fields| fields.keys().map(String::as_str).collect())
            .unwrap_or_default();
        fields.sort_unstable();
        fields
    }

    /// Number of registered `(model, field)` pairs.
    pub fn len(&self) -> usize {
        self.entries.values().map(HashMap::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
