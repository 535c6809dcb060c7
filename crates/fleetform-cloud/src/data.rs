//! Local resource data
//!
//! [`ResourceData`] is the typed key/value view of a single resource that the
//! host persists between operations: the attribute map, the unique
//! identifier and any per-operation timeout overrides.

use crate::error::{CloudError, FieldError, Result};
use crate::schema::ResourceSchema;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::time::Duration;

/// Lifecycle operation kinds that carry a timeout
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OperationKind {
    Create,
    Read,
    Update,
    Delete,
}

impl std::fmt::Display for OperationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OperationKind::Create => write!(f, "create"),
            OperationKind::Read => write!(f, "read"),
            OperationKind::Update => write!(f, "update"),
            OperationKind::Delete => write!(f, "delete"),
        }
    }
}

/// Per-operation timeouts
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Timeouts {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub create: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub read: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub update: Option<Duration>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub delete: Option<Duration>,
}

impl Timeouts {
    pub fn get(&self, kind: OperationKind) -> Option<Duration> {
        match kind {
            OperationKind::Create => self.create,
            OperationKind::Read => self.read,
            OperationKind::Update => self.update,
            OperationKind::Delete => self.delete,
        }
    }

    pub fn set(&mut self, kind: OperationKind, timeout: Duration) {
        let slot = match kind {
            OperationKind::Create => &mut self.create,
            OperationKind::Read => &mut self.read,
            OperationKind::Update => &mut self.update,
            OperationKind::Delete => &mut self.delete,
        };
        *slot = Some(timeout);
    }
}

/// Local state of one resource
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ResourceData {
    /// Unique identifier; empty when the resource does not exist
    #[serde(default)]
    id: String,

    /// Field values
    #[serde(default)]
    attributes: BTreeMap<String, Value>,

    #[serde(default)]
    pub timeouts: Timeouts,
}

impl ResourceData {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build resource data from a JSON object of field values
    pub fn from_config(config: Value) -> Result<Self> {
        let Value::Object(map) = config else {
            return Err(CloudError::InvalidConfig(format!(
                "resource configuration must be an object, got {}",
                config
            )));
        };

        let mut data = Self::new();
        for (key, value) in map {
            data.set(key, value);
        }
        Ok(data)
    }

    /// Builder-style setter
    pub fn with(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.set(name, value);
        self
    }

    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.set_id(id);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn set_id(&mut self, id: impl Into<String>) {
        self.id = id.into();
    }

    /// Drop the identifier, marking the resource as absent
    pub fn clear_id(&mut self) {
        self.id.clear();
    }

    pub fn is_absent(&self) -> bool {
        self.id.is_empty()
    }

    /// Raw value of a field. Unset and `null` fields both read as `None`.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name).filter(|v| !v.is_null())
    }

    /// Value of a field when it is set to something other than its zero value
    pub fn get_ok(&self, name: &str) -> Option<&Value> {
        self.get(name).filter(|v| match v {
            Value::String(s) => !s.is_empty(),
            Value::Bool(b) => *b,
            Value::Number(n) => n.as_i64() != Some(0),
            _ => true,
        })
    }

    /// String value, empty when unset
    pub fn get_str(&self, name: &str) -> &str {
        self.get(name).and_then(Value::as_str).unwrap_or_default()
    }

    /// Bool value, false when unset
    pub fn get_bool(&self, name: &str) -> bool {
        self.get(name).and_then(Value::as_bool).unwrap_or_default()
    }

    /// Integer value, zero when unset
    pub fn get_int(&self, name: &str) -> i64 {
        self.get(name).and_then(Value::as_i64).unwrap_or_default()
    }

    /// Set a field. Writing `null` unsets it.
    pub fn set(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        let name = name.into();
        match value.into() {
            Value::Null => {
                self.attributes.remove(&name);
            }
            value => {
                self.attributes.insert(name, value);
            }
        }
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.attributes.iter()
    }
}

/// Schema-checked writer that collects every failing field
///
/// Writes are applied as they come; failures are reported together by
/// [`FieldWriter::finish`].
pub struct FieldWriter<'a> {
    data: &'a mut ResourceData,
    schema: &'a ResourceSchema,
    errors: Vec<FieldError>,
}

impl<'a> FieldWriter<'a> {
    pub fn new(data: &'a mut ResourceData, schema: &'a ResourceSchema) -> Self {
        Self {
            data,
            schema,
            errors: Vec::new(),
        }
    }

    pub fn set(&mut self, name: &str, value: impl Into<Value>) -> &mut Self {
        let value = value.into();
        let schema = self.schema;
        match schema.get(name) {
            None => self
                .errors
                .push(FieldError::new(name, "not declared in the schema")),
            Some(field) if !field.field_type.accepts(&value) => self.errors.push(FieldError::new(
                name,
                format!("expected {}, got {}", field.field_type, value),
            )),
            Some(_) => self.data.set(name, value),
        }
        self
    }

    /// Write a value that may have failed to decode
    pub fn set_result<V: Into<Value>>(&mut self, name: &str, value: Result<V>) -> &mut Self {
        match value {
            Ok(value) => self.set(name, value),
            Err(err) => {
                self.errors.push(FieldError::new(name, err.to_string()));
                self
            }
        }
    }

    pub fn finish(self) -> Result<()> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(CloudError::PartialFailure(self.errors))
        }
    }
}
