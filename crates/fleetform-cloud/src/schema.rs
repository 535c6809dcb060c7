//! Resource schema definitions
//!
//! A schema describes the fields a resource type accepts, how each field is
//! classified (required, optional, computed) and which fields force the
//! resource to be replaced when they change.

use crate::data::{OperationKind, ResourceData, Timeouts};
use crate::error::{CloudError, Result};
use serde_json::Value;
use std::time::Duration;

/// Fallback timeout when neither the resource nor the schema names one
pub const DEFAULT_OPERATION_TIMEOUT: Duration = Duration::from_secs(20 * 60);

/// Value type of a field
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Bool,
    Int,
}

impl FieldType {
    /// Whether `value` has this type. `Null` is accepted for every type.
    pub fn accepts(&self, value: &Value) -> bool {
        match (self, value) {
            (_, Value::Null) => true,
            (FieldType::String, Value::String(_)) => true,
            (FieldType::Bool, Value::Bool(_)) => true,
            (FieldType::Int, Value::Number(n)) => n.is_i64(),
            _ => false,
        }
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FieldType::String => write!(f, "string"),
            FieldType::Bool => write!(f, "bool"),
            FieldType::Int => write!(f, "int"),
        }
    }
}

/// How a field is populated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Presence {
    /// Must be set by the user
    Required,
    /// May be set by the user
    Optional,
    /// May be set by the user, otherwise assigned by the server
    OptionalComputed,
    /// Only ever assigned by the server
    Computed,
}

/// Schema of a single field
#[derive(Debug, Clone)]
pub struct FieldSchema {
    pub name: &'static str,
    pub field_type: FieldType,
    pub presence: Presence,
    pub force_new: bool,
    pub default: Option<Value>,
    pub required_with: Vec<&'static str>,
}

impl FieldSchema {
    fn new(name: &'static str, field_type: FieldType, presence: Presence) -> Self {
        Self {
            name,
            field_type,
            presence,
            force_new: false,
            default: None,
            required_with: Vec::new(),
        }
    }

    pub fn required(name: &'static str, field_type: FieldType) -> Self {
        Self::new(name, field_type, Presence::Required)
    }

    pub fn optional(name: &'static str, field_type: FieldType) -> Self {
        Self::new(name, field_type, Presence::Optional)
    }

    pub fn optional_computed(name: &'static str, field_type: FieldType) -> Self {
        Self::new(name, field_type, Presence::OptionalComputed)
    }

    pub fn computed(name: &'static str, field_type: FieldType) -> Self {
        Self::new(name, field_type, Presence::Computed)
    }

    /// Mark the field as replace-on-change
    pub fn force_new(mut self) -> Self {
        self.force_new = true;
        self
    }

    pub fn with_default(mut self, value: impl Into<Value>) -> Self {
        self.default = Some(value.into());
        self
    }

    /// The field may only be set when every named sibling is set too
    pub fn required_with(mut self, fields: &[&'static str]) -> Self {
        self.required_with.extend_from_slice(fields);
        self
    }

    pub fn is_user_settable(&self) -> bool {
        self.presence != Presence::Computed
    }
}

/// Schema of a resource type
#[derive(Debug, Clone)]
pub struct ResourceSchema {
    pub type_name: &'static str,
    pub fields: Vec<FieldSchema>,
    pub timeouts: Timeouts,
}

impl ResourceSchema {
    pub fn new(type_name: &'static str) -> Self {
        Self {
            type_name,
            fields: Vec::new(),
            timeouts: Timeouts::default(),
        }
    }

    pub fn field(mut self, field: FieldSchema) -> Self {
        self.fields.push(field);
        self
    }

    pub fn with_timeout(mut self, kind: OperationKind, timeout: Duration) -> Self {
        self.timeouts.set(kind, timeout);
        self
    }

    pub fn get(&self, name: &str) -> Option<&FieldSchema> {
        self.fields.iter().find(|f| f.name == name)
    }

    pub fn force_new_fields(&self) -> impl Iterator<Item = &FieldSchema> {
        self.fields.iter().filter(|f| f.force_new)
    }

    /// Effective timeout for an operation: the resource override, then the
    /// schema default, then [`DEFAULT_OPERATION_TIMEOUT`].
    pub fn timeout(&self, data: &ResourceData, kind: OperationKind) -> Duration {
        data.timeouts
            .get(kind)
            .or_else(|| self.timeouts.get(kind))
            .unwrap_or(DEFAULT_OPERATION_TIMEOUT)
    }

    /// Fill unset fields that declare a default
    pub fn apply_defaults(&self, data: &mut ResourceData) {
        for field in &self.fields {
            if let Some(default) = &field.default {
                if data.get(field.name).is_none() {
                    data.set(field.name, default.clone());
                }
            }
        }
    }

    /// Check user-supplied configuration against the schema
    pub fn validate(&self, data: &ResourceData) -> Result<()> {
        for (name, value) in data.attributes() {
            let Some(field) = self.get(name) else {
                return Err(CloudError::validation(
                    name.as_str(),
                    format!("unknown field for {}", self.type_name),
                ));
            };
            if !field.field_type.accepts(value) {
                return Err(CloudError::validation(
                    name.as_str(),
                    format!("expected {}, got {}", field.field_type, value),
                ));
            }
        }

        for field in &self.fields {
            let is_set = data.get(field.name).is_some();
            if field.presence == Presence::Required && !is_set {
                return Err(CloudError::validation(field.name, "field is required"));
            }
            if is_set {
                if let Some(missing) = field
                    .required_with
                    .iter()
                    .find(|sibling| data.get(sibling).is_none())
                {
                    return Err(CloudError::validation(
                        field.name,
                        format!("\"{}\" must be specified together with it", missing),
                    ));
                }
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn schema() -> ResourceSchema {
        ResourceSchema::new("test_pool")
            .field(FieldSchema::required("name", FieldType::String).force_new())
            .field(FieldSchema::optional_computed("size", FieldType::Int).force_new())
            .field(
                FieldSchema::optional_computed("interval", FieldType::Int)
                    .force_new()
                    .required_with(&["size"]),
            )
            .field(FieldSchema::optional("rbac", FieldType::Bool).with_default(false))
            .field(FieldSchema::computed("status", FieldType::String))
            .with_timeout(OperationKind::Create, Duration::from_secs(300))
    }

    #[test]
    fn test_validate_required() {
        let data = ResourceData::new();
        let err = schema().validate(&data).unwrap_err();
        assert!(matches!(err, CloudError::Validation { ref field, .. } if field == "name"));
    }

    #[test]
    fn test_validate_required_with() {
        let data = ResourceData::new()
            .with("name", "pool")
            .with("interval", 3);
        let err = schema().validate(&data).unwrap_err();
        assert!(err.to_string().contains("\"size\""));

        let data = data.with("size", 10);
        assert!(schema().validate(&data).is_ok());
    }

    #[test]
    fn test_validate_type_mismatch() {
        let data = ResourceData::new().with("name", 42);
        assert!(schema().validate(&data).is_err());
    }

    #[test]
    fn test_apply_defaults() {
        let mut data = ResourceData::new().with("name", "pool");
        schema().apply_defaults(&mut data);
        assert_eq!(data.get("rbac"), Some(&json!(false)));
    }

    #[test]
    fn test_timeout_fallbacks() {
        let schema = schema();
        let mut data = ResourceData::new();
        assert_eq!(
            schema.timeout(&data, OperationKind::Create),
            Duration::from_secs(300)
        );
        assert_eq!(
            schema.timeout(&data, OperationKind::Delete),
            DEFAULT_OPERATION_TIMEOUT
        );

        data.timeouts.set(OperationKind::Create, Duration::from_secs(10));
        assert_eq!(
            schema.timeout(&data, OperationKind::Create),
            Duration::from_secs(10)
        );
    }
}
