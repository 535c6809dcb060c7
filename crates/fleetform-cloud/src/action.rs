//! Change planning between prior and desired resource data
//!
//! The plan is computed before any client is created, so a change to a
//! replace-on-change field is rejected here and never reaches the remote API.

use crate::data::ResourceData;
use crate::error::{CloudError, Result};
use crate::schema::{Presence, ResourceSchema};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Type of action to perform
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionType {
    /// Create a new resource
    Create,
    /// Update an existing resource in place
    Update,
    /// Destroy and recreate the resource
    Replace,
    /// Delete a resource
    Delete,
    /// No changes needed
    NoOp,
}

impl std::fmt::Display for ActionType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ActionType::Create => write!(f, "create"),
            ActionType::Update => write!(f, "update"),
            ActionType::Replace => write!(f, "replace"),
            ActionType::Delete => write!(f, "delete"),
            ActionType::NoOp => write!(f, "no-op"),
        }
    }
}

/// Change of a single attribute
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttributeChange {
    pub name: String,
    pub old: Option<Value>,
    pub new: Option<Value>,
    pub force_new: bool,
}

/// Planned action for one resource
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Action {
    /// Type of action to perform
    pub action_type: ActionType,

    /// Resource type (e.g., "huaweicloud_cci_namespace")
    pub resource_type: String,

    /// Resource identifier, empty when the resource does not exist yet
    pub resource_id: String,

    /// Attribute-level changes
    pub changes: Vec<AttributeChange>,
}

impl Action {
    /// Plan the transition from `prior` to `desired`
    ///
    /// `None` on either side means the resource is absent on that side.
    pub fn plan(
        schema: &ResourceSchema,
        prior: Option<&ResourceData>,
        desired: Option<&ResourceData>,
    ) -> Self {
        let resource_id = prior.map(|p| p.id().to_string()).unwrap_or_default();
        let (action_type, changes) = match (prior, desired) {
            (None, None) => (ActionType::NoOp, Vec::new()),
            (None, Some(_)) => (ActionType::Create, Vec::new()),
            (Some(_), None) => (ActionType::Delete, Vec::new()),
            (Some(prior), Some(desired)) => {
                let changes = diff(schema, prior, desired);
                let action_type = if changes.is_empty() {
                    ActionType::NoOp
                } else if changes.iter().any(|c| c.force_new) {
                    ActionType::Replace
                } else {
                    ActionType::Update
                };
                (action_type, changes)
            }
        };

        Self {
            action_type,
            resource_type: schema.type_name.to_string(),
            resource_id,
            changes,
        }
    }

    /// Reject plans that cannot be applied in place
    pub fn require_in_place(&self) -> Result<()> {
        if self.action_type == ActionType::Replace {
            return Err(CloudError::ReplacementRequired {
                fields: self
                    .changes
                    .iter()
                    .filter(|c| c.force_new)
                    .map(|c| c.name.clone())
                    .collect(),
            });
        }
        Ok(())
    }

    pub fn has_changes(&self) -> bool {
        self.action_type != ActionType::NoOp
    }

    pub fn changed(&self, name: &str) -> bool {
        self.changes.iter().any(|c| c.name == name)
    }

    pub fn description(&self) -> String {
        match self.action_type {
            ActionType::NoOp => format!("{} {} is up to date", self.resource_type, self.resource_id),
            _ => {
                let fields: Vec<&str> = self.changes.iter().map(|c| c.name.as_str()).collect();
                if fields.is_empty() {
                    format!("{} {}", self.action_type, self.resource_type)
                } else {
                    format!(
                        "{} {} {} ({})",
                        self.action_type,
                        self.resource_type,
                        self.resource_id,
                        fields.join(", ")
                    )
                }
            }
        }
    }
}

fn diff(schema: &ResourceSchema, prior: &ResourceData, desired: &ResourceData) -> Vec<AttributeChange> {
    let mut changes = Vec::new();

    for field in schema.fields.iter().filter(|f| f.is_user_settable()) {
        let old = prior.get(field.name);
        let new = desired.get(field.name).or(field.default.as_ref());

        // Unset optional+computed fields keep whatever the server assigned
        if new.is_none() && field.presence == Presence::OptionalComputed {
            continue;
        }
        if old == new {
            continue;
        }

        changes.push(AttributeChange {
            name: field.name.to_string(),
            old: old.cloned(),
            new: new.cloned(),
            force_new: field.force_new,
        });
    }

    changes
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FieldSchema, FieldType};

    fn schema() -> ResourceSchema {
        ResourceSchema::new("test_route")
            .field(FieldSchema::required("destination", FieldType::String).force_new())
            .field(FieldSchema::required("nexthop", FieldType::String))
            .field(FieldSchema::optional("description", FieldType::String))
            .field(FieldSchema::optional_computed("route_table_id", FieldType::String).force_new())
            .field(FieldSchema::computed("route_table_name", FieldType::String))
    }

    fn prior() -> ResourceData {
        ResourceData::new()
            .with_id("rtb-1/10.0.0.0/16")
            .with("destination", "10.0.0.0/16")
            .with("nexthop", "i-1")
            .with("route_table_id", "rtb-1")
            .with("route_table_name", "default")
    }

    #[test]
    fn test_plan_noop_ignores_computed() {
        let desired = ResourceData::new()
            .with("destination", "10.0.0.0/16")
            .with("nexthop", "i-1");
        let action = Action::plan(&schema(), Some(&prior()), Some(&desired));
        assert_eq!(action.action_type, ActionType::NoOp);
        assert!(!action.has_changes());
    }

    #[test]
    fn test_plan_update_in_place() {
        let desired = ResourceData::new()
            .with("destination", "10.0.0.0/16")
            .with("nexthop", "i-2")
            .with("description", "via peer");
        let action = Action::plan(&schema(), Some(&prior()), Some(&desired));
        assert_eq!(action.action_type, ActionType::Update);
        assert!(action.changed("nexthop"));
        assert!(action.changed("description"));
        assert!(action.require_in_place().is_ok());
    }

    #[test]
    fn test_plan_force_new_is_rejected() {
        let desired = ResourceData::new()
            .with("destination", "10.1.0.0/16")
            .with("nexthop", "i-2");
        let action = Action::plan(&schema(), Some(&prior()), Some(&desired));
        assert_eq!(action.action_type, ActionType::Replace);

        match action.require_in_place() {
            Err(CloudError::ReplacementRequired { fields }) => {
                assert_eq!(fields, vec!["destination".to_string()]);
            }
            other => panic!("expected replacement error, got {other:?}"),
        }
    }

    #[test]
    fn test_plan_create_and_delete() {
        let data = prior();
        assert_eq!(
            Action::plan(&schema(), None, Some(&data)).action_type,
            ActionType::Create
        );
        assert_eq!(
            Action::plan(&schema(), Some(&data), None).action_type,
            ActionType::Delete
        );
    }
}
