//! VPC route table wire types and API surface

use async_trait::async_trait;
use fleetform_cloud::{CloudError, Result};
use serde::ser::SerializeMap;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::BTreeMap;

/// One route as sent in a route table update
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteOpts {
    #[serde(rename = "type")]
    pub route_type: String,
    pub destination: String,
    pub nexthop: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Set operation over the routes of a table
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOperation {
    Add(RouteOpts),
    Modify(RouteOpts),
    Delete(RouteOpts),
}

impl RouteOperation {
    /// Wire tag of the operation
    pub fn kind(&self) -> &'static str {
        match self {
            RouteOperation::Add(_) => "add",
            RouteOperation::Modify(_) => "mod",
            RouteOperation::Delete(_) => "del",
        }
    }

    pub fn route(&self) -> &RouteOpts {
        match self {
            RouteOperation::Add(route)
            | RouteOperation::Modify(route)
            | RouteOperation::Delete(route) => route,
        }
    }
}

/// `{"routetable": {"routes": {"add": [...], "mod": [...], "del": [...]}}}`
pub struct UpdateRoutesRequest<'a> {
    pub operations: &'a [RouteOperation],
}

impl Serialize for UpdateRoutesRequest<'_> {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Routes<'a> {
            routes: BTreeMap<&'static str, Vec<&'a RouteOpts>>,
        }

        let mut routes: BTreeMap<&'static str, Vec<&RouteOpts>> = BTreeMap::new();
        for operation in self.operations {
            routes.entry(operation.kind()).or_default().push(operation.route());
        }

        let mut map = serializer.serialize_map(Some(1))?;
        map.serialize_entry("routetable", &Routes { routes })?;
        map.end()
    }
}

/// Route table with its routes
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RouteTable {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub vpc_id: String,
    #[serde(default)]
    pub default: bool,
    #[serde(default)]
    pub routes: Vec<Route>,
}

impl RouteTable {
    pub fn find_route(&self, destination: &str) -> Option<&Route> {
        self.routes.iter().find(|r| r.destination == destination)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Route {
    #[serde(rename = "type", default)]
    pub route_type: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub nexthop: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

/// Route as exposed by the v2 routes API, addressed by its own ID
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LegacyRoute {
    pub id: String,
    #[serde(default)]
    pub destination: String,
    #[serde(default)]
    pub vpc_id: String,
    #[serde(rename = "type", default)]
    pub route_type: String,
    #[serde(default)]
    pub nexthop: String,
}

/// Route table operations
#[async_trait]
pub trait RouteTableApi: Send + Sync {
    async fn get(&self, id: &str) -> Result<RouteTable>;

    /// All route tables of a VPC
    async fn list(&self, vpc_id: &str) -> Result<Vec<RouteTable>>;

    async fn update(&self, id: &str, operations: &[RouteOperation]) -> Result<RouteTable>;

    /// The default route table of a VPC; a VPC without one is an error
    async fn default_for_vpc(&self, vpc_id: &str) -> Result<RouteTable> {
        self.list(vpc_id)
            .await?
            .into_iter()
            .find(|table| table.default)
            .ok_or_else(|| CloudError::NotFound(format!("default route table of VPC {}", vpc_id)))
    }
}

/// Individual route lookup
#[async_trait]
pub trait RouteApi: Send + Sync {
    async fn get_route(&self, id: &str) -> Result<LegacyRoute>;
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn route(destination: &str) -> RouteOpts {
        RouteOpts {
            route_type: "ecs".to_string(),
            destination: destination.to_string(),
            nexthop: "i-1".to_string(),
            description: None,
        }
    }

    #[test]
    fn test_update_request_layout() {
        let operations = [
            RouteOperation::Add(route("10.0.0.0/16")),
            RouteOperation::Delete(route("10.1.0.0/16")),
            RouteOperation::Add(route("10.2.0.0/16")),
        ];
        let body = serde_json::to_value(UpdateRoutesRequest {
            operations: &operations,
        })
        .unwrap();

        assert_eq!(
            body,
            json!({
                "routetable": {
                    "routes": {
                        "add": [
                            {"type": "ecs", "destination": "10.0.0.0/16", "nexthop": "i-1"},
                            {"type": "ecs", "destination": "10.2.0.0/16", "nexthop": "i-1"}
                        ],
                        "del": [
                            {"type": "ecs", "destination": "10.1.0.0/16", "nexthop": "i-1"}
                        ]
                    }
                }
            })
        );
    }

    #[test]
    fn test_operation_kinds() {
        assert_eq!(RouteOperation::Add(route("0.0.0.0/0")).kind(), "add");
        assert_eq!(RouteOperation::Modify(route("0.0.0.0/0")).kind(), "mod");
        assert_eq!(RouteOperation::Delete(route("0.0.0.0/0")).kind(), "del");
    }

    #[test]
    fn test_find_route() {
        let table: RouteTable = serde_json::from_value(json!({
            "id": "rtb-1",
            "name": "default",
            "vpc_id": "vpc-1",
            "default": true,
            "routes": [{"type": "ecs", "destination": "10.0.0.0/16", "nexthop": "i-1"}]
        }))
        .unwrap();

        assert_eq!(table.find_route("10.0.0.0/16").map(|r| r.nexthop.as_str()), Some("i-1"));
        assert!(table.find_route("10.0.0.0/8").is_none());
    }
}
