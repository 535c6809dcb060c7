//! Translation between route resource data and route table wire objects

use super::api::{Route, RouteOpts, RouteTable};
use fleetform_cloud::{CloudError, FieldWriter, ResourceData, ResourceSchema, Result};
use ipnetwork::IpNetwork;

/// Check that `value` is a CIDR block such as `10.0.0.0/16`
pub fn validate_cidr(field: &str, value: &str) -> Result<()> {
    if !value.contains('/') {
        return Err(CloudError::validation(
            field,
            format!("\"{}\" is not a CIDR block, the prefix length is missing", value),
        ));
    }
    value.parse::<IpNetwork>().map_err(|e| {
        CloudError::validation(field, format!("\"{}\" is not a valid CIDR block: {}", value, e))
    })?;
    Ok(())
}

/// Route to add or modify, built from the configuration
pub fn build_route(data: &ResourceData) -> Result<RouteOpts> {
    let destination = data.get_str("destination");
    validate_cidr("destination", destination)?;

    Ok(RouteOpts {
        route_type: data.get_str("type").to_string(),
        destination: destination.to_string(),
        nexthop: data.get_str("nexthop").to_string(),
        description: Some(data.get_str("description").to_string()),
    })
}

/// Route to remove; the table matches on destination, type and next hop
pub fn build_removal(data: &ResourceData) -> RouteOpts {
    RouteOpts {
        route_type: data.get_str("type").to_string(),
        destination: data.get_str("destination").to_string(),
        nexthop: data.get_str("nexthop").to_string(),
        description: None,
    }
}

/// Read-back fields of a route and the table holding it
#[derive(Debug, Clone, PartialEq)]
pub struct RouteFields {
    pub route_type: String,
    pub nexthop: String,
    pub destination: String,
    pub description: Option<String>,
    pub vpc_id: String,
    pub route_table_id: String,
    pub route_table_name: String,
}

impl RouteFields {
    /// Extract the fields; the route table `id` must be present
    pub fn from_response(table: &RouteTable, route: &Route) -> Result<Self> {
        let route_table_id = table
            .id
            .clone()
            .filter(|id| !id.is_empty())
            .ok_or_else(|| CloudError::decode("id", "route table ID missing from the response"))?;

        Ok(Self {
            route_type: route.route_type.clone(),
            nexthop: route.nexthop.clone(),
            destination: route.destination.clone(),
            description: route.description.clone().filter(|d| !d.is_empty()),
            vpc_id: table.vpc_id.clone(),
            route_table_id,
            route_table_name: table.name.clone(),
        })
    }

    /// Write every field into `data`, collecting all failures
    pub fn apply(&self, data: &mut ResourceData, schema: &ResourceSchema, region: &str) -> Result<()> {
        let mut writer = FieldWriter::new(data, schema);
        writer
            .set("region", region)
            .set("type", self.route_type.as_str())
            .set("nexthop", self.nexthop.as_str())
            .set("destination", self.destination.as_str())
            .set("description", self.description.clone())
            .set("vpc_id", self.vpc_id.as_str())
            .set("route_table_id", self.route_table_id.as_str())
            .set("route_table_name", self.route_table_name.as_str());
        writer.finish()
    }
}
