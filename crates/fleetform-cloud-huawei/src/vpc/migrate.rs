//! Upgrade of single-part route identifiers
//!
//! Routes used to be identified by the route ID of the v2 routes API. The
//! current identifier is `<route_table_id>/<destination>`; legacy identifiers
//! are resolved through the route lookup and the VPC's default route table.

use super::api::{RouteApi, RouteTableApi};
use fleetform_cloud::{CloudError, CompositeId, Diagnostic, Diagnostics, ResourceData, Result};

/// Upgrade the legacy identifier held in `data`
///
/// Returns `None` when the route no longer exists; the identifier is then
/// cleared and a warning recorded. A non-empty `route_table_id` in `data`
/// cannot be reconciled with the default-table upgrade and fails without
/// touching `data`.
pub async fn upgrade_legacy_id(
    routes: &dyn RouteApi,
    tables: &dyn RouteTableApi,
    data: &mut ResourceData,
    diagnostics: &mut Diagnostics,
) -> Result<Option<CompositeId>> {
    let legacy_id = data.id().to_string();
    tracing::warn!(id = %legacy_id, "Route ID is in the old format, upgrading it");
    diagnostics.warn(
        "Deprecated ID format",
        format!(
            "The resource ID {} is in the old format, try to upgrade it to the new format",
            legacy_id
        ),
    );

    let route = match routes.get_route(&legacy_id).await {
        Ok(route) => route,
        Err(e) if e.is_not_found() => {
            diagnostics.push(Diagnostic::warning(format!(
                "The resource {} does not exist",
                legacy_id
            )));
            data.clear_id();
            return Ok(None);
        }
        Err(e) => return Err(e),
    };

    let route_table_id = data.get_str("route_table_id");
    if !route_table_id.is_empty() {
        return Err(CloudError::InvalidConfig(format!(
            "route_table_id is already set to {} while the resource ID {} is in the old format",
            route_table_id, legacy_id
        )));
    }

    let destination = match route.destination.as_str() {
        "" => data.get_str("destination").to_string(),
        destination => destination.to_string(),
    };
    if destination.is_empty() {
        return Err(CloudError::InvalidConfig(format!(
            "can not get the destination of route {}",
            legacy_id
        )));
    }

    let vpc_id = match route.vpc_id.as_str() {
        "" => data.get_str("vpc_id").to_string(),
        vpc_id => vpc_id.to_string(),
    };
    if vpc_id.is_empty() {
        return Err(CloudError::InvalidConfig(format!(
            "can not get the VPC of route {}",
            legacy_id
        )));
    }
    let table = tables.default_for_vpc(&vpc_id).await?;
    let table_id = table
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| CloudError::decode("id", "default route table ID missing from the response"))?;

    let new_id = CompositeId::new(table_id, destination);
    data.set_id(new_id.to_string());
    diagnostics.push(Diagnostic::warning(format!(
        "The resource ID is upgraded to {}",
        new_id
    )));
    tracing::info!(old = %legacy_id, new = %new_id, "Route ID upgraded");

    Ok(Some(new_id))
}
