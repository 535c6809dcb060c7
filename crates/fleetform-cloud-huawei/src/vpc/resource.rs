//! `huaweicloud_vpc_route_table_route` resource

use super::api::{RouteOperation, RouteTableApi};
use super::mapper::{RouteFields, build_removal, build_route};
use super::migrate::upgrade_legacy_id;
use crate::config::{ClientFactory, PollTiming};
use fleetform_cloud::{
    Action, CloudError, CompositeId, Diagnostics, FieldSchema, FieldType, LocalId,
    OperationContext, OperationKind, ReadOutcome, ResourceData, ResourceHandler, ResourceSchema,
    Result, STATE_DELETED, async_trait, wait_for_state,
};
use std::time::Duration;

pub const ROUTE_TYPE: &str = "huaweicloud_vpc_route_table_route";

/// The route is listed in its table
pub const ROUTE_ACTIVE: &str = "ACTIVE";
/// The route is not listed in its table yet
pub const ROUTE_PENDING: &str = "PENDING";

pub const ROUTE_POLL_TIMING: PollTiming = PollTiming::new(Duration::ZERO, Duration::from_secs(3));

pub fn route_schema() -> ResourceSchema {
    ResourceSchema::new(ROUTE_TYPE)
        .field(FieldSchema::optional_computed("region", FieldType::String).force_new())
        .field(FieldSchema::required("vpc_id", FieldType::String).force_new())
        .field(FieldSchema::required("destination", FieldType::String).force_new())
        .field(FieldSchema::required("type", FieldType::String))
        .field(FieldSchema::required("nexthop", FieldType::String))
        .field(FieldSchema::optional("description", FieldType::String))
        .field(FieldSchema::optional_computed("route_table_id", FieldType::String).force_new())
        .field(FieldSchema::computed("route_table_name", FieldType::String))
        .with_timeout(OperationKind::Create, Duration::from_secs(10 * 60))
        .with_timeout(OperationKind::Delete, Duration::from_secs(10 * 60))
}

/// VPC route table route handler
pub struct RouteTableRouteResource {
    schema: ResourceSchema,
    timing: PollTiming,
}

impl Default for RouteTableRouteResource {
    fn default() -> Self {
        Self::new()
    }
}

impl RouteTableRouteResource {
    pub fn new() -> Self {
        Self {
            schema: route_schema(),
            timing: ROUTE_POLL_TIMING,
        }
    }

    pub fn with_timing(mut self, timing: PollTiming) -> Self {
        self.timing = timing;
        self
    }

    fn composite_id(data: &ResourceData) -> Result<CompositeId> {
        match LocalId::parse(data.id()) {
            LocalId::Composite(id) => Ok(id),
            LocalId::Legacy(id) => Err(CloudError::InvalidConfig(format!(
                "route ID {} is in the old format, refresh the resource first",
                id
            ))),
        }
    }

    /// Refresh `data` from the route table named by `id`
    async fn refresh(
        &self,
        tables: &dyn RouteTableApi,
        region: &str,
        id: &CompositeId,
        data: &mut ResourceData,
    ) -> Result<ReadOutcome> {
        let table = match tables.get(id.parent()).await {
            Ok(table) => table,
            Err(e) if e.is_not_found() => {
                tracing::warn!(route_table_id = id.parent(), "VPC route table not found");
                data.clear_id();
                return Ok(ReadOutcome::removed(Diagnostics::new()));
            }
            Err(e) => return Err(e),
        };

        let Some(route) = table.find_route(id.distinguisher()) else {
            tracing::warn!(id = %id, "VPC route not found in its route table");
            data.clear_id();
            return Ok(ReadOutcome::removed(Diagnostics::new()));
        };

        RouteFields::from_response(&table, route)?.apply(data, &self.schema, region)?;
        Ok(ReadOutcome::present(Diagnostics::new()))
    }

    /// Refresh after a write; the route must still be there
    async fn confirm(
        &self,
        tables: &dyn RouteTableApi,
        region: &str,
        id: &CompositeId,
        data: &mut ResourceData,
    ) -> Result<Diagnostics> {
        let outcome = self.refresh(tables, region, id, data).await?;
        if outcome.is_removed() {
            return Err(CloudError::NotFound(format!("VPC route {}", id)));
        }
        Ok(outcome.diagnostics)
    }

    /// Read `data`, migrating a legacy identifier to the composite form
    async fn read_route(
        &self,
        meta: &dyn ClientFactory,
        data: &mut ResourceData,
    ) -> Result<ReadOutcome> {
        if data.is_absent() {
            return Ok(ReadOutcome::removed(Diagnostics::new()));
        }

        let region = meta.region(data);
        let tables = meta.route_table_api(&region)?;
        let mut diagnostics = Diagnostics::new();

        let id = match LocalId::parse(data.id()) {
            LocalId::Composite(id) => id,
            LocalId::Legacy(_) => {
                let routes = meta.route_api(&region)?;
                match upgrade_legacy_id(routes.as_ref(), tables.as_ref(), data, &mut diagnostics)
                    .await?
                {
                    Some(id) => id,
                    None => return Ok(ReadOutcome::removed(diagnostics)),
                }
            }
        };

        let mut outcome = self.refresh(tables.as_ref(), &region, &id, data).await?;
        diagnostics.extend(outcome.diagnostics);
        outcome.diagnostics = diagnostics;
        Ok(outcome)
    }

    /// Poll the route table until the route's presence reaches a target state
    #[allow(clippy::too_many_arguments)]
    async fn wait_for_route(
        &self,
        tables: &dyn RouteTableApi,
        ctx: &OperationContext,
        id: &CompositeId,
        absent_state: &str,
        pending: &[&str],
        target: &[&str],
        timeout: Duration,
    ) -> Result<()> {
        let spec = self.timing.wait_spec(pending, target, timeout);
        let table_id = id.parent();
        let destination = id.distinguisher();

        wait_for_state(
            &spec,
            ctx.cancellation(),
            move || async move {
                let table = tables.get(table_id).await?;
                Ok::<_, CloudError>(table.find_route(destination).is_some())
            },
            move |present: &bool| {
                let state = if *present { ROUTE_ACTIVE } else { absent_state };
                state.to_string()
            },
        )
        .await?;
        Ok(())
    }
}

#[async_trait]
impl ResourceHandler<dyn ClientFactory> for RouteTableRouteResource {
    fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    async fn create(
        &self,
        meta: &dyn ClientFactory,
        ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> Result<Diagnostics> {
        let route = build_route(data)?;
        let region = meta.region(data);
        let tables = meta.route_table_api(&region)?;

        let route_table_id = match data.get_str("route_table_id") {
            "" => {
                let vpc_id = data.get_str("vpc_id");
                let table = tables.default_for_vpc(vpc_id).await?;
                tracing::debug!(vpc_id, route_table_id = ?table.id, "Using the default route table");
                table.id.filter(|id| !id.is_empty()).ok_or_else(|| {
                    CloudError::decode("id", "default route table ID missing from the response")
                })?
            }
            id => id.to_string(),
        };

        let id = CompositeId::new(route_table_id, route.destination.clone());
        tracing::info!(id = %id, "Adding VPC route");
        tables
            .update(id.parent(), &[RouteOperation::Add(route)])
            .await?;
        data.set_id(id.to_string());

        let timeout = self.schema.timeout(data, OperationKind::Create);
        self.wait_for_route(
            tables.as_ref(),
            ctx,
            &id,
            ROUTE_PENDING,
            &[ROUTE_PENDING],
            &[ROUTE_ACTIVE],
            timeout,
        )
        .await?;

        self.confirm(tables.as_ref(), &region, &id, data).await
    }

    /// Refresh the route, upgrading a legacy identifier first
    async fn read(
        &self,
        meta: &dyn ClientFactory,
        _ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> Result<ReadOutcome> {
        self.read_route(meta, data).await
    }

    async fn update(
        &self,
        meta: &dyn ClientFactory,
        _ctx: &OperationContext,
        data: &mut ResourceData,
        plan: &Action,
    ) -> Result<Diagnostics> {
        let id = Self::composite_id(data)?;
        let route = build_route(data)?;
        let region = meta.region(data);
        let tables = meta.route_table_api(&region)?;

        tracing::info!(id = %id, "{}", plan.description());
        tables
            .update(id.parent(), &[RouteOperation::Modify(route)])
            .await?;

        self.confirm(tables.as_ref(), &region, &id, data).await
    }

    async fn delete(
        &self,
        meta: &dyn ClientFactory,
        ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> Result<Diagnostics> {
        let id = Self::composite_id(data)?;
        let mut removal = build_removal(data);
        removal.destination = id.distinguisher().to_string();

        let region = meta.region(data);
        let tables = meta.route_table_api(&region)?;

        match tables
            .update(id.parent(), &[RouteOperation::Delete(removal)])
            .await
        {
            Ok(_) => {}
            Err(e) if e.is_not_found() => {
                tracing::info!(id = %id, "VPC route table already deleted");
            }
            Err(e) => return Err(e),
        }

        let timeout = self.schema.timeout(data, OperationKind::Delete);
        self.wait_for_route(
            tables.as_ref(),
            ctx,
            &id,
            STATE_DELETED,
            &[ROUTE_ACTIVE],
            &[STATE_DELETED],
            timeout,
        )
        .await?;

        data.clear_id();
        tracing::info!(id = %id, "VPC route deleted");
        Ok(Diagnostics::new())
    }

    /// Import by `<route_table_id>/<destination>` or a legacy route ID
    async fn import(
        &self,
        meta: &dyn ClientFactory,
        _ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> Result<Diagnostics> {
        let id = data.id().to_string();
        if id.is_empty() {
            return Err(CloudError::validation(
                "id",
                "must be <route_table_id>/<destination> or a route ID",
            ));
        }

        let outcome = self.read_route(meta, data).await?;
        if outcome.is_removed() {
            return Err(CloudError::NotFound(format!("VPC route {}", id)));
        }
        Ok(outcome.diagnostics)
    }
}
