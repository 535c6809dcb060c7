//! `huaweicloud_cci_namespace` resource

use super::api::{Namespace, NamespaceApi};
use super::mapper::{NamespaceFields, build_create_request};
use crate::config::{ClientFactory, PollTiming};
use fleetform_cloud::{
    CloudError, Diagnostics, FieldSchema, FieldType, OperationContext, OperationKind,
    ReadOutcome, ResourceData, ResourceHandler, ResourceSchema, Result, STATE_DELETED,
    async_trait, wait_for_state,
};
use std::time::Duration;

pub const NAMESPACE_TYPE: &str = "huaweicloud_cci_namespace";

pub const PHASE_PENDING: &str = "Pending";
pub const PHASE_ACTIVE: &str = "Active";
pub const PHASE_TERMINATING: &str = "Terminating";

/// Namespaces report their phase only after a few seconds
pub const NAMESPACE_POLL_TIMING: PollTiming =
    PollTiming::new(Duration::from_secs(6), Duration::from_secs(5));

pub fn namespace_schema() -> ResourceSchema {
    ResourceSchema::new(NAMESPACE_TYPE)
        .field(FieldSchema::optional_computed("region", FieldType::String).force_new())
        .field(FieldSchema::required("type", FieldType::String).force_new())
        .field(FieldSchema::required("name", FieldType::String).force_new())
        .field(FieldSchema::optional_computed("auto_expend_enabled", FieldType::Bool).force_new())
        .field(FieldSchema::optional_computed("enterprise_project_id", FieldType::String).force_new())
        .field(FieldSchema::optional_computed("warmup_pool_size", FieldType::Int).force_new())
        .field(
            FieldSchema::optional_computed("recycling_interval", FieldType::Int)
                .force_new()
                .required_with(&["warmup_pool_size"]),
        )
        .field(
            FieldSchema::optional_computed("container_network_enabled", FieldType::Bool)
                .force_new()
                .required_with(&["warmup_pool_size"]),
        )
        .field(
            FieldSchema::optional("rbac_enabled", FieldType::Bool)
                .force_new()
                .with_default(false),
        )
        .field(FieldSchema::computed("created_at", FieldType::String))
        .field(FieldSchema::computed("status", FieldType::String))
        .with_timeout(OperationKind::Create, Duration::from_secs(5 * 60))
        .with_timeout(OperationKind::Delete, Duration::from_secs(3 * 60))
}

/// CCI namespace handler
pub struct NamespaceResource {
    schema: ResourceSchema,
    timing: PollTiming,
}

impl Default for NamespaceResource {
    fn default() -> Self {
        Self::new()
    }
}

impl NamespaceResource {
    pub fn new() -> Self {
        Self {
            schema: namespace_schema(),
            timing: NAMESPACE_POLL_TIMING,
        }
    }

    pub fn with_timing(mut self, timing: PollTiming) -> Self {
        self.timing = timing;
        self
    }

    /// Refresh `data` from the namespace whose UID is the local identifier
    async fn refresh(
        &self,
        api: &dyn NamespaceApi,
        region: &str,
        data: &mut ResourceData,
    ) -> Result<ReadOutcome> {
        let Some(namespace) = api.find_by_uid(data.id()).await? else {
            tracing::warn!(uid = %data.id(), "CCI namespace not found");
            data.clear_id();
            return Ok(ReadOutcome::removed(Diagnostics::new()));
        };

        NamespaceFields::from_response(&namespace)?.apply(data, &self.schema, region)?;
        Ok(ReadOutcome::present(Diagnostics::new()))
    }

    async fn wait_for_phase(
        &self,
        api: &dyn NamespaceApi,
        ctx: &OperationContext,
        name: &str,
        pending: &[&str],
        target: &[&str],
        timeout: Duration,
    ) -> Result<()> {
        let spec = self.timing.wait_spec(pending, target, timeout);
        wait_for_state(
            &spec,
            ctx.cancellation(),
            || api.get(name),
            |ns: &Namespace| ns.phase().to_string(),
        )
        .await
        .map_err(|e| {
            tracing::error!(name, error = %e, "CCI namespace did not reach {:?}", target);
            e
        })?;
        Ok(())
    }
}

#[async_trait]
impl ResourceHandler<dyn ClientFactory> for NamespaceResource {
    fn schema(&self) -> &ResourceSchema {
        &self.schema
    }

    async fn create(
        &self,
        meta: &dyn ClientFactory,
        ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> Result<Diagnostics> {
        let request = build_create_request(data, meta.enterprise_project_id(data))?;
        let region = meta.region(data);
        let api = meta.namespace_api(&region)?;

        let created = api.create(&request).await?;
        let uid = created
            .uid()
            .ok_or_else(|| CloudError::decode("metadata.uid", "missing from the create response"))?;
        data.set_id(uid);

        let name = request.metadata.name.as_str();
        tracing::info!(name, uid, "CCI namespace created, waiting for it to become active");

        let timeout = self.schema.timeout(data, OperationKind::Create);
        self.wait_for_phase(
            api.as_ref(),
            ctx,
            name,
            &[PHASE_PENDING],
            &[PHASE_ACTIVE],
            timeout,
        )
        .await?;

        let outcome = self.refresh(api.as_ref(), &region, data).await?;
        if outcome.is_removed() {
            return Err(CloudError::NotFound(format!(
                "CCI namespace {} disappeared right after creation",
                name
            )));
        }
        Ok(outcome.diagnostics)
    }

    async fn read(
        &self,
        meta: &dyn ClientFactory,
        _ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> Result<ReadOutcome> {
        let region = meta.region(data);
        let api = meta.namespace_api(&region)?;
        self.refresh(api.as_ref(), &region, data).await
    }

    async fn delete(
        &self,
        meta: &dyn ClientFactory,
        ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> Result<Diagnostics> {
        let name = data.get_str("name").to_string();
        if name.is_empty() {
            return Err(CloudError::InvalidConfig(format!(
                "the name of CCI namespace {} is unknown",
                data.id()
            )));
        }

        let region = meta.region(data);
        let api = meta.namespace_api(&region)?;

        match api.delete(&name).await {
            Ok(()) => {}
            Err(e) if e.is_not_found() => {
                tracing::info!(name = %name, "CCI namespace already deleted");
            }
            Err(e) => return Err(e),
        }

        let timeout = self.schema.timeout(data, OperationKind::Delete);
        self.wait_for_phase(
            api.as_ref(),
            ctx,
            &name,
            &[PHASE_ACTIVE, PHASE_TERMINATING],
            &[STATE_DELETED],
            timeout,
        )
        .await?;

        data.clear_id();
        tracing::info!(name = %name, "CCI namespace deleted");
        Ok(Diagnostics::new())
    }

    /// Import by namespace name or UID
    async fn import(
        &self,
        meta: &dyn ClientFactory,
        _ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> Result<Diagnostics> {
        let region = meta.region(data);
        let api = meta.namespace_api(&region)?;
        let key = data.id().to_string();

        match api.get(&key).await {
            Ok(namespace) => {
                let uid = namespace.uid().ok_or_else(|| {
                    CloudError::decode("metadata.uid", "missing from the namespace response")
                })?;
                tracing::debug!(name = %key, uid, "Resolved CCI namespace by name");
                data.set_id(uid);
            }
            Err(e) if e.is_not_found() => {
                tracing::debug!(key = %key, "No CCI namespace by that name, trying it as a UID");
            }
            Err(e) => return Err(e),
        }

        let outcome = self.refresh(api.as_ref(), &region, data).await?;
        if outcome.is_removed() {
            return Err(CloudError::NotFound(format!(
                "no CCI namespace named or identified by {}",
                key
            )));
        }
        Ok(outcome.diagnostics)
    }
}
