//! Provider registry
//!
//! A [`Provider`] owns the provider meta and the handlers of every resource
//! type it serves. It is the surface the plugin host drives: each operation
//! validates configuration, dispatches to the handler and turns failures into
//! [`Diagnostics`] naming the resource kind, identifier and cause.

use crate::action::Action;
use crate::data::ResourceData;
use crate::diagnostics::{Diagnostic, Diagnostics};
use crate::error::{CloudError, Result};
use crate::resource::{ImportError, OperationContext, ReadOutcome, ResourceHandler};
use crate::schema::ResourceSchema;
use std::collections::BTreeMap;
use std::sync::Arc;

/// Registry of resource handlers sharing one provider meta
pub struct Provider<M: ?Sized + Sync + 'static> {
    name: String,
    meta: Arc<M>,
    handlers: BTreeMap<&'static str, Arc<dyn ResourceHandler<M>>>,
}

impl<M: ?Sized + Send + Sync + 'static> Provider<M> {
    pub fn new(name: impl Into<String>, meta: Arc<M>) -> Self {
        Self {
            name: name.into(),
            meta,
            handlers: BTreeMap::new(),
        }
    }

    /// Register a resource handler
    pub fn with_resource(mut self, handler: Arc<dyn ResourceHandler<M>>) -> Self {
        self.handlers.insert(handler.type_name(), handler);
        self
    }

    /// Returns the provider name (e.g., "huaweicloud")
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn meta(&self) -> &M {
        &self.meta
    }

    pub fn resource_types(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.handlers.keys().copied()
    }

    pub fn schema(&self, resource_type: &str) -> Result<&ResourceSchema> {
        Ok(self.handler(resource_type)?.schema())
    }

    fn handler(&self, resource_type: &str) -> Result<&Arc<dyn ResourceHandler<M>>> {
        self.handlers.get(resource_type).ok_or_else(|| {
            CloudError::Unsupported(format!(
                "resource type {} is not served by provider {}",
                resource_type, self.name
            ))
        })
    }

    /// Create a resource from the configuration in `data`
    pub async fn create(
        &self,
        resource_type: &str,
        ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> Diagnostics {
        let result = async {
            let handler = self.handler(resource_type)?;
            let schema = handler.schema();
            schema.apply_defaults(data);
            schema.validate(data)?;

            tracing::info!(resource_type, "Creating resource");
            handler.create(&self.meta, ctx, data).await
        }
        .await;

        finish(resource_type, data.id(), result)
    }

    /// Refresh a resource. A removed resource comes back with a cleared
    /// identifier and no error; a failed refresh comes back as
    /// [`ReadStatus::Failed`](crate::ReadStatus::Failed).
    pub async fn read(
        &self,
        resource_type: &str,
        ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> ReadOutcome {
        let id = data.id().to_string();
        let result = match self.handler(resource_type) {
            Ok(handler) => handler.read(&self.meta, ctx, data).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(outcome) => {
                if outcome.is_removed() {
                    tracing::warn!(resource_type, id = %id, "Resource removed outside of FleetForm");
                }
                outcome
            }
            // Local data is left as it was
            Err(e) => ReadOutcome::failed(error_diagnostic(resource_type, &id, &e).into()),
        }
    }

    /// Update `data` in place towards the desired configuration it holds
    ///
    /// The change is planned against `prior` first; replace-on-change fields
    /// are rejected before any remote call.
    pub async fn update(
        &self,
        resource_type: &str,
        ctx: &OperationContext,
        prior: &ResourceData,
        data: &mut ResourceData,
    ) -> Diagnostics {
        let result = async {
            let handler = self.handler(resource_type)?;
            let schema = handler.schema();
            schema.validate(data)?;

            let plan = Action::plan(schema, Some(prior), Some(&*data));
            plan.require_in_place()?;
            if !plan.has_changes() {
                tracing::debug!("{}", plan.description());
                return Ok(Diagnostics::new());
            }

            tracing::info!("{}", plan.description());
            if data.is_absent() {
                data.set_id(prior.id());
            }
            handler.update(&self.meta, ctx, data, &plan).await
        }
        .await;

        finish(resource_type, prior.id(), result)
    }

    /// Delete a resource and wait until it is gone
    pub async fn delete(
        &self,
        resource_type: &str,
        ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> Diagnostics {
        let id = data.id().to_string();
        let result = async {
            let handler = self.handler(resource_type)?;
            tracing::info!(resource_type, id = %id, "Deleting resource");
            handler.delete(&self.meta, ctx, data).await
        }
        .await;

        finish(resource_type, &id, result)
    }

    /// Import an existing resource by its external identifier
    ///
    /// On failure the original (empty) data is handed back inside the error.
    pub async fn import(
        &self,
        resource_type: &str,
        ctx: &OperationContext,
        id: &str,
    ) -> std::result::Result<(ResourceData, Diagnostics), ImportError> {
        let original = ResourceData::new().with_id(id);
        let mut data = original.clone();

        let result = match self.handler(resource_type) {
            Ok(handler) => handler.import(&self.meta, ctx, &mut data).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(diags) => Ok((data, diags)),
            Err(source) => Err(ImportError {
                resource_type: resource_type.to_string(),
                id: id.to_string(),
                original,
                source,
            }),
        }
    }

    /// Import several resources; one failure never stops the others
    pub async fn import_batch(
        &self,
        resource_type: &str,
        ctx: &OperationContext,
        ids: &[&str],
    ) -> Vec<std::result::Result<(ResourceData, Diagnostics), ImportError>> {
        let mut results = Vec::with_capacity(ids.len());
        for id in ids {
            let result = self.import(resource_type, ctx, id).await;
            if let Err(e) = &result {
                tracing::warn!(error = %e, "Import failed");
            }
            results.push(result);
        }
        results
    }
}

fn finish(resource_type: &str, id: &str, result: Result<Diagnostics>) -> Diagnostics {
    match result {
        Ok(diags) => diags,
        Err(e) => error_diagnostic(resource_type, id, &e).into(),
    }
}

/// Error diagnostic naming the resource kind, identifier and cause
pub fn error_diagnostic(resource_type: &str, id: &str, err: &CloudError) -> Diagnostic {
    let summary = if id.is_empty() {
        format!("{}: {}", resource_type, err)
    } else {
        format!("{} ({}): {}", resource_type, id, err)
    };
    Diagnostic::error(summary).with_detail(format!("{:?}", err))
}
