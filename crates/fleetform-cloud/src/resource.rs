//! Resource handler trait
//!
//! Every managed resource type implements [`ResourceHandler`]. The `M` type
//! parameter is the provider meta (configuration and client factory); it is
//! passed explicitly into every call instead of living in global state.

use crate::action::Action;
use crate::data::ResourceData;
use crate::diagnostics::Diagnostics;
use crate::error::{CloudError, Result};
use crate::schema::ResourceSchema;
use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

/// Per-operation context supplied by the host
#[derive(Debug, Clone, Default)]
pub struct OperationContext {
    cancel: CancellationToken,
}

impl OperationContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind the operation to an externally owned cancellation token
    pub fn with_cancellation(cancel: CancellationToken) -> Self {
        Self { cancel }
    }

    pub fn cancellation(&self) -> &CancellationToken {
        &self.cancel
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancel.is_cancelled()
    }
}

/// Whether a read found the resource
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadStatus {
    /// Local data was refreshed from the remote resource
    Present,
    /// The resource no longer exists remotely; the identifier was cleared
    Removed,
    /// The read did not complete; local data is unchanged and the
    /// diagnostics carry the error
    Failed,
}

/// Result of a read
#[derive(Debug, Clone, PartialEq)]
pub struct ReadOutcome {
    pub status: ReadStatus,
    pub diagnostics: Diagnostics,
}

impl ReadOutcome {
    pub fn present(diagnostics: Diagnostics) -> Self {
        Self {
            status: ReadStatus::Present,
            diagnostics,
        }
    }

    pub fn removed(diagnostics: Diagnostics) -> Self {
        Self {
            status: ReadStatus::Removed,
            diagnostics,
        }
    }

    pub fn failed(diagnostics: Diagnostics) -> Self {
        Self {
            status: ReadStatus::Failed,
            diagnostics,
        }
    }

    pub fn is_removed(&self) -> bool {
        self.status == ReadStatus::Removed
    }

    pub fn is_failed(&self) -> bool {
        self.status == ReadStatus::Failed
    }
}

/// Failed import; carries the local data exactly as it was handed in
#[derive(Debug, thiserror::Error)]
#[error("Unable to import {resource_type} '{id}': {source}")]
pub struct ImportError {
    pub resource_type: String,
    pub id: String,
    pub original: ResourceData,
    #[source]
    pub source: CloudError,
}

/// Create/Read/Update/Delete/Import for one resource type
#[async_trait]
pub trait ResourceHandler<M: ?Sized + Sync>: Send + Sync {
    /// Schema of the resource type
    fn schema(&self) -> &ResourceSchema;

    /// Resource type name (e.g. "huaweicloud_vpc_route_table_route")
    fn type_name(&self) -> &'static str {
        self.schema().type_name
    }

    /// Create the remote resource and populate `data` from it
    ///
    /// The identifier is set as soon as the remote side assigns one, so a
    /// later failure still leaves enough in `data` to clean up or import.
    async fn create(
        &self,
        meta: &M,
        ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> Result<Diagnostics>;

    /// Refresh `data` from the remote resource
    async fn read(
        &self,
        meta: &M,
        ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> Result<ReadOutcome>;

    /// Apply an in-place update already checked by the planner
    async fn update(
        &self,
        _meta: &M,
        _ctx: &OperationContext,
        _data: &mut ResourceData,
        _plan: &Action,
    ) -> Result<Diagnostics> {
        Err(CloudError::Unsupported(format!(
            "{} does not support in-place updates",
            self.type_name()
        )))
    }

    /// Delete the remote resource and wait until it is gone
    async fn delete(
        &self,
        meta: &M,
        ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> Result<Diagnostics>;

    /// Resolve the external identifier held in `data` and populate it
    async fn import(
        &self,
        meta: &M,
        ctx: &OperationContext,
        data: &mut ResourceData,
    ) -> Result<Diagnostics>;
}
