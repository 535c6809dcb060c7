//! FleetForm Cloud Reconciliation
//!
//! This crate provides the provider-neutral core of FleetForm: the pieces
//! every managed resource type needs to reconcile declarative configuration
//! with a remote cloud API.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────┐
//! │                  Plugin host                     │
//! │         (create / read / update / delete)        │
//! └─────────────────┬───────────────────────────────┘
//!                   │
//! ┌─────────────────▼───────────────────────────────┐
//! │               fleetform-cloud                    │
//! │  ┌──────────────────────────────────────────┐   │
//! │  │   Provider  ──►  trait ResourceHandler   │   │
//! │  └──────────────────────────────────────────┘   │
//! │  ┌──────────┐ ┌──────────┐ ┌──────────────┐     │
//! │  │  Schema  │ │  Planner │ │ State Poller │     │
//! │  └──────────┘ └──────────┘ └──────────────┘     │
//! └───────┬─────────────────────────────────────────┘
//!         │
//! ┌───────▼────────────────┐
//! │ fleetform-cloud-huawei │
//! │  namespace / route     │
//! └────────────────────────┘
//! ```

pub mod action;
pub mod data;
pub mod diagnostics;
pub mod error;
pub mod identifier;
pub mod logging;
pub mod poller;
pub mod provider;
pub mod resource;
pub mod schema;

// Re-exports
pub use action::{Action, ActionType, AttributeChange};
pub use data::{FieldWriter, OperationKind, ResourceData, Timeouts};
pub use diagnostics::{Diagnostic, Diagnostics, Severity};
pub use error::{CloudError, FieldError, Result};
pub use identifier::{CompositeId, LocalId};
pub use poller::{STATE_DELETED, STATE_ERROR, WaitSpec, wait_for_state};
pub use provider::{Provider, error_diagnostic};
pub use resource::{ImportError, OperationContext, ReadOutcome, ReadStatus, ResourceHandler};
pub use schema::{FieldSchema, FieldType, Presence, ResourceSchema};

// Re-export for handler implementations
pub use async_trait::async_trait;
pub use tokio_util::sync::CancellationToken;
