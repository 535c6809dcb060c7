//! Huawei Cloud provider for FleetForm
//!
//! This crate implements two resource types on top of `fleetform-cloud`:
//!
//! - `huaweicloud_cci_namespace`: Cloud Container Instance namespaces
//! - `huaweicloud_vpc_route_table_route`: routes inside a VPC route table
//!
//! # Requirements
//!
//! `HW_AUTH_TOKEN`, `HW_REGION_NAME` and `HW_PROJECT_ID` env vars
//! (`HW_ENTERPRISE_PROJECT_ID` and `HW_CLOUD` are optional).
//!
//! # Example
//!
//! ```ignore
//! use fleetform_cloud::{OperationContext, ResourceData};
//! use fleetform_cloud_huawei::{Config, provider};
//!
//! let provider = provider(Config::from_env()?);
//! let ctx = OperationContext::new();
//!
//! let mut data = ResourceData::new()
//!     .with("vpc_id", "vpc-1")
//!     .with("destination", "172.16.0.0/16")
//!     .with("type", "peering")
//!     .with("nexthop", "peering-1");
//! let diags = provider
//!     .create("huaweicloud_vpc_route_table_route", &ctx, &mut data)
//!     .await;
//! assert!(!diags.has_error());
//! ```

pub mod cci;
pub mod config;
pub mod error;
pub mod http;
pub mod vpc;

pub use cci::{NAMESPACE_TYPE, NamespaceResource};
pub use config::{ClientFactory, Config, PollTiming};
pub use error::{HuaweiError, Result};
pub use vpc::{ROUTE_TYPE, RouteTableRouteResource};

use fleetform_cloud::Provider;
use std::sync::Arc;

/// Provider name as seen by the host
pub const PROVIDER_NAME: &str = "huaweicloud";

/// Provider serving every Huawei Cloud resource type
pub fn provider(config: Config) -> Provider<dyn ClientFactory> {
    provider_with_factory(Arc::new(config))
}

/// Provider over a custom client factory
pub fn provider_with_factory(factory: Arc<dyn ClientFactory>) -> Provider<dyn ClientFactory> {
    Provider::new(PROVIDER_NAME, factory)
        .with_resource(Arc::new(NamespaceResource::new()))
        .with_resource(Arc::new(RouteTableRouteResource::new()))
}
