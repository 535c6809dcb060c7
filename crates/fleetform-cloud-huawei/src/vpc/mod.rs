//! Virtual Private Cloud (VPC) route table routes

pub mod api;
pub mod client;
pub mod mapper;
pub mod migrate;
pub mod resource;

pub use api::{LegacyRoute, Route, RouteApi, RouteOperation, RouteOpts, RouteTable, RouteTableApi};
pub use client::VpcClient;
pub use resource::{ROUTE_TYPE, RouteTableRouteResource};
