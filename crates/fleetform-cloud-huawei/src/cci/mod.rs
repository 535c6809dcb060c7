//! Cloud Container Instance (CCI) namespaces

pub mod api;
pub mod client;
pub mod mapper;
pub mod resource;

pub use api::{Namespace, NamespaceApi};
pub use client::CciClient;
pub use resource::{NAMESPACE_TYPE, NamespaceResource};
