//! CCI v1 REST client

use super::api::{Namespace, NamespaceApi, NamespaceList};
use crate::http::ApiClient;
use async_trait::async_trait;
use fleetform_cloud::Result;

const NAMESPACES_PATH: &str = "api/v1/namespaces";

/// Cloud Container Instance client
pub struct CciClient {
    api: ApiClient,
}

impl CciClient {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }

    fn namespace_path(name: &str) -> String {
        format!("{}/{}", NAMESPACES_PATH, name)
    }
}

#[async_trait]
impl NamespaceApi for CciClient {
    async fn create(&self, request: &Namespace) -> Result<Namespace> {
        tracing::debug!(name = %request.metadata.name, "Creating CCI namespace");
        Ok(self.api.post(NAMESPACES_PATH, request).await?)
    }

    async fn get(&self, name: &str) -> Result<Namespace> {
        Ok(self.api.get(&Self::namespace_path(name)).await?)
    }

    async fn list(&self) -> Result<Vec<Namespace>> {
        let list: NamespaceList = self.api.get(NAMESPACES_PATH).await?;
        tracing::debug!("Listed {} CCI namespaces", list.items.len());
        Ok(list.items)
    }

    async fn delete(&self, name: &str) -> Result<()> {
        tracing::debug!(name, "Deleting CCI namespace");
        Ok(self.api.delete(&Self::namespace_path(name)).await?)
    }
}
