//! VPC REST client

use super::api::{LegacyRoute, RouteApi, RouteOperation, RouteTable, RouteTableApi, UpdateRoutesRequest};
use crate::http::ApiClient;
use async_trait::async_trait;
use fleetform_cloud::Result;
use serde::Deserialize;

const PAGE_LIMIT: usize = 100;

/// Virtual Private Cloud client
pub struct VpcClient {
    api: ApiClient,
    project_id: String,
}

#[derive(Deserialize)]
struct RouteTableResponse {
    routetable: RouteTable,
}

#[derive(Deserialize)]
struct RouteTableListResponse {
    #[serde(default)]
    routetables: Vec<RouteTable>,
}

#[derive(Deserialize)]
struct RouteResponse {
    route: LegacyRoute,
}

impl VpcClient {
    pub fn new(api: ApiClient, project_id: impl Into<String>) -> Self {
        Self {
            api,
            project_id: project_id.into(),
        }
    }

    fn route_tables_path(&self) -> String {
        format!("v1/{}/routetables", self.project_id)
    }

    fn route_table_path(&self, id: &str) -> String {
        format!("{}/{}", self.route_tables_path(), id)
    }
}

#[async_trait]
impl RouteTableApi for VpcClient {
    async fn get(&self, id: &str) -> Result<RouteTable> {
        let response: RouteTableResponse = self.api.get(&self.route_table_path(id)).await?;
        Ok(response.routetable)
    }

    async fn list(&self, vpc_id: &str) -> Result<Vec<RouteTable>> {
        let mut tables = Vec::new();
        let mut marker: Option<String> = None;

        loop {
            let mut path = format!(
                "{}?vpc_id={}&limit={}",
                self.route_tables_path(),
                vpc_id,
                PAGE_LIMIT
            );
            if let Some(marker) = &marker {
                path.push_str(&format!("&marker={}", marker));
            }

            let page: RouteTableListResponse = self.api.get(&path).await?;
            let count = page.routetables.len();
            marker = page.routetables.last().and_then(|t| t.id.clone());
            tables.extend(page.routetables);

            if count < PAGE_LIMIT || marker.is_none() {
                break;
            }
        }

        tracing::debug!(vpc_id, "Listed {} route tables", tables.len());
        Ok(tables)
    }

    async fn update(&self, id: &str, operations: &[RouteOperation]) -> Result<RouteTable> {
        let request = UpdateRoutesRequest { operations };
        let body = serde_json::to_string(&request)?;
        tracing::debug!(route_table_id = id, "Updating route table: {}", body);
        let response: RouteTableResponse = self.api.put(&self.route_table_path(id), &request).await?;
        Ok(response.routetable)
    }
}

#[async_trait]
impl RouteApi for VpcClient {
    async fn get_route(&self, id: &str) -> Result<LegacyRoute> {
        let response: RouteResponse = self.api.get(&format!("v2.0/vpc/routes/{}", id)).await?;
        Ok(response.route)
    }
}
