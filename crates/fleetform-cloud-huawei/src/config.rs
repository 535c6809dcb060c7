//! Provider configuration and client factory
//!
//! [`Config`] is the provider meta threaded through every resource
//! operation. Handlers never build clients themselves; they ask the
//! [`ClientFactory`] for the API surface they need in the resolved region.

use crate::cci::{CciClient, NamespaceApi};
use crate::error::{HuaweiError, Result};
use crate::http::ApiClient;
use crate::vpc::{RouteApi, RouteTableApi, VpcClient};
use fleetform_cloud::{ResourceData, WaitSpec};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

/// Default domain of the public cloud
pub const DEFAULT_CLOUD: &str = "myhuaweicloud.com";

const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 60;

/// Huawei Cloud provider configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Default region for resources that do not set one
    pub region: String,

    /// Project scoping VPC requests
    pub project_id: String,

    /// Default enterprise project for resources that do not set one
    pub enterprise_project_id: Option<String>,

    /// IAM token sent as `X-Auth-Token`
    pub auth_token: String,

    /// Cloud domain, e.g. "myhuaweicloud.com"
    pub cloud: String,

    /// Endpoint overrides by service name ("cci", "vpc")
    pub endpoints: HashMap<String, String>,

    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            region: String::new(),
            project_id: String::new(),
            enterprise_project_id: None,
            auth_token: String::new(),
            cloud: DEFAULT_CLOUD.to_string(),
            endpoints: HashMap::new(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
        }
    }
}

impl Config {
    /// Create Config from environment variables
    ///
    /// `HW_AUTH_TOKEN`, `HW_REGION_NAME` and `HW_PROJECT_ID` are required;
    /// `HW_ENTERPRISE_PROJECT_ID` and `HW_CLOUD` are optional.
    pub fn from_env() -> Result<Self> {
        let auth_token = std::env::var("HW_AUTH_TOKEN")
            .map_err(|_| HuaweiError::MissingEnvVar("HW_AUTH_TOKEN".to_string()))?;
        let region = std::env::var("HW_REGION_NAME")
            .map_err(|_| HuaweiError::MissingEnvVar("HW_REGION_NAME".to_string()))?;
        let project_id = std::env::var("HW_PROJECT_ID")
            .map_err(|_| HuaweiError::MissingEnvVar("HW_PROJECT_ID".to_string()))?;

        let enterprise_project_id = std::env::var("HW_ENTERPRISE_PROJECT_ID")
            .ok()
            .filter(|v| !v.is_empty());
        let cloud = std::env::var("HW_CLOUD")
            .ok()
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_CLOUD.to_string());

        Ok(Self {
            region,
            project_id,
            enterprise_project_id,
            auth_token,
            cloud,
            ..Self::default()
        })
    }

    /// Base URL of a service in a region
    pub fn endpoint(&self, service: &str, region: &str) -> String {
        match self.endpoints.get(service) {
            Some(url) => url.trim_end_matches('/').to_string(),
            None => format!("https://{}.{}.{}", service, region, self.cloud),
        }
    }

    fn api_client(&self, service: &str, region: &str) -> Result<ApiClient> {
        if self.auth_token.is_empty() {
            return Err(HuaweiError::InvalidConfig("auth_token is not set".to_string()));
        }
        if region.is_empty() {
            return Err(HuaweiError::InvalidConfig(format!(
                "no region given for the {} client",
                service
            )));
        }

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(self.request_timeout_secs))
            .build()?;
        Ok(ApiClient::new(
            client,
            self.endpoint(service, region),
            self.auth_token.clone(),
        ))
    }

    fn vpc_client(&self, region: &str) -> Result<Arc<VpcClient>> {
        if self.project_id.is_empty() {
            return Err(HuaweiError::InvalidConfig("project_id is not set".to_string()));
        }
        let api = self.api_client("vpc", region)?;
        Ok(Arc::new(VpcClient::new(api, self.project_id.clone())))
    }
}

/// Poller timing of one resource type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollTiming {
    pub delay: Duration,
    pub poll_interval: Duration,
}

impl PollTiming {
    pub const fn new(delay: Duration, poll_interval: Duration) -> Self {
        Self {
            delay,
            poll_interval,
        }
    }

    pub fn wait_spec(&self, pending: &[&str], target: &[&str], timeout: Duration) -> WaitSpec {
        WaitSpec::new(pending, target, timeout)
            .with_delay(self.delay)
            .with_poll_interval(self.poll_interval)
    }
}

/// Source of API clients and provider-level defaults
pub trait ClientFactory: Send + Sync {
    fn default_region(&self) -> &str;

    fn default_enterprise_project_id(&self) -> Option<&str>;

    fn namespace_api(&self, region: &str) -> fleetform_cloud::Result<Arc<dyn NamespaceApi>>;

    fn route_table_api(&self, region: &str) -> fleetform_cloud::Result<Arc<dyn RouteTableApi>>;

    fn route_api(&self, region: &str) -> fleetform_cloud::Result<Arc<dyn RouteApi>>;

    /// Region of a resource, falling back to the provider default
    fn region(&self, data: &ResourceData) -> String {
        match data.get_str("region") {
            "" => self.default_region().to_string(),
            region => region.to_string(),
        }
    }

    /// Enterprise project of a resource, falling back to the provider default
    fn enterprise_project_id(&self, data: &ResourceData) -> Option<String> {
        match data.get_str("enterprise_project_id") {
            "" => self.default_enterprise_project_id().map(str::to_string),
            eps => Some(eps.to_string()),
        }
    }
}

impl ClientFactory for Config {
    fn default_region(&self) -> &str {
        &self.region
    }

    fn default_enterprise_project_id(&self) -> Option<&str> {
        self.enterprise_project_id.as_deref()
    }

    fn namespace_api(&self, region: &str) -> fleetform_cloud::Result<Arc<dyn NamespaceApi>> {
        let api = self.api_client("cci", region)?;
        Ok(Arc::new(CciClient::new(api)))
    }

    fn route_table_api(&self, region: &str) -> fleetform_cloud::Result<Arc<dyn RouteTableApi>> {
        Ok(self.vpc_client(region)?)
    }

    fn route_api(&self, region: &str) -> fleetform_cloud::Result<Arc<dyn RouteApi>> {
        Ok(self.vpc_client(region)?)
    }
}
