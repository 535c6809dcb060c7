//! CCI namespace wire types and API surface

use async_trait::async_trait;
use fleetform_cloud::Result;
use serde::{Deserialize, Serialize};

pub const NAMESPACE_KIND: &str = "Namespace";
pub const NAMESPACE_API_VERSION: &str = "v1";

/// Kubernetes-style namespace object
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Namespace {
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub kind: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub api_version: String,
    #[serde(default)]
    pub metadata: Metadata,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<NamespaceStatus>,
}

impl Namespace {
    /// Lifecycle phase ("Pending", "Active", "Terminating"), empty if unreported
    pub fn phase(&self) -> &str {
        self.status.as_ref().map(|s| s.phase.as_str()).unwrap_or_default()
    }

    pub fn uid(&self) -> Option<&str> {
        self.metadata.uid.as_deref().filter(|uid| !uid.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Metadata {
    #[serde(default)]
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uid: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub creation_timestamp: Option<String>,
    #[serde(default)]
    pub annotations: Annotations,
    #[serde(default)]
    pub labels: Labels,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Annotations {
    #[serde(
        rename = "namespace.kubernetes.io/flavor",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub flavor: String,

    #[serde(
        rename = "namespace.kubernetes.io/autoexpend",
        default,
        with = "string_encoded",
        skip_serializing_if = "Option::is_none"
    )]
    pub auto_expend: Option<bool>,

    #[serde(
        rename = "network.cci.io/warm-pool-size",
        default,
        with = "string_encoded",
        skip_serializing_if = "Option::is_none"
    )]
    pub pool_size: Option<i64>,

    #[serde(
        rename = "network.cci.io/warm-pool-recycle-interval",
        default,
        with = "string_encoded",
        skip_serializing_if = "Option::is_none"
    )]
    pub recycling_interval: Option<i64>,

    /// Container network sentinel, see [`super::mapper::NETWORK_READY`]
    #[serde(
        rename = "network.cci.io/ready-before-pod-run",
        default,
        skip_serializing_if = "String::is_empty"
    )]
    pub network: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Labels {
    #[serde(
        rename = "sys_enterprise_project_id",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub enterprise_project_id: Option<String>,

    #[serde(
        rename = "rbac.authorization.cci.io/enable-k8s-rbac",
        default,
        with = "string_encoded",
        skip_serializing_if = "Option::is_none"
    )]
    pub rbac_enabled: Option<bool>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NamespaceStatus {
    #[serde(default)]
    pub phase: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct NamespaceList {
    #[serde(default)]
    pub items: Vec<Namespace>,
}

/// Annotation and label values travel as strings ("true", "10")
mod string_encoded {
    use serde::{Deserialize, Deserializer, Serializer};
    use serde_json::Value;
    use std::fmt::Display;
    use std::str::FromStr;

    pub fn serialize<T, S>(value: &Option<T>, serializer: S) -> Result<S::Ok, S::Error>
    where
        T: Display,
        S: Serializer,
    {
        match value {
            Some(v) => serializer.collect_str(v),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, T, D>(deserializer: D) -> Result<Option<T>, D::Error>
    where
        T: FromStr,
        T::Err: Display,
        D: Deserializer<'de>,
    {
        let text = match Option::<Value>::deserialize(deserializer)? {
            None | Some(Value::Null) => return Ok(None),
            Some(Value::String(s)) if s.is_empty() => return Ok(None),
            Some(Value::String(s)) => s,
            Some(other) => other.to_string(),
        };
        text.parse().map(Some).map_err(serde::de::Error::custom)
    }
}

/// CCI namespace operations
#[async_trait]
pub trait NamespaceApi: Send + Sync {
    async fn create(&self, request: &Namespace) -> Result<Namespace>;

    /// Get a namespace by name
    async fn get(&self, name: &str) -> Result<Namespace>;

    async fn list(&self) -> Result<Vec<Namespace>>;

    /// Submit deletion of a namespace by name
    async fn delete(&self, name: &str) -> Result<()>;

    /// Find a namespace by UID
    ///
    /// The API has no lookup by UID, so this scans the full listing.
    async fn find_by_uid(&self, uid: &str) -> Result<Option<Namespace>> {
        let namespaces = self.list().await?;
        Ok(namespaces.into_iter().find(|ns| ns.uid() == Some(uid)))
    }
}
