//! Translation between namespace resource data and CCI wire objects

use super::api::{
    Annotations, Labels, Metadata, NAMESPACE_API_VERSION, NAMESPACE_KIND, Namespace,
};
use fleetform_cloud::{CloudError, FieldWriter, ResourceData, ResourceSchema, Result};
use regex::Regex;
use serde_json::Value;
use std::str::FromStr;
use std::sync::LazyLock;

/// Wire sentinel of an enabled container network
pub const NETWORK_READY: &str = "vpc-network-ready";

pub const NAME_MAX_LEN: usize = 63;

pub const POOL_SIZE_RANGE: std::ops::RangeInclusive<i64> = 1..=500;

static NAME_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[a-z0-9]([-a-z0-9]*[a-z0-9])?$").expect("namespace name pattern is valid")
});

/// Namespace flavor
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamespaceFlavor {
    GeneralComputing,
    GpuAccelerated,
}

impl NamespaceFlavor {
    pub fn as_str(&self) -> &'static str {
        match self {
            NamespaceFlavor::GeneralComputing => "general-computing",
            NamespaceFlavor::GpuAccelerated => "gpu-accelerated",
        }
    }
}

impl FromStr for NamespaceFlavor {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "general-computing" => Ok(NamespaceFlavor::GeneralComputing),
            "gpu-accelerated" => Ok(NamespaceFlavor::GpuAccelerated),
            other => Err(CloudError::validation(
                "type",
                format!(
                    "expected \"general-computing\" or \"gpu-accelerated\", got \"{}\"",
                    other
                ),
            )),
        }
    }
}

pub fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name.len() > NAME_MAX_LEN {
        return Err(CloudError::validation(
            "name",
            format!("must be 1 to {} characters long", NAME_MAX_LEN),
        ));
    }
    if !NAME_PATTERN.is_match(name) {
        return Err(CloudError::validation(
            "name",
            "can only consist of lowercase letters, digits and hyphens (-), \
             and must start and end with a letter or digit",
        ));
    }
    Ok(())
}

pub fn encode_network(enabled: bool) -> &'static str {
    if enabled { NETWORK_READY } else { "" }
}

pub fn decode_network(wire: &str) -> Result<bool> {
    match wire {
        NETWORK_READY => Ok(true),
        "" => Ok(false),
        other => Err(CloudError::decode(
            "container_network_enabled",
            format!("invalid container network value \"{}\"", other),
        )),
    }
}

/// Build the create request
///
/// The pool-dependent annotations are only sent when `warmup_pool_size` is set.
pub fn build_create_request(
    data: &ResourceData,
    enterprise_project_id: Option<String>,
) -> Result<Namespace> {
    let name = data.get_str("name");
    validate_name(name)?;
    let flavor: NamespaceFlavor = data.get_str("type").parse()?;

    let mut annotations = Annotations {
        flavor: flavor.as_str().to_string(),
        auto_expend: data.get_bool("auto_expend_enabled").then_some(true),
        ..Annotations::default()
    };

    // An explicit zero is out of range, not unset
    if let Some(size) = data.get("warmup_pool_size").and_then(Value::as_i64) {
        if !POOL_SIZE_RANGE.contains(&size) {
            return Err(CloudError::validation(
                "warmup_pool_size",
                format!(
                    "must be between {} and {}, got {}",
                    POOL_SIZE_RANGE.start(),
                    POOL_SIZE_RANGE.end(),
                    size
                ),
            ));
        }
        annotations.pool_size = Some(size);
        annotations.recycling_interval = data.get_ok("recycling_interval").and_then(Value::as_i64);
        annotations.network = encode_network(data.get_bool("container_network_enabled")).to_string();
    }

    Ok(Namespace {
        kind: NAMESPACE_KIND.to_string(),
        api_version: NAMESPACE_API_VERSION.to_string(),
        metadata: Metadata {
            name: name.to_string(),
            annotations,
            labels: Labels {
                enterprise_project_id: enterprise_project_id.filter(|eps| !eps.is_empty()),
                rbac_enabled: data.get_bool("rbac_enabled").then_some(true),
            },
            ..Metadata::default()
        },
        status: None,
    })
}

/// Read-back fields of a namespace
#[derive(Debug, Clone, PartialEq)]
pub struct NamespaceFields {
    pub uid: String,
    pub name: String,
    pub flavor: String,
    pub enterprise_project_id: Option<String>,
    pub rbac_enabled: bool,
    pub auto_expend_enabled: bool,
    pub created_at: Option<String>,
    pub status: String,
    pub warmup_pool_size: Option<i64>,
    pub recycling_interval: Option<i64>,
    pub network: String,
}

impl NamespaceFields {
    /// Extract the fields; `metadata.name` and `metadata.uid` must be present
    pub fn from_response(ns: &Namespace) -> Result<Self> {
        let metadata = &ns.metadata;
        if metadata.name.is_empty() {
            return Err(CloudError::decode("metadata.name", "missing from the response"));
        }
        let uid = ns
            .uid()
            .ok_or_else(|| CloudError::decode("metadata.uid", "missing from the response"))?;

        Ok(Self {
            uid: uid.to_string(),
            name: metadata.name.clone(),
            flavor: metadata.annotations.flavor.clone(),
            enterprise_project_id: metadata.labels.enterprise_project_id.clone(),
            rbac_enabled: metadata.labels.rbac_enabled.unwrap_or_default(),
            auto_expend_enabled: metadata.annotations.auto_expend.unwrap_or_default(),
            created_at: metadata.creation_timestamp.clone(),
            status: ns.phase().to_string(),
            warmup_pool_size: metadata.annotations.pool_size,
            recycling_interval: metadata.annotations.recycling_interval,
            network: metadata.annotations.network.clone(),
        })
    }

    /// Write every field into `data`, collecting all failures
    pub fn apply(&self, data: &mut ResourceData, schema: &ResourceSchema, region: &str) -> Result<()> {
        let mut writer = FieldWriter::new(data, schema);
        writer
            .set("region", region)
            .set("name", self.name.as_str())
            .set("type", self.flavor.as_str())
            .set("enterprise_project_id", self.enterprise_project_id.clone())
            .set("rbac_enabled", self.rbac_enabled)
            .set("auto_expend_enabled", self.auto_expend_enabled)
            .set("created_at", self.created_at.clone())
            .set("status", self.status.as_str())
            .set("warmup_pool_size", self.warmup_pool_size)
            .set("recycling_interval", self.recycling_interval)
            .set_result("container_network_enabled", decode_network(&self.network));
        writer.finish()
    }
}
