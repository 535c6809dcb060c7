//! Composite resource identifiers
//!
//! Resources that live inside a parent are identified locally as
//! `<parent>/<distinguisher>`. Only the first `/` separates the two parts, so
//! the distinguisher may itself contain slashes (a CIDR, for instance).

use crate::error::CloudError;
use std::str::FromStr;

/// `<parent>/<distinguisher>` identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CompositeId {
    parent: String,
    distinguisher: String,
}

impl CompositeId {
    pub fn new(parent: impl Into<String>, distinguisher: impl Into<String>) -> Self {
        Self {
            parent: parent.into(),
            distinguisher: distinguisher.into(),
        }
    }

    pub fn parent(&self) -> &str {
        &self.parent
    }

    pub fn distinguisher(&self) -> &str {
        &self.distinguisher
    }
}

impl std::fmt::Display for CompositeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.parent, self.distinguisher)
    }
}

impl FromStr for CompositeId {
    type Err = CloudError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.split_once('/') {
            Some((parent, distinguisher)) if !parent.is_empty() && !distinguisher.is_empty() => {
                Ok(Self::new(parent, distinguisher))
            }
            _ => Err(CloudError::validation(
                "id",
                format!("'{}' is not in the <parent>/<distinguisher> format", s),
            )),
        }
    }
}

/// A local identifier as found in state
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LocalId {
    /// Current `<parent>/<distinguisher>` format
    Composite(CompositeId),
    /// Pre-composite single-part identifier, to be upgraded
    Legacy(String),
}

impl LocalId {
    pub fn parse(id: &str) -> Self {
        match id.parse::<CompositeId>() {
            Ok(composite) => LocalId::Composite(composite),
            Err(_) => LocalId::Legacy(id.to_string()),
        }
    }
}
