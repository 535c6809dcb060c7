//! Cloud reconciliation error types

use std::time::Duration;
use thiserror::Error;

/// A single field that could not be written to local state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: String,
    pub message: String,
}

impl FieldError {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl std::fmt::Display for FieldError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Cloud reconciliation errors
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("Invalid value for {field}: {message}")]
    Validation { field: String, message: String },

    #[error("Unable to create API client: {0}")]
    ClientInit(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Timeout after {timeout:?} waiting for {target:?} (last state: {last_state})")]
    Timeout {
        target: Vec<String>,
        last_state: String,
        timeout: Duration,
    },

    #[error("Unexpected state '{state}', wanted target {target:?}{}", fmt_cause(.cause))]
    UnexpectedState {
        state: String,
        target: Vec<String>,
        cause: Option<String>,
    },

    #[error("Operation cancelled while waiting for {0:?}")]
    Cancelled(Vec<String>),

    #[error("Failed to set {} field(s): {}", .0.len(), join_fields(.0))]
    PartialFailure(Vec<FieldError>),

    #[error("Changing {} requires replacing the resource", .fields.join(", "))]
    ReplacementRequired { fields: Vec<String> },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Unable to decode {field}: {message}")]
    Decode { field: String, message: String },

    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("Unsupported operation: {0}")]
    Unsupported(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn fmt_cause(cause: &Option<String>) -> String {
    cause.as_ref().map(|c| format!(": {}", c)).unwrap_or_default()
}

fn join_fields(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl CloudError {
    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            field: field.into(),
            message: message.into(),
        }
    }

    pub fn decode(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Decode {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Whether the remote side reported the resource as absent
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, CloudError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_failure_lists_every_field() {
        let err = CloudError::PartialFailure(vec![
            FieldError::new("status", "expected string"),
            FieldError::new("container_network_enabled", "invalid sentinel"),
        ]);
        let msg = err.to_string();
        assert!(msg.starts_with("Failed to set 2 field(s)"));
        assert!(msg.contains("status: expected string"));
        assert!(msg.contains("container_network_enabled: invalid sentinel"));
    }

    #[test]
    fn test_replacement_required_message() {
        let err = CloudError::ReplacementRequired {
            fields: vec!["name".to_string(), "type".to_string()],
        };
        assert_eq!(
            err.to_string(),
            "Changing name, type requires replacing the resource"
        );
    }
}
