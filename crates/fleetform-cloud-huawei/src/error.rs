//! Huawei Cloud provider error types

use fleetform_cloud::CloudError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum HuaweiError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("API error ({status}): {message}")]
    ApiError { status: u16, message: String },

    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("JSON parse error: {0}")]
    JsonError(#[from] serde_json::Error),
}

impl From<HuaweiError> for CloudError {
    fn from(err: HuaweiError) -> Self {
        match err {
            HuaweiError::NotFound(what) => CloudError::NotFound(what),
            HuaweiError::ApiError { status, message } => CloudError::Api { status, message },
            HuaweiError::MissingEnvVar(_) | HuaweiError::InvalidConfig(_) => {
                CloudError::ClientInit(err.to_string())
            }
            HuaweiError::Http(e) => CloudError::Api {
                status: e.status().map(|s| s.as_u16()).unwrap_or_default(),
                message: e.to_string(),
            },
            HuaweiError::JsonError(e) => CloudError::Json(e),
        }
    }
}

pub type Result<T> = std::result::Result<T, HuaweiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_maps_to_cloud_not_found() {
        let err: CloudError = HuaweiError::NotFound("/api/v1/namespaces/ns".to_string()).into();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_config_errors_map_to_client_init() {
        let err: CloudError = HuaweiError::MissingEnvVar("HW_AUTH_TOKEN".to_string()).into();
        assert!(matches!(err, CloudError::ClientInit(ref m) if m.contains("HW_AUTH_TOKEN")));
    }
}
