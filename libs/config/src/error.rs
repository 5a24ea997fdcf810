use thiserror::Error;

/// Invalid or missing configuration
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Failed to load configuration: {0}")]
    Load(String),

    #[error("Invalid endpoint '{endpoint}': {reason}")]
    InvalidEndpoint { endpoint: String, reason: String },

    #[error("Source id {value} out of range: must be between 0 and 255")]
    SourceIdOutOfRange { value: u64 },

    #[error("Invalid socket option {option}: {reason}")]
    InvalidSocketOption { option: &'static str, reason: String },
}

impl ConfigError {
    pub fn invalid_endpoint(endpoint: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidEndpoint {
            endpoint: endpoint.into(),
            reason: reason.into(),
        }
    }
}

impl From<config_rs::ConfigError> for ConfigError {
    fn from(err: config_rs::ConfigError) -> Self {
        ConfigError::Load(err.to_string())
    }
}
