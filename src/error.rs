use thiserror::Error;

/// Rejected or unreadable configuration. Raised before any tick runs.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read configuration: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse configuration: {0}")]
    Parse(#[from] serde_yaml::Error),
    #[error("invalid `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            reason: reason.into(),
        }
    }
}

/// Failure while writing collected statistics.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to write statistics: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode statistics: {0}")]
    Json(#[from] serde_json::Error),
}
