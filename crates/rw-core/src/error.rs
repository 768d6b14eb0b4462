//! Centralized error types for reportwall.

use thiserror::Error;

/// Every way fetching or presenting the report can fail.
///
/// Each variant carries a fixed message for the on-screen panel via
/// [`ReportError::user_message`]; nothing is retried.
#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Report not found: {0}")]
    NotFound(String),

    #[error("Object storage credentials not found")]
    MissingCredentials,

    #[error("Object storage error ({code}): {message}")]
    Provider { code: String, message: String },

    #[error("Transport error: {0}")]
    Transport(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

/// Result type for reportwall operations.
pub type ReportResult<T> = Result<T, ReportError>;

impl ReportError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a provider error from an S3 error code and message.
    pub fn provider(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Provider {
            code: code.into(),
            message: message.into(),
        }
    }

    /// Message shown in the error panel in place of the report.
    pub fn user_message(&self) -> String {
        match self {
            Self::NotFound(_) => "No PDF report found.".to_string(),
            Self::MissingCredentials => "AWS credentials not found.".to_string(),
            Self::Provider { message, .. } => format!("AWS error: {}", message),
            Self::Transport(detail) | Self::Config(detail) | Self::Unexpected(detail) => {
                format!("Unexpected error: {}", detail)
            }
            Self::Io(e) => format!("Unexpected error: {}", e),
        }
    }

    /// Stable machine-readable name for API responses.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NotFound",
            Self::MissingCredentials => "MissingCredentials",
            Self::Provider { .. } => "ProviderError",
            Self::Transport(_) => "TransportError",
            Self::Io(_) => "IoError",
            Self::Config(_) => "ConfigError",
            Self::Unexpected(_) => "Unexpected",
        }
    }

    /// HTTP status code used when the error panel is rendered.
    pub fn http_status(&self) -> u16 {
        match self {
            Self::NotFound(_) => 404,
            Self::Provider { .. } | Self::Transport(_) => 502,
            Self::MissingCredentials | Self::Io(_) | Self::Config(_) | Self::Unexpected(_) => 500,
        }
    }
}
