//! Application-level error type for the scanner binary.

use thiserror::Error;

/// Result alias for scanner bootstrap operations.
pub(crate) type AppResult<T> = Result<T, AppError>;

/// Errors that can abort scanner startup.
#[derive(Debug, Error)]
pub(crate) enum AppError {
    /// Configuration loading failed.
    #[error("configuration operation failed")]
    Config {
        /// Operation identifier.
        operation: &'static str,
        /// Source configuration error.
        source: subcast_config::ConfigError,
    },
    /// The HTTP client used to call the orchestrator or media server could
    /// not be constructed.
    #[error("http client construction failed")]
    HttpClient {
        /// Source error from the HTTP client builder.
        source: reqwest::Error,
    },
    /// The metrics registry could not be built.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source error.
        source: anyhow::Error,
    },
    /// The webhook listener failed to bind or serve.
    #[error("webhook listener failed")]
    Webhook {
        /// Source error.
        source: anyhow::Error,
    },
    /// A required configuration field could not be parsed as a bind address.
    #[error("invalid configuration for {field}: {reason}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable explanation.
        reason: String,
    },
}

impl AppError {
    pub(crate) const fn config(operation: &'static str, source: subcast_config::ConfigError) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn http_client(source: reqwest::Error) -> Self {
        Self::HttpClient { source }
    }

    pub(crate) const fn telemetry(operation: &'static str, source: anyhow::Error) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) const fn webhook(source: anyhow::Error) -> Self {
        Self::Webhook { source }
    }

    pub(crate) fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }
}
