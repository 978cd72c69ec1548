//! Application-level error type for the downloader binary.

use thiserror::Error;

/// Result alias for downloader bootstrap operations.
pub(crate) type AppResult<T> = Result<T, AppError>;

/// Errors that can abort downloader startup.
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
    /// Broker connection, channel, or topology setup failed.
    #[error("broker operation failed")]
    Broker {
        /// Operation identifier.
        operation: &'static str,
        /// Source broker error.
        source: subcast_broker::BrokerError,
    },
    /// The subtitle catalog client could not be constructed.
    #[error("catalog client construction failed")]
    Catalog {
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
}

impl AppError {
    pub(crate) const fn config(operation: &'static str, source: subcast_config::ConfigError) -> Self {
        Self::Config { operation, source }
    }

    pub(crate) const fn broker(operation: &'static str, source: subcast_broker::BrokerError) -> Self {
        Self::Broker { operation, source }
    }

    pub(crate) const fn catalog(source: reqwest::Error) -> Self {
        Self::Catalog { source }
    }

    pub(crate) const fn telemetry(operation: &'static str, source: anyhow::Error) -> Self {
        Self::Telemetry { operation, source }
    }
}
