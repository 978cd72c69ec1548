//! Application-level error type for the orchestrator binary.

use thiserror::Error;

/// Result alias for orchestrator bootstrap and wiring operations.
pub(crate) type AppResult<T> = Result<T, AppError>;

/// Errors that can abort orchestrator startup or the serve loop.
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
    /// Store connection failed.
    #[error("store operation failed")]
    Store {
        /// Operation identifier.
        operation: &'static str,
        /// Source store error.
        source: subcast_store::StoreError,
    },
    /// Metrics registry construction failed.
    #[error("telemetry operation failed")]
    Telemetry {
        /// Operation identifier.
        operation: &'static str,
        /// Source error from the metrics registry builder.
        source: anyhow::Error,
    },
    /// A configuration value could not be parsed into the form the binary needs.
    #[error("invalid configuration")]
    InvalidConfig {
        /// Field name that failed validation.
        field: &'static str,
        /// Human-readable reason for the failure.
        reason: String,
    },
    /// The HTTP server failed to bind or terminated unexpectedly.
    #[error("api server operation failed")]
    ApiServer {
        /// Source error from the API server.
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

    pub(crate) const fn store(operation: &'static str, source: subcast_store::StoreError) -> Self {
        Self::Store { operation, source }
    }

    pub(crate) const fn telemetry(operation: &'static str, source: anyhow::Error) -> Self {
        Self::Telemetry { operation, source }
    }

    pub(crate) fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) const fn api_server(source: anyhow::Error) -> Self {
        Self::ApiServer { source }
    }
}
