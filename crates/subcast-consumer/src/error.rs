//! Application-level error type for the event consumer binary.

use thiserror::Error;

/// Result alias for consumer bootstrap operations.
pub(crate) type AppResult<T> = Result<T, AppError>;

/// Errors that can abort consumer startup.
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
    /// The store connection failed.
    #[error("store operation failed")]
    Store {
        /// Operation identifier.
        operation: &'static str,
        /// Source store error.
        source: subcast_store::StoreError,
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

    pub(crate) const fn store(operation: &'static str, source: subcast_store::StoreError) -> Self {
        Self::Store { operation, source }
    }

    pub(crate) const fn telemetry(operation: &'static str, source: anyhow::Error) -> Self {
        Self::Telemetry { operation, source }
    }
}
