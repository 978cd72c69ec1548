//! Application-level error type for the translator worker binary.

use thiserror::Error;

/// Result alias for translator worker bootstrap operations.
pub(crate) type AppResult<T> = Result<T, AppError>;

/// Errors that can abort translator worker startup.
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
    /// A required configuration field was missing or invalid.
    #[error("invalid configuration for {field}: {reason}")]
    InvalidConfig {
        /// Name of the offending field.
        field: &'static str,
        /// Human-readable explanation.
        reason: String,
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
    /// The translation provider client could not be constructed.
    #[error("translation provider construction failed")]
    Provider {
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

    pub(crate) fn invalid_config(field: &'static str, reason: impl Into<String>) -> Self {
        Self::InvalidConfig {
            field,
            reason: reason.into(),
        }
    }

    pub(crate) const fn broker(operation: &'static str, source: subcast_broker::BrokerError) -> Self {
        Self::Broker { operation, source }
    }

    pub(crate) const fn store(operation: &'static str, source: subcast_store::StoreError) -> Self {
        Self::Store { operation, source }
    }

    pub(crate) const fn provider(source: reqwest::Error) -> Self {
        Self::Provider { source }
    }

    pub(crate) const fn telemetry(operation: &'static str, source: anyhow::Error) -> Self {
        Self::Telemetry { operation, source }
    }
}
