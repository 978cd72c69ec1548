//! Configuration error taxonomy.

use thiserror::Error;

/// Result alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Errors raised while loading configuration from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required environment variable was not set.
    #[error("missing required environment variable '{name}'")]
    MissingEnv {
        /// Name of the missing variable.
        name: &'static str,
    },
    /// An environment variable was set but could not be parsed.
    #[error("invalid value for '{name}': {reason}")]
    Invalid {
        /// Name of the offending variable.
        name: &'static str,
        /// Human-readable parse failure detail.
        reason: String,
    },
}
