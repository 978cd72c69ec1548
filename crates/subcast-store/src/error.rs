//! Store error taxonomy.

use thiserror::Error;

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors raised by a [`crate::job_store::JobStore`] or
/// [`crate::dedup::DedupStore`] implementation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The underlying connection or command failed.
    #[error("store operation '{operation}' failed: {source}")]
    Backend {
        /// Operation identifier for log correlation.
        operation: &'static str,
        /// Underlying redis error.
        #[source]
        source: redis::RedisError,
    },
    /// A record read from the store could not be decoded into its typed form.
    #[error("store record '{operation}' was malformed: {reason}")]
    Decode {
        /// Operation identifier for log correlation.
        operation: &'static str,
        /// Human-readable decode failure detail.
        reason: String,
    },
}

impl StoreError {
    /// Construct a backend error from a redis error.
    #[must_use]
    pub const fn backend(operation: &'static str, source: redis::RedisError) -> Self {
        Self::Backend { operation, source }
    }

    /// Construct a decode error from a message.
    #[must_use]
    pub fn decode(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Decode {
            operation,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_carries_operation_and_reason() {
        let err = StoreError::decode("get_job", "missing field status");
        assert!(err.to_string().contains("get_job"));
        assert!(err.to_string().contains("missing field status"));
    }
}
