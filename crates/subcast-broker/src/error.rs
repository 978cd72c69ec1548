//! Broker error taxonomy.

use thiserror::Error;

/// Result alias for broker operations.
pub type BrokerResult<T> = Result<T, BrokerError>;

/// Errors raised while talking to the AMQP broker.
#[derive(Debug, Error)]
pub enum BrokerError {
    /// Establishing the connection or channel failed.
    #[error("broker operation '{operation}' failed: {source}")]
    Connection {
        /// Operation identifier for log correlation.
        operation: &'static str,
        /// Underlying AMQP client error.
        #[source]
        source: lapin::Error,
    },
    /// A published payload could not be serialized to JSON.
    #[error("failed to encode payload for '{operation}': {reason}")]
    Encode {
        /// Operation identifier for log correlation.
        operation: &'static str,
        /// Human-readable encode failure detail.
        reason: String,
    },
    /// A delivered payload could not be decoded from JSON.
    #[error("failed to decode delivery on '{queue}': {reason}")]
    Decode {
        /// Queue the malformed delivery arrived on.
        queue: &'static str,
        /// Human-readable decode failure detail.
        reason: String,
    },
}

impl BrokerError {
    /// Construct a connection error from an underlying `lapin` error.
    #[must_use]
    pub const fn connection(operation: &'static str, source: lapin::Error) -> Self {
        Self::Connection { operation, source }
    }

    /// Construct an encode error from a message.
    #[must_use]
    pub fn encode(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::Encode {
            operation,
            reason: reason.into(),
        }
    }

    /// Construct a decode error from a message.
    #[must_use]
    pub fn decode(queue: &'static str, reason: impl Into<String>) -> Self {
        Self::Decode {
            queue,
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_carries_queue_and_reason() {
        let err = BrokerError::decode("subtitle.download", "invalid json");
        assert!(err.to_string().contains("subtitle.download"));
        assert!(err.to_string().contains("invalid json"));
    }
}
