//! Event bus error primitives.

use subcast_domain::EventId;
use thiserror::Error;

/// Errors surfaced by an [`crate::bus::EventBus`] implementation.
#[derive(Debug, Error)]
pub enum EventBusError {
    /// The transport rejected or failed to deliver a published envelope.
    #[error("failed to publish event {event_id} ({event_kind}): {reason}")]
    Publish {
        /// Identifier of the envelope that failed to publish.
        event_id: EventId,
        /// Event kind string, for log correlation.
        event_kind: &'static str,
        /// Human-readable failure detail.
        reason: String,
    },
    /// The bus (or the underlying broker connection) has been closed.
    #[error("event bus is closed")]
    Closed,
}

/// Result alias for event bus operations.
pub type EventBusResult<T> = Result<T, EventBusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn publish_error_formats_with_kind_and_reason() {
        let err = EventBusError::Publish {
            event_id: EventId::new(),
            event_kind: "job.failed",
            reason: "channel closed".into(),
        };
        assert!(err.to_string().contains("job.failed"));
        assert!(err.to_string().contains("channel closed"));
    }
}
