//! Scanner error taxonomy.

use thiserror::Error;

/// Result alias for scanner operations.
pub type ScannerResult<T> = Result<T, ScannerError>;

/// Errors raised by the scanner's intake subcomponents.
#[derive(Debug, Error)]
pub enum ScannerError {
    /// The filesystem watcher failed to initialize or observe a root.
    #[error("{operation} failed: {source}")]
    Watch {
        /// Operation being attempted.
        operation: &'static str,
        /// Underlying `notify` error.
        source: notify::Error,
    },
    /// The WebSocket client could not connect or was dropped.
    #[error("{operation} failed: {reason}")]
    WebSocket {
        /// Operation being attempted.
        operation: &'static str,
        /// Human-readable failure detail.
        reason: String,
    },
    /// A webhook or WebSocket payload could not be decoded.
    #[error("failed to decode payload: {reason}")]
    Decode {
        /// Human-readable decode failure detail.
        reason: String,
    },
}
