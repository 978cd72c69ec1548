//! Translator error taxonomy.

use subcast_domain::error::DomainError;
use thiserror::Error;

/// Result alias for translator operations.
pub type TranslateResult<T> = Result<T, TranslateError>;

/// Errors raised while translating a subtitle file.
#[derive(Debug, Error)]
pub enum TranslateError {
    /// The source subtitle could not be parsed.
    #[error("failed to parse subtitle: {reason}")]
    Parse {
        /// Human-readable parse failure detail.
        reason: String,
    },
    /// A filesystem operation failed.
    #[error("{operation} failed: {source}")]
    Io {
        /// Operation being attempted.
        operation: &'static str,
        /// Underlying I/O error.
        source: std::io::Error,
    },
    /// Reading or writing the translation checkpoint failed.
    #[error("{operation} failed: {source}")]
    Store {
        /// Operation being attempted.
        operation: &'static str,
        /// Underlying store error.
        source: subcast_store::StoreError,
    },
    /// A chunk failed translation after exhausting its retry budget.
    #[error("chunk {chunk_index} failed: {message}")]
    ChunkFailed {
        /// Zero-based index of the failing chunk.
        chunk_index: usize,
        /// Human-readable failure detail.
        message: String,
    },
}

impl TranslateError {
    /// Map a per-chunk failure into the domain-level error surfaced to the
    /// event bus (`translation_chunk_failed`).
    #[must_use]
    pub fn into_domain(self) -> DomainError {
        match self {
            Self::Parse { reason } => DomainError::Unexpected {
                operation: "parse_subtitle",
                reason,
            },
            Self::Io { operation, source } => DomainError::TransientInfra {
                operation,
                reason: source.to_string(),
            },
            Self::Store { operation, source } => DomainError::TransientInfra {
                operation,
                reason: source.to_string(),
            },
            Self::ChunkFailed {
                chunk_index,
                message,
            } => DomainError::ChunkFailed {
                chunk_index,
                message,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chunk_failed_maps_to_domain_chunk_failed() {
        let domain = TranslateError::ChunkFailed {
            chunk_index: 2,
            message: "id mismatch".into(),
        }
        .into_domain();
        assert!(matches!(
            domain,
            DomainError::ChunkFailed {
                chunk_index: 2,
                ..
            }
        ));
    }
}
