//! Shared domain error type.
//!
//! # Design
//! - Centralises the error taxonomy from the pipeline's error handling
//!   design: validation errors never create a job; infra/catalog/translation
//!   errors are translated into events by the workers, never left to
//!   propagate out of a message handler.

use thiserror::Error;

/// Result alias for domain operations.
pub type DomainResult<T> = Result<T, DomainError>;

/// Shared error taxonomy used across catalog, translation, and validation code.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Caller-supplied input failed validation; no job was created.
    #[error("validation failed: {reason}")]
    Validation {
        /// Human-readable explanation of what failed.
        reason: String,
    },
    /// The catalog reported a rate limit for the current credentials.
    #[error("catalog rate limit reached")]
    CatalogRateLimit,
    /// The catalog had no matching subtitle for the request.
    #[error("no subtitle found in catalog")]
    CatalogNotFound,
    /// A transient catalog error occurred (network, 5xx, timeout).
    #[error("transient catalog error: {reason}")]
    CatalogTransient {
        /// Human-readable explanation of the transient failure.
        reason: String,
    },
    /// A translation chunk failed after retries were exhausted.
    #[error("translation chunk {chunk_index} failed: {message}")]
    ChunkFailed {
        /// Index of the failing chunk.
        chunk_index: usize,
        /// Human-readable failure detail.
        message: String,
    },
    /// A dependency (store, broker) was unreachable or errored transiently.
    #[error("infrastructure operation '{operation}' failed: {reason}")]
    TransientInfra {
        /// Operation identifier for log correlation.
        operation: &'static str,
        /// Human-readable explanation of the failure.
        reason: String,
    },
    /// An error not covered by the above categories; always logged.
    #[error("unexpected error in '{operation}': {reason}")]
    Unexpected {
        /// Operation identifier for log correlation.
        operation: &'static str,
        /// Human-readable explanation of the failure.
        reason: String,
    },
}

impl DomainError {
    /// Construct a validation error from a message.
    #[must_use]
    pub fn validation(reason: impl Into<String>) -> Self {
        Self::Validation {
            reason: reason.into(),
        }
    }

    /// Construct a transient infrastructure error.
    #[must_use]
    pub fn transient_infra(operation: &'static str, reason: impl Into<String>) -> Self {
        Self::TransientInfra {
            operation,
            reason: reason.into(),
        }
    }

    /// Machine-readable `error_type` discriminator mirrored in `job.failed`
    /// event payloads.
    #[must_use]
    pub const fn error_type(&self) -> &'static str {
        match self {
            Self::Validation { .. } => "validation",
            Self::CatalogRateLimit => "rate_limit",
            Self::CatalogNotFound => "subtitle_not_found",
            Self::CatalogTransient { .. } => "catalog_transient",
            Self::ChunkFailed { .. } => "translation_chunk_failed",
            Self::TransientInfra { .. } => "infra_transient",
            Self::Unexpected { .. } => "internal",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_type_matches_spec_error_codes() {
        assert_eq!(DomainError::CatalogRateLimit.error_type(), "rate_limit");
        assert_eq!(
            DomainError::CatalogNotFound.error_type(),
            "subtitle_not_found"
        );
        assert_eq!(
            DomainError::validation("bad url").error_type(),
            "validation"
        );
        assert_eq!(
            DomainError::Unexpected {
                operation: "x",
                reason: "boom".into()
            }
            .error_type(),
            "internal"
        );
    }
}
