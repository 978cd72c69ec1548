//! Catalog adapter error taxonomy.

use subcast_domain::error::DomainError;
use thiserror::Error;

/// Result alias for catalog operations.
pub type CatalogResult<T> = Result<T, CatalogError>;

/// Errors raised by a catalog adapter, before translation into [`DomainError`].
#[derive(Debug, Error)]
pub enum CatalogError {
    /// The catalog rejected the request due to rate limiting.
    #[error("catalog rate limit reached during {operation}")]
    RateLimited {
        /// Operation being attempted when the limit was hit.
        operation: &'static str,
    },
    /// The catalog reported no match for the query.
    #[error("no catalog match for {operation}")]
    NotFound {
        /// Operation that found nothing.
        operation: &'static str,
    },
    /// The underlying HTTP request failed.
    #[error("catalog request failed during {operation}")]
    Http {
        /// Operation being attempted.
        operation: &'static str,
        /// Underlying HTTP client error.
        source: reqwest::Error,
    },
    /// The catalog response could not be decoded.
    #[error("failed to decode catalog response for {operation}: {reason}")]
    Decode {
        /// Operation being attempted.
        operation: &'static str,
        /// Human-readable decode failure detail.
        reason: String,
    },
    /// Hashing the local video file failed.
    #[error("failed to hash video file: {reason}")]
    Hash {
        /// Human-readable I/O failure detail.
        reason: String,
    },
}

impl From<CatalogError> for DomainError {
    fn from(error: CatalogError) -> Self {
        match error {
            CatalogError::RateLimited { .. } => Self::CatalogRateLimit,
            CatalogError::NotFound { .. } => Self::CatalogNotFound,
            CatalogError::Http { operation, source } => Self::TransientInfra {
                operation,
                reason: source.to_string(),
            },
            CatalogError::Decode { operation, reason } => Self::Unexpected { operation, reason },
            CatalogError::Hash { reason } => Self::Unexpected {
                operation: "hash_video_file",
                reason,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_limited_maps_to_domain_rate_limit() {
        let domain: DomainError = CatalogError::RateLimited {
            operation: "search_by_hash",
        }
        .into();
        assert!(matches!(domain, DomainError::CatalogRateLimit));
    }

    #[test]
    fn not_found_maps_to_domain_not_found() {
        let domain: DomainError = CatalogError::NotFound {
            operation: "search_by_title",
        }
        .into();
        assert!(matches!(domain, DomainError::CatalogNotFound));
    }
}
