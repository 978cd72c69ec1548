//! API error wrapper and its JSON response shape.
//!
//! Mirrors the RFC9457-flavored error envelope the orchestrator's HTTP
//! boundary is built around: a status code, a machine-readable `error_type`
//! discriminator, and a human-readable detail message.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use subcast_domain::DomainError;

/// Structured API error.
#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    error_type: &'static str,
    detail: String,
}

/// JSON body returned alongside an error status code.
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    /// Machine-readable discriminator, stable across releases.
    pub error_type: String,
    /// HTTP status code, duplicated in the body for non-header-aware callers.
    pub status: u16,
    /// Human-readable detail.
    pub detail: String,
}

impl ApiError {
    /// Malformed caller input; no job was created.
    #[must_use]
    pub fn validation(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::BAD_REQUEST,
            error_type: "validation",
            detail: detail.into(),
        }
    }

    /// The requested job (or its events) does not exist.
    #[must_use]
    pub fn not_found(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::NOT_FOUND,
            error_type: "not_found",
            detail: detail.into(),
        }
    }

    /// A broker/store dependency is unreachable or degraded.
    #[must_use]
    pub fn service_unavailable(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::SERVICE_UNAVAILABLE,
            error_type: "infra_transient",
            detail: detail.into(),
        }
    }

    /// An error not covered by the above categories.
    #[must_use]
    pub fn internal(detail: impl Into<String>) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            error_type: "internal",
            detail: detail.into(),
        }
    }
}

impl From<DomainError> for ApiError {
    fn from(err: DomainError) -> Self {
        match err {
            DomainError::Validation { reason } => Self::validation(reason),
            DomainError::TransientInfra { .. } => Self::service_unavailable(err.to_string()),
            DomainError::CatalogRateLimit
            | DomainError::CatalogNotFound
            | DomainError::CatalogTransient { .. }
            | DomainError::ChunkFailed { .. }
            | DomainError::Unexpected { .. } => Self::internal(err.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error_type: self.error_type.to_string(),
            status: self.status.as_u16(),
            detail: self.detail,
        };
        (self.status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_map_to_bad_request() {
        let err = ApiError::validation("target_language must be two lowercase letters");
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
        assert_eq!(err.error_type, "validation");
    }

    #[test]
    fn transient_infra_maps_to_service_unavailable() {
        let err: ApiError = DomainError::transient_infra("reserve", "store timeout").into();
        assert_eq!(err.status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(err.error_type, "infra_transient");
    }

    #[test]
    fn catalog_not_found_maps_to_internal_at_the_api_boundary() {
        let err: ApiError = DomainError::CatalogNotFound.into();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.error_type, "internal");
    }
}
