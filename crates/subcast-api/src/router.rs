//! Router construction and server host for the orchestrator's HTTP surface.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::http::Request;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::trace::TraceLayer;
use tracing::Span;

use crate::handlers::{get_events, get_status, health, submit_download, submit_translation};
use crate::state::ApiState;
use crate::telemetry::HttpMetricsLayer;

const HEADER_REQUEST_ID: &str = "x-request-id";

/// Axum router wrapper hosting the orchestrator's HTTP API.
pub struct ApiServer {
    router: Router,
}

impl ApiServer {
    /// Construct the server from its shared state.
    #[must_use]
    pub fn new(state: Arc<ApiState>) -> Self {
        let telemetry = state.metrics.clone();

        let trace_layer = TraceLayer::new_for_http()
            .make_span_with(|request: &Request<_>| {
                let method = request.method().clone();
                let uri_path = request.uri().path();
                let request_id = request
                    .headers()
                    .get(HEADER_REQUEST_ID)
                    .and_then(|value| value.to_str().ok())
                    .unwrap_or("")
                    .to_string();

                tracing::info_span!(
                    "http.request",
                    method = %method,
                    route = %uri_path,
                    request_id = %request_id,
                    status_code = tracing::field::Empty,
                    latency_ms = tracing::field::Empty
                )
            })
            .on_response(
                |response: &axum::response::Response, latency: Duration, span: &Span| {
                    let status = response.status().as_u16();
                    span.record("status_code", status);
                    let latency_ms = u64::try_from(latency.as_millis()).unwrap_or(u64::MAX);
                    span.record("latency_ms", latency_ms);
                },
            );

        let layered = ServiceBuilder::new()
            .layer(subcast_telemetry::propagate_request_id_layer())
            .layer(subcast_telemetry::set_request_id_layer())
            .layer(trace_layer)
            .layer(HttpMetricsLayer::new(telemetry));

        let router = Self::build_router().route_layer(layered).with_state(state);

        Self { router }
    }

    fn build_router() -> Router<Arc<ApiState>> {
        Router::new()
            .route("/health", get(health))
            .route("/v1/downloads", post(submit_download))
            .route("/v1/translations", post(submit_translation))
            .route("/v1/jobs/{job_id}", get(get_status))
            .route("/v1/jobs/{job_id}/events", get(get_events))
    }

    /// Serve the API on the supplied address.
    ///
    /// # Errors
    ///
    /// Returns an error if the listener fails to bind or the server terminates unexpectedly.
    pub async fn serve(self, addr: SocketAddr) -> Result<()> {
        tracing::info!("starting orchestrator API on {addr}");
        let listener = TcpListener::bind(addr).await?;
        axum::serve(listener, self.router.into_make_service())
            .with_graceful_shutdown(subcast_telemetry::wait_for_shutdown_signal())
            .await?;
        Ok(())
    }

    #[cfg(test)]
    pub(crate) const fn router(&self) -> &Router {
        &self.router
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::queue::TaskQueue;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::StatusCode;
    use subcast_domain::{DomainResult, DownloadTask, JobId, TranslationTask};
    use subcast_events::InMemoryEventBus;
    use subcast_test_support::{InMemoryDedupStore, InMemoryJobStore};
    use tower::ServiceExt;

    struct NullTaskQueue;

    #[async_trait]
    impl TaskQueue for NullTaskQueue {
        async fn enqueue_download(&self, _task: &DownloadTask) -> DomainResult<()> {
            Ok(())
        }

        async fn enqueue_translation(&self, _task: &TranslationTask) -> DomainResult<()> {
            Ok(())
        }
    }

    fn test_state() -> Arc<ApiState> {
        Arc::new(ApiState::new(
            Arc::new(InMemoryJobStore::new()),
            Arc::new(InMemoryDedupStore::new()),
            Arc::new(InMemoryEventBus::new()),
            Arc::new(NullTaskQueue),
            subcast_telemetry::Metrics::new().expect("metrics registry"),
        ))
    }

    #[tokio::test]
    async fn health_route_returns_ok_status() {
        let server = ApiServer::new(test_state());
        let response = server
            .router()
            .clone()
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn unknown_job_status_returns_not_found() {
        let server = ApiServer::new(test_state());
        let uri = format!("/v1/jobs/{}", JobId::new());
        let response = server
            .router()
            .clone()
            .oneshot(
                Request::builder()
                    .uri(uri)
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}
