//! `axum` webhook listener: accepts `POST /webhooks/jellyfin`, normalizes the
//! payload, and submits any relevant item to the orchestrator.

use std::sync::Arc;

use axum::extract::State;
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Json, Router};
use reqwest::Client;
use serde::Serialize;
use subcast_api::telemetry::HttpMetricsLayer;
use subcast_domain::JobId;
use subcast_scanner::{WebhookOutcome, WebhookPayload, build_submit_request, handle_webhook};
use subcast_telemetry::Metrics;
use tracing::info;

use crate::submit::submit_download;

#[derive(Clone)]
pub(crate) struct WebhookState {
    pub(crate) client: Client,
    pub(crate) orchestrator_url: Arc<String>,
    pub(crate) target_language: Arc<String>,
}

/// `POST /webhooks/jellyfin` response body, per the documented webhook contract.
#[derive(Debug, Clone, Serialize)]
struct WebhookResponse {
    status: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    job_id: Option<JobId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    message: Option<String>,
}

impl WebhookResponse {
    const fn received(job_id: JobId) -> Self {
        Self {
            status: "received",
            job_id: Some(job_id),
            message: None,
        }
    }

    const fn ignored() -> Self {
        Self {
            status: "ignored",
            job_id: None,
            message: None,
        }
    }

    fn error(message: impl Into<String>) -> Self {
        Self {
            status: "error",
            job_id: None,
            message: Some(message.into()),
        }
    }
}

pub(crate) fn router(state: WebhookState, metrics: Metrics) -> Router {
    Router::new()
        .route("/webhooks/jellyfin", post(handle))
        .route("/health", get(health))
        .with_state(state)
        .layer(HttpMetricsLayer::new(metrics))
}

async fn health() -> StatusCode {
    StatusCode::OK
}

async fn handle(
    State(state): State<WebhookState>,
    Json(payload): Json<WebhookPayload>,
) -> (StatusCode, Json<WebhookResponse>) {
    match handle_webhook(&payload) {
        WebhookOutcome::Accepted(trigger) => {
            let Some(request) = build_submit_request(&trigger, &state.target_language) else {
                return (
                    StatusCode::OK,
                    Json(WebhookResponse::error("accepted item carried no usable video location")),
                );
            };

            match submit_download(&state.client, &state.orchestrator_url, request).await {
                Some(job_id) => (StatusCode::ACCEPTED, Json(WebhookResponse::received(job_id))),
                None => (
                    StatusCode::OK,
                    Json(WebhookResponse::error("failed to submit to orchestrator")),
                ),
            }
        }
        WebhookOutcome::Ignored => {
            info!(event = %payload.event, item_type = %payload.item_type, "ignored webhook payload");
            (StatusCode::OK, Json(WebhookResponse::ignored()))
        }
    }
}
