//! Handlers for the five orchestrator operations in `spec.md` §4.1.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::Utc;
use subcast_domain::{
    DomainError, DownloadTask, JobId, JobRecord, JobStatus, TranslationTask, is_valid_language_code,
};
use subcast_events::{Event, EventEnvelope};
use subcast_store::{ReserveOutcome, fingerprint};
use tracing::{info, warn};

use crate::dto::{
    EventsResponse, HealthResponse, StatusResponse, SubmitDownloadRequest, SubmitResponse,
    SubmitTranslationRequest,
};
use crate::error::ApiError;
use crate::state::{ApiState, EVENT_SOURCE};

/// `submit_download(video_url, target_language, video_title?, imdb_id?)`.
///
/// # Errors
///
/// Returns `400` on malformed input and `503` if the broker or store is
/// unreachable.
pub async fn submit_download(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<SubmitDownloadRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    if request.video_url.trim().is_empty() {
        return Err(ApiError::validation("video_url must not be empty"));
    }
    if !is_valid_language_code(&request.target_language) {
        return Err(ApiError::validation(
            "target_language must be a two-letter lowercase code",
        ));
    }

    let fp = fingerprint(&request.video_url, &request.target_language);
    let job_id = JobId::new();

    if let Some(response) = reserve_or_reuse(&state, &fp, job_id).await? {
        return Ok((StatusCode::OK, Json(response)));
    }

    let now = Utc::now();
    let mut record = JobRecord::new(
        job_id,
        request.video_url.clone(),
        request.video_title.clone(),
        None,
        Some(request.target_language.clone()),
        now,
    );
    state
        .job_store
        .put_job(&record)
        .await
        .map_err(|err| ApiError::service_unavailable(err.to_string()))?;

    let envelope = EventEnvelope::new(
        EVENT_SOURCE,
        Event::DownloadRequested {
            job_id,
            video_url: request.video_url.clone(),
            language: request.target_language.clone(),
            imdb_id: request.imdb_id.clone(),
        },
    );
    let task = DownloadTask {
        job_id,
        video_url: request.video_url,
        video_title: request.video_title,
        imdb_id: request.imdb_id,
        language: request.target_language,
        created_at: now,
        retry_count: 0,
        priority: 0,
    };

    if let Err(err) = dispatch_download(&state, envelope, &task).await {
        fail_and_release(&state, &mut record, &fp, &err).await;
        return Err(err.into());
    }

    record.status = JobStatus::DownloadQueued;
    record.progress_percentage = 10;
    record.updated_at = Utc::now();
    state
        .job_store
        .put_job(&record)
        .await
        .map_err(|err| ApiError::service_unavailable(err.to_string()))?;
    state.metrics.inc_job_submitted("download");
    info!(%job_id, operation = "submit_download", outcome = "queued");

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitResponse {
            job_id,
            deduplicated: false,
        }),
    ))
}

/// `submit_translation(subtitle_path, source_language, target_language, video_title?)`.
///
/// # Errors
///
/// Returns `400` on malformed input and `503` if the broker or store is
/// unreachable.
pub async fn submit_translation(
    State(state): State<Arc<ApiState>>,
    Json(request): Json<SubmitTranslationRequest>,
) -> Result<(StatusCode, Json<SubmitResponse>), ApiError> {
    if request.subtitle_path.trim().is_empty() {
        return Err(ApiError::validation("subtitle_path must not be empty"));
    }
    if !is_valid_language_code(&request.source_language) {
        return Err(ApiError::validation(
            "source_language must be a two-letter lowercase code",
        ));
    }
    if !is_valid_language_code(&request.target_language) {
        return Err(ApiError::validation(
            "target_language must be a two-letter lowercase code",
        ));
    }

    let fp = fingerprint(&request.subtitle_path, &request.target_language);
    let job_id = JobId::new();

    if let Some(response) = reserve_or_reuse(&state, &fp, job_id).await? {
        return Ok((StatusCode::OK, Json(response)));
    }

    let now = Utc::now();
    let mut record = JobRecord::new(
        job_id,
        request.subtitle_path.clone(),
        request.video_title.clone(),
        Some(request.source_language.clone()),
        Some(request.target_language.clone()),
        now,
    );
    state
        .job_store
        .put_job(&record)
        .await
        .map_err(|err| ApiError::service_unavailable(err.to_string()))?;

    let envelope = EventEnvelope::new(
        EVENT_SOURCE,
        Event::TranslateRequested {
            job_id,
            subtitle_path: request.subtitle_path.clone(),
            source_language: request.source_language.clone(),
            target_language: request.target_language.clone(),
        },
    );
    let task = TranslationTask {
        job_id,
        subtitle_file_path: request.subtitle_path,
        source_language: request.source_language,
        target_language: request.target_language,
        video_title: request.video_title,
        created_at: now,
        retry_count: 0,
    };

    if let Err(err) = dispatch_translation(&state, envelope, &task).await {
        fail_and_release(&state, &mut record, &fp, &err).await;
        return Err(err.into());
    }

    record.status = JobStatus::TranslateQueued;
    record.progress_percentage = 60;
    record.updated_at = Utc::now();
    state
        .job_store
        .put_job(&record)
        .await
        .map_err(|err| ApiError::service_unavailable(err.to_string()))?;
    state.metrics.inc_job_submitted("translate");
    info!(%job_id, operation = "submit_translation", outcome = "queued");

    Ok((
        StatusCode::ACCEPTED,
        Json(SubmitResponse {
            job_id,
            deduplicated: false,
        }),
    ))
}

/// `get_status(job_id)`.
///
/// # Errors
///
/// Returns `404` if no job exists with that id, `503` if the store is
/// unreachable.
pub async fn get_status(
    State(state): State<Arc<ApiState>>,
    Path(job_id): Path<JobId>,
) -> Result<Json<StatusResponse>, ApiError> {
    let record = state
        .job_store
        .get_job(job_id)
        .await
        .map_err(|err| ApiError::service_unavailable(err.to_string()))?
        .ok_or_else(|| ApiError::not_found(format!("no job with id {job_id}")))?;

    Ok(Json(StatusResponse {
        job_id: record.job_id,
        status: record.status,
        progress_percentage: record.progress_percentage,
        result_path: record.result_path,
        error_message: record.error_message,
        created_at: record.created_at,
        updated_at: record.updated_at,
    }))
}

/// `get_events(job_id)`.
///
/// # Errors
///
/// Returns `404` if no job exists with that id, `503` if the store is
/// unreachable.
pub async fn get_events(
    State(state): State<Arc<ApiState>>,
    Path(job_id): Path<JobId>,
) -> Result<Json<EventsResponse>, ApiError> {
    state
        .job_store
        .get_job(job_id)
        .await
        .map_err(|err| ApiError::service_unavailable(err.to_string()))?
        .ok_or_else(|| ApiError::not_found(format!("no job with id {job_id}")))?;

    let mut events = state
        .job_store
        .list_audit_entries(job_id)
        .await
        .map_err(|err| ApiError::service_unavailable(err.to_string()))?;
    events.sort_by(|a, b| b.received_at.cmp(&a.received_at));

    Ok(Json(EventsResponse { events }))
}

/// `health()` — reports broker and store connectivity via the metrics
/// gauges the binary's connection-health loop maintains.
pub async fn health(State(state): State<Arc<ApiState>>) -> Json<HealthResponse> {
    let snapshot = state.metrics.snapshot();
    let broker_connected = snapshot.broker_connected != 0;
    let store_connected = snapshot.store_connected != 0;
    let status = if broker_connected && store_connected {
        "ok"
    } else {
        "degraded"
    };

    Json(HealthResponse {
        status,
        broker_connected,
        store_connected,
    })
}

/// Reserve the dedup fingerprint, returning a reuse response on collision
/// and `None` when this call obtained a fresh reservation.
async fn reserve_or_reuse(
    state: &ApiState,
    fingerprint: &str,
    job_id: JobId,
) -> Result<Option<SubmitResponse>, ApiError> {
    let outcome = state
        .dedup_store
        .reserve(fingerprint, job_id, subcast_store::DEFAULT_TTL)
        .await
        .map_err(|err| ApiError::service_unavailable(err.to_string()))?;

    match outcome {
        ReserveOutcome::Reserved => Ok(None),
        ReserveOutcome::Existing(existing) => {
            state.metrics.inc_dedup_hit();
            Ok(Some(SubmitResponse {
                job_id: existing,
                deduplicated: true,
            }))
        }
    }
}

async fn dispatch_download(
    state: &ApiState,
    envelope: EventEnvelope,
    task: &DownloadTask,
) -> Result<(), DomainError> {
    state
        .event_bus
        .publish(envelope)
        .await
        .map_err(|err| DomainError::transient_infra("publish_download_requested", err.to_string()))?;
    state.task_queue.enqueue_download(task).await
}

async fn dispatch_translation(
    state: &ApiState,
    envelope: EventEnvelope,
    task: &TranslationTask,
) -> Result<(), DomainError> {
    state
        .event_bus
        .publish(envelope)
        .await
        .map_err(|err| DomainError::transient_infra("publish_translate_requested", err.to_string()))?;
    state.task_queue.enqueue_translation(task).await
}

/// Mark `record` failed, persist it, and release the dedup reservation so a
/// later retry by the caller is not blocked by this abandoned job.
async fn fail_and_release(state: &ApiState, record: &mut JobRecord, fp: &str, err: &DomainError) {
    warn!(job_id = %record.job_id, error = %err, "submission failed after job creation, releasing dedup key");
    record.status = JobStatus::Failed;
    record.error_message = Some(err.to_string());
    record.updated_at = Utc::now();
    if let Err(store_err) = state.job_store.put_job(record).await {
        warn!(job_id = %record.job_id, error = %store_err, "failed to persist failure state");
    }
    if let Err(dedup_err) = state.dedup_store.release(fp).await {
        warn!(job_id = %record.job_id, error = %dedup_err, "failed to release dedup reservation");
    }
}
