//! Request and response bodies for the orchestrator's HTTP boundary.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use subcast_domain::{JobId, JobStatus};
use subcast_store::AuditEntry;

/// `submit_download` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitDownloadRequest {
    /// Source video location (local path or remote URL).
    pub video_url: String,
    /// Requested subtitle language (two-letter lowercase code).
    pub target_language: String,
    /// Optional human-readable title to aid metadata search.
    pub video_title: Option<String>,
    /// Optional IMDB identifier to aid metadata search.
    pub imdb_id: Option<String>,
}

/// `submit_translation` request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitTranslationRequest {
    /// Filesystem path to the subtitle file to translate.
    pub subtitle_path: String,
    /// Language the subtitle file is currently written in.
    pub source_language: String,
    /// Language the subtitle file should be translated into.
    pub target_language: String,
    /// Optional human-readable title, carried through for logging.
    pub video_title: Option<String>,
}

/// Response shared by both submission endpoints.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmitResponse {
    /// Identifier of the created (or deduplicated) job.
    pub job_id: JobId,
    /// `true` when this request reused an in-flight or recently completed job.
    pub deduplicated: bool,
}

/// `get_status` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatusResponse {
    /// Identifier of the job.
    pub job_id: JobId,
    /// Current lifecycle status.
    pub status: JobStatus,
    /// Completion percentage in `[0, 100]`.
    pub progress_percentage: u8,
    /// Local filesystem path to the final `.srt`, once available.
    pub result_path: Option<String>,
    /// Human-readable failure detail, once the job has failed.
    pub error_message: Option<String>,
    /// Timestamp the job record was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the most recent field change.
    pub updated_at: DateTime<Utc>,
}

/// `get_events` response body: the audit list, newest first.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EventsResponse {
    /// Audit entries for the job, newest first.
    pub events: Vec<AuditEntry>,
}

/// `health` response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// `"ok"` when every dependency is reachable, `"degraded"` otherwise.
    pub status: &'static str,
    /// Whether the broker connection is currently healthy.
    pub broker_connected: bool,
    /// Whether the store connection is currently healthy.
    pub store_connected: bool,
}
