//! Job record and the authoritative status transition table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::JobId;

/// Lifecycle status of a subtitle job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    /// Job record created, no work dispatched yet.
    Pending,
    /// A download task was enqueued.
    DownloadQueued,
    /// The downloader worker is actively searching/fetching.
    DownloadInProgress,
    /// The downloader worker found and stored a direct-language subtitle.
    DownloadCompleted,
    /// The downloader worker could not produce a subtitle.
    DownloadFailed,
    /// A translation task was enqueued.
    TranslateQueued,
    /// The translator worker is actively chunking/translating.
    TranslateInProgress,
    /// The translator worker failed after exhausting chunk retries.
    TranslateFailed,
    /// The job finished successfully; a result file exists.
    Done,
    /// The job finished unsuccessfully; no further state changes occur.
    Failed,
}

impl JobStatus {
    /// Whether this status is terminal per the job record invariant in the
    /// data model: once reached, only `updated_at` may change.
    #[must_use]
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

/// Authoritative per-subtitle-request job record.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct JobRecord {
    /// Unique identifier for this job.
    pub job_id: JobId,
    /// Source video location (local path or remote URL) the job was created for.
    pub video_url: String,
    /// Optional human-readable title, when known.
    pub video_title: Option<String>,
    /// Language of the source material, when known.
    pub source_language: Option<String>,
    /// Target language requested by the caller.
    pub target_language: Option<String>,
    /// Current lifecycle status.
    pub status: JobStatus,
    /// Completion percentage in `[0, 100]`.
    pub progress_percentage: u8,
    /// Timestamp the job record was created.
    pub created_at: DateTime<Utc>,
    /// Timestamp of the most recent field change.
    pub updated_at: DateTime<Utc>,
    /// Local filesystem path to the final `.srt`, once available.
    pub result_path: Option<String>,
    /// Human-readable failure detail, once the job has failed.
    pub error_message: Option<String>,
}

impl JobRecord {
    /// Construct a freshly created job record in the `pending` state.
    #[must_use]
    pub fn new(
        job_id: JobId,
        video_url: impl Into<String>,
        video_title: Option<String>,
        source_language: Option<String>,
        target_language: Option<String>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            job_id,
            video_url: video_url.into(),
            video_title,
            source_language,
            target_language,
            status: JobStatus::Pending,
            progress_percentage: 0,
            created_at,
            updated_at: created_at,
            result_path: None,
            error_message: None,
        }
    }
}

/// Event kinds recognised by the status transition table. This is a closed
/// subset of `subcast_events::Event` discriminants; the consumer maps the
/// richer event payload down to this enum before calling [`apply_transition`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransitionEvent {
    /// `subtitle.download.requested`
    DownloadRequested,
    /// downloader-internal `download_in_progress` status event
    DownloadInProgress,
    /// `subtitle.ready`
    Ready,
    /// `subtitle.translate.requested`
    TranslateRequested,
    /// `subtitle.translation.completed`
    TranslationCompleted,
    /// `subtitle.translation.failed`
    TranslationFailed,
    /// `job.failed`
    JobFailed,
}

/// Outcome of applying an event to a job's current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransitionOutcome {
    /// New status to apply, or `None` if the transition is a no-op.
    pub status: Option<JobStatus>,
    /// New progress percentage to apply, or `None` to leave it unchanged.
    pub progress_percentage: Option<u8>,
}

impl TransitionOutcome {
    const NOOP: Self = Self {
        status: None,
        progress_percentage: None,
    };

    const fn to(status: JobStatus, progress_percentage: u8) -> Self {
        Self {
            status: Some(status),
            progress_percentage: Some(progress_percentage),
        }
    }
}

/// Apply the `(current_status, event_type) -> new_status?` transition table.
///
/// Terminal states (`done`, `failed`) never change status again. Unknown or
/// regressive transitions return [`TransitionOutcome::NOOP`] so the caller can
/// log-and-ignore them, per the event consumer's documented behaviour.
#[must_use]
pub const fn apply_transition(current: JobStatus, event: TransitionEvent) -> TransitionOutcome {
    use JobStatus::{
        Done, DownloadCompleted, DownloadFailed, DownloadInProgress, DownloadQueued, Failed,
        Pending, TranslateFailed, TranslateInProgress, TranslateQueued,
    };
    use TransitionEvent::{
        DownloadRequested, JobFailed, Ready, TranslateRequested, TranslationCompleted,
        TranslationFailed,
    };

    if current.is_terminal() {
        return TransitionOutcome::NOOP;
    }

    match (current, event) {
        (Pending | DownloadQueued, DownloadRequested) => {
            TransitionOutcome::to(DownloadQueued, 10)
        }
        (Pending | DownloadQueued, TransitionEvent::DownloadInProgress) => {
            TransitionOutcome::to(DownloadInProgress, 25)
        }
        (
            Pending | DownloadQueued | DownloadInProgress | DownloadCompleted | DownloadFailed,
            Ready,
        ) => TransitionOutcome::to(Done, 100),
        (
            Pending
            | DownloadQueued
            | DownloadInProgress
            | DownloadCompleted
            | DownloadFailed
            | TranslateQueued
            | TranslateInProgress,
            TranslateRequested,
        ) => TransitionOutcome::to(TranslateQueued, 60),
        (Pending | TranslateQueued | TranslateInProgress, TranslationCompleted) => {
            TransitionOutcome::to(Done, 100)
        }
        (Pending | TranslateQueued | TranslateInProgress, TranslationFailed) => {
            TransitionOutcome::to(TranslateFailed, 60)
        }
        (_, JobFailed) => TransitionOutcome::to(Failed, 0).keep_progress(),
        _ => TransitionOutcome::NOOP,
    }
}

impl TransitionOutcome {
    /// Drop the progress override, leaving the caller's existing value intact.
    ///
    /// Used for the `job.failed` transition: progress must stay monotonic, so
    /// a failure must not reset it back toward zero.
    const fn keep_progress(mut self) -> Self {
        self.progress_percentage = None;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use JobStatus::{
        Done, DownloadInProgress, DownloadQueued, Failed, Pending, TranslateFailed,
        TranslateQueued,
    };
    use TransitionEvent::{
        DownloadRequested, JobFailed, Ready, TranslateRequested, TranslationCompleted,
        TranslationFailed,
    };

    #[test]
    fn pending_download_requested_moves_to_queued_at_ten_percent() {
        let outcome = apply_transition(Pending, DownloadRequested);
        assert_eq!(outcome.status, Some(DownloadQueued));
        assert_eq!(outcome.progress_percentage, Some(10));
    }

    #[test]
    fn pending_ready_completes_directly() {
        let outcome = apply_transition(Pending, Ready);
        assert_eq!(outcome.status, Some(Done));
        assert_eq!(outcome.progress_percentage, Some(100));
    }

    #[test]
    fn download_in_progress_translate_requested_moves_to_translate_queued() {
        let outcome = apply_transition(DownloadInProgress, TranslateRequested);
        assert_eq!(outcome.status, Some(TranslateQueued));
        assert_eq!(outcome.progress_percentage, Some(60));
    }

    #[test]
    fn download_in_progress_ignores_unrelated_events() {
        let outcome = apply_transition(DownloadInProgress, DownloadRequested);
        assert_eq!(outcome, TransitionOutcome::NOOP);
    }

    #[test]
    fn translate_queued_completion_and_failure() {
        assert_eq!(
            apply_transition(TranslateQueued, TranslationCompleted).status,
            Some(Done)
        );
        assert_eq!(
            apply_transition(TranslateQueued, TranslationFailed).status,
            Some(TranslateFailed)
        );
    }

    #[test]
    fn pending_translation_completed_or_failed_races_ahead_of_translate_queued() {
        // A downloader that finds only the fallback language skips straight
        // from `pending` to a translation outcome without ever observing a
        // `translate_requested`-driven `translate_queued` in between.
        assert_eq!(
            apply_transition(Pending, TranslationCompleted).status,
            Some(Done)
        );
        assert_eq!(
            apply_transition(Pending, TranslationFailed).status,
            Some(TranslateFailed)
        );
    }

    #[test]
    fn terminal_states_never_change() {
        for event in [
            DownloadRequested,
            TransitionEvent::DownloadInProgress,
            Ready,
            TranslateRequested,
            TranslationCompleted,
            TranslationFailed,
            JobFailed,
        ] {
            assert_eq!(apply_transition(Done, event), TransitionOutcome::NOOP);
            assert_eq!(apply_transition(Failed, event), TransitionOutcome::NOOP);
        }
    }

    #[test]
    fn job_failed_does_not_regress_progress() {
        let outcome = apply_transition(DownloadInProgress, JobFailed);
        assert_eq!(outcome.status, Some(Failed));
        assert_eq!(outcome.progress_percentage, None);
    }

    #[test]
    fn job_status_terminal_helper() {
        assert!(Done.is_terminal());
        assert!(Failed.is_terminal());
        assert!(!Pending.is_terminal());
        assert!(!TranslateFailed.is_terminal());
    }
}
