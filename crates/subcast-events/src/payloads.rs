//! Event payload types carried across the pipeline's topic exchange.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use subcast_domain::{EventId, JobId};
use uuid::Uuid;

/// Typed domain events published to the `subtitle.events` topic exchange.
///
/// Variant names intentionally mirror the routing keys documented for the
/// pipeline (see [`crate::topics::routing_key`]); the `job_failed` variant is
/// the terminal failure event consumed by the orchestrator's event consumer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event_type", rename_all = "snake_case")]
pub enum Event {
    /// A scanner detected a video file with no matching subtitle on disk.
    MediaFileDetected {
        /// Absolute path to the detected video file.
        video_path: String,
        /// Name of the library the file was detected under.
        library_name: String,
    },
    /// A download job was accepted and should be picked up by a downloader worker.
    DownloadRequested {
        /// Job this request belongs to.
        job_id: JobId,
        /// Normalized video URL or filesystem path the subtitle is for.
        video_url: String,
        /// Requested subtitle language.
        language: String,
        /// Optional IMDB identifier supplied by the caller.
        imdb_id: Option<String>,
    },
    /// A downloader worker picked up a job and began catalog search.
    DownloadInProgress {
        /// Job that is now being worked.
        job_id: JobId,
    },
    /// A subtitle was found and downloaded in the requested language.
    SubtitleReady {
        /// Job this subtitle satisfies.
        job_id: JobId,
        /// Filesystem path to the downloaded subtitle.
        subtitle_path: String,
    },
    /// A translation job was accepted and should be picked up by a translator worker.
    TranslateRequested {
        /// Job this request belongs to.
        job_id: JobId,
        /// Filesystem path to the source-language subtitle.
        subtitle_path: String,
        /// Source language of `subtitle_path`.
        source_language: String,
        /// Desired target language.
        target_language: String,
    },
    /// A translation job finished successfully.
    TranslationCompleted {
        /// Job this result belongs to.
        job_id: JobId,
        /// Filesystem path to the translated subtitle.
        result_path: String,
    },
    /// A translation job failed after exhausting its retry budget.
    TranslationFailed {
        /// Job that failed.
        job_id: JobId,
        /// Index of the chunk that failed, when the failure is chunk-scoped.
        chunk_index: Option<usize>,
        /// Human-readable failure detail.
        message: String,
    },
    /// A job failed terminally and should be marked failed by the consumer.
    JobFailed {
        /// Job that failed.
        job_id: JobId,
        /// Machine-readable error type (mirrors [`subcast_domain::DomainError::error_type`]).
        error_type: String,
        /// Human-readable failure detail.
        message: String,
    },
}

impl Event {
    /// Job this event concerns, when the event is job-scoped.
    ///
    /// `media.file.detected` carries no job yet; every other kind does.
    #[must_use]
    pub const fn job_id(&self) -> Option<JobId> {
        match self {
            Self::MediaFileDetected { .. } => None,
            Self::DownloadRequested { job_id, .. }
            | Self::DownloadInProgress { job_id }
            | Self::SubtitleReady { job_id, .. }
            | Self::TranslateRequested { job_id, .. }
            | Self::TranslationCompleted { job_id, .. }
            | Self::TranslationFailed { job_id, .. }
            | Self::JobFailed { job_id, .. } => Some(*job_id),
        }
    }

    /// Snake-case discriminator matching the `event_type` serde tag.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::MediaFileDetected { .. } => "media_file_detected",
            Self::DownloadRequested { .. } => "download_requested",
            Self::DownloadInProgress { .. } => "download_in_progress",
            Self::SubtitleReady { .. } => "subtitle_ready",
            Self::TranslateRequested { .. } => "translate_requested",
            Self::TranslationCompleted { .. } => "translation_completed",
            Self::TranslationFailed { .. } => "translation_failed",
            Self::JobFailed { .. } => "job_failed",
        }
    }
}

/// Metadata wrapper published and consumed on the topic exchange.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct EventEnvelope {
    /// Identifier assigned to this specific envelope.
    pub event_id: EventId,
    /// Timestamp the envelope was produced, to the second.
    pub timestamp: DateTime<Utc>,
    /// Name of the service that produced the envelope (e.g. `"orchestrator"`).
    pub source: String,
    /// Job the envelope concerns, duplicated from the payload for routing
    /// and storage convenience.
    pub job_id: Option<JobId>,
    /// Identifier correlating this envelope with the request that triggered it.
    pub correlation_id: Option<Uuid>,
    /// The wrapped event.
    pub payload: Event,
}

impl EventEnvelope {
    /// Build a fresh envelope with a new event id, current timestamp, and no
    /// correlation id.
    #[must_use]
    pub fn new(source: impl Into<String>, payload: Event) -> Self {
        Self {
            event_id: EventId::new(),
            timestamp: Utc::now(),
            source: source.into(),
            job_id: payload.job_id(),
            correlation_id: None,
            payload,
        }
    }

    /// Attach a correlation id, returning the updated envelope.
    #[must_use]
    pub const fn with_correlation_id(mut self, correlation_id: Uuid) -> Self {
        self.correlation_id = Some(correlation_id);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn job_id_is_none_only_for_media_file_detected() {
        let detected = Event::MediaFileDetected {
            video_path: "/media/movie.mkv".into(),
            library_name: "Movies".into(),
        };
        assert!(detected.job_id().is_none());

        let job_id = JobId::new();
        let ready = Event::SubtitleReady {
            job_id,
            subtitle_path: "/media/movie.srt".into(),
        };
        assert_eq!(ready.job_id(), Some(job_id));
    }

    #[test]
    fn envelope_new_copies_job_id_from_payload() {
        let job_id = JobId::new();
        let envelope = EventEnvelope::new(
            "downloader",
            Event::DownloadInProgress { job_id },
        );
        assert_eq!(envelope.job_id, Some(job_id));
        assert!(envelope.correlation_id.is_none());
    }

    #[test]
    fn kind_matches_every_variant() {
        let job_id = JobId::new();
        let cases: Vec<(Event, &str)> = vec![
            (
                Event::MediaFileDetected {
                    video_path: "x".into(),
                    library_name: "y".into(),
                },
                "media_file_detected",
            ),
            (
                Event::DownloadRequested {
                    job_id,
                    video_url: "x".into(),
                    language: "en".into(),
                    imdb_id: None,
                },
                "download_requested",
            ),
            (Event::DownloadInProgress { job_id }, "download_in_progress"),
            (
                Event::SubtitleReady {
                    job_id,
                    subtitle_path: "x".into(),
                },
                "subtitle_ready",
            ),
            (
                Event::TranslateRequested {
                    job_id,
                    subtitle_path: "x".into(),
                    source_language: "en".into(),
                    target_language: "he".into(),
                },
                "translate_requested",
            ),
            (
                Event::TranslationCompleted {
                    job_id,
                    result_path: "x".into(),
                },
                "translation_completed",
            ),
            (
                Event::TranslationFailed {
                    job_id,
                    chunk_index: Some(2),
                    message: "boom".into(),
                },
                "translation_failed",
            ),
            (
                Event::JobFailed {
                    job_id,
                    error_type: "internal".into(),
                    message: "boom".into(),
                },
                "job_failed",
            ),
        ];
        for (event, expected) in cases {
            assert_eq!(event.kind(), expected);
        }
    }
}
