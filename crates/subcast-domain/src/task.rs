//! Work-queue task payloads.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::JobId;

/// Payload carried on the `subtitle.download` work queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DownloadTask {
    /// Job this task belongs to.
    pub job_id: JobId,
    /// Source video location (local path or remote URL).
    pub video_url: String,
    /// Optional human-readable title to aid metadata search.
    pub video_title: Option<String>,
    /// Optional IMDB identifier to aid metadata search.
    pub imdb_id: Option<String>,
    /// Requested subtitle language (two-letter lowercase code).
    pub language: String,
    /// Timestamp the task was created.
    pub created_at: DateTime<Utc>,
    /// Number of prior redelivery attempts carried by the broker.
    pub retry_count: u32,
    /// Relative dispatch priority; higher values are more urgent.
    pub priority: i32,
}

/// Payload carried on the `subtitle.translate` work queue.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationTask {
    /// Job this task belongs to.
    pub job_id: JobId,
    /// Filesystem path to the subtitle file to translate.
    pub subtitle_file_path: String,
    /// Language the subtitle file is currently written in.
    pub source_language: String,
    /// Language the subtitle file should be translated into.
    pub target_language: String,
    /// Optional human-readable title, carried through for logging.
    pub video_title: Option<String>,
    /// Timestamp the task was created.
    pub created_at: DateTime<Utc>,
    /// Number of prior redelivery attempts carried by the broker.
    pub retry_count: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ids::JobId;

    #[test]
    fn download_task_round_trips_through_json() {
        let task = DownloadTask {
            job_id: JobId::new(),
            video_url: "/media/movie.mkv".into(),
            video_title: Some("Movie".into()),
            imdb_id: None,
            language: "en".into(),
            created_at: Utc::now(),
            retry_count: 0,
            priority: 0,
        };
        let json = serde_json::to_string(&task).expect("serialize");
        let restored: DownloadTask = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored.job_id, task.job_id);
        assert_eq!(restored.language, task.language);
    }

    #[test]
    fn translation_task_round_trips_through_json() {
        let task = TranslationTask {
            job_id: JobId::new(),
            subtitle_file_path: "/tmp/movie.en.srt".into(),
            source_language: "en".into(),
            target_language: "he".into(),
            video_title: None,
            created_at: Utc::now(),
            retry_count: 1,
        };
        let json = serde_json::to_string(&task).expect("serialize");
        let restored: TranslationTask = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(restored.target_language, "he");
        assert_eq!(restored.retry_count, 1);
    }
}
