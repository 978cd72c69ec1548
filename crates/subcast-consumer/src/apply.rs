//! Pure mapping from a published event onto a job record update.
//!
//! Kept free of any store or broker dependency so the transition table and
//! the auxiliary field updates below it can be exercised without a running
//! broker, mirroring how [`subcast_domain::job::apply_transition`] itself is
//! tested.

use chrono::{DateTime, Utc};
use subcast_domain::job::{JobRecord, TransitionEvent, apply_transition};
use subcast_events::Event;

/// Translate a wire event into the closed `TransitionEvent` set the status
/// table is defined over. Returns `None` for events that carry no job id
/// (only `media.file.detected`, which the consumer otherwise ignores).
#[must_use]
pub(crate) fn transition_event_for(event: &Event) -> Option<TransitionEvent> {
    match event {
        Event::MediaFileDetected { .. } => None,
        Event::DownloadRequested { .. } => Some(TransitionEvent::DownloadRequested),
        Event::DownloadInProgress { .. } => Some(TransitionEvent::DownloadInProgress),
        Event::SubtitleReady { .. } => Some(TransitionEvent::Ready),
        Event::TranslateRequested { .. } => Some(TransitionEvent::TranslateRequested),
        Event::TranslationCompleted { .. } => Some(TransitionEvent::TranslationCompleted),
        Event::TranslationFailed { .. } => Some(TransitionEvent::TranslationFailed),
        Event::JobFailed { .. } => Some(TransitionEvent::JobFailed),
    }
}

/// Apply `event` to `record` in place: runs the status transition, then
/// updates the auxiliary fields (`result_path`, `error_message`) the
/// transition table itself does not track.
pub(crate) fn apply_event(record: &mut JobRecord, event: &Event, now: DateTime<Utc>) {
    if let Some(transition_event) = transition_event_for(event) {
        let outcome = apply_transition(record.status, transition_event);
        if let Some(status) = outcome.status {
            record.status = status;
        }
        if let Some(progress) = outcome.progress_percentage {
            record.progress_percentage = progress;
        }
    }

    match event {
        Event::SubtitleReady { subtitle_path, .. } => {
            record.result_path = Some(subtitle_path.clone());
        }
        Event::TranslationCompleted { result_path, .. } => {
            record.result_path = Some(result_path.clone());
        }
        Event::TranslationFailed { message, .. } | Event::JobFailed { message, .. } => {
            record.error_message = Some(message.clone());
        }
        _ => {}
    }

    record.updated_at = now;
}

#[cfg(test)]
mod tests {
    use super::*;
    use subcast_domain::JobId;
    use subcast_domain::job::JobStatus;

    fn sample_record(status: JobStatus) -> JobRecord {
        let now = Utc::now();
        let mut record = JobRecord::new(JobId::new(), "/media/movie.mkv", None, None, None, now);
        record.status = status;
        record
    }

    #[test]
    fn media_file_detected_has_no_transition_event() {
        let event = Event::MediaFileDetected {
            video_path: "/media/movie.mkv".into(),
            library_name: "Movies".into(),
        };
        assert!(transition_event_for(&event).is_none());
    }

    #[test]
    fn subtitle_ready_sets_result_path_and_marks_done() {
        let job_id = JobId::new();
        let mut record = sample_record(JobStatus::DownloadInProgress);
        record.job_id = job_id;
        let event = Event::SubtitleReady {
            job_id,
            subtitle_path: "/media/movie.srt".into(),
        };

        apply_event(&mut record, &event, Utc::now());

        assert_eq!(record.status, JobStatus::Done);
        assert_eq!(record.progress_percentage, 100);
        assert_eq!(record.result_path.as_deref(), Some("/media/movie.srt"));
    }

    #[test]
    fn job_failed_sets_error_message_and_is_terminal() {
        let mut record = sample_record(JobStatus::TranslateInProgress);
        let event = Event::JobFailed {
            job_id: record.job_id,
            error_type: "infra_transient".into(),
            message: "store unreachable".into(),
        };

        apply_event(&mut record, &event, Utc::now());

        assert_eq!(record.status, JobStatus::Failed);
        assert_eq!(record.error_message.as_deref(), Some("store unreachable"));
    }

    #[test]
    fn terminal_status_is_never_regressed_by_a_later_event() {
        let mut record = sample_record(JobStatus::Done);
        let event = Event::DownloadInProgress { job_id: record.job_id };

        apply_event(&mut record, &event, Utc::now());

        assert_eq!(record.status, JobStatus::Done);
    }
}
