//! Routing key derivation and AMQP-style topic binding matching.
//!
//! Routing keys are dotted, least-to-most-specific, e.g.
//! `subtitle.download.requested`. Bindings support the standard topic
//! wildcards: `*` matches exactly one word, `#` matches zero or more
//! trailing words.

use crate::payloads::Event;

/// Name of the durable topic exchange events are published to.
pub const EXCHANGE_NAME: &str = "subtitle.events";

/// Binding pattern matching every event kind, used by the consumer service.
pub const ALL_EVENTS_BINDING: &str = "#";

/// Derive the routing key an envelope wrapping `event` should be published with.
#[must_use]
pub const fn routing_key(event: &Event) -> &'static str {
    match event {
        Event::MediaFileDetected { .. } => "media.file.detected",
        Event::DownloadRequested { .. } => "subtitle.download.requested",
        Event::DownloadInProgress { .. } => "subtitle.download.in_progress",
        Event::SubtitleReady { .. } => "subtitle.ready",
        Event::TranslateRequested { .. } => "subtitle.translate.requested",
        Event::TranslationCompleted { .. } => "subtitle.translation.completed",
        Event::TranslationFailed { .. } => "subtitle.translation.failed",
        Event::JobFailed { .. } => "job.failed",
    }
}

/// Whether `routing_key` matches the topic `binding` pattern.
#[must_use]
pub fn matches_binding(routing_key: &str, binding: &str) -> bool {
    if binding == ALL_EVENTS_BINDING {
        return true;
    }
    let key_words: Vec<&str> = routing_key.split('.').collect();
    let binding_words: Vec<&str> = binding.split('.').collect();
    matches_words(&key_words, &binding_words)
}

fn matches_words(key: &[&str], binding: &[&str]) -> bool {
    match binding.first() {
        None => key.is_empty(),
        Some(&"#") => {
            if binding.len() == 1 {
                return true;
            }
            (0..=key.len()).any(|split| matches_words(&key[split..], &binding[1..]))
        }
        Some(&"*") => !key.is_empty() && matches_words(&key[1..], &binding[1..]),
        Some(word) => key.first() == Some(word) && matches_words(&key[1..], &binding[1..]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use subcast_domain::JobId;

    #[test]
    fn routing_key_matches_documented_form() {
        let job_id = JobId::new();
        assert_eq!(
            routing_key(&Event::JobFailed {
                job_id,
                error_type: "internal".into(),
                message: "x".into(),
            }),
            "job.failed"
        );
        assert_eq!(
            routing_key(&Event::DownloadRequested {
                job_id,
                video_url: "x".into(),
                language: "en".into(),
                imdb_id: None,
            }),
            "subtitle.download.requested"
        );
    }

    #[test]
    fn hash_wildcard_matches_any_suffix_including_empty() {
        assert!(matches_binding("job.failed", "job.#"));
        assert!(matches_binding("job.failed", "#"));
        assert!(matches_binding(
            "subtitle.translate.requested",
            "subtitle.#"
        ));
        assert!(!matches_binding("media.file.detected", "subtitle.#"));
    }

    #[test]
    fn star_wildcard_matches_exactly_one_word() {
        assert!(matches_binding("subtitle.ready", "subtitle.*"));
        assert!(!matches_binding("subtitle.translate.requested", "subtitle.*"));
    }

    #[test]
    fn exact_binding_requires_exact_match() {
        assert!(matches_binding("job.failed", "job.failed"));
        assert!(!matches_binding("job.failed", "job.failed.extra"));
    }
}
