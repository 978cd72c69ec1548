//! `POST /webhooks/jellyfin` payload handling.

use serde::Deserialize;

use crate::intake::ScanTrigger;

/// Webhook body accepted from the media server.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookPayload {
    /// Event name, e.g. `library.item.added`.
    pub event: String,
    /// `Movie` or `Episode`; other kinds are ignored.
    pub item_type: String,
    /// Display name of the item.
    pub item_name: Option<String>,
    /// Filesystem path to the item.
    pub item_path: Option<String>,
    /// Direct video URL, if the source provides one.
    pub video_url: Option<String>,
}

/// Outcome of processing a webhook payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// The payload names a relevant media item; submit it.
    Accepted(ScanTrigger),
    /// The payload's event kind or item type is not one subcast handles.
    Ignored,
}

const RELEVANT_EVENTS: [&str; 2] = ["library.item.added", "library.item.updated"];
const RELEVANT_ITEM_TYPES: [&str; 2] = ["Movie", "Episode"];

/// Process a webhook payload, accepting only `library.item.added` /
/// `library.item.updated` events for `Movie`/`Episode` items.
#[must_use]
pub fn handle_webhook(payload: &WebhookPayload) -> WebhookOutcome {
    let relevant_event = RELEVANT_EVENTS.contains(&payload.event.as_str());
    let relevant_type = RELEVANT_ITEM_TYPES.contains(&payload.item_type.as_str());
    if !relevant_event || !relevant_type {
        return WebhookOutcome::Ignored;
    }

    WebhookOutcome::Accepted(ScanTrigger::Webhook {
        item_type: payload.item_type.clone(),
        item_name: payload.item_name.clone(),
        item_path: payload.item_path.clone(),
        video_url: payload.video_url.clone(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload(event: &str, item_type: &str) -> WebhookPayload {
        WebhookPayload {
            event: event.to_string(),
            item_type: item_type.to_string(),
            item_name: Some("Arrival".to_string()),
            item_path: Some("/media/arrival.mkv".to_string()),
            video_url: None,
        }
    }

    #[test]
    fn accepts_item_added_for_movie() {
        let outcome = handle_webhook(&payload("library.item.added", "Movie"));
        assert!(matches!(outcome, WebhookOutcome::Accepted(_)));
    }

    #[test]
    fn accepts_item_updated_for_episode() {
        let outcome = handle_webhook(&payload("library.item.updated", "Episode"));
        assert!(matches!(outcome, WebhookOutcome::Accepted(_)));
    }

    #[test]
    fn ignores_unrelated_event_kind() {
        let outcome = handle_webhook(&payload("library.item.deleted", "Movie"));
        assert_eq!(outcome, WebhookOutcome::Ignored);
    }

    #[test]
    fn ignores_unrelated_item_type() {
        let outcome = handle_webhook(&payload("library.item.added", "Series"));
        assert_eq!(outcome, WebhookOutcome::Ignored);
    }
}
