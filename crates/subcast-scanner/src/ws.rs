//! WebSocket client: API-key authenticated connection to the media server,
//! `LibraryChanged`/`KeepAlive` message handling, and reconnect backoff.

use std::time::Duration;

use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::mpsc;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;

use crate::error::{ScannerError, ScannerResult};
use crate::intake::ScanTrigger;

/// Exponential reconnect backoff, resetting after a successful connection.
#[derive(Debug)]
pub struct ReconnectBackoff {
    base: Duration,
    cap: Duration,
    attempt: u32,
}

impl ReconnectBackoff {
    /// Build a backoff starting at `base` and saturating at `cap`.
    #[must_use]
    pub const fn new(base: Duration, cap: Duration) -> Self {
        Self {
            base,
            cap,
            attempt: 0,
        }
    }

    /// The delay to wait before the next reconnect attempt, then advance.
    pub fn next_delay(&mut self) -> Duration {
        let scaled = self.base.as_secs_f64() * 2_f64.powi(self.attempt.try_into().unwrap_or(i32::MAX));
        self.attempt += 1;
        Duration::from_secs_f64(scaled.min(self.cap.as_secs_f64()))
    }

    /// Reset the backoff after a successful connection.
    pub fn reset(&mut self) {
        self.attempt = 0;
    }
}

/// A decoded message from the media server's WebSocket feed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WsEvent {
    /// An item was added or changed; `item_id` identifies it for detail lookup.
    LibraryChanged {
        /// Server-assigned item id.
        item_id: String,
    },
    /// A keep-alive ping the client should answer in kind.
    KeepAlive,
    /// A message type subcast does not act on.
    Other,
}

#[derive(Deserialize)]
struct RawMessage {
    #[serde(rename = "MessageType")]
    message_type: String,
    #[serde(rename = "Data")]
    data: Option<RawLibraryChangedData>,
}

#[derive(Deserialize)]
struct RawLibraryChangedData {
    #[serde(rename = "ItemId")]
    item_id: Option<String>,
}

/// Parse a raw WebSocket text frame into a [`WsEvent`].
#[must_use]
pub fn parse_ws_text(text: &str) -> WsEvent {
    let Ok(raw) = serde_json::from_str::<RawMessage>(text) else {
        return WsEvent::Other;
    };

    match raw.message_type.as_str() {
        "LibraryChanged" => raw
            .data
            .and_then(|data| data.item_id)
            .map_or(WsEvent::Other, |item_id| WsEvent::LibraryChanged { item_id }),
        "KeepAlive" => WsEvent::KeepAlive,
        _ => WsEvent::Other,
    }
}

/// Looks up item metadata by id so a `LibraryChanged` message can be
/// normalized into a submission request.
#[async_trait]
pub trait ItemDetailsFetcher: Send + Sync {
    /// Fetch display name, path, and/or direct video URL for `item_id`.
    ///
    /// # Errors
    ///
    /// Returns an error if the media server cannot be reached.
    async fn fetch_item_details(&self, item_id: &str) -> ScannerResult<ItemDetails>;
}

/// Metadata needed to build a submission request from a `LibraryChanged` id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItemDetails {
    /// Display name of the item.
    pub item_name: Option<String>,
    /// Filesystem path to the item.
    pub item_path: Option<String>,
    /// Direct video URL, if the server provides one.
    pub video_url: Option<String>,
}

/// Connect to the media server's WebSocket endpoint and forward normalized
/// triggers to `sender`, reconnecting with [`ReconnectBackoff`] until the
/// sender is dropped.
///
/// # Errors
///
/// Returns an error only if `sender` is closed while this function still
/// holds a live connection; reconnect failures are retried internally and
/// never surface.
pub async fn run(
    base_url: &str,
    api_key: &str,
    fetcher: &impl ItemDetailsFetcher,
    reconnect_base: Duration,
    reconnect_cap: Duration,
    sender: mpsc::UnboundedSender<ScanTrigger>,
) -> ScannerResult<()> {
    let mut backoff = ReconnectBackoff::new(reconnect_base, reconnect_cap);
    let url = format!("{base_url}?api_key={api_key}");

    loop {
        match connect_async(url.as_str()).await {
            Ok((stream, _response)) => {
                backoff.reset();
                let (mut write, mut read) = stream.split();

                while let Some(message) = read.next().await {
                    let Ok(Message::Text(text)) = message else {
                        continue;
                    };

                    match parse_ws_text(&text) {
                        WsEvent::LibraryChanged { item_id } => {
                            let details = fetcher.fetch_item_details(&item_id).await?;
                            let trigger = ScanTrigger::LibraryChanged {
                                item_name: details.item_name,
                                item_path: details.item_path,
                                video_url: details.video_url,
                            };
                            if sender.send(trigger).is_err() {
                                return Ok(());
                            }
                        }
                        WsEvent::KeepAlive => {
                            if write.send(Message::Text(text)).await.is_err() {
                                break;
                            }
                        }
                        WsEvent::Other => {}
                    }
                }
            }
            Err(err) => {
                tracing::warn!(error = %err, "websocket connect failed, retrying");
            }
        }

        if sender.is_closed() {
            return Ok(());
        }
        tokio::time::sleep(backoff.next_delay()).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_library_changed_with_item_id() {
        let text = r#"{"MessageType":"LibraryChanged","Data":{"ItemId":"abc123"}}"#;
        assert_eq!(
            parse_ws_text(text),
            WsEvent::LibraryChanged {
                item_id: "abc123".to_string()
            }
        );
    }

    #[test]
    fn parses_keep_alive() {
        let text = r#"{"MessageType":"KeepAlive"}"#;
        assert_eq!(parse_ws_text(text), WsEvent::KeepAlive);
    }

    #[test]
    fn unrecognized_message_type_is_other() {
        let text = r#"{"MessageType":"SessionsStart"}"#;
        assert_eq!(parse_ws_text(text), WsEvent::Other);
    }

    #[test]
    fn malformed_payload_is_other() {
        assert_eq!(parse_ws_text("not json"), WsEvent::Other);
    }

    #[test]
    fn backoff_doubles_then_caps() {
        let mut backoff = ReconnectBackoff::new(Duration::from_secs(2), Duration::from_secs(300));
        assert_eq!(backoff.next_delay(), Duration::from_secs(2));
        assert_eq!(backoff.next_delay(), Duration::from_secs(4));
        assert_eq!(backoff.next_delay(), Duration::from_secs(8));
    }

    #[test]
    fn backoff_resets_after_success() {
        let mut backoff = ReconnectBackoff::new(Duration::from_secs(2), Duration::from_secs(300));
        backoff.next_delay();
        backoff.next_delay();
        backoff.reset();
        assert_eq!(backoff.next_delay(), Duration::from_secs(2));
    }
}
