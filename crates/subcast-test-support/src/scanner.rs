//! Fake [`ItemDetailsFetcher`] for scanner WebSocket-trigger tests.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use subcast_scanner::error::ScannerResult;
use subcast_scanner::{ItemDetails, ItemDetailsFetcher};

/// Returns canned [`ItemDetails`] for a fixed set of item ids, and an error
/// for any id not registered via [`FixedItemDetailsFetcher::with_item`].
#[derive(Default)]
pub struct FixedItemDetailsFetcher {
    items: Mutex<HashMap<String, ItemDetails>>,
}

impl FixedItemDetailsFetcher {
    /// Construct a fetcher with no registered items.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register the details to return for `item_id`, builder-style.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex has been poisoned by a prior panic.
    #[must_use]
    pub fn with_item(self, item_id: impl Into<String>, details: ItemDetails) -> Self {
        self.items
            .lock()
            .expect("fetcher mutex poisoned")
            .insert(item_id.into(), details);
        self
    }
}

#[async_trait]
impl ItemDetailsFetcher for FixedItemDetailsFetcher {
    async fn fetch_item_details(&self, item_id: &str) -> ScannerResult<ItemDetails> {
        self.items
            .lock()
            .expect("fetcher mutex poisoned")
            .get(item_id)
            .cloned()
            .ok_or_else(|| subcast_scanner::error::ScannerError::Decode {
                reason: format!("no fixture registered for item id {item_id}"),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn returns_registered_item_details() {
        let fetcher = FixedItemDetailsFetcher::new().with_item(
            "42",
            ItemDetails {
                item_name: Some("Movie".into()),
                item_path: Some("/media/movie.mkv".into()),
                video_url: None,
            },
        );

        let details = fetcher.fetch_item_details("42").await.expect("fetch succeeds");
        assert_eq!(details.item_name.as_deref(), Some("Movie"));
    }

    #[tokio::test]
    async fn unregistered_item_id_errors() {
        let fetcher = FixedItemDetailsFetcher::new();
        assert!(fetcher.fetch_item_details("missing").await.is_err());
    }
}
