//! HTTP-backed [`ItemDetailsFetcher`] for the media server's item lookup
//! endpoint, used to resolve a `LibraryChanged` WebSocket message's item id
//! into the path/title/URL the intake normalization needs.

use reqwest::Client;
use serde::Deserialize;
use subcast_scanner::error::{ScannerError, ScannerResult};
use subcast_scanner::{ItemDetails, ItemDetailsFetcher};

pub(crate) struct HttpItemDetailsFetcher {
    client: Client,
    base_url: String,
    api_key: String,
}

impl HttpItemDetailsFetcher {
    pub(crate) const fn new(client: Client, base_url: String, api_key: String) -> Self {
        Self {
            client,
            base_url,
            api_key,
        }
    }
}

#[derive(Deserialize)]
struct RawItem {
    #[serde(rename = "Name")]
    name: Option<String>,
    #[serde(rename = "Path")]
    path: Option<String>,
}

#[async_trait::async_trait]
impl ItemDetailsFetcher for HttpItemDetailsFetcher {
    async fn fetch_item_details(&self, item_id: &str) -> ScannerResult<ItemDetails> {
        let url = format!("{}/Items/{item_id}?api_key={}", self.base_url, self.api_key);
        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|err| ScannerError::WebSocket {
                operation: "fetch_item_details",
                reason: err.to_string(),
            })?
            .error_for_status()
            .map_err(|err| ScannerError::WebSocket {
                operation: "fetch_item_details",
                reason: err.to_string(),
            })?;

        let raw: RawItem = response.json().await.map_err(|err| ScannerError::Decode {
            reason: err.to_string(),
        })?;

        Ok(ItemDetails {
            item_name: raw.name,
            item_path: raw.path,
            video_url: None,
        })
    }
}
