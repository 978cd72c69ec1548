//! `OpenSubtitles`-shaped catalog adapter.
//!
//! The wire protocol itself is an external collaborator (per `spec.md`'s
//! Non-goals); this client speaks a REST-ish shape close enough to the real
//! service to exercise the full search → download flow end to end.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use subcast_config::CatalogConfig;
use subcast_domain::catalog::{CatalogSearchResult, SubtitleCatalog, VideoHash};
use subcast_domain::error::DomainResult;

use crate::backoff::retry_with_backoff;
use crate::error::CatalogError;

/// HTTP client against an `OpenSubtitles`-compatible catalog API.
pub struct OpenSubtitlesCatalog {
    client: Client,
    base_url: String,
    config: CatalogConfig,
}

impl OpenSubtitlesCatalog {
    /// Build a new adapter pointed at `base_url`, using `config` for
    /// credentials, the user-agent header, and the retry policy.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying `reqwest::Client` cannot be built.
    pub fn new(base_url: impl Into<String>, config: CatalogConfig) -> reqwest::Result<Self> {
        let client = Client::builder().user_agent(config.user_agent.clone()).build()?;
        Ok(Self {
            client,
            base_url: base_url.into(),
            config,
        })
    }

    async fn search(
        &self,
        operation: &'static str,
        query: &[(&str, String)],
    ) -> Result<Vec<CatalogSearchResult>, CatalogError> {
        retry_with_backoff(
            &self.config,
            || async {
                let mut request = self
                    .client
                    .get(format!("{}/subtitles", self.base_url))
                    .query(query);
                if let Some(user) = &self.config.user {
                    request = request.basic_auth(user, self.config.password.as_ref());
                }

                let response = request.send().await.map_err(|source| CatalogError::Http {
                    operation,
                    source,
                })?;

                classify_response(operation, response).await
            },
            is_retryable,
        )
        .await
    }
}

#[async_trait]
impl SubtitleCatalog for OpenSubtitlesCatalog {
    async fn search_by_hash(
        &self,
        hash: VideoHash,
        language: &str,
    ) -> DomainResult<Vec<CatalogSearchResult>> {
        self.search(
            "search_by_hash",
            &[
                ("moviehash", hash.hash.to_string()),
                ("moviebytesize", hash.size_bytes.to_string()),
                ("languages", language.to_string()),
            ],
        )
        .await
        .map_err(Into::into)
    }

    async fn search_by_metadata(
        &self,
        imdb_id: &str,
        language: &str,
    ) -> DomainResult<Vec<CatalogSearchResult>> {
        self.search(
            "search_by_metadata",
            &[
                ("imdb_id", imdb_id.to_string()),
                ("languages", language.to_string()),
            ],
        )
        .await
        .map_err(Into::into)
    }

    async fn search_by_title(
        &self,
        title: &str,
        language: &str,
    ) -> DomainResult<Vec<CatalogSearchResult>> {
        self.search(
            "search_by_title",
            &[
                ("query", title.to_string()),
                ("languages", language.to_string()),
            ],
        )
        .await
        .map_err(Into::into)
    }

    async fn download(&self, download_reference: &str) -> DomainResult<Vec<u8>> {
        retry_with_backoff(
            &self.config,
            || async {
                let response = self
                    .client
                    .get(format!(
                        "{}/download/{download_reference}",
                        self.base_url
                    ))
                    .send()
                    .await
                    .map_err(|source| CatalogError::Http {
                        operation: "download",
                        source,
                    })?;

                let status = response.status();
                if status == StatusCode::TOO_MANY_REQUESTS {
                    return Err(CatalogError::RateLimited { operation: "download" });
                }
                if status == StatusCode::NOT_FOUND {
                    return Err(CatalogError::NotFound { operation: "download" });
                }
                response
                    .bytes()
                    .await
                    .map(|bytes| bytes.to_vec())
                    .map_err(|source| CatalogError::Http {
                        operation: "download",
                        source,
                    })
            },
            is_retryable,
        )
        .await
        .map_err(Into::into)
    }
}

async fn classify_response(
    operation: &'static str,
    response: reqwest::Response,
) -> Result<Vec<CatalogSearchResult>, CatalogError> {
    let status = response.status();
    if status == StatusCode::TOO_MANY_REQUESTS {
        return Err(CatalogError::RateLimited { operation });
    }
    if !status.is_success() {
        return Err(CatalogError::Http {
            operation,
            source: response
                .error_for_status()
                .expect_err("non-success status must produce an error"),
        });
    }

    let payload: SearchResponse = response
        .json()
        .await
        .map_err(|source| CatalogError::Http { operation, source })?;

    if payload.data.is_empty() {
        return Err(CatalogError::NotFound { operation });
    }

    Ok(payload
        .data
        .into_iter()
        .map(|entry| CatalogSearchResult {
            subtitle_id: entry.id,
            language: entry.language,
            download_reference: entry.download_reference,
            release_name: entry.release_name,
        })
        .collect())
}

const fn is_retryable(error: &CatalogError) -> bool {
    matches!(error, CatalogError::Http { .. })
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    data: Vec<SearchEntry>,
}

#[derive(Debug, Deserialize)]
struct SearchEntry {
    id: String,
    language: String,
    download_reference: String,
    release_name: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn http_errors_are_retryable_rate_limit_and_not_found_are_not() {
        assert!(is_retryable(&CatalogError::Http {
            operation: "search_by_title",
            source: make_http_error(),
        }));
        assert!(!is_retryable(&CatalogError::RateLimited {
            operation: "search_by_title"
        }));
        assert!(!is_retryable(&CatalogError::NotFound {
            operation: "search_by_title"
        }));
    }

    fn make_http_error() -> reqwest::Error {
        let client = reqwest::Client::new();
        match client.get("http://\0invalid").build() {
            Ok(_) => panic!("expected invalid URL to fail to build"),
            Err(err) => err,
        }
    }
}
