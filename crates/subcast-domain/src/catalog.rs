//! Pluggable subtitle catalog capability.
//!
//! Concrete adapters (e.g. an `OpenSubtitles`-shaped catalog) live in
//! `subcast-catalog`; this trait keeps the downloader worker decoupled from
//! any particular wire protocol.

use async_trait::async_trait;

use crate::error::DomainResult;

/// A single byte-for-byte subtitle artifact returned by a catalog search.
#[derive(Debug, Clone)]
pub struct CatalogSearchResult {
    /// Catalog-assigned identifier for the matched subtitle.
    pub subtitle_id: String,
    /// Language of the matched subtitle (two-letter lowercase code).
    pub language: String,
    /// Catalog's opaque download reference, passed back into `download`.
    pub download_reference: String,
    /// Release/file name as reported by the catalog, for logging.
    pub release_name: Option<String>,
}

/// Identifying information used to search a catalog, tried in tiers by the
/// downloader worker (hash, then IMDB id, then title) per the documented
/// search strategy.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    /// 64-bit content hash plus file size, when the video is a local file.
    pub hash: Option<VideoHash>,
    /// IMDB identifier, when supplied by the caller.
    pub imdb_id: Option<String>,
    /// Title to search by by when hash/IMDB lookups are unavailable or miss.
    pub title: Option<String>,
    /// Requested subtitle language.
    pub language: String,
}

/// OpenSubtitles-style content hash: XOR-fold of the first and last 64 KiB
/// of the file (as little-endian u64 words) plus the file size in bytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct VideoHash {
    /// Folded hash value.
    pub hash: u64,
    /// File size in bytes, used alongside the hash to disambiguate matches.
    pub size_bytes: u64,
}

/// Capability implemented by subtitle catalog adapters.
#[async_trait]
pub trait SubtitleCatalog: Send + Sync {
    /// Search by content hash and size; the fastest, most precise tier.
    async fn search_by_hash(
        &self,
        hash: VideoHash,
        language: &str,
    ) -> DomainResult<Vec<CatalogSearchResult>>;

    /// Search by external metadata identifier (e.g. IMDB id).
    async fn search_by_metadata(
        &self,
        imdb_id: &str,
        language: &str,
    ) -> DomainResult<Vec<CatalogSearchResult>>;

    /// Search by free-text title when no identifier is available.
    async fn search_by_title(
        &self,
        title: &str,
        language: &str,
    ) -> DomainResult<Vec<CatalogSearchResult>>;

    /// Download the subtitle body referenced by a prior search result.
    async fn download(&self, download_reference: &str) -> DomainResult<Vec<u8>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_query_defaults_to_no_identifiers() {
        let query = CatalogQuery::default();
        assert!(query.hash.is_none());
        assert!(query.imdb_id.is_none());
        assert!(query.title.is_none());
    }
}
