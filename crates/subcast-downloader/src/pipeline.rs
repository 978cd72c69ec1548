//! Per-task download pipeline: tiered catalog search, download, and
//! write-to-disk. Tries hash, then IMDB id, then title, per
//! [`subcast_domain::catalog::CatalogQuery`]'s documented search strategy.
//! When the requested language misses in every tier, retries the same
//! search against the configured fallback language and, on a fallback hit,
//! hands the job off for translation instead of failing it.

use std::path::{Path, PathBuf};

use subcast_catalog::hash_file;
use subcast_domain::catalog::{CatalogQuery, CatalogSearchResult, SubtitleCatalog, VideoHash};
use subcast_domain::{DomainError, DomainResult, DownloadTask};
use tracing::debug;

/// Outcome of a download task: either the requested language was found
/// directly, or a fallback-language subtitle was found and downloaded,
/// leaving translation into the requested language to the translator worker.
pub(crate) enum DownloadOutcome {
    /// The requested language was matched; `path` is the final subtitle.
    Ready(PathBuf),
    /// Only the fallback language matched; `source_path` holds that
    /// subtitle, still needing translation into `task.language`.
    TranslateRequested {
        source_path: PathBuf,
        source_language: String,
    },
}

/// Search the catalog for a subtitle matching `task` in the requested
/// language; on a miss, retry in `fallback_language`. Downloads and writes
/// the best match to disk, naming it in-place next to the source video when
/// `task.video_url` is a local path, or under `storage_root` otherwise.
///
/// # Errors
///
/// Returns [`DomainError::CatalogNotFound`] if every search tier misses in
/// both languages, or whatever error the catalog or filesystem call
/// surfaced.
pub(crate) async fn run(
    task: &DownloadTask,
    catalog: &dyn SubtitleCatalog,
    storage_root: &Path,
    fallback_language: &str,
) -> DomainResult<DownloadOutcome> {
    let query = build_query(task).await;

    if let Some(result) = search_tiers(catalog, &query).await? {
        debug!(subtitle_id = %result.subtitle_id, release = ?result.release_name, "catalog search matched requested language");
        let bytes = catalog.download(&result.download_reference).await?;
        let path = write_subtitle(storage_root, task, &bytes, &task.language).await?;
        return Ok(DownloadOutcome::Ready(path));
    }

    if task.language != fallback_language {
        let mut fallback_query = query;
        fallback_query.language = fallback_language.to_string();

        if let Some(result) = search_tiers(catalog, &fallback_query).await? {
            debug!(subtitle_id = %result.subtitle_id, release = ?result.release_name, "catalog search matched fallback language");
            let bytes = catalog.download(&result.download_reference).await?;
            let source_path = write_subtitle(storage_root, task, &bytes, fallback_language).await?;
            return Ok(DownloadOutcome::TranslateRequested {
                source_path,
                source_language: fallback_language.to_string(),
            });
        }
    }

    Err(DomainError::CatalogNotFound)
}

/// Write `bytes` as the subtitle for `task` in `language`: in-place next to
/// the source video when it's a local path, otherwise detached under
/// `storage_root` keyed by job id.
async fn write_subtitle(
    storage_root: &Path,
    task: &DownloadTask,
    bytes: &[u8],
    language: &str,
) -> DomainResult<PathBuf> {
    let path = output_path(storage_root, task, language);

    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(|err| DomainError::transient_infra("create_storage_root", err.to_string()))?;
    }
    tokio::fs::write(&path, bytes)
        .await
        .map_err(|err| DomainError::transient_infra("write_subtitle_file", err.to_string()))?;

    Ok(path)
}

/// `<video_dir>/<video_basename>.<language>.srt` when the source is a local
/// file, else the detached `<storage_root>/<job_id>.<language>.srt` scheme.
fn output_path(storage_root: &Path, task: &DownloadTask, language: &str) -> PathBuf {
    if !is_remote_url(&task.video_url) {
        let video_path = Path::new(&task.video_url);
        if let Some(stem) = video_path.file_stem().and_then(|stem| stem.to_str()) {
            let file_name = format!("{stem}.{language}.srt");
            return video_path.with_file_name(file_name);
        }
    }

    storage_root.join(format!("{}.{}.srt", task.job_id, language))
}

fn is_remote_url(video_url: &str) -> bool {
    video_url.starts_with("http://") || video_url.starts_with("https://")
}

async fn build_query(task: &DownloadTask) -> CatalogQuery {
    CatalogQuery {
        hash: local_video_hash(task.video_url.clone()).await,
        imdb_id: task.imdb_id.clone(),
        title: task.video_title.clone(),
        language: task.language.clone(),
    }
}

/// Hash the source video if it looks like a local path; hashing blocks on
/// file I/O, so it runs on the blocking pool rather than the async runtime.
async fn local_video_hash(video_url: String) -> Option<VideoHash> {
    if is_remote_url(&video_url) {
        return None;
    }
    tokio::task::spawn_blocking(move || hash_file(Path::new(&video_url)))
        .await
        .ok()
        .and_then(|result| result.ok())
}

/// Try hash, then IMDB id, then title against `query.language`. Returns
/// `None` (not an error) when every tier misses, so the caller can decide
/// whether to retry in another language.
async fn search_tiers(
    catalog: &dyn SubtitleCatalog,
    query: &CatalogQuery,
) -> DomainResult<Option<CatalogSearchResult>> {
    if let Some(hash) = query.hash {
        if let Some(result) = first_match(catalog.search_by_hash(hash, &query.language).await)? {
            return Ok(Some(result));
        }
    }

    if let Some(imdb_id) = &query.imdb_id {
        if let Some(result) = first_match(catalog.search_by_metadata(imdb_id, &query.language).await)? {
            return Ok(Some(result));
        }
    }

    if let Some(title) = &query.title {
        if let Some(result) = first_match(catalog.search_by_title(title, &query.language).await)? {
            return Ok(Some(result));
        }
    }

    Ok(None)
}

/// Unwrap a search result, treating both an empty match list and
/// [`DomainError::CatalogNotFound`] as "this tier missed, try the next one".
fn first_match(
    outcome: DomainResult<Vec<CatalogSearchResult>>,
) -> DomainResult<Option<CatalogSearchResult>> {
    match outcome {
        Ok(results) => Ok(results.into_iter().next()),
        Err(DomainError::CatalogNotFound) => Ok(None),
        Err(err) => Err(err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use chrono::Utc;
    use subcast_domain::JobId;

    /// Matches `title_result` only when queried in `matching_language`, so
    /// tests can model a requested-language miss plus a fallback-language hit.
    struct StubCatalog {
        title_result: Option<CatalogSearchResult>,
        matching_language: String,
    }

    #[async_trait]
    impl SubtitleCatalog for StubCatalog {
        async fn search_by_hash(
            &self,
            _hash: VideoHash,
            _language: &str,
        ) -> DomainResult<Vec<CatalogSearchResult>> {
            Err(DomainError::CatalogNotFound)
        }

        async fn search_by_metadata(
            &self,
            _imdb_id: &str,
            _language: &str,
        ) -> DomainResult<Vec<CatalogSearchResult>> {
            Err(DomainError::CatalogNotFound)
        }

        async fn search_by_title(
            &self,
            title: &str,
            language: &str,
        ) -> DomainResult<Vec<CatalogSearchResult>> {
            if title.is_empty() || language != self.matching_language {
                return Ok(Vec::new());
            }
            Ok(self.title_result.clone().into_iter().collect())
        }

        async fn download(&self, _download_reference: &str) -> DomainResult<Vec<u8>> {
            Ok(b"1\n00:00:00,000 --> 00:00:01,000\nhello\n".to_vec())
        }
    }

    fn sample_result() -> CatalogSearchResult {
        CatalogSearchResult {
            subtitle_id: "abc".to_string(),
            language: "en".to_string(),
            download_reference: "ref-1".to_string(),
            release_name: None,
        }
    }

    fn sample_task() -> DownloadTask {
        DownloadTask {
            job_id: JobId::new(),
            video_url: "https://example.invalid/movie.mkv".to_string(),
            video_title: Some("Movie".to_string()),
            imdb_id: None,
            language: "en".to_string(),
            created_at: Utc::now(),
            retry_count: 0,
            priority: 0,
        }
    }

    #[tokio::test]
    async fn falls_through_to_title_tier_and_writes_file() {
        let catalog = StubCatalog {
            title_result: Some(sample_result()),
            matching_language: "en".to_string(),
        };
        let dir = tempfile::tempdir().expect("tempdir");
        let task = sample_task();

        let outcome = run(&task, &catalog, dir.path(), "en").await.expect("download succeeds");
        let DownloadOutcome::Ready(path) = outcome else {
            panic!("expected a requested-language hit");
        };
        assert!(path.exists());
        assert_eq!(path.extension().and_then(|ext| ext.to_str()), Some("srt"));
    }

    #[tokio::test]
    async fn no_match_in_any_tier_is_catalog_not_found() {
        let catalog = StubCatalog {
            title_result: None,
            matching_language: "en".to_string(),
        };
        let dir = tempfile::tempdir().expect("tempdir");
        let task = sample_task();

        let err = run(&task, &catalog, dir.path(), "en").await.unwrap_err();
        assert!(matches!(err, DomainError::CatalogNotFound));
    }

    #[tokio::test]
    async fn falls_back_to_fallback_language_and_requests_translation() {
        let catalog = StubCatalog {
            title_result: Some(sample_result()),
            matching_language: "fr".to_string(),
        };
        let dir = tempfile::tempdir().expect("tempdir");
        let mut task = sample_task();
        task.language = "es".to_string();

        let outcome = run(&task, &catalog, dir.path(), "fr").await.expect("fallback hit succeeds");
        let DownloadOutcome::TranslateRequested { source_path, source_language } = outcome else {
            panic!("expected a fallback-language hit requesting translation");
        };
        assert!(source_path.exists());
        assert_eq!(source_language, "fr");
    }

    #[tokio::test]
    async fn local_source_writes_subtitle_in_place() {
        let catalog = StubCatalog {
            title_result: Some(sample_result()),
            matching_language: "en".to_string(),
        };
        let dir = tempfile::tempdir().expect("tempdir");
        let video_path = dir.path().join("movie.mkv");
        tokio::fs::write(&video_path, b"fake video").await.expect("write fixture video");

        let mut task = sample_task();
        task.video_url = video_path.display().to_string();

        let storage_root = dir.path().join("unused-storage-root");
        let outcome = run(&task, &catalog, &storage_root, "en").await.expect("download succeeds");
        let DownloadOutcome::Ready(path) = outcome else {
            panic!("expected a requested-language hit");
        };
        assert_eq!(path, dir.path().join("movie.en.srt"));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn remote_url_skips_hash_tier() {
        let hash = local_video_hash("https://example.invalid/movie.mkv".to_string()).await;
        assert!(hash.is_none());
    }
}
