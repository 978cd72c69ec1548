//! Deduplication layer: fingerprinting and atomic in-flight reservation.

use std::time::Duration;

use async_trait::async_trait;
use sha2::{Digest, Sha256};
use subcast_domain::{JobId, normalize_video_url};

use crate::error::StoreResult;

/// Default reservation TTL (24 hours), per the documented dedup window.
pub const DEFAULT_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Compute the 256-bit hex fingerprint of `(video_url, language)`.
///
/// The URL is normalized first (lowercase scheme/host, trailing slash
/// stripped, percent-encoding collapsed) so that trivially-equivalent URLs
/// collide on the same fingerprint.
#[must_use]
pub fn fingerprint(video_url: &str, language: &str) -> String {
    let normalized = normalize_video_url(video_url);
    let mut hasher = Sha256::new();
    hasher.update(normalized.as_bytes());
    hasher.update(b"|");
    hasher.update(language.as_bytes());
    let digest = hasher.finalize();
    hex_encode(&digest)
}

fn hex_encode(bytes: &[u8]) -> String {
    use std::fmt::Write;
    let mut out = String::with_capacity(bytes.len() * 2);
    for byte in bytes {
        write!(out, "{byte:02x}").expect("writing to a String cannot fail");
    }
    out
}

/// Outcome of a reservation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReserveOutcome {
    /// The fingerprint was unreserved; it now points at `job_id`.
    Reserved,
    /// The fingerprint was already reserved by `job_id`.
    Existing(JobId),
}

/// Capability implemented by the dedup layer's backing store.
#[async_trait]
pub trait DedupStore: Send + Sync {
    /// Atomically reserve `fingerprint` for `job_id`, or report the existing
    /// reservation on collision.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unreachable.
    async fn reserve(
        &self,
        fingerprint: &str,
        job_id: JobId,
        ttl: Duration,
    ) -> StoreResult<ReserveOutcome>;

    /// Release a reservation. Called only on terminal failure during submission.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unreachable.
    async fn release(&self, fingerprint: &str) -> StoreResult<()>;

    /// Extend a reservation's TTL. Called on progress.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unreachable.
    async fn refresh(&self, fingerprint: &str, ttl: Duration) -> StoreResult<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fingerprint_is_stable_across_equivalent_urls() {
        let a = fingerprint("HTTP://Example.COM/movie.mkv/", "en");
        let b = fingerprint("http://example.com/movie.mkv", "en");
        assert_eq!(a, b);
    }

    #[test]
    fn fingerprint_differs_by_language() {
        let en = fingerprint("/media/movie.mkv", "en");
        let he = fingerprint("/media/movie.mkv", "he");
        assert_ne!(en, he);
    }

    #[test]
    fn fingerprint_is_64_hex_chars() {
        let fp = fingerprint("/media/movie.mkv", "en");
        assert_eq!(fp.len(), 64);
        assert!(fp.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
