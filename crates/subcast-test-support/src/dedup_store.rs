//! In-memory [`DedupStore`] fake.

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use subcast_domain::JobId;
use subcast_store::error::StoreResult;
use subcast_store::{DedupStore, ReserveOutcome, StoreError};

/// In-memory stand-in for the Redis-backed dedup store. TTLs are accepted
/// but not enforced: tests care about the reserve/release/refresh contract,
/// not wall-clock expiry.
#[derive(Default)]
pub struct InMemoryDedupStore {
    reservations: Mutex<HashMap<String, JobId>>,
}

impl InMemoryDedupStore {
    /// Construct an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl DedupStore for InMemoryDedupStore {
    async fn reserve(
        &self,
        fingerprint: &str,
        job_id: JobId,
        _ttl: Duration,
    ) -> StoreResult<ReserveOutcome> {
        let mut reservations = self
            .reservations
            .lock()
            .map_err(|_| StoreError::decode("reserve", "mutex poisoned"))?;
        if let Some(existing) = reservations.get(fingerprint) {
            return Ok(ReserveOutcome::Existing(*existing));
        }
        reservations.insert(fingerprint.to_string(), job_id);
        Ok(ReserveOutcome::Reserved)
    }

    async fn release(&self, fingerprint: &str) -> StoreResult<()> {
        self.reservations
            .lock()
            .map_err(|_| StoreError::decode("release", "mutex poisoned"))?
            .remove(fingerprint);
        Ok(())
    }

    async fn refresh(&self, _fingerprint: &str, _ttl: Duration) -> StoreResult<()> {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn second_reservation_on_the_same_fingerprint_reports_the_first_job() {
        let store = InMemoryDedupStore::new();
        let first = JobId::new();
        let second = JobId::new();
        let ttl = Duration::from_secs(60);

        assert_eq!(
            store.reserve("fp", first, ttl).await.expect("reserve succeeds"),
            ReserveOutcome::Reserved
        );
        assert_eq!(
            store.reserve("fp", second, ttl).await.expect("reserve succeeds"),
            ReserveOutcome::Existing(first)
        );
    }

    #[tokio::test]
    async fn release_frees_the_fingerprint_for_reuse() {
        let store = InMemoryDedupStore::new();
        let job_id = JobId::new();
        let ttl = Duration::from_secs(60);

        store.reserve("fp", job_id, ttl).await.expect("reserve succeeds");
        store.release("fp").await.expect("release succeeds");

        let other = JobId::new();
        assert_eq!(
            store.reserve("fp", other, ttl).await.expect("reserve succeeds"),
            ReserveOutcome::Reserved
        );
    }
}
