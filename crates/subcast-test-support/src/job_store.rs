//! In-memory [`JobStore`] fake.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;
use subcast_domain::{JobId, JobRecord, TranslationCheckpoint};
use subcast_store::{AuditEntry, JobStore, StoreError};
use subcast_store::error::StoreResult;

/// In-memory stand-in for the Redis-backed job store, for tests that exercise
/// handler/consumer logic without a live Redis connection.
#[derive(Default)]
pub struct InMemoryJobStore {
    jobs: Mutex<HashMap<JobId, JobRecord>>,
    audit: Mutex<HashMap<JobId, Vec<AuditEntry>>>,
    checkpoints: Mutex<HashMap<JobId, TranslationCheckpoint>>,
}

impl InMemoryJobStore {
    /// Construct an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot the current record for a job, for test assertions.
    ///
    /// # Panics
    ///
    /// Panics if the internal mutex has been poisoned by a prior panic.
    #[must_use]
    pub fn snapshot(&self, job_id: JobId) -> Option<JobRecord> {
        self.jobs.lock().expect("job store mutex poisoned").get(&job_id).cloned()
    }
}

#[async_trait]
impl JobStore for InMemoryJobStore {
    async fn put_job(&self, record: &JobRecord) -> StoreResult<()> {
        self.jobs
            .lock()
            .map_err(|_| StoreError::decode("put_job", "mutex poisoned"))?
            .insert(record.job_id, record.clone());
        Ok(())
    }

    async fn get_job(&self, job_id: JobId) -> StoreResult<Option<JobRecord>> {
        Ok(self
            .jobs
            .lock()
            .map_err(|_| StoreError::decode("get_job", "mutex poisoned"))?
            .get(&job_id)
            .cloned())
    }

    async fn append_audit_entry(&self, job_id: JobId, entry: &AuditEntry) -> StoreResult<()> {
        self.audit
            .lock()
            .map_err(|_| StoreError::decode("append_audit_entry", "mutex poisoned"))?
            .entry(job_id)
            .or_default()
            .insert(0, entry.clone());
        Ok(())
    }

    async fn list_audit_entries(&self, job_id: JobId) -> StoreResult<Vec<AuditEntry>> {
        Ok(self
            .audit
            .lock()
            .map_err(|_| StoreError::decode("list_audit_entries", "mutex poisoned"))?
            .get(&job_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn save_checkpoint(&self, checkpoint: &TranslationCheckpoint) -> StoreResult<()> {
        self.checkpoints
            .lock()
            .map_err(|_| StoreError::decode("save_checkpoint", "mutex poisoned"))?
            .insert(checkpoint.job_id, checkpoint.clone());
        Ok(())
    }

    async fn load_checkpoint(&self, job_id: JobId) -> StoreResult<Option<TranslationCheckpoint>> {
        Ok(self
            .checkpoints
            .lock()
            .map_err(|_| StoreError::decode("load_checkpoint", "mutex poisoned"))?
            .get(&job_id)
            .cloned())
    }

    async fn delete_checkpoint(&self, job_id: JobId) -> StoreResult<()> {
        self.checkpoints
            .lock()
            .map_err(|_| StoreError::decode("delete_checkpoint", "mutex poisoned"))?
            .remove(&job_id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[tokio::test]
    async fn put_then_get_round_trips() {
        let store = InMemoryJobStore::new();
        let record = JobRecord::new(JobId::new(), "/media/movie.mkv", None, None, None, Utc::now());
        store.put_job(&record).await.expect("put succeeds");

        let fetched = store.get_job(record.job_id).await.expect("get succeeds");
        assert_eq!(fetched.map(|r| r.job_id), Some(record.job_id));
    }

    #[tokio::test]
    async fn audit_entries_are_returned_newest_first() {
        use subcast_events::{Event, EventEnvelope};

        let store = InMemoryJobStore::new();
        let job_id = JobId::new();
        for _ in 0..3 {
            let entry = AuditEntry {
                envelope: EventEnvelope::new("downloader", Event::DownloadInProgress { job_id }),
                received_at: Utc::now(),
            };
            store.append_audit_entry(job_id, &entry).await.expect("append succeeds");
        }

        let entries = store.list_audit_entries(job_id).await.expect("list succeeds");
        assert_eq!(entries.len(), 3);
    }
}
