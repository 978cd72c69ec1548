//! Job record, audit list, and checkpoint persistence.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use subcast_domain::{JobId, JobRecord, TranslationCheckpoint};
use subcast_events::EventEnvelope;

use crate::error::StoreResult;

/// Default number of audit entries retained per job, oldest-evicted.
pub const DEFAULT_AUDIT_LIMIT: usize = 100;

/// A stored event envelope plus the time the consumer received it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AuditEntry {
    /// The event envelope that was consumed.
    pub envelope: EventEnvelope,
    /// Timestamp the consumer appended this entry to the audit list.
    pub received_at: DateTime<Utc>,
}

/// Capability implemented by the authoritative job record store.
///
/// Only the event consumer writes job records and audit entries; every
/// other component only reads them, per the data model's ownership rule.
#[async_trait]
pub trait JobStore: Send + Sync {
    /// Insert or overwrite a job record at `job:<job_id>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unreachable.
    async fn put_job(&self, record: &JobRecord) -> StoreResult<()>;

    /// Fetch a job record, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unreachable or the stored
    /// record cannot be decoded.
    async fn get_job(&self, job_id: JobId) -> StoreResult<Option<JobRecord>>;

    /// Append an audit entry to `job:<job_id>:events`, trimming to
    /// [`DEFAULT_AUDIT_LIMIT`] entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unreachable.
    async fn append_audit_entry(&self, job_id: JobId, entry: &AuditEntry) -> StoreResult<()>;

    /// List audit entries for a job, newest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unreachable or an entry
    /// cannot be decoded.
    async fn list_audit_entries(&self, job_id: JobId) -> StoreResult<Vec<AuditEntry>>;

    /// Persist a translation checkpoint at `checkpoint:<job_id>`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unreachable.
    async fn save_checkpoint(&self, checkpoint: &TranslationCheckpoint) -> StoreResult<()>;

    /// Load a job's translation checkpoint, if one exists.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unreachable or the stored
    /// checkpoint cannot be decoded.
    async fn load_checkpoint(&self, job_id: JobId) -> StoreResult<Option<TranslationCheckpoint>>;

    /// Delete a job's translation checkpoint.
    ///
    /// Called after a successful translation unless retention is
    /// configured (`CHECKPOINT_CLEANUP_ON_SUCCESS`); left in place on
    /// failure to permit resume.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing store is unreachable.
    async fn delete_checkpoint(&self, job_id: JobId) -> StoreResult<()>;
}

/// Flatten a job record into `(field, string-value)` pairs for an `HSET`,
/// skipping `None` fields so their absence on read deserializes back to
/// `None` rather than an explicit null.
///
/// # Errors
///
/// Returns an error if the record cannot be represented as a JSON object
/// (never happens for [`JobRecord`]; kept fallible for forward compatibility).
pub fn record_to_fields(record: &JobRecord) -> StoreResult<Vec<(String, String)>> {
    let value = serde_json::to_value(record)
        .map_err(|err| crate::error::StoreError::decode("put_job", err.to_string()))?;
    let Value::Object(obj) = value else {
        return Err(crate::error::StoreError::decode(
            "put_job",
            "job record did not serialize to an object",
        ));
    };
    Ok(obj
        .into_iter()
        .filter(|(_, v)| !v.is_null())
        .map(|(k, v)| {
            let s = match v {
                Value::String(s) => s,
                other => other.to_string(),
            };
            (k, s)
        })
        .collect())
}

/// Reassemble a job record from the `(field, string-value)` pairs an `HGETALL`
/// returns. Each value is re-parsed as JSON first (so numbers/booleans come
/// back typed); a parse failure falls back to a bare JSON string, which is
/// exactly right for `status`/timestamp/id fields that were stored unquoted.
///
/// # Errors
///
/// Returns an error if the reassembled object does not match [`JobRecord`]'s shape.
pub fn fields_to_record(fields: Vec<(String, String)>) -> StoreResult<JobRecord> {
    let mut obj = Map::with_capacity(fields.len());
    for (k, v) in fields {
        let parsed = serde_json::from_str(&v).unwrap_or(Value::String(v));
        obj.insert(k, parsed);
    }
    serde_json::from_value(Value::Object(obj))
        .map_err(|err| crate::error::StoreError::decode("get_job", err.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use subcast_domain::JobStatus;

    #[test]
    fn job_record_round_trips_through_field_flattening() {
        let mut record = JobRecord::new(JobId::new(), "/media/movie.mkv", None, None, None, Utc::now());
        record.status = JobStatus::DownloadInProgress;
        record.progress_percentage = 25;
        record.video_title = Some("Movie".to_string());

        let fields = record_to_fields(&record).expect("flatten succeeds");
        let restored = fields_to_record(fields).expect("reassemble succeeds");

        assert_eq!(restored.job_id, record.job_id);
        assert_eq!(restored.status, JobStatus::DownloadInProgress);
        assert_eq!(restored.progress_percentage, 25);
        assert_eq!(restored.video_title.as_deref(), Some("Movie"));
        assert_eq!(restored.created_at, record.created_at);
    }

    #[test]
    fn absent_optional_fields_round_trip_to_none() {
        let record = JobRecord::new(JobId::new(), "/media/movie.mkv", None, None, None, Utc::now());
        let fields = record_to_fields(&record).expect("flatten succeeds");
        assert!(!fields.iter().any(|(k, _)| k == "video_title"));

        let restored = fields_to_record(fields).expect("reassemble succeeds");
        assert!(restored.video_title.is_none());
        assert!(restored.result_path.is_none());
    }
}
