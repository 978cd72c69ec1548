//! Redis-backed implementation of [`JobStore`] and [`DedupStore`].

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use redis::aio::ConnectionManager;
use redis::AsyncCommands;
use subcast_domain::{JobId, JobRecord, TranslationCheckpoint};

use crate::dedup::{DedupStore, ReserveOutcome};
use crate::error::{StoreError, StoreResult};
use crate::job_store::{fields_to_record, record_to_fields, AuditEntry, JobStore, DEFAULT_AUDIT_LIMIT};
use crate::keys::{checkpoint_key, dedup_key, job_events_key, job_key};

/// Redis client for the shared key-value store.
///
/// Clones are cheap: [`ConnectionManager`] is itself an `Arc`-backed handle
/// that reconnects transparently on connection loss.
#[derive(Clone)]
pub struct RedisStore {
    conn: ConnectionManager,
}

impl RedisStore {
    /// Connect to `store_url` (e.g. `redis://127.0.0.1:6379`).
    ///
    /// # Errors
    ///
    /// Returns an error if the connection cannot be established.
    pub async fn connect(store_url: &str) -> StoreResult<Self> {
        let client = redis::Client::open(store_url)
            .map_err(|source| StoreError::backend("connect", source))?;
        let conn = ConnectionManager::new(client)
            .await
            .map_err(|source| StoreError::backend("connect", source))?;
        tracing::debug!(store_url, "connected to redis store");
        Ok(Self { conn })
    }
}

#[async_trait]
impl JobStore for RedisStore {
    async fn put_job(&self, record: &JobRecord) -> StoreResult<()> {
        let fields = record_to_fields(record)?;
        let mut conn = self.conn.clone();
        conn.hset_multiple::<_, _, _, ()>(job_key(record.job_id), &fields)
            .await
            .map_err(|source| StoreError::backend("put_job", source))
    }

    async fn get_job(&self, job_id: JobId) -> StoreResult<Option<JobRecord>> {
        let mut conn = self.conn.clone();
        let map: HashMap<String, String> = conn
            .hgetall(job_key(job_id))
            .await
            .map_err(|source| StoreError::backend("get_job", source))?;
        if map.is_empty() {
            return Ok(None);
        }
        fields_to_record(map.into_iter().collect()).map(Some)
    }

    async fn append_audit_entry(&self, job_id: JobId, entry: &AuditEntry) -> StoreResult<()> {
        let payload = serde_json::to_string(entry)
            .map_err(|err| StoreError::decode("append_audit_entry", err.to_string()))?;
        let key = job_events_key(job_id);
        let mut conn = self.conn.clone();
        conn.lpush::<_, _, ()>(&key, payload)
            .await
            .map_err(|source| StoreError::backend("append_audit_entry", source))?;
        conn.ltrim::<_, ()>(&key, 0, DEFAULT_AUDIT_LIMIT as isize - 1)
            .await
            .map_err(|source| StoreError::backend("append_audit_entry", source))
    }

    async fn list_audit_entries(&self, job_id: JobId) -> StoreResult<Vec<AuditEntry>> {
        let mut conn = self.conn.clone();
        let raw: Vec<String> = conn
            .lrange(job_events_key(job_id), 0, -1)
            .await
            .map_err(|source| StoreError::backend("list_audit_entries", source))?;
        raw.into_iter()
            .map(|item| {
                serde_json::from_str(&item)
                    .map_err(|err| StoreError::decode("list_audit_entries", err.to_string()))
            })
            .collect()
    }

    async fn save_checkpoint(&self, checkpoint: &TranslationCheckpoint) -> StoreResult<()> {
        let payload = serde_json::to_string(checkpoint)
            .map_err(|err| StoreError::decode("save_checkpoint", err.to_string()))?;
        let mut conn = self.conn.clone();
        conn.set::<_, _, ()>(checkpoint_key(checkpoint.job_id), payload)
            .await
            .map_err(|source| StoreError::backend("save_checkpoint", source))
    }

    async fn load_checkpoint(&self, job_id: JobId) -> StoreResult<Option<TranslationCheckpoint>> {
        let mut conn = self.conn.clone();
        let raw: Option<String> = conn
            .get(checkpoint_key(job_id))
            .await
            .map_err(|source| StoreError::backend("load_checkpoint", source))?;
        raw.map(|payload| {
            serde_json::from_str(&payload)
                .map_err(|err| StoreError::decode("load_checkpoint", err.to_string()))
        })
        .transpose()
    }

    async fn delete_checkpoint(&self, job_id: JobId) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(checkpoint_key(job_id))
            .await
            .map_err(|source| StoreError::backend("delete_checkpoint", source))
    }
}

#[async_trait]
impl DedupStore for RedisStore {
    async fn reserve(
        &self,
        fingerprint: &str,
        job_id: JobId,
        ttl: Duration,
    ) -> StoreResult<ReserveOutcome> {
        let key = dedup_key(fingerprint);
        let mut conn = self.conn.clone();
        let set: Option<String> = redis::cmd("SET")
            .arg(&key)
            .arg(job_id.to_string())
            .arg("NX")
            .arg("EX")
            .arg(ttl.as_secs().max(1))
            .query_async(&mut conn)
            .await
            .map_err(|source| StoreError::backend("dedup_reserve", source))?;

        if set.is_some() {
            return Ok(ReserveOutcome::Reserved);
        }

        let existing: Option<String> = conn
            .get(&key)
            .await
            .map_err(|source| StoreError::backend("dedup_reserve_lookup", source))?;
        let existing = existing.ok_or_else(|| {
            StoreError::decode(
                "dedup_reserve_lookup",
                "reservation key expired between SET NX and GET",
            )
        })?;
        let existing_id: JobId = existing
            .parse()
            .map_err(|_| StoreError::decode("dedup_reserve_lookup", "stored job id was not a uuid"))?;
        Ok(ReserveOutcome::Existing(existing_id))
    }

    async fn release(&self, fingerprint: &str) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        conn.del::<_, ()>(dedup_key(fingerprint))
            .await
            .map_err(|source| StoreError::backend("dedup_release", source))
    }

    async fn refresh(&self, fingerprint: &str, ttl: Duration) -> StoreResult<()> {
        let mut conn = self.conn.clone();
        conn.expire::<_, ()>(dedup_key(fingerprint), ttl.as_secs() as i64)
            .await
            .map_err(|source| StoreError::backend("dedup_refresh", source))
    }
}

/// Build a fresh audit entry wrapping `envelope`, stamped with the current time.
#[must_use]
pub fn audit_entry_now(envelope: subcast_events::EventEnvelope) -> AuditEntry {
    AuditEntry {
        envelope,
        received_at: Utc::now(),
    }
}
