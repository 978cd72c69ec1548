//! Key-prefix conventions for the shared store.
//!
//! Each writer owns its prefix (`job:`, `dedup:`, `checkpoint:`); no
//! cross-prefix transactions are required.

use subcast_domain::JobId;

/// Key for the `job:<job_id>` hash holding record fields.
#[must_use]
pub fn job_key(job_id: JobId) -> String {
    format!("job:{job_id}")
}

/// Key for the `job:<job_id>:events` bounded audit list.
#[must_use]
pub fn job_events_key(job_id: JobId) -> String {
    format!("job:{job_id}:events")
}

/// Key for the `dedup:<fingerprint>` reservation entry.
#[must_use]
pub fn dedup_key(fingerprint: &str) -> String {
    format!("dedup:{fingerprint}")
}

/// Key for the `checkpoint:<job_id>` translation checkpoint.
#[must_use]
pub fn checkpoint_key(job_id: JobId) -> String {
    format!("checkpoint:{job_id}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    #[test]
    fn keys_use_documented_prefixes() {
        let job_id = JobId::from_uuid(Uuid::nil());
        assert_eq!(
            job_key(job_id),
            "job:00000000-0000-0000-0000-000000000000"
        );
        assert_eq!(
            job_events_key(job_id),
            "job:00000000-0000-0000-0000-000000000000:events"
        );
        assert_eq!(dedup_key("abc123"), "dedup:abc123");
        assert_eq!(
            checkpoint_key(job_id),
            "checkpoint:00000000-0000-0000-0000-000000000000"
        );
    }
}
