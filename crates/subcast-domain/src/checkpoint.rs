//! Translation checkpoint: persisted partial progress enabling crash resume.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ids::JobId;
use crate::translation::TranslatedSegment;

/// Persisted mid-translation progress for a single job.
///
/// Invariant: `chunks_completed` only ever grows; on success its length
/// equals `chunks_total`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TranslationCheckpoint {
    /// Job this checkpoint belongs to.
    pub job_id: JobId,
    /// Total number of chunks the source subtitle was split into.
    pub chunks_total: usize,
    /// Indices of chunks that have completed translation, in completion order.
    pub chunks_completed: Vec<usize>,
    /// Translated segments produced so far, keyed by chunk index.
    pub translations: BTreeMap<usize, Vec<TranslatedSegment>>,
    /// Source language carried through for resume.
    pub source_language: String,
    /// Target language carried through for resume.
    pub target_language: String,
    /// Timestamp of the last checkpoint write.
    pub updated_at: DateTime<Utc>,
}

impl TranslationCheckpoint {
    /// Start a fresh checkpoint for a job with no completed chunks.
    #[must_use]
    pub fn new(
        job_id: JobId,
        chunks_total: usize,
        source_language: impl Into<String>,
        target_language: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            job_id,
            chunks_total,
            chunks_completed: Vec::new(),
            translations: BTreeMap::new(),
            source_language: source_language.into(),
            target_language: target_language.into(),
            updated_at: now,
        }
    }

    /// Record a chunk's completed translation, appending to the completed
    /// list and updating the timestamp. Idempotent: re-recording the same
    /// index replaces its translation without duplicating the index entry.
    pub fn record_chunk(
        &mut self,
        chunk_index: usize,
        segments: Vec<TranslatedSegment>,
        now: DateTime<Utc>,
    ) {
        if !self.chunks_completed.contains(&chunk_index) {
            self.chunks_completed.push(chunk_index);
        }
        self.translations.insert(chunk_index, segments);
        self.updated_at = now;
    }

    /// Indices of chunks (out of `0..chunks_total`) that still need translation.
    #[must_use]
    pub fn remaining_chunk_indices(&self) -> Vec<usize> {
        let completed: BTreeSet<usize> = self.chunks_completed.iter().copied().collect();
        (0..self.chunks_total)
            .filter(|idx| !completed.contains(idx))
            .collect()
    }

    /// Whether every chunk has completed.
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.chunks_completed.len() == self.chunks_total
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(text: &str) -> TranslatedSegment {
        TranslatedSegment {
            segment_id: 1,
            text: text.to_string(),
        }
    }

    #[test]
    fn remaining_indices_excludes_completed_chunks() {
        let mut checkpoint =
            TranslationCheckpoint::new(JobId::new(), 5, "en", "he", Utc::now());
        checkpoint.record_chunk(0, vec![segment("a")], Utc::now());
        checkpoint.record_chunk(2, vec![segment("c")], Utc::now());
        assert_eq!(checkpoint.remaining_chunk_indices(), vec![1, 3, 4]);
        assert!(!checkpoint.is_complete());
    }

    #[test]
    fn record_chunk_is_idempotent_on_repeat_index() {
        let mut checkpoint =
            TranslationCheckpoint::new(JobId::new(), 1, "en", "he", Utc::now());
        checkpoint.record_chunk(0, vec![segment("a")], Utc::now());
        checkpoint.record_chunk(0, vec![segment("b")], Utc::now());
        assert_eq!(checkpoint.chunks_completed, vec![0]);
        assert_eq!(checkpoint.translations[&0][0].text, "b");
        assert!(checkpoint.is_complete());
    }
}
