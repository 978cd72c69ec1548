//! Checkpointed, bounded-concurrency translation pipeline.
//!
//! Drives one translation task end to end: parse, chunk, resume from any
//! saved checkpoint, translate remaining chunks under a concurrency
//! semaphore with per-chunk retry, then reassemble and write the result.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use futures_util::stream::{FuturesUnordered, StreamExt};
use rand::Rng;
use subcast_config::TranslationConfig;
use subcast_domain::checkpoint::TranslationCheckpoint;
use subcast_domain::ids::JobId;
use subcast_domain::translation::{SegmentForTranslation, TranslatedSegment, TranslationProvider, TranslationRequest};
use subcast_store::JobStore;
use tokio::sync::Semaphore;

use crate::chunk::{Chunk, build_chunks};
use crate::error::TranslateError;
use crate::srt::{self, Cue};

const RETRY_BASE: Duration = Duration::from_secs(1);
const RETRY_FACTOR: f64 = 2.0;
const RETRY_MAX: Duration = Duration::from_secs(60);

/// Outcome of running the full pipeline for one job.
pub struct TranslationOutcome {
    /// Rendered SRT body for the completed translation.
    pub rendered_srt: String,
}

/// Translate `source_srt` end to end, resuming from any checkpoint already
/// saved for `job_id`.
///
/// # Errors
///
/// Returns [`TranslateError::Parse`] if the source subtitle cannot be
/// parsed, or [`TranslateError::ChunkFailed`] if a chunk exhausts its retry
/// budget; the checkpoint is left in place on the latter so a later run can
/// resume.
pub async fn run<P, S>(
    job_id: JobId,
    source_srt: &str,
    source_language: &str,
    target_language: &str,
    provider: &P,
    store: &S,
    config: &TranslationConfig,
    parallel_requests: usize,
) -> Result<TranslationOutcome, TranslateError>
where
    P: TranslationProvider,
    S: JobStore,
{
    let cues = srt::parse(source_srt)?;
    let segments: Vec<SegmentForTranslation> = cues
        .iter()
        .enumerate()
        .map(|(idx, cue)| SegmentForTranslation {
            segment_id: u32::try_from(idx).unwrap_or(u32::MAX),
            text: cue.text.clone(),
        })
        .collect();
    let token_counts: Vec<usize> = segments
        .iter()
        .map(|segment| provider.estimate_tokens(&segment.text))
        .collect();

    let chunks = build_chunks(
        segments,
        &token_counts,
        config.effective_token_budget(),
        config.max_segments_per_chunk,
    );

    let mut checkpoint = store
        .load_checkpoint(job_id)
        .await
        .map_err(|err| TranslateError::Store {
            operation: "load_checkpoint",
            source: err,
        })?
        .unwrap_or_else(|| {
            TranslationCheckpoint::new(job_id, chunks.len(), source_language, target_language, Utc::now())
        });

    let remaining: Vec<usize> = checkpoint.remaining_chunk_indices().into_iter().collect();
    let semaphore = Arc::new(Semaphore::new(parallel_requests.max(1)));

    let mut in_flight = FuturesUnordered::new();
    for index in remaining {
        let chunk = chunks
            .get(index)
            .ok_or_else(|| TranslateError::ChunkFailed {
                chunk_index: index,
                message: "chunk index out of bounds".to_string(),
            })?;
        let semaphore = Arc::clone(&semaphore);

        // The permit is acquired inside the pushed future, not here, so that
        // pushing every chunk's future onto `in_flight` is non-blocking and
        // the bounded concurrency is enforced while the set is polled below.
        in_flight.push(async move {
            let permit = semaphore.acquire_owned().await.expect("semaphore not closed");
            let result = translate_with_retry(
                provider,
                chunk,
                source_language,
                target_language,
                config.openai_max_retries,
            )
            .await;
            drop(permit);
            (index, result)
        });
    }

    // Chunks may complete out of order; each completion is checkpointed
    // immediately so a crash mid-run only loses in-flight work.
    while let Some((index, result)) = in_flight.next().await {
        let translated = result?;
        checkpoint.record_chunk(index, translated, Utc::now());
        store
            .save_checkpoint(&checkpoint)
            .await
            .map_err(|err| TranslateError::Store {
                operation: "save_checkpoint",
                source: err,
            })?;
    }

    let rendered_srt = reassemble(&cues, &checkpoint);
    Ok(TranslationOutcome { rendered_srt })
}

async fn translate_with_retry<P: TranslationProvider>(
    provider: &P,
    chunk: &Chunk,
    source_language: &str,
    target_language: &str,
    max_retries: u32,
) -> Result<Vec<TranslatedSegment>, TranslateError> {
    let request = TranslationRequest {
        source_language: source_language.to_string(),
        target_language: target_language.to_string(),
        segments: chunk.segments.clone(),
    };

    let mut attempt = 0_u32;
    loop {
        match provider.translate_chunk(&request).await {
            Ok(segments) => return Ok(segments),
            Err(_err) if attempt < max_retries => {
                tokio::time::sleep(backoff_delay_with_jitter(attempt)).await;
                attempt += 1;
            }
            Err(err) => {
                return Err(TranslateError::ChunkFailed {
                    chunk_index: chunk.index,
                    message: err.to_string(),
                });
            }
        }
    }
}

/// Exponential backoff (base 1s, factor 2, cap 60s) with up to 20% jitter.
fn backoff_delay_with_jitter(attempt: u32) -> Duration {
    let scaled = RETRY_BASE.as_secs_f64() * RETRY_FACTOR.powi(attempt.try_into().unwrap_or(i32::MAX));
    let capped = scaled.min(RETRY_MAX.as_secs_f64());
    let jitter = rand::thread_rng().gen_range(0.0..=capped * 0.2);
    Duration::from_secs_f64(capped + jitter)
}

/// Sort chunks by index, flatten translated segments, and splice their text
/// back onto the original cues' timings.
fn reassemble(source_cues: &[Cue], checkpoint: &TranslationCheckpoint) -> String {
    let mut translated_by_segment = std::collections::BTreeMap::new();
    for segments in checkpoint.translations.values() {
        for segment in segments {
            translated_by_segment.insert(segment.segment_id, segment.text.clone());
        }
    }

    let out_cues: Vec<Cue> = source_cues
        .iter()
        .enumerate()
        .map(|(idx, cue)| {
            let segment_id = u32::try_from(idx).unwrap_or(u32::MAX);
            Cue {
                index: cue.index,
                timing: cue.timing.clone(),
                text: translated_by_segment
                    .get(&segment_id)
                    .cloned()
                    .unwrap_or_else(|| cue.text.clone()),
            }
        })
        .collect();

    srt::write(&out_cues)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backoff_delay_never_exceeds_cap_plus_jitter_ceiling() {
        let delay = backoff_delay_with_jitter(10);
        assert!(delay.as_secs_f64() <= RETRY_MAX.as_secs_f64() * 1.2 + 0.001);
    }

    #[test]
    fn backoff_delay_grows_with_attempt() {
        let first = backoff_delay_with_jitter(0).as_secs_f64();
        let later = backoff_delay_with_jitter(3).as_secs_f64();
        assert!(later >= first);
    }
}
