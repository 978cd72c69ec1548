//! Token-budget and segment-count chunking of a parsed subtitle.

use subcast_domain::translation::SegmentForTranslation;

/// One chunk of segments to submit to the translation provider together.
#[derive(Debug, Clone)]
pub struct Chunk {
    /// Zero-based position in the overall chunk sequence; also the
    /// checkpoint's chunk index.
    pub index: usize,
    /// Segments assigned to this chunk, in original order.
    pub segments: Vec<SegmentForTranslation>,
}

/// Split `segments` into chunks respecting whichever of `token_budget` or
/// `max_segments` is tighter. A segment whose own token count exceeds
/// `token_budget` is emitted as a singleton chunk regardless.
#[must_use]
pub fn build_chunks(
    segments: Vec<SegmentForTranslation>,
    token_counts: &[usize],
    token_budget: u32,
    max_segments: u32,
) -> Vec<Chunk> {
    let token_budget = usize::try_from(token_budget).unwrap_or(usize::MAX);
    let max_segments = usize::try_from(max_segments).unwrap_or(usize::MAX).max(1);

    let mut chunks = Vec::new();
    let mut current: Vec<SegmentForTranslation> = Vec::new();
    let mut current_tokens = 0_usize;

    for (segment, &tokens) in segments.into_iter().zip(token_counts.iter()) {
        if tokens > token_budget {
            if !current.is_empty() {
                chunks.push(std::mem::take(&mut current));
                current_tokens = 0;
            }
            chunks.push(vec![segment]);
            continue;
        }

        let would_overflow_tokens = current_tokens + tokens > token_budget;
        let would_overflow_count = current.len() + 1 > max_segments;
        if !current.is_empty() && (would_overflow_tokens || would_overflow_count) {
            chunks.push(std::mem::take(&mut current));
            current_tokens = 0;
        }

        current_tokens += tokens;
        current.push(segment);
    }
    if !current.is_empty() {
        chunks.push(current);
    }

    chunks
        .into_iter()
        .enumerate()
        .map(|(index, segments)| Chunk { index, segments })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segment(id: u32, text: &str) -> SegmentForTranslation {
        SegmentForTranslation {
            segment_id: id,
            text: text.to_string(),
        }
    }

    #[test]
    fn splits_on_segment_count_budget() {
        let segments = vec![segment(1, "a"), segment(2, "b"), segment(3, "c")];
        let token_counts = vec![1, 1, 1];
        let chunks = build_chunks(segments, &token_counts, 1_000, 2);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].segments.len(), 2);
        assert_eq!(chunks[1].segments.len(), 1);
    }

    #[test]
    fn splits_on_token_budget() {
        let segments = vec![segment(1, "a"), segment(2, "b"), segment(3, "c")];
        let token_counts = vec![50, 50, 50];
        let chunks = build_chunks(segments, &token_counts, 100, 100);
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].segments.len(), 2);
        assert_eq!(chunks[1].segments.len(), 1);
    }

    #[test]
    fn oversized_segment_is_its_own_chunk() {
        let segments = vec![segment(1, "a"), segment(2, "huge"), segment(3, "c")];
        let token_counts = vec![10, 5_000, 10];
        let chunks = build_chunks(segments, &token_counts, 100, 100);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[1].segments.len(), 1);
        assert_eq!(chunks[1].segments[0].segment_id, 2);
    }

    #[test]
    fn chunk_indices_are_dense_and_ordered() {
        let segments = vec![segment(1, "a"), segment(2, "b")];
        let token_counts = vec![1, 1];
        let chunks = build_chunks(segments, &token_counts, 1, 1);
        assert_eq!(chunks[0].index, 0);
        assert_eq!(chunks[1].index, 1);
    }
}
