//! Pluggable LLM translation capability.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DomainResult;

/// A single subtitle segment submitted for translation within a chunk.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SegmentForTranslation {
    /// Stable identifier matching the source segment's block order.
    pub segment_id: u32,
    /// Source-language text to translate.
    pub text: String,
}

/// A single translated segment returned by the translation provider.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TranslatedSegment {
    /// Identifier matching [`SegmentForTranslation::segment_id`].
    pub segment_id: u32,
    /// Translated text.
    pub text: String,
}

/// One chunk-level translation request sent to the provider.
#[derive(Debug, Clone)]
pub struct TranslationRequest {
    /// Source language of the segments.
    pub source_language: String,
    /// Desired target language.
    pub target_language: String,
    /// Segments to translate, in original order.
    pub segments: Vec<SegmentForTranslation>,
}

/// Capability implemented by LLM translation backends.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Translate one chunk's worth of segments, returning a translated
    /// segment for each input segment id. Implementations are expected to
    /// apply their own request-level timeout; retry/backoff is the caller's
    /// responsibility (see `subcast-translate`).
    async fn translate_chunk(
        &self,
        request: &TranslationRequest,
    ) -> DomainResult<Vec<TranslatedSegment>>;

    /// Estimate the token count of a piece of text for the configured model.
    /// Implementations without a bundled tokenizer table fall back to
    /// `ceil(chars / 4)`.
    fn estimate_tokens(&self, text: &str) -> usize {
        text.chars().count().div_ceil(4)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Stub;

    #[async_trait]
    impl TranslationProvider for Stub {
        async fn translate_chunk(
            &self,
            _request: &TranslationRequest,
        ) -> DomainResult<Vec<TranslatedSegment>> {
            Ok(Vec::new())
        }
    }

    #[test]
    fn default_token_estimate_uses_ceil_chars_over_four() {
        let stub = Stub;
        assert_eq!(stub.estimate_tokens(""), 0);
        assert_eq!(stub.estimate_tokens("abcd"), 1);
        assert_eq!(stub.estimate_tokens("abcde"), 2);
    }
}
