//! OpenAI Chat Completions-shaped `TranslationProvider`.
//!
//! The wire protocol is an external collaborator (per `spec.md`'s
//! Non-goals); this client speaks the Chat Completions request/response
//! shape closely enough to exercise prompt construction and response
//! validation end to end.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use subcast_domain::error::DomainError;
use subcast_domain::translation::{TranslatedSegment, TranslationProvider, TranslationRequest};

/// Translation provider backed by an OpenAI-compatible Chat Completions API.
pub struct OpenAiTranslationProvider {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl OpenAiTranslationProvider {
    /// Build a new provider targeting `base_url` (e.g.
    /// `https://api.openai.com/v1`) using `model` for every request.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying `reqwest::Client` cannot be built.
    pub fn new(
        base_url: impl Into<String>,
        api_key: impl Into<String>,
        model: impl Into<String>,
    ) -> reqwest::Result<Self> {
        Ok(Self {
            client: Client::builder().build()?,
            base_url: base_url.into(),
            api_key: api_key.into(),
            model: model.into(),
        })
    }
}

#[async_trait]
impl TranslationProvider for OpenAiTranslationProvider {
    async fn translate_chunk(
        &self,
        request: &TranslationRequest,
    ) -> Result<Vec<TranslatedSegment>, DomainError> {
        let prompt = build_prompt(request);
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: &prompt,
            }],
            temperature: 0.2,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|err| DomainError::TransientInfra {
                operation: "translate_chunk",
                reason: err.to_string(),
            })?;

        if !response.status().is_success() {
            let status = response.status();
            return Err(DomainError::TransientInfra {
                operation: "translate_chunk",
                reason: format!("provider returned status {status}"),
            });
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|err| DomainError::Unexpected {
                operation: "translate_chunk",
                reason: format!("failed to decode provider response: {err}"),
            })?;

        let content = parsed
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| DomainError::Unexpected {
                operation: "translate_chunk",
                reason: "provider returned no choices".to_string(),
            })?;

        parse_translated_segments(content, &request.segments.iter().map(|s| s.segment_id).collect::<Vec<_>>())
    }
}

fn build_prompt(request: &TranslationRequest) -> String {
    let segments = serde_json::to_string(&request.segments).unwrap_or_default();
    format!(
        "Translate the following subtitle segments from {} to {}. \
         Respond with only a JSON array of objects shaped \
         {{\"segment_id\": number, \"translated_text\": string}}, one per \
         input segment, preserving every segment_id exactly.\n\nSegments:\n{segments}",
        request.source_language, request.target_language,
    )
}

/// Strip optional Markdown code fences and parse the provider's JSON array,
/// validating that it returns exactly the expected set of segment ids.
fn parse_translated_segments(
    content: &str,
    expected_ids: &[u32],
) -> Result<Vec<TranslatedSegment>, DomainError> {
    let stripped = strip_code_fence(content);
    let raw: Vec<RawTranslatedSegment> =
        serde_json::from_str(stripped).map_err(|err| DomainError::Unexpected {
            operation: "translate_chunk",
            reason: format!("failed to parse translation response: {err}"),
        })?;

    let mut by_id: std::collections::BTreeMap<u32, String> = raw
        .into_iter()
        .map(|entry| (entry.segment_id, entry.translated_text))
        .collect();

    let mut missing = Vec::new();
    let mut segments = Vec::with_capacity(expected_ids.len());
    for &id in expected_ids {
        match by_id.remove(&id) {
            Some(text) => segments.push(TranslatedSegment {
                segment_id: id,
                text,
            }),
            None => missing.push(id),
        }
    }

    if !missing.is_empty() {
        return Err(DomainError::Unexpected {
            operation: "translate_chunk",
            reason: format!("response missing segment ids: {missing:?}"),
        });
    }

    Ok(segments)
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    trimmed
        .strip_prefix("```json")
        .or_else(|| trimmed.strip_prefix("```"))
        .map_or(trimmed, |rest| rest.strip_suffix("```").unwrap_or(rest).trim())
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatResponseMessage,
}

#[derive(Deserialize)]
struct ChatResponseMessage {
    content: String,
}

#[derive(Deserialize)]
struct RawTranslatedSegment {
    segment_id: u32,
    translated_text: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_json_code_fence() {
        let content = "```json\n[{\"segment_id\":1,\"translated_text\":\"hola\"}]\n```";
        assert_eq!(
            strip_code_fence(content),
            "[{\"segment_id\":1,\"translated_text\":\"hola\"}]"
        );
    }

    #[test]
    fn strips_bare_code_fence() {
        let content = "```\n[]\n```";
        assert_eq!(strip_code_fence(content), "[]");
    }

    #[test]
    fn parses_well_formed_response() {
        let content = r#"[{"segment_id":1,"translated_text":"hola"},{"segment_id":2,"translated_text":"mundo"}]"#;
        let segments = parse_translated_segments(content, &[1, 2]).expect("parses");
        assert_eq!(segments.len(), 2);
        assert_eq!(segments[0].text, "hola");
        assert_eq!(segments[1].text, "mundo");
    }

    #[test]
    fn missing_segment_id_is_a_chunk_error() {
        let content = r#"[{"segment_id":1,"translated_text":"hola"}]"#;
        let err = parse_translated_segments(content, &[1, 2]).unwrap_err();
        assert!(matches!(err, DomainError::Unexpected { .. }));
    }
}
