//! Gemini client — the single point of entry for all generative-model calls in Herald.
//!
//! ARCHITECTURAL RULE: No other module may call the Gemini API directly.
//! Pipeline stages depend on the `TextGenerator` trait, carried in `AppState`
//! as `Arc<dyn TextGenerator>`, so tests can substitute recording stubs.
//!
//! There is deliberately no retry loop here: a failed call surfaces
//! immediately and the calling stage degrades to its fallback content. The
//! only regeneration loop in the system is the safety driver's.

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

const GEMINI_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta/models";
/// The model used for all generation calls in Herald.
/// This is intentionally hardcoded to prevent accidental drift.
pub const MODEL: &str = "gemini-1.5-flash";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("model returned empty content")]
    EmptyContent,
}

/// Anything that can turn a prompt into generated text.
///
/// Production: `GeminiClient`. Tests: canned/recording stubs.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    #[serde(rename = "usageMetadata")]
    usage_metadata: Option<UsageMetadata>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct UsageMetadata {
    prompt_token_count: Option<u32>,
    candidates_token_count: Option<u32>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    error: GeminiErrorBody,
}

#[derive(Debug, Deserialize)]
struct GeminiErrorBody {
    message: String,
}

/// The production Gemini client. Wraps the `generateContent` REST endpoint
/// with typed request/response bodies and status-to-error mapping.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    api_key: String,
}

impl GeminiClient {
    pub fn new(api_key: String, timeout_secs: u64) -> Self {
        Self {
            client: Client::builder()
                .timeout(std::time::Duration::from_secs(timeout_secs))
                .build()
                .expect("Failed to build HTTP client"),
            api_key,
        }
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let request_body = GenerateRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        let url = format!("{GEMINI_API_URL}/{MODEL}:generateContent");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await?;

        let status = response.status();

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            // Try to parse the structured error message
            let message = serde_json::from_str::<GeminiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(LlmError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let parsed: GenerateResponse = response.json().await?;

        if let Some(usage) = &parsed.usage_metadata {
            debug!(
                "model call succeeded: prompt_tokens={:?}, output_tokens={:?}",
                usage.prompt_token_count, usage.candidates_token_count
            );
        }

        first_candidate_text(parsed)
            .filter(|t| !t.trim().is_empty())
            .ok_or(LlmError::EmptyContent)
    }
}

/// Pulls the first text part out of the first candidate that has one.
fn first_candidate_text(response: GenerateResponse) -> Option<String> {
    response.candidates.into_iter().find_map(|c| {
        c.content
            .and_then(|content| content.parts.into_iter().find_map(|p| p.text))
    })
}

/// Strips ```json ... ``` or ``` ... ``` code fences from model output.
/// The research stage asks for raw JSON but models often fence it anyway.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    for opener in ["```json", "```"] {
        if let Some(inner) = text.strip_prefix(opener) {
            let inner = inner.trim_start();
            // An unclosed fence still yields the body rather than erroring.
            return inner.strip_suffix("```").map(str::trim).unwrap_or(inner);
        }
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_json_fences_with_json_tag() {
        let input = "```json\n{\"summary\": \"AI adoption is up\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"summary\": \"AI adoption is up\"}");
    }

    #[test]
    fn test_strip_json_fences_bare_fence() {
        let input = "```\n{\"summary\": \"AI adoption is up\"}\n```";
        assert_eq!(strip_json_fences(input), "{\"summary\": \"AI adoption is up\"}");
    }

    #[test]
    fn test_strip_json_fences_passes_unfenced_text_through() {
        assert_eq!(strip_json_fences("{\"summary\": \"plain\"}"), "{\"summary\": \"plain\"}");
    }

    #[test]
    fn test_strip_json_fences_tolerates_unclosed_fence() {
        assert_eq!(
            strip_json_fences("```json\n{\"summary\": \"cut off\"}"),
            "{\"summary\": \"cut off\"}"
        );
    }

    #[test]
    fn test_first_candidate_text_extracts_first_part() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "hello"}, {"text": "ignored"}], "role": "model"}}
            ],
            "usageMetadata": {"promptTokenCount": 12, "candidatesTokenCount": 4, "totalTokenCount": 16}
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(body).unwrap();
        assert_eq!(first_candidate_text(parsed).as_deref(), Some("hello"));
    }

    #[test]
    fn test_first_candidate_text_handles_empty_response() {
        let parsed: GenerateResponse = serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert_eq!(first_candidate_text(parsed), None);
    }

    #[test]
    fn test_first_candidate_text_skips_partless_candidates() {
        let body = r#"{
            "candidates": [
                {"content": {"parts": [], "role": "model"}},
                {"content": {"parts": [{"text": "second"}], "role": "model"}}
            ]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(body).unwrap();
        assert_eq!(first_candidate_text(parsed).as_deref(), Some("second"));
    }
}
