use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::{debug, error, instrument};

use super::TextGenerator;
use crate::{config::AiConfig, error::ApiError};

#[derive(Debug, Serialize)]
struct GenerateRequest<'a> {
    contents: Vec<Content<'a>>,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    candidates: Option<Vec<Candidate>>,
    error: Option<ErrorBody>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    parts: Option<Vec<CandidatePart>>,
}

#[derive(Debug, Deserialize)]
struct CandidatePart {
    text: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: String,
}

/// Client for the Gemini `generateContent` endpoint.
pub struct GeminiClient {
    client: Client,
    config: AiConfig,
}

impl GeminiClient {
    pub fn new(config: AiConfig) -> anyhow::Result<Self> {
        // The generation call is the slowest collaborator in the system and
        // carries no protocol-level deadline, so cap it here.
        let client = Client::builder().timeout(Duration::from_secs(90)).build()?;
        Ok(Self { client, config })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/{}:generateContent?key={}",
            self.config.base_url.trim_end_matches('/'),
            self.config.model,
            self.config.api_key
        )
    }

    fn extract_text(response: GenerateResponse) -> Result<String, ApiError> {
        if let Some(err) = response.error {
            return Err(ApiError::Upstream(err.message));
        }
        response
            .candidates
            .and_then(|mut c| if c.is_empty() { None } else { Some(c.remove(0)) })
            .and_then(|c| c.content)
            .and_then(|c| c.parts)
            .and_then(|mut p| if p.is_empty() { None } else { Some(p.remove(0)) })
            .and_then(|p| p.text)
            .ok_or_else(|| ApiError::Upstream("empty response from model".into()))
    }
}

#[async_trait]
impl TextGenerator for GeminiClient {
    #[instrument(skip(self, prompt), fields(model = %self.config.model))]
    async fn generate(&self, prompt: &str) -> Result<String, ApiError> {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
        };

        debug!(prompt_len = prompt.len(), "calling text generation API");

        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .map_err(|e| ApiError::Upstream(format!("request failed: {e}")))?;

        let status = response.status();
        let text = response
            .text()
            .await
            .map_err(|e| ApiError::Upstream(format!("failed to read response: {e}")))?;

        if !status.is_success() {
            error!(%status, "generation API returned error status");
            let message = serde_json::from_str::<GenerateResponse>(&text)
                .ok()
                .and_then(|r| r.error)
                .map_or(text, |e| e.message);
            return Err(ApiError::Upstream(format!("{status}: {message}")));
        }

        let parsed: GenerateResponse = serde_json::from_str(&text)
            .map_err(|e| ApiError::Upstream(format!("unparsable response: {e}")))?;

        Self::extract_text(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_client() -> GeminiClient {
        GeminiClient::new(AiConfig {
            api_key: "test-key".into(),
            model: "models/gemma-3-1b-it".into(),
            base_url: "https://generativelanguage.googleapis.com/v1beta/".into(),
        })
        .expect("client builds")
    }

    #[test]
    fn endpoint_joins_base_model_and_key() {
        let client = make_client();
        assert_eq!(
            client.endpoint(),
            "https://generativelanguage.googleapis.com/v1beta/models/gemma-3-1b-it:generateContent?key=test-key"
        );
    }

    #[test]
    fn request_body_matches_wire_format() {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![Part { text: "xin chào" }],
            }],
        };
        let json = serde_json::to_string(&body).expect("serializes");
        assert_eq!(json, r#"{"contents":[{"parts":[{"text":"xin chào"}]}]}"#);
    }

    #[test]
    fn extracts_first_candidate_text() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "Bữa sáng: Phở bò"}]}}
            ]
        }"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).expect("parses");
        let text = GeminiClient::extract_text(parsed).expect("text present");
        assert_eq!(text, "Bữa sáng: Phở bò");
    }

    #[test]
    fn missing_candidates_is_an_upstream_error() {
        let parsed: GenerateResponse = serde_json::from_str("{}").expect("parses");
        assert!(matches!(
            GeminiClient::extract_text(parsed),
            Err(ApiError::Upstream(_))
        ));
    }

    #[test]
    fn api_error_body_is_surfaced() {
        let raw = r#"{"error": {"message": "quota exceeded"}}"#;
        let parsed: GenerateResponse = serde_json::from_str(raw).expect("parses");
        match GeminiClient::extract_text(parsed) {
            Err(ApiError::Upstream(msg)) => assert_eq!(msg, "quota exceeded"),
            other => panic!("unexpected: {other:?}"),
        }
    }
}
