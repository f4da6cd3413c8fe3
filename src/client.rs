use crate::{
    config::Config,
    error::{Error, Result},
};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Seam between the pipeline and the generative backend.
///
/// The only contract is "accepts a text prompt, returns text"; tests plug in
/// a canned-reply implementation here.
pub(crate) trait TextGenerator {
    /// Sends a single-turn prompt and returns the model's textual reply.
    fn generate(&self, prompt: &str) -> Result<String>;
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentRequest<'a> {
    contents: Vec<Content<'a>>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}

#[derive(Debug, Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f64,
    top_p: f64,
    top_k: u32,
    max_output_tokens: u32,
    response_mime_type: &'static str,
}

#[derive(Debug, Deserialize)]
struct GenerateContentResponse {
    candidates: Option<Vec<Candidate>>,
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

impl GenerateContentResponse {
    /// Pulls the reply text out of the first candidate, if any.
    fn into_text(self) -> Option<String> {
        self.candidates?
            .into_iter()
            .next()?
            .content?
            .parts?
            .into_iter()
            .next()?
            .text
    }
}

/// Blocking client for the Gemini `generateContent` REST endpoint.
///
/// Each call is a fresh single-turn session: the request carries exactly one
/// user content and no prior history. Sampling configuration comes from
/// [`Config`] and is fixed for the lifetime of the client.
pub(crate) struct GeminiClient {
    http: reqwest::blocking::Client,
    base_url: String,
    model: String,
    api_key: String,
    generation_config: GenerationConfig,
}

impl GeminiClient {
    /// Creates a new client from configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the underlying HTTP client cannot be constructed.
    pub(crate) fn new(config: &Config) -> Result<Self> {
        let timeout = if config.timeout.is_zero() {
            Duration::from_secs(120)
        } else {
            config.timeout
        };

        let http = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_key: config.api_key.clone(),
            generation_config: GenerationConfig {
                temperature: config.temperature,
                top_p: config.top_p,
                top_k: config.top_k,
                max_output_tokens: config.max_output_tokens,
                response_mime_type: "text/plain",
            },
        })
    }

    fn endpoint(&self) -> String {
        format!("{}/models/{}:generateContent", self.base_url, self.model)
    }
}

impl TextGenerator for GeminiClient {
    fn generate(&self, prompt: &str) -> Result<String> {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            generation_config: self.generation_config.clone(),
        };

        debug!(model = %self.model, prompt_chars = prompt.len(), "Sending generation request");

        let response = self
            .http
            .post(self.endpoint())
            .query(&[("key", self.api_key.as_str())])
            .json(&request)
            .send()?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().unwrap_or_default();
            return Err(Error::api(format!("Gemini API error ({status}): {body}")));
        }

        let reply: GenerateContentResponse = response.json()?;
        reply
            .into_text()
            .ok_or_else(|| Error::api("reply carried no candidate text"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_body_shape() {
        let request = GenerateContentRequest {
            contents: vec![Content {
                parts: vec![Part { text: "hello" }],
            }],
            generation_config: GenerationConfig {
                temperature: 0.9,
                top_p: 1.0,
                top_k: 0,
                max_output_tokens: 2048,
                response_mime_type: "text/plain",
            },
        };

        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(value["contents"][0]["parts"][0]["text"], "hello");
        assert_eq!(value["generationConfig"]["temperature"], 0.9);
        assert_eq!(value["generationConfig"]["topP"], 1.0);
        assert_eq!(value["generationConfig"]["topK"], 0);
        assert_eq!(value["generationConfig"]["maxOutputTokens"], 2048);
        assert_eq!(value["generationConfig"]["responseMimeType"], "text/plain");
    }

    #[test]
    fn test_reply_text_extraction() {
        let raw = r#"{
            "candidates": [
                {"content": {"parts": [{"text": "[{\"path\":\"a\",\"content\":\"b\"}]"}]}}
            ]
        }"#;

        let reply: GenerateContentResponse = serde_json::from_str(raw).unwrap();
        let text = reply.into_text().unwrap();
        assert!(text.contains("\"path\""));
    }

    #[test]
    fn test_reply_without_candidates() {
        let reply: GenerateContentResponse =
            serde_json::from_str(r#"{"candidates": []}"#).unwrap();
        assert!(reply.into_text().is_none());

        let reply: GenerateContentResponse = serde_json::from_str("{}").unwrap();
        assert!(reply.into_text().is_none());
    }

    #[test]
    fn test_endpoint_construction() {
        let config = Config::builder()
            .api_key("k")
            .api_base_url("https://example.test/v1beta/")
            .model("gemini-1.0-pro")
            .build()
            .unwrap();

        let client = GeminiClient::new(&config).unwrap();
        assert_eq!(
            client.endpoint(),
            "https://example.test/v1beta/models/gemini-1.0-pro:generateContent"
        );
    }
}
