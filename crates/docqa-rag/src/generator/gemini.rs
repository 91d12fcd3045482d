use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use docqa_core::config::GenerationSettings;
use docqa_core::error::{Error, Result};

use super::{build_prompt, http_client, AnswerGenerator, ContextPassage};

const DEFAULT_ENDPOINT: &str = "https://generativelanguage.googleapis.com";

#[derive(Clone)]
pub struct GeminiGenerator {
    client: Client,
    endpoint: String,
    model: String,
    api_key: String,
    temperature: f32,
    max_output_tokens: u32,
}

impl GeminiGenerator {
    pub fn new(settings: &GenerationSettings) -> Result<Self> {
        let endpoint = if settings.endpoint.trim().is_empty() { DEFAULT_ENDPOINT } else { settings.endpoint.as_str() };
        Ok(Self {
            client: http_client(settings.timeout_secs)?,
            endpoint: endpoint.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
            temperature: settings.temperature,
            max_output_tokens: settings.max_output_tokens,
        })
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    contents: [Content<'a>; 1],
    generation_config: GenerationConfig,
}

#[derive(Serialize)]
struct Content<'a> {
    role: &'static str,
    parts: [Part<'a>; 1],
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<CandidatePart>,
}

#[derive(Deserialize)]
struct CandidatePart {
    #[serde(default)]
    text: String,
}

#[async_trait]
impl AnswerGenerator for GeminiGenerator {
    fn name(&self) -> &str {
        "gemini"
    }

    async fn generate(&self, query: &str, passages: &[ContextPassage]) -> Result<String> {
        let prompt = build_prompt(query, passages);
        let url = format!("{}/v1beta/models/{}:generateContent", self.endpoint, self.model);
        let body = GenerateRequest {
            contents: [Content { role: "user", parts: [Part { text: &prompt }] }],
            generation_config: GenerationConfig {
                temperature: self.temperature,
                max_output_tokens: self.max_output_tokens,
            },
        };

        let res = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::generation("Gemini request failed", e))?;

        let status = res.status();
        if !status.is_success() {
            let message = format!("Gemini returned HTTP {status}");
            return Err(match res.text().await {
                Ok(body) => Error::generation(message, body),
                Err(e) => Error::generation(message, e),
            });
        }

        let payload: GenerateResponse = res
            .json()
            .await
            .map_err(|e| Error::generation("Gemini response was not understood", e))?;
        let answer: String = payload
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .map(|c| c.parts.into_iter().map(|p| p.text).collect())
            .unwrap_or_default();
        if answer.is_empty() {
            return Err(Error::generation("Gemini returned no answer", "response had no candidate text"));
        }
        tracing::debug!(model = %self.model, chars = answer.len(), "gemini answered");
        Ok(answer)
    }
}
