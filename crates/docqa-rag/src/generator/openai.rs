use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use docqa_core::config::GenerationSettings;
use docqa_core::error::{Error, Result};

use super::{build_prompt, http_client, AnswerGenerator, ContextPassage};

const DEFAULT_ENDPOINT: &str = "https://api.openai.com";

/// Any server speaking the OpenAI chat-completions protocol.
#[derive(Clone)]
pub struct OpenAiGenerator {
    client: Client,
    base_url: String,
    model: String,
    api_key: String,
    temperature: f32,
    max_tokens: u32,
}

impl OpenAiGenerator {
    pub fn new(settings: &GenerationSettings) -> Result<Self> {
        let base = if settings.endpoint.trim().is_empty() { DEFAULT_ENDPOINT } else { settings.endpoint.as_str() };
        Ok(Self {
            client: http_client(settings.timeout_secs)?,
            base_url: base.trim_end_matches('/').to_string(),
            model: settings.model.clone(),
            api_key: settings.api_key.clone(),
            temperature: settings.temperature,
            max_tokens: settings.max_output_tokens,
        })
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 1],
    temperature: f32,
    max_tokens: u32,
    stream: bool,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[async_trait]
impl AnswerGenerator for OpenAiGenerator {
    fn name(&self) -> &str {
        "openai"
    }

    async fn generate(&self, query: &str, passages: &[ContextPassage]) -> Result<String> {
        let prompt = build_prompt(query, passages);
        let url = format!("{}/v1/chat/completions", self.base_url);
        let body = ChatRequest {
            model: &self.model,
            messages: [ChatMessage { role: "user", content: &prompt }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            stream: false,
        };

        let mut req = self.client.post(&url).json(&body);
        if !self.api_key.is_empty() {
            req = req.bearer_auth(&self.api_key);
        }
        let res = req.send().await.map_err(|e| Error::generation("chat completion request failed", e))?;

        let status = res.status();
        if !status.is_success() {
            let message = format!("chat completion returned HTTP {status}");
            return Err(match res.text().await {
                Ok(body) => Error::generation(message, body),
                Err(e) => Error::generation(message, e),
            });
        }

        let payload: ChatResponse = res
            .json()
            .await
            .map_err(|e| Error::generation("chat completion response was not understood", e))?;
        payload
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|s| !s.is_empty())
            .ok_or_else(|| Error::generation("chat completion returned no answer", "response had no choices"))
    }
}
