//! Answer composition from retrieved passages.
//!
//! Remote generators are single-shot: a failed call surfaces as
//! [`Error::Generation`] with the transport or API cause attached and is
//! never retried here.
#[cfg(test)]
mod canned_http;
mod extractive;
mod gemini;
mod openai;

pub use extractive::ExtractiveGenerator;
pub use gemini::GeminiGenerator;
pub use openai::OpenAiGenerator;

use async_trait::async_trait;
use std::fmt::Write as _;
use std::sync::Arc;
use std::time::Duration;

use docqa_core::config::{GenerationProvider, GenerationSettings, RetrievalSettings};
use docqa_core::error::{Error, Result};

/// A retrieved chunk handed to a generator, most relevant first.
#[derive(Debug, Clone, PartialEq)]
pub struct ContextPassage {
    pub chunk_id: u64,
    pub source_name: String,
    pub text: String,
    pub similarity_score: f32,
}

#[async_trait]
pub trait AnswerGenerator: Send + Sync {
    fn name(&self) -> &str;

    /// Produce an answer to `query` grounded in `passages`.
    async fn generate(&self, query: &str, passages: &[ContextPassage]) -> Result<String>;
}

/// Deterministic prompt: instructions, numbered passages in the given order, then the question.
pub fn build_prompt(query: &str, passages: &[ContextPassage]) -> String {
    let mut prompt = String::from(
        "You are a helpful assistant answering questions about the user's uploaded documents.\n\
         Answer using only the context below. Cite passages by their [number]. \
         If the context does not contain the answer, say so.\n\nContext:\n",
    );
    for (i, p) in passages.iter().enumerate() {
        let _ = write!(prompt, "\n[{}] (source: {})\n{}\n", i + 1, p.source_name, p.text);
    }
    let _ = write!(prompt, "\nQuestion: {}\nAnswer:", query.trim());
    prompt
}

pub(crate) fn http_client(timeout_secs: u64) -> Result<reqwest::Client> {
    reqwest::Client::builder()
        .timeout(Duration::from_secs(timeout_secs))
        .build()
        .map_err(|e| Error::generation("failed to build HTTP client", e))
}

/// Pick the generator named by `settings.provider`.
///
/// Gemini without a credential falls back to the extractive generator so the
/// engine stays usable offline.
pub fn from_settings(settings: &GenerationSettings, retrieval: &RetrievalSettings) -> Result<Arc<dyn AnswerGenerator>> {
    let generator: Arc<dyn AnswerGenerator> = match settings.provider {
        GenerationProvider::Gemini if settings.api_key.trim().is_empty() => {
            tracing::warn!("no generation credential configured; answering extractively");
            Arc::new(ExtractiveGenerator::new(retrieval.preview_chars))
        }
        GenerationProvider::Gemini => Arc::new(GeminiGenerator::new(settings)?),
        GenerationProvider::OpenAi => Arc::new(OpenAiGenerator::new(settings)?),
        GenerationProvider::Extractive => Arc::new(ExtractiveGenerator::new(retrieval.preview_chars)),
    };
    tracing::info!(generator = generator.name(), model = %settings.model, "answer generator selected");
    Ok(generator)
}
