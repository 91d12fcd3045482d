use async_trait::async_trait;

use docqa_core::error::Result;

use super::{AnswerGenerator, ContextPassage};
use crate::retriever::preview;

/// Offline generator: quotes the most relevant passage verbatim.
#[derive(Debug, Clone)]
pub struct ExtractiveGenerator {
    preview_chars: usize,
}

impl ExtractiveGenerator {
    pub fn new(preview_chars: usize) -> Self {
        Self { preview_chars }
    }
}

#[async_trait]
impl AnswerGenerator for ExtractiveGenerator {
    fn name(&self) -> &str {
        "extractive"
    }

    async fn generate(&self, _query: &str, passages: &[ContextPassage]) -> Result<String> {
        Ok(match passages.first() {
            Some(top) => format!("Based on '{}':\n\n{}", top.source_name, preview(&top.text, self.preview_chars)),
            None => crate::orchestrator::NO_CONTEXT_ANSWER.to_string(),
        })
    }
}
