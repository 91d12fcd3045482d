//! Retrieval-augmented answering over an ingested document set.
//!
//! [`RagOrchestrator`] owns the single active [`IndexSnapshot`] and moves
//! between `Empty` and `Ready` as documents are processed or cleared.
//!
//! [`IndexSnapshot`]: docqa_vector::IndexSnapshot
pub mod confidence;
pub mod generator;
pub mod ingest;
pub mod orchestrator;
pub mod retriever;

pub use generator::{AnswerGenerator, ContextPassage, ExtractiveGenerator, GeminiGenerator, OpenAiGenerator};
pub use ingest::{AcceptedDocument, IngestReport, Ingestor};
pub use orchestrator::{Answer, EngineState, EngineStats, RagOrchestrator, NO_CONTEXT_ANSWER};
pub use retriever::Retriever;
