//! Domain types shared by the extraction, indexing and answering layers.

use serde::{Deserialize, Serialize};
use std::fmt;

pub type ChunkId = u64;

/// A bounded span of a source document that is independently indexed.
///
/// - `chunk_id`: unique across the whole index, assigned in insertion order
/// - `source_name`: originating file name
/// - `text`: the literal chunk content
/// - `offset`: character position of the chunk within its cleaned source text
/// - `chunk_index`/`total_chunks`: position within the parent document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub chunk_id: ChunkId,
    pub source_name: String,
    pub text: String,
    pub offset: usize,
    pub chunk_index: usize,
    pub total_chunks: usize,
}

/// A raw upload handed to the ingest path by the boundary layer.
#[derive(Debug, Clone)]
pub struct SourceDocument {
    pub source_name: String,
    pub mime_type: String,
    pub bytes: Vec<u8>,
}

impl SourceDocument {
    pub fn new(source_name: impl Into<String>, mime_type: impl Into<String>, bytes: impl Into<Vec<u8>>) -> Self {
        Self { source_name: source_name.into(), mime_type: mime_type.into(), bytes: bytes.into() }
    }
}

/// The minimal surface returned by a vector index.
///
/// `chunk_id` matches `Chunk::chunk_id`; `score` is the similarity in `[0, 1]`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchHit {
    pub chunk_id: ChunkId,
    pub score: f32,
}

/// One retrieved passage as returned to the caller.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryResultEntry {
    pub chunk_id: ChunkId,
    pub source_name: String,
    pub similarity_score: f32,
    pub preview: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    pub chunk_count: usize,
    pub dimension: usize,
    pub approximate_memory_bytes: usize,
}

/// Display banding for a confidence value: `> 0.8` high, `> 0.6` medium, else low.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConfidenceBand {
    Low,
    Medium,
    High,
}

impl ConfidenceBand {
    pub const HIGH_THRESHOLD: f32 = 0.8;
    pub const MEDIUM_THRESHOLD: f32 = 0.6;

    pub fn from_score(score: f32) -> Self {
        if score > Self::HIGH_THRESHOLD {
            Self::High
        } else if score > Self::MEDIUM_THRESHOLD {
            Self::Medium
        } else {
            Self::Low
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl fmt::Display for ConfidenceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A chat turn as kept by the caller. Assistant turns carry their citations
/// and confidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConversationMessage {
    pub role: Role,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources: Option<Vec<QueryResultEntry>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f32>,
}

impl ConversationMessage {
    pub fn user(content: impl Into<String>) -> Self {
        Self { role: Role::User, content: content.into(), sources: None, confidence: None }
    }

    pub fn assistant(content: impl Into<String>, sources: Vec<QueryResultEntry>, confidence: f32) -> Self {
        Self { role: Role::Assistant, content: content.into(), sources: Some(sources), confidence: Some(confidence) }
    }

    pub fn confidence_band(&self) -> Option<ConfidenceBand> {
        self.confidence.map(ConfidenceBand::from_score)
    }
}

/// A file that was turned away during ingest, with the error kind and cause.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rejection {
    pub source_name: String,
    pub kind: String,
    pub reason: String,
}

impl fmt::Display for Rejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.source_name, self.reason)
    }
}
