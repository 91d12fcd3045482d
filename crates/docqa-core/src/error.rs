use thiserror::Error;

use crate::types::Rejection;

pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

#[derive(Debug, Error)]
pub enum Error {
    #[error("Unsupported format: {mime_type}")]
    UnsupportedFormat { mime_type: String },

    #[error("Extraction failed: {0}")]
    Extraction(String),

    #[error("{message}")]
    Processing { message: String, rejected: Vec<Rejection> },

    #[error("No documents have been processed yet")]
    NotReady,

    #[error("Similarity index is empty")]
    EmptyIndex,

    #[error("Answer generation failed: {message}")]
    Generation {
        message: String,
        #[source]
        source: BoxError,
    },

    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Vector dimension mismatch: expected {expected}, got {actual}")]
    DimensionMismatch { expected: usize, actual: usize },

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Snapshot error: {0}")]
    Snapshot(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Stable machine-readable name of the variant.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::UnsupportedFormat { .. } => "unsupported_format",
            Self::Extraction(_) => "extraction",
            Self::Processing { .. } => "processing",
            Self::NotReady => "not_ready",
            Self::EmptyIndex => "empty_index",
            Self::Generation { .. } => "generation",
            Self::InvalidQuery(_) => "invalid_query",
            Self::DimensionMismatch { .. } => "dimension_mismatch",
            Self::InvalidConfig(_) => "invalid_config",
            Self::Snapshot(_) => "snapshot",
            Self::Io(_) => "io",
        }
    }

    /// Whole-ingest failure: none of `total` files produced any chunks.
    pub fn all_rejected(total: usize, rejected: Vec<Rejection>) -> Self {
        let message = if total == 0 {
            "No documents were provided".to_string()
        } else {
            let details = rejected.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ");
            format!("{} of {} files failed: {}", rejected.len(), total, details)
        };
        Self::Processing { message, rejected }
    }

    /// Ingest failure that is not attributable to a single file.
    pub fn processing(message: impl Into<String>) -> Self {
        Self::Processing { message: message.into(), rejected: Vec::new() }
    }

    pub fn generation(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self::Generation { message: message.into(), source: source.into() }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
