use chrono::{DateTime, Utc};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::{Mutex, RwLock};

use docqa_core::config::Settings;
use docqa_core::error::{Error, Result};
use docqa_core::types::{ConfidenceBand, ConversationMessage, QueryResultEntry, SourceDocument};
use docqa_vector::{load_snapshot, save_snapshot, IndexSnapshot};

use crate::confidence::{confidence, distinct_sources};
use crate::generator::{self, AnswerGenerator, ContextPassage};
use crate::ingest::{IngestReport, Ingestor};
use crate::retriever::Retriever;

pub const NO_CONTEXT_ANSWER: &str = "I couldn't find any relevant information in the uploaded documents.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EngineState {
    Empty,
    Ready,
}

impl fmt::Display for EngineState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Empty => "empty",
            Self::Ready => "ready",
        })
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Answer {
    pub query: String,
    pub answer: String,
    pub sources: Vec<QueryResultEntry>,
    pub confidence: f32,
    pub confidence_band: ConfidenceBand,
    pub num_sources: usize,
    pub answered_at: DateTime<Utc>,
}

impl Answer {
    pub fn to_message(&self) -> ConversationMessage {
        ConversationMessage::assistant(self.answer.clone(), self.sources.clone(), self.confidence)
    }
}

/// Zeroed while empty.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EngineStats {
    pub status: EngineState,
    pub chunk_count: usize,
    pub dimension: usize,
    pub approximate_memory_bytes: usize,
    pub document_count: usize,
    pub vocabulary_size: usize,
    pub built_at: Option<DateTime<Utc>>,
}

impl EngineStats {
    fn empty() -> Self {
        Self {
            status: EngineState::Empty,
            chunk_count: 0,
            dimension: 0,
            approximate_memory_bytes: 0,
            document_count: 0,
            vocabulary_size: 0,
            built_at: None,
        }
    }

    fn of(snapshot: &IndexSnapshot) -> Self {
        let index = snapshot.stats();
        Self {
            status: EngineState::Ready,
            chunk_count: index.chunk_count,
            dimension: index.dimension,
            approximate_memory_bytes: index.approximate_memory_bytes,
            document_count: snapshot.documents().len(),
            vocabulary_size: snapshot.model().vocabulary_size(),
            built_at: Some(snapshot.built_at()),
        }
    }
}

/// Owner of the process-wide index.
///
/// Readers clone the active `Arc<IndexSnapshot>` under a short read lock and
/// work on it lock-free, so they always see one complete snapshot. `process`,
/// `clear` and `restore` are serialized by `ingest_gate`; the expensive build
/// runs before the write lock is taken, which only covers the pointer swap.
pub struct RagOrchestrator {
    ingestor: Arc<Ingestor>,
    retriever: Retriever,
    generator: Arc<dyn AnswerGenerator>,
    active: RwLock<Option<Arc<IndexSnapshot>>>,
    ingest_gate: Mutex<()>,
}

impl RagOrchestrator {
    pub fn new(settings: &Settings, generator: Arc<dyn AnswerGenerator>) -> Result<Self> {
        settings.validate()?;
        Ok(Self {
            ingestor: Arc::new(Ingestor::new(settings)?),
            retriever: Retriever::new(settings.retrieval.clone())?,
            generator,
            active: RwLock::new(None),
            ingest_gate: Mutex::new(()),
        })
    }

    /// Orchestrator with the generator named in `settings.generation`.
    pub fn from_settings(settings: &Settings) -> Result<Self> {
        let generator = generator::from_settings(&settings.generation, &settings.retrieval)?;
        Self::new(settings, generator)
    }

    pub async fn state(&self) -> EngineState {
        if self.active.read().await.is_some() { EngineState::Ready } else { EngineState::Empty }
    }

    async fn snapshot(&self) -> Result<Arc<IndexSnapshot>> {
        self.active.read().await.clone().ok_or(Error::NotReady)
    }

    async fn install(&self, snapshot: IndexSnapshot) {
        *self.active.write().await = Some(Arc::new(snapshot));
    }

    /// Replace the index with one built from `documents`.
    ///
    /// Partial success is allowed; when every document is rejected the call
    /// fails and the previous index stays active.
    pub async fn process(&self, documents: Vec<SourceDocument>) -> Result<IngestReport> {
        let _gate = self.ingest_gate.lock().await;
        let started = Instant::now();
        let total = documents.len();
        tracing::info!(documents = total, "processing documents");

        let ingestor = Arc::clone(&self.ingestor);
        let (snapshot, report) = tokio::task::spawn_blocking(move || ingestor.build(&documents))
            .await
            .map_err(|e| Error::processing(format!("ingest task failed: {e}")))??;

        self.install(snapshot).await;
        tracing::info!(
            accepted = report.accepted.len(),
            rejected = report.rejected.len(),
            chunks = report.total_chunks,
            vocabulary = report.vocabulary_size,
            elapsed_ms = started.elapsed().as_millis() as u64,
            "index rebuilt"
        );
        Ok(report)
    }

    /// Ranked passages for `query` without calling the generator.
    pub async fn retrieve(&self, query: &str, k: Option<usize>) -> Result<Vec<QueryResultEntry>> {
        let snapshot = self.snapshot().await?;
        self.retriever.retrieve(&snapshot, query, self.retriever.resolve_k(k))
    }

    /// Answer `query` from the top `k` passages (configured default when `None`).
    pub async fn answer(&self, query: &str, k: Option<usize>) -> Result<Answer> {
        let snapshot = self.snapshot().await?;
        let started = Instant::now();
        let k = self.retriever.resolve_k(k);
        let entries = self.retriever.retrieve(&snapshot, query, k)?;

        if !entries.iter().any(|e| e.similarity_score > 0.0) {
            tracing::debug!(k, "no passage matched the query");
            return Ok(Answer {
                query: query.to_string(),
                answer: NO_CONTEXT_ANSWER.to_string(),
                sources: Vec::new(),
                confidence: 0.0,
                confidence_band: ConfidenceBand::Low,
                num_sources: 0,
                answered_at: Utc::now(),
            });
        }

        let passages: Vec<ContextPassage> = entries
            .iter()
            .filter_map(|e| {
                snapshot.chunk(e.chunk_id).map(|c| ContextPassage {
                    chunk_id: e.chunk_id,
                    source_name: e.source_name.clone(),
                    text: c.text.clone(),
                    similarity_score: e.similarity_score,
                })
            })
            .collect();
        let text = self.generator.generate(query, &passages).await?;

        let confidence = confidence(&entries);
        let answer = Answer {
            query: query.to_string(),
            answer: text,
            num_sources: distinct_sources(&entries),
            confidence,
            confidence_band: ConfidenceBand::from_score(confidence),
            sources: entries,
            answered_at: Utc::now(),
        };
        tracing::debug!(
            k,
            passages = answer.sources.len(),
            confidence = answer.confidence,
            generator = self.generator.name(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "answered query"
        );
        Ok(answer)
    }

    pub async fn clear(&self) {
        let _gate = self.ingest_gate.lock().await;
        *self.active.write().await = None;
        tracing::info!("index cleared");
    }

    pub async fn stats(&self) -> EngineStats {
        match self.active.read().await.as_deref() {
            Some(snapshot) => EngineStats::of(snapshot),
            None => EngineStats::empty(),
        }
    }

    /// Persist the active index to `path`.
    pub async fn save(&self, path: impl AsRef<Path>) -> Result<()> {
        let snapshot = self.snapshot().await?;
        let path: PathBuf = path.as_ref().to_path_buf();
        tokio::task::spawn_blocking(move || save_snapshot(&snapshot, &path))
            .await
            .map_err(|e| Error::Snapshot(format!("save task failed: {e}")))?
    }

    /// Load a saved index and make it active.
    pub async fn restore(&self, path: impl AsRef<Path>) -> Result<EngineStats> {
        let _gate = self.ingest_gate.lock().await;
        let path: PathBuf = path.as_ref().to_path_buf();
        let snapshot = tokio::task::spawn_blocking(move || load_snapshot(&path))
            .await
            .map_err(|e| Error::Snapshot(format!("restore task failed: {e}")))??;
        let stats = EngineStats::of(&snapshot);
        self.install(snapshot).await;
        Ok(stats)
    }
}
