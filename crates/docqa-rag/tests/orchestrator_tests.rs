use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use docqa_core::config::Settings;
use docqa_core::error::{Error, Result};
use docqa_core::types::{ConfidenceBand, SourceDocument};
use docqa_rag::{AnswerGenerator, ContextPassage, EngineState, ExtractiveGenerator, RagOrchestrator, NO_CONTEXT_ANSWER};
use tempfile::tempdir;

/// Records every call and answers with a fixed string.
#[derive(Default)]
struct RecordingGenerator {
    calls: Mutex<Vec<(String, Vec<ContextPassage>)>>,
}

impl RecordingGenerator {
    fn calls(&self) -> Vec<(String, Vec<ContextPassage>)> {
        self.calls.lock().map(|c| c.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl AnswerGenerator for RecordingGenerator {
    fn name(&self) -> &str {
        "recording"
    }

    async fn generate(&self, query: &str, passages: &[ContextPassage]) -> Result<String> {
        if let Ok(mut calls) = self.calls.lock() {
            calls.push((query.to_string(), passages.to_vec()));
        }
        Ok("recorded answer".to_string())
    }
}

struct FailingGenerator;

#[async_trait]
impl AnswerGenerator for FailingGenerator {
    fn name(&self) -> &str {
        "failing"
    }

    async fn generate(&self, _query: &str, _passages: &[ContextPassage]) -> Result<String> {
        Err(Error::generation("HTTP 429", "rate limited"))
    }
}

fn txt(name: &str, body: &str) -> SourceDocument {
    SourceDocument::new(name, "text/plain", body.as_bytes().to_vec())
}

fn extractive() -> RagOrchestrator {
    let settings = Settings::default();
    RagOrchestrator::new(&settings, Arc::new(ExtractiveGenerator::new(settings.retrieval.preview_chars)))
        .expect("orchestrator")
}

fn corpus() -> Vec<SourceDocument> {
    vec![
        txt("pets.txt", "Cats are mammals. Dogs are also mammals."),
        txt("solar.txt", "Solar panels convert sunlight into electricity for the cabin."),
        txt("water.txt", "Rainwater barrels store water for the garden beds."),
        txt("batteries.txt", "Lead acid batteries store electricity from solar panels overnight."),
    ]
}

#[tokio::test]
async fn cats_and_dogs_scenario() {
    let rag = extractive();
    let report = rag.process(vec![txt("pets.txt", "Cats are mammals. Dogs are also mammals.")]).await.expect("process");
    assert_eq!(report.total_chunks, 1);
    assert_eq!(rag.state().await, EngineState::Ready);

    let answer = rag.answer("What are dogs?", None).await.expect("answer");
    assert_eq!(answer.sources.len(), 1);
    let top = &answer.sources[0];
    assert_eq!(top.chunk_id, 0);
    assert_eq!(top.source_name, "pets.txt");
    assert!(top.similarity_score > 0.0);
    assert!((answer.confidence - top.similarity_score).abs() < 1e-6);
    assert_eq!(answer.confidence_band, ConfidenceBand::from_score(answer.confidence));
    assert_eq!(answer.num_sources, 1);
    assert_eq!(answer.answer, "Based on 'pets.txt':\n\nCats are mammals. Dogs are also mammals.");
    assert_eq!(answer.to_message().confidence_band(), Some(answer.confidence_band));
}

#[tokio::test]
async fn answer_before_process_is_not_ready() {
    let rag = extractive();
    assert_eq!(rag.state().await, EngineState::Empty);
    assert!(matches!(rag.answer("anything", None).await, Err(Error::NotReady)));
    assert!(matches!(rag.retrieve("anything", Some(3)).await, Err(Error::NotReady)));
    assert!(matches!(rag.save(tempdir().expect("tmp").path().join("x.json")).await, Err(Error::NotReady)));
}

#[tokio::test]
async fn all_rejected_leaves_state_unchanged() {
    let rag = extractive();
    let err = rag
        .process(vec![
            SourceDocument::new("scan.png", "image/png", vec![0x89, b'P', b'N', b'G']),
            SourceDocument::new("broken.pdf", "application/pdf", b"%PDF-1.4 garbage".to_vec()),
        ])
        .await
        .expect_err("all rejected");
    match &err {
        Error::Processing { rejected, .. } => {
            assert_eq!(rejected.len(), 2);
            assert_eq!(rejected[0].kind, "unsupported_format");
            assert_eq!(rejected[1].kind, "extraction");
        }
        other => panic!("expected processing error, got {other:?}"),
    }
    assert!(err.to_string().starts_with("2 of 2 files failed: scan.png"));
    assert!(matches!(rag.answer("dogs", None).await, Err(Error::NotReady)));

    // A ready index also survives a fully rejected batch.
    rag.process(corpus()).await.expect("process");
    let before = rag.stats().await;
    assert!(rag.process(vec![txt("blank.txt", "")]).await.is_err());
    assert_eq!(rag.stats().await, before);
}

#[tokio::test]
async fn empty_document_set_is_a_processing_error() {
    let rag = extractive();
    let err = rag.process(Vec::new()).await.expect_err("nothing to ingest");
    assert_eq!(err.kind(), "processing");
    assert_eq!(err.to_string(), "No documents were provided");
}

#[tokio::test]
async fn partial_success_reports_each_file() {
    let rag = extractive();
    let mut docs = corpus();
    docs.push(SourceDocument::new("notes.rtf", "application/rtf", b"{\\rtf1}".to_vec()));
    let report = rag.process(docs).await.expect("process");
    assert_eq!(report.accepted.len(), 4);
    assert_eq!(report.rejected.len(), 1);
    assert_eq!(report.rejected[0].source_name, "notes.rtf");
    assert_eq!(report.dimension, 384);
}

#[tokio::test]
async fn retrieval_is_ranked_and_clamped() {
    let rag = extractive();
    rag.process(corpus()).await.expect("process");

    let entries = rag.retrieve("solar panels electricity", Some(50)).await.expect("retrieve");
    assert_eq!(entries.len(), 4, "k is clamped to the index size");
    for pair in entries.windows(2) {
        let (a, b) = (&pair[0], &pair[1]);
        assert!(a.similarity_score >= b.similarity_score);
        if a.similarity_score == b.similarity_score {
            assert!(a.chunk_id < b.chunk_id);
        }
    }
    assert!(entries.iter().all(|e| (0.0..=1.0).contains(&e.similarity_score)));
    assert!(["solar.txt", "batteries.txt"].contains(&entries[0].source_name.as_str()));

    assert_eq!(rag.retrieve("solar", Some(2)).await.expect("retrieve").len(), 2);
    assert!(matches!(rag.retrieve("   ", None).await, Err(Error::InvalidQuery(_))));
}

#[tokio::test]
async fn unmatched_query_skips_generator() {
    let generator = Arc::new(RecordingGenerator::default());
    let rag = RagOrchestrator::new(&Settings::default(), generator.clone()).expect("orchestrator");
    rag.process(corpus()).await.expect("process");

    let answer = rag.answer("quantum chromodynamics", None).await.expect("answer");
    assert_eq!(answer.answer, NO_CONTEXT_ANSWER);
    assert_eq!(answer.confidence, 0.0);
    assert_eq!(answer.confidence_band, ConfidenceBand::Low);
    assert!(answer.sources.is_empty());
    assert!(generator.calls().is_empty());
}

#[tokio::test]
async fn generator_sees_passages_most_relevant_first() {
    let generator = Arc::new(RecordingGenerator::default());
    let rag = RagOrchestrator::new(&Settings::default(), generator.clone()).expect("orchestrator");
    rag.process(corpus()).await.expect("process");

    let answer = rag.answer("store electricity", Some(3)).await.expect("answer");
    assert_eq!(answer.answer, "recorded answer");

    let calls = generator.calls();
    assert_eq!(calls.len(), 1);
    let (query, passages) = &calls[0];
    assert_eq!(query, "store electricity");
    assert_eq!(passages.len(), answer.sources.len());
    for (p, s) in passages.iter().zip(&answer.sources) {
        assert_eq!(p.chunk_id, s.chunk_id);
    }
    assert_eq!(passages[0].source_name, "batteries.txt");
    assert!(passages[0].text.contains("Lead acid batteries"));
}

#[tokio::test]
async fn generator_failure_is_surfaced_with_cause() {
    let rag = RagOrchestrator::new(&Settings::default(), Arc::new(FailingGenerator)).expect("orchestrator");
    rag.process(corpus()).await.expect("process");
    let err = rag.answer("solar panels", None).await.expect_err("generator fails");
    assert_eq!(err.kind(), "generation");
    assert_eq!(std::error::Error::source(&err).map(ToString::to_string).as_deref(), Some("rate limited"));
    assert_eq!(rag.state().await, EngineState::Ready);
}

#[tokio::test]
async fn clear_and_reprocess_is_idempotent() {
    let rag = extractive();
    rag.process(corpus()).await.expect("process");
    let first = rag.stats().await;
    assert_eq!(first.status, EngineState::Ready);
    assert_eq!(first.document_count, 4);
    assert!(first.vocabulary_size > 0);

    rag.clear().await;
    let cleared = rag.stats().await;
    assert_eq!(cleared.status, EngineState::Empty);
    assert_eq!(cleared.chunk_count, 0);
    assert!(matches!(rag.answer("solar", None).await, Err(Error::NotReady)));

    rag.process(corpus()).await.expect("process");
    let second = rag.stats().await;
    assert_eq!(second.chunk_count, first.chunk_count);
    assert_eq!(second.dimension, first.dimension);
    assert_eq!(second.vocabulary_size, first.vocabulary_size);
}

#[tokio::test]
async fn save_and_restore_round_trip() {
    let dir = tempdir().expect("tempdir");
    let path = dir.path().join("index/docqa.snapshot.json");

    let rag = extractive();
    rag.process(corpus()).await.expect("process");
    let expected = rag.retrieve("garden water", Some(3)).await.expect("retrieve");
    rag.save(&path).await.expect("save");

    let fresh = extractive();
    let stats = fresh.restore(&path).await.expect("restore");
    assert_eq!(stats.status, EngineState::Ready);
    assert_eq!(stats, rag.stats().await);
    assert_eq!(fresh.retrieve("garden water", Some(3)).await.expect("retrieve"), expected);
}

#[tokio::test]
async fn readers_run_alongside_rebuilds() {
    let rag = Arc::new(extractive());
    rag.process(corpus()).await.expect("process");

    let mut tasks = Vec::new();
    for i in 0..8 {
        let rag = Arc::clone(&rag);
        tasks.push(tokio::spawn(async move {
            if i % 4 == 0 {
                rag.process(corpus()).await.map(|r| r.total_chunks)
            } else {
                rag.answer("solar electricity", Some(2)).await.map(|a| a.sources.len())
            }
        }));
    }
    for result in futures::future::join_all(tasks).await {
        let n = result.expect("task").expect("operation");
        assert!(n > 0);
    }
    assert_eq!(rag.stats().await.chunk_count, 4);
}
