use std::env;
use std::path::PathBuf;

use anyhow::{bail, Context};

use docqa_cli::{files, logging};
use docqa_core::config::{expand_path, resolve_with_base, Config};
use docqa_rag::{EngineState, RagOrchestrator};

const USAGE: &str = "Usage: docqa <ingest <paths...>|ask \"<question>\" [k]|search \"<query>\" [k]|stats|clear>";

fn parse_args() -> (String, Vec<String>) {
    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("{USAGE}");
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    (cmd, args)
}

fn parse_k(arg: Option<&String>) -> anyhow::Result<Option<usize>> {
    arg.map(|s| s.parse::<usize>().with_context(|| format!("k must be a positive number, got '{s}'")))
        .transpose()
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init();
    let settings = Config::load().and_then(|c| c.settings()).context("loading configuration")?;
    // config.toml is read from the working directory, so relative storage paths are too.
    let base = env::current_dir().context("resolving working directory")?;
    let snapshot_path = resolve_with_base(&base, &settings.storage.snapshot_path);
    let (cmd, args) = parse_args();
    tracing::debug!(command = %cmd, snapshot = %snapshot_path.display(), provider = ?settings.generation.provider, "starting");
    let rag = RagOrchestrator::from_settings(&settings)?;

    match cmd.as_str() {
        "ingest" => {
            if args.is_empty() {
                bail!("{USAGE}");
            }
            let roots: Vec<PathBuf> = args.iter().map(expand_path).collect();
            let paths = files::collect_paths(&roots, &settings.ingest.allowed_extensions);
            println!("Ingesting {} files", paths.len());
            let report = files::ingest_paths(&rag, &paths, settings.ingest.max_file_bytes).await?;
            for doc in &report.accepted {
                println!("  ok     {} ({} chunks)", doc.source_name, doc.chunk_count);
            }
            for r in &report.rejected {
                println!("  failed {} [{}]: {}", r.source_name, r.kind, r.reason);
            }
            rag.save(&snapshot_path).await?;
            println!(
                "Indexed {} chunks from {} documents (vocabulary {}, dimension {}) -> {}",
                report.total_chunks,
                report.accepted.len(),
                report.vocabulary_size,
                report.dimension,
                snapshot_path.display()
            );
        }
        "ask" | "search" => {
            let Some(query) = args.first() else { bail!("{USAGE}") };
            let k = parse_k(args.get(1))?;
            rag.restore(&snapshot_path)
                .await
                .with_context(|| format!("no usable index at {}; run `docqa ingest` first", snapshot_path.display()))?;
            if cmd == "ask" {
                let answer = rag.answer(query, k).await?;
                println!("{}\n", answer.answer);
                println!("Confidence: {:.2} ({})", answer.confidence, answer.confidence_band);
                for (i, s) in answer.sources.iter().enumerate() {
                    println!("[{}] {} (score {:.3}): {}", i + 1, s.source_name, s.similarity_score, s.preview);
                }
            } else {
                for (i, s) in rag.retrieve(query, k).await?.iter().enumerate() {
                    println!("{}. #{} {} (score {:.3})\n   {}", i + 1, s.chunk_id, s.source_name, s.similarity_score, s.preview);
                }
            }
        }
        "stats" => {
            if snapshot_path.exists() {
                rag.restore(&snapshot_path).await?;
            }
            let stats = rag.stats().await;
            println!("status:        {}", stats.status);
            println!("documents:     {}", stats.document_count);
            println!("chunks:        {}", stats.chunk_count);
            println!("dimension:     {}", stats.dimension);
            println!("vocabulary:    {}", stats.vocabulary_size);
            println!("memory (est.): {} bytes", stats.approximate_memory_bytes);
            if let (EngineState::Ready, Some(at)) = (stats.status, stats.built_at) {
                println!("built at:      {}", at.to_rfc3339());
            }
        }
        "clear" => {
            rag.clear().await;
            if snapshot_path.exists() {
                std::fs::remove_file(&snapshot_path)
                    .with_context(|| format!("removing {}", snapshot_path.display()))?;
            }
            println!("Index cleared");
        }
        _ => {
            eprintln!("Unknown command: {cmd}\n{USAGE}");
            std::process::exit(1);
        }
    }
    Ok(())
}
