use std::fs;
use std::path::{Path, PathBuf};

use anyhow::Result;
use indicatif::{ProgressBar, ProgressStyle};
use walkdir::WalkDir;

use docqa_core::error::Error;
use docqa_core::types::{Rejection, SourceDocument};
use docqa_extract::mime_for_path;
use docqa_rag::{IngestReport, RagOrchestrator};

/// Files under `roots` whose extension is in `allowed` (case-insensitive),
/// sorted for a stable ingest order. Explicitly named files are kept as-is so
/// unsupported ones surface as per-file rejections.
pub fn collect_paths(roots: &[PathBuf], allowed: &[String]) -> Vec<PathBuf> {
    let mut out = Vec::new();
    for root in roots {
        if root.is_file() {
            out.push(root.clone());
            continue;
        }
        let mut found: Vec<PathBuf> = WalkDir::new(root)
            .into_iter()
            .filter_map(|e| e.ok())
            .filter(|e| e.file_type().is_file())
            .map(|e| e.into_path())
            .filter(|p| has_allowed_extension(p, allowed))
            .collect();
        found.sort();
        out.extend(found);
    }
    out
}

fn has_allowed_extension(path: &Path, allowed: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| allowed.iter().any(|a| a.eq_ignore_ascii_case(ext)))
}

/// Documents read from disk plus the files that could not be loaded.
#[derive(Debug, Default)]
pub struct ReadOutcome {
    pub documents: Vec<SourceDocument>,
    pub rejected: Vec<Rejection>,
}

/// Read every path into a [`SourceDocument`] named by its file name, with the
/// MIME type implied by the extension.
///
/// Unreadable files and files over `max_file_bytes` become rejections; the
/// size check uses file metadata so oversized files are never loaded.
pub fn read_documents(paths: &[PathBuf], max_file_bytes: usize) -> Result<ReadOutcome> {
    let pb = ProgressBar::new(paths.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} files {msg}")?
            .progress_chars("#>-"),
    );
    let mut out = ReadOutcome { documents: Vec::with_capacity(paths.len()), rejected: Vec::new() };
    for path in paths {
        let name = path.file_name().map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());
        pb.set_message(name.clone());
        match read_one(path, max_file_bytes) {
            Ok(bytes) => out.documents.push(SourceDocument::new(name, mime_for_path(path), bytes)),
            Err(e) => {
                tracing::warn!(path = %path.display(), kind = e.kind(), error = %e, "file skipped");
                out.rejected.push(Rejection { source_name: name, kind: e.kind().to_string(), reason: e.to_string() });
            }
        }
        pb.inc(1);
    }
    pb.finish_and_clear();
    Ok(out)
}

fn read_one(path: &Path, max_file_bytes: usize) -> docqa_core::Result<Vec<u8>> {
    let len = fs::metadata(path)?.len();
    if len > max_file_bytes as u64 {
        return Err(Error::Extraction(format!("file is {len} bytes, larger than the {max_file_bytes} byte limit")));
    }
    Ok(fs::read(path)?)
}

/// Read `paths` and index everything readable. Files rejected while reading
/// are merged into the report; if nothing is usable the call fails with
/// [`Error::Processing`] listing every file.
pub async fn ingest_paths(rag: &RagOrchestrator, paths: &[PathBuf], max_file_bytes: usize) -> Result<IngestReport> {
    let ReadOutcome { documents, rejected } = read_documents(paths, max_file_bytes)?;
    if documents.is_empty() {
        return Err(Error::all_rejected(paths.len(), rejected).into());
    }
    match rag.process(documents).await {
        Ok(mut report) => {
            report.rejected.extend(rejected);
            Ok(report)
        }
        Err(Error::Processing { rejected: failed, .. }) => {
            let mut all = rejected;
            all.extend(failed);
            Err(Error::all_rejected(paths.len(), all).into())
        }
        Err(e) => Err(e.into()),
    }
}
