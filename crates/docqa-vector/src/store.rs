//! Snapshot persistence.
//!
//! On disk a snapshot is a JSON envelope `{format_version, checksum, payload}`
//! where `checksum` is the BLAKE3 hex digest of the exact payload text.
//! Only chunks and the fitted model are stored; vectors are recomputed on
//! load, which is deterministic.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;
use std::fs;
use std::io::Write;
use std::path::Path;

use docqa_core::error::{Error, Result};
use docqa_core::types::Chunk;
use docqa_embed::TfidfModel;

use crate::snapshot::IndexSnapshot;

pub const SNAPSHOT_FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct PayloadRef<'a> {
    built_at: DateTime<Utc>,
    model: &'a TfidfModel,
    chunks: &'a [Chunk],
}

#[derive(Deserialize)]
struct Payload {
    built_at: DateTime<Utc>,
    model: TfidfModel,
    chunks: Vec<Chunk>,
}

#[derive(Serialize, Deserialize)]
struct Envelope {
    format_version: u32,
    checksum: String,
    payload: Box<RawValue>,
}

fn snapshot_err(e: serde_json::Error) -> Error {
    Error::Snapshot(e.to_string())
}

/// Write `snapshot` to `path` atomically (temp file in the same directory, then rename).
pub fn save_snapshot(snapshot: &IndexSnapshot, path: &Path) -> Result<()> {
    let payload = serde_json::to_string(&PayloadRef {
        built_at: snapshot.built_at(),
        model: snapshot.model(),
        chunks: snapshot.chunks(),
    })
    .map_err(snapshot_err)?;
    let checksum = blake3::hash(payload.as_bytes()).to_hex().to_string();
    let envelope = Envelope {
        format_version: SNAPSHOT_FORMAT_VERSION,
        checksum,
        payload: RawValue::from_string(payload).map_err(snapshot_err)?,
    };
    let body = serde_json::to_vec(&envelope).map_err(snapshot_err)?;

    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(&body)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| Error::Io(e.error))?;

    tracing::info!(path = %path.display(), chunks = snapshot.chunks().len(), bytes = body.len(), "saved index snapshot");
    Ok(())
}

/// Read and verify a snapshot written by [`save_snapshot`].
pub fn load_snapshot(path: &Path) -> Result<IndexSnapshot> {
    let body = fs::read(path)?;
    let envelope: Envelope = serde_json::from_slice(&body).map_err(snapshot_err)?;
    if envelope.format_version != SNAPSHOT_FORMAT_VERSION {
        return Err(Error::Snapshot(format!(
            "unsupported format version {} (expected {})",
            envelope.format_version, SNAPSHOT_FORMAT_VERSION
        )));
    }
    let actual = blake3::hash(envelope.payload.get().as_bytes()).to_hex();
    if actual.as_str() != envelope.checksum {
        return Err(Error::Snapshot(format!("checksum mismatch in {}", path.display())));
    }

    let payload: Payload = serde_json::from_str(envelope.payload.get()).map_err(snapshot_err)?;
    payload.model.validate()?;
    let snapshot = IndexSnapshot::assemble_at(payload.chunks, payload.model, payload.built_at)
        .map_err(|e| Error::Snapshot(format!("invalid snapshot contents: {e}")))?;

    tracing::info!(path = %path.display(), chunks = snapshot.chunks().len(), "loaded index snapshot");
    Ok(snapshot)
}
