//! Fixed-size, overlapping character chunking.
//!
//! A chunk ends at the last `.` inside its window when that falls past the
//! window's midpoint, otherwise at the last space past the midpoint, otherwise
//! at the hard window edge. The next chunk starts `chunk_overlap` characters
//! before the previous end.
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Chunk, ChunkId};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub chunk_overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: 1000, chunk_overlap: 200 }
    }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::InvalidConfig("chunking.chunk_size must be positive".into()));
        }
        if self.chunk_overlap >= self.chunk_size {
            return Err(Error::InvalidConfig(format!(
                "chunking.chunk_overlap ({}) must be smaller than chunking.chunk_size ({})",
                self.chunk_overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkingConfig,
}

impl Chunker {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Split `text` into chunks, numbering them from `*next_id` and advancing
    /// the counter past the last id handed out.
    pub fn chunk(&self, text: &str, source_name: &str, next_id: &mut ChunkId) -> Vec<Chunk> {
        let spans = self.spans(text);
        let total_chunks = spans.len();
        let mut chunks = Vec::with_capacity(total_chunks);
        for (chunk_index, (offset, text)) in spans.into_iter().enumerate() {
            chunks.push(Chunk {
                chunk_id: *next_id,
                source_name: source_name.to_string(),
                text,
                offset,
                chunk_index,
                total_chunks,
            });
            *next_id += 1;
        }
        chunks
    }

    /// `(char offset, trimmed text)` for every non-blank window.
    fn spans(&self, text: &str) -> Vec<(usize, String)> {
        let chars: Vec<char> = text.chars().collect();
        let len = chars.len();
        let size = self.config.chunk_size;
        let mut spans = Vec::new();
        let mut start = 0usize;

        while start < len {
            let mut end = (start + size).min(len);
            if end < len {
                let half = start + size / 2;
                if let Some(dot) = rfind(&chars, start, end, '.').filter(|&p| p > half) {
                    end = dot + 1;
                } else if let Some(space) = rfind(&chars, start, end, ' ').filter(|&p| p > half) {
                    end = space;
                }
            }

            let window = &chars[start..end];
            let leading = window.iter().take_while(|c| c.is_whitespace()).count();
            let body: String = window[leading..].iter().collect();
            let body = body.trim_end();
            if !body.is_empty() {
                spans.push((start + leading, body.to_string()));
            }

            if end >= len {
                break;
            }
            let next = end.saturating_sub(self.config.chunk_overlap);
            start = if next <= start { end } else { next };
        }
        spans
    }
}

fn rfind(chars: &[char], start: usize, end: usize, needle: char) -> Option<usize> {
    chars[start..end].iter().rposition(|&c| c == needle).map(|i| start + i)
}
