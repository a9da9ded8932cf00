//! Fixed-size overlapping windows over a document's text.
//!
//! Offsets and sizes count Unicode scalar values, so a window never splits a
//! multi-byte character.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{Chunk, Document, DocumentId};

pub const DEFAULT_CHUNK_SIZE: usize = 1000;
pub const DEFAULT_OVERLAP: usize = 150;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self { chunk_size: DEFAULT_CHUNK_SIZE, overlap: DEFAULT_OVERLAP }
    }
}

impl ChunkingConfig {
    pub fn new(chunk_size: usize, overlap: usize) -> Result<Self> {
        let config = Self { chunk_size, overlap };
        config.validate()?;
        Ok(config)
    }

    /// The overlap must stay below half the window.
    pub fn validate(&self) -> Result<()> {
        if self.overlap.saturating_mul(2) >= self.chunk_size {
            return Err(Error::InvalidConfiguration(format!(
                "overlap ({}) must be less than half the chunk size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }
}

/// Split `document` into overlapping windows of at most `chunk_size` characters.
///
/// Every window after the first starts `overlap` characters before the end of
/// the previous one. Empty text yields no chunks.
pub fn split(document: &Document, id: DocumentId, config: &ChunkingConfig) -> Result<Vec<Chunk>> {
    config.validate()?;
    let text = document.text.as_str();
    // Byte offset of every char boundary, including the end of the text.
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(i, _)| i)
        .chain(std::iter::once(text.len()))
        .collect();
    let len = bounds.len() - 1;

    let mut chunks = Vec::new();
    let mut start = 0usize;
    while start < len {
        if !chunks.is_empty() {
            start -= config.overlap;
        }
        let end = (start + config.chunk_size).min(len);
        chunks.push(Chunk {
            text: text[bounds[start]..bounds[end]].to_string(),
            document: id,
            start,
            end,
        });
        start = end;
    }
    Ok(chunks)
}
