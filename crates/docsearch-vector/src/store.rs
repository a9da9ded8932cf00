use std::path::Path;

use docsearch_core::chunker::ChunkingConfig;
use docsearch_core::types::{Document, SearchLimit, SearchResult};
use docsearch_core::{Error, Result};

use crate::adapter::EmbeddingAdapter;
use crate::index::{BuildProgress, VectorIndex};

/// Owns the embedding adapter, the chunking parameters and the live index.
///
/// The live index is replaced only by a build or load that fully succeeds;
/// on any error the previous index stays in place untouched.
#[derive(Debug)]
pub struct IndexStore {
    adapter: EmbeddingAdapter,
    chunking: ChunkingConfig,
    index: Option<VectorIndex>,
}

impl IndexStore {
    pub fn new(adapter: EmbeddingAdapter, chunking: ChunkingConfig) -> Result<Self> {
        chunking.validate()?;
        Ok(Self { adapter, chunking, index: None })
    }

    pub fn build(&mut self, documents: Vec<Document>) -> Result<()> {
        self.build_with_progress(documents, |_| {})
    }

    pub fn build_with_progress<F>(&mut self, documents: Vec<Document>, on_document: F) -> Result<()>
    where
        F: FnMut(&BuildProgress),
    {
        let index = VectorIndex::build_with_progress(documents, &self.adapter, &self.chunking, on_document)?;
        self.index = Some(index);
        Ok(())
    }

    pub fn search(&self, query: &str, limit: impl Into<SearchLimit>) -> Result<Vec<SearchResult<'_>>> {
        let index = self.index.as_ref().ok_or(Error::EmptyIndex)?;
        index.search(&self.adapter, query, limit.into())
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        self.index.as_ref().ok_or(Error::EmptyIndex)?.save(dir)
    }

    /// Replace the live index with the one saved in `dir`.
    pub fn load(&mut self, dir: &Path) -> Result<()> {
        let index = VectorIndex::load(dir)?;
        if index.dim() != self.adapter.dim() {
            return Err(Error::corrupt(
                dir,
                format!(
                    "index was built with dimension {}, embedder produces {}",
                    index.dim(),
                    self.adapter.dim()
                ),
            ));
        }
        self.index = Some(index);
        Ok(())
    }

    /// Open a store whose live index is read from `dir`.
    pub fn open(adapter: EmbeddingAdapter, chunking: ChunkingConfig, dir: &Path) -> Result<Self> {
        let mut store = Self::new(adapter, chunking)?;
        store.load(dir)?;
        Ok(store)
    }

    pub fn index(&self) -> Option<&VectorIndex> {
        self.index.as_ref()
    }

    pub fn adapter(&self) -> &EmbeddingAdapter {
        &self.adapter
    }

    pub fn chunking(&self) -> &ChunkingConfig {
        &self.chunking
    }
}
