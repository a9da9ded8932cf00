//! An index handle that many threads can search while another rebuilds it.
//!
//! The live index is an `Arc` snapshot. Searches clone the snapshot and run
//! without holding the lock; a rebuild assembles a fresh index outside the
//! lock and swaps it in only once it is complete.

use std::path::Path;
use std::sync::{Arc, PoisonError, RwLock};

use docsearch_core::chunker::ChunkingConfig;
use docsearch_core::types::{Document, SearchLimit, SearchResult};
use docsearch_core::{Error, Result};

use crate::adapter::EmbeddingAdapter;
use crate::index::VectorIndex;

pub struct SharedIndex {
    adapter: EmbeddingAdapter,
    chunking: ChunkingConfig,
    live: RwLock<Option<Arc<VectorIndex>>>,
}

impl SharedIndex {
    pub fn new(adapter: EmbeddingAdapter, chunking: ChunkingConfig) -> Result<Self> {
        chunking.validate()?;
        Ok(Self { adapter, chunking, live: RwLock::new(None) })
    }

    /// The index currently being served.
    pub fn snapshot(&self) -> Result<Arc<VectorIndex>> {
        self.live
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(Error::EmptyIndex)
    }

    pub fn rebuild(&self, documents: Vec<Document>) -> Result<()> {
        let index = VectorIndex::build(documents, &self.adapter, &self.chunking)?;
        self.publish(index);
        Ok(())
    }

    pub fn load(&self, dir: &Path) -> Result<()> {
        let index = VectorIndex::load(dir)?;
        if index.dim() != self.adapter.dim() {
            return Err(Error::corrupt(
                dir,
                format!("index dimension {} does not match embedder dimension {}", index.dim(), self.adapter.dim()),
            ));
        }
        self.publish(index);
        Ok(())
    }

    /// Search the current snapshot and hand the borrowed results to `f`.
    pub fn search_with<R, F>(&self, query: &str, limit: impl Into<SearchLimit>, f: F) -> Result<R>
    where
        F: FnOnce(&VectorIndex, &[SearchResult<'_>]) -> R,
    {
        let index = self.snapshot()?;
        let results = index.search(&self.adapter, query, limit.into())?;
        Ok(f(&index, &results))
    }

    fn publish(&self, index: VectorIndex) {
        let mut live = self.live.write().unwrap_or_else(PoisonError::into_inner);
        *live = Some(Arc::new(index));
    }
}
