use ndarray::{Array2, ArrayView1};
use std::path::Path;

use docsearch_core::chunker::{self, ChunkingConfig};
use docsearch_core::types::{Chunk, Document, DocumentId, SearchLimit, SearchResult};
use docsearch_core::{Error, Result};

use crate::adapter::EmbeddingAdapter;
use crate::codec;

/// An immutable, fully built index.
///
/// `vectors` has one row per chunk: row `i` is the embedding of `chunks[i]`.
/// The two are only ever produced together, by [`VectorIndex::build`] or by
/// loading a saved index.
#[derive(Debug, Clone, PartialEq)]
pub struct VectorIndex {
    documents: Vec<Document>,
    chunks: Vec<Chunk>,
    vectors: Array2<f32>,
}

/// Reported once per document while building.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildProgress {
    pub document: usize,
    pub total_documents: usize,
    pub chunks: usize,
}

impl VectorIndex {
    pub fn build(documents: Vec<Document>, adapter: &EmbeddingAdapter, chunking: &ChunkingConfig) -> Result<Self> {
        Self::build_with_progress(documents, adapter, chunking, |_| {})
    }

    /// Split each document in order, embed its chunks with one batch call,
    /// and append chunks and vectors in lock-step.
    pub fn build_with_progress<F>(
        documents: Vec<Document>,
        adapter: &EmbeddingAdapter,
        chunking: &ChunkingConfig,
        mut on_document: F,
    ) -> Result<Self>
    where
        F: FnMut(&BuildProgress),
    {
        chunking.validate()?;
        let dim = adapter.dim();
        let total_documents = documents.len();
        let mut chunks: Vec<Chunk> = Vec::new();
        let mut flat: Vec<f32> = Vec::new();

        for (i, document) in documents.iter().enumerate() {
            let doc_chunks = chunker::split(document, DocumentId(i), chunking)?;
            let texts: Vec<String> = doc_chunks.iter().map(|c| c.text.clone()).collect();
            let vectors = adapter.embed_many(&texts)?;
            for v in &vectors {
                flat.extend_from_slice(v);
            }
            tracing::debug!(document = i, chunks = doc_chunks.len(), "document embedded");
            on_document(&BuildProgress { document: i, total_documents, chunks: doc_chunks.len() });
            chunks.extend(doc_chunks);
        }

        let vectors = Array2::from_shape_vec((chunks.len(), dim), flat)
            .map_err(|e| Error::EmbeddingFailure(format!("vector matrix shape: {e}")))?;
        tracing::info!(documents = total_documents, chunks = chunks.len(), dim, "index built");
        Ok(Self { documents, chunks, vectors })
    }

    /// Assemble an index from already-paired parts, checking the invariants
    /// that tie them together.
    pub fn from_parts(
        documents: Vec<Document>,
        chunks: Vec<Chunk>,
        vectors: Array2<f32>,
    ) -> std::result::Result<Self, String> {
        if vectors.nrows() != chunks.len() {
            return Err(format!(
                "vector matrix has {} rows but there are {} chunks",
                vectors.nrows(),
                chunks.len()
            ));
        }
        if let Some((i, c)) = chunks.iter().enumerate().find(|(_, c)| c.document.index() >= documents.len()) {
            return Err(format!(
                "chunk {i} references {} but only {} documents exist",
                c.document,
                documents.len()
            ));
        }
        Ok(Self { documents, chunks, vectors })
    }

    /// Embed `query` and rank every chunk against it.
    pub fn search(
        &self,
        adapter: &EmbeddingAdapter,
        query: &str,
        limit: SearchLimit,
    ) -> Result<Vec<SearchResult<'_>>> {
        let query_vec = adapter.embed_one(query)?;
        self.rank(&query_vec, limit)
    }

    /// Score every chunk with `dot(query_vec, chunk_vec)` and return them by
    /// descending score. The sort is stable, so ties keep insertion order.
    pub fn rank(&self, query_vec: &[f32], limit: SearchLimit) -> Result<Vec<SearchResult<'_>>> {
        if query_vec.len() != self.dim() {
            return Err(Error::EmbeddingFailure(format!(
                "query vector has dimension {}, index has {}",
                query_vec.len(),
                self.dim()
            )));
        }
        let scores = self.vectors.dot(&ArrayView1::from(query_vec));
        let mut order: Vec<usize> = (0..self.chunks.len()).collect();
        order.sort_by(|&a, &b| scores[b].total_cmp(&scores[a]));
        Ok(order
            .into_iter()
            .take(limit.apply(self.chunks.len()))
            .map(|i| SearchResult { chunk: &self.chunks[i], score: scores[i] })
            .collect())
    }

    pub fn save(&self, dir: &Path) -> Result<()> {
        codec::save(self, dir)
    }

    pub fn load(dir: &Path) -> Result<Self> {
        codec::load(dir)
    }

    pub fn documents(&self) -> &[Document] {
        &self.documents
    }

    pub fn chunks(&self) -> &[Chunk] {
        &self.chunks
    }

    pub fn vectors(&self) -> &Array2<f32> {
        &self.vectors
    }

    pub fn vector(&self, chunk: usize) -> Option<&[f32]> {
        if chunk >= self.chunks.len() {
            return None;
        }
        let dim = self.dim();
        self.vectors.as_slice().map(|all| &all[chunk * dim..(chunk + 1) * dim])
    }

    pub fn document(&self, id: DocumentId) -> Option<&Document> {
        self.documents.get(id.index())
    }

    /// The document a chunk was cut from.
    pub fn parent(&self, chunk: &Chunk) -> Option<&Document> {
        self.document(chunk.document)
    }

    pub fn dim(&self) -> usize {
        self.vectors.ncols()
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }
}
