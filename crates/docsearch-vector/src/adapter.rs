//! Wraps an [`Embedder`] and enforces its contract on every call.
//!
//! Embedder output is checked rather than trusted: a wrong vector count or a
//! vector whose length differs from `dim()` is an `EmbeddingFailure`, never
//! padded or truncated.

use std::sync::Arc;

use docsearch_core::traits::Embedder;
use docsearch_core::{Error, Result};

#[derive(Clone)]
pub struct EmbeddingAdapter {
    inner: Arc<dyn Embedder>,
    dim: usize,
}

impl EmbeddingAdapter {
    pub fn new(inner: Arc<dyn Embedder>) -> Self {
        let dim = inner.dim();
        Self { inner, dim }
    }

    /// Embedding dimensionality (D), fixed for the adapter's lifetime.
    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        let vector = self
            .inner
            .embed(text)
            .map_err(|e| Error::EmbeddingFailure(format!("{e:#}")))?;
        self.check_dim(&vector, 0)?;
        Ok(vector)
    }

    /// Embed `texts` in one call to the underlying embedder, preserving order.
    pub fn embed_many(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let vectors = self
            .inner
            .embed_batch(texts)
            .map_err(|e| Error::EmbeddingFailure(format!("{e:#}")))?;
        if vectors.len() != texts.len() {
            return Err(Error::EmbeddingFailure(format!(
                "embedder returned {} vectors for {} texts",
                vectors.len(),
                texts.len()
            )));
        }
        for (i, v) in vectors.iter().enumerate() {
            self.check_dim(v, i)?;
        }
        Ok(vectors)
    }

    fn check_dim(&self, vector: &[f32], position: usize) -> Result<()> {
        if vector.len() != self.dim {
            return Err(Error::EmbeddingFailure(format!(
                "vector {position} has dimension {}, expected {}",
                vector.len(),
                self.dim
            )));
        }
        Ok(())
    }
}

impl std::fmt::Debug for EmbeddingAdapter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmbeddingAdapter").field("dim", &self.dim).finish_non_exhaustive()
    }
}
