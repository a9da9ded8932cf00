#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use docsearch_core::traits::Embedder;
use docsearch_core::types::Document;
use docsearch_embed::FakeEmbedder;
use docsearch_vector::EmbeddingAdapter;

/// Counts occurrences of fixed keywords; vectors are deliberately not normalized.
pub struct KeywordEmbedder;

pub const KEYWORDS: [&str; 3] = ["alpha", "beta", "gamma"];

impl Embedder for KeywordEmbedder {
    fn dim(&self) -> usize {
        KEYWORDS.len()
    }

    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts
            .iter()
            .map(|t| {
                KEYWORDS
                    .iter()
                    .map(|k| t.split_whitespace().filter(|w| w == k).count() as f32)
                    .collect()
            })
            .collect())
    }
}

/// Wraps another embedder and counts batch calls.
pub struct CountingEmbedder<E> {
    pub inner: E,
    pub batch_calls: AtomicUsize,
}

impl<E> CountingEmbedder<E> {
    pub fn new(inner: E) -> Self {
        Self { inner, batch_calls: AtomicUsize::new(0) }
    }

    pub fn calls(&self) -> usize {
        self.batch_calls.load(Ordering::SeqCst)
    }
}

impl<E: Embedder> Embedder for CountingEmbedder<E> {
    fn dim(&self) -> usize {
        self.inner.dim()
    }

    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        self.batch_calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed_batch(texts)
    }
}

/// Fails whenever an input mentions `FAIL`.
pub struct FailingEmbedder;

impl Embedder for FailingEmbedder {
    fn dim(&self) -> usize {
        KEYWORDS.len()
    }

    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        if texts.iter().any(|t| t.contains("FAIL")) {
            anyhow::bail!("model refused input");
        }
        KeywordEmbedder.embed_batch(texts)
    }
}

/// Claims one dimension but produces another.
pub struct WrongDimEmbedder;

impl Embedder for WrongDimEmbedder {
    fn dim(&self) -> usize {
        4
    }

    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|_| vec![0.5; 5]).collect())
    }
}

/// Drops the first vector of every batch.
pub struct ShortEmbedder;

impl Embedder for ShortEmbedder {
    fn dim(&self) -> usize {
        KEYWORDS.len()
    }

    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        let mut vectors = KeywordEmbedder.embed_batch(texts)?;
        if !vectors.is_empty() {
            vectors.remove(0);
        }
        Ok(vectors)
    }
}

pub fn adapter<E: Embedder + 'static>(embedder: E) -> EmbeddingAdapter {
    EmbeddingAdapter::new(Arc::new(embedder))
}

pub fn fake_adapter(dim: usize) -> EmbeddingAdapter {
    adapter(FakeEmbedder::new(dim))
}

pub fn keyword_docs() -> Vec<Document> {
    ["alpha beta", "alpha alpha", "gamma", "alpha gamma", "beta"]
        .iter()
        .enumerate()
        .map(|(i, t)| Document::from_file(format!("doc_{i}.txt"), *t))
        .collect()
}

pub fn prose_docs() -> Vec<Document> {
    let a = "hello world, this is the first document about solar panels and batteries. ".repeat(40);
    let b = "the second document talks about rainwater collection and filtering. ".repeat(25);
    vec![Document::from_file("doc_a.txt", a), Document::from_file("doc_b.txt", b)]
}
