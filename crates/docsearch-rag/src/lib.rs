//! docsearch-rag
//!
//! Retrieval-augmented answering: the best matching excerpt from an
//! [`IndexStore`] becomes the context an [`Answerer`] responds from.

use anyhow::Result;

use docsearch_core::traits::Answerer;
use docsearch_core::types::{Document, SearchResult};
use docsearch_core::Error;
use docsearch_vector::IndexStore;

mod answer;

pub use answer::ExtractiveAnswerer;

/// A retrieved chunk, detached from the index it came from.
#[derive(Debug, Clone, PartialEq)]
pub struct Excerpt {
    pub text: String,
    pub score: f32,
    pub source: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RagAnswer {
    pub answer: String,
    pub context: Excerpt,
}

pub struct RagModel<A = ExtractiveAnswerer> {
    store: IndexStore,
    answerer: A,
}

impl<A: Answerer> RagModel<A> {
    pub fn new(store: IndexStore, answerer: A) -> Self { Self { store, answerer } }

    /// Answer `query` from the single best-scoring chunk.
    pub fn query(&self, query: &str) -> Result<RagAnswer> {
        self.query_top(query, 1).map(|(answer, _)| answer)
    }

    /// Answer `query` from the best chunk and also return the `n` best
    /// excerpts, from a single search.
    pub fn query_top(&self, query: &str, n: usize) -> Result<(RagAnswer, Vec<Excerpt>)> {
        let excerpts = self.excerpts(query, n.max(1))?;
        let context = excerpts.first().cloned().ok_or(Error::EmptyIndex)?;
        let answer = self.answerer.answer(query, &context.text)?;
        tracing::debug!(score = context.score, source = ?context.source, "answered from excerpt");
        Ok((RagAnswer { answer: answer.trim().to_string(), context }, excerpts))
    }

    /// The `n` best-scoring excerpts for `query`.
    pub fn excerpts(&self, query: &str, n: usize) -> Result<Vec<Excerpt>> {
        let results = self.store.search(query, n)?;
        Ok(results.iter().map(|r| self.excerpt(r)).collect())
    }

    pub fn store(&self) -> &IndexStore { &self.store }

    pub fn store_mut(&mut self) -> &mut IndexStore { &mut self.store }

    fn excerpt(&self, result: &SearchResult<'_>) -> Excerpt {
        let source = self
            .store
            .index()
            .and_then(|index| index.parent(result.chunk))
            .and_then(Document::filename)
            .map(str::to_string);
        Excerpt { text: result.chunk.text.clone(), score: result.score, source }
    }
}
