mod common;

use std::sync::Arc;

use docsearch_core::chunker::ChunkingConfig;
use docsearch_core::traits::Embedder;
use docsearch_core::types::{Document, SearchLimit};
use docsearch_core::Error;
use docsearch_embed::FakeEmbedder;
use docsearch_vector::{EmbeddingAdapter, IndexStore, VectorIndex};

use common::*;

fn keyword_store() -> IndexStore {
    let mut store = IndexStore::new(adapter(KeywordEmbedder), ChunkingConfig::default()).expect("store");
    store.build(keyword_docs()).expect("build");
    store
}

#[test]
fn chunks_and_vectors_stay_in_lock_step() {
    let fake = FakeEmbedder::new(64);
    let index = VectorIndex::build(prose_docs(), &fake_adapter(64), &ChunkingConfig::default()).expect("build");

    assert!(index.len() > 2, "both documents span several chunks");
    assert_eq!(index.vectors().nrows(), index.chunks().len());
    assert_eq!(index.dim(), 64);
    for (i, chunk) in index.chunks().iter().enumerate() {
        let expected = fake.embed(&chunk.text).expect("embed");
        assert_eq!(index.vector(i).expect("row"), expected.as_slice(), "row {i}");
    }
    assert!(index.vector(index.len()).is_none());
}

#[test]
fn chunks_follow_document_order_and_point_at_their_parent() {
    let docs = prose_docs();
    let index = VectorIndex::build(docs.clone(), &fake_adapter(16), &ChunkingConfig::default()).expect("build");

    let parents: Vec<usize> = index.chunks().iter().map(|c| c.document.index()).collect();
    let mut sorted = parents.clone();
    sorted.sort_unstable();
    assert_eq!(parents, sorted, "document order is preserved");
    for chunk in index.chunks() {
        let parent = index.parent(chunk).expect("parent");
        assert!(parent.text.contains(&chunk.text));
    }
    assert_eq!(index.documents(), docs.as_slice());
}

#[test]
fn one_batch_call_per_non_empty_document() {
    let counting = Arc::new(CountingEmbedder::new(FakeEmbedder::new(8)));
    let adapter = EmbeddingAdapter::new(counting.clone());
    let mut docs = prose_docs();
    docs.insert(1, Document::from_file("empty.txt", ""));

    let mut store = IndexStore::new(adapter, ChunkingConfig::default()).expect("store");
    store.build(docs).expect("build");
    assert_eq!(counting.calls(), 2);

    store.search("solar", 1).expect("search");
    assert_eq!(counting.calls(), 3);
}

#[test]
fn ranking_is_descending_and_stable_on_ties() {
    let store = keyword_store();
    let results = store.search("alpha", SearchLimit::All).expect("search");

    let texts: Vec<&str> = results.iter().map(|r| r.chunk.text.as_str()).collect();
    assert_eq!(texts, vec!["alpha alpha", "alpha beta", "alpha gamma", "gamma", "beta"]);
    let scores: Vec<f32> = results.iter().map(|r| r.score).collect();
    assert_eq!(scores, vec![2.0, 1.0, 1.0, 0.0, 0.0]);
    assert!(scores.windows(2).all(|w| w[0] >= w[1]));
}

#[test]
fn scores_are_raw_dot_products() {
    let store = keyword_store();
    // "alpha alpha" embeds to [2, 0, 0]; a cosine score would cap at 1.
    let results = store.search("alpha alpha beta", 1).expect("search");
    assert_eq!(results[0].chunk.text, "alpha alpha");
    assert!((results[0].score - 4.0).abs() < f32::EPSILON);
}

#[test]
fn limit_truncates_or_returns_everything() {
    let store = keyword_store();
    let top2 = store.search("alpha", 2).expect("search");
    assert_eq!(top2.len(), 2);
    assert_eq!(top2[0].chunk.text, "alpha alpha");
    assert_eq!(top2[1].chunk.text, "alpha beta");

    assert_eq!(store.search("alpha", 10).expect("search").len(), 5);
    assert_eq!(store.search("alpha", SearchLimit::from_signed(-1)).expect("search").len(), 5);
    assert!(store.search("alpha", 0).expect("search").is_empty());
}

#[test]
fn search_before_build_is_an_empty_index_error() {
    let store = IndexStore::new(adapter(KeywordEmbedder), ChunkingConfig::default()).expect("store");
    assert!(matches!(store.search("q", SearchLimit::All), Err(Error::EmptyIndex)));
    let tmp = tempfile::tempdir().expect("tempdir");
    assert!(matches!(store.save(tmp.path()), Err(Error::EmptyIndex)));
}

#[test]
fn index_of_empty_documents_searches_to_nothing() {
    let mut store = IndexStore::new(adapter(KeywordEmbedder), ChunkingConfig::default()).expect("store");
    store.build(vec![Document::from_file("blank.txt", "")]).expect("build");
    assert!(store.search("alpha", SearchLimit::All).expect("search").is_empty());
    assert_eq!(store.index().expect("built").vectors().dim(), (0, 3));
}

#[test]
fn query_embedding_failure_is_reported() {
    let mut store = IndexStore::new(adapter(FailingEmbedder), ChunkingConfig::default()).expect("store");
    store.build(keyword_docs()).expect("build");
    let err = store.search("FAIL please", 1).expect_err("query embedding fails");
    assert!(matches!(err, Error::EmbeddingFailure(ref m) if m.contains("refused")), "got {err:?}");
}

#[test]
fn failed_rebuild_keeps_the_previous_index() {
    let mut store = IndexStore::new(adapter(FailingEmbedder), ChunkingConfig::default()).expect("store");
    store.build(keyword_docs()).expect("build");
    let before = store.index().cloned().expect("built");

    let mut poisoned = keyword_docs();
    poisoned.push(Document::from_file("bad.txt", "alpha FAIL"));
    assert!(matches!(store.build(poisoned), Err(Error::EmbeddingFailure(_))));

    assert_eq!(store.index(), Some(&before));
    assert_eq!(store.search("alpha", SearchLimit::All).expect("search").len(), 5);
}

#[test]
fn wrong_dimension_is_never_padded() {
    let mut store = IndexStore::new(adapter(WrongDimEmbedder), ChunkingConfig::default()).expect("store");
    let err = store.build(keyword_docs()).expect_err("dimension mismatch");
    assert!(matches!(err, Error::EmbeddingFailure(ref m) if m.contains("dimension 5")), "got {err:?}");
    assert!(store.index().is_none());
}

#[test]
fn missing_vectors_are_an_embedding_failure() {
    let long = vec![Document::from_file("long.txt", "alpha ".repeat(420))];
    let err = VectorIndex::build(long.clone(), &adapter(ShortEmbedder), &ChunkingConfig::default())
        .expect_err("one vector short");
    assert!(matches!(err, Error::EmbeddingFailure(ref m) if m.contains("2 vectors for 3 texts")), "got {err:?}");

    let mut store = IndexStore::new(adapter(ShortEmbedder), ChunkingConfig::default()).expect("store");
    assert!(matches!(store.build(long), Err(Error::EmbeddingFailure(_))));
    assert!(store.index().is_none());
}

#[test]
fn invalid_chunking_is_rejected_up_front() {
    let bad = ChunkingConfig { chunk_size: 100, overlap: 60 };
    let err = IndexStore::new(adapter(KeywordEmbedder), bad).expect_err("invalid overlap");
    assert!(matches!(err, Error::InvalidConfiguration(_)));
    let err = VectorIndex::build(keyword_docs(), &adapter(KeywordEmbedder), &bad).expect_err("invalid overlap");
    assert!(matches!(err, Error::InvalidConfiguration(_)));
}

#[test]
fn results_resolve_to_their_source_file() {
    let store = keyword_store();
    let index = store.index().expect("built");
    let best = &store.search("gamma", 1).expect("search")[0];
    let source = index.parent(best.chunk).and_then(Document::filename);
    assert_eq!(source, Some("doc_2.txt"));
}

#[test]
fn progress_is_reported_per_document() {
    let mut seen = Vec::new();
    VectorIndex::build_with_progress(prose_docs(), &fake_adapter(8), &ChunkingConfig::default(), |p| {
        seen.push((p.document, p.total_documents));
    })
    .expect("build");
    assert_eq!(seen, vec![(0, 2), (1, 2)]);
}
