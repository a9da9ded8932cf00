use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use docsearch_core::chunker::ChunkingConfig;
use docsearch_core::traits::{Answerer, Embedder};
use docsearch_core::types::Document;
use docsearch_core::Error;
use docsearch_embed::FakeEmbedder;
use docsearch_rag::{ExtractiveAnswerer, RagModel};
use docsearch_vector::{EmbeddingAdapter, IndexStore};

fn store() -> IndexStore {
    let adapter = EmbeddingAdapter::new(Arc::new(FakeEmbedder::new(256)));
    IndexStore::new(adapter, ChunkingConfig::new(200, 20).expect("chunking")).expect("store")
}

fn corpus() -> Vec<Document> {
    vec![
        Document::from_file(
            "water.txt",
            "Rainwater can be collected from roofs. Filter rainwater through sand and charcoal before drinking it.",
        ),
        Document::from_file(
            "fire.txt",
            "A bow drill makes fire from friction. Dry tinder catches the ember and grows into flame.",
        ),
    ]
}

/// Echoes what it was given so tests can see the context.
struct EchoAnswerer;

impl Answerer for EchoAnswerer {
    fn answer(&self, query: &str, context: &str) -> anyhow::Result<String> {
        Ok(format!("  {query} => {context}  "))
    }
}

#[test]
fn answers_from_the_best_matching_excerpt() {
    let mut store = store();
    store.build(corpus()).expect("build");
    let model = RagModel::new(store, ExtractiveAnswerer);

    let answer = model.query("how do I filter rainwater before drinking").expect("query");
    assert_eq!(answer.context.source.as_deref(), Some("water.txt"));
    assert_eq!(answer.answer, "Filter rainwater through sand and charcoal before drinking it.");
    assert!(answer.context.score > 0.0);
}

#[test]
fn answer_is_trimmed_and_uses_the_top_chunk_as_context() {
    let mut store = store();
    store.build(corpus()).expect("build");
    let model = RagModel::new(store, EchoAnswerer);

    let answer = model.query("bow drill fire friction").expect("query");
    assert!(answer.answer.starts_with("bow drill fire friction => A bow drill"));
    assert!(!answer.answer.ends_with(' '));
    assert_eq!(answer.context.source.as_deref(), Some("fire.txt"));
}

#[test]
fn excerpts_are_ranked_and_capped() {
    let mut store = store();
    store.build(corpus()).expect("build");
    let model = RagModel::new(store, ExtractiveAnswerer);

    let excerpts = model.excerpts("ember tinder flame", 5).expect("excerpts");
    assert_eq!(excerpts.len(), 2);
    assert_eq!(excerpts[0].source.as_deref(), Some("fire.txt"));
    assert!(excerpts[0].score >= excerpts[1].score);
}

/// Counts how many times anything gets embedded.
struct CountingFake {
    inner: FakeEmbedder,
    calls: Arc<AtomicUsize>,
}

impl Embedder for CountingFake {
    fn dim(&self) -> usize {
        self.inner.dim()
    }

    fn embed_batch(&self, texts: &[String]) -> anyhow::Result<Vec<Vec<f32>>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.inner.embed_batch(texts)
    }
}

#[test]
fn query_top_answers_and_lists_excerpts_from_one_search() {
    let calls = Arc::new(AtomicUsize::new(0));
    let embedder = CountingFake { inner: FakeEmbedder::new(256), calls: calls.clone() };
    let adapter = EmbeddingAdapter::new(Arc::new(embedder));
    let mut store = IndexStore::new(adapter, ChunkingConfig::new(200, 20).expect("chunking")).expect("store");
    store.build(corpus()).expect("build");
    let model = RagModel::new(store, ExtractiveAnswerer);

    let before = calls.load(Ordering::SeqCst);
    let (answer, excerpts) = model.query_top("dry tinder ember", 2).expect("query");
    assert_eq!(calls.load(Ordering::SeqCst) - before, 1, "the query is embedded once");
    assert_eq!(excerpts.len(), 2);
    assert_eq!(answer.context, excerpts[0]);
    assert_eq!(answer.context.source.as_deref(), Some("fire.txt"));
}

#[test]
fn querying_an_unbuilt_model_fails_with_empty_index() {
    let model = RagModel::new(store(), ExtractiveAnswerer);
    let err = model.query("anything").expect_err("nothing indexed");
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::EmptyIndex)));
}

#[test]
fn index_without_chunks_is_reported_as_empty() {
    let mut model = RagModel::new(store(), ExtractiveAnswerer);
    model.store_mut().build(vec![Document::from_file("blank.txt", "")]).expect("build");
    let err = model.query("anything").expect_err("no chunks");
    assert!(matches!(err.downcast_ref::<Error>(), Some(Error::EmptyIndex)));
}

#[test]
fn model_over_a_reloaded_index() {
    let tmp = tempfile::tempdir().expect("tempdir");
    let mut original = store();
    original.build(corpus()).expect("build");
    original.save(tmp.path()).expect("save");

    let mut reloaded = store();
    reloaded.load(tmp.path()).expect("load");
    let model = RagModel::new(reloaded, ExtractiveAnswerer);
    let answer = model.query("collect rainwater from roofs").expect("query");
    assert_eq!(answer.context.source.as_deref(), Some("water.txt"));
}
