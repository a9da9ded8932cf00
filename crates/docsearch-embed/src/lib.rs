//! docsearch-embed
//!
//! Embedding backends behind `docsearch_core::traits::Embedder`: a candle BERT
//! sentence embedder for real use and a hash-based [`FakeEmbedder`] for tests.

use anyhow::{anyhow, Result};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use docsearch_core::config::EmbedSettings;
use docsearch_core::traits::Embedder;

mod bert;
mod device;
mod fake;
mod pool;

pub use bert::SentenceEmbedder;
pub use device::select_device;
pub use fake::FakeEmbedder;
pub use pool::masked_mean_l2;

/// Pick the embedder described by `settings`.
///
/// `embed.use_fake` or `APP_USE_FAKE_EMBEDDINGS=1` selects the
/// [`FakeEmbedder`]; otherwise the sentence model is loaded from the first
/// model directory found. The variable can only switch the fake on.
pub fn get_default_embedder(settings: &EmbedSettings) -> Result<Arc<dyn Embedder>> {
    let use_fake = wants_fake(settings, std::env::var("APP_USE_FAKE_EMBEDDINGS").ok().as_deref());
    if use_fake {
        tracing::info!(dim = settings.fake_dim, "using FakeEmbedder");
        return Ok(Arc::new(FakeEmbedder::new(settings.fake_dim)));
    }
    let model_dir = resolve_model_dir(settings)?;
    Ok(Arc::new(SentenceEmbedder::load(&model_dir)?))
}

fn wants_fake(settings: &EmbedSettings, env_flag: Option<&str>) -> bool {
    settings.use_fake || env_flag.is_some_and(|v| v == "1" || v.eq_ignore_ascii_case("true"))
}

fn resolve_model_dir(settings: &EmbedSettings) -> Result<PathBuf> {
    if let Some(p) = settings.model_dir() {
        if p.exists() { tracing::info!(dir = %p.display(), "using embed.model_dir"); return Ok(p); }
    }
    if let Ok(dir) = std::env::var("MODEL_DIR") {
        let p = PathBuf::from(&dir);
        if p.exists() { tracing::info!(dir = %p.display(), "using MODEL_DIR"); return Ok(p); }
    }
    for candidate in ["models/all-MiniLM-L6-v2", "../models/all-MiniLM-L6-v2"] {
        let p = Path::new(candidate);
        if p.exists() { tracing::info!(dir = %p.display(), "using model dir"); return Ok(p.to_path_buf()); }
    }
    Err(anyhow!("Could not locate a sentence embedding model directory (set embed.model_dir or MODEL_DIR)"))
}
