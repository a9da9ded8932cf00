//! # docsearch
//!
//! Index a directory of text files and ask questions about it.
//!
//! - `docsearch index [DOCS] [--save DIR]` builds an index and saves it
//! - `docsearch query [--index DIR | --docs DIR] [QUESTION]...` answers
//!   questions from a saved index, or from documents indexed on the fly.
//!   Without questions it reads them from stdin until EOF.

use std::io::{self, BufRead, Write};
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use indicatif::{ProgressBar, ProgressStyle};
use tracing::info;
use tracing_subscriber::EnvFilter;

use docsearch_core::chunker::ChunkingConfig;
use docsearch_core::config::{Config, Settings};
use docsearch_core::loader::DirectoryLoader;
use docsearch_embed::get_default_embedder;
use docsearch_rag::{ExtractiveAnswerer, RagModel};
use docsearch_vector::{EmbeddingAdapter, IndexStore};

#[derive(Parser)]
#[command(name = "docsearch")]
#[command(about = "Semantic search and question answering over local documents")]
#[command(version)]
struct Cli {
    /// Extra config file merged over config.toml
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Use the hash-based embedder instead of loading a model
    #[arg(long, global = true)]
    fake_embeddings: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Index a directory of .txt/.md files and save the index
    Index {
        /// Documents directory (default: data.docs_dir)
        docs: Option<PathBuf>,

        /// Where to write the index (default: data.index_dir)
        #[arg(short, long)]
        save: Option<PathBuf>,
    },

    /// Answer questions from an index
    Query {
        /// Saved index directory (default: data.index_dir)
        #[arg(short, long, conflicts_with = "docs")]
        index: Option<PathBuf>,

        /// Index this directory in memory instead of loading a saved index
        #[arg(short, long)]
        docs: Option<PathBuf>,

        /// Excerpts to show per answer (default: rag.top_k)
        #[arg(short, long)]
        top: Option<usize>,

        /// Questions; read from stdin when empty
        questions: Vec<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    let config = Config::load_with(cli.config.as_deref()).context("Failed to load configuration")?;
    let mut settings = config.settings()?;
    if cli.fake_embeddings {
        settings.embed.use_fake = true;
    }

    match cli.command {
        Commands::Index { docs, save } => {
            let docs = docs.unwrap_or_else(|| settings.data.docs_dir());
            let save = save.unwrap_or_else(|| settings.data.index_dir());
            run_index(&settings, &docs, &save)
        }
        Commands::Query { index, docs, top, questions } => {
            let top = top.unwrap_or(settings.rag.top_k).max(1);
            let store = match docs {
                Some(docs) => build_store(&settings, &docs)?,
                None => {
                    let dir = index.unwrap_or_else(|| settings.data.index_dir());
                    info!(dir = %dir.display(), "loading index");
                    IndexStore::open(adapter(&settings)?, settings.chunking, &dir)
                        .with_context(|| format!("Failed to open index at {}", dir.display()))?
                }
            };
            run_query(RagModel::new(store, ExtractiveAnswerer), &questions, top)
        }
    }
}

fn adapter(settings: &Settings) -> Result<EmbeddingAdapter> {
    Ok(EmbeddingAdapter::new(get_default_embedder(&settings.embed)?))
}

fn run_index(settings: &Settings, docs: &Path, save: &Path) -> Result<()> {
    let store = build_store(settings, docs)?;
    store.save(save).with_context(|| format!("Failed to save index to {}", save.display()))?;
    let chunks = store.index().map_or(0, |i| i.len());
    println!("Indexed {} chunks from {} into {}", chunks, docs.display(), save.display());
    Ok(())
}

fn build_store(settings: &Settings, docs: &Path) -> Result<IndexStore> {
    let documents = DirectoryLoader::new()
        .load(docs)
        .with_context(|| format!("Failed to load documents from {}", docs.display()))?;
    info!(count = documents.len(), dir = %docs.display(), "documents loaded");

    let chunking: ChunkingConfig = settings.chunking;
    let mut store = IndexStore::new(adapter(settings)?, chunking)?;

    let pb = ProgressBar::new(documents.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents {msg}")?
            .progress_chars("#>-"),
    );
    let mut chunks = 0usize;
    store.build_with_progress(documents, |p| {
        chunks += p.chunks;
        pb.set_position((p.document + 1) as u64);
        pb.set_message(format!("{chunks} chunks"));
    })?;
    pb.finish_with_message(format!("{chunks} chunks embedded"));
    Ok(store)
}

fn run_query(model: RagModel, questions: &[String], top: usize) -> Result<()> {
    println!("Documents loaded.");
    if !questions.is_empty() {
        for question in questions {
            println!("\nQuery: \"{question}\"");
            answer(&model, question, top)?;
        }
        return Ok(());
    }

    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        print!("Enter question -> ");
        io::stdout().flush()?;
        let Some(line) = lines.next() else { break };
        let question = line?;
        let question = question.trim();
        if question.is_empty() {
            continue;
        }
        if matches!(question, "exit" | "quit") {
            break;
        }
        answer(&model, question, top)?;
    }
    println!();
    Ok(())
}

fn answer(model: &RagModel, question: &str, top: usize) -> Result<()> {
    println!("Processing answer...");
    let (response, excerpts) = model.query_top(question, top)?;
    println!("{}", response.answer);
    println!("Excerpt searched:\n");
    for excerpt in excerpts {
        println!("Score: {}", excerpt.score);
        if let Some(source) = &excerpt.source {
            println!("Source: {source}");
        }
        println!("Text:\n {}\n", excerpt.text);
    }
    Ok(())
}
