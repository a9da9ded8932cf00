//! On-disk layout of a saved index.
//!
//! A saved index is a directory holding two artifacts:
//! - `index`: JSON with the documents and chunks; chunks name their parent by
//!   position in `documents`
//! - `index_vecs.npy`: the `(chunks, D)` f32 matrix in NumPy format
//!
//! Both are written to a temporary file in the same directory and renamed into
//! place, so a reader never sees a half-written artifact.

use serde::{Deserialize, Serialize};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

use docsearch_core::types::{Chunk, Document};
use docsearch_core::{Error, Result};

use crate::index::VectorIndex;
use crate::npy;

pub const METADATA_FILE: &str = "index";
pub const VECTORS_FILE: &str = "index_vecs.npy";
const FORMAT_VERSION: u32 = 1;

#[derive(Serialize)]
struct MetadataOut<'a> {
    format_version: u32,
    dim: usize,
    documents: &'a [Document],
    chunks: &'a [Chunk],
}

#[derive(Deserialize)]
struct MetadataIn {
    format_version: u32,
    dim: usize,
    documents: Vec<Document>,
    chunks: Vec<Chunk>,
}

pub fn metadata_path(dir: &Path) -> PathBuf {
    dir.join(METADATA_FILE)
}

pub fn vectors_path(dir: &Path) -> PathBuf {
    dir.join(VECTORS_FILE)
}

pub fn save(index: &VectorIndex, dir: &Path) -> Result<()> {
    fs::create_dir_all(dir).map_err(|e| Error::io(dir, e))?;

    let meta_path = metadata_path(dir);
    let metadata = MetadataOut {
        format_version: FORMAT_VERSION,
        dim: index.dim(),
        documents: index.documents(),
        chunks: index.chunks(),
    };
    let json = serde_json::to_vec(&metadata).map_err(|e| Error::io(&meta_path, std::io::Error::other(e)))?;
    write_atomic(&meta_path, |w| w.write_all(&json))?;
    write_atomic(&vectors_path(dir), |w| npy::write_matrix(w, index.vectors()))?;

    tracing::info!(dir = %dir.display(), chunks = index.len(), dim = index.dim(), "index saved");
    Ok(())
}

/// Read both artifacts back. Anything missing, unparsable or inconsistent is
/// a `CorruptIndex` error; no partial index is returned.
pub fn load(dir: &Path) -> Result<VectorIndex> {
    let meta_path = metadata_path(dir);
    let raw = read_artifact(&meta_path)?;
    let metadata: MetadataIn = serde_json::from_slice(&raw)
        .map_err(|e| Error::corrupt(&meta_path, format!("unreadable metadata: {e}")))?;
    if metadata.format_version != FORMAT_VERSION {
        return Err(Error::corrupt(
            &meta_path,
            format!("unsupported format version {}", metadata.format_version),
        ));
    }

    let vec_path = vectors_path(dir);
    let bytes = read_artifact(&vec_path)?;
    let vectors = npy::read_matrix(&bytes).map_err(|reason| Error::corrupt(&vec_path, reason))?;
    if vectors.ncols() != metadata.dim {
        return Err(Error::corrupt(
            &vec_path,
            format!("matrix has dimension {}, metadata says {}", vectors.ncols(), metadata.dim),
        ));
    }

    let index = VectorIndex::from_parts(metadata.documents, metadata.chunks, vectors)
        .map_err(|reason| Error::corrupt(dir, reason))?;
    tracing::info!(dir = %dir.display(), chunks = index.len(), dim = index.dim(), "index loaded");
    Ok(index)
}

fn read_artifact(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).map_err(|e| match e.kind() {
        std::io::ErrorKind::NotFound => Error::corrupt(path, "artifact is missing"),
        _ => Error::io(path, e),
    })
}

fn write_atomic<F>(path: &Path, write: F) -> Result<()>
where
    F: FnOnce(&mut dyn Write) -> std::io::Result<()>,
{
    let dir = path.parent().unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| Error::io(dir, e))?;
    {
        let mut out = BufWriter::new(tmp.as_file_mut());
        write(&mut out).and_then(|()| out.flush()).map_err(|e| Error::io(path, e))?;
    }
    tmp.as_file().sync_all().map_err(|e| Error::io(path, e))?;
    tmp.persist(path).map_err(|e| Error::io(path, e.error))?;
    Ok(())
}
