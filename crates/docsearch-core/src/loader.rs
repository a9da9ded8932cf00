//! Turns a folder of source files into [`Document`]s.

use std::fs;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::traits::TextExtractor;
use crate::types::Document;

/// Reads `.txt` and `.md` files as UTF-8, decoding lossily when needed.
#[derive(Debug, Default, Clone, Copy)]
pub struct PlainTextExtractor;

impl TextExtractor for PlainTextExtractor {
    fn supports(&self, path: &Path) -> bool {
        matches!(path.extension().and_then(|s| s.to_str()), Some("txt" | "md"))
    }

    fn extract(&self, path: &Path) -> anyhow::Result<String> {
        match fs::read_to_string(path) {
            Ok(content) => Ok(content),
            Err(_) => Ok(String::from_utf8_lossy(&fs::read(path)?).to_string()),
        }
    }
}

pub struct DirectoryLoader<E = PlainTextExtractor> {
    extractor: E,
}

impl DirectoryLoader {
    pub fn new() -> Self {
        Self { extractor: PlainTextExtractor }
    }
}

impl Default for DirectoryLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl<E: TextExtractor> DirectoryLoader<E> {
    pub fn with_extractor(extractor: E) -> Self {
        Self { extractor }
    }

    /// Load every supported file under `root`, sorted by path.
    ///
    /// Each document carries its path relative to `root` under the
    /// `filename` metadata key.
    pub fn load(&self, root: &Path) -> Result<Vec<Document>> {
        if !root.is_dir() {
            return Err(Error::io(
                root,
                std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            ));
        }
        let files = self.list_files(root);
        let mut documents = Vec::with_capacity(files.len());
        for (file_index, file_path) in files.iter().enumerate() {
            tracing::debug!(file = %file_path.display(), n = file_index + 1, total = files.len(), "extracting");
            let text = self
                .extractor
                .extract(file_path)
                .map_err(|e| Error::Extraction { path: file_path.clone(), reason: format!("{e:#}") })?;
            let relative = file_path.strip_prefix(root).unwrap_or(file_path);
            let name = relative
                .components()
                .map(|c| c.as_os_str().to_string_lossy())
                .collect::<Vec<_>>()
                .join("/");
            documents.push(Document::from_file(name, text));
        }
        tracing::info!(root = %root.display(), documents = documents.len(), "documents loaded");
        Ok(documents)
    }

    pub fn list_files(&self, root: &Path) -> Vec<PathBuf> {
        let mut files: Vec<PathBuf> = walkdir::WalkDir::new(root)
            .into_iter()
            .filter_map(|entry| match entry {
                Ok(entry) => Some(entry),
                Err(e) => {
                    tracing::warn!(root = %root.display(), error = %e, "skipping unreadable entry");
                    None
                }
            })
            .filter(|e| e.file_type().is_file())
            .map(walkdir::DirEntry::into_path)
            .filter(|p| self.extractor.supports(p))
            .collect();
        files.sort();
        files
    }
}
