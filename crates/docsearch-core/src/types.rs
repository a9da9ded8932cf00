//! Domain types shared by the chunker, the vector index and the persistence codec.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

pub type Meta = BTreeMap<String, String>;

/// Metadata key holding the source file a document was loaded from.
pub const FILENAME_KEY: &str = "filename";

const PREVIEW_CHARS: usize = 30;

/// Position of a document inside the collection that owns it.
///
/// Chunks point back at their document through this handle, both in memory
/// and on disk, instead of holding a reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DocumentId(pub usize);

impl DocumentId {
    pub fn index(self) -> usize {
        self.0
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "doc#{}", self.0)
    }
}

/// A source document. Never mutated once handed to an index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Document {
    pub text: String,
    #[serde(default)]
    pub metadata: Meta,
}

impl Document {
    pub fn new(text: impl Into<String>, metadata: Meta) -> Self {
        Self { text: text.into(), metadata }
    }

    /// Convenience constructor for a document loaded from a named file.
    pub fn from_file(filename: impl Into<String>, text: impl Into<String>) -> Self {
        let mut metadata = Meta::new();
        metadata.insert(FILENAME_KEY.to_string(), filename.into());
        Self::new(text, metadata)
    }

    pub fn filename(&self) -> Option<&str> {
        self.metadata.get(FILENAME_KEY).map(String::as_str)
    }

    /// Length of the text in characters, the unit chunk offsets are measured in.
    pub fn char_len(&self) -> usize {
        self.text.chars().count()
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "<Document text='{}...' metadata={:?}>", preview(&self.text), self.metadata)
    }
}

/// A window of a document's text; the unit that gets embedded and searched.
///
/// - `text`: the window contents
/// - `document`: handle of the parent document in the owning collection
/// - `start`/`end`: character span `[start, end)` within the parent text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    pub document: DocumentId,
    pub start: usize,
    pub end: usize,
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "<Chunk text='{}...' document={} span={}..{}>",
            preview(&self.text),
            self.document,
            self.start,
            self.end
        )
    }
}

/// A ranked chunk. Borrows from the index that produced it.
///
/// `score` is the raw dot product of the query and chunk embeddings;
/// higher is better.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SearchResult<'a> {
    pub chunk: &'a Chunk,
    pub score: f32,
}

/// How many ranked results a search returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SearchLimit {
    /// The full ranking.
    #[default]
    All,
    /// At most this many results.
    Top(usize),
}

impl SearchLimit {
    /// Maps the signed convention where any negative count means "all".
    pub fn from_signed(n: i64) -> Self {
        usize::try_from(n).map_or(Self::All, Self::Top)
    }

    pub fn apply(self, available: usize) -> usize {
        match self {
            Self::All => available,
            Self::Top(n) => n.min(available),
        }
    }
}

impl From<usize> for SearchLimit {
    fn from(n: usize) -> Self {
        Self::Top(n)
    }
}

impl From<Option<usize>> for SearchLimit {
    fn from(n: Option<usize>) -> Self {
        n.map_or(Self::All, Self::Top)
    }
}

fn preview(text: &str) -> String {
    text.chars().take(PREVIEW_CHARS).collect()
}
