//! docsearch-vector
//!
//! In-memory vector index over document chunks: embedding adapter, exhaustive
//! dot-product search, and a two-file on-disk format (`index` metadata blob
//! plus `index_vecs.npy` matrix).

pub mod adapter;
pub mod codec;
pub mod index;
pub mod npy;
pub mod shared;
pub mod store;

pub use adapter::EmbeddingAdapter;
pub use index::{BuildProgress, VectorIndex};
pub use shared::SharedIndex;
pub use store::IndexStore;
