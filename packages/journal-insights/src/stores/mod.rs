//! Storage implementations: the per-question vector index and caches.

mod memory;
pub mod vector_index;

pub use memory::MemoryEmbeddingCache;
pub use vector_index::{cosine_similarity, SimilarityMetric, VectorIndex};
