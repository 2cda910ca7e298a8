//! Optional embedding cache.
//!
//! The answerer rebuilds its vector index for every question. A cache lets it
//! skip re-embedding entries whose content has not changed since the last
//! question. Keys pair the entry id with the SHA-256 of its content, so an
//! edited entry always misses.
//!
//! One cache instance must only ever be used with one embedding model.

use async_trait::async_trait;

/// Storage for entry embeddings keyed by entry id and content hash.
///
/// Lookups are best-effort: backends that hit an error should report a miss
/// rather than fail the surrounding question.
#[async_trait]
pub trait EmbeddingCache: Send + Sync {
    /// Get the embedding stored for this exact entry content.
    async fn get_embedding(&self, entry_id: &str, content_hash: &str) -> Option<Vec<f32>>;

    /// Store an embedding, replacing any older version for the entry.
    async fn store_embedding(&self, entry_id: &str, content_hash: &str, embedding: &[f32]);

    /// Drop everything stored for an entry.
    async fn invalidate(&self, entry_id: &str);
}
