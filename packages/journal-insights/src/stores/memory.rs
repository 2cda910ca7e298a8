//! In-memory embedding cache for long-running processes and tests.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::RwLock;

use crate::traits::cache::EmbeddingCache;

/// Embeddings keyed by entry id, remembered with the content hash they were
/// computed from.
///
/// Data is lost on restart.
#[derive(Default)]
pub struct MemoryEmbeddingCache {
    embeddings: RwLock<HashMap<String, CachedEmbedding>>,
}

struct CachedEmbedding {
    content_hash: String,
    vector: Vec<f32>,
}

impl MemoryEmbeddingCache {
    /// Create a new empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the number of cached entries.
    pub fn len(&self) -> usize {
        self.embeddings.read().map(|m| m.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Clear all cached embeddings.
    pub fn clear(&self) {
        if let Ok(mut embeddings) = self.embeddings.write() {
            embeddings.clear();
        }
    }
}

#[async_trait]
impl EmbeddingCache for MemoryEmbeddingCache {
    async fn get_embedding(&self, entry_id: &str, content_hash: &str) -> Option<Vec<f32>> {
        let embeddings = self.embeddings.read().ok()?;
        embeddings
            .get(entry_id)
            .filter(|cached| cached.content_hash == content_hash)
            .map(|cached| cached.vector.clone())
    }

    async fn store_embedding(&self, entry_id: &str, content_hash: &str, embedding: &[f32]) {
        if let Ok(mut embeddings) = self.embeddings.write() {
            embeddings.insert(
                entry_id.to_string(),
                CachedEmbedding {
                    content_hash: content_hash.to_string(),
                    vector: embedding.to_vec(),
                },
            );
        }
    }

    async fn invalidate(&self, entry_id: &str) {
        if let Ok(mut embeddings) = self.embeddings.write() {
            embeddings.remove(entry_id);
        }
    }
}
