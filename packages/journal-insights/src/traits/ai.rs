//! Model call boundaries.
//!
//! Two thin traits separate the engine from hosted models:
//! - [`TextGenerator`] turns a prompt into raw text
//! - [`Embedder`] turns text into a fixed-length vector
//!
//! Neither retries. Retry and backoff belong to the caller.

use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::{EmbeddingError, GenerationError};

/// Options passed with each generation call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Sampling temperature. 0 asks for the most reproducible output.
    pub temperature: f32,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self { temperature: 0.0 }
    }
}

impl GenerationOptions {
    pub fn with_temperature(temperature: f32) -> Self {
        Self { temperature }
    }
}

/// A hosted text-generation model.
///
/// Implementations wrap a specific provider and return the model's text
/// unmodified. Parsing and validation happen downstream.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate a completion for `prompt`.
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GenerationError>;
}

/// A hosted embedding model.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed `text` into a dense vector.
    ///
    /// Every call on one embedder must return vectors of the same length.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError>;

    /// Most texts one [`embed_batch`](Self::embed_batch) call should carry.
    ///
    /// 1 (the default) means the provider has no batch endpoint and texts are
    /// embedded one call at a time.
    fn max_batch_size(&self) -> usize {
        1
    }

    /// Embed several texts, returning one vector per text in input order.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for Arc<T> {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GenerationError> {
        (**self).generate(prompt, options).await
    }
}

#[async_trait]
impl<T: Embedder + ?Sized> Embedder for Arc<T> {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        (**self).embed(text).await
    }

    fn max_batch_size(&self) -> usize {
        (**self).max_batch_size()
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        (**self).embed_batch(texts).await
    }
}

#[async_trait]
impl<T: TextGenerator + ?Sized> TextGenerator for &T {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GenerationError> {
        (**self).generate(prompt, options).await
    }
}

#[async_trait]
impl<T: Embedder + ?Sized> Embedder for &T {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        (**self).embed(text).await
    }

    fn max_batch_size(&self) -> usize {
        (**self).max_batch_size()
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        (**self).embed_batch(texts).await
    }
}
