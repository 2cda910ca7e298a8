//! Testing utilities including mock implementations.
//!
//! These are useful for testing applications that use the engine without
//! making real model calls.

use async_trait::async_trait;
use std::collections::{HashMap, HashSet, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, RwLock};
use std::time::Duration;

use crate::error::{EmbeddingError, GenerationError};
use crate::traits::ai::{Embedder, GenerationOptions, TextGenerator};

/// Response used by [`MockGenerator`] once its script runs out.
pub const DEFAULT_MOCK_RESPONSE: &str = "mock answer";

/// One scripted generator outcome.
#[derive(Debug, Clone)]
enum Scripted {
    Text(String),
    Delayed(Duration, String),
    Failure(GenerationError),
}

/// A mock text generator for testing.
///
/// Plays back scripted responses in order, then falls back to a default
/// response. Every call is recorded for assertions.
#[derive(Default)]
pub struct MockGenerator {
    /// Outcomes returned in call order
    script: Arc<Mutex<VecDeque<Scripted>>>,

    /// Returned once the script is exhausted
    default_response: Option<String>,

    /// Call tracking for assertions
    calls: Arc<RwLock<Vec<MockGeneratorCall>>>,
}

/// Record of a call made to the mock generator.
#[derive(Debug, Clone, PartialEq)]
pub struct MockGeneratorCall {
    pub prompt: String,
    pub temperature: f32,
}

impl MockGenerator {
    /// Create a new mock generator with an empty script.
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a text response.
    pub fn with_response(self, text: impl Into<String>) -> Self {
        self.push(Scripted::Text(text.into()));
        self
    }

    /// Queue a response that arrives after `delay`.
    pub fn with_delayed_response(self, delay: Duration, text: impl Into<String>) -> Self {
        self.push(Scripted::Delayed(delay, text.into()));
        self
    }

    /// Queue a failure.
    pub fn with_failure(self, error: GenerationError) -> Self {
        self.push(Scripted::Failure(error));
        self
    }

    /// Set the response used after the script runs out.
    pub fn with_default_response(mut self, text: impl Into<String>) -> Self {
        self.default_response = Some(text.into());
        self
    }

    /// Get all calls made to this mock.
    pub fn calls(&self) -> Vec<MockGeneratorCall> {
        self.calls.read().unwrap().clone()
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.calls().into_iter().map(|c| c.prompt).collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    fn push(&self, scripted: Scripted) {
        self.script.lock().unwrap().push_back(scripted);
    }
}

#[async_trait]
impl TextGenerator for MockGenerator {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GenerationError> {
        self.calls.write().unwrap().push(MockGeneratorCall {
            prompt: prompt.to_string(),
            temperature: options.temperature,
        });

        let next = self.script.lock().unwrap().pop_front();
        match next {
            Some(Scripted::Text(text)) => Ok(text),
            Some(Scripted::Delayed(delay, text)) => {
                tokio::time::sleep(delay).await;
                Ok(text)
            }
            Some(Scripted::Failure(error)) => Err(error),
            None => Ok(self
                .default_response
                .clone()
                .unwrap_or_else(|| DEFAULT_MOCK_RESPONSE.to_string())),
        }
    }
}

/// A mock embedder for testing.
///
/// Returns predefined vectors by text, or a deterministic hash-based vector
/// for unknown text.
pub struct MockEmbedder {
    /// Predefined embeddings by text
    embeddings: Arc<RwLock<HashMap<String, Vec<f32>>>>,

    /// Per-text artificial latency
    delays: Arc<RwLock<HashMap<String, Duration>>>,

    /// Texts that should fail
    fail_texts: Arc<RwLock<HashSet<String>>>,

    /// Dimension of generated fallback embeddings
    embedding_dim: usize,

    /// Largest batch the mock accepts
    batch_size: usize,

    /// Texts embedded, in call order
    calls: Arc<RwLock<Vec<String>>>,

    /// Sizes of `embed_batch` calls, in call order
    batches: Arc<RwLock<Vec<usize>>>,

    /// Delayed calls currently in progress
    in_flight: Arc<AtomicUsize>,

    /// Highest `in_flight` value observed
    peak_in_flight: Arc<AtomicUsize>,
}

impl Default for MockEmbedder {
    fn default() -> Self {
        Self::new()
    }
}

impl MockEmbedder {
    /// Create a new mock embedder with 1024-dimension fallback vectors.
    pub fn new() -> Self {
        Self {
            embeddings: Arc::default(),
            delays: Arc::default(),
            fail_texts: Arc::default(),
            embedding_dim: 1024,
            batch_size: 1,
            calls: Arc::default(),
            batches: Arc::default(),
            in_flight: Arc::default(),
            peak_in_flight: Arc::default(),
        }
    }

    /// Set the fallback embedding dimension.
    pub fn with_dimension(mut self, dim: usize) -> Self {
        self.embedding_dim = dim;
        self
    }

    /// Advertise batch support for up to `size` texts per call.
    pub fn with_batch_size(mut self, size: usize) -> Self {
        self.batch_size = size;
        self
    }

    /// Add a predefined embedding for text.
    pub fn with_embedding(self, text: impl Into<String>, embedding: Vec<f32>) -> Self {
        self.embeddings
            .write()
            .unwrap()
            .insert(text.into(), embedding);
        self
    }

    /// Delay responses for a text.
    pub fn with_delay(self, text: impl Into<String>, delay: Duration) -> Self {
        self.delays.write().unwrap().insert(text.into(), delay);
        self
    }

    /// Mark a text as failing.
    pub fn fail_on(self, text: impl Into<String>) -> Self {
        self.fail_texts.write().unwrap().insert(text.into());
        self
    }

    /// Texts embedded so far, in call order.
    pub fn embedded_texts(&self) -> Vec<String> {
        self.calls.read().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.read().unwrap().len()
    }

    /// Sizes of the batch calls received, in call order.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batches.read().unwrap().clone()
    }

    /// Most delayed calls that were ever in progress at once.
    pub fn peak_in_flight(&self) -> usize {
        self.peak_in_flight.load(Ordering::SeqCst)
    }

    /// Generate a deterministic embedding based on text.
    fn generate_deterministic_embedding(&self, text: &str) -> Vec<f32> {
        use sha2::{Digest, Sha256};

        let mut hasher = Sha256::new();
        hasher.update(text.as_bytes());
        let hash = hasher.finalize();

        (0..self.embedding_dim)
            .map(|i| {
                let byte = hash[i % 32] as f32;
                // Normalize to [-1, 1] range
                (byte / 127.5) - 1.0
            })
            .collect()
    }
}

#[async_trait]
impl Embedder for MockEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.calls.write().unwrap().push(text.to_string());

        let delay = self.delays.read().unwrap().get(text).copied();
        if let Some(delay) = delay {
            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.peak_in_flight.fetch_max(now, Ordering::SeqCst);
            tokio::time::sleep(delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);
        }

        if self.fail_texts.read().unwrap().contains(text) {
            return Err(EmbeddingError::Provider(format!(
                "mock embedding failure for {:?}",
                text
            )));
        }

        let predefined = self.embeddings.read().unwrap().get(text).cloned();
        Ok(predefined.unwrap_or_else(|| self.generate_deterministic_embedding(text)))
    }

    fn max_batch_size(&self) -> usize {
        self.batch_size
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        self.batches.write().unwrap().push(texts.len());

        let mut vectors = Vec::with_capacity(texts.len());
        for text in texts {
            vectors.push(self.embed(text).await?);
        }
        Ok(vectors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_mock_generator_plays_script_then_default() {
        let generator = MockGenerator::new()
            .with_response("one")
            .with_failure(GenerationError::Timeout)
            .with_default_response("fallback");
        let options = GenerationOptions::default();

        assert_eq!(generator.generate("a", &options).await.unwrap(), "one");
        assert!(generator.generate("b", &options).await.is_err());
        assert_eq!(generator.generate("c", &options).await.unwrap(), "fallback");

        assert_eq!(generator.prompts(), vec!["a", "b", "c"]);
    }

    #[tokio::test]
    async fn test_mock_embed_deterministic() {
        let embedder = MockEmbedder::new().with_dimension(128);

        let emb1 = embedder.embed("hello").await.unwrap();
        let emb2 = embedder.embed("hello").await.unwrap();
        let emb3 = embedder.embed("world").await.unwrap();

        assert_eq!(emb1.len(), 128);
        assert_eq!(emb1, emb2); // Same input = same output
        assert_ne!(emb1, emb3); // Different input = different output
        assert_eq!(embedder.call_count(), 3);
    }

    #[tokio::test]
    async fn test_mock_embed_predefined_and_failure() {
        let embedder = MockEmbedder::new()
            .with_embedding("known", vec![0.5, 0.5])
            .fail_on("broken");

        assert_eq!(embedder.embed("known").await.unwrap(), vec![0.5, 0.5]);
        assert!(matches!(
            embedder.embed("broken").await,
            Err(EmbeddingError::Provider(_))
        ));
    }
}
