//! OpenAI implementation of the generation and embedding traits.
//!
//! # Example
//!
//! ```rust,ignore
//! use journal_insights::ai::OpenAI;
//! use journal_insights::{Analyzer, Answerer};
//!
//! let ai = OpenAI::from_env()?;
//! let analyzer = Analyzer::new(ai.clone());
//! let answerer = Answerer::new(ai.clone(), ai);
//! ```

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use openai_client::{ChatRequest, Message, OpenAIClient, OpenAIError};
use tracing::debug;

use crate::error::{ConfigError, EmbeddingError, GenerationError};
use crate::traits::ai::{Embedder, GenerationOptions, TextGenerator};

/// Default chat model.
pub const DEFAULT_CHAT_MODEL: &str = "gpt-4o-mini";

/// Default embedding model.
pub const DEFAULT_EMBEDDING_MODEL: &str = "text-embedding-3-small";

/// Default number of texts sent per embeddings request.
pub const DEFAULT_EMBEDDING_BATCH_SIZE: usize = 64;

/// OpenAI-backed text generator and embedder.
#[derive(Clone)]
pub struct OpenAI {
    client: OpenAIClient,
    model: String,
    embedding_model: String,
    embedding_batch_size: usize,
}

impl fmt::Debug for OpenAI {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OpenAI")
            .field("client", &self.client)
            .field("model", &self.model)
            .field("embedding_model", &self.embedding_model)
            .field("embedding_batch_size", &self.embedding_batch_size)
            .finish()
    }
}

impl OpenAI {
    /// Create a new OpenAI implementation with the given API key.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            client: OpenAIClient::new(api_key),
            model: DEFAULT_CHAT_MODEL.to_string(),
            embedding_model: DEFAULT_EMBEDDING_MODEL.to_string(),
            embedding_batch_size: DEFAULT_EMBEDDING_BATCH_SIZE,
        }
    }

    /// Create from the environment, loading `.env` first when present.
    ///
    /// Reads `OPENAI_API_KEY` (required) and the optional
    /// `JOURNAL_CHAT_MODEL`, `JOURNAL_EMBEDDING_MODEL`, `OPENAI_BASE_URL` and
    /// `OPENAI_TIMEOUT_SECS`.
    pub fn from_env() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let api_key = lookup("OPENAI_API_KEY")
            .filter(|key| !key.trim().is_empty())
            .ok_or(ConfigError::MissingEnv("OPENAI_API_KEY"))?;

        let mut ai = Self::new(api_key);
        if let Some(model) = lookup("JOURNAL_CHAT_MODEL") {
            ai = ai.with_model(model);
        }
        if let Some(model) = lookup("JOURNAL_EMBEDDING_MODEL") {
            ai = ai.with_embedding_model(model);
        }
        if let Some(url) = lookup("OPENAI_BASE_URL") {
            if !url.starts_with("http://") && !url.starts_with("https://") {
                return Err(ConfigError::Invalid(format!(
                    "OPENAI_BASE_URL must be an http(s) URL, got {url:?}"
                )));
            }
            ai = ai.with_base_url(url);
        }
        if let Some(secs) = lookup("OPENAI_TIMEOUT_SECS") {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                ConfigError::Invalid(format!(
                    "OPENAI_TIMEOUT_SECS must be a whole number of seconds, got {secs:?}"
                ))
            })?;
            ai = ai.with_timeout(Duration::from_secs(secs))?;
        }
        Ok(ai)
    }

    /// Set the chat model (default: gpt-4o-mini).
    pub fn with_model(mut self, model: impl Into<String>) -> Self {
        self.model = model.into();
        self
    }

    /// Set the embedding model (default: text-embedding-3-small).
    pub fn with_embedding_model(mut self, model: impl Into<String>) -> Self {
        self.embedding_model = model.into();
        self
    }

    /// Set a custom base URL (for Azure, proxies, etc.).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.client = self.client.with_base_url(url);
        self
    }

    /// Apply a per-request HTTP timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, ConfigError> {
        self.client = self
            .client
            .with_timeout(timeout)
            .map_err(|e| ConfigError::Invalid(e.to_string()))?;
        Ok(self)
    }

    /// Set how many texts go into one embeddings request (default: 64).
    pub fn with_embedding_batch_size(mut self, size: usize) -> Self {
        self.embedding_batch_size = size.max(1);
        self
    }

    /// Get the current chat model name.
    pub fn model(&self) -> &str {
        &self.model
    }

    /// Get the current embedding model name.
    pub fn embedding_model(&self) -> &str {
        &self.embedding_model
    }

    /// Get the underlying REST client.
    pub fn client(&self) -> &OpenAIClient {
        &self.client
    }
}

#[async_trait]
impl TextGenerator for OpenAI {
    async fn generate(
        &self,
        prompt: &str,
        options: &GenerationOptions,
    ) -> Result<String, GenerationError> {
        let request = ChatRequest::new(&self.model)
            .message(Message::user(prompt))
            .temperature(options.temperature);

        let response = self
            .client
            .chat_completion(request)
            .await
            .map_err(generation_error)?;

        if let Some(usage) = &response.usage {
            debug!(
                model = %self.model,
                prompt_tokens = usage.prompt_tokens,
                completion_tokens = usage.completion_tokens,
                "OpenAI generation usage"
            );
        }

        Ok(response.content)
    }
}

#[async_trait]
impl Embedder for OpenAI {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        self.client
            .create_embedding(text, &self.embedding_model)
            .await
            .map_err(embedding_error)
    }

    fn max_batch_size(&self) -> usize {
        self.embedding_batch_size
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
        debug!(
            model = %self.embedding_model,
            batch_len = texts.len(),
            "OpenAI batch embedding"
        );

        self.client
            .create_embeddings_batch(texts, &self.embedding_model)
            .await
            .map_err(embedding_error)
    }
}

fn generation_error(error: OpenAIError) -> GenerationError {
    match error {
        OpenAIError::Timeout => GenerationError::Timeout,
        OpenAIError::Auth(msg) => GenerationError::Auth(msg),
        OpenAIError::RateLimited(msg) => GenerationError::RateLimited(msg),
        OpenAIError::Config(msg) | OpenAIError::Network(msg) => GenerationError::Request(msg),
        OpenAIError::Api(msg) | OpenAIError::Parse(msg) => GenerationError::Provider(msg),
    }
}

fn embedding_error(error: OpenAIError) -> EmbeddingError {
    match error {
        OpenAIError::Timeout => EmbeddingError::Timeout,
        OpenAIError::Auth(msg) => EmbeddingError::Auth(msg),
        OpenAIError::RateLimited(msg) => EmbeddingError::RateLimited(msg),
        OpenAIError::Config(msg) | OpenAIError::Network(msg) => EmbeddingError::Request(msg),
        OpenAIError::Api(msg) | OpenAIError::Parse(msg) => EmbeddingError::Provider(msg),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| vars.get(key).cloned()
    }

    #[test]
    fn test_openai_builder() {
        let ai = OpenAI::new("sk-test")
            .with_model("gpt-4o")
            .with_embedding_model("text-embedding-3-large")
            .with_base_url("https://custom.api.com/");

        assert_eq!(ai.model(), "gpt-4o");
        assert_eq!(ai.embedding_model(), "text-embedding-3-large");
        assert_eq!(ai.client().base_url(), "https://custom.api.com");
    }

    #[test]
    fn test_from_lookup_defaults() {
        let ai = OpenAI::from_lookup(lookup(&[("OPENAI_API_KEY", "sk-test")])).unwrap();
        assert_eq!(ai.model(), DEFAULT_CHAT_MODEL);
        assert_eq!(ai.embedding_model(), DEFAULT_EMBEDDING_MODEL);
        assert_eq!(ai.client().api_key(), "sk-test");
    }

    #[test]
    fn test_from_lookup_overrides() {
        let ai = OpenAI::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("JOURNAL_CHAT_MODEL", "gpt-4o"),
            ("JOURNAL_EMBEDDING_MODEL", "text-embedding-3-large"),
            ("OPENAI_BASE_URL", "http://localhost:8080/v1"),
        ]))
        .unwrap();

        assert_eq!(ai.model(), "gpt-4o");
        assert_eq!(ai.embedding_model(), "text-embedding-3-large");
        assert_eq!(ai.client().base_url(), "http://localhost:8080/v1");
    }

    #[test]
    fn test_from_lookup_timeout() {
        let ai = OpenAI::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_TIMEOUT_SECS", "30"),
        ]));
        assert!(ai.is_ok());

        let err = OpenAI::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_TIMEOUT_SECS", "soon"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_debug_redacts_api_key() {
        let ai = OpenAI::new("sk-secret");
        let debug = format!("{:?}", ai);

        assert!(!debug.contains("sk-secret"));
        assert!(debug.contains("gpt-4o-mini"));
    }

    #[test]
    fn test_embedding_batch_size() {
        let ai = OpenAI::new("sk-test");
        assert_eq!(ai.max_batch_size(), DEFAULT_EMBEDDING_BATCH_SIZE);
        assert_eq!(ai.with_embedding_batch_size(0).max_batch_size(), 1);
    }

    #[test]
    fn test_from_lookup_requires_key() {
        let err = OpenAI::from_lookup(lookup(&[("OPENAI_API_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::MissingEnv("OPENAI_API_KEY")));

        let err = OpenAI::from_lookup(lookup(&[
            ("OPENAI_API_KEY", "sk-test"),
            ("OPENAI_BASE_URL", "localhost"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid(_)));
    }

    #[test]
    fn test_error_mapping() {
        assert!(matches!(
            generation_error(OpenAIError::Timeout),
            GenerationError::Timeout
        ));
        assert!(matches!(
            generation_error(OpenAIError::Api("500: boom".into())),
            GenerationError::Provider(_)
        ));
        assert!(matches!(
            embedding_error(OpenAIError::RateLimited("quota".into())),
            EmbeddingError::RateLimited(_)
        ));
        assert!(matches!(
            embedding_error(OpenAIError::Network("refused".into())),
            EmbeddingError::Request(_)
        ));
    }
}
