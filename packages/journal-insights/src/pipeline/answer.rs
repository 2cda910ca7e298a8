//! Retrieval-refine question answering over a user's entries.
//!
//! 1. Embed every entry (bounded fan-out, results kept in entry order)
//! 2. Build a fresh [`VectorIndex`]
//! 3. Embed the question and take the top-K entries
//! 4. Answer from the best entry, then refine the answer with each following
//!    entry in rank order, one model call per entry
//!
//! Each refine call only ever sees one entry, so prompt size stays bounded no
//! matter how large the journal grows.

use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

use tokio::time::Instant as Deadline;
use tracing::{debug, info, warn};

use crate::error::{EmbeddingError, GenerationError, QaError, QaResult};
use crate::pipeline::embed::embed_entries;
use crate::pipeline::prompts::{format_answer_prompt, format_document_context, format_refine_prompt};
use crate::stores::VectorIndex;
use crate::traits::{
    ai::{Embedder, GenerationOptions, TextGenerator},
    cache::EmbeddingCache,
};
use crate::types::{
    config::AnswerConfig,
    document::{RetrievalResult, ScoredDocument},
    entry::Entry,
};

/// Answers free-form questions from the entries most relevant to them.
pub struct Answerer<G: TextGenerator, E: Embedder> {
    generator: G,
    embedder: E,
    config: AnswerConfig,
    cache: Option<Arc<dyn EmbeddingCache>>,
}

impl<G: TextGenerator, E: Embedder> Answerer<G, E> {
    /// Create an answerer with default configuration.
    pub fn new(generator: G, embedder: E) -> Self {
        Self::with_config(generator, embedder, AnswerConfig::default())
    }

    /// Create an answerer with custom configuration.
    pub fn with_config(generator: G, embedder: E, config: AnswerConfig) -> Self {
        Self {
            generator,
            embedder,
            config,
            cache: None,
        }
    }

    /// Reuse entry embeddings across questions.
    pub fn with_cache(mut self, cache: Arc<dyn EmbeddingCache>) -> Self {
        self.cache = Some(cache);
        self
    }

    pub fn config(&self) -> &AnswerConfig {
        &self.config
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    pub fn embedder(&self) -> &E {
        &self.embedder
    }

    /// Answer `question` from `entries`.
    ///
    /// An empty entry list fails with [`QaError::EmptyCorpus`] before any
    /// model is called. A failed refine step fails with
    /// [`QaError::RefineFailure`] carrying the last confirmed answer.
    pub async fn answer(&self, question: &str, entries: &[Entry]) -> QaResult<String> {
        if entries.is_empty() {
            return Err(QaError::EmptyCorpus);
        }

        let start = Instant::now();
        let deadline = self.config.timeout.map(|t| Deadline::now() + t);

        let retrieved = self.retrieve_with_deadline(question, entries, deadline).await?;

        debug!(
            question_len = question.len(),
            entries = entries.len(),
            retrieved = retrieved.len(),
            top_score = retrieved.top().map(|h| h.score),
            "Retrieved entries for question"
        );

        let answer = self.refine(question, &retrieved, deadline).await?;

        info!(
            entries = entries.len(),
            refine_steps = retrieved.len(),
            duration_ms = start.elapsed().as_millis(),
            "Question answered"
        );

        Ok(answer)
    }

    /// Rank `entries` against `question` without generating an answer.
    pub async fn retrieve(&self, question: &str, entries: &[Entry]) -> QaResult<RetrievalResult> {
        if entries.is_empty() {
            return Err(QaError::EmptyCorpus);
        }
        let deadline = self.config.timeout.map(|t| Deadline::now() + t);
        self.retrieve_with_deadline(question, entries, deadline).await
    }

    async fn retrieve_with_deadline(
        &self,
        question: &str,
        entries: &[Entry],
        deadline: Option<Deadline>,
    ) -> QaResult<RetrievalResult> {
        let documents = within(
            deadline,
            embed_entries(
                &self.embedder,
                self.cache.as_deref(),
                entries,
                self.config.effective_concurrency(),
            ),
            EmbeddingError::Timeout,
        )
        .await?;

        let index = VectorIndex::build_with_metric(documents, self.config.metric)?;

        let query = within(deadline, self.embedder.embed(question), EmbeddingError::Timeout)
            .await
            .map_err(|e| {
                warn!(error = %e, "Question embedding failed");
                e
            })?;

        Ok(index.search(&query, self.config.effective_top_k())?)
    }

    /// Fold retrieved documents into one answer, strictly in rank order.
    async fn refine(
        &self,
        question: &str,
        retrieved: &RetrievalResult,
        deadline: Option<Deadline>,
    ) -> QaResult<String> {
        let mut running: Option<String> = None;

        for (i, hit) in retrieved.hits().iter().enumerate() {
            let step = i + 1;
            running = match self.refine_step(question, running.as_deref(), hit, deadline).await {
                Ok(answer) => Some(answer),
                Err(source) => {
                    warn!(step, error = %source, "Refine step failed");
                    return Err(QaError::RefineFailure {
                        step,
                        last_good_answer: running,
                        source,
                    });
                }
            };
        }

        // Retrieval over a non-empty corpus always yields at least one hit.
        running.ok_or(QaError::EmptyCorpus)
    }

    /// One refine step: produce the next running answer from the previous one
    /// and a single document.
    async fn refine_step(
        &self,
        question: &str,
        existing_answer: Option<&str>,
        hit: &ScoredDocument,
        deadline: Option<Deadline>,
    ) -> Result<String, GenerationError> {
        let context = format_document_context(&hit.document);
        let prompt = match existing_answer {
            None => format_answer_prompt(question, &context),
            Some(existing) => format_refine_prompt(question, existing, &context),
        };
        let options = GenerationOptions::with_temperature(self.config.temperature);

        debug!(
            document_id = %hit.document.id,
            score = hit.score,
            prompt_len = prompt.len(),
            refining = existing_answer.is_some(),
            "Refine step"
        );

        let answer = within(
            deadline,
            self.generator.generate(&prompt, &options),
            GenerationError::Timeout,
        )
        .await?;

        let answer = answer.trim();
        if answer.is_empty() {
            return Err(GenerationError::EmptyResponse);
        }
        Ok(answer.to_string())
    }
}

/// Run `call` until the optional deadline, mapping expiry to `on_timeout`.
async fn within<T, Err, F>(deadline: Option<Deadline>, call: F, on_timeout: Err) -> Result<T, Err>
where
    F: Future<Output = Result<T, Err>>,
{
    match deadline {
        Some(deadline) => tokio::time::timeout_at(deadline, call)
            .await
            .unwrap_or(Err(on_timeout)),
        None => call.await,
    }
}
