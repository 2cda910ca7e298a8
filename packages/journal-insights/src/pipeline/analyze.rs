//! Structured analysis of single journal entries.
//!
//! prompt -> generate (temperature 0) -> validate. A malformed response fails
//! the analysis outright; there is no retry at this level.

use std::time::Instant;

use chrono::Utc;
use tracing::{debug, info, warn};

use crate::error::{AnalysisError, AnalysisResult, GenerationError};
use crate::pipeline::prompts::{analysis_prompt_hash, format_analysis_prompt};
use crate::pipeline::validate::{format_instructions, validate};
use crate::traits::ai::{GenerationOptions, TextGenerator};
use crate::types::{
    analysis::{AnalysisRecord, EntryAnalysis},
    config::AnalyzerConfig,
    entry::Entry,
};

/// Turns entry text into validated analysis records.
pub struct Analyzer<G: TextGenerator> {
    generator: G,
    config: AnalyzerConfig,
}

impl<G: TextGenerator> Analyzer<G> {
    /// Create an analyzer with default configuration.
    pub fn new(generator: G) -> Self {
        Self::with_config(generator, AnalyzerConfig::default())
    }

    /// Create an analyzer with custom configuration.
    pub fn with_config(generator: G, config: AnalyzerConfig) -> Self {
        Self { generator, config }
    }

    pub fn config(&self) -> &AnalyzerConfig {
        &self.config
    }

    pub fn generator(&self) -> &G {
        &self.generator
    }

    /// Analyze one entry's text.
    ///
    /// Returns a complete record or an error; the caller persists the record.
    pub async fn analyze(&self, entry_text: &str) -> AnalysisResult<AnalysisRecord> {
        let start = Instant::now();
        let prompt = format_analysis_prompt(entry_text, format_instructions());
        let options = GenerationOptions::with_temperature(self.config.temperature);

        debug!(
            entry_len = entry_text.len(),
            prompt_len = prompt.len(),
            "Requesting entry analysis"
        );

        let call = self.generator.generate(&prompt, &options);
        let raw = match self.config.timeout {
            Some(timeout) => tokio::time::timeout(timeout, call)
                .await
                .unwrap_or(Err(GenerationError::Timeout)),
            None => call.await,
        }
        .map_err(|e| {
            warn!(error = %e, "Analysis generation failed");
            AnalysisError::Generation(e)
        })?;

        let record = validate(&raw).map_err(|e| {
            warn!(
                error = %e,
                response_preview = %preview(&e.raw),
                "Analysis response failed validation"
            );
            AnalysisError::Validation(e)
        })?;

        info!(
            mood = %record.mood,
            subject = %record.subject,
            sentiment_score = record.sentiment_score,
            duration_ms = start.elapsed().as_millis(),
            "Entry analyzed"
        );

        Ok(record)
    }

    /// Analyze an entry and stamp the result with the content and prompt
    /// hashes it was computed from.
    pub async fn analyze_entry(&self, entry: &Entry) -> AnalysisResult<EntryAnalysis> {
        let record = self.analyze(&entry.content).await?;

        Ok(EntryAnalysis {
            entry_id: entry.id.clone(),
            record,
            content_hash: entry.content_hash(),
            prompt_hash: analysis_prompt_hash(),
            analyzed_at: Utc::now(),
        })
    }
}

fn preview(text: &str) -> &str {
    match text.char_indices().nth(200) {
        Some((end, _)) => &text[..end],
        None => text,
    }
}
