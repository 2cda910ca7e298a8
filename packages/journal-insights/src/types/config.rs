//! Configuration types for analysis and question answering.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::stores::SimilarityMetric;

/// Configuration for the structured analyzer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzerConfig {
    /// Sampling temperature for the extraction call.
    ///
    /// Default: 0.0, so repeated analyses of the same entry agree.
    pub temperature: f32,

    /// Deadline for the whole `analyze` call. Default: none.
    #[serde(default)]
    pub timeout: Option<Duration>,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            temperature: 0.0,
            timeout: None,
        }
    }
}

impl AnalyzerConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the deadline for one analysis.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Configuration for the retrieval-refine answerer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnswerConfig {
    /// Number of entries retrieved per question.
    ///
    /// Each retrieved entry costs one sequential model call in the refine
    /// loop. Default: 4. Zero is treated as 1.
    pub top_k: usize,

    /// Maximum embedding calls in flight at once. Default: 8.
    pub max_concurrent_embeddings: usize,

    /// Sampling temperature for answer and refine calls. Default: 0.0.
    pub temperature: f32,

    /// Similarity used to rank entries. Default: cosine.
    #[serde(default)]
    pub metric: SimilarityMetric,

    /// Deadline for the whole `answer` call. Default: none.
    ///
    /// Expiry during refinement yields `RefineFailure` with the last
    /// confirmed answer.
    #[serde(default)]
    pub timeout: Option<Duration>,
}

impl Default for AnswerConfig {
    fn default() -> Self {
        Self {
            top_k: 4,
            max_concurrent_embeddings: 8,
            temperature: 0.0,
            metric: SimilarityMetric::Cosine,
            timeout: None,
        }
    }
}

impl AnswerConfig {
    /// Create a new config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set how many entries feed the refine loop.
    pub fn with_top_k(mut self, top_k: usize) -> Self {
        self.top_k = top_k;
        self
    }

    /// Set the embedding fan-out limit.
    pub fn with_max_concurrent_embeddings(mut self, max: usize) -> Self {
        self.max_concurrent_embeddings = max;
        self
    }

    /// Set the similarity metric.
    pub fn with_metric(mut self, metric: SimilarityMetric) -> Self {
        self.metric = metric;
        self
    }

    /// Set the deadline for one answer.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub(crate) fn effective_top_k(&self) -> usize {
        self.top_k.max(1)
    }

    pub(crate) fn effective_concurrency(&self) -> usize {
        self.max_concurrent_embeddings.max(1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_answer_config_defaults() {
        let config = AnswerConfig::default();
        assert_eq!(config.top_k, 4);
        assert_eq!(config.temperature, 0.0);
        assert_eq!(config.metric, SimilarityMetric::Cosine);
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_zero_limits_are_clamped() {
        let config = AnswerConfig::new()
            .with_top_k(0)
            .with_max_concurrent_embeddings(0);
        assert_eq!(config.effective_top_k(), 1);
        assert_eq!(config.effective_concurrency(), 1);
    }

    #[test]
    fn test_config_deserializes_without_optional_fields() {
        let config: AnswerConfig = serde_json::from_str(
            r#"{"top_k": 2, "max_concurrent_embeddings": 3, "temperature": 0.2}"#,
        )
        .unwrap();
        assert_eq!(config.top_k, 2);
        assert_eq!(config.metric, SimilarityMetric::Cosine);
        assert!(config.timeout.is_none());
    }
}
