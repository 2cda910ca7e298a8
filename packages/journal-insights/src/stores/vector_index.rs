//! In-memory vector index over one question's worth of entries.
//!
//! Brute-force linear scan. A single user's journal is small enough that
//! scoring every vector is cheaper than maintaining an ANN structure, and the
//! scan gives exact, reproducible rankings.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::DimensionMismatchError;
use crate::types::document::{EmbeddedDocument, RetrievalResult, ScoredDocument};

/// How query and document vectors are compared. Higher scores rank first.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SimilarityMetric {
    /// Cosine of the angle between vectors
    #[default]
    Cosine,

    /// Raw dot product, for models that emit normalized vectors
    InnerProduct,
}

impl SimilarityMetric {
    /// Score two equal-length vectors.
    pub fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        match self {
            Self::Cosine => cosine_similarity(a, b),
            Self::InnerProduct => dot(a, b),
        }
    }
}

/// Calculate cosine similarity between two vectors.
///
/// Returns 0.0 for mismatched lengths or zero vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }

    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }

    dot(a, b) / (norm_a * norm_b)
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Fixed-dimension collection of embedded documents, indexed by position.
///
/// Insertion order is preserved and breaks ties between equal scores.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
    documents: Vec<EmbeddedDocument>,
    dimension: Option<usize>,
    metric: SimilarityMetric,
}

impl VectorIndex {
    /// Build a cosine index.
    ///
    /// Fails if any document's vector length differs from the first one's.
    pub fn build(documents: Vec<EmbeddedDocument>) -> Result<Self, DimensionMismatchError> {
        Self::build_with_metric(documents, SimilarityMetric::Cosine)
    }

    /// Build an index using `metric`.
    pub fn build_with_metric(
        documents: Vec<EmbeddedDocument>,
        metric: SimilarityMetric,
    ) -> Result<Self, DimensionMismatchError> {
        let dimension = documents.first().map(EmbeddedDocument::dimension);

        if let Some(expected) = dimension {
            if let Some(bad) = documents.iter().find(|d| d.dimension() != expected) {
                return Err(DimensionMismatchError {
                    document_id: bad.id.clone(),
                    expected,
                    actual: bad.dimension(),
                });
            }
        }

        debug!(
            documents = documents.len(),
            dimension = dimension.unwrap_or(0),
            ?metric,
            "Built vector index"
        );

        Ok(Self {
            documents,
            dimension,
            metric,
        })
    }

    /// Number of indexed documents.
    pub fn len(&self) -> usize {
        self.documents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.documents.is_empty()
    }

    /// Shared vector length, `None` for an empty index.
    pub fn dimension(&self) -> Option<usize> {
        self.dimension
    }

    pub fn metric(&self) -> SimilarityMetric {
        self.metric
    }

    /// Documents in insertion order.
    pub fn documents(&self) -> &[EmbeddedDocument] {
        &self.documents
    }

    /// Return the `k` documents most similar to `query`, best first.
    ///
    /// An empty index returns an empty result for any query. A `k` larger
    /// than the index returns every document. A query whose length differs
    /// from the index dimension is rejected.
    pub fn search(&self, query: &[f32], k: usize) -> Result<RetrievalResult, DimensionMismatchError> {
        let Some(expected) = self.dimension else {
            return Ok(RetrievalResult::default());
        };

        if query.len() != expected {
            return Err(DimensionMismatchError {
                document_id: "<query>".to_string(),
                expected,
                actual: query.len(),
            });
        }

        let mut scored: Vec<(usize, f32)> = self
            .documents
            .iter()
            .enumerate()
            .map(|(position, doc)| {
                let score = self.metric.score(query, &doc.vector);
                (position, if score.is_nan() { f32::NEG_INFINITY } else { score })
            })
            .collect();

        // Stable sort: equal scores keep insertion order.
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(Ordering::Equal));
        scored.truncate(k);

        Ok(RetrievalResult::new(
            scored
                .into_iter()
                .map(|(position, score)| ScoredDocument {
                    document: self.documents[position].clone(),
                    score,
                })
                .collect(),
        ))
    }
}
