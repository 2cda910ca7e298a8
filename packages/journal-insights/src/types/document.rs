//! Embedded documents and retrieval results.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::entry::Entry;

/// Metadata carried alongside an embedded entry.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DocumentMetadata {
    pub created_at: DateTime<Utc>,
    pub owner_id: String,
}

/// An entry paired with its embedding.
///
/// Built per question and discarded afterwards.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmbeddedDocument {
    /// Mirrors the entry id
    pub id: String,

    /// Dense vector from the embedding model
    pub vector: Vec<f32>,

    /// Text that was embedded
    pub text: String,

    pub metadata: DocumentMetadata,
}

impl EmbeddedDocument {
    /// Create a document from an entry and its embedding.
    pub fn from_entry(entry: &Entry, vector: Vec<f32>) -> Self {
        Self {
            id: entry.id.clone(),
            vector,
            text: entry.content.clone(),
            metadata: DocumentMetadata {
                created_at: entry.created_at,
                owner_id: entry.owner_id.clone(),
            },
        }
    }

    /// Vector dimensionality.
    pub fn dimension(&self) -> usize {
        self.vector.len()
    }
}

/// A document with its similarity to the query.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredDocument {
    pub document: EmbeddedDocument,

    /// Higher is more similar
    pub score: f32,
}

/// Ranked search hits, best first, at most `k` long.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RetrievalResult {
    hits: Vec<ScoredDocument>,
}

impl RetrievalResult {
    pub(crate) fn new(hits: Vec<ScoredDocument>) -> Self {
        Self { hits }
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    /// Hits in ranked order.
    pub fn hits(&self) -> &[ScoredDocument] {
        &self.hits
    }

    /// Document ids in ranked order.
    pub fn ids(&self) -> Vec<&str> {
        self.hits.iter().map(|h| h.document.id.as_str()).collect()
    }

    /// The best hit, if any.
    pub fn top(&self) -> Option<&ScoredDocument> {
        self.hits.first()
    }

    pub fn into_hits(self) -> Vec<ScoredDocument> {
        self.hits
    }
}

impl<'a> IntoIterator for &'a RetrievalResult {
    type Item = &'a ScoredDocument;
    type IntoIter = std::slice::Iter<'a, ScoredDocument>;

    fn into_iter(self) -> Self::IntoIter {
        self.hits.iter()
    }
}
