//! Journal entry types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

/// One user-authored journal entry.
///
/// Entries are owned by the persistence layer. The engine only reads them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    /// Opaque identifier, unique within the owner's entries
    pub id: String,

    /// Owner of the entry
    pub owner_id: String,

    /// Free-text content
    pub content: String,

    /// When the entry was created
    pub created_at: DateTime<Utc>,
}

impl Entry {
    /// Create a new entry stamped with the current time.
    pub fn new(
        id: impl Into<String>,
        owner_id: impl Into<String>,
        content: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            owner_id: owner_id.into(),
            content: content.into(),
            created_at: Utc::now(),
        }
    }

    /// Set the creation timestamp.
    pub fn with_created_at(mut self, created_at: DateTime<Utc>) -> Self {
        self.created_at = created_at;
        self
    }

    /// SHA-256 of the content.
    ///
    /// Any edit changes the hash, which is how stale analyses and cached
    /// embeddings are detected.
    pub fn content_hash(&self) -> String {
        hash_text(&self.content)
    }
}

/// Hex SHA-256 of a string.
pub(crate) fn hash_text(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    format!("{:x}", hasher.finalize())
}
