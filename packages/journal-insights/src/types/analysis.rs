//! Analysis record types - the structured profile extracted from an entry.

use chrono::{DateTime, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use super::entry::Entry;

/// Lowest allowed sentiment score.
pub const SENTIMENT_MIN: f64 = -10.0;

/// Highest allowed sentiment score.
pub const SENTIMENT_MAX: f64 = 10.0;

/// Example value shown to the model for the color field.
pub const COLOR_EXAMPLE: &str = "#0101fe";

/// Emotional and topical profile of one journal entry.
///
/// Either all six fields are present and valid or the record does not
/// exist; the validator never produces a partial record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    /// the mood of the person who wrote the journal entry
    pub mood: String,

    /// the subject of the journal entry
    pub subject: String,

    /// is the journal entry negative? (i.e. does it contain negative emotions?)
    pub negative: bool,

    /// quick summary of the entire entry
    pub summary: String,

    /// a hexadecimal color code that represents the mood of the entry
    pub color: String,

    /// sentiment of the text rated on a scale from -10 to 10, where -10 is extremely negative, 0 is neutral, and 10 is extremely positive
    pub sentiment_score: f64,
}

/// An analysis stamped with what it was computed from.
///
/// Content edits and prompt changes both make a stored analysis stale.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntryAnalysis {
    /// Entry this analysis belongs to
    pub entry_id: String,

    /// The validated record
    pub record: AnalysisRecord,

    /// Hash of the entry content that was analyzed
    pub content_hash: String,

    /// Hash of the analysis prompt template used
    pub prompt_hash: String,

    /// When the analysis was produced
    pub analyzed_at: DateTime<Utc>,
}

impl EntryAnalysis {
    /// Check if the entry content has changed since this analysis.
    pub fn is_content_stale(&self, entry: &Entry) -> bool {
        self.entry_id != entry.id || self.content_hash != entry.content_hash()
    }

    /// Check if this analysis was generated with a different prompt.
    pub fn is_prompt_stale(&self, current_prompt_hash: &str) -> bool {
        self.prompt_hash != current_prompt_hash
    }

    /// True when the analysis still describes `entry` under the current prompt.
    pub fn is_current_for(&self, entry: &Entry) -> bool {
        !self.is_content_stale(entry)
            && !self.is_prompt_stale(&crate::pipeline::prompts::analysis_prompt_hash())
    }
}
