//! Journal Insights
//!
//! Structured mood analysis of journal entries and question answering over a
//! user's journal, backed by hosted language and embedding models.
//!
//! # Design
//!
//! - One model call per entry analysis, validated before anything is returned
//! - Retrieval picks the entries most similar to the question
//! - Answers are built by refining over retrieved entries one at a time, so no
//!   prompt ever carries the whole journal
//! - Model providers sit behind small traits; the engine never stores anything
//!
//! # Usage
//!
//! ```rust,ignore
//! use journal_insights::{Analyzer, Answerer, Entry};
//! use journal_insights::ai::OpenAI;
//!
//! let ai = OpenAI::from_env()?;
//!
//! let analyzer = Analyzer::new(ai.clone());
//! let record = analyzer.analyze("Today I finally got the promotion!").await?;
//!
//! let answerer = Answerer::new(ai.clone(), ai);
//! let answer = answerer.answer("What has been stressing me out?", &entries).await?;
//! ```
//!
//! # Modules
//!
//! - [`traits`] - Model boundaries (TextGenerator, Embedder) and caches
//! - [`types`] - Entries, analysis records, documents, configuration
//! - [`pipeline`] - Analysis, validation, embedding and answering
//! - [`stores`] - Vector index and in-memory embedding cache
//! - [`testing`] - Mock implementations for testing

pub mod error;
pub mod pipeline;
pub mod stores;
pub mod testing;
pub mod traits;
pub mod types;

#[cfg(feature = "openai")]
pub mod ai;

// Re-export core types at crate root
pub use error::{
    AnalysisError, AnalysisResult, ConfigError, DimensionMismatchError, EmbeddingError,
    GenerationError, QaError, QaResult, ValidationError, ValidationErrorKind,
};
pub use traits::{
    ai::{Embedder, GenerationOptions, TextGenerator},
    cache::EmbeddingCache,
};
pub use types::{
    analysis::{AnalysisRecord, EntryAnalysis},
    config::{AnalyzerConfig, AnswerConfig},
    document::{DocumentMetadata, EmbeddedDocument, RetrievalResult, ScoredDocument},
    entry::Entry,
};

// Re-export pipeline components
pub use pipeline::{
    analysis_prompt_hash, embed_entries, format_instructions, validate, Analyzer, Answerer,
};

// Re-export stores
pub use stores::{cosine_similarity, MemoryEmbeddingCache, SimilarityMetric, VectorIndex};

// Re-export testing utilities
pub use testing::{MockEmbedder, MockGenerator};
