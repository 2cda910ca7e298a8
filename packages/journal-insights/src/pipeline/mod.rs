//! Analysis and question-answering pipelines.
//!
//! - [`analyze`] - Entry text to validated [`AnalysisRecord`](crate::AnalysisRecord)
//! - [`answer`] - Retrieve relevant entries, then answer and refine
//! - [`embed`] - Bounded-concurrency entry embedding
//! - [`prompts`] - Prompt templates and their hashes
//! - [`validate`] - Model output parsing and validation

pub mod analyze;
pub mod answer;
pub mod embed;
pub mod prompts;
pub mod validate;

pub use analyze::Analyzer;
pub use answer::Answerer;
pub use embed::embed_entries;
pub use prompts::{
    analysis_prompt_hash, format_analysis_prompt, format_answer_prompt, format_document_context,
    format_refine_prompt, PromptTemplate, ANALYSIS_PROMPT, ANSWER_PROMPT, REFINE_PROMPT,
};
pub use validate::{format_instructions, validate};
