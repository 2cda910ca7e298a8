//! LLM prompts for analysis and retrieval-refine answering.
//!
//! Templates use `{name}` placeholders filled in a single pass, so braces in
//! entry text or model answers are never re-expanded.

use sha2::{Digest, Sha256};

use crate::types::document::EmbeddedDocument;

/// Prompt for extracting an analysis record from one entry.
pub const ANALYSIS_PROMPT: &str = r#"Analyze the following journal entry. Follow the instructions and format your response to match the format instructions, no matter what!

{format_instructions}

Journal entry:
{entry}"#;

/// Prompt for the first document of the refine loop.
pub const ANSWER_PROMPT: &str = r#"Context from the user's journal is below.
---------------------
{context}
---------------------
Using only this context and no prior knowledge, answer the question: {question}"#;

/// Prompt for folding one more document into the running answer.
pub const REFINE_PROMPT: &str = r#"The original question is: {question}
We have provided an existing answer: {existing_answer}
We have the opportunity to refine the existing answer (only if needed) with one more journal entry below.
------------
{context}
------------
Given the new context, revise or extend the existing answer so it better answers the question. If the new context is not relevant to the question, return the existing answer unchanged."#;

/// The prompts the engine knows how to build.
#[derive(Debug, Clone, Copy)]
pub enum PromptTemplate<'a> {
    /// Entry text plus format instructions into an extraction request
    Analysis {
        entry: &'a str,
        format_instructions: &'a str,
    },

    /// Initial answer from the top-ranked document
    Answer { question: &'a str, context: &'a str },

    /// Refinement of a running answer with one more document
    Refine {
        question: &'a str,
        existing_answer: &'a str,
        context: &'a str,
    },
}

impl PromptTemplate<'_> {
    /// Render the prompt.
    pub fn build(&self) -> String {
        match *self {
            Self::Analysis {
                entry,
                format_instructions,
            } => fill_template(
                ANALYSIS_PROMPT,
                &[("format_instructions", format_instructions), ("entry", entry)],
            ),
            Self::Answer { question, context } => fill_template(
                ANSWER_PROMPT,
                &[("question", question), ("context", context)],
            ),
            Self::Refine {
                question,
                existing_answer,
                context,
            } => fill_template(
                REFINE_PROMPT,
                &[
                    ("question", question),
                    ("existing_answer", existing_answer),
                    ("context", context),
                ],
            ),
        }
    }
}

/// Generate a hash of the analysis prompt for invalidating stored analyses.
pub fn analysis_prompt_hash() -> String {
    let mut hasher = Sha256::new();
    hasher.update(ANALYSIS_PROMPT.as_bytes());
    hasher.update(super::validate::format_instructions().as_bytes());
    format!("{:x}", hasher.finalize())
}

/// Format the analysis prompt for an entry.
pub fn format_analysis_prompt(entry: &str, format_instructions: &str) -> String {
    PromptTemplate::Analysis {
        entry,
        format_instructions,
    }
    .build()
}

/// Format the initial answer prompt.
pub fn format_answer_prompt(question: &str, context: &str) -> String {
    PromptTemplate::Answer { question, context }.build()
}

/// Format a refine prompt.
pub fn format_refine_prompt(question: &str, existing_answer: &str, context: &str) -> String {
    PromptTemplate::Refine {
        question,
        existing_answer,
        context,
    }
    .build()
}

/// Render a retrieved entry as prompt context.
pub fn format_document_context(document: &EmbeddedDocument) -> String {
    format!(
        "Journal entry written {}:\n{}",
        document.metadata.created_at.format("%Y-%m-%d"),
        document.text
    )
}

/// Replace `{key}` placeholders in one left-to-right pass.
///
/// Unknown placeholders are left as-is and substituted values are never
/// scanned again.
fn fill_template(template: &str, values: &[(&str, &str)]) -> String {
    let mut out = String::with_capacity(
        template.len() + values.iter().map(|(_, v)| v.len()).sum::<usize>(),
    );
    let mut rest = template;

    while let Some(open) = rest.find('{') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let matched = values.iter().find(|(key, _)| {
            after.starts_with(key) && after[key.len()..].starts_with('}')
        });

        match matched {
            Some((key, value)) => {
                out.push_str(value);
                rest = &after[key.len() + 1..];
            }
            None => {
                out.push('{');
                rest = after;
            }
        }
    }

    out.push_str(rest);
    out
}
