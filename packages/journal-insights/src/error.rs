//! Typed errors for the journal insights engine.
//!
//! Uses `thiserror` for library errors (not `anyhow`) so callers can match
//! on exactly what went wrong and decide their own retry policy.

use thiserror::Error;

/// Model output that does not match the analysis record shape.
///
/// Carries the offending raw text for diagnostics.
#[derive(Debug, Clone, Error)]
#[error("{kind}")]
pub struct ValidationError {
    /// What was wrong with the payload
    pub kind: ValidationErrorKind,

    /// The raw model output that failed validation
    pub raw: String,
}

impl ValidationError {
    pub fn new(kind: ValidationErrorKind, raw: impl Into<String>) -> Self {
        Self {
            kind,
            raw: raw.into(),
        }
    }
}

/// Reasons a model response can fail validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationErrorKind {
    /// No JSON object could be located in the text
    #[error("no JSON object found in model output")]
    PayloadNotFound,

    /// Something object-like was found but it is not valid JSON
    #[error("model output is not valid JSON: {0}")]
    Parse(String),

    /// A required field is absent (or null)
    #[error("missing required field `{0}`")]
    MissingField(&'static str),

    /// A field has the wrong JSON type
    #[error("field `{field}` must be {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },

    /// A numeric field is outside its allowed range
    #[error("field `{field}` is out of range: {value}")]
    OutOfRange { field: &'static str, value: f64 },

    /// A string field does not match its required pattern
    #[error("field `{field}` has an invalid format: {value:?}")]
    InvalidFormat { field: &'static str, value: String },
}

/// Failures from the text generation boundary.
#[derive(Debug, Clone, Error)]
pub enum GenerationError {
    /// Transport failure or malformed request
    #[error("generation request failed: {0}")]
    Request(String),

    /// The call did not finish in time
    #[error("generation timed out")]
    Timeout,

    /// Credentials were rejected
    #[error("generation authentication failed: {0}")]
    Auth(String),

    /// Rate limit or quota exhausted
    #[error("generation rate limited: {0}")]
    RateLimited(String),

    /// The provider returned an error response
    #[error("generation provider error: {0}")]
    Provider(String),

    /// The provider answered with no text
    #[error("generation returned an empty response")]
    EmptyResponse,
}

/// Failures from the embedding boundary.
#[derive(Debug, Clone, Error)]
pub enum EmbeddingError {
    /// Transport failure or malformed request
    #[error("embedding request failed: {0}")]
    Request(String),

    /// The call did not finish in time
    #[error("embedding timed out")]
    Timeout,

    /// Credentials were rejected
    #[error("embedding authentication failed: {0}")]
    Auth(String),

    /// Rate limit or quota exhausted
    #[error("embedding rate limited: {0}")]
    RateLimited(String),

    /// The provider returned an error response
    #[error("embedding provider error: {0}")]
    Provider(String),

    /// The provider returned a zero-length vector
    #[error("embedding returned an empty vector")]
    EmptyResponse,
}

/// Vectors of different lengths were mixed in one index.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("vector dimension mismatch for `{document_id}`: expected {expected}, got {actual}")]
pub struct DimensionMismatchError {
    /// Offending document (or `"<query>"` for a search vector)
    pub document_id: String,
    pub expected: usize,
    pub actual: usize,
}

/// Errors from the structured analysis path.
#[derive(Debug, Error)]
pub enum AnalysisError {
    /// The model answered but the answer was not a valid record
    #[error("analysis output failed validation: {0}")]
    Validation(#[from] ValidationError),

    /// The model could not be reached
    #[error("analysis generation failed: {0}")]
    Generation(#[from] GenerationError),
}

/// Errors from the question answering path.
#[derive(Debug, Error)]
pub enum QaError {
    /// No entries were supplied
    #[error("no entries to answer from")]
    EmptyCorpus,

    /// Embedding an entry or the question failed
    #[error("embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    /// Embeddings could not be indexed together
    #[error("vector index error: {0}")]
    Index(#[from] DimensionMismatchError),

    /// A refine step failed; `last_good_answer` is the answer confirmed by
    /// the previous step, if any.
    #[error("refine step {step} failed: {source}")]
    RefineFailure {
        /// 1-based step that failed
        step: usize,
        last_good_answer: Option<String>,
        #[source]
        source: GenerationError,
    },
}

impl QaError {
    /// The partial answer available when refinement was cut short.
    pub fn last_good_answer(&self) -> Option<&str> {
        match self {
            Self::RefineFailure {
                last_good_answer, ..
            } => last_good_answer.as_deref(),
            _ => None,
        }
    }
}

/// Configuration errors when building a client from the environment.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("environment variable {0} must be set")]
    MissingEnv(&'static str),

    #[error("invalid client configuration: {0}")]
    Invalid(String),
}

/// Result type alias for analysis operations.
pub type AnalysisResult<T> = std::result::Result<T, AnalysisError>;

/// Result type alias for question answering operations.
pub type QaResult<T> = std::result::Result<T, QaError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_error_keeps_raw_text() {
        let err = ValidationError::new(ValidationErrorKind::MissingField("mood"), "{}");
        assert_eq!(err.raw, "{}");
        assert_eq!(err.to_string(), "missing required field `mood`");
    }

    #[test]
    fn test_last_good_answer_only_on_refine_failure() {
        let err = QaError::RefineFailure {
            step: 2,
            last_good_answer: Some("partial".into()),
            source: GenerationError::Timeout,
        };
        assert_eq!(err.last_good_answer(), Some("partial"));
        assert_eq!(err.to_string(), "refine step 2 failed: generation timed out");

        assert_eq!(QaError::EmptyCorpus.last_good_answer(), None);
    }
}
