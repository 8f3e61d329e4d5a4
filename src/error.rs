//! Typed error kinds surfaced by the retrieval engine
//!
//! Provider plumbing (embedding, llm, index clients) reports failures with
//! `anyhow`; the core seams convert them into these kinds so callers can
//! tell expansion failures from retrieval failures from bad input.

use thiserror::Error;

/// Errors produced by the retrieval engine
#[derive(Debug, Error)]
pub enum RetrieveError {
    /// Query expansion failed outright or produced zero usable questions.
    /// Fatal for the request.
    #[error("query expansion failed: {0}")]
    Expansion(String),

    /// An embedding call failed. Recovered per sub-question unless the
    /// whole stage fails.
    #[error("embedding failed: {0}")]
    Embedding(String),

    /// A vector index query failed or timed out. Recovered per
    /// sub-question unless the whole stage fails.
    #[error("index query failed: {0}")]
    Retrieval(String),

    /// Malformed input, rejected before any external call.
    #[error("invalid input: {0}")]
    Validation(String),
}

impl RetrieveError {
    /// Short machine-readable kind, used by the HTTP error body
    pub fn kind(&self) -> &'static str {
        match self {
            RetrieveError::Expansion(_) => "expansion",
            RetrieveError::Embedding(_) => "embedding",
            RetrieveError::Retrieval(_) => "retrieval",
            RetrieveError::Validation(_) => "validation",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_names() {
        assert_eq!(RetrieveError::Expansion("x".into()).kind(), "expansion");
        assert_eq!(RetrieveError::Validation("x".into()).kind(), "validation");
    }

    #[test]
    fn test_display_includes_message() {
        let err = RetrieveError::Retrieval("question index unreachable".into());
        assert!(err.to_string().contains("question index unreachable"));
    }
}
