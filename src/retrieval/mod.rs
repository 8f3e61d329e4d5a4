//! Retrieval core - hierarchical two-stage retrieval over question and chunk indexes

mod hierarchical;
mod pipeline;
mod rerank;
mod retriever;

pub use hierarchical::{HierarchicalRetriever, RetrievalOptions};
pub use pipeline::RetrievalPipeline;
pub use rerank::{Reranker, ScoreReranker};
pub use retriever::{IndexRetriever, Retriever};

use serde::Serialize;

/// One scored match as returned by a `Retriever`
///
/// `text` is present for chunk-index matches and absent for question-index
/// matches.
#[derive(Debug, Clone, PartialEq)]
pub struct ScoredMatch {
    pub score: f32,
    pub page_id: i64,
    pub file_id: i64,
    pub text: Option<String>,
    pub metadata: serde_json::Value,
}

/// Candidate page surfaced by the question-index stage
#[derive(Debug, Clone, PartialEq)]
pub struct PageMatch {
    pub page_id: i64,
    pub file_id: i64,
    pub score: f32,
}

/// Chunk surfaced by the chunk-index stage, restricted to known pages
#[derive(Debug, Clone, PartialEq)]
pub struct ChunkMatch {
    pub chunk_text: String,
    pub score: f32,
    pub page_id: i64,
    pub file_id: i64,
    pub metadata: serde_json::Value,
}

/// Final externally-visible result unit
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RetrievalResult {
    pub chunk: String,
    pub score: f32,
    pub page_id: i64,
    pub file_id: i64,
    pub metadata: serde_json::Value,
}

impl From<ChunkMatch> for RetrievalResult {
    fn from(m: ChunkMatch) -> Self {
        Self {
            chunk: m.chunk_text,
            score: m.score,
            page_id: m.page_id,
            file_id: m.file_id,
            metadata: m.metadata,
        }
    }
}
