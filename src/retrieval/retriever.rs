//! Retriever contract and the index-backed adapter

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::embedding::TextEmbedder;
use crate::error::RetrieveError;
use crate::index::{IndexMatch, PageFilter, VectorIndex};

use super::ScoredMatch;

/// Scored similarity retrieval for one query string
#[async_trait]
pub trait Retriever: Send + Sync {
    /// Return up to `top_k` matches by descending score, restricted to
    /// pages in `filter` when provided
    async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        filter: Option<&PageFilter>,
    ) -> Result<Vec<ScoredMatch>, RetrieveError>;
}

/// Adapter gluing an embedder and one vector index to the `Retriever`
/// contract
pub struct IndexRetriever {
    embedder: Arc<dyn TextEmbedder>,
    index: Arc<dyn VectorIndex>,
}

impl IndexRetriever {
    pub fn new(embedder: Arc<dyn TextEmbedder>, index: Arc<dyn VectorIndex>) -> Self {
        Self { embedder, index }
    }
}

#[async_trait]
impl Retriever for IndexRetriever {
    async fn retrieve(
        &self,
        query: &str,
        top_k: usize,
        filter: Option<&PageFilter>,
    ) -> Result<Vec<ScoredMatch>, RetrieveError> {
        let vectors = self
            .embedder
            .embed(&[query])
            .await
            .map_err(|e| RetrieveError::Embedding(format!("query embedding failed: {e}")))?;

        let vector = vectors
            .first()
            .ok_or_else(|| RetrieveError::Embedding("embedder returned no vector".to_string()))?;

        let matches = self
            .index
            .query(vector, top_k, filter)
            .await
            .map_err(|e| {
                RetrieveError::Retrieval(format!("{} index: {e}", self.index.name()))
            })?;

        Ok(matches
            .into_iter()
            .filter_map(|m| to_scored_match(m, self.index.name()))
            .collect())
    }
}

/// Map raw index metadata to a typed match
///
/// Matches missing page or file attribution are unusable downstream and
/// dropped here.
fn to_scored_match(m: IndexMatch, index_name: &str) -> Option<ScoredMatch> {
    let page_id = metadata_i64(&m.metadata, "page_id");
    let file_id = metadata_i64(&m.metadata, "file_id");

    match (page_id, file_id) {
        (Some(page_id), Some(file_id)) => Some(ScoredMatch {
            score: m.score,
            page_id,
            file_id,
            text: m
                .metadata
                .get("chunk")
                .and_then(|v| v.as_str())
                .map(|s| s.to_string()),
            metadata: m.metadata,
        }),
        _ => {
            debug!(
                "Dropping match '{}' from {} index: missing page_id/file_id metadata",
                m.id, index_name
            );
            None
        }
    }
}

/// Read an integer metadata field
///
/// Pinecone stores numeric metadata as floats, so accept both encodings.
fn metadata_i64(metadata: &serde_json::Value, key: &str) -> Option<i64> {
    let value = metadata.get(key)?;
    value
        .as_i64()
        .or_else(|| value.as_f64().map(|f| f as i64))
}
