//! Retrieval pipeline - the single entry point for boundary layers

use std::sync::Arc;

use crate::config::Config;
use crate::embedding::{EmbeddingMode, EmbeddingProvider, TextEmbedder};
use crate::error::RetrieveError;
use crate::expand::PromptExpander;
use crate::index::{PineconeIndex, VectorIndex};
use crate::llm::{LlmProvider, LlmType};

use super::{
    HierarchicalRetriever, IndexRetriever, RetrievalOptions, RetrievalResult, ScoreReranker,
};

/// Thin execution wrapper around the hierarchical retriever
///
/// Boundary layers (CLI, HTTP) depend on this type only, independent of
/// how the retriever is composed internally.
pub struct RetrievalPipeline {
    retriever: HierarchicalRetriever,
}

impl RetrievalPipeline {
    pub fn new(retriever: HierarchicalRetriever) -> Self {
        Self { retriever }
    }

    /// Wire the full stack from configuration: embedding provider, LLM
    /// expander, and the two Pinecone-backed index retrievers
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let embedder: Arc<dyn TextEmbedder> = Arc::new(EmbeddingProvider::new(
            config.embedding.model.clone(),
            EmbeddingMode::from_config(&config.embedding)?,
        )?);

        let llm = LlmProvider::new(
            config.expansion.model.clone(),
            LlmType::from_config(&config.expansion)?,
        )?;
        let expander = Arc::new(PromptExpander::new(llm));

        let question_host = config
            .index
            .question_host
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("index.question_host not configured"))?;
        let chunk_host = config
            .index
            .chunk_host
            .as_deref()
            .ok_or_else(|| anyhow::anyhow!("index.chunk_host not configured"))?;

        let question_index: Arc<dyn VectorIndex> = Arc::new(PineconeIndex::new(
            "question",
            question_host,
            config.index.api_key.clone(),
            config.index.namespace.clone(),
        )?);
        let chunk_index: Arc<dyn VectorIndex> = Arc::new(PineconeIndex::new(
            "chunk",
            chunk_host,
            config.index.api_key.clone(),
            config.index.namespace.clone(),
        )?);

        let question_retriever =
            Arc::new(IndexRetriever::new(Arc::clone(&embedder), question_index));
        let chunk_retriever = Arc::new(IndexRetriever::new(embedder, chunk_index));

        let retriever = HierarchicalRetriever::new(
            expander,
            question_retriever,
            chunk_retriever,
            Arc::new(ScoreReranker),
            RetrievalOptions::from_config(&config.retrieval, config.expansion.n_questions),
        );

        Ok(Self::new(retriever))
    }

    /// Run retrieval for one query
    pub async fn run(
        &self,
        query: &str,
        top_n: usize,
    ) -> Result<Vec<RetrievalResult>, RetrieveError> {
        self.retriever.get_context_chunks(query, top_n).await
    }
}
