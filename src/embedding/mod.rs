//! Embedding module - compute embeddings from text

mod gemini;
mod ollama;
mod openai;
mod traits;

pub use traits::TextEmbedder;

use async_trait::async_trait;
use tracing::info;

use crate::config::EmbeddingConfig;

/// Embedding mode configuration
#[derive(Debug, Clone)]
pub enum EmbeddingMode {
    OpenAI {
        api_key: Option<String>,
        base_url: Option<String>,
    },
    Ollama {
        host: Option<String>,
    },
    Gemini {
        api_key: Option<String>,
    },
}

impl EmbeddingMode {
    /// Build a mode from the config section
    pub fn from_config(config: &EmbeddingConfig) -> anyhow::Result<Self> {
        match config.provider.as_str() {
            "openai" => Ok(EmbeddingMode::OpenAI {
                api_key: config.api_key.clone(),
                base_url: config.base_url.clone(),
            }),
            "ollama" => Ok(EmbeddingMode::Ollama {
                host: config.host.clone(),
            }),
            "gemini" => Ok(EmbeddingMode::Gemini {
                api_key: config.api_key.clone(),
            }),
            other => anyhow::bail!("Unknown embedding provider: {}", other),
        }
    }
}

/// Unified embedding provider
pub struct EmbeddingProvider {
    model_name: String,
    dimensions: usize,
    inner: EmbeddingProviderInner,
}

enum EmbeddingProviderInner {
    OpenAI(openai::OpenAIEmbedding),
    Ollama(ollama::OllamaEmbedding),
    Gemini(gemini::GeminiEmbedding),
}

impl EmbeddingProvider {
    /// Create a new embedding provider
    pub fn new(model_name: String, mode: EmbeddingMode) -> anyhow::Result<Self> {
        let (inner, dimensions) = match mode {
            EmbeddingMode::OpenAI { api_key, base_url } => {
                let provider =
                    openai::OpenAIEmbedding::new(model_name.clone(), api_key, base_url)?;
                let dims = provider.dimensions();
                (EmbeddingProviderInner::OpenAI(provider), dims)
            }
            EmbeddingMode::Ollama { host } => {
                let provider = ollama::OllamaEmbedding::new(model_name.clone(), host)?;
                let dims = provider.dimensions();
                (EmbeddingProviderInner::Ollama(provider), dims)
            }
            EmbeddingMode::Gemini { api_key } => {
                let provider = gemini::GeminiEmbedding::new(model_name.clone(), api_key)?;
                let dims = provider.dimensions();
                (EmbeddingProviderInner::Gemini(provider), dims)
            }
        };

        info!(
            "Initialized embedding provider: {} ({} dims)",
            model_name, dimensions
        );

        Ok(Self {
            model_name,
            dimensions,
            inner,
        })
    }

    /// Get model name
    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}

#[async_trait]
impl TextEmbedder for EmbeddingProvider {
    fn dimensions(&self) -> usize {
        self.dimensions
    }

    async fn embed(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        match &self.inner {
            EmbeddingProviderInner::OpenAI(p) => p.embed(texts).await,
            EmbeddingProviderInner::Ollama(p) => p.embed(texts).await,
            EmbeddingProviderInner::Gemini(p) => p.embed(texts).await,
        }
    }
}
