//! Configuration file support for hirag
//!
//! Config file location: ~/.config/hirag/config.toml
//!
//! Example config:
//! ```toml
//! [expansion]
//! provider = "openai"  # openai, ollama, anthropic, simulated
//! model = "gpt-4o-mini"
//! n_questions = 15
//!
//! [embedding]
//! provider = "openai"  # openai, ollama, gemini
//! model = "text-embedding-3-small"
//!
//! [index]
//! question_host = "https://questions-xxxx.svc.pinecone.io"
//! chunk_host = "https://chunks-xxxx.svc.pinecone.io"
//!
//! [retrieval]
//! pages_per_question = 5
//! max_pages = 20
//! chunks_per_question = 50
//! top_n = 15
//! ```

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    #[serde(default)]
    pub expansion: ExpansionConfig,

    #[serde(default)]
    pub embedding: EmbeddingConfig,

    #[serde(default)]
    pub index: IndexConfig,

    #[serde(default)]
    pub retrieval: RetrievalConfig,
}

/// Query expansion (generative model) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExpansionConfig {
    /// Provider type: openai, ollama, anthropic, simulated
    #[serde(default = "default_expansion_provider")]
    pub provider: String,

    /// Model name
    #[serde(default = "default_expansion_model")]
    pub model: String,

    /// Host for Ollama (e.g., http://localhost:11434)
    pub host: Option<String>,

    /// Base URL for OpenAI-compatible APIs
    pub base_url: Option<String>,

    /// API key for OpenAI/Anthropic
    pub api_key: Option<String>,

    /// Number of sub-questions to expand each query into
    #[serde(default = "default_n_questions")]
    pub n_questions: usize,
}

impl Default for ExpansionConfig {
    fn default() -> Self {
        Self {
            provider: default_expansion_provider(),
            model: default_expansion_model(),
            host: None,
            base_url: None,
            api_key: None,
            n_questions: default_n_questions(),
        }
    }
}

fn default_expansion_provider() -> String {
    "openai".to_string()
}

fn default_expansion_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_n_questions() -> usize {
    15
}

/// Embedding provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    /// Provider type: openai, ollama, gemini
    #[serde(default = "default_embedding_provider")]
    pub provider: String,

    /// Model name
    #[serde(default = "default_embedding_model")]
    pub model: String,

    /// Host for Ollama (e.g., http://localhost:11434)
    pub host: Option<String>,

    /// Base URL for OpenAI-compatible APIs
    pub base_url: Option<String>,

    /// API key for OpenAI/Gemini
    pub api_key: Option<String>,
}

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            provider: default_embedding_provider(),
            model: default_embedding_model(),
            host: None,
            base_url: None,
            api_key: None,
        }
    }
}

fn default_embedding_provider() -> String {
    "openai".to_string()
}

fn default_embedding_model() -> String {
    "text-embedding-3-small".to_string()
}

/// Vector index (Pinecone) configuration
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct IndexConfig {
    /// API key (or set PINECONE_API_KEY env var)
    pub api_key: Option<String>,

    /// Host URL of the question index
    pub question_host: Option<String>,

    /// Host URL of the chunk index
    pub chunk_host: Option<String>,

    /// Optional namespace within both indexes
    pub namespace: Option<String>,
}

/// Retrieval tuning knobs
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetrievalConfig {
    /// Page candidates fetched from the question index per sub-question
    #[serde(default = "default_pages_per_question")]
    pub pages_per_question: usize,

    /// Page ids retained after reconciling candidates across sub-questions
    #[serde(default = "default_max_pages")]
    pub max_pages: usize,

    /// Chunks fetched from the chunk index per sub-question
    #[serde(default = "default_chunks_per_question")]
    pub chunks_per_question: usize,

    /// Default number of results returned
    #[serde(default = "default_top_n")]
    pub top_n: usize,

    /// Maximum in-flight fan-out calls
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Aggregate deadline for one request in seconds (0 disables)
    #[serde(default = "default_deadline_secs")]
    pub deadline_secs: u64,
}

impl Default for RetrievalConfig {
    fn default() -> Self {
        Self {
            pages_per_question: default_pages_per_question(),
            max_pages: default_max_pages(),
            chunks_per_question: default_chunks_per_question(),
            top_n: default_top_n(),
            max_concurrency: default_max_concurrency(),
            deadline_secs: default_deadline_secs(),
        }
    }
}

fn default_pages_per_question() -> usize {
    5
}

fn default_max_pages() -> usize {
    20
}

fn default_chunks_per_question() -> usize {
    50
}

fn default_top_n() -> usize {
    15
}

fn default_max_concurrency() -> usize {
    8
}

fn default_deadline_secs() -> u64 {
    60
}

impl Config {
    /// Get the config file path
    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("hirag")
            .join("config.toml")
    }

    /// Load config from file, returning defaults if not found
    pub fn load() -> Self {
        let path = Self::config_path();
        if path.exists() {
            match std::fs::read_to_string(&path) {
                Ok(content) => match toml::from_str(&content) {
                    Ok(config) => {
                        tracing::debug!("Loaded config from {:?}", path);
                        return config;
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse config file: {}", e);
                    }
                },
                Err(e) => {
                    tracing::warn!("Failed to read config file: {}", e);
                }
            }
        }
        Self::default()
    }

    /// Save config to file
    pub fn save(&self) -> anyhow::Result<()> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(())
    }

    /// Create example config file if it doesn't exist
    pub fn create_example_if_missing() -> anyhow::Result<bool> {
        let path = Self::config_path();
        if path.exists() {
            return Ok(false);
        }

        let example = r#"# hirag Configuration
# Location: ~/.config/hirag/config.toml

[expansion]
# Provider: openai, ollama, anthropic, simulated
provider = "openai"

# Model used to expand a query into related sub-questions
model = "gpt-4o-mini"

# Number of sub-questions per query (default: 15)
n_questions = 15

# Ollama host (default: http://localhost:11434)
# host = "http://localhost:11434"

# API key (or set OPENAI_API_KEY / ANTHROPIC_API_KEY env vars)
# api_key = "sk-..."

[embedding]
# Provider: openai, ollama, gemini
provider = "openai"

# Model name (provider-specific)
# OpenAI: text-embedding-3-small, text-embedding-3-large
# Ollama: nomic-embed-text, mxbai-embed-large
model = "text-embedding-3-small"

# api_key = "sk-..."

[index]
# Pinecone API key (or set PINECONE_API_KEY env var)
# api_key = "pcsk-..."

# Per-index host URLs
# question_host = "https://questions-xxxx.svc.pinecone.io"
# chunk_host = "https://chunks-xxxx.svc.pinecone.io"

# namespace = ""

[retrieval]
# Page candidates per sub-question from the question index (default: 5)
pages_per_question = 5

# Page ids kept after reconciliation across sub-questions (default: 20)
max_pages = 20

# Chunks per sub-question from the chunk index (default: 50)
chunks_per_question = 50

# Default result count (default: 15)
top_n = 15

# Maximum in-flight index calls (default: 8)
max_concurrency = 8

# Aggregate request deadline in seconds, 0 disables (default: 60)
deadline_secs = 60
"#;

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        std::fs::write(&path, example)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.expansion.provider, "openai");
        assert_eq!(config.expansion.n_questions, 15);
        assert_eq!(config.embedding.model, "text-embedding-3-small");
        assert_eq!(config.retrieval.pages_per_question, 5);
        assert_eq!(config.retrieval.max_pages, 20);
        assert_eq!(config.retrieval.chunks_per_question, 50);
        assert_eq!(config.retrieval.top_n, 15);
    }

    #[test]
    fn test_parse_config() {
        let toml = r#"
[expansion]
provider = "ollama"
model = "qwen3:8b"
n_questions = 8

[index]
question_host = "https://q.example.test"
chunk_host = "https://c.example.test"

[retrieval]
max_pages = 10
deadline_secs = 30
"#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.expansion.provider, "ollama");
        assert_eq!(config.expansion.n_questions, 8);
        assert_eq!(
            config.index.question_host.as_deref(),
            Some("https://q.example.test")
        );
        assert_eq!(config.retrieval.max_pages, 10);
        assert_eq!(config.retrieval.deadline_secs, 30);
        // Untouched sections keep defaults
        assert_eq!(config.embedding.provider, "openai");
        assert_eq!(config.retrieval.top_n, 15);
    }
}
