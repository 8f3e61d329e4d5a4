//! LLM module - generative model providers for query expansion

mod anthropic;
mod ollama;
mod openai;
mod simulated;

use tracing::info;

use crate::config::ExpansionConfig;

/// LLM provider type
#[derive(Debug, Clone)]
pub enum LlmType {
    OpenAI {
        api_key: Option<String>,
        base_url: Option<String>,
    },
    Ollama {
        host: Option<String>,
    },
    Anthropic {
        api_key: Option<String>,
        base_url: Option<String>,
    },
    Simulated,
}

impl LlmType {
    /// Build a provider type from the config section
    pub fn from_config(config: &ExpansionConfig) -> anyhow::Result<Self> {
        match config.provider.as_str() {
            "openai" => Ok(LlmType::OpenAI {
                api_key: config.api_key.clone(),
                base_url: config.base_url.clone(),
            }),
            "ollama" => Ok(LlmType::Ollama {
                host: config.host.clone(),
            }),
            "anthropic" => Ok(LlmType::Anthropic {
                api_key: config.api_key.clone(),
                base_url: config.base_url.clone(),
            }),
            "simulated" => Ok(LlmType::Simulated),
            other => anyhow::bail!("Unknown expansion provider: {}", other),
        }
    }
}

/// Unified LLM provider
pub struct LlmProvider {
    model_name: String,
    inner: LlmProviderInner,
}

enum LlmProviderInner {
    OpenAI(openai::OpenAILlm),
    Ollama(ollama::OllamaLlm),
    Anthropic(anthropic::AnthropicLlm),
    Simulated(simulated::SimulatedLlm),
}

impl LlmProvider {
    /// Create a new LLM provider
    pub fn new(model_name: String, llm_type: LlmType) -> anyhow::Result<Self> {
        let inner = match llm_type {
            LlmType::OpenAI { api_key, base_url } => LlmProviderInner::OpenAI(
                openai::OpenAILlm::new(model_name.clone(), api_key, base_url)?,
            ),
            LlmType::Ollama { host } => {
                LlmProviderInner::Ollama(ollama::OllamaLlm::new(model_name.clone(), host)?)
            }
            LlmType::Anthropic { api_key, base_url } => LlmProviderInner::Anthropic(
                anthropic::AnthropicLlm::new(model_name.clone(), api_key, base_url)?,
            ),
            LlmType::Simulated => {
                LlmProviderInner::Simulated(simulated::SimulatedLlm::new(model_name.clone())?)
            }
        };

        info!("Initialized LLM provider: {}", model_name);

        Ok(Self { model_name, inner })
    }

    /// Generate a response
    pub async fn generate(&self, prompt: &str) -> anyhow::Result<String> {
        match &self.inner {
            LlmProviderInner::OpenAI(llm) => llm.generate(prompt).await,
            LlmProviderInner::Ollama(llm) => llm.generate(prompt).await,
            LlmProviderInner::Anthropic(llm) => llm.generate(prompt).await,
            LlmProviderInner::Simulated(llm) => llm.generate(prompt).await,
        }
    }

    /// Get model name
    pub fn model_name(&self) -> &str {
        &self.model_name
    }
}
