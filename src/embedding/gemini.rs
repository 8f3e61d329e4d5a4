//! Google Gemini embedding provider

use std::env;

use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::http::{check_response, create_client};

/// Gemini embedding provider
pub struct GeminiEmbedding {
    client: Client,
    model_name: String,
    api_key: String,
    dimensions: usize,
}

#[derive(Serialize)]
struct Content {
    parts: Vec<Part>,
}

#[derive(Serialize)]
struct Part {
    text: String,
}

#[derive(Serialize)]
struct BatchEmbedRequest {
    requests: Vec<EmbedRequest>,
}

#[derive(Serialize)]
struct EmbedRequest {
    model: String,
    content: Content,
}

#[derive(Deserialize)]
struct BatchEmbedResponse {
    embeddings: Vec<Embedding>,
}

#[derive(Deserialize)]
struct Embedding {
    values: Vec<f32>,
}

impl GeminiEmbedding {
    /// Create a new Gemini embedding provider
    pub fn new(model_name: String, api_key: Option<String>) -> anyhow::Result<Self> {
        let api_key = api_key
            .or_else(|| env::var("GOOGLE_API_KEY").ok())
            .or_else(|| env::var("GEMINI_API_KEY").ok())
            .ok_or_else(|| anyhow::anyhow!("GOOGLE_API_KEY or GEMINI_API_KEY not set"))?;

        let client = create_client();

        // Gemini embedding dimensions
        let dimensions = match model_name.as_str() {
            "text-embedding-004" => 768,
            "embedding-001" => 768,
            _ => 768,
        };

        info!(
            "Gemini embedding provider: {} ({} dims)",
            model_name, dimensions
        );

        Ok(Self {
            client,
            model_name,
            api_key,
            dimensions,
        })
    }

    /// Get dimensions
    pub fn dimensions(&self) -> usize {
        self.dimensions
    }

    /// Compute embeddings
    pub async fn embed(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }

        let url = format!(
            "https://generativelanguage.googleapis.com/v1beta/models/{}:batchEmbedContents?key={}",
            self.model_name, self.api_key
        );

        let requests: Vec<EmbedRequest> = texts
            .iter()
            .map(|text| EmbedRequest {
                model: format!("models/{}", self.model_name),
                content: Content {
                    parts: vec![Part {
                        text: text.to_string(),
                    }],
                },
            })
            .collect();

        let response = self
            .client
            .post(&url)
            .json(&BatchEmbedRequest { requests })
            .send()
            .await?;

        let response = check_response(response, "Gemini").await?;
        let batch: BatchEmbedResponse = response.json().await?;

        if batch.embeddings.len() != texts.len() {
            anyhow::bail!(
                "Gemini returned {} embeddings for {} inputs",
                batch.embeddings.len(),
                texts.len()
            );
        }

        Ok(batch.embeddings.into_iter().map(|e| e.values).collect())
    }
}
