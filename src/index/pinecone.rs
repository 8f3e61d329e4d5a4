//! Pinecone index client
//!
//! Thin adapter over the Pinecone data-plane query API. Each index is
//! addressed by its own host URL.

use std::env;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;

use crate::http::{check_response, create_client};

use super::{IndexMatch, PageFilter, VectorIndex};

/// Remote Pinecone index
pub struct PineconeIndex {
    client: Client,
    name: String,
    host: String,
    api_key: String,
    namespace: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest {
    vector: Vec<f32>,
    top_k: usize,
    include_metadata: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    filter: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    namespace: Option<String>,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<PineconeMatch>,
}

#[derive(Deserialize)]
struct PineconeMatch {
    id: String,
    #[serde(default)]
    score: f32,
    metadata: Option<serde_json::Value>,
}

impl PineconeIndex {
    /// Create a client for one index
    pub fn new(
        name: impl Into<String>,
        host: impl Into<String>,
        api_key: Option<String>,
        namespace: Option<String>,
    ) -> anyhow::Result<Self> {
        let api_key = api_key
            .or_else(|| env::var("PINECONE_API_KEY").ok())
            .ok_or_else(|| anyhow::anyhow!("PINECONE_API_KEY not set"))?;

        let name = name.into();
        let host = host.into().trim_end_matches('/').to_string();

        info!("Pinecone index '{}' @ {}", name, host);

        Ok(Self {
            client: create_client(),
            name,
            host,
            api_key,
            namespace,
        })
    }
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    fn name(&self) -> &str {
        &self.name
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&PageFilter>,
    ) -> anyhow::Result<Vec<IndexMatch>> {
        let filter = filter.map(|pages| {
            json!({ "page_id": { "$in": pages.ids().collect::<Vec<i64>>() } })
        });

        let request = QueryRequest {
            vector: vector.to_vec(),
            top_k,
            include_metadata: true,
            filter,
            namespace: self.namespace.clone(),
        };

        let response = self
            .client
            .post(format!("{}/query", self.host))
            .header("Api-Key", &self.api_key)
            .json(&request)
            .send()
            .await?;

        let response = check_response(response, "Pinecone").await?;
        let query_response: QueryResponse = response.json().await?;

        Ok(query_response
            .matches
            .into_iter()
            .map(|m| IndexMatch {
                id: m.id,
                score: m.score,
                metadata: m.metadata.unwrap_or(serde_json::Value::Null),
            })
            .collect())
    }
}
