//! In-memory vector index
//!
//! Cosine-similarity store conforming to the `VectorIndex` contract.
//! Used as the swappable fake in tests and offline compositions.

use async_trait::async_trait;

use super::{IndexMatch, PageFilter, VectorIndex};

/// One stored record
#[derive(Debug, Clone)]
pub struct MemoryRecord {
    pub id: String,
    pub vector: Vec<f32>,
    pub metadata: serde_json::Value,
}

/// In-process vector index
pub struct MemoryIndex {
    name: String,
    records: Vec<MemoryRecord>,
}

impl MemoryIndex {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            records: Vec::new(),
        }
    }

    /// Add a record
    pub fn insert(
        &mut self,
        id: impl Into<String>,
        vector: Vec<f32>,
        metadata: serde_json::Value,
    ) {
        self.records.push(MemoryRecord {
            id: id.into(),
            vector,
            metadata,
        });
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[async_trait]
impl VectorIndex for MemoryIndex {
    fn name(&self) -> &str {
        &self.name
    }

    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&PageFilter>,
    ) -> anyhow::Result<Vec<IndexMatch>> {
        let mut scored: Vec<IndexMatch> = self
            .records
            .iter()
            .filter(|record| match filter {
                Some(pages) => record
                    .metadata
                    .get("page_id")
                    .and_then(|v| v.as_i64())
                    .map_or(false, |page_id| pages.contains(page_id)),
                None => true,
            })
            .map(|record| IndexMatch {
                id: record.id.clone(),
                score: cosine_similarity(vector, &record.vector),
                metadata: record.metadata.clone(),
            })
            .collect();

        scored.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        scored.truncate(top_k);

        Ok(scored)
    }
}
