//! Embedding capability trait

use async_trait::async_trait;

/// Turns text into fixed-dimension vectors, one per input, same order
#[async_trait]
pub trait TextEmbedder: Send + Sync {
    /// Get embedding dimensions
    fn dimensions(&self) -> usize;

    /// Compute embeddings for texts
    async fn embed(&self, texts: &[&str]) -> anyhow::Result<Vec<Vec<f32>>>;
}
