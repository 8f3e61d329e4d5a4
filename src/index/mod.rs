//! Vector index adapters - query remote or in-memory indexes
//!
//! The hierarchical engine only sees the `VectorIndex` contract; the
//! concrete client (Pinecone, in-memory) stays swappable behind it.

mod memory;
mod pinecone;

pub use memory::MemoryIndex;
pub use pinecone::PineconeIndex;

use std::collections::BTreeSet;

use async_trait::async_trait;

/// One scored match from an index query
#[derive(Debug, Clone)]
pub struct IndexMatch {
    pub id: String,
    pub score: f32,
    pub metadata: serde_json::Value,
}

/// Set of page ids a query is restricted to
///
/// Backed by an ordered set so rendered filters and iteration are
/// deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageFilter(BTreeSet<i64>);

impl PageFilter {
    pub fn contains(&self, page_id: i64) -> bool {
        self.0.contains(&page_id)
    }

    pub fn ids(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<i64> for PageFilter {
    fn from_iter<T: IntoIterator<Item = i64>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Similarity search over one named vector index
#[async_trait]
pub trait VectorIndex: Send + Sync {
    /// Index name, used in logs and error messages
    fn name(&self) -> &str;

    /// Return up to `top_k` matches for `vector` by descending similarity,
    /// restricted to pages in `filter` when provided
    async fn query(
        &self,
        vector: &[f32],
        top_k: usize,
        filter: Option<&PageFilter>,
    ) -> anyhow::Result<Vec<IndexMatch>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_page_filter_membership() {
        let filter: PageFilter = [23, 45].into_iter().collect();
        assert!(filter.contains(23));
        assert!(!filter.contains(67));
        assert_eq!(filter.len(), 2);
    }

    #[test]
    fn test_page_filter_iterates_in_order() {
        let filter: PageFilter = [45, 23, 67].into_iter().collect();
        let ids: Vec<i64> = filter.ids().collect();
        assert_eq!(ids, vec![23, 45, 67]);
    }
}
