//! Score-based reranking - deterministic sort and truncation

use super::ChunkMatch;

/// Orders aggregated chunk matches and truncates to the requested count
pub trait Reranker: Send + Sync {
    /// Sort by score descending (stable: ties keep input order) and keep
    /// the first `top_n` entries
    fn rerank(&self, matches: Vec<ChunkMatch>, top_n: usize) -> Vec<ChunkMatch>;
}

/// Plain score-descending reranker
///
/// No content deduplication: duplicate chunk text arriving via different
/// sub-questions is kept, by policy.
pub struct ScoreReranker;

impl Reranker for ScoreReranker {
    fn rerank(&self, mut matches: Vec<ChunkMatch>, top_n: usize) -> Vec<ChunkMatch> {
        matches.sort_by(|a, b| {
            b.score
                .partial_cmp(&a.score)
                .unwrap_or(std::cmp::Ordering::Equal)
        });
        matches.truncate(top_n);
        matches
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::Value;

    fn chunk(text: &str, score: f32) -> ChunkMatch {
        ChunkMatch {
            chunk_text: text.to_string(),
            score,
            page_id: 1,
            file_id: 1,
            metadata: Value::Null,
        }
    }

    #[test]
    fn test_sorts_descending() {
        let reranked = ScoreReranker.rerank(
            vec![chunk("low", 0.2), chunk("high", 0.9), chunk("mid", 0.5)],
            10,
        );
        let texts: Vec<&str> = reranked.iter().map(|c| c.chunk_text.as_str()).collect();
        assert_eq!(texts, vec!["high", "mid", "low"]);
    }

    #[test]
    fn test_ties_keep_input_order() {
        let reranked = ScoreReranker.rerank(
            vec![chunk("first", 0.5), chunk("second", 0.5), chunk("third", 0.5)],
            10,
        );
        let texts: Vec<&str> = reranked.iter().map(|c| c.chunk_text.as_str()).collect();
        assert_eq!(texts, vec!["first", "second", "third"]);
    }

    #[test]
    fn test_truncates_to_top_n() {
        let reranked = ScoreReranker.rerank(
            vec![chunk("a", 0.9), chunk("b", 0.8), chunk("c", 0.7)],
            2,
        );
        assert_eq!(reranked.len(), 2);
        assert_eq!(reranked[0].chunk_text, "a");
    }

    #[test]
    fn test_top_n_zero_is_empty() {
        let reranked = ScoreReranker.rerank(vec![chunk("a", 0.9)], 0);
        assert!(reranked.is_empty());
    }

    #[test]
    fn test_top_n_beyond_len_returns_all() {
        let reranked = ScoreReranker.rerank(vec![chunk("a", 0.9), chunk("b", 0.8)], 100);
        assert_eq!(reranked.len(), 2);
    }

    #[test]
    fn test_keeps_duplicate_text() {
        let reranked = ScoreReranker.rerank(
            vec![chunk("same", 0.9), chunk("same", 0.8)],
            10,
        );
        assert_eq!(reranked.len(), 2);
    }
}
