//! Hierarchical retriever - the two-stage retrieval core
//!
//! One request flows: expansion -> page narrowing over the question index
//! -> chunk retrieval over the chunk index filtered to the narrowed pages
//! -> score reranking. Per-question index calls fan out concurrently; a
//! single failed call degrades recall, a fully failed stage fails the
//! request.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;
use std::sync::Arc;
use std::time::Duration;

use futures::stream::{self, StreamExt};
use tokio::time::{timeout_at, Instant};
use tracing::{debug, warn};

use crate::config::RetrievalConfig;
use crate::error::RetrieveError;
use crate::expand::QuestionExpander;
use crate::index::PageFilter;

use super::{ChunkMatch, PageMatch, Reranker, Retriever, RetrievalResult, ScoredMatch};

/// Tuning knobs for one retriever instance, fixed at construction
#[derive(Debug, Clone)]
pub struct RetrievalOptions {
    /// Sub-questions generated per query
    pub n_questions: usize,
    /// Page candidates fetched per sub-question
    pub pages_per_question: usize,
    /// Page ids retained after reconciliation
    pub max_pages: usize,
    /// Chunks fetched per sub-question
    pub chunks_per_question: usize,
    /// Maximum in-flight fan-out calls
    pub max_concurrency: usize,
    /// Aggregate deadline for one request
    pub deadline: Option<Duration>,
}

impl Default for RetrievalOptions {
    fn default() -> Self {
        Self::from_config(&RetrievalConfig::default(), 15)
    }
}

impl RetrievalOptions {
    /// Build options from the config sections
    pub fn from_config(retrieval: &RetrievalConfig, n_questions: usize) -> Self {
        Self {
            n_questions,
            pages_per_question: retrieval.pages_per_question,
            max_pages: retrieval.max_pages,
            chunks_per_question: retrieval.chunks_per_question,
            max_concurrency: retrieval.max_concurrency.max(1),
            deadline: match retrieval.deadline_secs {
                0 => None,
                secs => Some(Duration::from_secs(secs)),
            },
        }
    }
}

/// Two-stage retriever over a question index and a chunk index
pub struct HierarchicalRetriever {
    expander: Arc<dyn QuestionExpander>,
    question_retriever: Arc<dyn Retriever>,
    chunk_retriever: Arc<dyn Retriever>,
    reranker: Arc<dyn Reranker>,
    options: RetrievalOptions,
}

impl HierarchicalRetriever {
    pub fn new(
        expander: Arc<dyn QuestionExpander>,
        question_retriever: Arc<dyn Retriever>,
        chunk_retriever: Arc<dyn Retriever>,
        reranker: Arc<dyn Reranker>,
        options: RetrievalOptions,
    ) -> Self {
        Self {
            expander,
            question_retriever,
            chunk_retriever,
            reranker,
            options,
        }
    }

    /// Run full hierarchical retrieval for one query
    pub async fn get_context_chunks(
        &self,
        query: &str,
        top_n: usize,
    ) -> Result<Vec<RetrievalResult>, RetrieveError> {
        let query = query.trim();
        if query.is_empty() {
            return Err(RetrieveError::Validation(
                "query must not be empty".to_string(),
            ));
        }
        if top_n == 0 {
            return Ok(Vec::new());
        }

        let deadline = self.options.deadline.map(|d| Instant::now() + d);

        let questions = self.expander.expand(query, self.options.n_questions).await?;
        debug!("Expanded '{}' into {} sub-questions", query, questions.len());

        // Stage 1: page narrowing over the question index
        let page_stage = self
            .run_stage(
                &questions,
                self.question_retriever.as_ref(),
                self.options.pages_per_question,
                None,
                deadline,
                "question",
            )
            .await?;

        let pages = reconcile_pages(
            page_stage.into_iter().flatten().map(|m| PageMatch {
                page_id: m.page_id,
                file_id: m.file_id,
                score: m.score,
            }),
            self.options.max_pages,
        );

        // No candidate pages is a valid terminal outcome, not an error
        if pages.is_empty() {
            debug!("No candidate pages for '{}'", query);
            return Ok(Vec::new());
        }

        let relevant_pages: PageFilter = pages.iter().map(|p| p.page_id).collect();
        debug!("Narrowed to {} candidate pages", relevant_pages.len());

        // Stage 2: chunk retrieval restricted to the narrowed pages
        let chunk_stage = self
            .run_stage(
                &questions,
                self.chunk_retriever.as_ref(),
                self.options.chunks_per_question,
                Some(&relevant_pages),
                deadline,
                "chunk",
            )
            .await?;

        // Aggregate in question order; duplicates are kept, reranking is
        // the only ordering policy
        let mut all_chunks = Vec::new();
        for matches in chunk_stage {
            for m in matches {
                match m.text {
                    Some(text) => all_chunks.push(ChunkMatch {
                        chunk_text: text,
                        score: m.score,
                        page_id: m.page_id,
                        file_id: m.file_id,
                        metadata: m.metadata,
                    }),
                    None => debug!(
                        "Dropping chunk match without stored text (page {})",
                        m.page_id
                    ),
                }
            }
        }

        let top_chunks = self.reranker.rerank(all_chunks, top_n);

        Ok(top_chunks.into_iter().map(RetrievalResult::from).collect())
    }

    /// Fan one retriever out over all sub-questions
    ///
    /// Calls run concurrently, bounded by `max_concurrency`; results come
    /// back in question order regardless of completion order. Failed calls
    /// are logged and skipped; the stage fails only when every call failed.
    async fn run_stage(
        &self,
        questions: &[String],
        retriever: &dyn Retriever,
        top_k: usize,
        filter: Option<&PageFilter>,
        deadline: Option<Instant>,
        stage: &'static str,
    ) -> Result<Vec<Vec<ScoredMatch>>, RetrieveError> {
        let results: Vec<Result<Vec<ScoredMatch>, RetrieveError>> = stream::iter(questions)
            .map(|question| async move {
                let fut = retriever.retrieve(question, top_k, filter);
                match deadline {
                    Some(at) => match timeout_at(at, fut).await {
                        Ok(result) => result,
                        Err(_) => Err(RetrieveError::Retrieval(format!(
                            "{stage} stage call cancelled: request deadline exceeded"
                        ))),
                    },
                    None => fut.await,
                }
            })
            .buffered(self.options.max_concurrency)
            .collect()
            .await;

        let mut successes = Vec::with_capacity(results.len());
        let mut failures = 0usize;
        for (question, result) in questions.iter().zip(results) {
            match result {
                Ok(matches) => successes.push(matches),
                Err(e) => {
                    failures += 1;
                    warn!(
                        "{} retrieval failed for sub-question '{}': {}",
                        stage, question, e
                    );
                }
            }
        }

        if successes.is_empty() && failures > 0 {
            return Err(RetrieveError::Retrieval(format!(
                "{stage} index stage failed for all {failures} sub-questions"
            )));
        }

        Ok(successes)
    }
}

/// Reconcile page candidates across sub-questions into one ranked set
///
/// Groups by page_id keeping the maximum observed score: one strongly
/// matching expansion is sufficient evidence of relevance. Sorted by
/// score descending, ties by page_id, truncated to `max_pages`.
fn reconcile_pages(
    matches: impl IntoIterator<Item = PageMatch>,
    max_pages: usize,
) -> Vec<PageMatch> {
    let mut best: BTreeMap<i64, PageMatch> = BTreeMap::new();
    for m in matches {
        match best.entry(m.page_id) {
            Entry::Occupied(mut entry) => {
                if m.score > entry.get().score {
                    entry.insert(m);
                }
            }
            Entry::Vacant(entry) => {
                entry.insert(m);
            }
        }
    }

    let mut pages: Vec<PageMatch> = best.into_values().collect();
    pages.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
    pages.truncate(max_pages);
    pages
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::expand::StaticExpander;
    use crate::retrieval::ScoreReranker;

    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use async_trait::async_trait;
    use serde_json::json;

    fn page(page_id: i64, score: f32) -> PageMatch {
        PageMatch {
            page_id,
            file_id: 1,
            score,
        }
    }

    fn question_match(page_id: i64, score: f32) -> ScoredMatch {
        ScoredMatch {
            score,
            page_id,
            file_id: 1,
            text: None,
            metadata: json!({"page_id": page_id, "file_id": 1}),
        }
    }

    fn chunk_match(text: &str, page_id: i64, score: f32) -> ScoredMatch {
        ScoredMatch {
            score,
            page_id,
            file_id: 1,
            text: Some(text.to_string()),
            metadata: json!({"page_id": page_id, "file_id": 1, "chunk": text}),
        }
    }

    /// Scripted retriever: per-question canned matches, optional failures,
    /// call and filter recording
    struct StubRetriever {
        responses: HashMap<String, Vec<ScoredMatch>>,
        fail_for: Vec<String>,
        calls: AtomicUsize,
        filters: Mutex<Vec<Option<PageFilter>>>,
    }

    impl StubRetriever {
        fn new(responses: HashMap<String, Vec<ScoredMatch>>) -> Self {
            Self {
                responses,
                fail_for: Vec::new(),
                calls: AtomicUsize::new(0),
                filters: Mutex::new(Vec::new()),
            }
        }

        fn failing_for(mut self, questions: &[&str]) -> Self {
            self.fail_for = questions.iter().map(|q| q.to_string()).collect();
            self
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn seen_filters(&self) -> Vec<Option<PageFilter>> {
            self.filters.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl Retriever for StubRetriever {
        async fn retrieve(
            &self,
            query: &str,
            _top_k: usize,
            filter: Option<&PageFilter>,
        ) -> Result<Vec<ScoredMatch>, RetrieveError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.filters.lock().unwrap().push(filter.cloned());

            if self.fail_for.iter().any(|q| q == query) {
                return Err(RetrieveError::Retrieval(format!(
                    "stub failure for '{query}'"
                )));
            }

            Ok(self.responses.get(query).cloned().unwrap_or_default())
        }
    }

    struct Fixture {
        retriever: HierarchicalRetriever,
        question_stub: Arc<StubRetriever>,
        chunk_stub: Arc<StubRetriever>,
    }

    /// Shared fixture: three sub-questions, pages 23/45/67, chunks on 23 and 45
    fn hip_surgery_fixture(max_pages: usize) -> Fixture {
        let questions = vec!["q1".to_string(), "q2".to_string(), "q3".to_string()];

        let question_stub = Arc::new(StubRetriever::new(HashMap::from([
            (
                "q1".to_string(),
                vec![question_match(23, 0.9), question_match(45, 0.7)],
            ),
            ("q2".to_string(), vec![question_match(23, 0.95)]),
            ("q3".to_string(), vec![question_match(67, 0.6)]),
        ])));

        let chunk_stub = Arc::new(StubRetriever::new(HashMap::from([(
            "q1".to_string(),
            vec![
                chunk_match("femoral stem placement", 23, 0.8),
                chunk_match("acetabular cup sizing", 23, 0.6),
                chunk_match("post-operative mobility", 45, 0.75),
            ],
        )])));

        let retriever = HierarchicalRetriever::new(
            Arc::new(StaticExpander::new(questions)),
            question_stub.clone(),
            chunk_stub.clone(),
            Arc::new(ScoreReranker),
            RetrievalOptions {
                n_questions: 3,
                pages_per_question: 5,
                max_pages,
                chunks_per_question: 50,
                max_concurrency: 4,
                deadline: None,
            },
        );

        Fixture {
            retriever,
            question_stub,
            chunk_stub,
        }
    }

    #[test]
    fn test_reconcile_max_aggregation() {
        // Pages surfaced by three questions: {23: 0.9, 45: 0.7}, {23: 0.95}, {67: 0.6}
        let reconciled = reconcile_pages(
            vec![
                page(23, 0.9),
                page(45, 0.7),
                page(23, 0.95),
                page(67, 0.6),
            ],
            20,
        );

        let ranked: Vec<(i64, f32)> = reconciled.iter().map(|p| (p.page_id, p.score)).collect();
        assert_eq!(ranked, vec![(23, 0.95), (45, 0.7), (67, 0.6)]);
    }

    #[test]
    fn test_reconcile_truncates() {
        let reconciled = reconcile_pages(
            vec![page(1, 0.5), page(2, 0.9), page(3, 0.7)],
            2,
        );
        let ids: Vec<i64> = reconciled.iter().map(|p| p.page_id).collect();
        assert_eq!(ids, vec![2, 3]);
    }

    #[test]
    fn test_reconcile_ties_break_by_page_id() {
        let reconciled = reconcile_pages(vec![page(9, 0.5), page(2, 0.5)], 20);
        let ids: Vec<i64> = reconciled.iter().map(|p| p.page_id).collect();
        assert_eq!(ids, vec![2, 9]);
    }

    #[tokio::test]
    async fn test_end_to_end_scenario() {
        let fixture = hip_surgery_fixture(20);
        let results = fixture
            .retriever
            .get_context_chunks("hip surgery", 2)
            .await
            .unwrap();

        assert_eq!(results.len(), 2);
        assert_eq!(results[0].chunk, "femoral stem placement");
        assert_eq!(results[0].page_id, 23);
        assert_eq!(results[1].chunk, "post-operative mobility");
        assert_eq!(results[1].page_id, 45);
        assert!(results[0].score >= results[1].score);
    }

    #[tokio::test]
    async fn test_chunk_stage_receives_reconciled_filter() {
        let fixture = hip_surgery_fixture(2);
        fixture
            .retriever
            .get_context_chunks("hip surgery", 5)
            .await
            .unwrap();

        // max_pages = 2 keeps the two best pages of [23, 45, 67]
        let expected: PageFilter = [23, 45].into_iter().collect();
        let filters = fixture.chunk_stub.seen_filters();
        assert_eq!(filters.len(), 3);
        assert!(filters.iter().all(|f| f.as_ref() == Some(&expected)));

        // The question stage runs unfiltered
        assert!(fixture
            .question_stub
            .seen_filters()
            .iter()
            .all(|f| f.is_none()));
    }

    #[tokio::test]
    async fn test_no_pages_is_empty_result() {
        let question_stub = Arc::new(StubRetriever::new(HashMap::new()));
        let chunk_stub = Arc::new(StubRetriever::new(HashMap::new()));

        let retriever = HierarchicalRetriever::new(
            Arc::new(StaticExpander::new(vec!["q1".to_string()])),
            question_stub.clone(),
            chunk_stub.clone(),
            Arc::new(ScoreReranker),
            RetrievalOptions::default(),
        );

        let results = retriever.get_context_chunks("anything", 5).await.unwrap();
        assert!(results.is_empty());
        // Chunk index never consulted without candidate pages
        assert_eq!(chunk_stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_expansion_failure_performs_no_index_calls() {
        let question_stub = Arc::new(StubRetriever::new(HashMap::new()));
        let chunk_stub = Arc::new(StubRetriever::new(HashMap::new()));

        let retriever = HierarchicalRetriever::new(
            Arc::new(StaticExpander::new(Vec::new())),
            question_stub.clone(),
            chunk_stub.clone(),
            Arc::new(ScoreReranker),
            RetrievalOptions::default(),
        );

        let err = retriever.get_context_chunks("query", 5).await.unwrap_err();
        assert!(matches!(err, RetrieveError::Expansion(_)));
        assert_eq!(question_stub.call_count(), 0);
        assert_eq!(chunk_stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_partial_chunk_failure_degrades() {
        let questions = vec!["q1".to_string(), "q2".to_string()];

        let question_stub = Arc::new(StubRetriever::new(HashMap::from([
            ("q1".to_string(), vec![question_match(23, 0.9)]),
            ("q2".to_string(), vec![question_match(45, 0.8)]),
        ])));

        let chunk_stub = Arc::new(
            StubRetriever::new(HashMap::from([
                (
                    "q1".to_string(),
                    vec![chunk_match("kept chunk", 23, 0.8)],
                ),
                (
                    "q2".to_string(),
                    vec![chunk_match("lost chunk", 45, 0.9)],
                ),
            ]))
            .failing_for(&["q2"]),
        );

        let retriever = HierarchicalRetriever::new(
            Arc::new(StaticExpander::new(questions)),
            question_stub,
            chunk_stub,
            Arc::new(ScoreReranker),
            RetrievalOptions::default(),
        );

        let results = retriever.get_context_chunks("query", 5).await.unwrap();
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chunk, "kept chunk");
    }

    #[tokio::test]
    async fn test_total_question_stage_failure_is_fatal() {
        let question_stub = Arc::new(
            StubRetriever::new(HashMap::new()).failing_for(&["q1", "q2"]),
        );
        let chunk_stub = Arc::new(StubRetriever::new(HashMap::new()));

        let retriever = HierarchicalRetriever::new(
            Arc::new(StaticExpander::new(vec!["q1".to_string(), "q2".to_string()])),
            question_stub,
            chunk_stub.clone(),
            Arc::new(ScoreReranker),
            RetrievalOptions::default(),
        );

        let err = retriever.get_context_chunks("query", 5).await.unwrap_err();
        assert!(matches!(err, RetrieveError::Retrieval(_)));
        assert_eq!(chunk_stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_total_chunk_stage_failure_is_fatal() {
        let question_stub = Arc::new(StubRetriever::new(HashMap::from([(
            "q1".to_string(),
            vec![question_match(23, 0.9)],
        )])));
        let chunk_stub =
            Arc::new(StubRetriever::new(HashMap::new()).failing_for(&["q1"]));

        let retriever = HierarchicalRetriever::new(
            Arc::new(StaticExpander::new(vec!["q1".to_string()])),
            question_stub,
            chunk_stub,
            Arc::new(ScoreReranker),
            RetrievalOptions::default(),
        );

        let err = retriever.get_context_chunks("query", 5).await.unwrap_err();
        assert!(matches!(err, RetrieveError::Retrieval(_)));
    }

    #[tokio::test]
    async fn test_empty_query_rejected_before_expansion() {
        let fixture = hip_surgery_fixture(20);
        let err = fixture
            .retriever
            .get_context_chunks("   ", 5)
            .await
            .unwrap_err();
        assert!(matches!(err, RetrieveError::Validation(_)));
        assert_eq!(fixture.question_stub.call_count(), 0);
    }

    #[tokio::test]
    async fn test_top_n_zero_is_empty() {
        let fixture = hip_surgery_fixture(20);
        let results = fixture
            .retriever
            .get_context_chunks("hip surgery", 0)
            .await
            .unwrap();
        assert!(results.is_empty());
    }

    #[tokio::test]
    async fn test_results_bounded_and_sorted() {
        let fixture = hip_surgery_fixture(20);
        let results = fixture
            .retriever
            .get_context_chunks("hip surgery", 2)
            .await
            .unwrap();

        assert!(results.len() <= 2);
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }

    #[tokio::test]
    async fn test_deterministic_for_deterministic_stubs() {
        let fixture = hip_surgery_fixture(20);
        let first = fixture
            .retriever
            .get_context_chunks("hip surgery", 5)
            .await
            .unwrap();
        let second = fixture
            .retriever
            .get_context_chunks("hip surgery", 5)
            .await
            .unwrap();
        assert_eq!(first, second);
    }
}
