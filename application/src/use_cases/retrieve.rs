//! Retrieve use case: the fallback decision engine.
//!
//! One call per question:
//!
//! 1. Embed the query text (failure is fatal).
//! 2. Search the query's collection. An unavailable collection, or one whose
//!    stored dimension disagrees with the query vector, counts as zero
//!    local hits.
//! 3. Apply the [`EscalationPolicy`] to the local scores.
//! 4. On escalation, call `web_search` bounded by that tool's configured
//!    timeout.
//!    Any soft tool failure degrades to local-only results.
//! 5. Merge, de-duplicate, cap and rank.
//!
//! The retriever never returns an error for insufficient results. Index
//! locks are never held across the tool call: the local search completes
//! before the decision is made.

use crate::config::RetrievalParams;
use crate::ports::embedder::{Embedder, EmbeddingError};
use crate::ports::tool_executor::{ToolCallError, ToolExecutorPort};
use crate::ports::vector_index::{IndexError, ScoredDocument, VectorIndex};
use crate::use_cases::shared::check_cancelled;
use rag_domain::core::string::truncate_chars;
use rag_domain::tool::WEB_SEARCH;
use rag_domain::{
    Query, RetrievalOutcome, RetrievalResult, ToolCall, WebSearchItem, merge_results,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

/// Maximum characters of document text carried as a local snippet.
pub const SNIPPET_MAX_CHARS: usize = 280;

/// Errors that can occur during retrieval
#[derive(Error, Debug, Clone, PartialEq)]
pub enum RetrievalError {
    #[error("Embedding failed: {0}")]
    Embedding(#[from] EmbeddingError),

    #[error("Index error: {0}")]
    Index(IndexError),

    #[error("Retrieval cancelled")]
    Cancelled,
}

/// Whether a retrieval call may reach the web.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RetrievalMode {
    /// Escalate to `web_search` when the policy says so
    Hybrid,
    /// Never call a tool; the policy is still evaluated for diagnostics
    LocalOnly,
}

/// The fallback decision engine.
///
/// Holds only shared, read-mostly handles; one instance serves every
/// session concurrently.
pub struct Retriever {
    embedder: Arc<dyn Embedder>,
    index: Arc<dyn VectorIndex>,
    tools: Arc<dyn ToolExecutorPort>,
    params: RetrievalParams,
}

impl Retriever {
    pub fn new(
        embedder: Arc<dyn Embedder>,
        index: Arc<dyn VectorIndex>,
        tools: Arc<dyn ToolExecutorPort>,
        params: RetrievalParams,
    ) -> Self {
        Self {
            embedder,
            index,
            tools,
            params,
        }
    }

    pub fn params(&self) -> &RetrievalParams {
        &self.params
    }

    /// Retrieve merged, ranked context for `query`.
    pub async fn retrieve(
        &self,
        query: &Query,
        mode: RetrievalMode,
        cancel: &CancellationToken,
    ) -> Result<RetrievalOutcome, RetrievalError> {
        check_cancelled(cancel, RetrievalError::Cancelled)?;

        let vector = self.embedder.embed(&query.text).await?;

        check_cancelled(cancel, RetrievalError::Cancelled)?;

        let (local_hits, local_unavailable) = match self
            .index
            .search(&query.collection, &vector, query.top_k)
            .await
        {
            Ok(hits) => (hits, false),
            Err(
                e @ (IndexError::CollectionUnavailable { .. }
                | IndexError::DimensionMismatch { .. }),
            ) => {
                warn!(
                    collection = %query.collection,
                    error = %e,
                    "Local collection unusable, treating as zero hits"
                );
                (Vec::new(), true)
            }
            Err(e) => return Err(RetrievalError::Index(e)),
        };

        let scores: Vec<f32> = local_hits.iter().map(|hit| hit.score).collect();
        let decision = self
            .params
            .policy
            .decide(&scores, query.min_hits, query.min_score);

        debug!(
            collection = %query.collection,
            local_hits = scores.len(),
            best_score = scores.first().copied().unwrap_or(f32::NAN),
            too_few_hits = decision.too_few_hits,
            score_too_low = decision.score_too_low,
            escalate = decision.escalate,
            "Escalation decision"
        );

        let local: Vec<RetrievalResult> = local_hits.into_iter().map(local_result).collect();

        let mut outcome = RetrievalOutcome {
            local_unavailable,
            ..Default::default()
        };

        let web = if decision.escalate && mode == RetrievalMode::Hybrid {
            outcome.escalated = true;
            match self.web_search(query, cancel).await {
                Ok(items) => items,
                Err(ToolCallError::Cancelled) => return Err(RetrievalError::Cancelled),
                Err(e) => {
                    warn!(
                        collection = %query.collection,
                        tool = WEB_SEARCH,
                        error = %e,
                        "Web search failed, returning local results only"
                    );
                    outcome.degraded = true;
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        outcome.results = merge_results(local, web, self.params.max_results);

        info!(
            collection = %query.collection,
            results = outcome.results.len(),
            local = outcome.local_count(),
            web = outcome.web_count(),
            escalated = outcome.escalated,
            degraded = outcome.degraded,
            "Retrieval complete"
        );

        Ok(outcome)
    }

    /// Invoke `web_search`, never waiting longer than the tool's timeout.
    ///
    /// The executor applies its own per-tool timeout; the outer bound holds
    /// even when an executor ignores it.
    async fn web_search(
        &self,
        query: &Query,
        cancel: &CancellationToken,
    ) -> Result<Vec<RetrievalResult>, ToolCallError> {
        let timeout = self.tools.timeout_for(WEB_SEARCH);
        let call = ToolCall::new(WEB_SEARCH)
            .with_arg("query", query.text.as_str())
            .with_arg("max_results", query.top_k as u64);

        let started = Instant::now();
        let response = tokio::time::timeout(timeout, self.tools.call(&call, None, cancel))
            .await
            .map_err(|_| ToolCallError::ToolCallTimeout {
                tool: WEB_SEARCH.to_string(),
                timeout_ms: duration_ms(timeout),
            })??;

        let items = response
            .payload
            .as_ref()
            .map(WebSearchItem::from_payload)
            .unwrap_or_default();

        debug!(
            tool = WEB_SEARCH,
            items = items.len(),
            elapsed_ms = duration_ms(started.elapsed()),
            "Web search returned"
        );

        Ok(items.into_iter().map(web_result).collect())
    }
}

fn local_result(hit: ScoredDocument) -> RetrievalResult {
    let ScoredDocument { document, score } = hit;
    let snippet = truncate_chars(&document.text, SNIPPET_MAX_CHARS);
    let title = document.title().to_string();
    RetrievalResult::local(document.id, title, snippet, score)
}

fn web_result(item: WebSearchItem) -> RetrievalResult {
    let title = if item.title.trim().is_empty() {
        item.url.clone()
    } else {
        item.title
    };
    RetrievalResult::web(item.url, title, item.snippet, item.score)
}

fn duration_ms(duration: Duration) -> u64 {
    u64::try_from(duration.as_millis()).unwrap_or(u64::MAX)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use rag_domain::tool::entities::{ToolDefinition, ToolSpec};
    use rag_domain::{
        CollectionPolicy, Document, EscalationPolicy, Metadata, Source, ThresholdCombine,
        ThresholdComparison, ToolResponse,
    };
    use std::collections::HashSet;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};

    // ==================== Test Mocks ====================

    struct MockEmbedder {
        fail: bool,
    }

    #[async_trait]
    impl Embedder for MockEmbedder {
        fn dimension(&self) -> usize {
            3
        }

        async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, EmbeddingError> {
            if self.fail {
                return Err(EmbeddingError::Unavailable("model offline".to_string()));
            }
            Ok(texts.iter().map(|_| vec![1.0, 0.0, 0.0]).collect())
        }
    }

    /// Returns pre-scored hits (already sorted) truncated to `top_k`.
    struct MockIndex {
        hits: Vec<(String, f32)>,
        error: Option<IndexError>,
        text: Option<String>,
    }

    impl MockIndex {
        fn with_scores(scores: &[f32]) -> Self {
            Self {
                hits: scores
                    .iter()
                    .enumerate()
                    .map(|(i, s)| (format!("doc-{}", i + 1), *s))
                    .collect(),
                error: None,
                text: None,
            }
        }

        fn failing(error: IndexError) -> Self {
            Self {
                hits: Vec::new(),
                error: Some(error),
                text: None,
            }
        }

        fn unavailable() -> Self {
            Self::failing(IndexError::unavailable("marketing", "connection refused"))
        }

        fn with_text(mut self, text: impl Into<String>) -> Self {
            self.text = Some(text.into());
            self
        }
    }

    #[async_trait]
    impl VectorIndex for MockIndex {
        async fn upsert(&self, _collection: &str, _document: Document) -> Result<(), IndexError> {
            Ok(())
        }

        async fn search(
            &self,
            collection: &str,
            _query_vector: &[f32],
            top_k: usize,
        ) -> Result<Vec<ScoredDocument>, IndexError> {
            if let Some(error) = &self.error {
                return Err(error.clone());
            }
            Ok(self
                .hits
                .iter()
                .take(top_k)
                .map(|(id, score)| ScoredDocument {
                    document: Document::new(
                        id.clone(),
                        collection,
                        self.text.clone().unwrap_or_else(|| format!("text of {id}")),
                        vec![1.0, 0.0, 0.0],
                    )
                        .with_metadata("title", format!("Title {id}")),
                    score: *score,
                })
                .collect())
        }

        async fn refresh_metadata(
            &self,
            collection: &str,
            id: &str,
            _metadata: Metadata,
        ) -> Result<(), IndexError> {
            Err(IndexError::DocumentNotFound {
                collection: collection.to_string(),
                id: id.to_string(),
            })
        }

        async fn count(&self, _collection: &str) -> Result<usize, IndexError> {
            Ok(self.hits.len())
        }

        async fn collections(&self) -> Vec<String> {
            vec!["marketing".to_string()]
        }
    }

    enum ToolBehavior {
        Items(Vec<WebSearchItem>),
        Fail(ToolCallError),
        Hang,
    }

    /// Records calls with an atomic counter
    struct MockTools {
        spec: ToolSpec,
        behavior: ToolBehavior,
        timeout: Duration,
        calls: AtomicUsize,
        last_args: Mutex<Option<ToolCall>>,
        last_timeout: Mutex<Option<Option<Duration>>>,
    }

    impl MockTools {
        fn new(behavior: ToolBehavior) -> Self {
            Self {
                spec: ToolSpec::new().register(ToolDefinition::new(WEB_SEARCH, "Search the web")),
                behavior,
                timeout: Duration::from_secs(5),
                calls: AtomicUsize::new(0),
                last_args: Mutex::new(None),
                last_timeout: Mutex::new(None),
            }
        }

        fn with_timeout(mut self, timeout: Duration) -> Self {
            self.timeout = timeout;
            self
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl ToolExecutorPort for MockTools {
        fn tool_spec(&self) -> &ToolSpec {
            &self.spec
        }

        fn timeout_for(&self, _tool_name: &str) -> Duration {
            self.timeout
        }

        async fn call(
            &self,
            call: &ToolCall,
            timeout: Option<Duration>,
            _cancel: &CancellationToken,
        ) -> Result<ToolResponse, ToolCallError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            *self.last_args.lock().unwrap() = Some(call.clone());
            *self.last_timeout.lock().unwrap() = Some(timeout);
            match &self.behavior {
                ToolBehavior::Items(items) => Ok(ToolResponse::success(
                    WEB_SEARCH,
                    WebSearchItem::to_payload(items),
                    5,
                )),
                ToolBehavior::Fail(e) => Err(e.clone()),
                ToolBehavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(30)).await;
                    Ok(ToolResponse::success(WEB_SEARCH, serde_json::json!({}), 30_000))
                }
            }
        }
    }

    fn web_item(url: &str, score: f32) -> WebSearchItem {
        WebSearchItem {
            title: format!("Web {url}"),
            url: url.to_string(),
            snippet: "live".to_string(),
            score,
        }
    }

    fn retriever(index: MockIndex, tools: Arc<MockTools>, params: RetrievalParams) -> Retriever {
        Retriever::new(
            Arc::new(MockEmbedder { fail: false }),
            Arc::new(index),
            tools,
            params,
        )
    }

    fn query(min_hits: usize, min_score: f32, top_k: usize) -> Query {
        let policy = CollectionPolicy {
            min_hits,
            min_score,
            top_k,
            embedding_dimension: None,
        };
        Query::new("brand awareness trends", "marketing", &policy).unwrap()
    }

    const MARKETING: [f32; 5] = [0.92, 0.81, 0.77, 0.5, 0.3];

    // ==================== Tests ====================

    #[tokio::test]
    async fn test_sufficient_local_results_never_call_web_search() {
        let tools = Arc::new(MockTools::new(ToolBehavior::Items(vec![])));
        let retriever = retriever(
            MockIndex::with_scores(&MARKETING),
            tools.clone(),
            RetrievalParams::default(),
        );

        let outcome = retriever
            .retrieve(&query(3, 0.6, 3), RetrievalMode::Hybrid, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(tools.calls(), 0);
        assert!(!outcome.escalated);
        assert!(!outcome.degraded);
        let scores: Vec<f32> = outcome.results.iter().map(|r| r.score).collect();
        assert_eq!(scores, vec![0.92, 0.81, 0.77]);
        let ranks: Vec<usize> = outcome.results.iter().map(|r| r.rank).collect();
        assert_eq!(ranks, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_too_few_hits_escalates_exactly_once() {
        let tools = Arc::new(MockTools::new(ToolBehavior::Items(vec![web_item(
            "https://example.com/a",
            0.7,
        )])));
        let retriever = retriever(
            MockIndex::with_scores(&[0.9, 0.8]),
            tools.clone(),
            RetrievalParams::default(),
        );

        let outcome = retriever
            .retrieve(&query(3, 0.6, 5), RetrievalMode::Hybrid, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(tools.calls(), 1);
        assert!(outcome.escalated);
        assert_eq!(outcome.local_count(), 2);
        assert_eq!(outcome.web_count(), 1);

        let call = tools.last_args.lock().unwrap().clone().unwrap();
        assert_eq!(call.get_string("query"), Some("brand awareness trends"));
        assert_eq!(call.get_u64("max_results"), Some(5));
    }

    #[tokio::test]
    async fn test_low_best_score_escalates_with_or_condition() {
        let tools = Arc::new(MockTools::new(ToolBehavior::Items(vec![])));
        let retriever = retriever(
            MockIndex::with_scores(&MARKETING),
            tools.clone(),
            RetrievalParams::default(),
        );

        let outcome = retriever
            .retrieve(&query(5, 0.95, 5), RetrievalMode::Hybrid, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(tools.calls(), 1);
        assert!(outcome.escalated);
        assert_eq!(outcome.local_count(), 5);
    }

    #[tokio::test]
    async fn test_all_combine_requires_both_conditions() {
        let tools = Arc::new(MockTools::new(ToolBehavior::Items(vec![])));
        let params = RetrievalParams::default().with_policy(EscalationPolicy::new(
            ThresholdComparison::Strict,
            ThresholdCombine::All,
        ));
        let retriever = retriever(MockIndex::with_scores(&MARKETING), tools.clone(), params);

        retriever
            .retrieve(&query(5, 0.95, 5), RetrievalMode::Hybrid, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(tools.calls(), 0);
    }

    #[tokio::test]
    async fn test_timeout_degrades_to_local_results() {
        let tools = Arc::new(MockTools::new(ToolBehavior::Fail(
            ToolCallError::ToolCallTimeout {
                tool: WEB_SEARCH.to_string(),
                timeout_ms: 100,
            },
        )));
        let retriever = retriever(
            MockIndex::with_scores(&[0.9]),
            tools.clone(),
            RetrievalParams::default(),
        );

        let outcome = retriever
            .retrieve(&query(3, 0.6, 5), RetrievalMode::Hybrid, &CancellationToken::new())
            .await
            .unwrap();

        assert!(outcome.degraded);
        assert!(!outcome.results.is_empty());
        assert!(outcome.results.iter().all(|r| r.source == Source::Local));
    }

    #[tokio::test]
    async fn test_unknown_tool_degrades() {
        let tools = Arc::new(MockTools::new(ToolBehavior::Fail(ToolCallError::UnknownTool(
            WEB_SEARCH.to_string(),
        ))));
        let retriever = retriever(
            MockIndex::with_scores(&[0.4]),
            tools,
            RetrievalParams::default(),
        );

        let outcome = retriever
            .retrieve(&query(1, 0.6, 5), RetrievalMode::Hybrid, &CancellationToken::new())
            .await
            .unwrap();

        assert!(outcome.degraded);
        assert_eq!(outcome.local_count(), 1);
    }

    #[tokio::test]
    async fn test_hung_tool_bounded_by_its_configured_timeout() {
        let tools = Arc::new(
            MockTools::new(ToolBehavior::Hang).with_timeout(Duration::from_millis(50)),
        );
        let retriever = retriever(
            MockIndex::with_scores(&[0.9]),
            tools.clone(),
            RetrievalParams::default(),
        );

        let started = Instant::now();
        let outcome = retriever
            .retrieve(&query(3, 0.6, 5), RetrievalMode::Hybrid, &CancellationToken::new())
            .await
            .unwrap();

        assert!(outcome.degraded);
        assert!(started.elapsed() < Duration::from_secs(1));
        // The executor is left to apply its own per-tool timeout
        assert_eq!(*tools.last_timeout.lock().unwrap(), Some(None));
    }

    #[tokio::test]
    async fn test_dimension_mismatch_escalates_instead_of_failing() {
        let tools = Arc::new(MockTools::new(ToolBehavior::Items(vec![web_item(
            "https://a.dev",
            0.8,
        )])));
        let retriever = retriever(
            MockIndex::failing(IndexError::DimensionMismatch {
                collection: "marketing".to_string(),
                expected: 384,
                actual: 3,
            }),
            tools.clone(),
            RetrievalParams::default(),
        );

        let outcome = retriever
            .retrieve(&query(3, 0.6, 5), RetrievalMode::Hybrid, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(tools.calls(), 1);
        assert!(outcome.local_unavailable);
        assert!(outcome.escalated);
        assert_eq!(outcome.web_count(), 1);
    }

    #[tokio::test]
    async fn test_snippet_limit_counts_characters() {
        let tools = Arc::new(MockTools::new(ToolBehavior::Items(vec![])));
        let text = "特".repeat(SNIPPET_MAX_CHARS);
        let retriever = retriever(
            MockIndex::with_scores(&[0.9]).with_text(text.clone()),
            tools,
            RetrievalParams::default(),
        );

        let outcome = retriever
            .retrieve(&query(1, 0.5, 1), RetrievalMode::Hybrid, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.results[0].snippet, text);
    }

    #[tokio::test]
    async fn test_unavailable_collection_escalates_to_web_only() {
        let tools = Arc::new(MockTools::new(ToolBehavior::Items(vec![
            web_item("https://a.dev", 0.8),
            web_item("https://b.dev", 0.6),
        ])));
        let retriever = retriever(
            MockIndex::unavailable(),
            tools.clone(),
            RetrievalParams::default(),
        );

        // min_hits = 0 and a permissive score still escalate: no best score exists
        let outcome = retriever
            .retrieve(&query(0, -1.0, 5), RetrievalMode::Hybrid, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(tools.calls(), 1);
        assert!(outcome.local_unavailable);
        assert_eq!(outcome.results.len(), 2);
        assert!(outcome.results.iter().all(|r| r.source == Source::Web));
    }

    #[tokio::test]
    async fn test_merge_caps_and_dedups() {
        let tools = Arc::new(MockTools::new(ToolBehavior::Items(vec![
            web_item("https://a.dev/x", 0.99),
            web_item("https://A.dev/x/", 0.98),
            web_item("https://b.dev", 0.1),
            web_item("https://c.dev", 0.2),
        ])));
        let params = RetrievalParams::default().with_max_results(4);
        let retriever = retriever(MockIndex::with_scores(&MARKETING), tools, params);

        let outcome = retriever
            .retrieve(&query(5, 0.95, 5), RetrievalMode::Hybrid, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(outcome.results.len(), 4);
        let ids: HashSet<_> = outcome.results.iter().map(|r| r.id_or_url.as_str()).collect();
        assert_eq!(ids.len(), 4);
        assert_eq!(outcome.results[0].id_or_url, "https://a.dev/x");
        assert_eq!(outcome.results[1].id_or_url, "doc-1");
    }

    #[tokio::test]
    async fn test_local_only_mode_never_calls_tools() {
        let tools = Arc::new(MockTools::new(ToolBehavior::Items(vec![])));
        let retriever = retriever(
            MockIndex::with_scores(&[0.2]),
            tools.clone(),
            RetrievalParams::default(),
        );

        let outcome = retriever
            .retrieve(&query(3, 0.6, 5), RetrievalMode::LocalOnly, &CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(tools.calls(), 0);
        assert!(!outcome.escalated);
        assert!(!outcome.degraded);
    }

    #[tokio::test]
    async fn test_embedding_failure_is_fatal() {
        let tools = Arc::new(MockTools::new(ToolBehavior::Items(vec![])));
        let retriever = Retriever::new(
            Arc::new(MockEmbedder { fail: true }),
            Arc::new(MockIndex::with_scores(&MARKETING)),
            tools.clone(),
            RetrievalParams::default(),
        );

        let err = retriever
            .retrieve(&query(3, 0.6, 5), RetrievalMode::Hybrid, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, RetrievalError::Embedding(_)));
        assert_eq!(tools.calls(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let tools = Arc::new(MockTools::new(ToolBehavior::Items(vec![])));
        let retriever = retriever(
            MockIndex::with_scores(&MARKETING),
            tools,
            RetrievalParams::default(),
        );
        let token = CancellationToken::new();
        token.cancel();

        let err = retriever
            .retrieve(&query(3, 0.6, 5), RetrievalMode::Hybrid, &token)
            .await
            .unwrap_err();
        assert_eq!(err, RetrievalError::Cancelled);
    }

    #[tokio::test]
    async fn test_local_result_fields() {
        let tools = Arc::new(MockTools::new(ToolBehavior::Items(vec![WebSearchItem {
            title: String::new(),
            url: "https://untitled.dev".to_string(),
            snippet: String::new(),
            score: 0.0,
        }])));
        let retriever = retriever(
            MockIndex::with_scores(&[0.5]),
            tools,
            RetrievalParams::default(),
        );

        let outcome = retriever
            .retrieve(&query(3, 0.6, 5), RetrievalMode::Hybrid, &CancellationToken::new())
            .await
            .unwrap();

        let local = &outcome.results[0];
        assert_eq!(local.title, "Title doc-1");
        assert_eq!(local.snippet, "text of doc-1");

        let web = &outcome.results[1];
        assert_eq!(web.title, "https://untitled.dev");
    }
}
