//! Tool-call client
//!
//! The [`ToolCallClient`] aggregates [`ToolProvider`]s and implements
//! [`ToolExecutorPort`]. It resolves the tool registry once, validates
//! arguments, and applies the timeout, retry and cancellation rules shared
//! by every tool.
//!
//! # Usage
//!
//! ```ignore
//! use rag_infrastructure::tools::{HttpToolProvider, ToolCallClient, WebSearchProvider};
//!
//! let mut client = ToolCallClient::new()
//!     .register(WebSearchProvider::duckduckgo(http.clone()))   // priority: 50
//!     .register(HttpToolProvider::from_config(http, "patent_lookup", &config)?);
//!
//! client.discover().await;
//!
//! let call = ToolCall::new("web_search").with_arg("query", "EU AI act");
//! let response = client.call(&call, None, &CancellationToken::new()).await?;
//! ```
//!
//! # Call Semantics
//!
//! 1. Unregistered name → [`ToolCallError::UnknownTool`], no I/O
//! 2. Missing required argument → [`ToolCallError::ToolCallFailed`], no I/O
//! 3. A [`ProviderError::Transient`] failure is retried once, immediately
//! 4. The timeout bounds the whole call, retry included, and is never retried
//! 5. Cancellation discards whatever is in flight

use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use rag_application::ports::tool_executor::{ToolCallError, ToolExecutorPort};
use rag_domain::tool::{
    entities::{ToolCall, ToolSpec},
    provider::{ProviderError, ToolProvider},
    traits::{DefaultToolValidator, ToolValidator},
    value_objects::ToolResponse,
};
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::config::DEFAULT_TOOL_TIMEOUT_MS;

/// Tool-call client that routes calls to the provider owning each tool
///
/// When multiple providers offer the same tool, the one with the higher
/// priority is used.
pub struct ToolCallClient {
    providers: Vec<Arc<dyn ToolProvider>>,
    /// Tool name -> index into `providers` (built by `discover`)
    tool_mapping: HashMap<String, usize>,
    tool_spec: ToolSpec,
    /// Per-tool default timeouts
    timeouts: HashMap<String, Duration>,
    default_timeout: Duration,
    validator: DefaultToolValidator,
}

impl ToolCallClient {
    pub fn new() -> Self {
        Self {
            providers: Vec::new(),
            tool_mapping: HashMap::new(),
            tool_spec: ToolSpec::new(),
            timeouts: HashMap::new(),
            default_timeout: Duration::from_millis(DEFAULT_TOOL_TIMEOUT_MS),
            validator: DefaultToolValidator,
        }
    }

    /// Register a tool provider
    pub fn register<P: ToolProvider + 'static>(self, provider: P) -> Self {
        self.register_arc(Arc::new(provider))
    }

    /// Register a tool provider (Arc version)
    pub fn register_arc(mut self, provider: Arc<dyn ToolProvider>) -> Self {
        self.providers.push(provider);
        self
    }

    /// Default timeout of one tool, used when the caller passes none
    pub fn with_timeout(mut self, tool: impl Into<String>, timeout: Duration) -> Self {
        self.timeouts.insert(tool.into(), timeout);
        self
    }

    /// Timeout for tools without their own setting
    pub fn with_default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Resolve the registry from all providers.
    ///
    /// Providers are visited by priority (highest first); the first provider
    /// to offer a tool name owns it. Availability is checked concurrently
    /// and unavailable providers are skipped.
    pub async fn discover(&mut self) {
        self.providers.sort_by_key(|p| std::cmp::Reverse(p.priority()));

        let mut tool_spec = ToolSpec::new();
        let mut tool_mapping = HashMap::new();

        let availability =
            futures::future::join_all(self.providers.iter().map(|p| p.is_available())).await;

        for ((index, provider), available) in self.providers.iter().enumerate().zip(availability) {
            if !available {
                debug!(provider = provider.id(), "Provider not available, skipping");
                continue;
            }

            for tool in provider.tools() {
                if tool_mapping.contains_key(&tool.name) {
                    debug!(
                        tool = %tool.name,
                        provider = provider.id(),
                        "Tool already registered by higher priority provider"
                    );
                    continue;
                }
                debug!(tool = %tool.name, provider = provider.id(), "Registered tool");
                tool_mapping.insert(tool.name.clone(), index);
                tool_spec = tool_spec.register(tool);
            }
        }

        self.tool_spec = tool_spec;
        self.tool_mapping = tool_mapping;
    }

    /// IDs of the registered providers
    pub fn provider_ids(&self) -> Vec<&str> {
        self.providers.iter().map(|p| p.id()).collect()
    }

    /// ID of the provider that owns `tool_name`
    pub fn provider_of(&self, tool_name: &str) -> Option<&str> {
        self.provider_for(tool_name).map(|p| p.id())
    }

    fn provider_for(&self, tool_name: &str) -> Option<&Arc<dyn ToolProvider>> {
        let index = *self.tool_mapping.get(tool_name)?;
        self.providers.get(index)
    }
}

impl Default for ToolCallClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Execute once, and once more if the first attempt failed transiently.
async fn execute_with_retry(
    provider: &dyn ToolProvider,
    call: &ToolCall,
) -> Result<serde_json::Value, ProviderError> {
    match provider.execute(call).await {
        Err(e) if e.is_transient() => {
            warn!(tool = %call.tool_name, error = %e, "Transient tool failure, retrying once");
            provider.execute(call).await
        }
        other => other,
    }
}

#[async_trait]
impl ToolExecutorPort for ToolCallClient {
    fn tool_spec(&self) -> &ToolSpec {
        &self.tool_spec
    }

    fn timeout_for(&self, tool_name: &str) -> Duration {
        self.timeouts
            .get(tool_name)
            .copied()
            .unwrap_or(self.default_timeout)
    }

    async fn call(
        &self,
        call: &ToolCall,
        timeout: Option<Duration>,
        cancel: &CancellationToken,
    ) -> Result<ToolResponse, ToolCallError> {
        let tool = call.tool_name.clone();

        let Some(provider) = self.provider_for(&tool) else {
            return Err(ToolCallError::UnknownTool(tool));
        };

        if let Some(definition) = self.tool_spec.get(&tool) {
            self.validator
                .validate(call, definition)
                .map_err(|reason| ToolCallError::ToolCallFailed {
                    tool: tool.clone(),
                    reason,
                })?;
        }

        let timeout = timeout.unwrap_or_else(|| self.timeout_for(&tool));
        let started = Instant::now();

        let outcome = tokio::select! {
            biased;
            _ = cancel.cancelled() => {
                debug!(tool = %tool, "Tool call cancelled");
                return Err(ToolCallError::Cancelled);
            }
            outcome = tokio::time::timeout(timeout, execute_with_retry(provider.as_ref(), call)) => outcome,
        };
        let elapsed_ms = started.elapsed().as_millis() as u64;

        match outcome {
            Ok(Ok(payload)) => {
                debug!(tool = %tool, elapsed_ms, "Tool call succeeded");
                Ok(ToolResponse::success(tool, payload, elapsed_ms))
            }
            Ok(Err(e)) => {
                warn!(tool = %tool, elapsed_ms, error = %e, "Tool call failed");
                Err(ToolCallError::ToolCallFailed {
                    tool,
                    reason: e.to_string(),
                })
            }
            Err(_) => {
                warn!(tool = %tool, elapsed_ms, "Tool call timed out");
                Err(ToolCallError::ToolCallTimeout {
                    tool,
                    timeout_ms: timeout.as_millis() as u64,
                })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rag_domain::tool::entities::{ToolDefinition, ToolParameter};
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Provider whose first `failures` calls fail with the given error
    struct ScriptedProvider {
        id: &'static str,
        priority: i32,
        tool: &'static str,
        failures: usize,
        error: ProviderError,
        delay: Duration,
        calls: AtomicUsize,
    }

    impl ScriptedProvider {
        fn ok(id: &'static str, tool: &'static str) -> Self {
            Self {
                id,
                priority: 0,
                tool,
                failures: 0,
                error: ProviderError::Transient("unused".into()),
                delay: Duration::ZERO,
                calls: AtomicUsize::new(0),
            }
        }

        fn failing(mut self, failures: usize, error: ProviderError) -> Self {
            self.failures = failures;
            self.error = error;
            self
        }

        fn with_priority(mut self, priority: i32) -> Self {
            self.priority = priority;
            self
        }

        fn with_delay(mut self, delay: Duration) -> Self {
            self.delay = delay;
            self
        }
    }

    #[async_trait]
    impl ToolProvider for ScriptedProvider {
        fn id(&self) -> &str {
            self.id
        }

        fn priority(&self) -> i32 {
            self.priority
        }

        fn tools(&self) -> Vec<ToolDefinition> {
            vec![
                ToolDefinition::new(self.tool, "scripted")
                    .with_parameter(ToolParameter::new("query", "Query", true)),
            ]
        }

        async fn execute(&self, _call: &ToolCall) -> Result<serde_json::Value, ProviderError> {
            let n = self.calls.fetch_add(1, Ordering::SeqCst);
            if !self.delay.is_zero() {
                tokio::time::sleep(self.delay).await;
            }
            if n < self.failures {
                return Err(self.error.clone());
            }
            Ok(serde_json::json!({ "provider": self.id }))
        }
    }

    struct Unavailable;

    #[async_trait]
    impl ToolProvider for Unavailable {
        fn id(&self) -> &str {
            "offline"
        }

        async fn is_available(&self) -> bool {
            false
        }

        fn tools(&self) -> Vec<ToolDefinition> {
            vec![ToolDefinition::new("offline_tool", "never registered")]
        }

        async fn execute(&self, _call: &ToolCall) -> Result<serde_json::Value, ProviderError> {
            Err(ProviderError::NotAvailable("offline".into()))
        }
    }

    fn search_call() -> ToolCall {
        ToolCall::new("web_search").with_arg("query", "solar panels")
    }

    async fn client_with(provider: Arc<ScriptedProvider>) -> ToolCallClient {
        let mut client = ToolCallClient::new().register_arc(provider);
        client.discover().await;
        client
    }

    #[tokio::test]
    async fn test_success_returns_payload() {
        let provider = Arc::new(ScriptedProvider::ok("web", "web_search"));
        let client = client_with(provider.clone()).await;

        let response = client
            .call(&search_call(), None, &CancellationToken::new())
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(response.tool_name, "web_search");
        assert_eq!(response.payload.unwrap()["provider"], "web");
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_unknown_tool_performs_no_io() {
        let provider = Arc::new(ScriptedProvider::ok("web", "web_search"));
        let client = client_with(provider.clone()).await;

        let err = client
            .call(&ToolCall::new("stock_quote"), None, &CancellationToken::new())
            .await
            .unwrap_err();

        assert_eq!(err, ToolCallError::UnknownTool("stock_quote".into()));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_missing_argument_fails_before_io() {
        let provider = Arc::new(ScriptedProvider::ok("web", "web_search"));
        let client = client_with(provider.clone()).await;

        let err = client
            .call(&ToolCall::new("web_search"), None, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ToolCallError::ToolCallFailed { .. }));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_transient_failure_retried_once() {
        let provider = Arc::new(
            ScriptedProvider::ok("web", "web_search")
                .failing(1, ProviderError::Transient("503 Service Unavailable".into())),
        );
        let client = client_with(provider.clone()).await;

        let response = client
            .call(&search_call(), None, &CancellationToken::new())
            .await
            .unwrap();

        assert!(response.success);
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_second_transient_failure_is_final() {
        let provider = Arc::new(
            ScriptedProvider::ok("web", "web_search")
                .failing(5, ProviderError::Transient("429 Too Many Requests".into())),
        );
        let client = client_with(provider.clone()).await;

        let err = client
            .call(&search_call(), None, &CancellationToken::new())
            .await
            .unwrap_err();

        match err {
            ToolCallError::ToolCallFailed { tool, reason } => {
                assert_eq!(tool, "web_search");
                assert!(reason.contains("429"));
            }
            other => panic!("expected ToolCallFailed, got {other:?}"),
        }
        assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_rejected_failure_not_retried() {
        let provider = Arc::new(
            ScriptedProvider::ok("web", "web_search")
                .failing(5, ProviderError::Rejected("400 Bad Request".into())),
        );
        let client = client_with(provider.clone()).await;

        let err = client
            .call(&search_call(), None, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(err, ToolCallError::ToolCallFailed { .. }));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_timeout_not_retried() {
        let provider = Arc::new(
            ScriptedProvider::ok("web", "web_search").with_delay(Duration::from_millis(500)),
        );
        let client = client_with(provider.clone()).await;

        let started = Instant::now();
        let err = client
            .call(
                &search_call(),
                Some(Duration::from_millis(30)),
                &CancellationToken::new(),
            )
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ToolCallError::ToolCallTimeout {
                tool: "web_search".into(),
                timeout_ms: 30
            }
        );
        assert!(started.elapsed() < Duration::from_millis(400));
        assert_eq!(provider.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_configured_timeout_used_by_default() {
        let provider = Arc::new(
            ScriptedProvider::ok("web", "web_search").with_delay(Duration::from_millis(500)),
        );
        let mut client = ToolCallClient::new()
            .register_arc(provider)
            .with_timeout("web_search", Duration::from_millis(20));
        client.discover().await;

        let err = client
            .call(&search_call(), None, &CancellationToken::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            ToolCallError::ToolCallTimeout { timeout_ms: 20, .. }
        ));
        assert_eq!(client.timeout_for("other"), Duration::from_millis(5_000));
    }

    #[tokio::test]
    async fn test_cancellation_discards_call() {
        let provider = Arc::new(
            ScriptedProvider::ok("web", "web_search").with_delay(Duration::from_millis(500)),
        );
        let client = client_with(provider).await;
        let cancel = CancellationToken::new();

        let trigger = cancel.clone();
        tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(20)).await;
            trigger.cancel();
        });

        let err = client.call(&search_call(), None, &cancel).await.unwrap_err();
        assert_eq!(err, ToolCallError::Cancelled);
    }

    #[tokio::test]
    async fn test_higher_priority_provider_wins() {
        let low = Arc::new(ScriptedProvider::ok("generic", "web_search"));
        let high = Arc::new(ScriptedProvider::ok("web", "web_search").with_priority(50));
        let mut client = ToolCallClient::new()
            .register_arc(low.clone())
            .register_arc(high.clone())
            .register(Unavailable);
        client.discover().await;

        assert_eq!(client.provider_of("web_search"), Some("web"));
        assert_eq!(client.list_tools(), vec!["web_search"]);
        assert!(!client.has_tool("offline_tool"));
        assert_eq!(client.provider_ids(), vec!["web", "generic", "offline"]);

        client
            .call(&search_call(), None, &CancellationToken::new())
            .await
            .unwrap();
        assert_eq!(high.calls.load(Ordering::SeqCst), 1);
        assert_eq!(low.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_undiscovered_client_knows_no_tools() {
        let client = ToolCallClient::new().register(ScriptedProvider::ok("web", "web_search"));
        let err = client
            .call(&search_call(), None, &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(err, ToolCallError::UnknownTool(_)));
    }
}
