//! `web_search` tool provider.
//!
//! Two backends produce the same payload shape,
//! `{"results": [{"title", "url", "snippet", "score"}]}`:
//!
//! - **JSON endpoint** (`[tools.web_search] endpoint = ...`): the request
//!   `{"query", "max_results"}` is POSTed and the response body is returned
//!   as-is; the service is expected to answer in the shape above.
//! - **DuckDuckGo Instant Answer API** (no endpoint configured): requires no
//!   API key. The abstract and related topics are mapped to items whose
//!   score decays with their position.
//!
//! # Parameters
//!
//! | Name | Type | Required | Description |
//! |------|------|:---:|-------------|
//! | `query` | string | Yes | The search query |
//! | `max_results` | integer | No | Maximum items returned (default 10) |

use async_trait::async_trait;
use rag_domain::tool::{
    entities::{ToolCall, ToolDefinition, ToolParameter},
    provider::{ProviderError, ToolProvider},
    value_objects::{WEB_SEARCH, WebSearchItem},
};
use serde_json::Value;
use tracing::debug;

use crate::config::FileToolConfig;
use crate::tools::transport::{api_key_from_env, send_json};

/// DuckDuckGo Instant Answer API endpoint (no API key required).
const DDG_API_URL: &str = "https://api.duckduckgo.com/";

/// Items returned when the caller does not say
const DEFAULT_MAX_RESULTS: usize = 10;

/// Score of the first DuckDuckGo item; each later item scores `DDG_SCORE_STEP` less
const DDG_TOP_SCORE: f32 = 0.9;
const DDG_SCORE_STEP: f32 = 0.05;
const DDG_MIN_SCORE: f32 = 0.1;

/// Where searches are sent
#[derive(Debug, Clone, PartialEq)]
pub enum SearchBackend {
    DuckDuckGo,
    Endpoint {
        url: String,
        api_key: Option<String>,
    },
}

/// Provider of the `web_search` tool
pub struct WebSearchProvider {
    client: reqwest::Client,
    backend: SearchBackend,
    /// Environment variable that must hold a key for the endpoint backend
    required_key: Option<String>,
}

impl WebSearchProvider {
    /// Wins over generic providers that also declare `web_search`
    pub const PRIORITY: i32 = 50;

    pub fn duckduckgo(client: reqwest::Client) -> Self {
        Self {
            client,
            backend: SearchBackend::DuckDuckGo,
            required_key: None,
        }
    }

    pub fn endpoint(client: reqwest::Client, url: impl Into<String>, api_key: Option<String>) -> Self {
        Self {
            client,
            backend: SearchBackend::Endpoint {
                url: url.into(),
                api_key,
            },
            required_key: None,
        }
    }

    /// Build from the `[tools.web_search]` entry.
    pub fn from_config(client: reqwest::Client, config: &FileToolConfig) -> Self {
        match &config.endpoint {
            Some(url) => {
                let mut provider = Self::endpoint(
                    client,
                    url.clone(),
                    api_key_from_env(config.api_key_env.as_deref()),
                );
                provider.required_key = config.api_key_env.clone();
                provider
            }
            None => Self::duckduckgo(client),
        }
    }

    pub fn backend(&self) -> &SearchBackend {
        &self.backend
    }

    async fn search_endpoint(
        &self,
        url: &str,
        api_key: Option<&str>,
        query: &str,
        max_results: usize,
    ) -> Result<Value, ProviderError> {
        let mut request = self
            .client
            .post(url)
            .json(&serde_json::json!({ "query": query, "max_results": max_results }));
        if let Some(key) = api_key {
            request = request.bearer_auth(key);
        }
        send_json(request).await
    }

    async fn search_duckduckgo(&self, query: &str, max_results: usize) -> Result<Value, ProviderError> {
        let body = send_json(self.client.get(DDG_API_URL).query(&[
            ("q", query),
            ("format", "json"),
            ("no_html", "1"),
            ("skip_disambig", "1"),
        ]))
        .await?;

        let items = instant_answer_items(&body, max_results);
        debug!(items = items.len(), "DuckDuckGo instant answer mapped");
        Ok(WebSearchItem::to_payload(&items))
    }
}

/// Create the [`ToolDefinition`] for `web_search`.
pub fn web_search_definition() -> ToolDefinition {
    ToolDefinition::new(
        WEB_SEARCH,
        "Search the web. Returns titled results with URLs and snippets.",
    )
    .with_parameter(ToolParameter::new("query", "The search query", true).with_type("string"))
    .with_parameter(
        ToolParameter::new("max_results", "Maximum number of results", false).with_type("integer"),
    )
}

#[async_trait]
impl ToolProvider for WebSearchProvider {
    fn id(&self) -> &str {
        "web"
    }

    fn priority(&self) -> i32 {
        Self::PRIORITY
    }

    async fn is_available(&self) -> bool {
        match (&self.backend, &self.required_key) {
            (SearchBackend::Endpoint { api_key: None, .. }, Some(var)) => {
                debug!(env = %var, "web_search endpoint configured but its API key is not set");
                false
            }
            _ => true,
        }
    }

    fn tools(&self) -> Vec<ToolDefinition> {
        vec![web_search_definition()]
    }

    async fn execute(&self, call: &ToolCall) -> Result<Value, ProviderError> {
        if call.tool_name != WEB_SEARCH {
            return Err(ProviderError::ToolNotFound(call.tool_name.clone()));
        }

        let query = call.require_string("query").map_err(ProviderError::Rejected)?;
        let max_results = call
            .get_u64("max_results")
            .map(|n| n as usize)
            .unwrap_or(DEFAULT_MAX_RESULTS);

        match &self.backend {
            SearchBackend::Endpoint { url, api_key } => {
                self.search_endpoint(url, api_key.as_deref(), query, max_results)
                    .await
            }
            SearchBackend::DuckDuckGo => self.search_duckduckgo(query, max_results).await,
        }
    }
}

/// Map a DuckDuckGo Instant Answer response to search items.
///
/// The abstract comes first, then related topics (topic groups flattened).
/// Entries without a URL are skipped.
fn instant_answer_items(data: &Value, max_results: usize) -> Vec<WebSearchItem> {
    let mut entries: Vec<(String, String, String)> = Vec::new();

    if let (Some(text), Some(url)) = (non_empty(&data["AbstractText"]), non_empty(&data["AbstractURL"])) {
        let title = non_empty(&data["Heading"])
            .or_else(|| non_empty(&data["AbstractSource"]))
            .unwrap_or(url);
        entries.push((title.to_string(), url.to_string(), text.to_string()));
    }

    if let Some(topics) = data["RelatedTopics"].as_array() {
        let flattened = topics.iter().flat_map(|topic| match topic["Topics"].as_array() {
            Some(group) => group.iter().collect::<Vec<_>>(),
            None => vec![topic],
        });

        for topic in flattened {
            let (Some(text), Some(url)) = (non_empty(&topic["Text"]), non_empty(&topic["FirstURL"]))
            else {
                continue;
            };
            let title = text.split(" - ").next().unwrap_or(text).trim();
            entries.push((title.to_string(), url.to_string(), text.to_string()));
        }
    }

    entries
        .into_iter()
        .take(max_results)
        .enumerate()
        .map(|(position, (title, url, snippet))| WebSearchItem {
            title,
            url,
            snippet,
            score: (DDG_TOP_SCORE - DDG_SCORE_STEP * position as f32).max(DDG_MIN_SCORE),
        })
        .collect()
}

fn non_empty(value: &Value) -> Option<&str> {
    value.as_str().map(str::trim).filter(|s| !s.is_empty())
}
