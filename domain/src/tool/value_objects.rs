//! Tool domain value objects: responses and well-known payload shapes
//!
//! A [`ToolResponse`] mirrors the wire contract
//! `{success, payload, error}` plus the measured `elapsed_ms`. The client
//! never looks inside `payload`; callers that know a tool's payload shape
//! (the retriever for `web_search`) decode it themselves.

use serde::{Deserialize, Serialize};

/// Canonical tool name for web search.
pub const WEB_SEARCH: &str = "web_search";

/// Outcome of one tool invocation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ToolResponse {
    pub tool_name: String,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub payload: Option<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    pub elapsed_ms: u64,
}

impl ToolResponse {
    pub fn success(tool_name: impl Into<String>, payload: serde_json::Value, elapsed_ms: u64) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: true,
            payload: Some(payload),
            error: None,
            elapsed_ms,
        }
    }

    pub fn failure(tool_name: impl Into<String>, error: impl Into<String>, elapsed_ms: u64) -> Self {
        Self {
            tool_name: tool_name.into(),
            success: false,
            payload: None,
            error: Some(error.into()),
            elapsed_ms,
        }
    }
}

/// One item of a `web_search` payload: `{"results": [WebSearchItem, ...]}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WebSearchItem {
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub url: String,
    #[serde(default)]
    pub snippet: String,
    #[serde(default)]
    pub score: f32,
}

impl WebSearchItem {
    /// Decode the items of a `web_search` payload.
    ///
    /// Accepts `{"results": [...]}` or a bare array. Items that fail to
    /// decode or have no URL are skipped.
    pub fn from_payload(payload: &serde_json::Value) -> Vec<WebSearchItem> {
        let items = match payload {
            serde_json::Value::Array(items) => items.as_slice(),
            other => match other.get("results").and_then(|r| r.as_array()) {
                Some(items) => items.as_slice(),
                None => return Vec::new(),
            },
        };

        items
            .iter()
            .filter_map(|item| serde_json::from_value::<WebSearchItem>(item.clone()).ok())
            .filter(|item| !item.url.trim().is_empty())
            .collect()
    }

    /// Payload form of a list of items
    pub fn to_payload(items: &[WebSearchItem]) -> serde_json::Value {
        serde_json::json!({ "results": items })
    }
}
