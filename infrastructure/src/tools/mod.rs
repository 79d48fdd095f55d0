//! Tool-call client and tool providers
//!
//! ## Providers
//!
//! - `web`: the `web_search` tool (JSON endpoint or DuckDuckGo), priority 50
//! - `http:<name>`: one generic HTTP JSON tool per configured `[tools.<name>]`
//!   entry with an endpoint, priority from its configuration
//!
//! [`ToolCallClient`] routes calls to them and owns the timeout, retry and
//! cancellation rules.

mod client;
mod http_tool;
mod transport;
pub mod web;

pub use client::ToolCallClient;
pub use http_tool::HttpToolProvider;
pub use transport::{USER_AGENT, build_http_client};
pub use web::{SearchBackend, WebSearchProvider, web_search_definition};

use rag_domain::tool::WEB_SEARCH;
use std::time::Duration;
use tracing::warn;

use crate::config::FileConfig;

/// Build and discover the tool-call client described by `[tools]`.
///
/// `web_search` is always registered. Other entries need an `endpoint`;
/// entries without one are skipped with a warning.
pub async fn tool_client_from_config(config: &FileConfig, http: reqwest::Client) -> ToolCallClient {
    let web = config.tool_config(WEB_SEARCH).unwrap_or_default();
    let mut client = ToolCallClient::new()
        .register(WebSearchProvider::from_config(http.clone(), &web))
        .with_timeout(WEB_SEARCH, Duration::from_millis(web.timeout_ms));

    for (name, tool) in config.tools.iter().filter(|(name, _)| name.as_str() != WEB_SEARCH) {
        match HttpToolProvider::from_config(http.clone(), name, tool) {
            Some(provider) => {
                client = client
                    .register(provider)
                    .with_timeout(name.clone(), Duration::from_millis(tool.timeout_ms));
            }
            None => warn!(tool = %name, "Tool has no endpoint configured, skipping"),
        }
    }

    client.discover().await;
    client
}
