//! Shared HTTP plumbing for tool providers
//!
//! Maps `reqwest` outcomes onto [`ProviderError`] so every provider agrees on
//! what is transient: network failures and 5xx/429 statuses.

use rag_domain::tool::provider::ProviderError;
use reqwest::{RequestBuilder, StatusCode};
use std::time::Duration;

/// User agent sent with every tool request
pub const USER_AGENT: &str = concat!("hybrid-rag/", env!("CARGO_PKG_VERSION"));

/// Build the shared HTTP client (one connection pool for every provider).
///
/// Per-call deadlines are enforced by the tool-call client; `ceiling` is
/// only a backstop for connections that never finish.
pub fn build_http_client(ceiling: Duration) -> reqwest::Client {
    reqwest::Client::builder()
        .user_agent(USER_AGENT)
        .timeout(ceiling)
        .build()
        .unwrap_or_else(|_| reqwest::Client::new())
}

/// Classify a non-success status
pub fn status_error(status: StatusCode, body: &str) -> ProviderError {
    let detail = if body.trim().is_empty() {
        status.to_string()
    } else {
        format!("{}: {}", status, rag_domain::core::string::truncate(body.trim(), 200))
    };

    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
        ProviderError::Transient(detail)
    } else {
        ProviderError::Rejected(detail)
    }
}

/// Send a request and decode its JSON body.
pub async fn send_json(request: RequestBuilder) -> Result<serde_json::Value, ProviderError> {
    let response = request
        .send()
        .await
        .map_err(|e| ProviderError::Transient(format!("request failed: {}", e)))?;

    let status = response.status();
    if !status.is_success() {
        let body = response.text().await.unwrap_or_default();
        return Err(status_error(status, &body));
    }

    response
        .json::<serde_json::Value>()
        .await
        .map_err(|e| ProviderError::Rejected(format!("invalid JSON response: {}", e)))
}

/// Read an API key from the environment; unset or blank reads as `None`.
pub fn api_key_from_env(var: Option<&str>) -> Option<String> {
    let var = var?;
    std::env::var(var).ok().filter(|k| !k.trim().is_empty())
}
