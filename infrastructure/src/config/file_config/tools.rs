//! Tools configuration from TOML (`[tools.<name>]` sections)
//!
//! `web_search` is always present. Without an `endpoint` it uses the keyless
//! DuckDuckGo Instant Answer API; with one it posts to a JSON search service.
//! Any other entry becomes a generic HTTP JSON tool.
//!
//! ```toml
//! [tools.web_search]
//! timeout_ms = 3000
//! endpoint = "https://search.internal/api/search"
//! api_key_env = "SEARCH_API_KEY"
//!
//! [tools.patent_lookup]
//! description = "Look up patents by keyword"
//! endpoint = "https://patents.internal/lookup"
//! timeout_ms = 8000
//!
//! [tools.patent_lookup.parameters.query]
//! description = "Keywords"
//! required = true
//! ```

use rag_domain::tool::WEB_SEARCH;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Default per-tool timeout
pub const DEFAULT_TOOL_TIMEOUT_MS: u64 = 5_000;

/// Parameter declared by a configured tool
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileToolParameter {
    /// Parameter type: "string", "number", "integer", "boolean"
    #[serde(rename = "type", default = "default_string_type")]
    pub param_type: String,
    #[serde(default)]
    pub description: String,
    /// Whether this parameter is required (default: true)
    #[serde(default = "default_true")]
    pub required: bool,
}

fn default_string_type() -> String {
    "string".to_string()
}

fn default_true() -> bool {
    true
}

/// One `[tools.<name>]` entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileToolConfig {
    pub description: String,
    /// HTTP endpoint the call is posted to
    pub endpoint: Option<String>,
    /// Environment variable holding a bearer token
    pub api_key_env: Option<String>,
    /// Default timeout when the caller passes none
    pub timeout_ms: u64,
    /// Higher priority wins when two providers offer the same tool name
    pub priority: i32,
    pub parameters: BTreeMap<String, FileToolParameter>,
}

impl Default for FileToolConfig {
    fn default() -> Self {
        Self {
            description: String::new(),
            endpoint: None,
            api_key_env: None,
            timeout_ms: DEFAULT_TOOL_TIMEOUT_MS,
            priority: 0,
            parameters: BTreeMap::new(),
        }
    }
}

/// Default `[tools]` table: only `web_search`
pub fn default_tools() -> BTreeMap<String, FileToolConfig> {
    let mut tools = BTreeMap::new();
    tools.insert(WEB_SEARCH.to_string(), FileToolConfig::default());
    tools
}
