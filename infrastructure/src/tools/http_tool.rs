//! Generic HTTP JSON tool provider.
//!
//! Exposes one configured `[tools.<name>]` entry as a tool. A call POSTs its
//! argument map as a JSON object to the tool's endpoint and returns the JSON
//! response body as the payload, uninterpreted.
//!
//! # Example Configuration
//!
//! ```toml
//! [tools.patent_lookup]
//! description = "Look up patents by keyword"
//! endpoint = "https://patents.internal/lookup"
//! api_key_env = "PATENT_API_KEY"
//! priority = 10
//!
//! [tools.patent_lookup.parameters.query]
//! type = "string"
//! description = "Keywords"
//! required = true
//! ```

use async_trait::async_trait;
use rag_domain::tool::{
    entities::{ToolCall, ToolDefinition, ToolParameter},
    provider::{ProviderError, ToolProvider},
};
use tracing::debug;

use crate::config::FileToolConfig;
use crate::tools::transport::{api_key_from_env, send_json};

/// Provider for a single HTTP JSON tool
#[derive(Debug, Clone)]
pub struct HttpToolProvider {
    id: String,
    definition: ToolDefinition,
    endpoint: String,
    api_key: Option<String>,
    api_key_env: Option<String>,
    priority: i32,
    client: reqwest::Client,
}

impl HttpToolProvider {
    /// Build the provider of tool `name`; `None` when no endpoint is configured.
    pub fn from_config(client: reqwest::Client, name: &str, config: &FileToolConfig) -> Option<Self> {
        let endpoint = config.endpoint.clone()?;

        let mut definition = ToolDefinition::new(name, config.description.as_str());
        // BTreeMap iteration keeps parameter order deterministic
        for (param_name, param) in &config.parameters {
            definition = definition.with_parameter(
                ToolParameter::new(param_name.as_str(), param.description.as_str(), param.required)
                    .with_type(param.param_type.as_str()),
            );
        }

        Some(Self {
            id: format!("http:{}", name),
            definition,
            endpoint,
            api_key: api_key_from_env(config.api_key_env.as_deref()),
            api_key_env: config.api_key_env.clone(),
            priority: config.priority,
            client,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ToolProvider for HttpToolProvider {
    fn id(&self) -> &str {
        &self.id
    }

    fn priority(&self) -> i32 {
        self.priority
    }

    async fn is_available(&self) -> bool {
        if self.api_key_env.is_some() && self.api_key.is_none() {
            debug!(provider = %self.id, "API key not set, tool disabled");
            return false;
        }
        true
    }

    fn tools(&self) -> Vec<ToolDefinition> {
        vec![self.definition.clone()]
    }

    async fn execute(&self, call: &ToolCall) -> Result<serde_json::Value, ProviderError> {
        if call.tool_name != self.definition.name {
            return Err(ProviderError::ToolNotFound(call.tool_name.clone()));
        }

        let mut request = self.client.post(&self.endpoint).json(&call.args_value());
        if let Some(key) = &self.api_key {
            request = request.bearer_auth(key);
        }
        send_json(request).await
    }
}
