//! OpenAI-compatible chat completions backend.
//!
//! Request layout:
//!
//! ```text
//! system     ← the agent's rendered domain prompt
//! user/assistant pairs ← prior turns (chat domain only)
//! user       ← numbered context block + the question
//! ```

use async_trait::async_trait;
use rag_application::ports::generation::{
    GenerationBackend, GenerationError, GenerationRequest, GenerationResponse,
};
use rag_domain::DomainPromptTemplate;
use serde::Serialize;
use serde_json::Value;
use std::time::Duration;
use tracing::debug;

use crate::config::FileGenerationConfig;

#[derive(Debug, Serialize, PartialEq)]
struct ChatMessage {
    role: &'static str,
    content: String,
}

impl ChatMessage {
    fn new(role: &'static str, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Generation backend speaking the `/chat/completions` protocol
pub struct OpenAiChatBackend {
    client: reqwest::Client,
    url: String,
    model: String,
    api_key: Option<String>,
    api_key_env: String,
    max_tokens: Option<u32>,
    temperature: Option<f32>,
}

impl OpenAiChatBackend {
    pub fn from_config(config: &FileGenerationConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        Self {
            client,
            url: format!("{}/chat/completions", config.endpoint.trim_end_matches('/')),
            model: config.model.clone(),
            api_key: std::env::var(&config.api_key_env)
                .ok()
                .filter(|k| !k.trim().is_empty()),
            api_key_env: config.api_key_env.clone(),
            max_tokens: config.max_tokens,
            temperature: config.temperature,
        }
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    fn request_body(&self, request: &GenerationRequest) -> Value {
        let mut body = serde_json::json!({
            "model": self.model,
            "messages": build_messages(request),
        });
        if let Some(max_tokens) = self.max_tokens {
            body["max_tokens"] = max_tokens.into();
        }
        if let Some(temperature) = self.temperature {
            body["temperature"] = temperature.into();
        }
        body
    }
}

fn build_messages(request: &GenerationRequest) -> Vec<ChatMessage> {
    let mut messages = vec![ChatMessage::new("system", request.prompt.as_str())];
    for turn in &request.history {
        messages.push(ChatMessage::new("user", turn.user.as_str()));
        messages.push(ChatMessage::new("assistant", turn.assistant.as_str()));
    }
    messages.push(ChatMessage::new(
        "user",
        DomainPromptTemplate::user_prompt(&request.question, &request.context_items, &[]),
    ));
    messages
}

fn extract_text(body: &Value) -> Result<String, GenerationError> {
    body["choices"][0]["message"]["content"]
        .as_str()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
        .ok_or(GenerationError::EmptyResponse)
}

#[async_trait]
impl GenerationBackend for OpenAiChatBackend {
    async fn generate(
        &self,
        request: &GenerationRequest,
    ) -> Result<GenerationResponse, GenerationError> {
        let mut http = self.client.post(&self.url).json(&self.request_body(request));
        if let Some(key) = &self.api_key {
            http = http.bearer_auth(key);
        }

        debug!(
            model = %self.model,
            context_items = request.context_items.len(),
            history = request.history.len(),
            "Requesting completion"
        );

        let response = http.send().await.map_err(|e| {
            if e.is_timeout() {
                GenerationError::Timeout
            } else {
                GenerationError::ConnectionError(e.to_string())
            }
        })?;

        let status = response.status();
        if !status.is_success() {
            if self.api_key.is_none() && matches!(status.as_u16(), 401 | 403) {
                return Err(GenerationError::MissingCredentials(format!(
                    "{} is not set",
                    self.api_key_env
                )));
            }
            let body = response.text().await.unwrap_or_default();
            return Err(GenerationError::RequestFailed(format!(
                "{}: {}",
                status,
                rag_domain::core::string::truncate(body.trim(), 300)
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| GenerationError::RequestFailed(format!("invalid response: {}", e)))?;

        Ok(GenerationResponse {
            text: extract_text(&body)?,
        })
    }
}
