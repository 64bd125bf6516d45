//! LLM provider implementations

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::sync::Mutex;

use crate::types::*;

/// Trait for LLM providers
#[async_trait]
pub trait ChatProvider: Send + Sync {
    /// Get the provider name
    fn name(&self) -> &'static str;

    /// Get the provider kind
    fn kind(&self) -> ProviderKind;

    /// Check if the provider is available
    async fn is_available(&self) -> bool;

    /// Complete a single-turn request
    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse>;
}

// ============================================================================
// OpenAI-Compatible Provider
// ============================================================================

/// Configuration for OpenAI-compatible provider
#[derive(Debug, Clone)]
pub struct OpenAICompatConfig {
    pub base_url: String,
    pub api_key: Option<String>,
    pub model: String,
}

impl Default for OpenAICompatConfig {
    fn default() -> Self {
        Self {
            base_url: std::env::var("AFSLAG_LLM_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8000/v1".to_string()),
            api_key: std::env::var("AFSLAG_LLM_API_KEY").ok(),
            model: std::env::var("AFSLAG_LLM_MODEL").unwrap_or_else(|_| "default".to_string()),
        }
    }
}

/// OpenAI-compatible API provider (vLLM, llama.cpp, etc.)
pub struct OpenAICompatProvider {
    config: OpenAICompatConfig,
    client: reqwest::Client,
}

impl OpenAICompatProvider {
    pub fn new(config: OpenAICompatConfig) -> Self {
        Self {
            config,
            client: reqwest::Client::new(),
        }
    }

    pub fn from_env() -> Self {
        Self::new(OpenAICompatConfig::default())
    }
}

#[derive(Serialize)]
struct ChatWireRequest {
    model: String,
    messages: Vec<ChatWireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    stream: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<serde_json::Value>,
}

#[derive(Serialize, Deserialize)]
struct ChatWireMessage {
    role: String,
    content: String,
}

#[derive(Deserialize)]
struct ChatWireResponse {
    choices: Vec<ChatWireChoice>,
}

#[derive(Deserialize)]
struct ChatWireChoice {
    message: ChatWireMessage,
}

#[async_trait]
impl ChatProvider for OpenAICompatProvider {
    fn name(&self) -> &'static str {
        "OpenAI-Compatible"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::OpenAICompat
    }

    async fn is_available(&self) -> bool {
        let url = format!("{}/models", self.config.base_url);
        let mut req = self.client.get(&url);
        if let Some(ref key) = self.config.api_key {
            req = req.bearer_auth(key);
        }
        req.send().await.is_ok()
    }

    async fn complete(&self, request: ChatRequest) -> Result<ChatResponse> {
        let mut messages: Vec<ChatWireMessage> = vec![];

        if let Some(ref system) = request.system {
            messages.push(ChatWireMessage {
                role: "system".to_string(),
                content: system.clone(),
            });
        }
        messages.push(ChatWireMessage {
            role: "user".to_string(),
            content: request.user.clone(),
        });

        let wire_request = ChatWireRequest {
            model: self.config.model.clone(),
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            stream: false,
            response_format: if request.json_mode {
                Some(serde_json::json!({"type": "json_object"}))
            } else {
                None
            },
        };

        let url = format!("{}/chat/completions", self.config.base_url);
        let mut req = self.client.post(&url).json(&wire_request);
        if let Some(ref key) = self.config.api_key {
            req = req.bearer_auth(key);
        }

        let response = req.send().await.map_err(|e| LlmError::NetworkError {
            message: e.to_string(),
        })?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(LlmError::RequestFailed {
                message: format!("HTTP {}: {}", status, body),
            });
        }

        let wire_response: ChatWireResponse =
            response.json().await.map_err(|e| LlmError::InvalidResponse {
                message: e.to_string(),
            })?;

        let content = wire_response
            .choices
            .first()
            .map(|c| c.message.content.clone())
            .unwrap_or_default();

        Ok(ChatResponse {
            content,
            model: Some(self.config.model.clone()),
        })
    }
}

// ============================================================================
// Scripted Provider (Tests)
// ============================================================================

/// Replays canned replies in order, then errors
///
/// Lets tests drive an LLM-mode brain through exact response sequences,
/// including malformed ones, with no network involved.
pub struct ScriptedProvider {
    replies: Mutex<VecDeque<String>>,
}

impl ScriptedProvider {
    pub fn new<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            replies: Mutex::new(replies.into_iter().map(Into::into).collect()),
        }
    }

    /// Number of replies not yet consumed
    pub fn remaining(&self) -> usize {
        self.replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }
}

#[async_trait]
impl ChatProvider for ScriptedProvider {
    fn name(&self) -> &'static str {
        "Scripted"
    }

    fn kind(&self) -> ProviderKind {
        ProviderKind::Scripted
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn complete(&self, _request: ChatRequest) -> Result<ChatResponse> {
        let mut replies = self
            .replies
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner());
        match replies.pop_front() {
            Some(content) => Ok(ChatResponse {
                content,
                model: Some("scripted".to_string()),
            }),
            None => Err(LlmError::ScriptExhausted),
        }
    }
}
