//! LLM Router - Selects and manages LLM providers

use std::sync::Arc;

use crate::providers::*;
use crate::types::*;

/// Selects a provider from configuration and fronts all calls to it
pub struct LlmRouter {
    provider: Arc<dyn ChatProvider>,
    kind: ProviderKind,
}

impl LlmRouter {
    /// Create a router with a specific provider
    pub fn new(provider: Arc<dyn ChatProvider>) -> Self {
        let kind = provider.kind();
        Self { provider, kind }
    }

    /// Create a router from environment variables
    ///
    /// Reads `AFSLAG_LLM_PROVIDER` to select the provider:
    /// - unset, empty, `off`, `none`, `disabled`: no LLM at all (`None`)
    /// - `openai_compat`: OpenAI-compatible server from
    ///   `AFSLAG_LLM_BASE_URL` / `AFSLAG_LLM_API_KEY` / `AFSLAG_LLM_MODEL`
    /// - `scripted`: an empty script, every call errors (only useful to
    ///   exercise failure handling from the command line)
    pub fn from_env() -> Option<Self> {
        // Try to load .env file (ignore errors)
        let _ = dotenvy::dotenv();

        let provider_name = std::env::var("AFSLAG_LLM_PROVIDER").unwrap_or_default();
        match provider_name.to_lowercase().as_str() {
            "" | "off" | "none" | "disabled" => None,
            name => match ProviderKind::from_str(name) {
                Some(kind) => Some(Self::from_kind(kind)),
                None => {
                    tracing::warn!(provider = name, "Unknown LLM provider, running without LLM");
                    None
                }
            },
        }
    }

    /// Create a router for a specific provider kind
    pub fn from_kind(kind: ProviderKind) -> Self {
        let provider: Arc<dyn ChatProvider> = match kind {
            ProviderKind::OpenAICompat => Arc::new(OpenAICompatProvider::from_env()),
            ProviderKind::Scripted => Arc::new(ScriptedProvider::new(Vec::<String>::new())),
        };
        Self { provider, kind }
    }

    /// A router replaying canned responses, for tests
    pub fn scripted<I, S>(replies: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self::new(Arc::new(ScriptedProvider::new(replies)))
    }

    /// Get the current provider
    pub fn provider(&self) -> &Arc<dyn ChatProvider> {
        &self.provider
    }

    /// Get the provider kind
    pub fn kind(&self) -> ProviderKind {
        self.kind
    }

    /// Check if the provider is available
    pub async fn is_available(&self) -> bool {
        self.provider.is_available().await
    }

    /// Complete a request using the current provider
    pub async fn complete(&self, request: ChatRequest) -> Result<ChatResponse> {
        self.provider.complete(request).await
    }
}
