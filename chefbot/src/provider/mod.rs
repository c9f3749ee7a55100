//! LLM provider abstraction.
//!
//! Providers hide the concrete chat-completion backend behind a single
//! async interface. [`OpenAiLlmProvider`] talks to any OpenAI-compatible
//! endpoint (OpenAI, Groq, OpenRouter); [`StubLlmProvider`] answers
//! deterministically for offline demos; [`ScriptedProvider`] replays queued
//! responses for tests.

pub mod openai;
pub mod scripted;
pub mod stub;
pub mod types;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::{LlmConfig, LlmProviderType};
use crate::error::{ChefBotError, Result};

pub use openai::OpenAiLlmProvider;
pub use scripted::ScriptedProvider;
pub use stub::StubLlmProvider;
pub use types::{ChatMessage, ChatRequest, ChatResponse, Role, ToolCall, ToolDefinition};

/// Information about an LLM provider
#[derive(Debug, Clone)]
pub struct ProviderInfo {
    pub name: String,
    pub model: String,
}

/// Abstract interface for chat-completion backends.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send one chat request and return the model's answer, which is either
    /// textual content or a list of requested tool invocations.
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse>;

    fn info(&self) -> ProviderInfo;
}

/// Build a provider from configuration.
///
/// The stub provider is gated out of normal use: set
/// `CHEFBOT_ALLOW_STUB_PROVIDER=1` to enable it explicitly.
pub fn create_provider(config: &LlmConfig) -> Result<Arc<dyn LlmProvider>> {
    match config.provider_type {
        LlmProviderType::OpenAi => Ok(Arc::new(OpenAiLlmProvider::new(config.clone())?)),
        LlmProviderType::Stub => {
            let allowed = std::env::var("CHEFBOT_ALLOW_STUB_PROVIDER")
                .map(|v| v == "1")
                .unwrap_or(false)
                || cfg!(test);
            if !allowed {
                return Err(ChefBotError::Config(
                    "stub provider is for testing only; set CHEFBOT_ALLOW_STUB_PROVIDER=1 \
                     to enable it, or configure an openai-compatible provider"
                        .to_string(),
                ));
            }
            tracing::warn!("using stub LLM provider (deterministic canned responses)");
            Ok(Arc::new(StubLlmProvider::new(config.clone())))
        }
    }
}
