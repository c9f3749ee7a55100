//! Manual tool-calling loop.
//!
//! A bounded conversation loop: the model is offered the registry's tool
//! schemas on every round trip; requested invocations are dispatched locally
//! and their results appended to the transcript until the model answers in
//! plain text or the iteration budget runs out. The loop degrades
//! gracefully: budget exhaustion yields a sentinel string, never an error,
//! and per-call tool failures are injected into the transcript as inline
//! error strings. Only transport failures from the provider propagate.

use std::sync::Arc;

use tracing::Instrument;

use crate::config::ChefBotConfig;
use crate::error::Result;
use crate::provider::types::{ChatMessage, ChatRequest};
use crate::provider::LlmProvider;
use crate::tools::ToolRegistry;

/// Returned when the iteration budget is spent without a final answer.
/// Callers must check for it; it is an `Ok` value, not an error.
pub const ITERATION_LIMIT_SENTINEL: &str = "Error: max iterations reached";

const SYSTEM_INSTRUCTION: &str =
    "You are a helpful assistant. Use the provided tools when needed to answer questions accurately.";

pub struct ToolCallingAgent {
    provider: Arc<dyn LlmProvider>,
    registry: ToolRegistry,
    max_iterations: u32,
    temperature: Option<f64>,
    max_tokens: Option<u32>,
}

impl ToolCallingAgent {
    pub fn new(provider: Arc<dyn LlmProvider>, registry: ToolRegistry) -> Self {
        Self {
            provider,
            registry,
            max_iterations: 5,
            temperature: None,
            max_tokens: None,
        }
    }

    pub fn with_config(
        provider: Arc<dyn LlmProvider>,
        registry: ToolRegistry,
        config: &ChefBotConfig,
    ) -> Self {
        Self {
            provider,
            registry,
            max_iterations: config.agent.max_iterations,
            temperature: config.llm.temperature,
            max_tokens: config.llm.max_tokens,
        }
    }

    /// Run the loop for one user message and return the final answer, or
    /// [`ITERATION_LIMIT_SENTINEL`] if the budget is exhausted.
    pub async fn run(&self, user_message: &str) -> Result<String> {
        let span = tracing::info_span!(
            "tool_calling_agent",
            tools = self.registry.len(),
            max_iterations = self.max_iterations,
        );
        self.run_inner(user_message).instrument(span).await
    }

    async fn run_inner(&self, user_message: &str) -> Result<String> {
        let definitions = self.registry.definitions();
        let mut messages = vec![
            ChatMessage::system(SYSTEM_INSTRUCTION),
            ChatMessage::user(user_message),
        ];

        for iteration in 1..=self.max_iterations {
            tracing::debug!(iteration, "model round trip");

            let request = ChatRequest {
                messages: messages.clone(),
                tools: definitions.clone(),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
                json_response: false,
                // Tools are requested and executed one turn at a time.
                parallel_tool_calls: false,
            };
            let response = self.provider.chat(&request).await?;

            if !response.has_tool_calls() {
                tracing::debug!(iteration, "final answer ready");
                return Ok(response.content);
            }

            messages.push(ChatMessage::assistant_tool_calls(
                response.content.clone(),
                response.tool_calls.clone(),
            ));

            for call in &response.tool_calls {
                tracing::debug!(tool = %call.name, args = %call.arguments, "tool call");
                let result = self.registry.dispatch(call);
                tracing::debug!(tool = %call.name, result = %result, "tool result");
                messages.push(ChatMessage::tool_result(&call.id, result));
            }
        }

        tracing::warn!(max_iterations = self.max_iterations, "iteration budget exhausted");
        Ok(ITERATION_LIMIT_SENTINEL.to_string())
    }
}
