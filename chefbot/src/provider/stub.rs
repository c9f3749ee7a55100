//! Stub LLM provider for testing and offline demos.
//!
//! Responses are deterministic and keyed on the shape of the request, so
//! every demo path (persona ask, planning, tool-calling loop, judging) can
//! run without network access. Not realistic; gated behind
//! `CHEFBOT_ALLOW_STUB_PROVIDER` outside of tests.

use async_trait::async_trait;
use serde_json::json;

use crate::config::LlmConfig;
use crate::error::Result;
use crate::provider::types::{ChatRequest, ChatResponse, Role, ToolCall};
use crate::provider::{LlmProvider, ProviderInfo};

pub struct StubLlmProvider {
    config: LlmConfig,
}

impl StubLlmProvider {
    pub fn new(config: LlmConfig) -> Self {
        Self { config }
    }

    fn last_user_content<'a>(request: &'a ChatRequest) -> &'a str {
        request
            .messages
            .iter()
            .rev()
            .find(|m| m.role == Role::User)
            .map(|m| m.content.as_str())
            .unwrap_or_default()
    }
}

#[async_trait]
impl LlmProvider for StubLlmProvider {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        if request.json_response {
            let prompt = Self::last_user_content(request);
            // Judge prompts ask for ratings; everything else structured is a plan.
            if prompt.contains("Rate this menu") {
                return Ok(ChatResponse::text(
                    json!({ "relevance": 0.8, "creativity": 0.5, "practicality": 0.7 })
                        .to_string(),
                ));
            }
            return Ok(ChatResponse::text(
                json!({
                    "steps": [
                        "List the available seasonal ingredients",
                        "Draft one dish per day within the constraints",
                        "Balance the week and write the final menu"
                    ]
                })
                .to_string(),
            ));
        }

        if !request.tools.is_empty() {
            // First round: ask for the fridge; once a tool result is in the
            // transcript, produce the final answer.
            let has_tool_result = request.messages.iter().any(|m| m.role == Role::Tool);
            if !has_tool_result {
                if let Some(tool) = request.tools.first() {
                    return Ok(ChatResponse::tool_calls(vec![ToolCall {
                        id: "stub_call_1".to_string(),
                        name: tool.name.clone(),
                        arguments: json!({}),
                    }]));
                }
            }
            return Ok(ChatResponse::text(
                "Stub answer: with what is on hand, an omelette is the safest bet.",
            ));
        }

        Ok(ChatResponse::text(format!(
            "Stub answer for: {}",
            Self::last_user_content(request)
        )))
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "stub".to_string(),
            model: self.config.model.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::types::{ChatMessage, ToolDefinition};

    fn stub() -> StubLlmProvider {
        StubLlmProvider::new(LlmConfig::default())
    }

    #[tokio::test]
    async fn structured_request_yields_three_steps() {
        let request = ChatRequest {
            messages: vec![ChatMessage::user("Break the creation of a weekly menu")],
            json_response: true,
            ..ChatRequest::default()
        };
        let response = stub().chat(&request).await.unwrap();
        let parsed: serde_json::Value = serde_json::from_str(&response.content).unwrap();
        assert_eq!(parsed["steps"].as_array().unwrap().len(), 3);
    }

    #[tokio::test]
    async fn tool_request_then_final_answer() {
        let tools = vec![ToolDefinition {
            name: "check_fridge".to_string(),
            description: "Lists fridge contents.".to_string(),
            parameters: json!({ "type": "object", "properties": {} }),
        }];

        let first = ChatRequest {
            messages: vec![ChatMessage::user("what can I cook?")],
            tools: tools.clone(),
            ..ChatRequest::default()
        };
        let response = stub().chat(&first).await.unwrap();
        assert!(response.has_tool_calls());
        assert_eq!(response.tool_calls[0].name, "check_fridge");

        let second = ChatRequest {
            messages: vec![
                ChatMessage::user("what can I cook?"),
                ChatMessage::tool_result("stub_call_1", "[\"oeufs\"]"),
            ],
            tools,
            ..ChatRequest::default()
        };
        let response = stub().chat(&second).await.unwrap();
        assert!(!response.has_tool_calls());
        assert!(!response.content.is_empty());
    }
}
