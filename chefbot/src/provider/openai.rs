//! OpenAI-compatible provider (works with OpenAI, Groq and OpenRouter).

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};

use crate::config::LlmConfig;
use crate::error::{ChefBotError, Result};
use crate::provider::types::{ChatRequest, ChatResponse, ToolCall};
use crate::provider::{LlmProvider, ProviderInfo};
use crate::util::{sha256_hex, truncate_for_log};

pub struct OpenAiLlmProvider {
    config: LlmConfig,
    client: reqwest::Client,
}

impl OpenAiLlmProvider {
    pub fn new(config: LlmConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(
                config.timeout_seconds.unwrap_or(30),
            ))
            .build()
            .map_err(|e| ChefBotError::Provider(format!("failed to create HTTP client: {}", e)))?;

        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        let base_url = self
            .config
            .base_url
            .as_deref()
            .unwrap_or("https://api.openai.com/v1");
        format!("{}/chat/completions", base_url)
    }

    fn build_request_body(&self, request: &ChatRequest) -> WireRequest {
        let messages = request.messages.iter().map(WireMessage::from).collect();

        let tools: Vec<Value> = request
            .tools
            .iter()
            .map(|t| t.to_openai_tool_json())
            .collect();
        let has_tools = !tools.is_empty();

        WireRequest {
            model: self.config.model.clone(),
            messages,
            max_tokens: request.max_tokens.or(self.config.max_tokens),
            temperature: request.temperature.or(self.config.temperature),
            tools,
            tool_choice: has_tools.then(|| "auto".to_string()),
            parallel_tool_calls: has_tools.then_some(request.parallel_tool_calls),
            response_format: request
                .json_response
                .then(|| json!({ "type": "json_object" })),
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiLlmProvider {
    async fn chat(&self, request: &ChatRequest) -> Result<ChatResponse> {
        let api_key = self.config.api_key.as_ref().ok_or_else(|| {
            ChefBotError::Config("API key required for OpenAI-compatible provider".to_string())
        })?;

        let body = self.build_request_body(request);
        let payload = serde_json::to_vec(&body)
            .map_err(|e| ChefBotError::Provider(format!("failed to serialize request: {}", e)))?;
        let prompt_hash = sha256_hex(&payload);

        let start = Instant::now();
        let response = self
            .client
            .post(self.endpoint())
            .header("Authorization", format!("Bearer {}", api_key))
            .header("Content-Type", "application/json")
            .body(payload)
            .send()
            .await
            .map_err(|e| ChefBotError::Provider(format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        let raw_body = response
            .text()
            .await
            .map_err(|e| ChefBotError::Provider(format!("failed to read response body: {}", e)))?;

        if !status.is_success() {
            return Err(ChefBotError::Provider(format!(
                "chat completion request failed (HTTP {}): {}",
                status.as_u16(),
                truncate_for_log(&raw_body, 1000)
            )));
        }

        let parsed: WireResponse = serde_json::from_str(&raw_body).map_err(|e| {
            ChefBotError::MalformedResponse(format!(
                "response is not valid completion JSON: {} (body: {})",
                e,
                truncate_for_log(&raw_body, 1000)
            ))
        })?;

        let choice = parsed
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ChefBotError::MalformedResponse("response has no choices".to_string()))?;

        match choice.finish_reason.as_deref() {
            Some("length") => {
                tracing::warn!(
                    max_tokens = ?self.config.max_tokens,
                    "completion truncated by token limit"
                );
            }
            Some("content_filter") => {
                tracing::warn!("completion stopped by content filter; output may be incomplete");
            }
            _ => {}
        }

        let usage = parsed.usage.unwrap_or_default();
        tracing::debug!(
            latency_ms = start.elapsed().as_millis() as u64,
            prompt_hash = %prompt_hash,
            response_hash = %sha256_hex(raw_body.as_bytes()),
            prompt_tokens = ?usage.prompt_tokens,
            completion_tokens = ?usage.completion_tokens,
            "chat completion"
        );

        Ok(ChatResponse {
            content: choice.message.content.unwrap_or_default(),
            tool_calls: convert_tool_calls(choice.message.tool_calls),
        })
    }

    fn info(&self) -> ProviderInfo {
        ProviderInfo {
            name: "openai-compatible".to_string(),
            model: self.config.model.clone(),
        }
    }
}

/// Convert wire-format tool calls into [`ToolCall`]s.
///
/// A missing call id gets a synthetic `tool_call_N` fallback; argument
/// payloads that fail to parse as JSON are preserved under `raw_arguments`
/// instead of aborting extraction.
fn convert_tool_calls(calls: Vec<WireToolCall>) -> Vec<ToolCall> {
    calls
        .into_iter()
        .enumerate()
        .map(|(idx, call)| {
            let id = call
                .id
                .unwrap_or_else(|| format!("tool_call_{}", idx + 1));
            let raw_args = call.function.arguments.unwrap_or_else(|| "{}".to_string());
            let arguments = serde_json::from_str::<Value>(&raw_args)
                .unwrap_or_else(|_| json!({ "raw_arguments": raw_args }));

            ToolCall {
                id,
                name: call.function.name,
                arguments,
            }
        })
        .collect()
}

// OpenAI wire types

#[derive(Serialize)]
struct WireRequest {
    model: String,
    messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    temperature: Option<f64>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    parallel_tool_calls: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<Value>,
}

#[derive(Serialize)]
struct WireMessage {
    role: crate::provider::types::Role,
    content: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_calls: Option<Vec<Value>>,
}

impl From<&crate::provider::types::ChatMessage> for WireMessage {
    fn from(msg: &crate::provider::types::ChatMessage) -> Self {
        let tool_calls = if msg.tool_calls.is_empty() {
            None
        } else {
            Some(
                msg.tool_calls
                    .iter()
                    .map(|call| {
                        json!({
                            "id": call.id,
                            "type": "function",
                            "function": {
                                "name": call.name,
                                "arguments": call.arguments.to_string(),
                            }
                        })
                    })
                    .collect(),
            )
        };

        Self {
            role: msg.role,
            content: msg.content.clone(),
            tool_call_id: msg.tool_call_id.clone(),
            tool_calls,
        }
    }
}

#[derive(Deserialize)]
struct WireResponse {
    choices: Vec<WireChoice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Deserialize)]
struct WireChoice {
    message: WireResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Deserialize)]
struct WireResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
}

#[derive(Deserialize)]
struct WireToolCall {
    #[serde(default)]
    id: Option<String>,
    function: WireFunction,
}

#[derive(Deserialize)]
struct WireFunction {
    name: String,
    #[serde(default)]
    arguments: Option<String>,
}

#[derive(Default, Deserialize)]
struct WireUsage {
    #[serde(default)]
    prompt_tokens: Option<u32>,
    #[serde(default)]
    completion_tokens: Option<u32>,
}
