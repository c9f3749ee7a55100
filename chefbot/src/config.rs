//! Configuration for the ChefBot runtime.
//!
//! Configuration is layered: compiled-in defaults, then an optional TOML
//! file, then `CHEFBOT_*` environment variable overrides. The API key is
//! never written to a file; it comes from the environment.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::{ChefBotError, Result};

/// Supported LLM provider types
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LlmProviderType {
    /// Deterministic responses for testing and offline demos
    Stub,
    /// Any OpenAI-compatible chat-completions endpoint (OpenAI, Groq, OpenRouter)
    OpenAi,
}

/// LLM provider configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmConfig {
    /// Provider type (openai, stub)
    pub provider_type: LlmProviderType,
    /// Model name/identifier
    pub model: String,
    /// API key (usually loaded from env)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,
    /// Base URL for API (optional, for custom endpoints such as Groq)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Maximum tokens per completion
    #[serde(default)]
    pub max_tokens: Option<u32>,
    /// Sampling temperature (0.0 = deterministic)
    #[serde(default)]
    pub temperature: Option<f64>,
    /// HTTP timeout in seconds
    #[serde(default)]
    pub timeout_seconds: Option<u64>,
}

impl Default for LlmConfig {
    fn default() -> Self {
        Self {
            provider_type: LlmProviderType::OpenAi,
            model: "llama-3.3-70b-versatile".to_string(),
            api_key: None,
            base_url: None,
            max_tokens: None,
            temperature: None,
            timeout_seconds: Some(30),
        }
    }
}

/// Tool-calling loop configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    /// Iteration budget for the tool-calling loop
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u32,
}

fn default_max_iterations() -> u32 {
    5
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            max_iterations: default_max_iterations(),
        }
    }
}

/// Retry policy for structured plan generation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryConfig {
    /// Total attempts for the plan phase (first try included)
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,
}

fn default_max_attempts() -> u32 {
    2
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
        }
    }
}

/// Top-level runtime configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChefBotConfig {
    #[serde(default)]
    pub llm: LlmConfig,
    #[serde(default)]
    pub agent: AgentConfig,
    #[serde(default)]
    pub retry: RetryConfig,
}

impl ChefBotConfig {
    pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ChefBotError::Config(format!(
                "failed to read config file {}: {}",
                path.as_ref().display(),
                e
            ))
        })?;
        toml::from_str(&content)
            .map_err(|e| ChefBotError::Config(format!("failed to parse config: {}", e)))
    }

    /// Overlay `CHEFBOT_*` environment variables on top of the current values.
    ///
    /// `GROQ_API_KEY` and `OPENAI_API_KEY` are honored as API key fallbacks
    /// so the demos run against either endpoint without extra setup.
    pub fn apply_env_overrides(&mut self) {
        if let Ok(provider) = std::env::var("CHEFBOT_PROVIDER") {
            match provider.to_lowercase().as_str() {
                "stub" => self.llm.provider_type = LlmProviderType::Stub,
                "openai" => self.llm.provider_type = LlmProviderType::OpenAi,
                other => {
                    tracing::warn!(provider = %other, "ignoring unknown CHEFBOT_PROVIDER value");
                }
            }
        }
        if let Ok(model) = std::env::var("CHEFBOT_MODEL") {
            self.llm.model = model;
        }
        if let Ok(base_url) = std::env::var("CHEFBOT_BASE_URL") {
            self.llm.base_url = Some(base_url);
        }
        if self.llm.api_key.is_none() {
            self.llm.api_key = std::env::var("CHEFBOT_API_KEY")
                .or_else(|_| std::env::var("GROQ_API_KEY"))
                .or_else(|_| std::env::var("OPENAI_API_KEY"))
                .ok();
        }
    }

    /// Convenience loader: file if given, defaults otherwise, env on top.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_toml_file(p)?,
            None => Self::default(),
        };
        config.apply_env_overrides();
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_demo_expectations() {
        let config = ChefBotConfig::default();
        assert_eq!(config.agent.max_iterations, 5);
        assert_eq!(config.retry.max_attempts, 2);
        assert_eq!(config.llm.model, "llama-3.3-70b-versatile");
        assert_eq!(config.llm.provider_type, LlmProviderType::OpenAi);
    }

    #[test]
    fn parses_partial_toml() {
        let toml_str = r#"
            [llm]
            provider_type = "stub"
            model = "stub-model"

            [agent]
            max_iterations = 3
        "#;
        let config: ChefBotConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.llm.provider_type, LlmProviderType::Stub);
        assert_eq!(config.llm.model, "stub-model");
        assert_eq!(config.agent.max_iterations, 3);
        // section omitted entirely, defaults apply
        assert_eq!(config.retry.max_attempts, 2);
    }
}
