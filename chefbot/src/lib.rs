//! ChefBot - a small LLM orchestration playground for a cooking assistant.
//!
//! The crate provides the building blocks the demos are made of:
//!
//! - **Provider abstraction**: [`provider::LlmProvider`] hides the concrete
//!   chat-completion backend (OpenAI-compatible over HTTP, or deterministic
//!   stubs for offline use and tests).
//! - **Tool registry**: [`tools::ToolRegistry`], an immutable mapping from
//!   tool name to a pure, fixture-backed local function with a declared
//!   parameter schema.
//! - **Tool-calling loop**: [`agent::ToolCallingAgent`], a bounded
//!   conversation loop that dispatches model-requested tool invocations and
//!   feeds results back until the model produces a final answer.
//! - **Menu planner**: [`planner::MenuPlanner`], a plan / execute / synthesize
//!   pipeline with bounded retry on malformed structured output.
//! - **Evaluation**: [`eval`] (rule-based scoring and an LLM judge) and
//!   [`dataset`] (fixture scenarios plus an experiment runner).
//!
//! Everything is transient and in-memory; nothing persists across calls.

pub mod agent;
pub mod assistant;
pub mod config;
pub mod dataset;
pub mod error;
pub mod eval;
pub mod planner;
pub mod provider;
pub mod retry;
pub mod tools;
pub mod util;

pub use config::{AgentConfig, ChefBotConfig, LlmConfig, LlmProviderType, RetryConfig};
pub use error::{ChefBotError, Result};
