//! Crate-wide error type.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ChefBotError>;

#[derive(Debug, Error)]
pub enum ChefBotError {
    /// Transport or upstream failure from the model provider.
    #[error("provider error: {0}")]
    Provider(String),

    /// The model responded, but not in the shape the caller required.
    #[error("malformed model response: {0}")]
    MalformedResponse(String),

    /// Plan generation exhausted its retry budget.
    #[error("plan generation failed after {attempts} attempts: {last_error}")]
    PlanGeneration { attempts: u32, last_error: String },

    /// A tool rejected its argument mapping.
    #[error("invalid arguments for tool '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("configuration error: {0}")]
    Config(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
