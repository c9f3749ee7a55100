//! Single-call persona assistant.
//!
//! The simplest surface of the crate: one system persona, one user question,
//! one answer. The temperature sweep issues the same question at several
//! sampling temperatures so their answers can be compared side by side.

use std::sync::Arc;

use tracing::Instrument;

use crate::error::Result;
use crate::provider::types::{ChatMessage, ChatRequest};
use crate::provider::LlmProvider;

pub const CHEF_PERSONA: &str = "You are ChefBot, a creative culinary assistant. \
You suggest simple, tasty recipes and always explain your choices briefly.";

pub struct ChefAssistant {
    provider: Arc<dyn LlmProvider>,
}

impl ChefAssistant {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    pub async fn ask(&self, question: &str, temperature: f64) -> Result<String> {
        let span = tracing::info_span!("ask", temperature);
        self.ask_inner(question, temperature).instrument(span).await
    }

    async fn ask_inner(&self, question: &str, temperature: f64) -> Result<String> {
        let request = ChatRequest {
            messages: vec![
                ChatMessage::system(CHEF_PERSONA),
                ChatMessage::user(question),
            ],
            temperature: Some(temperature),
            ..ChatRequest::default()
        };
        Ok(self.provider.chat(&request).await?.content)
    }

    /// Ask the same question once per temperature, in order.
    pub async fn temperature_sweep(
        &self,
        question: &str,
        temperatures: &[f64],
    ) -> Result<Vec<(f64, String)>> {
        let mut answers = Vec::with_capacity(temperatures.len());
        for &temperature in temperatures {
            let answer = self.ask(question, temperature).await?;
            tracing::debug!(temperature, answer_len = answer.len(), "sweep answer");
            answers.push((temperature, answer));
        }
        Ok(answers)
    }
}
