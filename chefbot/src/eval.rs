//! Output quality evaluators.
//!
//! Two independent scorers: a deterministic rule evaluator operating on the
//! output text alone, and a model-backed judge that asks for structured
//! scores. The rule evaluator cannot fail; the judge propagates any
//! transport or parse error to its caller and, unlike the plan phase, is
//! never retried.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::Instrument;

use crate::error::{ChefBotError, Result};
use crate::provider::types::{ChatMessage, ChatRequest};
use crate::provider::LlmProvider;
use crate::util::json_slice;

/// What a dataset item expects of the generated output.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ExpectedOutput {
    /// Terms that must not appear in the output (case-insensitive).
    #[serde(default)]
    pub must_avoid: Vec<String>,
    /// Terms that should appear in the output (case-insensitive).
    #[serde(default)]
    pub must_include: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_calories_per_meal: Option<u32>,
}

/// Deterministic scores derived from the output text alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuleScores {
    /// 1.0 when no forbidden term appears, else 0.0.
    pub no_forbidden: f64,
    /// Fraction of required terms present; 1.0 when none are required.
    pub included_ratio: f64,
}

/// Score an output against its expectations without any model call.
pub fn rule_evaluator(output: &str, expected: &ExpectedOutput) -> RuleScores {
    let haystack = output.to_lowercase();

    let forbidden_hit = expected
        .must_avoid
        .iter()
        .any(|term| haystack.contains(&term.to_lowercase()));

    let included_ratio = if expected.must_include.is_empty() {
        1.0
    } else {
        let hits = expected
            .must_include
            .iter()
            .filter(|term| haystack.contains(&term.to_lowercase()))
            .count();
        hits as f64 / expected.must_include.len() as f64
    };

    RuleScores {
        no_forbidden: if forbidden_hit { 0.0 } else { 1.0 },
        included_ratio,
    }
}

/// Scores returned by the model-backed judge, each in 0.0..=1.0.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeScores {
    pub relevance: f64,
    pub creativity: f64,
    pub practicality: f64,
}

/// Model-backed evaluator. One structured call per judgment, no retry.
pub struct LlmJudge {
    provider: Arc<dyn LlmProvider>,
}

impl LlmJudge {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self { provider }
    }

    pub async fn judge(&self, question: &str, output: &str) -> Result<JudgeScores> {
        let span = tracing::info_span!("llm_judge", output_len = output.len());
        self.judge_inner(question, output).instrument(span).await
    }

    async fn judge_inner(&self, question: &str, output: &str) -> Result<JudgeScores> {
        let prompt = format!(
            "Question asked: {question}\n\
             Menu produced: {output}\n\
             Rate this menu (0.0 to 1.0) on relevance, creativity and practicality.\n\
             Answer ONLY in JSON: \
             {{\"relevance\": 0.0, \"creativity\": 0.0, \"practicality\": 0.0}}"
        );

        let request = ChatRequest {
            messages: vec![ChatMessage::user(prompt)],
            json_response: true,
            ..ChatRequest::default()
        };
        let response = self.provider.chat(&request).await?;

        serde_json::from_str(json_slice(&response.content)).map_err(|e| {
            ChefBotError::MalformedResponse(format!("judge scores are not valid JSON: {}", e))
        })
    }
}
