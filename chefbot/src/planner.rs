//! Menu planner: plan, execute, synthesize.
//!
//! The plan phase asks the model to decompose the task into three ordered
//! steps as structured JSON and validates the shape, retrying once on any
//! failure (transport or validation) before giving up. The execute phase
//! runs the steps strictly in order, feeding every prior step's output
//! forward as context. A final synthesis call assembles the step outputs
//! into one coherent menu. Execute and synthesis errors are fatal and abort
//! the whole operation; no partial menu is ever returned.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::Instrument;

use crate::config::ChefBotConfig;
use crate::error::{ChefBotError, Result};
use crate::provider::types::{ChatMessage, ChatRequest};
use crate::provider::LlmProvider;
use crate::retry::attempt;
use crate::util::json_slice;

/// Key the structured plan response must carry.
const PLAN_STEPS_KEY: &str = "steps";

/// An ordered sequence of short textual step descriptions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Plan {
    pub steps: Vec<String>,
}

/// Counters for plan-phase retry behavior.
#[derive(Debug, Default)]
pub struct RetryMetrics {
    total_attempts: AtomicU64,
    first_attempt_successes: AtomicU64,
    retry_successes: AtomicU64,
    failures: AtomicU64,
}

impl RetryMetrics {
    pub fn record_success(&self, attempt_no: u32) {
        self.total_attempts.fetch_add(1, Ordering::Relaxed);
        if attempt_no == 1 {
            self.first_attempt_successes.fetch_add(1, Ordering::Relaxed);
        } else {
            self.retry_successes.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_failure(&self, _attempt_no: u32) {
        self.total_attempts.fetch_add(1, Ordering::Relaxed);
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn summary(&self) -> RetryMetricsSummary {
        RetryMetricsSummary {
            total_attempts: self.total_attempts.load(Ordering::Relaxed),
            first_attempt_successes: self.first_attempt_successes.load(Ordering::Relaxed),
            retry_successes: self.retry_successes.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RetryMetricsSummary {
    pub total_attempts: u64,
    pub first_attempt_successes: u64,
    pub retry_successes: u64,
    pub failures: u64,
}

impl RetryMetricsSummary {
    pub fn success_rate(&self) -> f64 {
        if self.total_attempts == 0 {
            return 0.0;
        }
        (self.first_attempt_successes + self.retry_successes) as f64 / self.total_attempts as f64
    }
}

pub struct MenuPlanner {
    provider: Arc<dyn LlmProvider>,
    max_attempts: u32,
    metrics: RetryMetrics,
}

impl MenuPlanner {
    pub fn new(provider: Arc<dyn LlmProvider>) -> Self {
        Self {
            provider,
            max_attempts: 2,
            metrics: RetryMetrics::default(),
        }
    }

    pub fn with_config(provider: Arc<dyn LlmProvider>, config: &ChefBotConfig) -> Self {
        Self {
            provider,
            max_attempts: config.retry.max_attempts,
            metrics: RetryMetrics::default(),
        }
    }

    pub fn retry_metrics(&self) -> RetryMetricsSummary {
        self.metrics.summary()
    }

    /// Plan phase: decompose the constraints into three ordered steps.
    ///
    /// Any failure (transport or shape validation) is retried once with the
    /// identical prompt; a second failure is fatal. A partial or empty plan
    /// is never returned.
    pub async fn get_plan(&self, constraints: &str) -> Result<Plan> {
        let prompt = format!(
            "Analyse these constraints: {constraints}.\n\
             Break the creation of a weekly menu into 3 distinct steps.\n\
             Answer ONLY in JSON with the following shape:\n\
             {{\"{PLAN_STEPS_KEY}\": [\"step1\", \"step2\", \"step3\"]}}"
        );

        let provider = &self.provider;
        let metrics = &self.metrics;

        attempt(self.max_attempts, |attempt_no| {
            let request = ChatRequest {
                messages: vec![ChatMessage::user(prompt.clone())],
                json_response: true,
                ..ChatRequest::default()
            };
            async move {
                let response = match provider.chat(&request).await {
                    Ok(r) => r,
                    Err(e) => {
                        metrics.record_failure(attempt_no);
                        return Err(e);
                    }
                };
                match parse_plan(&response.content) {
                    Ok(plan) => {
                        metrics.record_success(attempt_no);
                        Ok(plan)
                    }
                    Err(e) => {
                        metrics.record_failure(attempt_no);
                        tracing::error!(
                            event = "json_parsing_error",
                            attempt = attempt_no,
                            raw = %response.content,
                            error = %e,
                            "plan response failed validation"
                        );
                        Err(e)
                    }
                }
            }
        })
        .await
        .map_err(|e| ChefBotError::PlanGeneration {
            attempts: self.max_attempts,
            last_error: e.to_string(),
        })
    }

    /// Execute one step against the accumulated context. Not retried.
    pub async fn execute_step(&self, step: &str, context: &str) -> Result<String> {
        let request = ChatRequest::from_messages(vec![
            ChatMessage::system(format!("Current context: {context}")),
            ChatMessage::user(format!("Next step: {step}")),
        ]);
        Ok(self.provider.chat(&request).await?.content)
    }

    /// Full pipeline: plan, execute each step in order, synthesize.
    pub async fn plan_weekly_menu(&self, constraints: &str) -> Result<String> {
        let span = tracing::info_span!("plan_weekly_menu", constraints = %constraints);
        self.plan_weekly_menu_inner(constraints).instrument(span).await
    }

    async fn plan_weekly_menu_inner(&self, constraints: &str) -> Result<String> {
        let plan = self.get_plan(constraints).await?;

        let mut results: Vec<String> = Vec::with_capacity(plan.steps.len());
        let mut context = format!("Accumulated constraints: {constraints}");

        for step in &plan.steps {
            tracing::debug!(step = %step, "executing plan step");
            let output = self.execute_step(step, &context).await?;
            context.push('\n');
            context.push_str(&output);
            results.push(output);
        }

        let request = ChatRequest::from_messages(vec![
            ChatMessage::system("You are a menu designer."),
            ChatMessage::user(format!(
                "Assemble everything into one coherent menu: {}",
                results.join(" ")
            )),
        ]);
        Ok(self.provider.chat(&request).await?.content)
    }
}

/// Validate a structured plan response: it must parse as a JSON object whose
/// `steps` key holds an array of strings.
fn parse_plan(content: &str) -> Result<Plan> {
    let parsed: Value = serde_json::from_str(json_slice(content))
        .map_err(|e| ChefBotError::MalformedResponse(format!("plan is not valid JSON: {}", e)))?;

    if !parsed.is_object() {
        return Err(ChefBotError::MalformedResponse(
            "plan response is not a JSON object".to_string(),
        ));
    }

    let steps = parsed
        .get(PLAN_STEPS_KEY)
        .and_then(Value::as_array)
        .ok_or_else(|| {
            ChefBotError::MalformedResponse(format!(
                "plan response is missing the '{}' array",
                PLAN_STEPS_KEY
            ))
        })?;

    let steps: Vec<String> = steps
        .iter()
        .map(|s| {
            s.as_str().map(str::to_string).ok_or_else(|| {
                ChefBotError::MalformedResponse("plan step is not a string".to_string())
            })
        })
        .collect::<Result<_>>()?;

    Ok(Plan { steps })
}
