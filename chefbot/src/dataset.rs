//! Evaluation dataset and experiment runner.
//!
//! A dataset is a list of input questions paired with expectations. The
//! runner applies a task to every item, scores each output with every
//! registered evaluator, and collects a report. A task or evaluator failure
//! on one item is recorded in that item's result and never aborts the run.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::Instrument;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use uuid::Uuid;

use crate::error::Result;
use crate::eval::{rule_evaluator, ExpectedOutput, LlmJudge};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatasetItem {
    pub input: String,
    pub expected: ExpectedOutput,
}

fn item(input: &str, avoid: &[&str], include: &[&str], max_calories: u32) -> DatasetItem {
    DatasetItem {
        input: input.to_string(),
        expected: ExpectedOutput {
            must_avoid: avoid.iter().map(|s| s.to_string()).collect(),
            must_include: include.iter().map(|s| s.to_string()).collect(),
            max_calories_per_meal: Some(max_calories),
        },
    }
}

/// The built-in menu evaluation set.
pub fn menu_eval_dataset() -> Vec<DatasetItem> {
    vec![
        item(
            "Plat végétarien",
            &["viande", "poisson", "fruits de mer"],
            &["légumes", "protéines végétales"],
            700,
        ),
        item(
            "plat pour allergique aux fruits de mer",
            &["crevettes", "crabe", "homard", "moules", "huîtres", "calamar"],
            &["protéines non marines", "légumes"],
            600,
        ),
        item(
            "plat pour intolérant au gluten",
            &["blé", "orge", "seigle", "épeautre", "pâtes classiques", "pain classique"],
            &["féculents sans gluten", "légumes"],
            650,
        ),
    ]
}

/// Scores one generated output against the item's expectations.
#[async_trait]
pub trait Evaluator: Send + Sync {
    fn name(&self) -> &str;

    async fn evaluate(
        &self,
        input: &str,
        output: &str,
        expected: &ExpectedOutput,
    ) -> Result<Value>;
}

/// Deterministic evaluator backed by [`rule_evaluator`]. Cannot fail.
pub struct RuleEvaluator;

#[async_trait]
impl Evaluator for RuleEvaluator {
    fn name(&self) -> &str {
        "rules"
    }

    async fn evaluate(
        &self,
        _input: &str,
        output: &str,
        expected: &ExpectedOutput,
    ) -> Result<Value> {
        let scores = rule_evaluator(output, expected);
        Ok(serde_json::to_value(scores)?)
    }
}

#[async_trait]
impl Evaluator for LlmJudge {
    fn name(&self) -> &str {
        "llm_judge"
    }

    async fn evaluate(
        &self,
        input: &str,
        output: &str,
        _expected: &ExpectedOutput,
    ) -> Result<Value> {
        let scores = self.judge(input, output).await?;
        Ok(serde_json::to_value(scores)?)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemResult {
    pub input: String,
    /// Present when the task succeeded.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
    /// Task failure, or an evaluator failure noted per evaluator in `scores`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Evaluator name to its score object (or `{"error": ...}` on failure).
    pub scores: serde_json::Map<String, Value>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExperimentReport {
    pub name: String,
    pub run_id: String,
    pub started_at: DateTime<Utc>,
    pub items: Vec<ItemResult>,
}

impl ExperimentReport {
    /// Items whose task completed without error.
    pub fn completed(&self) -> usize {
        self.items.iter().filter(|i| i.output.is_some()).count()
    }
}

/// Run `task` over every item and score the outputs.
///
/// Items run sequentially. A failed task skips evaluation for that item; a
/// failed evaluator is recorded under its name and the other evaluators
/// still run.
pub async fn run_experiment<F, Fut>(
    name: &str,
    items: &[DatasetItem],
    task: F,
    evaluators: &[&dyn Evaluator],
) -> ExperimentReport
where
    F: Fn(String) -> Fut,
    Fut: std::future::Future<Output = Result<String>>,
{
    let run_id = Uuid::new_v4().to_string();
    let span = tracing::info_span!(
        "experiment",
        name = %name,
        run_id = %run_id,
        items = items.len(),
    );
    run_experiment_inner(name, run_id, items, task, evaluators)
        .instrument(span)
        .await
}

async fn run_experiment_inner<F, Fut>(
    name: &str,
    run_id: String,
    items: &[DatasetItem],
    task: F,
    evaluators: &[&dyn Evaluator],
) -> ExperimentReport
where
    F: Fn(String) -> Fut,
    Fut: std::future::Future<Output = Result<String>>,
{
    let started_at = Utc::now();

    let mut results = Vec::with_capacity(items.len());
    for item in items {
        let mut scores = serde_json::Map::new();

        let (output, error) = match task(item.input.clone()).await {
            Ok(output) => (Some(output), None),
            Err(e) => {
                tracing::warn!(input = %item.input, error = %e, "task failed on item");
                (None, Some(e.to_string()))
            }
        };

        if let Some(output) = &output {
            for evaluator in evaluators {
                match evaluator.evaluate(&item.input, output, &item.expected).await {
                    Ok(value) => {
                        scores.insert(evaluator.name().to_string(), value);
                    }
                    Err(e) => {
                        tracing::warn!(
                            evaluator = evaluator.name(),
                            error = %e,
                            "evaluator failed on item"
                        );
                        scores.insert(
                            evaluator.name().to_string(),
                            json!({ "error": e.to_string() }),
                        );
                    }
                }
            }
        }

        results.push(ItemResult {
            input: item.input.clone(),
            output,
            error,
            scores,
        });
    }

    ExperimentReport {
        name: name.to_string(),
        run_id,
        started_at,
        items: results,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChefBotError;
    use crate::provider::types::ChatResponse;
    use crate::provider::ScriptedProvider;
    use std::sync::Arc;

    #[tokio::test]
    async fn experiment_scores_every_item_with_every_evaluator() {
        let items = menu_eval_dataset();
        let report = run_experiment(
            "smoke",
            &items,
            |input| async move { Ok(format!("Menu avec légumes pour: {input}")) },
            &[&RuleEvaluator],
        )
        .await;

        assert_eq!(report.items.len(), 3);
        assert_eq!(report.completed(), 3);
        for item in &report.items {
            let rules = item.scores.get("rules").unwrap();
            assert!(rules.get("no_forbidden").is_some());
            assert!(rules.get("included_ratio").is_some());
        }
    }

    #[tokio::test]
    async fn task_failure_is_recorded_and_run_continues() {
        let items = menu_eval_dataset();
        let report = run_experiment(
            "partial",
            &items,
            |input| async move {
                if input.contains("végétarien") {
                    Err(ChefBotError::Provider("boom".to_string()))
                } else {
                    Ok("Menu proteines calories".to_string())
                }
            },
            &[&RuleEvaluator],
        )
        .await;

        assert_eq!(report.items.len(), 3);
        assert_eq!(report.completed(), 2);
        let failed = report
            .items
            .iter()
            .find(|i| i.output.is_none())
            .unwrap();
        assert!(failed.error.as_deref().unwrap().contains("boom"));
        assert!(failed.scores.is_empty());
    }

    #[tokio::test]
    async fn evaluator_failure_does_not_block_other_evaluators() {
        let provider = Arc::new(ScriptedProvider::new());
        // One malformed judge response per dataset item.
        for _ in 0..3 {
            provider.queue_response(ChatResponse::text("no json here"));
        }
        let judge = LlmJudge::new(provider);

        let items = menu_eval_dataset();
        let report = run_experiment(
            "mixed",
            &items,
            |_input| async move { Ok("Menu proteines calories".to_string()) },
            &[&RuleEvaluator, &judge],
        )
        .await;

        for item in &report.items {
            assert!(item.scores.get("rules").unwrap().get("no_forbidden").is_some());
            assert!(item.scores.get("llm_judge").unwrap().get("error").is_some());
        }
    }
}
