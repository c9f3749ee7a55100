//! End-to-end exercises of the tool-calling loop and the experiment runner
//! against in-process providers.

use std::sync::Arc;

use serde_json::json;

use chefbot::agent::ToolCallingAgent;
use chefbot::dataset::{menu_eval_dataset, run_experiment, RuleEvaluator};
use chefbot::provider::{ChatResponse, Role, ScriptedProvider, ToolCall};
use chefbot::tools::ToolRegistry;

#[tokio::test]
async fn agent_answers_recipe_question_via_one_tool_round_trip() {
    let provider = Arc::new(ScriptedProvider::new());
    provider.queue_response(ChatResponse::tool_calls(vec![ToolCall {
        id: "call_1".to_string(),
        name: "get_recipe".to_string(),
        arguments: json!({"dish_name": "riz au poulet"}),
    }]));
    provider.queue_response(ChatResponse::text(
        "For riz au poulet you need rice, chicken, onion and spices.",
    ));

    let agent = ToolCallingAgent::new(provider.clone(), ToolRegistry::kitchen());
    let answer = agent
        .run("What do I need for riz au poulet?")
        .await
        .unwrap();
    assert!(answer.contains("rice"));

    let requests = provider.recorded_requests();
    assert_eq!(requests.len(), 2);

    // The second request must carry exactly one tool result, containing the
    // recipe the registry returned, correlated to the requested call.
    let tool_messages: Vec<_> = requests[1]
        .messages
        .iter()
        .filter(|m| m.role == Role::Tool)
        .collect();
    assert_eq!(tool_messages.len(), 1);
    assert_eq!(tool_messages[0].tool_call_id.as_deref(), Some("call_1"));
    assert!(tool_messages[0].content.contains("riz"));

    // Tools are always offered one call at a time.
    assert!(requests.iter().all(|r| !r.parallel_tool_calls));
}

#[tokio::test]
async fn experiment_runner_scores_stubbed_menus() {
    let items = menu_eval_dataset();
    let report = run_experiment(
        "stubbed-menus",
        &items,
        |input| async move {
            Ok(format!(
                "Menu de la semaine: légumes rôtis et protéines végétales, pour {input}"
            ))
        },
        &[&RuleEvaluator],
    )
    .await;

    assert_eq!(report.items.len(), items.len());
    assert_eq!(report.completed(), items.len());
    assert!(!report.run_id.is_empty());

    // The vegetarian item forbids meat and fish; the stubbed menu names none
    // of them and covers both required terms, so its rule score is perfect.
    let veg = report
        .items
        .iter()
        .find(|i| i.input.contains("végétarien"))
        .unwrap();
    let rules = veg.scores.get("rules").unwrap();
    assert_eq!(rules.get("no_forbidden").unwrap().as_f64(), Some(1.0));
    assert_eq!(rules.get("included_ratio").unwrap().as_f64(), Some(1.0));
}
