//! Every top-level operation opens a named span.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Mutex};

use serde_json::json;
use tracing::span;
use tracing::{Event, Metadata, Subscriber};

use chefbot::agent::ToolCallingAgent;
use chefbot::assistant::ChefAssistant;
use chefbot::dataset::{menu_eval_dataset, run_experiment, RuleEvaluator};
use chefbot::eval::LlmJudge;
use chefbot::planner::MenuPlanner;
use chefbot::provider::{ChatResponse, ScriptedProvider};
use chefbot::tools::ToolRegistry;

/// Records the name of every span opened on the current thread.
struct SpanRecorder {
    names: Arc<Mutex<Vec<String>>>,
    next_id: AtomicU64,
}

impl SpanRecorder {
    fn new(names: Arc<Mutex<Vec<String>>>) -> Self {
        Self {
            names,
            next_id: AtomicU64::new(1),
        }
    }
}

impl Subscriber for SpanRecorder {
    fn enabled(&self, _metadata: &Metadata<'_>) -> bool {
        true
    }

    fn new_span(&self, attrs: &span::Attributes<'_>) -> span::Id {
        self.names
            .lock()
            .unwrap()
            .push(attrs.metadata().name().to_string());
        span::Id::from_u64(self.next_id.fetch_add(1, Ordering::SeqCst))
    }

    fn record(&self, _span: &span::Id, _values: &span::Record<'_>) {}

    fn record_follows_from(&self, _span: &span::Id, _follows: &span::Id) {}

    fn event(&self, _event: &Event<'_>) {}

    fn enter(&self, _span: &span::Id) {}

    fn exit(&self, _span: &span::Id) {}
}

#[tokio::test]
async fn top_level_operations_open_named_spans() {
    let names = Arc::new(Mutex::new(Vec::new()));
    let _guard = tracing::subscriber::set_default(SpanRecorder::new(names.clone()));

    let provider = Arc::new(ScriptedProvider::new());

    provider.queue_response(ChatResponse::text("an omelette"));
    ChefAssistant::new(provider.clone())
        .ask("what should I cook?", 0.7)
        .await
        .unwrap();

    provider.queue_response(ChatResponse::text(
        r#"{"relevance": 1.0, "creativity": 1.0, "practicality": 1.0}"#,
    ));
    LlmJudge::new(provider.clone())
        .judge("a menu question", "Lundi: omelette")
        .await
        .unwrap();

    provider.queue_response(ChatResponse::text("quick answer"));
    ToolCallingAgent::new(provider.clone(), ToolRegistry::kitchen())
        .run("anything")
        .await
        .unwrap();

    provider.queue_response(ChatResponse::text(json!({ "steps": ["a"] }).to_string()));
    provider.queue_response(ChatResponse::text("step output"));
    provider.queue_response(ChatResponse::text("final menu"));
    MenuPlanner::new(provider.clone())
        .plan_weekly_menu("anything")
        .await
        .unwrap();

    let items = menu_eval_dataset();
    run_experiment(
        "span-check",
        &items,
        |_input| async move { Ok("a menu".to_string()) },
        &[&RuleEvaluator],
    )
    .await;

    let recorded = names.lock().unwrap().clone();
    for expected in [
        "ask",
        "llm_judge",
        "tool_calling_agent",
        "plan_weekly_menu",
        "experiment",
    ] {
        assert!(
            recorded.iter().any(|n| n == expected),
            "missing span '{}' in {:?}",
            expected,
            recorded
        );
    }
}
