//! Tool registry: a fixed mapping from tool name to a local function.
//!
//! Tools are pure, synchronous lookups over fixture data. The registry is
//! built once at session start, stays immutable, and is passed by reference
//! into the tool-calling loop. Dispatch never fails the caller: unknown
//! names and rejected arguments are rendered as inline error strings that
//! flow back into the transcript.

pub mod fixtures;

use std::sync::Arc;

use jsonschema::JSONSchema;
use serde_json::Value;

use crate::error::Result;
use crate::provider::types::{ToolCall, ToolDefinition};

pub use fixtures::{CheckDietaryInfo, CheckFridge, GetRecipe, MenuLookup};

/// A named local function with a declared parameter schema.
pub trait Tool: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    /// JSON schema for the accepted named parameters.
    fn parameters(&self) -> Value;
    /// Invoke with an argument mapping already validated against
    /// [`parameters`](Tool::parameters).
    fn call(&self, args: &Value) -> Result<Value>;
}

/// A tool plus its parameter schema compiled at registration time.
#[derive(Clone)]
struct RegisteredTool {
    tool: Arc<dyn Tool>,
    schema: Arc<std::result::Result<JSONSchema, String>>,
}

#[derive(Default, Clone)]
pub struct ToolRegistry {
    tools: Vec<RegisteredTool>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_tool(mut self, tool: Arc<dyn Tool>) -> Self {
        let schema = JSONSchema::compile(&tool.parameters())
            .map_err(|e| format!("invalid tool schema: {}", e));
        self.tools.push(RegisteredTool {
            tool,
            schema: Arc::new(schema),
        });
        self
    }

    /// The three kitchen fixtures: fridge contents, recipe lookup, dietary
    /// lookup.
    pub fn kitchen() -> Self {
        Self::new()
            .with_tool(Arc::new(CheckFridge))
            .with_tool(Arc::new(GetRecipe))
            .with_tool(Arc::new(CheckDietaryInfo))
    }

    /// Kitchen fixtures plus the restaurant menu database.
    pub fn restaurant() -> Self {
        Self::kitchen().with_tool(Arc::new(MenuLookup))
    }

    pub fn get(&self, name: &str) -> Option<&Arc<dyn Tool>> {
        self.find(name).map(|r| &r.tool)
    }

    fn find(&self, name: &str) -> Option<&RegisteredTool> {
        self.tools.iter().find(|r| r.tool.name() == name)
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Provider-facing schemas, in registration order.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        self.tools
            .iter()
            .map(|r| ToolDefinition {
                name: r.tool.name().to_string(),
                description: r.tool.description().to_string(),
                parameters: r.tool.parameters(),
            })
            .collect()
    }

    /// Execute one requested invocation and render the outcome as the string
    /// payload fed back into the transcript.
    pub fn dispatch(&self, call: &ToolCall) -> String {
        let Some(registered) = self.find(&call.name) else {
            return format!("Error: unknown tool '{}'", call.name);
        };

        if let Err(message) = validate_arguments(&registered.schema, &call.arguments) {
            tracing::debug!(tool = %call.name, %message, "rejected tool arguments");
            return format!(
                "Error: invalid arguments for tool '{}': {}",
                call.name, message
            );
        }

        match registered.tool.call(&call.arguments) {
            Ok(value) => value.to_string(),
            Err(e) => format!("Error: tool '{}' failed: {}", call.name, e),
        }
    }
}

fn validate_arguments(
    schema: &std::result::Result<JSONSchema, String>,
    args: &Value,
) -> std::result::Result<(), String> {
    let compiled = schema.as_ref().map_err(Clone::clone)?;
    if let Err(errors) = compiled.validate(args) {
        let details: Vec<String> = errors.map(|e| e.to_string()).collect();
        return Err(details.join("; "));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn call(name: &str, arguments: Value) -> ToolCall {
        ToolCall {
            id: "call_1".to_string(),
            name: name.to_string(),
            arguments,
        }
    }

    #[test]
    fn unknown_tool_yields_literal_error_string() {
        let registry = ToolRegistry::kitchen();
        let result = registry.dispatch(&call("book_table", json!({})));
        assert_eq!(result, "Error: unknown tool 'book_table'");
    }

    #[test]
    fn missing_required_argument_is_recovered_as_error_string() {
        let registry = ToolRegistry::kitchen();
        let result = registry.dispatch(&call("get_recipe", json!({})));
        assert!(result.starts_with("Error: invalid arguments for tool 'get_recipe':"));
    }

    #[test]
    fn wrong_argument_type_is_rejected_before_invocation() {
        let registry = ToolRegistry::kitchen();
        let result = registry.dispatch(&call("get_recipe", json!({ "dish_name": 42 })));
        assert!(result.starts_with("Error: invalid arguments for tool 'get_recipe':"));
    }

    #[test]
    fn successful_dispatch_returns_json_payload() {
        let registry = ToolRegistry::kitchen();
        let result = registry.dispatch(&call("check_fridge", json!({})));
        let parsed: Value = serde_json::from_str(&result).unwrap();
        assert!(parsed.as_array().unwrap().contains(&json!("poulet")));
    }

    #[test]
    fn tool_schema_is_compiled_once_at_registration() {
        use std::sync::atomic::{AtomicUsize, Ordering};

        struct SchemaCountingTool {
            reads: Arc<AtomicUsize>,
        }

        impl Tool for SchemaCountingTool {
            fn name(&self) -> &str {
                "schema_counter"
            }

            fn description(&self) -> &str {
                "Counts how often its schema is read."
            }

            fn parameters(&self) -> Value {
                self.reads.fetch_add(1, Ordering::SeqCst);
                json!({ "type": "object", "properties": {} })
            }

            fn call(&self, _args: &Value) -> crate::error::Result<Value> {
                Ok(json!(null))
            }
        }

        let reads = Arc::new(AtomicUsize::new(0));
        let registry = ToolRegistry::new().with_tool(Arc::new(SchemaCountingTool {
            reads: reads.clone(),
        }));
        assert_eq!(reads.load(Ordering::SeqCst), 1);

        registry.dispatch(&call("schema_counter", json!({})));
        registry.dispatch(&call("schema_counter", json!({})));
        assert_eq!(reads.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn definitions_follow_registration_order() {
        let names: Vec<String> = ToolRegistry::restaurant()
            .definitions()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(
            names,
            vec!["check_fridge", "get_recipe", "check_dietary_info", "menu_lookup"]
        );
    }
}
