//! Tool trait — the abstraction over agent capabilities.
//!
//! Tools are what give the agent the ability to act in the world: look up
//! the weather, search the web, inspect a page. Tools are registered in the
//! ToolRegistry and made available to the reasoning loop for the duration
//! of a run; the registry is immutable while a run is in flight.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use tokio_util::sync::CancellationToken;

use crate::content::ContentItem;
use crate::error::ToolError;

/// A tool definition sent to the model so it knows what it can call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDefinition {
    /// The tool name (unique key)
    pub name: String,

    /// Description of what the tool does
    pub description: String,

    /// JSON Schema describing the tool's parameters
    pub parameters: serde_json::Value,
}

/// The core Tool trait.
///
/// Implementations receive a cancellation token and are expected to check it
/// between phases of long-running work; cancellation is cooperative, never
/// preemptive. A tool returns one or more content items — the dispatcher
/// validates every one of them before they reach the stream.
#[async_trait]
pub trait Tool: Send + Sync {
    /// The unique name of this tool (e.g., "weather_lookup").
    fn name(&self) -> &str;

    /// A description of what this tool does (sent to the model).
    fn description(&self) -> &str;

    /// JSON Schema describing this tool's parameters.
    fn parameters_schema(&self) -> serde_json::Value;

    /// Execute the tool with the given arguments.
    async fn execute(
        &self,
        params: serde_json::Value,
        cancel: CancellationToken,
    ) -> std::result::Result<Vec<ContentItem>, ToolError>;

    /// Convert this tool into a ToolDefinition for prompt rendering.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition {
            name: self.name().to_string(),
            description: self.description().to_string(),
            parameters: self.parameters_schema(),
        }
    }
}

/// A registry of available tools.
///
/// The reasoning loop uses this to:
/// 1. Render the tool catalogue into the system prompt
/// 2. Look up and execute tools when the model requests them
/// 3. Resolve the bare-string argument fallback (first required parameter)
pub struct ToolRegistry {
    tools: HashMap<String, Box<dyn Tool>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Replaces any existing tool with the same name.
    pub fn register(&mut self, tool: Box<dyn Tool>) {
        let name = tool.name().to_string();
        self.tools.insert(name, tool);
    }

    /// Get a tool by name.
    pub fn get(&self, name: &str) -> Option<&dyn Tool> {
        self.tools.get(name).map(|t| t.as_ref())
    }

    /// Get all tool definitions (for prompt rendering).
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> =
            self.tools.values().map(|t| t.to_definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// List all registered tool names, sorted.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(|s| s.as_str()).collect();
        names.sort_unstable();
        names
    }

    /// The first declared required parameter of a tool, per its schema.
    ///
    /// This is the target of the bare-string Action Input fallback: when the
    /// model drops structured formatting and sends a plain string, the parser
    /// maps it to this parameter. The registry is the enumerated per-tool
    /// table; nothing is inferred beyond what the tool declares.
    pub fn first_required_param(&self, name: &str) -> Option<String> {
        let schema = self.get(name)?.parameters_schema();
        schema
            .get("required")?
            .as_array()?
            .first()?
            .as_str()
            .map(String::from)
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}

/// Check `params` against a JSON Schema object: every required field must be
/// present, and declared primitive types must match. Nested schemas are not
/// descended into; tools own deep validation of their own payloads.
pub fn validate_params(
    schema: &serde_json::Value,
    params: &serde_json::Value,
) -> std::result::Result<(), ToolError> {
    let obj = params
        .as_object()
        .ok_or_else(|| ToolError::InvalidArguments("arguments must be an object".into()))?;

    if let Some(required) = schema.get("required").and_then(|r| r.as_array()) {
        for field in required.iter().filter_map(|f| f.as_str()) {
            if !obj.contains_key(field) {
                return Err(ToolError::InvalidArguments(format!(
                    "missing required argument '{field}'"
                )));
            }
        }
    }

    if let Some(props) = schema.get("properties").and_then(|p| p.as_object()) {
        for (field, value) in obj {
            let Some(declared) = props.get(field).and_then(|p| p.get("type")) else {
                continue;
            };
            let matches = match declared.as_str() {
                Some("string") => value.is_string(),
                Some("number") => value.is_number(),
                Some("integer") => value.is_i64() || value.is_u64(),
                Some("boolean") => value.is_boolean(),
                Some("array") => value.is_array(),
                Some("object") => value.is_object(),
                _ => true,
            };
            if !matches {
                return Err(ToolError::InvalidArguments(format!(
                    "argument '{field}' has wrong type (expected {declared})"
                )));
            }
        }
    }

    Ok(())
}
