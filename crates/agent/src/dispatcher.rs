//! Tool dispatcher — validated, failure-contained tool execution.
//!
//! The dispatcher is the boundary between the reasoning loop and tool
//! implementations. Everything that can go wrong on the other side of that
//! boundary — unknown names, bad arguments, thrown errors, panics, malformed
//! output, bogus component props — is converted into a diagnostic comment
//! item and a readable observation. A failing tool never aborts the run.

use std::any::Any;
use std::sync::Arc;
use std::time::Instant;

use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use skein_core::component::ComponentCatalog;
use skein_core::content::ContentItem;
use skein_core::error::ToolError;
use skein_core::tool::{validate_params, ToolRegistry};

/// Per-item digest budget when synthesizing observations.
const DIGEST_MAX_CHARS: usize = 400;

/// The outcome of dispatching one action.
#[derive(Debug, Clone)]
pub struct Dispatch {
    /// Validated content items for the stream. Never empty.
    pub items: Vec<ContentItem>,
    /// Human-readable digest fed back to the model as the next observation.
    pub observation: String,
    /// Whether the tool ran and returned without errors.
    pub success: bool,
}

pub struct ToolDispatcher {
    registry: Arc<ToolRegistry>,
    catalog: Arc<dyn ComponentCatalog>,
}

impl ToolDispatcher {
    pub fn new(registry: Arc<ToolRegistry>, catalog: Arc<dyn ComponentCatalog>) -> Self {
        Self { registry, catalog }
    }

    /// Execute `name` with `params`. Infallible by design: every failure
    /// path resolves to comment items inside the returned [`Dispatch`].
    pub async fn execute(
        &self,
        name: &str,
        params: serde_json::Value,
        cancel: CancellationToken,
    ) -> Dispatch {
        let Some(tool) = self.registry.get(name) else {
            let text = format!(
                "Unknown tool '{}'. Available tools: {}",
                name,
                self.registry.names().join(", ")
            );
            warn!(tool = name, "Dispatch requested for unregistered tool");
            return Dispatch {
                items: vec![ContentItem::Comment { text: text.clone() }],
                observation: format!("Observation: {text}"),
                success: false,
            };
        };

        if let Err(e) = validate_params(&tool.parameters_schema(), &params) {
            let text = format!("Tool '{name}' rejected its arguments: {e}");
            warn!(tool = name, error = %e, "Tool argument validation failed");
            return Dispatch {
                items: vec![ContentItem::Comment { text: text.clone() }],
                observation: format!("Observation: {text}"),
                success: false,
            };
        }

        debug!(tool = name, "Executing tool");
        let start = Instant::now();

        // Tools are arbitrary host code. Run them on their own task so a
        // panic surfaces as a JoinError here instead of unwinding the loop.
        let task_registry = self.registry.clone();
        let task_name = name.to_string();
        let task = tokio::spawn(async move {
            match task_registry.get(&task_name) {
                Some(tool) => tool.execute(params, cancel).await,
                None => Err(ToolError::NotFound(task_name)),
            }
        });
        let result = match task.await {
            Ok(result) => result,
            Err(join_err) if join_err.is_panic() => Err(ToolError::ExecutionFailed {
                tool_name: name.to_string(),
                reason: format!("panicked: {}", panic_reason(join_err.into_panic())),
            }),
            Err(_) => Err(ToolError::Cancelled(name.to_string())),
        };
        let duration_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(raw_items) => {
                let items = self.validate_items(name, raw_items).await;
                let observation = self.synthesize_observation(name, &items, duration_ms);
                debug!(tool = name, duration_ms, items = items.len(), "Tool completed");
                Dispatch {
                    items,
                    observation,
                    success: true,
                }
            }
            Err(e) => {
                warn!(tool = name, error = %e, duration_ms, "Tool execution failed");
                let text = format!("Tool '{name}' failed: {e}");
                Dispatch {
                    items: vec![ContentItem::Comment { text: text.clone() }],
                    observation: format!(
                        "Observation: {text}\n{}",
                        cost_note(name, duration_ms)
                    ),
                    success: false,
                }
            }
        }
    }

    /// Run every returned item through the shape validator, and component
    /// items through the catalog's prop check. Non-conforming items are
    /// replaced with sanitized comments, never silently dropped.
    async fn validate_items(&self, tool: &str, raw: Vec<ContentItem>) -> Vec<ContentItem> {
        let mut items = Vec::with_capacity(raw.len().max(1));

        for item in raw {
            if let Err(e) = item.validate() {
                warn!(tool, error = %e, "Tool emitted malformed content item");
                items.push(ContentItem::sanitized(&e));
                continue;
            }
            if let ContentItem::Component { name, props } = &item {
                if let Err(e) = self.catalog.validate_props(name, props).await {
                    warn!(tool, component = %name, error = %e, "Component props rejected");
                    items.push(ContentItem::sanitized(&e));
                    continue;
                }
            }
            items.push(item);
        }

        if items.is_empty() {
            items.push(ContentItem::Comment {
                text: format!("Tool '{tool}' returned no content"),
            });
        }
        items
    }

    fn synthesize_observation(
        &self,
        tool: &str,
        items: &[ContentItem],
        duration_ms: u64,
    ) -> String {
        let digest = items
            .iter()
            .map(|i| i.digest(DIGEST_MAX_CHARS))
            .collect::<Vec<_>>()
            .join("\n");
        format!(
            "Observation: {digest}\n{}",
            cost_note(tool, duration_ms)
        )
    }
}

/// The behavioral nudge appended to every observation. Part of the loop's
/// contract for discouraging runaway tool use by the model.
fn cost_note(tool: &str, duration_ms: u64) -> String {
    format!("[tool {tool} took {duration_ms}ms - tools are expensive, use sparingly]")
}

/// Best-effort extraction of a panic payload's message.
fn panic_reason(payload: Box<dyn Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "opaque panic payload".into())
}
