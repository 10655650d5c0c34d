//! System prompt assembly.
//!
//! Every run starts from one fresh system message: behavioral rules, the
//! text-protocol format the parser understands, the tool catalogue rendered
//! from the registry, and any page/extra context the host supplies. Context
//! blocks are truncated to a bounded character budget so an oversized page
//! can never crowd out the rules.

use skein_core::content::truncate_chars;
use skein_core::tool::ToolDefinition;

/// Per-context-block character budget.
const CONTEXT_BLOCK_MAX_CHARS: usize = 8_000;

/// Upper bound on the assembled prompt.
const PROMPT_MAX_CHARS: usize = 24_000;

const DEFAULT_PREAMBLE: &str = "\
You are a careful assistant embedded in the user's browser. You reason step \
by step and may call tools to gather information, but tools are expensive: \
prefer answering from what you already know, and never call a tool twice \
with the same input.";

const PROTOCOL_RULES: &str = "\
Respond using exactly this format:

Thought: your reasoning about what to do next
Action: the name of one tool to call
Action Input: the tool's arguments as a JSON object

After each action you will receive an Observation with the result. When you \
can answer the user, respond with:

Final Answer: your complete answer

Use at most one Action per response. If no tool is needed, go straight to \
the Final Answer.";

#[derive(Debug, Default)]
pub struct PromptBuilder {
    definitions: Vec<ToolDefinition>,
    page_context: Option<String>,
    extra_context: Option<String>,
    preamble_override: Option<String>,
}

impl PromptBuilder {
    pub fn new(definitions: Vec<ToolDefinition>) -> Self {
        Self {
            definitions,
            ..Self::default()
        }
    }

    /// Attach the content of the page the user is looking at.
    pub fn with_page_context(mut self, context: Option<String>) -> Self {
        self.page_context = context;
        self
    }

    /// Attach caller-supplied auxiliary context.
    pub fn with_extra_context(mut self, context: Option<String>) -> Self {
        self.extra_context = context;
        self
    }

    /// Replace the rules preamble. The protocol instructions and tool
    /// catalogue are always kept; without them the parser has nothing to
    /// parse.
    pub fn with_preamble_override(mut self, preamble: Option<String>) -> Self {
        self.preamble_override = preamble;
        self
    }

    /// Assemble the system prompt, bounded by the overall budget.
    pub fn build(&self) -> String {
        let mut out = String::new();

        out.push_str(
            self.preamble_override
                .as_deref()
                .unwrap_or(DEFAULT_PREAMBLE),
        );
        out.push_str("\n\n");
        out.push_str(PROTOCOL_RULES);

        if !self.definitions.is_empty() {
            out.push_str("\n\n## Available tools\n");
            for def in &self.definitions {
                out.push_str(&format!(
                    "- {}: {}\n  parameters: {}\n",
                    def.name, def.description, def.parameters
                ));
            }
        } else {
            out.push_str("\n\nNo tools are available; answer from your own knowledge.");
        }

        if let Some(page) = self.page_context.as_deref().filter(|p| !p.trim().is_empty()) {
            out.push_str("\n\n## Current page\n");
            out.push_str(&truncate_chars(page.trim(), CONTEXT_BLOCK_MAX_CHARS));
        }

        if let Some(extra) = self
            .extra_context
            .as_deref()
            .filter(|e| !e.trim().is_empty())
        {
            out.push_str("\n\n## Additional context\n");
            out.push_str(&truncate_chars(extra.trim(), CONTEXT_BLOCK_MAX_CHARS));
        }

        truncate_chars(&out, PROMPT_MAX_CHARS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn defs() -> Vec<ToolDefinition> {
        vec![ToolDefinition {
            name: "weather_lookup".into(),
            description: "Look up the weather".into(),
            parameters: serde_json::json!({
                "type": "object",
                "properties": { "location": { "type": "string" } },
                "required": ["location"]
            }),
        }]
    }

    #[test]
    fn prompt_lists_tools_and_protocol() {
        let prompt = PromptBuilder::new(defs()).build();
        assert!(prompt.contains("weather_lookup"));
        assert!(prompt.contains("Look up the weather"));
        assert!(prompt.contains("Final Answer:"));
        assert!(prompt.contains("Action Input:"));
    }

    #[test]
    fn empty_registry_notes_no_tools() {
        let prompt = PromptBuilder::new(vec![]).build();
        assert!(prompt.contains("No tools are available"));
    }

    #[test]
    fn page_context_is_truncated() {
        let prompt = PromptBuilder::new(defs())
            .with_page_context(Some("x".repeat(50_000)))
            .build();
        assert!(prompt.chars().count() <= PROMPT_MAX_CHARS + 1);
        assert!(prompt.contains("## Current page"));
    }

    #[test]
    fn blank_context_blocks_are_skipped() {
        let prompt = PromptBuilder::new(defs())
            .with_page_context(Some("   ".into()))
            .with_extra_context(Some(String::new()))
            .build();
        assert!(!prompt.contains("## Current page"));
        assert!(!prompt.contains("## Additional context"));
    }

    #[test]
    fn override_replaces_preamble_but_keeps_protocol() {
        let prompt = PromptBuilder::new(defs())
            .with_preamble_override(Some("You are a pirate.".into()))
            .build();
        assert!(prompt.contains("You are a pirate."));
        assert!(!prompt.contains("embedded in the user's browser"));
        assert!(prompt.contains("Final Answer:"));
        assert!(prompt.contains("weather_lookup"));
    }
}
