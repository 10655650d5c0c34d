//! Conversation memory — continuity across runs within a session.
//!
//! Two parts:
//! - `history`: the ordered message record replayed verbatim (minus old
//!   system messages) on every run, which is what gives the agent
//!   continuity across separate user messages.
//! - `scratchpad`: a small key/value store updated opportunistically after
//!   tool use and re-injected as an extra system message on the next run,
//!   so the model has lightweight continuity without replaying everything.

use chrono::Utc;
use std::collections::BTreeMap;

use skein_core::message::{Message, Role};

pub const SCRATCH_LAST_TOOL: &str = "last_tool";
pub const SCRATCH_LAST_TOOL_STATUS: &str = "last_tool_status";
pub const SCRATCH_LAST_ACTIVITY: &str = "last_activity";

#[derive(Debug, Default)]
pub struct ConversationMemory {
    history: Vec<Message>,
    scratchpad: BTreeMap<String, String>,
}

impl ConversationMemory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a message to the history, preserving turn order.
    pub fn push(&mut self, message: Message) {
        self.history.push(message);
    }

    /// The full ordered history.
    pub fn history(&self) -> &[Message] {
        &self.history
    }

    /// History with system messages excluded. Each run injects one fresh
    /// system message; replaying stale ones would stack old prompts.
    pub fn non_system_history(&self) -> Vec<Message> {
        self.history
            .iter()
            .filter(|m| m.role != Role::System)
            .cloned()
            .collect()
    }

    /// Write a scratchpad entry.
    pub fn remember(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.scratchpad.insert(key.into(), value.into());
    }

    /// Record that a tool just ran. Called by the loop after each dispatch.
    pub fn note_tool_use(&mut self, tool: &str, success: bool) {
        self.remember(SCRATCH_LAST_TOOL, tool);
        self.remember(
            SCRATCH_LAST_TOOL_STATUS,
            if success { "ok" } else { "failed" },
        );
        self.remember(SCRATCH_LAST_ACTIVITY, Utc::now().to_rfc3339());
    }

    pub fn scratchpad(&self) -> &BTreeMap<String, String> {
        &self.scratchpad
    }

    /// Render the scratchpad as a system-message block, or `None` when it
    /// has nothing to say.
    pub fn render_scratchpad(&self) -> Option<String> {
        if self.scratchpad.is_empty() {
            return None;
        }
        let mut out = String::from("Session scratchpad (carried across turns):\n");
        for (key, value) in &self.scratchpad {
            out.push_str(&format!("- {key}: {value}\n"));
        }
        Some(out)
    }

    pub fn is_empty(&self) -> bool {
        self.history.is_empty() && self.scratchpad.is_empty()
    }

    /// Drop both history and scratchpad (new logical conversation).
    pub fn clear(&mut self) {
        self.history.clear();
        self.scratchpad.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn non_system_history_excludes_system_messages() {
        let mut mem = ConversationMemory::new();
        mem.push(Message::system("rules v1"));
        mem.push(Message::user("hello"));
        mem.push(Message::assistant("hi"));
        mem.push(Message::system("rules v2"));

        let replay = mem.non_system_history();
        assert_eq!(replay.len(), 2);
        assert!(replay.iter().all(|m| m.role != Role::System));
        assert_eq!(replay[0].content, "hello");
        assert_eq!(replay[1].content, "hi");
    }

    #[test]
    fn scratchpad_renders_sorted_entries() {
        let mut mem = ConversationMemory::new();
        mem.remember("zebra", "last");
        mem.remember("apple", "first");

        let rendered = mem.render_scratchpad().unwrap();
        let apple = rendered.find("apple").unwrap();
        let zebra = rendered.find("zebra").unwrap();
        assert!(apple < zebra);
    }

    #[test]
    fn empty_scratchpad_renders_nothing() {
        let mem = ConversationMemory::new();
        assert!(mem.render_scratchpad().is_none());
    }

    #[test]
    fn note_tool_use_records_status_and_timestamp() {
        let mut mem = ConversationMemory::new();
        mem.note_tool_use("web_search", false);

        assert_eq!(
            mem.scratchpad().get(SCRATCH_LAST_TOOL).map(String::as_str),
            Some("web_search")
        );
        assert_eq!(
            mem.scratchpad()
                .get(SCRATCH_LAST_TOOL_STATUS)
                .map(String::as_str),
            Some("failed")
        );
        assert!(mem.scratchpad().contains_key(SCRATCH_LAST_ACTIVITY));
    }

    #[test]
    fn clear_resets_both_parts() {
        let mut mem = ConversationMemory::new();
        mem.push(Message::user("hello"));
        mem.note_tool_use("weather_lookup", true);

        mem.clear();
        assert!(mem.is_empty());
        assert!(mem.render_scratchpad().is_none());
    }
}
