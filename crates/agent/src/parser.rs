//! Response parser — recovers structured intents from free-form model text.
//!
//! The model speaks a line-labelled text protocol:
//!
//! ```text
//! Thought: I should check the forecast.
//! Action: weather_lookup
//! Action Input: {"location": "Paris"}
//! ```
//!
//! or, when reasoning is complete:
//!
//! ```text
//! Final Answer: Paris is lovely this time of year.
//! ```
//!
//! Labels are matched case-insensitively at line starts; each section runs
//! to the next label or the end of the text. Priority is fixed: a thinking
//! block is always surfaced if present, an Action wins over a Final Answer,
//! and a response matching neither is plain narrative.
//!
//! Parsing free-form model output is inherently brittle. The grammar is
//! first-match-wins and makes no attempt to recover repeated or interleaved
//! labels; a response that fights the protocol degrades to narrative text
//! and the model gets another turn.

use regex::Regex;
use std::sync::OnceLock;

use skein_core::tool::ToolRegistry;

/// Everything recovered from one model response.
#[derive(Debug, Clone, PartialEq)]
pub struct ParsedResponse {
    /// Reasoning block, surfaced regardless of what else was found.
    pub thinking: Option<String>,
    /// What the loop should do with this response.
    pub intent: Intent,
}

/// The actionable interpretation of a response.
#[derive(Debug, Clone, PartialEq)]
pub enum Intent {
    /// Dispatch a tool.
    Action {
        name: String,
        params: serde_json::Value,
    },
    /// A requested tool call was suppressed; inject this synthetic
    /// observation instead and give the model another turn.
    DirectAnswer { observation: String },
    /// Reasoning is complete; emit the answer and terminate.
    FinalAnswer(String),
    /// Neither action nor final answer; emit any narrative text and
    /// continue iterating.
    Narrative(Option<String>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Label {
    Thought,
    Action,
    ActionInput,
    FinalAnswer,
}

struct Section {
    label: Label,
    /// Byte offset where the label line starts.
    label_start: usize,
    /// Byte offset just past the colon.
    content_start: usize,
    /// Byte offset where the next label starts (or end of text).
    content_end: usize,
}

fn label_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?im)^[ \t]*(thought|thinking|think|action input|action|final answer)[ \t]*:")
            .expect("label regex is valid")
    })
}

/// Queries the web-search suppression heuristic treats as general knowledge.
const GENERAL_KNOWLEDGE_PREFIXES: &[&str] = &[
    "what is ",
    "what's ",
    "what are ",
    "who is ",
    "who was ",
    "define ",
    "explain ",
    "meaning of ",
];

/// Searches shorter than this are never worth the tool round-trip.
const MIN_SEARCH_QUERY_CHARS: usize = 12;

const SEARCH_TOOL: &str = "web_search";

/// Parse one raw model response. Pure and deterministic; the registry is
/// consulted only for declared parameter schemas.
pub fn parse(raw: &str, registry: &ToolRegistry) -> ParsedResponse {
    let sections = split_sections(raw);

    let thinking = sections
        .iter()
        .find(|s| s.label == Label::Thought)
        .map(|s| raw[s.content_start..s.content_end].trim().to_string())
        .filter(|t| !t.is_empty());

    let action_name = sections
        .iter()
        .find(|s| s.label == Label::Action)
        .map(|s| clean_action_name(&raw[s.content_start..s.content_end]))
        .filter(|n| !n.is_empty());

    // Action takes precedence over Final Answer when both match.
    if let Some(name) = action_name {
        let raw_input = sections
            .iter()
            .find(|s| s.label == Label::ActionInput)
            .map(|s| raw[s.content_start..s.content_end].trim().to_string())
            .unwrap_or_default();

        let params = parse_action_input(&name, &raw_input, registry);

        if let Some(observation) = suppress_trivial_search(&name, &params) {
            return ParsedResponse {
                thinking,
                intent: Intent::DirectAnswer { observation },
            };
        }

        return ParsedResponse {
            thinking,
            intent: Intent::Action { name, params },
        };
    }

    // Final Answer captures the remainder of the text past its label.
    if let Some(section) = sections.iter().find(|s| s.label == Label::FinalAnswer) {
        let answer = raw[section.content_start..].trim().to_string();
        if !answer.is_empty() {
            return ParsedResponse {
                thinking,
                intent: Intent::FinalAnswer(answer),
            };
        }
    }

    // Plain narrative. The thinking block is not double-rendered as text.
    let narrative = narrative_without_thinking(raw, &sections);
    ParsedResponse {
        thinking,
        intent: Intent::Narrative(narrative),
    }
}

fn split_sections(raw: &str) -> Vec<Section> {
    let matches: Vec<(Label, usize, usize)> = label_regex()
        .captures_iter(raw)
        .filter_map(|cap| {
            let whole = cap.get(0)?;
            let label = match cap.get(1)?.as_str().to_ascii_lowercase().as_str() {
                "thought" | "thinking" | "think" => Label::Thought,
                "action" => Label::Action,
                "action input" => Label::ActionInput,
                "final answer" => Label::FinalAnswer,
                _ => return None,
            };
            Some((label, whole.start(), whole.end()))
        })
        .collect();

    matches
        .iter()
        .enumerate()
        .map(|(i, &(label, start, content_start))| Section {
            label,
            label_start: start,
            content_start,
            content_end: matches
                .get(i + 1)
                .map(|&(_, next_start, _)| next_start)
                .unwrap_or(raw.len()),
        })
        .collect()
}

/// Remainder of the label line, stripped of markdown fencing and trailing
/// punctuation. Text on later lines is not a tool name.
fn clean_action_name(section: &str) -> String {
    section
        .lines()
        .next()
        .unwrap_or("")
        .trim()
        .trim_matches('`')
        .trim_end_matches(['.', ','])
        .to_string()
}

/// Strict JSON first; on failure, the bare string is mapped to the tool's
/// first declared required parameter. Unknown tools get a generic "input"
/// key and are rejected downstream by the dispatcher.
fn parse_action_input(
    tool: &str,
    raw_input: &str,
    registry: &ToolRegistry,
) -> serde_json::Value {
    if let Ok(value) = serde_json::from_str::<serde_json::Value>(raw_input) {
        if value.is_object() {
            return value;
        }
        // A JSON scalar (quoted string, number) still goes down the
        // bare-string path.
        if let serde_json::Value::String(s) = value {
            return bare_string_params(tool, &s, registry);
        }
    }

    let stripped = raw_input.trim().trim_matches(['"', '\'', '`']).trim();
    bare_string_params(tool, stripped, registry)
}

fn bare_string_params(tool: &str, input: &str, registry: &ToolRegistry) -> serde_json::Value {
    let key = registry
        .first_required_param(tool)
        .unwrap_or_else(|| "input".to_string());
    serde_json::json!({ key: input })
}

/// If the resolved action is the web-search tool and the query is trivial,
/// substitute a synthetic observation instead of paying tool latency.
fn suppress_trivial_search(name: &str, params: &serde_json::Value) -> Option<String> {
    if name != SEARCH_TOOL {
        return None;
    }
    let query = params.get("query").and_then(|q| q.as_str())?;
    let normalized = query.trim().trim_end_matches('?').to_ascii_lowercase();

    let is_general_knowledge = GENERAL_KNOWLEDGE_PREFIXES
        .iter()
        .any(|p| normalized.starts_with(p));
    let too_short = normalized.chars().count() < MIN_SEARCH_QUERY_CHARS;

    if is_general_knowledge || too_short {
        Some(format!(
            "Observation: the query \"{query}\" is general knowledge you already have. \
             Do not search for it; answer directly using the Final Answer format."
        ))
    } else {
        None
    }
}

/// The full response with the thinking section excised. `None` when nothing
/// remains.
fn narrative_without_thinking(raw: &str, sections: &[Section]) -> Option<String> {
    let text = match sections.iter().find(|s| s.label == Label::Thought) {
        Some(s) => {
            let mut out = String::with_capacity(raw.len());
            out.push_str(&raw[..s.label_start]);
            out.push_str(&raw[s.content_end..]);
            out
        }
        None => raw.to_string(),
    };
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use skein_core::content::ContentItem;
    use skein_core::error::ToolError;
    use skein_core::tool::Tool;
    use tokio_util::sync::CancellationToken;

    struct FakeTool {
        name: &'static str,
        required: &'static str,
    }

    #[async_trait]
    impl Tool for FakeTool {
        fn name(&self) -> &str {
            self.name
        }
        fn description(&self) -> &str {
            "a fake tool"
        }
        fn parameters_schema(&self) -> serde_json::Value {
            serde_json::json!({
                "type": "object",
                "properties": { self.required: { "type": "string" } },
                "required": [self.required]
            })
        }
        async fn execute(
            &self,
            _params: serde_json::Value,
            _cancel: CancellationToken,
        ) -> Result<Vec<ContentItem>, ToolError> {
            Ok(vec![])
        }
    }

    fn registry() -> ToolRegistry {
        let mut r = ToolRegistry::new();
        r.register(Box::new(FakeTool {
            name: "weather_lookup",
            required: "location",
        }));
        r.register(Box::new(FakeTool {
            name: "web_search",
            required: "query",
        }));
        r
    }

    #[test]
    fn parses_structured_action() {
        let raw = "Thought: need the forecast.\nAction: weather_lookup\nAction Input: {\"location\": \"Paris\"}";
        let parsed = parse(raw, &registry());
        assert_eq!(parsed.thinking.as_deref(), Some("need the forecast."));
        assert_eq!(
            parsed.intent,
            Intent::Action {
                name: "weather_lookup".into(),
                params: serde_json::json!({"location": "Paris"}),
            }
        );
    }

    #[test]
    fn bare_string_input_maps_to_first_required_param() {
        let raw = "Action: weather_lookup\nAction Input: Paris";
        let parsed = parse(raw, &registry());
        assert_eq!(
            parsed.intent,
            Intent::Action {
                name: "weather_lookup".into(),
                params: serde_json::json!({"location": "Paris"}),
            }
        );
    }

    #[test]
    fn quoted_string_input_maps_like_bare_string() {
        let raw = "Action: weather_lookup\nAction Input: \"Lyon\"";
        let parsed = parse(raw, &registry());
        assert_eq!(
            parsed.intent,
            Intent::Action {
                name: "weather_lookup".into(),
                params: serde_json::json!({"location": "Lyon"}),
            }
        );
    }

    #[test]
    fn unknown_tool_falls_back_to_generic_input_key() {
        let raw = "Action: teleport\nAction Input: the moon";
        let parsed = parse(raw, &registry());
        assert_eq!(
            parsed.intent,
            Intent::Action {
                name: "teleport".into(),
                params: serde_json::json!({"input": "the moon"}),
            }
        );
    }

    #[test]
    fn final_answer_captures_remainder() {
        let raw = "Thought: done reasoning.\nFinal Answer: Paris is lovely.";
        let parsed = parse(raw, &registry());
        assert_eq!(parsed.thinking.as_deref(), Some("done reasoning."));
        assert_eq!(
            parsed.intent,
            Intent::FinalAnswer("Paris is lovely.".into())
        );
    }

    #[test]
    fn action_wins_over_final_answer() {
        let raw = "Action: weather_lookup\nAction Input: {\"location\":\"Oslo\"}\nFinal Answer: too soon";
        let parsed = parse(raw, &registry());
        assert!(matches!(parsed.intent, Intent::Action { .. }));
    }

    #[test]
    fn plain_text_is_narrative() {
        let parsed = parse("Let me think about that a bit more.", &registry());
        assert_eq!(
            parsed.intent,
            Intent::Narrative(Some("Let me think about that a bit more.".into()))
        );
        assert!(parsed.thinking.is_none());
    }

    #[test]
    fn thinking_only_response_has_no_narrative() {
        let parsed = parse("Thought: hmm, tricky.", &registry());
        assert_eq!(parsed.thinking.as_deref(), Some("hmm, tricky."));
        assert_eq!(parsed.intent, Intent::Narrative(None));
    }

    #[test]
    fn narrative_excludes_thinking_block() {
        // A thought section runs to the next label or end of text, so prose
        // after an unterminated thought belongs to the thought. Prose before
        // the label survives as narrative.
        let raw = "Here is something first.\nThought: pondering";
        let parsed = parse(raw, &registry());
        assert_eq!(parsed.thinking.as_deref(), Some("pondering"));
        assert_eq!(
            parsed.intent,
            Intent::Narrative(Some("Here is something first.".into()))
        );
    }

    #[test]
    fn labels_are_case_insensitive() {
        let raw = "THOUGHT: loud reasoning\nFINAL ANSWER: Done.";
        let parsed = parse(raw, &registry());
        assert_eq!(parsed.thinking.as_deref(), Some("loud reasoning"));
        assert_eq!(parsed.intent, Intent::FinalAnswer("Done.".into()));
    }

    #[test]
    fn trivial_search_is_suppressed() {
        let raw = "Action: web_search\nAction Input: what is ai?";
        let parsed = parse(raw, &registry());
        match parsed.intent {
            Intent::DirectAnswer { observation } => {
                assert!(observation.contains("what is ai?"));
                assert!(observation.contains("answer directly"));
            }
            other => panic!("Expected DirectAnswer, got {other:?}"),
        }
    }

    #[test]
    fn short_search_query_is_suppressed() {
        let raw = "Action: web_search\nAction Input: {\"query\": \"rust\"}";
        let parsed = parse(raw, &registry());
        assert!(matches!(parsed.intent, Intent::DirectAnswer { .. }));
    }

    #[test]
    fn substantive_search_query_passes_through() {
        let raw =
            "Action: web_search\nAction Input: {\"query\": \"tokio-util cancellation token changelog 0.7\"}";
        let parsed = parse(raw, &registry());
        assert!(matches!(parsed.intent, Intent::Action { .. }));
    }

    #[test]
    fn suppression_only_applies_to_web_search() {
        let raw = "Action: weather_lookup\nAction Input: Nice";
        let parsed = parse(raw, &registry());
        assert!(matches!(parsed.intent, Intent::Action { .. }));
    }

    #[test]
    fn action_name_cleaned_of_fencing() {
        let raw = "Action: `weather_lookup`\nAction Input: {\"location\":\"Rome\"}";
        let parsed = parse(raw, &registry());
        assert!(matches!(
            parsed.intent,
            Intent::Action { ref name, .. } if name == "weather_lookup"
        ));
    }

    #[test]
    fn empty_action_section_is_not_an_action() {
        let raw = "Action:\nsome stray text";
        let parsed = parse(raw, &registry());
        assert!(matches!(parsed.intent, Intent::Narrative(Some(_))));
    }

    #[test]
    fn deterministic_for_identical_input() {
        let raw = "Thought: t\nAction: web_search\nAction Input: {\"query\": \"a sufficiently long query\"}";
        let reg = registry();
        assert_eq!(parse(raw, &reg), parse(raw, &reg));
    }
}
