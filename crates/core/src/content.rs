//! The content item union — everything the loop emits to its consumer.
//!
//! Content items form the ordered, validated output stream of a run: text
//! for the user, reasoning traces, diagnostic comments, raw tool results,
//! and renderable UI components. Items are validated at every boundary
//! (stream push, tool output, component props) and never trusted implicitly;
//! a malformed item is replaced with a sanitized diagnostic comment rather
//! than dropped, so the stream remains a complete audit trail.

use serde::{Deserialize, Serialize};

use crate::error::ContentError;

/// A single typed output event.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ContentItem {
    /// User-facing narrative or answer text.
    Text { content: String },

    /// A reasoning trace surfaced to the consumer.
    Thinking { content: String },

    /// A diagnostic aside: warnings, contained failures, loop status.
    Comment { text: String },

    /// Raw structured data returned by a tool.
    ToolResult { data: serde_json::Value },

    /// A renderable UI component with its props.
    Component {
        name: String,
        props: serde_json::Value,
    },
}

impl ContentItem {
    /// Shape/type check. Returns which constraint failed, if any.
    ///
    /// Structural validity only — a `Component`'s props are additionally
    /// checked against that component's own schema by the dispatcher.
    pub fn validate(&self) -> Result<(), ContentError> {
        match self {
            Self::Text { content } => Self::require_text("text", content),
            Self::Thinking { content } => Self::require_text("thinking", content),
            Self::Comment { text } => Self::require_text("comment", text),
            Self::ToolResult { data } => {
                if data.is_null() {
                    return Err(ContentError::MissingField {
                        kind: "tool_result".into(),
                        field: "data".into(),
                    });
                }
                Ok(())
            }
            Self::Component { name, props } => {
                if name.trim().is_empty() {
                    return Err(ContentError::MissingField {
                        kind: "component".into(),
                        field: "name".into(),
                    });
                }
                if !props.is_object() {
                    return Err(ContentError::InvalidProps {
                        component: name.clone(),
                        reason: "props must be an object".into(),
                    });
                }
                Ok(())
            }
        }
    }

    fn require_text(kind: &str, content: &str) -> Result<(), ContentError> {
        if content.trim().is_empty() {
            Err(ContentError::EmptyContent(kind.into()))
        } else {
            Ok(())
        }
    }

    /// The replacement comment used when an item fails validation.
    pub fn sanitized(reason: &ContentError) -> Self {
        Self::Comment {
            text: format!("Discarded invalid content item: {reason}"),
        }
    }

    /// Tag name as it appears on the wire.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Text { .. } => "text",
            Self::Thinking { .. } => "thinking",
            Self::Comment { .. } => "comment",
            Self::ToolResult { .. } => "tool_result",
            Self::Component { .. } => "component",
        }
    }

    /// A one-line human-readable digest, used when synthesizing
    /// observations for the model.
    pub fn digest(&self, max_chars: usize) -> String {
        let body = match self {
            Self::Text { content } | Self::Thinking { content } => content.clone(),
            Self::Comment { text } => text.clone(),
            Self::ToolResult { data } => data.to_string(),
            Self::Component { name, props } => format!("component {name} {props}"),
        };
        truncate_chars(&body, max_chars)
    }
}

/// Truncate to at most `max` characters, appending an ellipsis marker when
/// anything was cut. Operates on char boundaries.
pub fn truncate_chars(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let cut: String = s.chars().take(max).collect();
    format!("{cut}…")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn text_item_serializes_tagged() {
        let item = ContentItem::Text {
            content: "Hello".into(),
        };
        let json = serde_json::to_string(&item).unwrap();
        assert!(json.contains(r#""type":"text""#));
        assert!(json.contains(r#""content":"Hello""#));
    }

    #[test]
    fn component_item_roundtrip() {
        let item = ContentItem::Component {
            name: "WeatherCard".into(),
            props: serde_json::json!({"location": "Paris"}),
        };
        let json = serde_json::to_string(&item).unwrap();
        let back: ContentItem = serde_json::from_str(&json).unwrap();
        assert_eq!(back, item);
    }

    #[test]
    fn blank_text_fails_validation() {
        let item = ContentItem::Text {
            content: "   ".into(),
        };
        assert!(item.validate().is_err());
    }

    #[test]
    fn null_tool_result_fails_validation() {
        let item = ContentItem::ToolResult {
            data: serde_json::Value::Null,
        };
        assert!(item.validate().is_err());
    }

    #[test]
    fn component_without_name_fails_validation() {
        let item = ContentItem::Component {
            name: "".into(),
            props: serde_json::json!({}),
        };
        assert!(item.validate().is_err());
    }

    #[test]
    fn component_with_non_object_props_fails_validation() {
        let item = ContentItem::Component {
            name: "MapView".into(),
            props: serde_json::json!("not an object"),
        };
        assert!(item.validate().is_err());
    }

    #[test]
    fn sanitized_comment_carries_reason() {
        let err = ContentItem::Text { content: "".into() }.validate().unwrap_err();
        let replacement = ContentItem::sanitized(&err);
        match replacement {
            ContentItem::Comment { text } => {
                assert!(text.contains("invalid content item"));
                assert!(text.contains("text"));
            }
            other => panic!("Expected comment, got {other:?}"),
        }
    }

    #[test]
    fn digest_truncates_long_payloads() {
        let item = ContentItem::Text {
            content: "x".repeat(500),
        };
        let digest = item.digest(100);
        assert!(digest.chars().count() <= 101);
        assert!(digest.ends_with('…'));
    }

    #[test]
    fn kind_names() {
        assert_eq!(
            ContentItem::Comment { text: "c".into() }.kind(),
            "comment"
        );
        assert_eq!(
            ContentItem::ToolResult {
                data: serde_json::json!(1)
            }
            .kind(),
            "tool_result"
        );
    }
}
