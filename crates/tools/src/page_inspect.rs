//! Page inspection tool — summarizes page text the host hands in.
//!
//! The runtime never scrapes the DOM itself; the host extracts the page
//! content and passes it as a parameter. The stub produces a crude
//! extractive summary (first sentences plus word count) so the loop has a
//! realistic text-producing tool to exercise.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use skein_core::content::ContentItem;
use skein_core::error::ToolError;
use skein_core::tool::Tool;

/// How many leading sentences the summary keeps.
const SUMMARY_SENTENCES: usize = 3;

pub struct PageInspectTool;

#[async_trait]
impl Tool for PageInspectTool {
    fn name(&self) -> &str {
        "page_inspect"
    }

    fn description(&self) -> &str {
        "Summarize the text content of the current page. Pass the page text in 'content'."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "content": {
                    "type": "string",
                    "description": "The extracted text content of the page"
                }
            },
            "required": ["content"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        cancel: CancellationToken,
    ) -> Result<Vec<ContentItem>, ToolError> {
        if cancel.is_cancelled() {
            return Err(ToolError::Cancelled("page_inspect".into()));
        }

        let content = params["content"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'content' argument".into()))?;

        let trimmed = content.trim();
        if trimmed.is_empty() {
            return Err(ToolError::InvalidArguments("Page content is empty".into()));
        }

        let words = trimmed.split_whitespace().count();
        let lead: String = trimmed
            .split_inclusive(['.', '!', '?'])
            .take(SUMMARY_SENTENCES)
            .collect::<String>()
            .trim()
            .to_string();

        Ok(vec![ContentItem::Text {
            content: format!("Page summary ({words} words): {lead}"),
        }])
    }
}
