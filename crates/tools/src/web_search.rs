//! Web search tool — stub that returns mock search results.
//!
//! In production this would call a real search API. The stub returns
//! canned results for common topics and generic results otherwise, so the
//! loop can be tested end-to-end without network access. Note that the
//! parser may suppress trivial queries before this tool is ever reached.

use async_trait::async_trait;
use tokio_util::sync::CancellationToken;

use skein_core::content::ContentItem;
use skein_core::error::ToolError;
use skein_core::tool::Tool;

pub struct WebSearchTool;

#[async_trait]
impl Tool for WebSearchTool {
    fn name(&self) -> &str {
        "web_search"
    }

    fn description(&self) -> &str {
        "Search the web for information. Returns a list of relevant results with titles, URLs, and snippets."
    }

    fn parameters_schema(&self) -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "query": {
                    "type": "string",
                    "description": "The search query"
                },
                "num_results": {
                    "type": "integer",
                    "description": "Number of results to return (default 3)",
                    "default": 3
                }
            },
            "required": ["query"]
        })
    }

    async fn execute(
        &self,
        params: serde_json::Value,
        cancel: CancellationToken,
    ) -> Result<Vec<ContentItem>, ToolError> {
        if cancel.is_cancelled() {
            return Err(ToolError::Cancelled("web_search".into()));
        }

        let query = params["query"]
            .as_str()
            .ok_or_else(|| ToolError::InvalidArguments("Missing 'query' argument".into()))?;
        let num_results = params["num_results"].as_u64().unwrap_or(3).min(5) as usize;

        let results = generate_mock_results(query, num_results);
        let data = serde_json::to_value(&results)
            .map_err(|e| ToolError::ExecutionFailed {
                tool_name: "web_search".into(),
                reason: e.to_string(),
            })?;

        Ok(vec![ContentItem::ToolResult { data }])
    }
}

#[derive(Clone, serde::Serialize)]
struct SearchResult {
    title: String,
    url: String,
    snippet: String,
}

fn generate_mock_results(query: &str, count: usize) -> Vec<SearchResult> {
    let q = query.to_lowercase();

    let templates: Vec<(&str, Vec<SearchResult>)> = vec![
        ("rust", vec![
            SearchResult {
                title: "The Rust Programming Language".into(),
                url: "https://doc.rust-lang.org/book/".into(),
                snippet: "Rust is a systems programming language focused on safety, speed, and concurrency.".into(),
            },
            SearchResult {
                title: "crates.io: Rust Package Registry".into(),
                url: "https://crates.io/".into(),
                snippet: "The Rust community's crate registry for sharing and discovering Rust libraries.".into(),
            },
        ]),
        ("weather", vec![
            SearchResult {
                title: "OpenWeatherMap".into(),
                url: "https://openweathermap.org/".into(),
                snippet: "Free weather API providing current weather data and forecasts for any location.".into(),
            },
        ]),
    ];

    for (keyword, results) in &templates {
        if q.contains(keyword) {
            return results.iter().take(count).cloned().collect();
        }
    }

    (0..count)
        .map(|i| SearchResult {
            title: format!("Result {} for: {}", i + 1, query),
            url: format!("https://example.com/search?q={}&p={}", urlencode(query), i + 1),
            snippet: format!(
                "This is a mock search result for the query '{query}'. In production, this would contain real content."
            ),
        })
        .collect()
}

fn urlencode(s: &str) -> String {
    s.replace(' ', "+")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn search_returns_results() {
        let tool = WebSearchTool;
        let items = tool
            .execute(
                serde_json::json!({"query": "rust async runtimes compared"}),
                CancellationToken::new(),
            )
            .await
            .unwrap();

        assert_eq!(items.len(), 1);
        match &items[0] {
            ContentItem::ToolResult { data } => {
                assert!(data.as_array().unwrap().len() >= 1);
                assert!(data[0]["title"].as_str().unwrap().contains("Rust"));
            }
            other => panic!("Expected tool result, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn search_respects_num_results() {
        let tool = WebSearchTool;
        let items = tool
            .execute(
                serde_json::json!({"query": "obscure test subject", "num_results": 2}),
                CancellationToken::new(),
            )
            .await
            .unwrap();

        match &items[0] {
            ContentItem::ToolResult { data } => {
                assert_eq!(data.as_array().unwrap().len(), 2)
            }
            other => panic!("Expected tool result, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn missing_query_returns_error() {
        let tool = WebSearchTool;
        let result = tool
            .execute(serde_json::json!({}), CancellationToken::new())
            .await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn cancelled_token_short_circuits() {
        let tool = WebSearchTool;
        let cancel = CancellationToken::new();
        cancel.cancel();
        let result = tool
            .execute(serde_json::json!({"query": "anything at all"}), cancel)
            .await;
        assert!(matches!(result, Err(ToolError::Cancelled(_))));
    }

    #[test]
    fn tool_definition() {
        let def = WebSearchTool.to_definition();
        assert_eq!(def.name, "web_search");
        assert!(!def.description.is_empty());
    }
}
