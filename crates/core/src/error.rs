//! Error types for the skein domain.
//!
//! Uses `thiserror` for ergonomic error definitions.
//! Each bounded context has its own error enum.

use thiserror::Error;

/// The top-level error type for all skein operations.
#[derive(Debug, Error)]
pub enum Error {
    // --- Completion backend errors ---
    #[error("Backend error: {0}")]
    Backend(#[from] BackendError),

    // --- Tool errors ---
    #[error("Tool error: {0}")]
    Tool(#[from] ToolError),

    // --- Content validation errors ---
    #[error("Content error: {0}")]
    Content(#[from] ContentError),

    // --- Serialization ---
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    // --- Generic ---
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Result type alias using our Error.
pub type Result<T> = std::result::Result<T, Error>;

// --- Bounded context errors ---

/// Failures reported by the completion backend.
#[derive(Debug, Clone, Error)]
pub enum BackendError {
    #[error("API request failed: {message} (status: {status_code})")]
    ApiError { status_code: u16, message: String },

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Rate limited by backend, retry after {retry_after_secs}s")]
    RateLimited { retry_after_secs: u64 },

    #[error("Model not found: {0}")]
    ModelNotFound(String),

    #[error("Request timed out: {0}")]
    Timeout(String),

    #[error("Network error: {0}")]
    Network(String),

    #[error("Backend returned an empty response")]
    EmptyResponse,
}

/// Failures at the tool boundary. All of these are contained by the
/// dispatcher and surfaced as comment items; none abort a run.
#[derive(Debug, Error)]
pub enum ToolError {
    #[error("Tool not found: {0}")]
    NotFound(String),

    #[error("Invalid tool arguments: {0}")]
    InvalidArguments(String),

    #[error("Tool execution failed: {tool_name} - {reason}")]
    ExecutionFailed { tool_name: String, reason: String },

    #[error("Tool cancelled: {0}")]
    Cancelled(String),
}

/// Shape/type validation failures for content items and component props.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Missing field '{field}' on {kind} item")]
    MissingField { kind: String, field: String },

    #[error("Blank content on {0} item")]
    EmptyContent(String),

    #[error("Unknown component: {0}")]
    UnknownComponent(String),

    #[error("Invalid props for component '{component}': {reason}")]
    InvalidProps { component: String, reason: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backend_error_displays_correctly() {
        let err = Error::Backend(BackendError::ApiError {
            status_code: 429,
            message: "Too many requests".into(),
        });
        assert!(err.to_string().contains("429"));
        assert!(err.to_string().contains("Too many requests"));
    }

    #[test]
    fn tool_error_displays_correctly() {
        let err = Error::Tool(ToolError::ExecutionFailed {
            tool_name: "web_search".into(),
            reason: "timeout".into(),
        });
        assert!(err.to_string().contains("web_search"));
        assert!(err.to_string().contains("timeout"));
    }

    #[test]
    fn content_error_displays_component_name() {
        let err = ContentError::InvalidProps {
            component: "WeatherCard".into(),
            reason: "missing 'location'".into(),
        };
        assert!(err.to_string().contains("WeatherCard"));
        assert!(err.to_string().contains("location"));
    }
}
