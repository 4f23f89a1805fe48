use axum::http::StatusCode;
use axum::response::{IntoResponse, Json, Response};
use serde_json::{json, Value};
use thiserror::Error;
use tooling::ToolError;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("{0}")]
    Tool(#[from] ToolError),

    #[error("Invalid request: {0}")]
    InvalidRequest(String),
}

impl ApiError {
    /// Returns the appropriate HTTP status code for this error
    pub fn http_status_code(&self) -> u16 {
        match self {
            ApiError::Tool(ToolError::UnknownTool(_)) => 404,     // Not Found
            ApiError::Tool(ToolError::Validation { .. }) => 422,  // Unprocessable Entity
            ApiError::Tool(ToolError::Execution { .. }) => 502,   // Bad Gateway
            ApiError::Tool(ToolError::Cancelled { .. }) => 503,   // Service Unavailable
            ApiError::InvalidRequest(_) => 400,                   // Bad Request
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            ApiError::Tool(ToolError::UnknownTool(_)) => "unknown_tool",
            ApiError::Tool(ToolError::Validation { .. }) => "validation",
            ApiError::Tool(ToolError::Execution { .. }) => "execution",
            ApiError::Tool(ToolError::Cancelled { .. }) => "cancelled",
            ApiError::InvalidRequest(_) => "invalid_request",
        }
    }

    /// Returns true if the error is potentially recoverable with a retry
    pub fn is_retryable(&self) -> bool {
        match self {
            ApiError::Tool(error) => error.is_retryable(),
            ApiError::InvalidRequest(_) => false,
        }
    }

    pub fn tool_name(&self) -> Option<&str> {
        match self {
            ApiError::Tool(error) => Some(error.tool_name()),
            ApiError::InvalidRequest(_) => None,
        }
    }

    pub fn to_body(&self) -> Value {
        json!({
            "error": self.to_string(),
            "kind": self.kind(),
            "tool": self.tool_name(),
            "retryable": self.is_retryable()
        })
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = StatusCode::from_u16(self.http_status_code())
            .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self.to_body())).into_response()
    }
}
