use crate::content::ContentBlock;
use crate::schema::ToolSchema;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt::Display;
use thiserror::Error;

/// Untyped arguments as received from a caller.
pub type ArgumentBag = Map<String, Value>;

/// Arguments that passed schema validation, attributed to the tool they were validated for.
/// Only [`ToolSchema::validate`] builds these.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolArguments {
    tool_name: String,
    arguments: Map<String, Value>,
}

impl ToolArguments {
    pub(crate) fn new(tool_name: &str) -> Self {
        Self {
            tool_name: tool_name.to_string(),
            arguments: Map::new(),
        }
    }

    pub fn tool_name(&self) -> &str {
        &self.tool_name
    }

    pub(crate) fn insert(&mut self, key: &str, value: Value) {
        self.arguments.insert(key.to_string(), value);
    }

    pub fn get_argument<T>(&self, key: &str) -> Result<T, ToolError>
    where
        T: for<'de> Deserialize<'de>,
    {
        let value = self
            .arguments
            .get(key)
            .ok_or_else(|| ToolError::validation(&self.tool_name, key, "argument not found"))?;

        serde_json::from_value(value.clone())
            .map_err(|e| ToolError::validation(&self.tool_name, key, e.to_string()))
    }

    pub fn contains(&self, key: &str) -> bool {
        self.arguments.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.arguments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arguments.is_empty()
    }
}

/// Identity and input contract of a tool, as exposed for discovery.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ToolDefinition {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: ToolSchema,
}

impl ToolDefinition {
    pub fn new(name: &str, description: &str, input_schema: ToolSchema) -> Self {
        Self {
            name: name.to_string(),
            description: description.to_string(),
            input_schema,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
pub enum ToolError {
    #[error("Unknown tool: {0}")]
    UnknownTool(String),

    #[error("Tool '{tool_name}' rejected argument '{field}': {reason}")]
    Validation {
        tool_name: String,
        field: String,
        reason: String,
    },

    #[error("Tool '{tool_name}' failed: {message}")]
    Execution { tool_name: String, message: String },

    #[error("Tool '{tool_name}' was cancelled")]
    Cancelled { tool_name: String },
}

impl ToolError {
    pub fn validation(tool_name: &str, field: &str, reason: impl Into<String>) -> Self {
        ToolError::Validation {
            tool_name: tool_name.to_string(),
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// Wraps a lower-level fault and attributes it to `tool_name`.
    pub fn execution(tool_name: &str, cause: impl Display) -> Self {
        ToolError::Execution {
            tool_name: tool_name.to_string(),
            message: cause.to_string(),
        }
    }

    pub fn tool_name(&self) -> &str {
        match self {
            ToolError::UnknownTool(name) => name,
            ToolError::Validation { tool_name, .. }
            | ToolError::Execution { tool_name, .. }
            | ToolError::Cancelled { tool_name } => tool_name,
        }
    }

    /// True when the same call may succeed if simply retried.
    pub fn is_retryable(&self) -> bool {
        matches!(self, ToolError::Execution { .. } | ToolError::Cancelled { .. })
    }
}

/// A named, independently pluggable unit of work.
///
/// Implementors provide identity, a declared input schema and [`ToolHandler::run`].
/// Callers go through [`ToolHandler::execute`], which validates the raw argument
/// bag against [`ToolHandler::input_schema`] before `run` is reached, so a
/// handler's logic never sees input that failed validation.
///
/// Handlers are shared across concurrent calls and must not keep per-call
/// mutable state.
#[async_trait]
pub trait ToolHandler: Send + Sync {
    fn name(&self) -> &str;
    fn description(&self) -> &str;
    fn input_schema(&self) -> ToolSchema;

    fn get_schema(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.input_schema())
    }

    fn validate(&self, arguments: &ArgumentBag) -> Result<ToolArguments, ToolError> {
        self.input_schema().validate(self.name(), arguments)
    }

    async fn run(&self, arguments: ToolArguments) -> Result<Vec<ContentBlock>, ToolError>;

    async fn execute(&self, arguments: ArgumentBag) -> Result<Vec<ContentBlock>, ToolError> {
        let validated = self.validate(&arguments)?;
        self.run(validated).await
    }
}
