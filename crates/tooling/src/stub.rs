use crate::content::ContentBlock;
use crate::naming::format_tool_name;
use crate::schema::{FieldType, ToolSchema};
use crate::tool::{ToolArguments, ToolError, ToolHandler};
use async_trait::async_trait;

/// The handler a freshly added tool starts out as: it takes one string
/// `parameter` and greets back with it.
#[derive(Debug, Clone)]
pub struct StubTool {
    name: String,
    description: String,
}

impl StubTool {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
        }
    }

    /// Builds a stub from a raw, user-typed name using the generated-tool naming rule.
    pub fn scaffolded(raw_name: &str, description: impl Into<String>) -> Self {
        Self::new(format_tool_name(raw_name), description)
    }
}

#[async_trait]
impl ToolHandler for StubTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        &self.description
    }

    fn input_schema(&self) -> ToolSchema {
        ToolSchema::new().required(
            "parameter",
            FieldType::String,
            "Description of the parameter",
        )
    }

    async fn run(&self, arguments: ToolArguments) -> Result<Vec<ContentBlock>, ToolError> {
        let parameter: String = arguments.get_argument("parameter")?;

        Ok(vec![ContentBlock::text(format!(
            "Hello from {}! Parameter: {}",
            self.name, parameter
        ))])
    }
}
