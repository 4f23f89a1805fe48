pub mod content;
pub mod naming;
pub mod registry;
pub mod schema;
pub mod stub;
pub mod tool;
pub mod weather;

pub use content::ContentBlock;
pub use naming::format_tool_name;
pub use registry::{RegistryError, SharedTool, ToolRegistry, ToolService};
pub use schema::{FieldType, SchemaField, ToolSchema};
pub use stub::StubTool;
pub use tool::{ArgumentBag, ToolArguments, ToolDefinition, ToolError, ToolHandler};
pub use weather::{WeatherTool, WEATHER_TOOL_NAME};
