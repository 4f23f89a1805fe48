use serde::{Deserialize, Serialize};

pub mod config;

pub use config::{Config, RegistryConfig, ServerConfig, StubToolConfig, ToolsConfig};

/// What happens when a tool is registered under a name that is already taken.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CollisionPolicy {
    /// The new handler replaces the old one and keeps its listing position.
    #[default]
    Replace,
    /// Registration fails and the existing handler stays in place.
    Reject,
}
