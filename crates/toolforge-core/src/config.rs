use crate::CollisionPolicy;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub registry: RegistryConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "ServerConfig::default_host")]
    pub host: String,
    #[serde(default = "ServerConfig::default_port")]
    pub port: u16,
}

impl ServerConfig {
    fn default_host() -> String {
        "127.0.0.1".to_string()
    }

    fn default_port() -> u16 {
        8080
    }

    pub fn with_env_overrides(&self) -> anyhow::Result<Self> {
        self.with_overrides(env::var("HOST").ok(), env::var("PORT").ok())
    }

    pub fn with_overrides(
        &self,
        host: Option<String>,
        port: Option<String>,
    ) -> anyhow::Result<Self> {
        let host = host.unwrap_or_else(|| self.host.clone());
        let port = match port {
            Some(raw) => raw
                .trim()
                .parse::<u16>()
                .with_context(|| format!("Invalid port '{raw}'"))?,
            None => self.port,
        };
        Ok(Self { host, port })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: Self::default_host(),
            port: Self::default_port(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub collision: CollisionPolicy,
    /// Upper bound on executions in flight across the whole service. `None` means unbounded.
    #[serde(default)]
    pub max_concurrent_calls: Option<usize>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ToolsConfig {
    #[serde(default)]
    pub with_examples: bool,
    #[serde(default)]
    pub weather_endpoint: Option<String>,
    /// Per-request timeout for the weather tool. Unset keeps the tool's own default.
    #[serde(default)]
    pub weather_timeout_secs: Option<u64>,
    #[serde(default)]
    pub stub: Vec<StubToolConfig>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StubToolConfig {
    pub name: String,
    #[serde(default = "StubToolConfig::default_description")]
    pub description: String,
}

impl StubToolConfig {
    fn default_description() -> String {
        "A custom MCP tool".to_string()
    }
}

impl Config {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))?;
        Ok(config)
    }

    pub fn load_from_env() -> anyhow::Result<Self> {
        let config_path = env::var("CONFIG_PATH").unwrap_or_else(|_| Self::default_config_path());
        Self::load(Path::new(&config_path))
    }

    pub fn default_config_path() -> String {
        "./toolforge.toml".to_string()
    }
}
