use log::info;
use std::time::Duration;
use toolforge_core::Config;
use tooling::{RegistryError, StubTool, ToolRegistry, ToolService, WeatherTool};

/// Builds the registry described by `config` and freezes it for serving.
pub fn build_service(config: &Config) -> Result<ToolService, RegistryError> {
    let mut registry = ToolRegistry::with_config(config.registry.clone());

    if config.tools.with_examples {
        let mut weather = WeatherTool::new();
        if let Some(endpoint) = &config.tools.weather_endpoint {
            weather = weather.with_endpoint(endpoint.as_str());
        }
        if let Some(secs) = config.tools.weather_timeout_secs {
            weather = weather.with_timeout(Duration::from_secs(secs));
        }
        registry.register_tool(weather)?;
    }

    for stub in &config.tools.stub {
        registry.register_tool(StubTool::scaffolded(&stub.name, stub.description.as_str()))?;
    }

    info!("Registered {} tools", registry.tool_count());
    Ok(registry.freeze())
}
