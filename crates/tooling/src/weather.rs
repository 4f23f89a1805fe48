use crate::content::ContentBlock;
use crate::schema::{FieldType, ToolSchema};
use crate::tool::{ToolArguments, ToolError, ToolHandler};
use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

pub const WEATHER_TOOL_NAME: &str = "get_weather";

const CANNED_TEMPERATURE_C: f64 = 20.0;

#[derive(Debug, Deserialize)]
struct CurrentWeatherResponse {
    current: CurrentConditions,
}

#[derive(Debug, Deserialize)]
struct CurrentConditions {
    temp_c: f64,
}

/// Example tool reporting the current temperature for a city.
///
/// Without an endpoint it answers with canned data. With one it queries a
/// WeatherAPI-compatible `/v1/current.json` through a shared HTTP client.
#[derive(Debug, Clone)]
pub struct WeatherTool {
    endpoint: Option<String>,
    timeout: Duration,
    client: Client,
}

impl WeatherTool {
    pub fn new() -> Self {
        Self {
            endpoint: None,
            timeout: Duration::from_secs(10),
            client: Client::new(),
        }
    }

    pub fn with_endpoint(mut self, endpoint: impl Into<String>) -> Self {
        self.endpoint = Some(endpoint.into().trim_end_matches('/').to_string());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    async fn current_temperature(&self, city: &str, api_key: &str) -> Result<f64, ToolError> {
        let Some(endpoint) = &self.endpoint else {
            return Ok(CANNED_TEMPERATURE_C);
        };

        debug!(city, endpoint = %endpoint, "Requesting current weather");

        let response = self
            .client
            .get(format!("{endpoint}/v1/current.json"))
            .query(&[("q", city), ("key", api_key)])
            .timeout(self.timeout)
            .send()
            .await
            .map_err(|e| {
                ToolError::execution(self.name(), format!("Weather API unreachable: {e}"))
            })?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();
            return Err(ToolError::execution(
                self.name(),
                format!("Weather API returned error {status}: {error_text}"),
            ));
        }

        let weather: CurrentWeatherResponse = response.json().await.map_err(|e| {
            ToolError::execution(self.name(), format!("Failed to parse Weather API response: {e}"))
        })?;

        Ok(weather.current.temp_c)
    }
}

impl Default for WeatherTool {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ToolHandler for WeatherTool {
    fn name(&self) -> &str {
        WEATHER_TOOL_NAME
    }

    fn description(&self) -> &str {
        "Get current weather for a location"
    }

    fn input_schema(&self) -> ToolSchema {
        ToolSchema::new()
            .required("city", FieldType::String, "The city to get weather for")
            .required("api_key", FieldType::String, "Your WeatherAPI API key")
    }

    async fn run(&self, arguments: ToolArguments) -> Result<Vec<ContentBlock>, ToolError> {
        let city: String = arguments.get_argument("city")?;
        let api_key: String = arguments.get_argument("api_key")?;

        let temperature = self.current_temperature(&city, &api_key).await?;

        Ok(vec![ContentBlock::text(format!(
            "Current weather in {city}: {temperature}°C"
        ))])
    }
}
