use crate::config::{DEFAULT_WEATHER_URL, WeatherConfig};
use crate::tools::extract_number_arg;
use crate::traits::{Args, ParameterSpec, Tool};
use reqwest::blocking::Client;
use serde_json::Value;
use std::time::Duration;

const CURRENT_FIELDS: &str = "temperature_2m,wind_speed_10m";

/// Current conditions from an Open-Meteo compatible forecast API.
pub struct WeatherTool {
    client: Client,
    base_url: String,
}

impl WeatherTool {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .unwrap_or_else(|e| {
                tracing::warn!("Failed to build HTTP client, using defaults: {}", e);
                Client::new()
            });
        Self {
            client,
            base_url: base_url.into(),
        }
    }

    pub fn from_config(config: &WeatherConfig) -> Self {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn request_url(&self, latitude: f64, longitude: f64) -> String {
        format!(
            "{}?latitude={}&longitude={}&current={}",
            self.base_url.trim_end_matches('/'),
            latitude,
            longitude,
            CURRENT_FIELDS
        )
    }
}

impl Default for WeatherTool {
    fn default() -> Self {
        Self::new(DEFAULT_WEATHER_URL, Duration::from_secs(30))
    }
}

impl Tool for WeatherTool {
    fn description(&self) -> &str {
        "Get current weather information for a location"
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::required("latitude", "Latitude of the location").with_type("number"),
            ParameterSpec::required("longitude", "Longitude of the location").with_type("number"),
        ]
    }

    fn call(&self, args: &Args) -> anyhow::Result<Value> {
        let latitude = extract_number_arg(args, "latitude")?;
        let longitude = extract_number_arg(args, "longitude")?;
        let url = self.request_url(latitude, longitude);
        tracing::debug!(url = %url, "Fetching weather");

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| anyhow::anyhow!("Weather request failed: {}", e))?;

        let status = response.status();
        if !status.is_success() {
            anyhow::bail!("Weather API returned status {}", status);
        }

        response
            .json::<Value>()
            .map_err(|e| anyhow::anyhow!("Failed to parse weather response: {}", e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn request_url_includes_coordinates() {
        let tool = WeatherTool::new("http://localhost:9999/v1/forecast/", Duration::from_secs(1));
        assert_eq!(
            tool.request_url(52.52, 13.41),
            "http://localhost:9999/v1/forecast?latitude=52.52&longitude=13.41&current=temperature_2m,wind_speed_10m"
        );
    }

    #[test]
    fn declares_numeric_coordinates() {
        let schema = WeatherTool::default().parameters_schema();
        assert_eq!(schema["properties"]["latitude"]["type"], "number");
        assert_eq!(schema["required"], json!(["latitude", "longitude"]));
    }

    #[test]
    fn missing_coordinates_fail_before_request() {
        let tool = WeatherTool::new("http://127.0.0.1:1", Duration::from_millis(50));
        let args = json!({"latitude": 52.52}).as_object().cloned().unwrap();
        let err = tool.call(&args).unwrap_err();
        assert_eq!(err.to_string(), "Missing 'longitude' parameter");
    }

    #[test]
    fn from_config_uses_base_url() {
        let config = WeatherConfig {
            base_url: "http://weather.internal/forecast".into(),
            timeout_secs: 5,
        };
        assert_eq!(
            WeatherTool::from_config(&config).base_url(),
            "http://weather.internal/forecast"
        );
    }
}
