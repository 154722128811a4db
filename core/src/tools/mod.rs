use crate::config::Config;
use crate::error::ConfigurationError;
use crate::registry::{ToolRegistry, ToolType};
use crate::traits::Args;

pub mod file_tool;
pub mod weather_tool;

pub use file_tool::FileTool;
pub use weather_tool::WeatherTool;

/// Registers `file_tool` and `weather_tool`, configured from `config`.
pub fn register_builtin_tools(
    registry: &ToolRegistry,
    config: &Config,
) -> Result<(), ConfigurationError> {
    registry.register("file_tool", ToolType::of::<FileTool>())?;

    let weather = config.weather.clone();
    registry.register(
        "weather_tool",
        ToolType::from_fn(move || WeatherTool::from_config(&weather)),
    )?;

    tracing::info!("Registered {} tools", registry.len());
    Ok(())
}

pub fn extract_string_arg(args: &Args, key: &str) -> anyhow::Result<String> {
    args.get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| anyhow::anyhow!("Missing '{}' parameter", key))
        .map(|s| s.to_string())
}

pub fn extract_string_arg_opt(args: &Args, key: &str) -> Option<String> {
    args.get(key).and_then(|v| v.as_str()).map(|s| s.to_string())
}

/// Accepts numbers and numeric strings.
pub fn extract_number_arg(args: &Args, key: &str) -> anyhow::Result<f64> {
    let value = args
        .get(key)
        .ok_or_else(|| anyhow::anyhow!("Missing '{}' parameter", key))?;

    value
        .as_f64()
        .or_else(|| value.as_str().and_then(|s| s.trim().parse().ok()))
        .ok_or_else(|| anyhow::anyhow!("Parameter '{}' must be a number", key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn args(value: serde_json::Value) -> Args {
        value.as_object().cloned().unwrap()
    }

    #[test]
    fn string_args() {
        let args = args(json!({"path": "a.txt", "n": 1}));
        assert_eq!(extract_string_arg(&args, "path").unwrap(), "a.txt");
        assert!(extract_string_arg(&args, "n").is_err());
        assert_eq!(extract_string_arg_opt(&args, "content"), None);
    }

    #[test]
    fn number_args() {
        let args = args(json!({"lat": 52.52, "lon": "13.405", "bad": "north"}));
        assert_eq!(extract_number_arg(&args, "lat").unwrap(), 52.52);
        assert_eq!(extract_number_arg(&args, "lon").unwrap(), 13.405);
        assert!(extract_number_arg(&args, "bad").is_err());
        assert!(extract_number_arg(&args, "missing").is_err());
    }
}
