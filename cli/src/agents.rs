use aira_core::agent::{AgentBuilder, Context, Step, ValueType};
use aira_core::Runtime;
use serde_json::Value;

pub fn register_demo_agents(runtime: &Runtime) -> aira_core::Result<()> {
    runtime.define(weather_reporter())?;
    runtime.define(web_extractor())?;
    Ok(())
}

fn weather_reporter() -> AgentBuilder {
    AgentBuilder::new("weather_reporter")
        .description("Get weather information for a location and generate a report")
        .input("latitude", ValueType::Float, true)
        .input("longitude", ValueType::Float, true)
        .output("weather_report", ValueType::String)
        .prompt("Generate a weather report for the given location.")
        .tools(["weather_tool"])
        .source_directory("jobs/weather")
        .output_directory("results/weather")
        .steps(|s| {
            s.step(
                Step::new("fetch_weather")
                    .with_description("Fetch weather data for the specified coordinates")
                    .with_tool("weather_tool")
                    .with_tool_args(["latitude", "longitude"])
                    .with_body(|ctx| {
                        let data = ctx
                            .tool_result()
                            .cloned()
                            .ok_or_else(|| anyhow::anyhow!("Weather tool returned nothing"))?;
                        ctx.insert("weather_data", data);
                        Ok(())
                    }),
            )
            .step(
                Step::new("generate_report")
                    .with_description("Generate a weather report based on the fetched data")
                    .with_body(|ctx| {
                        let report = weather_report(ctx);
                        ctx.insert("weather_report", report);
                        Ok(())
                    }),
            );
        })
        .review(|ctx| {
            let report = ctx.get_str("weather_report").unwrap_or_default();
            anyhow::ensure!(!report.is_empty(), "Weather report is empty");
            anyhow::ensure!(report.lines().count() >= 5, "Weather report is too short");
            Ok(())
        })
}

fn weather_report(ctx: &Context) -> String {
    let field = |key: &str| {
        ctx.get("weather_data")
            .and_then(|data| data.get("current"))
            .and_then(|current| current.get(key))
            .map(display_value)
            .unwrap_or_else(|| "n/a".to_string())
    };
    let coordinate = |key: &str| ctx.get(key).map(display_value).unwrap_or_default();

    format!(
        "# Weather Report\n\n## Current Conditions\n\n**Location**: {}, {}\n\n**Temperature**: {}°C\n\n**Wind Speed**: {} km/h\n",
        coordinate("latitude"),
        coordinate("longitude"),
        field("temperature_2m"),
        field("wind_speed_10m"),
    )
}

fn web_extractor() -> AgentBuilder {
    AgentBuilder::new("web_extractor")
        .description("Extract main content and comments from a webpage and save as markdown.")
        .input("url", ValueType::String, true)
        .output("markdown_file", ValueType::String)
        .prompt(
            "Given the URL {{ url }}, extract the main content and any user comments.\n\
             Return the result as a markdown document.",
        )
        .tools(["web_browser", "markdown_converter"])
        .source_directory("jobs/web_extraction")
        .output_directory("results/web_extraction")
        .steps(|s| {
            s.step(
                Step::new("fetch_content")
                    .with_tool("web_browser")
                    .with_body(|ctx| {
                        tracing::info!("Fetching content from {}", ctx.get_str("url").unwrap_or_default());
                        ctx.insert(
                            "html_content",
                            "<html><body><h1>Example Page</h1><p>This is sample content.</p></body></html>",
                        );
                        Ok(())
                    }),
            )
            .step(
                Step::new("convert_to_markdown")
                    .with_tool("markdown_converter")
                    .with_body(|ctx| {
                        ctx.insert("markdown_content", "# Example Page\n\nThis is sample content.");
                        let url = ctx
                            .get_str("url")
                            .ok_or_else(|| anyhow::anyhow!("url is not a string"))?;
                        let file = format!("{}.md", slug(url));
                        ctx.insert("markdown_file", file);
                        Ok(())
                    }),
            );
        })
        .loop_hook(|ctx| {
            anyhow::ensure!(
                ctx.contains_key("markdown_file"),
                "Extraction did not produce a markdown file"
            );
            Ok(())
        })
        .review(|ctx| {
            tracing::info!(
                "Extraction successful: {}",
                ctx.get_str("markdown_file").unwrap_or_default()
            );
            Ok(())
        })
}

fn slug(url: &str) -> String {
    url.chars()
        .map(|c| if c.is_alphanumeric() || c == '_' { c } else { '_' })
        .collect()
}

fn display_value(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}
