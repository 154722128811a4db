use aira_core::agent::Context;
use aira_core::config::{self, Config};
use aira_core::{DirectoryQueue, Runtime};
use anyhow::Result;
use clap::{Parser, Subcommand};
use serde_json::Value;
use std::ops::ControlFlow;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod agents;
mod onboard;

#[derive(Parser)]
#[command(name = "aira")]
#[command(about = "aira - Declarative agent workflows", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Write the configuration file
    Init,
    /// List registered agents
    Agents,
    /// List registered tools and their parameters
    Tools,
    /// Run an agent once with the given inputs
    Run {
        agent: String,
        /// Input as key=value; values are parsed as JSON, falling back to text
        #[arg(short, long = "input", value_name = "KEY=VALUE")]
        inputs: Vec<String>,
    },
    /// Put a job into an agent's source queue
    Enqueue {
        agent: String,
        /// JSON object with the agent's inputs
        payload: String,
    },
    /// Process jobs from an agent's source queue
    Serve {
        agent: String,
        /// Drain the queue and exit instead of polling
        #[arg(long)]
        once: bool,
    },
}

fn main() {
    if let Err(e) = run() {
        eprintln!("❌ Error: {}", e);
        let root = e.root_cause();
        if root.to_string() != e.to_string() {
            eprintln!("   Caused by: {}", root);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let command = cli.command.unwrap_or_else(|| {
        if !config::config_exists() {
            Commands::Init
        } else {
            Commands::Agents
        }
    });

    match command {
        Commands::Init => {
            let onboard_config = onboard::run_onboard()
                .map_err(|e| anyhow::anyhow!("Onboarding failed: {}", e))?;
            config::save_config(&onboard_config)?;
        }
        Commands::Agents => {
            let (_, runtime) = setup()?;
            for name in runtime.agents().available_names() {
                let Some(definition) = runtime.agents().get(&name) else {
                    continue;
                };
                println!("{:<20} {}", name, definition.description().unwrap_or_default());
                for input in definition.inputs() {
                    let marker = if input.required { "*" } else { " " };
                    println!("    {}{:<12} {}", marker, input.name, input.kind);
                }
            }
        }
        Commands::Tools => {
            let (_, runtime) = setup()?;
            for descriptor in runtime.tools().descriptors() {
                println!("{:<20} {}", descriptor.name, descriptor.description);
                for param in &descriptor.parameters {
                    let marker = if param.required { "*" } else { " " };
                    println!("    {}{:<12} {:<8} {}", marker, param.name, param.kind, param.description);
                }
            }
        }
        Commands::Run { agent, inputs } => {
            let (_, runtime) = setup()?;
            let context = parse_inputs(&inputs)?;
            let result = runtime.run(&agent, context)?;
            println!("{}", serde_json::to_string_pretty(&result.user_values())?);
        }
        Commands::Enqueue { agent, payload } => {
            let (config, runtime) = setup()?;
            let queue = source_queue(&runtime, &config, &agent)?;
            let data = parse_payload(&payload)?;
            let path = queue.enqueue(&data, None)?;
            println!("Enqueued {}", path.display());
        }
        Commands::Serve { agent, once } => {
            let (config, runtime) = setup()?;
            serve(&runtime, &config, &agent, once)?;
        }
    }

    Ok(())
}

fn setup() -> Result<(Config, Runtime)> {
    let config = Config::load_or_init()?;
    init_tracing(&config);

    let runtime = Runtime::with_builtin_tools(&config)?;
    agents::register_demo_agents(&runtime)?;
    Ok((config, runtime))
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("aira_core={0},aira={0}", config.log_level)));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Queue jobs become agent inputs, so only JSON objects are accepted.
fn parse_payload(raw: &str) -> Result<Value> {
    match serde_json::from_str(raw) {
        Ok(value @ Value::Object(_)) => Ok(value),
        Ok(_) => anyhow::bail!("Payload must be a JSON object with the agent's inputs"),
        Err(e) => anyhow::bail!("Payload is not valid JSON: {}", e),
    }
}

fn parse_inputs(inputs: &[String]) -> Result<Context> {
    inputs
        .iter()
        .map(|pair| {
            let (key, value) = pair
                .split_once('=')
                .ok_or_else(|| anyhow::anyhow!("Invalid input '{}', expected key=value", pair))?;
            Ok((key.trim().to_string(), parse_value(value)))
        })
        .collect()
}

fn agent_directory(config: &Config, dir: &str) -> PathBuf {
    config.workspace_dir.join(dir)
}

fn source_queue(runtime: &Runtime, config: &Config, agent: &str) -> Result<DirectoryQueue> {
    let definition = runtime
        .agents()
        .get(agent)
        .ok_or_else(|| anyhow::anyhow!("Unknown agent: {}", agent))?;
    let dir = definition
        .source_directory()
        .ok_or_else(|| anyhow::anyhow!("Agent {} has no source directory", agent))?;
    Ok(DirectoryQueue::new(agent_directory(config, dir))?.with_pattern(&config.queue.pattern)?)
}

fn output_queue(runtime: &Runtime, config: &Config, agent: &str) -> Result<Option<DirectoryQueue>> {
    let Some(definition) = runtime.agents().get(agent) else {
        return Ok(None);
    };
    match definition.output_directory() {
        Some(dir) => Ok(Some(DirectoryQueue::new(agent_directory(config, dir))?)),
        None => Ok(None),
    }
}

fn serve(runtime: &Runtime, config: &Config, agent: &str, once: bool) -> Result<()> {
    let source = source_queue(runtime, config, agent)?;
    let output = output_queue(runtime, config, agent)?;

    let handle = |item: Value| {
        let Value::Object(inputs) = item else {
            tracing::warn!(agent = %agent, "Skipping job that is not a JSON object");
            return;
        };
        match runtime.run(agent, inputs) {
            Ok(result) => {
                if let Some(output) = &output {
                    match output.enqueue(&Value::Object(result.user_values()), None) {
                        Ok(path) => tracing::info!("Wrote result to {}", path.display()),
                        Err(e) => tracing::error!("Failed to write result: {}", e),
                    }
                }
            }
            Err(e) => tracing::error!(agent = %agent, "Job failed: {}", e),
        }
    };

    if once {
        let mut processed = 0;
        while let Some(item) = source.dequeue()? {
            handle(item);
            processed += 1;
        }
        println!("Processed {} job(s)", processed);
        return Ok(());
    }

    source.watch(config.queue.poll_interval(), |item| {
        handle(item);
        ControlFlow::Continue(())
    })?;
    Ok(())
}
