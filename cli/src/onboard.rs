use anyhow::{Context, Result};
use aira_core::config::Config;
use console::style;
use dialoguer::{Input, Select};
use std::path::PathBuf;

const BANNER: &str = r"
    -----------------------------

         _    ___ ____      _
        / \  |_ _|  _ \    / \
       / _ \  | || |_) |  / _ \
      / ___ \ | ||  _ <  / ___ \
     /_/   \_\___|_| \_\/_/   \_\

    -----------------------------
";

const LOG_LEVELS: [&str; 5] = ["info", "debug", "trace", "warn", "error"];

fn print_step(step: usize, total: usize, title: &str) {
    println!();
    println!(
        "{}",
        style(format!("[{}/{}] {}", step, total, title))
            .cyan()
            .bold()
    );
    println!();
}

fn setup_workspace(default: &Config) -> Result<PathBuf> {
    let workspace: String = Input::new()
        .with_prompt("Workspace directory")
        .default(default.workspace_dir.display().to_string())
        .interact_text()
        .context("Failed to read workspace directory")?;

    if workspace.trim().is_empty() {
        anyhow::bail!("Workspace directory cannot be empty");
    }
    Ok(PathBuf::from(workspace.trim()))
}

fn setup_log_level() -> Result<String> {
    let selection = Select::new()
        .with_prompt("Select the log level")
        .items(&LOG_LEVELS[..])
        .default(0)
        .interact()
        .context("Failed to select log level")?;

    Ok(LOG_LEVELS[selection].to_string())
}

fn setup_poll_interval(default: u64) -> Result<u64> {
    Input::new()
        .with_prompt("Queue poll interval (ms)")
        .default(default)
        .interact_text()
        .context("Failed to read poll interval")
}

pub fn run_onboard() -> Result<Config> {
    println!("{}", style(BANNER).cyan().bold());

    println!("  {}", style("Welcome to Aira!").white().bold());
    println!(
        "  {}",
        style("This wizard writes the configuration your agents run with.").dim()
    );

    let defaults = Config::default();

    print_step(1, 3, "Workspace");
    let workspace_dir = setup_workspace(&defaults)?;

    print_step(2, 3, "Logging");
    let log_level = setup_log_level()?;

    print_step(3, 3, "Job Queues");
    let poll_interval_ms = setup_poll_interval(defaults.queue.poll_interval_ms)?;

    let mut config = Config {
        log_level,
        workspace_dir,
        ..defaults
    };
    config.queue.poll_interval_ms = poll_interval_ms;

    if let Err(e) = std::fs::create_dir_all(&config.workspace_dir) {
        eprintln!(
            "  {} Warning: Could not create workspace: {}",
            style("!").yellow(),
            e
        );
    } else {
        println!(
            "  {} Workspace ready at {}",
            style("✓").green(),
            style(config.workspace_dir.display()).cyan()
        );
    }

    println!();
    println!("  {} Configuration complete!", style("✓").green().bold());
    println!(
        "  {} Config saved to {}",
        style("→").green(),
        style(aira_core::config::get_config_path().display()).cyan()
    );
    println!(
        "  {} You can now run: {}",
        style("→").green(),
        style("aira agents").cyan().bold()
    );
    println!();

    Ok(config)
}
