pub mod agents;
pub mod resolver;
pub mod tools;

pub use agents::Registry;
pub use resolver::ToolResolver;
pub use tools::{ToolRegistry, ToolType};

use crate::error::ConfigurationError;

/// Canonical registry key: surrounding whitespace and one leading `:` are
/// ignored, so `":fetch"` and `"fetch"` address the same entry.
pub fn normalize_name(name: &str) -> Result<String, ConfigurationError> {
    let trimmed = name.trim();
    let trimmed = trimmed.strip_prefix(':').unwrap_or(trimmed).trim();
    if trimmed.is_empty() {
        return Err(ConfigurationError::new(format!(
            "Invalid registry name: {:?}",
            name
        )));
    }
    Ok(trimmed.to_string())
}

fn lookup_key(name: &str) -> String {
    let trimmed = name.trim();
    trimmed.strip_prefix(':').unwrap_or(trimmed).trim().to_string()
}
