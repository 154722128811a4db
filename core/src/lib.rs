pub mod agent;
pub mod config;
pub mod error;
pub mod prompt;
pub mod queue;
pub mod registry;
pub mod runtime;
pub mod tools;
pub mod traits;

pub use agent::{Agent, AgentBuilder, AgentDefinition, Context, Step, ValueType};
pub use config::Config;
pub use error::{Error, ErrorKind, Result};
pub use prompt::PromptEngine;
pub use queue::DirectoryQueue;
pub use registry::{Registry, ToolRegistry, ToolResolver, ToolType};
pub use runtime::Runtime;
pub use traits::*;
