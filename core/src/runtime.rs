//! Process-wide entry point owning the agent and tool registries.

use crate::agent::{Agent, AgentBuilder, AgentDefinition, Context};
use crate::config::Config;
use crate::error::{ConfigurationError, Result};
use crate::registry::{Registry, ToolRegistry, ToolResolver};
use crate::tools::register_builtin_tools;
use std::sync::Arc;

/// Holds the registries a host builds once at startup and hands out
/// [`Agent`]s bound to them.
#[derive(Clone, Default)]
pub struct Runtime {
    agents: Registry,
    tools: ToolRegistry,
}

impl Runtime {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_builtin_tools(config: &Config) -> Result<Self> {
        let runtime = Self::new();
        register_builtin_tools(&runtime.tools, config)?;
        Ok(runtime)
    }

    pub fn agents(&self) -> &Registry {
        &self.agents
    }

    pub fn tools(&self) -> &ToolRegistry {
        &self.tools
    }

    pub fn resolver(&self) -> ToolResolver {
        ToolResolver::new(self.tools.clone())
    }

    pub fn define(&self, builder: AgentBuilder) -> Result<Arc<AgentDefinition>> {
        Ok(builder.register(&self.agents)?)
    }

    pub fn agent(&self, name: &str) -> Option<Agent> {
        self.agents
            .get(name)
            .map(|definition| Agent::new(definition, self.resolver()))
    }

    pub fn run(&self, name: &str, inputs: impl Into<Context>) -> Result<Context> {
        let agent = self
            .agent(name)
            .ok_or_else(|| ConfigurationError::new(format!("Unknown agent: {}", name)))?;
        Ok(agent.run(inputs)?)
    }
}
