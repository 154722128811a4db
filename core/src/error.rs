//! Error kinds shared by every layer of the engine.
//!
//! Each boundary wraps the failure it caught into its own kind and keeps the
//! underlying error in a `#[source]` field, so `std::error::Error::source()` walks the
//! whole causal chain from an [`AgentError`] down to the fault that started it.

use crate::agent::context::ContextSnapshot;
use std::fmt;

pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Agent,
    Prompt,
    Tool,
    Step,
    Configuration,
    FileQueue,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Agent => "agent",
            Self::Prompt => "prompt",
            Self::Tool => "tool",
            Self::Step => "step",
            Self::Configuration => "configuration",
            Self::FileQueue => "file_queue",
        };
        f.write_str(name)
    }
}

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    Agent(#[from] AgentError),

    #[error(transparent)]
    Prompt(#[from] PromptError),

    #[error(transparent)]
    Tool(#[from] ToolError),

    #[error(transparent)]
    Step(#[from] StepError),

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),

    #[error(transparent)]
    FileQueue(#[from] FileQueueError),
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Self::Agent(_) => ErrorKind::Agent,
            Self::Prompt(_) => ErrorKind::Prompt,
            Self::Tool(_) => ErrorKind::Tool,
            Self::Step(_) => ErrorKind::Step,
            Self::Configuration(_) => ErrorKind::Configuration,
            Self::FileQueue(_) => ErrorKind::FileQueue,
        }
    }
}

/// The single failure kind surfaced by `Agent::run`.
#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct AgentError {
    agent: String,
    message: String,
    missing_inputs: Vec<String>,
    context: ContextSnapshot,
    #[source]
    source: Option<BoxError>,
}

impl AgentError {
    pub fn missing_inputs(
        agent: impl Into<String>,
        missing: Vec<String>,
        context: ContextSnapshot,
    ) -> Self {
        Self {
            agent: agent.into(),
            message: format!("Missing required inputs: {}", missing.join(", ")),
            missing_inputs: missing,
            context,
            source: None,
        }
    }

    pub fn failed(
        agent: impl Into<String>,
        context: ContextSnapshot,
        source: impl Into<BoxError>,
    ) -> Self {
        let agent = agent.into();
        let source = source.into();
        Self {
            message: format!("Agent {} failed: {}", agent, source),
            agent,
            missing_inputs: Vec::new(),
            context,
            source: Some(source),
        }
    }

    pub fn agent(&self) -> &str {
        &self.agent
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Required input keys that were absent, in declaration order.
    pub fn missing(&self) -> &[String] {
        &self.missing_inputs
    }

    pub fn context(&self) -> &ContextSnapshot {
        &self.context
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Failed to render prompt: {source}")]
pub struct PromptError {
    template: String,
    context: ContextSnapshot,
    #[source]
    source: BoxError,
}

impl PromptError {
    pub fn new(
        template: impl Into<String>,
        context: ContextSnapshot,
        source: impl Into<BoxError>,
    ) -> Self {
        Self {
            template: template.into(),
            context,
            source: source.into(),
        }
    }

    pub fn template(&self) -> &str {
        &self.template
    }

    pub fn context(&self) -> &ContextSnapshot {
        &self.context
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ToolError {
    tool: Option<String>,
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl ToolError {
    pub fn call_failed(tool: impl Into<String>, source: impl Into<BoxError>) -> Self {
        let tool = tool.into();
        let source = source.into();
        Self {
            message: format!("Tool {} failed: {}", tool, source),
            tool: Some(tool),
            source: Some(source),
        }
    }

    pub fn no_tool(step: &str) -> Self {
        Self {
            tool: None,
            message: format!("No tool resolved for step {}", step),
            source: None,
        }
    }

    pub fn tool(&self) -> Option<&str> {
        self.tool.as_deref()
    }
}

#[derive(Debug, thiserror::Error)]
#[error("Step {step} failed: {source}")]
pub struct StepError {
    step: String,
    context: ContextSnapshot,
    #[source]
    source: BoxError,
}

impl StepError {
    pub fn new(
        step: impl Into<String>,
        context: ContextSnapshot,
        source: impl Into<BoxError>,
    ) -> Self {
        Self {
            step: step.into(),
            context,
            source: source.into(),
        }
    }

    pub fn step(&self) -> &str {
        &self.step
    }

    /// Context values at the moment the step failed.
    pub fn context(&self) -> &ContextSnapshot {
        &self.context
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct ConfigurationError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl ConfigurationError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

#[derive(Debug, thiserror::Error)]
#[error("{message}")]
pub struct FileQueueError {
    message: String,
    #[source]
    source: Option<BoxError>,
}

impl FileQueueError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    pub fn with_source(message: impl Into<String>, source: impl Into<BoxError>) -> Self {
        Self {
            message: message.into(),
            source: Some(source.into()),
        }
    }
}

/// Every link of the cause chain, starting with `err` itself.
pub fn causes<'a>(
    err: &'a (dyn std::error::Error + 'static),
) -> impl Iterator<Item = &'a (dyn std::error::Error + 'static)> {
    std::iter::successors(Some(err), |e| e.source())
}

/// Boxes an error raised by tool, step or hook code so that the error it
/// was created from stays downcastable at the end of the cause chain.
pub fn from_anyhow(err: anyhow::Error) -> BoxError {
    err.reallocate_into_boxed_dyn_error_without_backtrace()
}

/// The innermost error of the chain.
pub fn root_cause<'a>(err: &'a (dyn std::error::Error + 'static)) -> &'a (dyn std::error::Error + 'static) {
    causes(err).last().unwrap_or(err)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, thiserror::Error)]
    #[error("disk on fire")]
    struct Origin;

    #[test]
    fn missing_inputs_message_lists_every_key() {
        let err = AgentError::missing_inputs(
            "fetcher",
            vec!["url".into(), "depth".into()],
            ContextSnapshot::new(),
        );
        assert_eq!(err.to_string(), "Missing required inputs: url, depth");
        assert_eq!(err.missing(), ["url", "depth"]);
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn chain_reaches_origin() {
        let step = StepError::new("convert", ContextSnapshot::new(), Origin);
        let agent = AgentError::failed("fetcher", ContextSnapshot::new(), step);

        assert_eq!(
            agent.to_string(),
            "Agent fetcher failed: Step convert failed: disk on fire"
        );
        assert_eq!(causes(&agent).count(), 3);
        let root = root_cause(&agent);
        assert!(root.downcast_ref::<Origin>().is_some());
    }

    #[test]
    fn anyhow_origin_stays_downcastable() {
        let body_err: anyhow::Error = Origin.into();
        let step = StepError::new("convert", ContextSnapshot::new(), from_anyhow(body_err));

        assert_eq!(causes(&step).count(), 2);
        assert!(root_cause(&step).downcast_ref::<Origin>().is_some());
    }

    #[test]
    fn anyhow_context_keeps_inner_error() {
        use anyhow::Context as _;

        let body_err = Err::<(), _>(Origin).context("writing report").unwrap_err();
        let step = StepError::new("write", ContextSnapshot::new(), from_anyhow(body_err));

        assert_eq!(step.to_string(), "Step write failed: writing report");
        assert!(root_cause(&step).downcast_ref::<Origin>().is_some());
    }

    #[test]
    fn kind_of_wrapped_error() {
        let err: Error = ConfigurationError::new("Cannot register nil agent: x").into();
        assert_eq!(err.kind(), ErrorKind::Configuration);
        assert_eq!(err.to_string(), "Cannot register nil agent: x");
    }

    #[test]
    fn tool_error_names_tool() {
        let err = ToolError::call_failed("file_tool", Origin);
        assert_eq!(err.tool(), Some("file_tool"));
        assert_eq!(err.to_string(), "Tool file_tool failed: disk on fire");
    }
}
