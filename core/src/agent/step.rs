use crate::agent::Context;
use crate::error::{BoxError, StepError, ToolError, from_anyhow};
use crate::registry::ToolResolver;
use crate::traits::Args;
use std::fmt;

pub type StepBody = Box<dyn Fn(&mut Context) -> anyhow::Result<()> + Send + Sync>;

/// Which context values a step hands to its tool.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum ToolArgs {
    /// Every non-reserved context value.
    #[default]
    Context,
    /// Only the listed keys, where present.
    Select(Vec<String>),
}

impl ToolArgs {
    fn collect(&self, context: &Context) -> Args {
        match self {
            Self::Context => context.user_values(),
            Self::Select(keys) => keys
                .iter()
                .filter_map(|key| context.get(key).map(|v| (key.clone(), v.clone())))
                .collect(),
        }
    }
}

/// One unit of an agent workflow, optionally backed by a tool.
pub struct Step {
    name: String,
    description: Option<String>,
    tool: Option<String>,
    tool_args: ToolArgs,
    body: Option<StepBody>,
}

impl Step {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            tool: None,
            tool_args: ToolArgs::default(),
            body: None,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_tool(mut self, tool: impl Into<String>) -> Self {
        self.tool = Some(tool.into());
        self
    }

    /// Pass only `keys` to the tool instead of the whole context.
    pub fn with_tool_args<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tool_args = ToolArgs::Select(keys.into_iter().map(Into::into).collect());
        self
    }

    pub fn with_body<F>(mut self, body: F) -> Self
    where
        F: Fn(&mut Context) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.body = Some(Box::new(body));
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn tool(&self) -> Option<&str> {
        self.tool.as_deref()
    }

    pub fn tool_args(&self) -> &ToolArgs {
        &self.tool_args
    }

    pub fn has_body(&self) -> bool {
        self.body.is_some()
    }

    /// Runs the step against `context`.
    ///
    /// A resolved tool is called first; its result lands under
    /// `_tool_result` and the instance stays reachable through
    /// [`Context::current_tool`] until the step returns. An unresolved tool
    /// is not an error by itself. Any failure from the tool or the body is
    /// returned as a [`StepError`] carrying the context at failure time.
    pub fn execute(&self, context: &mut Context, tools: &ToolResolver) -> Result<(), StepError> {
        tracing::info!(step = %self.name, "Running step {}...", self.name);
        context.enter_step(&self.name);

        let outcome = self.run(context, tools);
        let result = match outcome {
            Ok(()) => {
                tracing::info!(step = %self.name, "Step {} completed successfully", self.name);
                Ok(())
            }
            Err(source) => {
                tracing::error!(step = %self.name, "Step {} failed: {}", self.name, source);
                Err(StepError::new(&self.name, context.snapshot(), source))
            }
        };

        context.leave_step();
        result
    }

    fn run(&self, context: &mut Context, tools: &ToolResolver) -> Result<(), BoxError> {
        if let Some(tool_name) = &self.tool {
            match tools.resolve(tool_name) {
                Some(tool) => {
                    tracing::debug!("Using tool {} for step {}", tool_name, self.name);
                    let args = self.tool_args.collect(context);
                    tracing::debug!("Tool {} called with: {:?}", tool_name, args);
                    let result = tool
                        .call(&args)
                        .map_err(|e| ToolError::call_failed(tool_name, from_anyhow(e)))?;
                    tracing::debug!("Tool {} returned: {}", tool_name, result);
                    context.set_tool_result(result);
                    context.set_current_tool(tool_name, tool);
                }
                None => {
                    tracing::warn!(
                        "Tool {} is not registered; step {} runs without it",
                        tool_name,
                        self.name
                    );
                }
            }
        }

        match &self.body {
            Some(body) => {
                tracing::debug!("Executing body for step {}", self.name);
                body(context).map_err(from_anyhow)?;
            }
            None => tracing::debug!("No body provided for step {}", self.name),
        }
        Ok(())
    }
}

impl fmt::Debug for Step {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Step")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("tool", &self.tool)
            .field("tool_args", &self.tool_args)
            .field("body", &self.body.is_some())
            .finish()
    }
}
