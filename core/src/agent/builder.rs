use crate::agent::definition::{InputSpec, OutputSpec};
use crate::agent::{AgentDefinition, Context, Step, ValueType};
use crate::error::ConfigurationError;
use crate::registry::Registry;
use std::sync::Arc;

/// Fluent construction of an [`AgentDefinition`].
///
/// ```
/// use aira_core::agent::{AgentBuilder, Step, ValueType};
///
/// let definition = AgentBuilder::new("web_extractor")
///     .description("Extract main content from a webpage")
///     .input("url", ValueType::String, true)
///     .output("markdown_file", ValueType::String)
///     .prompt("Given the URL {{ url }}, extract the main content.")
///     .tools(["web_browser"])
///     .steps(|s| {
///         s.step(Step::new("fetch_content").with_tool("web_browser"));
///     })
///     .build();
///
/// assert_eq!(definition.steps().len(), 1);
/// ```
///
/// No cross-field checks happen here; inputs are validated when the agent
/// runs.
pub struct AgentBuilder {
    definition: AgentDefinition,
}

impl AgentBuilder {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            definition: AgentDefinition::empty(name.into()),
        }
    }

    pub fn description(mut self, text: impl Into<String>) -> Self {
        self.definition.description = Some(text.into());
        self
    }

    /// Declares an input; re-declaring a name replaces it in place.
    pub fn input(mut self, name: impl Into<String>, kind: ValueType, required: bool) -> Self {
        let spec = InputSpec {
            name: name.into(),
            kind,
            required,
        };
        let inputs = &mut self.definition.inputs;
        match inputs.iter_mut().find(|i| i.name == spec.name) {
            Some(existing) => *existing = spec,
            None => inputs.push(spec),
        }
        self
    }

    pub fn output(mut self, name: impl Into<String>, kind: ValueType) -> Self {
        let spec = OutputSpec {
            name: name.into(),
            kind,
        };
        let outputs = &mut self.definition.outputs;
        match outputs.iter_mut().find(|o| o.name == spec.name) {
            Some(existing) => *existing = spec,
            None => outputs.push(spec),
        }
        self
    }

    pub fn prompt(mut self, template: impl Into<String>) -> Self {
        self.definition.prompt = Some(template.into());
        self
    }

    pub fn tools<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.definition.tools = names.into_iter().map(Into::into).collect();
        self
    }

    pub fn source_directory(mut self, path: impl Into<String>) -> Self {
        self.definition.source_directory = Some(path.into());
        self
    }

    pub fn output_directory(mut self, path: impl Into<String>) -> Self {
        self.definition.output_directory = Some(path.into());
        self
    }

    /// Opens the steps sub-builder. Steps are appended in call order, also
    /// across repeated `steps` calls.
    pub fn steps(mut self, define: impl FnOnce(&mut StepsBuilder)) -> Self {
        let mut builder = StepsBuilder {
            steps: std::mem::take(&mut self.definition.steps),
        };
        define(&mut builder);
        self.definition.steps = builder.steps;
        self
    }

    pub fn step(mut self, step: Step) -> Self {
        self.definition.steps.push(step);
        self
    }

    /// Hook run once after the steps. It owns any polling or retrying it
    /// needs and decides itself when to stop.
    pub fn loop_hook<F>(mut self, hook: F) -> Self
    where
        F: Fn(&mut Context) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.definition.loop_hook = Some(Box::new(hook));
        self
    }

    /// Hook run once at the end; returning an error fails the run.
    pub fn review<F>(mut self, hook: F) -> Self
    where
        F: Fn(&Context) -> anyhow::Result<()> + Send + Sync + 'static,
    {
        self.definition.review_hook = Some(Box::new(hook));
        self
    }

    pub fn build(self) -> AgentDefinition {
        self.definition
    }

    /// Builds the definition and registers it under its own name.
    pub fn register(self, registry: &Registry) -> Result<Arc<AgentDefinition>, ConfigurationError> {
        let definition = self.build();
        let name = definition.name().to_string();
        registry.register(&name, definition)
    }
}

/// Appends steps to the definition under construction.
pub struct StepsBuilder {
    steps: Vec<Step>,
}

impl StepsBuilder {
    pub fn step(&mut self, step: Step) -> &mut Self {
        self.steps.push(step);
        self
    }

    pub fn len(&self) -> usize {
        self.steps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn captures_every_attribute() {
        let definition = AgentBuilder::new("weather_reporter")
            .description("Get weather information for a location")
            .input("latitude", ValueType::Float, true)
            .input("longitude", ValueType::Float, true)
            .output("weather_report", ValueType::String)
            .prompt("Generate a weather report for the given location.")
            .tools(["weather_tool"])
            .source_directory("jobs/weather")
            .output_directory("results/weather")
            .loop_hook(|_| Ok(()))
            .review(|_| Ok(()))
            .build();

        assert_eq!(definition.name(), "weather_reporter");
        assert_eq!(
            definition.description(),
            Some("Get weather information for a location")
        );
        assert_eq!(definition.inputs().len(), 2);
        assert_eq!(definition.inputs()[0].name, "latitude");
        assert_eq!(definition.outputs()[0].kind, ValueType::String);
        assert_eq!(
            definition.prompt(),
            Some("Generate a weather report for the given location.")
        );
        assert_eq!(definition.tools(), ["weather_tool"]);
        assert_eq!(definition.source_directory(), Some("jobs/weather"));
        assert_eq!(definition.output_directory(), Some("results/weather"));
        assert!(definition.has_loop());
        assert!(definition.has_review());
    }

    #[test]
    fn steps_keep_call_order() {
        let definition = AgentBuilder::new("ordered")
            .steps(|s| {
                s.step(Step::new("first").with_tool("web_browser"))
                    .step(Step::new("second").with_description("Convert"));
                assert_eq!(s.len(), 2);
            })
            .step(Step::new("third"))
            .steps(|s| {
                s.step(Step::new("fourth"));
            })
            .build();

        let names: Vec<&str> = definition.steps().iter().map(Step::name).collect();
        assert_eq!(names, ["first", "second", "third", "fourth"]);
        assert_eq!(definition.steps()[0].tool(), Some("web_browser"));
        assert_eq!(definition.steps()[1].description(), Some("Convert"));
    }

    #[test]
    fn redeclared_input_replaces() {
        let definition = AgentBuilder::new("a")
            .input("url", ValueType::String, true)
            .input("url", ValueType::String, false)
            .build();
        assert_eq!(definition.inputs().len(), 1);
        assert!(!definition.inputs()[0].required);
        assert_eq!(definition.required_inputs().count(), 0);
    }

    #[test]
    fn register_uses_agent_name() {
        let registry = Registry::new();
        let stored = AgentBuilder::new("dsl_test_agent")
            .description("DSL test agent")
            .register(&registry)
            .unwrap();

        let fetched = registry.get("dsl_test_agent").unwrap();
        assert!(Arc::ptr_eq(&stored, &fetched));
        assert_eq!(fetched.description(), Some("DSL test agent"));
    }

    #[test]
    fn no_validation_at_build_time() {
        let definition = AgentBuilder::new("loose")
            .tools(["not_registered"])
            .step(Step::new("uses").with_tool("also_not_registered"))
            .build();
        assert_eq!(definition.steps().len(), 1);
    }
}
