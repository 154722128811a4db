use crate::agent::{Context, Step};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

pub type LoopHook = Box<dyn Fn(&mut Context) -> anyhow::Result<()> + Send + Sync>;
pub type ReviewHook = Box<dyn Fn(&Context) -> anyhow::Result<()> + Send + Sync>;

/// Declared type of an input or output. Only a hint: input validation checks
/// presence, a mismatching type is logged.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValueType {
    #[default]
    String,
    Integer,
    Float,
    Boolean,
    Array,
    Object,
    Any,
}

impl ValueType {
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Float => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Array => value.is_array(),
            Self::Object => value.is_object(),
            Self::Any => true,
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Float => "float",
            Self::Boolean => "boolean",
            Self::Array => "array",
            Self::Object => "object",
            Self::Any => "any",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InputSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ValueType,
    pub required: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: ValueType,
}

/// A named workflow: declared inputs and outputs, an optional prompt
/// template, ordered steps and optional loop/review hooks.
///
/// Built with [`AgentBuilder`](crate::agent::AgentBuilder); immutable once
/// built.
pub struct AgentDefinition {
    pub(crate) name: String,
    pub(crate) description: Option<String>,
    pub(crate) inputs: Vec<InputSpec>,
    pub(crate) outputs: Vec<OutputSpec>,
    pub(crate) prompt: Option<String>,
    pub(crate) tools: Vec<String>,
    pub(crate) steps: Vec<Step>,
    pub(crate) loop_hook: Option<LoopHook>,
    pub(crate) review_hook: Option<ReviewHook>,
    pub(crate) source_directory: Option<String>,
    pub(crate) output_directory: Option<String>,
}

impl AgentDefinition {
    pub(crate) fn empty(name: String) -> Self {
        Self {
            name,
            description: None,
            inputs: Vec::new(),
            outputs: Vec::new(),
            prompt: None,
            tools: Vec::new(),
            steps: Vec::new(),
            loop_hook: None,
            review_hook: None,
            source_directory: None,
            output_directory: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Inputs in declaration order.
    pub fn inputs(&self) -> &[InputSpec] {
        &self.inputs
    }

    pub fn input(&self, name: &str) -> Option<&InputSpec> {
        self.inputs.iter().find(|i| i.name == name)
    }

    pub fn required_inputs(&self) -> impl Iterator<Item = &InputSpec> {
        self.inputs.iter().filter(|i| i.required)
    }

    pub fn outputs(&self) -> &[OutputSpec] {
        &self.outputs
    }

    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    /// Tool names the agent declares. Informational; steps resolve their own
    /// tool references.
    pub fn tools(&self) -> &[String] {
        &self.tools
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn has_loop(&self) -> bool {
        self.loop_hook.is_some()
    }

    pub fn has_review(&self) -> bool {
        self.review_hook.is_some()
    }

    pub fn source_directory(&self) -> Option<&str> {
        self.source_directory.as_deref()
    }

    pub fn output_directory(&self) -> Option<&str> {
        self.output_directory.as_deref()
    }
}

impl fmt::Debug for AgentDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AgentDefinition")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("inputs", &self.inputs)
            .field("outputs", &self.outputs)
            .field("prompt", &self.prompt)
            .field("tools", &self.tools)
            .field("steps", &self.steps)
            .field("loop", &self.has_loop())
            .field("review", &self.has_review())
            .field("source_directory", &self.source_directory)
            .field("output_directory", &self.output_directory)
            .finish()
    }
}
