use crate::error::ToolError;
use crate::traits::Tool;
use serde::Serialize;
use serde_json::{Map, Value};
use std::fmt;

/// Rendered prompt text, written before the first step runs.
pub const PROMPT_KEY: &str = "_prompt";
/// Result of the most recent tool invocation.
pub const TOOL_RESULT_KEY: &str = "_tool_result";
/// Name of the tool resolved for the running step.
pub const CURRENT_TOOL_KEY: &str = "_current_tool";

/// Keys the engine writes itself. Any other key, `_`-prefixed or not,
/// belongs to the caller.
pub const RESERVED_KEYS: [&str; 3] = [PROMPT_KEY, TOOL_RESULT_KEY, CURRENT_TOOL_KEY];

pub fn is_reserved(key: &str) -> bool {
    RESERVED_KEYS.contains(&key)
}

pub type ContextSnapshot = Map<String, Value>;

/// Mutable key/value state threaded through one agent run.
///
/// Steps and hooks share the same instance, so a value written by one step
/// is visible to every later step. The tool instance resolved for the
/// running step lives outside the value map and is dropped when the step
/// ends.
#[derive(Default)]
pub struct Context {
    values: Map<String, Value>,
    current_tool: Option<(String, Box<dyn Tool>)>,
    current_step: Option<String>,
}

impl Context {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.values.get(key).and_then(Value::as_str)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Last writer wins.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.values.insert(key.into(), value.into())
    }

    pub fn insert_serialized<T: Serialize>(
        &mut self,
        key: impl Into<String>,
        value: &T,
    ) -> serde_json::Result<Option<Value>> {
        let value = serde_json::to_value(value)?;
        Ok(self.values.insert(key.into(), value))
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.values.remove(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.values.keys()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &Map<String, Value> {
        &self.values
    }

    /// Values under every key except [`RESERVED_KEYS`].
    pub fn user_values(&self) -> Map<String, Value> {
        self.values
            .iter()
            .filter(|(k, _)| !is_reserved(k))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    pub fn snapshot(&self) -> ContextSnapshot {
        self.values.clone()
    }

    pub fn into_values(self) -> Map<String, Value> {
        self.values
    }

    pub fn prompt(&self) -> Option<&str> {
        self.get_str(PROMPT_KEY)
    }

    pub fn tool_result(&self) -> Option<&Value> {
        self.values.get(TOOL_RESULT_KEY)
    }

    pub fn current_tool(&self) -> Option<&dyn Tool> {
        self.current_tool.as_ref().map(|(_, tool)| tool.as_ref())
    }

    pub fn current_tool_name(&self) -> Option<&str> {
        self.current_tool.as_ref().map(|(name, _)| name.as_str())
    }

    /// The tool resolved for the running step, or an error naming the step
    /// when its tool reference did not resolve.
    pub fn require_tool(&self) -> Result<&dyn Tool, ToolError> {
        self.current_tool()
            .ok_or_else(|| ToolError::no_tool(self.current_step.as_deref().unwrap_or("<none>")))
    }

    pub fn current_step(&self) -> Option<&str> {
        self.current_step.as_deref()
    }

    pub(crate) fn enter_step(&mut self, step: &str) {
        self.current_step = Some(step.to_string());
    }

    pub(crate) fn leave_step(&mut self) {
        self.clear_current_tool();
        self.current_step = None;
    }

    pub(crate) fn set_current_tool(&mut self, name: &str, tool: Box<dyn Tool>) {
        self.values
            .insert(CURRENT_TOOL_KEY.to_string(), Value::String(name.to_string()));
        self.current_tool = Some((name.to_string(), tool));
    }

    pub(crate) fn clear_current_tool(&mut self) {
        self.values.remove(CURRENT_TOOL_KEY);
        self.current_tool = None;
    }

    pub(crate) fn set_tool_result(&mut self, result: Value) {
        self.values.insert(TOOL_RESULT_KEY.to_string(), result);
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("values", &self.values)
            .field("current_tool", &self.current_tool_name())
            .field("current_step", &self.current_step)
            .finish()
    }
}

impl From<Map<String, Value>> for Context {
    fn from(values: Map<String, Value>) -> Self {
        Self {
            values,
            current_tool: None,
            current_step: None,
        }
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Context {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let values: Map<String, Value> = iter
            .into_iter()
            .map(|(k, v)| (k.into(), v.into()))
            .collect();
        Self::from(values)
    }
}

impl<K: Into<String>, V: Into<Value>, const N: usize> From<[(K, V); N]> for Context {
    fn from(pairs: [(K, V); N]) -> Self {
        pairs.into_iter().collect()
    }
}
