use crate::error::ConfigurationError;
use crate::traits::{Tool, ToolDescriptor};
use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use super::{lookup_key, normalize_name};

type Constructor = Arc<dyn Fn() -> Box<dyn Tool> + Send + Sync>;

/// A registrable tool type: something that can produce fresh instances.
#[derive(Clone)]
pub struct ToolType {
    type_name: &'static str,
    construct: Constructor,
}

impl ToolType {
    /// Tool type built with `T::default()` on every resolution.
    pub fn of<T: Tool + Default + 'static>() -> Self {
        Self {
            type_name: std::any::type_name::<T>(),
            construct: Arc::new(|| Box::new(T::default())),
        }
    }

    /// Tool type whose instances come from `construct`, for tools that
    /// close over host configuration.
    pub fn from_fn<T, F>(construct: F) -> Self
    where
        T: Tool + 'static,
        F: Fn() -> T + Send + Sync + 'static,
    {
        Self {
            type_name: std::any::type_name::<T>(),
            construct: Arc::new(move || Box::new(construct())),
        }
    }

    pub fn instantiate(&self) -> Box<dyn Tool> {
        (self.construct)()
    }

    /// Rust type name of the produced tool; informational only.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }
}

impl fmt::Debug for ToolType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolType")
            .field("type_name", &self.type_name)
            .finish_non_exhaustive()
    }
}

/// Name to [`ToolType`] store. Holds types, never instances.
#[derive(Clone, Default)]
pub struct ToolRegistry {
    tools: Arc<RwLock<HashMap<String, ToolType>>>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        name: &str,
        tool: impl Into<Option<ToolType>>,
    ) -> Result<(), ConfigurationError> {
        let Some(tool) = tool.into() else {
            return Err(ConfigurationError::new(format!(
                "Cannot register nil tool: {}",
                name
            )));
        };
        let key = normalize_name(name)?;
        tracing::debug!(tool = %key, type_name = tool.type_name(), "Registered tool");

        self.tools
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key, tool);
        Ok(())
    }

    pub fn register_type<T: Tool + Default + 'static>(
        &self,
        name: &str,
    ) -> Result<(), ConfigurationError> {
        self.register(name, ToolType::of::<T>())
    }

    pub fn get(&self, name: &str) -> Option<ToolType> {
        self.tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&lookup_key(name))
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&lookup_key(name))
    }

    /// Registered tool names, sorted.
    pub fn available_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn all(&self) -> Vec<ToolType> {
        self.tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    /// Snapshot of the full name to type mapping.
    pub fn tools(&self) -> HashMap<String, ToolType> {
        self.tools
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Describes every registered tool by instantiating it once.
    pub fn descriptors(&self) -> Vec<ToolDescriptor> {
        let mut descriptors: Vec<ToolDescriptor> = self
            .tools()
            .iter()
            .map(|(name, tool)| tool.instantiate().descriptor(name))
            .collect();
        descriptors.sort_by(|a, b| a.name.cmp(&b.name));
        descriptors
    }

    pub fn len(&self) -> usize {
        self.tools.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
