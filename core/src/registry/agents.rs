use crate::agent::AgentDefinition;
use crate::error::ConfigurationError;
use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use super::{lookup_key, normalize_name};

/// Name to [`AgentDefinition`] store.
///
/// Cloning shares the underlying map. Registering an existing name replaces
/// the previous definition.
#[derive(Clone, Default)]
pub struct Registry {
    agents: Arc<RwLock<HashMap<String, Arc<AgentDefinition>>>>,
}

impl Registry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        name: &str,
        definition: impl Into<Option<AgentDefinition>>,
    ) -> Result<Arc<AgentDefinition>, ConfigurationError> {
        let Some(definition) = definition.into() else {
            return Err(ConfigurationError::new(format!(
                "Cannot register nil agent: {}",
                name
            )));
        };
        let key = normalize_name(name)?;
        let definition = Arc::new(definition);

        let previous = self
            .agents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(key.clone(), definition.clone());

        if previous.is_some() {
            tracing::debug!(agent = %key, "Replaced registered agent");
        } else {
            tracing::debug!(agent = %key, "Registered agent");
        }
        Ok(definition)
    }

    pub fn get(&self, name: &str) -> Option<Arc<AgentDefinition>> {
        self.agents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&lookup_key(name))
            .cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.agents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .contains_key(&lookup_key(name))
    }

    pub fn remove(&self, name: &str) -> Option<Arc<AgentDefinition>> {
        self.agents
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&lookup_key(name))
    }

    /// Every registered definition, in no particular order.
    pub fn all(&self) -> Vec<Arc<AgentDefinition>> {
        self.agents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .values()
            .cloned()
            .collect()
    }

    /// Registered names, sorted.
    pub fn available_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .agents
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect();
        names.sort();
        names
    }

    pub fn len(&self) -> usize {
        self.agents.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
