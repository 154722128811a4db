use crate::traits::{Tool, ToolDescriptor};
use super::{ToolRegistry, lookup_key};

/// Turns tool names into fresh tool instances.
#[derive(Clone, Default)]
pub struct ToolResolver {
    registry: ToolRegistry,
}

impl ToolResolver {
    pub fn new(registry: ToolRegistry) -> Self {
        Self { registry }
    }

    /// A new instance on every call; `None` when the name is unregistered.
    pub fn resolve(&self, name: &str) -> Option<Box<dyn Tool>> {
        self.registry.get(name).map(|tool| tool.instantiate())
    }

    pub fn descriptor(&self, name: &str) -> Option<ToolDescriptor> {
        self.resolve(name).map(|tool| tool.descriptor(&lookup_key(name)))
    }

    pub fn registry(&self) -> &ToolRegistry {
        &self.registry
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::traits::{Args, ParameterSpec};
    use serde_json::{Value, json};
    use std::sync::atomic::{AtomicUsize, Ordering};

    static NEXT_ID: AtomicUsize = AtomicUsize::new(0);

    struct Counted {
        id: usize,
    }

    impl Default for Counted {
        fn default() -> Self {
            Self {
                id: NEXT_ID.fetch_add(1, Ordering::SeqCst),
            }
        }
    }

    impl Tool for Counted {
        fn description(&self) -> &str {
            "Reports its instance id"
        }

        fn parameters(&self) -> Vec<ParameterSpec> {
            vec![]
        }

        fn call(&self, _args: &Args) -> anyhow::Result<Value> {
            Ok(json!(self.id))
        }
    }

    fn resolver() -> ToolResolver {
        let registry = ToolRegistry::new();
        registry.register_type::<Counted>("t").unwrap();
        ToolResolver::new(registry)
    }

    #[test]
    fn each_resolution_is_a_new_instance() {
        let resolver = resolver();
        let first = resolver.resolve("t").unwrap();
        let second = resolver.resolve(":t").unwrap();

        let first_id = first.call(&Args::new()).unwrap();
        let second_id = second.call(&Args::new()).unwrap();
        assert_ne!(first_id, second_id);
    }

    #[test]
    fn unknown_name_is_none() {
        assert!(resolver().resolve("missing").is_none());
    }

    #[test]
    fn descriptor_for_registered_tool() {
        let descriptor = resolver().descriptor("t").unwrap();
        assert_eq!(descriptor.name, "t");
        assert_eq!(descriptor.description, "Reports its instance id");
    }
}
