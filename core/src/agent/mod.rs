pub mod builder;
pub mod context;
pub mod definition;
pub mod runner;
pub mod step;

pub use builder::{AgentBuilder, StepsBuilder};
pub use context::{Context, ContextSnapshot};
pub use definition::{AgentDefinition, InputSpec, LoopHook, OutputSpec, ReviewHook, ValueType};
pub use runner::Agent;
pub use step::{Step, StepBody, ToolArgs};
