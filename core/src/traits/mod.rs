pub mod tool;

pub use tool::{Args, ParameterSpec, Tool, ToolDescriptor, missing_required};
