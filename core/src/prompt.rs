//! Prompt template rendering.
//!
//! Templates use Liquid syntax (`{{ url }}`, `{% if depth %}...{% endif %}`).
//! Every non-reserved context value is exposed as a top-level variable;
//! referencing a variable that is not in the context is a render error.

use crate::agent::Context;
use crate::agent::context::is_reserved;
use crate::error::PromptError;

#[derive(Debug, Clone, Copy, Default)]
pub struct PromptEngine;

impl PromptEngine {
    pub fn new() -> Self {
        Self
    }

    pub fn render(&self, template: &str, context: &Context) -> Result<String, PromptError> {
        let failed = |source: liquid::Error| {
            tracing::error!("Failed to render prompt: {}", source);
            PromptError::new(template, context.snapshot(), source)
        };

        let variables = build_liquid_variables(context).map_err(failed)?;
        let parsed = liquid::ParserBuilder::with_stdlib()
            .build()
            .and_then(|parser| parser.parse(template))
            .map_err(failed)?;

        parsed.render(&variables).map_err(failed)
    }
}

fn build_liquid_variables(context: &Context) -> Result<liquid::Object, liquid::Error> {
    let mut variables = liquid::Object::new();
    for (key, value) in context.values() {
        if is_reserved(key) {
            continue;
        }
        variables.insert(key.clone().into(), liquid::model::to_value(value)?);
    }
    Ok(variables)
}
