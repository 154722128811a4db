use crate::agent::context::PROMPT_KEY;
use crate::agent::{AgentDefinition, Context};
use crate::error::{AgentError, BoxError, from_anyhow};
use crate::prompt::PromptEngine;
use crate::registry::ToolResolver;
use std::sync::Arc;

/// An [`AgentDefinition`] bound to the tools it runs against.
#[derive(Clone)]
pub struct Agent {
    definition: Arc<AgentDefinition>,
    tools: ToolResolver,
    prompts: PromptEngine,
}

impl Agent {
    pub fn new(definition: Arc<AgentDefinition>, tools: ToolResolver) -> Self {
        Self {
            definition,
            tools,
            prompts: PromptEngine::new(),
        }
    }

    pub fn name(&self) -> &str {
        self.definition.name()
    }

    pub fn definition(&self) -> &AgentDefinition {
        &self.definition
    }

    /// Runs the workflow on a fresh context built from `inputs`.
    ///
    /// Stages run in a fixed order: input validation, prompt rendering,
    /// every step in declaration order, the loop hook once, the review hook
    /// once. The first failure stops the run; everything except validation
    /// is reported as `Agent <name> failed: <cause>` with the cause kept as
    /// the error source.
    pub fn run(&self, inputs: impl Into<Context>) -> Result<Context, AgentError> {
        let name = self.definition.name();
        tracing::info!(agent = %name, "Running agent {}...", name);

        let mut context = inputs.into();
        self.validate_inputs(&context)?;

        match self.run_stages(&mut context) {
            Ok(()) => {
                tracing::info!(agent = %name, "Agent {} completed successfully", name);
                Ok(context)
            }
            Err(source) => {
                tracing::error!(agent = %name, "Agent {} failed: {}", name, source);
                Err(AgentError::failed(name, context.snapshot(), source))
            }
        }
    }

    /// Collects every missing required input before failing.
    fn validate_inputs(&self, context: &Context) -> Result<(), AgentError> {
        let definition = &self.definition;
        let mut missing = Vec::new();

        for input in definition.inputs() {
            match context.get(&input.name) {
                Some(value) if !input.kind.matches(value) => {
                    tracing::warn!(
                        agent = %definition.name(),
                        "Input {} is not of type {}",
                        input.name,
                        input.kind
                    );
                }
                Some(_) => {}
                None if input.required => missing.push(input.name.clone()),
                None => {}
            }
        }

        if missing.is_empty() {
            return Ok(());
        }

        tracing::error!(
            agent = %definition.name(),
            "Missing required inputs: {}",
            missing.join(", ")
        );
        Err(AgentError::missing_inputs(
            definition.name(),
            missing,
            context.snapshot(),
        ))
    }

    fn run_stages(&self, context: &mut Context) -> Result<(), BoxError> {
        let definition = &self.definition;

        for tool in definition.tools() {
            if !self.tools.registry().contains(tool) {
                tracing::warn!(agent = %definition.name(), "Declared tool {} is not registered", tool);
            }
        }

        if let Some(template) = definition.prompt() {
            let rendered = self.prompts.render(template, context)?;
            context.insert(PROMPT_KEY, rendered);
        }

        for step in definition.steps() {
            step.execute(context, &self.tools)?;
        }

        if let Some(hook) = &definition.loop_hook {
            tracing::debug!(agent = %definition.name(), "Running loop hook");
            hook(context).map_err(from_anyhow)?;
        }

        if let Some(hook) = &definition.review_hook {
            tracing::debug!(agent = %definition.name(), "Running review hook");
            hook(context).map_err(from_anyhow)?;
        }

        Ok(())
    }
}

impl std::fmt::Debug for Agent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Agent")
            .field("definition", &self.definition)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::agent::{AgentBuilder, Step, ValueType};
    use crate::error::{StepError, causes, root_cause};
    use crate::registry::ToolRegistry;
    use serde_json::json;
    use std::sync::Mutex;

    fn agent(builder: AgentBuilder) -> Agent {
        Agent::new(Arc::new(builder.build()), ToolResolver::new(ToolRegistry::new()))
    }

    fn web_extractor() -> Agent {
        agent(
            AgentBuilder::new("web_extractor")
                .input("url", ValueType::String, true)
                .output("markdown_file", ValueType::String)
                .steps(|s| {
                    s.step(Step::new("fetch").with_body(|ctx| {
                        let url = ctx.get_str("url").unwrap_or_default().to_string();
                        ctx.insert("html_content", format!("<h1>{}</h1>", url));
                        Ok(())
                    }));
                    s.step(Step::new("convert").with_body(|ctx| {
                        let html = ctx
                            .get_str("html_content")
                            .ok_or_else(|| anyhow::anyhow!("no html"))?;
                        let file = format!("{}.md", html.len());
                        ctx.insert("markdown_file", file);
                        Ok(())
                    }));
                }),
        )
    }

    #[test]
    fn fetch_then_convert() {
        let result = web_extractor()
            .run([("url", "http://example.com")])
            .unwrap();
        assert_eq!(
            result.get_str("html_content"),
            Some("<h1>http://example.com</h1>")
        );
        assert!(result.contains_key("markdown_file"));
    }

    #[test]
    fn missing_url_is_reported() {
        let err = web_extractor().run(Context::new()).unwrap_err();
        assert_eq!(err.to_string(), "Missing required inputs: url");
        assert_eq!(err.agent(), "web_extractor");
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn every_missing_input_listed_and_no_step_runs() {
        let calls = Arc::new(Mutex::new(0));
        let counter = calls.clone();
        let agent = agent(
            AgentBuilder::new("strict")
                .input("a", ValueType::String, true)
                .input("b", ValueType::String, true)
                .input("c", ValueType::String, false)
                .input("d", ValueType::Integer, true)
                .steps(move |s| {
                    s.step(Step::new("count").with_body(move |_| {
                        *counter.lock().unwrap() += 1;
                        Ok(())
                    }));
                }),
        );

        let err = agent.run([("b", "present")]).unwrap_err();
        assert_eq!(err.missing(), ["a", "d"]);
        assert_eq!(err.to_string(), "Missing required inputs: a, d");
        assert_eq!(*calls.lock().unwrap(), 0);
    }

    #[test]
    fn steps_run_in_order_and_see_earlier_writes() {
        let agent = agent(AgentBuilder::new("ordered").steps(|s| {
            for i in 0..5 {
                s.step(Step::new(format!("step_{}", i)).with_body(move |ctx| {
                    let mut trail = ctx.get("trail").cloned().unwrap_or_else(|| json!([]));
                    let seen = trail.as_array().map(Vec::len).unwrap_or_default();
                    assert_eq!(seen, i);
                    if let Some(items) = trail.as_array_mut() {
                        items.push(json!(i));
                    }
                    ctx.insert("trail", trail);
                    Ok(())
                }));
            }
        }));

        let result = agent.run(Context::new()).unwrap();
        assert_eq!(result.get("trail"), Some(&json!([0, 1, 2, 3, 4])));
    }

    #[test]
    fn identical_inputs_give_identical_outputs() {
        let agent = web_extractor();
        let first = agent.run([("url", "http://example.com")]).unwrap();
        let second = agent.run([("url", "http://example.com")]).unwrap();
        assert_eq!(first.snapshot(), second.snapshot());
    }

    #[test]
    fn failing_step_aborts_remaining_steps() {
        let agent = agent(AgentBuilder::new("error_agent").steps(|s| {
            s.step(Step::new("error_step").with_body(|_| anyhow::bail!("Test error")));
            s.step(Step::new("after").with_body(|ctx| {
                ctx.insert("after", true);
                Ok(())
            }));
        }));

        let err = agent.run(Context::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Agent error_agent failed: Step error_step failed: Test error"
        );
        assert!(!err.context().contains_key("after"));

        let step = std::error::Error::source(&err)
            .and_then(|e| e.downcast_ref::<StepError>())
            .unwrap();
        assert_eq!(step.step(), "error_step");
    }

    #[test]
    fn cause_chain_ends_at_body_error() {
        #[derive(Debug, thiserror::Error)]
        #[error("quota exceeded")]
        struct QuotaExceeded;

        let agent = agent(AgentBuilder::new("quota").steps(|s| {
            s.step(Step::new("call").with_body(|_| Err(QuotaExceeded.into())));
        }));

        let err = agent.run(Context::new()).unwrap_err();
        let root = root_cause(&err);
        assert!(root.downcast_ref::<QuotaExceeded>().is_some());
        assert_eq!(root.to_string(), "quota exceeded");
        assert_eq!(causes(&err).count(), 3);
    }

    #[test]
    fn loop_hook_failure_is_wrapped_and_skips_review() {
        #[derive(Debug, thiserror::Error)]
        #[error("extraction never finished")]
        struct NotFinished;

        let reviewed = Arc::new(Mutex::new(false));
        let flag = reviewed.clone();
        let agent = agent(
            AgentBuilder::new("stuck")
                .steps(|s| {
                    s.step(Step::new("start").with_body(|ctx| {
                        ctx.insert("started", true);
                        Ok(())
                    }));
                })
                .loop_hook(|_| Err(NotFinished.into()))
                .review(move |_| {
                    *flag.lock().unwrap() = true;
                    Ok(())
                }),
        );

        let err = agent.run(Context::new()).unwrap_err();
        assert_eq!(err.to_string(), "Agent stuck failed: extraction never finished");
        assert_eq!(err.agent(), "stuck");
        assert_eq!(err.context()["started"], json!(true));
        assert!(root_cause(&err).downcast_ref::<NotFinished>().is_some());
        assert!(!*reviewed.lock().unwrap());
    }

    #[test]
    fn prompt_rendered_before_steps() {
        let agent = agent(
            AgentBuilder::new("prompted")
                .input("url", ValueType::String, true)
                .prompt("Given the URL {{ url }}, extract the main content.")
                .steps(|s| {
                    s.step(Step::new("read_prompt").with_body(|ctx| {
                        let seen = ctx.prompt().map(str::to_string);
                        ctx.insert("seen_prompt", seen);
                        Ok(())
                    }));
                }),
        );

        let result = agent.run([("url", "https://example.com")]).unwrap();
        assert_eq!(
            result.get_str("seen_prompt"),
            Some("Given the URL https://example.com, extract the main content.")
        );
    }

    #[test]
    fn prompt_failure_is_wrapped() {
        let agent = agent(AgentBuilder::new("bad_prompt").prompt("Hello {{ nobody }}"));
        let err = agent.run(Context::new()).unwrap_err();
        assert!(err.to_string().starts_with("Agent bad_prompt failed: Failed to render prompt"));
    }

    #[test]
    fn loop_hook_runs_once_after_steps() {
        let agent = agent(
            AgentBuilder::new("looping")
                .steps(|s| {
                    s.step(Step::new("produce").with_body(|ctx| {
                        ctx.insert("markdown_file", "out.md");
                        Ok(())
                    }));
                })
                .loop_hook(|ctx| {
                    assert!(ctx.contains_key("markdown_file"));
                    let runs = ctx.get("loop_runs").and_then(|v| v.as_u64()).unwrap_or(0);
                    ctx.insert("loop_runs", runs + 1);
                    Ok(())
                }),
        );

        let result = agent.run(Context::new()).unwrap();
        assert_eq!(result.get("loop_runs"), Some(&json!(1)));
    }

    #[test]
    fn review_failure_fails_run_after_successful_steps() {
        let agent = agent(
            AgentBuilder::new("reviewed")
                .output("output", ValueType::String)
                .steps(|s| {
                    s.step(Step::new("work").with_body(|ctx| {
                        ctx.insert("work_done", true);
                        Ok(())
                    }));
                })
                .review(|ctx| {
                    if !ctx.contains_key("output") {
                        anyhow::bail!("Review failed: output missing");
                    }
                    Ok(())
                }),
        );

        let err = agent.run(Context::new()).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Agent reviewed failed: Review failed: output missing"
        );
        assert_eq!(err.context()["work_done"], json!(true));
        assert_eq!(root_cause(&err).to_string(), "Review failed: output missing");
    }

    #[test]
    fn review_passes_when_output_present() {
        let agent = agent(
            AgentBuilder::new("reviewed_ok")
                .steps(|s| {
                    s.step(Step::new("generate").with_body(|ctx| {
                        ctx.insert("output", "Generated output");
                        Ok(())
                    }));
                })
                .review(|ctx| {
                    anyhow::ensure!(ctx.contains_key("output"), "Review failed");
                    Ok(())
                }),
        );

        let result = agent.run(Context::new()).unwrap();
        assert_eq!(result.get_str("output"), Some("Generated output"));
    }
}
