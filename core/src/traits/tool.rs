use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

/// Arguments handed to [`Tool::call`].
pub type Args = Map<String, Value>;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    pub name: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub description: String,
    pub required: bool,
}

impl ParameterSpec {
    pub fn required(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            kind: "string".into(),
            description: description.into(),
            required: true,
        }
    }

    pub fn optional(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            required: false,
            ..Self::required(name, description)
        }
    }

    pub fn with_type(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    pub parameters: Vec<ParameterSpec>,
}

impl ToolDescriptor {
    pub fn parameters_schema(&self) -> Value {
        parameters_schema(&self.parameters)
    }
}

/// Capability exposed to agent steps.
///
/// A tool has no name of its own; it is addressed by the name it was
/// registered under. Instances are created fresh for every resolution and
/// must not rely on the engine to carry state between calls.
pub trait Tool: Send + Sync {
    fn description(&self) -> &str;

    /// Parameters in declaration order.
    fn parameters(&self) -> Vec<ParameterSpec>;

    fn call(&self, args: &Args) -> anyhow::Result<Value>;

    fn parameters_schema(&self) -> Value {
        parameters_schema(&self.parameters())
    }

    fn descriptor(&self, name: &str) -> ToolDescriptor {
        ToolDescriptor {
            name: name.to_string(),
            description: self.description().to_string(),
            parameters: self.parameters(),
        }
    }
}

/// Names of required parameters absent from `args`, in declaration order.
pub fn missing_required(parameters: &[ParameterSpec], args: &Args) -> Vec<String> {
    parameters
        .iter()
        .filter(|p| p.required && !args.contains_key(&p.name))
        .map(|p| p.name.clone())
        .collect()
}

fn parameters_schema(parameters: &[ParameterSpec]) -> Value {
    let properties: Map<String, Value> = parameters
        .iter()
        .map(|p| {
            (
                p.name.clone(),
                json!({ "type": p.kind, "description": p.description }),
            )
        })
        .collect();
    let required: Vec<&str> = parameters
        .iter()
        .filter(|p| p.required)
        .map(|p| p.name.as_str())
        .collect();

    json!({
        "type": "object",
        "properties": properties,
        "required": required
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Echo;

    impl Tool for Echo {
        fn description(&self) -> &str {
            "Echo the input back"
        }

        fn parameters(&self) -> Vec<ParameterSpec> {
            vec![
                ParameterSpec::required("required_param", "Required parameter"),
                ParameterSpec::optional("optional_param", "Optional parameter")
                    .with_type("integer"),
            ]
        }

        fn call(&self, args: &Args) -> anyhow::Result<Value> {
            let missing = missing_required(&self.parameters(), args);
            if !missing.is_empty() {
                anyhow::bail!("Missing required parameter: {}", missing.join(", "));
            }
            Ok(Value::Object(args.clone()))
        }
    }

    #[test]
    fn parameters_keep_declaration_order() {
        let params = Echo.parameters();
        assert_eq!(params[0].name, "required_param");
        assert_eq!(params[0].kind, "string");
        assert!(params[0].required);
        assert_eq!(params[1].name, "optional_param");
        assert_eq!(params[1].kind, "integer");
        assert!(!params[1].required);
    }

    #[test]
    fn schema_lists_required() {
        let schema = Echo.parameters_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["optional_param"]["type"], "integer");
        assert_eq!(schema["required"], json!(["required_param"]));
    }

    #[test]
    fn call_reports_missing_parameter() {
        let mut args = Args::new();
        args.insert("optional_param".into(), json!(42));
        let err = Echo.call(&args).unwrap_err();
        assert!(err.to_string().contains("Missing required parameter"));

        args.insert("required_param".into(), json!("test"));
        assert_eq!(Echo.call(&args).unwrap()["required_param"], "test");
    }

    #[test]
    fn descriptor_uses_registered_name() {
        let descriptor = Echo.descriptor("echo");
        assert_eq!(descriptor.name, "echo");
        assert_eq!(descriptor.parameters.len(), 2);
    }
}
