use crate::tools::{extract_string_arg, extract_string_arg_opt};
use crate::traits::{Args, ParameterSpec, Tool, missing_required};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};

/// Reads, writes and lists files. Relative paths resolve against the
/// optional root.
#[derive(Debug, Clone, Default)]
pub struct FileTool {
    root: Option<PathBuf>,
}

impl FileTool {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root(root: impl AsRef<Path>) -> Self {
        Self {
            root: Some(root.as_ref().to_path_buf()),
        }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        match &self.root {
            Some(root) => root.join(path),
            None => PathBuf::from(path),
        }
    }

    fn read_file(&self, path: &str) -> anyhow::Result<Value> {
        let full_path = self.resolve(path);
        if !full_path.exists() {
            anyhow::bail!("File does not exist: {}", path);
        }
        let content = std::fs::read_to_string(&full_path)
            .map_err(|e| anyhow::anyhow!("Failed to read file: {}", e))?;
        Ok(json!({ "content": content, "path": path }))
    }

    fn write_file(&self, path: &str, content: &str) -> anyhow::Result<Value> {
        let full_path = self.resolve(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| anyhow::anyhow!("Failed to write file: {}", e))?;
        }
        std::fs::write(&full_path, content)
            .map_err(|e| anyhow::anyhow!("Failed to write file: {}", e))?;
        Ok(json!({ "success": true, "path": path }))
    }

    fn list_files(&self, path: &str) -> anyhow::Result<Value> {
        let full_path = self.resolve(path);
        if !full_path.is_dir() {
            anyhow::bail!("Directory does not exist: {}", path);
        }
        let mut files: Vec<String> = std::fs::read_dir(&full_path)
            .map_err(|e| anyhow::anyhow!("Failed to list files: {}", e))?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.file_name().to_string_lossy().into_owned())
            .collect();
        files.sort();
        Ok(json!({ "files": files, "path": path }))
    }
}

impl Tool for FileTool {
    fn description(&self) -> &str {
        "Perform file operations such as reading, writing, and listing files"
    }

    fn parameters(&self) -> Vec<ParameterSpec> {
        vec![
            ParameterSpec::required("path", "Path to the file or directory"),
            ParameterSpec::optional(
                "content",
                "Content to write to a file (for write operations)",
            ),
            ParameterSpec::required("operation", "Operation to perform (read, write, or list)"),
        ]
    }

    fn call(&self, args: &Args) -> anyhow::Result<Value> {
        let missing = missing_required(&self.parameters(), args);
        if !missing.is_empty() {
            anyhow::bail!("Missing required parameter: {}", missing.join(", "));
        }

        let path = extract_string_arg(args, "path")?;
        let operation = extract_string_arg(args, "operation")?;
        tracing::debug!(operation = %operation, path = %path, "file_tool called");

        match operation.to_lowercase().as_str() {
            "read" => self.read_file(&path),
            "write" => {
                let content = extract_string_arg_opt(args, "content")
                    .ok_or_else(|| anyhow::anyhow!("Content is required for write operations"))?;
                self.write_file(&path, &content)
            }
            "list" => self.list_files(&path),
            other => anyhow::bail!(
                "Invalid operation: {}. Must be one of: read, write, list",
                other
            ),
        }
    }
}
