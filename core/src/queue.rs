//! Directory-backed job queue.
//!
//! One file per item. Files are consumed in lexicographic name order, so the
//! default `<unix-seconds>_<n>.json` names come out roughly oldest first.

use crate::error::FileQueueError;
use serde_json::Value;
use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::ops::ControlFlow;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_PATTERN: &str = "*";

const MAX_NAME_ATTEMPTS: usize = 100;

#[derive(Debug, Clone)]
pub struct DirectoryQueue {
    path: PathBuf,
    pattern: glob::Pattern,
}

impl DirectoryQueue {
    /// Opens the queue, creating the directory if needed.
    pub fn new(path: impl AsRef<Path>) -> Result<Self, FileQueueError> {
        let path = path.as_ref().to_path_buf();
        fs::create_dir_all(&path).map_err(|e| {
            FileQueueError::with_source(
                format!("Failed to create queue directory {}", path.display()),
                e,
            )
        })?;
        Ok(Self {
            path,
            pattern: glob::Pattern::new(DEFAULT_PATTERN).map_err(|e| {
                FileQueueError::with_source("Invalid queue pattern", e)
            })?,
        })
    }

    /// Only file names matching `pattern` (glob syntax) are queue items.
    pub fn with_pattern(mut self, pattern: &str) -> Result<Self, FileQueueError> {
        self.pattern = glob::Pattern::new(pattern).map_err(|e| {
            FileQueueError::with_source(format!("Invalid queue pattern: {}", pattern), e)
        })?;
        Ok(self)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Matching files, sorted by name.
    pub fn pending(&self) -> Result<Vec<PathBuf>, FileQueueError> {
        let entries = fs::read_dir(&self.path).map_err(|e| {
            FileQueueError::with_source(
                format!("Failed to read queue directory {}", self.path.display()),
                e,
            )
        })?;

        let mut files: Vec<PathBuf> = entries
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| path.is_file())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|name| self.pattern.matches(name))
            })
            .collect();
        files.sort();
        Ok(files)
    }

    /// Writes one item. Objects and arrays are stored as pretty JSON,
    /// strings as raw text.
    pub fn enqueue(&self, data: &Value, filename: Option<&str>) -> Result<PathBuf, FileQueueError> {
        let content = match data {
            Value::Object(_) | Value::Array(_) => serde_json::to_string_pretty(data)
                .map_err(|e| FileQueueError::with_source("Failed to serialize queue item", e))?,
            Value::String(text) => text.clone(),
            other => other.to_string(),
        };

        let file_path = match filename {
            Some(name) => {
                let file_path = self.path.join(name);
                fs::write(&file_path, content).map_err(|e| write_failed(&file_path, e))?;
                file_path
            }
            None => self.write_new(&content)?,
        };
        tracing::debug!(path = %file_path.display(), "Enqueued item");
        Ok(file_path)
    }

    /// Removes and returns the first item, or `None` when the queue is empty.
    ///
    /// Content that is not valid JSON comes back as a string. Unreadable
    /// files are logged, left in place and skipped.
    pub fn dequeue(&self) -> Result<Option<Value>, FileQueueError> {
        for file in self.pending()? {
            let Some(data) = read_item(&file) else {
                continue;
            };
            fs::remove_file(&file).map_err(|e| {
                FileQueueError::with_source(
                    format!("Failed to remove queue item {}", file.display()),
                    e,
                )
            })?;
            tracing::debug!(path = %file.display(), "Dequeued item");
            return Ok(Some(data));
        }
        Ok(None)
    }

    /// Polls the directory every `interval`, handing each dequeued item to
    /// `handler` until it breaks.
    pub fn watch<F>(&self, interval: Duration, mut handler: F) -> Result<(), FileQueueError>
    where
        F: FnMut(Value) -> ControlFlow<()>,
    {
        tracing::info!(path = %self.path.display(), "Watching queue");
        loop {
            while let Some(item) = self.dequeue()? {
                if handler(item).is_break() {
                    return Ok(());
                }
            }
            std::thread::sleep(interval);
        }
    }

    /// Writes `content` under a fresh `<unix-seconds>_<n>.json` name.
    /// Names are claimed with `create_new`, so concurrent writers never
    /// share a file.
    fn write_new(&self, content: &str) -> Result<PathBuf, FileQueueError> {
        for _ in 0..MAX_NAME_ATTEMPTS {
            let candidate = self.path.join(format!(
                "{}_{}.json",
                chrono::Utc::now().timestamp(),
                rand::random_range(0..1000)
            ));
            let mut file = match OpenOptions::new().write(true).create_new(true).open(&candidate) {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => continue,
                Err(e) => return Err(write_failed(&candidate, e)),
            };
            file.write_all(content.as_bytes())
                .map_err(|e| write_failed(&candidate, e))?;
            return Ok(candidate);
        }

        Err(FileQueueError::new(format!(
            "No free queue file name in {} after {} attempts",
            self.path.display(),
            MAX_NAME_ATTEMPTS
        )))
    }
}

fn write_failed(path: &Path, e: io::Error) -> FileQueueError {
    FileQueueError::with_source(format!("Failed to write queue item {}", path.display()), e)
}

fn read_item(file: &Path) -> Option<Value> {
    match fs::read_to_string(file) {
        Ok(content) => Some(
            serde_json::from_str(&content).unwrap_or_else(|_| Value::String(content)),
        ),
        Err(e) => {
            tracing::warn!("Error reading file {}: {}", file.display(), e);
            None
        }
    }
}
