use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Serialize;
use uuid::Uuid;

/// One timestamped event in the execution log
#[derive(Debug, Clone, Serialize)]
pub struct LogEntry {
    /// Epoch milliseconds
    pub time: i64,
    pub event: String,
    pub detail: String,
}

/// Append-only event log for a single run.
///
/// Entries are held in memory and persisted once at the end of the run;
/// persistence failure never aborts a run.
pub struct ExecutionLog {
    run_id: String,
    entries: Vec<LogEntry>,
}

impl ExecutionLog {
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4().to_string(),
            entries: Vec::new(),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn append(&mut self, event: &str, detail: impl Into<String>) {
        let detail = detail.into();
        log::debug!("[{}] {}: {}", self.run_id, event, detail);
        self.entries.push(LogEntry {
            time: chrono::Utc::now().timestamp_millis(),
            event: event.to_string(),
            detail,
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    /// Write the log as pretty JSON to `<dir>/log-<epoch-ms>.json`.
    pub fn persist(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("failed to create log directory {}", dir.display()))?;
        let path = dir.join(format!(
            "log-{}.json",
            chrono::Utc::now().timestamp_millis()
        ));
        let json = serde_json::to_string_pretty(&self.entries)?;
        std::fs::write(&path, json)
            .with_context(|| format!("failed to write log file {}", path.display()))?;
        Ok(path)
    }
}

impl Default for ExecutionLog {
    fn default() -> Self {
        Self::new()
    }
}
