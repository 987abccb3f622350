//! JSONL audit logger: one line per finished task.

use crate::driver::{TaskOutcome, TaskResult};
use anyhow::{Context, Result};
use chrono::Utc;
use serde::Serialize;
use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A single audit event.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub timestamp: String,
    pub category: String,
    pub period: String,
    pub outcome: String,
    pub rows: usize,
    pub url: Option<String>,
    pub reason: Option<String>,
    pub duration_ms: u64,
}

impl AuditEvent {
    pub fn from_result(result: &TaskResult) -> Self {
        let (rows, url, reason) = match &result.outcome {
            TaskOutcome::Extracted { url, rows, .. } => (*rows, Some(url.clone()), None),
            TaskOutcome::NoData { attempted } => (0, attempted.last().cloned(), None),
            TaskOutcome::Aborted { url, reason } => (0, Some(url.clone()), Some(reason.clone())),
        };
        Self {
            timestamp: Utc::now().to_rfc3339(),
            category: result.task.category.to_string(),
            period: result.task.period_key(),
            outcome: result.outcome.label().to_string(),
            rows,
            url,
            reason,
            duration_ms: result.elapsed.as_millis() as u64,
        }
    }
}

/// Append-only JSONL audit logger.
pub struct AuditLogger {
    file: File,
}

impl AuditLogger {
    /// Open or create the audit log file.
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .with_context(|| format!("failed to open audit log: {}", path.display()))?;

        Ok(Self { file })
    }

    /// `~/.statscrawl/audit.jsonl`.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("/tmp"))
            .join(".statscrawl")
            .join("audit.jsonl")
    }

    /// Open the default audit log.
    pub fn default_logger() -> Result<Self> {
        Self::open(&Self::default_path())
    }

    pub fn log(&mut self, event: &AuditEvent) -> Result<()> {
        let json = serde_json::to_string(event)?;
        writeln!(self.file, "{json}")?;
        Ok(())
    }

    pub fn log_result(&mut self, result: &TaskResult) -> Result<()> {
        self.log(&AuditEvent::from_result(result))
    }
}
