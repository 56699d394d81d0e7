//! Per-request log collection and the JSON response envelope.
//!
//! Import and export flows report soft failures (skipped items, missing
//! fields) without aborting. Each entry is recorded in a [`Logs`] collector
//! that is returned to the caller in the response envelope, and mirrored to
//! `tracing` at the matching level.

use serde::{Deserialize, Serialize};

/// Severity of a collected log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warning,
    Notice,
}

/// A single collected log entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub level: LogLevel,
    pub message: String,
}

/// Ordered collection of log entries for one request.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Logs {
    entries: Vec<LogEntry>,
}

impl Logs {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an error. `source` tags the tracing event with the flow name.
    pub fn error(&mut self, source: &'static str, message: impl Into<String>) {
        let message = message.into();
        tracing::error!(source, "{message}");
        self.push(LogLevel::Error, message);
    }

    pub fn warning(&mut self, source: &'static str, message: impl Into<String>) {
        let message = message.into();
        tracing::warn!(source, "{message}");
        self.push(LogLevel::Warning, message);
    }

    pub fn notice(&mut self, source: &'static str, message: impl Into<String>) {
        let message = message.into();
        tracing::info!(source, "{message}");
        self.push(LogLevel::Notice, message);
    }

    fn push(&mut self, level: LogLevel, message: String) {
        self.entries.push(LogEntry { level, message });
    }

    #[must_use]
    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.entries.iter().any(|e| e.level == LogLevel::Error)
    }

    /// Messages at the given level, in insertion order.
    pub fn messages(&self, level: LogLevel) -> impl Iterator<Item = &str> {
        self.entries
            .iter()
            .filter(move |e| e.level == level)
            .map(|e| e.message.as_str())
    }

    /// Append all entries of another collector.
    pub fn extend(&mut self, other: Self) {
        self.entries.extend(other.entries);
    }
}

/// JSON response wrapper: `{ "data": ..., "logs": [...] }`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
    pub logs: Logs,
}

impl<T> Envelope<T> {
    pub const fn new(data: T, logs: Logs) -> Self {
        Self {
            data: Some(data),
            logs,
        }
    }

    /// An envelope carrying only logs (used for failed requests).
    pub const fn failed(logs: Logs) -> Self {
        Self { data: None, logs }
    }
}
