//! Pluggable collaborator ports.
//!
//! The pipeline talks to its logger only through [`Logger`], so actions can
//! be run against `tracing`, a test capture, or anything else without
//! modification.

use std::fmt;

use parking_lot::Mutex;

/// Severity of a log line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum LogLevel {
    /// Per-invocation detail (promoted to info for debug targets).
    Debug,
    /// Normal operation.
    Info,
    /// Something was ignored or swallowed.
    Warn,
    /// Something went wrong.
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        })
    }
}

/// Port trait for pipeline and action logging.
///
/// Receives leveled, already-prefixed text lines.
pub trait Logger: Send + Sync {
    /// Emit one line.
    fn log(&self, level: LogLevel, message: &str);
}

/// Forwards every line to `tracing` under the `axn` target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingLogger;

impl Logger for TracingLogger {
    fn log(&self, level: LogLevel, message: &str) {
        match level {
            LogLevel::Debug => tracing::debug!(target: "axn", "{message}"),
            LogLevel::Info => tracing::info!(target: "axn", "{message}"),
            LogLevel::Warn => tracing::warn!(target: "axn", "{message}"),
            LogLevel::Error => tracing::error!(target: "axn", "{message}"),
        }
    }
}

/// Collects lines in memory.
///
/// Meant for tests asserting on what an action logged.
///
/// ```
/// use axn::{CaptureLogger, LogLevel, Logger};
///
/// let logger = CaptureLogger::new();
/// logger.log(LogLevel::Warn, "careful");
/// assert_eq!(logger.lines(), vec![(LogLevel::Warn, "careful".to_string())]);
/// ```
#[derive(Debug, Default)]
pub struct CaptureLogger {
    lines: Mutex<Vec<(LogLevel, String)>>,
}

impl CaptureLogger {
    /// An empty capture.
    pub fn new() -> Self {
        Self::default()
    }

    /// Every captured line, oldest first.
    pub fn lines(&self) -> Vec<(LogLevel, String)> {
        self.lines.lock().clone()
    }

    /// Captured messages at `level`.
    pub fn messages_at(&self, level: LogLevel) -> Vec<String> {
        self.lines
            .lock()
            .iter()
            .filter(|(l, _)| *l == level)
            .map(|(_, message)| message.clone())
            .collect()
    }

    /// Whether any line contains `needle`.
    pub fn contains(&self, needle: &str) -> bool {
        self.lines.lock().iter().any(|(_, m)| m.contains(needle))
    }

    /// Drop everything captured so far.
    pub fn clear(&self) {
        self.lines.lock().clear();
    }
}

impl Logger for CaptureLogger {
    fn log(&self, level: LogLevel, message: &str) {
        self.lines.lock().push((level, message.to_owned()));
    }
}
