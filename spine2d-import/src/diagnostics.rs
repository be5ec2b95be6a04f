//! Ordered import log shared by every stage.
//!
//! Entries are appended in the order they are produced and never reordered, so the log
//! doubles as a deterministic audit trail. Each entry is mirrored to the `log` facade.

use serde::Serialize;
use std::fmt;

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Info => "INFO",
            Self::Warning => "WARNING",
            Self::Error => "ERROR",
        })
    }
}

/// The pipeline step that produced an entry.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Stage {
    Input,
    Atlas,
    Bones,
    Slots,
    Animation,
    Scene,
}

impl Stage {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Input => "input",
            Self::Atlas => "atlas",
            Self::Bones => "bones",
            Self::Slots => "slots",
            Self::Animation => "animation",
            Self::Scene => "scene",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct LogEntry {
    pub severity: Severity,
    pub stage: Stage,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}: {}", self.severity, self.stage, self.message)
    }
}

#[derive(Clone, Debug, Default)]
pub struct ImportLog {
    entries: Vec<LogEntry>,
    verbose: bool,
}

impl ImportLog {
    /// `verbose` keeps per-element `Info` detail in the log. Warnings and errors are
    /// always recorded.
    pub fn new(verbose: bool) -> Self {
        Self {
            entries: Vec::new(),
            verbose,
        }
    }

    pub fn is_verbose(&self) -> bool {
        self.verbose
    }

    pub fn info(&mut self, stage: Stage, message: impl Into<String>) {
        let message = message.into();
        log::debug!(target: "spine2d_import", "{stage}: {message}");
        if self.verbose {
            self.entries.push(LogEntry {
                severity: Severity::Info,
                stage,
                message,
            });
        }
    }

    pub fn warn(&mut self, stage: Stage, message: impl Into<String>) {
        let message = message.into();
        log::warn!(target: "spine2d_import", "{stage}: {message}");
        self.entries.push(LogEntry {
            severity: Severity::Warning,
            stage,
            message,
        });
    }

    pub fn error(&mut self, stage: Stage, message: impl Into<String>) {
        let message = message.into();
        log::error!(target: "spine2d_import", "{stage}: {message}");
        self.entries.push(LogEntry {
            severity: Severity::Error,
            stage,
            message,
        });
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn with_severity(&self, severity: Severity) -> impl Iterator<Item = &LogEntry> + '_ {
        self.entries.iter().filter(move |e| e.severity == severity)
    }

    pub fn warnings(&self) -> impl Iterator<Item = &str> + '_ {
        self.with_severity(Severity::Warning)
            .map(|e| e.message.as_str())
    }

    pub fn errors(&self) -> impl Iterator<Item = &str> + '_ {
        self.with_severity(Severity::Error).map(|e| e.message.as_str())
    }

    pub fn warning_count(&self) -> usize {
        self.with_severity(Severity::Warning).count()
    }

    pub fn error_count(&self) -> usize {
        self.with_severity(Severity::Error).count()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
