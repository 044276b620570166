//! Non-fatal findings from symbol-table construction.

use std::fmt;

/// How serious a finding is. Nothing here is fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Warning,
    Info,
}

/// One finding from a build or resolve pass, tied to the file it
/// originated in. Collected by the caller and logged, never raised.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub severity: Severity,
    /// Root-relative path of the originating file.
    pub file: String,
    pub message: String,
}

impl Diagnostic {
    pub fn warning(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Warning,
            file: file.into(),
            message: message.into(),
        }
    }

    pub fn info(file: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            severity: Severity::Info,
            file: file.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.file, self.message)
    }
}
