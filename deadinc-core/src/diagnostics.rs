//! Diagnostics produced from include verdicts.
//!
//! Two kinds, both bound to the include directive's location. Severity is a
//! single switch applied to every diagnostic of a run.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::events::SourceLocation;
use crate::file_id::FileId;
use crate::liveness::{FileVerdict, Verdict};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Warning,
    Error,
}

impl Severity {
    pub fn from_warnings_as_errors(warnings_as_errors: bool) -> Self {
        if warnings_as_errors {
            Severity::Error
        } else {
            Severity::Warning
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Severity::Warning => "warning",
            Severity::Error => "error",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    UnusedInclude,
    RedundantAllowedAnnotation,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Diagnostic {
    pub severity: Severity,
    pub location: SourceLocation,
    pub kind: DiagnosticKind,
    pub file: FileId,
}

impl Diagnostic {
    pub fn message(&self) -> String {
        match self.kind {
            DiagnosticKind::UnusedInclude => format!("unused #include of '{}'", self.file),
            DiagnosticKind::RedundantAllowedAnnotation => {
                format!("#include marked as allowed, but is used directly: '{}'", self.file)
            }
        }
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}: {}", self.location, self.severity, self.message())
    }
}

/// Receiver for emitted diagnostics; the host's output channel.
pub trait DiagnosticSink {
    fn report(&mut self, diagnostic: Diagnostic);
}

impl DiagnosticSink for Vec<Diagnostic> {
    fn report(&mut self, diagnostic: Diagnostic) {
        self.push(diagnostic);
    }
}

/// Diagnostics for `verdicts`, in verdict order.
///
/// Live and allowed-but-unused includes produce nothing.
pub fn diagnose(verdicts: &[FileVerdict], severity: Severity) -> Vec<Diagnostic> {
    verdicts
        .iter()
        .filter_map(|v| {
            let kind = match v.verdict {
                Verdict::Dead => DiagnosticKind::UnusedInclude,
                Verdict::RedundantlyAllowed => DiagnosticKind::RedundantAllowedAnnotation,
                Verdict::Live | Verdict::Allowed => return None,
            };
            Some(Diagnostic {
                severity,
                location: v.location.clone(),
                kind,
                file: v.file.clone(),
            })
        })
        .collect()
}
