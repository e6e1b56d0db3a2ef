use std::fmt;

use serde_json::Value;

use crate::error::RecordError;
use crate::schema::Content;

/// One human-readable failure, tied to its 1-based line number.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Diagnostic {
    pub line: usize,
    pub error: RecordError,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Line {}: {}", self.line, self.error)
    }
}

/// Result of checking one record.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ValidationOutcome {
    pub diagnostic: Option<Diagnostic>,
}

impl ValidationOutcome {
    pub fn pass() -> Self {
        Self { diagnostic: None }
    }

    pub fn fail(line: usize, error: RecordError) -> Self {
        Self {
            diagnostic: Some(Diagnostic { line, error }),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.diagnostic.is_none()
    }

    pub fn error(&self) -> Option<&RecordError> {
        self.diagnostic.as_ref().map(|d| &d.error)
    }
}

/// Totals for one file run. Diagnostics keep file order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct ValidationSummary {
    pub passed: u64,
    pub failed: u64,
    pub diagnostics: Vec<Diagnostic>,
}

impl ValidationSummary {
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }

    pub(crate) fn record_pass(&mut self) {
        self.passed += 1;
    }

    pub(crate) fn record_fail(&mut self, diag: Diagnostic) {
        self.failed += 1;
        self.diagnostics.push(diag);
    }
}

/// First user turn and first assistant turn of an accepted record.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Exchange<'a> {
    pub user: Content<'a>,
    pub assistant: Content<'a>,
}

/// Handed to sinks for every record that passed.
#[derive(Clone, Copy, Debug)]
pub struct Accepted<'a> {
    pub line: usize,
    pub record: &'a Value,
    pub exchange: Exchange<'a>,
}
