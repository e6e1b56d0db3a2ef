use std::{
    fs::File,
    io::{BufRead, BufReader},
    path::Path,
};

use serde_json::Value;
use tracing::{debug, info};

use crate::error::{DatasetError, RecordError, Result};
use crate::lines::Lines;
use crate::schema::{MessageView, Record, ROLE_ASSISTANT, ROLE_USER};
use crate::sink::{NullSink, Sink};
use crate::types::{Accepted, Diagnostic, Exchange, ValidationOutcome, ValidationSummary};

pub const MIN_USER_CHARS: usize = 10;
pub const MIN_ASSISTANT_CHARS: usize = 20;

/// Exclusive lower bounds on content length, counted in characters.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Thresholds {
    pub min_user_chars: usize,
    pub min_assistant_chars: usize,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            min_user_chars: MIN_USER_CHARS,
            min_assistant_chars: MIN_ASSISTANT_CHARS,
        }
    }
}

#[derive(Clone, Debug, Default)]
pub struct Validator {
    thresholds: Thresholds,
}

impl Validator {
    pub fn new(thresholds: Thresholds) -> Self {
        Self { thresholds }
    }

    pub fn thresholds(&self) -> Thresholds {
        self.thresholds
    }

    /// Runs the record checks in order and stops at the first failure.
    /// On success returns the first user/assistant exchange.
    pub fn inspect<'a>(&self, record: &'a Value) -> std::result::Result<Exchange<'a>, RecordError> {
        let rec = Record::from_value(record)?;
        let messages = rec.messages.ok_or(RecordError::MissingMessages)?;

        let entries = match messages.as_array() {
            Some(a) if a.len() >= 2 => a,
            _ => return Err(RecordError::InvalidMessagesFormat),
        };

        let user = first_with_role(entries, ROLE_USER)?;
        let assistant = first_with_role(entries, ROLE_ASSISTANT)?;
        let (Some(user), Some(assistant)) = (user, assistant) else {
            return Err(RecordError::MissingRole);
        };

        let user = user.content()?;
        let len = user.len();
        if len <= self.thresholds.min_user_chars {
            return Err(RecordError::UserTooShort {
                min: self.thresholds.min_user_chars,
                len,
            });
        }

        let assistant = assistant.content()?;
        let len = assistant.len();
        if len <= self.thresholds.min_assistant_chars {
            return Err(RecordError::AssistantTooShort {
                min: self.thresholds.min_assistant_chars,
                len,
            });
        }

        Ok(Exchange { user, assistant })
    }

    pub fn validate_record(&self, record: &Value, line: usize) -> ValidationOutcome {
        match self.inspect(record) {
            Ok(_) => ValidationOutcome::pass(),
            Err(e) => ValidationOutcome::fail(line, e),
        }
    }

    /// Validates JSONL from any buffered reader, pushing diagnostics and
    /// accepted records into `sink` as they occur.
    pub fn validate_reader<R, K>(&self, reader: R, sink: &mut K) -> Result<ValidationSummary>
    where
        R: BufRead,
        K: Sink + ?Sized,
    {
        let mut summary = ValidationSummary::default();

        for (i, line) in Lines::new(reader).enumerate() {
            let line_no = i + 1;
            let line = line.map_err(|source| DatasetError::Read { line: line_no, source })?;

            if line.trim().is_empty() {
                debug!(line = line_no, "skipping blank line");
                continue;
            }

            let value: Value = match serde_json::from_str(&line) {
                Ok(v) => v,
                Err(e) => {
                    let diag = Diagnostic {
                        line: line_no,
                        error: RecordError::InvalidJson { detail: e.to_string() },
                    };
                    debug!(line = line_no, error = %e, "invalid JSON");
                    sink.diagnostic(&diag).map_err(DatasetError::Sink)?;
                    summary.record_fail(diag);
                    continue;
                }
            };

            match self.inspect(&value) {
                Ok(exchange) => {
                    summary.record_pass();
                    let accepted = Accepted {
                        line: line_no,
                        record: &value,
                        exchange,
                    };
                    sink.accepted(&accepted).map_err(DatasetError::Sink)?;
                }
                Err(error) => {
                    debug!(line = line_no, %error, "record rejected");
                    let diag = Diagnostic { line: line_no, error };
                    sink.diagnostic(&diag).map_err(DatasetError::Sink)?;
                    summary.record_fail(diag);
                }
            }
        }

        info!(passed = summary.passed, failed = summary.failed, "validation complete");
        sink.finish(&summary).map_err(DatasetError::Sink)?;
        Ok(summary)
    }

    pub fn validate_file<K>(&self, path: &Path, sink: &mut K) -> Result<ValidationSummary>
    where
        K: Sink + ?Sized,
    {
        let name = path.display().to_string();
        sink.begin(&name).map_err(DatasetError::Sink)?;
        let f = File::open(path).map_err(|source| DatasetError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        self.validate_reader(BufReader::new(f), sink)
    }
}

/// First entry whose role equals `role`. Entries before the match are
/// inspected and may fault; entries after it are not.
fn first_with_role<'a>(
    entries: &'a [Value],
    role: &str,
) -> std::result::Result<Option<MessageView<'a>>, RecordError> {
    for (index, entry) in entries.iter().enumerate() {
        let view = MessageView::from_value(index, entry)?;
        if view.has_role(role)? {
            return Ok(Some(view));
        }
    }
    Ok(None)
}

/// Checks one record with the default thresholds.
pub fn validate_record(record: &Value, line: usize) -> ValidationOutcome {
    Validator::default().validate_record(record, line)
}

/// Validates a JSONL file with the default thresholds, without reporting.
pub fn validate_file(path: &Path) -> Result<ValidationSummary> {
    Validator::default().validate_file(path, &mut NullSink)
}
