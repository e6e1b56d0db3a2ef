use std::path::PathBuf;
use thiserror::Error;

/// Structural fault met while walking a record. Never fatal for the run.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum StructureFault {
    #[error("record is not a JSON object")]
    NotAnObject,
    #[error("messages[{index}] is not an object")]
    EntryNotObject { index: usize },
    #[error("messages[{index}] has no '{field}' field")]
    MissingField { index: usize, field: &'static str },
    #[error("messages[{index}].{field} has no length (not text, a list or an object)")]
    NotMeasurable { index: usize, field: &'static str },
}

/// Reason a single line was rejected. Rendered after the `Line <n>: ` prefix.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum RecordError {
    #[error("Invalid JSON")]
    InvalidJson { detail: String },
    #[error("Missing 'messages' key")]
    MissingMessages,
    #[error("Invalid messages format")]
    InvalidMessagesFormat,
    #[error("Missing user or assistant message")]
    MissingRole,
    #[error("User input too short (<={min} chars)")]
    UserTooShort { min: usize, len: usize },
    #[error("Assistant output too short (<={min} chars)")]
    AssistantTooShort { min: usize, len: usize },
    #[error("Validation error - {0}")]
    Unexpected(#[from] StructureFault),
}

/// Fatal errors. Anything here aborts the whole run.
#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("cannot open {}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("read error at line {line}")]
    Read {
        line: usize,
        #[source]
        source: std::io::Error,
    },
    #[error("report output failed")]
    Sink(#[source] std::io::Error),
}

pub type Result<T> = std::result::Result<T, DatasetError>;
