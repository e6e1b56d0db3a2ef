//! Conversational JSONL dataset validation
//!
//! Checks chat-style training records (`{"messages": [{"role", "content"}, ...]}`)
//! line by line and reports per-line diagnostics before the file is handed
//! to a fine-tuning run.

mod error;
mod lines;
mod quality;
mod schema;
mod sink;
mod template;
mod types;
mod validator;

pub use error::{DatasetError, RecordError, Result, StructureFault};
pub use quality::{Hash32, QualityAccumulator, QualityReport, MIN_CONVERSATIONS};
pub use schema::{Content, Conversation, Message, MessageView, Record, ROLE_ASSISTANT, ROLE_USER};
pub use sink::{ConsoleReporter, NullSink, Sink};
pub use template::{render_chat, TextExporter, TrainingText, END_OF_TURN};
pub use types::{Accepted, Diagnostic, Exchange, ValidationOutcome, ValidationSummary};
pub use validator::{
    validate_file, validate_record, Thresholds, Validator, MIN_ASSISTANT_CHARS, MIN_USER_CHARS,
};
