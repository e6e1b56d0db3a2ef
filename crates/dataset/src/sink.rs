//! Reporting side of a validation run.
//!
//! The validator pushes events into a [`Sink`]; what happens to them
//! (console output, export, statistics) is up to the implementation.

use std::io::{self, Write};

use crate::types::{Accepted, Diagnostic, ValidationSummary};

pub trait Sink {
    /// Called once before the input is opened.
    fn begin(&mut self, _source: &str) -> io::Result<()> {
        Ok(())
    }

    fn diagnostic(&mut self, _diag: &Diagnostic) -> io::Result<()> {
        Ok(())
    }

    fn accepted(&mut self, _record: &Accepted<'_>) -> io::Result<()> {
        Ok(())
    }

    /// Called once after the last line.
    fn finish(&mut self, _summary: &ValidationSummary) -> io::Result<()> {
        Ok(())
    }
}

/// Discards everything.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl Sink for NullSink {}

/// Plain-text report: header, one line per diagnostic, summary block.
pub struct ConsoleReporter<W: Write> {
    out: W,
}

impl<W: Write> ConsoleReporter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

impl ConsoleReporter<io::Stdout> {
    pub fn stdout() -> Self {
        Self::new(io::stdout())
    }
}

impl<W: Write> Sink for ConsoleReporter<W> {
    fn begin(&mut self, source: &str) -> io::Result<()> {
        writeln!(self.out, "Validating {source}...")?;
        self.out.flush()
    }

    fn diagnostic(&mut self, diag: &Diagnostic) -> io::Result<()> {
        writeln!(self.out, "{diag}")
    }

    fn finish(&mut self, summary: &ValidationSummary) -> io::Result<()> {
        writeln!(
            self.out,
            "\nValidation Complete.\nPassed: {}\nFailed: {}",
            summary.passed, summary.failed
        )?;
        self.out.flush()
    }
}

impl<S: Sink + ?Sized> Sink for &mut S {
    fn begin(&mut self, source: &str) -> io::Result<()> {
        (**self).begin(source)
    }

    fn diagnostic(&mut self, diag: &Diagnostic) -> io::Result<()> {
        (**self).diagnostic(diag)
    }

    fn accepted(&mut self, record: &Accepted<'_>) -> io::Result<()> {
        (**self).accepted(record)
    }

    fn finish(&mut self, summary: &ValidationSummary) -> io::Result<()> {
        (**self).finish(summary)
    }
}

/// Disabled sinks are `None`.
impl<S: Sink> Sink for Option<S> {
    fn begin(&mut self, source: &str) -> io::Result<()> {
        self.as_mut().map_or(Ok(()), |s| s.begin(source))
    }

    fn diagnostic(&mut self, diag: &Diagnostic) -> io::Result<()> {
        self.as_mut().map_or(Ok(()), |s| s.diagnostic(diag))
    }

    fn accepted(&mut self, record: &Accepted<'_>) -> io::Result<()> {
        self.as_mut().map_or(Ok(()), |s| s.accepted(record))
    }

    fn finish(&mut self, summary: &ValidationSummary) -> io::Result<()> {
        self.as_mut().map_or(Ok(()), |s| s.finish(summary))
    }
}

/// Fans every event out to both sinks, left first.
impl<A: Sink, B: Sink> Sink for (A, B) {
    fn begin(&mut self, source: &str) -> io::Result<()> {
        self.0.begin(source)?;
        self.1.begin(source)
    }

    fn diagnostic(&mut self, diag: &Diagnostic) -> io::Result<()> {
        self.0.diagnostic(diag)?;
        self.1.diagnostic(diag)
    }

    fn accepted(&mut self, record: &Accepted<'_>) -> io::Result<()> {
        self.0.accepted(record)?;
        self.1.accepted(record)
    }

    fn finish(&mut self, summary: &ValidationSummary) -> io::Result<()> {
        self.0.finish(summary)?;
        self.1.finish(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::RecordError;

    #[test]
    fn test_console_report_layout() {
        let mut r = ConsoleReporter::new(Vec::new());
        r.begin("data/train.jsonl").unwrap();
        r.diagnostic(&Diagnostic { line: 2, error: RecordError::MissingMessages }).unwrap();
        r.finish(&ValidationSummary { passed: 4, failed: 1, diagnostics: vec![] }).unwrap();

        let text = String::from_utf8(r.into_inner()).unwrap();
        assert_eq!(
            text,
            "Validating data/train.jsonl...\n\
             Line 2: Missing 'messages' key\n\
             \n\
             Validation Complete.\n\
             Passed: 4\n\
             Failed: 1\n"
        );
    }

    #[test]
    fn test_pair_fans_out_and_none_is_silent() {
        let mut pair = (ConsoleReporter::new(Vec::new()), None::<ConsoleReporter<Vec<u8>>>);
        pair.diagnostic(&Diagnostic { line: 1, error: RecordError::MissingRole }).unwrap();
        let text = String::from_utf8(pair.0.into_inner()).unwrap();
        assert_eq!(text, "Line 1: Missing user or assistant message\n");
    }
}
