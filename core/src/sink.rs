//! Destinations for synthesized log records.

use crate::{Severity, FATAL_EXIT_CODE};

/// Receiver of synthesized records, with one method per severity.
///
/// Every method receives the record body. The provided [`LogSink::fatal`]
/// writes the body to stderr and terminates the process with
/// [`FATAL_EXIT_CODE`]; sinks used in tests override it with a
/// non-terminating implementation.
pub trait LogSink {
    /// Emits a fatal record.
    fn fatal(&mut self, message: &str) {
        eprintln!("{message}");
        std::process::exit(FATAL_EXIT_CODE);
    }

    /// Emits an error record.
    fn error(&mut self, message: &str);

    /// Emits a warning record.
    fn warn(&mut self, message: &str);

    /// Emits an informational record.
    fn info(&mut self, message: &str);

    /// Emits a debug record.
    fn debug(&mut self, message: &str);

    /// Emits a trace record.
    fn trace(&mut self, message: &str);

    /// Dispatches the record to the method matching `severity`.
    fn emit(&mut self, severity: Severity, message: &str) {
        match severity {
            Severity::Fatal => self.fatal(message),
            Severity::Error => self.error(message),
            Severity::Warn => self.warn(message),
            Severity::Info => self.info(message),
            Severity::Debug => self.debug(message),
            Severity::Trace => self.trace(message),
        }
    }
}

impl<S: LogSink + ?Sized> LogSink for &mut S {
    fn fatal(&mut self, message: &str) {
        (**self).fatal(message);
    }

    fn error(&mut self, message: &str) {
        (**self).error(message);
    }

    fn warn(&mut self, message: &str) {
        (**self).warn(message);
    }

    fn info(&mut self, message: &str) {
        (**self).info(message);
    }

    fn debug(&mut self, message: &str) {
        (**self).debug(message);
    }

    fn trace(&mut self, message: &str) {
        (**self).trace(message);
    }
}

/// Sink that drops every record, fatal ones included.
#[derive(Clone, Copy, Debug, Default)]
pub struct DiscardSink;

impl LogSink for DiscardSink {
    fn fatal(&mut self, _message: &str) {}

    fn error(&mut self, _message: &str) {}

    fn warn(&mut self, _message: &str) {}

    fn info(&mut self, _message: &str) {}

    fn debug(&mut self, _message: &str) {}

    fn trace(&mut self, _message: &str) {}
}

/// Sink that keeps every record in emission order.
///
/// Fatal records are captured like any other level instead of ending the process.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CaptureSink {
    records: Vec<(Severity, String)>,
}

impl CaptureSink {
    /// Creates an empty capture buffer.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records captured so far, oldest first.
    #[must_use]
    pub fn records(&self) -> &[(Severity, String)] {
        &self.records
    }

    /// Number of captured records of the provided level.
    #[must_use]
    pub fn count(&self, severity: Severity) -> usize {
        self.records
            .iter()
            .filter(|(captured, _)| *captured == severity)
            .count()
    }

    /// Drops every captured record.
    pub fn clear(&mut self) {
        self.records.clear();
    }

    fn push(&mut self, severity: Severity, message: &str) {
        self.records.push((severity, message.to_owned()));
    }
}

impl LogSink for CaptureSink {
    fn fatal(&mut self, message: &str) {
        self.push(Severity::Fatal, message);
    }

    fn error(&mut self, message: &str) {
        self.push(Severity::Error, message);
    }

    fn warn(&mut self, message: &str) {
        self.push(Severity::Warn, message);
    }

    fn info(&mut self, message: &str) {
        self.push(Severity::Info, message);
    }

    fn debug(&mut self, message: &str) {
        self.push(Severity::Debug, message);
    }

    fn trace(&mut self, message: &str) {
        self.push(Severity::Trace, message);
    }
}
