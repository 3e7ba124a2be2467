//! Default sink that turns synthesized records into `tracing` events.

use logmix_core::{LogSink, FATAL_EXIT_CODE};

/// Target attached to every synthesized record so subscribers can tell them
/// apart from the generator's own diagnostics.
pub const RECORD_TARGET: &str = "logmix::records";

/// Sink forwarding each record to the `tracing` macro of the same level.
///
/// `tracing` has no fatal level: fatal records are logged at `ERROR` with a
/// `fatal = true` field, after which the process exits with
/// [`FATAL_EXIT_CODE`].
#[derive(Clone, Copy, Debug, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn fatal(&mut self, message: &str) {
        tracing::error!(target: RECORD_TARGET, fatal = true, "{message}");
        std::process::exit(FATAL_EXIT_CODE);
    }

    fn error(&mut self, message: &str) {
        tracing::error!(target: RECORD_TARGET, "{message}");
    }

    fn warn(&mut self, message: &str) {
        tracing::warn!(target: RECORD_TARGET, "{message}");
    }

    fn info(&mut self, message: &str) {
        tracing::info!(target: RECORD_TARGET, "{message}");
    }

    fn debug(&mut self, message: &str) {
        tracing::debug!(target: RECORD_TARGET, "{message}");
    }

    fn trace(&mut self, message: &str) {
        tracing::trace!(target: RECORD_TARGET, "{message}");
    }
}

#[cfg(test)]
mod tests {
    use std::{
        io,
        sync::{Arc, Mutex},
    };

    use logmix_core::{LogSink, Severity};
    use tracing::Level;

    use super::{TracingSink, RECORD_TARGET};

    #[derive(Clone, Default)]
    struct SharedBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for SharedBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0
                .lock()
                .expect("buffer lock poisoned")
                .extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(max_level: Level, emit: impl FnOnce(&mut TracingSink)) -> String {
        let buffer = SharedBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_max_level(max_level)
            .with_ansi(false)
            .without_time()
            .finish();

        tracing::subscriber::with_default(subscriber, || emit(&mut TracingSink));

        let bytes = buffer.0.lock().expect("buffer lock poisoned").clone();
        String::from_utf8(bytes).expect("utf-8 log output")
    }

    #[test]
    fn non_fatal_levels_map_to_matching_tracing_levels() {
        let output = capture(Level::TRACE, |sink| {
            for severity in &Severity::ALL[1..] {
                sink.emit(*severity, severity.placeholder_message());
            }
        });

        let lines: Vec<&str> = output.lines().collect();
        assert_eq!(lines.len(), 5, "unexpected output: {output}");
        for (line, (level, severity)) in lines.iter().zip([
            ("ERROR", Severity::Error),
            ("WARN", Severity::Warn),
            ("INFO", Severity::Info),
            ("DEBUG", Severity::Debug),
            ("TRACE", Severity::Trace),
        ]) {
            assert!(line.contains(level), "{line}");
            assert!(line.contains(RECORD_TARGET), "{line}");
            assert!(line.contains(severity.placeholder_message()), "{line}");
        }
    }

    #[test]
    fn subscriber_level_filters_records() {
        let output = capture(Level::WARN, |sink| {
            sink.info("hidden");
            sink.warn("shown");
        });

        assert!(output.contains("shown"));
        assert!(!output.contains("hidden"));
    }
}
