//! Progress reporting

/// Sink for coarse progress messages. Purely observational.
pub trait StatusReporter: Sync {
    fn report(&self, message: &str);
}

/// Discards every message
#[derive(Debug, Clone, Copy, Default)]
pub struct NullReporter;

impl StatusReporter for NullReporter {
    fn report(&self, _message: &str) {}
}

/// Forwards messages to the `log` facade at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct LogReporter;

impl StatusReporter for LogReporter {
    fn report(&self, message: &str) {
        log::info!("{}", message);
    }
}
