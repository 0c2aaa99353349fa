use std::fmt;

/// Severity of a logged message.
#[derive(Clone, Copy, Debug, Eq, PartialEq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warn,
    Error,
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            Level::Debug => "debug",
            Level::Info => "info",
            Level::Warn => "warn",
            Level::Error => "error",
        };
        write!(f, "{s}")
    }
}

/// A single captured log line, as delivered to the logger's sink.
#[derive(Clone, Debug)]
pub struct Record {
    pub level: Level,
    pub message: String,
}

/// A four-level, non-global logger owned by a `Document`.
///
/// There is no process-wide facade: every document carries its own logger
/// instance, and transforms log through it rather than through a global.
pub struct Logger {
    sink: Box<dyn FnMut(Record) + Send>,
}

impl Logger {
    /// Creates a logger that forwards every record to `sink`.
    pub fn new<F>(sink: F) -> Self
    where
        F: FnMut(Record) + Send + 'static,
    {
        Logger { sink: Box::new(sink) }
    }

    /// Creates a logger that writes formatted lines to stderr.
    pub fn stderr() -> Self {
        Logger::new(|record| eprintln!("[{}] {}", record.level, record.message))
    }

    /// Creates a logger that discards every record.
    pub fn silent() -> Self {
        Logger::new(|_| {})
    }

    fn log(&mut self, level: Level, message: impl Into<String>) {
        (self.sink)(Record { level, message: message.into() });
    }

    pub fn debug(&mut self, message: impl Into<String>) {
        self.log(Level::Debug, message);
    }

    pub fn info(&mut self, message: impl Into<String>) {
        self.log(Level::Info, message);
    }

    pub fn warn(&mut self, message: impl Into<String>) {
        self.log(Level::Warn, message);
    }

    pub fn error(&mut self, message: impl Into<String>) {
        self.log(Level::Error, message);
    }
}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Logger").finish_non_exhaustive()
    }
}

impl Default for Logger {
    fn default() -> Self {
        Logger::stderr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Arc, Mutex};

    #[test]
    fn captures_records_in_order() {
        let captured = Arc::new(Mutex::new(Vec::new()));
        let sink_captured = captured.clone();
        let mut logger = Logger::new(move |record: Record| {
            sink_captured.lock().unwrap().push((record.level, record.message));
        });
        logger.debug("starting");
        logger.warn("skipped an attribute");
        logger.error("failed");

        let records = captured.lock().unwrap();
        assert_eq!(records.len(), 3);
        assert_eq!(records[0].0, Level::Debug);
        assert_eq!(records[1].0, Level::Warn);
        assert_eq!(records[1].1, "skipped an attribute");
        assert_eq!(records[2].0, Level::Error);
    }

    #[test]
    fn level_ordering() {
        assert!(Level::Debug < Level::Info);
        assert!(Level::Info < Level::Warn);
        assert!(Level::Warn < Level::Error);
    }
}
