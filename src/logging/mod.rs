//! Per-run logging for command invocations.
//!
//! Every run owns a [`RunLog`]: a set of sinks that capture the messages the
//! run step emits. File sinks write one line per record, prefixed with a
//! timestamp taken from the run's injected clock at the moment of emission.
//! Messages may arrive as decoded text or as raw bytes; both are normalized
//! to text before they reach any sink.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::clock::SharedClock;
use crate::error::SatchelError;

/// Timestamp prefix for file records, e.g. `2019-01-17T06:00:37`.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

/// Severity of a single record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Level {
    Debug,
    Info,
    Warning,
    Error,
}

/// A message as handed to the dispatcher: already-decoded text, or a raw
/// byte sequence that still needs decoding.
#[derive(Debug, Clone)]
pub enum LogMessage {
    Text(String),
    Bytes(Vec<u8>),
}

impl LogMessage {
    /// Normalize to text. Byte sequences are decoded as UTF-8; invalid
    /// sequences are replaced rather than rejected, so logging raw bytes
    /// can never fault a run.
    pub fn into_text(self) -> String {
        match self {
            LogMessage::Text(text) => text,
            LogMessage::Bytes(bytes) => match String::from_utf8(bytes) {
                Ok(text) => text,
                Err(err) => String::from_utf8_lossy(err.as_bytes()).into_owned(),
            },
        }
    }
}

impl From<String> for LogMessage {
    fn from(text: String) -> Self {
        LogMessage::Text(text)
    }
}

impl From<&str> for LogMessage {
    fn from(text: &str) -> Self {
        LogMessage::Text(text.to_owned())
    }
}

impl From<Vec<u8>> for LogMessage {
    fn from(bytes: Vec<u8>) -> Self {
        LogMessage::Bytes(bytes)
    }
}

impl From<&[u8]> for LogMessage {
    fn from(bytes: &[u8]) -> Self {
        LogMessage::Bytes(bytes.to_vec())
    }
}

/// One normalized record, stamped and ready for the sinks.
#[derive(Debug, Clone)]
pub struct Record {
    pub level: Level,
    /// Formatted with [`TIMESTAMP_FORMAT`] at emission time.
    pub stamp: String,
    pub text: String,
}

/// A destination for records. Each sink filters by its own threshold.
pub trait Sink {
    fn threshold(&self) -> Level;

    fn write_record(&mut self, record: &Record) -> Result<(), SatchelError>;

    fn flush(&mut self) -> Result<(), SatchelError>;
}

/// A sink writing timestamped lines to a file.
///
/// The destination is created (or truncated) when the sink is opened, at the
/// start of the invocation, and flushed when the run closes.
pub struct FileSink {
    path: PathBuf,
    writer: BufWriter<File>,
    threshold: Level,
}

impl FileSink {
    pub fn create(path: &Path, threshold: Level) -> Result<Self, SatchelError> {
        let file = File::create(path).map_err(|e| SatchelError::io(path, e))?;
        tracing::debug!(path = %path.display(), ?threshold, "opened log destination");
        Ok(FileSink {
            path: path.to_owned(),
            writer: BufWriter::new(file),
            threshold,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Sink for FileSink {
    fn threshold(&self) -> Level {
        self.threshold
    }

    fn write_record(&mut self, record: &Record) -> Result<(), SatchelError> {
        writeln!(self.writer, "{} {}", record.stamp, record.text)
            .map_err(|e| SatchelError::io(&self.path, e))
    }

    fn flush(&mut self) -> Result<(), SatchelError> {
        self.writer.flush().map_err(|e| SatchelError::io(&self.path, e))
    }
}

/// A sink writing plain (unstamped) lines to the console: informational
/// records go to stdout, warnings and errors to stderr.
pub struct ConsoleSink {
    threshold: Level,
}

impl ConsoleSink {
    pub fn new(threshold: Level) -> Self {
        ConsoleSink { threshold }
    }
}

impl Sink for ConsoleSink {
    fn threshold(&self) -> Level {
        self.threshold
    }

    fn write_record(&mut self, record: &Record) -> Result<(), SatchelError> {
        let result = if record.level >= Level::Warning {
            writeln!(io::stderr(), "{}", record.text)
        } else {
            writeln!(io::stdout(), "{}", record.text)
        };
        result.map_err(|e| SatchelError::io("<console>", e))
    }

    fn flush(&mut self) -> Result<(), SatchelError> {
        io::stdout()
            .flush()
            .and_then(|_| io::stderr().flush())
            .map_err(|e| SatchelError::io("<console>", e))
    }
}

/// Map the `-v`/`-q` counts to a console threshold. `None` silences the
/// console entirely (`-qqq` and beyond).
pub fn console_threshold(verbose: u8, quiet: u8) -> Option<Level> {
    match i16::from(verbose) - i16::from(quiet) {
        n if n >= 1 => Some(Level::Debug),
        0 => Some(Level::Info),
        -1 => Some(Level::Warning),
        -2 => Some(Level::Error),
        _ => None,
    }
}

/// The per-run dispatcher: stamps each message once and fans it out to every
/// sink whose threshold it meets.
pub struct RunLog {
    clock: SharedClock,
    sinks: Vec<Box<dyn Sink>>,
}

impl RunLog {
    pub fn new(clock: SharedClock) -> Self {
        RunLog {
            clock,
            sinks: Vec::new(),
        }
    }

    pub fn attach(&mut self, sink: Box<dyn Sink>) {
        self.sinks.push(sink);
    }

    /// Stamp and dispatch one message. Sink write failures are reported as
    /// diagnostics and do not fault the run.
    pub fn emit(&mut self, level: Level, message: impl Into<LogMessage>) {
        let record = Record {
            level,
            stamp: self.clock.now().format(TIMESTAMP_FORMAT).to_string(),
            text: message.into().into_text(),
        };
        for sink in &mut self.sinks {
            if level >= sink.threshold() {
                if let Err(err) = sink.write_record(&record) {
                    tracing::warn!(%err, "dropping log record");
                }
            }
        }
    }

    pub fn debug(&mut self, message: impl Into<LogMessage>) {
        self.emit(Level::Debug, message);
    }

    pub fn info(&mut self, message: impl Into<LogMessage>) {
        self.emit(Level::Info, message);
    }

    pub fn warning(&mut self, message: impl Into<LogMessage>) {
        self.emit(Level::Warning, message);
    }

    pub fn error(&mut self, message: impl Into<LogMessage>) {
        self.emit(Level::Error, message);
    }

    /// Flush every sink, reporting the first failure.
    pub fn flush(&mut self) -> Result<(), SatchelError> {
        let mut first_err = None;
        for sink in &mut self.sinks {
            if let Err(err) = sink.flush() {
                first_err.get_or_insert(err);
            }
        }
        match first_err {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

/// Install the process-wide diagnostic subscriber for the binary.
///
/// Runner internals (sink lifecycle, state transitions) are reported through
/// `tracing`; the filter honors `SATCHEL_LOG` and defaults to warnings only.
pub fn init_diagnostics() {
    let filter = tracing_subscriber::EnvFilter::try_from_env("SATCHEL_LOG")
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .try_init();
}
