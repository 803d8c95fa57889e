use std::path::PathBuf;

use thiserror::Error;

/// The primary error type for all operations in the `satchel` crate.
#[derive(Debug, Error)]
pub enum SatchelError {
    /// An I/O error occurred, typically while opening or writing a log
    /// destination. Includes the path where the error happened.
    #[error("I/O error on path '{}': {source}", .path.display())]
    Io {
        source: std::io::Error,
        path: PathBuf,
    },

    /// The cached selfcheck state file could not be parsed.
    #[error("malformed selfcheck state '{}': {source}", .path.display())]
    State {
        source: serde_json::Error,
        path: PathBuf,
    },

    /// A wrapper for any other error a run step surfaces.
    #[error("{0}")]
    Other(Box<dyn std::error::Error + Send + Sync>),
}

impl SatchelError {
    /// Attach a path to an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SatchelError::Io {
            source,
            path: path.into(),
        }
    }

    /// Wrap an arbitrary error from a run step.
    pub fn other(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        SatchelError::Other(Box::new(err))
    }
}
