//! Exit statuses shared by every command.

use std::fmt;

/// The run completed normally.
pub const SUCCESS: i32 = 0;
/// The run step requested termination (the usual failure status).
pub const ERROR: i32 = 1;
/// An unexpected fault or a usage error. Matches clap's usage-error status.
pub const INTERNAL_ERROR: i32 = 2;

/// A run step's request to terminate the invocation with a specific status.
///
/// This is the only controlled way for a run step to fail: the request is
/// caught at the `main` boundary and converted into the process exit code,
/// with everything already written to the log destinations preserved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitRequest {
    pub code: i32,
}

impl ExitRequest {
    pub fn new(code: i32) -> Self {
        ExitRequest { code }
    }
}

impl fmt::Display for ExitRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "exit requested with status {}", self.code)
    }
}

/// Convert an exit status into the form `std::process::exit` machinery wants.
/// Statuses outside `0..=255` collapse to `INTERNAL_ERROR`.
pub fn to_process_code(code: i32) -> u8 {
    u8::try_from(code).unwrap_or(INTERNAL_ERROR as u8)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_process_code_passes_small_statuses() {
        assert_eq!(to_process_code(SUCCESS), 0);
        assert_eq!(to_process_code(ERROR), 1);
        assert_eq!(to_process_code(42), 42);
    }

    #[test]
    fn test_to_process_code_collapses_out_of_range() {
        assert_eq!(to_process_code(-1), 2);
        assert_eq!(to_process_code(300), 2);
    }
}
