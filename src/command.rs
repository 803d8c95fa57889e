//! The command abstraction and its runner.
//!
//! A [`Command`] is a name, a one-line summary and a run step supplied as a
//! function value. [`Command::main`] owns the whole invocation: it parses the
//! argument list, attaches the log sinks the options ask for, drives the run
//! step and maps its outcome to an exit status. Sinks are flushed and
//! released on every exit path, so anything the step logged before a failure
//! is preserved in the destination files.

use std::ffi::OsString;
use std::sync::Arc;

use clap::Parser;

use crate::cli::GlobalOptions;
use crate::clock::{SharedClock, SystemClock};
use crate::error::SatchelError;
use crate::exit::{self, ExitRequest};
use crate::logging::{self, ConsoleSink, FileSink, Level, RunLog};
use crate::version_check;

/// What a run step can hand back besides success.
#[derive(Debug)]
pub enum RunError {
    /// The controlled failure: terminate the invocation with the requested
    /// status. Caught at the `main` boundary, never propagated as a fault.
    Exit(ExitRequest),

    /// An unexpected fault. Recorded at error level and mapped to
    /// [`exit::INTERNAL_ERROR`].
    Fault(SatchelError),
}

impl From<ExitRequest> for RunError {
    fn from(request: ExitRequest) -> Self {
        RunError::Exit(request)
    }
}

impl From<SatchelError> for RunError {
    fn from(err: SatchelError) -> Self {
        RunError::Fault(err)
    }
}

/// Everything a run step sees: the parsed shared options, the positional
/// arguments left over after parsing, and the run's log.
pub struct RunContext<'a> {
    pub options: &'a GlobalOptions,
    pub args: &'a [String],
    pub log: &'a mut RunLog,
}

/// The run capability a [`Command`] is built around.
pub type RunStep = dyn Fn(&mut RunContext<'_>) -> Result<(), RunError>;

/// Lifecycle of one invocation. The transition to `Closed` always happens,
/// on the success and the failure path alike.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum RunState {
    Created,
    Running,
    Succeeded,
    Failed,
    Closed,
}

/// Per-command argument surface: the shared options plus whatever positional
/// arguments the run step wants to interpret itself.
#[derive(Parser, Debug)]
struct Invocation {
    #[command(flatten)]
    options: GlobalOptions,

    /// Arguments forwarded to the command's run step.
    #[arg(value_name = "ARGS")]
    args: Vec<String>,
}

/// Sinks plus lifecycle state for one invocation, kept together so the
/// scope guard can close both at once.
struct ActiveRun {
    log: RunLog,
    state: RunState,
}

/// A single satchel command.
pub struct Command {
    name: String,
    summary: String,
    run: Box<RunStep>,
    clock: SharedClock,
}

impl Command {
    pub fn new(
        name: impl Into<String>,
        summary: impl Into<String>,
        run: impl Fn(&mut RunContext<'_>) -> Result<(), RunError> + 'static,
    ) -> Self {
        Command {
            name: name.into(),
            summary: summary.into(),
            run: Box::new(run),
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the wall clock, e.g. with a frozen clock in tests.
    pub fn with_clock(mut self, clock: SharedClock) -> Self {
        self.clock = clock;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn summary(&self) -> &str {
        &self.summary
    }

    /// Run the command against an argument list and return its exit status.
    ///
    /// This is the whole contract: parse, attach sinks, run, close. A parse
    /// failure prints clap's rendering and returns without running the step;
    /// help and version requests return success the same way.
    pub fn main<I, S>(&self, args: I) -> i32
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let argv: Vec<OsString> = std::iter::once(OsString::from(self.name.clone()))
            .chain(args.into_iter().map(Into::into))
            .collect();
        let invocation = match Invocation::try_parse_from(argv) {
            Ok(invocation) => invocation,
            Err(err) => {
                let code = err.exit_code();
                let _ = err.print();
                return code;
            }
        };
        self.execute(&invocation.options, &invocation.args)
    }

    fn execute(&self, options: &GlobalOptions, args: &[String]) -> i32 {
        let mut log = RunLog::new(self.clock.clone());
        if let Some(threshold) = logging::console_threshold(options.verbose, options.quiet) {
            log.attach(Box::new(ConsoleSink::new(threshold)));
        }
        for (path, threshold) in [
            (&options.log, Level::Info),
            (&options.log_file, Level::Debug),
        ] {
            if let Some(path) = path {
                match FileSink::create(path, threshold) {
                    Ok(sink) => log.attach(Box::new(sink)),
                    Err(err) => {
                        eprintln!("Error: {err}");
                        return exit::INTERNAL_ERROR;
                    }
                }
            }
        }

        let mut run = scopeguard::guard(
            ActiveRun {
                log,
                state: RunState::Created,
            },
            |mut run| {
                if let Err(err) = run.log.flush() {
                    tracing::warn!(%err, "failed to flush log sinks");
                }
                run.state = RunState::Closed;
                tracing::debug!(state = ?run.state, "run closed");
            },
        );

        run.state = RunState::Running;
        tracing::debug!(command = %self.name, state = ?run.state, "run started");

        let outcome = {
            let mut ctx = RunContext {
                options,
                args,
                log: &mut run.log,
            };
            (self.run)(&mut ctx)
        };

        let code = match outcome {
            Ok(()) => {
                run.state = RunState::Succeeded;
                exit::SUCCESS
            }
            Err(RunError::Exit(request)) => {
                run.state = RunState::Failed;
                tracing::debug!(code = request.code, "run step requested exit");
                request.code
            }
            Err(RunError::Fault(err)) => {
                run.state = RunState::Failed;
                run.log.error(format!("{err}"));
                exit::INTERNAL_ERROR
            }
        };

        if run.state == RunState::Succeeded && !options.no_version_check {
            version_check::maybe_warn_newer_version(options, &mut run.log, self.clock.as_ref());
        }

        drop(run);
        code
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;
    use std::rc::Rc;

    #[test]
    fn test_usage_error_skips_run_step() {
        let ran = Rc::new(Cell::new(false));
        let ran_probe = Rc::clone(&ran);
        let command = Command::new("fake", "fake", move |_ctx: &mut RunContext<'_>| {
            ran_probe.set(true);
            Ok(())
        });

        let code = command.main(["--definitely-not-a-flag"]);

        assert_eq!(code, exit::INTERNAL_ERROR);
        assert!(!ran.get());
    }

    #[test]
    fn test_success_maps_to_zero() {
        let command = Command::new("fake", "fake", |_ctx: &mut RunContext<'_>| Ok(()));
        assert_eq!(command.main(["--no-version-check"]), exit::SUCCESS);
    }

    #[test]
    fn test_requested_exit_code_propagates() {
        let command = Command::new("fake", "fake", |_ctx: &mut RunContext<'_>| {
            Err(ExitRequest::new(7).into())
        });
        assert_eq!(command.main(["--no-version-check"]), 7);
    }
}
