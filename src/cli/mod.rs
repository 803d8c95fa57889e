use std::io::{self, Write};
use std::path::PathBuf;

use clap::Args;

use crate::commands;

/// Options shared by every satchel command.
#[derive(Args, Debug, Clone, Default)]
pub struct GlobalOptions {
    /// Write informational log records to PATH. The file is created (or
    /// truncated) at the start of the invocation.
    #[arg(long, value_name = "PATH")]
    pub log: Option<PathBuf>,

    /// Write verbose log records, including debug output, to PATH.
    #[arg(long = "log-file", value_name = "PATH")]
    pub log_file: Option<PathBuf>,

    /// Give more console output. Option is additive, and can be used up to 3 times.
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Give less console output. Option is additive, and can be used up to 3 times.
    #[arg(short = 'q', long = "quiet", action = clap::ArgAction::Count)]
    pub quiet: u8,

    /// Don't check whether a newer satchel release is available after the command finishes.
    #[arg(long = "no-version-check")]
    pub no_version_check: bool,

    /// Directory holding satchel's cached state (selfcheck data).
    #[arg(long = "cache-dir", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,
}

/// Render the top-level usage screen: one line per registered command.
pub fn print_usage(mut out: impl Write) -> io::Result<()> {
    writeln!(out, "satchel {}", env!("CARGO_PKG_VERSION"))?;
    writeln!(out)?;
    writeln!(out, "Usage: satchel <command> [options]")?;
    writeln!(out)?;
    writeln!(out, "Commands:")?;
    for command in commands::all() {
        writeln!(out, "  {:<10} {}", command.name(), command.summary())?;
    }
    writeln!(out)?;
    writeln!(out, "Run 'satchel <command> --help' for command options.")?;
    Ok(())
}
