//! `satchel doctor`: environment diagnostics.
//!
//! Reports what this installation looks like from the inside. Diagnostics
//! only; the command always exits successfully, surfacing problems as
//! warnings instead of failures.

use crate::command::{Command, RunContext, RunError};
use crate::version_check;

pub fn command() -> Command {
    Command::new(
        "doctor",
        "Print diagnostics for this satchel installation.",
        run,
    )
}

fn run(ctx: &mut RunContext<'_>) -> Result<(), RunError> {
    ctx.log.info(format!(
        "satchel {} on {} ({})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    ));
    ctx.log.debug(format!("arguments: {:?}", ctx.args));
    if let Ok(cwd) = std::env::current_dir() {
        ctx.log.debug(format!("working directory: {}", cwd.display()));
    }

    for (flag, destination) in [
        ("--log", &ctx.options.log),
        ("--log-file", &ctx.options.log_file),
    ] {
        if let Some(path) = destination {
            ctx.log
                .info(format!("{flag} destination open at {}", path.display()));
        }
    }

    match ctx.options.cache_dir.as_deref() {
        Some(dir) if !dir.is_dir() => {
            ctx.log
                .warning(format!("cache directory {} does not exist", dir.display()));
        }
        Some(dir) => {
            let state = dir.join(version_check::STATE_FILE_NAME);
            if state.is_file() {
                ctx.log
                    .info(format!("selfcheck state present at {}", state.display()));
            } else {
                ctx.log.info("no selfcheck state cached yet");
            }
        }
        None => ctx.log.debug("no cache directory configured"),
    }

    Ok(())
}
