//! Upgrade hint based on cached release information.
//!
//! After a successful run, satchel may suggest upgrading itself. The hint
//! only consults the selfcheck state the resolver leaves in the cache
//! directory; this module never touches the network. Absent, stale or
//! malformed state silently disables the hint, and `--no-version-check`
//! suppresses it altogether.

use std::fs;
use std::path::Path;

use chrono::{DateTime, Duration};
use serde::{Deserialize, Serialize};

use crate::cli::GlobalOptions;
use crate::clock::Clock;
use crate::error::SatchelError;
use crate::logging::RunLog;

/// File under the cache dir holding the last known release information.
pub const STATE_FILE_NAME: &str = "selfcheck.json";

/// The hint goes quiet when the cached answer is older than this.
const MAX_STATE_AGE_DAYS: i64 = 7;

/// Cached release information, written by the resolver whenever it talks to
/// the package index and read back here.
#[derive(Debug, Serialize, Deserialize)]
pub struct SelfCheckState {
    /// RFC 3339 instant of the last successful index query.
    pub last_check: String,
    /// Newest release known at that instant.
    pub latest_version: String,
}

/// Emit a warning record when the cached state names a release newer than
/// the running one. Every failure mode degrades to staying quiet.
pub fn maybe_warn_newer_version(options: &GlobalOptions, log: &mut RunLog, clock: &dyn Clock) {
    let Some(cache_dir) = options.cache_dir.as_deref() else {
        return;
    };
    let path = cache_dir.join(STATE_FILE_NAME);
    let state = match read_state(&path) {
        Ok(Some(state)) => state,
        Ok(None) => return,
        Err(err) => {
            tracing::debug!(%err, "ignoring selfcheck state");
            return;
        }
    };
    let last_check = match DateTime::parse_from_rfc3339(&state.last_check) {
        Ok(instant) => instant,
        Err(err) => {
            tracing::debug!(%err, "ignoring selfcheck state with a bad timestamp");
            return;
        }
    };
    if clock.now().signed_duration_since(last_check) > Duration::days(MAX_STATE_AGE_DAYS) {
        tracing::debug!(path = %path.display(), "selfcheck state is stale");
        return;
    }

    let current = env!("CARGO_PKG_VERSION");
    if version_newer(&state.latest_version, current) {
        log.warning(format!(
            "You are using satchel {current}, however version {} is available. \
             You should consider upgrading.",
            state.latest_version
        ));
    }
}

fn read_state(path: &Path) -> Result<Option<SelfCheckState>, SatchelError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(SatchelError::io(path, err)),
    };
    let state = serde_json::from_str(&text).map_err(|source| SatchelError::State {
        source,
        path: path.to_owned(),
    })?;
    Ok(Some(state))
}

/// Dotted-numeric comparison; non-numeric components count as zero.
fn version_newer(candidate: &str, current: &str) -> bool {
    version_key(candidate) > version_key(current)
}

fn version_key(version: &str) -> Vec<u64> {
    version
        .split('.')
        .map(|part| part.trim().parse().unwrap_or(0))
        .collect()
}
