//! Injectable time source for log record timestamps.
//!
//! The formatter never reads process-wide time or zone state directly.
//! Whoever builds a run hands it a [`Clock`], so tests can pin time without
//! touching globals and without interfering with each other.

use std::sync::Arc;

use chrono::{DateTime, FixedOffset, Local};

/// A source of the current zone-aware time.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// The real wall clock, in the process's local zone.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// A clock frozen at one instant. Intended for tests and reproducible runs.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(DateTime<FixedOffset>);

impl FixedClock {
    pub fn new(instant: DateTime<FixedOffset>) -> Self {
        FixedClock(instant)
    }

    /// Freeze at the given Unix timestamp, rendered in UTC.
    pub fn at_epoch(secs: i64) -> Self {
        let instant = DateTime::from_timestamp(secs, 0)
            .expect("epoch seconds out of datetime range")
            .fixed_offset();
        FixedClock(instant)
    }
}

impl Clock for FixedClock {
    fn now(&self) -> DateTime<FixedOffset> {
        self.0
    }
}

/// Shared handle passed down to the logging dispatcher.
pub type SharedClock = Arc<dyn Clock>;
