//! Monotonic high-resolution clock.
//!
//! All timestamps in a process share one anchor, so values from different
//! threads are mutually comparable and never go backwards.

use std::sync::OnceLock;
use std::time::Instant;

static EPOCH: OnceLock<Instant> = OnceLock::new();

/// Nanoseconds since the first call in this process. Monotonic.
pub fn nanos() -> i64 {
    let elapsed = EPOCH.get_or_init(Instant::now).elapsed();
    i64::try_from(elapsed.as_nanos()).unwrap_or(i64::MAX)
}
