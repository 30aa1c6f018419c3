//! Wall-clock access for cutoff windows.

use suggest_types::Cutoff;

/// Source of "now" in epoch milliseconds.
pub trait Clock: Send + Sync {
    /// Current time, epoch milliseconds.
    fn now_millis(&self) -> i64;

    /// Score lower bound for `cutoff`, `None` when unbounded.
    fn window_start(&self, cutoff: Cutoff) -> Option<i64> {
        cutoff.window_start(self.now_millis())
    }
}

/// The system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        chrono::Utc::now().timestamp_millis()
    }
}

/// A clock frozen at a fixed instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub i64);

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.0
    }
}
