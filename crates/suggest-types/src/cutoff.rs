//! Relative time windows shared by all candidate sources.
//!
//! A cutoff of zero is a sentinel for "no time restriction", not an empty
//! window. Months are fixed 30-day periods.

use serde::{Deserialize, Serialize};

/// Milliseconds in a 30-day month.
pub const MILLIS_PER_MONTH: u64 = 2_592_000_000;

/// A relative time window in milliseconds, `0` meaning unbounded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Cutoff(u64);

impl Cutoff {
    /// The unbounded sentinel.
    pub const UNBOUNDED: Cutoff = Cutoff(0);

    /// Create a cutoff from a raw millisecond window.
    pub fn from_millis(millis: u64) -> Self {
        Self(millis)
    }

    /// Convert a month count into a cutoff.
    ///
    /// `0` stays unbounded; anything else is `months * 2_592_000_000` ms.
    pub fn from_months(months: u32) -> Self {
        Self((months as u64).saturating_mul(MILLIS_PER_MONTH))
    }

    /// Window length in milliseconds (`0` when unbounded).
    pub fn as_millis(&self) -> u64 {
        self.0
    }

    /// Whether this cutoff imposes no time restriction.
    pub fn is_unbounded(&self) -> bool {
        self.0 == 0
    }

    /// Lower score bound (epoch ms) for a window ending at `now_ms`.
    ///
    /// Returns `None` when unbounded.
    pub fn window_start(&self, now_ms: i64) -> Option<i64> {
        if self.is_unbounded() {
            return None;
        }
        let span = i64::try_from(self.0).unwrap_or(i64::MAX);
        Some(now_ms.saturating_sub(span))
    }

    /// Window length in whole seconds for services that work in seconds.
    ///
    /// Returns `None` when unbounded.
    pub fn as_secs(&self) -> Option<u64> {
        if self.is_unbounded() {
            None
        } else {
            Some(self.0 / 1000)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_months_is_unbounded() {
        let cutoff = Cutoff::from_months(0);
        assert!(cutoff.is_unbounded());
        assert_eq!(cutoff.window_start(1_700_000_000_000), None);
        assert_eq!(cutoff.as_secs(), None);
    }

    #[test]
    fn test_months_use_thirty_day_periods() {
        assert_eq!(Cutoff::from_months(1).as_millis(), 2_592_000_000);
        assert_eq!(Cutoff::from_months(3).as_millis(), 7_776_000_000);
    }

    #[test]
    fn test_window_start() {
        let cutoff = Cutoff::from_months(1);
        let now = 10_000_000_000;
        assert_eq!(cutoff.window_start(now), Some(now - 2_592_000_000));
        assert_eq!(cutoff.as_secs(), Some(2_592_000));
    }

    #[test]
    fn test_window_start_saturates() {
        let cutoff = Cutoff::from_months(u32::MAX);
        assert_eq!(cutoff.window_start(0), Some(-i64::MAX));
    }
}
