//! Pagination window for suggestion results.

use serde::{Deserialize, Serialize};

use crate::error::SuggestError;

/// An inclusive, 0-based `[start, stop]` window.
///
/// `stop == None` means "through the end" and is what a caller's `-1`
/// sentinel maps to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageWindow {
    /// First index to return
    pub start: usize,
    /// Last index to return (inclusive), `None` for unbounded
    pub stop: Option<usize>,
}

impl PageWindow {
    /// Build a window from caller-style arguments where `stop == -1` means
    /// unbounded.
    pub fn new(start: usize, stop: i64) -> Result<Self, SuggestError> {
        match stop {
            -1 => Ok(Self::unbounded(start)),
            s if s < -1 => Err(SuggestError::InvalidInput(format!(
                "stop must be -1 or a non-negative index, got {}",
                s
            ))),
            s => {
                let stop = usize::try_from(s)
                    .map_err(|e| SuggestError::InvalidInput(format!("stop out of range: {}", e)))?;
                Ok(Self::from_range(start, stop))
            }
        }
    }

    /// A bounded window covering `start..=stop`.
    pub fn from_range(start: usize, stop: usize) -> Self {
        Self {
            start,
            stop: Some(stop),
        }
    }

    /// A window from `start` through the end.
    pub fn unbounded(start: usize) -> Self {
        Self { start, stop: None }
    }

    /// Number of items the caller asked for, `None` when unbounded.
    ///
    /// A window whose `stop` precedes `start` asks for nothing.
    pub fn requested_len(&self) -> Option<usize> {
        self.stop
            .map(|stop| stop.checked_sub(self.start).map_or(0, |d| d + 1))
    }

    /// Whether a pool of `available` candidates is too small to fill the page.
    ///
    /// Unbounded windows never need a backfill.
    pub fn needs_backfill(&self, available: usize) -> bool {
        self.requested_len()
            .map(|wanted| available < wanted)
            .unwrap_or(false)
    }

    /// Slice `items` to this window.
    pub fn apply<T>(&self, items: Vec<T>) -> Vec<T> {
        let iter = items.into_iter().skip(self.start);
        match self.requested_len() {
            Some(len) => iter.take(len).collect(),
            None => iter.collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minus_one_is_unbounded() {
        let window = PageWindow::new(0, -1).unwrap();
        assert_eq!(window.stop, None);
        assert_eq!(window.requested_len(), None);
        assert!(!window.needs_backfill(0));
    }

    #[test]
    fn test_rejects_other_negative_stops() {
        assert!(PageWindow::new(0, -2).is_err());
    }

    #[test]
    fn test_requested_len() {
        assert_eq!(PageWindow::from_range(0, 4).requested_len(), Some(5));
        assert_eq!(PageWindow::from_range(5, 9).requested_len(), Some(5));
        assert_eq!(PageWindow::from_range(3, 1).requested_len(), Some(0));
    }

    #[test]
    fn test_needs_backfill() {
        let window = PageWindow::from_range(0, 4);
        assert!(window.needs_backfill(4));
        assert!(!window.needs_backfill(5));
        assert!(!PageWindow::from_range(3, 1).needs_backfill(0));
    }

    #[test]
    fn test_apply_bounded() {
        let items: Vec<u32> = (0..10).collect();
        assert_eq!(PageWindow::from_range(2, 4).apply(items), vec![2, 3, 4]);
    }

    #[test]
    fn test_apply_unbounded() {
        let items: Vec<u32> = (0..5).collect();
        assert_eq!(PageWindow::unbounded(3).apply(items), vec![3, 4]);
    }

    #[test]
    fn test_apply_start_past_end_is_empty() {
        let items: Vec<u32> = (0..3).collect();
        assert!(PageWindow::from_range(7, 9).apply(items).is_empty());
    }

    #[test]
    fn test_apply_short_tail() {
        let items: Vec<u32> = (0..3).collect();
        assert_eq!(PageWindow::from_range(1, 9).apply(items), vec![1, 2]);
    }
}
