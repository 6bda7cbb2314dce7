//! Randomized inter-request pacing
//!
//! A uniformly random pause before every page fetch is the sole
//! anti-detection mechanism; there is no header rotation or other jitter.

use std::time::Duration;

use crate::config::DelayBounds;

/// Produces the wait inserted before each page fetch.
pub struct DelayScheduler {
    bounds: DelayBounds,
}

impl DelayScheduler {
    pub fn new(bounds: DelayBounds) -> Self {
        Self { bounds }
    }

    /// Next wait duration.
    ///
    /// With the upper bound disabled this is exactly `min`. An inverted
    /// configuration (`max < min`) yields `max`: never wait longer than the
    /// stated ceiling even if misconfigured. Otherwise a uniformly random
    /// whole-second duration in `[min, max]` inclusive.
    pub fn next_delay(&self) -> Duration {
        let secs = match self.bounds.max {
            None => self.bounds.min,
            Some(max) if max < self.bounds.min => max,
            Some(max) => fastrand::u64(self.bounds.min..=max),
        };
        Duration::from_secs(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_delay_within_bounds() {
        let scheduler = DelayScheduler::new(DelayBounds {
            min: 5,
            max: Some(15),
        });
        for _ in 0..200 {
            let delay = scheduler.next_delay().as_secs();
            assert!((5..=15).contains(&delay), "delay {} out of bounds", delay);
        }
    }

    #[test]
    fn test_inverted_bounds_return_max() {
        let scheduler = DelayScheduler::new(DelayBounds {
            min: 10,
            max: Some(1),
        });
        assert_eq!(scheduler.next_delay(), Duration::from_secs(1));
    }

    #[test]
    fn test_disabled_max_returns_min() {
        let scheduler = DelayScheduler::new(DelayBounds { min: 7, max: None });
        assert_eq!(scheduler.next_delay(), Duration::from_secs(7));
    }

    #[test]
    fn test_equal_bounds() {
        let scheduler = DelayScheduler::new(DelayBounds {
            min: 3,
            max: Some(3),
        });
        assert_eq!(scheduler.next_delay(), Duration::from_secs(3));
    }
}
