//! Poll cadence
//!
//! Sleeps are aimed at the next multiple of the interval on the wall clock,
//! so timestamps stay round even when a poll occasionally runs long. The
//! target is recomputed every cycle; nothing accumulates.

use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::constants::timing;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PollSchedule {
    interval: Duration,
}

impl PollSchedule {
    /// `interval` must be non-zero (config validation guarantees it)
    pub fn new(interval: Duration) -> Self {
        Self { interval }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Delay until the next aligned slot, clamped to `[interval/4, interval*1.5]`
    pub fn next_delay(&self, now: SystemTime) -> Duration {
        let now_secs = now
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs_f64())
            .unwrap_or(0.0);
        next_delay_secs(self.interval.as_secs_f64(), now_secs)
    }
}

/// `floor(now/interval + 1) * interval - now`, clamped
pub fn next_delay_secs(interval: f64, now: f64) -> Duration {
    let next_slot = (now / interval + 1.0).floor() * interval;
    let min = interval * timing::MIN_DELAY_FACTOR;
    let max = interval * timing::MAX_DELAY_FACTOR;
    let delay = (next_slot - now).min(max).max(min);
    Duration::from_secs_f64(delay)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn secs(d: Duration) -> f64 {
        d.as_secs_f64()
    }

    #[test]
    fn test_aligns_to_next_slot() {
        assert!((secs(next_delay_secs(30.0, 1_000_030.0)) - 20.0).abs() < 1e-6);
        assert!((secs(next_delay_secs(30.0, 1_000_049.0)) - 30.0 * 0.25).abs() < 1e-6);
    }

    #[test]
    fn test_exactly_on_slot_waits_full_interval() {
        // 1_000_020 is a multiple of 30
        assert!((secs(next_delay_secs(30.0, 1_000_020.0)) - 30.0).abs() < 1e-6);
    }

    #[test]
    fn test_near_slot_is_clamped_to_quarter() {
        let delay = next_delay_secs(10.0, 1_000_009.9);
        assert!((secs(delay) - 2.5).abs() < 1e-6);
    }

    #[test]
    fn test_fractional_interval() {
        let delay = next_delay_secs(0.5, 100.1);
        assert!((secs(delay) - 0.4).abs() < 1e-6);
    }

    #[test]
    fn test_schedule_wraps_system_time() {
        let schedule = PollSchedule::new(Duration::from_secs(30));
        let now = UNIX_EPOCH + Duration::from_secs(1_000_010);
        assert!((secs(schedule.next_delay(now)) - 10.0).abs() < 1e-6);
    }

    #[test]
    fn test_converges_onto_grid() {
        // Each poll takes 3.7s of work; wake-ups still land on multiples of 30
        let interval = 30.0;
        let mut now = 1_000_003.3;
        for _ in 0..20 {
            now += secs(next_delay_secs(interval, now));
            let offset = now % interval;
            assert!(offset < 1e-6 || interval - offset < 1e-6, "offset {}", offset);
            now += 3.7;
        }
    }

    proptest! {
        #[test]
        fn prop_delay_within_bounds(interval in 0.01f64..3600.0, now in 0.0f64..4.0e9) {
            let delay = secs(next_delay_secs(interval, now));
            prop_assert!(delay >= interval * 0.25 - 1e-8);
            prop_assert!(delay <= interval * 1.5 + 1e-8);
        }

        #[test]
        fn prop_slow_poll_self_corrects(interval in 1.0f64..600.0, start in 0.0f64..1.0e9, overrun in 0.0f64..0.7) {
            // One slow cycle overruns, the next wake-up is back on the grid
            let mut now = start;
            now += secs(next_delay_secs(interval, now));
            now += interval * overrun;
            let delay = secs(next_delay_secs(interval, now));
            now += delay;
            if delay > interval * 0.25 + 1e-6 {
                let offset = now % interval;
                prop_assert!(offset < 1e-3 || interval - offset < 1e-3);
            }
        }
    }
}
