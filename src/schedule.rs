// src/schedule.rs
//! When to poll. The relay itself only decides what to do with a batch.

use chrono::{Datelike, Weekday};
use std::time::Duration;

use crate::config::RelayConfig;

pub fn is_weekend<D: Datelike>(day: &D) -> bool {
    matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollSchedule {
    pub interval: Duration,
    pub weekend_sleep: Duration,
    pub skip_weekends: bool,
}

impl PollSchedule {
    pub fn from_config(cfg: &RelayConfig) -> Self {
        Self {
            interval: Duration::from_secs(cfg.poll_interval_secs.max(1)),
            weekend_sleep: Duration::from_secs(cfg.weekend_sleep_secs.max(1)),
            skip_weekends: cfg.skip_weekends,
        }
    }

    /// True when a cycle should run on `day`.
    pub fn should_poll<D: Datelike>(&self, day: &D) -> bool {
        !(self.skip_weekends && is_weekend(day))
    }

    /// Sleep before the next check: the weekend back-off when gated, else the
    /// regular interval.
    pub fn next_delay<D: Datelike>(&self, day: &D) -> Duration {
        if self.should_poll(day) {
            self.interval
        } else {
            self.weekend_sleep
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn weekend_detection() {
        assert!(is_weekend(&day(2024, 2, 3))); // Saturday
        assert!(is_weekend(&day(2024, 2, 4))); // Sunday
        assert!(!is_weekend(&day(2024, 2, 5))); // Monday
        assert!(!is_weekend(&day(2024, 2, 2))); // Friday
    }

    #[test]
    fn gating_can_be_switched_off() {
        let mut cfg = RelayConfig::default();
        let s = PollSchedule::from_config(&cfg);
        assert!(!s.should_poll(&day(2024, 2, 3)));
        assert_eq!(s.next_delay(&day(2024, 2, 3)), Duration::from_secs(3600));
        assert_eq!(s.next_delay(&day(2024, 2, 5)), Duration::from_secs(300));

        cfg.skip_weekends = false;
        let s = PollSchedule::from_config(&cfg);
        assert!(s.should_poll(&day(2024, 2, 3)));
    }
}
