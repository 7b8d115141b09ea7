use std::fmt;

use chrono::{DateTime, TimeDelta, Utc};

/// Whole-unit breakdown of the time left until registration closes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CountdownSnapshot {
    pub days: i64,
    pub hours: i64,
    pub minutes: i64,
    pub seconds: i64,
    pub closed: bool,
}

pub fn time_remaining(now: DateTime<Utc>, closes_at: DateTime<Utc>) -> CountdownSnapshot {
    let remaining = closes_at.signed_duration_since(now);
    if remaining <= TimeDelta::zero() {
        return CountdownSnapshot {
            closed: true,
            ..CountdownSnapshot::default()
        };
    }
    let total_seconds = remaining.num_seconds();
    CountdownSnapshot {
        days: total_seconds / 86_400,
        hours: total_seconds % 86_400 / 3_600,
        minutes: total_seconds % 3_600 / 60,
        seconds: total_seconds % 60,
        closed: false,
    }
}

impl fmt::Display for CountdownSnapshot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}d {:02}h {:02}m {:02}s",
            self.days, self.hours, self.minutes, self.seconds
        )
    }
}
