//! Time source for the engine.
//!
//! Engine functions take "now" as a parameter; a [`Clock`] is how callers
//! obtain it, so tests can pin both the instant and the calendar day.

use chrono::{DateTime, Local, NaiveDate, Utc};

pub trait Clock {
    /// Current instant as epoch milliseconds.
    fn now_millis(&self) -> i64;

    /// Current calendar day in the caller's local timezone.
    fn today(&self) -> NaiveDate;
}

/// Wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_millis(&self) -> i64 {
        Utc::now().timestamp_millis()
    }

    fn today(&self) -> NaiveDate {
        Local::now().date_naive()
    }
}

/// A clock frozen at a given instant.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock {
    pub now: i64,
    pub today: NaiveDate,
}

impl FixedClock {
    /// Freeze at `now`, taking the UTC calendar day of that instant as today.
    pub fn at(now: i64) -> Self {
        let today = DateTime::<Utc>::from_timestamp_millis(now)
            .map(|dt| dt.date_naive())
            .unwrap_or_default();
        Self { now, today }
    }
}

impl Clock for FixedClock {
    fn now_millis(&self) -> i64 {
        self.now
    }

    fn today(&self) -> NaiveDate {
        self.today
    }
}
