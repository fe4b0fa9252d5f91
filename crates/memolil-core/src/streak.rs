//! Collection-wide daily practice streak.
//!
//! A day counts once at least one answer (or skip) is recorded on it. The
//! streak grows by one per consecutive calendar day and restarts at 1 after
//! a missed day. Days are `YYYY-MM-DD` strings in the caller's local
//! calendar; no timezone normalization happens here.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

const DATE_FORMAT: &str = "%Y-%m-%d";

/// Streak fields owned by the whole collection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStreakState {
    pub daily_practice_streak: u32,
    pub last_practice_date: Option<String>,
}

/// Result of advancing the streak: the new count and the day it now ends on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyStreakUpdate {
    pub streak: u32,
    pub today: String,
}

impl DailyStreakUpdate {
    pub fn into_state(self) -> DailyStreakState {
        DailyStreakState {
            daily_practice_streak: self.streak,
            last_practice_date: Some(self.today),
        }
    }
}

/// Format a calendar day the way streak state stores it.
pub fn format_day(day: NaiveDate) -> String {
    day.format(DATE_FORMAT).to_string()
}

/// Parse a stored `YYYY-MM-DD` day.
pub fn parse_day(s: &str) -> Result<NaiveDate, ValidationError> {
    NaiveDate::parse_from_str(s.trim(), DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(s.to_string()))
}

/// Advance the streak for practice on `today`.
///
/// A `last_practice_date` that is neither today nor yesterday (including an
/// unparseable one) breaks the streak.
pub fn advance_daily_streak(
    last_practice_date: Option<&str>,
    current_streak: u32,
    today: NaiveDate,
) -> DailyStreakUpdate {
    let today_str = format_day(today);

    let streak = match last_practice_date {
        None => 1,
        Some(last) if last == today_str => current_streak,
        Some(last) if today.pred_opt().map(format_day).as_deref() == Some(last) => {
            current_streak.saturating_add(1)
        }
        Some(_) => 1,
    };

    DailyStreakUpdate {
        streak,
        today: today_str,
    }
}

impl DailyStreakState {
    /// State after practicing on `today`.
    pub fn advanced(&self, today: NaiveDate) -> DailyStreakState {
        advance_daily_streak(
            self.last_practice_date.as_deref(),
            self.daily_practice_streak,
            today,
        )
        .into_state()
    }
}
