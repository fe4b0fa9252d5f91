//! Review scheduler.
//!
//! Decides when an item is asked again after an answer, using a doubling
//! interval that resets on a miss:
//! - first correct answer from a zero interval jumps to 2 days
//! - every further correct answer doubles the interval, capped at 21 days
//! - an incorrect answer resets to 1 day
//! - a skip re-asks tomorrow without touching the interval or counters
//!
//! The scheduler never mutates an item; it returns a [`ScheduleUpdate`] the
//! caller merges into its stored copy.

mod selection;

pub use selection::{select_due_items, select_variant_index, session_rng};

use serde::{Deserialize, Serialize};

use crate::item::{KnowledgeItem, MILLIS_PER_DAY};

/// Longest spacing between two reviews, in days.
pub const MAX_INTERVAL_DAYS: u32 = 21;

/// Spacing after a miss, in days.
pub const RESET_INTERVAL_DAYS: u32 = 1;

/// Interval reached by a correct answer from a zero interval.
pub const FIRST_INTERVAL_DAYS: u32 = 2;

/// New scheduling fields for one item after an answer event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScheduleUpdate {
    pub next_ask_at: i64,
    pub interval_days: u32,
    pub current_streak: u32,
    pub times_asked: u32,
    pub times_correct: u32,
    pub last_answered_at: i64,
    pub last_answer_correct: bool,
}

impl ScheduleUpdate {
    /// Merge these fields into `item`.
    pub fn apply_to(&self, item: &mut KnowledgeItem) {
        item.next_ask_at = self.next_ask_at;
        item.interval_days = self.interval_days;
        item.current_streak = self.current_streak;
        item.times_asked = self.times_asked;
        item.times_correct = self.times_correct;
        item.last_answered_at = Some(self.last_answered_at);
        item.last_answer_correct = Some(self.last_answer_correct);
    }
}

/// Interval that follows `interval_days` after a graded answer.
pub fn next_interval(interval_days: u32, correct: bool) -> u32 {
    if !correct {
        RESET_INTERVAL_DAYS
    } else if interval_days == 0 {
        FIRST_INTERVAL_DAYS
    } else {
        interval_days.saturating_mul(2).min(MAX_INTERVAL_DAYS)
    }
}

/// Compute the item's schedule after an answer (or a skip) at `now`.
pub fn compute_schedule(
    item: &KnowledgeItem,
    correct: bool,
    skipped: bool,
    now: i64,
) -> ScheduleUpdate {
    if skipped {
        return ScheduleUpdate {
            next_ask_at: now + MILLIS_PER_DAY,
            interval_days: item.interval_days,
            current_streak: item.current_streak,
            times_asked: item.times_asked,
            times_correct: item.times_correct,
            last_answered_at: now,
            last_answer_correct: item.last_answer_correct.unwrap_or(false),
        };
    }

    let interval_days = next_interval(item.interval_days, correct);

    ScheduleUpdate {
        next_ask_at: now + i64::from(interval_days) * MILLIS_PER_DAY,
        interval_days,
        current_streak: if correct {
            item.current_streak.saturating_add(1)
        } else {
            0
        },
        times_asked: item.times_asked.saturating_add(1),
        times_correct: if correct {
            item.times_correct.saturating_add(1)
        } else {
            item.times_correct
        },
        last_answered_at: now,
        last_answer_correct: correct,
    }
}
