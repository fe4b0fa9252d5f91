//! Points awarded for correct answers.
//!
//! ```text
//! total = base(difficulty) + round(base × streak%) + round(base × gap%)
//! ```
//!
//! | Pre-answer streak | Streak bonus |
//! |-------------------|--------------|
//! | ≥ 5               | +100%        |
//! | ≥ 3               | +50%         |
//! | ≥ 1               | +25%         |
//! | 0                 | none         |
//!
//! An item last answered a week or more ago earns a further +20%. Each bonus
//! is rounded half-up on its own before summing, so the total may differ by a
//! point from rounding the sum once.

use serde::{Deserialize, Serialize};

use crate::item::{KnowledgeItem, MILLIS_PER_DAY};

/// Base points when the difficulty is outside the 1..=5 scale.
pub const DEFAULT_BASE_POINTS: u32 = 8;

/// Gap since the last answer that earns the time-gap bonus.
pub const TIME_GAP_BONUS_AFTER_MS: i64 = 7 * MILLIS_PER_DAY;

const TIME_GAP_BONUS_PERCENT: u32 = 20;

/// Point breakdown for one answer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    pub base_points: u32,
    pub streak_bonus: u32,
    pub time_gap_bonus: u32,
    pub total: u32,
}

impl ScoreResult {
    /// Breakdown for an incorrect or skipped answer.
    pub const ZERO: ScoreResult = ScoreResult {
        base_points: 0,
        streak_bonus: 0,
        time_gap_bonus: 0,
        total: 0,
    };
}

/// Base points for a difficulty level.
pub fn base_points(difficulty: u8) -> u32 {
    match difficulty {
        1 => 5,
        2 => 8,
        3 => 12,
        4 => 16,
        5 => 20,
        _ => DEFAULT_BASE_POINTS,
    }
}

/// Streak bonus percentage for the streak held *before* this answer.
pub fn streak_bonus_percent(current_streak: u32) -> u32 {
    match current_streak {
        s if s >= 5 => 100,
        s if s >= 3 => 50,
        s if s >= 1 => 25,
        _ => 0,
    }
}

/// `round(base × percent / 100)`, rounding halves up.
fn percent_of(base: u32, percent: u32) -> u32 {
    (base * percent + 50) / 100
}

/// Compute points for answering `item` at `now`.
pub fn compute_points(item: &KnowledgeItem, correct: bool, now: i64) -> ScoreResult {
    if !correct {
        return ScoreResult::ZERO;
    }

    let base = base_points(item.difficulty);
    let streak_bonus = percent_of(base, streak_bonus_percent(item.current_streak));
    let time_gap_bonus = match item.last_answered_at {
        Some(last) if now - last >= TIME_GAP_BONUS_AFTER_MS => {
            percent_of(base, TIME_GAP_BONUS_PERCENT)
        }
        _ => 0,
    };

    ScoreResult {
        base_points: base,
        streak_bonus,
        time_gap_bonus,
        total: base + streak_bonus + time_gap_bonus,
    }
}
