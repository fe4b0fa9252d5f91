//! Recording an answer: scorer, scheduler and daily streak in one step.
//!
//! [`record_answer`] is pure. It returns an [`AnswerOutcome`] describing
//! everything that changes, and the caller (a [`Collection`] or the
//! database) merges it under a single writer.
//!
//! [`Collection`]: crate::collection::Collection

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::grading::{grade, Response};
use crate::item::{AnswerLog, KnowledgeItem, QuestionType, QuestionVariant};
use crate::scheduler::{compute_schedule, ScheduleUpdate};
use crate::scoring::{compute_points, ScoreResult};
use crate::streak::DailyStreakState;

/// What the user did with one presented variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerSubmission {
    pub variant_id: String,
    pub mode: QuestionType,
    pub user_answer: String,
    pub correct: bool,
    pub skipped: bool,
}

impl AnswerSubmission {
    /// Grade `response` against `variant` and wrap the result.
    pub fn graded(variant: &QuestionVariant, response: &Response) -> Self {
        Self {
            variant_id: variant.id().to_string(),
            mode: variant.question_type(),
            user_answer: response.as_log_text(),
            correct: grade(variant, response),
            skipped: false,
        }
    }

    /// The user skipped `variant` without answering.
    pub fn skipped(variant: &QuestionVariant) -> Self {
        Self {
            variant_id: variant.id().to_string(),
            mode: variant.question_type(),
            user_answer: String::new(),
            correct: false,
            skipped: true,
        }
    }
}

/// Every change caused by one answer event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerOutcome {
    pub item_id: String,
    pub log: AnswerLog,
    pub score: ScoreResult,
    pub schedule: ScheduleUpdate,
    pub daily_streak: DailyStreakState,
}

/// Score, reschedule and log an answer to `item` at `now`.
///
/// Points use the item's state *before* the answer. Skips score nothing and
/// are logged as incorrect, but still count as practice for the daily streak.
pub fn record_answer(
    item: &KnowledgeItem,
    submission: AnswerSubmission,
    streak: &DailyStreakState,
    now: i64,
    today: NaiveDate,
) -> AnswerOutcome {
    let correct = submission.correct && !submission.skipped;

    let score = compute_points(item, correct, now);
    let schedule = compute_schedule(item, correct, submission.skipped, now);
    let daily_streak = streak.advanced(today);

    tracing::debug!(
        item_id = %item.id,
        variant_id = %submission.variant_id,
        correct,
        skipped = submission.skipped,
        points = score.total,
        next_interval_days = schedule.interval_days,
        "answer recorded"
    );

    let log = AnswerLog {
        id: uuid::Uuid::new_v4().to_string(),
        item_id: item.id.clone(),
        variant_id: submission.variant_id,
        answered_at: now,
        mode: submission.mode,
        user_answer: submission.user_answer,
        is_correct: correct,
        points_awarded: score.total,
    };

    AnswerOutcome {
        item_id: item.id.clone(),
        log,
        score,
        schedule,
        daily_streak,
    }
}
