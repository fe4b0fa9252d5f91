//! Knowledge items, their question variants, and the answer log.
//!
//! Timestamps are epoch milliseconds supplied by the caller's [`Clock`];
//! nothing in this module reads the wall clock.
//!
//! [`Clock`]: crate::clock::Clock

use std::collections::BTreeSet;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// Milliseconds in one scheduling day.
pub const MILLIS_PER_DAY: i64 = 24 * 60 * 60 * 1000;

/// Question format of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionType {
    Mcq,
    Short,
    Flashcard,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::Mcq => "mcq",
            QuestionType::Short => "short",
            QuestionType::Flashcard => "flashcard",
        }
    }
}

impl fmt::Display for QuestionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuestionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "mcq" => Ok(QuestionType::Mcq),
            "short" => Ok(QuestionType::Short),
            "flashcard" => Ok(QuestionType::Flashcard),
            _ => Err(ValidationError::UnknownMode(s.to_string())),
        }
    }
}

/// Practice mode chosen for a session: one question type, or all of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuizMode {
    #[default]
    Mixed,
    Mcq,
    Short,
    Flashcard,
}

impl QuizMode {
    /// The single question type this mode restricts to, if any.
    pub fn question_type(&self) -> Option<QuestionType> {
        match self {
            QuizMode::Mixed => None,
            QuizMode::Mcq => Some(QuestionType::Mcq),
            QuizMode::Short => Some(QuestionType::Short),
            QuizMode::Flashcard => Some(QuestionType::Flashcard),
        }
    }

    /// Whether a variant of type `kind` may be presented in this mode.
    pub fn accepts(&self, kind: QuestionType) -> bool {
        self.question_type().map_or(true, |t| t == kind)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QuizMode::Mixed => "mixed",
            QuizMode::Mcq => "mcq",
            QuizMode::Short => "short",
            QuizMode::Flashcard => "flashcard",
        }
    }
}

impl From<QuestionType> for QuizMode {
    fn from(kind: QuestionType) -> Self {
        match kind {
            QuestionType::Mcq => QuizMode::Mcq,
            QuestionType::Short => QuizMode::Short,
            QuestionType::Flashcard => QuizMode::Flashcard,
        }
    }
}

impl fmt::Display for QuizMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QuizMode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.trim().eq_ignore_ascii_case("mixed") {
            return Ok(QuizMode::Mixed);
        }
        s.parse::<QuestionType>()
            .map(QuizMode::from)
            .map_err(|_| ValidationError::UnknownMode(s.to_string()))
    }
}

/// One option of a multiple-choice question.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct McqChoice {
    pub text: String,
    pub is_correct: bool,
}

impl McqChoice {
    pub fn new(text: impl Into<String>, is_correct: bool) -> Self {
        Self {
            text: text.into(),
            is_correct,
        }
    }
}

/// Self-graded card: the user reveals the back and marks themselves.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flashcard {
    pub id: String,
    pub front: String,
    pub back: String,
}

/// Free-text question graded against a set of accepted answers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShortAnswer {
    pub id: String,
    pub prompt: String,
    pub accepted_answers: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guidance: Option<String>,
}

/// Multiple-choice question with exactly one correct choice.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MultipleChoice {
    pub id: String,
    pub prompt: String,
    pub choices: Vec<McqChoice>,
    pub correct_index: usize,
}

impl MultipleChoice {
    /// Build a question, deriving `correct_index` from the choices.
    ///
    /// Returns `None` unless exactly one choice is marked correct.
    pub fn new(id: String, prompt: String, choices: Vec<McqChoice>) -> Option<Self> {
        let mut correct = choices.iter().enumerate().filter(|(_, c)| c.is_correct);
        let (correct_index, _) = correct.next()?;
        if correct.next().is_some() {
            return None;
        }
        Some(Self {
            id,
            prompt,
            choices,
            correct_index,
        })
    }

    pub fn correct_choice(&self) -> Option<&McqChoice> {
        self.choices.get(self.correct_index)
    }
}

/// A testable rendering of a knowledge item.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum QuestionVariant {
    Flashcard(Flashcard),
    Short(ShortAnswer),
    Mcq(MultipleChoice),
}

impl QuestionVariant {
    pub fn id(&self) -> &str {
        match self {
            QuestionVariant::Flashcard(v) => &v.id,
            QuestionVariant::Short(v) => &v.id,
            QuestionVariant::Mcq(v) => &v.id,
        }
    }

    pub fn question_type(&self) -> QuestionType {
        match self {
            QuestionVariant::Flashcard(_) => QuestionType::Flashcard,
            QuestionVariant::Short(_) => QuestionType::Short,
            QuestionVariant::Mcq(_) => QuestionType::Mcq,
        }
    }

    /// Text shown to the user first.
    pub fn prompt(&self) -> &str {
        match self {
            QuestionVariant::Flashcard(v) => &v.front,
            QuestionVariant::Short(v) => &v.prompt,
            QuestionVariant::Mcq(v) => &v.prompt,
        }
    }
}

/// User input for a new knowledge item.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ItemDraft {
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub difficulty: u8,
    #[serde(default)]
    pub source: Option<String>,
}

/// A note plus its derived questions and review state.
///
/// Scheduling fields are only changed by merging a
/// [`ScheduleUpdate`](crate::scheduler::ScheduleUpdate).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KnowledgeItem {
    pub id: String,
    pub title: String,
    pub content: String,
    #[serde(default)]
    pub tags: BTreeSet<String>,
    pub difficulty: u8,
    #[serde(default = "default_source")]
    pub source: String,
    pub created_at: i64,
    pub introduced_at: i64,
    #[serde(default)]
    pub question_variants: Vec<QuestionVariant>,

    pub next_ask_at: i64,
    pub interval_days: u32,
    pub times_asked: u32,
    pub times_correct: u32,
    pub current_streak: u32,
    pub last_answered_at: Option<i64>,
    pub last_answer_correct: Option<bool>,
}

fn default_source() -> String {
    "typed".to_string()
}

impl KnowledgeItem {
    /// Create a fresh item, first due one day after `now`.
    pub fn new(draft: ItemDraft, now: i64) -> Result<Self, ValidationError> {
        let title = draft.title.trim();
        let content = draft.content.trim();
        if title.is_empty() {
            return Err(ValidationError::EmptyField { field: "title" });
        }
        if content.is_empty() {
            return Err(ValidationError::EmptyField { field: "content" });
        }
        if !(1..=5).contains(&draft.difficulty) {
            return Err(ValidationError::DifficultyOutOfRange(draft.difficulty));
        }

        let tags = draft
            .tags
            .iter()
            .map(|t| t.trim())
            .filter(|t| !t.is_empty())
            .map(str::to_string)
            .collect();

        Ok(Self {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            content: content.to_string(),
            tags,
            difficulty: draft.difficulty,
            source: draft.source.unwrap_or_else(default_source),
            created_at: now,
            introduced_at: now,
            question_variants: Vec::new(),
            next_ask_at: now + MILLIS_PER_DAY,
            interval_days: 1,
            times_asked: 0,
            times_correct: 0,
            current_streak: 0,
            last_answered_at: None,
            last_answer_correct: None,
        })
    }

    pub fn is_due(&self, now: i64) -> bool {
        self.next_ask_at <= now
    }

    pub fn has_variant_of(&self, kind: QuestionType) -> bool {
        self.question_variants
            .iter()
            .any(|v| v.question_type() == kind)
    }

    pub fn variant(&self, variant_id: &str) -> Option<&QuestionVariant> {
        self.question_variants.iter().find(|v| v.id() == variant_id)
    }

    /// Fraction of answers that were correct, `None` before the first answer.
    pub fn accuracy(&self) -> Option<f64> {
        (self.times_asked > 0).then(|| self.times_correct as f64 / self.times_asked as f64)
    }
}

/// Immutable record of one answer event.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnswerLog {
    pub id: String,
    pub item_id: String,
    pub variant_id: String,
    pub answered_at: i64,
    pub mode: QuestionType,
    pub user_answer: String,
    pub is_correct: bool,
    pub points_awarded: u32,
}
