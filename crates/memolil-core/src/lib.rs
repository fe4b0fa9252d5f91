//! # Memolil Core Library
//!
//! Review scheduling, scoring and question generation for a personal
//! knowledge base. Users capture short notes ("knowledge items"); the
//! library turns each into question variants and decides when to ask again.
//! The `memolil` CLI is a thin layer over this crate.
//!
//! ## Architecture
//!
//! - **Engine**: pure functions over caller-supplied time. Scheduler,
//!   variant selector, scorer, daily streak and the local question
//!   synthesizer never touch the clock, the network or the disk.
//! - **Review**: combines the engine pieces into one [`AnswerOutcome`] per
//!   answer, merged by a [`Collection`] or the [`Database`] as a unit.
//! - **Generation**: a [`QuestionGenerator`] trait with a hosted-model
//!   implementation that always falls back to the local synthesizer.
//! - **Storage**: SQLite collections keyed by [`Namespace`] and a TOML
//!   [`Config`].
//!
//! ## Key Components
//!
//! - [`compute_schedule`]: next review time after an answer
//! - [`compute_points`]: points for a correct answer
//! - [`select_due_items`]: which items a session asks
//! - [`synthesize_questions`]: offline question variants
//! - [`record_answer`]: everything one answer changes

pub mod clock;
pub mod collection;
pub mod error;
pub mod generator;
pub mod grading;
pub mod item;
pub mod review;
pub mod scheduler;
pub mod scoring;
pub mod seed;
pub mod stats;
pub mod storage;
pub mod streak;
pub mod synth;

pub use clock::{Clock, FixedClock, SystemClock};
pub use collection::{Collection, ItemSort, Namespace};
pub use error::{ConfigError, CoreError, DatabaseError, GeneratorError, ValidationError};
pub use generator::{generate_questions, LlmGenerator, Provider, QuestionGenerator};
pub use grading::{grade, Response};
pub use item::{
    AnswerLog, Flashcard, ItemDraft, KnowledgeItem, McqChoice, MultipleChoice, QuestionType,
    QuestionVariant, QuizMode, ShortAnswer, MILLIS_PER_DAY,
};
pub use review::{record_answer, AnswerOutcome, AnswerSubmission};
pub use scheduler::{
    compute_schedule, select_due_items, select_variant_index, session_rng, ScheduleUpdate,
};
pub use scoring::{compute_points, ScoreResult};
pub use seed::seed_collection;
pub use stats::ProgressStats;
pub use storage::{Config, Database};
pub use streak::{advance_daily_streak, DailyStreakState, DailyStreakUpdate};
pub use synth::synthesize_questions;
