//! Answer grading per question type.
//!
//! Multiple-choice answers are graded by index, flashcards are self-assessed,
//! and short answers are matched leniently against the accepted answers.

use serde::{Deserialize, Serialize};

use crate::item::QuestionVariant;

/// Share of an accepted answer's significant words a response must cover.
const KEYWORD_COVERAGE: f64 = 0.6;

/// Words of this many characters or fewer are ignored for coverage.
const MIN_KEYWORD_CHARS: usize = 3;

/// A user's response to one variant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum Response {
    /// Index of the chosen multiple-choice option.
    Choice(usize),
    /// Typed short answer.
    Text(String),
    /// Flashcard self-assessment.
    SelfMarked(bool),
}

impl Response {
    /// Raw text stored in the answer log.
    pub fn as_log_text(&self) -> String {
        match self {
            Response::Choice(i) => i.to_string(),
            Response::Text(s) => s.clone(),
            Response::SelfMarked(true) => "correct".to_string(),
            Response::SelfMarked(false) => "incorrect".to_string(),
        }
    }

    /// Interpret raw text for the given variant, the way it is typed at a prompt.
    ///
    /// MCQ accepts a zero-based index or a letter (`a`..); flashcards accept
    /// `y`/`yes`/`correct`/`1` as a hit.
    pub fn parse_for(variant: &QuestionVariant, raw: &str) -> Response {
        let trimmed = raw.trim();
        match variant {
            QuestionVariant::Mcq(_) => {
                let index = trimmed.parse::<usize>().ok().or_else(|| {
                    let mut chars = trimmed.chars();
                    match (chars.next(), chars.next()) {
                        (Some(c), None) if c.is_ascii_alphabetic() => {
                            Some((c.to_ascii_lowercase() as u8 - b'a') as usize)
                        }
                        _ => None,
                    }
                });
                index.map_or_else(|| Response::Text(trimmed.to_string()), Response::Choice)
            }
            QuestionVariant::Short(_) => Response::Text(trimmed.to_string()),
            QuestionVariant::Flashcard(_) => Response::SelfMarked(matches!(
                trimmed.to_ascii_lowercase().as_str(),
                "y" | "yes" | "correct" | "1" | "true"
            )),
        }
    }
}

/// Lowercase, collapse whitespace and drop surrounding punctuation.
pub fn normalize_answer(s: &str) -> String {
    s.split_whitespace()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ")
        .trim_matches(|c: char| c.is_ascii_punctuation())
        .trim()
        .to_string()
}

fn significant_words(s: &str) -> Vec<String> {
    normalize_answer(s)
        .split(' ')
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_string())
        .filter(|w| w.chars().count() > MIN_KEYWORD_CHARS)
        .collect()
}

/// Whether `answer` matches any of `accepted`.
///
/// A match is an exact normalized match, a response containing an accepted
/// answer, or a response covering most of an accepted answer's significant
/// words. Blank answers never match.
pub fn check_short_answer(answer: &str, accepted: &[String]) -> bool {
    let given = normalize_answer(answer);
    if given.is_empty() {
        return false;
    }
    let given_words = significant_words(answer);

    accepted.iter().any(|candidate| {
        let expected = normalize_answer(candidate);
        if expected.is_empty() {
            return false;
        }
        if given == expected || given.contains(&expected) {
            return true;
        }

        let keywords = significant_words(candidate);
        if keywords.is_empty() {
            return false;
        }
        let covered = keywords.iter().filter(|k| given_words.contains(k)).count();
        covered as f64 / keywords.len() as f64 >= KEYWORD_COVERAGE
    })
}

/// Grade `response` against `variant`. Mismatched response kinds are wrong.
pub fn grade(variant: &QuestionVariant, response: &Response) -> bool {
    match (variant, response) {
        (QuestionVariant::Mcq(mcq), Response::Choice(i)) => *i == mcq.correct_index,
        (QuestionVariant::Short(short), Response::Text(text)) => {
            check_short_answer(text, &short.accepted_answers)
        }
        (QuestionVariant::Flashcard(_), Response::SelfMarked(knew)) => *knew,
        _ => false,
    }
}
