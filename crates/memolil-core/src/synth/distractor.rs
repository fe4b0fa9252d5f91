//! Wrong-answer generation for multiple-choice questions.

use std::sync::OnceLock;

use rand::seq::SliceRandom;
use rand::Rng;
use regex::{Captures, Regex};

/// Number of wrong choices accompanying the correct one.
pub const DISTRACTOR_COUNT: usize = 3;

/// Length of the body excerpt used as a distractor.
const WINDOW_WORDS: usize = 10;

const GENERIC_FILLERS: [&str; 3] = [
    "This concept is not related to the main topic",
    "This statement contradicts the core principle",
    "This is a common misconception about the subject",
];

const POLARITY_PAIRS: [(&str, &str); 4] = [
    ("increases", "decreases"),
    ("helps", "prevents"),
    ("allows", "restricts"),
    ("improves", "worsens"),
];

fn polarity_patterns() -> &'static [(Regex, &'static str, &'static str)] {
    static PATTERNS: OnceLock<Vec<(Regex, &'static str, &'static str)>> = OnceLock::new();
    PATTERNS.get_or_init(|| {
        POLARITY_PAIRS
            .iter()
            .map(|&(a, b)| {
                let re = Regex::new(&format!(r"(?i)\b({a}|{b})\b"))
                    .expect("polarity pattern is a valid regex");
                (re, a, b)
            })
            .collect()
    })
}

/// Copy `word`'s leading capital onto `replacement`.
fn match_case(word: &str, replacement: &str) -> String {
    if word.chars().next().is_some_and(char::is_uppercase) {
        let mut chars = replacement.chars();
        chars
            .next()
            .map(|first| first.to_uppercase().chain(chars).collect())
            .unwrap_or_default()
    } else {
        replacement.to_string()
    }
}

/// Flip the first occurrence of each polarity word in `statement`
/// (increases/decreases, helps/prevents, allows/restricts, improves/worsens).
pub fn flip_polarity(statement: &str) -> String {
    let mut out = statement.to_string();
    for (re, a, b) in polarity_patterns() {
        out = re
            .replacen(&out, 1, |caps: &Captures| {
                let word = &caps[1];
                let flipped = if word.eq_ignore_ascii_case(a) { *b } else { *a };
                match_case(word, flipped)
            })
            .into_owned();
    }
    out
}

/// A random run of ten consecutive words from `body`, when it has more than ten.
fn body_window<R: Rng + ?Sized>(body: &str, rng: &mut R) -> Option<String> {
    let words: Vec<&str> = body.split_whitespace().collect();
    if words.len() <= WINDOW_WORDS {
        return None;
    }
    let start = rng.gen_range(0..words.len() - WINDOW_WORDS);
    Some(words[start..start + WINDOW_WORDS].join(" "))
}

/// Produce exactly three distractors for `correct`, drawn from `body`.
///
/// Sources, in order: the polarity-flipped statement, a body excerpt, one
/// generic filler. Duplicates are skipped and the list is padded with
/// numbered placeholders.
pub fn generate_distractors<R: Rng + ?Sized>(body: &str, correct: &str, rng: &mut R) -> Vec<String> {
    let mut distractors: Vec<String> = Vec::with_capacity(DISTRACTOR_COUNT);

    let flipped = flip_polarity(correct);
    if flipped != correct {
        distractors.push(flipped);
    }

    if let Some(window) = body_window(body, rng) {
        if window != correct && !distractors.contains(&window) {
            distractors.push(window);
        }
    }

    if let Some(generic) = GENERIC_FILLERS.choose(rng) {
        if !distractors.iter().any(|d| d == generic) {
            distractors.push((*generic).to_string());
        }
    }

    while distractors.len() < DISTRACTOR_COUNT {
        distractors.push(format!("Alternative explanation {}", distractors.len() + 1));
    }
    distractors.truncate(DISTRACTOR_COUNT);
    distractors
}
