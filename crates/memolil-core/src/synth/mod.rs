//! Local question synthesizer.
//!
//! Derives question variants from an item's title and body without any
//! network call. Used whenever the remote generator is unavailable or fails,
//! so it produces the same variant shapes:
//!
//! 1. one flashcard built from the title and the first line of the body
//! 2. up to two short-answer questions, one per key statement
//! 3. at most one multiple-choice question about the first key statement

mod distractor;

pub use distractor::{flip_polarity, generate_distractors, DISTRACTOR_COUNT};

use std::sync::OnceLock;

use rand::seq::SliceRandom;
use rand::Rng;
use regex::Regex;

use crate::item::{
    Flashcard, KnowledgeItem, McqChoice, MultipleChoice, QuestionVariant, ShortAnswer,
};

const MAX_KEY_STATEMENTS: usize = 3;
const MAX_SHORT_ANSWERS: usize = 2;
const FLASHCARD_BACK_CHARS: usize = 200;
const ANSWER_WORDS: usize = 10;

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Sentence-like fragments of `content` worth asking about.
///
/// Splits on `.`, newline and `;`, keeps trimmed fragments longer than 20
/// and shorter than 200 characters, and returns the first three.
pub fn key_statements(content: &str) -> Vec<String> {
    content
        .split(&['.', '\n', ';'][..])
        .map(str::trim)
        .filter(|s| {
            let len = s.chars().count();
            len > 20 && len < 200
        })
        .take(MAX_KEY_STATEMENTS)
        .map(str::to_string)
        .collect()
}

/// Front of the title flashcard.
pub fn flashcard_front(title: &str) -> String {
    if title.ends_with('?') {
        title.to_string()
    } else {
        format!("What is {title}?")
    }
}

fn flashcard(item: &KnowledgeItem) -> QuestionVariant {
    let back = item
        .content
        .split('\n')
        .next()
        .unwrap_or_default()
        .chars()
        .take(FLASHCARD_BACK_CHARS)
        .collect();

    QuestionVariant::Flashcard(Flashcard {
        id: new_id(),
        front: flashcard_front(&item.title),
        back,
    })
}

/// " is " takes precedence over " are " wherever each appears.
fn copulas() -> &'static [Regex; 2] {
    static RE: OnceLock<[Regex; 2]> = OnceLock::new();
    RE.get_or_init(|| {
        [
            Regex::new(r"(?i) (is) ").expect("copula pattern is a valid regex"),
            Regex::new(r"(?i) (are) ").expect("copula pattern is a valid regex"),
        ]
    })
}

fn mechanism() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"(?i) (helps|allows) ").expect("mechanism pattern is a valid regex")
    })
}

/// Turn a statement into a question prompt.
///
/// "X is Y" becomes "What is Y?" (cutting at " is " even when " are "
/// comes first), "X helps Y" becomes a how-question,
/// anything else is wrapped as "Explain: …".
pub fn statement_to_question(statement: &str) -> String {
    if let Some(caps) = copulas().iter().find_map(|re| re.captures(statement)) {
        let verb = caps[1].to_lowercase();
        let rest = statement[caps.get(0).map_or(0, |m| m.end())..].trim();
        return format!("What {verb} {rest}?");
    }

    if mechanism().is_match(statement) {
        return format!("How does this work: {statement}?");
    }

    format!("Explain: {statement}")
}

/// Accepted answers for a statement: its first ten words, then the whole
/// statement when that is longer.
fn accepted_answers(statement: &str) -> Vec<String> {
    let words: Vec<&str> = statement.split_whitespace().collect();
    let mut answers = Vec::with_capacity(2);
    if words.len() > ANSWER_WORDS {
        answers.push(words[..ANSWER_WORDS].join(" "));
    }
    answers.push(statement.to_string());
    answers
}

fn short_answers(item: &KnowledgeItem, statements: &[String]) -> Vec<QuestionVariant> {
    statements
        .iter()
        .take(MAX_SHORT_ANSWERS)
        .map(|statement| {
            QuestionVariant::Short(ShortAnswer {
                id: new_id(),
                prompt: statement_to_question(statement),
                accepted_answers: accepted_answers(statement),
                guidance: Some(format!("Key concept: {}", item.title)),
            })
        })
        .collect()
}

fn multiple_choice<R: Rng + ?Sized>(
    item: &KnowledgeItem,
    statements: &[String],
    rng: &mut R,
) -> Option<QuestionVariant> {
    let correct = statements.first()?;

    let mut choices = vec![McqChoice::new(correct.clone(), true)];
    choices.extend(
        generate_distractors(&item.content, correct, rng)
            .into_iter()
            .map(|text| McqChoice::new(text, false)),
    );
    choices.shuffle(rng);

    MultipleChoice::new(
        new_id(),
        format!("Which statement about \"{}\" is correct?", item.title),
        choices,
    )
    .map(QuestionVariant::Mcq)
}

/// Build question variants for `item`: flashcard, short answers, then MCQ.
pub fn synthesize_questions<R: Rng + ?Sized>(
    item: &KnowledgeItem,
    rng: &mut R,
) -> Vec<QuestionVariant> {
    let statements = key_statements(&item.content);

    let mut variants = vec![flashcard(item)];
    variants.extend(short_answers(item, &statements));
    variants.extend(multiple_choice(item, &statements, rng));
    variants
}
