//! Decoding a model reply into question variants.

use std::sync::OnceLock;

use regex::Regex;
use serde::Deserialize;

use crate::error::GeneratorError;
use crate::item::{Flashcard, McqChoice, MultipleChoice, QuestionVariant, ShortAnswer};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawChoice {
    text: String,
    #[serde(default)]
    is_correct: bool,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawQuestion {
    #[serde(rename = "type")]
    kind: String,
    #[serde(default)]
    prompt: Option<String>,
    #[serde(default)]
    choices: Vec<RawChoice>,
    #[serde(default)]
    accepted_answers: Vec<String>,
    #[serde(default)]
    answer_guidance: Option<String>,
    #[serde(default)]
    front: Option<String>,
    #[serde(default)]
    back: Option<String>,
}

fn json_array() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\[[\s\S]*\]").expect("array pattern is a valid regex"))
}

fn non_blank(s: Option<String>) -> Option<String> {
    s.map(|s| s.trim().to_string()).filter(|s| !s.is_empty())
}

fn convert(raw: RawQuestion) -> Result<QuestionVariant, GeneratorError> {
    let id = uuid::Uuid::new_v4().to_string();
    match raw.kind.as_str() {
        "mcq" => {
            let prompt = non_blank(raw.prompt)
                .ok_or_else(|| GeneratorError::Malformed("mcq without prompt".into()))?;
            let choices = raw
                .choices
                .into_iter()
                .map(|c| McqChoice::new(c.text, c.is_correct))
                .collect();
            MultipleChoice::new(id, prompt, choices)
                .map(QuestionVariant::Mcq)
                .ok_or_else(|| {
                    GeneratorError::Malformed("mcq must have exactly one correct choice".into())
                })
        }
        "short" => {
            let prompt = non_blank(raw.prompt)
                .ok_or_else(|| GeneratorError::Malformed("short answer without prompt".into()))?;
            let accepted_answers: Vec<String> = raw
                .accepted_answers
                .into_iter()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect();
            if accepted_answers.is_empty() {
                return Err(GeneratorError::Malformed(
                    "short answer without accepted answers".into(),
                ));
            }
            Ok(QuestionVariant::Short(ShortAnswer {
                id,
                prompt,
                accepted_answers,
                guidance: non_blank(raw.answer_guidance),
            }))
        }
        "flashcard" => {
            let front = non_blank(raw.front)
                .or_else(|| non_blank(raw.prompt))
                .ok_or_else(|| GeneratorError::Malformed("flashcard without front".into()))?;
            Ok(QuestionVariant::Flashcard(Flashcard {
                id,
                front,
                back: raw.back.unwrap_or_default().trim().to_string(),
            }))
        }
        other => Err(GeneratorError::Malformed(format!(
            "unknown question type '{other}'"
        ))),
    }
}

/// Extract the JSON array from a model reply and convert every entry into a
/// variant with a fresh id. One bad entry rejects the whole reply.
pub fn parse_variants(reply: &str) -> Result<Vec<QuestionVariant>, GeneratorError> {
    let array = json_array()
        .find(reply)
        .ok_or(GeneratorError::NoJson)?
        .as_str();
    let raw: Vec<RawQuestion> =
        serde_json::from_str(array).map_err(|e| GeneratorError::Malformed(e.to_string()))?;
    raw.into_iter().map(convert).collect()
}
