//! Question generation: a hosted model when available, the local
//! synthesizer otherwise.

mod parse;
mod remote;

pub use parse::parse_variants;
pub use remote::{build_prompt, LlmGenerator, Provider};

use rand::Rng;

use crate::error::GeneratorError;
use crate::item::{KnowledgeItem, QuestionVariant};
use crate::synth::synthesize_questions;

/// Source of question variants for an item.
pub trait QuestionGenerator {
    fn generate(&self, item: &KnowledgeItem) -> Result<Vec<QuestionVariant>, GeneratorError>;
}

/// Variants for `item`, preferring `remote`.
///
/// Any remote error or an empty remote result falls back to
/// [`synthesize_questions`]; this never fails.
pub fn generate_questions<R: Rng + ?Sized>(
    item: &KnowledgeItem,
    remote: Option<&dyn QuestionGenerator>,
    rng: &mut R,
) -> Vec<QuestionVariant> {
    if let Some(generator) = remote {
        match generator.generate(item) {
            Ok(variants) if !variants.is_empty() => return variants,
            Ok(_) => {
                tracing::warn!(item_id = %item.id, "remote generator returned no questions, using local synthesizer")
            }
            Err(e) => {
                tracing::warn!(item_id = %item.id, error = %e, "remote generation failed, using local synthesizer")
            }
        }
    }
    synthesize_questions(item, rng)
}
