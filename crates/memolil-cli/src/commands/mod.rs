pub mod config;
pub mod data;
pub mod item;
pub mod quiz;
pub mod stats;

use memolil_core::{
    generate_questions, session_rng, Config, KnowledgeItem, LlmGenerator, QuestionGenerator,
    QuestionVariant,
};

/// Question variants for `item`, from the configured remote generator unless
/// `local_only` is set or the generator cannot be built.
pub(crate) fn build_variants(
    item: &KnowledgeItem,
    config: &Config,
    local_only: bool,
) -> Vec<QuestionVariant> {
    let remote = if local_only {
        None
    } else {
        match LlmGenerator::from_config(&config.generator) {
            Ok(generator) => Some(generator),
            Err(e) => {
                tracing::info!("remote question generator unavailable: {e}");
                None
            }
        }
    };
    let mut rng = session_rng(None);
    generate_questions(
        item,
        remote.as_ref().map(|g| g as &dyn QuestionGenerator),
        &mut rng,
    )
}

/// Split a comma-separated tag list.
pub(crate) fn split_tags(tags: Option<String>) -> Vec<String> {
    tags.map(|t| t.split(',').map(|s| s.trim().to_string()).collect())
        .unwrap_or_default()
}
