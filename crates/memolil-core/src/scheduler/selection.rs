//! Session selection: which items to ask, and which variant of each.
//!
//! Both steps draw from a caller-supplied random source. Output is not
//! reproducible across calls unless the caller seeds that source.

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg64;

use crate::item::{KnowledgeItem, QuizMode};

/// Random source for a session: seeded when `seed` is given, from OS
/// entropy otherwise.
pub fn session_rng(seed: Option<u64>) -> Pcg64 {
    match seed {
        Some(seed) => Pcg64::seed_from_u64(seed),
        None => Pcg64::from_entropy(),
    }
}

/// Pick up to `max_count` items for a practice session.
///
/// Every due item (`next_ask_at <= now`) is a candidate. When fewer than
/// `max_count` are due, the session is topped up with not-yet-due items
/// drawn uniformly without replacement, so non-urgent material still comes
/// around. The combined list is shuffled and truncated.
///
/// Items without question variants are never selected; outside
/// [`QuizMode::Mixed`] an item needs at least one variant of the mode's type.
pub fn select_due_items<'a, R>(
    items: &'a [KnowledgeItem],
    mode: QuizMode,
    max_count: usize,
    now: i64,
    rng: &mut R,
) -> Vec<&'a KnowledgeItem>
where
    R: Rng + ?Sized,
{
    let (due, not_due): (Vec<&KnowledgeItem>, Vec<&KnowledgeItem>) = items
        .iter()
        .filter(|item| !item.question_variants.is_empty())
        .filter(|item| {
            mode.question_type()
                .map_or(true, |kind| item.has_variant_of(kind))
        })
        .partition(|item| item.is_due(now));

    let mut result = due;
    if result.len() < max_count && !not_due.is_empty() {
        let needed = max_count - result.len();
        result.extend(not_due.choose_multiple(rng, needed).copied());
    }

    result.shuffle(rng);
    result.truncate(max_count);
    result
}

/// Pick the index of the variant to present for `item`.
///
/// In mixed mode any variant may be chosen. Otherwise the choice is uniform
/// among variants of the mode's type, and falls back to index 0 when the
/// item has none, in which case the returned variant does not match the
/// requested mode.
pub fn select_variant_index<R>(item: &KnowledgeItem, mode: QuizMode, rng: &mut R) -> usize
where
    R: Rng + ?Sized,
{
    let Some(kind) = mode.question_type() else {
        if item.question_variants.is_empty() {
            return 0;
        }
        return rng.gen_range(0..item.question_variants.len());
    };

    let matching: Vec<usize> = item
        .question_variants
        .iter()
        .enumerate()
        .filter(|(_, v)| v.question_type() == kind)
        .map(|(i, _)| i)
        .collect();

    matching.choose(rng).copied().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{
        Flashcard, ItemDraft, McqChoice, MultipleChoice, QuestionType, QuestionVariant,
        ShortAnswer, MILLIS_PER_DAY,
    };
    use std::collections::{HashMap, HashSet};

    const NOW: i64 = 1_700_000_000_000;

    fn flashcard(id: &str) -> QuestionVariant {
        QuestionVariant::Flashcard(Flashcard {
            id: id.into(),
            front: "front".into(),
            back: "back".into(),
        })
    }

    fn short(id: &str) -> QuestionVariant {
        QuestionVariant::Short(ShortAnswer {
            id: id.into(),
            prompt: "prompt".into(),
            accepted_answers: vec!["answer".into()],
            guidance: None,
        })
    }

    fn mcq(id: &str) -> QuestionVariant {
        QuestionVariant::Mcq(
            MultipleChoice::new(
                id.into(),
                "prompt".into(),
                vec![McqChoice::new("yes", true), McqChoice::new("no", false)],
            )
            .unwrap(),
        )
    }

    fn item(title: &str, next_ask_at: i64, variants: Vec<QuestionVariant>) -> KnowledgeItem {
        let mut item = KnowledgeItem::new(
            ItemDraft {
                title: title.into(),
                content: "Some body text for the item.".into(),
                tags: vec![],
                difficulty: 2,
                source: None,
            },
            NOW - 30 * MILLIS_PER_DAY,
        )
        .unwrap();
        item.next_ask_at = next_ask_at;
        item.question_variants = variants;
        item
    }

    fn due(title: &str) -> KnowledgeItem {
        item(title, NOW - MILLIS_PER_DAY, vec![flashcard("f"), short("s")])
    }

    fn later(title: &str) -> KnowledgeItem {
        item(title, NOW + 3 * MILLIS_PER_DAY, vec![flashcard("f"), mcq("m")])
    }

    #[test]
    fn test_only_due_items_when_enough_are_due() {
        let mut items: Vec<_> = (0..8).map(|i| due(&format!("due {i}"))).collect();
        items.extend((0..5).map(|i| later(&format!("later {i}"))));
        let mut rng = Pcg64::seed_from_u64(7);

        for _ in 0..50 {
            let picked = select_due_items(&items, QuizMode::Mixed, 5, NOW, &mut rng);
            assert_eq!(picked.len(), 5);
            assert!(picked.iter().all(|i| i.next_ask_at <= NOW));
        }
    }

    #[test]
    fn test_tops_up_with_not_due_items() {
        let items = vec![due("a"), later("b"), later("c"), later("d")];
        let mut rng = Pcg64::seed_from_u64(11);
        let picked = select_due_items(&items, QuizMode::Mixed, 3, NOW, &mut rng);
        assert_eq!(picked.len(), 3);
        assert!(picked.iter().any(|i| i.title == "a"));

        let titles: HashSet<_> = picked.iter().map(|i| i.title.as_str()).collect();
        assert_eq!(titles.len(), 3, "no item drawn twice");
    }

    #[test]
    fn test_returns_everything_when_pool_is_small() {
        let items = vec![due("a"), later("b"), later("c")];
        let mut rng = Pcg64::seed_from_u64(3);
        let picked = select_due_items(&items, QuizMode::Mixed, 10, NOW, &mut rng);
        assert_eq!(picked.len(), 3);
    }

    #[test]
    fn test_filters_items_without_matching_variants() {
        let items = vec![
            item("empty", NOW - 1, vec![]),
            due("short and flashcard"),
            later("mcq and flashcard"),
        ];
        let mut rng = Pcg64::seed_from_u64(5);

        let picked = select_due_items(&items, QuizMode::Mcq, 10, NOW, &mut rng);
        assert_eq!(picked.len(), 1);
        assert_eq!(picked[0].title, "mcq and flashcard");

        let picked = select_due_items(&items, QuizMode::Mixed, 10, NOW, &mut rng);
        assert_eq!(picked.len(), 2);
        assert!(picked.iter().all(|i| i.title != "empty"));
    }

    #[test]
    fn test_empty_pool_and_zero_count() {
        let mut rng = Pcg64::seed_from_u64(1);
        assert!(select_due_items(&[], QuizMode::Mixed, 10, NOW, &mut rng).is_empty());

        let items = vec![due("a")];
        assert!(select_due_items(&items, QuizMode::Mixed, 0, NOW, &mut rng).is_empty());
    }

    #[test]
    fn test_top_up_is_roughly_uniform() {
        let items: Vec<_> = (0..4).map(|i| later(&format!("later {i}"))).collect();
        let mut rng = Pcg64::seed_from_u64(42);
        let mut counts: HashMap<String, u32> = HashMap::new();

        let rounds = 4_000;
        for _ in 0..rounds {
            for picked in select_due_items(&items, QuizMode::Mixed, 1, NOW, &mut rng) {
                *counts.entry(picked.title.clone()).or_default() += 1;
            }
        }

        assert_eq!(counts.len(), 4);
        for (title, count) in counts {
            // Expected 1000 each; allow generous slack.
            assert!((800..1200).contains(&count), "{title} picked {count} times");
        }
    }

    #[test]
    fn test_variant_index_respects_mode() {
        let it = item("x", NOW, vec![flashcard("f"), short("s1"), mcq("m"), short("s2")]);
        let mut rng = Pcg64::seed_from_u64(9);

        let mut seen = HashSet::new();
        for _ in 0..200 {
            let idx = select_variant_index(&it, QuizMode::Short, &mut rng);
            assert_eq!(it.question_variants[idx].question_type(), QuestionType::Short);
            seen.insert(idx);
        }
        assert_eq!(seen, HashSet::from([1, 3]));

        let mut mixed = HashSet::new();
        for _ in 0..200 {
            mixed.insert(select_variant_index(&it, QuizMode::Mixed, &mut rng));
        }
        assert_eq!(mixed.len(), 4);
    }

    #[test]
    fn test_seeded_session_is_reproducible() {
        let items: Vec<_> = (0..10).map(|i| due(&format!("due {i}"))).collect();
        let first: Vec<_> = select_due_items(&items, QuizMode::Mixed, 4, NOW, &mut session_rng(Some(5)))
            .iter()
            .map(|i| i.id.clone())
            .collect();
        let second: Vec<_> = select_due_items(&items, QuizMode::Mixed, 4, NOW, &mut session_rng(Some(5)))
            .iter()
            .map(|i| i.id.clone())
            .collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_variant_index_falls_back_to_zero() {
        let it = item("x", NOW, vec![short("s"), flashcard("f")]);
        let mut rng = Pcg64::seed_from_u64(2);
        assert_eq!(select_variant_index(&it, QuizMode::Mcq, &mut rng), 0);

        let empty = item("y", NOW, vec![]);
        assert_eq!(select_variant_index(&empty, QuizMode::Mixed, &mut rng), 0);
    }
}
