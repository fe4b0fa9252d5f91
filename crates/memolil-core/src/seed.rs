//! Sample collection for first-run demos.

use crate::collection::{Collection, Namespace};
use crate::item::{
    Flashcard, KnowledgeItem, McqChoice, MultipleChoice, QuestionVariant, ShortAnswer,
    MILLIS_PER_DAY,
};
use crate::synth::flashcard_front;

struct SeedItem {
    title: &'static str,
    content: &'static str,
    tags: [&'static str; 3],
    difficulty: u8,
    /// Days before `now` the item was created.
    age_days: i64,
    /// Next review relative to `now`, in days.
    next_ask_in_days: i64,
    interval_days: u32,
    times_asked: u32,
    times_correct: u32,
    current_streak: u32,
    last_answered_days_ago: i64,
    last_answer_correct: bool,
}

const SEED_ITEMS: [SeedItem; 5] = [
    SeedItem {
        title: "React useEffect Hook",
        content: "useEffect is a React Hook that lets you synchronize a component with an external system. It runs after every render by default, but you can control when it runs by passing a dependency array. The cleanup function returned from useEffect runs before the component unmounts or before the effect runs again.",
        tags: ["react", "hooks", "javascript"],
        difficulty: 3,
        age_days: 10,
        next_ask_in_days: -2,
        interval_days: 3,
        times_asked: 5,
        times_correct: 4,
        current_streak: 2,
        last_answered_days_ago: 3,
        last_answer_correct: true,
    },
    SeedItem {
        title: "Python List Comprehension",
        content: "List comprehensions provide a concise way to create lists in Python. The syntax is [expression for item in iterable if condition]. For example: squares = [x**2 for x in range(10)] creates a list of squares. They are more readable and often faster than traditional for loops.",
        tags: ["python", "syntax", "programming"],
        difficulty: 2,
        age_days: 7,
        next_ask_in_days: 0,
        interval_days: 2,
        times_asked: 3,
        times_correct: 3,
        current_streak: 3,
        last_answered_days_ago: 2,
        last_answer_correct: true,
    },
    SeedItem {
        title: "SQL JOIN Types",
        content: "SQL has several types of JOINs: INNER JOIN returns rows when there is a match in both tables. LEFT JOIN returns all rows from the left table and matched rows from the right. RIGHT JOIN returns all rows from the right table and matched rows from the left. FULL OUTER JOIN returns all rows when there is a match in either table.",
        tags: ["sql", "database", "joins"],
        difficulty: 3,
        age_days: 5,
        next_ask_in_days: 1,
        interval_days: 4,
        times_asked: 4,
        times_correct: 2,
        current_streak: 0,
        last_answered_days_ago: 4,
        last_answer_correct: false,
    },
    SeedItem {
        title: "CSS Flexbox",
        content: "Flexbox is a one-dimensional layout method for arranging items in rows or columns. Items flex to fill additional space or shrink to fit into smaller spaces. Key properties include display: flex on the container, flex-direction to set the main axis, justify-content for main axis alignment, and align-items for cross axis alignment.",
        tags: ["css", "layout", "frontend"],
        difficulty: 2,
        age_days: 3,
        next_ask_in_days: 0,
        interval_days: 1,
        times_asked: 2,
        times_correct: 2,
        current_streak: 2,
        last_answered_days_ago: 1,
        last_answer_correct: true,
    },
    SeedItem {
        title: "Git Rebase vs Merge",
        content: "Git merge combines branches by creating a new merge commit that ties together the histories. Git rebase moves or combines a sequence of commits to a new base commit, creating a linear history. Merge preserves history, while rebase rewrites it. Use merge for shared branches and rebase for cleaning up local commits.",
        tags: ["git", "version-control", "workflow"],
        difficulty: 4,
        age_days: 1,
        next_ask_in_days: 0,
        interval_days: 1,
        times_asked: 1,
        times_correct: 0,
        current_streak: 0,
        last_answered_days_ago: 1,
        last_answer_correct: false,
    },
];

const SEED_DISTRACTORS: [&str; 3] = [
    "This is not related to the topic",
    "This contradicts the core principle",
    "This is a common misconception",
];

fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// Fixed variants: title flashcard, "Explain" short answer, and an MCQ with
/// the first sentence as the correct first choice.
fn seed_variants(title: &str, content: &str) -> Vec<QuestionVariant> {
    let first_sentence = content.split('.').next().unwrap_or(content).trim().to_string();
    let back = content
        .split('\n')
        .next()
        .unwrap_or_default()
        .chars()
        .take(200)
        .collect();

    let mut choices = vec![McqChoice::new(first_sentence.clone(), true)];
    choices.extend(SEED_DISTRACTORS.iter().map(|d| McqChoice::new(*d, false)));

    let mut variants = vec![
        QuestionVariant::Flashcard(Flashcard {
            id: new_id(),
            front: flashcard_front(title),
            back,
        }),
        QuestionVariant::Short(ShortAnswer {
            id: new_id(),
            prompt: format!("Explain {title}"),
            accepted_answers: vec![first_sentence, title.to_string()],
            guidance: Some(format!("Key concept: {title}")),
        }),
    ];
    variants.extend(
        MultipleChoice::new(
            new_id(),
            format!("Which statement about \"{title}\" is correct?"),
            choices,
        )
        .map(QuestionVariant::Mcq),
    );
    variants
}

/// Five sample items positioned relative to `now`: three due, one due
/// tomorrow, one overdue.
pub fn seed_items(now: i64) -> Vec<KnowledgeItem> {
    SEED_ITEMS
        .iter()
        .map(|s| {
            let created_at = now - s.age_days * MILLIS_PER_DAY;
            KnowledgeItem {
                id: new_id(),
                title: s.title.to_string(),
                content: s.content.to_string(),
                tags: s.tags.iter().map(|t| t.to_string()).collect(),
                difficulty: s.difficulty,
                source: "typed".to_string(),
                created_at,
                introduced_at: created_at,
                question_variants: seed_variants(s.title, s.content),
                next_ask_at: now + s.next_ask_in_days * MILLIS_PER_DAY,
                interval_days: s.interval_days,
                times_asked: s.times_asked,
                times_correct: s.times_correct,
                current_streak: s.current_streak,
                last_answered_at: Some(now - s.last_answered_days_ago * MILLIS_PER_DAY),
                last_answer_correct: Some(s.last_answer_correct),
            }
        })
        .collect()
}

/// A personal collection holding the sample items and no history.
pub fn seed_collection(now: i64) -> Collection {
    let mut collection = Collection::new(Namespace::Personal);
    collection.items = seed_items(now);
    collection
}
