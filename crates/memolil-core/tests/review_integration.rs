//! Integration tests for the review loop: store, selection, grading,
//! recording and statistics working together.

use memolil_core::{
    grade, record_answer, seed_collection, select_due_items, select_variant_index, session_rng,
    AnswerSubmission, Clock, Collection, Database, FixedClock, ItemDraft, KnowledgeItem,
    Namespace, ProgressStats, QuestionVariant, QuizMode, Response, MILLIS_PER_DAY,
};

// 2024-03-01T00:00:00Z
const NOW: i64 = 1_709_251_200_000;

fn correct_response(variant: &QuestionVariant) -> Response {
    match variant {
        QuestionVariant::Mcq(mcq) => Response::Choice(mcq.correct_index),
        QuestionVariant::Short(short) => Response::Text(short.accepted_answers[0].clone()),
        QuestionVariant::Flashcard(_) => Response::SelfMarked(true),
    }
}

fn answer(
    db: &mut Database,
    collection: &mut Collection,
    item_id: &str,
    variant_index: usize,
    correct: bool,
    clock: &impl Clock,
) {
    let item = collection.item(item_id).unwrap().clone();
    let variant = &item.question_variants[variant_index];
    let submission = if correct {
        AnswerSubmission::graded(variant, &correct_response(variant))
    } else {
        AnswerSubmission::graded(variant, &Response::Text(String::new()))
    };
    let outcome = record_answer(
        &item,
        submission,
        &collection.streak,
        clock.now_millis(),
        clock.today(),
    );
    db.apply_outcome(&collection.namespace, &outcome).unwrap();
    collection.apply_outcome(outcome).unwrap();
}

fn sorted(mut collection: Collection) -> Collection {
    collection.items.sort_by(|a, b| a.id.cmp(&b.id));
    collection
}

#[test]
fn test_seeded_session_persists_and_matches_memory() {
    let mut db = Database::open_memory().unwrap();
    db.replace_collection(&seed_collection(NOW)).unwrap();

    let mut collection = db.load_collection(&Namespace::Personal).unwrap();
    let clock = FixedClock::at(NOW);
    let mut rng = session_rng(Some(42));

    let session: Vec<String> = select_due_items(&collection.items, QuizMode::Mixed, 10, NOW, &mut rng)
        .into_iter()
        .map(|i| i.id.clone())
        .collect();
    // Four seeded items are due and the fifth tops the session up.
    assert_eq!(session.len(), 5);

    for id in &session {
        let item = collection.item(id).unwrap().clone();
        let index = select_variant_index(&item, QuizMode::Mixed, &mut rng);
        let variant = &item.question_variants[index];
        assert!(grade(variant, &correct_response(variant)));
        answer(&mut db, &mut collection, id, index, true, &clock);
    }

    let reloaded = db.load_collection(&Namespace::Personal).unwrap();
    assert_eq!(sorted(reloaded), sorted(collection.clone()));

    let stats = ProgressStats::compute(&collection, NOW);
    assert_eq!(stats.total_items, 5);
    assert_eq!(stats.due_items, 0);
    assert_eq!(stats.overall_retention, 100.0);
    assert_eq!(stats.daily_practice_streak, 1);
    assert_eq!(stats.points_this_week, collection.total_points);
    assert!(collection.total_points > 0);
}

#[test]
fn test_item_matures_over_consecutive_reviews() {
    let mut db = Database::open_memory().unwrap();
    let mut collection = Collection::new(Namespace::Family("smiths".into()));

    let mut item = KnowledgeItem::new(
        ItemDraft {
            title: "Borrowing".into(),
            content: "A shared reference allows reading. A mutable reference is exclusive."
                .into(),
            tags: vec!["rust".into()],
            difficulty: 2,
            source: None,
        },
        NOW,
    )
    .unwrap();
    let mut rng = session_rng(Some(3));
    item.question_variants = memolil_core::synthesize_questions(&item, &mut rng);
    let id = item.id.clone();
    db.save_item(&collection.namespace, &item).unwrap();
    collection.add_item(item);

    // Answer correctly each time the item comes due.
    let mut expected_intervals = Vec::new();
    for _ in 0..4 {
        let due_at = collection.item(&id).unwrap().next_ask_at;
        answer(&mut db, &mut collection, &id, 0, true, &FixedClock::at(due_at));
        expected_intervals.push(collection.item(&id).unwrap().interval_days);
    }
    assert_eq!(expected_intervals, vec![2, 4, 8, 16]);

    let stored = db.item(&collection.namespace, &id).unwrap();
    assert_eq!(stored.current_streak, 4);
    assert_eq!(stored.times_asked, 4);

    // Gaps of more than one day break the collection streak.
    assert_eq!(collection.streak.daily_practice_streak, 1);

    // A miss resets the interval and the item streak.
    let due_at = stored.next_ask_at;
    answer(&mut db, &mut collection, &id, 0, false, &FixedClock::at(due_at));
    let stored = db.item(&collection.namespace, &id).unwrap();
    assert_eq!(stored.interval_days, 1);
    assert_eq!(stored.current_streak, 0);
    assert_eq!(stored.next_ask_at, due_at + MILLIS_PER_DAY);

    let stats = ProgressStats::compute(&collection, due_at);
    assert_eq!(stats.overall_retention, 80.0);

    // The personal namespace is untouched.
    assert_eq!(db.item_count(&Namespace::Personal).unwrap(), 0);
}

#[test]
fn test_daily_streak_across_consecutive_days() {
    let mut db = Database::open_memory().unwrap();
    db.replace_collection(&seed_collection(NOW)).unwrap();
    let mut collection = db.load_collection(&Namespace::Personal).unwrap();
    let ids: Vec<String> = collection.items.iter().map(|i| i.id.clone()).collect();

    for (day, id) in ids.iter().take(3).enumerate() {
        let clock = FixedClock::at(NOW + day as i64 * MILLIS_PER_DAY + 3_600_000);
        answer(&mut db, &mut collection, id, 0, true, &clock);
    }
    assert_eq!(collection.streak.daily_practice_streak, 3);
    assert_eq!(collection.streak.last_practice_date.as_deref(), Some("2024-03-03"));

    let reloaded = db.load_collection(&Namespace::Personal).unwrap();
    assert_eq!(reloaded.streak, collection.streak);
    assert_eq!(reloaded.total_points, collection.total_points);
}
