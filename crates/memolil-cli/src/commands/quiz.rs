//! Practice session commands for CLI.

use std::io::{self, BufRead, Write};

use clap::Subcommand;
use memolil_core::{
    record_answer, select_due_items, select_variant_index, session_rng, AnswerOutcome,
    AnswerSubmission, Clock, Collection, Config, CoreError, Database, KnowledgeItem,
    QuestionVariant, QuizMode, Response, SystemClock, MILLIS_PER_DAY,
};
use serde::Serialize;

#[derive(Subcommand)]
pub enum QuizAction {
    /// Run an interactive practice session on stdin
    Start {
        /// mixed, mcq, short or flashcard (default: quiz.default_mode)
        #[arg(long)]
        mode: Option<QuizMode>,
        /// Maximum number of questions (default: quiz.questions_per_session)
        #[arg(long)]
        count: Option<usize>,
        /// Seed for a reproducible question order
        #[arg(long)]
        seed: Option<u64>,
    },
    /// List items due for review
    Due,
    /// Record an answer to one variant
    Answer {
        /// Item ID
        item_id: String,
        /// Question variant ID
        variant_id: String,
        /// Choice index or letter, typed answer, or y/n for a flashcard
        answer: String,
    },
    /// Skip one variant without answering
    Skip {
        /// Item ID
        item_id: String,
        /// Question variant ID
        variant_id: String,
    },
}

#[derive(Debug, Default, Serialize)]
struct SessionSummary {
    asked: usize,
    correct: usize,
    skipped: usize,
    points: u32,
    daily_practice_streak: u32,
}

pub fn run(action: QuizAction) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    let namespace = config.namespace();
    let mut db = Database::open()?;
    let clock = SystemClock;

    match action {
        QuizAction::Start { mode, count, seed } => {
            let mode = mode.unwrap_or(config.quiz.default_mode);
            let count = count.unwrap_or(config.quiz.questions_per_session as usize);
            let mut collection = db.load_collection(&namespace)?;
            let mut rng = session_rng(seed);

            let session: Vec<String> = select_due_items(
                &collection.items,
                mode,
                count,
                clock.now_millis(),
                &mut rng,
            )
            .into_iter()
            .map(|item| item.id.clone())
            .collect();

            if session.is_empty() {
                println!("Nothing to practice yet. Add an item with `memolil item add`.");
                return Ok(());
            }

            let stdin = io::stdin();
            let mut input = stdin.lock();
            let mut summary = SessionSummary::default();

            for (n, item_id) in session.iter().enumerate() {
                let Some(item) = collection.item(item_id).cloned() else {
                    continue;
                };
                let index = select_variant_index(&item, mode, &mut rng);
                let Some(variant) = item.question_variants.get(index) else {
                    continue;
                };

                println!("\n[{}/{}] {}", n + 1, session.len(), item.title);
                let Some(submission) = ask(variant, &mut input)? else {
                    break;
                };
                let skipped = submission.skipped;

                let outcome = record_answer(
                    &item,
                    submission,
                    &collection.streak,
                    clock.now_millis(),
                    clock.today(),
                );
                report(&outcome, variant, skipped, config.quiz.show_explanations);

                summary.asked += 1;
                if outcome.log.is_correct {
                    summary.correct += 1;
                }
                if skipped {
                    summary.skipped += 1;
                }
                summary.points += outcome.score.total;

                db.apply_outcome(&namespace, &outcome)?;
                collection.apply_outcome(outcome)?;
            }

            summary.daily_practice_streak = collection.streak.daily_practice_streak;
            println!("\n{}", serde_json::to_string_pretty(&summary)?);
        }
        QuizAction::Due => {
            let collection = db.load_collection(&namespace)?;
            let now = clock.now_millis();
            let mut due: Vec<&KnowledgeItem> =
                collection.items.iter().filter(|i| i.is_due(now)).collect();
            due.sort_by_key(|i| i.next_ask_at);
            println!("{}", serde_json::to_string_pretty(&due)?);
        }
        QuizAction::Answer {
            item_id,
            variant_id,
            answer,
        } => {
            let collection = db.load_collection(&namespace)?;
            let (item, variant) = lookup(&collection, &item_id, &variant_id)?;
            let response = Response::parse_for(variant, &answer);
            let submission = AnswerSubmission::graded(variant, &response);
            let outcome = record_answer(
                item,
                submission,
                &collection.streak,
                clock.now_millis(),
                clock.today(),
            );
            db.apply_outcome(&namespace, &outcome)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
        QuizAction::Skip {
            item_id,
            variant_id,
        } => {
            let collection = db.load_collection(&namespace)?;
            let (item, variant) = lookup(&collection, &item_id, &variant_id)?;
            let outcome = record_answer(
                item,
                AnswerSubmission::skipped(variant),
                &collection.streak,
                clock.now_millis(),
                clock.today(),
            );
            db.apply_outcome(&namespace, &outcome)?;
            println!("{}", serde_json::to_string_pretty(&outcome)?);
        }
    }
    Ok(())
}

fn lookup<'a>(
    collection: &'a Collection,
    item_id: &str,
    variant_id: &str,
) -> Result<(&'a KnowledgeItem, &'a QuestionVariant), CoreError> {
    let item = collection
        .item(item_id)
        .ok_or_else(|| CoreError::item_not_found(item_id))?;
    let variant = item
        .variant(variant_id)
        .ok_or_else(|| CoreError::variant_not_found(variant_id))?;
    Ok((item, variant))
}

/// Read one trimmed line. `None` on end of input or `:q`.
fn read_line(prompt: &str, input: &mut impl BufRead) -> io::Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    let line = line.trim().to_string();
    Ok((line != ":q").then_some(line))
}

/// Present `variant` and collect the user's answer. An empty answer skips.
fn ask(
    variant: &QuestionVariant,
    input: &mut impl BufRead,
) -> io::Result<Option<AnswerSubmission>> {
    println!("{}", variant.prompt());

    let answer = match variant {
        QuestionVariant::Mcq(mcq) => {
            for (i, choice) in mcq.choices.iter().enumerate() {
                let letter = char::from(b'a' + (i % 26) as u8);
                println!("  {letter}) {}", choice.text);
            }
            read_line("> ", input)?
        }
        QuestionVariant::Short(_) => read_line("> ", input)?,
        QuestionVariant::Flashcard(card) => {
            if read_line("(press Enter to reveal) ", input)?.is_none() {
                return Ok(None);
            }
            println!("{}", card.back);
            read_line("Did you know it? [y/n] ", input)?
        }
    };

    Ok(answer.map(|raw| {
        if raw.is_empty() {
            AnswerSubmission::skipped(variant)
        } else {
            AnswerSubmission::graded(variant, &Response::parse_for(variant, &raw))
        }
    }))
}

fn report(
    outcome: &AnswerOutcome,
    variant: &QuestionVariant,
    skipped: bool,
    show_explanations: bool,
) {
    if skipped {
        println!("Skipped.");
    } else if outcome.log.is_correct {
        println!("Correct! +{} points", outcome.score.total);
    } else {
        println!("Not quite.");
    }

    if show_explanations && !outcome.log.is_correct {
        match variant {
            QuestionVariant::Mcq(mcq) => {
                if let Some(choice) = mcq.correct_choice() {
                    println!("Answer: {}", choice.text);
                }
            }
            QuestionVariant::Short(short) => {
                if let Some(answer) = short.accepted_answers.first() {
                    println!("Answer: {answer}");
                }
                if let Some(guidance) = &short.guidance {
                    println!("{guidance}");
                }
            }
            QuestionVariant::Flashcard(_) => {}
        }
    }

    let days = (outcome.schedule.next_ask_at - outcome.log.answered_at) / MILLIS_PER_DAY;
    println!("Next review in {days} day(s).");
}
