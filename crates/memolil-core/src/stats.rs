//! Progress statistics over a collection.
//!
//! Percentages are 0-100 floats. Per-day series bucket by the UTC calendar
//! day of `answered_at` and cover the last 30 days.

use std::collections::{BTreeMap, HashMap};

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::collection::Collection;
use crate::item::{KnowledgeItem, MILLIS_PER_DAY};

const LIST_LIMIT: usize = 5;
const RECENT_DAYS: i64 = 30;
const WEEK_DAYS: i64 = 7;
const HARDEST_MIN_ASKS: u32 = 3;
const LEVEL_UP_MIN_STREAK: u32 = 3;
const LEVEL_UP_MIN_INTERVAL: u32 = 7;

/// Item reference used in ranked lists.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemSummary {
    pub id: String,
    pub title: String,
    pub current_streak: u32,
    pub interval_days: u32,
    pub accuracy: f64,
}

impl ItemSummary {
    fn of(item: &KnowledgeItem) -> Self {
        Self {
            id: item.id.clone(),
            title: item.title.clone(),
            current_streak: item.current_streak,
            interval_days: item.interval_days,
            accuracy: item.accuracy().map_or(0.0, |a| a * 100.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TagAccuracy {
    pub tag: String,
    pub accuracy: f64,
    pub answers: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyPoint {
    pub date: String,
    pub points: u64,
    pub answers: usize,
    pub accuracy: f64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IntervalBucket {
    pub range: &'static str,
    pub count: usize,
}

/// Aggregate progress for the stats view.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ProgressStats {
    pub total_items: usize,
    pub due_items: usize,
    pub total_points: u64,
    pub daily_practice_streak: u32,
    pub overall_retention: f64,
    pub last_30_days_retention: f64,
    pub points_this_week: u64,
    pub points_last_30_days: u64,
    pub top_streak_items: Vec<ItemSummary>,
    pub most_forgotten_tags: Vec<TagAccuracy>,
    pub hardest_items: Vec<ItemSummary>,
    pub ready_to_level_up: Vec<ItemSummary>,
    pub daily: Vec<DailyPoint>,
    pub interval_distribution: Vec<IntervalBucket>,
}

fn percent(correct: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        correct as f64 / total as f64 * 100.0
    }
}

fn utc_day(millis: i64) -> String {
    DateTime::<Utc>::from_timestamp_millis(millis)
        .map(|dt| dt.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

fn interval_bucket(days: u32) -> usize {
    match days {
        0..=3 => 0,
        4..=7 => 1,
        8..=14 => 2,
        15..=21 => 3,
        _ => 4,
    }
}

impl ProgressStats {
    pub fn compute(collection: &Collection, now: i64) -> Self {
        let logs = &collection.answer_logs;
        let recent_cutoff = now - RECENT_DAYS * MILLIS_PER_DAY;
        let week_cutoff = now - WEEK_DAYS * MILLIS_PER_DAY;

        let correct_total = logs.iter().filter(|l| l.is_correct).count();
        let recent: Vec<_> = logs.iter().filter(|l| l.answered_at >= recent_cutoff).collect();
        let recent_correct = recent.iter().filter(|l| l.is_correct).count();

        let points_this_week = logs
            .iter()
            .filter(|l| l.answered_at >= week_cutoff)
            .map(|l| u64::from(l.points_awarded))
            .sum();
        let points_last_30_days = recent.iter().map(|l| u64::from(l.points_awarded)).sum();

        let mut top_streak: Vec<&KnowledgeItem> = collection
            .items
            .iter()
            .filter(|i| i.current_streak > 0)
            .collect();
        top_streak.sort_by(|a, b| b.current_streak.cmp(&a.current_streak));

        let mut hardest: Vec<ItemSummary> = collection
            .items
            .iter()
            .filter(|i| i.times_asked >= HARDEST_MIN_ASKS)
            .map(ItemSummary::of)
            .collect();
        hardest.sort_by(|a, b| a.accuracy.total_cmp(&b.accuracy));
        hardest.truncate(LIST_LIMIT);

        let ready_to_level_up = collection
            .items
            .iter()
            .filter(|i| {
                i.current_streak >= LEVEL_UP_MIN_STREAK && i.interval_days >= LEVEL_UP_MIN_INTERVAL
            })
            .take(LIST_LIMIT)
            .map(ItemSummary::of)
            .collect();

        let mut interval_distribution: Vec<IntervalBucket> =
            ["0-3 days", "4-7 days", "8-14 days", "15-21 days", "21+ days"]
                .into_iter()
                .map(|range| IntervalBucket { range, count: 0 })
                .collect();
        for item in &collection.items {
            interval_distribution[interval_bucket(item.interval_days)].count += 1;
        }

        Self {
            total_items: collection.items.len(),
            due_items: collection.items.iter().filter(|i| i.is_due(now)).count(),
            total_points: collection.total_points,
            daily_practice_streak: collection.streak.daily_practice_streak,
            overall_retention: percent(correct_total, logs.len()),
            last_30_days_retention: percent(recent_correct, recent.len()),
            points_this_week,
            points_last_30_days,
            top_streak_items: top_streak
                .into_iter()
                .take(LIST_LIMIT)
                .map(ItemSummary::of)
                .collect(),
            most_forgotten_tags: most_forgotten_tags(collection),
            hardest_items: hardest,
            ready_to_level_up,
            daily: daily_series(&recent),
            interval_distribution,
        }
    }
}

/// Tags with at least one answer, lowest accuracy first.
fn most_forgotten_tags(collection: &Collection) -> Vec<TagAccuracy> {
    let mut per_item: HashMap<&str, (usize, usize)> = HashMap::new();
    for log in &collection.answer_logs {
        let entry = per_item.entry(log.item_id.as_str()).or_default();
        entry.1 += 1;
        if log.is_correct {
            entry.0 += 1;
        }
    }

    let mut per_tag: BTreeMap<&str, (usize, usize)> = BTreeMap::new();
    for item in &collection.items {
        let (correct, total) = per_item.get(item.id.as_str()).copied().unwrap_or_default();
        for tag in &item.tags {
            let entry = per_tag.entry(tag.as_str()).or_default();
            entry.0 += correct;
            entry.1 += total;
        }
    }

    let mut tags: Vec<TagAccuracy> = per_tag
        .into_iter()
        .filter(|(_, (_, total))| *total > 0)
        .map(|(tag, (correct, total))| TagAccuracy {
            tag: tag.to_string(),
            accuracy: percent(correct, total),
            answers: total,
        })
        .collect();
    tags.sort_by(|a, b| a.accuracy.total_cmp(&b.accuracy));
    tags.truncate(LIST_LIMIT);
    tags
}

fn daily_series(recent: &[&crate::item::AnswerLog]) -> Vec<DailyPoint> {
    let mut days: BTreeMap<String, (u64, usize, usize)> = BTreeMap::new();
    for log in recent {
        let entry = days.entry(utc_day(log.answered_at)).or_default();
        entry.0 += u64::from(log.points_awarded);
        entry.1 += 1;
        if log.is_correct {
            entry.2 += 1;
        }
    }
    days.into_iter()
        .map(|(date, (points, answers, correct))| DailyPoint {
            date,
            points,
            answers,
            accuracy: percent(correct, answers),
        })
        .collect()
}
