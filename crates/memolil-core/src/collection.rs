//! In-memory snapshot of one namespace: items, answer log, points and
//! the daily streak.

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, Result, ValidationError};
use crate::item::{AnswerLog, KnowledgeItem, QuestionVariant};
use crate::review::AnswerOutcome;
use crate::streak::DailyStreakState;

const PERSONAL_KEY: &str = "memolil:v1";
const FAMILY_PREFIX: &str = "memolil-family:";

/// Storage key separating personal data from a shared family collection.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Namespace {
    #[default]
    Personal,
    Family(String),
}

impl Namespace {
    pub fn key(&self) -> String {
        match self {
            Namespace::Personal => PERSONAL_KEY.to_string(),
            Namespace::Family(id) => format!("{FAMILY_PREFIX}{id}"),
        }
    }

    /// Family namespace if `family_id` is set and non-blank, else personal.
    pub fn for_family(family_id: Option<&str>) -> Self {
        match family_id.map(str::trim) {
            Some(id) if !id.is_empty() => Namespace::Family(id.to_string()),
            _ => Namespace::Personal,
        }
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.key())
    }
}

impl FromStr for Namespace {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        if s == PERSONAL_KEY {
            return Ok(Namespace::Personal);
        }
        match s.strip_prefix(FAMILY_PREFIX) {
            Some(id) if !id.is_empty() => Ok(Namespace::Family(id.to_string())),
            _ => Err(ValidationError::InvalidValue {
                field: "namespace".into(),
                message: format!("unrecognized namespace key '{s}'"),
            }),
        }
    }
}

impl Serialize for Namespace {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.key())
    }
}

impl<'de> Deserialize<'de> for Namespace {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// Ordering for item listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemSort {
    /// Most recently created first.
    #[default]
    Newest,
    /// Hardest first.
    Difficulty,
    /// Best-remembered first; unasked items count as 0%.
    Retention,
}

impl FromStr for ItemSort {
    type Err = ValidationError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "newest" => Ok(ItemSort::Newest),
            "difficulty" => Ok(ItemSort::Difficulty),
            "retention" => Ok(ItemSort::Retention),
            other => Err(ValidationError::InvalidValue {
                field: "sort".into(),
                message: format!("'{other}' is not one of newest, difficulty, retention"),
            }),
        }
    }
}

/// Everything stored under one namespace.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    pub namespace: Namespace,
    #[serde(default)]
    pub items: Vec<KnowledgeItem>,
    #[serde(default)]
    pub answer_logs: Vec<AnswerLog>,
    #[serde(default)]
    pub total_points: u64,
    #[serde(default)]
    pub streak: DailyStreakState,
}

impl Collection {
    pub fn new(namespace: Namespace) -> Self {
        Self {
            namespace,
            ..Self::default()
        }
    }

    pub fn item(&self, id: &str) -> Option<&KnowledgeItem> {
        self.items.iter().find(|i| i.id == id)
    }

    fn item_mut(&mut self, id: &str) -> Result<&mut KnowledgeItem> {
        self.items
            .iter_mut()
            .find(|i| i.id == id)
            .ok_or_else(|| CoreError::item_not_found(id))
    }

    pub fn add_item(&mut self, item: KnowledgeItem) {
        self.items.push(item);
    }

    /// Replace an item's question variants.
    pub fn set_variants(&mut self, item_id: &str, variants: Vec<QuestionVariant>) -> Result<()> {
        self.item_mut(item_id)?.question_variants = variants;
        Ok(())
    }

    /// Remove an item and every log entry that refers to it.
    ///
    /// Points already earned stay in `total_points`.
    pub fn delete_item(&mut self, item_id: &str) -> Result<KnowledgeItem> {
        let pos = self
            .items
            .iter()
            .position(|i| i.id == item_id)
            .ok_or_else(|| CoreError::item_not_found(item_id))?;
        self.answer_logs.retain(|log| log.item_id != item_id);
        Ok(self.items.remove(pos))
    }

    /// Merge the result of [`record_answer`](crate::review::record_answer).
    pub fn apply_outcome(&mut self, outcome: AnswerOutcome) -> Result<()> {
        let item = self.item_mut(&outcome.item_id)?;
        outcome.schedule.apply_to(item);
        self.total_points += u64::from(outcome.score.total);
        self.streak = outcome.daily_streak;
        self.answer_logs.push(outcome.log);
        Ok(())
    }

    pub fn logs_for<'a>(&'a self, item_id: &'a str) -> impl Iterator<Item = &'a AnswerLog> + 'a {
        self.answer_logs.iter().filter(move |l| l.item_id == item_id)
    }

    /// Items whose title, body or any tag contains `query`, ignoring case.
    /// An empty query matches everything.
    pub fn search(&self, query: &str) -> Vec<&KnowledgeItem> {
        let query = query.trim().to_lowercase();
        self.items
            .iter()
            .filter(|item| {
                query.is_empty()
                    || item.title.to_lowercase().contains(&query)
                    || item.content.to_lowercase().contains(&query)
                    || item.tags.iter().any(|t| t.to_lowercase().contains(&query))
            })
            .collect()
    }

    /// Search, then order by `sort`.
    pub fn list(&self, query: &str, sort: ItemSort) -> Vec<&KnowledgeItem> {
        let mut items = self.search(query);
        sort_items(&mut items, sort);
        items
    }
}

/// Stable sort of an item listing.
pub fn sort_items(items: &mut [&KnowledgeItem], sort: ItemSort) {
    match sort {
        ItemSort::Newest => items.sort_by(|a, b| b.created_at.cmp(&a.created_at)),
        ItemSort::Difficulty => items.sort_by(|a, b| b.difficulty.cmp(&a.difficulty)),
        ItemSort::Retention => items.sort_by(|a, b| {
            let ra = a.accuracy().unwrap_or(0.0);
            let rb = b.accuracy().unwrap_or(0.0);
            rb.partial_cmp(&ra).unwrap_or(Ordering::Equal)
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::item::{Flashcard, ItemDraft, MILLIS_PER_DAY};
    use crate::review::{record_answer, AnswerSubmission};
    use crate::streak::parse_day;

    fn item(title: &str, tags: &[&str], difficulty: u8, created_at: i64) -> KnowledgeItem {
        let mut item = KnowledgeItem::new(
            ItemDraft {
                title: title.into(),
                content: format!("Notes about {title}."),
                tags: tags.iter().map(|t| t.to_string()).collect(),
                difficulty,
                source: None,
            },
            created_at,
        )
        .unwrap();
        item.question_variants = vec![QuestionVariant::Flashcard(Flashcard {
            id: format!("{title}-card"),
            front: format!("What is {title}?"),
            back: "notes".into(),
        })];
        item
    }

    fn collection() -> Collection {
        let mut c = Collection::new(Namespace::Personal);
        c.add_item(item("Ownership", &["Rust"], 3, 100));
        c.add_item(item("Docker layers", &["devops"], 5, 300));
        c.add_item(item("SQL joins", &["database", "sql"], 1, 200));
        c
    }

    #[test]
    fn test_namespace_keys_roundtrip() {
        assert_eq!(Namespace::Personal.key(), "memolil:v1");
        let fam = Namespace::for_family(Some(" team-a "));
        assert_eq!(fam.key(), "memolil-family:team-a");
        assert_eq!("memolil-family:team-a".parse::<Namespace>().unwrap(), fam);
        assert_eq!(Namespace::for_family(Some("  ")), Namespace::Personal);
        assert!("memolil-family:".parse::<Namespace>().is_err());
        assert!("other".parse::<Namespace>().is_err());
    }

    #[test]
    fn test_search_is_case_insensitive_over_all_fields() {
        let c = collection();
        assert_eq!(c.search("OWNER").len(), 1);
        assert_eq!(c.search("rust")[0].title, "Ownership");
        assert_eq!(c.search("notes about").len(), 3);
        assert_eq!(c.search("").len(), 3);
        assert!(c.search("kubernetes").is_empty());
    }

    #[test]
    fn test_sort_orders() {
        fn titles(items: Vec<&KnowledgeItem>) -> Vec<String> {
            items.iter().map(|i| i.title.clone()).collect()
        }

        let mut c = collection();
        assert_eq!(
            titles(c.list("", ItemSort::Newest)),
            ["Docker layers", "SQL joins", "Ownership"]
        );
        assert_eq!(
            titles(c.list("", ItemSort::Difficulty)),
            ["Docker layers", "Ownership", "SQL joins"]
        );

        c.items[0].times_asked = 4;
        c.items[0].times_correct = 3;
        c.items[2].times_asked = 2;
        c.items[2].times_correct = 2;
        assert_eq!(
            titles(c.list("", ItemSort::Retention)),
            ["SQL joins", "Ownership", "Docker layers"]
        );
    }

    #[test]
    fn test_apply_outcome_and_delete_cascade() {
        let mut c = collection();
        let now = 10 * MILLIS_PER_DAY;
        let target = c.items[0].clone();
        let submission = AnswerSubmission::graded(
            &target.question_variants[0],
            &crate::grading::Response::SelfMarked(true),
        );
        let outcome = record_answer(&target, submission, &c.streak, now, parse_day("2024-02-01").unwrap());
        let points = outcome.score.total;
        c.apply_outcome(outcome).unwrap();

        assert_eq!(c.total_points, u64::from(points));
        assert_eq!(c.answer_logs.len(), 1);
        assert_eq!(c.streak.daily_practice_streak, 1);
        assert_eq!(c.item(&target.id).unwrap().times_asked, 1);
        assert_eq!(c.logs_for(&target.id).count(), 1);

        let removed = c.delete_item(&target.id).unwrap();
        assert_eq!(removed.id, target.id);
        assert!(c.answer_logs.is_empty());
        assert_eq!(c.total_points, u64::from(points));
        assert!(matches!(
            c.delete_item(&target.id),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn test_set_variants_unknown_item() {
        let mut c = collection();
        assert!(c.set_variants("missing", vec![]).is_err());
        let id = c.items[1].id.clone();
        c.set_variants(&id, vec![]).unwrap();
        assert!(c.item(&id).unwrap().question_variants.is_empty());
    }

    #[test]
    fn test_collection_serializes_namespace_as_key() {
        let c = Collection::new(Namespace::Family("f1".into()));
        let json = serde_json::to_value(&c).unwrap();
        assert_eq!(json["namespace"], "memolil-family:f1");
        let back: Collection = serde_json::from_value(json).unwrap();
        assert_eq!(back.namespace, Namespace::Family("f1".into()));
    }
}
