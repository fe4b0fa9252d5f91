//! SQLite-backed collection store.
//!
//! Provides persistent storage for:
//! - Knowledge items with their variants and review state
//! - The append-only answer log
//! - Per-namespace points and daily streak
//!
//! Rows are partitioned by [`Namespace`] key so personal and family
//! collections share one database file.

use std::collections::BTreeSet;
use std::path::Path;

use rusqlite::{params, Connection, OptionalExtension, Row, Transaction};

use super::{data_dir, migrations};
use crate::collection::{Collection, Namespace};
use crate::error::{CoreError, DatabaseError, Result};
use crate::item::{AnswerLog, KnowledgeItem, QuestionType, QuestionVariant};
use crate::review::AnswerOutcome;
use crate::streak::DailyStreakState;

const ITEM_COLUMNS: &str = "id, title, content, tags, difficulty, source, created_at, introduced_at,
     question_variants, next_ask_at, interval_days, times_asked, times_correct, current_streak,
     last_answered_at, last_answer_correct";

/// Item row with its JSON columns still encoded.
struct ItemRow {
    item: KnowledgeItem,
    tags: String,
    variants: String,
}

impl ItemRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            item: KnowledgeItem {
                id: row.get(0)?,
                title: row.get(1)?,
                content: row.get(2)?,
                tags: BTreeSet::new(),
                difficulty: row.get(4)?,
                source: row.get(5)?,
                created_at: row.get(6)?,
                introduced_at: row.get(7)?,
                question_variants: Vec::new(),
                next_ask_at: row.get(9)?,
                interval_days: row.get(10)?,
                times_asked: row.get(11)?,
                times_correct: row.get(12)?,
                current_streak: row.get(13)?,
                last_answered_at: row.get(14)?,
                last_answer_correct: row.get(15)?,
            },
            tags: row.get(3)?,
            variants: row.get(8)?,
        })
    }

    fn decode(self) -> Result<KnowledgeItem> {
        let corrupt = |e: serde_json::Error| DatabaseError::CorruptRow {
            table: "items",
            message: format!("{}: {e}", self.item.id),
        };
        let tags: BTreeSet<String> = serde_json::from_str(&self.tags).map_err(corrupt)?;
        let variants: Vec<QuestionVariant> =
            serde_json::from_str(&self.variants).map_err(corrupt)?;
        Ok(KnowledgeItem {
            tags,
            question_variants: variants,
            ..self.item
        })
    }
}

/// SQLite database holding every namespace's collection.
pub struct Database {
    conn: Connection,
}

impl Database {
    /// Get a reference to the underlying SQLite connection.
    pub fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Open the database at `~/.config/memolil/memolil.db`.
    ///
    /// Creates the database file and schema if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self> {
        Self::open_at(&data_dir()?.join("memolil.db"))
    }

    /// Open (or create) the database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::debug!(path = %path.display(), "opened database");
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        Self::with_connection(conn)
    }

    fn with_connection(conn: Connection) -> Result<Self> {
        migrations::migrate(&conn)
            .map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    /// Load everything stored under `namespace`. Unknown namespaces load empty.
    pub fn load_collection(&self, namespace: &Namespace) -> Result<Collection> {
        let key = namespace.key();

        let mut stmt = self.conn.prepare(&format!(
            "SELECT {ITEM_COLUMNS} FROM items WHERE namespace = ?1 ORDER BY created_at, id"
        ))?;
        let rows = stmt
            .query_map(params![key], ItemRow::from_row)?
            .collect::<rusqlite::Result<Vec<_>>>()?;
        let items = rows
            .into_iter()
            .map(ItemRow::decode)
            .collect::<Result<Vec<_>>>()?;

        let answer_logs = self.answer_logs(namespace)?;
        let (total_points, streak) = self.state(namespace)?;

        Ok(Collection {
            namespace: namespace.clone(),
            items,
            answer_logs,
            total_points,
            streak,
        })
    }

    pub fn item(&self, namespace: &Namespace, id: &str) -> Result<KnowledgeItem> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {ITEM_COLUMNS} FROM items WHERE namespace = ?1 AND id = ?2"),
                params![namespace.key(), id],
                ItemRow::from_row,
            )
            .optional()?
            .ok_or_else(|| CoreError::item_not_found(id))?;
        row.decode()
    }

    pub fn item_count(&self, namespace: &Namespace) -> Result<usize> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM items WHERE namespace = ?1",
            params![namespace.key()],
            |row| row.get(0),
        )?;
        Ok(count as usize)
    }

    fn answer_logs(&self, namespace: &Namespace) -> Result<Vec<AnswerLog>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, item_id, variant_id, answered_at, mode, user_answer, is_correct, points_awarded
             FROM answer_logs WHERE namespace = ?1 ORDER BY answered_at, rowid",
        )?;
        let rows = stmt
            .query_map(params![namespace.key()], |row| {
                Ok((
                    AnswerLog {
                        id: row.get(0)?,
                        item_id: row.get(1)?,
                        variant_id: row.get(2)?,
                        answered_at: row.get(3)?,
                        mode: QuestionType::Flashcard,
                        user_answer: row.get(5)?,
                        is_correct: row.get(6)?,
                        points_awarded: row.get(7)?,
                    },
                    row.get::<_, String>(4)?,
                ))
            })?
            .collect::<rusqlite::Result<Vec<_>>>()?;

        rows.into_iter()
            .map(|(log, mode)| {
                let mode = mode.parse().map_err(|_| DatabaseError::CorruptRow {
                    table: "answer_logs",
                    message: format!("{}: unknown mode '{mode}'", log.id),
                })?;
                Ok(AnswerLog { mode, ..log })
            })
            .collect()
    }

    fn state(&self, namespace: &Namespace) -> Result<(u64, DailyStreakState)> {
        let row = self
            .conn
            .query_row(
                "SELECT total_points, daily_practice_streak, last_practice_date
                 FROM collection_state WHERE namespace = ?1",
                params![namespace.key()],
                |row| {
                    Ok((
                        row.get::<_, i64>(0)?,
                        DailyStreakState {
                            daily_practice_streak: row.get(1)?,
                            last_practice_date: row.get(2)?,
                        },
                    ))
                },
            )
            .optional()?;
        Ok(row
            .map(|(points, streak)| (points.max(0) as u64, streak))
            .unwrap_or_default())
    }

    /// Insert or replace an item.
    pub fn save_item(&self, namespace: &Namespace, item: &KnowledgeItem) -> Result<()> {
        write_item(&self.conn, &namespace.key(), item)
    }

    /// Delete an item and its answer log entries.
    ///
    /// # Errors
    /// Returns [`CoreError::NotFound`] if the item does not exist.
    pub fn delete_item(&mut self, namespace: &Namespace, id: &str) -> Result<()> {
        let key = namespace.key();
        let tx = self.conn.transaction()?;
        let deleted = tx.execute(
            "DELETE FROM items WHERE namespace = ?1 AND id = ?2",
            params![key, id],
        )?;
        if deleted == 0 {
            return Err(CoreError::item_not_found(id));
        }
        tx.execute(
            "DELETE FROM answer_logs WHERE namespace = ?1 AND item_id = ?2",
            params![key, id],
        )?;
        tx.commit()?;
        Ok(())
    }

    pub fn append_log(&self, namespace: &Namespace, log: &AnswerLog) -> Result<()> {
        write_log(&self.conn, &namespace.key(), log)
    }

    pub fn save_state(
        &self,
        namespace: &Namespace,
        total_points: u64,
        streak: &DailyStreakState,
    ) -> Result<()> {
        write_state(&self.conn, &namespace.key(), total_points, streak)
    }

    /// Persist an answer atomically: schedule fields, log entry, points and
    /// daily streak.
    ///
    /// # Errors
    /// Returns [`CoreError::NotFound`] if the item was deleted meanwhile.
    pub fn apply_outcome(&mut self, namespace: &Namespace, outcome: &AnswerOutcome) -> Result<()> {
        let key = namespace.key();
        let (total_points, _) = self.state(namespace)?;
        let tx = self.conn.transaction()?;

        let s = &outcome.schedule;
        let updated = tx.execute(
            "UPDATE items SET next_ask_at = ?3, interval_days = ?4, current_streak = ?5,
                 times_asked = ?6, times_correct = ?7, last_answered_at = ?8, last_answer_correct = ?9
             WHERE namespace = ?1 AND id = ?2",
            params![
                key,
                outcome.item_id,
                s.next_ask_at,
                s.interval_days,
                s.current_streak,
                s.times_asked,
                s.times_correct,
                s.last_answered_at,
                s.last_answer_correct,
            ],
        )?;
        if updated == 0 {
            return Err(CoreError::item_not_found(&outcome.item_id));
        }

        write_log(&tx, &key, &outcome.log)?;
        write_state(
            &tx,
            &key,
            total_points + u64::from(outcome.score.total),
            &outcome.daily_streak,
        )?;
        tx.commit()?;
        Ok(())
    }

    /// Replace everything under the collection's namespace with its contents.
    pub fn replace_collection(&mut self, collection: &Collection) -> Result<()> {
        let key = collection.namespace.key();
        let tx = self.conn.transaction()?;
        clear_namespace(&tx, &key)?;
        for item in &collection.items {
            write_item(&tx, &key, item)?;
        }
        for log in &collection.answer_logs {
            write_log(&tx, &key, log)?;
        }
        write_state(&tx, &key, collection.total_points, &collection.streak)?;
        tx.commit()?;
        tracing::info!(namespace = %key, items = collection.items.len(), "collection replaced");
        Ok(())
    }

    /// Remove everything stored under `namespace`.
    pub fn reset(&mut self, namespace: &Namespace) -> Result<()> {
        let key = namespace.key();
        let tx = self.conn.transaction()?;
        clear_namespace(&tx, &key)?;
        tx.commit()?;
        tracing::info!(namespace = %key, "namespace reset");
        Ok(())
    }

    /// The namespace's collection as pretty JSON.
    pub fn export_json(&self, namespace: &Namespace) -> Result<String> {
        Ok(serde_json::to_string_pretty(&self.load_collection(namespace)?)?)
    }

    /// Replace `namespace` with a collection read from JSON. The namespace
    /// recorded in the JSON is ignored.
    pub fn import_json(&mut self, namespace: &Namespace, json: &str) -> Result<Collection> {
        let mut collection: Collection = serde_json::from_str(json)?;
        collection.namespace = namespace.clone();
        self.replace_collection(&collection)?;
        Ok(collection)
    }
}

fn clear_namespace(tx: &Transaction<'_>, key: &str) -> Result<()> {
    tx.execute("DELETE FROM answer_logs WHERE namespace = ?1", params![key])?;
    tx.execute("DELETE FROM items WHERE namespace = ?1", params![key])?;
    tx.execute("DELETE FROM collection_state WHERE namespace = ?1", params![key])?;
    Ok(())
}

fn write_item(conn: &Connection, key: &str, item: &KnowledgeItem) -> Result<()> {
    conn.execute(
        &format!(
            "INSERT OR REPLACE INTO items (namespace, {ITEM_COLUMNS})
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17)"
        ),
        params![
            key,
            item.id,
            item.title,
            item.content,
            serde_json::to_string(&item.tags)?,
            item.difficulty,
            item.source,
            item.created_at,
            item.introduced_at,
            serde_json::to_string(&item.question_variants)?,
            item.next_ask_at,
            item.interval_days,
            item.times_asked,
            item.times_correct,
            item.current_streak,
            item.last_answered_at,
            item.last_answer_correct,
        ],
    )?;
    Ok(())
}

fn write_log(conn: &Connection, key: &str, log: &AnswerLog) -> Result<()> {
    conn.execute(
        "INSERT INTO answer_logs
             (namespace, id, item_id, variant_id, answered_at, mode, user_answer, is_correct, points_awarded)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)",
        params![
            key,
            log.id,
            log.item_id,
            log.variant_id,
            log.answered_at,
            log.mode.as_str(),
            log.user_answer,
            log.is_correct,
            log.points_awarded,
        ],
    )?;
    Ok(())
}

fn write_state(conn: &Connection, key: &str, total_points: u64, streak: &DailyStreakState) -> Result<()> {
    conn.execute(
        "INSERT OR REPLACE INTO collection_state
             (namespace, total_points, daily_practice_streak, last_practice_date)
         VALUES (?1, ?2, ?3, ?4)",
        params![
            key,
            i64::try_from(total_points).unwrap_or(i64::MAX),
            streak.daily_practice_streak,
            streak.last_practice_date,
        ],
    )?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::grading::Response;
    use crate::item::{Flashcard, ItemDraft, MILLIS_PER_DAY};
    use crate::review::{record_answer, AnswerSubmission};
    use crate::streak::parse_day;

    const NOW: i64 = 1_700_000_000_000;

    fn item(title: &str) -> KnowledgeItem {
        let mut item = KnowledgeItem::new(
            ItemDraft {
                title: title.into(),
                content: format!("{title} explained in one sentence."),
                tags: vec!["rust".into(), "basics".into()],
                difficulty: 2,
                source: None,
            },
            NOW - MILLIS_PER_DAY,
        )
        .unwrap();
        item.question_variants = vec![QuestionVariant::Flashcard(Flashcard {
            id: format!("{title}-f"),
            front: format!("What is {title}?"),
            back: "answer".into(),
        })];
        item
    }

    #[test]
    fn save_and_load_item() {
        let db = Database::open_memory().unwrap();
        let ns = Namespace::Personal;
        let original = item("Traits");
        db.save_item(&ns, &original).unwrap();

        let loaded = db.item(&ns, &original.id).unwrap();
        assert_eq!(loaded, original);
        assert_eq!(db.item_count(&ns).unwrap(), 1);
        assert!(matches!(
            db.item(&ns, "missing"),
            Err(CoreError::NotFound { .. })
        ));
    }

    #[test]
    fn namespaces_are_isolated() {
        let db = Database::open_memory().unwrap();
        let personal = Namespace::Personal;
        let family = Namespace::Family("home".into());
        db.save_item(&personal, &item("Mine")).unwrap();
        db.save_item(&family, &item("Shared")).unwrap();
        db.save_item(&family, &item("Shared too")).unwrap();

        assert_eq!(db.load_collection(&personal).unwrap().items.len(), 1);
        let fam = db.load_collection(&family).unwrap();
        assert_eq!(fam.items.len(), 2);
        assert_eq!(fam.namespace, family);
    }

    #[test]
    fn apply_outcome_persists_everything() {
        let mut db = Database::open_memory().unwrap();
        let ns = Namespace::Personal;
        let it = item("Enums");
        db.save_item(&ns, &it).unwrap();

        let before = db.load_collection(&ns).unwrap();
        let submission =
            AnswerSubmission::graded(&it.question_variants[0], &Response::SelfMarked(true));
        let outcome = record_answer(&it, submission, &before.streak, NOW, parse_day("2023-11-14").unwrap());
        db.apply_outcome(&ns, &outcome).unwrap();

        let after = db.load_collection(&ns).unwrap();
        assert_eq!(after.total_points, 8);
        assert_eq!(after.streak.daily_practice_streak, 1);
        assert_eq!(after.streak.last_practice_date.as_deref(), Some("2023-11-14"));
        assert_eq!(after.answer_logs, vec![outcome.log.clone()]);
        let stored = &after.items[0];
        assert_eq!(stored.times_asked, 1);
        assert_eq!(stored.interval_days, 2);
        assert_eq!(stored.last_answer_correct, Some(true));

        // Same result as merging in memory.
        let mut expected = before;
        expected.apply_outcome(outcome).unwrap();
        assert_eq!(after, expected);
    }

    #[test]
    fn apply_outcome_for_missing_item_changes_nothing() {
        let mut db = Database::open_memory().unwrap();
        let ns = Namespace::Personal;
        let it = item("Ghost");
        let outcome = record_answer(
            &it,
            AnswerSubmission::skipped(&it.question_variants[0]),
            &DailyStreakState::default(),
            NOW,
            parse_day("2023-11-14").unwrap(),
        );
        assert!(db.apply_outcome(&ns, &outcome).is_err());
        let c = db.load_collection(&ns).unwrap();
        assert!(c.answer_logs.is_empty());
        assert_eq!(c.streak, DailyStreakState::default());
    }

    #[test]
    fn delete_cascades_logs() {
        let mut db = Database::open_memory().unwrap();
        let ns = Namespace::Personal;
        let keep = item("Keep");
        let drop = item("Drop");
        db.save_item(&ns, &keep).unwrap();
        db.save_item(&ns, &drop).unwrap();
        for target in [&keep, &drop] {
            let outcome = record_answer(
                target,
                AnswerSubmission::skipped(&target.question_variants[0]),
                &DailyStreakState::default(),
                NOW,
                parse_day("2023-11-14").unwrap(),
            );
            db.apply_outcome(&ns, &outcome).unwrap();
        }

        db.delete_item(&ns, &drop.id).unwrap();
        let c = db.load_collection(&ns).unwrap();
        assert_eq!(c.items.len(), 1);
        assert_eq!(c.answer_logs.len(), 1);
        assert_eq!(c.answer_logs[0].item_id, keep.id);
        assert!(db.delete_item(&ns, &drop.id).is_err());
    }

    #[test]
    fn export_import_and_reset() {
        let mut db = Database::open_memory().unwrap();
        let ns = Namespace::Personal;
        db.save_item(&ns, &item("Slices")).unwrap();
        db.save_state(
            &ns,
            120,
            &DailyStreakState {
                daily_practice_streak: 3,
                last_practice_date: Some("2024-01-01".into()),
            },
        )
        .unwrap();

        let json = db.export_json(&ns).unwrap();
        let family = Namespace::Family("f".into());
        let imported = db.import_json(&family, &json).unwrap();
        assert_eq!(imported.namespace, family);
        assert_eq!(db.load_collection(&family).unwrap().total_points, 120);

        db.reset(&ns).unwrap();
        let empty = db.load_collection(&ns).unwrap();
        assert!(empty.items.is_empty());
        assert_eq!(empty.total_points, 0);
        assert_eq!(db.load_collection(&family).unwrap().items.len(), 1);
    }

    #[test]
    fn open_at_creates_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("memolil.db");
        {
            let db = Database::open_at(&path).unwrap();
            db.save_item(&Namespace::Personal, &item("Persisted")).unwrap();
        }
        let db = Database::open_at(&path).unwrap();
        assert_eq!(db.item_count(&Namespace::Personal).unwrap(), 1);
    }
}
