//! Database schema migrations for memolil.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Returns 0 if no version is set (initial database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// Migration v1: items, answer log and per-namespace state.
///
/// Every table is keyed by `namespace` so personal and family collections
/// share one file.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    let tx = conn.unchecked_transaction()?;

    tx.execute_batch(
        "CREATE TABLE IF NOT EXISTS items (
            namespace           TEXT NOT NULL,
            id                  TEXT NOT NULL,
            title               TEXT NOT NULL,
            content             TEXT NOT NULL,
            tags                TEXT NOT NULL DEFAULT '[]',
            difficulty          INTEGER NOT NULL,
            source              TEXT NOT NULL DEFAULT 'typed',
            created_at          INTEGER NOT NULL,
            introduced_at       INTEGER NOT NULL,
            question_variants   TEXT NOT NULL DEFAULT '[]',
            next_ask_at         INTEGER NOT NULL,
            interval_days       INTEGER NOT NULL,
            times_asked         INTEGER NOT NULL DEFAULT 0,
            times_correct       INTEGER NOT NULL DEFAULT 0,
            current_streak      INTEGER NOT NULL DEFAULT 0,
            last_answered_at    INTEGER,
            last_answer_correct INTEGER,
            PRIMARY KEY (namespace, id)
        );

        CREATE TABLE IF NOT EXISTS answer_logs (
            namespace      TEXT NOT NULL,
            id             TEXT NOT NULL,
            item_id        TEXT NOT NULL,
            variant_id     TEXT NOT NULL,
            answered_at    INTEGER NOT NULL,
            mode           TEXT NOT NULL,
            user_answer    TEXT NOT NULL DEFAULT '',
            is_correct     INTEGER NOT NULL,
            points_awarded INTEGER NOT NULL DEFAULT 0,
            PRIMARY KEY (namespace, id)
        );

        CREATE TABLE IF NOT EXISTS collection_state (
            namespace             TEXT PRIMARY KEY,
            total_points          INTEGER NOT NULL DEFAULT 0,
            daily_practice_streak INTEGER NOT NULL DEFAULT 0,
            last_practice_date    TEXT
        );

        CREATE INDEX IF NOT EXISTS idx_items_next_ask_at ON items(namespace, next_ask_at);
        CREATE INDEX IF NOT EXISTS idx_answer_logs_item ON answer_logs(namespace, item_id);
        CREATE INDEX IF NOT EXISTS idx_answer_logs_answered_at ON answer_logs(namespace, answered_at);",
    )?;

    set_schema_version(&tx, 1)?;
    tx.commit()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_migrate_from_scratch() {
        let conn = Connection::open_in_memory().unwrap();
        assert_eq!(get_schema_version(&conn), 0);

        migrate(&conn).unwrap();
        assert_eq!(get_schema_version(&conn), SCHEMA_VERSION);

        for table in ["items", "answer_logs", "collection_state"] {
            let count: i32 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table {table}");
        }
    }

    #[test]
    fn test_migrate_is_idempotent() {
        let conn = Connection::open_in_memory().unwrap();
        migrate(&conn).unwrap();
        conn.execute(
            "INSERT INTO collection_state (namespace, total_points) VALUES ('memolil:v1', 42)",
            [],
        )
        .unwrap();

        migrate(&conn).unwrap();

        let points: i64 = conn
            .query_row("SELECT total_points FROM collection_state", [], |row| row.get(0))
            .unwrap();
        assert_eq!(points, 42);
        assert_eq!(get_schema_version(&conn), 1);
    }
}
