use std::path::Path;
use std::time::Duration;

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, Utc};
use rusqlite::types::Type;
use rusqlite::{Connection, Transaction, TransactionBehavior, params};
use tracing::debug;

use crate::error::Result;

const SCHEMA_VERSION: &str = "1";

/// SQLite-backed store for stacks, tasks, tags and events.
///
/// Every query is scoped by `user_id`; rows owned by another user are
/// indistinguishable from missing rows.
pub struct Db {
    conn: Connection,
    auto_archive: bool,
}

impl Db {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.busy_timeout(Duration::from_secs(5))?;
        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
        let db = Self {
            conn,
            auto_archive: true,
        };
        db.create_tables()?;
        debug!(path = %path.display(), "opened database");
        Ok(db)
    }

    pub fn open_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        let db = Self {
            conn,
            auto_archive: true,
        };
        db.create_tables()?;
        Ok(db)
    }

    /// Toggle the archive-when-all-tasks-complete rule.
    pub fn with_auto_archive(mut self, enabled: bool) -> Self {
        self.auto_archive = enabled;
        self
    }

    pub fn auto_archive(&self) -> bool {
        self.auto_archive
    }

    fn create_tables(&self) -> Result<()> {
        self.conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS stacks (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                created_at TEXT NOT NULL,
                completed_at TEXT,
                archived_at TEXT
            );
            CREATE TABLE IF NOT EXISTS tasks (
                id TEXT PRIMARY KEY,
                stack_id TEXT NOT NULL REFERENCES stacks(id) ON DELETE CASCADE,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                category TEXT,
                priority TEXT,
                due_date TEXT,
                position INTEGER NOT NULL DEFAULT 0,
                created_at TEXT NOT NULL,
                completed_at TEXT
            );
            CREATE TABLE IF NOT EXISTS tags (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                name TEXT NOT NULL,
                color TEXT NOT NULL,
                created_at TEXT NOT NULL
            );
            CREATE TABLE IF NOT EXISTS task_tags (
                task_id TEXT NOT NULL REFERENCES tasks(id) ON DELETE CASCADE,
                tag_id TEXT NOT NULL REFERENCES tags(id) ON DELETE CASCADE,
                PRIMARY KEY (task_id, tag_id)
            );
            CREATE TABLE IF NOT EXISTS events (
                id TEXT PRIMARY KEY,
                user_id TEXT NOT NULL,
                title TEXT NOT NULL,
                description TEXT,
                date TEXT NOT NULL,
                time TEXT,
                kind TEXT NOT NULL DEFAULT 'task',
                created_at TEXT NOT NULL,
                completed_at TEXT
            );
            CREATE INDEX IF NOT EXISTS idx_stacks_user ON stacks(user_id, archived_at);
            CREATE INDEX IF NOT EXISTS idx_tasks_stack ON tasks(stack_id, position);
            CREATE INDEX IF NOT EXISTS idx_tasks_user ON tasks(user_id);
            CREATE UNIQUE INDEX IF NOT EXISTS idx_tags_user_name ON tags(user_id, name COLLATE NOCASE);
            CREATE INDEX IF NOT EXISTS idx_events_user_date ON events(user_id, date);
            CREATE TABLE IF NOT EXISTS metadata (
                key TEXT PRIMARY KEY,
                value TEXT NOT NULL
            );",
        )?;
        self.conn.execute(
            "INSERT OR IGNORE INTO metadata (key, value) VALUES ('schema_version', ?1)",
            params![SCHEMA_VERSION],
        )?;
        Ok(())
    }

    pub fn schema_version(&self) -> Result<Option<String>> {
        let mut stmt = self
            .conn
            .prepare("SELECT value FROM metadata WHERE key = 'schema_version'")?;
        match stmt.query_row([], |row| row.get::<_, String>(0)) {
            Ok(v) => Ok(Some(v)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Start a write transaction that takes the database write lock up front,
    /// so read-then-write sequences inside it cannot interleave with another
    /// writer.
    pub(crate) fn write_tx(&self) -> Result<Transaction<'_>> {
        Ok(Transaction::new_unchecked(
            &self.conn,
            TransactionBehavior::Immediate,
        )?)
    }

    pub(crate) fn conn(&self) -> &Connection {
        &self.conn
    }

    /// Collect the ids in `table` owned by `user`, for prefix resolution.
    pub(crate) fn ids_in(&self, table: &str, user: &str) -> Result<Vec<String>> {
        let sql = format!("SELECT id FROM {table} WHERE user_id = ?1 ORDER BY id");
        let mut stmt = self.conn.prepare(&sql)?;
        let ids = stmt
            .query_map(params![user], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(ids)
    }
}

pub(crate) fn new_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()
}

pub(crate) fn ts(value: DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::Micros, true)
}

pub(crate) fn opt_ts(value: Option<DateTime<Utc>>) -> Option<String> {
    value.map(ts)
}

pub(crate) fn date_str(value: NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}

pub(crate) fn time_str(value: NaiveTime) -> String {
    value.format("%H:%M").to_string()
}

fn conversion_error(
    idx: usize,
    err: impl std::error::Error + Send + Sync + 'static,
) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(err))
}

pub(crate) fn parse_ts(idx: usize, raw: &str) -> rusqlite::Result<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(raw)
        .map(|d| d.with_timezone(&Utc))
        .map_err(|e| conversion_error(idx, e))
}

pub(crate) fn parse_opt_ts(idx: usize, raw: Option<String>) -> rusqlite::Result<Option<DateTime<Utc>>> {
    raw.as_deref().map(|r| parse_ts(idx, r)).transpose()
}

pub(crate) fn parse_date(idx: usize, raw: &str) -> rusqlite::Result<NaiveDate> {
    NaiveDate::parse_from_str(raw, "%Y-%m-%d").map_err(|e| conversion_error(idx, e))
}

pub(crate) fn parse_time(idx: usize, raw: &str) -> rusqlite::Result<NaiveTime> {
    NaiveTime::parse_from_str(raw, "%H:%M").map_err(|e| conversion_error(idx, e))
}

/// Parse an enum column through its `FromStr` impl.
pub(crate) fn parse_enum<T>(idx: usize, raw: &str) -> rusqlite::Result<T>
where
    T: std::str::FromStr<Err = String>,
{
    raw.parse::<T>().map_err(|msg| {
        rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, msg.into())
    })
}
