use chrono::Utc;
use rusqlite::{Connection, Row, params};
use tracing::debug;

use crate::error::{Result, TaskflowError};
use crate::model::{Tag, normalize_title};
use crate::store::db::{Db, new_id, parse_ts, ts};

pub const PRESET_COLORS: [&str; 8] = [
    "#ef4444", "#f97316", "#eab308", "#22c55e", "#3b82f6", "#8b5cf6", "#ec4899", "#6b7280",
];

const TAG_COLUMNS: &str = "g.id, g.name, g.color, g.created_at";

fn tag_from_row(row: &Row<'_>) -> rusqlite::Result<Tag> {
    Ok(Tag {
        id: row.get(0)?,
        name: row.get(1)?,
        color: row.get(2)?,
        created_at: parse_ts(3, &row.get::<_, String>(3)?)?,
    })
}

/// Validate and lowercase a `#rrggbb` color.
pub fn normalize_color(raw: &str) -> Result<String> {
    let trimmed = raw.trim();
    let valid = trimmed.len() == 7
        && trimmed.starts_with('#')
        && trimmed[1..].bytes().all(|b| b.is_ascii_hexdigit());
    if valid {
        Ok(trimmed.to_ascii_lowercase())
    } else {
        Err(TaskflowError::InvalidColor(raw.to_string()))
    }
}

pub(crate) fn load_tag(conn: &Connection, user: &str, id: &str) -> Result<Tag> {
    let sql = format!("SELECT {TAG_COLUMNS} FROM tags g WHERE g.id = ?1 AND g.user_id = ?2");
    match conn.query_row(&sql, params![id, user], tag_from_row) {
        Ok(tag) => Ok(tag),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(TaskflowError::TagNotFound(id.to_string())),
        Err(e) => Err(e.into()),
    }
}

pub(crate) fn load_task_tags(conn: &Connection, task_id: &str) -> Result<Vec<Tag>> {
    let sql = format!(
        "SELECT {TAG_COLUMNS} FROM task_tags tt
         JOIN tags g ON g.id = tt.tag_id
         WHERE tt.task_id = ?1
         ORDER BY g.name COLLATE NOCASE"
    );
    let mut stmt = conn.prepare(&sql)?;
    let tags = stmt
        .query_map(params![task_id], tag_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    Ok(tags)
}

impl Db {
    pub fn create_tag(&self, user: &str, name: &str, color: Option<&str>) -> Result<Tag> {
        let name = normalize_title(name).ok_or(TaskflowError::EmptyTitle)?;
        let color = normalize_color(color.unwrap_or(PRESET_COLORS[0]))?;

        let tx = self.write_tx()?;
        let exists: bool = tx.query_row(
            "SELECT EXISTS(SELECT 1 FROM tags WHERE user_id = ?1 AND name = ?2 COLLATE NOCASE)",
            params![user, name],
            |row| row.get(0),
        )?;
        if exists {
            return Err(TaskflowError::TagExists(name));
        }
        let tag = Tag {
            id: new_id(),
            name,
            color,
            created_at: Utc::now(),
        };
        tx.execute(
            "INSERT INTO tags (id, user_id, name, color, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
            params![tag.id, user, tag.name, tag.color, ts(tag.created_at)],
        )?;
        tx.commit()?;
        debug!(tag = %tag.id, name = %tag.name, "created tag");
        Ok(tag)
    }

    pub fn tags(&self, user: &str) -> Result<Vec<Tag>> {
        let sql = format!(
            "SELECT {TAG_COLUMNS} FROM tags g WHERE g.user_id = ?1 ORDER BY g.name COLLATE NOCASE"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let tags = stmt
            .query_map(params![user], tag_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tags)
    }

    pub fn tag(&self, user: &str, id: &str) -> Result<Tag> {
        load_tag(self.conn(), user, id)
    }

    /// Look a tag up by exact (case-insensitive) name.
    pub fn tag_by_name(&self, user: &str, name: &str) -> Result<Option<Tag>> {
        let sql = format!(
            "SELECT {TAG_COLUMNS} FROM tags g WHERE g.user_id = ?1 AND g.name = ?2 COLLATE NOCASE"
        );
        match self
            .conn()
            .query_row(&sql, params![user, name.trim()], tag_from_row)
        {
            Ok(tag) => Ok(Some(tag)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    /// Delete a tag; its task associations go with it.
    pub fn delete_tag(&self, user: &str, id: &str) -> Result<Tag> {
        let tx = self.write_tx()?;
        let tag = load_tag(&tx, user, id)?;
        tx.execute("DELETE FROM tags WHERE id = ?1", params![tag.id])?;
        tx.commit()?;
        Ok(tag)
    }

    pub fn tag_ids(&self, user: &str) -> Result<Vec<String>> {
        self.ids_in("tags", user)
    }
}
