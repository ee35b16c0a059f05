use chrono::{DateTime, Utc};
use rusqlite::{Connection, Row, params};
use serde::Serialize;
use tracing::{debug, info};

use crate::error::{Result, TaskflowError};
use crate::model::{Stack, StackState, StackView, normalize_title};
use crate::store::db::{Db, new_id, parse_opt_ts, parse_ts, ts};
use crate::store::tasks::load_stack_tasks;

pub(crate) const STACK_COLUMNS: &str =
    "id, user_id, title, created_at, completed_at, archived_at";

pub(crate) fn stack_from_row(row: &Row<'_>) -> rusqlite::Result<Stack> {
    Ok(Stack {
        id: row.get(0)?,
        user_id: row.get(1)?,
        title: row.get(2)?,
        created_at: parse_ts(3, &row.get::<_, String>(3)?)?,
        completed_at: parse_opt_ts(4, row.get(4)?)?,
        archived_at: parse_opt_ts(5, row.get(5)?)?,
    })
}

/// One page of archived stacks, newest first.
#[derive(Debug, Clone, Serialize)]
pub struct HistoryPage {
    pub total: usize,
    pub page: usize,
    pub page_size: usize,
    pub stacks: Vec<StackView>,
}

fn transition(current: StackState, target: StackState) -> std::result::Result<(), (String, String)> {
    let allowed = match current {
        StackState::Active => matches!(target, StackState::Archived),
        StackState::Archived | StackState::Completed => matches!(target, StackState::Active),
    };
    if allowed {
        Ok(())
    } else {
        Err((current.to_string(), target.to_string()))
    }
}

pub(crate) fn load_stack(conn: &Connection, user: &str, id: &str) -> Result<Stack> {
    let sql = format!("SELECT {STACK_COLUMNS} FROM stacks WHERE id = ?1 AND user_id = ?2");
    match conn.query_row(&sql, params![id, user], stack_from_row) {
        Ok(stack) => Ok(stack),
        Err(rusqlite::Error::QueryReturnedNoRows) => Err(TaskflowError::StackNotFound(id.to_string())),
        Err(e) => Err(e.into()),
    }
}

/// Load a stack that task mutations are about to touch, refusing archived ones.
pub(crate) fn load_open_stack(conn: &Connection, user: &str, id: &str) -> Result<Stack> {
    let stack = load_stack(conn, user, id)?;
    if stack.is_archived() {
        return Err(TaskflowError::StackArchived(id.to_string()));
    }
    Ok(stack)
}

/// Apply the auto-archive rule to `stack_id`.
///
/// Must run inside the same write transaction as the mutation that may have
/// completed the stack. Returns true when this call archived the stack.
pub(crate) fn settle_stack(
    conn: &Connection,
    stack_id: &str,
    now: DateTime<Utc>,
    auto_archive: bool,
) -> Result<bool> {
    if !auto_archive {
        return Ok(false);
    }
    let (total, completed): (i64, i64) = conn.query_row(
        "SELECT COUNT(*), COUNT(completed_at) FROM tasks WHERE stack_id = ?1",
        params![stack_id],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;
    if total == 0 || total != completed {
        return Ok(false);
    }
    let stamp = ts(now);
    let changed = conn.execute(
        "UPDATE stacks SET completed_at = ?2, archived_at = ?2
         WHERE id = ?1 AND archived_at IS NULL",
        params![stack_id, stamp],
    )?;
    if changed == 1 {
        info!(stack = stack_id, tasks = total, "all tasks complete; stack archived");
    }
    Ok(changed == 1)
}

impl Db {
    pub fn create_stack(&self, user: &str, title: &str) -> Result<Stack> {
        let title = normalize_title(title).ok_or(TaskflowError::EmptyTitle)?;
        let stack = Stack {
            id: new_id(),
            user_id: user.to_string(),
            title,
            created_at: Utc::now(),
            completed_at: None,
            archived_at: None,
        };
        self.conn().execute(
            "INSERT INTO stacks (id, user_id, title, created_at, completed_at, archived_at)
             VALUES (?1, ?2, ?3, ?4, NULL, NULL)",
            params![stack.id, stack.user_id, stack.title, ts(stack.created_at)],
        )?;
        debug!(stack = %stack.id, "created stack");
        Ok(stack)
    }

    pub fn stack(&self, user: &str, id: &str) -> Result<Stack> {
        load_stack(self.conn(), user, id)
    }

    pub fn stack_view(&self, user: &str, id: &str) -> Result<StackView> {
        let stack = load_stack(self.conn(), user, id)?;
        let tasks = load_stack_tasks(self.conn(), user, &stack.id)?;
        Ok(StackView::new(stack, tasks))
    }

    /// Stacks with their ordered tasks. Archived stacks are skipped unless
    /// `include_archived` is set.
    pub fn stacks(&self, user: &str, include_archived: bool) -> Result<Vec<StackView>> {
        let filter = if include_archived {
            ""
        } else {
            "AND archived_at IS NULL"
        };
        let sql = format!(
            "SELECT {STACK_COLUMNS} FROM stacks WHERE user_id = ?1 {filter}
             ORDER BY created_at, rowid"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let stacks = stmt
            .query_map(params![user], stack_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        stacks
            .into_iter()
            .map(|stack| {
                let tasks = load_stack_tasks(self.conn(), user, &stack.id)?;
                Ok(StackView::new(stack, tasks))
            })
            .collect()
    }

    pub fn rename_stack(&self, user: &str, id: &str, title: &str) -> Result<Stack> {
        let title = normalize_title(title).ok_or(TaskflowError::EmptyTitle)?;
        let mut stack = load_stack(self.conn(), user, id)?;
        self.conn().execute(
            "UPDATE stacks SET title = ?1 WHERE id = ?2",
            params![title, stack.id],
        )?;
        stack.title = title;
        Ok(stack)
    }

    pub fn archive_stack(&self, user: &str, id: &str) -> Result<Stack> {
        let tx = self.write_tx()?;
        let mut stack = load_stack(&tx, user, id)?;
        transition(stack.state(), StackState::Archived)
            .map_err(|(from, to)| TaskflowError::InvalidTransition(from, to))?;
        let now = Utc::now();
        tx.execute(
            "UPDATE stacks SET archived_at = ?1 WHERE id = ?2",
            params![ts(now), stack.id],
        )?;
        tx.commit()?;
        stack.archived_at = Some(now);
        info!(stack = %stack.id, "stack archived");
        Ok(stack)
    }

    pub fn restore_stack(&self, user: &str, id: &str) -> Result<Stack> {
        let tx = self.write_tx()?;
        let mut stack = load_stack(&tx, user, id)?;
        transition(stack.state(), StackState::Active)
            .map_err(|(from, to)| TaskflowError::InvalidTransition(from, to))?;
        tx.execute(
            "UPDATE stacks SET archived_at = NULL, completed_at = NULL WHERE id = ?1",
            params![stack.id],
        )?;
        tx.commit()?;
        stack.archived_at = None;
        stack.completed_at = None;
        info!(stack = %stack.id, "stack restored");
        Ok(stack)
    }

    /// Delete a stack and, through the foreign-key cascade, its tasks.
    pub fn delete_stack(&self, user: &str, id: &str) -> Result<StackView> {
        let tx = self.write_tx()?;
        let stack = load_stack(&tx, user, id)?;
        let tasks = load_stack_tasks(&tx, user, &stack.id)?;
        tx.execute("DELETE FROM stacks WHERE id = ?1", params![stack.id])?;
        tx.commit()?;
        debug!(stack = %stack.id, tasks = tasks.len(), "deleted stack");
        Ok(StackView::new(stack, tasks))
    }

    /// Archived and completed stacks, most recently closed first. `page` is
    /// 1-based.
    pub fn stack_history(&self, user: &str, page: usize, page_size: usize) -> Result<HistoryPage> {
        let page = page.max(1);
        let page_size = page_size.max(1);
        let total: i64 = self.conn().query_row(
            "SELECT COUNT(*) FROM stacks WHERE user_id = ?1 AND archived_at IS NOT NULL",
            params![user],
            |row| row.get(0),
        )?;
        let sql = format!(
            "SELECT {STACK_COLUMNS} FROM stacks
             WHERE user_id = ?1 AND archived_at IS NOT NULL
             ORDER BY COALESCE(completed_at, archived_at) DESC, rowid DESC
             LIMIT ?2 OFFSET ?3"
        );
        let offset = (page - 1) * page_size;
        let mut stmt = self.conn().prepare(&sql)?;
        let stacks = stmt
            .query_map(params![user, page_size as i64, offset as i64], stack_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        let stacks = stacks
            .into_iter()
            .map(|stack| {
                let tasks = load_stack_tasks(self.conn(), user, &stack.id)?;
                Ok(StackView::new(stack, tasks))
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(HistoryPage {
            total: total as usize,
            page,
            page_size,
            stacks,
        })
    }

    pub fn stack_ids(&self, user: &str) -> Result<Vec<String>> {
        self.ids_in("stacks", user)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::tasks::NewTask;

    fn db() -> Db {
        Db::open_memory().unwrap()
    }

    #[test]
    fn create_rejects_blank_title() {
        let db = db();
        let err = db.create_stack("alice", "   ").unwrap_err();
        assert!(matches!(err, TaskflowError::EmptyTitle));
    }

    #[test]
    fn stacks_are_scoped_to_owner() {
        let db = db();
        let stack = db.create_stack("alice", "Groceries").unwrap();
        assert!(matches!(
            db.stack("bob", &stack.id),
            Err(TaskflowError::StackNotFound(_))
        ));
        assert!(db.stacks("bob", true).unwrap().is_empty());
        assert_eq!(db.stacks("alice", false).unwrap().len(), 1);
    }

    #[test]
    fn manual_transitions_never_complete_a_stack() {
        assert!(transition(StackState::Active, StackState::Archived).is_ok());
        assert!(transition(StackState::Archived, StackState::Active).is_ok());
        assert!(transition(StackState::Completed, StackState::Active).is_ok());
        assert_eq!(
            transition(StackState::Active, StackState::Completed),
            Err(("active".to_string(), "completed".to_string()))
        );
        assert!(transition(StackState::Completed, StackState::Archived).is_err());
    }

    #[test]
    fn archive_then_restore_round_trip() {
        let db = db();
        let stack = db.create_stack("alice", "Trip").unwrap();

        let archived = db.archive_stack("alice", &stack.id).unwrap();
        assert_eq!(archived.state(), StackState::Archived);
        assert!(db.stacks("alice", false).unwrap().is_empty());
        assert_eq!(db.stacks("alice", true).unwrap().len(), 1);

        let err = db.archive_stack("alice", &stack.id).unwrap_err();
        assert!(matches!(err, TaskflowError::InvalidTransition(_, _)));

        let restored = db.restore_stack("alice", &stack.id).unwrap();
        assert_eq!(restored.state(), StackState::Active);
        assert!(restored.completed_at.is_none());

        let err = db.restore_stack("alice", &stack.id).unwrap_err();
        assert!(matches!(err, TaskflowError::InvalidTransition(ref f, ref t) if f == "active" && t == "active"));
    }

    #[test]
    fn delete_cascades_to_tasks() {
        let db = db();
        let stack = db.create_stack("alice", "Chores").unwrap();
        db.add_task("alice", &stack.id, NewTask::titled("Dishes")).unwrap();
        db.add_task("alice", &stack.id, NewTask::titled("Laundry")).unwrap();

        let removed = db.delete_stack("alice", &stack.id).unwrap();
        assert_eq!(removed.tasks.len(), 2);
        let remaining: i64 = db
            .conn()
            .query_row("SELECT COUNT(*) FROM tasks", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining, 0);
    }

    #[test]
    fn history_pages_newest_first() {
        let db = db();
        let mut ids = Vec::new();
        for i in 0..3 {
            let s = db.create_stack("alice", &format!("Stack {i}")).unwrap();
            db.archive_stack("alice", &s.id).unwrap();
            ids.push(s.id);
        }
        db.create_stack("alice", "Still active").unwrap();

        let first = db.stack_history("alice", 1, 2).unwrap();
        assert_eq!(first.total, 3);
        assert_eq!(first.stacks.len(), 2);
        assert_eq!(first.stacks[0].stack.id, ids[2]);

        let second = db.stack_history("alice", 2, 2).unwrap();
        assert_eq!(second.stacks.len(), 1);
        assert_eq!(second.stacks[0].stack.id, ids[0]);
    }
}
