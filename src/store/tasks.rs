use chrono::{NaiveDate, Utc};
use rusqlite::{Connection, Row, params};
use serde::Serialize;
use tracing::debug;

use crate::error::{Result, TaskflowError};
use crate::model::{Priority, Task, normalize_text, normalize_title};
use crate::store::db::{
    Db, date_str, new_id, opt_ts, parse_date, parse_enum, parse_opt_ts, parse_ts, ts,
};
use crate::store::stacks::{load_open_stack, settle_stack};
use crate::store::tags::{load_tag, load_task_tags};

pub(crate) const TASK_COLUMNS: &str = "t.id, t.stack_id, t.title, t.description, t.category, \
     t.priority, t.due_date, t.position, t.created_at, t.completed_at";

pub(crate) fn task_from_row(row: &Row<'_>) -> rusqlite::Result<Task> {
    let priority: Option<String> = row.get(5)?;
    let due: Option<String> = row.get(6)?;
    Ok(Task {
        id: row.get(0)?,
        stack_id: row.get(1)?,
        title: row.get(2)?,
        description: row.get(3)?,
        category: row.get(4)?,
        priority: priority.as_deref().map(|p| parse_enum(5, p)).transpose()?,
        due_date: due.as_deref().map(|d| parse_date(6, d)).transpose()?,
        position: row.get(7)?,
        created_at: parse_ts(8, &row.get::<_, String>(8)?)?,
        completed_at: parse_opt_ts(9, row.get(9)?)?,
        tags: Vec::new(),
    })
}

/// Fields for a new task.
#[derive(Debug, Clone, Default)]
pub struct NewTask {
    pub title: String,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub due_date: Option<NaiveDate>,
}

impl NewTask {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Partial update for a task. Blank `description`/`category` clear the field.
#[derive(Debug, Clone, Default)]
pub struct TaskPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub category: Option<String>,
    pub priority: Option<Priority>,
    pub clear_priority: bool,
    pub due_date: Option<NaiveDate>,
    pub clear_due: bool,
}

/// Result of a task mutation, listing any stacks the change archived.
#[derive(Debug, Clone, Serialize)]
pub struct TaskChange {
    pub task: Task,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub archived_stacks: Vec<String>,
}

impl TaskChange {
    pub fn stack_archived(&self) -> bool {
        !self.archived_stacks.is_empty()
    }
}

/// A search result: the task plus the title of the stack it lives in.
#[derive(Debug, Clone, Serialize)]
pub struct SearchHit {
    #[serde(flatten)]
    pub task: Task,
    pub stack_title: String,
}

pub(crate) fn load_task(conn: &Connection, user: &str, id: &str) -> Result<Task> {
    let sql = format!("SELECT {TASK_COLUMNS} FROM tasks t WHERE t.id = ?1 AND t.user_id = ?2");
    let mut task = match conn.query_row(&sql, params![id, user], task_from_row) {
        Ok(task) => task,
        Err(rusqlite::Error::QueryReturnedNoRows) => {
            return Err(TaskflowError::TaskNotFound(id.to_string()));
        }
        Err(e) => return Err(e.into()),
    };
    task.tags = load_task_tags(conn, &task.id)?;
    Ok(task)
}

pub(crate) fn load_stack_tasks(conn: &Connection, user: &str, stack_id: &str) -> Result<Vec<Task>> {
    let sql = format!(
        "SELECT {TASK_COLUMNS} FROM tasks t
         WHERE t.stack_id = ?1 AND t.user_id = ?2
         ORDER BY t.position, t.rowid"
    );
    let mut stmt = conn.prepare(&sql)?;
    let mut tasks = stmt
        .query_map(params![stack_id, user], task_from_row)?
        .collect::<std::result::Result<Vec<_>, _>>()?;
    for task in &mut tasks {
        task.tags = load_task_tags(conn, &task.id)?;
    }
    Ok(tasks)
}

fn ordered_ids(conn: &Connection, stack_id: &str) -> Result<Vec<String>> {
    let mut stmt =
        conn.prepare("SELECT id FROM tasks WHERE stack_id = ?1 ORDER BY position, rowid")?;
    let ids = stmt
        .query_map(params![stack_id], |row| row.get(0))?
        .collect::<std::result::Result<Vec<String>, _>>()?;
    Ok(ids)
}

fn write_positions(conn: &Connection, ids: &[String]) -> Result<()> {
    let mut stmt = conn.prepare("UPDATE tasks SET position = ?1 WHERE id = ?2")?;
    for (pos, id) in ids.iter().enumerate() {
        stmt.execute(params![pos as i64, id])?;
    }
    Ok(())
}

/// Rewrite positions in `stack_id` densely as 0..n, keeping current order.
fn renumber(conn: &Connection, stack_id: &str) -> Result<()> {
    write_positions(conn, &ordered_ids(conn, stack_id)?)
}

impl Db {
    /// Append a task to the end of an active stack.
    pub fn add_task(&self, user: &str, stack_id: &str, new: NewTask) -> Result<Task> {
        let title = normalize_title(&new.title).ok_or(TaskflowError::EmptyTitle)?;
        let tx = self.write_tx()?;
        let stack = load_open_stack(&tx, user, stack_id)?;
        let next: i64 = tx.query_row(
            "SELECT COALESCE(MAX(position) + 1, 0) FROM tasks WHERE stack_id = ?1",
            params![stack.id],
            |row| row.get(0),
        )?;
        let task = Task {
            id: new_id(),
            stack_id: stack.id.clone(),
            title,
            description: normalize_text(new.description),
            category: normalize_text(new.category),
            priority: new.priority,
            due_date: new.due_date,
            position: next as u32,
            created_at: Utc::now(),
            completed_at: None,
            tags: Vec::new(),
        };
        tx.execute(
            "INSERT INTO tasks (id, stack_id, user_id, title, description, category, priority, due_date, position, created_at, completed_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, NULL)",
            params![
                task.id,
                task.stack_id,
                user,
                task.title,
                task.description,
                task.category,
                task.priority.map(|p| p.to_string()),
                task.due_date.map(date_str),
                task.position,
                ts(task.created_at),
            ],
        )?;
        tx.commit()?;
        debug!(task = %task.id, stack = %task.stack_id, "added task");
        Ok(task)
    }

    pub fn task(&self, user: &str, id: &str) -> Result<Task> {
        load_task(self.conn(), user, id)
    }

    /// Flip a task's completion and apply the auto-archive rule in the same
    /// transaction.
    pub fn toggle_task(&self, user: &str, id: &str) -> Result<TaskChange> {
        self.apply_completion(user, id, None)
    }

    /// Set completion explicitly; a no-op if the task is already in that state.
    pub fn set_task_completed(&self, user: &str, id: &str, completed: bool) -> Result<TaskChange> {
        self.apply_completion(user, id, Some(completed))
    }

    fn apply_completion(&self, user: &str, id: &str, want: Option<bool>) -> Result<TaskChange> {
        let tx = self.write_tx()?;
        let mut task = load_task(&tx, user, id)?;
        load_open_stack(&tx, user, &task.stack_id)?;

        let target = want.unwrap_or(!task.is_completed());
        let now = Utc::now();
        if target != task.is_completed() {
            task.completed_at = target.then_some(now);
            tx.execute(
                "UPDATE tasks SET completed_at = ?1 WHERE id = ?2",
                params![opt_ts(task.completed_at), task.id],
            )?;
        }
        let mut archived_stacks = Vec::new();
        if settle_stack(&tx, &task.stack_id, now, self.auto_archive())? {
            archived_stacks.push(task.stack_id.clone());
        }
        tx.commit()?;
        debug!(task = %task.id, completed = task.is_completed(), "task completion set");
        Ok(TaskChange {
            task,
            archived_stacks,
        })
    }

    pub fn edit_task(&self, user: &str, id: &str, patch: TaskPatch) -> Result<Task> {
        let tx = self.write_tx()?;
        let mut task = load_task(&tx, user, id)?;
        load_open_stack(&tx, user, &task.stack_id)?;

        if let Some(title) = patch.title {
            task.title = normalize_title(&title).ok_or(TaskflowError::EmptyTitle)?;
        }
        if patch.description.is_some() {
            task.description = normalize_text(patch.description);
        }
        if patch.category.is_some() {
            task.category = normalize_text(patch.category);
        }
        if patch.clear_priority {
            task.priority = None;
        } else if let Some(p) = patch.priority {
            task.priority = Some(p);
        }
        if patch.clear_due {
            task.due_date = None;
        } else if let Some(d) = patch.due_date {
            task.due_date = Some(d);
        }

        tx.execute(
            "UPDATE tasks SET title = ?1, description = ?2, category = ?3, priority = ?4, due_date = ?5
             WHERE id = ?6",
            params![
                task.title,
                task.description,
                task.category,
                task.priority.map(|p| p.to_string()),
                task.due_date.map(date_str),
                task.id,
            ],
        )?;
        tx.commit()?;
        Ok(task)
    }

    /// Delete a task, compact the remaining positions and re-check the
    /// auto-archive rule for its stack.
    pub fn delete_task(&self, user: &str, id: &str) -> Result<TaskChange> {
        let tx = self.write_tx()?;
        let task = load_task(&tx, user, id)?;
        load_open_stack(&tx, user, &task.stack_id)?;

        tx.execute("DELETE FROM tasks WHERE id = ?1", params![task.id])?;
        renumber(&tx, &task.stack_id)?;
        let mut archived_stacks = Vec::new();
        if settle_stack(&tx, &task.stack_id, Utc::now(), self.auto_archive())? {
            archived_stacks.push(task.stack_id.clone());
        }
        tx.commit()?;
        debug!(task = %task.id, "deleted task");
        Ok(TaskChange {
            task,
            archived_stacks,
        })
    }

    /// Move a task to `position` (0-based, clamped) within its stack or
    /// within `to_stack`. Sibling positions are renumbered densely.
    pub fn move_task(
        &self,
        user: &str,
        id: &str,
        position: usize,
        to_stack: Option<&str>,
    ) -> Result<TaskChange> {
        let tx = self.write_tx()?;
        let mut task = load_task(&tx, user, id)?;
        let source = load_open_stack(&tx, user, &task.stack_id)?;
        let target = match to_stack {
            Some(stack_id) if stack_id != source.id => load_open_stack(&tx, user, stack_id)?,
            _ => source.clone(),
        };
        let changes_stack = target.id != source.id;

        if changes_stack {
            tx.execute(
                "UPDATE tasks SET stack_id = ?1 WHERE id = ?2",
                params![target.id, task.id],
            )?;
            task.stack_id = target.id.clone();
        }

        let mut order: Vec<String> = ordered_ids(&tx, &target.id)?
            .into_iter()
            .filter(|other| *other != task.id)
            .collect();
        let slot = position.min(order.len());
        order.insert(slot, task.id.clone());
        write_positions(&tx, &order)?;
        task.position = slot as u32;

        let now = Utc::now();
        let mut archived_stacks = Vec::new();
        if changes_stack {
            renumber(&tx, &source.id)?;
            for stack_id in [&source.id, &target.id] {
                if settle_stack(&tx, stack_id, now, self.auto_archive())? {
                    archived_stacks.push(stack_id.clone());
                }
            }
        }
        tx.commit()?;
        debug!(task = %task.id, stack = %task.stack_id, position = slot, "moved task");
        Ok(TaskChange {
            task,
            archived_stacks,
        })
    }

    /// Replace a task's tag set atomically.
    pub fn set_task_tags(&self, user: &str, id: &str, tag_ids: &[String]) -> Result<Task> {
        let tx = self.write_tx()?;
        let task = load_task(&tx, user, id)?;
        load_open_stack(&tx, user, &task.stack_id)?;

        let mut resolved = Vec::with_capacity(tag_ids.len());
        for tag_id in tag_ids {
            let tag = load_tag(&tx, user, tag_id)?;
            if !resolved.contains(&tag.id) {
                resolved.push(tag.id);
            }
        }

        tx.execute("DELETE FROM task_tags WHERE task_id = ?1", params![task.id])?;
        for tag_id in &resolved {
            tx.execute(
                "INSERT INTO task_tags (task_id, tag_id) VALUES (?1, ?2)",
                params![task.id, tag_id],
            )?;
        }
        let task = load_task(&tx, user, &task.id)?;
        tx.commit()?;
        Ok(task)
    }

    /// Case-insensitive substring search over task titles and descriptions,
    /// newest first.
    pub fn search_tasks(&self, user: &str, query: &str, limit: usize) -> Result<Vec<SearchHit>> {
        let query = query.trim();
        if query.is_empty() {
            return Ok(Vec::new());
        }
        let pattern = format!("%{}%", escape_like(query));
        let sql = format!(
            "SELECT {TASK_COLUMNS}, s.title FROM tasks t
             JOIN stacks s ON s.id = t.stack_id
             WHERE t.user_id = ?1
             AND (t.title LIKE ?2 ESCAPE '\\' OR COALESCE(t.description, '') LIKE ?2 ESCAPE '\\')
             ORDER BY t.created_at DESC, t.rowid DESC
             LIMIT ?3"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let mut hits = stmt
            .query_map(params![user, pattern, limit as i64], |row| {
                Ok(SearchHit {
                    task: task_from_row(row)?,
                    stack_title: row.get(10)?,
                })
            })?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        for hit in &mut hits {
            hit.task.tags = load_task_tags(self.conn(), &hit.task.id)?;
        }
        Ok(hits)
    }

    /// Every task the user owns, across all stacks.
    pub fn all_tasks(&self, user: &str) -> Result<Vec<Task>> {
        let sql = format!(
            "SELECT {TASK_COLUMNS} FROM tasks t WHERE t.user_id = ?1
             ORDER BY t.created_at, t.rowid"
        );
        let mut stmt = self.conn().prepare(&sql)?;
        let tasks = stmt
            .query_map(params![user], task_from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(tasks)
    }

    pub fn task_ids(&self, user: &str) -> Result<Vec<String>> {
        self.ids_in("tasks", user)
    }
}

fn escape_like(raw: &str) -> String {
    let mut out = String::with_capacity(raw.len());
    for c in raw.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::StackState;

    fn setup() -> (Db, String) {
        let db = Db::open_memory().unwrap();
        let stack = db.create_stack("alice", "Groceries").unwrap();
        (db, stack.id)
    }

    #[test]
    fn add_appends_positions() {
        let (db, stack) = setup();
        let a = db.add_task("alice", &stack, NewTask::titled("Milk")).unwrap();
        let b = db.add_task("alice", &stack, NewTask::titled("Eggs")).unwrap();
        assert_eq!(a.position, 0);
        assert_eq!(b.position, 1);
    }

    #[test]
    fn completing_last_task_archives_stack() {
        let (db, stack) = setup();
        let a = db.add_task("alice", &stack, NewTask::titled("Milk")).unwrap();
        let b = db.add_task("alice", &stack, NewTask::titled("Eggs")).unwrap();

        let first = db.toggle_task("alice", &a.id).unwrap();
        assert!(first.task.is_completed());
        assert!(!first.stack_archived());
        assert_eq!(db.stack("alice", &stack).unwrap().state(), StackState::Active);

        let second = db.toggle_task("alice", &b.id).unwrap();
        assert_eq!(second.archived_stacks, vec![stack.clone()]);
        let s = db.stack("alice", &stack).unwrap();
        assert_eq!(s.state(), StackState::Completed);
        assert_eq!(s.completed_at, s.archived_at);
    }

    #[test]
    fn auto_archive_can_be_disabled() {
        let db = Db::open_memory().unwrap().with_auto_archive(false);
        let stack = db.create_stack("alice", "Chores").unwrap();
        let a = db.add_task("alice", &stack.id, NewTask::titled("Dishes")).unwrap();
        let change = db.toggle_task("alice", &a.id).unwrap();
        assert!(!change.stack_archived());
        assert_eq!(db.stack("alice", &stack.id).unwrap().state(), StackState::Active);
    }

    #[test]
    fn archived_stack_rejects_task_mutations() {
        let (db, stack) = setup();
        let a = db.add_task("alice", &stack, NewTask::titled("Milk")).unwrap();
        db.archive_stack("alice", &stack).unwrap();

        assert!(matches!(
            db.add_task("alice", &stack, NewTask::titled("Bread")),
            Err(TaskflowError::StackArchived(_))
        ));
        assert!(matches!(
            db.toggle_task("alice", &a.id),
            Err(TaskflowError::StackArchived(_))
        ));
        assert!(matches!(
            db.edit_task("alice", &a.id, TaskPatch::default()),
            Err(TaskflowError::StackArchived(_))
        ));
    }

    #[test]
    fn deleting_last_incomplete_task_archives() {
        let (db, stack) = setup();
        let a = db.add_task("alice", &stack, NewTask::titled("Milk")).unwrap();
        let b = db.add_task("alice", &stack, NewTask::titled("Eggs")).unwrap();
        db.toggle_task("alice", &a.id).unwrap();

        let removed = db.delete_task("alice", &b.id).unwrap();
        assert!(removed.stack_archived());
    }

    #[test]
    fn deleting_only_task_leaves_empty_stack_active() {
        let (db, stack) = setup();
        let a = db.add_task("alice", &stack, NewTask::titled("Milk")).unwrap();
        let removed = db.delete_task("alice", &a.id).unwrap();
        assert!(!removed.stack_archived());
        assert_eq!(db.stack("alice", &stack).unwrap().state(), StackState::Active);
    }

    #[test]
    fn delete_compacts_positions() {
        let (db, stack) = setup();
        let a = db.add_task("alice", &stack, NewTask::titled("A")).unwrap();
        db.add_task("alice", &stack, NewTask::titled("B")).unwrap();
        db.add_task("alice", &stack, NewTask::titled("C")).unwrap();
        db.delete_task("alice", &a.id).unwrap();

        let view = db.stack_view("alice", &stack).unwrap();
        let positions: Vec<u32> = view.tasks.iter().map(|t| t.position).collect();
        let titles: Vec<&str> = view.tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(positions, vec![0, 1]);
        assert_eq!(titles, vec!["B", "C"]);
    }

    #[test]
    fn move_reorders_within_stack() {
        let (db, stack) = setup();
        db.add_task("alice", &stack, NewTask::titled("A")).unwrap();
        db.add_task("alice", &stack, NewTask::titled("B")).unwrap();
        let c = db.add_task("alice", &stack, NewTask::titled("C")).unwrap();

        let moved = db.move_task("alice", &c.id, 0, None).unwrap();
        assert_eq!(moved.task.position, 0);
        let titles: Vec<String> = db
            .stack_view("alice", &stack)
            .unwrap()
            .tasks
            .into_iter()
            .map(|t| t.title)
            .collect();
        assert_eq!(titles, vec!["C", "A", "B"]);

        // Out-of-range positions clamp to the end
        let moved = db.move_task("alice", &c.id, 99, None).unwrap();
        assert_eq!(moved.task.position, 2);
    }

    #[test]
    fn moving_last_open_task_out_archives_source() {
        let (db, stack) = setup();
        let other = db.create_stack("alice", "Errands").unwrap();
        let a = db.add_task("alice", &stack, NewTask::titled("Milk")).unwrap();
        let b = db.add_task("alice", &stack, NewTask::titled("Post office")).unwrap();
        db.add_task("alice", &other.id, NewTask::titled("Bank")).unwrap();
        db.toggle_task("alice", &a.id).unwrap();

        let change = db.move_task("alice", &b.id, 0, Some(&other.id)).unwrap();
        assert_eq!(change.task.stack_id, other.id);
        assert_eq!(change.archived_stacks, vec![stack.clone()]);

        let target = db.stack_view("alice", &other.id).unwrap();
        let titles: Vec<&str> = target.tasks.iter().map(|t| t.title.as_str()).collect();
        assert_eq!(titles, vec!["Post office", "Bank"]);
    }

    #[test]
    fn archived_stack_rejects_delete_tag_and_moves() {
        let (db, stack) = setup();
        let open = db.create_stack("alice", "Errands").unwrap();
        let a = db.add_task("alice", &stack, NewTask::titled("Milk")).unwrap();
        let b = db.add_task("alice", &open.id, NewTask::titled("Bank")).unwrap();
        let tag = db.create_tag("alice", "urgent", None).unwrap();
        db.archive_stack("alice", &stack).unwrap();

        assert!(matches!(
            db.delete_task("alice", &a.id),
            Err(TaskflowError::StackArchived(_))
        ));
        assert!(matches!(
            db.set_task_tags("alice", &a.id, std::slice::from_ref(&tag.id)),
            Err(TaskflowError::StackArchived(_))
        ));
        // Out of an archived stack
        assert!(matches!(
            db.move_task("alice", &a.id, 0, Some(&open.id)),
            Err(TaskflowError::StackArchived(_))
        ));
        // Into an archived stack
        assert!(matches!(
            db.move_task("alice", &b.id, 0, Some(&stack)),
            Err(TaskflowError::StackArchived(_))
        ));

        // Nothing moved and nothing was deleted
        assert_eq!(db.task("alice", &a.id).unwrap().stack_id, stack);
        assert!(db.task("alice", &a.id).unwrap().tags.is_empty());
        assert_eq!(db.task("alice", &b.id).unwrap().stack_id, open.id);
    }

    #[test]
    fn moving_completed_task_into_empty_stack_archives_target() {
        let (db, stack) = setup();
        let target = db.create_stack("alice", "Done pile").unwrap();
        let a = db.add_task("alice", &stack, NewTask::titled("Milk")).unwrap();
        db.add_task("alice", &stack, NewTask::titled("Eggs")).unwrap();
        db.toggle_task("alice", &a.id).unwrap();

        let change = db.move_task("alice", &a.id, 0, Some(&target.id)).unwrap();
        assert_eq!(change.archived_stacks, vec![target.id.clone()]);
        assert_eq!(
            db.stack("alice", &target.id).unwrap().state(),
            StackState::Completed
        );
        assert_eq!(db.stack("alice", &stack).unwrap().state(), StackState::Active);
    }

    #[test]
    fn moving_only_task_out_leaves_source_empty_and_active() {
        let (db, stack) = setup();
        let target = db.create_stack("alice", "Errands").unwrap();
        let a = db.add_task("alice", &stack, NewTask::titled("Milk")).unwrap();
        db.add_task("alice", &target.id, NewTask::titled("Bank")).unwrap();

        let change = db.move_task("alice", &a.id, 5, Some(&target.id)).unwrap();
        assert!(!change.stack_archived());
        assert_eq!(change.task.position, 1);
        assert_eq!(db.stack("alice", &stack).unwrap().state(), StackState::Active);
        assert!(db.stack_view("alice", &stack).unwrap().tasks.is_empty());
    }

    #[test]
    fn edit_updates_and_clears_fields() {
        let (db, stack) = setup();
        let due = NaiveDate::from_ymd_opt(2026, 5, 1).unwrap();
        let a = db
            .add_task(
                "alice",
                &stack,
                NewTask {
                    title: "Milk".into(),
                    category: Some("Shopping".into()),
                    priority: Some(Priority::High),
                    due_date: Some(due),
                    ..NewTask::default()
                },
            )
            .unwrap();
        let edited = db
            .edit_task(
                "alice",
                &a.id,
                TaskPatch {
                    title: Some("Oat milk".into()),
                    description: Some("2 litres".into()),
                    category: Some("  ".into()),
                    clear_priority: true,
                    clear_due: true,
                    ..TaskPatch::default()
                },
            )
            .unwrap();
        assert_eq!(edited.title, "Oat milk");
        assert_eq!(edited.description.as_deref(), Some("2 litres"));
        assert_eq!(edited.category, None);
        assert_eq!(edited.priority, None);
        assert_eq!(edited.due_date, None);
        assert_eq!(db.task("alice", &a.id).unwrap(), edited);
    }

    #[test]
    fn search_matches_title_and_description_case_insensitively() {
        let (db, stack) = setup();
        db.add_task("alice", &stack, NewTask::titled("Buy MILK")).unwrap();
        db.add_task(
            "alice",
            &stack,
            NewTask {
                title: "Bake".into(),
                description: Some("needs milk and flour".into()),
                ..NewTask::default()
            },
        )
        .unwrap();
        db.add_task("alice", &stack, NewTask::titled("Walk dog")).unwrap();

        let hits = db.search_tasks("alice", "milk", 20).unwrap();
        assert_eq!(hits.len(), 2);
        assert_eq!(hits[0].task.title, "Bake");
        assert_eq!(hits[0].stack_title, "Groceries");
        assert!(db.search_tasks("alice", "   ", 20).unwrap().is_empty());
        assert!(db.search_tasks("bob", "milk", 20).unwrap().is_empty());
        assert_eq!(db.search_tasks("alice", "milk", 1).unwrap().len(), 1);
    }

    #[test]
    fn search_escapes_like_wildcards() {
        let (db, stack) = setup();
        db.add_task("alice", &stack, NewTask::titled("100% done")).unwrap();
        db.add_task("alice", &stack, NewTask::titled("1000 words")).unwrap();
        let hits = db.search_tasks("alice", "0%", 20).unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].task.title, "100% done");
    }

    #[test]
    fn escape_like_escapes_specials() {
        assert_eq!(escape_like(r"a%b_c\d"), r"a\%b\_c\\d");
    }
}
