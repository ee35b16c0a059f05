use crate::error::Result;
use crate::output::{self, Format};
use crate::store::repo::{Entity, Repo};
use crate::store::tasks::{NewTask, TaskPatch};

pub fn add(repo: &Repo, stack: &str, new: NewTask, format: Format) -> Result<()> {
    let stack = repo.resolve(Entity::Stack, stack)?;
    let task = repo.db.add_task(&repo.user, &stack, new)?;
    output::print_task(&task, format)
}

pub fn show(repo: &Repo, id: &str, format: Format) -> Result<()> {
    let id = repo.resolve(Entity::Task, id)?;
    output::print_task(&repo.db.task(&repo.user, &id)?, format)
}

pub fn toggle(repo: &Repo, id: &str, format: Format) -> Result<()> {
    let id = repo.resolve(Entity::Task, id)?;
    let change = repo.db.toggle_task(&repo.user, &id)?;
    output::print_task_change(&change, format)
}

/// Mark done (`completed = true`) or reopen (`false`) without toggling.
pub fn set_completed(repo: &Repo, id: &str, completed: bool, format: Format) -> Result<()> {
    let id = repo.resolve(Entity::Task, id)?;
    let change = repo.db.set_task_completed(&repo.user, &id, completed)?;
    output::print_task_change(&change, format)
}

pub fn edit(repo: &Repo, id: &str, patch: TaskPatch, format: Format) -> Result<()> {
    let id = repo.resolve(Entity::Task, id)?;
    let task = repo.db.edit_task(&repo.user, &id, patch)?;
    output::print_task(&task, format)
}

pub fn delete(repo: &Repo, id: &str, format: Format) -> Result<()> {
    let id = repo.resolve(Entity::Task, id)?;
    let change = repo.db.delete_task(&repo.user, &id)?;
    output::print_task_change(&change, format)
}

pub fn move_to(
    repo: &Repo,
    id: &str,
    position: usize,
    stack: Option<&str>,
    format: Format,
) -> Result<()> {
    let id = repo.resolve(Entity::Task, id)?;
    let stack = repo.resolve_opt(Entity::Stack, stack)?;
    let change = repo.db.move_task(&repo.user, &id, position, stack.as_deref())?;
    output::print_task_change(&change, format)
}

/// Replace a task's tags. Tags may be given by name or id.
pub fn tag(repo: &Repo, id: &str, tags: &[String], format: Format) -> Result<()> {
    let id = repo.resolve(Entity::Task, id)?;
    let tag_ids = tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(|t| repo.resolve_tag(t))
        .collect::<Result<Vec<_>>>()?;
    let task = repo.db.set_task_tags(&repo.user, &id, &tag_ids)?;
    output::print_task(&task, format)
}
