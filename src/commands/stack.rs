use tracing::info;

use crate::error::Result;
use crate::model::StackView;
use crate::output::{self, Format};
use crate::store::repo::{Entity, Repo};

pub fn create(repo: &Repo, title: &str, format: Format) -> Result<()> {
    let stack = repo.db.create_stack(&repo.user, title)?;
    info!(stack = %stack.id, "stack created");
    output::print_stack(&StackView::new(stack, Vec::new()), format)
}

pub fn list(repo: &Repo, all: bool, format: Format) -> Result<()> {
    let stacks = repo.db.stacks(&repo.user, all)?;
    output::print_stacks(&stacks, format)
}

pub fn show(repo: &Repo, id: &str, format: Format) -> Result<()> {
    let id = repo.resolve(Entity::Stack, id)?;
    let view = repo.db.stack_view(&repo.user, &id)?;
    output::print_stack(&view, format)
}

pub fn rename(repo: &Repo, id: &str, title: &str, format: Format) -> Result<()> {
    let id = repo.resolve(Entity::Stack, id)?;
    repo.db.rename_stack(&repo.user, &id, title)?;
    output::print_stack(&repo.db.stack_view(&repo.user, &id)?, format)
}

pub fn archive(repo: &Repo, id: &str, format: Format) -> Result<()> {
    let id = repo.resolve(Entity::Stack, id)?;
    repo.db.archive_stack(&repo.user, &id)?;
    output::print_stack(&repo.db.stack_view(&repo.user, &id)?, format)
}

pub fn restore(repo: &Repo, id: &str, format: Format) -> Result<()> {
    let id = repo.resolve(Entity::Stack, id)?;
    repo.db.restore_stack(&repo.user, &id)?;
    output::print_stack(&repo.db.stack_view(&repo.user, &id)?, format)
}

pub fn delete(repo: &Repo, id: &str, format: Format) -> Result<()> {
    let id = repo.resolve(Entity::Stack, id)?;
    let removed = repo.db.delete_stack(&repo.user, &id)?;
    info!(stack = %id, tasks = removed.tasks.len(), "stack deleted");
    output::print_stack(&removed, format)
}

pub fn history(repo: &Repo, page: usize, page_size: Option<usize>, format: Format) -> Result<()> {
    let page_size = page_size.unwrap_or(repo.config.history_page_size);
    let history = repo.db.stack_history(&repo.user, page, page_size)?;
    output::print_history(&history, format)
}
