use chrono::{NaiveDate, Utc};

use crate::error::Result;
use crate::output::{self, Format};
use crate::store::events::{EventPatch, NewEvent};
use crate::store::repo::{Entity, Repo};

pub fn add(repo: &Repo, new: NewEvent, format: Format) -> Result<()> {
    let event = repo.db.add_event(&repo.user, new)?;
    output::print_event(&event, format)
}

pub fn list(
    repo: &Repo,
    from: Option<NaiveDate>,
    to: Option<NaiveDate>,
    format: Format,
) -> Result<()> {
    let events = repo.db.events(&repo.user, from, to)?;
    output::print_events(&events, format)
}

pub fn upcoming(repo: &Repo, days: u32, format: Format) -> Result<()> {
    let today = Utc::now().date_naive();
    let events = repo.db.upcoming_events(&repo.user, today, days)?;
    output::print_events(&events, format)
}

pub fn show(repo: &Repo, id: &str, format: Format) -> Result<()> {
    let id = repo.resolve(Entity::Event, id)?;
    output::print_event(&repo.db.event(&repo.user, &id)?, format)
}

pub fn edit(repo: &Repo, id: &str, patch: EventPatch, format: Format) -> Result<()> {
    let id = repo.resolve(Entity::Event, id)?;
    let event = repo.db.edit_event(&repo.user, &id, patch)?;
    output::print_event(&event, format)
}

pub fn toggle(repo: &Repo, id: &str, format: Format) -> Result<()> {
    let id = repo.resolve(Entity::Event, id)?;
    let event = repo.db.toggle_event(&repo.user, &id)?;
    output::print_event(&event, format)
}

pub fn delete(repo: &Repo, id: &str, format: Format) -> Result<()> {
    let id = repo.resolve(Entity::Event, id)?;
    let event = repo.db.delete_event(&repo.user, &id)?;
    output::print_event(&event, format)
}
