use crate::error::Result;
use crate::output::{self, Format};
use crate::store::repo::Repo;

pub fn create(repo: &Repo, name: &str, color: Option<&str>, format: Format) -> Result<()> {
    let tag = repo.db.create_tag(&repo.user, name, color)?;
    output::print_tag(&tag, format)
}

pub fn list(repo: &Repo, format: Format) -> Result<()> {
    output::print_tags(&repo.db.tags(&repo.user)?, format)
}

pub fn delete(repo: &Repo, tag: &str, format: Format) -> Result<()> {
    let id = repo.resolve_tag(tag)?;
    let tag = repo.db.delete_tag(&repo.user, &id)?;
    output::print_tag(&tag, format)
}
