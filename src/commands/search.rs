use crate::error::Result;
use crate::output::{self, Format};
use crate::store::repo::Repo;

pub fn run(repo: &Repo, query: &str, limit: Option<usize>, format: Format) -> Result<()> {
    let limit = limit.unwrap_or(repo.config.search_limit).max(1);
    let hits = repo.db.search_tasks(&repo.user, query, limit)?;
    output::print_search(&hits, format)
}
