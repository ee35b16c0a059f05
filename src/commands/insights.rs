use chrono::Utc;

use crate::error::Result;
use crate::insights;
use crate::output::{self, Format};
use crate::store::repo::Repo;

pub fn run(repo: &Repo, months: u32, format: Format) -> Result<()> {
    let months = insights::trend_months(months)?;
    let today = Utc::now().date_naive();
    let stacks = repo.db.stacks(&repo.user, true)?;
    let tasks = repo.db.all_tasks(&repo.user)?;
    let events = repo.db.events(&repo.user, Some(today), Some(today))?;
    let report = insights::build_report(&stacks, &tasks, &events, today, months);
    output::print_insights(&report, format)
}
