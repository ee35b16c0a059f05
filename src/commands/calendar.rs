use chrono::{Datelike, Utc};

use crate::calendar;
use crate::error::Result;
use crate::output::{self, Format};
use crate::store::repo::Repo;

/// Render the month grid for `month` (`YYYY-MM`), defaulting to the current
/// month.
pub fn month(repo: &Repo, month: Option<&str>, format: Format) -> Result<()> {
    let today = Utc::now().date_naive();
    let (year, month) = match month {
        Some(raw) => calendar::parse_month(raw)?,
        None => (today.year(), today.month()),
    };
    let (start, end) = calendar::grid_bounds(year, month)?;
    let events = repo.db.events(&repo.user, Some(start), Some(end))?;
    let view = calendar::month_view(year, month, today, events)?;
    output::print_month(&view, format)
}
