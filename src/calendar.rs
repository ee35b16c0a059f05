use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::error::{Result, TaskflowError};
use crate::model::Event;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub in_month: bool,
    pub today: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub events: Vec<Event>,
}

/// A Monday-first month grid. Leading and trailing days from neighbouring
/// months pad the first and last week.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthView {
    pub year: i32,
    pub month: u32,
    pub weeks: Vec<Vec<CalendarDay>>,
}

impl MonthView {
    pub fn first_day(&self) -> Option<NaiveDate> {
        NaiveDate::from_ymd_opt(self.year, self.month, 1)
    }

    pub fn event_count(&self) -> usize {
        self.weeks
            .iter()
            .flatten()
            .filter(|d| d.in_month)
            .map(|d| d.events.len())
            .sum()
    }
}

/// Parse `YYYY-MM`.
pub fn parse_month(raw: &str) -> Result<(i32, u32)> {
    let invalid = || TaskflowError::InvalidArgument("month".into(), format!("'{raw}' is not YYYY-MM"));
    let (y, m) = raw.trim().split_once('-').ok_or_else(invalid)?;
    let year: i32 = y.parse().map_err(|_| invalid())?;
    let month: u32 = m.parse().map_err(|_| invalid())?;
    NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    Ok((year, month))
}

/// First and last day of a month.
pub fn month_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(|| {
        TaskflowError::InvalidArgument("month".into(), format!("{year}-{month:02}"))
    })?;
    let (ny, nm) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let next = NaiveDate::from_ymd_opt(ny, nm, 1).ok_or_else(|| {
        TaskflowError::InvalidArgument("month".into(), format!("{year}-{month:02}"))
    })?;
    Ok((first, next - Duration::days(1)))
}

/// Inclusive date range the grid for a month covers.
pub fn grid_bounds(year: i32, month: u32) -> Result<(NaiveDate, NaiveDate)> {
    let (first, last) = month_bounds(year, month)?;
    let start = first - Duration::days(i64::from(first.weekday().num_days_from_monday()));
    let end = last + Duration::days(i64::from(6 - last.weekday().num_days_from_monday()));
    Ok((start, end))
}

/// Lay `events` out on the month grid. Events outside the grid are dropped;
/// input order is preserved within a day.
pub fn month_view(year: i32, month: u32, today: NaiveDate, events: Vec<Event>) -> Result<MonthView> {
    let (start, end) = grid_bounds(year, month)?;
    let mut weeks: Vec<Vec<CalendarDay>> = Vec::new();
    let mut date = start;
    while date <= end {
        if date.weekday().num_days_from_monday() == 0 {
            weeks.push(Vec::with_capacity(7));
        }
        if let Some(week) = weeks.last_mut() {
            week.push(CalendarDay {
                date,
                in_month: date.month() == month && date.year() == year,
                today: date == today,
                events: Vec::new(),
            });
        }
        date += Duration::days(1);
    }

    for event in events {
        if event.date < start || event.date > end {
            continue;
        }
        let offset = (event.date - start).num_days() as usize;
        weeks[offset / 7][offset % 7].events.push(event);
    }

    Ok(MonthView { year, month, weeks })
}
