//! Productivity aggregates computed from a user's stacks, tasks and events.

use std::collections::BTreeMap;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::error::{Result, TaskflowError};
use crate::model::{Event, Priority, StackState, StackView, Task};

pub const UNCATEGORISED: &str = "uncategorised";

/// Longest monthly trend a report will build.
pub const MAX_TREND_MONTHS: u32 = 120;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct DayActivity {
    pub date: NaiveDate,
    pub label: String,
    pub completed: usize,
    pub pending: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct CategoryShare {
    pub name: String,
    pub count: usize,
    pub percent: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthTrend {
    pub month: String,
    pub label: String,
    pub tasks: usize,
    pub completion: f64,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct PriorityShare {
    pub name: String,
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct Summary {
    pub stacks: usize,
    pub active_stacks: usize,
    pub completed_stacks: usize,
    pub archived_stacks: usize,
    pub tasks: usize,
    pub completed_tasks: usize,
    pub overdue_tasks: usize,
    pub events_today: usize,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct InsightsReport {
    pub today: NaiveDate,
    pub summary: Summary,
    pub weekly: Vec<DayActivity>,
    pub categories: Vec<CategoryShare>,
    pub monthly: Vec<MonthTrend>,
    pub priorities: Vec<PriorityShare>,
}

fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        0.0
    } else {
        part as f64 * 100.0 / whole as f64
    }
}

/// Per-day activity for the seven days ending `today`.
///
/// `completed` counts tasks finished that day; `pending` counts tasks that
/// existed by the end of that day and were still open at that point.
pub fn weekly_activity(tasks: &[Task], today: NaiveDate) -> Vec<DayActivity> {
    (0..7)
        .rev()
        .map(|back| {
            let date = today - Duration::days(back);
            let completed = tasks
                .iter()
                .filter(|t| t.completed_at.is_some_and(|c| c.date_naive() == date))
                .count();
            let pending = tasks
                .iter()
                .filter(|t| t.created_at.date_naive() <= date)
                .filter(|t| t.completed_at.is_none_or(|c| c.date_naive() > date))
                .count();
            DayActivity {
                date,
                label: date.format("%a").to_string(),
                completed,
                pending,
            }
        })
        .collect()
}

/// Task counts per category, largest first.
pub fn categories(tasks: &[Task]) -> Vec<CategoryShare> {
    let mut counts: BTreeMap<String, usize> = BTreeMap::new();
    for task in tasks {
        let name = task
            .category
            .clone()
            .unwrap_or_else(|| UNCATEGORISED.to_string());
        *counts.entry(name).or_default() += 1;
    }
    let total = tasks.len();
    let mut shares: Vec<CategoryShare> = counts
        .into_iter()
        .map(|(name, count)| CategoryShare {
            name,
            count,
            percent: percent(count, total),
        })
        .collect();
    // BTreeMap order breaks count ties by name.
    shares.sort_by(|a, b| b.count.cmp(&a.count));
    shares
}

fn shift_month(year: i32, month: u32, back: u32) -> (i32, u32) {
    let index = i64::from(year) * 12 + i64::from(month) - 1 - i64::from(back);
    (index.div_euclid(12) as i32, index.rem_euclid(12) as u32 + 1)
}

/// Checks a requested trend length against `1..=MAX_TREND_MONTHS`.
pub fn trend_months(months: u32) -> Result<u32> {
    if (1..=MAX_TREND_MONTHS).contains(&months) {
        Ok(months)
    } else {
        Err(TaskflowError::InvalidArgument(
            "months".into(),
            format!("{months} (expected 1 to {MAX_TREND_MONTHS})"),
        ))
    }
}

/// Tasks created per month over the last `months` months (oldest first),
/// with the share of those tasks that are now complete.
pub fn monthly_trends(tasks: &[Task], today: NaiveDate, months: u32) -> Vec<MonthTrend> {
    (0..months)
        .rev()
        .map(|back| {
            let (year, month) = shift_month(today.year(), today.month(), back);
            let created: Vec<&Task> = tasks
                .iter()
                .filter(|t| {
                    let d = t.created_at.date_naive();
                    d.year() == year && d.month() == month
                })
                .collect();
            let done = created.iter().filter(|t| t.is_completed()).count();
            let label = NaiveDate::from_ymd_opt(year, month, 1)
                .map(|d| d.format("%b").to_string())
                .unwrap_or_default();
            MonthTrend {
                month: format!("{year:04}-{month:02}"),
                label,
                tasks: created.len(),
                completion: percent(done, created.len()),
            }
        })
        .collect()
}

/// Completed versus total per priority, high to low, then unprioritised.
pub fn priorities(tasks: &[Task]) -> Vec<PriorityShare> {
    let levels = Priority::ALL.iter().map(|p| Some(*p)).chain(std::iter::once(None));
    levels
        .map(|level| {
            let matching: Vec<&Task> = tasks.iter().filter(|t| t.priority == level).collect();
            PriorityShare {
                name: level.map_or_else(|| "none".to_string(), |p| p.to_string()),
                completed: matching.iter().filter(|t| t.is_completed()).count(),
                total: matching.len(),
            }
        })
        .collect()
}

pub fn summary(stacks: &[StackView], tasks: &[Task], events: &[Event], today: NaiveDate) -> Summary {
    let count_state = |state: StackState| stacks.iter().filter(|s| s.state == state).count();
    Summary {
        stacks: stacks.len(),
        active_stacks: count_state(StackState::Active),
        completed_stacks: count_state(StackState::Completed),
        archived_stacks: count_state(StackState::Archived),
        tasks: tasks.len(),
        completed_tasks: tasks.iter().filter(|t| t.is_completed()).count(),
        overdue_tasks: tasks.iter().filter(|t| t.is_overdue(today)).count(),
        events_today: events.iter().filter(|e| e.date == today).count(),
    }
}

pub fn build_report(
    stacks: &[StackView],
    tasks: &[Task],
    events: &[Event],
    today: NaiveDate,
    months: u32,
) -> InsightsReport {
    InsightsReport {
        today,
        summary: summary(stacks, tasks, events, today),
        weekly: weekly_activity(tasks, today),
        categories: categories(tasks),
        monthly: monthly_trends(tasks, today, months),
        priorities: priorities(tasks),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(y: i32, m: u32, d: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, 12, 0, 0).unwrap()
    }

    fn task(created: DateTime<Utc>, completed: Option<DateTime<Utc>>) -> Task {
        Task {
            id: "t".into(),
            stack_id: "s".into(),
            title: "t".into(),
            description: None,
            category: None,
            priority: None,
            due_date: None,
            position: 0,
            created_at: created,
            completed_at: completed,
            tags: vec![],
        }
    }

    #[test]
    fn weekly_counts_completed_and_pending_per_day() {
        let today = NaiveDate::from_ymd_opt(2026, 4, 10).unwrap();
        let tasks = vec![
            task(at(2026, 4, 1), Some(at(2026, 4, 9))),
            task(at(2026, 4, 8), None),
            task(at(2026, 4, 10), Some(at(2026, 4, 10))),
        ];
        let week = weekly_activity(&tasks, today);
        assert_eq!(week.len(), 7);
        assert_eq!(week[0].date, NaiveDate::from_ymd_opt(2026, 4, 4).unwrap());
        assert_eq!(week[6].date, today);

        // Apr 8: first task still open, second created that day
        assert_eq!(week[4].pending, 2);
        assert_eq!(week[4].completed, 0);
        // Apr 9: first task completed
        assert_eq!(week[5].completed, 1);
        assert_eq!(week[5].pending, 1);
        // Apr 10: third task created and completed the same day
        assert_eq!(week[6].completed, 1);
        assert_eq!(week[6].pending, 1);
        assert_eq!(week[6].label, "Fri");
    }

    #[test]
    fn categories_sorted_by_count_then_name() {
        let mut tasks = Vec::new();
        for cat in ["Work", "Home", "Work", "Health", "Home"] {
            let mut t = task(at(2026, 1, 1), None);
            t.category = Some(cat.into());
            tasks.push(t);
        }
        tasks.push(task(at(2026, 1, 1), None));

        let shares = categories(&tasks);
        let names: Vec<&str> = shares.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Home", "Work", "Health", UNCATEGORISED]);
        assert!((shares[0].percent - 100.0 / 3.0).abs() < 1e-9);
    }

    #[test]
    fn shift_month_crosses_year_boundary() {
        assert_eq!(shift_month(2026, 2, 0), (2026, 2));
        assert_eq!(shift_month(2026, 2, 2), (2025, 12));
        assert_eq!(shift_month(2026, 1, 13), (2024, 12));
    }

    #[test]
    fn shift_month_handles_huge_offsets() {
        assert_eq!(shift_month(2026, 1, u32::MAX), (-357_911_916, 10));
        assert_eq!(shift_month(i32::MAX, 12, 0), (i32::MAX, 12));
    }

    #[test]
    fn trend_months_are_bounded() {
        assert_eq!(trend_months(1).unwrap(), 1);
        assert_eq!(trend_months(MAX_TREND_MONTHS).unwrap(), MAX_TREND_MONTHS);
        for bad in [0, MAX_TREND_MONTHS + 1, u32::MAX] {
            let err = trend_months(bad).unwrap_err();
            assert_eq!(err.code(), "invalid_argument");
        }
    }

    #[test]
    fn monthly_trends_report_completion_rate() {
        let today = NaiveDate::from_ymd_opt(2026, 2, 15).unwrap();
        let tasks = vec![
            task(at(2026, 2, 1), Some(at(2026, 2, 2))),
            task(at(2026, 2, 3), None),
            task(at(2025, 12, 20), Some(at(2026, 1, 5))),
        ];
        let trends = monthly_trends(&tasks, today, 3);
        let months: Vec<&str> = trends.iter().map(|t| t.month.as_str()).collect();
        assert_eq!(months, vec!["2025-12", "2026-01", "2026-02"]);
        assert_eq!(trends[0].tasks, 1);
        assert_eq!(trends[0].completion, 100.0);
        assert_eq!(trends[1].tasks, 0);
        assert_eq!(trends[1].completion, 0.0);
        assert_eq!(trends[2].completion, 50.0);
        assert_eq!(trends[2].label, "Feb");
    }

    #[test]
    fn priorities_include_unprioritised_bucket() {
        let mut high = task(at(2026, 1, 1), Some(at(2026, 1, 2)));
        high.priority = Some(Priority::High);
        let mut low = task(at(2026, 1, 1), None);
        low.priority = Some(Priority::Low);
        let none = task(at(2026, 1, 1), None);

        let shares = priorities(&[high, low, none]);
        let names: Vec<&str> = shares.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["high", "medium", "low", "none"]);
        assert_eq!((shares[0].completed, shares[0].total), (1, 1));
        assert_eq!(shares[1].total, 0);
        assert_eq!((shares[2].completed, shares[2].total), (0, 1));
        assert_eq!(shares[3].total, 1);
    }
}
