use clap::ValueEnum;
use colored::Colorize;
use serde::Serialize;
use serde_json::Value;

use crate::calendar::MonthView;
use crate::error::Result;
use crate::insights::InsightsReport;
use crate::model::{Event, StackState, StackView, Tag, Task};
use crate::store::stacks::HistoryPage;
use crate::store::tasks::{SearchHit, TaskChange};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    Json,
    Pretty,
    Minimal,
}

pub fn print_json<T: Serialize + ?Sized>(value: &T) -> Result<()> {
    println!("{}", serde_json::to_string(value)?);
    Ok(())
}

pub fn short_id(id: &str) -> &str {
    &id[..id.len().min(8)]
}

pub fn truncate_title(title: &str, max_len: usize) -> String {
    if title.chars().count() > max_len {
        let truncated: String = title.chars().take(max_len.saturating_sub(3)).collect();
        format!("{}...", truncated)
    } else {
        title.to_string()
    }
}

fn state_badge(state: StackState) -> String {
    match state {
        StackState::Active => "active".green().to_string(),
        StackState::Completed => "completed".blue().to_string(),
        StackState::Archived => "archived".yellow().to_string(),
    }
}

fn checkbox(task: &Task) -> &'static str {
    if task.is_completed() { "[x]" } else { "[ ]" }
}

fn task_line(task: &Task) -> String {
    let mut line = format!("{} {} {}", checkbox(task), short_id(&task.id).dimmed(), task.title);
    if let Some(p) = task.priority {
        line.push_str(&format!(" !{p}"));
    }
    if let Some(ref c) = task.category {
        line.push_str(&format!(" ({c})"));
    }
    if let Some(due) = task.due_date {
        line.push_str(&format!(" due {due}"));
    }
    if !task.tags.is_empty() {
        let names: Vec<String> = task.tags.iter().map(|t| format!("#{}", t.name)).collect();
        line.push_str(&format!(" {}", names.join(" ").cyan()));
    }
    line
}

fn print_stack_pretty(view: &StackView) {
    println!(
        "[{}] {} ({}) {}/{} done",
        short_id(&view.stack.id),
        view.stack.title.bold(),
        state_badge(view.state),
        view.progress.completed,
        view.progress.total
    );
    for task in &view.tasks {
        println!("  {}", task_line(task));
    }
}

fn print_stack_minimal(view: &StackView) {
    println!(
        "{:8} {:24} {:9} {:>3}/{:<3}",
        short_id(&view.stack.id),
        truncate_title(&view.stack.title, 24),
        view.state.to_string(),
        view.progress.completed,
        view.progress.total
    );
}

pub fn print_stack(view: &StackView, format: Format) -> Result<()> {
    match format {
        Format::Json => print_json(view)?,
        Format::Pretty => print_stack_pretty(view),
        Format::Minimal => print_stack_minimal(view),
    }
    Ok(())
}

pub fn print_stacks(views: &[StackView], format: Format) -> Result<()> {
    match format {
        Format::Json => print_json(views)?,
        Format::Pretty => {
            for view in views {
                print_stack_pretty(view);
                println!();
            }
        }
        Format::Minimal => {
            println!("{:8} {:24} {:9} {:>7}", "ID", "TITLE", "STATE", "DONE");
            println!("{}", "-".repeat(52));
            for view in views {
                print_stack_minimal(view);
            }
        }
    }
    Ok(())
}

pub fn print_history(page: &HistoryPage, format: Format) -> Result<()> {
    match format {
        Format::Json => print_json(page)?,
        _ => {
            let pages = page.total.div_ceil(page.page_size).max(1);
            println!("page {} of {} ({} archived)", page.page, pages, page.total);
            print_stacks(&page.stacks, format)?;
        }
    }
    Ok(())
}

pub fn print_task(task: &Task, format: Format) -> Result<()> {
    match format {
        Format::Json => print_json(task)?,
        Format::Pretty => {
            println!("{}", task_line(task));
            if let Some(ref desc) = task.description {
                println!("  {}", desc);
            }
            println!("  stack: {} | position: {}", short_id(&task.stack_id), task.position);
        }
        Format::Minimal => println!(
            "{:8} {} {}",
            short_id(&task.id),
            checkbox(task),
            truncate_title(&task.title, 40)
        ),
    }
    Ok(())
}

pub fn print_task_change(change: &TaskChange, format: Format) -> Result<()> {
    match format {
        Format::Json => print_json(change)?,
        _ => {
            print_task(&change.task, format)?;
            for stack in &change.archived_stacks {
                println!("{} stack {} archived", "✓".green(), short_id(stack));
            }
        }
    }
    Ok(())
}

pub fn print_search(hits: &[SearchHit], format: Format) -> Result<()> {
    match format {
        Format::Json => print_json(hits)?,
        _ => {
            for hit in hits {
                println!("{}  [{}]", task_line(&hit.task), hit.stack_title.dimmed());
            }
        }
    }
    Ok(())
}

pub fn print_tag(tag: &Tag, format: Format) -> Result<()> {
    print_tags(std::slice::from_ref(tag), format)
}

pub fn print_tags(tags: &[Tag], format: Format) -> Result<()> {
    match format {
        Format::Json => print_json(tags)?,
        _ => {
            for tag in tags {
                println!("{:8} {} {}", short_id(&tag.id), tag.color, tag.name);
            }
        }
    }
    Ok(())
}

fn event_line(event: &Event) -> String {
    let when = match event.time {
        Some(t) => format!("{} {}", event.date, t.format("%H:%M")),
        None => format!("{}      ", event.date),
    };
    let done = if event.completed_at.is_some() { "[x]" } else { "[ ]" };
    format!(
        "{} {} {} {:8} {}",
        done,
        short_id(&event.id).dimmed(),
        when,
        event.kind.to_string(),
        event.title
    )
}

pub fn print_event(event: &Event, format: Format) -> Result<()> {
    match format {
        Format::Json => print_json(event)?,
        _ => {
            println!("{}", event_line(event));
            if format == Format::Pretty {
                if let Some(ref desc) = event.description {
                    println!("  {}", desc);
                }
            }
        }
    }
    Ok(())
}

pub fn print_events(events: &[Event], format: Format) -> Result<()> {
    match format {
        Format::Json => print_json(events)?,
        _ => {
            for event in events {
                println!("{}", event_line(event));
            }
        }
    }
    Ok(())
}

pub fn print_month(view: &MonthView, format: Format) -> Result<()> {
    match format {
        Format::Json => print_json(view)?,
        _ => {
            let title = view
                .first_day()
                .map(|d| d.format("%B %Y").to_string())
                .unwrap_or_default();
            println!("{:^28}", title.bold());
            println!(" Mo  Tu  We  Th  Fr  Sa  Su");
            for week in &view.weeks {
                let cells: Vec<String> = week
                    .iter()
                    .map(|day| {
                        let marker = if day.events.is_empty() { ' ' } else { '*' };
                        let cell = format!("{:>3}{}", day.date.format("%-d"), marker);
                        if day.today {
                            cell.reversed().to_string()
                        } else if !day.in_month {
                            cell.dimmed().to_string()
                        } else {
                            cell
                        }
                    })
                    .collect();
                println!("{}", cells.join(""));
            }
            if format == Format::Pretty {
                for day in view.weeks.iter().flatten().filter(|d| d.in_month) {
                    for event in &day.events {
                        println!("{}", event_line(event));
                    }
                }
            }
        }
    }
    Ok(())
}

pub fn print_insights(report: &InsightsReport, format: Format) -> Result<()> {
    match format {
        Format::Json => print_json(report)?,
        _ => {
            let s = &report.summary;
            println!("{}", "Summary".bold());
            println!(
                "  stacks: {} ({} active, {} completed, {} archived)",
                s.stacks, s.active_stacks, s.completed_stacks, s.archived_stacks
            );
            println!(
                "  tasks: {} ({} completed, {} overdue) | events today: {}",
                s.tasks, s.completed_tasks, s.overdue_tasks, s.events_today
            );
            println!("{}", "Weekly activity".bold());
            for day in &report.weekly {
                println!("  {} {:>3} done {:>3} pending", day.label, day.completed, day.pending);
            }
            println!("{}", "Categories".bold());
            for c in &report.categories {
                println!("  {:16} {:>4} {:>5.1}%", c.name, c.count, c.percent);
            }
            println!("{}", "Monthly trends".bold());
            for m in &report.monthly {
                println!("  {} {:>4} tasks {:>5.1}% complete", m.month, m.tasks, m.completion);
            }
            println!("{}", "Priorities".bold());
            for p in &report.priorities {
                println!("  {:8} {:>3}/{:<3}", p.name, p.completed, p.total);
            }
        }
    }
    Ok(())
}

pub fn print_feed(value: &Value, format: Format) -> Result<()> {
    match format {
        Format::Pretty => println!("{}", serde_json::to_string_pretty(value)?),
        _ => print_json(value)?,
    }
    Ok(())
}
