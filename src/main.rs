use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use taskflow::config::Config;
use taskflow::error::{Result, TaskflowError};
use taskflow::model::{EventKind, Priority};
use taskflow::output::Format;
use taskflow::store::events::{EventPatch, NewEvent};
use taskflow::store::repo::{self, Repo, WORKSPACE_DIR};
use taskflow::store::tasks::{NewTask, TaskPatch};
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

#[derive(Parser)]
#[command(
    name = "taskflow",
    version,
    about = "Task stacks, calendar events and productivity feeds"
)]
struct Cli {
    /// Output format
    #[arg(long, global = true, value_enum, default_value = "json")]
    format: Format,
    /// Shorthand for --format pretty
    #[arg(long, global = true, hide = true)]
    pretty: bool,
    /// Act as this user (default: $TASKFLOW_USER, then the logged-in user)
    #[arg(long, global = true)]
    user: Option<String>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new .taskflow/ workspace in the current directory
    Init,
    /// Log in as a user for this workspace
    Login {
        /// User id
        #[arg(value_name = "USER")]
        name: String,
    },
    /// Forget the logged-in user
    Logout,
    /// Current weather at a coordinate
    Weather {
        /// Latitude (default: config weather.lat)
        #[arg(long, allow_hyphen_values = true)]
        lat: Option<f64>,
        /// Longitude (default: config weather.lon)
        #[arg(long, allow_hyphen_values = true)]
        lon: Option<f64>,
    },
    /// Top technology headlines
    News,
    /// Job board listings
    Jobs,
    #[command(flatten)]
    User(UserCommand),
}

/// Commands that act on the resolved user's data.
#[derive(Subcommand)]
enum UserCommand {
    /// Print the acting user
    Whoami,
    /// Manage stacks (task lists)
    Stack {
        #[command(subcommand)]
        action: StackAction,
    },
    /// Manage tasks within stacks
    Task {
        #[command(subcommand)]
        action: TaskAction,
    },
    /// Manage tags
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },
    /// Manage calendar events
    Event {
        #[command(subcommand)]
        action: EventAction,
    },
    /// Show a month calendar with events
    Calendar {
        /// Month as YYYY-MM (default: current month)
        month: Option<String>,
    },
    /// Search tasks by title or description
    Search {
        /// Text to look for (case-insensitive)
        query: String,
        /// Maximum number of results
        #[arg(long)]
        limit: Option<usize>,
    },
    /// Productivity insights computed from your tasks
    Insights {
        /// Number of months in the monthly trend (1 to 120)
        #[arg(long, default_value_t = 6)]
        months: u32,
    },
}

#[derive(Subcommand)]
enum StackAction {
    /// Create a stack
    Create {
        /// Stack title
        title: String,
    },
    /// List stacks with their tasks
    List {
        /// Include archived and completed stacks
        #[arg(long)]
        all: bool,
    },
    /// Display a single stack
    Show { id: String },
    /// Rename a stack
    Rename { id: String, title: String },
    /// Archive an active stack
    Archive { id: String },
    /// Restore an archived or completed stack
    Restore { id: String },
    /// Delete a stack and its tasks
    Delete { id: String },
    /// Archived stacks, most recent first
    History {
        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Stacks per page (default: config history_page_size)
        #[arg(long)]
        page_size: Option<usize>,
    },
}

#[derive(Subcommand)]
enum TaskAction {
    /// Add a task to the end of a stack
    Add {
        /// Stack ID
        stack: String,
        /// Task title
        title: String,
        /// Task description
        #[arg(long, short)]
        description: Option<String>,
        /// Category
        #[arg(long)]
        category: Option<String>,
        /// Priority
        #[arg(long, value_enum)]
        priority: Option<Priority>,
        /// Due date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        due: Option<NaiveDate>,
    },
    /// Display a single task
    Show { id: String },
    /// Flip a task between done and not done
    Toggle { id: String },
    /// Mark a task done
    Done { id: String },
    /// Mark a task not done
    Reopen { id: String },
    /// Edit task fields
    Edit {
        id: String,
        /// New title
        #[arg(long)]
        title: Option<String>,
        /// New description (empty clears)
        #[arg(long, short)]
        description: Option<String>,
        /// New category (empty clears)
        #[arg(long)]
        category: Option<String>,
        /// Set priority
        #[arg(long, value_enum, conflicts_with = "clear_priority")]
        priority: Option<Priority>,
        /// Remove the priority
        #[arg(long)]
        clear_priority: bool,
        /// Set due date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date, conflicts_with = "clear_due")]
        due: Option<NaiveDate>,
        /// Remove the due date
        #[arg(long)]
        clear_due: bool,
    },
    /// Delete a task
    Delete { id: String },
    /// Move a task to a position, optionally into another stack
    Move {
        id: String,
        /// Target position (0-based, clamped to the stack length)
        #[arg(long, default_value_t = 0)]
        position: usize,
        /// Target stack ID
        #[arg(long)]
        to: Option<String>,
    },
    /// Replace a task's tags (names or IDs, comma-separated; empty clears)
    Tag {
        id: String,
        #[arg(value_delimiter = ',')]
        tags: Vec<String>,
    },
}

#[derive(Subcommand)]
enum TagAction {
    /// Create a tag
    Create {
        name: String,
        /// Color as #rrggbb
        #[arg(long)]
        color: Option<String>,
    },
    /// List tags
    List,
    /// Delete a tag (by name or ID)
    Delete { tag: String },
}

#[derive(Subcommand)]
enum EventAction {
    /// Add a calendar event
    Add {
        title: String,
        /// Date (YYYY-MM-DD)
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
        /// Time (HH:MM)
        #[arg(long, value_parser = parse_time)]
        time: Option<NaiveTime>,
        /// Event kind
        #[arg(long, value_enum, default_value = "task")]
        kind: EventKind,
        /// Description
        #[arg(long, short)]
        description: Option<String>,
    },
    /// List events, optionally within a date range
    List {
        /// First date (inclusive)
        #[arg(long, value_parser = parse_date)]
        from: Option<NaiveDate>,
        /// Last date (inclusive)
        #[arg(long, value_parser = parse_date)]
        to: Option<NaiveDate>,
    },
    /// Incomplete events in the coming days
    Upcoming {
        #[arg(long, default_value_t = 7)]
        days: u32,
    },
    /// Display a single event
    Show { id: String },
    /// Edit event fields
    Edit {
        id: String,
        #[arg(long)]
        title: Option<String>,
        #[arg(long, short)]
        description: Option<String>,
        #[arg(long, value_parser = parse_date)]
        date: Option<NaiveDate>,
        #[arg(long, value_parser = parse_time, conflicts_with = "clear_time")]
        time: Option<NaiveTime>,
        /// Make the event all-day
        #[arg(long)]
        clear_time: bool,
        #[arg(long, value_enum)]
        kind: Option<EventKind>,
    },
    /// Flip an event between done and not done
    Toggle { id: String },
    /// Delete an event
    Delete { id: String },
}

fn parse_date(raw: &str) -> std::result::Result<NaiveDate, String> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").map_err(|e| format!("expected YYYY-MM-DD: {e}"))
}

fn parse_time(raw: &str) -> std::result::Result<NaiveTime, String> {
    NaiveTime::parse_from_str(raw.trim(), "%H:%M").map_err(|e| format!("expected HH:MM: {e}"))
}

fn init_tracing() {
    // Opt-in via TASKFLOW_LOG, then RUST_LOG; ignore invalid or oversized filters.
    let filter = ["TASKFLOW_LOG", "RUST_LOG"]
        .iter()
        .find_map(|var| {
            let raw = std::env::var(var).ok()?;
            let raw = raw.trim();
            if raw.is_empty() || raw.len() > 4096 {
                return None;
            }
            EnvFilter::try_new(raw).ok()
        })
        .unwrap_or_else(|| EnvFilter::new("off"));

    tracing_subscriber::registry()
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(filter)
        .init();
}

fn run(cli: Cli, format: Format) -> Result<()> {
    use taskflow::commands::{auth, feeds, init};

    match cli.command {
        Commands::Init => init::run(&std::env::current_dir()?),
        Commands::Login { name } => auth::login(&repo::find_root()?, &name, format),
        Commands::Logout => auth::logout(&repo::find_root()?, format),
        Commands::Weather { lat, lon } => feeds::weather(&load_config()?, lat, lon, format),
        Commands::News => feeds::news(&load_config()?, format),
        Commands::Jobs => feeds::jobs(&load_config()?, format),
        Commands::User(command) => {
            let root = repo::find_root()?;
            let repo = Repo::open(&root, cli.user.as_deref())?;
            run_user(&repo, command, format)
        }
    }
}

/// Feeds need no user, and outside a workspace they run on defaults.
fn load_config() -> Result<Config> {
    match repo::find_root() {
        Ok(root) => Config::load(&root.join(WORKSPACE_DIR)),
        Err(TaskflowError::NotInitialized) => Ok(Config::default()),
        Err(e) => Err(e),
    }
}

fn run_user(repo: &Repo, command: UserCommand, format: Format) -> Result<()> {
    use taskflow::commands::{auth, calendar, event, insights, search, stack, tag, task};

    match command {
        UserCommand::Whoami => auth::whoami(repo, format),
        UserCommand::Stack { action } => match action {
            StackAction::Create { title } => stack::create(repo, &title, format),
            StackAction::List { all } => stack::list(repo, all, format),
            StackAction::Show { id } => stack::show(repo, &id, format),
            StackAction::Rename { id, title } => stack::rename(repo, &id, &title, format),
            StackAction::Archive { id } => stack::archive(repo, &id, format),
            StackAction::Restore { id } => stack::restore(repo, &id, format),
            StackAction::Delete { id } => stack::delete(repo, &id, format),
            StackAction::History { page, page_size } => {
                stack::history(repo, page, page_size, format)
            }
        },
        UserCommand::Task { action } => match action {
            TaskAction::Add {
                stack,
                title,
                description,
                category,
                priority,
                due,
            } => task::add(
                repo,
                &stack,
                NewTask {
                    title,
                    description,
                    category,
                    priority,
                    due_date: due,
                },
                format,
            ),
            TaskAction::Show { id } => task::show(repo, &id, format),
            TaskAction::Toggle { id } => task::toggle(repo, &id, format),
            TaskAction::Done { id } => task::set_completed(repo, &id, true, format),
            TaskAction::Reopen { id } => task::set_completed(repo, &id, false, format),
            TaskAction::Edit {
                id,
                title,
                description,
                category,
                priority,
                clear_priority,
                due,
                clear_due,
            } => task::edit(
                repo,
                &id,
                TaskPatch {
                    title,
                    description,
                    category,
                    priority,
                    clear_priority,
                    due_date: due,
                    clear_due,
                },
                format,
            ),
            TaskAction::Delete { id } => task::delete(repo, &id, format),
            TaskAction::Move { id, position, to } => {
                task::move_to(repo, &id, position, to.as_deref(), format)
            }
            TaskAction::Tag { id, tags } => task::tag(repo, &id, &tags, format),
        },
        UserCommand::Tag { action } => match action {
            TagAction::Create { name, color } => tag::create(repo, &name, color.as_deref(), format),
            TagAction::List => tag::list(repo, format),
            TagAction::Delete { tag: name } => tag::delete(repo, &name, format),
        },
        UserCommand::Event { action } => match action {
            EventAction::Add {
                title,
                date,
                time,
                kind,
                description,
            } => event::add(
                repo,
                NewEvent {
                    title,
                    description,
                    date,
                    time,
                    kind,
                },
                format,
            ),
            EventAction::List { from, to } => event::list(repo, from, to, format),
            EventAction::Upcoming { days } => event::upcoming(repo, days, format),
            EventAction::Show { id } => event::show(repo, &id, format),
            EventAction::Edit {
                id,
                title,
                description,
                date,
                time,
                clear_time,
                kind,
            } => event::edit(
                repo,
                &id,
                EventPatch {
                    title,
                    description,
                    date,
                    time,
                    clear_time,
                    kind,
                },
                format,
            ),
            EventAction::Toggle { id } => event::toggle(repo, &id, format),
            EventAction::Delete { id } => event::delete(repo, &id, format),
        },
        UserCommand::Calendar { month } => calendar::month(repo, month.as_deref(), format),
        UserCommand::Search { query, limit } => search::run(repo, &query, limit, format),
        UserCommand::Insights { months } => insights::run(repo, months, format),
    }
}

fn main() {
    init_tracing();
    let cli = Cli::parse();
    let format = if cli.pretty {
        Format::Pretty
    } else {
        cli.format
    };
    if let Err(e) = run(cli, format) {
        match format {
            Format::Json => {
                eprintln!(
                    "{}",
                    serde_json::json!({
                        "error": e.code(),
                        "message": e.to_string()
                    })
                );
            }
            _ => eprintln!("error: {e}"),
        }
        std::process::exit(1);
    }
}
