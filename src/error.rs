use thiserror::Error;

#[derive(Debug, Error)]
pub enum TaskflowError {
    #[error("not a taskflow workspace (run `taskflow init` first)")]
    NotInitialized,

    #[error("taskflow already initialized in this directory")]
    AlreadyInitialized,

    #[error("not logged in (run `taskflow login <user>` or set TASKFLOW_USER)")]
    NotAuthenticated,

    #[error("invalid user id '{0}': use ASCII letters, digits, '-', '_', '.' or '@'")]
    InvalidUser(String),

    #[error("invalid id '{0}': {1}")]
    InvalidId(String, String),

    #[error("id prefix '{0}' is ambiguous; matches: {1}")]
    IdAmbiguous(String, String),

    #[error("stack {0} not found")]
    StackNotFound(String),

    #[error("task {0} not found")]
    TaskNotFound(String),

    #[error("tag {0} not found")]
    TagNotFound(String),

    #[error("event {0} not found")]
    EventNotFound(String),

    #[error("title cannot be empty")]
    EmptyTitle,

    #[error("stack {0} is archived; restore it first")]
    StackArchived(String),

    #[error("invalid stack transition: {0} -> {1}")]
    InvalidTransition(String, String),

    #[error("a tag named '{0}' already exists")]
    TagExists(String),

    #[error("invalid color '{0}': expected #rrggbb")]
    InvalidColor(String),

    #[error("invalid value for {0}: {1}")]
    InvalidArgument(String, String),

    #[error("missing required argument: {0}")]
    MissingArgument(String),

    #[error("{0} is not configured")]
    MissingApiKey(String),

    #[error("feed error: {0}")]
    Feed(String),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("config error: {0}")]
    Config(#[from] serde_yaml::Error),

    #[error("database error: {0}")]
    Db(#[from] rusqlite::Error),

    #[error("http error: {0}")]
    Http(#[from] reqwest::Error),
}

impl TaskflowError {
    pub fn code(&self) -> &'static str {
        match self {
            Self::NotInitialized => "not_initialized",
            Self::AlreadyInitialized => "already_initialized",
            Self::NotAuthenticated => "not_authenticated",
            Self::InvalidUser(_) => "invalid_user",
            Self::InvalidId(_, _) => "invalid_id",
            Self::IdAmbiguous(_, _) => "id_ambiguous",
            Self::StackNotFound(_) => "stack_not_found",
            Self::TaskNotFound(_) => "task_not_found",
            Self::TagNotFound(_) => "tag_not_found",
            Self::EventNotFound(_) => "event_not_found",
            Self::EmptyTitle => "empty_title",
            Self::StackArchived(_) => "stack_archived",
            Self::InvalidTransition(_, _) => "invalid_transition",
            Self::TagExists(_) => "tag_exists",
            Self::InvalidColor(_) => "invalid_color",
            Self::InvalidArgument(_, _) => "invalid_argument",
            Self::MissingArgument(_) => "missing_argument",
            Self::MissingApiKey(_) => "missing_api_key",
            Self::Feed(_) => "feed_error",
            Self::Io(_) => "io_error",
            Self::Json(_) => "json_error",
            Self::Config(_) => "config_error",
            Self::Db(_) => "db_error",
            Self::Http(_) => "http_error",
        }
    }
}

pub type Result<T> = std::result::Result<T, TaskflowError>;
