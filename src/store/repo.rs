use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::Config;
use crate::error::{Result, TaskflowError};
use crate::store::db::Db;
use crate::user;

pub const WORKSPACE_DIR: &str = ".taskflow";
pub const DB_FILE: &str = "taskflow.db";
pub const DB_ENV: &str = "TASKFLOW_DB";

/// Length of a canonical (uuid simple) id.
pub const ID_LEN: usize = 32;

/// Entity kinds addressable by id on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Stack,
    Task,
    Tag,
    Event,
}

impl Entity {
    fn not_found(self, raw: &str) -> TaskflowError {
        let raw = raw.to_string();
        match self {
            Self::Stack => TaskflowError::StackNotFound(raw),
            Self::Task => TaskflowError::TaskNotFound(raw),
            Self::Tag => TaskflowError::TagNotFound(raw),
            Self::Event => TaskflowError::EventNotFound(raw),
        }
    }
}

/// An opened workspace: its directory, configuration and database, plus the
/// user every operation is scoped to.
pub struct Repo {
    pub dir: PathBuf,
    pub config: Config,
    pub db: Db,
    pub user: String,
}

impl Repo {
    /// Create `.taskflow/` with a default config and an empty database.
    pub fn init(root: &Path) -> Result<PathBuf> {
        let dir = root.join(WORKSPACE_DIR);
        if dir.exists() {
            return Err(TaskflowError::AlreadyInitialized);
        }
        fs::create_dir_all(&dir)?;
        Config::default().save(&dir)?;
        Db::open(&db_path(&dir))?;
        info!(dir = %dir.display(), "initialized workspace");
        Ok(dir)
    }

    /// Open the workspace at `root` acting as the resolved user.
    pub fn open(root: &Path, user_flag: Option<&str>) -> Result<Self> {
        let dir = root.join(WORKSPACE_DIR);
        if !dir.is_dir() {
            return Err(TaskflowError::NotInitialized);
        }
        let config = Config::load(&dir)?;
        let user = user::resolve_user(user_flag, config.user.as_deref())?;
        let db = Db::open(&db_path(&dir))?.with_auto_archive(config.auto_archive);
        debug!(user = %user, "opened workspace");
        Ok(Self {
            dir,
            config,
            db,
            user,
        })
    }

    /// Resolve a user-supplied id (exact or unique prefix) for `entity`.
    pub fn resolve(&self, entity: Entity, input: &str) -> Result<String> {
        let existing = match entity {
            Entity::Stack => self.db.stack_ids(&self.user)?,
            Entity::Task => self.db.task_ids(&self.user)?,
            Entity::Tag => self.db.tag_ids(&self.user)?,
            Entity::Event => self.db.event_ids(&self.user)?,
        };
        resolve_id_input(entity, input, &existing)
    }

    pub fn resolve_opt(&self, entity: Entity, input: Option<&str>) -> Result<Option<String>> {
        input.map(|raw| self.resolve(entity, raw)).transpose()
    }

    /// Resolve a tag reference given either as an id/prefix or as its name.
    pub fn resolve_tag(&self, input: &str) -> Result<String> {
        if let Some(tag) = self.db.tag_by_name(&self.user, input)? {
            return Ok(tag.id);
        }
        self.resolve(Entity::Tag, input)
    }
}

fn db_path(dir: &Path) -> PathBuf {
    std::env::var(DB_ENV)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| dir.join(DB_FILE))
}

/// Shared exact-or-prefix resolver for id inputs.
pub fn resolve_id_input(entity: Entity, input: &str, existing: &[String]) -> Result<String> {
    let raw = input.trim();
    if raw.is_empty() {
        return Err(TaskflowError::InvalidId(
            input.to_string(),
            "id cannot be empty".into(),
        ));
    }
    if raw.len() > ID_LEN || !raw.bytes().all(|b| b.is_ascii_hexdigit()) {
        return Err(TaskflowError::InvalidId(
            raw.to_string(),
            format!("expected 1-{ID_LEN} hex characters"),
        ));
    }

    let prefix = raw.to_ascii_lowercase();
    if let Some(exact) = existing.iter().find(|id| **id == prefix) {
        return Ok(exact.clone());
    }

    let mut matches: Vec<&String> = existing
        .iter()
        .filter(|id| id.starts_with(&prefix))
        .collect();
    matches.sort();
    matches.dedup();

    match matches.len() {
        0 => Err(entity.not_found(raw)),
        1 => Ok(matches[0].clone()),
        _ => Err(TaskflowError::IdAmbiguous(
            raw.to_string(),
            matches
                .iter()
                .map(|id| id.as_str())
                .collect::<Vec<_>>()
                .join(", "),
        )),
    }
}

/// Walk up from the current directory to find the workspace root.
pub fn find_root() -> Result<PathBuf> {
    let mut dir = std::env::current_dir().map_err(TaskflowError::Io)?;
    loop {
        if dir.join(WORKSPACE_DIR).is_dir() {
            return Ok(dir);
        }
        if !dir.pop() {
            return Err(TaskflowError::NotInitialized);
        }
    }
}
