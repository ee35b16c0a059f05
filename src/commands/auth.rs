use std::path::Path;

use serde_json::json;
use tracing::info;

use crate::config::Config;
use crate::error::{Result, TaskflowError};
use crate::output::{self, Format};
use crate::store::repo::{Repo, WORKSPACE_DIR};
use crate::user;

fn workspace_dir(root: &Path) -> Result<std::path::PathBuf> {
    let dir = root.join(WORKSPACE_DIR);
    if !dir.is_dir() {
        return Err(TaskflowError::NotInitialized);
    }
    Ok(dir)
}

/// Record `name` as the logged-in user for this workspace.
pub fn login(root: &Path, name: &str, format: Format) -> Result<()> {
    let name = name.trim();
    user::validate_user(name)?;
    let dir = workspace_dir(root)?;
    let mut config = Config::load(&dir)?;
    config.user = Some(name.to_string());
    config.save(&dir)?;
    info!(user = name, "logged in");
    match format {
        Format::Json => output::print_json(&json!({ "user": name }))?,
        _ => println!("Logged in as {name}"),
    }
    Ok(())
}

pub fn logout(root: &Path, format: Format) -> Result<()> {
    let dir = workspace_dir(root)?;
    let mut config = Config::load(&dir)?;
    let previous = config.user.take();
    config.save(&dir)?;
    match format {
        Format::Json => output::print_json(&json!({ "logged_out": previous }))?,
        _ => match previous {
            Some(name) => println!("Logged out {name}"),
            None => println!("Not logged in"),
        },
    }
    Ok(())
}

pub fn whoami(repo: &Repo, format: Format) -> Result<()> {
    match format {
        Format::Json => output::print_json(&json!({ "user": repo.user }))?,
        _ => println!("{}", repo.user),
    }
    Ok(())
}
