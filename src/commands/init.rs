use std::path::Path;

use crate::error::Result;
use crate::store::repo::Repo;

pub fn run(root: &Path) -> Result<()> {
    let dir = Repo::init(root)?;
    eprintln!("Initialized {} in {}", dir.display(), root.display());
    Ok(())
}
