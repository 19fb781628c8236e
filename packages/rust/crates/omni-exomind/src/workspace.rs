//! Notes workspace scaffolding (`exom init`).

use crate::error::{ExomindError, ExomindResult};
use std::fs;
use std::path::{Path, PathBuf};

const NEURAL_DIRS: &[&str] = &[".neural/cache", ".neural/exports"];

/// Expand a leading `~` and resolve against the current directory when relative.
#[must_use]
pub fn absolute_path(path: &Path) -> PathBuf {
    let expanded = match (path.strip_prefix("~"), std::env::var_os("HOME")) {
        (Ok(rest), Some(home)) => PathBuf::from(home).join(rest),
        _ => path.to_path_buf(),
    };
    if expanded.is_absolute() {
        expanded
    } else {
        std::env::current_dir()
            .unwrap_or_else(|_| PathBuf::from("."))
            .join(expanded)
    }
}

/// Create the category directories and `.neural` cache folders under `root`.
///
/// Idempotent; returns every directory ensured, in creation order.
///
/// # Errors
///
/// Returns an I/O error naming the directory that could not be created.
pub fn init_workspace(root: &Path, note_dirs: &[String]) -> ExomindResult<Vec<PathBuf>> {
    let targets: Vec<PathBuf> = note_dirs
        .iter()
        .map(String::as_str)
        .chain(NEURAL_DIRS.iter().copied())
        .map(|dir| root.join(dir))
        .collect();
    for target in &targets {
        fs::create_dir_all(target).map_err(|source| ExomindError::io(target, source))?;
    }
    tracing::info!(root = %root.display(), dirs = targets.len(), "workspace initialized");
    Ok(targets)
}
