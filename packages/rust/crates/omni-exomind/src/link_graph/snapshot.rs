//! Snapshot persistence (single pretty-printed JSON document).

use super::models::LinkGraphSnapshot;
use crate::error::{ExomindError, ExomindResult};
use std::fs;
use std::path::Path;

/// Write `graph` to `path`, creating parent directories.
///
/// # Errors
///
/// Returns I/O errors from directory creation or the write, and
/// serialization errors.
pub fn write_snapshot(graph: &LinkGraphSnapshot, path: &Path) -> ExomindResult<()> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent).map_err(|source| ExomindError::io(parent, source))?;
    }
    let rendered = serde_json::to_string_pretty(graph)?;
    fs::write(path, rendered).map_err(|source| ExomindError::io(path, source))
}

/// Load a snapshot written by the index operation.
///
/// # Errors
///
/// Returns [`ExomindError::GraphNotFound`] when `path` does not exist and
/// [`ExomindError::GraphParse`] when it is not a snapshot document.
pub fn load_snapshot(path: &Path) -> ExomindResult<LinkGraphSnapshot> {
    if !path.is_file() {
        return Err(ExomindError::GraphNotFound(path.to_path_buf()));
    }
    let data = fs::read_to_string(path).map_err(|source| ExomindError::io(path, source))?;
    serde_json::from_str(&data).map_err(|source| ExomindError::GraphParse {
        path: path.to_path_buf(),
        source,
    })
}
