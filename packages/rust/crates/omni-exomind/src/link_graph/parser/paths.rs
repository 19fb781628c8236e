use std::path::Path;

pub(crate) fn normalize_slashes(raw: &str) -> String {
    raw.replace('\\', "/")
}

/// Whether the file is a markdown note (`.md`, any case).
#[must_use]
pub fn is_supported_note(path: &Path) -> bool {
    path.extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
}

/// Root-relative note id with `/` separators (extension kept).
pub(crate) fn relative_note_id(path: &Path, root: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let joined = rel
        .iter()
        .map(|segment| segment.to_string_lossy())
        .collect::<Vec<_>>()
        .join("/");
    let out = normalize_slashes(&joined);
    if out.is_empty() { None } else { Some(out) }
}

pub(crate) fn note_stem(path: &Path) -> String {
    path.file_stem()
        .map(|stem| stem.to_string_lossy().to_string())
        .unwrap_or_default()
}

/// Resolver key for a raw link target: last `/` segment, lowercased.
///
/// Directory qualification inside the brackets is ignored, so
/// `[[a/Topic]]` and `[[b/topic]]` resolve identically.
#[must_use]
pub fn link_stem_key(raw_target: &str) -> String {
    let trimmed = raw_target.trim_end_matches('/');
    let last = trimmed.rsplit('/').next().unwrap_or(trimmed);
    last.to_lowercase()
}
