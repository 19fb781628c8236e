//! Inbox lifecycle: decay scoring, monthly consolidation, archival.
//!
//! All three modes act on `.md` files under `00_Inbox` (recursively) and
//! judge age by file modification time against the `now` passed in.

use crate::capture::INBOX_DIR;
use crate::error::{ExomindError, ExomindResult};
use crate::link_graph::{extract_title, read_note_text, relative_note_id};
use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Archive category.
pub const ARCHIVE_DIR: &str = "99_Archives";
/// Destination for archived inbox notes, relative to the notes root.
pub const ARCHIVE_INBOX_DIR: &str = "99_Archives/Inbox";
/// Notes younger than this many days are never decayed.
pub const DECAY_THRESHOLD_DAYS: f64 = 7.0;
/// Consolidation summarizes notes older than this many days.
pub const CONSOLIDATE_LOOKBACK_DAYS: i64 = 7;
/// Default archive age threshold.
pub const DEFAULT_ARCHIVE_AFTER_DAYS: u64 = 30;

const DECAY_HORIZON_DAYS: f64 = 90.0;
const SECONDS_PER_DAY: f64 = 86_400.0;
const METADATA_PREFIX: &str = "<!-- lifecycle";
const CONSOLIDATED_PREFIX: &str = "consolidated";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Lifecycle operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LifecycleMode {
    /// Stamp stale notes with a decay score.
    Decay,
    /// Write a monthly summary of stale notes.
    #[default]
    Consolidate,
    /// Move old notes to `99_Archives/Inbox`.
    Archive,
}

impl fmt::Display for LifecycleMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Decay => "decay",
            Self::Consolidate => "consolidate",
            Self::Archive => "archive",
        };
        f.write_str(label)
    }
}

/// Outcome of one lifecycle run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LifecycleReport {
    /// Mode that ran.
    pub mode: LifecycleMode,
    /// Inbox notes examined.
    pub processed: usize,
    /// Notes changed, summarized or moved.
    pub touched: usize,
    /// One human-readable line per affected note.
    pub details: Vec<String>,
    /// Summary file written by `consolidate`.
    pub summary_path: Option<String>,
}

/// Sorted `.md` files under `<notes_root>/00_Inbox`; empty when the inbox is absent.
#[must_use]
pub fn gather_inbox_notes(notes_root: &Path) -> Vec<PathBuf> {
    let inbox = notes_root.join(INBOX_DIR);
    if !inbox.is_dir() {
        return Vec::new();
    }
    let mut notes: Vec<PathBuf> = WalkDir::new(&inbox)
        .into_iter()
        .filter_map(Result::ok)
        .filter(|entry| entry.file_type().is_file())
        .map(walkdir::DirEntry::into_path)
        .filter(|path| {
            path.extension()
                .is_some_and(|ext| ext.eq_ignore_ascii_case("md"))
        })
        .collect();
    notes.sort();
    notes
}

/// Decay score for a note `age_days` old: linear over 90 days, capped at 1.
#[must_use]
pub fn decay_score(age_days: f64) -> f64 {
    (age_days / DECAY_HORIZON_DAYS).clamp(0.0, 1.0)
}

/// Replace any lifecycle comment in `note` with a fresh one.
///
/// Returns `false` without writing when the last lifecycle comment already
/// matches.
///
/// # Errors
///
/// Returns I/O errors naming `note`.
pub fn apply_decay_metadata(note: &Path, last_reviewed: NaiveDate, score: f64) -> ExomindResult<bool> {
    let content = fs::read_to_string(note).map_err(|source| ExomindError::io(note, source))?;
    let new_line = format!("<!-- lifecycle last_reviewed={last_reviewed} decay_score={score:.3} -->");
    let is_metadata = |line: &&str| line.trim_start().starts_with(METADATA_PREFIX);
    if content.lines().rev().find(is_metadata).map(str::trim) == Some(new_line.as_str()) {
        return Ok(false);
    }
    let mut rebuilt = content
        .lines()
        .filter(|line| !is_metadata(line))
        .collect::<Vec<_>>()
        .join("\n");
    if !rebuilt.is_empty() {
        rebuilt.push('\n');
    }
    rebuilt.push_str(&new_line);
    rebuilt.push('\n');
    fs::write(note, rebuilt).map_err(|source| ExomindError::io(note, source))?;
    Ok(true)
}

fn modified_at(path: &Path) -> ExomindResult<DateTime<Utc>> {
    let modified = fs::metadata(path)
        .and_then(|metadata| metadata.modified())
        .map_err(|source| ExomindError::io(path, source))?;
    Ok(DateTime::<Utc>::from(modified))
}

#[allow(clippy::cast_precision_loss)]
fn age_days(now: DateTime<Utc>, earlier: DateTime<Utc>) -> f64 {
    let seconds = (now - earlier).num_milliseconds().max(0) as f64 / 1_000.0;
    seconds / SECONDS_PER_DAY
}

fn note_id(path: &Path, notes_root: &Path) -> String {
    relative_note_id(path, notes_root).unwrap_or_else(|| path.display().to_string())
}

fn run_decay(notes_root: &Path, now: DateTime<Utc>) -> ExomindResult<LifecycleReport> {
    let notes = gather_inbox_notes(notes_root);
    let mut details = Vec::new();
    for note in &notes {
        let modified = modified_at(note)?;
        let age = age_days(now, modified);
        if age < DECAY_THRESHOLD_DAYS {
            continue;
        }
        let score = decay_score(age);
        if apply_decay_metadata(note, modified.date_naive(), score)? {
            details.push(format!("Marked {} decay_score={score:.3}", note_id(note, notes_root)));
        }
    }
    Ok(LifecycleReport {
        mode: LifecycleMode::Decay,
        processed: notes.len(),
        touched: details.len(),
        details,
        summary_path: None,
    })
}

fn run_consolidate(notes_root: &Path, now: DateTime<Utc>) -> ExomindResult<LifecycleReport> {
    let notes = gather_inbox_notes(notes_root);
    let cutoff = now - Duration::days(CONSOLIDATE_LOOKBACK_DAYS);
    let mut candidates = Vec::new();
    for note in &notes {
        let modified = modified_at(note)?;
        if modified < cutoff {
            let fallback = note
                .file_stem()
                .map_or_else(|| note.display().to_string(), |stem| stem.to_string_lossy().into_owned());
            let title = extract_title(&read_note_text(note), &fallback);
            candidates.push((note_id(note, notes_root), modified, title));
        }
    }

    let mut content = format!(
        "# Consolidated summary for {}\nGenerated: {}\n\n## Notes older than {CONSOLIDATE_LOOKBACK_DAYS} days\n\n",
        now.format("%B %Y"),
        now.format(TIMESTAMP_FORMAT),
    );
    if candidates.is_empty() {
        content.push_str("No eligible inbox notes.\n");
    }
    for (rel, modified, title) in &candidates {
        content.push_str(&format!("- {rel} | {} | {title}\n", modified.format(TIMESTAMP_FORMAT)));
    }

    let archive = notes_root.join(ARCHIVE_DIR);
    fs::create_dir_all(&archive).map_err(|source| ExomindError::io(&archive, source))?;
    let summary_path = archive.join(format!("{CONSOLIDATED_PREFIX}-{}.md", now.format("%Y-%m")));
    fs::write(&summary_path, content).map_err(|source| ExomindError::io(&summary_path, source))?;
    tracing::info!(summary = %summary_path.display(), notes = candidates.len(), "inbox consolidated");

    Ok(LifecycleReport {
        mode: LifecycleMode::Consolidate,
        processed: notes.len(),
        touched: candidates.len(),
        details: candidates
            .iter()
            .map(|(rel, _, _)| format!("Summarized {rel}"))
            .collect(),
        summary_path: Some(summary_path.display().to_string()),
    })
}

fn run_archive(
    notes_root: &Path,
    older_than_days: u64,
    now: DateTime<Utc>,
) -> ExomindResult<LifecycleReport> {
    let notes = gather_inbox_notes(notes_root);
    let cutoff = i64::try_from(older_than_days)
        .ok()
        .and_then(Duration::try_days)
        .and_then(|lookback| now.checked_sub_signed(lookback))
        .unwrap_or(DateTime::<Utc>::MIN_UTC);
    let inbox_root = notes_root.join(INBOX_DIR);
    let archive_root = notes_root.join(ARCHIVE_INBOX_DIR);

    let mut details = Vec::new();
    let mut moved = 0;
    for note in &notes {
        if modified_at(note)? > cutoff {
            continue;
        }
        let rel = note_id(note, notes_root);
        let target = archive_root.join(note.strip_prefix(&inbox_root).unwrap_or(note));
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| ExomindError::io(parent, source))?;
        }
        if target.exists() {
            tracing::warn!(note = %rel, "archive target exists; skipped");
            details.push(format!("Skipped exists {rel}"));
            continue;
        }
        fs::rename(note, &target).map_err(|source| ExomindError::io(note, source))?;
        moved += 1;
        details.push(format!("Moved {rel} -> {}", note_id(&target, notes_root)));
    }

    Ok(LifecycleReport {
        mode: LifecycleMode::Archive,
        processed: notes.len(),
        touched: moved,
        details,
        summary_path: None,
    })
}

/// Run one lifecycle `mode` over the inbox as of `now`.
///
/// `older_than_days` applies to [`LifecycleMode::Archive`] only.
///
/// # Errors
///
/// Returns I/O errors naming the note or summary file involved.
pub fn run_lifecycle(
    notes_root: &Path,
    mode: LifecycleMode,
    older_than_days: u64,
    now: DateTime<Utc>,
) -> ExomindResult<LifecycleReport> {
    match mode {
        LifecycleMode::Decay => run_decay(notes_root, now),
        LifecycleMode::Consolidate => run_consolidate(notes_root, now),
        LifecycleMode::Archive => run_archive(notes_root, older_than_days, now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn write_note(root: &Path, rel: &str, content: &str) -> Result<PathBuf, Box<dyn std::error::Error>> {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, content)?;
        Ok(path)
    }

    #[test]
    fn test_decay_score_bounds() {
        assert!(decay_score(0.0).abs() < 1e-12);
        assert!((decay_score(45.0) - 0.5).abs() < 1e-9);
        assert!((decay_score(200.0) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_mode_labels() -> Result<(), Box<dyn std::error::Error>> {
        assert_eq!(LifecycleMode::default(), LifecycleMode::Consolidate);
        assert_eq!(LifecycleMode::Archive.to_string(), "archive");
        assert_eq!(serde_json::to_string(&LifecycleMode::Decay)?, "\"decay\"");
        Ok(())
    }

    #[test]
    fn test_gather_inbox_notes_is_recursive_and_sorted() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = TempDir::new()?;
        write_note(tmp.path(), "00_Inbox/b.md", "")?;
        write_note(tmp.path(), "00_Inbox/sub/a.MD", "")?;
        write_note(tmp.path(), "00_Inbox/a.md", "")?;
        write_note(tmp.path(), "00_Inbox/skip.txt", "")?;
        write_note(tmp.path(), "10_Projects/p.md", "")?;
        let rels: Vec<String> = gather_inbox_notes(tmp.path())
            .iter()
            .map(|path| note_id(path, tmp.path()))
            .collect();
        assert_eq!(rels, vec!["00_Inbox/a.md", "00_Inbox/b.md", "00_Inbox/sub/a.MD"]);
        assert!(gather_inbox_notes(&tmp.path().join("missing")).is_empty());
        Ok(())
    }

    #[test]
    fn test_apply_decay_metadata_replaces_and_is_idempotent() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = TempDir::new()?;
        let note = write_note(
            tmp.path(),
            "n.md",
            "# N\n<!-- lifecycle last_reviewed=2020-01-01 decay_score=0.100 -->\nbody",
        )?;
        let day = NaiveDate::from_ymd_opt(2025, 1, 2).ok_or("bad date")?;
        assert!(apply_decay_metadata(&note, day, 0.5)?);
        assert_eq!(
            fs::read_to_string(&note)?,
            "# N\nbody\n<!-- lifecycle last_reviewed=2025-01-02 decay_score=0.500 -->\n"
        );
        assert!(!apply_decay_metadata(&note, day, 0.5)?);
        Ok(())
    }

    #[test]
    fn test_decay_skips_recent_notes() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = TempDir::new()?;
        write_note(tmp.path(), "00_Inbox/fresh.md", "# Fresh\n")?;
        let report = run_lifecycle(tmp.path(), LifecycleMode::Decay, 30, Utc::now())?;
        assert_eq!(report.processed, 1);
        assert_eq!(report.touched, 0);
        assert_eq!(fs::read_to_string(tmp.path().join("00_Inbox/fresh.md"))?, "# Fresh\n");
        Ok(())
    }

    #[test]
    fn test_consolidate_without_candidates_still_writes_summary() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = TempDir::new()?;
        write_note(tmp.path(), "00_Inbox/fresh.md", "# Fresh\n")?;
        let report = run_lifecycle(tmp.path(), LifecycleMode::Consolidate, 30, Utc::now())?;
        assert_eq!(report.touched, 0);
        let summary = report.summary_path.ok_or("no summary path")?;
        let text = fs::read_to_string(summary)?;
        assert!(text.starts_with("# Consolidated summary for "));
        assert!(text.ends_with("## Notes older than 7 days\n\nNo eligible inbox notes.\n"));
        Ok(())
    }
}
