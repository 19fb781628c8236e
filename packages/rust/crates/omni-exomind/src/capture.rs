//! Capture: append free text to a note, followed by a YAML block of the
//! typed relations found in it.
//!
//! A relation is written inline as `REL:TYPE(from -> to)[confidence]`.

use crate::error::{ExomindError, ExomindResult};
use crate::link_graph::{compile_regex, relative_note_id};
use chrono::{DateTime, Utc};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

/// Category receiving dated capture notes.
pub const INBOX_DIR: &str = "00_Inbox";

const CAPTURE_NOTE_HEADER: &str = "# Auto capture\n\n";
const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

static RELATION_REGEX: LazyLock<Regex> = LazyLock::new(|| {
    compile_regex(
        r"REL:([A-Za-z0-9_]+)\((?P<from>.+?)\s*->\s*(?P<to>.+?)\)\[(?P<confidence>[0-9.]+)\]",
    )
});

/// One `REL:TYPE(from -> to)[confidence]` occurrence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypedRelation {
    /// Relation type, e.g. `CAUSED_BY`.
    #[serde(rename = "type")]
    pub rel_type: String,
    /// Source entity.
    pub from: String,
    /// Target entity.
    pub to: String,
    /// Confidence; unparseable values read as `0.0`.
    pub confidence: f64,
}

/// Outcome of one capture.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CaptureReport {
    /// Note id relative to the notes root, or its display path when outside it.
    pub note: String,
    /// RFC 3339 capture time.
    pub appended_at: String,
    /// Number of relations recorded.
    pub relation_count: usize,
    /// Relations recorded, in textual order.
    pub relations: Vec<TypedRelation>,
}

fn trimmed<'h>(found: Option<regex::Match<'h>>) -> &'h str {
    found.map_or("", |m| m.as_str().trim())
}

/// Extract typed relations in textual order, skipping any with a blank field.
#[must_use]
pub fn parse_relations(text: &str) -> Vec<TypedRelation> {
    RELATION_REGEX
        .captures_iter(text)
        .filter_map(|caps| {
            let rel_type = trimmed(caps.get(1));
            let from = trimmed(caps.name("from"));
            let to = trimmed(caps.name("to"));
            if rel_type.is_empty() || from.is_empty() || to.is_empty() {
                return None;
            }
            let confidence = caps
                .name("confidence")
                .and_then(|m| m.as_str().parse::<f64>().ok())
                .unwrap_or(0.0);
            Some(TypedRelation {
                rel_type: rel_type.to_string(),
                from: from.to_string(),
                to: to.to_string(),
                confidence,
            })
        })
        .collect()
}

/// Render `relations:` as a YAML document body without the `---` marker.
///
/// # Errors
///
/// Returns [`ExomindError::Yaml`] when serialization fails.
pub fn relations_yaml(relations: &[TypedRelation]) -> ExomindResult<String> {
    #[derive(Serialize)]
    struct Block<'a> {
        relations: &'a [TypedRelation],
    }

    let raw = serde_yaml::to_string(&Block { relations })?;
    let body = raw.strip_prefix("---\n").unwrap_or(&raw);
    Ok(body.trim_end_matches('\n').to_string())
}

/// Target note: `out_note` (joined to `notes_root` when relative), else
/// `00_Inbox/<YYYY-MM-DD>-auto.md` for the day of `now`.
#[must_use]
pub fn capture_note_path(notes_root: &Path, out_note: Option<&Path>, now: DateTime<Utc>) -> PathBuf {
    match out_note {
        Some(path) if path.is_absolute() => path.to_path_buf(),
        Some(path) => notes_root.join(path),
        None => notes_root
            .join(INBOX_DIR)
            .join(format!("{}-auto.md", now.format("%Y-%m-%d"))),
    }
}

/// Append a `## Capture @<time>` section holding `input` and its relation
/// block to `target`, creating the note (with an `# Auto capture` heading)
/// when absent.
///
/// # Errors
///
/// Returns I/O errors naming `target`, or a YAML rendering error.
pub fn capture(
    notes_root: &Path,
    target: &Path,
    input: &str,
    now: DateTime<Utc>,
) -> ExomindResult<CaptureReport> {
    let body = input.trim_end();
    let relations = parse_relations(body);
    let entry = format!(
        "## Capture @{}\n\n{body}\n\n```yaml\n{}\n```\n\n",
        now.format(TIMESTAMP_FORMAT),
        relations_yaml(&relations)?
    );

    if let Some(parent) = target.parent() {
        fs::create_dir_all(parent).map_err(|source| ExomindError::io(parent, source))?;
    }
    let existing_len = match fs::metadata(target) {
        Ok(metadata) => Some(metadata.len()),
        Err(error) if error.kind() == std::io::ErrorKind::NotFound => None,
        Err(source) => return Err(ExomindError::io(target, source)),
    };
    let mut file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(target)
        .map_err(|source| ExomindError::io(target, source))?;
    let prefix = match existing_len {
        None => CAPTURE_NOTE_HEADER,
        Some(0) => "",
        Some(_) => "\n",
    };
    file.write_all(prefix.as_bytes())
        .and_then(|()| file.write_all(entry.as_bytes()))
        .map_err(|source| ExomindError::io(target, source))?;

    let note = relative_note_id(target, notes_root)
        .unwrap_or_else(|| target.display().to_string());
    tracing::info!(note = %note, relations = relations.len(), "capture appended");
    Ok(CaptureReport {
        note,
        appended_at: now.to_rfc3339(),
        relation_count: relations.len(),
        relations,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::TempDir;

    fn fixed_now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 4, 5, 6, 7)
            .single()
            .unwrap_or_else(Utc::now)
    }

    #[test]
    fn test_parse_relations_trims_and_reads_confidence() {
        let relations = parse_relations(
            "REL:CAUSED_BY(API Timeout->Latency Spike)[0.82] and REL:RELATED_TO( Demo -> Design )[1]",
        );
        assert_eq!(relations.len(), 2);
        assert_eq!(relations[0].rel_type, "CAUSED_BY");
        assert_eq!(relations[0].from, "API Timeout");
        assert_eq!(relations[0].to, "Latency Spike");
        assert!((relations[0].confidence - 0.82).abs() < f64::EPSILON);
        assert_eq!(relations[1].from, "Demo");
        assert_eq!(relations[1].to, "Design");
        assert!((relations[1].confidence - 1.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_relations_skips_blank_fields_and_zeroes_bad_confidence() {
        let relations = parse_relations("REL:X( -> b)[0.5] REL:Y(a -> b)[1.2.3]");
        assert_eq!(relations.len(), 1);
        assert_eq!(relations[0].rel_type, "Y");
        assert!(relations[0].confidence.abs() < f64::EPSILON);
    }

    #[test]
    fn test_relations_yaml_uses_type_key() -> Result<(), Box<dyn std::error::Error>> {
        let yaml = relations_yaml(&parse_relations("REL:USES(App -> Db)[0.5]"))?;
        assert!(!yaml.starts_with("---"));
        assert!(!yaml.ends_with('\n'));
        assert!(yaml.starts_with("relations:"));
        assert!(yaml.contains("type: USES"));
        assert!(yaml.contains("confidence: 0.5"));
        assert_eq!(relations_yaml(&[])?, "relations: []");
        Ok(())
    }

    #[test]
    fn test_capture_note_path_defaults_to_dated_inbox_note() {
        let root = Path::new("/vault");
        assert_eq!(
            capture_note_path(root, None, fixed_now()),
            PathBuf::from("/vault/00_Inbox/2025-03-04-auto.md")
        );
        assert_eq!(
            capture_note_path(root, Some(Path::new("20_Areas/log.md")), fixed_now()),
            PathBuf::from("/vault/20_Areas/log.md")
        );
        assert_eq!(
            capture_note_path(root, Some(Path::new("/elsewhere/x.md")), fixed_now()),
            PathBuf::from("/elsewhere/x.md")
        );
    }

    #[test]
    fn test_capture_creates_then_appends() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = TempDir::new()?;
        let target = capture_note_path(tmp.path(), None, fixed_now());

        let first = capture(tmp.path(), &target, "hello REL:A(x -> y)[0.9]\n\n", fixed_now())?;
        assert_eq!(first.note, "00_Inbox/2025-03-04-auto.md");
        assert_eq!(first.relation_count, 1);
        assert_eq!(first.appended_at, "2025-03-04T05:06:07+00:00");

        let text = fs::read_to_string(&target)?;
        assert!(text.starts_with(
            "# Auto capture\n\n## Capture @2025-03-04 05:06:07 UTC\n\nhello REL:A(x -> y)[0.9]\n\n```yaml\nrelations:\n"
        ));
        assert!(text.ends_with("```\n\n"));

        let second = capture(tmp.path(), &target, "plain", fixed_now())?;
        assert_eq!(second.relation_count, 0);
        let text = fs::read_to_string(&target)?;
        assert_eq!(text.matches("# Auto capture").count(), 1);
        assert!(text.contains("```\n\n\n## Capture @"));
        assert!(text.ends_with("plain\n\n```yaml\nrelations: []\n```\n\n"));
        Ok(())
    }

    #[test]
    fn test_capture_into_empty_existing_note_has_no_header() -> Result<(), Box<dyn std::error::Error>> {
        let tmp = TempDir::new()?;
        let target = tmp.path().join("log.md");
        fs::write(&target, "")?;
        capture(tmp.path(), &target, "x", fixed_now())?;
        assert!(fs::read_to_string(&target)?.starts_with("## Capture @"));
        Ok(())
    }
}
