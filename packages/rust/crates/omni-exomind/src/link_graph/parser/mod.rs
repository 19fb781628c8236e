//! Markdown note parsing for link-graph indexing.

mod content;
mod links;
mod paths;

use super::models::LinkGraphNode;
use std::path::Path;

use self::content::content_snippet;
use self::links::extract_link_targets;
use self::paths::note_stem;

pub(crate) use self::content::{extract_title, read_note_text};
pub(crate) use self::links::compile_regex;
pub(crate) use self::paths::relative_note_id;
pub use self::links::{WikiLinkMatch, WikiLinks, wikilinks};
pub use self::paths::{is_supported_note, link_stem_key};

/// Parsed note payload + raw outgoing link targets.
#[derive(Debug, Clone)]
pub struct ParsedNote {
    /// Graph node for the note.
    pub node: LinkGraphNode,
    /// Raw link targets in textual order.
    pub link_targets: Vec<String>,
}

/// Parse one note file into its graph node plus outgoing link targets.
///
/// `content_max_chars` selects the full-content variant; `None` omits the
/// snippet. Returns `None` when `path` is not under `root`.
#[must_use]
pub fn parse_note(
    path: &Path,
    root: &Path,
    text: &str,
    content_max_chars: Option<usize>,
) -> Option<ParsedNote> {
    let id = relative_note_id(path, root)?;
    let stem = note_stem(path);
    let title = extract_title(text, &stem);
    let content = content_max_chars.map(|max_chars| content_snippet(text, max_chars));
    Some(ParsedNote {
        node: LinkGraphNode {
            path: Some(id.clone()),
            id,
            title,
            stem,
            content,
        },
        link_targets: extract_link_targets(text),
    })
}
