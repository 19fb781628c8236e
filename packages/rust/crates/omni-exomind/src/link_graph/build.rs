//! Graph construction: note discovery, stem resolution, ghost placeholders.

use super::models::{
    LinkGraphEdge, LinkGraphEdgeType, LinkGraphIndexReport, LinkGraphNode, LinkGraphSnapshot,
    LinkGraphStats, ghost_id,
};
use super::parser::{ParsedNote, is_supported_note, link_stem_key, parse_note, read_note_text};
use super::snapshot::write_snapshot;
use crate::error::{ExomindError, ExomindResult};
use std::collections::{HashMap, HashSet};
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// Category directories scanned under the notes root, in scan order.
pub const DEFAULT_NOTE_DIRS: &[&str] = &[
    "00_Inbox",
    "10_Projects",
    "20_Areas",
    "30_Resources",
    "99_Archives",
];

/// Characters of note text kept as the scoring snippet.
pub const DEFAULT_CONTENT_MAX_CHARS: usize = 8000;

/// Snapshot file name written under the output root.
pub const GRAPH_FILE_NAME: &str = "graph.json";

/// Inputs that shape a build besides the root itself.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkGraphBuildOptions {
    /// Category directories relative to the root, scanned in order.
    pub note_dirs: Vec<String>,
    /// Snippet length for the full-content variant; `None` is the lightweight variant.
    pub content_max_chars: Option<usize>,
}

impl Default for LinkGraphBuildOptions {
    fn default() -> Self {
        Self {
            note_dirs: DEFAULT_NOTE_DIRS.iter().map(|dir| (*dir).to_string()).collect(),
            content_max_chars: Some(DEFAULT_CONTENT_MAX_CHARS),
        }
    }
}

impl LinkGraphBuildOptions {
    /// Default categories without content snippets.
    #[must_use]
    pub fn lightweight() -> Self {
        Self {
            content_max_chars: None,
            ..Self::default()
        }
    }
}

/// Enumerate note files under each category directory.
///
/// Categories are visited in declared order; within a category entries are
/// walked recursively sorted by file name. Missing categories contribute
/// nothing.
#[must_use]
pub fn collect_notes(root: &Path, note_dirs: &[String]) -> Vec<PathBuf> {
    let mut seen: HashSet<PathBuf> = HashSet::new();
    let mut notes = Vec::new();
    for dir in note_dirs {
        let target = root.join(dir);
        if !target.is_dir() {
            tracing::debug!(dir = %target.display(), "category directory missing; skipped");
            continue;
        }
        for entry in WalkDir::new(&target).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(error) => {
                    tracing::warn!(%error, "skipping unreadable directory entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() || !is_supported_note(entry.path()) {
                continue;
            }
            let path = entry.into_path();
            if seen.insert(path.clone()) {
                notes.push(path);
            }
        }
    }
    notes
}

#[derive(Default)]
struct LinkGraphBuilder {
    nodes: Vec<LinkGraphNode>,
    node_ids: HashSet<String>,
    ids_by_stem: HashMap<String, Vec<String>>,
    edges: Vec<LinkGraphEdge>,
}

impl LinkGraphBuilder {
    fn add_note(&mut self, node: LinkGraphNode) {
        self.ids_by_stem
            .entry(node.stem.to_lowercase())
            .or_default()
            .push(node.id.clone());
        self.node_ids.insert(node.id.clone());
        self.nodes.push(node);
    }

    fn link(&mut self, src: &str, raw_target: &str) {
        if let Some(candidates) = self.ids_by_stem.get(&link_stem_key(raw_target)) {
            for dst in candidates {
                self.edges.push(LinkGraphEdge {
                    src: src.to_string(),
                    dst: dst.clone(),
                    kind: LinkGraphEdgeType::Wikilink,
                });
            }
            return;
        }
        let ghost = ghost_id(raw_target);
        if self.node_ids.insert(ghost.clone()) {
            self.nodes.push(LinkGraphNode::ghost(raw_target));
        }
        self.edges.push(LinkGraphEdge {
            src: src.to_string(),
            dst: ghost,
            kind: LinkGraphEdgeType::UnresolvedLink,
        });
    }

    fn finish(self, root: &Path, note_count: usize) -> LinkGraphSnapshot {
        let stats = LinkGraphStats {
            notes: note_count,
            nodes: self.nodes.len(),
            edges: self.edges.len(),
        };
        LinkGraphSnapshot {
            notes_root: root.display().to_string(),
            nodes: self.nodes,
            edges: self.edges,
            stats,
        }
    }
}

/// Build a fresh graph from the notes under `root`.
///
/// Every note is registered before any link is resolved, so forward
/// references resolve. An absent root yields an empty graph.
#[must_use]
pub fn build_link_graph(root: &Path, options: &LinkGraphBuildOptions) -> LinkGraphSnapshot {
    let paths = collect_notes(root, &options.note_dirs);
    let parsed: Vec<ParsedNote> = paths
        .iter()
        .filter_map(|path| {
            let text = read_note_text(path);
            parse_note(path, root, &text, options.content_max_chars)
        })
        .collect();

    let mut builder = LinkGraphBuilder::default();
    let mut outgoing: Vec<(String, Vec<String>)> = Vec::with_capacity(parsed.len());
    for note in parsed {
        outgoing.push((note.node.id.clone(), note.link_targets));
        builder.add_note(note.node);
    }
    for (src, targets) in &outgoing {
        for raw in targets {
            builder.link(src, raw);
        }
    }

    let graph = builder.finish(root, paths.len());
    tracing::debug!(
        root = %root.display(),
        notes = graph.stats.notes,
        nodes = graph.stats.nodes,
        edges = graph.stats.edges,
        "link graph built"
    );
    graph
}

/// Index operation: build the graph and write `<out_root>/graph.json`.
///
/// # Errors
///
/// Returns [`ExomindError::NotesRootNotFound`] when `notes_root` is absent,
/// and I/O or serialization errors from writing the snapshot.
pub fn index_notes(
    notes_root: &Path,
    out_root: &Path,
    options: &LinkGraphBuildOptions,
) -> ExomindResult<LinkGraphIndexReport> {
    if !notes_root.is_dir() {
        return Err(ExomindError::NotesRootNotFound(notes_root.to_path_buf()));
    }
    let graph = build_link_graph(notes_root, options);
    let graph_path = out_root.join(GRAPH_FILE_NAME);
    write_snapshot(&graph, &graph_path)?;
    tracing::info!(
        notes = graph.stats.notes,
        nodes = graph.stats.nodes,
        edges = graph.stats.edges,
        graph = %graph_path.display(),
        "index written"
    );
    Ok(LinkGraphIndexReport {
        graph_path,
        notes: graph.stats.notes,
        nodes: graph.stats.nodes,
        edges: graph.stats.edges,
    })
}
