//! Shared models for the note link graph snapshot and recall rows.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Id prefix for placeholder nodes created from unresolved links.
pub const GHOST_ID_PREFIX: &str = "ghost/";

/// Edge type between two graph nodes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LinkGraphEdgeType {
    /// Link target matched at least one note stem.
    #[serde(rename = "WIKILINK")]
    Wikilink,
    /// Link target matched no note; destination is a ghost node.
    #[serde(rename = "UNRESOLVED_LINK")]
    UnresolvedLink,
}

impl LinkGraphEdgeType {
    /// Wire tag used in the snapshot.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Wikilink => "WIKILINK",
            Self::UnresolvedLink => "UNRESOLVED_LINK",
        }
    }
}

/// One graph vertex: a real note, or a ghost placeholder for an unresolved link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkGraphNode {
    /// Root-relative path with `/` separators, or `ghost/<target>`.
    pub id: String,
    /// Root-relative path; `None` for ghost nodes.
    pub path: Option<String>,
    /// First `# ` heading, else the filename stem.
    pub title: String,
    /// Filename without extension (raw target text for ghosts).
    pub stem: String,
    /// Bounded prefix of the note text, used only for scoring.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub content: Option<String>,
}

impl LinkGraphNode {
    /// Placeholder node for a link target that matched no note.
    #[must_use]
    pub fn ghost(raw_target: &str) -> Self {
        Self {
            id: ghost_id(raw_target),
            path: None,
            title: raw_target.to_string(),
            stem: raw_target.to_string(),
            content: None,
        }
    }

    /// Whether this node stands in for an unresolved link.
    #[must_use]
    pub fn is_ghost(&self) -> bool {
        self.path.is_none()
    }
}

/// Ghost node id for a raw link target.
#[must_use]
pub fn ghost_id(raw_target: &str) -> String {
    format!("{GHOST_ID_PREFIX}{raw_target}")
}

/// Directed edge in parse order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkGraphEdge {
    /// Source node id.
    pub src: String,
    /// Destination node id.
    pub dst: String,
    /// Resolved or unresolved.
    #[serde(rename = "type")]
    pub kind: LinkGraphEdgeType,
}

/// Summary counts stored alongside the graph.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkGraphStats {
    /// Note files scanned.
    pub notes: usize,
    /// Nodes (notes + ghosts).
    pub nodes: usize,
    /// Edges (resolved + unresolved).
    pub edges: usize,
}

/// Persisted graph state written by indexing and read by recall.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkGraphSnapshot {
    /// Root directory used for the scan.
    pub notes_root: String,
    /// Nodes in first-insertion order.
    pub nodes: Vec<LinkGraphNode>,
    /// Edges in parse order.
    pub edges: Vec<LinkGraphEdge>,
    /// Summary counts.
    pub stats: LinkGraphStats,
}

impl LinkGraphSnapshot {
    /// Look up a node by id.
    #[must_use]
    pub fn node(&self, id: &str) -> Option<&LinkGraphNode> {
        self.nodes.iter().find(|node| node.id == id)
    }

    /// Iterate ghost nodes.
    pub fn ghosts(&self) -> impl Iterator<Item = &LinkGraphNode> {
        self.nodes.iter().filter(|node| node.is_ghost())
    }
}

/// Result of the index operation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkGraphIndexReport {
    /// Written snapshot path (`<out_root>/graph.json`).
    pub graph_path: PathBuf,
    /// Note files scanned.
    pub notes: usize,
    /// Nodes written.
    pub nodes: usize,
    /// Edges written.
    pub edges: usize,
}

/// One ranked recall row.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecallRow {
    /// 1-based rank.
    pub rank: usize,
    /// Score rounded to 4 decimal places.
    pub score: f64,
    /// Node title.
    pub title: String,
    /// Node path; `None` for ghost nodes.
    pub path: Option<String>,
}
