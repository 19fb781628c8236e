//! Markdown note link graph: build, persist, recall.

mod build;
mod models;
mod parser;
mod recall;
mod snapshot;

pub(crate) use parser::{compile_regex, extract_title, read_note_text, relative_note_id};

pub use build::{
    DEFAULT_CONTENT_MAX_CHARS, DEFAULT_NOTE_DIRS, GRAPH_FILE_NAME, LinkGraphBuildOptions,
    build_link_graph, collect_notes, index_notes,
};
pub use models::{
    GHOST_ID_PREFIX, LinkGraphEdge, LinkGraphEdgeType, LinkGraphIndexReport, LinkGraphNode,
    LinkGraphSnapshot, LinkGraphStats, RecallRow, ghost_id,
};
pub use parser::{
    ParsedNote, WikiLinkMatch, WikiLinks, is_supported_note, link_stem_key, parse_note, wikilinks,
};
pub use recall::{
    DEFAULT_TOP_K, RecallWeights, in_degree_bonus, in_degree_table, recall, recall_weighted, tokenize,
};
pub use snapshot::{load_snapshot, write_snapshot};
