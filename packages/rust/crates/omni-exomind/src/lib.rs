//! omni-exomind - Markdown note link graph and keyword recall.
//!
//! Module layout:
//! - `link_graph`: note discovery, wikilink parsing, graph build, snapshot IO, recall
//! - `config`: YAML + env runtime settings
//! - `doctor`: runtime health checks
//! - `benchmark`: hit@k evaluation over a labeled query set
//! - `workspace`: notes workspace scaffolding
//! - `capture`: append text plus typed relations to an inbox note
//! - `lifecycle`: inbox decay, consolidation and archival
//! - `gateway`: HTTP (feature `gateway`) and stdio JSON-RPC front ends
//!
//! # Examples
//!
//! ```rust
//! use omni_exomind::{LinkGraphBuildOptions, build_link_graph, recall};
//! use std::path::Path;
//!
//! let graph = build_link_graph(Path::new("/no/such/vault"), &LinkGraphBuildOptions::default());
//! assert!(graph.nodes.is_empty());
//! assert!(recall(&graph, "rust", 5).is_empty());
//! ```

pub mod benchmark;
pub mod capture;
pub mod config;
pub mod doctor;
mod error;
pub mod gateway;
pub mod lifecycle;
pub mod link_graph;
pub mod workspace;

pub use benchmark::{BenchmarkQuery, BenchmarkReport, QuerySummary, load_dataset, run_benchmark};
pub use capture::{CaptureReport, TypedRelation, capture, capture_note_path, parse_relations};
pub use config::{ExomindSettings, load_settings, resolve_settings};
pub use doctor::{DoctorCheck, DoctorReport, doctor_report};
pub use error::{ExomindError, ExomindResult};
pub use lifecycle::{LifecycleMode, LifecycleReport, run_lifecycle};
pub use link_graph::{
    DEFAULT_CONTENT_MAX_CHARS, DEFAULT_NOTE_DIRS, DEFAULT_TOP_K, GRAPH_FILE_NAME, LinkGraphBuildOptions,
    LinkGraphEdge, LinkGraphEdgeType, LinkGraphIndexReport, LinkGraphNode, LinkGraphSnapshot,
    LinkGraphStats, RecallRow, RecallWeights, build_link_graph, index_notes, load_snapshot, recall,
    recall_weighted, write_snapshot,
};
pub use workspace::{absolute_path, init_workspace};
