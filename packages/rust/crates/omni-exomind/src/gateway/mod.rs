//! Gateway namespace: HTTP and stdio JSON-RPC front ends over the core.
//!
//! Both front ends share the tool bodies below so index/recall/doctor
//! behave identically whichever door the request came through.

#[cfg(feature = "gateway")]
mod http;
mod stdio;

#[cfg(feature = "gateway")]
pub use http::{GatewayState, IndexRequest, RecallRequest, RecallResponse, router, run_http};
pub use stdio::{JSONRPC_VERSION, MCP_PROTOCOL_VERSION, handle_request, run_stdio, tool_specs};

use crate::config::ExomindSettings;
use crate::doctor::{DoctorReport, doctor_report};
use crate::error::ExomindResult;
use crate::link_graph::{
    GRAPH_FILE_NAME, LinkGraphIndexReport, RecallRow, RecallWeights, index_notes, load_snapshot,
    recall_weighted,
};
use crate::workspace::absolute_path;
use std::path::Path;

/// Index `notes_root` into `<out_root>/graph.json` with the configured options.
///
/// # Errors
///
/// Propagates index failures (missing root, write errors).
pub fn index_tool(
    settings: &ExomindSettings,
    notes_root: &Path,
    out_root: Option<&Path>,
) -> ExomindResult<LinkGraphIndexReport> {
    let notes_root = absolute_path(notes_root);
    let out_root = absolute_path(out_root.unwrap_or(&settings.out_root));
    index_notes(&notes_root, &out_root, &settings.build_options())
}

/// Load the snapshot at `graph` (default `<out_root>/graph.json`) and recall.
///
/// `top_k` falls back to the configured recall size.
///
/// # Errors
///
/// Returns missing or unreadable snapshot errors; an empty result is `Ok`.
pub fn recall_tool(
    settings: &ExomindSettings,
    graph: Option<&Path>,
    query: &str,
    top_k: Option<usize>,
    weights: &RecallWeights,
) -> ExomindResult<Vec<RecallRow>> {
    let default_graph = settings.out_root.join(GRAPH_FILE_NAME);
    let graph_path = absolute_path(graph.unwrap_or(&default_graph));
    let snapshot = load_snapshot(&graph_path)?;
    Ok(recall_weighted(
        &snapshot,
        query,
        top_k.unwrap_or(settings.top_k),
        weights,
    ))
}

/// Run health checks for `notes_root` and `graph`.
#[must_use]
pub fn doctor_tool(
    settings: &ExomindSettings,
    notes_root: Option<&Path>,
    graph: Option<&Path>,
) -> DoctorReport {
    let default_graph = settings.out_root.join(GRAPH_FILE_NAME);
    let notes_root = absolute_path(notes_root.unwrap_or_else(|| Path::new(".")));
    let graph_path = absolute_path(graph.unwrap_or(&default_graph));
    doctor_report(&notes_root, &graph_path, &settings.note_dirs)
}
