//! Recall benchmark over a labeled query set (hit@1/3/5 + latency).

use crate::error::{ExomindError, ExomindResult};
use crate::link_graph::{LinkGraphSnapshot, recall};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::path::Path;
use std::time::Instant;

/// One labeled query; `expected` lists acceptable paths or titles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BenchmarkQuery {
    /// Free-text query.
    pub query: String,
    /// Paths or titles that count as a hit.
    pub expected: Vec<String>,
}

/// Per-query outcome.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuerySummary {
    /// Query text.
    pub query: String,
    /// Rank of the first hit within top-K.
    pub hit_rank: Option<usize>,
    /// Path (or title for ghosts) of the first hit.
    pub hit_path: Option<String>,
    /// Recall wall time.
    pub latency_ms: f64,
}

/// Aggregate benchmark report.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BenchmarkReport {
    /// Fraction of queries hit at rank 1.
    pub hit_at_1: f64,
    /// Fraction hit within rank 3.
    pub hit_at_3: f64,
    /// Fraction hit within rank 5.
    pub hit_at_5: f64,
    /// Mean recall latency.
    pub avg_latency_ms: f64,
    /// Per-query summaries in dataset order.
    pub queries: Vec<QuerySummary>,
}

/// Read a JSON array of [`BenchmarkQuery`].
///
/// # Errors
///
/// Returns an I/O error when the file is unreadable and a serialization
/// error when it is not a query array.
pub fn load_dataset(path: &Path) -> ExomindResult<Vec<BenchmarkQuery>> {
    let data = std::fs::read_to_string(path).map_err(|source| ExomindError::io(path, source))?;
    Ok(serde_json::from_str(&data)?)
}

#[allow(clippy::cast_precision_loss)]
fn rate(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64
    }
}

#[allow(clippy::cast_precision_loss)]
fn mean(sum: f64, count: usize) -> f64 {
    if count == 0 { 0.0 } else { sum / count as f64 }
}

/// Run every query through recall and score hits against `expected`.
#[must_use]
pub fn run_benchmark(
    graph: &LinkGraphSnapshot,
    dataset: &[BenchmarkQuery],
    top_k: usize,
) -> BenchmarkReport {
    let mut total_latency = 0.0;
    let (mut hit1, mut hit3, mut hit5) = (0_usize, 0_usize, 0_usize);
    let mut queries = Vec::with_capacity(dataset.len());

    for entry in dataset {
        let expected: HashSet<&str> = entry.expected.iter().map(String::as_str).collect();
        let start = Instant::now();
        let rows = recall(graph, &entry.query, top_k);
        let latency_ms = start.elapsed().as_secs_f64() * 1000.0;
        total_latency += latency_ms;

        let hit = rows.iter().find(|row| {
            row.path
                .as_deref()
                .is_some_and(|path| expected.contains(path))
                || expected.contains(row.title.as_str())
        });
        let hit_rank = hit.map(|row| row.rank);
        if let Some(rank) = hit_rank {
            hit1 += usize::from(rank <= 1);
            hit3 += usize::from(rank <= 3);
            hit5 += usize::from(rank <= 5);
        }
        queries.push(QuerySummary {
            query: entry.query.clone(),
            hit_rank,
            hit_path: hit.map(|row| row.path.clone().unwrap_or_else(|| row.title.clone())),
            latency_ms,
        });
    }

    let total = dataset.len();
    BenchmarkReport {
        hit_at_1: rate(hit1, total),
        hit_at_3: rate(hit3, total),
        hit_at_5: rate(hit5, total),
        avg_latency_ms: mean(total_latency, total),
        queries,
    }
}
