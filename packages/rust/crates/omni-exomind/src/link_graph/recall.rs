//! Keyword recall: exact-token overlap plus a capped in-degree bonus.

use super::models::{LinkGraphNode, LinkGraphSnapshot, RecallRow};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// Default number of rows returned by recall.
pub const DEFAULT_TOP_K: usize = 10;

const OVERLAP_WEIGHT: f64 = 2.0;
const IN_DEGREE_WEIGHT: f64 = 0.1;
const IN_DEGREE_CAP: usize = 10;

/// Lowercased maximal runs of ASCII letters, digits, `_` and `-`.
#[must_use]
pub fn tokenize(value: &str) -> Vec<String> {
    value
        .split(|c: char| !(c.is_ascii_alphanumeric() || c == '_' || c == '-'))
        .filter(|token| !token.is_empty())
        .map(str::to_ascii_lowercase)
        .collect()
}

fn token_set(value: &str) -> HashSet<String> {
    tokenize(value).into_iter().collect()
}

/// Edge count per destination id (resolved and unresolved).
#[must_use]
pub fn in_degree_table(graph: &LinkGraphSnapshot) -> HashMap<&str, usize> {
    let mut indegree: HashMap<&str, usize> = HashMap::new();
    for edge in &graph.edges {
        *indegree.entry(edge.dst.as_str()).or_default() += 1;
    }
    indegree
}

fn searchable_text(node: &LinkGraphNode) -> String {
    let mut text = format!("{} {}", node.title, node.path.as_deref().unwrap_or(""));
    if let Some(content) = &node.content {
        text.push(' ');
        text.push_str(content);
    }
    text
}

/// Popularity bonus for a node with `in_degree` incoming edges.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn in_degree_bonus(in_degree: usize) -> f64 {
    in_degree.min(IN_DEGREE_CAP) as f64 * IN_DEGREE_WEIGHT
}

#[allow(clippy::cast_precision_loss)]
fn overlap_score(overlap: usize) -> f64 {
    overlap as f64 * OVERLAP_WEIGHT
}

fn round4(value: f64) -> f64 {
    (value * 10_000.0).round() / 10_000.0
}

/// Multipliers applied to the overlap and in-degree components.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RecallWeights {
    /// Scale on `2 * overlap`.
    pub lexical: f64,
    /// Scale on the capped in-degree bonus.
    pub graph: f64,
}

impl Default for RecallWeights {
    fn default() -> Self {
        Self {
            lexical: 1.0,
            graph: 1.0,
        }
    }
}

/// Rank nodes of `graph` against `query`, best first, at most `top_k` rows.
///
/// Nodes sharing no token with the query are dropped whatever their
/// in-degree. Ties keep snapshot node order.
#[must_use]
pub fn recall(graph: &LinkGraphSnapshot, query: &str, top_k: usize) -> Vec<RecallRow> {
    recall_weighted(graph, query, top_k, &RecallWeights::default())
}

/// [`recall`] with explicit component weights.
///
/// Rows whose weighted score is not positive are dropped as well.
#[must_use]
pub fn recall_weighted(
    graph: &LinkGraphSnapshot,
    query: &str,
    top_k: usize,
    weights: &RecallWeights,
) -> Vec<RecallRow> {
    let query_tokens = token_set(query);
    if query_tokens.is_empty() || top_k == 0 {
        return Vec::new();
    }
    let indegree = in_degree_table(graph);

    let mut scored: Vec<(f64, &LinkGraphNode)> = graph
        .nodes
        .iter()
        .filter_map(|node| {
            let node_tokens = token_set(&searchable_text(node));
            let overlap = query_tokens.intersection(&node_tokens).count();
            if overlap == 0 {
                return None;
            }
            let in_degree = indegree.get(node.id.as_str()).copied().unwrap_or(0);
            let score = weights.lexical * overlap_score(overlap)
                + weights.graph * in_degree_bonus(in_degree);
            (score > 0.0).then_some((score, node))
        })
        .collect();

    scored.sort_by(|left, right| right.0.total_cmp(&left.0));
    scored.truncate(top_k);
    scored
        .into_iter()
        .enumerate()
        .map(|(idx, (score, node))| RecallRow {
            rank: idx + 1,
            score: round4(score),
            title: node.title.clone(),
            path: node.path.clone(),
        })
        .collect()
}
