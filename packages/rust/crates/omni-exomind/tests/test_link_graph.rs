//! Integration tests for graph build, snapshot IO and recall.

use omni_exomind::link_graph::{LinkGraphEdgeType, LinkGraphSnapshot, collect_notes};
use omni_exomind::{
    DEFAULT_NOTE_DIRS, ExomindError, LinkGraphBuildOptions, build_link_graph, index_notes,
    load_snapshot, recall,
};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn write_file(path: &Path, content: &str) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, content)?;
    Ok(())
}

fn build(root: &Path) -> LinkGraphSnapshot {
    build_link_graph(root, &LinkGraphBuildOptions::default())
}

fn edge_pairs(graph: &LinkGraphSnapshot) -> Vec<(&str, &str, LinkGraphEdgeType)> {
    graph
        .edges
        .iter()
        .map(|edge| (edge.src.as_str(), edge.dst.as_str(), edge.kind))
        .collect()
}

#[test]
fn test_resolved_link_and_recall_ranking() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;
    write_file(&tmp.path().join("10_Projects/A.md"), "# Alpha\nSee [[B]]\n")?;
    write_file(&tmp.path().join("10_Projects/B.md"), "# Beta\n")?;

    let graph = build(tmp.path());
    let ids: Vec<&str> = graph.nodes.iter().map(|node| node.id.as_str()).collect();
    assert_eq!(ids, vec!["10_Projects/A.md", "10_Projects/B.md"]);
    assert_eq!(
        edge_pairs(&graph),
        vec![("10_Projects/A.md", "10_Projects/B.md", LinkGraphEdgeType::Wikilink)]
    );
    assert_eq!(graph.stats.notes, 2);
    assert_eq!(graph.stats.nodes, 2);
    assert_eq!(graph.stats.edges, 1);

    let rows = recall(&graph, "beta", 10);
    assert_eq!(rows.first().map(|row| row.title.as_str()), Some("Beta"));
    assert_eq!(rows[0].rank, 1);
    // 1 overlapping token + 1 incoming edge.
    assert!((rows[0].score - 2.1).abs() < 1e-9);
    let alpha_rank = rows.iter().position(|row| row.title == "Alpha");
    assert!(alpha_rank.is_none_or(|rank| rank > 0));
    Ok(())
}

#[test]
fn test_unresolved_link_creates_single_ghost() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;
    write_file(
        &tmp.path().join("00_Inbox/C.md"),
        "# Gamma\n[[Missing Note]] and again [[Missing Note|alias]]\n",
    )?;
    write_file(&tmp.path().join("20_Areas/D.md"), "[[Missing Note#part]]\n")?;

    let graph = build(tmp.path());
    let ghosts: Vec<&str> = graph.ghosts().map(|node| node.id.as_str()).collect();
    assert_eq!(ghosts, vec!["ghost/Missing Note"]);
    let ghost = graph.node("ghost/Missing Note").ok_or("ghost missing")?;
    assert!(ghost.path.is_none());
    assert!(ghost.content.is_none());

    assert_eq!(
        edge_pairs(&graph),
        vec![
            ("00_Inbox/C.md", "ghost/Missing Note", LinkGraphEdgeType::UnresolvedLink),
            ("00_Inbox/C.md", "ghost/Missing Note", LinkGraphEdgeType::UnresolvedLink),
            ("20_Areas/D.md", "ghost/Missing Note", LinkGraphEdgeType::UnresolvedLink),
        ]
    );
    assert_eq!(graph.stats.notes, 2);
    assert_eq!(graph.stats.nodes, 3);

    // Both notes mention the target in their content; the ghost wins on in-degree.
    let rows = recall(&graph, "missing", 5);
    assert_eq!(rows.len(), 3);
    assert_eq!(rows[0].path, None);
    assert!((rows[0].score - 2.3).abs() < 1e-9);
    assert!((rows[1].score - 2.0).abs() < 1e-9);
    Ok(())
}

#[test]
fn test_shared_stem_fans_out_case_insensitively() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;
    write_file(&tmp.path().join("00_Inbox/Topic.md"), "# Inbox topic\n")?;
    write_file(&tmp.path().join("30_Resources/deep/topic.md"), "# Resource topic\n")?;
    write_file(&tmp.path().join("10_Projects/hub.md"), "Links: [[TOPIC]] [[sub/dir/Topic/]]\n")?;

    let graph = build(tmp.path());
    let pairs = edge_pairs(&graph);
    assert_eq!(pairs.len(), 4);
    assert!(pairs.iter().all(|(src, _, kind)| {
        *src == "10_Projects/hub.md" && *kind == LinkGraphEdgeType::Wikilink
    }));
    let dsts: Vec<&str> = pairs.iter().map(|(_, dst, _)| *dst).collect();
    assert_eq!(
        dsts,
        vec![
            "00_Inbox/Topic.md",
            "30_Resources/deep/topic.md",
            "00_Inbox/Topic.md",
            "30_Resources/deep/topic.md",
        ]
    );
    assert_eq!(graph.ghosts().count(), 0);
    Ok(())
}

#[test]
fn test_link_with_extension_stays_unresolved() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;
    write_file(&tmp.path().join("00_Inbox/A.md"), "[[B.md]]\n")?;
    write_file(&tmp.path().join("00_Inbox/B.md"), "# B\n")?;

    let graph = build(tmp.path());
    assert_eq!(
        edge_pairs(&graph),
        vec![("00_Inbox/A.md", "ghost/B.md", LinkGraphEdgeType::UnresolvedLink)]
    );
    Ok(())
}

#[test]
fn test_blank_targets_link_to_empty_ghost() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;
    write_file(
        &tmp.path().join("00_Inbox/a.md"),
        "# A\nsee [[   ]] and [[ |alias]]\n",
    )?;

    let graph = build(tmp.path());
    let ghosts: Vec<&str> = graph.ghosts().map(|node| node.id.as_str()).collect();
    assert_eq!(ghosts, vec!["ghost/"]);
    assert_eq!(
        edge_pairs(&graph),
        vec![
            ("00_Inbox/a.md", "ghost/", LinkGraphEdgeType::UnresolvedLink),
            ("00_Inbox/a.md", "ghost/", LinkGraphEdgeType::UnresolvedLink),
        ]
    );
    assert_eq!(graph.stats.nodes, 2);
    assert_eq!(graph.stats.edges, 2);
    Ok(())
}

#[test]
fn test_ids_unique_and_outside_categories_ignored() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;
    write_file(&tmp.path().join("00_Inbox/a.md"), "# A\n")?;
    write_file(&tmp.path().join("20_Areas/a.md"), "# A again\n")?;
    write_file(&tmp.path().join("99_Archives/old.MD"), "# Old\n")?;
    write_file(&tmp.path().join("99_Archives/notes.txt"), "# Not a note\n")?;
    write_file(&tmp.path().join("Scratch/loose.md"), "# Loose\n")?;
    write_file(&tmp.path().join("top.md"), "# Top\n")?;

    let graph = build(tmp.path());
    let ids: Vec<&str> = graph.nodes.iter().map(|node| node.id.as_str()).collect();
    assert_eq!(ids, vec!["00_Inbox/a.md", "20_Areas/a.md", "99_Archives/old.MD"]);
    let unique: HashSet<&str> = ids.iter().copied().collect();
    assert_eq!(unique.len(), ids.len());
    assert!(graph.nodes.iter().all(|node| node.path.as_deref() == Some(node.id.as_str())));
    Ok(())
}

#[test]
fn test_title_fallback_and_title_recall() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;
    write_file(&tmp.path().join("30_Resources/reading-list.md"), "no heading here\n## Sub\n")?;
    write_file(&tmp.path().join("30_Resources/cooking.md"), "#NotAHeading\n")?;

    let graph = build(tmp.path());
    let titles: Vec<&str> = graph.nodes.iter().map(|node| node.title.as_str()).collect();
    assert_eq!(titles, vec!["cooking", "reading-list"]);

    let rows = recall(&graph, "reading-list", 3);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].path.as_deref(), Some("30_Resources/reading-list.md"));
    Ok(())
}

#[test]
fn test_unmatched_query_returns_empty() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;
    write_file(&tmp.path().join("00_Inbox/a.md"), "# Alpha\n[[b]]\n")?;
    let graph = build(tmp.path());
    assert!(!graph.nodes.is_empty());
    assert!(recall(&graph, "nonexistent-term-xyz", 10).is_empty());
    assert!(recall(&graph, "  !!  ", 10).is_empty());
    Ok(())
}

#[test]
fn test_lightweight_variant_skips_content_scoring() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;
    write_file(
        &tmp.path().join("10_Projects/plan.md"),
        "# Plan\nBody mentions quokka only here.\n",
    )?;

    let full = build(tmp.path());
    assert!(full.nodes[0].content.as_deref().is_some_and(|c| c.contains("quokka")));
    assert_eq!(recall(&full, "quokka", 5).len(), 1);

    let light = build_link_graph(tmp.path(), &LinkGraphBuildOptions::lightweight());
    assert!(light.nodes[0].content.is_none());
    assert!(recall(&light, "quokka", 5).is_empty());
    assert_eq!(recall(&light, "plan", 5).len(), 1);
    Ok(())
}

#[test]
fn test_content_is_truncated_to_char_limit() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;
    let body = "é".repeat(9000);
    write_file(&tmp.path().join("00_Inbox/long.md"), &body)?;

    let graph = build(tmp.path());
    let content = graph.nodes[0].content.as_deref().ok_or("content missing")?;
    assert_eq!(content.chars().count(), 8000);
    Ok(())
}

#[test]
fn test_invalid_utf8_is_decoded_lossily() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;
    let path = tmp.path().join("00_Inbox/bytes.md");
    fs::create_dir_all(path.parent().ok_or("no parent")?)?;
    fs::write(&path, b"# Bytes \xff\xfe\n[[Target]]\n")?;

    let graph = build(tmp.path());
    assert_eq!(graph.stats.notes, 1);
    assert!(graph.nodes[0].title.starts_with("Bytes"));
    assert!(graph.node("ghost/Target").is_some());
    Ok(())
}

#[test]
fn test_absent_root_builds_empty_graph_but_index_fails() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;
    let missing = tmp.path().join("nope");
    let dirs: Vec<String> = DEFAULT_NOTE_DIRS.iter().map(|d| (*d).to_string()).collect();
    assert!(collect_notes(&missing, &dirs).is_empty());

    let graph = build(&missing);
    assert!(graph.nodes.is_empty());
    assert_eq!(graph.stats.notes, 0);

    let result = index_notes(&missing, &tmp.path().join(".neural"), &LinkGraphBuildOptions::default());
    assert!(matches!(result, Err(ExomindError::NotesRootNotFound(_))));
    Ok(())
}

#[test]
fn test_index_then_load_recalls_same_rows() -> Result<(), Box<dyn std::error::Error>> {
    let tmp = TempDir::new()?;
    let notes = tmp.path().join("vault");
    write_file(&notes.join("20_Areas/health.md"), "# Health habits\n[[sleep]]\n")?;
    write_file(&notes.join("20_Areas/sleep.md"), "# Sleep\n")?;
    let out_root = tmp.path().join("out/.neural");

    let report = index_notes(&notes, &out_root, &LinkGraphBuildOptions::default())?;
    assert_eq!(report.graph_path, out_root.join("graph.json"));
    assert_eq!((report.notes, report.nodes, report.edges), (2, 2, 1));

    let loaded = load_snapshot(&report.graph_path)?;
    let fresh = build(&notes);
    assert_eq!(loaded, fresh);
    assert_eq!(recall(&loaded, "sleep health", 5), recall(&fresh, "sleep health", 5));
    Ok(())
}

#[test]
fn test_load_missing_snapshot_is_graph_not_found() {
    let result = load_snapshot(Path::new("/no/such/dir/graph.json"));
    assert!(matches!(result, Err(ExomindError::GraphNotFound(_))));
}
