#![allow(missing_docs)]

//! exom CLI: init, index, recall, capture, lifecycle, doctor, benchmark, serve, mcp.
//!
//! Logging: `RUST_LOG=omni_exomind=debug` (or `--verbose`) on stderr; stdout
//! carries only command output.

use anyhow::{Context, Result};
use chrono::Utc;
use clap::{Parser, Subcommand, ValueEnum};
use omni_exomind::gateway::{doctor_tool, index_tool, recall_tool, run_stdio};
use omni_exomind::{
    CaptureReport, DoctorReport, ExomindSettings, LifecycleMode, LifecycleReport,
    LinkGraphIndexReport, RecallRow, RecallWeights, absolute_path, capture, capture_note_path,
    init_workspace, load_dataset, load_settings, load_snapshot, run_benchmark, run_lifecycle,
};
use serde::Serialize;
use serde_json::json;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "exom",
    about = "ExoMind: index Markdown notes into a link graph and recall by keyword",
    arg_required_else_help = true
)]
struct Cli {
    /// Explicit settings file (YAML), overlaid on `.config/exomind.yaml`.
    #[arg(long = "conf", short = 'c', value_name = "FILE", global = true)]
    config_file: Option<PathBuf>,

    /// Emit JSON instead of text.
    #[arg(long, global = true, default_value_t = false)]
    json: bool,

    /// Debug logging on stderr.
    #[arg(long, short = 'v', global = true, default_value_t = false)]
    verbose: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum LifecycleModeArg {
    Decay,
    Consolidate,
    Archive,
}

impl From<LifecycleModeArg> for LifecycleMode {
    fn from(value: LifecycleModeArg) -> Self {
        match value {
            LifecycleModeArg::Decay => Self::Decay,
            LifecycleModeArg::Consolidate => Self::Consolidate,
            LifecycleModeArg::Archive => Self::Archive,
        }
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Create category directories and the `.neural` cache folders.
    Init {
        #[arg(long, default_value = ".")]
        path: PathBuf,
    },
    /// Build the link graph snapshot.
    Index {
        #[arg(long = "notes-root")]
        notes_root: PathBuf,
        #[arg(long = "out-root")]
        out_root: Option<PathBuf>,
    },
    /// Rank notes against a keyword query.
    Recall {
        #[arg(long)]
        query: String,
        #[arg(long)]
        topk: Option<usize>,
        #[arg(long)]
        graph: Option<PathBuf>,
        /// Scale on the token-overlap component.
        #[arg(long = "lexical-weight", default_value_t = 1.0)]
        lexical_weight: f64,
        /// Scale on the in-degree component.
        #[arg(long = "graph-weight", default_value_t = 1.0)]
        graph_weight: f64,
    },
    /// Append text and its typed relations to a note (default: today's inbox note).
    Capture {
        #[arg(long, conflicts_with = "file", required_unless_present = "file")]
        input: Option<String>,
        #[arg(long)]
        file: Option<PathBuf>,
        #[arg(long = "out-note")]
        out_note: Option<PathBuf>,
        #[arg(long = "notes-root", default_value = ".")]
        notes_root: PathBuf,
    },
    /// Decay, consolidate or archive inbox notes.
    Lifecycle {
        #[arg(long, value_enum, default_value_t = LifecycleModeArg::Consolidate)]
        mode: LifecycleModeArg,
        #[arg(long = "older-than-days", default_value_t = 30)]
        older_than_days: u64,
        #[arg(long = "notes-root", default_value = ".")]
        notes_root: PathBuf,
    },
    /// Check notes root, note discovery, and snapshot presence.
    Doctor {
        #[arg(long = "notes-root", default_value = ".")]
        notes_root: PathBuf,
        #[arg(long)]
        graph: Option<PathBuf>,
    },
    /// Measure hit@1/3/5 over a labeled query set.
    Benchmark {
        #[arg(long)]
        dataset: PathBuf,
        #[arg(long)]
        graph: Option<PathBuf>,
        #[arg(long, default_value_t = 5)]
        topk: usize,
    },
    /// Run the HTTP gateway.
    Serve {
        #[arg(long)]
        bind: Option<String>,
    },
    /// Run the JSON-RPC stdio bridge.
    Mcp,
}

fn emit<T: Serialize>(value: &T) -> Result<()> {
    let rendered =
        serde_json::to_string_pretty(value).context("failed to serialize CLI output as JSON")?;
    println!("{rendered}");
    Ok(())
}

fn init_tracing(verbose: bool) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(if verbose {
            "omni_exomind=debug"
        } else {
            "omni_exomind=info"
        })
    });
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn print_index(report: &LinkGraphIndexReport, json: bool) -> Result<()> {
    if json {
        return emit(&json!({"ok": true, "result": report}));
    }
    println!(
        "INDEX_OK notes={} nodes={} edges={} -> {}",
        report.notes,
        report.nodes,
        report.edges,
        report.graph_path.display()
    );
    Ok(())
}

fn print_recall(query: &str, topk: usize, rows: &[RecallRow], json: bool) -> Result<()> {
    if json {
        return emit(&json!({"ok": true, "query": query, "topk": topk, "rows": rows}));
    }
    if rows.is_empty() {
        println!("NO_RESULTS");
        return Ok(());
    }
    for row in rows {
        println!(
            "{:02}. score={:.2} | {} | {}",
            row.rank,
            row.score,
            row.title,
            row.path.as_deref().unwrap_or("None")
        );
    }
    Ok(())
}

fn print_capture(report: &CaptureReport, json: bool) -> Result<()> {
    if json {
        return emit(report);
    }
    println!(
        "CAPTURE_OK note={} relations={}",
        report.note, report.relation_count
    );
    for relation in &report.relations {
        println!(
            "  - {}({} -> {}) [{:.2}]",
            relation.rel_type, relation.from, relation.to, relation.confidence
        );
    }
    Ok(())
}

fn print_lifecycle(report: &LifecycleReport, json: bool) -> Result<()> {
    if json {
        return emit(report);
    }
    println!(
        "LIFECYCLE {} processed={} affected={}",
        report.mode, report.processed, report.touched
    );
    if let Some(path) = &report.summary_path {
        println!("  summary: {path}");
    }
    for detail in &report.details {
        println!("  {detail}");
    }
    Ok(())
}

fn print_doctor(report: &DoctorReport, json: bool) -> Result<()> {
    if json {
        return emit(report);
    }
    for check in &report.checks {
        let status = if check.ok { "OK" } else { "WARN" };
        println!("{status} | {} | {}", check.name, check.info);
    }
    println!("{}", if report.ok { "DOCTOR_OK" } else { "DOCTOR_WARN" });
    Ok(())
}

fn run_init(settings: &ExomindSettings, path: &Path, json: bool) -> Result<()> {
    let root = absolute_path(path);
    let created = init_workspace(&root, &settings.note_dirs)?;
    if json {
        return emit(&json!({"ok": true, "root": root, "created": created}));
    }
    println!("INIT_OK {}", root.display());
    Ok(())
}

fn run_capture(
    settings: &ExomindSettings,
    input: Option<String>,
    file: Option<&Path>,
    out_note: Option<&Path>,
    notes_root: &Path,
    json: bool,
) -> Result<()> {
    let text = match (input, file) {
        (Some(text), _) => text,
        (None, Some(path)) => {
            let path = absolute_path(path);
            std::fs::read_to_string(&path)
                .with_context(|| format!("failed to read capture input {}", path.display()))?
        }
        (None, None) => anyhow::bail!("Either --input or --file is required for capture."),
    };
    let root = absolute_path(notes_root);
    init_workspace(&root, &settings.note_dirs)?;
    let now = Utc::now();
    let target = capture_note_path(&root, out_note, now);
    let report = capture(&root, &target, &text, now)?;
    print_capture(&report, json)
}

fn run_benchmark_command(
    settings: &ExomindSettings,
    dataset: &Path,
    graph: Option<&Path>,
    topk: usize,
    json: bool,
) -> Result<()> {
    let graph_path = absolute_path(graph.unwrap_or(&settings.graph_path()));
    let snapshot = load_snapshot(&graph_path)?;
    let queries = load_dataset(&absolute_path(dataset))
        .with_context(|| format!("failed to load benchmark dataset {}", dataset.display()))?;
    let report = run_benchmark(&snapshot, &queries, topk);
    if json {
        return emit(&report);
    }
    println!(
        "BENCH queries={} hit@1={:.3} hit@3={:.3} hit@5={:.3} avg_latency_ms={:.3}",
        report.queries.len(),
        report.hit_at_1,
        report.hit_at_3,
        report.hit_at_5,
        report.avg_latency_ms
    );
    for summary in &report.queries {
        let rank = summary
            .hit_rank
            .map_or_else(|| "-".to_string(), |rank| rank.to_string());
        println!(
            "{rank} | {} | {}",
            summary.query,
            summary.hit_path.as_deref().unwrap_or("None")
        );
    }
    Ok(())
}

#[cfg(feature = "gateway")]
fn run_serve(settings: ExomindSettings, bind: Option<String>) -> Result<()> {
    let bind = bind.unwrap_or_else(|| settings.bind.clone());
    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .context("failed to start tokio runtime")?;
    runtime.block_on(omni_exomind::gateway::run_http(settings, &bind))
}

#[cfg(not(feature = "gateway"))]
fn run_serve(_settings: ExomindSettings, _bind: Option<String>) -> Result<()> {
    anyhow::bail!("exom was built without the `gateway` feature; `serve` is unavailable")
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);
    let settings = load_settings(cli.config_file.as_deref())?;

    match cli.command {
        Command::Init { path } => run_init(&settings, &path, cli.json),
        Command::Index {
            notes_root,
            out_root,
        } => {
            let report = index_tool(&settings, &notes_root, out_root.as_deref())?;
            print_index(&report, cli.json)
        }
        Command::Recall {
            query,
            topk,
            graph,
            lexical_weight,
            graph_weight,
        } => {
            let topk = topk.unwrap_or(settings.top_k);
            let weights = RecallWeights {
                lexical: lexical_weight,
                graph: graph_weight,
            };
            let rows = recall_tool(&settings, graph.as_deref(), &query, Some(topk), &weights)?;
            print_recall(&query, topk, &rows, cli.json)
        }
        Command::Capture {
            input,
            file,
            out_note,
            notes_root,
        } => run_capture(
            &settings,
            input,
            file.as_deref(),
            out_note.as_deref(),
            &notes_root,
            cli.json,
        ),
        Command::Lifecycle {
            mode,
            older_than_days,
            notes_root,
        } => {
            let root = absolute_path(&notes_root);
            let report = run_lifecycle(&root, mode.into(), older_than_days, Utc::now())?;
            print_lifecycle(&report, cli.json)
        }
        Command::Doctor { notes_root, graph } => {
            let report = doctor_tool(&settings, Some(notes_root.as_path()), graph.as_deref());
            print_doctor(&report, cli.json)
        }
        Command::Benchmark {
            dataset,
            graph,
            topk,
        } => run_benchmark_command(&settings, &dataset, graph.as_deref(), topk, cli.json),
        Command::Serve { bind } => run_serve(settings, bind),
        Command::Mcp => {
            let stdin = std::io::stdin();
            let stdout = std::io::stdout();
            run_stdio(&settings, stdin.lock(), stdout.lock()).context("stdio bridge failed")
        }
    }
}
