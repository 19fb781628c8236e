//! HTTP gateway: GET /health, POST /index, POST /recall.
//!
//! Missing notes root or snapshot maps to 404, any other failure to 500.
//! Index requests are serialized; recall runs concurrently.

use super::{index_tool, recall_tool};
use crate::config::ExomindSettings;
use crate::error::ExomindError;
use crate::link_graph::{LinkGraphIndexReport, RecallRow, RecallWeights};
use anyhow::Result;
use axum::{
    Json, Router,
    extract::State,
    http::StatusCode,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::Mutex;

const SERVICE_NAME: &str = "exomind";

fn default_weight() -> f64 {
    1.0
}

/// Request body for POST /index.
#[derive(Debug, Clone, Deserialize)]
pub struct IndexRequest {
    /// Notes root to scan.
    pub notes_root: PathBuf,
    /// Directory receiving `graph.json`; the configured `out_root` when absent.
    #[serde(default)]
    pub out_root: Option<PathBuf>,
}

/// Request body for POST /recall.
#[derive(Debug, Clone, Deserialize)]
pub struct RecallRequest {
    /// Free-text query.
    pub query: String,
    /// Maximum rows; the configured `top_k` when absent.
    #[serde(default)]
    pub topk: Option<usize>,
    /// Snapshot to query; `<out_root>/graph.json` when absent.
    #[serde(default)]
    pub graph: Option<PathBuf>,
    /// Scale on the token-overlap component.
    #[serde(default = "default_weight")]
    pub lexical_weight: f64,
    /// Scale on the in-degree component.
    #[serde(default = "default_weight")]
    pub graph_weight: f64,
}

/// Response body for POST /recall.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RecallResponse {
    /// Echo of the query.
    pub query: String,
    /// Effective result size.
    pub topk: usize,
    /// Ranked rows.
    pub results: Vec<RecallRow>,
}

/// Shared state: settings plus a lock serializing index runs.
#[derive(Clone)]
pub struct GatewayState {
    /// Settings resolved at startup; supply request defaults.
    pub settings: Arc<ExomindSettings>,
    /// Held for the duration of each `/index` run.
    pub index_lock: Arc<Mutex<()>>,
}

type ApiError = (StatusCode, String);

fn api_error(error: &ExomindError) -> ApiError {
    let status = if error.is_missing_input() {
        StatusCode::NOT_FOUND
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    };
    (status, error.to_string())
}

fn join_error(error: &tokio::task::JoinError) -> ApiError {
    (StatusCode::INTERNAL_SERVER_ERROR, error.to_string())
}

async fn handle_health() -> Json<Value> {
    Json(json!({"ok": true, "service": SERVICE_NAME}))
}

async fn handle_index(
    State(state): State<GatewayState>,
    Json(body): Json<IndexRequest>,
) -> Result<Json<LinkGraphIndexReport>, ApiError> {
    let _guard = state.index_lock.lock().await;
    let settings = Arc::clone(&state.settings);
    let report = tokio::task::spawn_blocking(move || {
        index_tool(&settings, &body.notes_root, body.out_root.as_deref())
    })
    .await
    .map_err(|error| join_error(&error))?
    .map_err(|error| api_error(&error))?;
    Ok(Json(report))
}

async fn handle_recall(
    State(state): State<GatewayState>,
    Json(body): Json<RecallRequest>,
) -> Result<Json<RecallResponse>, ApiError> {
    let settings = Arc::clone(&state.settings);
    let RecallRequest {
        query,
        topk,
        graph,
        lexical_weight,
        graph_weight,
    } = body;
    let topk = topk.unwrap_or(settings.top_k);
    let weights = RecallWeights {
        lexical: lexical_weight,
        graph: graph_weight,
    };
    let lookup = query.clone();
    let results = tokio::task::spawn_blocking(move || {
        recall_tool(&settings, graph.as_deref(), &lookup, Some(topk), &weights)
    })
    .await
    .map_err(|error| join_error(&error))?
    .map_err(|error| api_error(&error))?;
    Ok(Json(RecallResponse {
        query,
        topk,
        results,
    }))
}

/// Build the gateway router.
pub fn router(settings: ExomindSettings) -> Router {
    let state = GatewayState {
        settings: Arc::new(settings),
        index_lock: Arc::new(Mutex::new(())),
    };
    Router::new()
        .route("/health", get(handle_health))
        .route("/index", post(handle_index))
        .route("/recall", post(handle_recall))
        .with_state(state)
}

/// Run the HTTP server on `bind_addr` until Ctrl+C (or SIGTERM on Unix).
///
/// # Errors
///
/// Returns bind or serve failures.
pub async fn run_http(settings: ExomindSettings, bind_addr: &str) -> Result<()> {
    let app = router(settings);
    let listener = TcpListener::bind(bind_addr).await?;
    tracing::info!("gateway listening on {} (Ctrl+C/SIGTERM to stop)", bind_addr);
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    tracing::info!("gateway stopped");
    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = tokio::signal::ctrl_c() => {}
                    _ = sigterm.recv() => {}
                }
            }
            Err(error) => {
                tracing::warn!(%error, "SIGTERM handler unavailable; Ctrl+C only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(%error, "failed to listen for Ctrl+C");
        }
    }
}
