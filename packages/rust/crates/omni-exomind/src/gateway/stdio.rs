//! Stdio gateway: line-delimited JSON-RPC 2.0 exposing index/recall/doctor as MCP tools.
//!
//! One request per line in, one response per line out. Notifications get no
//! reply; unparseable lines get a `-32700` error with a null id.

use super::{doctor_tool, index_tool, recall_tool};
use crate::config::ExomindSettings;
use crate::error::ExomindError;
use crate::link_graph::RecallWeights;
use serde_json::{Value, json};
use std::io::{BufRead, Write};
use std::path::PathBuf;

/// JSON-RPC version tag.
pub const JSONRPC_VERSION: &str = "2.0";
/// MCP protocol version reported by `initialize`.
pub const MCP_PROTOCOL_VERSION: &str = "2024-11-05";

const SERVER_NAME: &str = "exom-mcp";

const PARSE_ERROR: i64 = -32700;
const METHOD_NOT_FOUND: i64 = -32601;
const INVALID_PARAMS: i64 = -32602;
const TOOL_ERROR: i64 = -32000;

/// Tool declarations returned by `tools/list`.
#[must_use]
pub fn tool_specs() -> Value {
    json!([
        {
            "name": "exom_index",
            "description": "Index notes into ExoMind graph",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "notes_root": {"type": "string"},
                    "out_root": {"type": "string", "default": ".neural"}
                },
                "required": ["notes_root"]
            }
        },
        {
            "name": "exom_recall",
            "description": "Recall top related notes from graph",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "query": {"type": "string"},
                    "topk": {"type": "integer", "default": 10},
                    "graph": {"type": "string", "default": ".neural/graph.json"},
                    "lexical_weight": {"type": "number", "default": 1.0},
                    "graph_weight": {"type": "number", "default": 1.0}
                },
                "required": ["query"]
            }
        },
        {
            "name": "exom_doctor",
            "description": "Run runtime checks",
            "inputSchema": {
                "type": "object",
                "properties": {
                    "notes_root": {"type": "string", "default": "."},
                    "graph": {"type": "string", "default": ".neural/graph.json"}
                }
            }
        }
    ])
}

fn ok(id: &Value, result: Value) -> Value {
    json!({"jsonrpc": JSONRPC_VERSION, "id": id, "result": result})
}

fn err(id: &Value, code: i64, message: impl Into<String>) -> Value {
    json!({
        "jsonrpc": JSONRPC_VERSION,
        "id": id,
        "error": {"code": code, "message": message.into()}
    })
}

fn tool_text(payload: &Value) -> Value {
    json!({"content": [{"type": "text", "text": payload.to_string()}]})
}

fn path_arg(arguments: &Value, key: &str) -> Option<PathBuf> {
    arguments.get(key).and_then(Value::as_str).map(PathBuf::from)
}

fn number_arg(arguments: &Value, key: &str) -> Option<f64> {
    arguments.get(key).and_then(Value::as_f64)
}

fn required_str<'a>(arguments: &'a Value, key: &str) -> Result<&'a str, String> {
    arguments
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| format!("missing required argument: {key}"))
}

enum ToolFailure {
    InvalidParams(String),
    Failed(ExomindError),
}

impl From<ExomindError> for ToolFailure {
    fn from(value: ExomindError) -> Self {
        Self::Failed(value)
    }
}

fn call_index(settings: &ExomindSettings, arguments: &Value) -> Result<Value, ToolFailure> {
    let notes_root =
        PathBuf::from(required_str(arguments, "notes_root").map_err(ToolFailure::InvalidParams)?);
    let out_root = path_arg(arguments, "out_root");
    let report = index_tool(settings, &notes_root, out_root.as_deref())?;
    Ok(serde_json::to_value(report).map_err(ExomindError::from)?)
}

fn call_recall(settings: &ExomindSettings, arguments: &Value) -> Result<Value, ToolFailure> {
    let query = required_str(arguments, "query").map_err(ToolFailure::InvalidParams)?;
    let top_k = arguments
        .get("topk")
        .and_then(Value::as_u64)
        .and_then(|value| usize::try_from(value).ok());
    let graph = path_arg(arguments, "graph");
    let defaults = RecallWeights::default();
    let weights = RecallWeights {
        lexical: number_arg(arguments, "lexical_weight").unwrap_or(defaults.lexical),
        graph: number_arg(arguments, "graph_weight").unwrap_or(defaults.graph),
    };
    let rows = recall_tool(settings, graph.as_deref(), query, top_k, &weights)?;
    Ok(json!({"results": rows}))
}

fn call_doctor(settings: &ExomindSettings, arguments: &Value) -> Result<Value, ToolFailure> {
    let notes_root = path_arg(arguments, "notes_root");
    let graph = path_arg(arguments, "graph");
    let report = doctor_tool(settings, notes_root.as_deref(), graph.as_deref());
    Ok(serde_json::to_value(report).map_err(ExomindError::from)?)
}

fn call_tool(
    settings: &ExomindSettings,
    name: &str,
    arguments: &Value,
) -> Option<Result<Value, ToolFailure>> {
    match name {
        "exom_index" => Some(call_index(settings, arguments)),
        "exom_recall" => Some(call_recall(settings, arguments)),
        "exom_doctor" => Some(call_doctor(settings, arguments)),
        _ => None,
    }
}

/// Handle one decoded JSON-RPC request; `None` for notifications.
#[must_use]
pub fn handle_request(settings: &ExomindSettings, request: &Value) -> Option<Value> {
    let id = request.get("id").cloned().unwrap_or(Value::Null);
    let method = request.get("method").and_then(Value::as_str).unwrap_or("");
    let params = request.get("params").cloned().unwrap_or_else(|| json!({}));

    match method {
        "initialize" => Some(ok(
            &id,
            json!({
                "protocolVersion": MCP_PROTOCOL_VERSION,
                "serverInfo": {"name": SERVER_NAME, "version": env!("CARGO_PKG_VERSION")},
                "capabilities": {"tools": {}}
            }),
        )),
        "tools/list" => Some(ok(&id, json!({"tools": tool_specs()}))),
        "tools/call" => {
            let name = params.get("name").and_then(Value::as_str).unwrap_or("");
            let arguments = params
                .get("arguments")
                .filter(|value| !value.is_null())
                .cloned()
                .unwrap_or_else(|| json!({}));
            tracing::debug!(tool = name, "tools/call");
            Some(match call_tool(settings, name, &arguments) {
                None => err(&id, INVALID_PARAMS, format!("Unknown tool: {name}")),
                Some(Ok(payload)) => ok(&id, tool_text(&payload)),
                Some(Err(ToolFailure::InvalidParams(message))) => err(&id, INVALID_PARAMS, message),
                Some(Err(ToolFailure::Failed(error))) => {
                    tracing::warn!(tool = name, %error, "tool call failed");
                    err(&id, TOOL_ERROR, error.to_string())
                }
            })
        }
        "notifications/initialized" => None,
        _ if request.get("id").is_none() && method.starts_with("notifications/") => None,
        _ => Some(err(&id, METHOD_NOT_FOUND, format!("Method not found: {method}"))),
    }
}

/// Serve JSON-RPC over `reader`/`writer` until EOF.
///
/// # Errors
///
/// Returns I/O errors from reading requests or writing responses.
pub fn run_stdio<R, W>(settings: &ExomindSettings, reader: R, mut writer: W) -> std::io::Result<()>
where
    R: BufRead,
    W: Write,
{
    tracing::info!("stdio bridge ready");
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }
        let response = match serde_json::from_str::<Value>(line) {
            Ok(request) => handle_request(settings, &request),
            Err(error) => Some(err(&Value::Null, PARSE_ERROR, format!("Parse error: {error}"))),
        };
        if let Some(response) = response {
            writeln!(writer, "{response}")?;
            writer.flush()?;
        }
    }
    tracing::info!("stdio bridge closed");
    Ok(())
}
