//! Runtime settings: built-in defaults, optional YAML overlay, env overrides.
//!
//! Resolution order (later wins):
//! 1) defaults below
//! 2) `$PRJ_CONFIG_HOME/exomind.yaml` (else `./.config/exomind.yaml`), if present
//! 3) explicit `--conf FILE`, deep-merged on top
//! 4) `EXOMIND_NOTE_DIRS` (comma separated), `EXOMIND_TOP_K`, `EXOMIND_BIND`
//!
//! ```yaml
//! link_graph:
//!   note_dirs: [00_Inbox, 10_Projects]
//!   capture_content: true
//!   content_max_chars: 8000
//! recall:
//!   top_k: 10
//! paths:
//!   out_root: .neural
//! gateway:
//!   bind: 127.0.0.1:8787
//! ```

use crate::error::{ExomindError, ExomindResult};
use crate::link_graph::{
    DEFAULT_CONTENT_MAX_CHARS, DEFAULT_NOTE_DIRS, DEFAULT_TOP_K, GRAPH_FILE_NAME,
    LinkGraphBuildOptions,
};
use serde_yaml::{Mapping, Value};
use std::path::{Path, PathBuf};

/// Env override for category directories.
pub const EXOMIND_NOTE_DIRS_ENV: &str = "EXOMIND_NOTE_DIRS";
/// Env override for the default recall size.
pub const EXOMIND_TOP_K_ENV: &str = "EXOMIND_TOP_K";
/// Env override for the HTTP bind address.
pub const EXOMIND_BIND_ENV: &str = "EXOMIND_BIND";

const CONFIG_FILE_NAME: &str = "exomind.yaml";
const DEFAULT_OUT_ROOT: &str = ".neural";
const DEFAULT_BIND: &str = "127.0.0.1:8787";

/// Resolved runtime settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExomindSettings {
    /// Category directories scanned under the notes root.
    pub note_dirs: Vec<String>,
    /// Whether index captures content snippets.
    pub capture_content: bool,
    /// Snippet length when capturing content.
    pub content_max_chars: usize,
    /// Default recall size.
    pub top_k: usize,
    /// Default output root for the snapshot.
    pub out_root: PathBuf,
    /// HTTP gateway bind address.
    pub bind: String,
}

impl Default for ExomindSettings {
    fn default() -> Self {
        Self {
            note_dirs: DEFAULT_NOTE_DIRS.iter().map(|dir| (*dir).to_string()).collect(),
            capture_content: true,
            content_max_chars: DEFAULT_CONTENT_MAX_CHARS,
            top_k: DEFAULT_TOP_K,
            out_root: PathBuf::from(DEFAULT_OUT_ROOT),
            bind: DEFAULT_BIND.to_string(),
        }
    }
}

impl ExomindSettings {
    /// Build options for the index operation.
    #[must_use]
    pub fn build_options(&self) -> LinkGraphBuildOptions {
        LinkGraphBuildOptions {
            note_dirs: self.note_dirs.clone(),
            content_max_chars: self.capture_content.then_some(self.content_max_chars),
        }
    }

    /// Default snapshot path (`<out_root>/graph.json`).
    #[must_use]
    pub fn graph_path(&self) -> PathBuf {
        self.out_root.join(GRAPH_FILE_NAME)
    }
}

fn read_yaml_file(path: &Path) -> ExomindResult<Value> {
    let content = std::fs::read_to_string(path).map_err(|source| ExomindError::io(path, source))?;
    serde_yaml::from_str::<Value>(&content)
        .map_err(|err| ExomindError::Config(format!("{}: {err}", path.display())))
}

fn default_config_path() -> PathBuf {
    if let Ok(raw) = std::env::var("PRJ_CONFIG_HOME") {
        let trimmed = raw.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed).join(CONFIG_FILE_NAME);
        }
    }
    PathBuf::from(".config").join(CONFIG_FILE_NAME)
}

fn deep_merge(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Mapping(base_map), Value::Mapping(overlay_map)) => {
            for (key, value) in overlay_map {
                if let Some(existing) = base_map.get_mut(&key) {
                    deep_merge(existing, value);
                } else {
                    base_map.insert(key, value);
                }
            }
        }
        (base_value, overlay_value) => {
            *base_value = overlay_value;
        }
    }
}

fn get_setting_value<'a>(settings: &'a Value, dotted_key: &str) -> Option<&'a Value> {
    let mut cursor = settings;
    for segment in dotted_key.split('.') {
        match cursor {
            Value::Mapping(map) => {
                let key = Value::String(segment.to_string());
                cursor = map.get(&key)?;
            }
            _ => return None,
        }
    }
    Some(cursor)
}

fn setting_value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(value) => Some(value.clone()),
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        _ => None,
    }
}

fn get_setting_string(settings: &Value, dotted_key: &str) -> Option<String> {
    get_setting_value(settings, dotted_key).and_then(setting_value_to_string)
}

fn get_setting_bool(settings: &Value, dotted_key: &str) -> Option<bool> {
    match get_setting_value(settings, dotted_key)? {
        Value::Bool(flag) => Some(*flag),
        Value::String(text) => match text.trim().to_lowercase().as_str() {
            "1" | "true" | "yes" | "on" => Some(true),
            "0" | "false" | "no" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    }
}

fn get_setting_usize(settings: &Value, dotted_key: &str) -> Option<usize> {
    get_setting_string(settings, dotted_key).and_then(|raw| parse_positive_usize(&raw))
}

fn get_setting_string_list(settings: &Value, dotted_key: &str) -> Vec<String> {
    match get_setting_value(settings, dotted_key) {
        Some(Value::String(single)) => split_dir_list(single),
        Some(Value::Sequence(items)) => items
            .iter()
            .filter_map(setting_value_to_string)
            .filter_map(|item| normalize_relative_dir(&item))
            .collect(),
        _ => Vec::new(),
    }
}

fn parse_positive_usize(raw: &str) -> Option<usize> {
    raw.trim().parse::<usize>().ok().filter(|value| *value > 0)
}

fn normalize_relative_dir(value: &str) -> Option<String> {
    let normalized = value
        .trim()
        .replace('\\', "/")
        .trim_matches('/')
        .to_string();
    if normalized.is_empty() || normalized == "." {
        None
    } else {
        Some(normalized)
    }
}

fn split_dir_list(raw: &str) -> Vec<String> {
    raw.split(',').filter_map(normalize_relative_dir).collect()
}

/// Apply a YAML document and env lookups on top of the defaults.
#[must_use]
pub fn resolve_settings<F>(yaml: Option<&Value>, env: F) -> ExomindSettings
where
    F: Fn(&str) -> Option<String>,
{
    let mut settings = ExomindSettings::default();
    if let Some(yaml) = yaml {
        let note_dirs = get_setting_string_list(yaml, "link_graph.note_dirs");
        if !note_dirs.is_empty() {
            settings.note_dirs = note_dirs;
        }
        if let Some(flag) = get_setting_bool(yaml, "link_graph.capture_content") {
            settings.capture_content = flag;
        }
        if let Some(max_chars) = get_setting_usize(yaml, "link_graph.content_max_chars") {
            settings.content_max_chars = max_chars;
        }
        if let Some(top_k) = get_setting_usize(yaml, "recall.top_k") {
            settings.top_k = top_k;
        }
        if let Some(out_root) = get_setting_string(yaml, "paths.out_root")
            .map(|raw| raw.trim().to_string())
            .filter(|raw| !raw.is_empty())
        {
            settings.out_root = PathBuf::from(out_root);
        }
        if let Some(bind) = get_setting_string(yaml, "gateway.bind") {
            settings.bind = bind.trim().to_string();
        }
    }

    if let Some(raw) = env(EXOMIND_NOTE_DIRS_ENV) {
        let dirs = split_dir_list(&raw);
        if !dirs.is_empty() {
            settings.note_dirs = dirs;
        }
    }
    if let Some(top_k) = env(EXOMIND_TOP_K_ENV).and_then(|raw| parse_positive_usize(&raw)) {
        settings.top_k = top_k;
    }
    if let Some(bind) = env(EXOMIND_BIND_ENV)
        .map(|raw| raw.trim().to_string())
        .filter(|raw| !raw.is_empty())
    {
        settings.bind = bind;
    }
    settings
}

/// Load settings: the default-location file (optional) overlaid by
/// `config_file` (must exist), then process env overrides.
///
/// # Errors
///
/// Returns [`ExomindError::Config`] or an I/O error when the explicit file
/// is missing or a YAML file is malformed.
pub fn load_settings(config_file: Option<&Path>) -> ExomindResult<ExomindSettings> {
    let mut merged = Value::Mapping(Mapping::new());
    let default_path = default_config_path();
    if default_path.is_file() {
        deep_merge(&mut merged, read_yaml_file(&default_path)?);
    }
    if let Some(path) = config_file {
        if !path.is_file() {
            return Err(ExomindError::Config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        deep_merge(&mut merged, read_yaml_file(path)?);
    }
    let settings = resolve_settings(Some(&merged), |key| std::env::var(key).ok());
    tracing::debug!(?settings, "settings resolved");
    Ok(settings)
}
