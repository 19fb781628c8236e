//! Runtime health checks for a notes root and its snapshot.

use crate::link_graph::collect_notes;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// One named check.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorCheck {
    /// Stable check name.
    pub name: String,
    /// Whether the check passed.
    pub ok: bool,
    /// Human-readable detail.
    pub info: String,
    /// Optional checks never fail the overall report.
    #[serde(default)]
    pub optional: bool,
}

impl DoctorCheck {
    fn required(name: &str, ok: bool, info: String) -> Self {
        Self {
            name: name.to_string(),
            ok,
            info,
            optional: false,
        }
    }
}

/// All checks plus the overall verdict.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoctorReport {
    /// All required checks passed.
    pub ok: bool,
    /// Checks in evaluation order.
    pub checks: Vec<DoctorCheck>,
}

/// Check the notes root, note discovery, the snapshot file, and whether the
/// HTTP gateway was compiled in (optional).
#[must_use]
pub fn doctor_report(notes_root: &Path, graph_path: &Path, note_dirs: &[String]) -> DoctorReport {
    let mut checks = Vec::new();
    let root_exists = notes_root.is_dir();
    checks.push(DoctorCheck::required(
        "notes_root_exists",
        root_exists,
        notes_root.display().to_string(),
    ));

    let note_check = if root_exists {
        let count = collect_notes(notes_root, note_dirs).len();
        DoctorCheck::required("markdown_notes_detected", count > 0, format!("count={count}"))
    } else {
        DoctorCheck::required("markdown_notes_detected", false, "notes_root missing".to_string())
    };
    checks.push(note_check);

    checks.push(DoctorCheck::required(
        "graph_exists",
        graph_path.is_file(),
        graph_path.display().to_string(),
    ));

    checks.push(DoctorCheck {
        name: "http_gateway_available".to_string(),
        ok: cfg!(feature = "gateway"),
        info: "optional for serve".to_string(),
        optional: true,
    });

    let ok = checks.iter().filter(|check| !check.optional).all(|check| check.ok);
    DoctorReport { ok, checks }
}
