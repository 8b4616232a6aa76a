//! Shared data models for scan results and reported issues.

use serde::Serialize;
use serde_json::Value as Json;

#[derive(Debug, Clone, Serialize)]
/// A single detected defect in prompt text.
///
/// `kind` is the stable id of the rule that produced the issue and is the
/// routing key used when replaying fixes. `details` carries the rule-specific
/// data a fix needs; fixes must not re-derive state beyond what it supplies.
pub struct Issue {
    #[serde(rename = "type")]
    pub kind: String,
    pub message: String,
    pub suggestion: String,
    pub details: Json,
}

#[derive(Debug, Serialize)]
/// Issues found in one scanned file.
pub struct FileReport {
    pub file: String,
    pub issues: Vec<Issue>,
}

#[derive(Debug, Serialize)]
/// Aggregated scan summary used by printers.
pub struct Summary {
    pub files: usize,
    pub flagged: usize,
    pub issues: usize,
}

#[derive(Debug, Serialize)]
/// Scan results container: flagged files only, plus totals.
pub struct ScanResult {
    pub results: Vec<FileReport>,
    pub summary: Summary,
}
