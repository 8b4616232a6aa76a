//! Directory scan: expand targets, validate each file, aggregate a report.
//!
//! Files are validated in parallel; rule instances are read-only after
//! construction, so the validator is shared by reference. Fix application
//! stays sequential and is driven by the caller.

use crate::models::{FileReport, ScanResult, Summary};
use crate::validator::Validator;
use glob::glob;
use rayon::prelude::*;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Scan `dir` for files with `extension` (non-recursive) and validate each.
///
/// Returns the report plus the original contents of flagged files, keyed by
/// path, for a later fix pass. Issue order within a file follows rule
/// registration order; files are reported in sorted path order.
pub fn run_scan(
    dir: &Path,
    extension: &str,
    validator: &Validator,
) -> (ScanResult, HashMap<String, String>) {
    let pattern = dir.join(format!("*.{extension}"));
    let mut targets: Vec<PathBuf> = Vec::new();
    if let Ok(entries) = glob(&pattern.to_string_lossy()) {
        for entry in entries.flatten() {
            if entry.is_file() {
                targets.push(entry);
            }
        }
    }
    targets.sort();

    let per_file: Vec<(String, String, Vec<crate::models::Issue>)> = targets
        .par_iter()
        .map(|path| {
            let (content, issues) = validator.validate_file(path);
            (path.to_string_lossy().to_string(), content, issues)
        })
        .collect();

    let files = per_file.len();
    let mut results = Vec::new();
    let mut contents = HashMap::new();
    let mut total_issues = 0usize;
    for (file, content, issues) in per_file {
        if issues.is_empty() {
            continue;
        }
        total_issues += issues.len();
        contents.insert(file.clone(), content);
        results.push(FileReport { file, issues });
    }

    let summary = Summary {
        files,
        flagged: results.len(),
        issues: total_issues,
    };
    (ScanResult { results, summary }, contents)
}
