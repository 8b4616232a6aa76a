//! Output rendering for scan results.
//!
//! Supports `human` (default) and `json` outputs. The JSON form includes
//! per-file issues and a top-level summary.

use crate::models::ScanResult;
use owo_colors::OwoColorize;
use serde_json::Value as JsonVal;

fn use_colors(output: &str) -> bool {
    output != "json" && std::env::var_os("NO_COLOR").is_none()
}

/// Print scan results in the requested format.
pub fn print_scan(res: &ScanResult, output: &str) {
    match output {
        "json" => println!(
            "{}",
            serde_json::to_string_pretty(&compose_scan_json(res)).unwrap()
        ),
        _ => {
            let color = use_colors(output);
            if res.results.is_empty() {
                let all_clear = "✓ All prompts passed validation.";
                if color {
                    println!("{}", all_clear.green());
                } else {
                    println!("{}", all_clear);
                }
                return;
            }
            for report in &res.results {
                for issue in &report.issues {
                    let icon = if color {
                        "✖".red().to_string()
                    } else {
                        "✖".to_string()
                    };
                    let file = if color {
                        report.file.clone().bold().to_string()
                    } else {
                        report.file.clone()
                    };
                    println!("{} {} ❲{}❳ — {}", icon, file, issue.kind, issue.message);
                    if !issue.suggestion.is_empty() {
                        if color {
                            println!("    ↳ {}", issue.suggestion.bright_black());
                        } else {
                            println!("    ↳ {}", issue.suggestion);
                        }
                    }
                }
            }
            let summary = format!(
                "— Summary — files={} flagged={} issues={}",
                res.summary.files, res.summary.flagged, res.summary.issues
            );
            if color {
                println!("{}", summary.bold());
            } else {
                println!("{}", summary);
            }
        }
    }
}

/// Compose the scan JSON object (pure) for testing/snapshot purposes.
pub fn compose_scan_json(res: &ScanResult) -> JsonVal {
    serde_json::to_value(res).unwrap()
}
