//! PII and secret detection.

use crate::models::Issue;
use crate::rules::Rule;
use regex::Regex;
use serde_json::json;

pub const RULE_ID: &str = "PII_CHECK";

// Pattern families in fixed order so issue order is stable per file.
const PII_PATTERNS: [(&str, &str); 3] = [
    ("EMAIL", r"\b[A-Za-z0-9._%+-]+@[A-Za-z0-9.-]+\.[A-Za-z]{2,}\b"),
    (
        "PHONE_NUMBER",
        r"\b(?:\+?\d{1,3}[-.\s]?)?\(?\d{3}\)?[-.\s]?\d{3}[-.\s]?\d{4}\b",
    ),
    (
        "GENERIC_SECRET",
        r"\b(sk|rk|ghp|xoxp|xoxb|slack|token|key|secret)_[a-zA-Z0-9]{20,}\b",
    ),
];

/// Detects emails, phone numbers, and marker-prefixed secret tokens.
///
/// One issue per match, not per pattern family; the same literal matched
/// twice yields two issues, and each fix consumes one occurrence.
pub struct PiiRule {
    patterns: Vec<(&'static str, Regex)>,
}

impl PiiRule {
    pub fn new() -> Self {
        let patterns = PII_PATTERNS
            .iter()
            .map(|(kind, pattern)| (*kind, Regex::new(pattern).expect("pii pattern")))
            .collect();
        Self { patterns }
    }
}

impl Default for PiiRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for PiiRule {
    fn rule_id(&self) -> &'static str {
        RULE_ID
    }

    fn description(&self) -> &'static str {
        "Checks for prohibited content like PII or secrets."
    }

    fn validate(&self, content: &str) -> Vec<Issue> {
        let mut issues = Vec::new();
        for (pii_type, pattern) in &self.patterns {
            for m in pattern.find_iter(content) {
                issues.push(Issue {
                    kind: RULE_ID.to_string(),
                    message: format!("Potential PII detected: ({pii_type}) '{}'.", m.as_str()),
                    suggestion: "Remove or replace PII with a placeholder like [REDACTED]."
                        .to_string(),
                    details: json!({ "pii_type": pii_type, "value": m.as_str() }),
                });
            }
        }
        issues
    }

    fn fix(&self, content: &str, issue: &Issue) -> String {
        let value = issue.details.get("value").and_then(|v| v.as_str());
        let pii_type = issue.details.get("pii_type").and_then(|v| v.as_str());
        match (value, pii_type) {
            // First remaining occurrence only; N issues for the same literal
            // consume N occurrences, one per replay.
            (Some(value), Some(pii_type)) => {
                content.replacen(value, &format!("[REDACTED_{pii_type}]"), 1)
            }
            _ => content.to_string(),
        }
    }
}
