//! Required-section check for prompt files.

use crate::models::Issue;
use crate::rules::Rule;
use regex::Regex;
use serde_json::json;

pub const RULE_ID: &str = "COMPLETENESS_CHECK";

const REQUIRED_SECTIONS: [&str; 3] = ["Task", "Success Criteria", "Examples"];

/// Checks that every required section header is present.
///
/// A section counts as present when a line starts with one or more `#`
/// markers followed by the section name and a colon or end of line,
/// whitespace-tolerant and case-insensitive.
pub struct CompletenessRule {
    sections: Vec<(&'static str, Regex)>,
}

impl CompletenessRule {
    pub fn new() -> Self {
        let sections = REQUIRED_SECTIONS
            .iter()
            .map(|name| {
                let pattern = format!(r"(?im)^\s*#+\s*{}(\s*:|\s*$)", regex::escape(name));
                (*name, Regex::new(&pattern).expect("section pattern"))
            })
            .collect();
        Self { sections }
    }
}

impl Default for CompletenessRule {
    fn default() -> Self {
        Self::new()
    }
}

impl Rule for CompletenessRule {
    fn rule_id(&self) -> &'static str {
        RULE_ID
    }

    fn description(&self) -> &'static str {
        "Checks for missing required sections (Task, Success Criteria, Examples)."
    }

    fn validate(&self, content: &str) -> Vec<Issue> {
        let mut issues = Vec::new();
        for (name, pattern) in &self.sections {
            if !pattern.is_match(content) {
                issues.push(Issue {
                    kind: RULE_ID.to_string(),
                    message: format!("Missing required section: '{name}'."),
                    suggestion: format!("Add a '## {name}' section to the prompt."),
                    details: json!({ "missing_section": name }),
                });
            }
        }
        issues
    }

    fn fix(&self, content: &str, issue: &Issue) -> String {
        match issue.details.get("missing_section").and_then(|v| v.as_str()) {
            Some(section) => format!(
                "{}\n\n## {}:\n- [Add details here]\n",
                content.trim_end(),
                section
            ),
            None => content.to_string(),
        }
    }
}
