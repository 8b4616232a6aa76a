//! Validation orchestrator: runs the active rule set over file content and
//! replays fixes.
//!
//! Rules are constructed once and reused across all files in a run. A file's
//! content and issues are transient, scoped to one validate/fix cycle.

use crate::models::Issue;
use crate::rules::Rule;
use serde_json::json;
use std::collections::HashMap;
use std::fs;
use std::path::Path;

/// Synthetic issue kind for content sources that could not be read. No rule
/// owns it, so it passes through the fix loop untouched.
pub const FILE_ERROR: &str = "FILE_ERROR";

pub struct Validator {
    rules: Vec<Box<dyn Rule>>,
    // rule_id -> position in `rules`; ids are unique per rule set.
    by_id: HashMap<&'static str, usize>,
}

impl Validator {
    pub fn new(rules: Vec<Box<dyn Rule>>) -> Self {
        let by_id = rules
            .iter()
            .enumerate()
            .map(|(idx, rule)| (rule.rule_id(), idx))
            .collect();
        Self { rules, by_id }
    }

    pub fn rules(&self) -> &[Box<dyn Rule>] {
        &self.rules
    }

    /// Run every rule against `content`, concatenating issues in rule
    /// registration order.
    pub fn validate(&self, content: &str) -> Vec<Issue> {
        let mut issues = Vec::new();
        for rule in &self.rules {
            issues.extend(rule.validate(content));
        }
        issues
    }

    /// Read and validate one file. An unreadable file becomes a single
    /// `FILE_ERROR` issue instead of an error; no further rules run for it.
    pub fn validate_file(&self, path: &Path) -> (String, Vec<Issue>) {
        let content = match fs::read_to_string(path) {
            Ok(s) => s,
            Err(e) => {
                return (
                    String::new(),
                    vec![Issue {
                        kind: FILE_ERROR.to_string(),
                        message: e.to_string(),
                        suggestion: "Check that the file exists and is valid UTF-8.".to_string(),
                        details: json!({}),
                    }],
                );
            }
        };
        let issues = self.validate(&content);
        (content, issues)
    }

    /// Replay `issues` in the order supplied, threading the content returned
    /// by each fix into the next. Issues whose kind matches no rule are
    /// silently skipped. Overlapping-text fixes depend on this ordering.
    pub fn fix(&self, content: &str, issues: &[Issue]) -> String {
        let mut updated = content.to_string();
        for issue in issues {
            if let Some(&idx) = self.by_id.get(issue.kind.as_str()) {
                updated = self.rules[idx].fix(&updated, issue);
            }
        }
        updated
    }

    /// Apply fixes and persist the result. Returns `Ok(true)` when the file
    /// was rewritten and `Ok(false)` when no fix changed the content, so the
    /// caller knows nothing was written.
    pub fn fix_file(
        &self,
        path: &Path,
        content: &str,
        issues: &[Issue],
    ) -> std::io::Result<bool> {
        let updated = self.fix(content, issues);
        if updated == content {
            return Ok(false);
        }
        fs::write(path, updated)?;
        Ok(true)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::LlmTransport;
    use crate::rules::{default_rules, pii};
    use std::sync::Arc;
    use tempfile::tempdir;

    struct StaticTransport(&'static str);

    impl LlmTransport for StaticTransport {
        fn complete(&self, _system_prompt: &str, _user_content: &str) -> String {
            self.0.to_string()
        }
    }

    fn validator_with_reply(reply: &'static str) -> Validator {
        Validator::new(default_rules(Some(Arc::new(StaticTransport(reply)))))
    }

    fn pattern_validator() -> Validator {
        Validator::new(default_rules(None))
    }

    #[test]
    fn test_issues_concatenate_in_registration_order() {
        let v = validator_with_reply("None");
        let content = "Please write a short paragraph. Contact me at test@example.com for questions.";
        let issues = v.validate(content);
        // 3 completeness issues first, then 1 PII issue, semantic rules quiet.
        assert_eq!(issues.len(), 4);
        assert!(issues[..3].iter().all(|i| i.kind == "COMPLETENESS_CHECK"));
        assert_eq!(issues[3].kind, pii::RULE_ID);
    }

    #[test]
    fn test_end_to_end_fix_cycle() {
        let v = validator_with_reply("None");
        let content = "Please write a short paragraph. Contact me at test@example.com for questions.";
        let issues = v.validate(content);
        let fixed = v.fix(content, &issues);

        assert!(fixed.contains("[REDACTED_EMAIL]"));
        assert!(!fixed.contains("test@example.com"));
        assert!(fixed.contains("## Task:"));
        assert!(fixed.contains("## Success Criteria:"));
        assert!(fixed.contains("## Examples:"));

        assert!(v.validate(&fixed).is_empty());
    }

    #[test]
    fn test_unknown_issue_kind_is_skipped() {
        let v = pattern_validator();
        let issues = vec![Issue {
            kind: "NO_SUCH_RULE".to_string(),
            message: String::new(),
            suggestion: String::new(),
            details: json!({}),
        }];
        assert_eq!(v.fix("unchanged", &issues), "unchanged");
    }

    #[test]
    fn test_unreadable_file_becomes_file_error_issue() {
        let v = pattern_validator();
        let dir = tempdir().unwrap();
        let (content, issues) = v.validate_file(&dir.path().join("missing.txt"));
        assert!(content.is_empty());
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].kind, FILE_ERROR);
    }

    #[test]
    fn test_fix_file_writes_only_on_change() {
        let v = pattern_validator();
        let dir = tempdir().unwrap();
        let path = dir.path().join("p.txt");
        fs::write(&path, "reach me: a@b.com").unwrap();

        let (content, issues) = v.validate_file(&path);
        let pii_only: Vec<Issue> = issues
            .into_iter()
            .filter(|i| i.kind == pii::RULE_ID)
            .collect();
        assert!(v.fix_file(&path, &content, &pii_only).unwrap());
        assert_eq!(
            fs::read_to_string(&path).unwrap(),
            "reach me: [REDACTED_EMAIL]"
        );

        // Replaying the same issues against the fixed content changes nothing.
        let updated = fs::read_to_string(&path).unwrap();
        assert!(!v.fix_file(&path, &updated, &pii_only).unwrap());
    }

    #[test]
    fn test_fix_order_is_left_to_right() {
        let v = pattern_validator();
        let content = "x@y.com x@y.com x@y.com";
        let issues = v.validate(content);
        let emails: Vec<Issue> = issues
            .into_iter()
            .filter(|i| i.kind == pii::RULE_ID)
            .collect();
        assert_eq!(emails.len(), 3);

        // Applying only two of the three issues redacts exactly two
        // occurrences, front to back.
        let partial = v.fix(content, &emails[..2]);
        assert_eq!(partial, "[REDACTED_EMAIL] [REDACTED_EMAIL] x@y.com");
    }
}
