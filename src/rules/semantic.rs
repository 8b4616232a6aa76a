//! Semantic checks delegated to the external model.
//!
//! The analysis step is an opaque text completion; everything testable lives
//! in the pure reply parsers below, which take a raw reply string and return
//! parsed phrases without touching any transport.

use crate::llm::LlmTransport;
use crate::models::Issue;
use crate::rules::Rule;
use serde_json::json;
use std::sync::Arc;

pub const REDUNDANCY_RULE_ID: &str = "SEMANTIC_REDUNDANCY";
pub const CONTRADICTION_RULE_ID: &str = "SEMANTIC_CONFLICT";

const REDUNDANCY_PROMPT: &str = "You are a helpful assistant. Analyze the following text for \
    redundant sentences or phrases. A redundant phrase repeats an instruction or idea without \
    adding new information. List each distinct redundant sentence or phrase you find, one per \
    line. If there are no redundancies, respond with 'None'.";

const CONTRADICTION_PROMPT: &str = "You are an expert at analyzing instructions. Find \
    contradictory instructions. A contradiction means two instructions are *impossible* to \
    follow simultaneously (e.g., 'text must be 100 words' and 'text must be 5000 words'; 'be \
    concise' and 'be extremely verbose'). IMPORTANT: Simple repetition or emphasis (like 'be \
    detailed' and 'be very detailed') is NOT a conflict. For each conflict you find, return \
    ONLY the two conflicting phrases on separate lines, prefixed with 'PHRASE: '. If there are \
    no conflicts, respond with 'None'.";

const PHRASE_PREFIX: &str = "PHRASE: ";

/// True when a reply signals "nothing found" or a transport failure.
///
/// Failures are recognized lexically: the transport embeds the marker
/// `error` in its reply instead of failing out-of-band.
pub fn reply_inconclusive(reply: &str) -> bool {
    let trimmed = reply.trim();
    trimmed.eq_ignore_ascii_case("none") || trimmed.to_lowercase().contains("error")
}

/// Parse a redundancy reply into phrases, one per non-empty line.
pub fn parse_redundancy_reply(reply: &str) -> Vec<String> {
    if reply_inconclusive(reply) {
        return Vec::new();
    }
    reply
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(str::to_string)
        .collect()
}

/// Parse a contradiction reply into the first conflicting pair.
///
/// Only `PHRASE: `-prefixed lines count, and only the first two survive;
/// further pairs the model reports in the same reply are discarded.
pub fn parse_contradiction_reply(reply: &str) -> Option<(String, String)> {
    if reply_inconclusive(reply) {
        return None;
    }
    let mut phrases = reply
        .lines()
        .filter_map(|line| line.strip_prefix(PHRASE_PREFIX))
        .map(|rest| rest.trim().to_string());
    match (phrases.next(), phrases.next()) {
        (Some(first), Some(second)) => Some((first, second)),
        _ => None,
    }
}

/// Flags phrases that repeat earlier content without adding information.
pub struct RedundancyRule {
    transport: Arc<dyn LlmTransport>,
}

impl RedundancyRule {
    pub fn new(transport: Arc<dyn LlmTransport>) -> Self {
        Self { transport }
    }
}

impl Rule for RedundancyRule {
    fn rule_id(&self) -> &'static str {
        REDUNDANCY_RULE_ID
    }

    fn description(&self) -> &'static str {
        "Detects redundant instructions that add no new value."
    }

    fn validate(&self, content: &str) -> Vec<Issue> {
        let reply = self.transport.complete(REDUNDANCY_PROMPT, content);
        parse_redundancy_reply(&reply)
            .into_iter()
            .map(|phrase| Issue {
                kind: REDUNDANCY_RULE_ID.to_string(),
                message: format!("Redundant instruction found: '{phrase}'."),
                suggestion: "Remove the redundant phrase to make the prompt clearer.".to_string(),
                details: json!({ "redundant_phrase": phrase }),
            })
            .collect()
    }

    fn fix(&self, content: &str, issue: &Issue) -> String {
        match issue
            .details
            .get("redundant_phrase")
            .and_then(|v| v.as_str())
        {
            Some(phrase) => content.replacen(phrase, "", 1),
            None => content.to_string(),
        }
    }
}

/// Flags pairs of instructions that cannot be satisfied simultaneously.
///
/// Never rewrites the conflict; the fix only appends a review marker so a
/// human resolves it.
pub struct ContradictionRule {
    transport: Arc<dyn LlmTransport>,
}

impl ContradictionRule {
    pub fn new(transport: Arc<dyn LlmTransport>) -> Self {
        Self { transport }
    }
}

impl Rule for ContradictionRule {
    fn rule_id(&self) -> &'static str {
        CONTRADICTION_RULE_ID
    }

    fn description(&self) -> &'static str {
        "Detects contradictory requirements in the prompt."
    }

    fn validate(&self, content: &str) -> Vec<Issue> {
        let reply = self.transport.complete(CONTRADICTION_PROMPT, content);
        match parse_contradiction_reply(&reply) {
            Some((first, second)) => vec![Issue {
                kind: CONTRADICTION_RULE_ID.to_string(),
                message: format!("Conflicting instructions found: '{first}' and '{second}'."),
                suggestion: "Resolve the contradiction between the instructions.".to_string(),
                details: json!({ "conflicting_phrases": [first, second] }),
            }],
            None => Vec::new(),
        }
    }

    fn fix(&self, content: &str, issue: &Issue) -> String {
        let phrases = issue
            .details
            .get("conflicting_phrases")
            .and_then(|v| v.as_array());
        match phrases {
            Some(pair) if pair.len() == 2 => {
                let first = pair[0].as_str().unwrap_or_default();
                let second = pair[1].as_str().unwrap_or_default();
                format!(
                    "{}\n\n# TODO: Resolve conflicting instructions: '{first}' AND '{second}'\n",
                    content.trim_end()
                )
            }
            _ => content.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Canned transport returning a fixed reply for every call.
    pub struct StaticTransport(pub String);

    impl LlmTransport for StaticTransport {
        fn complete(&self, _system_prompt: &str, _user_content: &str) -> String {
            self.0.clone()
        }
    }

    fn transport(reply: &str) -> Arc<dyn LlmTransport> {
        Arc::new(StaticTransport(reply.to_string()))
    }

    #[test]
    fn test_none_reply_yields_no_issues() {
        let redundancy = RedundancyRule::new(transport("None"));
        assert!(redundancy.validate("anything").is_empty());

        let contradiction = ContradictionRule::new(transport("None"));
        assert!(contradiction.validate("anything").is_empty());
    }

    #[test]
    fn test_error_reply_is_inconclusive() {
        assert!(parse_redundancy_reply("Error querying model: timeout").is_empty());
        assert!(parse_contradiction_reply("PHRASE: a\nPHRASE: b\nerror").is_none());
    }

    #[test]
    fn test_redundancy_lines_become_issues() {
        let rule = RedundancyRule::new(transport("be brief\n\n  be short  \n"));
        let issues = rule.validate("prompt text");
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].details["redundant_phrase"].as_str(), Some("be brief"));
        assert_eq!(issues[1].details["redundant_phrase"].as_str(), Some("be short"));
    }

    #[test]
    fn test_redundancy_fix_removes_first_occurrence() {
        let rule = RedundancyRule::new(transport("None"));
        let issues = vec![Issue {
            kind: REDUNDANCY_RULE_ID.to_string(),
            message: String::new(),
            suggestion: String::new(),
            details: json!({ "redundant_phrase": "be short" }),
        }];
        let fixed = rule.fix("be short, be short", &issues[0]);
        assert_eq!(fixed, ", be short");
    }

    #[test]
    fn test_contradiction_first_pair_only() {
        let reply = "PHRASE: always answer in English\nPHRASE: always answer in French";
        let rule = ContradictionRule::new(transport(reply));
        let issues = rule.validate("prompt text");
        assert_eq!(issues.len(), 1);
        assert_eq!(
            issues[0].details["conflicting_phrases"],
            json!(["always answer in English", "always answer in French"])
        );

        // Extra pairs beyond the first two lines are discarded.
        let extra = "PHRASE: a\nPHRASE: b\nPHRASE: c\nPHRASE: d";
        assert_eq!(
            parse_contradiction_reply(extra),
            Some(("a".to_string(), "b".to_string()))
        );
    }

    #[test]
    fn test_single_phrase_is_not_a_conflict() {
        assert!(parse_contradiction_reply("PHRASE: only one").is_none());
        assert!(parse_contradiction_reply("no phrase lines at all\njust prose").is_none());
    }

    #[test]
    fn test_contradiction_fix_appends_review_marker() {
        let rule = ContradictionRule::new(transport("None"));
        let issue = Issue {
            kind: CONTRADICTION_RULE_ID.to_string(),
            message: String::new(),
            suggestion: String::new(),
            details: json!({ "conflicting_phrases": ["be terse", "be verbose"] }),
        };
        let fixed = rule.fix("prompt body\n", &issue);
        assert_eq!(
            fixed,
            "prompt body\n\n# TODO: Resolve conflicting instructions: 'be terse' AND 'be verbose'\n"
        );
    }
}
