//! Validation rules: detection plus mechanical fixes.
//!
//! Every rule satisfies the same contract so the validator can treat
//! pattern-matching and model-delegating rules uniformly. Rules are built
//! once per validator and reused across all scanned files; they hold no
//! per-file state.

pub mod completeness;
pub mod pii;
pub mod semantic;

use crate::llm::LlmTransport;
use crate::models::Issue;
use std::sync::Arc;

/// A self-contained detector and fixer for one category of defect.
pub trait Rule: Send + Sync {
    /// Stable id, unique across the active rule set. Issues carry it as
    /// their `type` and the validator routes fixes through it.
    fn rule_id(&self) -> &'static str;

    /// Human-readable description; documentation only.
    fn description(&self) -> &'static str;

    /// Report zero or more issues for `content`. Must not fail for any
    /// text input; external-dependency trouble degrades to no issues.
    fn validate(&self, content: &str) -> Vec<Issue>;

    /// Return `content` with the defect described by `issue` addressed.
    /// Total over any issue this rule produced; when `details` lacks the
    /// expected key the content passes through unchanged.
    fn fix(&self, content: &str, issue: &Issue) -> String;
}

/// Build the default rule set in registration order. Semantic rules are
/// included only when a transport is supplied.
pub fn default_rules(transport: Option<Arc<dyn LlmTransport>>) -> Vec<Box<dyn Rule>> {
    let mut rules: Vec<Box<dyn Rule>> = vec![
        Box::new(completeness::CompletenessRule::new()),
        Box::new(pii::PiiRule::new()),
    ];
    if let Some(transport) = transport {
        rules.push(Box::new(semantic::RedundancyRule::new(transport.clone())));
        rules.push(Box::new(semantic::ContradictionRule::new(transport)));
    }
    rules
}
