//! Code smell analyzer
//!
//! Runs the `style` rule set: documentation gaps, magic numbers, exception
//! handling smells, import hygiene, unused locals, mutable defaults,
//! commented-out code, TODO markers and stray `print()` calls. Issues come
//! out in a single top-to-bottom walk of the tree.

use super::{evaluate_rules, Analyzer, MatchContext};
use crate::config::ReviewConfig;
use crate::models::Issue;
use crate::parsers::ParsedSource;
use crate::rules;
use anyhow::Result;

pub struct SmellAnalyzer;

impl SmellAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SmellAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for SmellAnalyzer {
    fn name(&self) -> &str {
        "smells"
    }

    fn description(&self) -> &str {
        "Detects maintainability smells: missing docs, magic numbers, unused names and more"
    }

    fn analyze(&self, parsed: &ParsedSource, config: &ReviewConfig) -> Result<Vec<Issue>> {
        let cx = MatchContext::new(parsed, config);
        Ok(evaluate_rules(rules::style(), &cx))
    }
}
