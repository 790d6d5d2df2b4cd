//! Rules command - list the pattern library

use crate::rules::{builtin_sets, Rule, RuleSet};
use anyhow::Result;
use console::style;

fn render_set(set: &RuleSet) -> String {
    let mut out = format!("\n{} ({} rules)\n", style(set.name()).bold(), set.len());
    for rule in set {
        out.push_str(&render_rule(rule));
    }
    out
}

fn render_rule(rule: &Rule) -> String {
    format!(
        "  {:<9} {:<40} {}\n",
        rule.severity.to_string(),
        rule.id,
        style(&rule.issue_type).dim()
    )
}

/// Listing for `category`, or every built-in set.
pub(super) fn listing(category: Option<&str>) -> String {
    builtin_sets()
        .into_iter()
        .filter(|set| category.map_or(true, |c| set.name() == c))
        .map(render_set)
        .collect()
}

/// Run the rules command
pub fn run(category: Option<&str>) -> Result<()> {
    print!("{}", listing(category));
    Ok(())
}
