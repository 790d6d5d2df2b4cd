//! Issue analyzers
//!
//! Each analyzer consumes one parsed file and the review configuration and
//! returns issues. The security, smells and custom analyzers are thin
//! wrappers around a rule set from the pattern library; the generic
//! [`evaluate_rules`] engine walks the tree once and asks every applicable
//! rule about every node. The complexity analyzer measures functions,
//! classes, lines and the file and compares against configured thresholds.
//!
//! # Architecture
//!
//! ```text
//! ParsedSource ──► Analyzer::analyze ──► Vec<Issue>
//!                     │
//!                     ├── security   (rules::security())
//!                     ├── complexity (measurements + rules::complexity())
//!                     ├── smells     (rules::style())
//!                     └── custom     (pyreview.toml [[custom_rules]])
//! ```

mod base;
mod conditions;
mod context;
mod names;

pub mod complexity;
pub mod custom;
pub mod security;
pub mod smells;

pub use base::{Analyzer, AnalyzerRun};
pub use complexity::ComplexityAnalyzer;
pub use context::MatchContext;
pub use custom::CustomRuleAnalyzer;
pub use security::SecurityAnalyzer;
pub use smells::SmellAnalyzer;

use crate::config::{ConfigError, ReviewConfig, CUSTOM_ANALYZER};
use crate::models::Issue;
use crate::parsers::ParsedSource;
use crate::rules::{Predicate, Rule, RuleSet};
use conditions::Hit;
use std::sync::Arc;
use tracing::{debug, error};

/// Create the built-in analyzer registered under `name`.
pub fn builtin_analyzer(name: &str) -> Option<Arc<dyn Analyzer>> {
    match name {
        "security" => Some(Arc::new(SecurityAnalyzer::new())),
        "complexity" => Some(Arc::new(ComplexityAnalyzer::new())),
        "smells" => Some(Arc::new(SmellAnalyzer::new())),
        _ => None,
    }
}

/// Analyzers enabled by `config`, in configuration order.
///
/// `extra` holds user-registered analyzers; they are looked up by name after
/// the built-ins. The `custom` name resolves to the config's own rules, which
/// also run when declared but not listed.
pub fn enabled_analyzers(
    config: &ReviewConfig,
    extra: &[Arc<dyn Analyzer>],
) -> Result<Vec<Arc<dyn Analyzer>>, ConfigError> {
    let mut analyzers = Vec::with_capacity(config.analyzers.len());
    for name in &config.analyzers {
        let analyzer = if let Some(a) = builtin_analyzer(name) {
            a
        } else if let Some(a) = extra.iter().find(|a| a.name() == name) {
            Arc::clone(a)
        } else if name == CUSTOM_ANALYZER {
            Arc::new(CustomRuleAnalyzer::from_specs(&config.custom_rules)?) as Arc<dyn Analyzer>
        } else {
            return Err(ConfigError::UnknownAnalyzer {
                name: name.clone(),
                available: crate::config::BUILTIN_ANALYZERS.join(", "),
            });
        };
        analyzers.push(analyzer);
    }
    if !config.custom_rules.is_empty() && !config.is_enabled(CUSTOM_ANALYZER) {
        analyzers.push(Arc::new(CustomRuleAnalyzer::from_specs(&config.custom_rules)?));
    }
    Ok(analyzers)
}

/// Run one analyzer with panic isolation.
///
/// A panic or an `Err` yields a failed run with no issues; the caller keeps
/// every other analyzer's output for the file.
pub fn run_analyzer(
    analyzer: &dyn Analyzer,
    parsed: &ParsedSource,
    config: &ReviewConfig,
) -> AnalyzerRun {
    let name = analyzer.name().to_string();

    let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
        analyzer.analyze(parsed, config)
    }));

    match outcome {
        Ok(Ok(issues)) => {
            debug!(
                "Analyzer {} found {} issues in {}",
                name,
                issues.len(),
                parsed.path()
            );
            AnalyzerRun::success(name, issues)
        }
        Ok(Err(e)) => {
            error!("Analyzer {} failed on {}: {:#}", name, parsed.path(), e);
            AnalyzerRun::failure(name, e.to_string())
        }
        Err(panic_info) => {
            let panic_msg = if let Some(s) = panic_info.downcast_ref::<&str>() {
                s.to_string()
            } else if let Some(s) = panic_info.downcast_ref::<String>() {
                s.clone()
            } else {
                "Unknown panic".to_string()
            };
            error!(
                "Analyzer {} panicked on {}: {}",
                name,
                parsed.path(),
                panic_msg
            );
            AnalyzerRun::failure(name, format!("Panic: {}", panic_msg))
        }
    }
}

/// Evaluate every node, comment and line rule of `rules` over one file.
///
/// Node and comment rules fire during a single pre-order walk, rules in
/// catalog order at each node. Line rules follow, top to bottom, skipping
/// comment-only lines. Threshold rules are ignored here.
pub fn evaluate_rules(rules: &RuleSet, cx: &MatchContext) -> Vec<Issue> {
    let parsed = cx.parsed;
    let mut issues = Vec::new();

    for node in parsed.walk() {
        if !node.is_named() {
            continue;
        }
        for rule in rules.iter().filter(|r| r.applies_to(node.kind())) {
            match &rule.predicate {
                Predicate::Node { condition, .. } => {
                    for hit in conditions::evaluate(condition, node, cx) {
                        issues.push(hit_issue(rule, hit, cx));
                    }
                }
                Predicate::Comment(pattern) => {
                    let text = parsed.text(node).trim_start_matches('#').trim();
                    if let Some(found) = pattern.find(text) {
                        let hit = Hit {
                            node,
                            args: vec![
                                ("marker", found.as_str().to_string()),
                                ("text", text.to_string()),
                            ],
                            meta: vec![("marker", found.as_str().into())],
                            code: None,
                        };
                        issues.push(hit_issue(rule, hit, cx));
                    }
                }
                _ => {}
            }
        }
    }

    let line_rules: Vec<&Rule> = rules
        .iter()
        .filter(|r| matches!(r.predicate, Predicate::Line(_)))
        .collect();
    if !line_rules.is_empty() {
        for (idx, line) in parsed.lines().enumerate() {
            let trimmed = line.trim_start();
            if trimmed.is_empty() || trimmed.starts_with('#') {
                continue;
            }
            for rule in &line_rules {
                let Predicate::Line(pattern) = &rule.predicate else {
                    continue;
                };
                if let Some(found) = pattern.find(line) {
                    let column = line[..found.start()].chars().count() + 1;
                    let args = [("match", found.as_str().to_string())];
                    issues.push(
                        rule.issue(parsed.path(), (idx + 1, column), &args)
                            .with_code(line.trim())
                            .with_meta("match", found.as_str()),
                    );
                }
            }
        }
    }

    issues
}

fn hit_issue(rule: &Rule, hit: Hit, cx: &MatchContext) -> Issue {
    let parsed = cx.parsed;
    let (line, column) = parsed.position(hit.node);
    let (end_line, end_column) = parsed.end_position(hit.node);
    let code = hit
        .code
        .unwrap_or_else(|| parsed.line(line).trim().to_string());

    let mut issue = rule
        .issue(parsed.path(), (line, column), &hit.args)
        .with_end(end_line, end_column)
        .with_code(code);
    for (key, value) in hit.meta {
        issue = issue.with_meta(key, value);
    }
    issue
}
