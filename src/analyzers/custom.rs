//! User-defined line-pattern rules
//!
//! `[[custom_rules]]` entries from `pyreview.toml` compile into a rule set
//! named `custom`. Each rule is a regex over source lines; comment-only
//! lines are never matched.

use super::{evaluate_rules, Analyzer, MatchContext};
use crate::config::{ConfigError, CustomRuleSpec, ReviewConfig, CUSTOM_ANALYZER};
use crate::models::Issue;
use crate::parsers::ParsedSource;
use crate::rules::RuleSet;
use anyhow::Result;

pub struct CustomRuleAnalyzer {
    rules: RuleSet,
}

impl CustomRuleAnalyzer {
    pub fn new(rules: RuleSet) -> Self {
        Self { rules }
    }

    pub fn from_specs(specs: &[CustomRuleSpec]) -> Result<Self, ConfigError> {
        Ok(Self::new(RuleSet::from_specs(specs)?))
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }
}

impl Analyzer for CustomRuleAnalyzer {
    fn name(&self) -> &str {
        CUSTOM_ANALYZER
    }

    fn description(&self) -> &str {
        "Runs line-pattern rules declared in pyreview.toml"
    }

    fn analyze(&self, parsed: &ParsedSource, config: &ReviewConfig) -> Result<Vec<Issue>> {
        let cx = MatchContext::new(parsed, config);
        Ok(evaluate_rules(&self.rules, &cx))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use crate::parsers::parse;

    fn spec(id: &str, pattern: &str) -> CustomRuleSpec {
        CustomRuleSpec {
            id: id.to_string(),
            pattern: pattern.to_string(),
            severity: Severity::Medium,
            message: "Leftover debugger call: {match}".to_string(),
            suggestion: "Remove it before merging".to_string(),
            issue_type: None,
        }
    }

    #[test]
    fn test_line_rules() {
        let analyzer = CustomRuleAnalyzer::from_specs(&[spec(
            "custom/no-breakpoint",
            r"breakpoint\(\)|pdb\.set_trace\(\)",
        )])
        .expect("valid rules");
        assert_eq!(analyzer.rules().len(), 1);

        let src = "\
def f():
    breakpoint()
    # breakpoint()
    x = 1; import pdb; pdb.set_trace()
";
        let parsed = parse(src, "a.py").unwrap();
        let issues = analyzer
            .analyze(&parsed, &ReviewConfig::default())
            .expect("analysis succeeds");
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].issue_type, "no_breakpoint");
        assert_eq!(issues[0].rule, "custom/no-breakpoint");
        assert_eq!(issues[0].severity, Severity::Medium);
        assert_eq!((issues[0].line, issues[0].column), (2, 5));
        assert_eq!(issues[0].message, "Leftover debugger call: breakpoint()");
        assert_eq!(issues[1].line, 4);
        assert_eq!(issues[1].code, "x = 1; import pdb; pdb.set_trace()");
    }

    #[test]
    fn test_invalid_pattern() {
        assert!(CustomRuleAnalyzer::from_specs(&[spec("custom/bad", "(")]).is_err());
    }
}
