//! Pattern library
//!
//! Detection rules are data. Each [`Rule`] pairs a stable identifier and a
//! default severity with a [`Predicate`] and message/suggestion templates.
//! Analyzers evaluate predicates generically, so adding a rule to a catalog
//! never touches analyzer control flow.
//!
//! Built-in rule sets:
//! - `security`: injection, dynamic code, deserialization, weak crypto, secrets
//! - `complexity`: threshold rules over functions, classes, lines and files
//! - `style`: code smells, run by the `smells` analyzer

mod builtin;

pub use builtin::{builtin_sets, complexity, security, style};

use crate::config::{ConfigError, CustomRuleSpec};
use crate::models::{Issue, Severity};
use regex::Regex;
use serde::Serialize;

/// Which rule set a rule belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Security,
    Complexity,
    Style,
    Custom,
}

impl std::fmt::Display for Category {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Category::Security => write!(f, "security"),
            Category::Complexity => write!(f, "complexity"),
            Category::Style => write!(f, "style"),
            Category::Custom => write!(f, "custom"),
        }
    }
}

/// Tree conditions, evaluated against nodes of the listed kinds
#[derive(Debug, Clone)]
pub enum Condition {
    /// SQL text built by f-string, `+`, `.format()` or `%`
    SqlString,
    /// Command execution call; `shell` selects the `shell=True` variant,
    /// otherwise the call fires on a non-literal command argument
    CommandCall {
        functions: &'static [&'static str],
        shell: bool,
    },
    /// Call to a bare builtin name, e.g. `eval(...)`
    BuiltinCall(&'static [&'static str]),
    /// Call whose full dotted name is listed
    CallTo(&'static [&'static str]),
    /// Listed call without a keyword whose value contains `marker`
    CallWithoutSafeKeyword {
        functions: &'static [&'static str],
        keyword: &'static str,
        marker: &'static str,
    },
    /// Weak hash constructor or `factory("<algorithm>")`
    WeakHash {
        constructors: &'static [&'static str],
        factory: &'static str,
        algorithms: &'static [&'static str],
    },
    /// String literal of at least `min_len` chars bound to a matching name
    SecretAssignment { names: Regex, min_len: usize },
    /// File-path call whose first argument is built dynamically
    PathFromExpression(&'static [&'static str]),
    /// `module.*` call where the surrounding name matches `context`
    RandomInSensitiveContext {
        module: &'static str,
        context: Regex,
    },
    MissingDocstring,
    MagicNumber { allowed: &'static [f64] },
    BareExcept,
    CatchesClass(&'static [&'static str]),
    EmptyHandler,
    StarImport,
    UnusedImport,
    UnusedVariable,
    MutableDefault { factories: &'static [&'static str] },
    CommentedCode,
    ConsolePrint,
}

/// Structural counts compared against configured thresholds
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    /// Above `max_complexity`, up to `complexity_high_threshold`
    Complexity,
    /// Above `complexity_high_threshold`
    ComplexityEscalated,
    NestingDepth,
    FunctionLines,
    Parameters,
    ClassMethods,
    LineLength,
    FileLines,
}

/// Unit a measure is taken over
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Function,
    Class,
    Line,
    File,
}

impl Measure {
    pub fn scope(self) -> Scope {
        match self {
            Measure::Complexity
            | Measure::ComplexityEscalated
            | Measure::NestingDepth
            | Measure::FunctionLines
            | Measure::Parameters => Scope::Function,
            Measure::ClassMethods => Scope::Class,
            Measure::LineLength => Scope::Line,
            Measure::FileLines => Scope::File,
        }
    }

    /// The threshold this measure is compared with.
    pub fn limit(self, config: &crate::config::ReviewConfig) -> usize {
        match self {
            Measure::Complexity => config.max_complexity,
            Measure::ComplexityEscalated => config.complexity_high_threshold,
            Measure::NestingDepth => config.max_nesting_depth,
            Measure::FunctionLines => config.max_function_lines,
            Measure::Parameters => config.max_parameters,
            Measure::ClassMethods => config.max_class_methods,
            Measure::LineLength => config.max_line_length,
            Measure::FileLines => config.max_file_lines,
        }
    }

    /// Whether `value` violates this measure under `config`.
    pub fn fires(self, value: usize, config: &crate::config::ReviewConfig) -> bool {
        match self {
            Measure::Complexity => {
                value > config.max_complexity && value <= config.complexity_high_threshold
            }
            _ => value > self.limit(config),
        }
    }
}

/// How a rule detects its issue
#[derive(Debug, Clone)]
pub enum Predicate {
    /// Regex over each raw source line (comment-only lines excluded)
    Line(Regex),
    /// Regex over comment text
    Comment(Regex),
    /// Condition over tree nodes of the given kinds
    Node {
        kinds: &'static [&'static str],
        condition: Condition,
    },
    Threshold(Measure),
}

/// A named, stable detection definition
#[derive(Debug, Clone)]
pub struct Rule {
    pub id: String,
    pub issue_type: String,
    pub category: Category,
    pub severity: Severity,
    pub predicate: Predicate,
    pub message: String,
    pub suggestion: String,
}

impl Rule {
    /// Build an issue from this rule, filling `{placeholders}` from `args`.
    pub fn issue(
        &self,
        file: &str,
        (line, column): (usize, usize),
        args: &[(&str, String)],
    ) -> Issue {
        Issue::new(self.issue_type.clone(), self.severity, file, line, column)
            .with_rule(self.id.clone())
            .with_message(render(&self.message, args))
            .with_suggestion(render(&self.suggestion, args))
    }

    /// Whether this rule evaluates nodes of `kind`.
    pub fn applies_to(&self, kind: &str) -> bool {
        match &self.predicate {
            Predicate::Node { kinds, .. } => kinds.contains(&kind),
            Predicate::Comment(_) => kind == "comment",
            _ => false,
        }
    }

    /// Compile a rule declared in `pyreview.toml`.
    pub fn from_spec(spec: &CustomRuleSpec) -> Result<Rule, ConfigError> {
        let regex = Regex::new(&spec.pattern).map_err(|e| ConfigError::InvalidRule {
            id: spec.id.clone(),
            reason: e.to_string(),
        })?;
        let message = if spec.message.is_empty() {
            format!("Matched custom rule {}", spec.id)
        } else {
            spec.message.clone()
        };
        Ok(Rule {
            id: spec.id.clone(),
            issue_type: spec.effective_type(),
            category: Category::Custom,
            severity: spec.severity,
            predicate: Predicate::Line(regex),
            message,
            suggestion: spec.suggestion.clone(),
        })
    }
}

/// Substitute `{key}` placeholders. Unknown placeholders are left as is.
pub fn render(template: &str, args: &[(&str, String)]) -> String {
    let mut out = template.to_string();
    for (key, value) in args {
        out = out.replace(&format!("{{{}}}", key), value);
    }
    out
}

/// A named collection of rules
#[derive(Debug, Clone)]
pub struct RuleSet {
    name: String,
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new(name: impl Into<String>, rules: Vec<Rule>) -> Self {
        Self {
            name: name.into(),
            rules,
        }
    }

    /// Rule set named `custom` from config-declared rules.
    pub fn from_specs(specs: &[CustomRuleSpec]) -> Result<Self, ConfigError> {
        let rules = specs.iter().map(Rule::from_spec).collect::<Result<_, _>>()?;
        Ok(Self::new(crate::config::CUSTOM_ANALYZER, rules))
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Rule> {
        self.rules.iter()
    }

    pub fn get(&self, id: &str) -> Option<&Rule> {
        self.rules.iter().find(|r| r.id == id)
    }

    pub fn by_severity(&self, severity: Severity) -> Vec<&Rule> {
        self.rules.iter().filter(|r| r.severity == severity).collect()
    }

    /// The rule that produces `issue_type` at `severity`, if any.
    pub fn lookup(&self, issue_type: &str, severity: Severity) -> Option<&Rule> {
        self.rules
            .iter()
            .find(|r| r.issue_type == issue_type && r.severity == severity)
    }
}

impl<'a> IntoIterator for &'a RuleSet {
    type Item = &'a Rule;
    type IntoIter = std::slice::Iter<'a, Rule>;

    fn into_iter(self) -> Self::IntoIter {
        self.rules.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ReviewConfig;

    #[test]
    fn test_render() {
        let out = render(
            "Function '{name}' has {count} parameters (max: {max})",
            &[("name", "f".into()), ("count", "7".into()), ("max", "5".into())],
        );
        assert_eq!(out, "Function 'f' has 7 parameters (max: 5)");
        assert_eq!(render("keep {unknown}", &[]), "keep {unknown}");
    }

    #[test]
    fn test_measure_escalation_is_exclusive() {
        let config = ReviewConfig::default();
        for value in 0..40 {
            let medium = Measure::Complexity.fires(value, &config);
            let high = Measure::ComplexityEscalated.fires(value, &config);
            assert!(!(medium && high), "both fired at {value}");
            assert_eq!(medium || high, value > config.max_complexity);
        }
    }

    #[test]
    fn test_custom_rule_from_spec() {
        let spec = CustomRuleSpec {
            id: "custom/no-breakpoint".into(),
            pattern: r"breakpoint\(\)".into(),
            severity: Severity::Medium,
            message: String::new(),
            suggestion: "Remove it".into(),
            issue_type: None,
        };
        let set = RuleSet::from_specs(std::slice::from_ref(&spec)).expect("valid rule");
        assert_eq!(set.name(), "custom");
        assert_eq!(set.len(), 1);
        let rule = set.get("custom/no-breakpoint").expect("rule present");
        assert_eq!(rule.issue_type, "no_breakpoint");
        assert_eq!(rule.category, Category::Custom);
        assert!(rule.message.contains("custom/no-breakpoint"));

        let bad = CustomRuleSpec {
            pattern: "(".into(),
            ..spec
        };
        assert!(Rule::from_spec(&bad).is_err());
    }
}
