//! Complexity analyzer
//!
//! Measures every function (cyclomatic complexity, nesting depth, length,
//! parameter count), every class (direct method count), every source line
//! and the file as a whole, then fires the threshold rules of the
//! `complexity` rule set. Thresholds come only from [`ReviewConfig`].

use super::context::{body_statements, definition_name, is_docstring, named_children};
use super::Analyzer;
use crate::config::ReviewConfig;
use crate::models::Issue;
use crate::parsers::ParsedSource;
use crate::rules::{self, Measure, Predicate, Rule, Scope};
use anyhow::Result;
use tree_sitter::Node;

/// Node kinds that add one decision point
const BRANCH_KINDS: &[&str] = &[
    "if_statement",
    "elif_clause",
    "conditional_expression",
    "for_statement",
    "while_statement",
    "except_clause",
    "boolean_operator",
    "case_clause",
    "if_clause",
];

/// Compound statements that open a nesting level
const NESTING_KINDS: &[&str] = &[
    "if_statement",
    "for_statement",
    "while_statement",
    "with_statement",
    "try_statement",
    "match_statement",
];

/// Definitions measured as their own units
const UNIT_KINDS: &[&str] = &["function_definition", "class_definition", "lambda"];

/// Measurements for one function or method
#[derive(Debug, Clone)]
pub(crate) struct FunctionStats<'t> {
    pub node: Node<'t>,
    pub name: &'t str,
    pub complexity: usize,
    pub nesting: usize,
    pub lines: usize,
    pub params: usize,
}

impl FunctionStats<'_> {
    fn value(&self, measure: Measure) -> usize {
        match measure {
            Measure::Complexity | Measure::ComplexityEscalated => self.complexity,
            Measure::NestingDepth => self.nesting,
            Measure::FunctionLines => self.lines,
            Measure::Parameters => self.params,
            _ => 0,
        }
    }
}

/// Measurements for one class
#[derive(Debug, Clone)]
pub(crate) struct ClassStats<'t> {
    pub node: Node<'t>,
    pub name: &'t str,
    pub methods: usize,
}

/// Every function in the file, in source order, nested ones included.
pub(crate) fn measure_functions(parsed: &ParsedSource) -> Vec<FunctionStats<'_>> {
    parsed
        .walk()
        .filter(|n| n.kind() == "function_definition")
        .map(|node| FunctionStats {
            node,
            name: definition_name(parsed, node),
            complexity: cyclomatic_complexity(node),
            nesting: nesting_depth(node),
            lines: function_lines(parsed, node),
            params: parameter_count(node),
        })
        .collect()
}

pub(crate) fn measure_classes(parsed: &ParsedSource) -> Vec<ClassStats<'_>> {
    parsed
        .walk()
        .filter(|n| n.kind() == "class_definition")
        .map(|node| ClassStats {
            node,
            name: definition_name(parsed, node),
            methods: method_count(node),
        })
        .collect()
}

/// Children of `node` that belong to the same unit (nested definitions excluded).
fn unit_children<'t>(node: Node<'t>) -> impl Iterator<Item = Node<'t>> {
    let mut cursor = node.walk();
    let children: Vec<Node> = node
        .named_children(&mut cursor)
        .filter(|c| !UNIT_KINDS.contains(&c.kind()))
        .collect();
    children.into_iter()
}

/// 1 + decision points in the body. Nested functions, classes and lambdas
/// are measured on their own.
pub(crate) fn cyclomatic_complexity(func: Node) -> usize {
    let mut complexity = 1;
    let mut stack: Vec<Node> = func.child_by_field_name("body").into_iter().collect();
    while let Some(node) = stack.pop() {
        if BRANCH_KINDS.contains(&node.kind()) {
            complexity += 1;
        }
        stack.extend(unit_children(node));
    }
    complexity
}

/// Deepest chain of nested compound statements inside the body.
pub(crate) fn nesting_depth(func: Node) -> usize {
    let mut deepest = 0;
    let mut stack: Vec<(Node, usize)> = func
        .child_by_field_name("body")
        .map(|b| (b, 0))
        .into_iter()
        .collect();
    while let Some((node, depth)) = stack.pop() {
        let depth = if NESTING_KINDS.contains(&node.kind()) {
            depth + 1
        } else {
            depth
        };
        deepest = deepest.max(depth);
        stack.extend(unit_children(node).map(|c| (c, depth)));
    }
    deepest
}

/// Lines from the first to the last body statement, docstring excluded.
pub(crate) fn function_lines(parsed: &ParsedSource, func: Node) -> usize {
    let statements = body_statements(func);
    let mut code = statements.iter().skip_while(|s| is_docstring(**s));
    let Some(first) = code.next() else {
        return 0;
    };
    let last = statements.last().copied().unwrap_or(*first);
    let (start, _) = parsed.position(*first);
    let (end, _) = parsed.end_position(last);
    end.saturating_sub(start) + 1
}

/// Named parameters, including `self`, `*args` and `**kwargs`.
pub(crate) fn parameter_count(func: Node) -> usize {
    func.child_by_field_name("parameters")
        .map(|params| {
            named_children(params)
                .into_iter()
                .filter(|p| {
                    !matches!(p.kind(), "positional_separator" | "keyword_separator")
                })
                .count()
        })
        .unwrap_or(0)
}

/// Direct methods, decorated ones included.
pub(crate) fn method_count(class: Node) -> usize {
    body_statements(class)
        .into_iter()
        .filter(|stmt| match stmt.kind() {
            "function_definition" => true,
            "decorated_definition" => stmt
                .child_by_field_name("definition")
                .map(|d| d.kind() == "function_definition")
                .unwrap_or(false),
            _ => false,
        })
        .count()
}

fn meta_key(measure: Measure) -> &'static str {
    match measure {
        Measure::Complexity | Measure::ComplexityEscalated => "complexity",
        Measure::NestingDepth => "nesting_depth",
        Measure::FunctionLines => "lines",
        Measure::Parameters => "param_count",
        Measure::ClassMethods => "method_count",
        Measure::LineLength => "length",
        Measure::FileLines => "lines",
    }
}

fn threshold_rules(scope: Scope) -> impl Iterator<Item = (&'static Rule, Measure)> {
    rules::complexity()
        .iter()
        .filter_map(|rule| match rule.predicate {
            Predicate::Threshold(measure) => Some((rule, measure)),
            _ => None,
        })
        .filter(move |(_, measure)| measure.scope() == scope)
}

fn truncate(line: &str, max_chars: usize) -> String {
    if line.chars().count() > max_chars {
        let head: String = line.chars().take(max_chars).collect();
        format!("{}...", head)
    } else {
        line.to_string()
    }
}

fn threshold_issue(
    rule: &Rule,
    measure: Measure,
    parsed: &ParsedSource,
    anchor: Node,
    name: &str,
    value: usize,
    config: &ReviewConfig,
) -> Issue {
    let position = parsed.position(anchor);
    let args = [
        ("name", name.to_string()),
        ("value", value.to_string()),
        ("max", measure.limit(config).to_string()),
    ];
    let subject = if measure.scope() == Scope::Class {
        "class"
    } else {
        "function"
    };
    rule.issue(parsed.path(), position, &args)
        .with_code(parsed.line(position.0).trim())
        .with_meta(meta_key(measure), value)
        .with_meta(subject, name)
}

pub struct ComplexityAnalyzer;

impl ComplexityAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for ComplexityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for ComplexityAnalyzer {
    fn name(&self) -> &str {
        "complexity"
    }

    fn description(&self) -> &str {
        "Measures cyclomatic complexity, nesting, function length, parameters and file size"
    }

    fn analyze(&self, parsed: &ParsedSource, config: &ReviewConfig) -> Result<Vec<Issue>> {
        let mut issues = Vec::new();

        let total_lines = parsed.line_count();
        for (rule, measure) in threshold_rules(Scope::File) {
            if measure.fires(total_lines, config) {
                let args = [
                    ("value", total_lines.to_string()),
                    ("max", measure.limit(config).to_string()),
                ];
                issues.push(
                    rule.issue(parsed.path(), (1, 1), &args)
                        .with_meta(meta_key(measure), total_lines),
                );
            }
        }

        // Functions and classes interleave in source order.
        let functions = measure_functions(parsed);
        let classes = measure_classes(parsed);
        let mut units: Vec<(usize, Vec<Issue>)> = Vec::new();

        for stats in &functions {
            let mut found = Vec::new();
            for (rule, measure) in threshold_rules(Scope::Function) {
                let value = stats.value(measure);
                if measure.fires(value, config) {
                    found.push(threshold_issue(
                        rule, measure, parsed, stats.node, stats.name, value, config,
                    ));
                }
            }
            units.push((stats.node.start_byte(), found));
        }
        for stats in &classes {
            let mut found = Vec::new();
            for (rule, measure) in threshold_rules(Scope::Class) {
                if measure.fires(stats.methods, config) {
                    found.push(threshold_issue(
                        rule,
                        measure,
                        parsed,
                        stats.node,
                        stats.name,
                        stats.methods,
                        config,
                    ));
                }
            }
            units.push((stats.node.start_byte(), found));
        }
        units.sort_by_key(|(start, _)| *start);
        issues.extend(units.into_iter().flat_map(|(_, found)| found));

        for (rule, measure) in threshold_rules(Scope::Line) {
            for (idx, line) in parsed.lines().enumerate() {
                let length = line.chars().count();
                if !measure.fires(length, config) {
                    continue;
                }
                if line.contains("http://") || line.contains("https://") {
                    continue;
                }
                let trimmed = line.trim_start();
                if trimmed.starts_with("import ") || trimmed.starts_with("from ") {
                    continue;
                }
                let args = [
                    ("value", length.to_string()),
                    ("max", measure.limit(config).to_string()),
                ];
                issues.push(
                    rule.issue(parsed.path(), (idx + 1, measure.limit(config) + 1), &args)
                        .with_code(truncate(line, 80))
                        .with_meta(meta_key(measure), length),
                );
            }
        }

        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use crate::parsers::parse;

    fn analyze_with(src: &str, config: &ReviewConfig) -> Vec<Issue> {
        let parsed = parse(src, "mod.py").expect("valid python");
        ComplexityAnalyzer::new()
            .analyze(&parsed, config)
            .expect("analysis succeeds")
    }

    fn analyze(src: &str) -> Vec<Issue> {
        analyze_with(src, &ReviewConfig::default())
    }

    fn first_function(parsed: &ParsedSource) -> FunctionStats<'_> {
        measure_functions(parsed)
            .into_iter()
            .next()
            .expect("a function")
    }

    fn nested_ifs(levels: usize) -> String {
        let mut src = String::from("def f(x):\n");
        for level in 0..levels {
            src.push_str(&"    ".repeat(level + 1));
            src.push_str(&format!("if x > {}:\n", level));
        }
        src.push_str(&"    ".repeat(levels + 1));
        src.push_str("return x\n");
        src
    }

    #[test]
    fn test_complexity_counts() {
        let src = "\
def f(a, b):
    if a and b:
        return 1
    elif a:
        return 2
    for i in range(3):
        while b:
            b -= 1
    try:
        pass
    except ValueError:
        pass
    return [x for x in a if x] if a else None
";
        let parsed = parse(src, "m.py").unwrap();
        // if, and, elif, for, while, except, comprehension if, ternary
        assert_eq!(first_function(&parsed).complexity, 9);
    }

    #[test]
    fn test_nested_function_measured_separately() {
        let src = "\
def outer():
    def inner(x):
        if x:
            return 1
    return inner
";
        let parsed = parse(src, "m.py").unwrap();
        let stats = measure_functions(&parsed);
        assert_eq!(stats.len(), 2);
        assert_eq!(stats[0].complexity, 1);
        assert_eq!(stats[0].nesting, 0);
        assert_eq!(stats[1].complexity, 2);
    }

    #[test]
    fn test_deep_nesting_threshold() {
        let issues = analyze(&nested_ifs(6));
        let nesting: Vec<&Issue> = issues
            .iter()
            .filter(|i| i.issue_type == "deep_nesting")
            .collect();
        assert_eq!(nesting.len(), 1);
        assert_eq!(nesting[0].severity, Severity::Medium);
        assert_eq!(nesting[0].line, 1);
        assert_eq!(nesting[0].metadata["nesting_depth"], 6);

        let issues = analyze(&nested_ifs(4));
        assert!(issues.iter().all(|i| i.issue_type != "deep_nesting"));
    }

    #[test]
    fn test_complexity_escalation() {
        let branches = |n: usize| {
            let mut src = String::from("def f(x):\n");
            for i in 0..n {
                src.push_str(&format!("    if x == {}:\n        return {}\n", i, i));
            }
            src
        };
        // 11 = 1 + 10 branches: MEDIUM
        let issues = analyze(&branches(10));
        let cc: Vec<&Issue> = issues
            .iter()
            .filter(|i| i.issue_type == "high_complexity")
            .collect();
        assert_eq!(cc.len(), 1);
        assert_eq!(cc[0].severity, Severity::Medium);
        assert_eq!(cc[0].rule, "complexity/high-complexity");

        // 16: HIGH
        let issues = analyze(&branches(15));
        let cc: Vec<&Issue> = issues
            .iter()
            .filter(|i| i.issue_type == "high_complexity")
            .collect();
        assert_eq!(cc.len(), 1);
        assert_eq!(cc[0].severity, Severity::High);
        assert_eq!(cc[0].rule, "complexity/very-high-complexity");

        // 10: at the limit, nothing
        let issues = analyze(&branches(9));
        assert!(issues.iter().all(|i| i.issue_type != "high_complexity"));
    }

    #[test]
    fn test_params_and_length() {
        let src = "\
def f(self, a, b, c, d, *args, **kwargs):
    \"\"\"Docstring
    over lines.\"\"\"
    x = 1
    y = 2
    return x + y
";
        let parsed = parse(src, "m.py").unwrap();
        let stats = first_function(&parsed);
        assert_eq!(stats.params, 7);
        assert_eq!(stats.lines, 3);

        let issues = analyze(src);
        let params: Vec<&Issue> = issues
            .iter()
            .filter(|i| i.issue_type == "too_many_params")
            .collect();
        assert_eq!(params.len(), 1);
        assert_eq!(params[0].message, "Function 'f' has 7 parameters (max: 5)");
    }

    #[test]
    fn test_long_function() {
        let config = ReviewConfig {
            max_function_lines: 3,
            ..ReviewConfig::default()
        };
        let src = "def f():\n    a = 1\n    b = 2\n    c = 3\n    return a + b + c\n";
        let issues = analyze_with(src, &config);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue_type, "long_function");
        assert_eq!(issues[0].severity, Severity::Low);
    }

    #[test]
    fn test_god_class_counts_decorated_methods() {
        let config = ReviewConfig {
            max_class_methods: 2,
            ..ReviewConfig::default()
        };
        let src = "\
class Big:
    def a(self): pass
    @property
    def b(self): pass
    @staticmethod
    def c(): pass
";
        let issues = analyze_with(src, &config);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue_type, "god_class");
        assert_eq!(issues[0].metadata["method_count"], 3);
        assert_eq!(issues[0].metadata["class"], "Big");
    }

    #[test]
    fn test_long_lines() {
        let config = ReviewConfig {
            max_line_length: 20,
            ..ReviewConfig::default()
        };
        let src = "\
import something.really.long.module.name
x = 'this line is definitely too long'
url = 'https://example.com/a/very/long/path'
";
        let issues = analyze_with(src, &config);
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue_type, "long_line");
        assert_eq!(issues[0].severity, Severity::Info);
        assert_eq!(issues[0].line, 2);
        assert_eq!(issues[0].column, 21);
    }

    #[test]
    fn test_large_file_first() {
        let config = ReviewConfig {
            max_file_lines: 2,
            max_parameters: 1,
            ..ReviewConfig::default()
        };
        let src = "def f(a, b):\n    return a\nx = 1\n";
        let issues = analyze_with(src, &config);
        let types: Vec<&str> = issues.iter().map(|i| i.issue_type.as_str()).collect();
        assert_eq!(types, vec!["large_file", "too_many_params"]);
        assert_eq!(issues[0].message, "File has 3 lines (max: 2)");
    }

    #[test]
    fn test_empty_file() {
        assert!(analyze("").is_empty());
    }
}
