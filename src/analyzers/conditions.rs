//! Evaluation of rule conditions against tree nodes
//!
//! Every [`Condition`] of the pattern library is answered here. A condition
//! yields zero or more [`Hit`]s; the engine turns each hit into an issue
//! using the owning rule's severity and templates.

use super::context::{
    call_name, definition_name, dotted_name, enclosing, has_interpolation, in_main_guard,
    is_bare_call_to, is_docstring, is_plain_string, is_test_file, keyword_arg, named_children,
    positional_args, string_content, MatchContext,
};
use super::names::local_scope;
use crate::parsers::parses_as_statement;
use crate::rules::Condition;
use regex::Regex;
use std::sync::OnceLock;
use tree_sitter::Node;

/// One condition match, anchored at a node
pub struct Hit<'t> {
    pub node: Node<'t>,
    pub args: Vec<(&'static str, String)>,
    pub meta: Vec<(&'static str, serde_json::Value)>,
    /// Replaces the source line as the issue's code snippet
    pub code: Option<String>,
}

impl<'t> Hit<'t> {
    fn at(node: Node<'t>) -> Self {
        Self {
            node,
            args: Vec::new(),
            meta: Vec::new(),
            code: None,
        }
    }

    fn arg(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.args.push((key, value.into()));
        self
    }

    fn meta(mut self, key: &'static str, value: impl Into<serde_json::Value>) -> Self {
        self.meta.push((key, value.into()));
        self
    }
}

fn sql_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r"(?is)(^\s*(select|insert|update|delete|drop|create|alter|truncate)\s)|\b(select\s.+\sfrom|insert\s+into|update\s.+\sset|delete\s+from|drop\s+table)\b",
        )
        .expect("valid regex")
    })
}

fn code_shape_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(
            r#"^(import\s+\w|from\s+[\w.]+\s+import\s|def\s+\w+\s*\(|class\s+\w+\s*[(:]|return\b|(if|elif|while|for|with)\s.+:$|else:$|try:$|except\b.*:$|print\s*\(|raise\s+\w|[\w.\[\]'"]+\s*([-+*/]|//)?=\s*\S|[\w.]+\s*\(.*\)$)"#,
        )
        .expect("valid regex")
    })
}

fn directive_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^(!|-\*-|(vim?|coding)[:=]|type:|noqa|pylint:|fmt:|mypy:|pragma|isort:)")
            .expect("valid regex")
    })
}

const PLACEHOLDERS: &[&str] = &[
    "example",
    "xxx",
    "your_",
    "changeme",
    "placeholder",
    "<",
    ">",
    "${",
    "{{",
];

/// Evaluate `condition` at `node`.
pub fn evaluate<'t>(condition: &Condition, node: Node<'t>, cx: &MatchContext<'t>) -> Vec<Hit<'t>> {
    match condition {
        Condition::SqlString => sql_string(node, cx).into_iter().collect(),
        Condition::CommandCall { functions, shell } => {
            command_call(node, cx, functions, *shell).into_iter().collect()
        }
        Condition::BuiltinCall(names) => is_bare_call_to(cx.parsed, node, names)
            .map(|name| Hit::at(node).arg("function", name.clone()).meta("function", name))
            .into_iter()
            .collect(),
        Condition::CallTo(names) => call_name(cx.parsed, node)
            .filter(|name| names.contains(&name.as_str()))
            .map(|name| Hit::at(node).arg("function", name.clone()).meta("function", name))
            .into_iter()
            .collect(),
        Condition::CallWithoutSafeKeyword {
            functions,
            keyword,
            marker,
        } => unsafe_call(node, cx, functions, keyword, marker)
            .into_iter()
            .collect(),
        Condition::WeakHash {
            constructors,
            factory,
            algorithms,
        } => weak_hash(node, cx, constructors, factory, algorithms)
            .into_iter()
            .collect(),
        Condition::SecretAssignment { names, min_len } => {
            secret_assignment(node, cx, names, *min_len).into_iter().collect()
        }
        Condition::PathFromExpression(functions) => {
            path_expression(node, cx, functions).into_iter().collect()
        }
        Condition::RandomInSensitiveContext { module, context } => {
            insecure_random(node, cx, module, context).into_iter().collect()
        }
        Condition::MissingDocstring => missing_docstring(node, cx).into_iter().collect(),
        Condition::MagicNumber { allowed } => magic_number(node, cx, allowed).into_iter().collect(),
        Condition::BareExcept => (handler_types(node).is_empty())
            .then(|| Hit::at(node))
            .into_iter()
            .collect(),
        Condition::CatchesClass(classes) => catches_class(node, cx, classes).into_iter().collect(),
        Condition::EmptyHandler => empty_handler(node).into_iter().collect(),
        Condition::StarImport => star_import(node, cx).into_iter().collect(),
        Condition::UnusedImport => unused_imports(node, cx),
        Condition::UnusedVariable => unused_variable(node, cx).into_iter().collect(),
        Condition::MutableDefault { factories } => {
            mutable_default(node, cx, factories).into_iter().collect()
        }
        Condition::CommentedCode => commented_code(node, cx).into_iter().collect(),
        Condition::ConsolePrint => console_print(node, cx).into_iter().collect(),
    }
}

fn has_sql(text: &str) -> bool {
    sql_regex().is_match(text)
}

fn sql_hit<'t>(node: Node<'t>, how: &str, pattern: &str) -> Hit<'t> {
    Hit::at(node).arg("how", how).meta("pattern", pattern)
}

/// Operands of a `+` chain, left to right.
fn concat_operands<'t>(cx: &MatchContext, node: Node<'t>, out: &mut Vec<Node<'t>>) {
    let is_plus = node.kind() == "binary_operator"
        && node
            .child_by_field_name("operator")
            .map(|op| cx.text(op) == "+")
            .unwrap_or(false);
    if is_plus {
        if let Some(left) = node.child_by_field_name("left") {
            concat_operands(cx, left, out);
        }
        if let Some(right) = node.child_by_field_name("right") {
            concat_operands(cx, right, out);
        }
    } else {
        out.push(node);
    }
}

fn operator_text<'a>(cx: &MatchContext<'a>, node: Node) -> &'a str {
    node.child_by_field_name("operator")
        .map(|op| cx.text(op))
        .unwrap_or("")
}

fn sql_string<'t>(node: Node<'t>, cx: &MatchContext<'t>) -> Option<Hit<'t>> {
    match node.kind() {
        "string" => {
            if has_interpolation(node) && has_sql(&string_content(cx.parsed, node)) {
                return Some(sql_hit(node, "an f-string", "fstring"));
            }
            None
        }
        "binary_operator" => match operator_text(cx, node) {
            "+" => {
                // Only the outermost link of a chain reports.
                if let Some(parent) = node.parent() {
                    if parent.kind() == "binary_operator" && operator_text(cx, parent) == "+" {
                        return None;
                    }
                }
                let mut operands = Vec::new();
                concat_operands(cx, node, &mut operands);
                let dynamic = operands
                    .iter()
                    .any(|o| !matches!(o.kind(), "string" | "concatenated_string"));
                let literal: String = operands
                    .iter()
                    .filter(|o| is_plain_string(**o))
                    .map(|o| string_content(cx.parsed, *o))
                    .collect();
                (dynamic && has_sql(&literal))
                    .then(|| sql_hit(node, "string concatenation", "concat"))
            }
            "%" => {
                let left = node.child_by_field_name("left")?;
                (is_plain_string(left) && has_sql(&string_content(cx.parsed, left)))
                    .then(|| sql_hit(node, "% formatting", "percent"))
            }
            _ => None,
        },
        "call" => {
            let function = node.child_by_field_name("function")?;
            if function.kind() != "attribute" {
                return None;
            }
            let attr = function.child_by_field_name("attribute")?;
            let object = function.child_by_field_name("object")?;
            (cx.text(attr) == "format"
                && is_plain_string(object)
                && has_sql(&string_content(cx.parsed, object)))
            .then(|| sql_hit(node, ".format()", "format"))
        }
        _ => None,
    }
}

/// String literal, or a list/tuple of string literals.
fn is_literal_command(node: Node) -> bool {
    match node.kind() {
        "list" | "tuple" => named_children(node).into_iter().all(is_plain_string),
        _ => is_plain_string(node),
    }
}

fn command_call<'t>(
    node: Node<'t>,
    cx: &MatchContext<'t>,
    functions: &[&str],
    shell: bool,
) -> Option<Hit<'t>> {
    let name = call_name(cx.parsed, node)?;
    if !functions.contains(&name.as_str()) {
        return None;
    }
    let shell_true = keyword_arg(cx.parsed, node, "shell")
        .map(|v| cx.text(v) == "True")
        .unwrap_or(false);
    let fires = if shell {
        shell_true
    } else {
        !shell_true
            && positional_args(node)
                .first()
                .map(|cmd| !is_literal_command(*cmd))
                .unwrap_or(false)
    };
    fires.then(|| {
        Hit::at(node)
            .arg("function", name.clone())
            .meta("function", name)
            .meta("shell_true", shell_true)
    })
}

fn unsafe_call<'t>(
    node: Node<'t>,
    cx: &MatchContext<'t>,
    functions: &[&str],
    keyword: &str,
    marker: &str,
) -> Option<Hit<'t>> {
    let name = call_name(cx.parsed, node)?;
    if !functions.contains(&name.as_str()) {
        return None;
    }
    let safe_keyword = keyword_arg(cx.parsed, node, keyword)
        .map(|v| cx.text(v).contains(marker))
        .unwrap_or(false);
    let safe_positional = positional_args(node)
        .get(1)
        .map(|v| cx.text(*v).contains(marker))
        .unwrap_or(false);
    (!safe_keyword && !safe_positional)
        .then(|| Hit::at(node).arg("function", name.clone()).meta("function", name))
}

fn weak_hash<'t>(
    node: Node<'t>,
    cx: &MatchContext<'t>,
    constructors: &[&str],
    factory: &str,
    algorithms: &[&str],
) -> Option<Hit<'t>> {
    let name = call_name(cx.parsed, node)?;
    let not_for_security = keyword_arg(cx.parsed, node, "usedforsecurity")
        .map(|v| cx.text(v) == "False")
        .unwrap_or(false);
    if not_for_security {
        return None;
    }

    let algorithm = if constructors.contains(&name.as_str()) {
        let mut parts = name.split('.');
        let first = parts.next().unwrap_or("");
        let last = parts.last().unwrap_or(first);
        let algo = if last == "new" { first } else { last };
        algo.to_string()
    } else if name == factory {
        let arg = positional_args(node).into_iter().next()?;
        if !is_plain_string(arg) {
            return None;
        }
        let algo = string_content(cx.parsed, arg).to_lowercase();
        if !algorithms.contains(&algo.as_str()) {
            return None;
        }
        algo
    } else {
        return None;
    };

    Some(
        Hit::at(node)
            .arg("algorithm", algorithm.to_uppercase())
            .meta("algorithm", algorithm),
    )
}

fn secret_kind(name: &str) -> &'static str {
    let lower = name.to_lowercase();
    if lower.contains("pass") || lower.contains("pwd") {
        "password"
    } else if lower.contains("token") {
        "token"
    } else if lower.contains("api") {
        "API key"
    } else if lower.contains("private") {
        "private key"
    } else if lower.contains("access") {
        "access key"
    } else {
        "secret"
    }
}

fn mask(value: &str) -> String {
    let visible: String = value.chars().take(2).collect();
    format!("{}{}", visible, "*".repeat(8))
}

fn secret_assignment<'t>(
    node: Node<'t>,
    cx: &MatchContext<'t>,
    names: &Regex,
    min_len: usize,
) -> Option<Hit<'t>> {
    let (target, value) = match node.kind() {
        "assignment" => (
            node.child_by_field_name("left")?,
            node.child_by_field_name("right")?,
        ),
        "keyword_argument" => (
            node.child_by_field_name("name")?,
            node.child_by_field_name("value")?,
        ),
        _ => return None,
    };
    let name_node = match target.kind() {
        "identifier" => target,
        "attribute" => target.child_by_field_name("attribute")?,
        _ => return None,
    };
    let name = cx.text(name_node);
    if !names.is_match(name) || !is_plain_string(value) {
        return None;
    }
    let secret = string_content(cx.parsed, value);
    if secret.chars().count() < min_len {
        return None;
    }
    let lower = secret.to_lowercase();
    if PLACEHOLDERS.iter().any(|p| lower.contains(p)) || lower == name.to_lowercase() {
        return None;
    }

    let (line, _) = cx.parsed.position(node);
    let code = cx.parsed.line(line).trim().replace(&secret, &mask(&secret));
    let kind = secret_kind(name);
    let mut hit = Hit::at(node)
        .arg("secret_type", kind)
        .arg("name", name)
        .meta("secret_type", kind);
    hit.code = Some(code);
    Some(hit)
}

fn path_expression<'t>(
    node: Node<'t>,
    cx: &MatchContext<'t>,
    functions: &[&str],
) -> Option<Hit<'t>> {
    let name = call_name(cx.parsed, node)?;
    if !functions.contains(&name.as_str()) {
        return None;
    }
    let first = positional_args(node).into_iter().next()?;
    let dynamic = match first.kind() {
        "binary_operator" => operator_text(cx, first) == "+",
        "string" => has_interpolation(first),
        _ => false,
    };
    dynamic.then(|| Hit::at(node).arg("function", name.clone()).meta("function", name))
}

/// Name the call's value flows into: assignment target, keyword, or function.
fn value_context<'t>(node: Node<'t>, cx: &MatchContext<'t>) -> Vec<&'t str> {
    let mut names = Vec::new();
    let mut current = node.parent();
    while let Some(n) = current {
        match n.kind() {
            "assignment" | "augmented_assignment" => {
                if let Some(left) = n.child_by_field_name("left") {
                    names.push(cx.text(left));
                }
            }
            "keyword_argument" => {
                if let Some(name) = n.child_by_field_name("name") {
                    names.push(cx.text(name));
                }
            }
            "function_definition" => {
                names.push(definition_name(cx.parsed, n));
                break;
            }
            "class_definition" | "module" => break,
            _ => {}
        }
        current = n.parent();
    }
    names
}

fn insecure_random<'t>(
    node: Node<'t>,
    cx: &MatchContext<'t>,
    module: &str,
    context: &Regex,
) -> Option<Hit<'t>> {
    let name = call_name(cx.parsed, node)?;
    let rest = name.strip_prefix(module)?.strip_prefix('.')?;
    if rest.is_empty() || rest.contains('.') {
        return None;
    }
    let sensitive = value_context(node, cx)
        .into_iter()
        .find(|n| context.is_match(n))?;
    Some(
        Hit::at(node)
            .arg("function", name.clone())
            .arg("context", sensitive)
            .meta("function", name),
    )
}

fn missing_docstring<'t>(node: Node<'t>, cx: &MatchContext<'t>) -> Option<Hit<'t>> {
    let name = definition_name(cx.parsed, node);
    if name.starts_with('_') || cx.parsed.path().ends_with(".pyi") {
        return None;
    }
    // Helpers nested inside functions are not public API.
    if enclosing(node, &["function_definition"]).is_some() {
        return None;
    }
    let body = node.child_by_field_name("body")?;
    let first = named_children(body).into_iter().next();
    if first.map(is_docstring).unwrap_or(false) {
        return None;
    }
    let kind = match node.kind() {
        "class_definition" => "class",
        _ if enclosing(node, &["class_definition"]).is_some() => "method",
        _ => "function",
    };
    let anchor = node.child_by_field_name("name").unwrap_or(node);
    Some(Hit::at(anchor).arg("kind", kind).arg("name", name))
}

fn numeric_value(text: &str) -> Option<f64> {
    let clean = text.replace('_', "").to_lowercase();
    let clean = clean.trim_end_matches(['l', 'j']);
    let radix = |prefix: &str, radix: u32| {
        clean
            .strip_prefix(prefix)
            .and_then(|digits| i64::from_str_radix(digits, radix).ok())
            .map(|v| v as f64)
    };
    radix("0x", 16)
        .or_else(|| radix("0o", 8))
        .or_else(|| radix("0b", 2))
        .or_else(|| clean.parse::<f64>().ok())
}

fn is_constant_name(name: &str) -> bool {
    name.chars().any(|c| c.is_ascii_alphabetic())
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_')
}

fn magic_number<'t>(node: Node<'t>, cx: &MatchContext<'t>, allowed: &[f64]) -> Option<Hit<'t>> {
    let mut value = numeric_value(cx.text(node))?;
    let mut anchor = node;
    if let Some(parent) = node.parent() {
        if parent.kind() == "unary_operator" && operator_text(cx, parent) == "-" {
            value = -value;
            anchor = parent;
        }
    }
    if allowed.contains(&value) {
        return None;
    }

    let mut child = anchor;
    let mut current = anchor.parent();
    while let Some(n) = current {
        match n.kind() {
            "subscript" | "slice" => {
                if n.kind() == "slice" || !is_field(n, "value", child) {
                    return None;
                }
            }
            "default_parameter" | "typed_default_parameter" => return None,
            "call" => {
                if call_name(cx.parsed, n).as_deref() == Some("range") {
                    return None;
                }
            }
            "assignment" => {
                let constant = n
                    .child_by_field_name("left")
                    .map(|l| is_constant_name(cx.text(l)))
                    .unwrap_or(false);
                if constant {
                    return None;
                }
            }
            "expression_statement" | "block" | "module" => break,
            _ => {}
        }
        child = n;
        current = n.parent();
    }

    Some(Hit::at(anchor).arg("value", cx.text(anchor)))
}

fn is_field(parent: Node, field: &str, node: Node) -> bool {
    parent
        .child_by_field_name(field)
        .map(|n| n.id() == node.id())
        .unwrap_or(false)
}

/// Exception expressions of an except clause (empty for bare `except:`).
fn handler_types(node: Node) -> Vec<Node> {
    named_children(node)
        .into_iter()
        .filter(|c| c.kind() != "block")
        .collect()
}

fn catches_class<'t>(node: Node<'t>, cx: &MatchContext<'t>, classes: &[&str]) -> Option<Hit<'t>> {
    let mut expr = handler_types(node).into_iter().next()?;
    if expr.kind() == "as_pattern" {
        expr = expr.named_child(0)?;
    }
    let candidates = match expr.kind() {
        "tuple" | "parenthesized_expression" => named_children(expr),
        _ => vec![expr],
    };
    candidates
        .into_iter()
        .filter_map(|c| dotted_name(cx.parsed, c))
        .find(|name| {
            let bare = name.rsplit('.').next().unwrap_or(name);
            classes.contains(&bare)
        })
        .map(|class| Hit::at(node).arg("class", class))
}

fn empty_handler(node: Node) -> Option<Hit> {
    let block = named_children(node)
        .into_iter()
        .find(|c| c.kind() == "block")?;
    let statements = named_children(block);
    let empty = !statements.is_empty()
        && statements.iter().all(|s| match s.kind() {
            "pass_statement" => true,
            "expression_statement" => s
                .named_child(0)
                .map(|e| e.kind() == "ellipsis")
                .unwrap_or(false),
            _ => false,
        });
    empty.then(|| Hit::at(node))
}

fn star_import<'t>(node: Node<'t>, cx: &MatchContext<'t>) -> Option<Hit<'t>> {
    let mut cursor = node.walk();
    let wildcard = node
        .children(&mut cursor)
        .any(|c| c.kind() == "wildcard_import");
    if !wildcard {
        return None;
    }
    let module = node
        .child_by_field_name("module_name")
        .map(|m| cx.text(m))
        .unwrap_or("?");
    Some(Hit::at(node).arg("module", module))
}

fn under_type_checking(node: Node, cx: &MatchContext) -> bool {
    let mut current = node.parent();
    while let Some(n) = current {
        if n.kind() == "if_statement" {
            let guarded = n
                .child_by_field_name("condition")
                .map(|c| cx.text(c).contains("TYPE_CHECKING"))
                .unwrap_or(false);
            if guarded {
                return true;
            }
        }
        current = n.parent();
    }
    false
}

fn unused_imports<'t>(node: Node<'t>, cx: &MatchContext<'t>) -> Vec<Hit<'t>> {
    if cx.file_name() == "__init__.py" || under_type_checking(node, cx) {
        return Vec::new();
    }
    if let Some(module) = node.child_by_field_name("module_name") {
        if cx.text(module) == "__future__" {
            return Vec::new();
        }
    }

    let mut hits = Vec::new();
    let mut cursor = node.walk();
    let imported: Vec<Node> = node.children_by_field_name("name", &mut cursor).collect();
    for item in imported {
        let (bound, display) = match item.kind() {
            "aliased_import" => {
                let Some(alias) = item.child_by_field_name("alias") else {
                    continue;
                };
                (cx.text(alias), cx.text(item))
            }
            "dotted_name" => {
                let text = cx.text(item);
                let bound = if node.kind() == "import_statement" {
                    text.split('.').next().unwrap_or(text)
                } else {
                    text
                };
                (bound, text)
            }
            _ => continue,
        };
        if !cx.names().is_read(bound) {
            hits.push(Hit::at(item).arg("name", display).meta("name", bound));
        }
    }
    hits
}

fn unused_variable<'t>(node: Node<'t>, cx: &MatchContext<'t>) -> Option<Hit<'t>> {
    let left = node.child_by_field_name("left")?;
    if left.kind() != "identifier" || node.child_by_field_name("right").is_none() {
        return None;
    }
    let name = cx.text(left);
    if name.starts_with('_') {
        return None;
    }
    let func = local_scope(node)?;
    let names = cx.names();
    if names.is_read_in(func, name)
        || names.is_outer(func, name)
        || names.is_read_in(func, "locals")
        || !names.is_first_binding(func, name, node)
    {
        return None;
    }
    Some(Hit::at(left).arg("name", name))
}

fn mutable_default<'t>(
    node: Node<'t>,
    cx: &MatchContext<'t>,
    factories: &[&str],
) -> Option<Hit<'t>> {
    let value = node.child_by_field_name("value")?;
    let mutable = match value.kind() {
        "list" | "dictionary" | "set" | "list_comprehension" | "dictionary_comprehension"
        | "set_comprehension" => true,
        "call" => call_name(cx.parsed, value)
            .map(|n| factories.contains(&n.as_str()))
            .unwrap_or(false),
        _ => false,
    };
    if !mutable {
        return None;
    }
    let param = node
        .child_by_field_name("name")
        .map(|n| cx.text(n))
        .unwrap_or("?");
    let function = match enclosing(node, &["function_definition", "lambda"]) {
        Some(f) if f.kind() == "function_definition" => definition_name(cx.parsed, f),
        _ => "<lambda>",
    };
    Some(
        Hit::at(node)
            .arg("param", param)
            .arg("function", function)
            .meta("param", param),
    )
}

fn commented_code<'t>(node: Node<'t>, cx: &MatchContext<'t>) -> Option<Hit<'t>> {
    let (line, column) = cx.parsed.position(node);
    // Trailing comments after code are annotations, not dead code.
    if column > 1 && !cx.parsed.line(line).trim_start().starts_with('#') {
        return None;
    }
    let text = cx.text(node).trim_start_matches('#').trim();
    if text.len() < 3 || directive_regex().is_match(text) {
        return None;
    }
    if !code_shape_regex().is_match(text) {
        return None;
    }
    let parses = parses_as_statement(text)
        || (text.ends_with(':') && parses_as_statement(&format!("{}\n    pass", text)));
    parses.then(|| Hit::at(node))
}

fn console_print<'t>(node: Node<'t>, cx: &MatchContext<'t>) -> Option<Hit<'t>> {
    is_bare_call_to(cx.parsed, node, &["print"])?;
    let path = cx.parsed.path();
    if is_test_file(path) || cx.file_name() == "__main__.py" {
        return None;
    }
    let mut current = node.parent();
    while let Some(n) = current {
        if n.kind() == "function_definition" && definition_name(cx.parsed, n) == "main" {
            return None;
        }
        current = n.parent();
    }
    if in_main_guard(cx.parsed, node) {
        return None;
    }
    Some(Hit::at(node))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sql_regex() {
        assert!(has_sql("SELECT * FROM t WHERE id="));
        assert!(has_sql("select name from users where id = "));
        assert!(has_sql("DELETE FROM users WHERE id = %s"));
        assert!(has_sql(" WHERE x = 1; UPDATE t SET a = "));
        assert!(!has_sql("Please select an option"));
        assert!(!has_sql("Updated {} rows"));
        assert!(!has_sql("hello world"));
    }

    #[test]
    fn test_numeric_value() {
        assert_eq!(numeric_value("42"), Some(42.0));
        assert_eq!(numeric_value("1_000"), Some(1000.0));
        assert_eq!(numeric_value("0x1F"), Some(31.0));
        assert_eq!(numeric_value("0.5"), Some(0.5));
        assert_eq!(numeric_value("3j"), Some(3.0));
    }

    #[test]
    fn test_constant_name() {
        assert!(is_constant_name("MAX_RETRIES"));
        assert!(is_constant_name("HTTP2_PORT"));
        assert!(!is_constant_name("max_retries"));
        assert!(!is_constant_name("_"));
    }

    #[test]
    fn test_code_shape() {
        for code in ["x = compute(a)", "import os", "return value", "if x > 1:", "foo.bar(1, 2)"] {
            assert!(code_shape_regex().is_match(code), "{code}");
        }
        for prose in ["This explains the algorithm", "Returns the value", "See RFC 1234."] {
            assert!(!code_shape_regex().is_match(prose), "{prose}");
        }
    }

    #[test]
    fn test_mask() {
        assert_eq!(mask("hunter22"), "hu********");
    }
}
