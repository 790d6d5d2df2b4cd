//! Shared tree helpers and the per-file match context

use super::names::NameTable;
use crate::config::ReviewConfig;
use crate::parsers::ParsedSource;
use std::cell::OnceCell;
use std::path::Path;
use tree_sitter::Node;

/// Everything a rule condition may look at for one file
pub struct MatchContext<'a> {
    pub parsed: &'a ParsedSource,
    pub config: &'a ReviewConfig,
    names: OnceCell<NameTable>,
}

impl<'a> MatchContext<'a> {
    pub fn new(parsed: &'a ParsedSource, config: &'a ReviewConfig) -> Self {
        Self {
            parsed,
            config,
            names: OnceCell::new(),
        }
    }

    /// Binding/reference table, built on first use.
    pub fn names(&self) -> &NameTable {
        self.names.get_or_init(|| NameTable::build(self.parsed))
    }

    pub fn text(&self, node: Node) -> &'a str {
        self.parsed.text(node)
    }

    pub fn file_name(&self) -> &str {
        Path::new(self.parsed.path())
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("")
    }
}

/// Dotted name of a call's callee: `os.path.join`, `eval`.
///
/// `None` when the callee is not a plain name chain, e.g. `f()()` or `a[0].b()`.
pub fn call_name(parsed: &ParsedSource, call: Node) -> Option<String> {
    let function = call.child_by_field_name("function")?;
    dotted_name(parsed, function)
}

pub fn dotted_name(parsed: &ParsedSource, node: Node) -> Option<String> {
    match node.kind() {
        "identifier" => Some(parsed.text(node).to_string()),
        "attribute" => {
            let object = node.child_by_field_name("object")?;
            let attr = node.child_by_field_name("attribute")?;
            Some(format!("{}.{}", dotted_name(parsed, object)?, parsed.text(attr)))
        }
        _ => None,
    }
}

/// Callee is a bare identifier with this text.
pub fn is_bare_call_to(parsed: &ParsedSource, call: Node, names: &[&str]) -> Option<String> {
    let function = call.child_by_field_name("function")?;
    if function.kind() != "identifier" {
        return None;
    }
    let name = parsed.text(function);
    names.contains(&name).then(|| name.to_string())
}

/// Named children, skipping comments.
pub fn named_children<'t>(node: Node<'t>) -> Vec<Node<'t>> {
    let mut cursor = node.walk();
    node.named_children(&mut cursor)
        .filter(|c| c.kind() != "comment")
        .collect()
}

/// Positional arguments of a call.
pub fn positional_args<'t>(call: Node<'t>) -> Vec<Node<'t>> {
    call.child_by_field_name("arguments")
        .map(|args| {
            named_children(args)
                .into_iter()
                .filter(|a| {
                    !matches!(
                        a.kind(),
                        "keyword_argument" | "list_splat" | "dictionary_splat"
                    )
                })
                .collect()
        })
        .unwrap_or_default()
}

/// Value node of `name=...` in a call.
pub fn keyword_arg<'t>(parsed: &ParsedSource, call: Node<'t>, name: &str) -> Option<Node<'t>> {
    let args = call.child_by_field_name("arguments")?;
    named_children(args)
        .into_iter()
        .filter(|a| a.kind() == "keyword_argument")
        .find(|kw| {
            kw.child_by_field_name("name")
                .map(|n| parsed.text(n) == name)
                .unwrap_or(false)
        })
        .and_then(|kw| kw.child_by_field_name("value"))
}

pub fn has_interpolation(node: Node) -> bool {
    let mut cursor = node.walk();
    let found = node
        .children(&mut cursor)
        .any(|c| c.kind() == "interpolation");
    found
}

/// String literal without interpolation (implicit concatenation allowed).
pub fn is_plain_string(node: Node) -> bool {
    match node.kind() {
        "string" => !has_interpolation(node),
        "concatenated_string" => named_children(node).into_iter().all(is_plain_string),
        _ => false,
    }
}

/// Literal text of a string node; interpolations are left out.
pub fn string_content(parsed: &ParsedSource, node: Node) -> String {
    match node.kind() {
        "string" => {
            let mut cursor = node.walk();
            let parts: Vec<&str> = node
                .children(&mut cursor)
                .filter(|c| c.kind() == "string_content")
                .map(|c| parsed.text(c))
                .collect();
            parts.concat()
        }
        "concatenated_string" => named_children(node)
            .into_iter()
            .map(|c| string_content(parsed, c))
            .collect(),
        _ => String::new(),
    }
}

/// Nearest ancestor whose kind is one of `kinds`.
pub fn enclosing<'t>(node: Node<'t>, kinds: &[&str]) -> Option<Node<'t>> {
    let mut current = node.parent();
    while let Some(n) = current {
        if kinds.contains(&n.kind()) {
            return Some(n);
        }
        current = n.parent();
    }
    None
}

pub fn definition_name<'a>(parsed: &'a ParsedSource, def: Node) -> &'a str {
    def.child_by_field_name("name")
        .map(|n| parsed.text(n))
        .unwrap_or("<anonymous>")
}

/// Statements of a block, skipping comments.
pub fn body_statements(def: Node) -> Vec<Node> {
    def.child_by_field_name("body")
        .map(named_children)
        .unwrap_or_default()
}

pub fn is_docstring(stmt: Node) -> bool {
    stmt.kind() == "expression_statement"
        && stmt
            .named_child(0)
            .map(|e| matches!(e.kind(), "string" | "concatenated_string"))
            .unwrap_or(false)
}

/// Inside `if __name__ == "__main__":`.
pub fn in_main_guard(parsed: &ParsedSource, node: Node) -> bool {
    let mut current = node.parent();
    while let Some(n) = current {
        if n.kind() == "if_statement" {
            if let Some(cond) = n.child_by_field_name("condition") {
                let text = parsed.text(cond);
                if text.contains("__name__") && text.contains("__main__") {
                    return true;
                }
            }
        }
        current = n.parent();
    }
    false
}

/// Conventional test module names and test directories.
pub fn is_test_file(path: &str) -> bool {
    let p = Path::new(path);
    let name = p.file_name().and_then(|n| n.to_str()).unwrap_or("");
    if name.starts_with("test_") || name.ends_with("_test.py") || name == "conftest.py" {
        return true;
    }
    p.components()
        .any(|c| matches!(c.as_os_str().to_str(), Some("tests") | Some("test")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::parse;

    fn first<'t>(parsed: &'t ParsedSource, kind: &str) -> Node<'t> {
        parsed
            .walk()
            .find(|n| n.kind() == kind)
            .unwrap_or_else(|| panic!("no {kind} node"))
    }

    #[test]
    fn test_call_name() {
        let parsed = parse("os.path.join(a, b)\n", "a.py").unwrap();
        let call = first(&parsed, "call");
        assert_eq!(call_name(&parsed, call).as_deref(), Some("os.path.join"));

        let parsed = parse("get()()\n", "a.py").unwrap();
        let call = first(&parsed, "call");
        assert_eq!(call_name(&parsed, call), None);
    }

    #[test]
    fn test_args() {
        let parsed = parse("run(cmd, 'x', shell=True)\n", "a.py").unwrap();
        let call = first(&parsed, "call");
        assert_eq!(positional_args(call).len(), 2);
        let shell = keyword_arg(&parsed, call, "shell").expect("shell kwarg");
        assert_eq!(parsed.text(shell), "True");
        assert!(keyword_arg(&parsed, call, "cwd").is_none());
    }

    #[test]
    fn test_strings() {
        let parsed = parse("a = f\"x {y} z\"\nb = 'plain'\n", "a.py").unwrap();
        let strings: Vec<Node> = parsed.walk().filter(|n| n.kind() == "string").collect();
        assert!(has_interpolation(strings[0]));
        assert!(!is_plain_string(strings[0]));
        assert_eq!(string_content(&parsed, strings[0]), "x  z");
        assert!(is_plain_string(strings[1]));
        assert_eq!(string_content(&parsed, strings[1]), "plain");
    }

    #[test]
    fn test_main_guard() {
        let src = "if __name__ == \"__main__\":\n    print('hi')\nprint('no')\n";
        let parsed = parse(src, "a.py").unwrap();
        let calls: Vec<Node> = parsed.walk().filter(|n| n.kind() == "call").collect();
        assert!(in_main_guard(&parsed, calls[0]));
        assert!(!in_main_guard(&parsed, calls[1]));
    }

    #[test]
    fn test_is_test_file() {
        assert!(is_test_file("tests/helpers.py"));
        assert!(is_test_file("pkg/test_api.py"));
        assert!(is_test_file("api_test.py"));
        assert!(!is_test_file("pkg/contest.py"));
    }
}
