//! Single-pass name table for unused import/variable detection
//!
//! One walk over the tree records every identifier that is read, both
//! module-wide and per enclosing function, plus the first plain assignment
//! of each local name. A binding that is never read afterwards is unused.

use super::context::{enclosing, named_children, string_content};
use crate::parsers::ParsedSource;
use rustc_hash::{FxHashMap, FxHashSet};
use tree_sitter::Node;

#[derive(Debug, Default)]
pub struct NameTable {
    module_reads: FxHashSet<String>,
    function_reads: FxHashMap<usize, FxHashSet<String>>,
    outer_declared: FxHashMap<usize, FxHashSet<String>>,
    first_binding: FxHashMap<(usize, String), usize>,
}

impl NameTable {
    pub fn build(parsed: &ParsedSource) -> Self {
        let mut table = NameTable::default();

        for node in parsed.walk() {
            match node.kind() {
                "identifier" if is_read(node) => {
                    let name = parsed.text(node);
                    table.module_reads.insert(name.to_string());
                    let mut scope = enclosing(node, &["function_definition"]);
                    while let Some(func) = scope {
                        table
                            .function_reads
                            .entry(func.id())
                            .or_default()
                            .insert(name.to_string());
                        scope = enclosing(func, &["function_definition"]);
                    }
                }
                "global_statement" | "nonlocal_statement" => {
                    if let Some(func) = enclosing(node, &["function_definition"]) {
                        let declared = table.outer_declared.entry(func.id()).or_default();
                        for ident in named_children(node) {
                            declared.insert(parsed.text(ident).to_string());
                        }
                    }
                }
                "assignment" => table.record_assignment(parsed, node),
                _ => {}
            }
        }

        table
    }

    fn record_assignment(&mut self, parsed: &ParsedSource, node: Node) {
        let Some(left) = node.child_by_field_name("left") else {
            return;
        };
        if left.kind() != "identifier" {
            return;
        }
        let name = parsed.text(left);

        // Names exported through __all__ count as used.
        if name == "__all__" {
            if let Some(right) = node.child_by_field_name("right") {
                for item in named_children(right) {
                    if item.kind() == "string" {
                        self.module_reads.insert(string_content(parsed, item));
                    }
                }
            }
        }

        if let Some(func) = local_scope(node) {
            self.first_binding
                .entry((func.id(), name.to_string()))
                .or_insert(node.id());
        }
    }

    /// Read anywhere in the module.
    pub fn is_read(&self, name: &str) -> bool {
        self.module_reads.contains(name)
    }

    /// Read anywhere inside `func`, nested functions included.
    pub fn is_read_in(&self, func: Node, name: &str) -> bool {
        self.function_reads
            .get(&func.id())
            .map(|names| names.contains(name))
            .unwrap_or(false)
    }

    /// Declared `global` or `nonlocal` in `func`.
    pub fn is_outer(&self, func: Node, name: &str) -> bool {
        self.outer_declared
            .get(&func.id())
            .map(|names| names.contains(name))
            .unwrap_or(false)
    }

    /// Whether `assignment` is the first plain binding of `name` in `func`.
    pub fn is_first_binding(&self, func: Node, name: &str, assignment: Node) -> bool {
        self.first_binding
            .get(&(func.id(), name.to_string()))
            .map(|&id| id == assignment.id())
            .unwrap_or(false)
    }
}

/// Function whose local namespace an assignment binds into.
///
/// `None` at module level and directly inside class bodies.
pub fn local_scope(node: Node) -> Option<Node> {
    let scope = enclosing(node, &["function_definition", "class_definition", "lambda"])?;
    (scope.kind() == "function_definition").then_some(scope)
}

fn field_is(parent: Node, field: &str, node: Node) -> bool {
    parent
        .child_by_field_name(field)
        .map(|n| n.id() == node.id())
        .unwrap_or(false)
}

fn inside_import(node: Node) -> bool {
    let mut current = Some(node);
    for _ in 0..3 {
        match current {
            Some(n)
                if matches!(
                    n.kind(),
                    "import_statement"
                        | "import_from_statement"
                        | "future_import_statement"
                        | "aliased_import"
                        | "relative_import"
                ) =>
            {
                return true
            }
            Some(n) => current = n.parent(),
            None => return false,
        }
    }
    false
}

/// Whether an identifier is a load rather than a binding or a label.
fn is_read(node: Node) -> bool {
    let Some(parent) = node.parent() else {
        return true;
    };
    match parent.kind() {
        "assignment" => !field_is(parent, "left", node),
        "for_statement" | "for_in_clause" => !field_is(parent, "left", node),
        "named_expression" => !field_is(parent, "name", node),
        "function_definition" | "class_definition" => !field_is(parent, "name", node),
        "default_parameter" | "typed_default_parameter" => !field_is(parent, "name", node),
        "keyword_argument" => !field_is(parent, "name", node),
        "attribute" => !field_is(parent, "attribute", node),
        "pattern_list" | "tuple_pattern" | "list_pattern" | "list_splat_pattern"
        | "dictionary_splat_pattern" | "as_pattern_target" => false,
        "parameters" | "lambda_parameters" | "typed_parameter" => false,
        "global_statement" | "nonlocal_statement" => false,
        "dotted_name" | "aliased_import" => !inside_import(parent),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parsers::parse;

    #[test]
    fn test_module_reads() {
        let src = "import os\nimport sys as system\nfrom a import b\nprint(os.getcwd())\n";
        let parsed = parse(src, "m.py").unwrap();
        let table = NameTable::build(&parsed);
        assert!(table.is_read("os"));
        assert!(table.is_read("print"));
        assert!(!table.is_read("system"));
        assert!(!table.is_read("b"));
        assert!(!table.is_read("getcwd"));
    }

    #[test]
    fn test_all_exports_count() {
        let src = "from a import b\n__all__ = ['b']\n";
        let parsed = parse(src, "m.py").unwrap();
        assert!(NameTable::build(&parsed).is_read("b"));
    }

    #[test]
    fn test_function_reads_and_bindings() {
        let src = "def f(p):\n    x = 1\n    y = p\n    x = 2\n    return y\n";
        let parsed = parse(src, "m.py").unwrap();
        let table = NameTable::build(&parsed);
        let func = parsed
            .walk()
            .find(|n| n.kind() == "function_definition")
            .unwrap();
        assert!(table.is_read_in(func, "y"));
        assert!(table.is_read_in(func, "p"));
        assert!(!table.is_read_in(func, "x"));

        let assignments: Vec<Node> = parsed.walk().filter(|n| n.kind() == "assignment").collect();
        assert!(table.is_first_binding(func, "x", assignments[0]));
        assert!(!table.is_first_binding(func, "x", assignments[2]));
    }

    #[test]
    fn test_closure_reads_count_for_outer() {
        let src = "def f():\n    x = 1\n    def g():\n        return x\n    return g\n";
        let parsed = parse(src, "m.py").unwrap();
        let table = NameTable::build(&parsed);
        let outer = parsed
            .walk()
            .find(|n| n.kind() == "function_definition")
            .unwrap();
        assert!(table.is_read_in(outer, "x"));
    }

    #[test]
    fn test_global_declarations() {
        let src = "counter = 0\ndef bump():\n    global counter\n    counter = 1\n";
        let parsed = parse(src, "m.py").unwrap();
        let table = NameTable::build(&parsed);
        let func = parsed
            .walk()
            .find(|n| n.kind() == "function_definition")
            .unwrap();
        assert!(table.is_outer(func, "counter"));
    }
}
