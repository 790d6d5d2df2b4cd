//! Python parser using tree-sitter
//!
//! Wraps the parsed tree together with its source text so analyzers can
//! walk nodes, slice text and map byte offsets to 1-based line/column
//! positions without re-reading anything.

use thiserror::Error;
use tree_sitter::{Node, Parser, Tree, TreeCursor};

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseError {
    #[error("syntax error at line {line}, column {column}: {message}")]
    Syntax {
        line: usize,
        column: usize,
        message: String,
    },

    #[error("parser unavailable: {0}")]
    Parser(String),
}

/// A successfully parsed Python file
pub struct ParsedSource {
    path: String,
    source: String,
    tree: Tree,
    line_starts: Vec<usize>,
}

impl std::fmt::Debug for ParsedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ParsedSource")
            .field("path", &self.path)
            .field("bytes", &self.source.len())
            .finish()
    }
}

fn new_parser() -> Result<Parser, ParseError> {
    let mut parser = Parser::new();
    let language = tree_sitter_python::LANGUAGE;
    parser
        .set_language(&language.into())
        .map_err(|e| ParseError::Parser(e.to_string()))?;
    Ok(parser)
}

/// Parse Python source. `path` is only carried along for issue locations.
pub fn parse(source: impl Into<String>, path: &str) -> Result<ParsedSource, ParseError> {
    let source = source.into();
    let mut parser = new_parser()?;
    let tree = parser
        .parse(&source, None)
        .ok_or_else(|| ParseError::Parser("parse returned no tree".to_string()))?;

    let root = tree.root_node();
    if root.has_error() {
        let bad = Preorder::new(root)
            .find(|n| n.is_error() || n.is_missing())
            .unwrap_or(root);
        let (line, column) = char_position(&source, bad);
        let message = if bad.is_missing() {
            format!("missing {}", bad.kind())
        } else {
            "invalid syntax".to_string()
        };
        return Err(ParseError::Syntax {
            line,
            column,
            message,
        });
    }

    let line_starts = std::iter::once(0)
        .chain(source.match_indices('\n').map(|(i, _)| i + 1))
        .collect();

    Ok(ParsedSource {
        path: path.to_string(),
        source,
        tree,
        line_starts,
    })
}

/// Whether `text` on its own parses as at least one Python statement.
pub fn parses_as_statement(text: &str) -> bool {
    let Ok(mut parser) = new_parser() else {
        return false;
    };
    match parser.parse(text, None) {
        Some(tree) => {
            let root = tree.root_node();
            !root.has_error() && root.named_child_count() > 0
        }
        None => false,
    }
}

/// 1-based line and character column of a node's start.
fn char_position(source: &str, node: Node) -> (usize, usize) {
    let start = node.start_byte().min(source.len());
    let line_start = source[..start].rfind('\n').map(|i| i + 1).unwrap_or(0);
    let column = source
        .get(line_start..start)
        .map(|prefix| prefix.chars().count())
        .unwrap_or(node.start_position().column);
    (node.start_position().row + 1, column + 1)
}

impl ParsedSource {
    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn root(&self) -> Node<'_> {
        self.tree.root_node()
    }

    /// Every node of the tree, parents before children, in source order.
    pub fn walk(&self) -> Preorder<'_> {
        Preorder::new(self.root())
    }

    pub fn text(&self, node: Node) -> &str {
        node.utf8_text(self.source.as_bytes()).unwrap_or("")
    }

    /// 1-based (line, column) of the node start; columns count characters.
    pub fn position(&self, node: Node) -> (usize, usize) {
        char_position(&self.source, node)
    }

    /// 1-based (line, column) just past the node end.
    pub fn end_position(&self, node: Node) -> (usize, usize) {
        let end = node.end_byte().min(self.source.len());
        let row = node.end_position().row;
        let line_start = self.line_starts.get(row).copied().unwrap_or(0).min(end);
        let column = self
            .source
            .get(line_start..end)
            .map(|s| s.chars().count())
            .unwrap_or(node.end_position().column);
        (row + 1, column + 1)
    }

    pub fn line_count(&self) -> usize {
        self.source.lines().count()
    }

    /// Text of a 1-based line without its terminator, or "" out of range.
    pub fn line(&self, line: usize) -> &str {
        let Some(&start) = line.checked_sub(1).and_then(|i| self.line_starts.get(i)) else {
            return "";
        };
        let end = self
            .line_starts
            .get(line)
            .map(|next| next - 1)
            .unwrap_or(self.source.len());
        self.source
            .get(start..end.max(start))
            .unwrap_or("")
            .trim_end_matches('\r')
    }

    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.source.lines()
    }
}

/// Pre-order traversal of a subtree
pub struct Preorder<'t> {
    cursor: TreeCursor<'t>,
    depth: usize,
    done: bool,
}

impl<'t> Preorder<'t> {
    pub fn new(node: Node<'t>) -> Self {
        Self {
            cursor: node.walk(),
            depth: 0,
            done: false,
        }
    }
}

impl<'t> Iterator for Preorder<'t> {
    type Item = Node<'t>;

    fn next(&mut self) -> Option<Node<'t>> {
        if self.done {
            return None;
        }
        let node = self.cursor.node();
        if self.cursor.goto_first_child() {
            self.depth += 1;
        } else {
            loop {
                if self.depth == 0 {
                    self.done = true;
                    break;
                }
                if self.cursor.goto_next_sibling() {
                    break;
                }
                self.cursor.goto_parent();
                self.depth -= 1;
            }
        }
        Some(node)
    }
}
