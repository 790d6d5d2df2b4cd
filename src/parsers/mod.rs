//! Source parsing using tree-sitter
//!
//! Only Python is analyzed. A source that does not parse cleanly yields a
//! [`ParseError`] carrying the first error location; callers record it
//! against the file and move on.

pub mod python;

pub use python::{parse, parses_as_statement, ParseError, ParsedSource, Preorder};

use std::path::Path;

/// File extensions handled by the Python parser
pub fn supported_extensions() -> &'static [&'static str] {
    &["py", "pyi"]
}

pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| supported_extensions().contains(&ext))
        .unwrap_or(false)
}
