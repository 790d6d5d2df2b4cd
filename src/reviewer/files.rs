//! File discovery and source loading

use crate::config::IgnoreMatcher;
use crate::parsers::is_supported;
use ignore::WalkBuilder;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Bytes inspected for a NUL when sniffing binary content
const BINARY_SNIFF_LEN: usize = 8 * 1024;

/// Collect reviewable Python files under `root`, sorted by path.
///
/// Honors `.gitignore`, skips hidden entries, prunes ignored directories and
/// drops files matching the ignore patterns. Paths are matched relative to
/// `root`.
pub(crate) fn discover(root: &Path, recursive: bool, ignore: &IgnoreMatcher) -> Vec<PathBuf> {
    let mut builder = WalkBuilder::new(root);
    builder
        .hidden(true)
        .git_ignore(true)
        .git_global(false)
        .git_exclude(true)
        .require_git(false);
    if !recursive {
        builder.max_depth(Some(1));
    }

    let prune = ignore.clone();
    let base = root.to_path_buf();
    builder.filter_entry(move |entry| {
        let is_dir = entry.file_type().map(|t| t.is_dir()).unwrap_or(false);
        if !is_dir || entry.depth() == 0 {
            return true;
        }
        let rel = entry.path().strip_prefix(&base).unwrap_or(entry.path());
        !prune.is_ignored_dir(rel)
    });

    let mut files = Vec::new();
    for entry in builder.build().flatten() {
        let path = entry.path();
        if !path.is_file() || !is_supported(path) {
            continue;
        }
        let rel = path.strip_prefix(root).unwrap_or(path);
        if ignore.is_ignored(rel) {
            debug!("Ignoring {}", rel.display());
            continue;
        }
        files.push(path.to_path_buf());
    }

    files.sort();
    files
}

/// Decoded file content
#[derive(Debug, Clone, PartialEq)]
pub(crate) enum SourceText {
    Text(String),
    Binary,
}

/// Decode raw bytes: NUL in the first 8 KiB means binary, invalid UTF-8
/// falls back to Latin-1 so decoding never fails.
pub(crate) fn decode(bytes: Vec<u8>) -> SourceText {
    let head = &bytes[..bytes.len().min(BINARY_SNIFF_LEN)];
    if memchr::memchr(0, head).is_some() {
        return SourceText::Binary;
    }
    match String::from_utf8(bytes) {
        Ok(text) => SourceText::Text(text),
        Err(e) => SourceText::Text(e.into_bytes().iter().map(|&b| b as char).collect()),
    }
}

pub(crate) fn read_source(path: &Path) -> std::io::Result<SourceText> {
    std::fs::read(path).map(decode)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn default_matcher() -> IgnoreMatcher {
        let config = crate::config::ReviewConfig::default();
        IgnoreMatcher::new(&config.ignore_paths, &config.ignore_files).expect("valid globs")
    }

    fn touch(root: &Path, rel: &str) {
        let path = root.join(rel);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).unwrap();
        }
        fs::write(path, "x = 1\n").unwrap();
    }

    #[test]
    fn test_discover_filters_and_sorts() {
        let dir = TempDir::new().unwrap();
        let root = dir.path();
        touch(root, "b.py");
        touch(root, "a.py");
        touch(root, "stubs.pyi");
        touch(root, "notes.txt");
        touch(root, "setup.py");
        touch(root, "pkg/mod.py");
        touch(root, "venv/lib/site.py");
        touch(root, "__pycache__/a.py");
        touch(root, ".hidden/x.py");

        let files: Vec<String> = discover(root, true, &default_matcher())
            .iter()
            .map(|p| {
                p.strip_prefix(root)
                    .unwrap()
                    .to_string_lossy()
                    .replace('\\', "/")
            })
            .collect();
        assert_eq!(files, vec!["a.py", "b.py", "pkg/mod.py", "stubs.pyi"]);
    }

    #[test]
    fn test_discover_non_recursive() {
        let dir = TempDir::new().unwrap();
        touch(dir.path(), "top.py");
        touch(dir.path(), "pkg/deep.py");
        let files = discover(dir.path(), false, &default_matcher());
        assert_eq!(files.len(), 1);
        assert!(files[0].ends_with("top.py"));
    }

    #[test]
    fn test_decode() {
        assert_eq!(decode(b"x = 1\n".to_vec()), SourceText::Text("x = 1\n".into()));
        assert_eq!(decode(vec![b'a', 0, b'b']), SourceText::Binary);
        // 0xE9 is 'é' in Latin-1 and invalid on its own in UTF-8.
        assert_eq!(
            decode(vec![b'#', b' ', 0xE9, b'\n']),
            SourceText::Text("# é\n".into())
        );
    }
}
