//! Ignore patterns for file discovery

use super::ConfigError;
use globset::{Glob, GlobSet, GlobSetBuilder};
use std::path::Path;

/// Compiled `ignore_paths` / `ignore_files` globs
#[derive(Debug, Clone)]
pub struct IgnoreMatcher {
    paths: GlobSet,
    files: GlobSet,
}

impl IgnoreMatcher {
    pub fn new(ignore_paths: &[String], ignore_files: &[String]) -> Result<Self, ConfigError> {
        Ok(Self {
            paths: build_set(ignore_paths)?,
            files: build_set(ignore_files)?,
        })
    }

    /// `path` should be relative to the review root.
    ///
    /// Path patterns match any single component (`venv`, `*.egg-info`) or the
    /// whole relative path (`src/generated/**`). File patterns match the file
    /// name only.
    pub fn is_ignored(&self, path: &Path) -> bool {
        if let Some(name) = path.file_name() {
            if self.files.is_match(Path::new(name)) {
                return true;
            }
        }
        if self.paths.is_match(path) {
            return true;
        }
        let parent_components = path.parent().into_iter().flat_map(|p| p.components());
        parent_components
            .map(|c| c.as_os_str())
            .any(|c| self.paths.is_match(Path::new(c)))
    }

    /// Whether a directory (relative to the review root) should be pruned.
    pub fn is_ignored_dir(&self, path: &Path) -> bool {
        if self.paths.is_match(path) {
            return true;
        }
        path.file_name()
            .map(|name| self.paths.is_match(Path::new(name)))
            .unwrap_or(false)
    }
}

fn build_set(patterns: &[String]) -> Result<GlobSet, ConfigError> {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        let glob = Glob::new(pattern.trim_end_matches('/')).map_err(|source| {
            ConfigError::InvalidPattern {
                pattern: pattern.clone(),
                source,
            }
        })?;
        builder.add(glob);
    }
    builder.build().map_err(|source| ConfigError::InvalidPattern {
        pattern: patterns.join(", "),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(paths: &[&str], files: &[&str]) -> IgnoreMatcher {
        let paths: Vec<String> = paths.iter().map(|s| s.to_string()).collect();
        let files: Vec<String> = files.iter().map(|s| s.to_string()).collect();
        IgnoreMatcher::new(&paths, &files).expect("valid globs")
    }

    #[test]
    fn test_component_match() {
        let m = matcher(&["venv", "*.egg-info"], &[]);
        assert!(m.is_ignored(Path::new("venv/lib/site.py")));
        assert!(m.is_ignored(Path::new("pkg/foo.egg-info/setup.py")));
        assert!(!m.is_ignored(Path::new("src/venvironment.py")));
        assert!(!m.is_ignored(Path::new("src/app.py")));
    }

    #[test]
    fn test_full_path_match() {
        let m = matcher(&["src/generated/**"], &[]);
        assert!(m.is_ignored(Path::new("src/generated/model.py")));
        assert!(!m.is_ignored(Path::new("src/model.py")));
    }

    #[test]
    fn test_file_match() {
        let m = matcher(&[], &["setup.py", "test_*.py"]);
        assert!(m.is_ignored(Path::new("setup.py")));
        assert!(m.is_ignored(Path::new("pkg/test_api.py")));
        assert!(!m.is_ignored(Path::new("pkg/api.py")));
    }

    #[test]
    fn test_dir_pruning() {
        let m = matcher(&["venv", "src/generated"], &["setup.py"]);
        assert!(m.is_ignored_dir(Path::new("venv")));
        assert!(m.is_ignored_dir(Path::new("pkg/venv")));
        assert!(m.is_ignored_dir(Path::new("src/generated")));
        assert!(!m.is_ignored_dir(Path::new("src")));
        assert!(!m.is_ignored_dir(Path::new("setup.py")));
    }

    #[test]
    fn test_trailing_slash_pattern() {
        let m = matcher(&["build/"], &[]);
        assert!(m.is_ignored(Path::new("build/lib/x.py")));
    }
}
