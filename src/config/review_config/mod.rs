//! Review configuration
//!
//! Loads options from a `pyreview.toml` file in the reviewed directory,
//! or builds them from a named preset.
//!
//! # Configuration Format
//!
//! ```toml
//! # pyreview.toml
//! analyzers = ["complexity", "security", "smells"]
//! min_severity = "low"
//! max_complexity = 10
//! max_nesting_depth = 4
//! ignore_paths = ["migrations"]
//!
//! [[custom_rules]]
//! id = "custom/no-breakpoint"
//! pattern = "breakpoint\\(\\)"
//! severity = "medium"
//! message = "Leftover breakpoint()"
//! ```

use crate::models::Severity;
use serde::{de::Error as _, Deserialize, Deserializer, Serialize};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use thiserror::Error;
use tracing::debug;

pub const CONFIG_FILE_NAME: &str = "pyreview.toml";

/// Analyzers shipped with the crate.
pub const BUILTIN_ANALYZERS: &[&str] = &["complexity", "security", "smells"];

/// Name under which `custom_rules` run.
pub const CUSTOM_ANALYZER: &str = "custom";

const DEFAULT_IGNORE_PATHS: &[&str] = &[
    "__pycache__",
    ".git",
    ".venv",
    "venv",
    "node_modules",
    "build",
    "dist",
    ".tox",
    ".eggs",
    "*.egg-info",
    ".mypy_cache",
    ".pytest_cache",
];

const DEFAULT_IGNORE_FILES: &[&str] = &["*.pyc", "*.pyo", "setup.py", "conftest.py"];

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {name}: {reason}")]
    InvalidThreshold { name: &'static str, reason: String },

    #[error("unknown analyzer '{name}' (available: {available})")]
    UnknownAnalyzer { name: String, available: String },

    #[error("no analyzers enabled")]
    NoAnalyzers,

    #[error("unknown preset '{0}' (expected default, strict, relaxed or security-only)")]
    UnknownPreset(String),

    #[error("invalid ignore pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: String,
        #[source]
        source: globset::Error,
    },

    #[error("invalid custom rule '{id}': {reason}")]
    InvalidRule { id: String, reason: String },

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse {origin}: {message}")]
    Parse { origin: String, message: String },
}

/// A line-pattern rule declared in `pyreview.toml`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CustomRuleSpec {
    pub id: String,
    pub pattern: String,
    #[serde(default = "default_custom_severity")]
    pub severity: Severity,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub suggestion: String,
    /// Issue type; derived from `id` when omitted
    #[serde(default)]
    pub issue_type: Option<String>,
}

fn default_custom_severity() -> Severity {
    Severity::Low
}

impl CustomRuleSpec {
    /// `custom/no-breakpoint` becomes `no_breakpoint`.
    pub fn effective_type(&self) -> String {
        match &self.issue_type {
            Some(t) => t.clone(),
            None => self
                .id
                .rsplit('/')
                .next()
                .unwrap_or(&self.id)
                .replace('-', "_"),
        }
    }
}

/// Named option sets
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    Default,
    Strict,
    Relaxed,
    SecurityOnly,
}

impl FromStr for Preset {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().replace('_', "-").as_str() {
            "default" => Ok(Preset::Default),
            "strict" => Ok(Preset::Strict),
            "relaxed" => Ok(Preset::Relaxed),
            "security-only" | "security" => Ok(Preset::SecurityOnly),
            _ => Err(ConfigError::UnknownPreset(s.to_string())),
        }
    }
}

impl std::fmt::Display for Preset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Preset::Default => write!(f, "default"),
            Preset::Strict => write!(f, "strict"),
            Preset::Relaxed => write!(f, "relaxed"),
            Preset::SecurityOnly => write!(f, "security-only"),
        }
    }
}

/// Options consumed by the reviewer and every analyzer
///
/// Passed explicitly into each component; nothing reads it from global state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReviewConfig {
    pub analyzers: Vec<String>,
    pub min_severity: Severity,

    #[serde(deserialize_with = "non_negative")]
    pub max_complexity: usize,
    /// Complexity above this escalates `high_complexity` to HIGH
    #[serde(deserialize_with = "non_negative")]
    pub complexity_high_threshold: usize,
    #[serde(deserialize_with = "non_negative")]
    pub max_nesting_depth: usize,
    #[serde(deserialize_with = "non_negative")]
    pub max_function_lines: usize,
    #[serde(deserialize_with = "non_negative")]
    pub max_parameters: usize,
    #[serde(deserialize_with = "non_negative")]
    pub max_line_length: usize,
    #[serde(deserialize_with = "non_negative")]
    pub max_file_lines: usize,
    #[serde(deserialize_with = "non_negative")]
    pub max_class_methods: usize,

    /// Directory name globs, matched against every path component
    pub ignore_paths: Vec<String>,
    /// File name globs
    pub ignore_files: Vec<String>,

    pub parallel: bool,
    /// Worker threads, 0 = auto
    #[serde(deserialize_with = "non_negative")]
    pub workers: usize,

    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub custom_rules: Vec<CustomRuleSpec>,
}

fn non_negative<'de, D: Deserializer<'de>>(deserializer: D) -> Result<usize, D::Error> {
    let value = i64::deserialize(deserializer)?;
    usize::try_from(value)
        .map_err(|_| D::Error::custom(format!("must not be negative, got {}", value)))
}

impl Default for ReviewConfig {
    fn default() -> Self {
        Self {
            analyzers: BUILTIN_ANALYZERS.iter().map(|s| s.to_string()).collect(),
            min_severity: Severity::Info,
            max_complexity: 10,
            complexity_high_threshold: 15,
            max_nesting_depth: 4,
            max_function_lines: 50,
            max_parameters: 5,
            max_line_length: 120,
            max_file_lines: 500,
            max_class_methods: 20,
            ignore_paths: DEFAULT_IGNORE_PATHS.iter().map(|s| s.to_string()).collect(),
            ignore_files: DEFAULT_IGNORE_FILES.iter().map(|s| s.to_string()).collect(),
            parallel: true,
            workers: 0,
            custom_rules: Vec::new(),
        }
    }
}

impl ReviewConfig {
    /// Lower thresholds, report down to LOW.
    pub fn strict() -> Self {
        Self {
            min_severity: Severity::Low,
            max_complexity: 7,
            complexity_high_threshold: 11,
            max_nesting_depth: 3,
            max_function_lines: 30,
            max_parameters: 4,
            max_line_length: 100,
            max_file_lines: 300,
            max_class_methods: 15,
            ..Self::default()
        }
    }

    /// Higher thresholds, report only HIGH and above.
    pub fn relaxed() -> Self {
        Self {
            min_severity: Severity::High,
            max_complexity: 15,
            complexity_high_threshold: 20,
            max_nesting_depth: 6,
            max_function_lines: 100,
            max_parameters: 8,
            max_line_length: 150,
            max_file_lines: 1000,
            max_class_methods: 30,
            ..Self::default()
        }
    }

    pub fn security_only() -> Self {
        Self {
            analyzers: vec!["security".to_string()],
            min_severity: Severity::Medium,
            ..Self::default()
        }
    }

    pub fn preset(preset: Preset) -> Self {
        match preset {
            Preset::Default => Self::default(),
            Preset::Strict => Self::strict(),
            Preset::Relaxed => Self::relaxed(),
            Preset::SecurityOnly => Self::security_only(),
        }
    }

    /// Parse TOML text. Missing keys keep their defaults.
    pub fn from_toml_str(content: &str, origin: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::Parse {
            origin: origin.to_string(),
            message: e.to_string(),
        })
    }

    pub fn from_file(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml_str(&content, &path.display().to_string())?;
        debug!("Loaded review config from {}", path.display());
        Ok(config)
    }

    /// Load `pyreview.toml` from `dir` if present, defaults otherwise.
    pub fn discover(dir: &Path) -> Result<Self, ConfigError> {
        let candidate = dir.join(CONFIG_FILE_NAME);
        if candidate.is_file() {
            Self::from_file(&candidate)
        } else {
            debug!("No {} in {}, using defaults", CONFIG_FILE_NAME, dir.display());
            Ok(Self::default())
        }
    }

    /// Render as TOML, the format `from_toml_str` reads back.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        toml::to_string_pretty(self).map_err(|e| ConfigError::Parse {
            origin: "config".to_string(),
            message: e.to_string(),
        })
    }

    pub fn is_enabled(&self, analyzer: &str) -> bool {
        self.analyzers.iter().any(|a| a == analyzer)
    }

    /// Validate with only the built-in analyzers known.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_with(&[])
    }

    /// Validate, accepting `extra_analyzers` as registered analyzer names.
    pub fn validate_with(&self, extra_analyzers: &[&str]) -> Result<(), ConfigError> {
        let thresholds: [(&'static str, usize); 8] = [
            ("max_complexity", self.max_complexity),
            ("complexity_high_threshold", self.complexity_high_threshold),
            ("max_nesting_depth", self.max_nesting_depth),
            ("max_function_lines", self.max_function_lines),
            ("max_parameters", self.max_parameters),
            ("max_line_length", self.max_line_length),
            ("max_file_lines", self.max_file_lines),
            ("max_class_methods", self.max_class_methods),
        ];
        for (name, value) in thresholds {
            if value == 0 {
                return Err(ConfigError::InvalidThreshold {
                    name,
                    reason: "must be at least 1".to_string(),
                });
            }
        }
        if self.complexity_high_threshold < self.max_complexity {
            return Err(ConfigError::InvalidThreshold {
                name: "complexity_high_threshold",
                reason: format!(
                    "{} is below max_complexity ({})",
                    self.complexity_high_threshold, self.max_complexity
                ),
            });
        }

        if self.analyzers.is_empty() {
            return Err(ConfigError::NoAnalyzers);
        }
        let mut known: Vec<&str> = BUILTIN_ANALYZERS.to_vec();
        if !self.custom_rules.is_empty() {
            known.push(CUSTOM_ANALYZER);
        }
        known.extend_from_slice(extra_analyzers);
        for name in &self.analyzers {
            if !known.contains(&name.as_str()) {
                return Err(ConfigError::UnknownAnalyzer {
                    name: name.clone(),
                    available: known.join(", "),
                });
            }
        }

        super::IgnoreMatcher::new(&self.ignore_paths, &self.ignore_files)?;

        for rule in &self.custom_rules {
            if rule.id.trim().is_empty() {
                return Err(ConfigError::InvalidRule {
                    id: rule.id.clone(),
                    reason: "id must not be empty".to_string(),
                });
            }
            regex::Regex::new(&rule.pattern).map_err(|e| ConfigError::InvalidRule {
                id: rule.id.clone(),
                reason: e.to_string(),
            })?;
        }

        Ok(())
    }
}
