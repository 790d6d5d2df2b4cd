//! Core data models for pyreview
//!
//! Issues, metrics and the per-file / per-project results that the
//! reviewer produces and the reporters consume. Scores and grades are
//! never stored: they are recomputed from the issue lists on every read.

use crate::scoring;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::str::FromStr;

/// Severity levels for issues
///
/// Ordered from least to most severe, so `Critical > High > ... > Info`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// All severities, most severe first.
    pub const ALL: [Severity; 5] = [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Info,
    ];

    /// True when `self` is `threshold` or more severe.
    pub fn is_at_least(self, threshold: Severity) -> bool {
        self >= threshold
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl FromStr for Severity {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => Err(format!(
                "unknown severity '{}' (expected critical, high, medium, low or info)",
                other
            )),
        }
    }
}

/// A single detected problem
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
pub struct Issue {
    #[serde(rename = "type")]
    pub issue_type: String,
    pub severity: Severity,
    pub file: String,
    /// 1-based
    pub line: usize,
    /// 1-based, in characters
    pub column: usize,
    #[serde(default)]
    pub end_line: Option<usize>,
    #[serde(default)]
    pub end_column: Option<usize>,
    #[serde(default)]
    pub message: String,
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub suggestion: String,
    #[serde(default)]
    pub rule: String,
    #[serde(default)]
    ai_explanation: Option<String>,
    #[serde(default)]
    ai_fix: Option<String>,
    #[serde(default)]
    pub metadata: BTreeMap<String, serde_json::Value>,
}

impl Issue {
    pub fn new(
        issue_type: impl Into<String>,
        severity: Severity,
        file: impl Into<String>,
        line: usize,
        column: usize,
    ) -> Self {
        Self {
            issue_type: issue_type.into(),
            severity,
            file: file.into(),
            line,
            column,
            ..Default::default()
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = message.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = suggestion.into();
        self
    }

    pub fn with_rule(mut self, rule: impl Into<String>) -> Self {
        self.rule = rule.into();
        self
    }

    pub fn with_end(mut self, end_line: usize, end_column: usize) -> Self {
        self.end_line = Some(end_line);
        self.end_column = Some(end_column);
        self
    }

    pub fn with_meta(mut self, key: &str, value: impl Into<serde_json::Value>) -> Self {
        self.metadata.insert(key.to_string(), value.into());
        self
    }

    pub fn ai_explanation(&self) -> Option<&str> {
        self.ai_explanation.as_deref()
    }

    pub fn ai_fix(&self) -> Option<&str> {
        self.ai_fix.as_deref()
    }

    /// Attach an AI explanation. Returns false if one was already set.
    pub fn set_ai_explanation(&mut self, text: impl Into<String>) -> bool {
        if self.ai_explanation.is_some() {
            return false;
        }
        self.ai_explanation = Some(text.into());
        true
    }

    /// Attach an AI fix. Returns false if one was already set.
    pub fn set_ai_fix(&mut self, text: impl Into<String>) -> bool {
        if self.ai_fix.is_some() {
            return false;
        }
        self.ai_fix = Some(text.into());
        true
    }
}

/// Quantitative snapshot of a file or a whole project
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Metrics {
    pub total_lines: usize,
    pub blank_lines: usize,
    pub comment_lines: usize,
    pub lines_of_code: usize,
    pub functions: usize,
    pub classes: usize,
    pub avg_complexity: f64,
    pub max_complexity: usize,
    pub maintainability_index: f64,
    pub comment_ratio: f64,
    pub duplication_ratio: f64,
}

impl Default for Metrics {
    /// The neutral record: nothing counted, nothing to deduct for.
    fn default() -> Self {
        Self {
            total_lines: 0,
            blank_lines: 0,
            comment_lines: 0,
            lines_of_code: 0,
            functions: 0,
            classes: 0,
            avg_complexity: 0.0,
            max_complexity: 0,
            maintainability_index: 100.0,
            comment_ratio: 0.0,
            duplication_ratio: 0.0,
        }
    }
}

impl Metrics {
    /// Combine per-file metrics into a project snapshot.
    ///
    /// Counts are summed and `max_complexity` is the max. Averages only
    /// cover files that contribute to them, and ratios come from the pooled
    /// line counts. The duplication ratio here is the line-weighted mean of
    /// the file ratios; the reviewer replaces it with the pooled value.
    pub fn aggregate<'a>(items: impl IntoIterator<Item = &'a Metrics>) -> Metrics {
        let mut total = Metrics::default();
        let mut cc_weighted = 0.0;
        let mut mi_sum = 0.0;
        let mut mi_files = 0usize;
        let mut dup_weighted = 0.0;

        for m in items {
            total.total_lines += m.total_lines;
            total.blank_lines += m.blank_lines;
            total.comment_lines += m.comment_lines;
            total.lines_of_code += m.lines_of_code;
            total.functions += m.functions;
            total.classes += m.classes;
            total.max_complexity = total.max_complexity.max(m.max_complexity);
            cc_weighted += m.avg_complexity * m.functions as f64;
            dup_weighted += m.duplication_ratio * m.lines_of_code as f64;
            if m.lines_of_code > 0 {
                mi_sum += m.maintainability_index;
                mi_files += 1;
            }
        }

        if total.functions > 0 {
            total.avg_complexity = round2(cc_weighted / total.functions as f64);
        }
        if mi_files > 0 {
            total.maintainability_index = round2(mi_sum / mi_files as f64);
        }
        let commented = total.lines_of_code + total.comment_lines;
        if commented > 0 {
            total.comment_ratio = round4(total.comment_lines as f64 / commented as f64);
        }
        if total.lines_of_code > 0 {
            total.duplication_ratio = round4(dup_weighted / total.lines_of_code as f64);
        }
        total
    }
}

pub(crate) fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

pub(crate) fn round4(v: f64) -> f64 {
    (v * 10_000.0).round() / 10_000.0
}

/// Letter bucket for a 0-100 score
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Grade {
    A,
    B,
    C,
    D,
    F,
}

impl Grade {
    /// Calculate grade from score
    pub fn from_score(score: u8) -> Grade {
        match score {
            90..=u8::MAX => Grade::A,
            80..=89 => Grade::B,
            70..=79 => Grade::C,
            60..=69 => Grade::D,
            _ => Grade::F,
        }
    }
}

impl std::fmt::Display for Grade {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Grade::A => "A",
            Grade::B => "B",
            Grade::C => "C",
            Grade::D => "D",
            Grade::F => "F",
        };
        f.write_str(s)
    }
}

/// Outcome of reviewing one file
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct FileResult {
    pub file: String,
    /// Detection order, not sorted
    pub issues: Vec<Issue>,
    pub metrics: Metrics,
    #[serde(default)]
    pub skipped: bool,
    #[serde(default)]
    pub error: Option<String>,
    /// Analyzers that failed on this file, as `name: reason`
    #[serde(default)]
    pub analyzer_faults: Vec<String>,
}

impl FileResult {
    pub fn analyzed(file: impl Into<String>, issues: Vec<Issue>, metrics: Metrics) -> Self {
        Self {
            file: file.into(),
            issues,
            metrics,
            skipped: false,
            error: None,
            analyzer_faults: Vec::new(),
        }
    }

    /// Excluded before analysis (binary, unreadable). `reason` goes to `error`
    /// when it describes a failure.
    pub fn skipped(file: impl Into<String>, reason: Option<String>) -> Self {
        Self {
            file: file.into(),
            issues: Vec::new(),
            metrics: Metrics::default(),
            skipped: true,
            error: reason,
            analyzer_faults: Vec::new(),
        }
    }

    /// Read but could not be parsed.
    pub fn failed(file: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            file: file.into(),
            issues: Vec::new(),
            metrics: Metrics::default(),
            skipped: false,
            error: Some(error.into()),
            analyzer_faults: Vec::new(),
        }
    }

    /// Whether this file takes part in the project score.
    pub fn is_scored(&self) -> bool {
        !self.skipped && self.error.is_none()
    }

    pub fn score(&self) -> u8 {
        scoring::file_score(&self.issues, Some(&self.metrics))
    }

    pub fn grade(&self) -> Grade {
        Grade::from_score(self.score())
    }

    pub fn filter_by_severity(&self, min: Severity) -> FileResult {
        FileResult {
            issues: self
                .issues
                .iter()
                .filter(|i| i.severity.is_at_least(min))
                .cloned()
                .collect(),
            ..self.clone()
        }
    }
}

impl Serialize for FileResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Repr<'a> {
            file: &'a str,
            score: u8,
            grade: Grade,
            skipped: bool,
            error: &'a Option<String>,
            #[serde(skip_serializing_if = "<[_]>::is_empty")]
            analyzer_faults: &'a [String],
            metrics: &'a Metrics,
            issues: &'a [Issue],
        }

        Repr {
            file: &self.file,
            score: self.score(),
            grade: self.grade(),
            skipped: self.skipped,
            error: &self.error,
            analyzer_faults: &self.analyzer_faults,
            metrics: &self.metrics,
            issues: &self.issues,
        }
        .serialize(serializer)
    }
}

/// Short overview of a review
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewSummary {
    pub files_reviewed: usize,
    pub files_skipped: usize,
    pub files_with_errors: usize,
    pub total_issues: usize,
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
    pub score: u8,
    pub grade: Grade,
}

/// Project-level aggregate of a review
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ReviewResult {
    pub files: Vec<FileResult>,
    pub metrics: Metrics,
    pub timestamp: DateTime<Utc>,
    pub duration_seconds: f64,
}

impl ReviewResult {
    pub fn new(files: Vec<FileResult>, metrics: Metrics, duration_seconds: f64) -> Self {
        Self {
            files,
            metrics,
            timestamp: Utc::now(),
            duration_seconds,
        }
    }

    pub fn issues(&self) -> impl Iterator<Item = &Issue> {
        self.files.iter().flat_map(|f| f.issues.iter())
    }

    pub fn total_issues(&self) -> usize {
        self.files.iter().map(|f| f.issues.len()).sum()
    }

    pub fn issues_by_severity(&self) -> BTreeMap<Severity, usize> {
        let mut counts = BTreeMap::new();
        for issue in self.issues() {
            *counts.entry(issue.severity).or_insert(0) += 1;
        }
        counts
    }

    pub fn issues_by_type(&self) -> BTreeMap<String, usize> {
        let mut counts = BTreeMap::new();
        for issue in self.issues() {
            *counts.entry(issue.issue_type.clone()).or_insert(0) += 1;
        }
        counts
    }

    /// Files that have at least one issue, in file order.
    pub fn issues_by_file(&self) -> Vec<(&str, &[Issue])> {
        self.files
            .iter()
            .filter(|f| !f.issues.is_empty())
            .map(|f| (f.file.as_str(), f.issues.as_slice()))
            .collect()
    }

    pub fn score(&self) -> u8 {
        scoring::project_score(&self.files)
    }

    pub fn grade(&self) -> Grade {
        Grade::from_score(self.score())
    }

    pub fn summary(&self) -> ReviewSummary {
        let by_sev = self.issues_by_severity();
        let count = |s: Severity| by_sev.get(&s).copied().unwrap_or(0);
        ReviewSummary {
            files_reviewed: self.files.iter().filter(|f| !f.skipped).count(),
            files_skipped: self.files.iter().filter(|f| f.skipped).count(),
            files_with_errors: self.files.iter().filter(|f| f.error.is_some()).count(),
            total_issues: self.total_issues(),
            critical: count(Severity::Critical),
            high: count(Severity::High),
            medium: count(Severity::Medium),
            low: count(Severity::Low),
            info: count(Severity::Info),
            score: self.score(),
            grade: self.grade(),
        }
    }

    /// Keep only issues at `min` or above. Idempotent.
    pub fn filter_by_severity(&self, min: Severity) -> ReviewResult {
        ReviewResult {
            files: self
                .files
                .iter()
                .map(|f| f.filter_by_severity(min))
                .collect(),
            ..self.clone()
        }
    }
}

impl Serialize for ReviewResult {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        #[derive(Serialize)]
        struct Repr<'a> {
            timestamp: &'a DateTime<Utc>,
            duration_seconds: f64,
            summary: ReviewSummary,
            issues_by_type: BTreeMap<String, usize>,
            metrics: &'a Metrics,
            files: &'a [FileResult],
        }

        Repr {
            timestamp: &self.timestamp,
            duration_seconds: self.duration_seconds,
            summary: self.summary(),
            issues_by_type: self.issues_by_type(),
            metrics: &self.metrics,
            files: &self.files,
        }
        .serialize(serializer)
    }
}
