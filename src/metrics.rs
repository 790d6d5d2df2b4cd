//! Metrics calculator
//!
//! Derives the [`Metrics`] record for one file from its parsed tree and raw
//! text, independently of issue detection.
//!
//! Maintainability index:
//!
//! ```text
//! MI = 100
//!    - 5    * max(avg_cc - 1, 0)
//!    - 0.05 * max(loc - 100, 0)
//!    + clamp((comment_ratio - 0.1) * 20, 0, 10)
//! ```
//!
//! clamped to [0, 100] and rounded to two decimals.
//!
//! Duplication hashes every window of [`WINDOW_LINES`] consecutive normalized
//! code lines with xxh3. A window is duplicated when its hash occurs more
//! than once in the scope (one file, or the pooled project).

use crate::analyzers::complexity::{measure_classes, measure_functions};
use crate::models::{round2, round4, Metrics};
use crate::parsers::ParsedSource;
use rustc_hash::FxHashMap;
use xxhash_rust::xxh3::xxh3_64;

/// Lines per duplication window
pub const WINDOW_LINES: usize = 5;

/// Metrics for one file plus its duplication fingerprints
#[derive(Debug, Clone, PartialEq)]
pub struct FileMetrics {
    pub metrics: Metrics,
    /// One xxh3 hash per window, in source order
    pub fingerprints: Vec<u64>,
}

/// Physical line classification
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LineCounts {
    pub total: usize,
    pub blank: usize,
    pub comment: usize,
    pub code: usize,
}

pub fn count_lines(source: &str) -> LineCounts {
    let mut counts = LineCounts::default();
    for line in source.lines() {
        counts.total += 1;
        let trimmed = line.trim();
        if trimmed.is_empty() {
            counts.blank += 1;
        } else if trimmed.starts_with('#') {
            counts.comment += 1;
        } else {
            counts.code += 1;
        }
    }
    counts
}

pub fn comment_ratio(comment: usize, code: usize) -> f64 {
    let total = comment + code;
    if total == 0 {
        0.0
    } else {
        comment as f64 / total as f64
    }
}

pub fn maintainability_index(avg_complexity: f64, lines_of_code: usize, comment_ratio: f64) -> f64 {
    let complexity_penalty = 5.0 * (avg_complexity - 1.0).max(0.0);
    let size_penalty = 0.05 * (lines_of_code as f64 - 100.0).max(0.0);
    let comment_bonus = ((comment_ratio - 0.1) * 20.0).clamp(0.0, 10.0);
    round2((100.0 - complexity_penalty - size_penalty + comment_bonus).clamp(0.0, 100.0))
}

fn normalize_line(line: &str) -> Option<String> {
    let trimmed = line.trim();
    if trimmed.is_empty() || trimmed.starts_with('#') {
        return None;
    }
    Some(trimmed.split_whitespace().collect::<Vec<_>>().join(" "))
}

/// Window hashes over normalized code lines.
pub fn fingerprints(source: &str) -> Vec<u64> {
    let lines: Vec<String> = source.lines().filter_map(normalize_line).collect();
    if lines.len() < WINDOW_LINES {
        return Vec::new();
    }
    lines
        .windows(WINDOW_LINES)
        .map(|window| xxh3_64(window.join("\n").as_bytes()))
        .collect()
}

/// Fraction of windows whose hash recurs within the pooled scope.
pub fn duplication_ratio<'a>(scopes: impl IntoIterator<Item = &'a [u64]>) -> f64 {
    let mut counts: FxHashMap<u64, usize> = FxHashMap::default();
    let mut total = 0usize;
    for hashes in scopes {
        for hash in hashes {
            *counts.entry(*hash).or_insert(0) += 1;
            total += 1;
        }
    }
    if total == 0 {
        return 0.0;
    }
    let duplicated: usize = counts.values().filter(|&&n| n > 1).sum();
    round4(duplicated as f64 / total as f64)
}

/// Compute the metrics record for one parsed file.
pub fn calculate(parsed: &ParsedSource) -> FileMetrics {
    let lines = count_lines(parsed.source());
    let functions = measure_functions(parsed);
    let classes = measure_classes(parsed);

    let (avg_complexity, max_complexity) = if functions.is_empty() {
        (0.0, 0)
    } else {
        let sum: usize = functions.iter().map(|f| f.complexity).sum();
        let max = functions.iter().map(|f| f.complexity).max().unwrap_or(0);
        (sum as f64 / functions.len() as f64, max)
    };

    let ratio = comment_ratio(lines.comment, lines.code);
    let fingerprints = fingerprints(parsed.source());

    let metrics = Metrics {
        total_lines: lines.total,
        blank_lines: lines.blank,
        comment_lines: lines.comment,
        lines_of_code: lines.code,
        functions: functions.len(),
        classes: classes.len(),
        avg_complexity: round2(avg_complexity),
        max_complexity,
        maintainability_index: maintainability_index(avg_complexity, lines.code, ratio),
        comment_ratio: round4(ratio),
        duplication_ratio: duplication_ratio([fingerprints.as_slice()]),
    };

    FileMetrics {
        metrics,
        fingerprints,
    }
}
