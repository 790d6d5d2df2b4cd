//! Health scoring
//!
//! Turns an issue list (plus, at file level, a metrics record) into a
//! 0-100 integer score.
//!
//! # Scoring Formula
//!
//! ```text
//! File score    = clamp(100 - Σ penalty(issue) - metrics_deduction, 0, 100)
//! Project score = round(mean(file score over scored files))   (100 if none)
//! ```
//!
//! # Issue Penalties
//!
//! - Critical: 15
//! - High: 10
//! - Medium: 5
//! - Low: 2
//! - Info: 0
//!
//! # Metrics Deductions
//!
//! - Maintainability index below 50: 10, below 65: 5
//! - Max cyclomatic complexity above 20: 10, above 10: 5
//!
//! The project score is the unweighted mean of per-file scores. Skipped
//! and errored files do not take part. A large file with many issues
//! therefore weighs the same as a small clean one.

use crate::models::{FileResult, Issue, Metrics, Severity};

pub const MAX_SCORE: u8 = 100;

/// Points deducted for one issue of the given severity.
pub fn severity_penalty(severity: Severity) -> u32 {
    match severity {
        Severity::Critical => 15,
        Severity::High => 10,
        Severity::Medium => 5,
        Severity::Low => 2,
        Severity::Info => 0,
    }
}

/// Points deducted for poor file-level metrics.
pub fn metrics_deduction(metrics: &Metrics) -> u32 {
    let mut deduction = 0;

    if metrics.maintainability_index < 50.0 {
        deduction += 10;
    } else if metrics.maintainability_index < 65.0 {
        deduction += 5;
    }

    if metrics.max_complexity > 20 {
        deduction += 10;
    } else if metrics.max_complexity > 10 {
        deduction += 5;
    }

    deduction
}

/// Score for one issue list, optionally adjusted by its metrics.
pub fn file_score(issues: &[Issue], metrics: Option<&Metrics>) -> u8 {
    let penalty: u32 = issues.iter().map(|i| severity_penalty(i.severity)).sum::<u32>()
        + metrics.map(metrics_deduction).unwrap_or(0);
    MAX_SCORE.saturating_sub(penalty.min(MAX_SCORE as u32) as u8)
}

/// Unweighted mean of per-file scores over the files that were scored.
pub fn project_score(files: &[FileResult]) -> u8 {
    let scores: Vec<f64> = files
        .iter()
        .filter(|f| f.is_scored())
        .map(|f| f.score() as f64)
        .collect();

    if scores.is_empty() {
        return MAX_SCORE;
    }

    let mean = scores.iter().sum::<f64>() / scores.len() as f64;
    mean.round().clamp(0.0, MAX_SCORE as f64) as u8
}
