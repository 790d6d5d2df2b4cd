//! Text (terminal) reporter with colors and formatting

use crate::models::{FileResult, Grade, Issue, ReviewResult, Severity};
use anyhow::Result;

/// Grade colors (ANSI escape codes)
fn grade_color(grade: Grade) -> &'static str {
    match grade {
        Grade::A => "\x1b[32m", // Green
        Grade::B => "\x1b[92m", // Light green
        Grade::C => "\x1b[33m", // Yellow
        Grade::D => "\x1b[91m", // Light red
        Grade::F => "\x1b[31m", // Red
    }
}

/// Severity colors
fn severity_color(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "\x1b[31m", // Red
        Severity::High => "\x1b[91m",     // Light red
        Severity::Medium => "\x1b[33m",   // Yellow
        Severity::Low => "\x1b[34m",      // Blue
        Severity::Info => "\x1b[90m",     // Gray
    }
}

const RESET: &str = "\x1b[0m";
const BOLD: &str = "\x1b[1m";
const DIM: &str = "\x1b[2m";

fn severity_tag(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "[C]",
        Severity::High => "[H]",
        Severity::Medium => "[M]",
        Severity::Low => "[L]",
        Severity::Info => "[I]",
    }
}

/// Render result as formatted terminal output
pub fn render(result: &ReviewResult) -> Result<String> {
    let mut out = String::new();
    let summary = result.summary();
    let m = &result.metrics;

    // Header
    let grade_c = grade_color(summary.grade);
    out.push_str(&format!("\n{BOLD}pyreview{RESET}\n"));
    out.push_str(&format!(
        "{DIM}──────────────────────────────────────{RESET}\n"
    ));
    out.push_str(&format!(
        "Score: {BOLD}{}/100{RESET}  Grade: {grade_c}{BOLD}{}{RESET}  ",
        summary.score, summary.grade
    ));
    out.push_str(&format!(
        "Files: {}  Functions: {}  Classes: {}  LOC: {}\n",
        summary.files_reviewed, m.functions, m.classes, m.lines_of_code
    ));
    out.push_str(&format!(
        "{DIM}Maintainability {:.1}  Avg complexity {:.2}  Comments {:.1}%  Duplication {:.1}%  ({:.2}s){RESET}\n\n",
        m.maintainability_index,
        m.avg_complexity,
        m.comment_ratio * 100.0,
        m.duplication_ratio * 100.0,
        result.duration_seconds
    ));

    // Issue summary
    out.push_str(&format!("{BOLD}ISSUES{RESET} ({} total)\n", summary.total_issues));
    let counts = [
        (Severity::Critical, summary.critical),
        (Severity::High, summary.high),
        (Severity::Medium, summary.medium),
        (Severity::Low, summary.low),
        (Severity::Info, summary.info),
    ];
    let parts: Vec<String> = counts
        .iter()
        .filter(|(_, n)| *n > 0)
        .map(|(sev, n)| format!("{}{} {}{RESET}", severity_color(*sev), n, sev))
        .collect();
    if !parts.is_empty() {
        out.push_str(&format!("  {}\n", parts.join(" | ")));
    }
    out.push('\n');

    // Per-file listing
    for (file, issues) in result.issues_by_file() {
        out.push_str(&format!("{BOLD}{}{RESET}\n", file));
        for issue in issues {
            out.push_str(&render_issue(issue));
        }
        out.push('\n');
    }

    let troubled: Vec<&FileResult> = result
        .files
        .iter()
        .filter(|f| f.error.is_some() || !f.analyzer_faults.is_empty())
        .collect();
    if !troubled.is_empty() || summary.files_skipped > 0 {
        let failed = result
            .files
            .iter()
            .filter(|f| !f.skipped && f.error.is_some())
            .count();
        out.push_str(&format!(
            "{BOLD}NOT FULLY REVIEWED ({} skipped, {} failed){RESET}\n",
            summary.files_skipped, failed
        ));
        for file in troubled {
            if let Some(err) = &file.error {
                out.push_str(&format!("  {DIM}{}{RESET}: {}\n", file.file, err));
            }
            for fault in &file.analyzer_faults {
                out.push_str(&format!("  {DIM}{}{RESET}: analyzer {}\n", file.file, fault));
            }
        }
        out.push('\n');
    }

    match summary.grade {
        Grade::A => out.push_str(&format!("{DIM}Excellent! Keep up the good work.{RESET}\n")),
        Grade::B => out.push_str(&format!(
            "{DIM}Good shape. Address remaining issues for an A.{RESET}\n"
        )),
        _ => out.push_str(&format!(
            "{DIM}Start with the critical and high issues above.{RESET}\n"
        )),
    }

    Ok(out)
}

fn render_issue(issue: &Issue) -> String {
    let sev_c = severity_color(issue.severity);
    let mut out = format!(
        "  {DIM}{:>4}:{:<3}{RESET} {sev_c}{}{RESET} {}  {DIM}{}{RESET}\n",
        issue.line,
        issue.column,
        severity_tag(issue.severity),
        issue.message,
        issue.rule
    );
    if !issue.code.is_empty() {
        out.push_str(&format!("             {DIM}{}{RESET}\n", issue.code));
    }
    if !issue.suggestion.is_empty() {
        out.push_str(&format!("             -> {}\n", issue.suggestion));
    }
    if let Some(explanation) = issue.ai_explanation() {
        out.push_str(&format!("             AI: {}\n", explanation));
    }
    if let Some(fix) = issue.ai_fix() {
        out.push_str(&format!("             AI fix: {}\n", fix));
    }
    out
}
