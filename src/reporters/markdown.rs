//! Markdown reporter for GitHub-flavored Markdown output
//!
//! Suitable for pull request comments and CI job summaries.

use super::severity_label;
use crate::models::{Grade, Issue, ReviewResult, Severity};
use anyhow::Result;

/// Maximum issues listed per file
const MAX_ISSUES_PER_FILE: usize = 25;

/// Render result as GitHub-flavored Markdown
pub fn render(result: &ReviewResult) -> Result<String> {
    let mut md = String::new();

    md.push_str(&render_header(result));
    md.push('\n');
    md.push_str(&render_summary(result));
    md.push('\n');
    md.push_str(&render_metrics(result));
    md.push('\n');
    md.push_str(&render_issue_types(result));
    md.push_str(&render_files(result));
    md.push_str(&render_footer());

    Ok(md)
}

fn render_header(result: &ReviewResult) -> String {
    let timestamp = result.timestamp.format("%Y-%m-%d %H:%M:%S UTC");
    format!(
        r#"# Code Review Report

**Grade: {}** | **Score: {}/100**

Generated: {}
"#,
        result.grade(),
        result.score(),
        timestamp
    )
}

fn render_summary(result: &ReviewResult) -> String {
    let summary = result.summary();
    let assessment = match summary.grade {
        Grade::A => "Excellent - Code is clean and maintainable",
        Grade::B => "Good - Minor improvements recommended",
        Grade::C => "Fair - Several issues should be addressed",
        Grade::D => "Poor - Significant rework needed",
        Grade::F => "Critical - Serious problems present",
    };

    let mut md = format!(
        r#"## Summary

| Severity | Count |
|----------|-------|
| Critical | {} |
| High | {} |
| Medium | {} |
| Low | {} |
| Info | {} |
| **Total** | **{}** |

"#,
        summary.critical, summary.high, summary.medium, summary.low, summary.info, summary.total_issues
    );
    md.push_str(&format!(
        "Files reviewed: {} | Skipped: {} | With errors: {}\n\n",
        summary.files_reviewed, summary.files_skipped, summary.files_with_errors
    ));
    md.push_str(&format!("**Assessment:** {}\n", assessment));
    md
}

fn render_metrics(result: &ReviewResult) -> String {
    let m = &result.metrics;
    format!(
        r#"## Metrics

| Metric | Value |
|--------|-------|
| Lines of code | {} |
| Comment lines | {} |
| Functions | {} |
| Classes | {} |
| Avg complexity | {:.2} |
| Max complexity | {} |
| Maintainability index | {:.2} |
| Comment ratio | {:.1}% |
| Duplication ratio | {:.1}% |
"#,
        m.lines_of_code,
        m.comment_lines,
        m.functions,
        m.classes,
        m.avg_complexity,
        m.max_complexity,
        m.maintainability_index,
        m.comment_ratio * 100.0,
        m.duplication_ratio * 100.0
    )
}

fn render_issue_types(result: &ReviewResult) -> String {
    let by_type = result.issues_by_type();
    if by_type.is_empty() {
        return String::new();
    }
    let mut md = String::from("## Issue Types\n\n| Type | Count |\n|------|-------|\n");
    for (issue_type, count) in by_type {
        md.push_str(&format!("| `{}` | {} |\n", issue_type, count));
    }
    md.push('\n');
    md
}

fn render_files(result: &ReviewResult) -> String {
    let mut md = String::from("## Issues by File\n\n");
    let by_file = result.issues_by_file();
    if by_file.is_empty() {
        md.push_str("No issues found.\n\n");
        return md;
    }

    for (file, issues) in by_file {
        md.push_str(&format!("### `{}` ({})\n\n", file, issues.len()));
        for issue in issues.iter().take(MAX_ISSUES_PER_FILE) {
            md.push_str(&render_issue(issue));
        }
        let hidden = issues.len().saturating_sub(MAX_ISSUES_PER_FILE);
        if hidden > 0 {
            md.push_str(&format!("*...and {} more issues*\n\n", hidden));
        }
    }
    md
}

fn render_issue(issue: &Issue) -> String {
    let mut md = format!(
        "- {} **{}** line {}: {} (`{}`)\n",
        severity_emoji(issue.severity),
        severity_label(issue.severity),
        issue.line,
        issue.message,
        issue.rule
    );
    if !issue.code.is_empty() {
        md.push_str(&format!("  ```python\n  {}\n  ```\n", issue.code));
    }
    if !issue.suggestion.is_empty() {
        md.push_str(&format!("  > **Fix:** {}\n", issue.suggestion));
    }
    if let Some(explanation) = issue.ai_explanation() {
        md.push_str(&format!("  > **AI explanation:** {}\n", explanation));
    }
    if let Some(fix) = issue.ai_fix() {
        md.push_str(&format!("  > **AI fix:** {}\n", fix));
    }
    md.push('\n');
    md
}

fn render_footer() -> String {
    "---\n\n*Generated by pyreview*\n".to_string()
}

fn severity_emoji(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "🔴",
        Severity::High => "🟠",
        Severity::Medium => "🟡",
        Severity::Low => "🔵",
        Severity::Info => "ℹ️",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Metrics;
    use crate::reporters::tests::test_result;

    #[test]
    fn test_markdown_render_has_header() {
        let result = test_result();
        let md = render(&result).unwrap();
        assert!(md.starts_with("# Code Review Report"));
        assert!(md.contains(&format!("Grade: {}", result.grade())));
        assert!(md.contains("| Critical | 1 |"));
        assert!(md.contains("Skipped: 1"));
    }

    #[test]
    fn test_markdown_render_has_issues() {
        let md = render(&test_result()).unwrap();
        assert!(md.contains("### `app/db.py` (2)"));
        assert!(md.contains("**Critical** line 12"));
        assert!(md.contains("`security/sql-injection-fstring`"));
        assert!(md.contains("| `magic_number` | 1 |"));
    }

    #[test]
    fn test_markdown_empty_result() {
        let result = ReviewResult::new(Vec::new(), Metrics::default(), 0.0);
        let md = render(&result).unwrap();
        assert!(md.contains("No issues found"));
        assert!(!md.contains("## Issue Types"));
    }
}
