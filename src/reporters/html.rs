//! HTML reporter with embedded styles
//!
//! Generates a standalone HTML report that can be viewed in any browser:
//! grade badge, summary counts, project metrics and one section per file.
//! Every piece of user content is escaped.

use super::severity_label;
use crate::models::{FileResult, Issue, ReviewResult, Severity};
use anyhow::Result;

/// Render result as standalone HTML
pub fn render(result: &ReviewResult) -> Result<String> {
    let mut html = String::new();

    html.push_str(&render_head(result));
    html.push_str("<body>\n<div class=\"container\">\n");
    html.push_str(&render_header(result));
    html.push_str("<div class=\"content\">\n");
    html.push_str(&render_grade_section(result));
    html.push_str(&render_summary(result));
    html.push_str(&render_metrics(result));
    html.push_str(&render_files(result));
    html.push_str("</div>\n"); // content
    html.push_str(&render_footer());
    html.push_str("</div>\n</body>\n</html>");

    Ok(html)
}

fn render_head(result: &ReviewResult) -> String {
    format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>pyreview Report - Grade {}</title>
    <style>
{CSS}
    </style>
</head>
"#,
        result.grade()
    )
}

fn render_header(result: &ReviewResult) -> String {
    let timestamp = result.timestamp.format("%Y-%m-%d %H:%M:%S UTC");
    format!(
        r#"<div class="header">
    <h1>Code Review Report</h1>
    <p class="timestamp">Generated {} in {:.2}s</p>
</div>
"#,
        timestamp, result.duration_seconds
    )
}

fn render_grade_section(result: &ReviewResult) -> String {
    let grade = result.grade();
    format!(
        r#"<div class="grade-section">
    <div class="grade-badge grade-{}">{}</div>
    <div class="score">Score: {}/100</div>
</div>
"#,
        grade,
        grade,
        result.score()
    )
}

fn render_summary(result: &ReviewResult) -> String {
    let summary = result.summary();
    let counts = [
        (Severity::Critical, summary.critical),
        (Severity::High, summary.high),
        (Severity::Medium, summary.medium),
        (Severity::Low, summary.low),
        (Severity::Info, summary.info),
    ];
    let items: Vec<String> = counts
        .iter()
        .map(|(sev, n)| {
            format!(
                r#"        <div class="severity-item {}">
            <span class="severity-label">{}</span>
            <span class="severity-count">{}</span>
        </div>"#,
                severity_class(*sev),
                severity_label(*sev),
                n
            )
        })
        .collect();

    format!(
        r#"<div class="section">
    <h2 class="section-title">Summary ({} issues)</h2>
    <div class="severity-summary">
{}
    </div>
    <p class="files-line">Files reviewed: {} | Skipped: {} | With errors: {}</p>
</div>
"#,
        summary.total_issues,
        items.join("\n"),
        summary.files_reviewed,
        summary.files_skipped,
        summary.files_with_errors
    )
}

fn render_metrics(result: &ReviewResult) -> String {
    let m = &result.metrics;
    let stats = [
        ("Lines of code", m.lines_of_code.to_string()),
        ("Functions", m.functions.to_string()),
        ("Classes", m.classes.to_string()),
        ("Avg complexity", format!("{:.2}", m.avg_complexity)),
        ("Max complexity", m.max_complexity.to_string()),
        ("Maintainability", format!("{:.1}", m.maintainability_index)),
        ("Comments", format!("{:.1}%", m.comment_ratio * 100.0)),
        ("Duplication", format!("{:.1}%", m.duplication_ratio * 100.0)),
    ];
    let cards: Vec<String> = stats
        .iter()
        .map(|(label, value)| {
            format!(
                r#"        <div class="stat-item"><div class="stat-value">{}</div><div class="stat-label">{}</div></div>"#,
                value, label
            )
        })
        .collect();

    format!(
        r#"<div class="section">
    <h2 class="section-title">Metrics</h2>
    <div class="stats-grid">
{}
    </div>
</div>
"#,
        cards.join("\n")
    )
}

fn render_files(result: &ReviewResult) -> String {
    let interesting: Vec<&FileResult> = result
        .files
        .iter()
        .filter(|f| !f.issues.is_empty() || f.error.is_some() || !f.analyzer_faults.is_empty())
        .collect();

    if interesting.is_empty() {
        return r#"<div class="section">
    <h2 class="section-title">No Issues Found</h2>
    <p>Nothing to report.</p>
</div>
"#
        .to_string();
    }

    let mut html = String::from(
        r#"<div class="section">
    <h2 class="section-title">Files</h2>
"#,
    );
    for file in interesting {
        html.push_str(&render_file(file));
    }
    html.push_str("</div>\n");
    html
}

fn render_file(file: &FileResult) -> String {
    let mut html = format!(
        r#"    <div class="file-card">
        <div class="file-header"><span class="file-name">{}</span><span class="file-score">{} ({})</span></div>
"#,
        html_escape(&file.file),
        file.score(),
        file.grade()
    );
    if let Some(err) = &file.error {
        html.push_str(&format!(
            "        <div class=\"file-error\">{}</div>\n",
            html_escape(err)
        ));
    }
    for fault in &file.analyzer_faults {
        html.push_str(&format!(
            "        <div class=\"file-error\">Analyzer fault: {}</div>\n",
            html_escape(fault)
        ));
    }
    for issue in &file.issues {
        html.push_str(&render_issue(issue));
    }
    html.push_str("    </div>\n");
    html
}

fn render_issue(issue: &Issue) -> String {
    let code_html = if issue.code.is_empty() {
        String::new()
    } else {
        format!("<pre class=\"code\">{}</pre>", html_escape(&issue.code))
    };
    let fix_html = if issue.suggestion.is_empty() {
        String::new()
    } else {
        format!(
            "<div class=\"suggested-fix\">{}</div>",
            html_escape(&issue.suggestion)
        )
    };
    let ai_html: String = [
        ("AI explanation", issue.ai_explanation()),
        ("AI fix", issue.ai_fix()),
    ]
    .iter()
    .filter_map(|(label, text)| {
        text.map(|t| format!("<div class=\"ai-note\"><b>{}:</b> {}</div>", label, html_escape(t)))
    })
    .collect();

    format!(
        r#"        <div class="issue">
            <span class="severity-badge {}">{}</span>
            <span class="issue-location">line {}:{}</span>
            <span class="issue-message">{}</span>
            <span class="rule-badge">{}</span>
            {}{}{}
        </div>
"#,
        severity_class(issue.severity),
        severity_label(issue.severity),
        issue.line,
        issue.column,
        html_escape(&issue.message),
        html_escape(&issue.rule),
        code_html,
        fix_html,
        ai_html
    )
}

fn render_footer() -> String {
    r#"<div class="footer">
    <p>Generated by pyreview</p>
</div>
"#
    .to_string()
}

fn severity_class(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "severity-critical",
        Severity::High => "severity-high",
        Severity::Medium => "severity-medium",
        Severity::Low => "severity-low",
        Severity::Info => "severity-info",
    }
}

fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
        .replace('\'', "&#39;")
}

// Embedded CSS
const CSS: &str = r#"
:root {
    --primary-color: #3776ab;
    --background-color: #f8fafc;
    --text-color: #1e293b;
    --border-color: #e2e8f0;
}

* { margin: 0; padding: 0; box-sizing: border-box; }

body {
    font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif;
    line-height: 1.6;
    color: var(--text-color);
    background: var(--background-color);
    padding: 2rem;
}

.container {
    max-width: 1200px;
    margin: 0 auto;
    background: white;
    border-radius: 12px;
    box-shadow: 0 4px 6px -1px rgba(0,0,0,0.1);
    overflow: hidden;
}

.header {
    background: linear-gradient(135deg, #3776ab 0%, #ffd43b 100%);
    color: white;
    padding: 2.5rem 2rem;
    text-align: center;
}

.header h1 { font-size: 2.25rem; margin-bottom: 0.5rem; }
.header .timestamp { opacity: 0.9; font-size: 0.95rem; }

.content { padding: 2rem; }

.grade-section {
    text-align: center;
    padding: 2rem;
    background: #f1f5f9;
    border-radius: 8px;
    margin-bottom: 2rem;
}

.grade-badge {
    display: inline-block;
    font-size: 4rem;
    font-weight: bold;
    width: 120px;
    height: 120px;
    line-height: 120px;
    border-radius: 50%;
    margin-bottom: 1rem;
    color: white;
}

.grade-A { background: #10b981; }
.grade-B { background: #22c55e; }
.grade-C { background: #eab308; }
.grade-D { background: #f97316; }
.grade-F { background: #ef4444; }

.score { font-size: 1.5rem; color: #64748b; }

.section { margin-bottom: 2rem; }
.section-title {
    font-size: 1.5rem;
    margin-bottom: 1rem;
    padding-bottom: 0.5rem;
    border-bottom: 2px solid var(--border-color);
}

.stats-grid {
    display: grid;
    grid-template-columns: repeat(auto-fit, minmax(160px, 1fr));
    gap: 1rem;
}

.stat-item {
    border: 1px solid var(--border-color);
    border-radius: 8px;
    padding: 1rem;
    text-align: center;
}

.stat-value { font-size: 1.75rem; font-weight: bold; }
.stat-label { font-size: 0.875rem; color: #64748b; }

.severity-summary { display: flex; flex-wrap: wrap; gap: 1rem; justify-content: center; }

.severity-item {
    display: flex;
    gap: 0.5rem;
    padding: 0.75rem 1.5rem;
    border-radius: 8px;
    color: white;
}

.severity-count { font-weight: bold; }
.files-line { margin-top: 1rem; text-align: center; color: #64748b; }

.file-card {
    border: 1px solid var(--border-color);
    border-radius: 8px;
    margin-bottom: 1rem;
    overflow: hidden;
}

.file-header {
    display: flex;
    justify-content: space-between;
    padding: 0.75rem 1rem;
    background: #f8fafc;
    font-family: monospace;
    font-weight: 600;
}

.file-error { padding: 0.5rem 1rem; color: #b91c1c; }

.issue { padding: 0.75rem 1rem; border-top: 1px solid var(--border-color); }

.severity-badge {
    padding: 0.125rem 0.5rem;
    border-radius: 6px;
    font-size: 0.8rem;
    font-weight: 600;
    color: white;
}

.severity-critical { background: #dc2626; }
.severity-high { background: #ea580c; }
.severity-medium { background: #ca8a04; }
.severity-low { background: #2563eb; }
.severity-info { background: #64748b; }

.issue-location { font-family: monospace; color: #64748b; margin: 0 0.5rem; }

.rule-badge {
    float: right;
    background: #e0e7ff;
    color: #3730a3;
    padding: 0.125rem 0.5rem;
    border-radius: 6px;
    font-size: 0.8rem;
}

.code {
    margin-top: 0.5rem;
    padding: 0.5rem;
    background: #0f172a;
    color: #e2e8f0;
    border-radius: 4px;
    overflow-x: auto;
}

.suggested-fix, .ai-note {
    margin-top: 0.5rem;
    padding: 0.5rem 0.75rem;
    background: #ecfdf5;
    border-left: 4px solid #10b981;
    border-radius: 4px;
    color: #065f46;
}

.ai-note { background: #eff6ff; border-left-color: #3b82f6; color: #1e3a8a; }

.footer {
    text-align: center;
    padding: 2rem;
    color: #64748b;
    border-top: 1px solid var(--border-color);
}

@media print {
    body { padding: 0; background: white; }
    .container { box-shadow: none; }
    .file-card { page-break-inside: avoid; }
}
"#;
