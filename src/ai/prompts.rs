//! Prompt templates for issue explanations and fixes

use crate::models::Issue;

pub const SYSTEM_PROMPT: &str =
    "You are a senior Python code reviewer. Be concise, concrete and developer-friendly.";

/// Lines shown on each side of the issue line
const CONTEXT_RADIUS: usize = 3;

fn snippet<'a>(issue: &'a Issue, context: Option<&'a str>) -> &'a str {
    match context {
        Some(ctx) if !ctx.trim().is_empty() => ctx,
        _ => issue.code.as_str(),
    }
}

fn or_na(s: &str) -> &str {
    if s.is_empty() {
        "N/A"
    } else {
        s
    }
}

pub fn explain_prompt(issue: &Issue, context: Option<&str>) -> String {
    format!(
        r#"Explain the following issue found in Python code.

Issue Type: {issue_type}
Severity: {severity}
Message: {message}
Rule: {rule}

Code Context:
```python
{code}
```

File: {file}:{line}

Please provide:
1. A clear explanation of why this is a problem (2-3 sentences)
2. The potential impact or risk

Keep your response short."#,
        issue_type = issue.issue_type,
        severity = issue.severity,
        message = issue.message,
        rule = or_na(&issue.rule),
        code = snippet(issue, context),
        file = issue.file,
        line = issue.line,
    )
}

pub fn fix_prompt(issue: &Issue, context: Option<&str>) -> String {
    format!(
        r#"Suggest a fix for the following issue.

Issue Type: {issue_type}
Severity: {severity}
Message: {message}
Rule: {rule}

Original Code:
```python
{code}
```

Current Suggestion: {suggestion}

Format your response as:
FIXED CODE:
```python
<your corrected code here>
```

EXPLANATION:
<one or two sentences>"#,
        issue_type = issue.issue_type,
        severity = issue.severity,
        message = issue.message,
        rule = or_na(&issue.rule),
        code = snippet(issue, context),
        suggestion = if issue.suggestion.is_empty() {
            "No suggestion provided"
        } else {
            issue.suggestion.as_str()
        },
    )
}

/// Pull the fenced code out of a `FIXED CODE:` response.
///
/// Falls back to the whole trimmed response when the model ignored the
/// requested format.
pub fn parse_fix(response: &str) -> String {
    let Some((_, after)) = response.split_once("FIXED CODE:") else {
        return response.trim().to_string();
    };
    let Some(open) = after.find("```") else {
        return response.trim().to_string();
    };
    let body = &after[open + 3..];
    let body = body.strip_prefix("python").unwrap_or(body);
    match body.find("```") {
        Some(close) => body[..close].trim_matches('\n').to_string(),
        None => response.trim().to_string(),
    }
}

/// Source lines around `line` (1-based), each prefixed with its number.
pub fn code_context(source: &str, line: usize) -> String {
    let first = line.saturating_sub(CONTEXT_RADIUS).max(1);
    let last = line + CONTEXT_RADIUS;
    source
        .lines()
        .enumerate()
        .map(|(i, text)| (i + 1, text))
        .filter(|(n, _)| (first..=last).contains(n))
        .map(|(n, text)| format!("{:>4} | {}", n, text))
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;

    fn issue() -> Issue {
        Issue::new("eval_usage", Severity::High, "app.py", 7, 5)
            .with_message("Use of eval()")
            .with_code("eval(data)")
            .with_rule("security/eval-usage")
    }

    #[test]
    fn test_explain_prompt() {
        let prompt = explain_prompt(&issue(), None);
        assert!(prompt.contains("Issue Type: eval_usage"));
        assert!(prompt.contains("Severity: high"));
        assert!(prompt.contains("eval(data)"));
        assert!(prompt.contains("File: app.py:7"));
    }

    #[test]
    fn test_fix_prompt_prefers_context() {
        let prompt = fix_prompt(&issue(), Some("x = input()\neval(x)"));
        assert!(prompt.contains("x = input()"));
        assert!(prompt.contains("No suggestion provided"));
    }

    #[test]
    fn test_parse_fix() {
        let response = "FIXED CODE:\n```python\nimport ast\nast.literal_eval(data)\n```\n\nEXPLANATION:\nSafer.";
        assert_eq!(parse_fix(response), "import ast\nast.literal_eval(data)");
        assert_eq!(parse_fix("  just use ast.literal_eval  "), "just use ast.literal_eval");
    }

    #[test]
    fn test_code_context() {
        let src = "a\nb\nc\nd\ne\nf\ng\nh\n";
        let ctx = code_context(src, 2);
        assert_eq!(ctx.lines().count(), 5);
        assert!(ctx.starts_with("   1 | a"));
        assert!(ctx.ends_with("   5 | e"));
    }
}
