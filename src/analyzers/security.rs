//! Security analyzer
//!
//! Syntactic, statement-local detection of:
//! - SQL built by f-string, concatenation, `.format()` or `%`
//! - shell command execution with dynamic input
//! - `eval`/`exec`/`compile` and unsafe deserialization
//! - weak hashes, hardcoded credentials, dynamic file paths
//! - `random` used for security-sensitive values
//!
//! There is no taint tracking. Every finding is local to one call,
//! assignment or literal.

use super::{evaluate_rules, Analyzer, MatchContext};
use crate::config::ReviewConfig;
use crate::models::Issue;
use crate::parsers::ParsedSource;
use crate::rules;
use anyhow::Result;

pub struct SecurityAnalyzer;

impl SecurityAnalyzer {
    pub fn new() -> Self {
        Self
    }
}

impl Default for SecurityAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

impl Analyzer for SecurityAnalyzer {
    fn name(&self) -> &str {
        "security"
    }

    fn description(&self) -> &str {
        "Detects injection, dynamic code execution, weak crypto and hardcoded secrets"
    }

    fn analyze(&self, parsed: &ParsedSource, config: &ReviewConfig) -> Result<Vec<Issue>> {
        let cx = MatchContext::new(parsed, config);
        let mut issues = evaluate_rules(rules::security(), &cx);
        // One issue per rule, ordered by where each match starts.
        issues.sort_by_key(|i| (i.line, i.column));
        Ok(issues)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use crate::parsers::parse;

    fn analyze(src: &str) -> Vec<Issue> {
        let parsed = parse(src, "app.py").expect("valid python");
        SecurityAnalyzer::new()
            .analyze(&parsed, &ReviewConfig::default())
            .expect("analysis succeeds")
    }

    fn types(issues: &[Issue]) -> Vec<&str> {
        issues.iter().map(|i| i.issue_type.as_str()).collect()
    }

    #[test]
    fn test_eval() {
        let issues = analyze("eval(user_input)\n");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue_type, "eval_usage");
        assert_eq!(issues[0].severity, Severity::High);
        assert_eq!(issues[0].line, 1);
        assert_eq!(issues[0].rule, "security/eval-usage");
        assert_eq!(issues[0].message, "Use of eval() can execute arbitrary code");
    }

    #[test]
    fn test_method_named_eval_is_not_builtin() {
        assert!(analyze("model.eval()\n").is_empty());
    }

    #[test]
    fn test_sql_fstring() {
        let issues = analyze("x = 1\nquery = f\"SELECT * FROM t WHERE id={x}\"\n");
        assert_eq!(types(&issues), vec!["sql_injection"]);
        assert_eq!(issues[0].line, 2);
        assert_eq!(issues[0].severity, Severity::Critical);
        assert_eq!(issues[0].metadata["pattern"], "fstring");
    }

    #[test]
    fn test_sql_variants() {
        let src = "\
a = \"SELECT * FROM users WHERE name = '\" + name + \"'\"
b = \"DELETE FROM users WHERE id = %s\" % uid
c = \"UPDATE users SET name = '{}'\".format(name)
d = \"SELECT 1\"
e = f\"Hello {name}\"
";
        let issues = analyze(src);
        let patterns: Vec<&str> = issues
            .iter()
            .map(|i| i.metadata["pattern"].as_str().unwrap_or(""))
            .collect();
        assert_eq!(patterns, vec!["concat", "percent", "format"]);
    }

    #[test]
    fn test_command_injection() {
        let src = "\
import os, subprocess
subprocess.run(cmd, shell=True)
os.system(cmd)
subprocess.run([\"ls\", \"-l\"])
os.system(\"ls\")
";
        let issues = analyze(src);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].severity, Severity::Critical);
        assert_eq!(issues[0].rule, "security/command-injection-shell");
        assert_eq!(issues[1].severity, Severity::High);
        assert_eq!(issues[1].rule, "security/command-injection");
    }

    #[test]
    fn test_deserialization_and_yaml() {
        let src = "\
data = pickle.loads(blob)
cfg = yaml.load(f)
ok = yaml.load(f, Loader=yaml.SafeLoader)
";
        assert_eq!(types(&analyze(src)), vec!["pickle_usage", "yaml_load"]);
    }

    #[test]
    fn test_weak_hash() {
        let src = "\
h = hashlib.md5(data)
g = hashlib.new('sha1')
k = hashlib.sha256(data)
n = hashlib.md5(data, usedforsecurity=False)
";
        let issues = analyze(src);
        assert_eq!(issues.len(), 2);
        assert_eq!(issues[0].message, "Use of weak hash algorithm: MD5");
        assert_eq!(issues[1].metadata["algorithm"], "sha1");
    }

    #[test]
    fn test_hardcoded_secret_is_masked() {
        let issues = analyze("DB_PASSWORD = \"hunter2hunter2\"\n");
        assert_eq!(issues.len(), 1);
        assert_eq!(issues[0].issue_type, "hardcoded_secret");
        assert!(!issues[0].code.contains("hunter2hunter2"));
        assert_eq!(issues[0].metadata["secret_type"], "password");
    }

    #[test]
    fn test_secret_placeholders_skipped() {
        let src = "\
api_key = \"your_api_key_here\"
password = \"changeme\"
token = \"\"
secret = os.environ[\"SECRET\"]
";
        assert!(analyze(src).is_empty());
    }

    #[test]
    fn test_secret_keyword_argument() {
        let issues = analyze("connect(host='db', password='s3cr3tpass')\n");
        assert_eq!(types(&issues), vec!["hardcoded_secret"]);
    }

    #[test]
    fn test_path_traversal() {
        let src = "\
f = open(\"/data/\" + name)
g = open(f\"/data/{name}\")
h = open(\"/data/file.txt\")
";
        let issues = analyze(src);
        assert_eq!(types(&issues), vec!["path_traversal", "path_traversal"]);
    }

    #[test]
    fn test_insecure_random() {
        let src = "\
session_token = random.randint(0, 999999)
dice = random.randint(1, 6)
def make_salt():
    return random.random()
";
        let issues = analyze(src);
        assert_eq!(issues.len(), 2);
        assert!(issues[0].message.contains("session_token"));
        assert!(issues[1].message.contains("make_salt"));
    }

    #[test]
    fn test_multiple_rules_on_one_line_are_ordered() {
        let issues = analyze("run(eval(x), pickle.loads(y))\n");
        assert_eq!(types(&issues), vec!["eval_usage", "pickle_usage"]);
        assert!(issues[0].column < issues[1].column);
    }
}
