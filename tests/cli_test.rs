//! CLI contract tests
//!
//! Runs the built binary against copies of the fixture tree and checks
//! output formats, exit codes and the init / rules commands.

use std::path::Path;
use std::process::{Command, Output};

fn pyreview_bin() -> &'static str {
    env!("CARGO_BIN_EXE_pyreview")
}

fn fixture(name: &str) -> String {
    std::fs::read_to_string(
        Path::new(env!("CARGO_MANIFEST_DIR"))
            .join("tests/fixtures")
            .join(name),
    )
    .unwrap()
}

/// Temp tree with the given fixtures copied to its root.
fn setup(files: &[&str]) -> tempfile::TempDir {
    let dir = tempfile::tempdir().unwrap();
    for name in files {
        let target = dir.path().join(Path::new(name).file_name().unwrap());
        std::fs::write(target, fixture(name)).unwrap();
    }
    dir
}

fn run(dir: &Path, args: &[&str]) -> Output {
    Command::new(pyreview_bin())
        .args(args)
        .current_dir(dir)
        .env_remove("RUST_LOG")
        .env_remove("ANTHROPIC_API_KEY")
        .env_remove("OPENAI_API_KEY")
        .env_remove("GROQ_API_KEY")
        .output()
        .unwrap()
}

fn json(output: &Output) -> serde_json::Value {
    let stdout = String::from_utf8_lossy(&output.stdout);
    serde_json::from_str(&stdout)
        .unwrap_or_else(|e| panic!("invalid JSON ({}): {}", e, stdout))
}

#[test]
fn test_review_json() {
    let dir = setup(&["vulnerable.py", "pkg/clean.py"]);
    let output = run(dir.path(), &["review", ".", "--format", "json"]);
    assert!(output.status.success());

    let value = json(&output);
    assert_eq!(value["files"].as_array().unwrap().len(), 2);
    assert!(value["summary"]["total_issues"].as_u64().unwrap() > 0);
    assert!(value["summary"]["score"].as_u64().unwrap() < 100);
    assert!(value["issues_by_type"]["eval_usage"].as_u64().unwrap() >= 1);
}

#[test]
fn test_review_min_severity() {
    let dir = setup(&["vulnerable.py"]);
    let output = run(
        dir.path(),
        &["review", ".", "-f", "json", "--min-severity", "critical"],
    );
    let value = json(&output);
    for file in value["files"].as_array().unwrap() {
        for issue in file["issues"].as_array().unwrap() {
            assert_eq!(issue["severity"], "critical");
        }
    }
}

#[test]
fn test_review_output_file() {
    let dir = setup(&["vulnerable.py"]);
    let output = run(
        dir.path(),
        &["review", ".", "-f", "html", "-o", "report.html"],
    );
    assert!(output.status.success());
    assert!(output.stdout.is_empty());
    let html = std::fs::read_to_string(dir.path().join("report.html")).unwrap();
    assert!(html.starts_with("<!DOCTYPE html>"));
}

#[test]
fn test_review_uses_config_file() {
    let dir = setup(&["vulnerable.py", "nested.py"]);
    std::fs::write(
        dir.path().join("pyreview.toml"),
        "analyzers = [\"complexity\"]\n",
    )
    .unwrap();
    let value = json(&run(dir.path(), &["review", ".", "-f", "json"]));
    assert!(value["issues_by_type"].get("eval_usage").is_none());
    assert!(value["issues_by_type"].get("deep_nesting").is_some());
}

#[test]
fn test_invalid_config_fails() {
    let dir = setup(&["vulnerable.py"]);
    std::fs::write(dir.path().join("pyreview.toml"), "max_complexity = -1\n").unwrap();
    let output = run(dir.path(), &["review", "."]);
    assert!(!output.status.success());
}

#[test]
fn test_missing_path_fails() {
    let dir = setup(&[]);
    let output = run(dir.path(), &["review", "does-not-exist"]);
    assert!(!output.status.success());
}

#[test]
fn test_check_exit_codes() {
    let bad = setup(&["vulnerable.py"]);
    let output = run(bad.path(), &["check", ".", "--fail-on", "high"]);
    assert_eq!(output.status.code(), Some(1));

    let good = setup(&["pkg/clean.py"]);
    let output = run(good.path(), &["check", ".", "--fail-on", "high"]);
    assert_eq!(output.status.code(), Some(0));
}

#[test]
fn test_ai_without_key_still_reports() {
    let dir = setup(&["vulnerable.py"]);
    let output = run(dir.path(), &["review", ".", "-f", "json", "--ai"]);
    assert!(output.status.success());
    let value = json(&output);
    assert!(value["summary"]["total_issues"].as_u64().unwrap() > 0);
    assert!(String::from_utf8_lossy(&output.stderr).contains("ANTHROPIC_API_KEY"));
}

#[test]
fn test_ai_groq_provider_without_key() {
    let dir = setup(&["vulnerable.py"]);
    let output = run(
        dir.path(),
        &["review", ".", "-f", "json", "--ai", "--ai-provider", "groq"],
    );
    assert!(output.status.success());
    assert!(String::from_utf8_lossy(&output.stderr).contains("GROQ_API_KEY"));
}

#[test]
fn test_init() {
    let dir = setup(&[]);
    let output = run(dir.path(), &["init", ".", "--preset", "strict"]);
    assert!(output.status.success());
    let text = std::fs::read_to_string(dir.path().join("pyreview.toml")).unwrap();
    assert!(text.contains("max_complexity = 7"));

    let again = run(dir.path(), &["init", "."]);
    assert!(!again.status.success());
    let forced = run(dir.path(), &["init", ".", "--force"]);
    assert!(forced.status.success());
}

#[test]
fn test_rules_listing() {
    let dir = setup(&[]);
    let output = run(dir.path(), &["rules", "--category", "security"]);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("security/eval-usage"));
    assert!(!stdout.contains("smells/"));
}
