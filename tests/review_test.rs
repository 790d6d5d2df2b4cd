//! Library-level review tests
//!
//! Runs the reviewer over the fixture tree and over in-memory sources and
//! checks the result contract: scenarios, severity filtering, parallel vs
//! sequential equivalence and JSON round-trips.

use pyreview::config::ReviewConfig;
use pyreview::models::{FileResult, Grade, Issue, Metrics, ReviewResult, Severity};
use pyreview::reporters;
use pyreview::reviewer::{ReviewError, Reviewer};
use std::path::{Path, PathBuf};

fn fixtures() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

fn reviewer() -> Reviewer {
    Reviewer::new(ReviewConfig::default()).unwrap()
}

fn types(result: &FileResult) -> Vec<&str> {
    result.issues.iter().map(|i| i.issue_type.as_str()).collect()
}

fn file<'a>(result: &'a ReviewResult, name: &str) -> &'a FileResult {
    result
        .files
        .iter()
        .find(|f| f.file.ends_with(name))
        .unwrap_or_else(|| panic!("{} not in result", name))
}

#[test]
fn test_eval_scenario() {
    let result = reviewer().review_source("eval(user_input)\n", "snippet.py");
    assert_eq!(result.issues.len(), 1, "{:?}", types(&result));
    let eval = &result.issues[0];
    assert_eq!(eval.issue_type, "eval_usage");
    assert_eq!(eval.line, 1);
    assert!(eval.severity.is_at_least(Severity::High));
}

#[test]
fn test_sql_fstring_scenario() {
    let result = reviewer().review_source(
        "x = 1\nquery = f\"SELECT * FROM t WHERE id={x}\"\n",
        "q.py",
    );
    let sql = result
        .issues
        .iter()
        .find(|i| i.issue_type == "sql_injection")
        .expect("sql_injection reported");
    assert_eq!(sql.line, 2);
}

#[test]
fn test_mutable_default_scenario() {
    let bad = reviewer().review_source("def f(a, b=[]): pass\n", "m.py");
    assert!(types(&bad).contains(&"mutable_default"));

    let good = reviewer().review_source("def f(a, b=None): pass\n", "m.py");
    assert!(!types(&good).contains(&"mutable_default"));
}

#[test]
fn test_empty_file_scenario() {
    let result = reviewer().review_source("", "empty.py");
    assert!(result.issues.is_empty());
    assert_eq!(result.metrics.lines_of_code, 0);
    assert!(!result.skipped);
    assert!(result.error.is_none());
    assert_eq!(result.score(), 100);
}

#[test]
fn test_fixture_tree() {
    let result = reviewer().review_path(&fixtures(), true).unwrap();
    assert_eq!(result.files.len(), 6);

    let names: Vec<&str> = result.files.iter().map(|f| f.file.as_str()).collect();
    let mut sorted = names.clone();
    sorted.sort();
    assert_eq!(names, sorted);

    let vulnerable = file(&result, "vulnerable.py");
    for expected in ["sql_injection", "eval_usage", "command_injection"] {
        assert!(
            types(vulnerable).contains(&expected),
            "missing {} in {:?}",
            expected,
            types(vulnerable)
        );
    }
    assert!(vulnerable.score() < 100);

    assert!(types(file(&result, "nested.py")).contains(&"deep_nesting"));
    assert!(types(file(&result, "defaults.py")).contains(&"mutable_default"));

    let broken = file(&result, "broken.py");
    assert!(broken.error.is_some());
    assert!(!broken.skipped);
    assert!(broken.issues.is_empty());

    let clean = file(&result, "clean.py");
    assert!(clean
        .issues
        .iter()
        .all(|i| !i.severity.is_at_least(Severity::Medium)));

    let summary = result.summary();
    assert_eq!(summary.files_reviewed, 6);
    assert_eq!(summary.files_with_errors, 1);
    assert_eq!(summary.total_issues, result.total_issues());
}

#[test]
fn test_non_recursive_skips_subdirectories() {
    let result = reviewer().review_path(&fixtures(), false).unwrap();
    assert_eq!(result.files.len(), 4);
    assert!(result.files.iter().all(|f| !f.file.contains("pkg")));
}

#[test]
fn test_ignore_paths() {
    let mut config = ReviewConfig::default();
    config.ignore_paths.push("pkg".to_string());
    config.ignore_files.push("broken.py".to_string());
    let result = Reviewer::new(config)
        .unwrap()
        .review_path(&fixtures(), true)
        .unwrap();
    assert_eq!(result.files.len(), 3);
    assert!(result.files.iter().all(|f| f.error.is_none()));
}

#[test]
fn test_missing_path_is_an_error() {
    let err = reviewer()
        .review_path(&fixtures().join("nope"), true)
        .unwrap_err();
    assert!(matches!(err, ReviewError::PathNotFound(_)));
}

#[test]
fn test_unknown_analyzer_fails_fast() {
    let mut config = ReviewConfig::default();
    config.analyzers.push("spelling".to_string());
    assert!(Reviewer::new(config).is_err());
}

#[test]
fn test_parallel_matches_sequential() {
    let mut sequential = ReviewConfig::default();
    sequential.parallel = false;
    let mut parallel = ReviewConfig::default();
    parallel.parallel = true;
    parallel.workers = 4;

    let a = Reviewer::new(sequential)
        .unwrap()
        .review_path(&fixtures(), true)
        .unwrap();
    let b = Reviewer::new(parallel)
        .unwrap()
        .review_path(&fixtures(), true)
        .unwrap();

    assert_eq!(a.files, b.files);
    assert_eq!(a.metrics, b.metrics);
    assert_eq!(a.score(), b.score());
    assert_eq!(a.issues_by_severity(), b.issues_by_severity());
}

#[test]
fn test_severity_filter() {
    let result = reviewer().review_path(&fixtures(), true).unwrap();
    for min in Severity::ALL {
        let filtered = result.filter_by_severity(min);
        let expected = result.issues().filter(|i| i.severity >= min).count();
        assert_eq!(filtered.total_issues(), expected);
        assert!(filtered.issues().all(|i| i.severity.is_at_least(min)));
        assert_eq!(filtered.filter_by_severity(min), filtered);
    }
}

#[test]
fn test_min_severity_config_filters_before_scoring() {
    let mut config = ReviewConfig::default();
    config.min_severity = Severity::Critical;
    let result = Reviewer::new(config)
        .unwrap()
        .review_path(&fixtures(), true)
        .unwrap();
    assert!(result.issues().all(|i| i.severity == Severity::Critical));
}

#[test]
fn test_json_round_trip() {
    let mut result = reviewer().review_path(&fixtures(), true).unwrap();
    for issue in result.files.iter_mut().flat_map(|f| f.issues.iter_mut()) {
        issue.set_ai_explanation("explained");
    }

    let json = reporters::report(&result, "json").unwrap();
    let parsed = reporters::json::parse(&json).unwrap();
    assert_eq!(parsed.files, result.files);
    assert_eq!(parsed.metrics, result.metrics);
    assert_eq!(parsed.score(), result.score());
    assert_eq!(parsed.total_issues(), result.total_issues());
}

#[test]
fn test_project_score_is_mean_of_file_scores() {
    // One critical issue in one file of two: the mean is (85 + 100) / 2,
    // pooling the issues would give 85.
    let bad = FileResult::analyzed(
        "a.py",
        vec![Issue::new("sql_injection", Severity::Critical, "a.py", 1, 1)],
        Metrics::default(),
    );
    let good = FileResult::analyzed("b.py", Vec::new(), Metrics::default());
    let failed = FileResult::failed("c.py", "syntax error");
    let result = ReviewResult::new(vec![bad, good, failed], Metrics::default(), 0.0);

    assert_eq!(result.files[0].score(), 85);
    assert_eq!(result.score(), 93);
    assert_eq!(result.grade(), Grade::A);
}

#[test]
fn test_more_criticals_never_raise_the_score() {
    let mut issues = Vec::new();
    let mut last = 100;
    for n in 0..10 {
        issues.push(Issue::new("x", Severity::Critical, "a.py", n + 1, 1));
        let score = FileResult::analyzed("a.py", issues.clone(), Metrics::default()).score();
        assert!(score <= last);
        last = score;
    }
    assert_eq!(last, 0);
}
