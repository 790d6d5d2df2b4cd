//! Review orchestration
//!
//! The [`Reviewer`] drives the per-file pipeline:
//!
//! ```text
//! path ──► discover ──► read ──► parse ──► analyzers ──► severity filter ──► FileResult
//!                                   │                                           │
//!                                   └──────────► metrics + fingerprints ────────┘
//! ```
//!
//! Files share nothing but the read-only configuration, so a directory is
//! reviewed as a fan-out on a rayon pool (or a plain loop when parallelism is
//! off). Results are merged with a stable sort on path, which makes the output
//! independent of scheduling.
//!
//! Failures local to one file never escape it: unreadable and binary files
//! are skipped, parse errors and analyzer faults are recorded on the
//! [`FileResult`]. Only configuration errors and a missing top-level path
//! propagate to the caller.

mod files;

use crate::analyzers::{enabled_analyzers, run_analyzer, Analyzer};
use crate::config::{ConfigError, IgnoreMatcher, ReviewConfig};
use crate::metrics;
use crate::models::{FileResult, Metrics, ReviewResult};
use crate::parsers::parse;
use files::SourceText;
use rayon::prelude::*;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;
use tracing::{debug, info, warn};

/// Progress callback: (file, done, total)
pub type ProgressCallback = Box<dyn Fn(&str, usize, usize) + Send + Sync>;

#[derive(Debug, Error)]
pub enum ReviewError {
    #[error("path not found: {}", .0.display())]
    PathNotFound(PathBuf),

    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("failed to start worker pool: {0}")]
    Pool(#[from] rayon::ThreadPoolBuildError),
}

/// One reviewed file plus the fingerprints needed for project duplication
struct Reviewed {
    result: FileResult,
    fingerprints: Vec<u64>,
}

impl Reviewed {
    fn without_fingerprints(result: FileResult) -> Self {
        Self {
            result,
            fingerprints: Vec::new(),
        }
    }
}

pub struct Reviewer {
    config: ReviewConfig,
    analyzers: Vec<Arc<dyn Analyzer>>,
    ignore: IgnoreMatcher,
    workers: usize,
    progress: Option<ProgressCallback>,
}

impl std::fmt::Debug for Reviewer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Reviewer")
            .field("analyzers", &self.analyzer_names())
            .field("workers", &self.workers)
            .field("parallel", &self.config.parallel)
            .finish()
    }
}

impl Reviewer {
    /// Validate `config` and set up the enabled analyzers.
    pub fn new(config: ReviewConfig) -> Result<Self, ReviewError> {
        ReviewerBuilder::new(config).build()
    }

    pub fn builder(config: ReviewConfig) -> ReviewerBuilder {
        ReviewerBuilder::new(config)
    }

    pub fn config(&self) -> &ReviewConfig {
        &self.config
    }

    pub fn analyzer_names(&self) -> Vec<&str> {
        self.analyzers.iter().map(|a| a.name()).collect()
    }

    /// Review in-memory source. `name` is used as the file path.
    pub fn review_source(&self, source: &str, name: &str) -> FileResult {
        self.analyze_source(source.to_string(), name).result
    }

    /// Review one file on disk.
    pub fn review_file(&self, path: &Path) -> Result<FileResult, ReviewError> {
        if !path.exists() {
            return Err(ReviewError::PathNotFound(path.to_path_buf()));
        }
        Ok(self.review_one(path).result)
    }

    /// Review every Python file under `root`.
    pub fn review_directory(&self, root: &Path, recursive: bool) -> Result<ReviewResult, ReviewError> {
        if !root.is_dir() {
            return Err(ReviewError::PathNotFound(root.to_path_buf()));
        }
        let start = Instant::now();

        let paths = files::discover(root, recursive, &self.ignore);
        info!("Reviewing {} files in {}", paths.len(), root.display());

        let reviewed = if self.config.parallel && paths.len() > 1 {
            self.review_parallel(&paths)?
        } else {
            self.review_sequential(&paths)
        };

        Ok(self.merge(reviewed, start))
    }

    /// Review a file or a directory.
    pub fn review_path(&self, path: &Path, recursive: bool) -> Result<ReviewResult, ReviewError> {
        if path.is_dir() {
            return self.review_directory(path, recursive);
        }
        if !path.exists() {
            return Err(ReviewError::PathNotFound(path.to_path_buf()));
        }
        let start = Instant::now();
        let reviewed = self.review_one(path);
        self.report_progress(&reviewed.result.file, 1, 1);
        Ok(self.merge(vec![reviewed], start))
    }

    fn review_parallel(&self, paths: &[PathBuf]) -> Result<Vec<Reviewed>, ReviewError> {
        debug!("Reviewing in parallel on {} workers", self.workers);
        let completed = AtomicUsize::new(0);
        let total = paths.len();

        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(self.workers)
            .build()?;

        Ok(pool.install(|| {
            paths
                .par_iter()
                .map(|path| {
                    let reviewed = self.review_one(path);
                    let done = completed.fetch_add(1, Ordering::SeqCst) + 1;
                    self.report_progress(&reviewed.result.file, done, total);
                    reviewed
                })
                .collect()
        }))
    }

    fn review_sequential(&self, paths: &[PathBuf]) -> Vec<Reviewed> {
        let total = paths.len();
        paths
            .iter()
            .enumerate()
            .map(|(idx, path)| {
                let reviewed = self.review_one(path);
                self.report_progress(&reviewed.result.file, idx + 1, total);
                reviewed
            })
            .collect()
    }

    fn report_progress(&self, file: &str, done: usize, total: usize) {
        if let Some(ref callback) = self.progress {
            callback(file, done, total);
        }
    }

    fn review_one(&self, path: &Path) -> Reviewed {
        let name = path.display().to_string();
        match files::read_source(path) {
            Ok(SourceText::Text(source)) => self.analyze_source(source, &name),
            Ok(SourceText::Binary) => {
                debug!("Skipping binary file {}", name);
                Reviewed::without_fingerprints(FileResult::skipped(name, None))
            }
            Err(e) => {
                warn!("Skipping unreadable file {}: {}", name, e);
                Reviewed::without_fingerprints(FileResult::skipped(
                    name,
                    Some(format!("failed to read file: {}", e)),
                ))
            }
        }
    }

    fn analyze_source(&self, source: String, name: &str) -> Reviewed {
        let parsed = match parse(source, name) {
            Ok(parsed) => parsed,
            Err(e) => {
                warn!("Failed to parse {}: {}", name, e);
                return Reviewed::without_fingerprints(FileResult::failed(name, e.to_string()));
            }
        };

        let mut issues = Vec::new();
        let mut faults = Vec::new();
        for analyzer in &self.analyzers {
            let run = run_analyzer(analyzer.as_ref(), &parsed, &self.config);
            if let Some(fault) = run.fault() {
                faults.push(fault);
            }
            issues.extend(run.issues);
        }
        issues.retain(|i| i.severity.is_at_least(self.config.min_severity));

        let file_metrics = metrics::calculate(&parsed);
        let mut result = FileResult::analyzed(name, issues, file_metrics.metrics);
        result.analyzer_faults = faults;

        Reviewed {
            result,
            fingerprints: file_metrics.fingerprints,
        }
    }

    fn merge(&self, mut reviewed: Vec<Reviewed>, start: Instant) -> ReviewResult {
        reviewed.sort_by(|a, b| a.result.file.cmp(&b.result.file));

        let scored: Vec<&Reviewed> = reviewed.iter().filter(|r| r.result.is_scored()).collect();
        let mut metrics = Metrics::aggregate(scored.iter().map(|r| &r.result.metrics));
        metrics.duplication_ratio =
            metrics::duplication_ratio(scored.iter().map(|r| r.fingerprints.as_slice()));

        let files: Vec<FileResult> = reviewed.into_iter().map(|r| r.result).collect();
        let skipped = files.iter().filter(|f| f.skipped).count();
        let errored = files.iter().filter(|f| f.error.is_some()).count();
        if skipped > 0 || errored > 0 {
            info!("{} files skipped, {} with errors", skipped, errored);
        }

        ReviewResult::new(files, metrics, start.elapsed().as_secs_f64())
    }
}

/// Builder for [`Reviewer`] with a fluent API
pub struct ReviewerBuilder {
    config: ReviewConfig,
    extra: Vec<Arc<dyn Analyzer>>,
    workers: Option<usize>,
    progress: Option<ProgressCallback>,
}

impl ReviewerBuilder {
    pub fn new(config: ReviewConfig) -> Self {
        Self {
            config,
            extra: Vec::new(),
            workers: None,
            progress: None,
        }
    }

    /// Register a user analyzer. It runs when its name is listed in the
    /// config's `analyzers`.
    pub fn with_analyzer(mut self, analyzer: Arc<dyn Analyzer>) -> Self {
        self.extra.push(analyzer);
        self
    }

    /// Override the configured worker count (0 = auto).
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = Some(workers);
        self
    }

    pub fn on_progress(mut self, callback: ProgressCallback) -> Self {
        self.progress = Some(callback);
        self
    }

    pub fn build(self) -> Result<Reviewer, ReviewError> {
        let extra_names: Vec<&str> = self.extra.iter().map(|a| a.name()).collect();
        self.config.validate_with(&extra_names)?;

        let analyzers = enabled_analyzers(&self.config, &self.extra)?;
        let ignore = IgnoreMatcher::new(&self.config.ignore_paths, &self.config.ignore_files)?;
        let workers = resolve_workers(self.workers.unwrap_or(self.config.workers));

        Ok(Reviewer {
            config: self.config,
            analyzers,
            ignore,
            workers,
            progress: self.progress,
        })
    }
}

/// 0 means one thread per core, capped at 16.
fn resolve_workers(workers: usize) -> usize {
    if workers == 0 {
        std::thread::available_parallelism()
            .map(|p| p.get())
            .unwrap_or(4)
            .min(16)
    } else {
        workers
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Issue, Severity};
    use crate::parsers::ParsedSource;
    use std::fs;
    use std::sync::Mutex;
    use tempfile::TempDir;

    struct Exploding;

    impl Analyzer for Exploding {
        fn name(&self) -> &str {
            "exploding"
        }

        fn description(&self) -> &str {
            "Panics on every file"
        }

        fn analyze(&self, _: &ParsedSource, _: &ReviewConfig) -> anyhow::Result<Vec<Issue>> {
            panic!("boom")
        }
    }

    fn write(dir: &Path, name: &str, content: &[u8]) {
        fs::write(dir.join(name), content).unwrap();
    }

    #[test]
    fn test_review_source_eval() {
        let reviewer = Reviewer::new(ReviewConfig::default()).unwrap();
        let result = reviewer.review_source("eval(user_input)\n", "snippet.py");
        let evals: Vec<&Issue> = result
            .issues
            .iter()
            .filter(|i| i.issue_type == "eval_usage")
            .collect();
        assert_eq!(evals.len(), 1);
        assert_eq!(evals[0].line, 1);
        assert!(!result.skipped);
    }

    #[test]
    fn test_parse_failure_is_recorded() {
        let reviewer = Reviewer::new(ReviewConfig::default()).unwrap();
        let result = reviewer.review_source("def broken(:\n", "bad.py");
        assert!(!result.skipped);
        assert!(result.error.is_some());
        assert!(result.issues.is_empty());
        assert!(!result.is_scored());
    }

    #[test]
    fn test_min_severity_applied_per_file() {
        let config = ReviewConfig {
            min_severity: Severity::High,
            ..ReviewConfig::default()
        };
        let reviewer = Reviewer::new(config).unwrap();
        let result = reviewer.review_source("import os\nx = 42  # TODO\neval(x)\n", "a.py");
        assert!(!result.issues.is_empty());
        assert!(result.issues.iter().all(|i| i.severity >= Severity::High));
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = ReviewConfig {
            analyzers: vec!["nonexistent".into()],
            ..ReviewConfig::default()
        };
        assert!(matches!(
            Reviewer::new(config),
            Err(ReviewError::Config(ConfigError::UnknownAnalyzer { .. }))
        ));
    }

    #[test]
    fn test_missing_path() {
        let reviewer = Reviewer::new(ReviewConfig::default()).unwrap();
        let missing = Path::new("/definitely/not/here.py");
        assert!(matches!(
            reviewer.review_path(missing, true),
            Err(ReviewError::PathNotFound(_))
        ));
        assert!(reviewer.review_file(missing).is_err());
    }

    #[test]
    fn test_faulty_analyzer_is_isolated() {
        let config = ReviewConfig {
            analyzers: vec!["exploding".into(), "security".into()],
            ..ReviewConfig::default()
        };
        let reviewer = Reviewer::builder(config)
            .with_analyzer(Arc::new(Exploding))
            .build()
            .unwrap();
        assert_eq!(reviewer.analyzer_names(), vec!["exploding", "security"]);

        let result = reviewer.review_source("eval(x)\n", "a.py");
        assert_eq!(result.issues.len(), 1);
        assert_eq!(result.analyzer_faults.len(), 1);
        assert!(result.analyzer_faults[0].starts_with("exploding: "));
        assert!(result.is_scored());
    }

    #[test]
    fn test_directory_review_with_skips() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "good.py", b"def f():\n    return 1\n");
        write(dir.path(), "bad.py", b"def f(:\n");
        write(dir.path(), "blob.py", b"\x00\x01\x02");

        let reviewer = Reviewer::new(ReviewConfig::default()).unwrap();
        let result = reviewer.review_directory(dir.path(), true).unwrap();
        assert_eq!(result.files.len(), 3);

        let names: Vec<&str> = result
            .files
            .iter()
            .map(|f| Path::new(&f.file).file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, vec!["bad.py", "blob.py", "good.py"]);

        let summary = result.summary();
        assert_eq!(summary.files_skipped, 1);
        assert_eq!(summary.files_with_errors, 1);
        assert!(result.files[1].skipped && result.files[1].error.is_none());
    }

    #[test]
    fn test_parallel_matches_sequential() {
        let dir = TempDir::new().unwrap();
        for i in 0..8 {
            let src = format!(
                "import os\n\ndef handler_{i}(a, b=[]):\n    eval(a)\n    return b * {n}\n",
                n = 37 + i
            );
            write(dir.path(), &format!("mod_{i}.py"), src.as_bytes());
        }

        let run = |parallel: bool| {
            let config = ReviewConfig {
                parallel,
                workers: 3,
                ..ReviewConfig::default()
            };
            Reviewer::new(config)
                .unwrap()
                .review_directory(dir.path(), true)
                .unwrap()
        };
        let par = run(true);
        let seq = run(false);

        assert_eq!(par.total_issues(), seq.total_issues());
        assert_eq!(par.issues_by_severity(), seq.issues_by_severity());
        assert_eq!(par.score(), seq.score());
        assert_eq!(par.files, seq.files);
        assert_eq!(par.metrics, seq.metrics);
    }

    #[test]
    fn test_progress_callback() {
        let dir = TempDir::new().unwrap();
        write(dir.path(), "a.py", b"x = 1\n");
        write(dir.path(), "b.py", b"y = 2\n");

        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);
        let config = ReviewConfig {
            parallel: false,
            ..ReviewConfig::default()
        };
        let reviewer = Reviewer::builder(config)
            .on_progress(Box::new(move |_, done, total| {
                sink.lock().unwrap().push((done, total));
            }))
            .build()
            .unwrap();
        reviewer.review_directory(dir.path(), true).unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![(1, 2), (2, 2)]);
    }

    #[test]
    fn test_pooled_duplication() {
        let dir = TempDir::new().unwrap();
        let block = b"a = 1\nb = 2\nc = 3\nd = 4\ne = 5\n";
        write(dir.path(), "one.py", block);
        write(dir.path(), "two.py", block);

        let reviewer = Reviewer::new(ReviewConfig::default()).unwrap();
        let result = reviewer.review_directory(dir.path(), true).unwrap();
        assert!(result.files.iter().all(|f| f.metrics.duplication_ratio == 0.0));
        assert_eq!(result.metrics.duplication_ratio, 1.0);
    }

    #[test]
    fn test_resolve_workers() {
        assert_eq!(resolve_workers(3), 3);
        let auto = resolve_workers(0);
        assert!((1..=16).contains(&auto));
    }
}
