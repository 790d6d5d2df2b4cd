//! Base analyzer trait and types
//!
//! This module defines the core abstractions for issue detection:
//! - `Analyzer` trait that every analyzer implements
//! - `AnalyzerRun` for capturing the outcome of one analyzer on one file

use crate::config::ReviewConfig;
use crate::models::Issue;
use crate::parsers::ParsedSource;
use anyhow::Result;

/// Outcome of running a single analyzer over a single file
#[derive(Debug, Clone)]
pub struct AnalyzerRun {
    /// Name of the analyzer that produced these issues
    pub analyzer_name: String,
    pub issues: Vec<Issue>,
    pub success: bool,
    /// Error message if the analyzer failed or panicked
    pub error: Option<String>,
}

impl AnalyzerRun {
    /// Create a successful run
    pub fn success(analyzer_name: String, issues: Vec<Issue>) -> Self {
        Self {
            analyzer_name,
            issues,
            success: true,
            error: None,
        }
    }

    /// Create a failed run; it contributes no issues
    pub fn failure(analyzer_name: String, error: String) -> Self {
        Self {
            analyzer_name,
            issues: Vec::new(),
            success: false,
            error: Some(error),
        }
    }

    /// `name: reason` as recorded in `FileResult::analyzer_faults`.
    pub fn fault(&self) -> Option<String> {
        self.error
            .as_ref()
            .map(|e| format!("{}: {}", self.analyzer_name, e))
    }
}

/// Trait for all analyzers
///
/// An analyzer is a pure function of one parsed file and the review
/// configuration. Analyzers share no state, so the reviewer may run them for
/// different files on different threads.
///
/// # Example Implementation
///
/// ```ignore
/// pub struct NoAssertAnalyzer;
///
/// impl Analyzer for NoAssertAnalyzer {
///     fn name(&self) -> &str {
///         "no-assert"
///     }
///
///     fn description(&self) -> &str {
///         "Flags assert statements in library code"
///     }
///
///     fn analyze(&self, parsed: &ParsedSource, config: &ReviewConfig) -> Result<Vec<Issue>> {
///         Ok(vec![])
///     }
/// }
/// ```
pub trait Analyzer: Send + Sync {
    /// Name used in `analyzers = [...]` and in fault reports
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    /// Detect issues in one file, in detection order.
    fn analyze(&self, parsed: &ParsedSource, config: &ReviewConfig) -> Result<Vec<Issue>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_fault() {
        let ok = AnalyzerRun::success("security".into(), vec![]);
        assert!(ok.success);
        assert_eq!(ok.fault(), None);

        let failed = AnalyzerRun::failure("custom".into(), "boom".into());
        assert!(!failed.success);
        assert!(failed.issues.is_empty());
        assert_eq!(failed.fault().as_deref(), Some("custom: boom"));
    }
}
