//! pyreview - static code review for Python
//!
//! Parses Python sources with tree-sitter, runs security, complexity and
//! code-smell analyzers over them, computes per-file metrics and rolls
//! everything up into a 0-100 health score with a letter grade.
//!
//! ```no_run
//! use pyreview::config::ReviewConfig;
//! use pyreview::reviewer::Reviewer;
//!
//! let reviewer = Reviewer::new(ReviewConfig::default())?;
//! let result = reviewer.review_path(std::path::Path::new("src"), true)?;
//! println!("{} ({})", result.score(), result.grade());
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod ai;
pub mod analyzers;
pub mod cli;
pub mod config;
pub mod metrics;
pub mod models;
pub mod parsers;
pub mod reporters;
pub mod reviewer;
pub mod rules;
pub mod scoring;
