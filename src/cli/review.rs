//! `review` and `check` commands

use super::ReviewArgs;
use crate::ai::{enhance_result, AiClient, AiEnhancer, Provider};
use crate::config::{Preset, ReviewConfig};
use crate::models::{ReviewResult, Severity};
use crate::reporters::{self, OutputFormat};
use crate::reviewer::Reviewer;
use anyhow::{Context, Result};
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use std::path::Path;
use std::str::FromStr;
use tracing::info;

pub(super) struct AiOptions {
    pub provider: String,
    pub max_issues: usize,
}

/// Resolve the effective configuration: preset flag, else `--config`, else
/// `pyreview.toml` next to the reviewed path. Flags override file values.
pub(super) fn resolve_config(args: &ReviewArgs, workers: Option<usize>) -> Result<ReviewConfig> {
    let mut config = if args.strict {
        ReviewConfig::preset(Preset::Strict)
    } else if args.relaxed {
        ReviewConfig::preset(Preset::Relaxed)
    } else if args.security_only {
        ReviewConfig::preset(Preset::SecurityOnly)
    } else if let Some(path) = &args.config {
        ReviewConfig::from_file(path)?
    } else {
        let dir = if args.path.is_dir() {
            args.path.as_path()
        } else {
            args.path.parent().unwrap_or(Path::new("."))
        };
        let dir = if dir.as_os_str().is_empty() {
            Path::new(".")
        } else {
            dir
        };
        ReviewConfig::discover(dir)?
    };

    if let Some(analyzers) = &args.analyzers {
        config.analyzers = analyzers
            .iter()
            .map(|a| a.trim().to_string())
            .filter(|a| !a.is_empty())
            .collect();
    }
    if args.no_parallel {
        config.parallel = false;
    }
    if let Some(n) = workers {
        config.workers = n;
    }
    Ok(config)
}

fn spinner_style() -> ProgressStyle {
    ProgressStyle::default_bar()
        .template("{spinner:.green} [{bar:40.cyan/blue}] {pos}/{len} {msg}")
        .expect("valid template")
        .progress_chars("█▓▒░  ")
}

/// Run the review with a progress bar on interactive terminals.
fn review(args: &ReviewArgs, config: ReviewConfig) -> Result<ReviewResult> {
    let interactive = console::Term::stderr().is_term() && args.path.is_dir();

    let mut builder = Reviewer::builder(config);
    let bar = if interactive {
        let bar = ProgressBar::new(0);
        bar.set_style(spinner_style());
        let sink = bar.clone();
        builder = builder.on_progress(Box::new(move |file, done, total| {
            sink.set_length(total as u64);
            sink.set_position(done as u64);
            sink.set_message(short_name(file));
        }));
        Some(bar)
    } else {
        None
    };

    let reviewer = builder.build()?;
    info!("Analyzers: {}", reviewer.analyzer_names().join(", "));

    let result = reviewer
        .review_path(&args.path, !args.no_recursive)
        .with_context(|| format!("Failed to review {}", args.path.display()))?;

    if let Some(bar) = bar {
        bar.finish_and_clear();
    }
    Ok(result)
}

fn short_name(file: &str) -> String {
    Path::new(file)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| file.to_string())
}

fn write_output(output: &str, path: Option<&Path>) -> Result<()> {
    match path {
        Some(path) => {
            std::fs::write(path, output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            eprintln!(
                "{} Report written to {}",
                style("✓").green(),
                style(path.display()).cyan()
            );
        }
        None => print!("{}", output),
    }
    Ok(())
}

pub(super) fn run_review(
    args: &ReviewArgs,
    workers: Option<usize>,
    format: &str,
    output: Option<&Path>,
    min_severity: Option<&str>,
    ai: Option<AiOptions>,
) -> Result<()> {
    let format = OutputFormat::from_str(format)?;
    let mut config = resolve_config(args, workers)?;
    if let Some(sev) = min_severity {
        config.min_severity = Severity::from_str(sev).map_err(anyhow::Error::msg)?;
    }

    let mut result = review(args, config)?;

    if let Some(ai) = ai {
        let provider = Provider::from_name(&ai.provider)?;
        match AiClient::from_env(provider) {
            Ok(client) => {
                let stats = enhance_result(&mut result, &AiEnhancer::new(client), ai.max_issues);
                eprintln!(
                    "{} AI enhanced {} of {} issues",
                    style("✓").green(),
                    stats.enhanced,
                    stats.attempted
                );
            }
            Err(e) => eprintln!("{} Skipping AI enhancement: {}", style("!").yellow(), e),
        }
    }

    let rendered = reporters::report_with_format(&result, format)?;
    // `-o report` gets the extension of the chosen format
    let output = output.map(|p| match p.extension() {
        Some(_) => p.to_path_buf(),
        None => p.with_extension(reporters::file_extension(format)),
    });
    write_output(&rendered, output.as_deref())
}

/// Count of issues at or above `threshold`
pub(super) fn failing_issues(result: &ReviewResult, threshold: Severity) -> usize {
    result
        .issues()
        .filter(|i| i.severity.is_at_least(threshold))
        .count()
}

pub(super) fn run_check(
    args: &ReviewArgs,
    workers: Option<usize>,
    fail_on: &str,
    format: &str,
) -> Result<()> {
    let format = OutputFormat::from_str(format)?;
    let threshold = Severity::from_str(fail_on).map_err(anyhow::Error::msg)?;
    let mut config = resolve_config(args, workers)?;
    // Issues at the fail threshold must survive the report filter.
    config.min_severity = config.min_severity.min(threshold);

    let result = review(args, config)?;
    let rendered = reporters::report_with_format(&result, format)?;
    write_output(&rendered, None)?;

    let failing = failing_issues(&result, threshold);
    if failing > 0 {
        eprintln!(
            "{} {} issue(s) at or above {}; failing due to --fail-on={}",
            style("✗").red(),
            failing,
            threshold,
            fail_on
        );
        std::process::exit(1);
    }
    eprintln!("{} No issues at or above {}", style("✓").green(), threshold);
    Ok(())
}
