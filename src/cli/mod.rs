//! CLI command definitions and handlers

mod init;
mod review;
mod rules;

use anyhow::Result;
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// Parse and validate workers count (1-64)
fn parse_workers(s: &str) -> Result<usize, String> {
    let n: usize = s
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if n == 0 {
        Err("workers must be at least 1".to_string())
    } else if n > 64 {
        Err("workers cannot exceed 64".to_string())
    } else {
        Ok(n)
    }
}

/// pyreview - static code review for Python
#[derive(Parser, Debug)]
#[command(name = "pyreview")]
#[command(
    version,
    about = "Static code review for Python: security, complexity and code-smell analyzers with a 0-100 score",
    after_help = "\
Examples:
  pyreview review .                          Review the current directory
  pyreview review src --format json          JSON output for scripting
  pyreview review app.py --strict            Review one file with strict thresholds
  pyreview check . --fail-on high            Exit 1 on high+ issues (CI mode)
  pyreview init --preset relaxed             Write a pyreview.toml
  pyreview rules --category security         List the security rules"
)]
pub struct Cli {
    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "warn", value_parser = ["error", "warn", "info", "debug", "trace"])]
    pub log_level: String,

    /// Number of parallel workers (1-64, default: one per core)
    #[arg(long, global = true, value_parser = parse_workers)]
    pub workers: Option<usize>,

    #[command(subcommand)]
    pub command: Commands,
}

/// Options shared by `review` and `check`
#[derive(Args, Debug, Clone)]
pub struct ReviewArgs {
    /// File or directory to review
    #[arg(default_value = ".")]
    pub path: PathBuf,

    /// Config file (default: pyreview.toml in the reviewed directory)
    #[arg(long, short = 'c')]
    pub config: Option<PathBuf>,

    /// Comma-separated analyzers to run, e.g. security,smells
    #[arg(long, value_delimiter = ',')]
    pub analyzers: Option<Vec<String>>,

    /// Only review the top-level directory
    #[arg(long)]
    pub no_recursive: bool,

    /// Review files one at a time
    #[arg(long)]
    pub no_parallel: bool,

    /// Strict preset: lower thresholds, report down to low
    #[arg(long, conflicts_with_all = ["config", "relaxed", "security_only"])]
    pub strict: bool,

    /// Relaxed preset: higher thresholds, report high and above
    #[arg(long, conflicts_with_all = ["config", "security_only"])]
    pub relaxed: bool,

    /// Security-only preset
    #[arg(long, conflicts_with = "config")]
    pub security_only: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Review Python files and print a report
    #[command(after_help = "\
Examples:
  pyreview review .                                 Review the current directory
  pyreview review . --format html -o report.html    Standalone HTML report
  pyreview review . --min-severity medium           Hide low and info issues
  pyreview review . --analyzers security            Run only the security analyzer
  pyreview review . --ai --ai-max 5                 Explain the five worst issues")]
    Review {
        #[command(flatten)]
        args: ReviewArgs,

        /// Output format: text, json, markdown (or md), html
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json", "markdown", "md", "html"])]
        format: String,

        /// Output file path (default: stdout)
        #[arg(long, short = 'o')]
        output: Option<PathBuf>,

        /// Minimum severity to report (critical, high, medium, low, info)
        #[arg(long, value_parser = ["critical", "high", "medium", "low", "info"])]
        min_severity: Option<String>,

        /// Add AI explanations and fixes (needs an API key)
        #[arg(long)]
        ai: bool,

        /// AI provider: anthropic, openai or groq
        #[arg(long, default_value = "anthropic", value_parser = ["anthropic", "openai", "groq"], requires = "ai")]
        ai_provider: String,

        /// Maximum issues sent to the AI provider
        #[arg(long, default_value = "10", requires = "ai")]
        ai_max: usize,
    },

    /// Review and exit with code 1 when issues at or above a severity exist
    Check {
        #[command(flatten)]
        args: ReviewArgs,

        /// Fail threshold (critical, high, medium, low, info)
        #[arg(long, default_value = "high", value_parser = ["critical", "high", "medium", "low", "info"])]
        fail_on: String,

        /// Output format: text, json, markdown (or md), html
        #[arg(long, short = 'f', default_value = "text", value_parser = ["text", "json", "markdown", "md", "html"])]
        format: String,
    },

    /// Write a pyreview.toml with the settings of a preset
    Init {
        /// Directory to write into
        #[arg(default_value = ".")]
        path: PathBuf,

        /// Preset: default, strict, relaxed, security-only
        #[arg(long, default_value = "default")]
        preset: String,

        /// Overwrite an existing pyreview.toml
        #[arg(long)]
        force: bool,
    },

    /// List the built-in rules
    Rules {
        /// Only this category: security, complexity, style
        #[arg(long, value_parser = ["security", "complexity", "style"])]
        category: Option<String>,
    },
}

/// Run the CLI
pub fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Review {
            args,
            format,
            output,
            min_severity,
            ai,
            ai_provider,
            ai_max,
        } => {
            let ai = ai.then_some(review::AiOptions {
                provider: ai_provider,
                max_issues: ai_max,
            });
            review::run_review(
                &args,
                cli.workers,
                &format,
                output.as_deref(),
                min_severity.as_deref(),
                ai,
            )
        }

        Commands::Check {
            args,
            fail_on,
            format,
        } => review::run_check(&args, cli.workers, &fail_on, &format),

        Commands::Init {
            path,
            preset,
            force,
        } => init::run(&path, &preset, force),

        Commands::Rules { category } => rules::run(category.as_deref()),
    }
}
