//! Output reporters for review results
//!
//! Supports multiple output formats:
//! - `text` - Terminal output with ANSI colors
//! - `json` - Machine-readable JSON, lossless round-trip
//! - `markdown` - GitHub-flavored Markdown for PR comments
//! - `html` - Standalone HTML report

mod html;
pub mod json;
mod markdown;
mod text;

use crate::models::{ReviewResult, Severity};
use anyhow::{anyhow, Result};
use std::str::FromStr;

/// Supported output formats
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Markdown,
    Html,
}

impl FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" | "txt" | "terminal" => Ok(OutputFormat::Text),
            "json" => Ok(OutputFormat::Json),
            "markdown" | "md" => Ok(OutputFormat::Markdown),
            "html" => Ok(OutputFormat::Html),
            _ => Err(anyhow!(
                "Unknown format '{}'. Valid formats: text, json, markdown, html",
                s
            )),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Markdown => write!(f, "markdown"),
            OutputFormat::Html => write!(f, "html"),
        }
    }
}

/// Render a review result in the named format
pub fn report(result: &ReviewResult, format: &str) -> Result<String> {
    let fmt = OutputFormat::from_str(format)?;
    report_with_format(result, fmt)
}

/// Render a review result using an OutputFormat enum
pub fn report_with_format(result: &ReviewResult, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Text => text::render(result),
        OutputFormat::Json => json::render(result),
        OutputFormat::Markdown => markdown::render(result),
        OutputFormat::Html => html::render(result),
    }
}

/// Recommended file extension for a format
pub fn file_extension(format: OutputFormat) -> &'static str {
    match format {
        OutputFormat::Text => "txt",
        OutputFormat::Json => "json",
        OutputFormat::Markdown => "md",
        OutputFormat::Html => "html",
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

fn severity_label(severity: Severity) -> String {
    capitalize(&severity.to_string())
}
