//! JSON reporter
//!
//! Outputs the full ReviewResult, derived summary and scores included.
//! [`parse`] reads it back; derived fields are ignored on input since they
//! are recomputed from the issues.

use crate::models::ReviewResult;
use anyhow::{Context, Result};

/// Render result as pretty-printed JSON
pub fn render(result: &ReviewResult) -> Result<String> {
    Ok(serde_json::to_string_pretty(result)?)
}

/// Render result as compact JSON (single line)
pub fn render_compact(result: &ReviewResult) -> Result<String> {
    Ok(serde_json::to_string(result)?)
}

/// Parse JSON produced by [`render`] or [`render_compact`].
pub fn parse(json: &str) -> Result<ReviewResult> {
    serde_json::from_str(json).context("invalid review result JSON")
}
