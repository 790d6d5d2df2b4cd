//! Configuration module for pyreview
//!
//! This module handles:
//! - Review options and thresholds (`pyreview.toml`)
//! - Named presets (strict, relaxed, security-only)
//! - Ignore patterns for file discovery
//! - User-defined pattern rules

mod ignore;
mod review_config;

pub use ignore::IgnoreMatcher;
pub use review_config::{
    ConfigError, CustomRuleSpec, Preset, ReviewConfig, BUILTIN_ANALYZERS, CONFIG_FILE_NAME,
    CUSTOM_ANALYZER,
};
