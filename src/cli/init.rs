//! Init command - write a pyreview.toml

use crate::config::{Preset, ReviewConfig, CONFIG_FILE_NAME};
use anyhow::{Context, Result};
use console::style;
use std::path::Path;
use std::str::FromStr;

const HEADER: &str = r#"# pyreview configuration
#
# analyzers       complexity, security, smells (and custom when rules are declared)
# min_severity    critical, high, medium, low, info
# ignore_paths    directory globs, matched against every path component
# ignore_files    file name globs
# workers         0 = one per core
#
# User rules run line by line over the source:
#
# [[custom_rules]]
# id = "custom/no-breakpoint"
# pattern = 'breakpoint\(\)'
# severity = "medium"
# message = "Leftover debugger call: {match}"
# suggestion = "Remove it before merging"

"#;

/// Render the file content for `preset`.
pub(super) fn render(preset: Preset) -> Result<String> {
    let body = ReviewConfig::preset(preset).to_toml()?;
    Ok(format!("{}# preset: {}\n{}", HEADER, preset, body))
}

/// Run the init command
pub fn run(path: &Path, preset: &str, force: bool) -> Result<()> {
    if !path.is_dir() {
        anyhow::bail!("Path is not a directory: {}", path.display());
    }
    let preset = Preset::from_str(preset)?;

    let config_path = path.join(CONFIG_FILE_NAME);
    if config_path.exists() && !force {
        anyhow::bail!(
            "{} already exists (use --force to overwrite)",
            config_path.display()
        );
    }

    std::fs::write(&config_path, render(preset)?)
        .with_context(|| format!("Failed to write {}", config_path.display()))?;
    println!(
        "{} Created {} ({} preset)",
        style("✓").green(),
        style(config_path.display()).cyan(),
        preset
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_rendered_file_loads_back() {
        for preset in [
            Preset::Default,
            Preset::Strict,
            Preset::Relaxed,
            Preset::SecurityOnly,
        ] {
            let text = render(preset).unwrap();
            let loaded = ReviewConfig::from_toml_str(&text, "init").unwrap();
            assert_eq!(loaded, ReviewConfig::preset(preset));
        }
    }

    #[test]
    fn test_refuses_to_overwrite() {
        let dir = TempDir::new().unwrap();
        run(dir.path(), "strict", false).unwrap();
        assert!(run(dir.path(), "strict", false).is_err());
        run(dir.path(), "relaxed", true).unwrap();

        let written = ReviewConfig::from_file(&dir.path().join(CONFIG_FILE_NAME)).unwrap();
        assert_eq!(written, ReviewConfig::relaxed());
    }

    #[test]
    fn test_unknown_preset() {
        let dir = TempDir::new().unwrap();
        assert!(run(dir.path(), "paranoid", false).is_err());
    }
}
