//! TOML configuration for the triage CLI
//!
//! Both sections are optional; anything left out falls back to the library
//! defaults.

use annotation_core::AnnotateOptions;
use anyhow::Context;
use report_core::ComposerConfig;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TriageConfig {
    /// Highlight colour and clipping behaviour
    pub annotation: AnnotateOptions,
    /// Page geometry, typography and report strings
    pub report: ComposerConfig,
}

impl TriageConfig {
    /// Load configuration from a TOML file
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or the TOML is malformed.
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    ///
    /// # Example
    ///
    /// ```
    /// use triage_cli::config::TriageConfig;
    ///
    /// # fn example() -> anyhow::Result<()> {
    /// let config = TriageConfig::from_str(r#"
    ///     [annotation]
    ///     clip_out_of_bounds = true
    ///
    ///     [report.page]
    ///     width = 215.9
    ///     height = 279.4
    /// "#)?;
    /// assert!(config.annotation.clip_out_of_bounds);
    /// # Ok(())
    /// # }
    /// ```
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML configuration")
    }

    /// Load from `path` when given, defaults otherwise
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_is_default() {
        assert_eq!(TriageConfig::from_str("").unwrap(), TriageConfig::default());
    }

    #[test]
    fn test_nested_sections_override_selectively() {
        let config = TriageConfig::from_str(
            r#"
            [annotation.style]
            red = 0
            green = 120
            blue = 255
            alpha = 0.5

            [report]
            block_gap = 2.0

            [report.images]
            box_size = 60.0

            [report.typography]
            body = 10.0
            "#,
        )
        .unwrap();

        assert_eq!(config.annotation.style.green, 120);
        assert!(!config.annotation.clip_out_of_bounds);
        assert_eq!(config.report.images.box_size, 60.0);
        assert_eq!(config.report.images.gutter, 10.0);
        assert_eq!(config.report.typography.body, 10.0);
        assert_eq!(config.report.typography.title, 20.0);
        assert_eq!(config.report.block_gap, 2.0);
    }

    #[test]
    fn test_malformed_toml_is_an_error() {
        let err = TriageConfig::from_str("[report\nwidth = ").unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML"));
    }

    #[test]
    fn test_missing_file_names_the_path() {
        let err = TriageConfig::from_file("/nonexistent/triage.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/triage.toml"));
    }
}
