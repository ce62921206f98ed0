//! TOML configuration for batch runs
//!
//! Every section and field is optional. Command-line flags override what the
//! file sets.

use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use verify_engine::{MergeOptions, PipelineOptions};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub output: OutputConfig,
    pub batch: BatchConfig,
    pub merge: MergeConfig,
    pub collaborators: CollaboratorConfig,
}

impl Config {
    /// Load configuration from a TOML file
    pub fn from_file<P: AsRef<Path>>(path: P) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        Self::from_str(&content)
    }

    /// Parse configuration from a TOML string
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> anyhow::Result<Self> {
        toml::from_str(s).context("Failed to parse TOML configuration")
    }

    /// Load `path` if given, otherwise use defaults
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Ok(Self::default()),
        }
    }

    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            merge: MergeOptions {
                marker_label: self.merge.marker_label.clone(),
            },
            context_window: self.collaborators.context_window,
        }
    }
}

/// Where results go and which artifacts are written
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Output directory; next to each input when unset
    pub dir: Option<PathBuf>,
    pub write_manifest: bool,
    pub write_page_rows: bool,
    pub write_merged: bool,
    pub write_footnote_index: bool,
    pub write_summary: bool,
    pub manifest_suffix: String,
    pub page_rows_suffix: String,
    pub merged_suffix: String,
    pub footnote_index_suffix: String,
    pub summary_suffix: String,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: None,
            write_manifest: true,
            write_page_rows: true,
            write_merged: true,
            write_footnote_index: true,
            write_summary: true,
            manifest_suffix: "_manifest.json".to_string(),
            page_rows_suffix: "_pages.json".to_string(),
            merged_suffix: "_fn_merged.md".to_string(),
            footnote_index_suffix: "_footnote_index.json".to_string(),
            summary_suffix: "_summary.json".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    /// Maximum documents processed at once
    pub jobs: usize,
}

impl Default for BatchConfig {
    fn default() -> Self {
        Self { jobs: 4 }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MergeConfig {
    pub marker_label: String,
}

impl Default for MergeConfig {
    fn default() -> Self {
        Self {
            marker_label: MergeOptions::default().marker_label,
        }
    }
}

/// File-backed collaborator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CollaboratorConfig {
    /// Directory holding proposal files; next to each input when unset
    pub proposal_dir: Option<PathBuf>,
    pub classification_suffix: String,
    pub image_review_suffix: String,
    pub context_window: usize,
}

impl Default for CollaboratorConfig {
    fn default() -> Self {
        Self {
            proposal_dir: None,
            classification_suffix: "_classification.json".to_string(),
            image_review_suffix: "_image_review.json".to_string(),
            context_window: verify_engine::pipeline::DEFAULT_CONTEXT_WINDOW,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_empty_config_uses_defaults() {
        let config = Config::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.batch.jobs, 4);
        assert_eq!(config.merge.marker_label, "FN");
        assert_eq!(config.output.merged_suffix, "_fn_merged.md");
    }

    #[test]
    fn test_partial_sections() {
        let toml = r#"
            [output]
            dir = "out"
            write_page_rows = false

            [batch]
            jobs = 2

            [merge]
            marker_label = "Footnote "
        "#;
        let config = Config::from_str(toml).unwrap();
        assert_eq!(config.output.dir, Some(PathBuf::from("out")));
        assert!(!config.output.write_page_rows);
        assert!(config.output.write_merged);
        assert_eq!(config.batch.jobs, 2);
        assert_eq!(
            config.pipeline_options().merge.marker_label,
            "Footnote "
        );
    }

    #[test]
    fn test_bad_toml_is_an_error() {
        let err = Config::from_str("[batch]\njobs = \"many\"").unwrap_err();
        assert!(err.to_string().contains("Failed to parse TOML configuration"));
    }

    #[test]
    fn test_missing_file_names_the_path() {
        let err = Config::from_file("/nonexistent/filing.toml").unwrap_err();
        assert!(err.to_string().contains("/nonexistent/filing.toml"));
    }
}
