//! Artifact writers

use anyhow::Context;
use filing_types::{FootnoteException, FootnoteIndexEntry, FootnoteIssue};
use serde::Serialize;
use std::fs;
use std::path::{Path, PathBuf};
use verify_engine::{DocumentSummary, PipelineOutput};

use crate::config::OutputConfig;

/// Output file naming for one input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputPaths {
    pub dir: PathBuf,
    pub stem: String,
}

impl OutputPaths {
    pub fn for_input(input: &Path, config: &OutputConfig) -> Self {
        let dir = config
            .dir
            .clone()
            .or_else(|| input.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self { dir, stem }
    }

    pub fn with_suffix(&self, suffix: &str) -> PathBuf {
        self.dir.join(format!("{}{}", self.stem, suffix))
    }
}

/// Footnote report: the index plus everything that needs a human
#[derive(Debug, Serialize)]
struct FootnoteReport<'a> {
    footnotes: &'a [FootnoteIndexEntry],
    issues: &'a [FootnoteIssue],
    exceptions: &'a [FootnoteException],
}

fn write_json<T: Serialize + ?Sized>(path: &Path, value: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(value)
        .with_context(|| format!("Failed to serialize {}", path.display()))?;
    fs::write(path, json).with_context(|| format!("Failed to write {}", path.display()))
}

/// Write every enabled artifact for a successful run
pub fn write_artifacts(
    output: &PipelineOutput,
    paths: &OutputPaths,
    config: &OutputConfig,
) -> anyhow::Result<Vec<PathBuf>> {
    fs::create_dir_all(&paths.dir)
        .with_context(|| format!("Failed to create output directory {}", paths.dir.display()))?;
    let mut written = Vec::new();

    if config.write_manifest {
        let path = paths.with_suffix(&config.manifest_suffix);
        write_json(&path, &output.manifest)?;
        written.push(path);
    }

    if config.write_page_rows {
        let path = paths.with_suffix(&config.page_rows_suffix);
        write_json(&path, &output.manifest.page_rows())?;
        written.push(path);
    }

    if config.write_merged {
        let path = paths.with_suffix(&config.merged_suffix);
        fs::write(&path, &output.merged.text)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        written.push(path);
    }

    if config.write_footnote_index {
        let path = paths.with_suffix(&config.footnote_index_suffix);
        let report = FootnoteReport {
            footnotes: &output.footnote_index,
            issues: &output.footnote_issues,
            exceptions: &output.merged.exceptions,
        };
        write_json(&path, &report)?;
        written.push(path);
    }

    for path in &written {
        tracing::debug!(path = %path.display(), "Wrote artifact");
    }
    Ok(written)
}

/// Written for failed documents too
pub fn write_summary(
    summary: &DocumentSummary,
    paths: &OutputPaths,
    config: &OutputConfig,
) -> anyhow::Result<Option<PathBuf>> {
    if !config.write_summary {
        return Ok(None);
    }
    fs::create_dir_all(&paths.dir)
        .with_context(|| format!("Failed to create output directory {}", paths.dir.display()))?;
    let path = paths.with_suffix(&config.summary_suffix);
    write_json(&path, summary)?;
    Ok(Some(path))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_output_paths_follow_config() {
        let config = OutputConfig::default();
        let paths = OutputPaths::for_input(Path::new("/in/complaint.md"), &config);
        assert_eq!(
            paths.with_suffix(&config.merged_suffix),
            PathBuf::from("/in/complaint_fn_merged.md")
        );

        let config = OutputConfig {
            dir: Some(PathBuf::from("/out")),
            ..Default::default()
        };
        let paths = OutputPaths::for_input(Path::new("/in/complaint.md"), &config);
        assert_eq!(
            paths.with_suffix(&config.manifest_suffix),
            PathBuf::from("/out/complaint_manifest.json")
        );
    }
}
