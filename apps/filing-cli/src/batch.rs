//! Batch processing
//!
//! One blocking worker per document, at most `jobs` at a time. Ctrl-C stops
//! new documents from starting; running ones finish and are reported.

use anyhow::{bail, Context};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinHandle;
use verify_engine::{DocumentPipeline, DocumentSummary};

use crate::collaborators::{FileClassifier, FileImageReviewer, ProposalPaths};
use crate::config::Config;
use crate::output::{write_artifacts, write_summary, OutputPaths};

#[derive(Debug, Default)]
pub struct BatchReport {
    pub summaries: Vec<DocumentSummary>,
    /// Inputs that could not be read or whose results could not be written
    pub errors: Vec<(PathBuf, String)>,
    /// Inputs never started because of an interrupt
    pub skipped: usize,
}

impl BatchReport {
    pub fn succeeded(&self) -> usize {
        self.summaries.iter().filter(|s| s.succeeded()).count()
    }

    pub fn failed(&self) -> usize {
        self.summaries.len() - self.succeeded() + self.errors.len()
    }

    pub fn is_clean(&self) -> bool {
        self.failed() == 0 && self.skipped == 0
    }
}

/// Expand directories into their `.md` files, skipping merged outputs
pub fn collect_inputs(inputs: &[PathBuf], config: &Config) -> anyhow::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_file() {
            files.push(input.clone());
        } else if input.is_dir() {
            let mut found: Vec<PathBuf> = fs::read_dir(input)
                .with_context(|| format!("Failed to read directory {}", input.display()))?
                .filter_map(|entry| entry.ok().map(|e| e.path()))
                .filter(|path| is_source_markdown(path, config))
                .collect();
            found.sort();
            if found.is_empty() {
                tracing::warn!(dir = %input.display(), "No .md files found");
            }
            files.extend(found);
        } else {
            bail!("Input not found: {}", input.display());
        }
    }
    Ok(files)
}

fn is_source_markdown(path: &Path, config: &Config) -> bool {
    let is_md = path.is_file() && path.extension().is_some_and(|ext| ext == "md");
    let is_output = path
        .file_name()
        .and_then(|name| name.to_str())
        .is_some_and(|name| name.ends_with(&config.output.merged_suffix));
    is_md && !is_output
}

/// Run the pipeline for one input and write its artifacts
pub fn process_file(input: &Path, config: &Config, dry_run: bool) -> anyhow::Result<DocumentSummary> {
    let source = fs::read_to_string(input)
        .with_context(|| format!("Failed to read input {}", input.display()))?;
    let source_name = input
        .file_name()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();

    let proposals = ProposalPaths::for_input(input, &config.collaborators);
    let mut pipeline = DocumentPipeline::new(FileClassifier::new(&proposals.classification))
        .with_options(config.pipeline_options());
    if let Some(reviewer) = FileImageReviewer::if_present(&proposals.image_review) {
        pipeline = pipeline.with_image_review(reviewer);
    }

    let result = pipeline.run(&source_name, source);
    let summary = DocumentSummary::from_result(&source_name, &result);

    if dry_run {
        tracing::info!(document = %source_name, "Dry run; nothing written");
        return Ok(summary);
    }

    let paths = OutputPaths::for_input(input, &config.output);
    if let Ok(output) = &result {
        let written = write_artifacts(output, &paths, &config.output)?;
        tracing::info!(document = %source_name, files = written.len(), "Artifacts written");
    }
    write_summary(&summary, &paths, &config.output)?;
    Ok(summary)
}

/// Process `inputs` with at most `jobs` documents in flight
pub async fn run_batch(
    inputs: Vec<PathBuf>,
    config: Arc<Config>,
    jobs: usize,
    dry_run: bool,
) -> anyhow::Result<BatchReport> {
    let semaphore = Arc::new(Semaphore::new(jobs.max(1)));
    let interrupted = Arc::new(AtomicBool::new(false));
    {
        let interrupted = interrupted.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                tracing::warn!("Interrupt received; finishing documents in progress");
                interrupted.store(true, Ordering::SeqCst);
            }
        });
    }

    tracing::info!(documents = inputs.len(), jobs = jobs.max(1), "Batch started");
    let total = inputs.len();
    let mut report = BatchReport::default();
    let mut handles = Vec::with_capacity(total);

    for (started, input) in inputs.into_iter().enumerate() {
        let permit = semaphore
            .clone()
            .acquire_owned()
            .await
            .context("Worker pool closed")?;
        if interrupted.load(Ordering::SeqCst) {
            report.skipped = total - started;
            tracing::warn!(skipped = report.skipped, "Not starting remaining documents");
            break;
        }

        let config = config.clone();
        let worker_input = input.clone();
        let handle = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            process_file(&worker_input, &config, dry_run)
        });
        handles.push((input, handle));
    }

    collect_results(handles, &mut report).await;

    tracing::info!(
        succeeded = report.succeeded(),
        failed = report.failed(),
        skipped = report.skipped,
        "Batch finished"
    );
    Ok(report)
}

/// Await every worker. A panicked worker is recorded as an error for its
/// input; the remaining results are still collected.
async fn collect_results(
    handles: Vec<(PathBuf, JoinHandle<anyhow::Result<DocumentSummary>>)>,
    report: &mut BatchReport,
) {
    for (input, handle) in handles {
        let result = match handle.await {
            Ok(result) => result,
            Err(e) => Err(anyhow::Error::new(e).context("Document worker panicked")),
        };
        match result {
            Ok(summary) => report.summaries.push(summary),
            Err(e) => {
                tracing::error!(input = %input.display(), "{:#}", e);
                report.errors.push((input, format!("{:#}", e)));
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[tokio::test]
    async fn test_panicked_worker_does_not_drop_other_results() {
        let failing = tokio::task::spawn_blocking(|| -> anyhow::Result<DocumentSummary> {
            panic!("worker blew up")
        });
        let missing = tokio::task::spawn_blocking(|| {
            process_file(Path::new("does-not-exist.md"), &Config::default(), true)
        });
        let handles = vec![
            (PathBuf::from("crash.md"), failing),
            (PathBuf::from("does-not-exist.md"), missing),
        ];

        let mut report = BatchReport::default();
        collect_results(handles, &mut report).await;

        assert_eq!(report.errors.len(), 2);
        assert_eq!(report.errors[0].0, PathBuf::from("crash.md"));
        assert!(report.errors[0].1.starts_with("Document worker panicked"));
        assert!(report.errors[1].1.contains("Failed to read input"));
        assert_eq!(report.failed(), 2);
        assert!(!report.is_clean());
    }
}
