//! Per-document pipeline driver
//!
//! ```text
//! Parsed -> Classified -> Verified -> [ImageReviewed] -> Merged
//!    \           \
//!  FormatInvalid  CollaboratorFailed
//! ```
//!
//! Field-level failures never leave the happy path; only a malformed
//! document or a failed collaborator call stops a run.

use filing_types::{ClassificationManifest, FootnoteIndexEntry, FootnoteIssue};
use serde::{Deserialize, Serialize};

use crate::assembler::ManifestAssembler;
use crate::collaborator::{ClassificationCollaborator, ImageReviewCollaborator, TokenBudget};
use crate::document::Document;
use crate::error::PipelineError;
use crate::footnote_index::{build_footnote_index, validate_sequence};
use crate::footnotes::{merge_footnotes, MergeOptions, MergedDocument};
use crate::review::{ReviewMerger, ReviewOutcome};

/// Default context window used for the Pass-1 size warning
pub const DEFAULT_CONTEXT_WINDOW: usize = 1_000_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PipelineStage {
    Parsed,
    Classified,
    Verified,
    ImageReviewed,
    Merged,
    FormatInvalid,
    CollaboratorFailed,
}

impl PipelineStage {
    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            PipelineStage::Merged | PipelineStage::FormatInvalid | PipelineStage::CollaboratorFailed
        )
    }

    /// Terminal stage reached when `error` stops a run
    pub fn failed_with(error: &PipelineError) -> Self {
        match error {
            PipelineError::Format(_) => PipelineStage::FormatInvalid,
            PipelineError::Collaborator(_) => PipelineStage::CollaboratorFailed,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipelineOptions {
    pub merge: MergeOptions,
    pub context_window: usize,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            merge: MergeOptions::default(),
            context_window: DEFAULT_CONTEXT_WINDOW,
        }
    }
}

/// Everything a successful run produces
#[derive(Debug, Clone)]
pub struct PipelineOutput {
    pub manifest: ClassificationManifest,
    pub merged: MergedDocument,
    pub footnote_index: Vec<FootnoteIndexEntry>,
    pub footnote_issues: Vec<FootnoteIssue>,
    pub review: Option<ReviewOutcome>,
    pub stages: Vec<PipelineStage>,
}

pub struct DocumentPipeline {
    classifier: Box<dyn ClassificationCollaborator>,
    reviewer: Option<Box<dyn ImageReviewCollaborator>>,
    options: PipelineOptions,
}

impl DocumentPipeline {
    pub fn new(classifier: impl ClassificationCollaborator + 'static) -> Self {
        Self {
            classifier: Box::new(classifier),
            reviewer: None,
            options: PipelineOptions::default(),
        }
    }

    pub fn with_image_review(mut self, reviewer: impl ImageReviewCollaborator + 'static) -> Self {
        self.reviewer = Some(Box::new(reviewer));
        self
    }

    pub fn with_options(mut self, options: PipelineOptions) -> Self {
        self.options = options;
        self
    }

    pub fn options(&self) -> &PipelineOptions {
        &self.options
    }

    /// Process one paginated source end to end
    pub fn run(
        &self,
        source_name: &str,
        source: impl Into<String>,
    ) -> Result<PipelineOutput, PipelineError> {
        self.run_inner(source_name, source.into()).map_err(|e| {
            tracing::error!(
                document = source_name,
                stage = ?PipelineStage::failed_with(&e),
                "Processing failed: {}",
                e
            );
            e
        })
    }

    fn run_inner(&self, source_name: &str, source: String) -> Result<PipelineOutput, PipelineError> {
        let mut stages = Vec::with_capacity(5);

        let document = Document::parse(source)?;
        enter(&mut stages, PipelineStage::Parsed, source_name);

        let budget = TokenBudget::estimate(&document, self.options.context_window);
        tracing::info!(
            document = source_name,
            pages = document.len(),
            tokens = budget.input_tokens,
            "Pass-1 input ~{:.1}% of context window",
            budget.usage_percent
        );
        if budget.is_near_limit() {
            tracing::warn!(
                document = source_name,
                "Pass-1 input is close to the context window"
            );
        }

        let proposal = self.classifier.classify(&document)?;
        enter(&mut stages, PipelineStage::Classified, source_name);

        let mut manifest = ManifestAssembler::new(&document).assemble(source_name, &proposal);
        tracing::info!(
            document = source_name,
            flagged = manifest.flagged_field_count(),
            review_requests = manifest.image_review_requests.len(),
            "Manifest verified"
        );
        enter(&mut stages, PipelineStage::Verified, source_name);

        let mut review = None;
        match &self.reviewer {
            Some(reviewer) if !manifest.image_review_requests.is_empty() => {
                let answers = reviewer.review(&document, &manifest.image_review_requests)?;
                review = Some(ReviewMerger::new(&document).apply(&mut manifest, &answers));
                enter(&mut stages, PipelineStage::ImageReviewed, source_name);
            }
            None if !manifest.image_review_requests.is_empty() => {
                tracing::info!(
                    document = source_name,
                    pages = manifest.image_review_requests.len(),
                    "Pages flagged for image review; no reviewer configured"
                );
            }
            _ => {}
        }

        let merged = merge_footnotes(&document, &manifest.footnotes, &self.options.merge);
        let footnote_index = build_footnote_index(&manifest.footnotes);
        let footnote_issues = validate_sequence(&manifest.footnotes);
        enter(&mut stages, PipelineStage::Merged, source_name);

        Ok(PipelineOutput {
            manifest,
            merged,
            footnote_index,
            footnote_issues,
            review,
            stages,
        })
    }
}

fn enter(stages: &mut Vec<PipelineStage>, stage: PipelineStage, source_name: &str) {
    tracing::info!(document = source_name, ?stage, "Stage complete");
    stages.push(stage);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CollaboratorError, DocumentFormatError};
    use filing_types::{
        ClassificationProposal, ImageReviewProposal, ImageReviewRequest, LocateRequest,
        PageProposal, PageType,
    };
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    struct Fixed(ClassificationProposal);

    impl ClassificationCollaborator for Fixed {
        fn classify(&self, _: &Document) -> Result<ClassificationProposal, CollaboratorError> {
            Ok(self.0.clone())
        }
    }

    struct Failing;

    impl ClassificationCollaborator for Failing {
        fn classify(&self, _: &Document) -> Result<ClassificationProposal, CollaboratorError> {
            Err(CollaboratorError::Timeout(30_000))
        }
    }

    struct CountingReviewer(Arc<AtomicUsize>);

    impl ImageReviewCollaborator for CountingReviewer {
        fn review(
            &self,
            _: &Document,
            _: &[ImageReviewRequest],
        ) -> Result<ImageReviewProposal, CollaboratorError> {
            self.0.fetch_add(1, Ordering::SeqCst);
            Ok(ImageReviewProposal::default())
        }
    }

    const SOURCE: &str =
        "---[Start PDF page 1]---\nNOTICE OF MOTION\n---[End PDF page 1]---\n";

    fn proposal(needs_review: bool) -> ClassificationProposal {
        let mut proposal = ClassificationProposal::default();
        proposal.caption.document_title = Some(LocateRequest::new("NOTICE OF MOTION", 1));
        proposal.pages = vec![PageProposal {
            page_number: 1,
            page_type: PageType::Caption,
            needs_image_review: needs_review,
            review_reason: None,
            question: String::new(),
            notes: String::new(),
        }];
        proposal
    }

    #[test]
    fn test_runs_all_stages() {
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = DocumentPipeline::new(Fixed(proposal(true)))
            .with_image_review(CountingReviewer(calls.clone()));
        let output = pipeline.run("doc.md", SOURCE).unwrap();

        assert_eq!(
            output.stages,
            vec![
                PipelineStage::Parsed,
                PipelineStage::Classified,
                PipelineStage::Verified,
                PipelineStage::ImageReviewed,
                PipelineStage::Merged,
            ]
        );
        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert!(output.manifest.image_review_completed);
        assert_eq!(output.merged.text, SOURCE);
    }

    #[test]
    fn test_reviewer_skipped_without_requests() {
        let calls = Arc::new(AtomicUsize::new(0));
        let pipeline = DocumentPipeline::new(Fixed(proposal(false)))
            .with_image_review(CountingReviewer(calls.clone()));
        let output = pipeline.run("doc.md", SOURCE).unwrap();

        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert!(!output.stages.contains(&PipelineStage::ImageReviewed));
        assert!(!output.manifest.image_review_completed);
    }

    #[test]
    fn test_format_error_is_fatal() {
        let pipeline = DocumentPipeline::new(Fixed(proposal(false)));
        let err = pipeline.run("doc.md", "no delimiters here").unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Format(DocumentFormatError::StrayContent { line: 1 })
        ));
        assert_eq!(PipelineStage::failed_with(&err), PipelineStage::FormatInvalid);
    }

    #[test]
    fn test_collaborator_error_is_fatal() {
        let err = DocumentPipeline::new(Failing).run("doc.md", SOURCE).unwrap_err();
        assert_eq!(
            PipelineStage::failed_with(&err),
            PipelineStage::CollaboratorFailed
        );
        assert!(PipelineStage::failed_with(&err).is_terminal());
    }
}
