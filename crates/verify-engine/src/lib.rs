//! Location-then-verify engine for OCR'd legal filings
//!
//! A reasoning collaborator proposes where things are; this crate checks.
//! It provides:
//! - Paginated source parsing with a normalized search index per page
//! - The locator, which turns `{search_text, page_hint}` into a verbatim span
//!   or a flag
//! - Manifest assembly and Pass-2 image review reconciliation
//! - Footnote merging, indexing and sequence checks
//! - A per-document pipeline driver with summaries

pub mod assembler;
pub mod collaborator;
pub mod document;
pub mod error;
pub mod footnote_index;
pub mod footnotes;
pub mod locator;
pub mod normalize;
pub mod paragraphs;
pub mod pipeline;
pub mod review;
pub mod summary;

pub use assembler::ManifestAssembler;
pub use collaborator::{
    estimate_tokens, parse_response, ClassificationCollaborator, ImageReviewCollaborator,
    TokenBudget,
};
pub use document::{end_delimiter, start_delimiter, Document, PageRecord};
pub use error::{CollaboratorError, DocumentFormatError, FatalKind, PipelineError};
pub use footnote_index::{build_footnote_index, validate_sequence};
pub use footnotes::{merge_footnotes, AppliedInsertion, MergeOptions, MergedDocument};
pub use locator::{locate, Locator, NEIGHBOR_WINDOW};
pub use normalize::{normalize, NormalizedText};
pub use pipeline::{DocumentPipeline, PipelineOptions, PipelineOutput, PipelineStage};
pub use review::{reconcile, ReviewMerger, ReviewOutcome};
pub use summary::{DocumentOutcome, DocumentSummary};

/// Apply a Pass-2 proposal to `manifest` in place
pub fn apply_image_review(
    manifest: &mut filing_types::ClassificationManifest,
    document: &Document,
    proposal: &filing_types::ImageReviewProposal,
) -> ReviewOutcome {
    ReviewMerger::new(document).apply(manifest, proposal)
}
