//! Pass-2 image review merge policy
//!
//! Reconciles image-derived answers for flagged pages with Pass-1 values:
//!
//! - stamps and handwriting have no OCR text, so the image value wins
//!   over Pass-1 text
//! - a verified text value that the image disagrees with becomes a
//!   `Conflict` holding both, for manual resolution
//! - a flagged text value is replaced by the image value, tagged as such
//! - once a field holds an image value or a conflict, later disagreeing
//!   answers only add to the conflict
//!
//! Footnote corrections are locations, not text: they go back through the
//! locator and can only fill a flagged half.

use std::collections::BTreeSet;

use filing_types::{
    ClassificationManifest, FieldOverride, FieldValue, FootnoteEntry, ImageReviewAnswer,
    ImageReviewProposal, ImageValue, ReviewableField, ReviewedValue,
};

use crate::assembler::ManifestAssembler;
use crate::document::Document;
use crate::normalize::normalize;

/// What the merge changed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReviewOutcome {
    pub answers_applied: usize,
    pub fields_updated: usize,
    pub conflicts: usize,
    pub page_types_updated: usize,
    pub footnotes_updated: usize,
    /// Answers for pages that were never flagged for review
    pub ignored_pages: Vec<u32>,
}

/// Reconcile one field with an image-derived value.
///
/// A `Conflict` is never cleared: a value that agrees with one already held
/// leaves it unchanged, a new one is appended. Two differing image values
/// become a `Conflict` rather than one replacing the other.
pub fn reconcile(current: &ReviewedValue, image: ImageValue) -> ReviewedValue {
    match current {
        ReviewedValue::Text(FieldValue::Flagged(_)) => ReviewedValue::Image(image),
        ReviewedValue::Text(FieldValue::Verified(_)) if image.origin.is_inherently_visual() => {
            ReviewedValue::Image(image)
        }
        ReviewedValue::Text(FieldValue::Verified(span)) => {
            if agrees(&span.verbatim_text, &image.value) {
                current.clone()
            } else {
                ReviewedValue::Conflict {
                    text: Some(span.clone()),
                    images: vec![image],
                }
            }
        }
        ReviewedValue::Image(existing) => {
            if !agrees(&existing.value, &image.value) {
                ReviewedValue::Conflict {
                    text: None,
                    images: vec![existing.clone(), image],
                }
            } else if image.origin.is_inherently_visual() && !existing.origin.is_inherently_visual()
            {
                ReviewedValue::Image(image)
            } else {
                current.clone()
            }
        }
        ReviewedValue::Conflict { text, images } => {
            let known = text
                .iter()
                .map(|span| span.verbatim_text.as_str())
                .chain(images.iter().map(|i| i.value.as_str()))
                .any(|value| agrees(value, &image.value));
            if known {
                return current.clone();
            }
            let mut images = images.clone();
            images.push(image);
            ReviewedValue::Conflict {
                text: text.clone(),
                images,
            }
        }
    }
}

fn agrees(a: &str, b: &str) -> bool {
    normalize(a) == normalize(b)
}

/// Applies an `ImageReviewProposal` to a manifest
pub struct ReviewMerger<'a> {
    document: &'a Document,
}

impl<'a> ReviewMerger<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    pub fn apply(
        &self,
        manifest: &mut ClassificationManifest,
        proposal: &ImageReviewProposal,
    ) -> ReviewOutcome {
        let flagged: BTreeSet<u32> = manifest
            .image_review_requests
            .iter()
            .map(|r| r.page_number)
            .collect();
        let mut outcome = ReviewOutcome::default();

        for answer in &proposal.answers {
            if !flagged.contains(&answer.page_number) {
                tracing::warn!(
                    page = answer.page_number,
                    "Ignoring image review answer for a page that was not flagged"
                );
                outcome.ignored_pages.push(answer.page_number);
                continue;
            }
            self.apply_answer(manifest, answer, &mut outcome);
            outcome.answers_applied += 1;
        }

        manifest.image_review_completed = true;
        outcome.conflicts = manifest.conflict_count();
        tracing::info!(
            answers = outcome.answers_applied,
            fields = outcome.fields_updated,
            conflicts = outcome.conflicts,
            "Image review merged"
        );
        outcome
    }

    fn apply_answer(
        &self,
        manifest: &mut ClassificationManifest,
        answer: &ImageReviewAnswer,
        outcome: &mut ReviewOutcome,
    ) {
        let page_number = answer.page_number;

        if let Some(page_type) = answer.updated_page_type {
            if let Some(page) = manifest
                .pages
                .iter_mut()
                .find(|p| p.page_number == page_number)
            {
                if page.page_type != page_type {
                    tracing::info!(
                        page = page_number,
                        from = page.page_type.as_str(),
                        to = page_type.as_str(),
                        "Image review reclassified page"
                    );
                    page.page_type = page_type;
                    outcome.page_types_updated += 1;
                }
            }
        }

        for field_override in &answer.field_overrides {
            if field_override.value.trim().is_empty() {
                continue;
            }
            let updated = apply_override(manifest, page_number, field_override);
            if updated == 0 {
                tracing::warn!(
                    page = page_number,
                    field = ?field_override.field,
                    "Image review override matched no field"
                );
            }
            outcome.fields_updated += updated;
        }

        if !answer.footnote_updates.is_empty() {
            let assembler = ManifestAssembler::new(self.document);
            for update in &answer.footnote_updates {
                let resolved = assembler.resolve_footnote(update);
                if merge_footnote(&mut manifest.footnotes, resolved) {
                    outcome.footnotes_updated += 1;
                }
            }
        }
    }
}

/// Apply one override; returns how many fields it touched
fn apply_override(
    manifest: &mut ClassificationManifest,
    page_number: u32,
    field_override: &FieldOverride,
) -> usize {
    let image = ImageValue {
        value: field_override.value.clone(),
        origin: field_override.origin,
        page_number,
    };

    let caption = &mut manifest.caption;
    let target = match field_override.field {
        ReviewableField::DocumentTitle => &mut caption.document_title,
        ReviewableField::FilingParty => &mut caption.filing_party,
        ReviewableField::FilingDate => &mut caption.filing_date,
        ReviewableField::ExhibitLabel => {
            let mut touched = 0;
            for exhibit in manifest
                .exhibits
                .iter_mut()
                .filter(|e| e.covers(page_number))
            {
                exhibit.label = reconcile(&exhibit.label, image.clone());
                touched += 1;
            }
            return touched;
        }
    };
    *target = reconcile(target, image);
    1
}

/// Fold a re-verified footnote into the list. Verified halves are kept;
/// flagged halves take the new result. Unknown numbers are appended.
fn merge_footnote(footnotes: &mut Vec<FootnoteEntry>, update: FootnoteEntry) -> bool {
    let Some(index) = footnotes
        .iter()
        .position(|f| f.footnote_number == update.footnote_number)
    else {
        tracing::info!(
            footnote = update.footnote_number,
            "Image review added a footnote"
        );
        footnotes.push(update);
        return true;
    };

    let existing = &mut footnotes[index];
    let mut changed = false;
    if existing.anchor.is_flagged() && update.anchor.is_verified() {
        existing.anchor = update.anchor;
        existing.anchor_request = update.anchor_request;
        changed = true;
    }
    if existing.text.is_flagged() && update.text.is_verified() {
        existing.text = update.text;
        existing.text_request = update.text_request;
        changed = true;
    }
    changed
}
