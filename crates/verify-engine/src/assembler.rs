//! Classification manifest assembly
//!
//! Walks a Pass-1 proposal and routes every search-constrained field through
//! the locator. Classification data (page types, review flags, pass-through
//! caption strings, ranges) is copied as proposed.

use std::collections::btree_map::Entry;
use std::collections::{BTreeMap, BTreeSet};

use filing_types::{
    CaptionInfo, CauseOfAction, ClassificationManifest, ClassificationProposal, ExhibitEntry,
    FieldValue, FlagReason, FootnoteEntry, FootnoteProposal, ImageReviewRequest, LocateRequest,
    PageClassification, PageProposal, ReviewedValue, VerifiedSpan,
};

use crate::document::Document;
use crate::locator::Locator;
use crate::paragraphs;

/// Builds a `ClassificationManifest` from a proposal and the source document
pub struct ManifestAssembler<'a> {
    document: &'a Document,
    locator: Locator<'a>,
}

impl<'a> ManifestAssembler<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self {
            document,
            locator: Locator::new(document),
        }
    }

    pub fn assemble(
        &self,
        source_name: &str,
        proposal: &ClassificationProposal,
    ) -> ClassificationManifest {
        let pages = self.classify_pages(&proposal.pages);
        let image_review_requests = pages
            .iter()
            .filter(|p| p.needs_image_review)
            .map(|p| ImageReviewRequest {
                page_number: p.page_number,
                reason: p.review_reason,
                question: p.question.clone(),
            })
            .collect();

        let caption = &proposal.caption;
        let caption = CaptionInfo {
            document_title: self
                .resolve("document_title", caption.document_title.as_ref())
                .into(),
            filing_party: self
                .resolve("filing_party", caption.filing_party.as_ref())
                .into(),
            filing_date: self
                .resolve("filing_date", caption.filing_date.as_ref())
                .into(),
            court: caption.court.clone(),
            case_number: caption.case_number.clone(),
            named_plaintiffs: caption.named_plaintiffs.clone(),
            named_defendants: caption.named_defendants.clone(),
            filing_attorneys: caption.filing_attorneys.clone(),
            judge: caption.judge.clone(),
            department: caption.department.clone(),
            hearing_date: caption.hearing_date.clone(),
            hearing_time: caption.hearing_time.clone(),
        };

        let footnotes = proposal
            .footnotes
            .iter()
            .map(|fn_proposal| self.resolve_footnote(fn_proposal))
            .collect();

        let exhibits = proposal
            .exhibits
            .iter()
            .map(|exhibit| {
                let label = self.resolve("exhibit_label", exhibit.label.as_ref());
                // a verified label pins the exhibit's first page
                let first_page = label.page_number().or(exhibit.first_page).or_else(|| {
                    exhibit.label.as_ref().map(|l| l.page_hint)
                });
                let last_page = match (first_page, exhibit.last_page) {
                    (Some(first), Some(last)) if last < first => Some(first),
                    (_, last) => last,
                };
                ExhibitEntry {
                    title: exhibit
                        .title
                        .as_ref()
                        .map(|title| self.resolve("exhibit_title", Some(title))),
                    label: ReviewedValue::Text(label),
                    first_page,
                    last_page,
                }
            })
            .collect();

        let known_paragraphs = if proposal.causes_of_action.is_empty() {
            BTreeSet::new()
        } else {
            paragraphs::paragraph_numbers(self.document)
        };
        let causes_of_action = proposal
            .causes_of_action
            .iter()
            .map(|coa| {
                let (paragraphs_verified, missing_paragraphs) =
                    paragraphs::check_range(&known_paragraphs, coa.paragraph_range);
                CauseOfAction {
                    number: coa.number,
                    title: self.resolve("cause_of_action_title", coa.title.as_ref()),
                    paragraph_range: coa.paragraph_range,
                    page_range: coa.page_range,
                    incorporates_by_reference: coa.incorporates_by_reference,
                    paragraphs_verified,
                    missing_paragraphs,
                }
            })
            .collect();

        ClassificationManifest {
            document_id: self.document.document_id(),
            source_name: source_name.to_string(),
            total_pages: self.document.len(),
            document_type: proposal.document_type,
            caption,
            pages,
            footnotes,
            exhibits,
            causes_of_action,
            image_review_requests,
            image_review_completed: false,
        }
    }

    /// Resolve one search-constrained field. Missing or blank proposals are
    /// flagged without consulting the locator.
    pub fn resolve(
        &self,
        field: &str,
        request: Option<&LocateRequest>,
    ) -> FieldValue<VerifiedSpan> {
        let Some(request) = request.filter(|r| !r.search_text.trim().is_empty()) else {
            tracing::debug!(field, "No search text proposed");
            return FieldValue::Flagged(FlagReason::MissingProposal);
        };

        let value = self.locator.locate(request).into_field();
        if let FieldValue::Flagged(reason) = &value {
            tracing::warn!(
                field,
                page_hint = request.page_hint,
                search_text = %preview(&request.search_text),
                "Field flagged: {}",
                reason
            );
        }
        value
    }

    pub fn resolve_footnote(&self, proposal: &FootnoteProposal) -> FootnoteEntry {
        FootnoteEntry {
            footnote_number: proposal.footnote_number,
            anchor_request: proposal.anchor.clone(),
            text_request: proposal.text.clone(),
            anchor: self.resolve("footnote_anchor", proposal.anchor.as_ref()),
            text: self.resolve("footnote_text", proposal.text.as_ref()),
        }
    }

    fn classify_pages(&self, proposed: &[PageProposal]) -> Vec<PageClassification> {
        let mut by_number: BTreeMap<u32, &PageProposal> = BTreeMap::new();
        for page in proposed {
            if !self.document.contains_page(page.page_number) {
                tracing::warn!(page = page.page_number, "Proposal names a page the document lacks");
                continue;
            }
            match by_number.entry(page.page_number) {
                Entry::Vacant(slot) => {
                    slot.insert(page);
                }
                Entry::Occupied(_) => {
                    tracing::warn!(page = page.page_number, "Page classified twice; keeping the first");
                }
            }
        }

        self.document
            .pages()
            .iter()
            .map(|record| match by_number.get(&record.page_number()) {
                Some(p) => PageClassification {
                    page_number: p.page_number,
                    page_type: p.page_type,
                    needs_image_review: p.needs_image_review,
                    review_reason: p.review_reason,
                    question: p.question.clone(),
                    notes: p.notes.clone(),
                },
                None => PageClassification {
                    page_number: record.page_number(),
                    page_type: Default::default(),
                    needs_image_review: false,
                    review_reason: None,
                    question: String::new(),
                    notes: String::new(),
                },
            })
            .collect()
    }
}

/// First 80 chars of a proposal, for log lines
fn preview(text: &str) -> String {
    text.chars().take(80).collect()
}
