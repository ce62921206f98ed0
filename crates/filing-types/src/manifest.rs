//! Classification manifest and footnote output records
//!
//! The manifest is the verified counterpart of a `ClassificationProposal`:
//! classification data is carried over as proposed, every text-valued field is
//! a `FieldValue` or a `ReviewedValue`.

use serde::{Deserialize, Serialize};

use crate::locate::{FieldValue, FlagReason, LocateRequest, VerifiedSpan};
use crate::proposal::{DocumentType, NumberRange, PageType, ReviewReason, VisualOrigin};

/// Image-derived value. Never text-verified.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageValue {
    pub value: String,
    pub origin: VisualOrigin,
    pub page_number: u32,
}

/// A search-constrained field after optional image review
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "snake_case")]
pub enum ReviewedValue {
    /// Pass-1 outcome, untouched by image review
    Text(FieldValue<VerifiedSpan>),
    /// Image review supplied the value
    Image(ImageValue),
    /// Values disagree; all kept for manual resolution. `text` is the
    /// verified OCR span when Pass 1 found one.
    Conflict {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        text: Option<VerifiedSpan>,
        images: Vec<ImageValue>,
    },
}

/// Flat verification status used in reports and rows
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldStatus {
    Verified,
    Flagged,
    ImageSourced,
    NeedsManualResolution,
}

impl ReviewedValue {
    pub fn status(&self) -> FieldStatus {
        match self {
            ReviewedValue::Text(FieldValue::Verified(_)) => FieldStatus::Verified,
            ReviewedValue::Text(FieldValue::Flagged(_)) => FieldStatus::Flagged,
            ReviewedValue::Image(_) => FieldStatus::ImageSourced,
            ReviewedValue::Conflict { .. } => FieldStatus::NeedsManualResolution,
        }
    }

    pub fn is_flagged(&self) -> bool {
        self.status() == FieldStatus::Flagged
    }

    pub fn needs_manual_resolution(&self) -> bool {
        self.status() == FieldStatus::NeedsManualResolution
    }

    /// The value to show downstream. Conflicts have no single value.
    pub fn resolved_text(&self) -> Option<&str> {
        match self {
            ReviewedValue::Text(field) => field.text(),
            ReviewedValue::Image(image) => Some(image.value.as_str()),
            ReviewedValue::Conflict { .. } => None,
        }
    }
}

impl From<FieldValue<VerifiedSpan>> for ReviewedValue {
    fn from(field: FieldValue<VerifiedSpan>) -> Self {
        ReviewedValue::Text(field)
    }
}

fn field_status(field: &FieldValue<VerifiedSpan>) -> FieldStatus {
    match field {
        FieldValue::Verified(_) => FieldStatus::Verified,
        FieldValue::Flagged(_) => FieldStatus::Flagged,
    }
}

/// Caption metadata from the pleading's first page
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CaptionInfo {
    pub document_title: ReviewedValue,
    pub filing_party: ReviewedValue,
    pub filing_date: ReviewedValue,
    pub court: String,
    pub case_number: String,
    pub named_plaintiffs: String,
    pub named_defendants: String,
    pub filing_attorneys: String,
    pub judge: String,
    pub department: String,
    pub hearing_date: String,
    pub hearing_time: String,
}

impl CaptionInfo {
    fn reviewed_fields(&self) -> [&ReviewedValue; 3] {
        [&self.document_title, &self.filing_party, &self.filing_date]
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageClassification {
    pub page_number: u32,
    pub page_type: PageType,
    pub needs_image_review: bool,
    pub review_reason: Option<ReviewReason>,
    pub question: String,
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootnoteEntry {
    pub footnote_number: u32,
    pub anchor_request: Option<LocateRequest>,
    pub text_request: Option<LocateRequest>,
    pub anchor: FieldValue<VerifiedSpan>,
    pub text: FieldValue<VerifiedSpan>,
}

impl FootnoteEntry {
    pub fn is_verified(&self) -> bool {
        self.anchor.is_verified() && self.text.is_verified()
    }

    /// Best known page: verified locations first, then the proposed hints
    pub fn page(&self) -> u32 {
        self.text
            .page_number()
            .or_else(|| self.anchor.page_number())
            .or_else(|| self.text_request.as_ref().map(|r| r.page_hint))
            .or_else(|| self.anchor_request.as_ref().map(|r| r.page_hint))
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExhibitEntry {
    pub label: ReviewedValue,
    /// `None` when the collaborator proposed no title
    pub title: Option<FieldValue<VerifiedSpan>>,
    pub first_page: Option<u32>,
    pub last_page: Option<u32>,
}

impl ExhibitEntry {
    pub fn covers(&self, page_number: u32) -> bool {
        match (self.first_page, self.last_page) {
            (Some(first), Some(last)) => (first..=last).contains(&page_number),
            (Some(first), None) => first == page_number,
            _ => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CauseOfAction {
    pub number: u32,
    pub title: FieldValue<VerifiedSpan>,
    pub paragraph_range: NumberRange,
    pub page_range: NumberRange,
    pub incorporates_by_reference: NumberRange,
    /// Every paragraph in `paragraph_range` was found in the source
    pub paragraphs_verified: bool,
    pub missing_paragraphs: Vec<u32>,
}

/// A page the classification collaborator wants to see as an image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageReviewRequest {
    pub page_number: u32,
    pub reason: Option<ReviewReason>,
    pub question: String,
}

/// Verified classification of one document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClassificationManifest {
    pub document_id: String,
    pub source_name: String,
    pub total_pages: usize,
    pub document_type: DocumentType,
    pub caption: CaptionInfo,
    pub pages: Vec<PageClassification>,
    pub footnotes: Vec<FootnoteEntry>,
    pub exhibits: Vec<ExhibitEntry>,
    pub causes_of_action: Vec<CauseOfAction>,
    pub image_review_requests: Vec<ImageReviewRequest>,
    pub image_review_completed: bool,
}

impl ClassificationManifest {
    pub fn page(&self, page_number: u32) -> Option<&PageClassification> {
        self.pages.iter().find(|p| p.page_number == page_number)
    }

    /// Number of search-constrained fields left unpopulated
    pub fn flagged_field_count(&self) -> usize {
        let caption = self
            .caption
            .reviewed_fields()
            .iter()
            .filter(|f| f.is_flagged())
            .count();
        let footnotes: usize = self
            .footnotes
            .iter()
            .map(|f| f.anchor.is_flagged() as usize + f.text.is_flagged() as usize)
            .sum();
        let exhibits: usize = self
            .exhibits
            .iter()
            .map(|e| {
                e.label.is_flagged() as usize
                    + e.title.as_ref().map_or(0, |t| t.is_flagged() as usize)
            })
            .sum();
        let causes = self
            .causes_of_action
            .iter()
            .filter(|c| c.title.is_flagged())
            .count();
        caption + footnotes + exhibits + causes
    }

    /// Number of fields waiting on manual resolution after image review
    pub fn conflict_count(&self) -> usize {
        let caption = self
            .caption
            .reviewed_fields()
            .iter()
            .filter(|f| f.needs_manual_resolution())
            .count();
        let exhibits = self
            .exhibits
            .iter()
            .filter(|e| e.label.needs_manual_resolution())
            .count();
        caption + exhibits
    }

    /// Flatten into one output row per page
    pub fn page_rows(&self) -> Vec<PageRow> {
        self.pages
            .iter()
            .map(|page| {
                let exhibit = self
                    .exhibits
                    .iter()
                    .find(|e| e.covers(page.page_number));
                PageRow {
                    page_numbers: vec![page.page_number],
                    page_type: page.page_type,
                    document_title: self.caption.document_title.resolved_text().map(String::from),
                    document_title_status: self.caption.document_title.status(),
                    filing_party: self.caption.filing_party.resolved_text().map(String::from),
                    filing_party_status: self.caption.filing_party.status(),
                    filing_date: self.caption.filing_date.resolved_text().map(String::from),
                    filing_date_status: self.caption.filing_date.status(),
                    exhibit_label: exhibit
                        .and_then(|e| e.label.resolved_text())
                        .map(String::from),
                    exhibit_label_status: exhibit.map(|e| e.label.status()),
                    exhibit_title: exhibit
                        .and_then(|e| e.title.as_ref())
                        .and_then(|t| t.text())
                        .map(String::from),
                    exhibit_title_status: exhibit
                        .and_then(|e| e.title.as_ref())
                        .map(field_status),
                }
            })
            .collect()
    }
}

/// One flattened manifest row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageRow {
    pub page_numbers: Vec<u32>,
    pub page_type: PageType,
    pub document_title: Option<String>,
    pub document_title_status: FieldStatus,
    pub filing_party: Option<String>,
    pub filing_party_status: FieldStatus,
    pub filing_date: Option<String>,
    pub filing_date_status: FieldStatus,
    pub exhibit_label: Option<String>,
    pub exhibit_label_status: Option<FieldStatus>,
    pub exhibit_title: Option<String>,
    pub exhibit_title_status: Option<FieldStatus>,
}

// ---------------------------------------------------------------------------
// Footnote outputs
// ---------------------------------------------------------------------------

/// Footnote index line: verified text or the reason it is missing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootnoteIndexEntry {
    pub footnote_number: u32,
    pub page: u32,
    pub text: FieldValue<String>,
}

/// Numbering problem found in the footnote index
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum FootnoteIssue {
    Missing { footnote_number: u32, next_found: u32, page: u32 },
    OutOfOrder { footnote_number: u32, expected: u32, page: u32 },
    Duplicate { footnote_number: u32, page: u32 },
}

impl std::fmt::Display for FootnoteIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FootnoteIssue::Missing {
                footnote_number,
                next_found,
                page,
            } => write!(
                f,
                "missing footnote {} (gap before footnote {} on page {})",
                footnote_number, next_found, page
            ),
            FootnoteIssue::OutOfOrder {
                footnote_number,
                expected,
                page,
            } => write!(
                f,
                "footnote {} on page {} out of order (expected {})",
                footnote_number, page, expected
            ),
            FootnoteIssue::Duplicate {
                footnote_number,
                page,
            } => write!(f, "duplicate footnote {} on page {}", footnote_number, page),
        }
    }
}

/// Why a footnote was kept out of the merged body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExceptionReason {
    AnchorUnverified { reason: FlagReason },
    TextUnverified { reason: FlagReason },
    DuplicateNumber,
    AnchorInsideText,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FootnoteException {
    pub footnote_number: u32,
    pub page: u32,
    pub reason: ExceptionReason,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::locate::ByteRange;
    use pretty_assertions::assert_eq;

    fn span(page: u32, text: &str) -> VerifiedSpan {
        VerifiedSpan {
            page_number: page,
            byte_range: ByteRange::new(0, text.len()),
            verbatim_text: text.to_string(),
        }
    }

    fn flagged() -> ReviewedValue {
        ReviewedValue::Text(FieldValue::Flagged(FlagReason::NotFound))
    }

    fn manifest() -> ClassificationManifest {
        ClassificationManifest {
            document_id: "abc".into(),
            source_name: "doc.md".into(),
            total_pages: 3,
            document_type: DocumentType::Complaint,
            caption: CaptionInfo {
                document_title: ReviewedValue::Text(FieldValue::Verified(span(1, "COMPLAINT"))),
                filing_party: flagged(),
                filing_date: ReviewedValue::Image(ImageValue {
                    value: "June 1, 2020".into(),
                    origin: VisualOrigin::Stamp,
                    page_number: 1,
                }),
                court: String::new(),
                case_number: String::new(),
                named_plaintiffs: String::new(),
                named_defendants: String::new(),
                filing_attorneys: String::new(),
                judge: String::new(),
                department: String::new(),
                hearing_date: String::new(),
                hearing_time: String::new(),
            },
            pages: (1..=3)
                .map(|n| PageClassification {
                    page_number: n,
                    page_type: if n == 3 { PageType::ExhibitCover } else { PageType::PleadingBody },
                    needs_image_review: false,
                    review_reason: None,
                    question: String::new(),
                    notes: String::new(),
                })
                .collect(),
            footnotes: vec![FootnoteEntry {
                footnote_number: 1,
                anchor_request: Some(LocateRequest::new("terms.", 2)),
                text_request: Some(LocateRequest::new("See id.", 2)),
                anchor: FieldValue::Verified(span(2, "terms.")),
                text: FieldValue::Flagged(FlagReason::NotFound),
            }],
            exhibits: vec![ExhibitEntry {
                label: ReviewedValue::Conflict {
                    text: Some(span(3, "EXHIBIT A")),
                    images: vec![ImageValue {
                        value: "EXHIBIT B".into(),
                        origin: VisualOrigin::GarbledOcr,
                        page_number: 3,
                    }],
                },
                title: None,
                first_page: Some(3),
                last_page: Some(3),
            }],
            causes_of_action: vec![],
            image_review_requests: vec![],
            image_review_completed: true,
        }
    }

    #[test]
    fn test_flagged_and_conflict_counts() {
        let m = manifest();
        // filing_party + footnote text
        assert_eq!(m.flagged_field_count(), 2);
        assert_eq!(m.conflict_count(), 1);
    }

    #[test]
    fn test_page_rows_attach_exhibit_to_covered_pages() {
        let rows = manifest().page_rows();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[0].exhibit_label_status, None);
        assert_eq!(
            rows[2].exhibit_label_status,
            Some(FieldStatus::NeedsManualResolution)
        );
        assert_eq!(rows[2].exhibit_label, None);
        assert_eq!(rows[0].document_title.as_deref(), Some("COMPLAINT"));
        assert_eq!(rows[0].filing_date.as_deref(), Some("June 1, 2020"));
        assert_eq!(rows[0].filing_date_status, FieldStatus::ImageSourced);
    }

    #[test]
    fn test_footnote_page_prefers_verified_location() {
        let m = manifest();
        assert_eq!(m.footnotes[0].page(), 2);
        assert!(!m.footnotes[0].is_verified());
    }

    #[test]
    fn test_issue_display() {
        let issue = FootnoteIssue::Missing {
            footnote_number: 2,
            next_found: 3,
            page: 7,
        };
        assert_eq!(
            issue.to_string(),
            "missing footnote 2 (gap before footnote 3 on page 7)"
        );
    }
}
