//! Collaborator proposal shapes
//!
//! Classification and image-review collaborators answer in JSON. Everything
//! here is a *proposal*: page types and flags are taken as given, but every
//! `LocateRequest` must be verified before its text is used.

use serde::{Deserialize, Serialize};

use crate::locate::LocateRequest;

/// Page category assigned by the classification collaborator
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PageType {
    Form,
    #[serde(alias = "pleading_first_page")]
    Caption,
    #[serde(alias = "table_of_contents")]
    Toc,
    #[serde(alias = "table_of_authorities")]
    Toa,
    ExhibitCover,
    #[serde(alias = "exhibit_content")]
    Exhibit,
    ProofOfService,
    #[default]
    PleadingBody,
    Footnote,
}

impl PageType {
    pub fn as_str(&self) -> &'static str {
        match self {
            PageType::Form => "form",
            PageType::Caption => "caption",
            PageType::Toc => "toc",
            PageType::Toa => "toa",
            PageType::ExhibitCover => "exhibit_cover",
            PageType::Exhibit => "exhibit",
            PageType::ProofOfService => "proof_of_service",
            PageType::PleadingBody => "pleading_body",
            PageType::Footnote => "footnote",
        }
    }

    pub fn is_exhibit(&self) -> bool {
        matches!(self, PageType::ExhibitCover | PageType::Exhibit)
    }
}

/// Overall filing type. Unknown values fall back to `Other`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentType {
    Complaint,
    Motion,
    Opposition,
    Reply,
    Brief,
    Declaration,
    Notice,
    Order,
    #[default]
    #[serde(other)]
    Other,
}

/// Why the collaborator wants to see a page image
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewReason {
    GarbledOcr,
    Handwritten,
    VisualElement,
    StampedDate,
    FootnoteUnclear,
    #[serde(other)]
    Other,
}

/// Inclusive range of paragraph or page numbers; `0..0` means none
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NumberRange {
    pub start: u32,
    pub end: u32,
}

impl NumberRange {
    pub fn new(start: u32, end: u32) -> Self {
        Self { start, end }
    }

    /// A range is usable only when both bounds are positive and ordered
    pub fn is_set(&self) -> bool {
        self.start > 0 && self.end >= self.start
    }
}

// ---------------------------------------------------------------------------
// Pass 1
// ---------------------------------------------------------------------------

/// Pass-1 classification proposal for a whole document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClassificationProposal {
    #[serde(default)]
    pub document_type: DocumentType,
    #[serde(default, alias = "caption_info")]
    pub caption: CaptionProposal,
    #[serde(default)]
    pub pages: Vec<PageProposal>,
    #[serde(default)]
    pub footnotes: Vec<FootnoteProposal>,
    #[serde(default)]
    pub exhibits: Vec<ExhibitProposal>,
    #[serde(default)]
    pub causes_of_action: Vec<CauseOfActionProposal>,
}

/// Caption fields. The first three are search-constrained; the rest are
/// passed through as the collaborator wrote them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CaptionProposal {
    pub document_title: Option<LocateRequest>,
    pub filing_party: Option<LocateRequest>,
    pub filing_date: Option<LocateRequest>,
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

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PageProposal {
    pub page_number: u32,
    #[serde(default, alias = "category")]
    pub page_type: PageType,
    #[serde(default)]
    pub needs_image_review: bool,
    #[serde(default)]
    pub review_reason: Option<ReviewReason>,
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub notes: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FootnoteProposal {
    #[serde(alias = "fn_number")]
    pub footnote_number: u32,
    /// Where the footnote marker sits in the body
    #[serde(default)]
    pub anchor: Option<LocateRequest>,
    /// Where the footnote's own text lives
    #[serde(default)]
    pub text: Option<LocateRequest>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExhibitProposal {
    #[serde(default)]
    pub label: Option<LocateRequest>,
    #[serde(default)]
    pub title: Option<LocateRequest>,
    #[serde(default)]
    pub first_page: Option<u32>,
    #[serde(default)]
    pub last_page: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CauseOfActionProposal {
    pub number: u32,
    #[serde(default, alias = "search_text")]
    pub title: Option<LocateRequest>,
    #[serde(default)]
    pub paragraph_range: NumberRange,
    #[serde(default)]
    pub page_range: NumberRange,
    #[serde(default)]
    pub incorporates_by_reference: NumberRange,
}

// ---------------------------------------------------------------------------
// Pass 2
// ---------------------------------------------------------------------------

/// Pass-2 image review answers, keyed by page
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageReviewProposal {
    #[serde(default)]
    pub answers: Vec<ImageReviewAnswer>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageReviewAnswer {
    pub page_number: u32,
    #[serde(default)]
    pub answer: String,
    #[serde(default)]
    pub updated_page_type: Option<PageType>,
    #[serde(default)]
    pub field_overrides: Vec<FieldOverride>,
    /// Corrected footnote locations; re-verified before use
    #[serde(default)]
    pub footnote_updates: Vec<FootnoteProposal>,
}

/// Fields an image review may supply a value for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReviewableField {
    DocumentTitle,
    FilingParty,
    FilingDate,
    ExhibitLabel,
}

/// Where an image-derived value came from
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VisualOrigin {
    Stamp,
    Handwritten,
    #[default]
    GarbledOcr,
}

impl VisualOrigin {
    /// Stamps and handwriting have no OCR text representation to verify against
    pub fn is_inherently_visual(&self) -> bool {
        matches!(self, VisualOrigin::Stamp | VisualOrigin::Handwritten)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldOverride {
    pub field: ReviewableField,
    pub value: String,
    #[serde(default)]
    pub origin: VisualOrigin,
}
