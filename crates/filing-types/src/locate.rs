//! Location requests and their verified outcomes
//!
//! A collaborator proposes *where* a piece of text lives. These types carry
//! that proposal into the locator and carry the verified result back out.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// A proposed location: the text the collaborator claims exists, and the page
/// it claims to have seen it on.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocateRequest {
    pub search_text: String,
    #[serde(alias = "page")]
    pub page_hint: u32,
}

impl LocateRequest {
    pub fn new(search_text: impl Into<String>, page_hint: u32) -> Self {
        Self {
            search_text: search_text.into(),
            page_hint,
        }
    }
}

/// Half-open byte range into a page's raw text
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ByteRange {
    pub start: usize,
    pub end: usize,
}

impl ByteRange {
    pub fn new(start: usize, end: usize) -> Self {
        debug_assert!(start <= end);
        Self { start, end }
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// True if `other` lies entirely within this range
    pub fn contains(&self, other: &ByteRange) -> bool {
        self.start <= other.start && other.end <= self.end
    }

    pub fn overlaps(&self, other: &ByteRange) -> bool {
        self.start < other.end && other.start < self.end
    }
}

/// Text the locator found in the source, sliced from the page's raw text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedSpan {
    pub page_number: u32,
    pub byte_range: ByteRange,
    pub verbatim_text: String,
}

/// Outcome of a single locate call
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum LocateResult {
    Verified(VerifiedSpan),
    NotFound,
    Ambiguous { candidate_count: usize },
}

impl LocateResult {
    pub fn is_verified(&self) -> bool {
        matches!(self, LocateResult::Verified(_))
    }

    pub fn into_field(self) -> FieldValue<VerifiedSpan> {
        match self {
            LocateResult::Verified(span) => FieldValue::Verified(span),
            LocateResult::NotFound => FieldValue::Flagged(FlagReason::NotFound),
            LocateResult::Ambiguous { candidate_count } => {
                FieldValue::Flagged(FlagReason::Ambiguous { candidate_count })
            }
        }
    }
}

/// Why a search-constrained field was left unpopulated
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum FlagReason {
    #[error("search text not found on the hinted page or its neighbors")]
    NotFound,

    #[error("search text matched {candidate_count} locations")]
    Ambiguous { candidate_count: usize },

    #[error("collaborator did not propose a search text")]
    MissingProposal,
}

/// A search-constrained value: either verified against the source or flagged.
/// A flagged field never carries a guess.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum FieldValue<T> {
    Verified(T),
    Flagged(FlagReason),
}

impl<T> FieldValue<T> {
    pub fn is_verified(&self) -> bool {
        matches!(self, FieldValue::Verified(_))
    }

    pub fn is_flagged(&self) -> bool {
        matches!(self, FieldValue::Flagged(_))
    }

    pub fn verified(&self) -> Option<&T> {
        match self {
            FieldValue::Verified(value) => Some(value),
            FieldValue::Flagged(_) => None,
        }
    }

    pub fn flag_reason(&self) -> Option<&FlagReason> {
        match self {
            FieldValue::Verified(_) => None,
            FieldValue::Flagged(reason) => Some(reason),
        }
    }
}

impl FieldValue<VerifiedSpan> {
    /// Verified text, if any
    pub fn text(&self) -> Option<&str> {
        self.verified().map(|span| span.verbatim_text.as_str())
    }

    pub fn page_number(&self) -> Option<u32> {
        self.verified().map(|span| span.page_number)
    }
}
