//! Footnote merge engine
//!
//! Splices verified footnote text into the source right after its anchor.
//! The merge only ever inserts: every byte of the source, delimiters
//! included, survives in order, so removing the insertions gives back the
//! input exactly.

use std::collections::HashSet;

use filing_types::{ByteRange, ExceptionReason, FieldValue, FootnoteEntry, FootnoteException};
use serde::{Deserialize, Serialize};

use crate::document::Document;

/// Options for building inline markers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergeOptions {
    /// Marker prefix; `FN` gives `[FN3: ...]`
    pub marker_label: String,
}

impl Default for MergeOptions {
    fn default() -> Self {
        Self {
            marker_label: "FN".to_string(),
        }
    }
}

impl MergeOptions {
    pub fn marker(&self, footnote_number: u32, text: &str) -> String {
        format!("[{}{}: {}]", self.marker_label, footnote_number, text)
    }
}

/// One footnote placed in the merged text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedInsertion {
    pub footnote_number: u32,
    pub page_number: u32,
    /// Offset in the source the marker was inserted at
    pub source_offset: usize,
    /// Where the marker sits in the merged text
    pub merged_range: ByteRange,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MergedDocument {
    pub text: String,
    pub insertions: Vec<AppliedInsertion>,
    pub exceptions: Vec<FootnoteException>,
}

impl MergedDocument {
    /// The merged text with every marker cut back out
    pub fn without_insertions(&self) -> String {
        let mut output = String::with_capacity(self.text.len());
        let mut cursor = 0;
        for insertion in &self.insertions {
            output.push_str(&self.text[cursor..insertion.merged_range.start]);
            cursor = insertion.merged_range.end;
        }
        output.push_str(&self.text[cursor..]);
        output
    }
}

struct PendingInsertion {
    source_offset: usize,
    footnote_number: u32,
    page_number: u32,
    marker: String,
}

/// Merge verified footnotes into `document`.
///
/// Entries are taken in the order given, which is treated as appearance
/// order when deciding which of two same-numbered footnotes is the duplicate.
pub fn merge_footnotes(
    document: &Document,
    footnotes: &[FootnoteEntry],
    options: &MergeOptions,
) -> MergedDocument {
    let mut seen = HashSet::new();
    let mut pending = Vec::new();
    let mut exceptions = Vec::new();

    for entry in footnotes {
        let mut exclude = |reason: ExceptionReason| {
            tracing::warn!(
                footnote = entry.footnote_number,
                page = entry.page(),
                ?reason,
                "Footnote left out of merge"
            );
            exceptions.push(FootnoteException {
                footnote_number: entry.footnote_number,
                page: entry.page(),
                reason,
            });
        };

        if !seen.insert(entry.footnote_number) {
            exclude(ExceptionReason::DuplicateNumber);
            continue;
        }

        let anchor = match &entry.anchor {
            FieldValue::Verified(span) => span,
            FieldValue::Flagged(reason) => {
                exclude(ExceptionReason::AnchorUnverified {
                    reason: reason.clone(),
                });
                continue;
            }
        };
        let text = match &entry.text {
            FieldValue::Verified(span) => span,
            FieldValue::Flagged(reason) => {
                exclude(ExceptionReason::TextUnverified {
                    reason: reason.clone(),
                });
                continue;
            }
        };

        if anchor.page_number == text.page_number && anchor.byte_range.overlaps(&text.byte_range) {
            exclude(ExceptionReason::AnchorInsideText);
            continue;
        }

        let Some(page) = document.page(anchor.page_number) else {
            // spans only come from this document's pages
            exclude(ExceptionReason::AnchorUnverified {
                reason: filing_types::FlagReason::NotFound,
            });
            continue;
        };

        pending.push(PendingInsertion {
            source_offset: page.source_offset() + anchor.byte_range.end,
            footnote_number: entry.footnote_number,
            page_number: anchor.page_number,
            marker: options.marker(entry.footnote_number, &text.verbatim_text),
        });
    }

    pending.sort_by_key(|p| (p.source_offset, p.footnote_number));

    let source = document.source();
    let extra: usize = pending.iter().map(|p| p.marker.len()).sum();
    let mut text = String::with_capacity(source.len() + extra);
    let mut insertions = Vec::with_capacity(pending.len());
    let mut cursor = 0;

    for insertion in pending {
        text.push_str(&source[cursor..insertion.source_offset]);
        cursor = insertion.source_offset;

        let start = text.len();
        text.push_str(&insertion.marker);
        insertions.push(AppliedInsertion {
            footnote_number: insertion.footnote_number,
            page_number: insertion.page_number,
            source_offset: insertion.source_offset,
            merged_range: ByteRange::new(start, text.len()),
        });
    }
    text.push_str(&source[cursor..]);

    tracing::info!(
        merged = insertions.len(),
        exceptions = exceptions.len(),
        "Footnotes merged"
    );

    MergedDocument {
        text,
        insertions,
        exceptions,
    }
}
