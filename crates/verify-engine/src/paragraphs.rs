//! Numbered paragraph detection for cause-of-action ranges

use std::collections::BTreeSet;

use filing_types::NumberRange;
use lazy_static::lazy_static;
use regex::Regex;

use crate::document::Document;

lazy_static! {
    // "12. The parties..." or "¶ 12. ..."
    static ref PARAGRAPH_NUM_RE: Regex = Regex::new(r"(?m)^[ \t]*(?:¶[ \t]*)?(\d+)\.\s").unwrap();
}

/// Ranges wider than this are treated as unusable rather than enumerated
pub const MAX_PARAGRAPH_SPAN: u32 = 5_000;

/// Every paragraph number that opens a line anywhere in the document
pub fn paragraph_numbers(document: &Document) -> BTreeSet<u32> {
    document
        .pages()
        .iter()
        .flat_map(|page| {
            PARAGRAPH_NUM_RE
                .captures_iter(page.raw_text())
                .filter_map(|caps| caps[1].parse::<u32>().ok())
                .collect::<Vec<_>>()
        })
        .collect()
}

/// Check a paragraph range against the numbers found in the source.
///
/// Returns whether the whole range is present and which numbers are missing.
pub fn check_range(found: &BTreeSet<u32>, range: NumberRange) -> (bool, Vec<u32>) {
    if !range.is_set() {
        return (false, Vec::new());
    }
    if range.end - range.start > MAX_PARAGRAPH_SPAN {
        tracing::warn!(
            start = range.start,
            end = range.end,
            "Paragraph range too wide to check"
        );
        return (false, Vec::new());
    }

    let missing: Vec<u32> = (range.start..=range.end)
        .filter(|n| !found.contains(n))
        .collect();
    (missing.is_empty(), missing)
}
