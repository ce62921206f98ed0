//! Footnote index and numbering checks

use std::collections::HashSet;

use filing_types::{FieldValue, FootnoteEntry, FootnoteIndexEntry, FootnoteIssue};

/// One line per footnote, ordered by footnote number
pub fn build_footnote_index(footnotes: &[FootnoteEntry]) -> Vec<FootnoteIndexEntry> {
    let mut index: Vec<FootnoteIndexEntry> = footnotes
        .iter()
        .map(|entry| FootnoteIndexEntry {
            footnote_number: entry.footnote_number,
            page: entry.page(),
            text: match &entry.text {
                FieldValue::Verified(span) => FieldValue::Verified(span.verbatim_text.clone()),
                FieldValue::Flagged(reason) => FieldValue::Flagged(reason.clone()),
            },
        })
        .collect();
    index.sort_by_key(|e| e.footnote_number);
    index
}

/// Check that footnotes run 1, 2, 3... in page order.
///
/// Issues are warnings only; nothing here changes the manifest.
pub fn validate_sequence(footnotes: &[FootnoteEntry]) -> Vec<FootnoteIssue> {
    let mut in_page_order: Vec<(u32, u32)> = footnotes
        .iter()
        .map(|f| (f.page(), f.footnote_number))
        .collect();
    in_page_order.sort_by_key(|(page, _)| *page);

    let mut issues = Vec::new();
    let mut seen = HashSet::new();
    let mut expected = 1;

    for (page, number) in in_page_order {
        if !seen.insert(number) {
            issues.push(FootnoteIssue::Duplicate {
                footnote_number: number,
                page,
            });
            continue;
        }

        if number > expected {
            issues.extend((expected..number).map(|missing| FootnoteIssue::Missing {
                footnote_number: missing,
                next_found: number,
                page,
            }));
        } else if number < expected {
            issues.push(FootnoteIssue::OutOfOrder {
                footnote_number: number,
                expected,
                page,
            });
        }
        expected = number + 1;
    }

    for issue in &issues {
        tracing::warn!("Footnote validation: {}", issue);
    }
    issues
}
