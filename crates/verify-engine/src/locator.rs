//! Locator verification engine
//!
//! Resolves a collaborator's `{search_text, page_hint}` into a span of the
//! source or a failure. Matching is exact after whitespace normalization and
//! case-sensitive. The hinted page is searched first; only when it has no
//! match are the pages within `NEIGHBOR_WINDOW` searched, which absorbs OCR
//! page-boundary slippage. Multiple candidates are never resolved by picking
//! one.
//!
//! The returned text is always sliced from the page's raw text at the range
//! the engine found. Nothing the collaborator wrote reaches the output.

use filing_types::{LocateRequest, LocateResult, VerifiedSpan};

use crate::document::{Document, PageRecord};
use crate::normalize::normalize;

/// How far from the hinted page a match may be found
pub const NEIGHBOR_WINDOW: u32 = 1;

/// Verifies proposed locations against one document
#[derive(Debug, Clone, Copy)]
pub struct Locator<'a> {
    document: &'a Document,
}

impl<'a> Locator<'a> {
    pub fn new(document: &'a Document) -> Self {
        Self { document }
    }

    pub fn document(&self) -> &'a Document {
        self.document
    }

    pub fn locate(&self, request: &LocateRequest) -> LocateResult {
        let needle = normalize(&request.search_text);
        if needle.is_empty() {
            return LocateResult::NotFound;
        }

        if let Some(page) = self.document.page(request.page_hint) {
            let hits = page.normalized().find_all(&needle);
            match hits.as_slice() {
                [] => {}
                [at] => return verified(page, *at, needle.len()),
                _ => {
                    tracing::debug!(
                        page = request.page_hint,
                        candidates = hits.len(),
                        "Ambiguous match on hinted page"
                    );
                    return LocateResult::Ambiguous {
                        candidate_count: hits.len(),
                    };
                }
            }
        }

        let candidates: Vec<(&PageRecord, usize)> = self
            .document
            .neighbors(request.page_hint, NEIGHBOR_WINDOW)
            .flat_map(|page| {
                page.normalized()
                    .find_all(&needle)
                    .into_iter()
                    .map(move |at| (page, at))
            })
            .collect();

        match candidates.as_slice() {
            [] => LocateResult::NotFound,
            [(page, at)] => {
                tracing::debug!(
                    hint = request.page_hint,
                    found = page.page_number(),
                    "Matched on neighboring page"
                );
                verified(page, *at, needle.len())
            }
            _ => LocateResult::Ambiguous {
                candidate_count: candidates.len(),
            },
        }
    }
}

/// Verify one request against `document`
pub fn locate(document: &Document, request: &LocateRequest) -> LocateResult {
    Locator::new(document).locate(request)
}

fn verified(page: &PageRecord, at: usize, len: usize) -> LocateResult {
    let byte_range = page.normalized().raw_range(at, at + len);
    LocateResult::Verified(VerifiedSpan {
        page_number: page.page_number(),
        byte_range,
        verbatim_text: page.raw_text()[byte_range.start..byte_range.end].to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::{end_delimiter, start_delimiter};
    use pretty_assertions::assert_eq;

    fn doc(pages: &[(u32, &str)]) -> Document {
        let src: String = pages
            .iter()
            .map(|(n, text)| format!("{}\n{}\n{}\n", start_delimiter(*n), text, end_delimiter(*n)))
            .collect();
        Document::parse(src).unwrap()
    }

    const TAJP: &str = "On May 21, 2018, Defendants limited the number of days a retired judge can participate in\nthe TAJP to 1,320-service days.";

    fn tajp_document() -> Document {
        let mut pages: Vec<(u32, &str)> = (1..=12).map(|n| (n, "Filler text for this page.")).collect();
        pages[8] = (9, "11. Background.\nOn May 21, 2018, Defendants limited the number of days a retired judge can participate in\nthe TAJP to 1,320-service days. This was new.");
        doc(&pages)
    }

    #[test]
    fn test_verifies_across_line_break() {
        let document = tajp_document();
        let request = LocateRequest::new(
            "On May 21, 2018, Defendants limited the number of days a retired judge can participate in the TAJP to 1,320-service days.",
            9,
        );
        let LocateResult::Verified(span) = locate(&document, &request) else {
            panic!("expected verified");
        };
        assert_eq!(span.page_number, 9);
        assert_eq!(span.verbatim_text, TAJP);
        let raw = document.page(9).unwrap().raw_text();
        assert_eq!(&raw[span.byte_range.start..span.byte_range.end], TAJP);
        assert_eq!(span.byte_range.start, "11. Background.\n".len());
    }

    #[test]
    fn test_hint_two_pages_away_is_not_found() {
        let document = tajp_document();
        let request = LocateRequest::new(
            "On May 21, 2018, Defendants limited the number of days a retired judge can participate in the TAJP to 1,320-service days.",
            11,
        );
        assert_eq!(locate(&document, &request), LocateResult::NotFound);
    }

    #[test]
    fn test_hint_one_page_off_verifies_on_neighbor() {
        let document = tajp_document();
        for hint in [8, 10] {
            let request = LocateRequest::new("the TAJP to 1,320-service days.", hint);
            let result = locate(&document, &request);
            assert!(
                matches!(&result, LocateResult::Verified(span) if span.page_number == 9),
                "hint {} gave {:?}",
                hint,
                result
            );
        }
    }

    #[test]
    fn test_duplicate_on_hinted_page_is_ambiguous() {
        let document = doc(&[(1, "See id. at 4. See id. at 4.")]);
        let result = locate(&document, &LocateRequest::new("See id. at 4.", 1));
        assert_eq!(result, LocateResult::Ambiguous { candidate_count: 2 });
    }

    #[test]
    fn test_hinted_page_wins_over_neighbors() {
        let document = doc(&[(1, "EXHIBIT A"), (2, "EXHIBIT A"), (3, "EXHIBIT A")]);
        let result = locate(&document, &LocateRequest::new("EXHIBIT A", 2));
        assert!(matches!(result, LocateResult::Verified(span) if span.page_number == 2));
    }

    #[test]
    fn test_matches_on_both_neighbors_are_ambiguous() {
        let document = doc(&[(1, "EXHIBIT A"), (2, "nothing"), (3, "EXHIBIT A")]);
        let result = locate(&document, &LocateRequest::new("EXHIBIT A", 2));
        assert_eq!(result, LocateResult::Ambiguous { candidate_count: 2 });
    }

    #[test]
    fn test_matching_is_case_sensitive() {
        let document = doc(&[(1, "MOTION TO DISMISS")]);
        let result = locate(&document, &LocateRequest::new("Motion to Dismiss", 1));
        assert_eq!(result, LocateResult::NotFound);
    }

    #[test]
    fn test_empty_search_text_is_not_found() {
        let document = doc(&[(1, "text")]);
        assert_eq!(
            locate(&document, &LocateRequest::new(" \n ", 1)),
            LocateResult::NotFound
        );
    }

    #[test]
    fn test_missing_hint_page_still_searches_neighbors() {
        let document = doc(&[(1, "alpha"), (2, "beta")]);
        let result = locate(&document, &LocateRequest::new("beta", 3));
        assert!(matches!(result, LocateResult::Verified(span) if span.page_number == 2));
    }
}
