//! Paginated source model
//!
//! OCR output arrives as a single Markdown stream with every page wrapped in
//! a delimiter pair:
//!
//! ```text
//! ---[Start PDF page 1]---
//! ...page text...
//! ---[End PDF page 1]---
//! ```
//!
//! `Document::parse` validates the delimiters and builds one `PageRecord` per
//! pair. The document is immutable once built and is the only source of text
//! the rest of the pipeline is allowed to trust.

use lazy_static::lazy_static;
use regex::Regex;
use sha2::{Digest, Sha256};

use crate::error::DocumentFormatError;
use crate::normalize::NormalizedText;

lazy_static! {
    static ref PAGE_START_RE: Regex = Regex::new(r"^---\[Start PDF page (\d+)\]---\s*$").unwrap();
    static ref PAGE_END_RE: Regex = Regex::new(r"^---\[End PDF page (\d+)\]---\s*$").unwrap();
}

/// Start delimiter line for `page_number`, without line terminator
pub fn start_delimiter(page_number: u32) -> String {
    format!("---[Start PDF page {}]---", page_number)
}

/// End delimiter line for `page_number`, without line terminator
pub fn end_delimiter(page_number: u32) -> String {
    format!("---[End PDF page {}]---", page_number)
}

/// One page of the source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRecord {
    page_number: u32,
    raw_text: String,
    source_offset: usize,
    normalized: NormalizedText,
}

impl PageRecord {
    fn new(page_number: u32, raw_text: &str, source_offset: usize) -> Self {
        Self {
            page_number,
            raw_text: raw_text.to_string(),
            source_offset,
            normalized: NormalizedText::build(raw_text),
        }
    }

    pub fn page_number(&self) -> u32 {
        self.page_number
    }

    /// Page content exactly as it appears between the delimiters
    pub fn raw_text(&self) -> &str {
        &self.raw_text
    }

    /// Byte offset of `raw_text` within the whole source
    pub fn source_offset(&self) -> usize {
        self.source_offset
    }

    pub fn normalized(&self) -> &NormalizedText {
        &self.normalized
    }

    pub fn normalized_text(&self) -> &str {
        self.normalized.as_str()
    }
}

/// Ordered, validated page sequence
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Document {
    source: String,
    pages: Vec<PageRecord>,
}

struct OpenPage {
    page_number: u32,
    content_start: usize,
}

impl Document {
    /// Parse a delimited page stream.
    ///
    /// # Errors
    /// Returns `DocumentFormatError` for unmatched or mismatched delimiters,
    /// non-increasing or non-positive page numbers, unterminated pages, input
    /// without pages, and any non-whitespace text outside a delimiter pair.
    pub fn parse(source: impl Into<String>) -> Result<Self, DocumentFormatError> {
        let source = source.into();
        let mut pages: Vec<PageRecord> = Vec::new();
        let mut open: Option<OpenPage> = None;
        let mut offset = 0;

        for (index, line) in source.split_inclusive('\n').enumerate() {
            let line_number = index + 1;
            let content = line.trim_end_matches(['\n', '\r']);

            if let Some(caps) = PAGE_START_RE.captures(content) {
                let page_number = parse_page_number(&caps[1], line_number)?;
                if let Some(current) = &open {
                    return Err(DocumentFormatError::NestedStart {
                        line: line_number,
                        open: current.page_number,
                        page: page_number,
                    });
                }
                if let Some(previous) = pages.last() {
                    if page_number <= previous.page_number {
                        return Err(DocumentFormatError::NonMonotonic {
                            line: line_number,
                            previous: previous.page_number,
                            page: page_number,
                        });
                    }
                }
                open = Some(OpenPage {
                    page_number,
                    content_start: offset + line.len(),
                });
            } else if let Some(caps) = PAGE_END_RE.captures(content) {
                let page_number = parse_page_number(&caps[1], line_number)?;
                let current = open.take().ok_or(DocumentFormatError::UnmatchedEnd {
                    line: line_number,
                    page: page_number,
                })?;
                if current.page_number != page_number {
                    return Err(DocumentFormatError::MismatchedEnd {
                        line: line_number,
                        open: current.page_number,
                        found: page_number,
                    });
                }
                let raw = &source[current.content_start..offset];
                pages.push(PageRecord::new(page_number, raw, current.content_start));
            } else if open.is_none() && !content.trim().is_empty() {
                return Err(DocumentFormatError::StrayContent { line: line_number });
            }

            offset += line.len();
        }

        if let Some(current) = open {
            return Err(DocumentFormatError::Unterminated {
                page: current.page_number,
            });
        }
        if pages.is_empty() {
            return Err(DocumentFormatError::Empty);
        }

        tracing::debug!("Parsed {} pages", pages.len());
        Ok(Self { source, pages })
    }

    /// The complete input, delimiters included
    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn pages(&self) -> &[PageRecord] {
        &self.pages
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    pub fn page(&self, page_number: u32) -> Option<&PageRecord> {
        self.pages
            .binary_search_by_key(&page_number, |p| p.page_number)
            .ok()
            .map(|i| &self.pages[i])
    }

    pub fn contains_page(&self, page_number: u32) -> bool {
        self.page(page_number).is_some()
    }

    /// Pages numbered within `page_number ± window`, excluding `page_number`
    /// itself, in page order
    pub fn neighbors(&self, page_number: u32, window: u32) -> impl Iterator<Item = &PageRecord> {
        let low = page_number.saturating_sub(window);
        let high = page_number.saturating_add(window);
        self.pages.iter().filter(move |p| {
            p.page_number != page_number && p.page_number >= low && p.page_number <= high
        })
    }

    /// Stable id: first 12 hex chars of the SHA-256 of the source
    pub fn document_id(&self) -> String {
        let digest = Sha256::digest(self.source.as_bytes());
        hex::encode(digest)[..12].to_string()
    }

    /// Normalized text of every page behind `=== PAGE N ===` headers, the form
    /// handed to the classification collaborator
    pub fn collaborator_text(&self) -> String {
        let mut output = String::new();
        for page in &self.pages {
            output.push_str(&format!("=== PAGE {} ===\n", page.page_number));
            output.push_str(page.normalized_text());
            output.push_str("\n\n");
        }
        output
    }
}

fn parse_page_number(digits: &str, line: usize) -> Result<u32, DocumentFormatError> {
    match digits.parse::<u32>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(DocumentFormatError::InvalidPageNumber { line }),
    }
}
