//! Whitespace-normalized search index
//!
//! Every run of whitespace (line breaks included) collapses to one space and
//! leading/trailing runs are dropped. Each byte of the normalized text keeps
//! the raw byte offset it came from, so a match found in normalized text maps
//! back to the exact original substring.

use filing_types::ByteRange;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedText {
    text: String,
    /// Raw byte offset for every byte of `text`
    origins: Vec<usize>,
}

impl NormalizedText {
    pub fn build(raw: &str) -> Self {
        let mut text = String::with_capacity(raw.len());
        let mut origins = Vec::with_capacity(raw.len());
        let mut pending_space: Option<usize> = None;

        for (offset, ch) in raw.char_indices() {
            if ch.is_whitespace() {
                pending_space.get_or_insert(offset);
                continue;
            }

            if let Some(space_at) = pending_space.take() {
                if !text.is_empty() {
                    text.push(' ');
                    origins.push(space_at);
                }
            }

            let before = text.len();
            text.push(ch);
            origins.extend((0..text.len() - before).map(|i| offset + i));
        }

        debug_assert_eq!(text.len(), origins.len());
        Self { text, origins }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Start offsets of every occurrence of `needle`, overlapping ones included
    pub fn find_all(&self, needle: &str) -> Vec<usize> {
        let mut hits = Vec::new();
        if needle.is_empty() {
            return hits;
        }

        let mut from = 0;
        while let Some(pos) = self.text[from..].find(needle) {
            let at = from + pos;
            hits.push(at);
            let step = self.text[at..].chars().next().map_or(1, char::len_utf8);
            from = at + step;
        }
        hits
    }

    /// Raw byte range covered by the normalized range `start..end`.
    ///
    /// The range must be non-empty and must not begin or end on a collapsed
    /// space, which holds for any match of a normalized needle.
    pub fn raw_range(&self, start: usize, end: usize) -> ByteRange {
        debug_assert!(start < end && end <= self.origins.len());
        ByteRange::new(self.origins[start], self.origins[end - 1] + 1)
    }
}

/// Normalize a search string the same way pages are indexed
pub fn normalize(text: &str) -> String {
    NormalizedText::build(text).text
}
