//! One-off locator checks against a document on disk

use anyhow::Context;
use filing_types::{LocateRequest, LocateResult};
use std::fs;
use std::path::Path;
use verify_engine::{locate, Document};

/// Locate `text` near `page` in the paginated Markdown file at `path`
pub fn locate_in_file(path: &Path, page: u32, text: &str) -> anyhow::Result<LocateResult> {
    let source = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let document = Document::parse(source)
        .with_context(|| format!("Invalid page delimiters in {}", path.display()))?;
    Ok(locate(&document, &LocateRequest::new(text, page)))
}

/// `locate_in_file` rendered as pretty JSON, as the `locate` command prints it
pub fn locate_json(path: &Path, page: u32, text: &str) -> anyhow::Result<String> {
    let result = locate_in_file(path, page, text)?;
    Ok(serde_json::to_string_pretty(&result)?)
}
