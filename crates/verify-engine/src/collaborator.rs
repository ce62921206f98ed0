//! External collaborator boundary
//!
//! The reasoning calls live outside this crate. A collaborator only ever
//! proposes; everything it returns passes through the locator before it
//! reaches a manifest.

use filing_types::{ClassificationProposal, ImageReviewProposal, ImageReviewRequest};
use serde::de::DeserializeOwned;

use crate::document::Document;
use crate::error::CollaboratorError;

/// Pass-1: classify every page and propose locations for text fields
pub trait ClassificationCollaborator: Send + Sync {
    fn classify(&self, document: &Document) -> Result<ClassificationProposal, CollaboratorError>;
}

/// Pass-2: answer questions about pages that need a look at the image
pub trait ImageReviewCollaborator: Send + Sync {
    fn review(
        &self,
        document: &Document,
        requests: &[ImageReviewRequest],
    ) -> Result<ImageReviewProposal, CollaboratorError>;
}

impl<T: ClassificationCollaborator + ?Sized> ClassificationCollaborator for Box<T> {
    fn classify(&self, document: &Document) -> Result<ClassificationProposal, CollaboratorError> {
        (**self).classify(document)
    }
}

impl<T: ImageReviewCollaborator + ?Sized> ImageReviewCollaborator for Box<T> {
    fn review(
        &self,
        document: &Document,
        requests: &[ImageReviewRequest],
    ) -> Result<ImageReviewProposal, CollaboratorError> {
        (**self).review(document, requests)
    }
}

/// Decode a collaborator's JSON reply. A surrounding Markdown code fence is
/// tolerated.
pub fn parse_response<T: DeserializeOwned>(content: &str) -> Result<T, CollaboratorError> {
    Ok(serde_json::from_str(strip_code_fence(content))?)
}

fn strip_code_fence(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // drop the info string ("json") on the opening line
    let body = rest.split_once('\n').map_or("", |(_, body)| body);
    body.trim_end().strip_suffix("```").unwrap_or(body).trim()
}

/// Rough token count at four characters per token
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count() / 4
}

/// Above this share of the context window a warning is logged
pub const TOKEN_WARNING_PERCENT: f64 = 80.0;

/// Estimated Pass-1 request size against a context window
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TokenBudget {
    pub input_tokens: usize,
    pub context_window: usize,
    pub usage_percent: f64,
}

impl TokenBudget {
    pub fn estimate(document: &Document, context_window: usize) -> Self {
        let input_tokens = estimate_tokens(&document.collaborator_text());
        let usage_percent = if context_window == 0 {
            100.0
        } else {
            input_tokens as f64 * 100.0 / context_window as f64
        };
        Self {
            input_tokens,
            context_window,
            usage_percent,
        }
    }

    pub fn is_near_limit(&self) -> bool {
        self.usage_percent > TOKEN_WARNING_PERCENT
    }
}
