//! File-backed collaborators
//!
//! Proposals are produced out of band and dropped next to the input as
//! `<stem>_classification.json` and, when image review ran,
//! `<stem>_image_review.json`.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use filing_types::{ClassificationProposal, ImageReviewProposal, ImageReviewRequest};
use verify_engine::{
    parse_response, ClassificationCollaborator, CollaboratorError, Document,
    ImageReviewCollaborator,
};

use crate::config::CollaboratorConfig;

/// Locations of the proposal files for one input
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProposalPaths {
    pub classification: PathBuf,
    pub image_review: PathBuf,
}

impl ProposalPaths {
    pub fn for_input(input: &Path, config: &CollaboratorConfig) -> Self {
        let dir = config
            .proposal_dir
            .clone()
            .or_else(|| input.parent().map(Path::to_path_buf))
            .unwrap_or_default();
        let stem = input
            .file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            classification: dir.join(format!("{}{}", stem, config.classification_suffix)),
            image_review: dir.join(format!("{}{}", stem, config.image_review_suffix)),
        }
    }
}

fn read_proposal(path: &Path) -> Result<String, CollaboratorError> {
    fs::read_to_string(path).map_err(|e| match e.kind() {
        ErrorKind::NotFound => {
            CollaboratorError::Unavailable(format!("no proposal at {}", path.display()))
        }
        _ => CollaboratorError::Io(e),
    })
}

/// Pass-1 proposal read from disk
#[derive(Debug, Clone)]
pub struct FileClassifier {
    path: PathBuf,
}

impl FileClassifier {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ClassificationCollaborator for FileClassifier {
    fn classify(&self, document: &Document) -> Result<ClassificationProposal, CollaboratorError> {
        tracing::debug!(
            path = %self.path.display(),
            pages = document.len(),
            "Reading classification proposal"
        );
        parse_response(&read_proposal(&self.path)?)
    }
}

/// Pass-2 answers read from disk
#[derive(Debug, Clone)]
pub struct FileImageReviewer {
    path: PathBuf,
}

impl FileImageReviewer {
    /// `None` when no review file exists for this input
    pub fn if_present(path: impl Into<PathBuf>) -> Option<Self> {
        let path = path.into();
        path.is_file().then_some(Self { path })
    }
}

impl ImageReviewCollaborator for FileImageReviewer {
    fn review(
        &self,
        _document: &Document,
        requests: &[ImageReviewRequest],
    ) -> Result<ImageReviewProposal, CollaboratorError> {
        tracing::debug!(
            path = %self.path.display(),
            requests = requests.len(),
            "Reading image review answers"
        );
        parse_response(&read_proposal(&self.path)?)
    }
}
