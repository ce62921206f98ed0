use thiserror::Error;

/// Structural problems with the paginated input. Always fatal.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DocumentFormatError {
    #[error("line {line}: end delimiter for page {page} has no matching start")]
    UnmatchedEnd { line: usize, page: u32 },

    #[error("line {line}: end delimiter for page {found} closes page {open}")]
    MismatchedEnd { line: usize, open: u32, found: u32 },

    #[error("line {line}: page {page} starts while page {open} is still open")]
    NestedStart { line: usize, open: u32, page: u32 },

    #[error("page {page} is never closed")]
    Unterminated { page: u32 },

    #[error("line {line}: page number must be a positive integer")]
    InvalidPageNumber { line: usize },

    #[error("line {line}: page {page} does not follow page {previous}")]
    NonMonotonic { line: usize, previous: u32, page: u32 },

    #[error("line {line}: content outside any page delimiter pair")]
    StrayContent { line: usize },

    #[error("document contains no pages")]
    Empty,
}

/// Failure of an external collaborator call. Fatal for the document.
#[derive(Error, Debug)]
pub enum CollaboratorError {
    #[error("collaborator call failed: {0}")]
    CallFailed(String),

    #[error("collaborator timed out after {0} ms")]
    Timeout(u64),

    #[error("collaborator unavailable: {0}")]
    Unavailable(String),

    #[error("malformed collaborator response: {0}")]
    MalformedResponse(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Document-level pipeline failure
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    Format(#[from] DocumentFormatError),

    #[error(transparent)]
    Collaborator(#[from] CollaboratorError),
}

impl PipelineError {
    pub fn kind(&self) -> FatalKind {
        match self {
            PipelineError::Format(_) => FatalKind::DocumentFormat,
            PipelineError::Collaborator(_) => FatalKind::Collaborator,
        }
    }
}

/// Which fatal error stopped a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub enum FatalKind {
    #[serde(rename = "DocumentFormatError")]
    DocumentFormat,
    #[serde(rename = "CollaboratorError")]
    Collaborator,
}

impl std::fmt::Display for FatalKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FatalKind::DocumentFormat => write!(f, "DocumentFormatError"),
            FatalKind::Collaborator => write!(f, "CollaboratorError"),
        }
    }
}
