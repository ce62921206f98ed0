//! Per-document outcome summary

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{FatalKind, PipelineError};
use crate::pipeline::PipelineOutput;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum DocumentOutcome {
    Succeeded {
        flagged_fields: usize,
        conflicts: usize,
        footnotes_merged: usize,
        footnote_exceptions: usize,
        footnote_issues: usize,
    },
    Failed {
        kind: FatalKind,
        message: String,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentSummary {
    pub source_name: String,
    pub processed_at: DateTime<Utc>,
    #[serde(flatten)]
    pub outcome: DocumentOutcome,
}

impl DocumentSummary {
    pub fn from_result(source_name: &str, result: &Result<PipelineOutput, PipelineError>) -> Self {
        let outcome = match result {
            Ok(output) => DocumentOutcome::Succeeded {
                flagged_fields: output.manifest.flagged_field_count(),
                conflicts: output.manifest.conflict_count(),
                footnotes_merged: output.merged.insertions.len(),
                footnote_exceptions: output.merged.exceptions.len(),
                footnote_issues: output.footnote_issues.len(),
            },
            Err(e) => DocumentOutcome::Failed {
                kind: e.kind(),
                message: e.to_string(),
            },
        };
        Self {
            source_name: source_name.to_string(),
            processed_at: Utc::now(),
            outcome,
        }
    }

    pub fn succeeded(&self) -> bool {
        matches!(self.outcome, DocumentOutcome::Succeeded { .. })
    }
}

impl std::fmt::Display for DocumentSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.outcome {
            DocumentOutcome::Succeeded {
                flagged_fields,
                conflicts,
                footnotes_merged,
                footnote_exceptions,
                ..
            } => {
                write!(
                    f,
                    "{}: succeeded with {} flagged fields",
                    self.source_name, flagged_fields
                )?;
                if *conflicts > 0 {
                    write!(f, ", {} conflicts", conflicts)?;
                }
                write!(
                    f,
                    " ({} footnotes merged, {} exceptions)",
                    footnotes_merged, footnote_exceptions
                )
            }
            DocumentOutcome::Failed { kind, message } => {
                write!(f, "{}: failed to process ({}: {})", self.source_name, kind, message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{CollaboratorError, DocumentFormatError};
    use pretty_assertions::assert_eq;

    #[test]
    fn test_failed_summary_names_the_kind() {
        let result = Err(PipelineError::Format(DocumentFormatError::Empty));
        let summary = DocumentSummary::from_result("a.md", &result);
        assert!(!summary.succeeded());
        assert_eq!(
            summary.to_string(),
            "a.md: failed to process (DocumentFormatError: document contains no pages)"
        );

        let result = Err(PipelineError::Collaborator(CollaboratorError::Timeout(500)));
        let summary = DocumentSummary::from_result("b.md", &result);
        assert_eq!(
            summary.to_string(),
            "b.md: failed to process (CollaboratorError: collaborator timed out after 500 ms)"
        );
    }

    #[test]
    fn test_summary_serializes_flat() {
        let summary = DocumentSummary {
            source_name: "a.md".into(),
            processed_at: Utc::now(),
            outcome: DocumentOutcome::Failed {
                kind: FatalKind::DocumentFormat,
                message: "document contains no pages".into(),
            },
        };
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["status"], "failed");
        assert_eq!(json["kind"], "DocumentFormatError");
    }
}
