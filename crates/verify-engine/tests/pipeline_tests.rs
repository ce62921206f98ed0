//! End-to-end pipeline tests with in-memory collaborators
//!
//! Run with: cargo test -p verify-engine --test pipeline_tests

use filing_types::{
    ClassificationProposal, ExceptionReason, FieldStatus, FieldValue, FlagReason,
    ImageReviewProposal, ImageReviewRequest, PageType,
};
use pretty_assertions::assert_eq;
use verify_engine::{
    parse_response, ClassificationCollaborator, CollaboratorError, Document, DocumentOutcome,
    DocumentPipeline, DocumentSummary, ImageReviewCollaborator, PipelineStage,
};

struct JsonClassifier(&'static str);

impl ClassificationCollaborator for JsonClassifier {
    fn classify(&self, _: &Document) -> Result<ClassificationProposal, CollaboratorError> {
        parse_response(self.0)
    }
}

struct JsonReviewer(&'static str);

impl ImageReviewCollaborator for JsonReviewer {
    fn review(
        &self,
        _: &Document,
        requests: &[ImageReviewRequest],
    ) -> Result<ImageReviewProposal, CollaboratorError> {
        assert!(!requests.is_empty());
        parse_response(self.0)
    }
}

const FILING: &str = "\
---[Start PDF page 1]---
SUPERIOR COURT OF THE STATE OF CALIFORNIA
PLAINTIFFS' OPPOSITION TO
DEMURRER
---[End PDF page 1]---

---[Start PDF page 2]---
1. Plaintiffs are retired judges.
2. On May 21, 2018, Defendants limited the number of days a retired judge can participate in
the TAJP to 1,320-service days.1
1 See Judicial Council Policy 4.
---[End PDF page 2]---

---[Start PDF page 3]---
3. The policy applied retroactively.2
2 Pub. Util. Code 9.
---[End PDF page 3]---
";

const PROPOSAL: &str = r#"```json
{
  "document_type": "opposition",
  "caption_info": {
    "document_title": {"search_text": "PLAINTIFFS' OPPOSITION TO DEMURRER", "page": 1},
    "filing_party": {"search_text": "Petitioners", "page": 1},
    "filing_date": {"search_text": "", "page": 1},
    "court": "Superior Court of California"
  },
  "pages": [
    {"page_number": 1, "category": "pleading_first_page", "needs_image_review": true,
     "review_reason": "stamped_date", "question": "What date is stamped?"},
    {"page_number": 2, "page_type": "pleading_body"},
    {"page_number": 3, "page_type": "pleading_body"}
  ],
  "footnotes": [
    {"fn_number": 1,
     "anchor": {"search_text": "the TAJP to 1,320-service days.", "page": 3},
     "text": {"search_text": "See Judicial Council Policy 4.", "page": 2}},
    {"fn_number": 2,
     "anchor": {"search_text": "The policy applied retroactively.", "page": 3},
     "text": {"search_text": "Pub. Util. Code 19.", "page": 3}}
  ]
}
```"#;

const REVIEW: &str = r#"{
  "answers": [
    {"page_number": 1, "answer": "Stamped June 3, 2020",
     "field_overrides": [{"field": "filing_date", "value": "JUN 03 2020", "origin": "stamp"}]},
    {"page_number": 2, "answer": "ignored", "updated_page_type": "form"}
  ]
}"#;

#[test]
fn test_full_run_verifies_merges_and_reports() {
    let pipeline = DocumentPipeline::new(JsonClassifier(PROPOSAL)).with_image_review(JsonReviewer(REVIEW));
    let result = pipeline.run("opposition.md", FILING);
    let summary = DocumentSummary::from_result("opposition.md", &result);
    let output = result.unwrap();

    assert_eq!(output.stages.last(), Some(&PipelineStage::Merged));
    assert!(output.stages.contains(&PipelineStage::ImageReviewed));

    let manifest = &output.manifest;
    assert_eq!(manifest.total_pages, 3);
    assert_eq!(manifest.pages[0].page_type, PageType::Caption);
    // answer for unflagged page 2 is dropped
    assert_eq!(manifest.pages[1].page_type, PageType::PleadingBody);
    assert_eq!(
        manifest.caption.document_title.resolved_text(),
        Some("PLAINTIFFS' OPPOSITION TO\nDEMURRER")
    );
    // no party called "Petitioners" anywhere near page 1
    assert_eq!(manifest.caption.filing_party.status(), FieldStatus::Flagged);
    assert_eq!(manifest.caption.filing_date.status(), FieldStatus::ImageSourced);
    assert_eq!(manifest.caption.filing_date.resolved_text(), Some("JUN 03 2020"));

    // footnote 1 anchor hinted one page late still verifies on page 2
    let first = &manifest.footnotes[0];
    assert!(first.is_verified());
    assert_eq!(first.anchor.page_number(), Some(2));
    assert_eq!(
        first.anchor.text(),
        Some("the TAJP to 1,320-service days.")
    );

    // footnote 2's text does not exist in the source
    let merged = &output.merged;
    assert!(merged
        .text
        .contains("the TAJP to 1,320-service days.[FN1: See Judicial Council Policy 4.]1\n"));
    assert!(!merged.text.contains("Pub. Util. Code 19."));
    assert_eq!(merged.exceptions.len(), 1);
    assert_eq!(merged.exceptions[0].footnote_number, 2);
    assert_eq!(
        merged.exceptions[0].reason,
        ExceptionReason::TextUnverified {
            reason: FlagReason::NotFound
        }
    );
    assert_eq!(merged.without_insertions(), FILING);

    assert_eq!(output.footnote_index.len(), 2);
    assert_eq!(
        output.footnote_index[0].text,
        FieldValue::Verified("See Judicial Council Policy 4.".to_string())
    );
    assert!(output.footnote_issues.is_empty());

    assert_eq!(
        summary.outcome,
        DocumentOutcome::Succeeded {
            flagged_fields: 2,
            conflicts: 0,
            footnotes_merged: 1,
            footnote_exceptions: 1,
            footnote_issues: 0,
        }
    );
    assert!(summary
        .to_string()
        .starts_with("opposition.md: succeeded with 2 flagged fields"));
}

#[test]
fn test_malformed_proposal_fails_the_document() {
    let pipeline = DocumentPipeline::new(JsonClassifier("{\"pages\": 7}"));
    let result = pipeline.run("bad.md", FILING);
    let summary = DocumentSummary::from_result("bad.md", &result);

    assert!(matches!(
        result,
        Err(verify_engine::PipelineError::Collaborator(
            CollaboratorError::MalformedResponse(_)
        ))
    ));
    assert!(!summary.succeeded());
    assert!(summary
        .to_string()
        .starts_with("bad.md: failed to process (CollaboratorError:"));
}
