pub mod locate;
pub mod manifest;
pub mod proposal;

pub use locate::{ByteRange, FieldValue, FlagReason, LocateRequest, LocateResult, VerifiedSpan};
pub use manifest::{
    CaptionInfo, CauseOfAction, ClassificationManifest, ExceptionReason, ExhibitEntry,
    FieldStatus, FootnoteEntry, FootnoteException, FootnoteIndexEntry, FootnoteIssue,
    ImageReviewRequest, ImageValue, PageClassification, PageRow, ReviewedValue,
};
pub use proposal::{
    CaptionProposal, CauseOfActionProposal, ClassificationProposal, DocumentType,
    ExhibitProposal, FieldOverride, FootnoteProposal, ImageReviewAnswer, ImageReviewProposal,
    NumberRange, PageProposal, PageType, ReviewReason, ReviewableField, VisualOrigin,
};
