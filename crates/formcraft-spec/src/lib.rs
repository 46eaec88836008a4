#![allow(missing_docs)]

pub mod answers;
pub mod error;
pub mod frontend;
pub mod normalize;
pub mod ordering;
pub mod progress;
pub mod render;
pub mod spec;
pub mod validate;

pub use answers::{
    AnswerMap, AnswerValue, FormSubmission, SeedOutcome, UploadedFile, ValidationError,
    ValidationResult,
};
pub use error::ModelError;
pub use frontend::{JsonFrontend, PreviewFrontend, TextFrontend};
pub use normalize::{normalize_form, normalize_options, slugify};
pub use ordering::{DraftKind, Ordered, SortKey, is_dense, move_by_key, move_item, renumber};
pub use progress::ProgressCounts;
pub use render::{
    EmptyState, PreviewPayload, PreviewState, PreviewStatus, RenderChoice, RenderField,
    RenderSection, UploadState, Widget, build_preview_payload, build_preview_payload_with_state,
    render_json_ui, render_text,
};
pub use spec::{
    FieldId, FieldOption, FieldSpec, FieldType, FormId, FormSpec, OptionSpec, SectionId,
    SectionSpec,
};
pub use validate::validate;
