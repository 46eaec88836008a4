use formcraft_spec::{FieldType, FormId, ModelError};
use thiserror::Error;

/// Failures talking to the form store.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("form {0} not found")]
    NotFound(FormId),
    #[error("backend rejected the request: {0}")]
    Rejected(String),
    #[error("backend responded with status {status}: {body}")]
    Status { status: u16, body: String },
    #[cfg(feature = "http")]
    #[error(transparent)]
    Http(#[from] reqwest::Error),
    #[error("invalid backend url: {0}")]
    Url(#[from] url::ParseError),
    #[error("failed to decode backend payload: {0}")]
    Decode(#[from] serde_json::Error),
}

/// Failures from the upload service or the image optimizer.
#[derive(Debug, Error)]
pub enum UploadError {
    #[error("upload rejected: {0}")]
    Rejected(String),
    #[error("image optimization failed: {0}")]
    Optimize(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum BuilderError {
    #[error("no form is selected")]
    NoFormSelected,
    #[error("a save is already in flight")]
    SaveInFlight,
    #[error("form has not been saved yet")]
    NotPersisted,
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Backend(#[from] BackendError),
}

#[derive(Debug, Error)]
pub enum PreviewError {
    #[error("no form is loaded in the preview")]
    NoForm,
    #[error("no field answers to key `{0}`")]
    UnknownField(String),
    #[error("field `{key}` is a {kind} field, not {expected}")]
    WrongFieldType {
        key: String,
        kind: FieldType,
        expected: &'static str,
    },
    #[error("an upload for `{0}` is already in flight")]
    UploadInFlight(String),
    #[error("a submission is already in flight")]
    SubmissionInFlight,
    #[error("image index {index} is out of range for `{key}`")]
    ImageOutOfRange { key: String, index: usize },
    #[error(transparent)]
    Model(#[from] ModelError),
    #[error(transparent)]
    Upload(#[from] UploadError),
    #[error("submission failed: {0}")]
    Submit(#[source] BackendError),
}
