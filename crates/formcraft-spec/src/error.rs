use thiserror::Error;

use crate::spec::FieldType;

/// Errors raised while manipulating the form model or decoding answers.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ModelError {
    #[error("invalid sortable key `{0}`")]
    InvalidKey(String),
    #[error("no section matches key `{0}`")]
    UnknownSection(String),
    #[error("no field matches key `{0}`")]
    UnknownField(String),
    #[error("option index {index} is out of range ({len} options)")]
    OptionOutOfRange { index: usize, len: usize },
    #[error("field type {0} does not take options")]
    OptionsNotSupported(FieldType),
    #[error("answer for `{key}` does not fit a {kind} field: {reason}")]
    AnswerShape {
        key: String,
        kind: FieldType,
        reason: String,
    },
    #[error("rating {0} is outside 1..=5")]
    RatingOutOfRange(i64),
}

impl ModelError {
    /// Stable code used in validation reports.
    pub fn code(&self) -> &'static str {
        match self {
            ModelError::InvalidKey(_) => "invalid_key",
            ModelError::UnknownSection(_) => "unknown_section",
            ModelError::UnknownField(_) => "unknown_field",
            ModelError::OptionOutOfRange { .. } => "option_out_of_range",
            ModelError::OptionsNotSupported(_) => "options_not_supported",
            ModelError::AnswerShape { .. } => "type_mismatch",
            ModelError::RatingOutOfRange(_) => "out_of_range",
        }
    }
}
