use std::collections::BTreeMap;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::ModelError;
use crate::spec::{FieldType, FormId, FormSpec};

/// Descriptor returned by the upload service for a stored file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadedFile {
    pub url: String,
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(rename = "type", default)]
    pub mime_type: String,
    #[serde(default)]
    pub file_id: String,
    #[serde(default)]
    pub file_path: String,
}

/// A typed answer. The shape is chosen by the field type, see [`AnswerValue::decode`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum AnswerValue {
    /// TEXT, TEXTAREA, DATE, TIME, RADIO and SELECT.
    Text(String),
    Number(f64),
    /// Checked option values of a CHECKBOX field.
    Choices(Vec<String>),
    Rating(u8),
    File(UploadedFile),
    Images(Vec<UploadedFile>),
    /// Data URI of a signature drawing.
    Signature(String),
}

pub const MAX_RATING: u8 = 5;

impl AnswerValue {
    /// Decodes a raw JSON answer for a field of type `kind`.
    ///
    /// Numbers and ratings also accept numeric strings. IMAGE answers accept
    /// a JSON-encoded string of the array, which is how some stored
    /// submissions keep them.
    pub fn decode(key: &str, kind: FieldType, raw: &Value) -> Result<Self, ModelError> {
        let shape = |reason: &str| ModelError::AnswerShape {
            key: key.to_string(),
            kind,
            reason: reason.to_string(),
        };
        match kind {
            FieldType::Text
            | FieldType::Textarea
            | FieldType::Date
            | FieldType::Time
            | FieldType::Radio
            | FieldType::Select => raw
                .as_str()
                .map(|text| AnswerValue::Text(text.to_string()))
                .ok_or_else(|| shape("expected a string")),
            FieldType::Number => {
                let number = match raw {
                    Value::Number(number) => number
                        .as_f64()
                        .ok_or_else(|| shape("number out of range"))?,
                    Value::String(text) => text
                        .trim()
                        .parse::<f64>()
                        .map_err(|_| shape("expected a number"))?,
                    _ => return Err(shape("expected a number")),
                };
                Self::number(key, number)
            }
            FieldType::Checkbox => match raw {
                Value::Array(items) => items
                    .iter()
                    .map(|item| item.as_str().map(str::to_string))
                    .collect::<Option<Vec<_>>>()
                    .map(AnswerValue::Choices)
                    .ok_or_else(|| shape("expected an array of strings")),
                _ => Err(shape("expected an array of strings")),
            },
            FieldType::Rating => {
                let stars = match raw {
                    Value::Number(number) => number.as_i64(),
                    Value::String(text) => text.trim().parse::<i64>().ok(),
                    _ => None,
                }
                .ok_or_else(|| shape("expected a whole number of stars"))?;
                Self::rating(stars)
            }
            FieldType::File => serde_json::from_value::<UploadedFile>(raw.clone())
                .map(AnswerValue::File)
                .map_err(|err| shape(&err.to_string())),
            FieldType::Image => {
                let parsed;
                let array = match raw {
                    Value::String(text) => {
                        parsed = serde_json::from_str::<Value>(text)
                            .map_err(|err| shape(&err.to_string()))?;
                        &parsed
                    }
                    other => other,
                };
                serde_json::from_value::<Vec<UploadedFile>>(array.clone())
                    .map(AnswerValue::Images)
                    .map_err(|err| shape(&err.to_string()))
            }
            FieldType::Signature => raw
                .as_str()
                .map(|text| AnswerValue::Signature(text.to_string()))
                .ok_or_else(|| shape("expected a data URI string")),
        }
    }

    /// NUMBER answers must be finite; `"NaN"` and `"inf"` parse but are refused.
    pub fn number(key: &str, number: f64) -> Result<Self, ModelError> {
        if number.is_finite() {
            Ok(AnswerValue::Number(number))
        } else {
            Err(ModelError::AnswerShape {
                key: key.to_string(),
                kind: FieldType::Number,
                reason: "expected a finite number".to_string(),
            })
        }
    }

    pub fn rating(stars: i64) -> Result<Self, ModelError> {
        if (1..=i64::from(MAX_RATING)).contains(&stars) {
            Ok(AnswerValue::Rating(stars as u8))
        } else {
            Err(ModelError::RatingOutOfRange(stars))
        }
    }

    /// Whether this value is a legal answer shape for `kind`.
    pub fn fits(&self, kind: FieldType) -> bool {
        match self {
            AnswerValue::Text(_) => matches!(
                kind,
                FieldType::Text
                    | FieldType::Textarea
                    | FieldType::Date
                    | FieldType::Time
                    | FieldType::Radio
                    | FieldType::Select
            ),
            AnswerValue::Number(_) => kind == FieldType::Number,
            AnswerValue::Choices(_) => kind == FieldType::Checkbox,
            AnswerValue::Rating(_) => kind == FieldType::Rating,
            AnswerValue::File(_) => kind == FieldType::File,
            AnswerValue::Images(_) => kind == FieldType::Image,
            AnswerValue::Signature(_) => kind == FieldType::Signature,
        }
    }

    /// Empty strings and empty lists do not count as answered.
    pub fn is_empty(&self) -> bool {
        match self {
            AnswerValue::Text(text) | AnswerValue::Signature(text) => text.trim().is_empty(),
            AnswerValue::Choices(values) => values.is_empty(),
            AnswerValue::Images(images) => images.is_empty(),
            AnswerValue::Number(_) | AnswerValue::Rating(_) | AnswerValue::File(_) => false,
        }
    }

    pub fn to_json(&self) -> Value {
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

/// Answers collected in a preview session, keyed by field answer key.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AnswerMap {
    values: BTreeMap<String, AnswerValue>,
}

/// Result of seeding an [`AnswerMap`] from loosely typed initial values.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeedOutcome {
    pub answers: AnswerMap,
    /// Keys that matched no field or whose value did not decode.
    pub rejected: Vec<(String, String)>,
}

impl AnswerMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes `initial` (a JSON object keyed by answer key) against the form's fields.
    pub fn seed(form: &FormSpec, initial: &Value) -> SeedOutcome {
        let mut outcome = SeedOutcome::default();
        let Some(object) = initial.as_object() else {
            return outcome;
        };
        for (key, raw) in object {
            if raw.is_null() {
                continue;
            }
            let Some(field) = form.field_by_answer_key(key) else {
                outcome
                    .rejected
                    .push((key.clone(), "no field with this key".to_string()));
                continue;
            };
            match AnswerValue::decode(key, field.kind, raw) {
                Ok(value) => {
                    outcome.answers.values.insert(key.clone(), value);
                }
                Err(err) => outcome.rejected.push((key.clone(), err.to_string())),
            }
        }
        outcome
    }

    pub fn get(&self, key: &str) -> Option<&AnswerValue> {
        self.values.get(key)
    }

    pub fn get_mut(&mut self, key: &str) -> Option<&mut AnswerValue> {
        self.values.get_mut(key)
    }

    pub fn insert(&mut self, key: impl Into<String>, value: AnswerValue) -> Option<AnswerValue> {
        self.values.insert(key.into(), value)
    }

    pub fn remove(&mut self, key: &str) -> Option<AnswerValue> {
        self.values.remove(key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// True when `key` holds a non-empty answer.
    pub fn is_answered(&self, key: &str) -> bool {
        self.values.get(key).is_some_and(|value| !value.is_empty())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &AnswerValue)> {
        self.values.iter()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Flat JSON object, the shape handed to submitters and validators.
    pub fn to_json(&self) -> Map<String, Value> {
        self.values
            .iter()
            .map(|(key, value)| (key.clone(), value.to_json()))
            .collect()
    }
}

/// A submitted set of answers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormSubmission {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_id: Option<FormId>,
    pub answers: Map<String, Value>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub submitted_at: Option<String>,
}

/// Validation error metadata reported by [`crate::validate`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationError {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_key: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<String>,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct ValidationResult {
    pub valid: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<ValidationError>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub missing_required: Vec<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub unknown_fields: Vec<String>,
}
