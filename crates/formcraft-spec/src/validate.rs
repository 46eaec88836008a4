use std::collections::BTreeSet;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::answers::{AnswerValue, ValidationError, ValidationResult};
use crate::spec::{FieldSpec, FieldType, FormSpec};

static DATE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").expect("valid regex"));
static TIME: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}:\d{2}(:\d{2})?$").expect("valid regex"));

/// Checks a flat answer object against the form's fields.
pub fn validate(form: &FormSpec, answers: &Value) -> ValidationResult {
    let answers_map = answers.as_object().cloned().unwrap_or_default();

    let mut errors = Vec::new();
    let mut missing_required = Vec::new();

    let fields = form.answer_fields();
    for (key, field) in &fields {
        let key = key.clone();
        let Some(raw) = answers_map.get(&key).filter(|value| !value.is_null()) else {
            if field.is_required {
                missing_required.push(key);
            }
            continue;
        };
        match AnswerValue::decode(&key, field.kind, raw) {
            Err(err) => errors.push(error_for(&key, err.to_string(), err.code())),
            Ok(value) if value.is_empty() => {
                if field.is_required {
                    missing_required.push(key);
                }
            }
            Ok(value) => {
                if let Some(error) = validate_value(field, &key, &value) {
                    errors.push(error);
                }
            }
        }
    }

    let known: BTreeSet<String> = fields.into_iter().map(|(key, _)| key).collect();
    let unknown_fields: Vec<String> = answers_map
        .keys()
        .filter(|key| !known.contains(*key))
        .cloned()
        .collect();

    ValidationResult {
        valid: errors.is_empty() && missing_required.is_empty() && unknown_fields.is_empty(),
        errors,
        missing_required,
        unknown_fields,
    }
}

fn validate_value(field: &FieldSpec, key: &str, value: &AnswerValue) -> Option<ValidationError> {
    let allowed = || {
        field
            .options
            .iter()
            .map(|option| option.value.as_str())
            .collect::<BTreeSet<_>>()
    };
    match (field.kind, value) {
        (FieldType::Radio | FieldType::Select, AnswerValue::Text(choice))
            if !field.options.is_empty() && !allowed().contains(choice.as_str()) =>
        {
            Some(error_for(
                key,
                format!("`{choice}` is not one of the field's options"),
                "invalid_choice",
            ))
        }
        (FieldType::Checkbox, AnswerValue::Choices(choices)) if !field.options.is_empty() => {
            let allowed = allowed();
            choices
                .iter()
                .find(|choice| !allowed.contains(choice.as_str()))
                .map(|choice| {
                    error_for(
                        key,
                        format!("`{choice}` is not one of the field's options"),
                        "invalid_choice",
                    )
                })
        }
        (FieldType::Date, AnswerValue::Text(text)) if !DATE.is_match(text) => Some(error_for(
            key,
            "expected a date formatted as YYYY-MM-DD".into(),
            "invalid_date",
        )),
        (FieldType::Time, AnswerValue::Text(text)) if !TIME.is_match(text) => Some(error_for(
            key,
            "expected a time formatted as HH:MM".into(),
            "invalid_time",
        )),
        (FieldType::Signature, AnswerValue::Signature(uri)) if !uri.starts_with("data:image/") => {
            Some(error_for(
                key,
                "signature must be an image data URI".into(),
                "invalid_signature",
            ))
        }
        _ => None,
    }
}

fn error_for(key: &str, message: String, code: &str) -> ValidationError {
    ValidationError {
        field_key: Some(key.to_string()),
        path: Some(format!("/{key}")),
        message,
        code: Some(code.to_string()),
    }
}
