use std::collections::BTreeMap;

use serde::Serialize;
use serde_json::{Map, Value, json};

use crate::answers::{AnswerMap, AnswerValue, MAX_RATING, UploadedFile};
use crate::ordering::Ordered;
use crate::progress::ProgressCounts;
use crate::spec::{FieldSpec, FieldType, FormId, FormSpec};

pub const EMPTY_TITLE: &str = "Select a form to preview";
pub const EMPTY_MESSAGE: &str = "Choose a form from the list to see how it looks";
pub const SELECT_PLACEHOLDER: &str = "Select an option";

/// Status labels returned by the renderers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PreviewStatus {
    /// No form is selected.
    Empty,
    /// At least one required field is unanswered.
    NeedInput,
    /// Every required field is answered.
    Complete,
}

impl PreviewStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PreviewStatus::Empty => "empty",
            PreviewStatus::NeedInput => "need_input",
            PreviewStatus::Complete => "complete",
        }
    }
}

/// Per-field upload indicator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct UploadState {
    pub uploading: bool,
    pub progress: u8,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Session-side state that is not part of the answer map.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PreviewState {
    pub uploads: BTreeMap<String, UploadState>,
    /// Stroke counts of signature pads that have not been committed yet.
    pub signature_strokes: BTreeMap<String, usize>,
    pub submitting: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderChoice {
    pub label: String,
    pub value: String,
    pub selected: bool,
}

/// One rendering strategy per field type.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "widget", rename_all = "snake_case")]
pub enum Widget {
    TextInput {
        value: String,
    },
    TextArea {
        value: String,
    },
    NumberInput {
        value: Option<f64>,
    },
    DatePicker {
        value: Option<String>,
    },
    TimePicker {
        value: Option<String>,
    },
    RadioGroup {
        choices: Vec<RenderChoice>,
        selected: Option<String>,
    },
    CheckboxGroup {
        choices: Vec<RenderChoice>,
    },
    Dropdown {
        choices: Vec<RenderChoice>,
        selected: Option<String>,
        placeholder: String,
    },
    FileUpload {
        file: Option<UploadedFile>,
        upload: UploadState,
    },
    ImageGallery {
        images: Vec<UploadedFile>,
        upload: UploadState,
    },
    StarRating {
        value: Option<u8>,
        max: u8,
    },
    SignaturePad {
        data_url: Option<String>,
        pending_strokes: usize,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderField {
    pub key: String,
    pub label: String,
    pub kind: FieldType,
    pub required: bool,
    pub order: u32,
    pub widget: Widget,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderSection {
    pub key: String,
    pub title: String,
    pub order: u32,
    pub fields: Vec<RenderField>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmptyState {
    pub title: String,
    pub message: String,
}

/// Collected payload used by both text and JSON renderers.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewPayload {
    pub status: PreviewStatus,
    pub form_id: Option<FormId>,
    pub form_name: String,
    pub description: Option<String>,
    pub damage_types: Vec<String>,
    pub empty_state: Option<EmptyState>,
    pub sections: Vec<RenderSection>,
    pub progress: ProgressCounts,
    pub submitting: bool,
}

pub fn build_preview_payload(form: Option<&FormSpec>, answers: &AnswerMap) -> PreviewPayload {
    build_preview_payload_with_state(form, answers, &PreviewState::default())
}

/// Build the payload for `form` from the answer map and per-field session state.
pub fn build_preview_payload_with_state(
    form: Option<&FormSpec>,
    answers: &AnswerMap,
    state: &PreviewState,
) -> PreviewPayload {
    let Some(form) = form else {
        return PreviewPayload {
            status: PreviewStatus::Empty,
            form_id: None,
            form_name: String::new(),
            description: None,
            damage_types: Vec::new(),
            empty_state: Some(EmptyState {
                title: EMPTY_TITLE.to_string(),
                message: EMPTY_MESSAGE.to_string(),
            }),
            sections: Vec::new(),
            progress: ProgressCounts::default(),
            submitting: false,
        };
    };

    let sections = form
        .ordered_sections()
        .into_iter()
        .map(|section| {
            let mut fields = section.fields.iter().collect::<Vec<_>>();
            fields.sort_by_key(|field| field.order);
            RenderSection {
                key: section.sort_key().to_string(),
                title: section.name.clone(),
                order: section.order,
                fields: fields
                    .into_iter()
                    .map(|field| {
                        let key = field.answer_key(section);
                        RenderField {
                            widget: build_widget(field, &key, answers, state),
                            key,
                            label: field.name.clone(),
                            kind: field.kind,
                            required: field.is_required,
                            order: field.order,
                        }
                    })
                    .collect(),
            }
        })
        .collect::<Vec<_>>();

    let progress = ProgressCounts::compute(form, answers);
    let status = if progress.is_complete() {
        PreviewStatus::Complete
    } else {
        PreviewStatus::NeedInput
    };

    PreviewPayload {
        status,
        form_id: form.id,
        form_name: form.name.clone(),
        description: form
            .description
            .clone()
            .filter(|text| !text.trim().is_empty()),
        damage_types: form.damage_types.clone(),
        empty_state: None,
        sections,
        progress,
        submitting: state.submitting,
    }
}

fn build_widget(
    field: &FieldSpec,
    key: &str,
    answers: &AnswerMap,
    state: &PreviewState,
) -> Widget {
    let answer = answers.get(key);
    let text = match answer {
        Some(AnswerValue::Text(text)) => Some(text.clone()),
        _ => None,
    };
    let upload = || state.uploads.get(key).cloned().unwrap_or_default();

    match field.kind {
        FieldType::Text => Widget::TextInput {
            value: text.unwrap_or_default(),
        },
        FieldType::Textarea => Widget::TextArea {
            value: text.unwrap_or_default(),
        },
        FieldType::Number => Widget::NumberInput {
            value: match answer {
                Some(AnswerValue::Number(number)) => Some(*number),
                _ => None,
            },
        },
        FieldType::Date => Widget::DatePicker { value: text },
        FieldType::Time => Widget::TimePicker { value: text },
        FieldType::Radio => Widget::RadioGroup {
            choices: render_choices(field, |value| text.as_deref() == Some(value)),
            selected: text,
        },
        FieldType::Checkbox => {
            let checked: &[String] = match answer {
                Some(AnswerValue::Choices(values)) => values.as_slice(),
                _ => &[],
            };
            Widget::CheckboxGroup {
                choices: render_choices(field, |value| checked.iter().any(|item| item == value)),
            }
        }
        FieldType::Select => Widget::Dropdown {
            choices: render_choices(field, |value| text.as_deref() == Some(value)),
            selected: text,
            placeholder: SELECT_PLACEHOLDER.to_string(),
        },
        FieldType::File => Widget::FileUpload {
            file: match answer {
                Some(AnswerValue::File(file)) => Some(file.clone()),
                _ => None,
            },
            upload: upload(),
        },
        FieldType::Image => Widget::ImageGallery {
            images: match answer {
                Some(AnswerValue::Images(images)) => images.clone(),
                _ => Vec::new(),
            },
            upload: upload(),
        },
        FieldType::Rating => Widget::StarRating {
            value: match answer {
                Some(AnswerValue::Rating(stars)) => Some(*stars),
                _ => None,
            },
            max: MAX_RATING,
        },
        FieldType::Signature => Widget::SignaturePad {
            data_url: match answer {
                Some(AnswerValue::Signature(uri)) => Some(uri.clone()),
                _ => None,
            },
            pending_strokes: state.signature_strokes.get(key).copied().unwrap_or(0),
        },
    }
}

fn render_choices(field: &FieldSpec, is_selected: impl Fn(&str) -> bool) -> Vec<RenderChoice> {
    field
        .sorted_options()
        .into_iter()
        .map(|option| RenderChoice {
            label: option.name.clone(),
            value: option.value.clone(),
            selected: is_selected(&option.value),
        })
        .collect()
}

/// Render the payload as a structured JSON-friendly value.
pub fn render_json_ui(payload: &PreviewPayload) -> Value {
    if let Some(empty) = &payload.empty_state {
        return json!({
            "status": payload.status.as_str(),
            "empty_state": {
                "title": empty.title,
                "message": empty.message,
            },
            "sections": [],
        });
    }

    let sections = payload
        .sections
        .iter()
        .map(|section| {
            let fields = section
                .fields
                .iter()
                .map(|field| {
                    let mut map = Map::new();
                    map.insert("key".into(), Value::String(field.key.clone()));
                    map.insert("label".into(), Value::String(field.label.clone()));
                    map.insert("type".into(), Value::String(field.kind.as_str().to_string()));
                    map.insert("required".into(), Value::Bool(field.required));
                    map.insert("order".into(), Value::from(field.order));
                    if let Ok(widget) = serde_json::to_value(&field.widget) {
                        map.insert("widget".into(), widget);
                    }
                    Value::Object(map)
                })
                .collect::<Vec<_>>();
            json!({
                "key": section.key,
                "title": section.title,
                "order": section.order,
                "fields": fields,
            })
        })
        .collect::<Vec<_>>();

    json!({
        "status": payload.status.as_str(),
        "form_id": payload.form_id,
        "form_name": payload.form_name,
        "description": payload.description,
        "damage_types": payload.damage_types,
        "progress": {
            "answered": payload.progress.answered,
            "total": payload.progress.total,
            "required_answered": payload.progress.required_answered,
            "required_total": payload.progress.required_total,
        },
        "submitting": payload.submitting,
        "sections": sections,
    })
}

/// Render the payload as human-friendly text.
pub fn render_text(payload: &PreviewPayload) -> String {
    if let Some(empty) = &payload.empty_state {
        return format!("{}\n{}", empty.title, empty.message);
    }

    let mut lines = Vec::new();
    let id = payload
        .form_id
        .map(|id| id.to_string())
        .unwrap_or_else(|| "unsaved".to_string());
    lines.push(format!("Form: {} ({})", payload.form_name, id));
    lines.push(format!(
        "Status: {} (answered {}/{}, required {}/{})",
        payload.status.as_str(),
        payload.progress.answered,
        payload.progress.total,
        payload.progress.required_answered,
        payload.progress.required_total
    ));
    if let Some(description) = &payload.description {
        lines.push(format!("Description: {}", description));
    }
    if !payload.damage_types.is_empty() {
        lines.push(format!("Damage types: {}", payload.damage_types.join(", ")));
    }

    for section in &payload.sections {
        lines.push(format!("Section {}: {}", section.order, section.title));
        for field in &section.fields {
            let mut entry = format!("  {}. {} [{}]", field.order, field.label, field.kind);
            if field.required {
                entry.push_str(" (required)");
            }
            if let Some(summary) = widget_summary(&field.widget) {
                entry.push_str(&format!(" = {}", summary));
            }
            lines.push(entry);
            if let Some(upload) = upload_state(&field.widget) {
                if upload.uploading {
                    lines.push(format!("     uploading... {}%", upload.progress));
                }
                if let Some(error) = &upload.error {
                    lines.push(format!("     ! {}", error));
                }
            }
        }
    }

    lines.join("\n")
}

fn upload_state(widget: &Widget) -> Option<&UploadState> {
    match widget {
        Widget::FileUpload { upload, .. } | Widget::ImageGallery { upload, .. } => Some(upload),
        _ => None,
    }
}

fn widget_summary(widget: &Widget) -> Option<String> {
    match widget {
        Widget::TextInput { value } | Widget::TextArea { value } => {
            Some(value.clone()).filter(|value| !value.is_empty())
        }
        Widget::NumberInput { value } => value.map(|number| number.to_string()),
        Widget::DatePicker { value } | Widget::TimePicker { value } => value.clone(),
        Widget::RadioGroup { selected, .. } | Widget::Dropdown { selected, .. } => {
            selected.clone()
        }
        Widget::CheckboxGroup { choices } => {
            let checked = choices
                .iter()
                .filter(|choice| choice.selected)
                .map(|choice| choice.value.as_str())
                .collect::<Vec<_>>();
            (!checked.is_empty()).then(|| checked.join(", "))
        }
        Widget::FileUpload { file, .. } => file.as_ref().map(|file| file.name.clone()),
        Widget::ImageGallery { images, .. } => {
            (!images.is_empty()).then(|| format!("{} image(s)", images.len()))
        }
        Widget::StarRating { value, max } => value.map(|stars| {
            let filled = usize::from(stars);
            let empty = usize::from(*max).saturating_sub(filled);
            format!("{}{} ({}/{})", "*".repeat(filled), "-".repeat(empty), stars, max)
        }),
        Widget::SignaturePad {
            data_url,
            pending_strokes,
        } => {
            if *pending_strokes > 0 {
                Some(format!("signature pending ({} strokes)", pending_strokes))
            } else {
                data_url.as_ref().map(|_| "signed".to_string())
            }
        }
    }
}
