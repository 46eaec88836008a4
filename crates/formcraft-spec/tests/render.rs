use serde_json::json;

use formcraft_spec::{
    AnswerMap, FormSpec, JsonFrontend, PreviewFrontend, PreviewState, PreviewStatus, TextFrontend,
    UploadState, Widget, build_preview_payload, build_preview_payload_with_state, render_json_ui,
    render_text,
};

fn fixture(name: &str) -> &'static str {
    match name {
        "inspection_form" => include_str!("../tests/fixtures/inspection_form.json"),
        "unsaved_form" => include_str!("../tests/fixtures/unsaved_form.json"),
        _ => panic!("unknown fixture {}", name),
    }
}

fn inspection() -> FormSpec {
    serde_json::from_str(fixture("inspection_form")).expect("deserialize")
}

fn widget<'a>(payload: &'a formcraft_spec::PreviewPayload, key: &str) -> &'a Widget {
    payload
        .sections
        .iter()
        .flat_map(|section| section.fields.iter())
        .find(|field| field.key == key)
        .map(|field| &field.widget)
        .expect("field rendered")
}

#[test]
fn missing_form_renders_empty_state() {
    let payload = build_preview_payload(None, &AnswerMap::new());
    assert_eq!(payload.status, PreviewStatus::Empty);
    assert!(payload.sections.is_empty());

    let text = render_text(&payload);
    assert_eq!(
        text,
        "Select a form to preview\nChoose a form from the list to see how it looks"
    );
    let ui = render_json_ui(&payload);
    assert_eq!(ui["empty_state"]["title"], "Select a form to preview");
    assert_eq!(ui["sections"], json!([]));
}

#[test]
fn every_field_type_reflects_its_answer() {
    let form = inspection();
    let seeded = AnswerMap::seed(
        &form,
        &json!({
            "101": "Dana",
            "102": "Standing water in basement",
            "103": 3,
            "104": "2024-05-01",
            "105": "09:30",
            "106": "Grey",
            "107": ["drywall", "hardwood"],
            "108": "roof-leak",
            "109": {
                "url": "https://cdn.example.com/report.pdf",
                "name": "report.pdf",
                "size": 2048,
                "type": "application/pdf",
                "fileId": "f-1",
                "filePath": "/form-uploads/report.pdf"
            },
            "110": "[{\"url\":\"https://cdn.example.com/a.jpg\",\"name\":\"a.jpg\",\"size\":10,\"type\":\"image/jpeg\",\"fileId\":\"i-1\",\"filePath\":\"/form-uploads/a.jpg\"}]",
            "111": 4,
            "112": "data:image/svg+xml;base64,PHN2Zy8+"
        }),
    );
    assert!(seeded.rejected.is_empty(), "{:?}", seeded.rejected);
    let payload = build_preview_payload(Some(&form), &seeded.answers);

    assert_eq!(
        widget(&payload, "101"),
        &Widget::TextInput {
            value: "Dana".into()
        }
    );
    assert!(matches!(widget(&payload, "102"), Widget::TextArea { value } if value.starts_with("Standing")));
    assert_eq!(widget(&payload, "103"), &Widget::NumberInput { value: Some(3.0) });
    assert_eq!(
        widget(&payload, "104"),
        &Widget::DatePicker {
            value: Some("2024-05-01".into())
        }
    );
    assert_eq!(
        widget(&payload, "105"),
        &Widget::TimePicker {
            value: Some("09:30".into())
        }
    );
    match widget(&payload, "106") {
        Widget::RadioGroup { choices, selected } => {
            assert_eq!(selected.as_deref(), Some("Grey"));
            let picked = choices
                .iter()
                .filter(|choice| choice.selected)
                .map(|choice| choice.value.as_str())
                .collect::<Vec<_>>();
            assert_eq!(picked, vec!["Grey"]);
        }
        other => panic!("unexpected widget {other:?}"),
    }
    match widget(&payload, "107") {
        Widget::CheckboxGroup { choices } => {
            let checked = choices
                .iter()
                .map(|choice| (choice.value.as_str(), choice.selected))
                .collect::<Vec<_>>();
            assert_eq!(
                checked,
                vec![("drywall", true), ("carpet", false), ("hardwood", true)]
            );
        }
        other => panic!("unexpected widget {other:?}"),
    }
    match widget(&payload, "108") {
        Widget::Dropdown {
            selected,
            placeholder,
            choices,
        } => {
            assert_eq!(selected.as_deref(), Some("roof-leak"));
            assert_eq!(placeholder, "Select an option");
            assert_eq!(choices.len(), 2);
        }
        other => panic!("unexpected widget {other:?}"),
    }
    match widget(&payload, "109") {
        Widget::FileUpload { file, upload } => {
            assert_eq!(file.as_ref().map(|file| file.name.as_str()), Some("report.pdf"));
            assert_eq!(upload, &UploadState::default());
        }
        other => panic!("unexpected widget {other:?}"),
    }
    match widget(&payload, "110") {
        Widget::ImageGallery { images, .. } => {
            assert_eq!(images.len(), 1);
            assert_eq!(images[0].file_id, "i-1");
        }
        other => panic!("unexpected widget {other:?}"),
    }
    assert_eq!(
        widget(&payload, "111"),
        &Widget::StarRating {
            value: Some(4),
            max: 5
        }
    );
    assert_eq!(
        widget(&payload, "112"),
        &Widget::SignaturePad {
            data_url: Some("data:image/svg+xml;base64,PHN2Zy8+".into()),
            pending_strokes: 0
        }
    );
    assert_eq!(payload.status, PreviewStatus::Complete);
    assert_eq!(payload.progress.answered, 12);
}

#[test]
fn sections_and_fields_render_in_order() {
    let form: FormSpec = serde_json::from_str(fixture("unsaved_form")).expect("deserialize");
    let payload = build_preview_payload(Some(&form), &AnswerMap::new());

    let titles = payload
        .sections
        .iter()
        .map(|section| section.title.as_str())
        .collect::<Vec<_>>();
    assert_eq!(titles, vec!["Section 1", "Section 2"]);
    let labels = payload.sections[0]
        .fields
        .iter()
        .map(|field| field.label.as_str())
        .collect::<Vec<_>>();
    assert_eq!(labels, vec!["Odor", "Spread"]);
    assert_eq!(payload.sections[0].fields[0].key, "section-1/field-1");
    assert_eq!(payload.sections[1].fields[0].key, "section-2/field-1");
    assert_eq!(payload.status, PreviewStatus::NeedInput);
    assert_eq!(payload.progress.required_total, 1);
}

#[test]
fn upload_state_surfaces_in_widgets_and_text() {
    let form = inspection();
    let mut state = PreviewState::default();
    state.uploads.insert(
        "110".into(),
        UploadState {
            uploading: false,
            progress: 0,
            error: Some("Failed to upload file. Please try again.".into()),
        },
    );
    let payload = build_preview_payload_with_state(Some(&form), &AnswerMap::new(), &state);

    match widget(&payload, "110") {
        Widget::ImageGallery { upload, images } => {
            assert!(images.is_empty());
            assert_eq!(
                upload.error.as_deref(),
                Some("Failed to upload file. Please try again.")
            );
        }
        other => panic!("unexpected widget {other:?}"),
    }
    assert!(matches!(widget(&payload, "109"), Widget::FileUpload { upload, .. } if upload.error.is_none()));
    assert!(render_text(&payload).contains("! Failed to upload file. Please try again."));
}

#[test]
fn json_ui_exposes_widgets() {
    let form = inspection();
    let seeded = AnswerMap::seed(&form, &json!({ "107": ["carpet"] }));
    let payload = build_preview_payload(Some(&form), &seeded.answers);

    let ui = JsonFrontend.render(&payload);
    assert_eq!(ui["form_id"], 7);
    assert_eq!(ui["progress"]["total"], 12);
    let checkbox = &ui["sections"][1]["fields"][0];
    assert_eq!(checkbox["type"], "CHECKBOX");
    assert_eq!(checkbox["widget"]["widget"], "checkbox_group");
    assert_eq!(checkbox["widget"]["choices"][1]["selected"], true);
}

#[test]
fn text_render_summarizes_answers() {
    let form: FormSpec = serde_json::from_value(json!({
        "id": 3,
        "name": "Roof Check",
        "sections": [
            {
                "id": 1,
                "name": "Exterior",
                "order": 1,
                "fields": [
                    { "id": 10, "name": "Shingles missing", "type": "NUMBER", "isRequired": true, "order": 1 },
                    { "id": 11, "name": "Condition", "type": "RATING", "order": 2 }
                ]
            }
        ]
    }))
    .expect("deserialize");
    let seeded = AnswerMap::seed(&form, &json!({ "10": 4, "11": 3 }));
    let payload = build_preview_payload(Some(&form), &seeded.answers);

    insta::assert_snapshot!(TextFrontend.render(&payload), @r"
    Form: Roof Check (3)
    Status: complete (answered 2/2, required 1/1)
    Section 1: Exterior
      1. Shingles missing [NUMBER] (required) = 4
      2. Condition [RATING] = ***-- (3/5)
    ");
}
