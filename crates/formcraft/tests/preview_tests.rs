use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use formcraft::notify;
use formcraft::preview::{
    FileBlob, ImageOptimizer, MemorySubmitter, MemoryUploader, Point, PreviewSession,
    Submitter, UploadOptions, UploadReceipt, Uploader,
};
use formcraft::{BackendError, PreviewContext, PreviewError, UploadError};
use formcraft_spec::{AnswerValue, FormSpec, FormSubmission, PreviewStatus, Widget};
use serde_json::{Value, json};

fn inspection() -> FormSpec {
    serde_json::from_str(include_str!("fixtures/inspection_form.json")).expect("fixture")
}

fn unsaved() -> FormSpec {
    serde_json::from_str(include_str!("fixtures/unsaved_form.json")).expect("fixture")
}

fn widget_for(session: &PreviewSession, key: &str) -> Widget {
    session
        .payload()
        .sections
        .iter()
        .flat_map(|section| section.fields.iter())
        .find(|field| field.key == key)
        .map(|field| field.widget.clone())
        .expect("field in payload")
}

/// Fails every upload whose file name starts with `bad`.
#[derive(Default)]
struct PickyUploader {
    inner: MemoryUploader,
    seen_options: std::sync::Mutex<Vec<UploadOptions>>,
}

#[async_trait]
impl Uploader for PickyUploader {
    async fn upload(
        &self,
        file: FileBlob,
        options: &UploadOptions,
    ) -> Result<UploadReceipt, UploadError> {
        self.seen_options.lock().unwrap().push(options.clone());
        if file.name.starts_with("bad") {
            return Err(UploadError::Rejected("quota exceeded".into()));
        }
        self.inner.upload(file, options).await
    }
}

#[derive(Default)]
struct CountingOptimizer {
    calls: AtomicUsize,
}

#[async_trait]
impl ImageOptimizer for CountingOptimizer {
    async fn optimize(&self, file: FileBlob) -> Result<FileBlob, UploadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(file)
    }
}

struct DownSubmitter;

#[async_trait]
impl Submitter for DownSubmitter {
    async fn submit(&self, _submission: FormSubmission) -> Result<(), BackendError> {
        Err(BackendError::Status {
            status: 503,
            body: "maintenance".into(),
        })
    }
}

fn preview() -> (PreviewSession, Arc<PickyUploader>) {
    let uploader = Arc::new(PickyUploader::default());
    let session = PreviewSession::new(PreviewContext::new(uploader.clone()), Some(inspection()));
    (session, uploader)
}

fn pdf(name: &str) -> FileBlob {
    FileBlob::new(name, "application/pdf", b"%PDF-1.7".to_vec())
}

fn jpeg(name: &str) -> FileBlob {
    FileBlob::new(name, "image/jpeg", vec![0xff, 0xd8, 0xff, 0xe0])
}

#[tokio::test]
async fn file_upload_replaces_the_answer() {
    let (mut session, uploader) = preview();
    session.upload("109", pdf("report.pdf")).await.expect("first");
    let second = session.upload("109", pdf("report-v2.pdf")).await.expect("second");

    match session.answers().get("109") {
        Some(AnswerValue::File(file)) => {
            assert_eq!(file, &second);
            assert_eq!(file.name, "report-v2.pdf");
            assert_eq!(file.mime_type, "application/pdf");
            assert_eq!(file.size, 8);
            assert!(file.url.starts_with("memory://form-uploads/report-v2_"));
        }
        other => panic!("unexpected answer {other:?}"),
    }
    let state = session.upload_state("109").expect("state");
    assert_eq!(state.progress, 100);
    assert!(!state.uploading);
    assert!(state.error.is_none());

    let options = uploader.seen_options.lock().unwrap().clone();
    assert_eq!(options[0].folder, "form-uploads");
    assert!(options[0].use_unique_file_name);
    assert_eq!(options[0].tags, vec!["form-submission".to_string()]);
}

#[tokio::test]
async fn image_uploads_append_and_can_be_removed() {
    let (mut session, _) = preview();
    session.upload("110", jpeg("front.jpg")).await.unwrap();
    session.upload("110", jpeg("back.jpg")).await.unwrap();

    let names = |session: &PreviewSession| match session.answers().get("110") {
        Some(AnswerValue::Images(images)) => images.iter().map(|image| image.name.clone()).collect(),
        _ => Vec::<String>::new(),
    };
    assert_eq!(names(&session), vec!["front.jpg", "back.jpg"]);

    let removed = session.remove_image("110", 0).expect("remove");
    assert_eq!(removed.name, "front.jpg");
    assert_eq!(names(&session), vec!["back.jpg"]);
    assert!(matches!(
        session.remove_image("110", 5),
        Err(PreviewError::ImageOutOfRange { index: 5, .. })
    ));
}

#[tokio::test]
async fn failed_upload_only_touches_its_own_field() {
    let (mut session, _) = preview();
    session.set_text("101", "Dana").unwrap();
    session.upload("110", jpeg("front.jpg")).await.unwrap();
    session.upload("109", pdf("report.pdf")).await.unwrap();
    let before = session.answers().clone();

    let err = session.upload("109", pdf("bad.pdf")).await.expect_err("rejected");
    assert!(matches!(err, PreviewError::Upload(UploadError::Rejected(_))));

    assert_eq!(session.answers(), &before);
    let failed = session.upload_state("109").expect("state");
    assert_eq!(failed.progress, 0);
    assert_eq!(failed.error.as_deref(), Some(notify::UPLOAD_FAILED));
    assert!(!failed.uploading);
    let other = session.upload_state("110").expect("state");
    assert_eq!(other.progress, 100);
    assert!(other.error.is_none());

    session.upload("109", pdf("retry.pdf")).await.expect("retry");
    assert!(session.upload_state("109").unwrap().error.is_none());
}

#[tokio::test]
async fn uploads_are_limited_to_file_fields() {
    let (mut session, _) = preview();
    let err = session.upload("101", pdf("report.pdf")).await.expect_err("text field");
    assert!(matches!(err, PreviewError::WrongFieldType { .. }));
    assert!(session.upload_state("101").is_none());
}

#[test]
fn a_second_upload_waits_for_the_first() {
    let (mut session, _) = preview();
    session.begin_upload("109").expect("begin");
    assert!(session.upload_state("109").unwrap().uploading);
    assert!(matches!(
        session.begin_upload("109"),
        Err(PreviewError::UploadInFlight(_))
    ));
    session.begin_upload("110").expect("other field is free");
}

#[tokio::test]
async fn images_go_through_the_optimizer_when_enabled() {
    let optimizer = Arc::new(CountingOptimizer::default());
    let ctx = PreviewContext::new(Arc::new(MemoryUploader::new())).with_optimizer(optimizer.clone());
    let mut session = PreviewSession::new(ctx, Some(inspection()));
    session.upload("110", jpeg("front.jpg")).await.unwrap();
    session.upload("109", pdf("report.pdf")).await.unwrap();
    assert_eq!(optimizer.calls.load(Ordering::SeqCst), 1);
}

#[test]
fn setters_check_the_field_type() {
    let (mut session, _) = preview();
    assert!(matches!(
        session.set_number("101", 3.0),
        Err(PreviewError::WrongFieldType { .. })
    ));
    assert!(matches!(
        session.set_text("999", "x"),
        Err(PreviewError::UnknownField(_))
    ));
    session.select_option("106", "Grey").expect("raw option");
    assert!(session.select_option("106", "Purple").is_err());
    assert!(matches!(
        session.set_rating("111", 6),
        Err(PreviewError::Model(_))
    ));
}

#[test]
fn number_inputs_refuse_non_finite_values() {
    let (mut session, _) = preview();
    for value in [f64::NAN, f64::INFINITY, f64::NEG_INFINITY] {
        let err = session.set_number("103", value).expect_err("not finite");
        assert!(matches!(err, PreviewError::Model(_)), "{err:?}");
        assert!(matches!(
            session.set_answer("103", AnswerValue::Number(value)),
            Err(PreviewError::Model(_))
        ));
    }
    assert!(session.answers().get("103").is_none());
    session.set_number("103", 4.0).expect("finite");
    assert_eq!(session.answers().get("103"), Some(&AnswerValue::Number(4.0)));
}

#[test]
fn unsaved_fields_with_the_same_placeholder_keep_separate_answers() {
    let ctx = PreviewContext::new(Arc::new(MemoryUploader::new()));
    let mut session = PreviewSession::new(ctx, Some(unsaved()));
    let keys = session
        .payload()
        .sections
        .iter()
        .flat_map(|section| section.fields.iter().map(|field| field.key.clone()))
        .collect::<Vec<_>>();
    assert_eq!(
        keys,
        vec!["section-1/field-1", "section-1/field-2", "section-2/field-1"]
    );

    session.set_text("section-2/field-1", "hello").expect("text field");
    session.select_option("section-1/field-1", "Musty").expect("radio field");
    assert!(matches!(
        session.set_text("field-1", "hello"),
        Err(PreviewError::UnknownField(_))
    ));

    assert_eq!(
        widget_for(&session, "section-2/field-1"),
        Widget::TextInput {
            value: "hello".into()
        }
    );
    assert!(matches!(
        widget_for(&session, "section-1/field-1"),
        Widget::RadioGroup { selected: Some(ref value), .. } if value == "Musty"
    ));
    assert_eq!(session.payload().status, PreviewStatus::Complete);
}

#[test]
fn checkbox_toggles_keep_a_set() {
    let (mut session, _) = preview();
    session.toggle_checkbox("107", "drywall", true).unwrap();
    session.toggle_checkbox("107", "carpet", true).unwrap();
    session.toggle_checkbox("107", "drywall", true).unwrap();
    session.toggle_checkbox("107", "carpet", false).unwrap();
    assert_eq!(
        session.answers().get("107"),
        Some(&AnswerValue::Choices(vec!["drywall".into()]))
    );
}

#[tokio::test]
async fn submit_merges_signature_pads() {
    let submitter = Arc::new(MemorySubmitter::new());
    let ctx = PreviewContext::new(Arc::new(MemoryUploader::new())).with_submitter(submitter.clone());
    let mut session = PreviewSession::new(ctx, Some(inspection()));
    session.set_text("101", "Dana").unwrap();
    session.select_option("106", "Black").unwrap();
    session.set_rating("111", 4).unwrap();
    {
        let pad = session.signature_pad("112").unwrap();
        pad.begin_stroke(Point::new(10.0, 10.0));
        pad.extend_stroke(Point::new(40.0, 25.0));
    }

    let submission = session.submit().await.expect("submit").expect("submitter");
    assert_eq!(submission.form_id, Some(7));
    assert_eq!(submission.answers.get("101"), Some(&json!("Dana")));
    assert_eq!(submission.answers.get("111"), Some(&json!(4)));
    let signature = submission.answers.get("112").and_then(Value::as_str).expect("signature");
    assert!(signature.starts_with("data:image/svg+xml;base64,"));
    assert!(submission.submitted_at.is_some());
    assert_eq!(submitter.submissions(), vec![submission]);
    assert!(!session.is_submitting());
}

#[tokio::test]
async fn empty_signature_pads_are_left_out() {
    let submitter = Arc::new(MemorySubmitter::new());
    let ctx = PreviewContext::new(Arc::new(MemoryUploader::new())).with_submitter(submitter.clone());
    let mut session = PreviewSession::new(ctx, Some(inspection()));
    {
        let pad = session.signature_pad("112").unwrap();
        pad.begin_stroke(Point::new(1.0, 1.0));
        pad.clear();
    }
    let submission = session.submit().await.unwrap().unwrap();
    assert!(!submission.answers.contains_key("112"));
}

#[tokio::test]
async fn submit_without_a_submitter_does_nothing() {
    let (mut session, _) = preview();
    session.set_text("101", "Dana").unwrap();
    assert_eq!(session.submit().await.expect("no-op"), None);
}

#[test]
fn only_one_submission_at_a_time() {
    let (mut session, _) = preview();
    session.begin_submit().expect("begin");
    assert!(session.is_submitting());
    assert!(session.payload().submitting);
    assert!(matches!(
        session.begin_submit(),
        Err(PreviewError::SubmissionInFlight)
    ));
    session.finish_submit();
    assert!(session.begin_submit().is_ok());
}

#[tokio::test]
async fn submit_failure_is_returned_and_clears_the_flag() {
    let ctx = PreviewContext::new(Arc::new(MemoryUploader::new())).with_submitter(Arc::new(DownSubmitter));
    let mut session = PreviewSession::new(ctx, Some(inspection()));
    let err = session.submit().await.expect_err("down");
    assert!(matches!(err, PreviewError::Submit(BackendError::Status { status: 503, .. })));
    assert!(!session.is_submitting());
}

#[test]
fn seeding_skips_values_that_do_not_fit() {
    let (mut session, _) = preview();
    let rejected = session.seed(&json!({
        "101": "Dana",
        "103": "not a number",
        "111": 3,
        "555": "orphan"
    }));
    let keys: Vec<&str> = rejected.iter().map(|(key, _)| key.as_str()).collect();
    assert_eq!(keys, vec!["103", "555"]);
    assert_eq!(session.answers().len(), 2);
}

#[test]
fn payload_tracks_pending_signatures() {
    let (mut session, _) = preview();
    session
        .signature_pad("112")
        .unwrap()
        .begin_stroke(Point::new(3.0, 4.0));
    let payload = session.payload();
    assert_eq!(payload.status, PreviewStatus::NeedInput);
    let widget = payload
        .sections
        .iter()
        .flat_map(|section| section.fields.iter())
        .find(|field| field.key == "112")
        .map(|field| field.widget.clone())
        .expect("signature field");
    assert!(matches!(
        widget,
        Widget::SignaturePad {
            pending_strokes: 1,
            ..
        }
    ));
}

#[test]
fn empty_preview_without_a_form() {
    let session = PreviewSession::new(PreviewContext::new(Arc::new(MemoryUploader::new())), None);
    let payload = session.payload();
    assert_eq!(payload.status, PreviewStatus::Empty);
    assert!(payload.empty_state.is_some());
}
