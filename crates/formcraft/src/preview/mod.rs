//! Live preview of a form: answer entry, uploads, signatures and submit.

pub mod signature;
pub mod submit;
pub mod upload;

use std::collections::BTreeMap;

use formcraft_spec::{
    AnswerMap, AnswerValue, FieldSpec, FieldType, FormSpec, FormSubmission, ModelError,
    PreviewPayload, PreviewState, UploadState, UploadedFile, build_preview_payload_with_state,
    normalize_form,
};
use serde_json::Value;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{debug, error, info, warn};

use crate::context::PreviewContext;
use crate::error::{PreviewError, UploadError};
use crate::notify;

pub use signature::{Point, SignaturePad, Stroke};
pub use submit::{MemorySubmitter, Submitter};
pub use upload::{
    DirectoryUploader, FileBlob, ImageOptimizer, MemoryUploader, PassthroughOptimizer,
    UploadOptions, UploadReceipt, Uploader,
};

#[derive(Debug)]
pub struct PreviewSession {
    ctx: PreviewContext,
    form: Option<FormSpec>,
    answers: AnswerMap,
    uploads: BTreeMap<String, UploadState>,
    signatures: BTreeMap<String, SignaturePad>,
    submitting: bool,
}

impl PreviewSession {
    pub fn new(ctx: PreviewContext, form: Option<FormSpec>) -> Self {
        Self {
            ctx,
            form: form.map(|mut form| {
                normalize_form(&mut form);
                form
            }),
            answers: AnswerMap::new(),
            uploads: BTreeMap::new(),
            signatures: BTreeMap::new(),
            submitting: false,
        }
    }

    /// Seeds answers from `initial`; returns the keys that were skipped and why.
    pub fn seed(&mut self, initial: &Value) -> Vec<(String, String)> {
        let Some(form) = self.form.as_ref() else {
            return Vec::new();
        };
        let outcome = AnswerMap::seed(form, initial);
        for (key, reason) in &outcome.rejected {
            warn!(key = %key, reason = %reason, "initial value skipped");
        }
        self.answers = outcome.answers;
        outcome.rejected
    }

    pub fn form(&self) -> Option<&FormSpec> {
        self.form.as_ref()
    }

    pub fn answers(&self) -> &AnswerMap {
        &self.answers
    }

    pub fn upload_state(&self, key: &str) -> Option<&UploadState> {
        self.uploads.get(key)
    }

    pub fn is_submitting(&self) -> bool {
        self.submitting
    }

    fn field(&self, key: &str) -> Result<&FieldSpec, PreviewError> {
        self.form
            .as_ref()
            .ok_or(PreviewError::NoForm)?
            .field_by_answer_key(key)
            .ok_or_else(|| PreviewError::UnknownField(key.to_string()))
    }

    fn expect_kind(
        &self,
        key: &str,
        allowed: &[FieldType],
        expected: &'static str,
    ) -> Result<&FieldSpec, PreviewError> {
        let field = self.field(key)?;
        if allowed.contains(&field.kind) {
            Ok(field)
        } else {
            Err(PreviewError::WrongFieldType {
                key: key.to_string(),
                kind: field.kind,
                expected,
            })
        }
    }

    /// Stores `value` after checking it fits the field's type.
    pub fn set_answer(&mut self, key: &str, value: AnswerValue) -> Result<(), PreviewError> {
        let kind = self.field(key)?.kind;
        if !value.fits(kind) {
            return Err(ModelError::AnswerShape {
                key: key.to_string(),
                kind,
                reason: "value does not match the field type".into(),
            }
            .into());
        }
        if let AnswerValue::Number(number) = value {
            AnswerValue::number(key, number)?;
        }
        self.answers.insert(key, value);
        Ok(())
    }

    /// TEXT, TEXTAREA, DATE and TIME inputs.
    pub fn set_text(&mut self, key: &str, text: impl Into<String>) -> Result<(), PreviewError> {
        self.expect_kind(
            key,
            &[
                FieldType::Text,
                FieldType::Textarea,
                FieldType::Date,
                FieldType::Time,
            ],
            "a text input",
        )?;
        self.answers.insert(key, AnswerValue::Text(text.into()));
        Ok(())
    }

    pub fn set_number(&mut self, key: &str, number: f64) -> Result<(), PreviewError> {
        self.expect_kind(key, &[FieldType::Number], "NUMBER")?;
        let value = AnswerValue::number(key, number)?;
        self.answers.insert(key, value);
        Ok(())
    }

    /// Picks a RADIO or SELECT option by value.
    pub fn select_option(&mut self, key: &str, value: &str) -> Result<(), PreviewError> {
        let field = self.expect_kind(key, &[FieldType::Radio, FieldType::Select], "RADIO or SELECT")?;
        ensure_option(field, key, value)?;
        self.answers.insert(key, AnswerValue::Text(value.to_string()));
        Ok(())
    }

    /// Checks or unchecks one CHECKBOX option.
    pub fn toggle_checkbox(
        &mut self,
        key: &str,
        value: &str,
        checked: bool,
    ) -> Result<(), PreviewError> {
        let field = self.expect_kind(key, &[FieldType::Checkbox], "CHECKBOX")?;
        ensure_option(field, key, value)?;
        let mut values = match self.answers.remove(key) {
            Some(AnswerValue::Choices(values)) => values,
            _ => Vec::new(),
        };
        values.retain(|item| item != value);
        if checked {
            values.push(value.to_string());
        }
        self.answers.insert(key, AnswerValue::Choices(values));
        Ok(())
    }

    pub fn set_rating(&mut self, key: &str, stars: i64) -> Result<(), PreviewError> {
        self.expect_kind(key, &[FieldType::Rating], "RATING")?;
        let value = AnswerValue::rating(stars)?;
        self.answers.insert(key, value);
        Ok(())
    }

    pub fn clear_answer(&mut self, key: &str) -> Option<AnswerValue> {
        self.answers.remove(key)
    }

    /// The drawing pad of a SIGNATURE field, created on first use.
    pub fn signature_pad(&mut self, key: &str) -> Result<&mut SignaturePad, PreviewError> {
        self.expect_kind(key, &[FieldType::Signature], "SIGNATURE")?;
        Ok(self.signatures.entry(key.to_string()).or_default())
    }

    /// Removes one image from an IMAGE answer.
    pub fn remove_image(&mut self, key: &str, index: usize) -> Result<UploadedFile, PreviewError> {
        self.expect_kind(key, &[FieldType::Image], "IMAGE")?;
        let out_of_range = || PreviewError::ImageOutOfRange {
            key: key.to_string(),
            index,
        };
        match self.answers.get_mut(key) {
            Some(AnswerValue::Images(images)) if index < images.len() => Ok(images.remove(index)),
            _ => Err(out_of_range()),
        }
    }

    /// Uploads `file` for a FILE or IMAGE field.
    ///
    /// FILE answers are replaced, IMAGE answers get the file appended. A
    /// failure only touches this field's upload state; the previous answer
    /// stays as it was.
    pub async fn upload(&mut self, key: &str, file: FileBlob) -> Result<UploadedFile, PreviewError> {
        let kind = self.begin_upload(key)?;
        let name = file.name.clone();
        let mime_type = file.mime_type.clone();
        let result = self.send(kind, file).await;
        self.finish_upload(key, &name, &mime_type, result)
    }

    async fn send(&self, kind: FieldType, file: FileBlob) -> Result<UploadReceipt, UploadError> {
        let file = if self.ctx.optimize_images && (kind == FieldType::Image || file.is_image()) {
            self.ctx.optimizer.optimize(file).await?
        } else {
            file
        };
        self.ctx
            .uploader
            .upload(file, &self.ctx.upload_options)
            .await
    }

    /// Marks an upload as started: progress 0, previous error cleared.
    pub fn begin_upload(&mut self, key: &str) -> Result<FieldType, PreviewError> {
        let kind = self
            .expect_kind(key, &[FieldType::File, FieldType::Image], "FILE or IMAGE")?
            .kind;
        if self.uploads.get(key).is_some_and(|state| state.uploading) {
            return Err(PreviewError::UploadInFlight(key.to_string()));
        }
        self.uploads.insert(
            key.to_string(),
            UploadState {
                uploading: true,
                progress: 0,
                error: None,
            },
        );
        debug!(key = %key, "upload started");
        Ok(kind)
    }

    pub fn finish_upload(
        &mut self,
        key: &str,
        file_name: &str,
        mime_type: &str,
        result: Result<UploadReceipt, UploadError>,
    ) -> Result<UploadedFile, PreviewError> {
        let kind = self.field(key)?.kind;
        let receipt = match result {
            Ok(receipt) => receipt,
            Err(err) => {
                warn!(key = %key, error = %err, "upload failed");
                self.uploads.insert(
                    key.to_string(),
                    UploadState {
                        uploading: false,
                        progress: 0,
                        error: Some(notify::UPLOAD_FAILED.to_string()),
                    },
                );
                return Err(err.into());
            }
        };

        let uploaded = UploadedFile {
            url: receipt.url,
            name: file_name.to_string(),
            size: receipt.size,
            mime_type: mime_type.to_string(),
            file_id: receipt.file_id,
            file_path: receipt.file_path,
        };
        if kind == FieldType::Image {
            if let Some(AnswerValue::Images(images)) = self.answers.get_mut(key) {
                images.push(uploaded.clone());
            } else {
                self.answers
                    .insert(key, AnswerValue::Images(vec![uploaded.clone()]));
            }
        } else {
            self.answers.insert(key, AnswerValue::File(uploaded.clone()));
        }
        self.uploads.insert(
            key.to_string(),
            UploadState {
                uploading: false,
                progress: 100,
                error: None,
            },
        );
        info!(key = %key, file_id = %uploaded.file_id, "upload stored");
        Ok(uploaded)
    }

    /// Answers merged with every non-empty signature pad; pads win over stored answers.
    pub fn collect_submission(&self) -> FormSubmission {
        let mut answers = self.answers.to_json();
        for (key, pad) in &self.signatures {
            if !pad.is_empty() {
                answers.insert(key.clone(), Value::String(pad.to_data_url()));
            }
        }
        FormSubmission {
            form_id: self.form.as_ref().and_then(|form| form.id),
            answers,
            submitted_at: OffsetDateTime::now_utc().format(&Rfc3339).ok(),
        }
    }

    /// Marks a submission as in flight and returns what it will carry.
    pub fn begin_submit(&mut self) -> Result<FormSubmission, PreviewError> {
        if self.form.is_none() {
            return Err(PreviewError::NoForm);
        }
        if self.submitting {
            return Err(PreviewError::SubmissionInFlight);
        }
        self.submitting = true;
        Ok(self.collect_submission())
    }

    pub fn finish_submit(&mut self) {
        self.submitting = false;
    }

    /// Hands the merged answers to the submitter. Returns `None` when the
    /// preview has no submitter.
    pub async fn submit(&mut self) -> Result<Option<FormSubmission>, PreviewError> {
        let Some(submitter) = self.ctx.submitter.clone() else {
            debug!("preview has no submitter; submit ignored");
            return Ok(None);
        };
        let submission = self.begin_submit()?;
        let result = submitter.submit(submission.clone()).await;
        self.finish_submit();
        match result {
            Ok(()) => {
                info!(form_id = ?submission.form_id, answers = submission.answers.len(), "form submitted");
                Ok(Some(submission))
            }
            Err(err) => {
                error!(error = %err, "form submission failed");
                Err(PreviewError::Submit(err))
            }
        }
    }

    /// Renderer payload reflecting answers, upload state and pending signatures.
    pub fn payload(&self) -> PreviewPayload {
        let state = PreviewState {
            uploads: self.uploads.clone(),
            signature_strokes: self
                .signatures
                .iter()
                .filter(|(_, pad)| !pad.is_empty())
                .map(|(key, pad)| (key.clone(), pad.stroke_count()))
                .collect(),
            submitting: self.submitting,
        };
        build_preview_payload_with_state(self.form.as_ref(), &self.answers, &state)
    }
}

fn ensure_option(field: &FieldSpec, key: &str, value: &str) -> Result<(), ModelError> {
    if field.options.is_empty() || field.options.iter().any(|option| option.value == value) {
        Ok(())
    } else {
        Err(ModelError::AnswerShape {
            key: key.to_string(),
            kind: field.kind,
            reason: format!("`{value}` is not one of the field's options"),
        })
    }
}
