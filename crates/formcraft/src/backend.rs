//! Form persistence collaborators.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;
use formcraft_spec::{FormId, FormSpec};

use crate::error::BackendError;

#[cfg(feature = "http")]
pub use crate::http::HttpFormBackend;

/// Remote procedures the builder persists through.
///
/// `create_form` and `update_form` receive the full form tree and return the
/// stored tree with server-assigned identities.
#[async_trait]
pub trait FormBackend: Send + Sync {
    async fn create_form(&self, form: &FormSpec) -> Result<FormSpec, BackendError>;
    async fn update_form(&self, id: FormId, form: &FormSpec) -> Result<FormSpec, BackendError>;
    async fn delete_form(&self, id: FormId) -> Result<(), BackendError>;
    async fn list_forms(&self) -> Result<Vec<FormSpec>, BackendError>;
    async fn get_form(&self, id: FormId) -> Result<FormSpec, BackendError>;
}

/// Process-local store. Ids for forms, sections and fields come from one
/// counter; the last write to a form wins.
#[derive(Debug)]
pub struct InMemoryFormBackend {
    forms: DashMap<FormId, FormSpec>,
    next_id: AtomicI64,
}

impl Default for InMemoryFormBackend {
    fn default() -> Self {
        Self {
            forms: DashMap::new(),
            next_id: AtomicI64::new(1),
        }
    }
}

impl InMemoryFormBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.forms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forms.is_empty()
    }

    fn allocate(&self) -> i64 {
        self.next_id.fetch_add(1, Ordering::SeqCst)
    }

    fn stamp(&self, form_id: FormId, form: &FormSpec) -> FormSpec {
        let mut stored = form.clone();
        stored.id = Some(form_id);
        for section in &mut stored.sections {
            let section_id = *section.id.get_or_insert_with(|| self.allocate());
            section.form_id = Some(form_id);
            for field in &mut section.fields {
                field.id.get_or_insert_with(|| self.allocate());
                field.section_id = Some(section_id);
            }
        }
        stored
    }
}

#[async_trait]
impl FormBackend for InMemoryFormBackend {
    async fn create_form(&self, form: &FormSpec) -> Result<FormSpec, BackendError> {
        let id = self.allocate();
        let stored = self.stamp(id, form);
        self.forms.insert(id, stored.clone());
        Ok(stored)
    }

    async fn update_form(&self, id: FormId, form: &FormSpec) -> Result<FormSpec, BackendError> {
        if !self.forms.contains_key(&id) {
            return Err(BackendError::NotFound(id));
        }
        let stored = self.stamp(id, form);
        self.forms.insert(id, stored.clone());
        Ok(stored)
    }

    async fn delete_form(&self, id: FormId) -> Result<(), BackendError> {
        self.forms
            .remove(&id)
            .map(|_| ())
            .ok_or(BackendError::NotFound(id))
    }

    async fn list_forms(&self) -> Result<Vec<FormSpec>, BackendError> {
        let mut forms = self
            .forms
            .iter()
            .map(|entry| entry.value().clone())
            .collect::<Vec<_>>();
        forms.sort_by_key(|form| form.id);
        Ok(forms)
    }

    async fn get_form(&self, id: FormId) -> Result<FormSpec, BackendError> {
        self.forms
            .get(&id)
            .map(|entry| entry.value().clone())
            .ok_or(BackendError::NotFound(id))
    }
}

#[cfg(test)]
mod tests {
    use formcraft_spec::{FieldSpec, FieldType, SectionSpec};

    use super::*;

    #[tokio::test]
    async fn create_assigns_identities_throughout_the_tree() {
        let backend = InMemoryFormBackend::new();
        let mut form = FormSpec::draft();
        let mut section = SectionSpec::new("Section 1", 1);
        section
            .fields
            .push(FieldSpec::new("New Field1", FieldType::Text, 1));
        form.sections.push(section);

        let stored = backend.create_form(&form).await.expect("create");
        let form_id = stored.id.expect("form id");
        let section = &stored.sections[0];
        assert_eq!(section.form_id, Some(form_id));
        assert!(section.id.is_some());
        assert_eq!(section.fields[0].section_id, section.id);
        assert!(section.fields[0].id.is_some());
    }

    #[tokio::test]
    async fn update_of_unknown_form_is_not_found() {
        let backend = InMemoryFormBackend::new();
        let err = backend
            .update_form(42, &FormSpec::draft())
            .await
            .expect_err("missing form");
        assert!(matches!(err, BackendError::NotFound(42)));
    }
}
