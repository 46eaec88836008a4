use std::sync::Arc;

use formcraft_spec::{FormId, FormSpec, normalize_form};
use tracing::{debug, warn};

use crate::backend::FormBackend;
use crate::builder::BuilderSession;
use crate::context::BuilderContext;
use crate::error::BackendError;
use crate::notify::{self, Notification, Notifier};

/// The list of forms an organization owns, as last fetched.
pub struct FormCatalog {
    backend: Arc<dyn FormBackend>,
    notifier: Arc<dyn Notifier>,
    forms: Vec<FormSpec>,
}

impl FormCatalog {
    pub fn new(ctx: &BuilderContext) -> Self {
        Self {
            backend: ctx.backend.clone(),
            notifier: ctx.notifier.clone(),
            forms: Vec::new(),
        }
    }

    pub fn forms(&self) -> &[FormSpec] {
        &self.forms
    }

    /// Refetches the list. On failure the previous list is kept.
    pub async fn refresh(&mut self) -> Result<&[FormSpec], BackendError> {
        match self.backend.list_forms().await {
            Ok(mut forms) => {
                forms.iter_mut().for_each(normalize_form);
                debug!(count = forms.len(), "forms loaded");
                self.forms = forms;
                Ok(&self.forms)
            }
            Err(err) => {
                warn!(error = %err, "loading forms failed");
                self.notifier
                    .notify(Notification::error(notify::FORMS_LOAD_FAILED));
                Err(err)
            }
        }
    }

    pub fn find(&self, id: FormId) -> Option<&FormSpec> {
        self.forms.iter().find(|form| form.id == Some(id))
    }

    /// Forms tagged with the given damage (loss) type.
    pub fn for_loss_type(&self, loss_type: &str) -> Vec<&FormSpec> {
        self.forms
            .iter()
            .filter(|form| form.damage_types.iter().any(|tag| tag == loss_type))
            .collect()
    }

    /// Fetches one form straight from the backend.
    pub async fn open(&self, id: FormId) -> Result<FormSpec, BackendError> {
        let mut form = self.backend.get_form(id).await?;
        normalize_form(&mut form);
        Ok(form)
    }

    /// Refreshes the list and reloads the session's form from it, so the
    /// editor shows what the backend stored. A session with unsaved edits
    /// keeps its local tree.
    pub async fn resync(&mut self, session: &mut BuilderSession) -> Result<(), BackendError> {
        let selected = session.form().and_then(|form| form.id);
        self.refresh().await?;
        if !session.is_dirty()
            && let Some(id) = selected
            && let Some(form) = self.find(id).cloned()
        {
            session.select(Some(form));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::backend::InMemoryFormBackend;
    use crate::notify::MemoryNotifier;

    async fn seeded() -> (BuilderContext, Arc<MemoryNotifier>) {
        let backend = Arc::new(InMemoryFormBackend::new());
        for (name, tags) in [("Water", vec!["water", "mold"]), ("Fire", vec!["fire"])] {
            let mut form = FormSpec::draft();
            form.name = name.to_string();
            form.damage_types = tags.into_iter().map(str::to_string).collect();
            backend.create_form(&form).await.expect("create");
        }
        let notifier = Arc::new(MemoryNotifier::new());
        (BuilderContext::new(backend, notifier.clone()), notifier)
    }

    #[tokio::test]
    async fn refresh_and_filter_by_loss_type() {
        let (ctx, _) = seeded().await;
        let mut catalog = FormCatalog::new(&ctx);
        assert_eq!(catalog.refresh().await.expect("refresh").len(), 2);
        let mold: Vec<&str> = catalog
            .for_loss_type("mold")
            .into_iter()
            .map(|form| form.name.as_str())
            .collect();
        assert_eq!(mold, vec!["Water"]);
        assert!(catalog.for_loss_type("wind").is_empty());
    }

    #[tokio::test]
    async fn resync_reloads_a_clean_session() {
        let (ctx, _) = seeded().await;
        let mut catalog = FormCatalog::new(&ctx);
        catalog.refresh().await.unwrap();
        let water = catalog.forms()[0].clone();
        let id = water.id.expect("id");

        let mut session = BuilderSession::new(ctx.clone());
        session.select(Some(water.clone()));
        let mut renamed = water;
        renamed.name = "Water v2".into();
        ctx.backend.update_form(id, &renamed).await.unwrap();

        catalog.resync(&mut session).await.expect("resync");
        assert_eq!(session.form().map(|form| form.name.as_str()), Some("Water v2"));
        assert_eq!(catalog.find(id).map(|form| form.name.as_str()), Some("Water v2"));
    }

    #[tokio::test]
    async fn resync_keeps_unsaved_edits() {
        let (ctx, _) = seeded().await;
        let mut catalog = FormCatalog::new(&ctx);
        catalog.refresh().await.unwrap();
        let mut session = BuilderSession::new(ctx);
        session.select(catalog.forms().first().cloned());
        session.set_name("Local draft").unwrap();

        catalog.resync(&mut session).await.unwrap();
        assert_eq!(session.form().map(|form| form.name.as_str()), Some("Local draft"));
        assert!(session.is_dirty());
    }

    #[tokio::test]
    async fn open_reports_missing_forms() {
        let (ctx, _) = seeded().await;
        let catalog = FormCatalog::new(&ctx);
        assert!(matches!(catalog.open(99).await, Err(BackendError::NotFound(99))));
    }
}
