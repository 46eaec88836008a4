//! Collaborator handles passed explicitly into sessions.

use std::fmt;
use std::sync::Arc;

use crate::backend::{FormBackend, InMemoryFormBackend};
use crate::config::UploadConfig;
use crate::notify::{Notifier, TracingNotifier};
use crate::preview::submit::Submitter;
use crate::preview::upload::{ImageOptimizer, PassthroughOptimizer, UploadOptions, Uploader};

/// What a [`crate::BuilderSession`] persists through and reports to.
#[derive(Clone)]
pub struct BuilderContext {
    pub backend: Arc<dyn FormBackend>,
    pub notifier: Arc<dyn Notifier>,
}

impl BuilderContext {
    pub fn new(backend: Arc<dyn FormBackend>, notifier: Arc<dyn Notifier>) -> Self {
        Self { backend, notifier }
    }

    /// Process-local backend with notifications routed to tracing.
    pub fn in_memory() -> Self {
        Self::new(
            Arc::new(InMemoryFormBackend::new()),
            Arc::new(TracingNotifier),
        )
    }
}

impl fmt::Debug for BuilderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BuilderContext").finish_non_exhaustive()
    }
}

/// What a [`crate::PreviewSession`] uploads and submits through.
#[derive(Clone)]
pub struct PreviewContext {
    pub uploader: Arc<dyn Uploader>,
    pub optimizer: Arc<dyn ImageOptimizer>,
    /// Without a submitter the preview is read-only and submit does nothing.
    pub submitter: Option<Arc<dyn Submitter>>,
    pub upload_options: UploadOptions,
    pub optimize_images: bool,
}

impl PreviewContext {
    pub fn new(uploader: Arc<dyn Uploader>) -> Self {
        Self {
            uploader,
            optimizer: Arc::new(PassthroughOptimizer),
            submitter: None,
            upload_options: UploadOptions::default(),
            optimize_images: false,
        }
    }

    pub fn with_submitter(mut self, submitter: Arc<dyn Submitter>) -> Self {
        self.submitter = Some(submitter);
        self
    }

    pub fn with_optimizer(mut self, optimizer: Arc<dyn ImageOptimizer>) -> Self {
        self.optimizer = optimizer;
        self.optimize_images = true;
        self
    }

    /// Applies the `[upload]` table of the configuration file.
    pub fn with_upload_config(mut self, config: &UploadConfig) -> Self {
        self.upload_options = UploadOptions {
            folder: config.folder.clone(),
            use_unique_file_name: config.use_unique_file_name,
            tags: config.tags.clone(),
        };
        self.optimize_images = config.optimize_images;
        self
    }
}

impl fmt::Debug for PreviewContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PreviewContext")
            .field("upload_options", &self.upload_options)
            .field("optimize_images", &self.optimize_images)
            .field("has_submitter", &self.submitter.is_some())
            .finish_non_exhaustive()
    }
}
