use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use formcraft_spec::FormSubmission;

use crate::error::BackendError;

/// Receives the flat answer object when the preview is submitted.
#[async_trait]
pub trait Submitter: Send + Sync {
    async fn submit(&self, submission: FormSubmission) -> Result<(), BackendError>;
}

/// Keeps submissions in memory.
#[derive(Debug, Default)]
pub struct MemorySubmitter {
    submissions: Mutex<Vec<FormSubmission>>,
}

impl MemorySubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn submissions(&self) -> Vec<FormSubmission> {
        self.submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl Submitter for MemorySubmitter {
    async fn submit(&self, submission: FormSubmission) -> Result<(), BackendError> {
        self.submissions
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(submission);
        Ok(())
    }
}
