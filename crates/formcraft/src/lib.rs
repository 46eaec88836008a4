#![allow(missing_docs)]

pub mod backend;
pub mod builder;
pub mod catalog;
#[cfg(feature = "cli")]
pub mod cli;
#[cfg(feature = "cli")]
pub mod cmd;
pub mod config;
pub mod context;
pub mod error;
#[cfg(feature = "http")]
pub mod http;
pub mod logging;
pub mod notify;
pub mod preview;

pub use backend::{FormBackend, InMemoryFormBackend};
pub use builder::dnd::{
    Direction, DragController, DragKind, OrderingPreview, ReorderGestures, ReorderOutcome,
};
pub use builder::editor::FieldEditor;
pub use builder::{BuilderSession, SaveKind, SaveOutcome, SaveTicket};
pub use catalog::FormCatalog;
pub use config::{ConfigError, FormcraftConfig};
pub use context::{BuilderContext, PreviewContext};
pub use error::{BackendError, BuilderError, PreviewError, UploadError};
#[cfg(feature = "http")]
pub use http::HttpFormBackend;
pub use notify::{MemoryNotifier, Notification, NotificationLevel, Notifier, TracingNotifier};
pub use preview::PreviewSession;
