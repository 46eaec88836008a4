use serde_json::Value;

use crate::{PreviewPayload, render_json_ui, render_text};

/// Output format a preview payload can be rendered into.
pub trait PreviewFrontend {
    type Output;

    fn render(&self, payload: &PreviewPayload) -> Self::Output;
}

/// Plain-text listing, one line per field.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextFrontend;

impl PreviewFrontend for TextFrontend {
    type Output = String;

    fn render(&self, payload: &PreviewPayload) -> String {
        render_text(payload)
    }
}

/// Widget tree for JSON-driven clients.
#[derive(Debug, Default, Clone, Copy)]
pub struct JsonFrontend;

impl PreviewFrontend for JsonFrontend {
    type Output = Value;

    fn render(&self, payload: &PreviewPayload) -> Value {
        render_json_ui(payload)
    }
}
