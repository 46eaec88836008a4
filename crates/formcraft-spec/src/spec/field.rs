use std::fmt;

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ordering::{DraftKind, Ordered, SortKey};
use crate::spec::{FieldId, SectionId, SectionSpec, null_as_default};

/// Input kinds a field can be authored as.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FieldType {
    Text,
    Textarea,
    Number,
    Date,
    Time,
    Radio,
    Checkbox,
    Select,
    File,
    Image,
    Rating,
    Signature,
}

impl FieldType {
    pub const ALL: [FieldType; 12] = [
        FieldType::Text,
        FieldType::Textarea,
        FieldType::Number,
        FieldType::Date,
        FieldType::Time,
        FieldType::Radio,
        FieldType::Checkbox,
        FieldType::Select,
        FieldType::File,
        FieldType::Image,
        FieldType::Rating,
        FieldType::Signature,
    ];

    /// Wire label, e.g. `TEXTAREA`.
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldType::Text => "TEXT",
            FieldType::Textarea => "TEXTAREA",
            FieldType::Number => "NUMBER",
            FieldType::Date => "DATE",
            FieldType::Time => "TIME",
            FieldType::Radio => "RADIO",
            FieldType::Checkbox => "CHECKBOX",
            FieldType::Select => "SELECT",
            FieldType::File => "FILE",
            FieldType::Image => "IMAGE",
            FieldType::Rating => "RATING",
            FieldType::Signature => "SIGNATURE",
        }
    }

    /// Label shown in the type picker of the field editor.
    pub fn label(&self) -> &'static str {
        match self {
            FieldType::Text => "Text",
            FieldType::Textarea => "Text Area",
            FieldType::Number => "Number",
            FieldType::Date => "Date",
            FieldType::Time => "Time",
            FieldType::Radio => "Radio",
            FieldType::Checkbox => "Checkbox",
            FieldType::Select => "Select",
            FieldType::File => "File Upload",
            FieldType::Image => "Image Upload",
            FieldType::Rating => "Rating",
            FieldType::Signature => "Signature",
        }
    }

    /// Radio, checkbox and select fields carry a list of options.
    pub fn has_options(&self) -> bool {
        matches!(
            self,
            FieldType::Radio | FieldType::Checkbox | FieldType::Select
        )
    }

    pub fn is_upload(&self) -> bool {
        matches!(self, FieldType::File | FieldType::Image)
    }
}

impl fmt::Display for FieldType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A choice as it appears in stored forms: older records keep bare strings,
/// newer ones keep `{name, value, order}` objects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(untagged)]
pub enum OptionSpec {
    Raw(String),
    Structured {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        id: Option<i64>,
        name: String,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        value: Option<String>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        order: Option<u32>,
    },
}

/// A normalized choice. Deserialization goes through [`OptionSpec`], so a
/// bare string `s` always loads as `{name: s, value: s}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(from = "OptionSpec")]
pub struct FieldOption {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub name: String,
    pub value: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub order: Option<u32>,
}

impl FieldOption {
    pub fn new(name: impl Into<String>, value: impl Into<String>, order: u32) -> Self {
        Self {
            id: None,
            name: name.into(),
            value: value.into(),
            order: Some(order),
        }
    }
}

impl From<OptionSpec> for FieldOption {
    fn from(spec: OptionSpec) -> Self {
        match spec {
            OptionSpec::Raw(text) => Self {
                id: None,
                name: text.clone(),
                value: text,
                order: None,
            },
            OptionSpec::Structured {
                id,
                name,
                value,
                order,
            } => Self {
                id,
                value: value.unwrap_or_else(|| name.clone()),
                name,
                order,
            },
        }
    }
}

/// Definition of a single input inside a section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FieldId>,
    pub name: String,
    #[serde(rename = "type")]
    pub kind: FieldType,
    #[serde(default)]
    pub is_required: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub section_id: Option<SectionId>,
    #[serde(default)]
    pub order: u32,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub options: Vec<FieldOption>,
}

impl FieldSpec {
    /// An unsaved field with no options.
    pub fn new(name: impl Into<String>, kind: FieldType, order: u32) -> Self {
        Self {
            id: None,
            name: name.into(),
            kind,
            is_required: false,
            section_id: None,
            order,
            options: Vec::new(),
        }
    }

    /// Key under which this field's answer is stored in an answer map.
    ///
    /// Persisted fields use their id. Placeholder keys repeat across
    /// sections, so an unsaved field is qualified by its section's key
    /// (`section-2/field-1`).
    pub fn answer_key(&self, section: &SectionSpec) -> String {
        match self.id {
            Some(id) => id.to_string(),
            None => format!("{}/{}", section.sort_key(), self.sort_key()),
        }
    }

    /// Options sorted by their `order`, unordered entries last.
    pub fn sorted_options(&self) -> Vec<&FieldOption> {
        let mut options = self.options.iter().collect::<Vec<_>>();
        options.sort_by_key(|option| option.order.unwrap_or(u32::MAX));
        options
    }
}

impl Ordered for FieldSpec {
    fn order(&self) -> u32 {
        self.order
    }

    fn set_order(&mut self, order: u32) {
        self.order = order;
    }

    fn sort_key(&self) -> SortKey {
        match self.id {
            Some(id) => SortKey::Id(id),
            None => SortKey::Draft {
                kind: DraftKind::Field,
                order: self.order,
            },
        }
    }
}
