use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ordering::{DraftKind, Ordered, SortKey};
use crate::spec::{FieldSpec, FormId, SectionId, null_as_default};

/// A named, ordered group of fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct SectionSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<SectionId>,
    pub name: String,
    #[serde(default)]
    pub order: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub form_id: Option<FormId>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub fields: Vec<FieldSpec>,
}

impl SectionSpec {
    pub fn new(name: impl Into<String>, order: u32) -> Self {
        Self {
            id: None,
            name: name.into(),
            order,
            form_id: None,
            fields: Vec::new(),
        }
    }

    pub fn field(&self, key: &SortKey) -> Option<&FieldSpec> {
        self.fields.iter().find(|field| field.sort_key() == *key)
    }

    pub fn field_mut(&mut self, key: &SortKey) -> Option<&mut FieldSpec> {
        self.fields.iter_mut().find(|field| field.sort_key() == *key)
    }

    /// True when both keys name fields of this section.
    pub fn contains_fields(&self, first: &SortKey, second: &SortKey) -> bool {
        self.field(first).is_some() && self.field(second).is_some()
    }
}

impl Ordered for SectionSpec {
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
                kind: DraftKind::Section,
                order: self.order,
            },
        }
    }
}
