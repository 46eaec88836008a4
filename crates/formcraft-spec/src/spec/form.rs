use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::ordering::{Ordered, SortKey};
use crate::spec::{FieldSpec, FormId, SectionSpec, null_as_default};

/// Top-level form template: ordered sections plus the damage categories it applies to.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FormSpec {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<FormId>,
    #[serde(default)]
    pub name: String,
    #[serde(
        default,
        rename = "desc",
        alias = "description",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub sections: Vec<SectionSpec>,
    #[serde(
        default,
        alias = "lossTypes",
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub damage_types: Vec<String>,
}

impl FormSpec {
    /// The blank form offered by "New Form": empty name and description, no sections.
    pub fn draft() -> Self {
        Self {
            description: Some(String::new()),
            ..Self::default()
        }
    }

    pub fn is_persisted(&self) -> bool {
        self.id.is_some()
    }

    pub fn section(&self, key: &SortKey) -> Option<&SectionSpec> {
        self.sections.iter().find(|section| section.sort_key() == *key)
    }

    pub fn section_mut(&mut self, key: &SortKey) -> Option<&mut SectionSpec> {
        self.sections
            .iter_mut()
            .find(|section| section.sort_key() == *key)
    }

    /// Sections in ascending `order`.
    pub fn ordered_sections(&self) -> Vec<&SectionSpec> {
        let mut sections = self.sections.iter().collect::<Vec<_>>();
        sections.sort_by_key(|section| section.order);
        sections
    }

    /// Every field with its answer key, in display order: sections by
    /// order, then fields by order.
    pub fn answer_fields(&self) -> Vec<(String, &FieldSpec)> {
        self.ordered_sections()
            .into_iter()
            .flat_map(|section| {
                let mut fields = section.fields.iter().collect::<Vec<_>>();
                fields.sort_by_key(|field| field.order);
                fields
                    .into_iter()
                    .map(move |field| (field.answer_key(section), field))
            })
            .collect()
    }

    /// Looks a field up by the key its answers are stored under.
    pub fn field_by_answer_key(&self, key: &str) -> Option<&FieldSpec> {
        self.sections.iter().find_map(|section| {
            section
                .fields
                .iter()
                .find(|field| field.answer_key(section) == key)
        })
    }

    pub fn field_count(&self) -> usize {
        self.sections.iter().map(|section| section.fields.len()).sum()
    }
}
