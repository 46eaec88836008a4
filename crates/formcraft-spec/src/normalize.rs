use once_cell::sync::Lazy;
use regex::Regex;

use crate::ordering::{renumber, sort_by_order};
use crate::spec::{FieldOption, FormSpec, OptionSpec};

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));

/// Lowercases and replaces every whitespace run with `-`: "Option One" becomes "option-one".
pub fn slugify(text: &str) -> String {
    WHITESPACE.replace_all(&text.to_lowercase(), "-").into_owned()
}

pub fn normalize_options(raw: Vec<OptionSpec>) -> Vec<FieldOption> {
    raw.into_iter().map(FieldOption::from).collect()
}

/// Brings a loaded form into the shape the editor works with: sections and
/// fields sorted by `order` and renumbered densely, and fields stamped with
/// their section's id.
pub fn normalize_form(form: &mut FormSpec) {
    sort_by_order(&mut form.sections);
    renumber(&mut form.sections);
    for section in &mut form.sections {
        if section.form_id.is_none() {
            section.form_id = form.id;
        }
        sort_by_order(&mut section.fields);
        renumber(&mut section.fields);
        for field in &mut section.fields {
            if section.id.is_some() {
                field.section_id = section.id;
            }
        }
    }
}
