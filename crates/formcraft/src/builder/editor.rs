use formcraft_spec::{FieldOption, FieldSpec, FieldType, ModelError, slugify};

/// Local edits to a single field. Nothing here talks to the backend.
#[derive(Debug)]
pub struct FieldEditor<'a> {
    field: &'a mut FieldSpec,
}

impl<'a> FieldEditor<'a> {
    pub fn new(field: &'a mut FieldSpec) -> Self {
        Self { field }
    }

    pub fn field(&self) -> &FieldSpec {
        &*self.field
    }

    pub fn rename(&mut self, name: impl Into<String>) -> &mut Self {
        self.field.name = name.into();
        self
    }

    /// Options survive a switch to a type without choices; renderers ignore them.
    pub fn set_type(&mut self, kind: FieldType) -> &mut Self {
        self.field.kind = kind;
        self
    }

    pub fn set_required(&mut self, required: bool) -> &mut Self {
        self.field.is_required = required;
        self
    }

    /// Appends `Option N` / `option-N` where N is the new option count.
    pub fn add_option(&mut self) -> Result<&FieldOption, ModelError> {
        self.ensure_options()?;
        let n = self.field.options.len() as u32 + 1;
        self.field
            .options
            .push(FieldOption::new(format!("Option {n}"), format!("option-{n}"), n));
        Ok(&self.field.options[self.field.options.len() - 1])
    }

    /// Sets the display name and derives the stored value from it.
    pub fn rename_option(&mut self, index: usize, text: &str) -> Result<(), ModelError> {
        self.ensure_options()?;
        let len = self.field.options.len();
        let option = self
            .field
            .options
            .get_mut(index)
            .ok_or(ModelError::OptionOutOfRange { index, len })?;
        option.name = text.to_string();
        option.value = slugify(text);
        Ok(())
    }

    pub fn delete_option(&mut self, index: usize) -> Result<FieldOption, ModelError> {
        self.ensure_options()?;
        let len = self.field.options.len();
        if index >= len {
            return Err(ModelError::OptionOutOfRange { index, len });
        }
        let removed = self.field.options.remove(index);
        for (position, option) in self.field.options.iter_mut().enumerate() {
            option.order = Some(position as u32 + 1);
        }
        Ok(removed)
    }

    fn ensure_options(&self) -> Result<(), ModelError> {
        if self.field.kind.has_options() {
            Ok(())
        } else {
            Err(ModelError::OptionsNotSupported(self.field.kind))
        }
    }
}
