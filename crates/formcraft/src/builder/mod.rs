//! The form builder session: local edits, drag reordering and persistence.
//!
//! Structural additions (a new section or field) are persisted right away
//! with the whole form tree. Renames, field edits, deletions and reorders
//! stay local until [`BuilderSession::save`]. A failed save keeps every local
//! edit; the failure is reported through the notifier and returned.

pub mod dnd;
pub mod editor;

use formcraft_spec::ordering::{Ordered, renumber};
use formcraft_spec::{
    FieldSpec, FieldType, FormId, FormSpec, ModelError, SectionSpec, SortKey, move_by_key,
    normalize_form,
};
use tracing::{debug, error, info};

use crate::context::BuilderContext;
use crate::error::{BackendError, BuilderError};
use crate::notify::{self, Notification};

pub use dnd::{
    Direction, DragController, DragKind, OrderingPreview, ReorderGestures, ReorderOutcome,
};
pub use editor::FieldEditor;

/// Which backend procedure a save dispatches to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveKind {
    Create,
    Update(FormId),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Created(FormId),
    Updated(FormId),
}

impl SaveOutcome {
    pub fn form_id(&self) -> FormId {
        match self {
            SaveOutcome::Created(id) | SaveOutcome::Updated(id) => *id,
        }
    }
}

/// Snapshot of the form handed to the backend by one save.
#[derive(Debug, Clone, PartialEq)]
pub struct SaveTicket {
    pub kind: SaveKind,
    pub form: FormSpec,
}

#[derive(Debug)]
pub struct BuilderSession {
    ctx: BuilderContext,
    form: Option<FormSpec>,
    drag: DragController,
    save_in_flight: bool,
    dirty: bool,
}

impl BuilderSession {
    pub fn new(ctx: BuilderContext) -> Self {
        Self {
            ctx,
            form: None,
            drag: DragController::new(),
            save_in_flight: false,
            dirty: false,
        }
    }

    pub fn form(&self) -> Option<&FormSpec> {
        self.form.as_ref()
    }

    /// Local edits exist that no save has picked up yet.
    pub fn is_dirty(&self) -> bool {
        self.dirty
    }

    pub fn is_saving(&self) -> bool {
        self.save_in_flight
    }

    /// Starts a blank, unsaved form.
    pub fn new_form(&mut self) {
        self.drag.cancel();
        self.form = Some(FormSpec::draft());
        self.dirty = false;
    }

    /// Loads `form` into the editor, or clears the editor with `None`.
    pub fn select(&mut self, form: Option<FormSpec>) {
        self.drag.cancel();
        self.form = form.map(|mut form| {
            normalize_form(&mut form);
            form
        });
        self.dirty = false;
    }

    fn form_mut(&mut self) -> Result<&mut FormSpec, BuilderError> {
        self.form.as_mut().ok_or(BuilderError::NoFormSelected)
    }

    fn touch(&mut self) {
        self.dirty = true;
    }

    pub fn set_name(&mut self, name: impl Into<String>) -> Result<(), BuilderError> {
        self.form_mut()?.name = name.into();
        self.touch();
        Ok(())
    }

    pub fn set_description(&mut self, description: impl Into<String>) -> Result<(), BuilderError> {
        self.form_mut()?.description = Some(description.into());
        self.touch();
        Ok(())
    }

    pub fn set_damage_types(&mut self, damage_types: Vec<String>) -> Result<(), BuilderError> {
        self.form_mut()?.damage_types = damage_types;
        self.touch();
        Ok(())
    }

    /// Appends `Section N` and persists the whole form.
    pub async fn add_section(&mut self) -> Result<SaveOutcome, BuilderError> {
        let form = self.form_mut()?;
        let order = form.sections.len() as u32 + 1;
        let mut section = SectionSpec::new(format!("Section {order}"), order);
        section.form_id = form.id;
        form.sections.push(section);
        debug!(order, "section added");
        self.touch();
        self.save().await
    }

    pub fn rename_section(
        &mut self,
        key: &SortKey,
        name: impl Into<String>,
    ) -> Result<(), BuilderError> {
        let section = self
            .form_mut()?
            .section_mut(key)
            .ok_or_else(|| ModelError::UnknownSection(key.to_string()))?;
        section.name = name.into();
        self.touch();
        Ok(())
    }

    /// Removes a section locally and closes the gap in the ordering.
    pub fn delete_section(&mut self, key: &SortKey) -> Result<SectionSpec, BuilderError> {
        let form = self.form_mut()?;
        let index = form
            .sections
            .iter()
            .position(|section| section.sort_key() == *key)
            .ok_or_else(|| ModelError::UnknownSection(key.to_string()))?;
        let removed = form.sections.remove(index);
        renumber(&mut form.sections);
        debug!(section = %key, "section deleted");
        self.touch();
        Ok(removed)
    }

    /// Appends `New FieldN` (TEXT, optional) to a section and persists the whole form.
    pub async fn add_field(&mut self, section: &SortKey) -> Result<SaveOutcome, BuilderError> {
        let target = self
            .form_mut()?
            .section_mut(section)
            .ok_or_else(|| ModelError::UnknownSection(section.to_string()))?;
        let order = target.fields.len() as u32 + 1;
        let mut field = FieldSpec::new(format!("New Field{order}"), FieldType::Text, order);
        field.section_id = target.id;
        target.fields.push(field);
        debug!(section = %section, order, "field added");
        self.touch();
        self.save().await
    }

    /// Runs local edits against one field. A failing edit is rolled back as a
    /// whole and leaves the session clean.
    pub fn edit_field<R>(
        &mut self,
        section: &SortKey,
        field: &SortKey,
        edit: impl FnOnce(&mut FieldEditor<'_>) -> Result<R, ModelError>,
    ) -> Result<R, BuilderError> {
        let target = self
            .form_mut()?
            .section_mut(section)
            .ok_or_else(|| ModelError::UnknownSection(section.to_string()))?
            .field_mut(field)
            .ok_or_else(|| ModelError::UnknownField(field.to_string()))?;
        let before = target.clone();
        let outcome = edit(&mut FieldEditor::new(target));
        match outcome {
            Ok(result) => {
                self.touch();
                Ok(result)
            }
            Err(err) => {
                *target = before;
                Err(err.into())
            }
        }
    }

    pub fn delete_field(
        &mut self,
        section: &SortKey,
        field: &SortKey,
    ) -> Result<FieldSpec, BuilderError> {
        let target = self
            .form_mut()?
            .section_mut(section)
            .ok_or_else(|| ModelError::UnknownSection(section.to_string()))?;
        let index = target
            .fields
            .iter()
            .position(|candidate| candidate.sort_key() == *field)
            .ok_or_else(|| ModelError::UnknownField(field.to_string()))?;
        let removed = target.fields.remove(index);
        renumber(&mut target.fields);
        debug!(section = %section, field = %field, "field deleted");
        self.touch();
        Ok(removed)
    }

    /// Keyboard reordering of a section: swaps places with its neighbour.
    /// Moving past either end is ignored.
    pub fn move_section(
        &mut self,
        key: &SortKey,
        direction: Direction,
    ) -> Result<ReorderOutcome, BuilderError> {
        let form = self.form_mut()?;
        if form.section(key).is_none() {
            return Err(ModelError::UnknownSection(key.to_string()).into());
        }
        let Some(target) = dnd::neighbor(&form.sections, key, direction) else {
            return Ok(ReorderOutcome::Ignored);
        };
        if !move_by_key(&mut form.sections, key, &target) {
            return Ok(ReorderOutcome::Ignored);
        }
        debug!(section = %key, ?direction, "section moved");
        self.touch();
        Ok(ReorderOutcome::SectionsReordered)
    }

    /// Keyboard reordering of a field within `section`.
    pub fn move_field(
        &mut self,
        section: &SortKey,
        field: &SortKey,
        direction: Direction,
    ) -> Result<ReorderOutcome, BuilderError> {
        let target = self
            .form_mut()?
            .section_mut(section)
            .ok_or_else(|| ModelError::UnknownSection(section.to_string()))?;
        if target.field(field).is_none() {
            return Err(ModelError::UnknownField(field.to_string()).into());
        }
        let Some(neighbor) = dnd::neighbor(&target.fields, field, direction) else {
            return Ok(ReorderOutcome::Ignored);
        };
        if !move_by_key(&mut target.fields, field, &neighbor) {
            return Ok(ReorderOutcome::Ignored);
        }
        debug!(section = %section, field = %field, ?direction, "field moved");
        self.touch();
        Ok(ReorderOutcome::FieldsReordered { section: *section })
    }

    /// The explicit Save/Update action.
    pub async fn save(&mut self) -> Result<SaveOutcome, BuilderError> {
        let ticket = self.begin_save()?;
        let backend = self.ctx.backend.clone();
        let result = match ticket.kind {
            SaveKind::Create => backend.create_form(&ticket.form).await,
            SaveKind::Update(id) => backend.update_form(id, &ticket.form).await,
        };
        self.finish_save(&ticket, result)
    }

    /// Marks a save as in flight and snapshots what it will send.
    pub fn begin_save(&mut self) -> Result<SaveTicket, BuilderError> {
        if self.save_in_flight {
            return Err(BuilderError::SaveInFlight);
        }
        let form = self.form.clone().ok_or(BuilderError::NoFormSelected)?;
        let kind = match form.id {
            Some(id) => SaveKind::Update(id),
            None => SaveKind::Create,
        };
        self.save_in_flight = true;
        Ok(SaveTicket { kind, form })
    }

    /// Applies the backend's answer to a save started with [`Self::begin_save`].
    ///
    /// On success the local tree is replaced by the stored one, unless it was
    /// edited while the save was in flight; then only the form id is adopted.
    pub fn finish_save(
        &mut self,
        ticket: &SaveTicket,
        result: Result<FormSpec, BackendError>,
    ) -> Result<SaveOutcome, BuilderError> {
        self.save_in_flight = false;
        let (ok_message, failed_message) = match ticket.kind {
            SaveKind::Create => (notify::FORM_SAVED, notify::FORM_SAVE_FAILED),
            SaveKind::Update(_) => (notify::FORM_UPDATED, notify::FORM_UPDATE_FAILED),
        };
        let mut stored = match result {
            Ok(stored) => stored,
            Err(err) => {
                error!(error = %err, kind = ?ticket.kind, "form save failed");
                self.ctx.notifier.notify(Notification::error(failed_message));
                return Err(err.into());
            }
        };
        let Some(id) = stored.id.or(match ticket.kind {
            SaveKind::Update(id) => Some(id),
            SaveKind::Create => None,
        }) else {
            let err = BackendError::Rejected("stored form came back without an id".into());
            error!(error = %err, "form save failed");
            self.ctx.notifier.notify(Notification::error(failed_message));
            return Err(err.into());
        };
        stored.id = Some(id);
        normalize_form(&mut stored);

        if self.form.as_ref() == Some(&ticket.form) {
            self.form = Some(stored);
            self.dirty = false;
        } else if let Some(local) = self.form.as_mut() {
            local.id.get_or_insert(id);
        }
        info!(form_id = id, kind = ?ticket.kind, "form saved");
        self.ctx.notifier.notify(Notification::success(ok_message));
        Ok(match ticket.kind {
            SaveKind::Create => SaveOutcome::Created(id),
            SaveKind::Update(_) => SaveOutcome::Updated(id),
        })
    }

    /// Deletes the selected form from the backend and clears the editor.
    pub async fn delete_form(&mut self) -> Result<FormId, BuilderError> {
        if self.save_in_flight {
            return Err(BuilderError::SaveInFlight);
        }
        let id = self
            .form
            .as_ref()
            .ok_or(BuilderError::NoFormSelected)?
            .id
            .ok_or(BuilderError::NotPersisted)?;
        match self.ctx.backend.delete_form(id).await {
            Ok(()) => {
                info!(form_id = id, "form deleted");
                self.ctx
                    .notifier
                    .notify(Notification::success(notify::FORM_DELETED));
                self.select(None);
                Ok(id)
            }
            Err(err) => {
                error!(error = %err, form_id = id, "form delete failed");
                self.ctx
                    .notifier
                    .notify(Notification::error(notify::FORM_DELETE_FAILED));
                Err(err.into())
            }
        }
    }
}

impl ReorderGestures for BuilderSession {
    fn on_drag_start(&mut self, key: SortKey) -> Option<DragKind> {
        let form = self.form.as_ref()?;
        Some(self.drag.start(form, key))
    }

    fn on_drag_over(&self, key: &SortKey) -> Option<OrderingPreview> {
        self.drag.over(self.form.as_ref()?, key)
    }

    /// Reordering never saves on its own; it only marks the session dirty.
    fn on_drag_end(&mut self, source: &SortKey, target: Option<&SortKey>) -> ReorderOutcome {
        let Some(form) = self.form.as_mut() else {
            self.drag.cancel();
            return ReorderOutcome::Ignored;
        };
        let outcome = self.drag.end(form, source, target);
        if outcome.changed() {
            self.dirty = true;
        }
        outcome
    }
}
