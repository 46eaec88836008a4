//! Drag-reorder controller for sections and the fields inside them.
//!
//! The controller only knows sortable keys; pointer, touch or keyboard
//! sensors translate their events into the three [`ReorderGestures`] calls.

use formcraft_spec::ordering::{Ordered, position_of, preview_move};
use formcraft_spec::{FormSpec, SortKey, move_by_key};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DragKind {
    Section,
    Field,
}

/// Sibling key order a drop at the hovered position would produce.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderingPreview {
    pub kind: DragKind,
    /// Section whose fields are being reordered; `None` for section drags.
    pub section: Option<SortKey>,
    pub keys: Vec<SortKey>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReorderOutcome {
    /// No target, target equal to source, or no list holds both keys.
    Ignored,
    SectionsReordered,
    FieldsReordered { section: SortKey },
}

impl ReorderOutcome {
    pub fn changed(&self) -> bool {
        !matches!(self, ReorderOutcome::Ignored)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Up,
    Down,
}

/// The three callbacks a drag sensor drives.
pub trait ReorderGestures {
    fn on_drag_start(&mut self, key: SortKey) -> Option<DragKind>;
    fn on_drag_over(&self, key: &SortKey) -> Option<OrderingPreview>;
    fn on_drag_end(&mut self, source: &SortKey, target: Option<&SortKey>) -> ReorderOutcome;
}

/// Sections are checked first: section and field keys can collide.
pub fn classify(form: &FormSpec, key: &SortKey) -> DragKind {
    if form.section(key).is_some() {
        DragKind::Section
    } else {
        DragKind::Field
    }
}

/// Moves `source` onto `target` within the list `kind` names and renumbers it.
pub fn reorder(
    form: &mut FormSpec,
    kind: DragKind,
    source: &SortKey,
    target: Option<&SortKey>,
) -> ReorderOutcome {
    let Some(target) = target else {
        return ReorderOutcome::Ignored;
    };
    if source == target {
        return ReorderOutcome::Ignored;
    }
    match kind {
        DragKind::Section => {
            if move_by_key(&mut form.sections, source, target) {
                ReorderOutcome::SectionsReordered
            } else {
                ReorderOutcome::Ignored
            }
        }
        DragKind::Field => {
            let Some(section) = form
                .sections
                .iter_mut()
                .find(|section| section.contains_fields(source, target))
            else {
                return ReorderOutcome::Ignored;
            };
            let section_key = section.sort_key();
            if move_by_key(&mut section.fields, source, target) {
                ReorderOutcome::FieldsReordered {
                    section: section_key,
                }
            } else {
                ReorderOutcome::Ignored
            }
        }
    }
}

pub fn preview(
    form: &FormSpec,
    kind: DragKind,
    source: &SortKey,
    target: &SortKey,
) -> Option<OrderingPreview> {
    match kind {
        DragKind::Section => Some(OrderingPreview {
            kind,
            section: None,
            keys: preview_move(&form.sections, source, target)?,
        }),
        DragKind::Field => {
            let section = form
                .sections
                .iter()
                .find(|section| section.contains_fields(source, target))?;
            Some(OrderingPreview {
                kind,
                section: Some(section.sort_key()),
                keys: preview_move(&section.fields, source, target)?,
            })
        }
    }
}

/// Key of the sibling one step away from `key` in `items`, used for keyboard
/// moves. The caller picks the list: placeholder field keys repeat across
/// sections, so a field is only ever stepped within its own section.
pub fn neighbor<T: Ordered>(
    items: &[T],
    key: &SortKey,
    direction: Direction,
) -> Option<SortKey> {
    let index = position_of(items, key)?;
    let next = match direction {
        Direction::Up => index.checked_sub(1)?,
        Direction::Down => index + 1,
    };
    items.get(next).map(Ordered::sort_key)
}

/// Tracks the item being dragged between drag-start and drag-end.
#[derive(Debug, Default, Clone)]
pub struct DragController {
    active: Option<(SortKey, DragKind)>,
}

impl DragController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn active(&self) -> Option<(SortKey, DragKind)> {
        self.active
    }

    pub fn start(&mut self, form: &FormSpec, key: SortKey) -> DragKind {
        let kind = classify(form, &key);
        tracing::trace!(%key, ?kind, "drag start");
        self.active = Some((key, kind));
        kind
    }

    pub fn over(&self, form: &FormSpec, target: &SortKey) -> Option<OrderingPreview> {
        let (source, kind) = self.active?;
        preview(form, kind, &source, target)
    }

    /// Finishes the drag. The active drag is always cleared, whatever the outcome.
    pub fn end(
        &mut self,
        form: &mut FormSpec,
        source: &SortKey,
        target: Option<&SortKey>,
    ) -> ReorderOutcome {
        let kind = match self.active.take() {
            Some((active, kind)) if active == *source => kind,
            _ => classify(form, source),
        };
        let outcome = reorder(form, kind, source, target);
        tracing::debug!(%source, ?target, ?outcome, "drag end");
        outcome
    }

    pub fn cancel(&mut self) {
        self.active = None;
    }
}
