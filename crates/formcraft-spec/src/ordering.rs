//! Sortable keys and the move-and-renumber algorithm shared by sections and fields.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::ModelError;

/// Which list a placeholder key belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum DraftKind {
    Section,
    Field,
}

impl DraftKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            DraftKind::Section => "section",
            DraftKind::Field => "field",
        }
    }
}

/// Drag identity of a section or field.
///
/// Persisted items use their id. Unsaved items fall back to a placeholder
/// derived from their current `order`, rendered as `section-3` or `field-2`.
/// Section and field ids live in separate tables, so an `Id` key alone does
/// not tell which list it belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SortKey {
    Id(i64),
    Draft { kind: DraftKind, order: u32 },
}

impl SortKey {
    pub fn draft(kind: DraftKind, order: u32) -> Self {
        SortKey::Draft { kind, order }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SortKey::Id(id) => write!(f, "{id}"),
            SortKey::Draft { kind, order } => write!(f, "{}-{order}", kind.prefix()),
        }
    }
}

impl FromStr for SortKey {
    type Err = ModelError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if let Ok(id) = trimmed.parse::<i64>() {
            return Ok(SortKey::Id(id));
        }
        for kind in [DraftKind::Section, DraftKind::Field] {
            if let Some(rest) = trimmed
                .strip_prefix(kind.prefix())
                .and_then(|rest| rest.strip_prefix('-'))
                && let Ok(order) = rest.parse::<u32>()
            {
                return Ok(SortKey::Draft { kind, order });
            }
        }
        Err(ModelError::InvalidKey(raw.to_string()))
    }
}

impl Serialize for SortKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for SortKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        raw.parse().map_err(serde::de::Error::custom)
    }
}

/// Items that live in a densely ordered sibling list.
pub trait Ordered {
    fn order(&self) -> u32;
    fn set_order(&mut self, order: u32);
    fn sort_key(&self) -> SortKey;
}

pub fn position_of<T: Ordered>(items: &[T], key: &SortKey) -> Option<usize> {
    items.iter().position(|item| item.sort_key() == *key)
}

/// Removes the item at `from` and reinserts it at `to`, shifting everything
/// in between. Returns `false` and leaves the list untouched when either
/// index is out of range.
pub fn move_item<T>(items: &mut Vec<T>, from: usize, to: usize) -> bool {
    if from >= items.len() || to >= items.len() {
        return false;
    }
    if from != to {
        let item = items.remove(from);
        items.insert(to, item);
    }
    true
}

/// Assigns `order = position + 1` to every item.
pub fn renumber<T: Ordered>(items: &mut [T]) {
    for (index, item) in items.iter_mut().enumerate() {
        item.set_order(index as u32 + 1);
    }
}

/// True when the orders, read in list order, are exactly `1..=len`.
pub fn is_dense<T: Ordered>(items: &[T]) -> bool {
    items
        .iter()
        .enumerate()
        .all(|(index, item)| item.order() == index as u32 + 1)
}

/// Stable sort by `order`.
pub fn sort_by_order<T: Ordered>(items: &mut [T]) {
    items.sort_by_key(|item| item.order());
}

/// Moves `source` onto the position of `target` and renumbers.
///
/// Returns `false` without touching the list when the keys are equal or
/// either key is missing.
pub fn move_by_key<T: Ordered>(items: &mut Vec<T>, source: &SortKey, target: &SortKey) -> bool {
    if source == target {
        return false;
    }
    let (Some(from), Some(to)) = (position_of(items, source), position_of(items, target)) else {
        return false;
    };
    move_item(items, from, to);
    renumber(items);
    true
}

/// Key order that [`move_by_key`] would produce, without mutating anything.
pub fn preview_move<T: Ordered>(
    items: &[T],
    source: &SortKey,
    target: &SortKey,
) -> Option<Vec<SortKey>> {
    let from = position_of(items, source)?;
    let to = position_of(items, target)?;
    let mut keys = items.iter().map(Ordered::sort_key).collect::<Vec<_>>();
    move_item(&mut keys, from, to);
    Some(keys)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        name: &'static str,
        order: u32,
    }

    impl Ordered for Item {
        fn order(&self) -> u32 {
            self.order
        }

        fn set_order(&mut self, order: u32) {
            self.order = order;
        }

        fn sort_key(&self) -> SortKey {
            SortKey::draft(DraftKind::Field, self.order)
        }
    }

    fn items(names: &[&'static str]) -> Vec<Item> {
        names
            .iter()
            .enumerate()
            .map(|(index, name)| Item {
                name,
                order: index as u32 + 1,
            })
            .collect()
    }

    #[test]
    fn move_is_not_a_swap() {
        let mut list = items(&["A", "B", "C", "D"]);
        assert!(move_item(&mut list, 0, 2));
        renumber(&mut list);
        let names = list.iter().map(|item| item.name).collect::<Vec<_>>();
        assert_eq!(names, vec!["B", "C", "A", "D"]);
        assert!(is_dense(&list));
    }

    #[test]
    fn move_by_key_ignores_self_drop() {
        let mut list = items(&["A", "B"]);
        let key = list[0].sort_key();
        assert!(!move_by_key(&mut list, &key, &key));
        assert_eq!(list, items(&["A", "B"]));
    }

    #[test]
    fn move_item_rejects_out_of_range() {
        let mut list = items(&["A"]);
        assert!(!move_item(&mut list, 0, 3));
    }

    #[test]
    fn sort_key_round_trips_through_text() {
        for raw in ["42", "section-3", "field-1"] {
            let key: SortKey = raw.parse().expect("parse key");
            assert_eq!(key.to_string(), raw);
        }
        assert!("section-".parse::<SortKey>().is_err());
        assert!("row-2".parse::<SortKey>().is_err());
    }
}
