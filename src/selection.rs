use std::collections::BTreeSet;
use slint::{Model, VecModel};

use crate::model::PersonId;

/// Cardinality view of the selection set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    None,
    Single(PersonId),
    Multi(BTreeSet<PersonId>),
}

/// The set of selected persons.
///
/// Ordered so that model sync and batch notifications are deterministic.
#[derive(Debug, Clone, Default)]
pub struct SelectionManager {
    selected: BTreeSet<PersonId>,
}

impl SelectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Apply a click on a person.
    ///
    /// With shift held the person's membership is toggled. A plain click on
    /// a member of a multi-selection keeps the set (it is about to be
    /// dragged as a group); any other plain click selects only that person.
    pub fn handle_click(&mut self, id: PersonId, shift_held: bool) {
        if shift_held {
            self.toggle(id);
        } else if !(self.selected.len() > 1 && self.selected.contains(&id)) {
            self.select_only(id);
        }
    }

    pub fn toggle(&mut self, id: PersonId) {
        if !self.selected.remove(&id) {
            self.selected.insert(id);
        }
    }

    pub fn select_only(&mut self, id: PersonId) {
        self.selected.clear();
        self.selected.insert(id);
    }

    pub fn insert(&mut self, id: PersonId) {
        self.selected.insert(id);
    }

    /// Clear the current selection
    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Replace the current selection with a new set of IDs
    ///
    /// Used by brush selection and select-all.
    pub fn replace_selection<I>(&mut self, ids: I)
    where
        I: IntoIterator<Item = PersonId>,
    {
        self.selected.clear();
        self.selected.extend(ids);
    }

    /// Drop ids for which `keep` is false (e.g. persons filtered out of view).
    pub fn retain(&mut self, keep: impl Fn(PersonId) -> bool) {
        self.selected.retain(|&id| keep(id));
    }

    pub fn contains(&self, id: PersonId) -> bool {
        self.selected.contains(&id)
    }

    /// Selected ids in ascending order
    pub fn iter(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.selected.iter().copied()
    }

    pub fn ids(&self) -> &BTreeSet<PersonId> {
        &self.selected
    }

    pub fn state(&self) -> Selection {
        let mut iter = self.selected.iter();
        match (iter.next(), iter.next()) {
            (None, _) => Selection::None,
            (Some(&id), None) => Selection::Single(id),
            _ => Selection::Multi(self.selected.clone()),
        }
    }

    /// Sync the selection set to a Slint VecModel
    pub fn sync_to_model(&self, model: &VecModel<PersonId>) {
        model.set_vec(self.selected.iter().copied().collect::<Vec<_>>());
    }

    /// Sync the selection set from any Slint Model
    pub fn sync_from_model(&mut self, model: &dyn Model<Data = PersonId>) {
        self.selected = (0..model.row_count())
            .filter_map(|row| model.row_data(row))
            .collect();
    }

    pub fn len(&self) -> usize {
        self.selected.len()
    }

    pub fn is_empty(&self) -> bool {
        self.selected.is_empty()
    }
}
