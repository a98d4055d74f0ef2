//! Test harness mirroring a host window bound to a [`GraphViewController`].
//!
//! Wires the event handler to an [`EventTracker`], keeps a person model and a
//! selection model in sync like a frame callback would, and offers pointer
//! helpers in screen coordinates.

#![allow(dead_code)]

use super::EventTracker;
use slint::{Model, VecModel};
use slint_relation_graph::{
    GraphSnapshot, GraphViewController, MovablePerson, Person, PersonId, Relationship,
};
use std::rc::Rc;

/// Person row as a host UI would hold it.
#[derive(Clone, Debug, PartialEq)]
pub struct PersonRow {
    pub id: PersonId,
    pub x: f32,
    pub y: f32,
}

impl MovablePerson for PersonRow {
    fn id(&self) -> PersonId {
        self.id
    }
    fn x(&self) -> f32 {
        self.x
    }
    fn y(&self) -> f32 {
        self.y
    }
    fn set_x(&mut self, x: f32) {
        self.x = x;
    }
    fn set_y(&mut self, y: f32) {
        self.y = y;
    }
}

pub const VIEWPORT: (f32, f32) = (800.0, 600.0);

pub struct GraphHarness {
    pub ctrl: GraphViewController,
    pub people: Rc<VecModel<PersonRow>>,
    pub selection: Rc<VecModel<PersonId>>,
    pub tracker: EventTracker,
}

impl GraphHarness {
    /// Three positioned people, A=1 (100,100), B=2 (200,100), C=3 (600,400),
    /// with no relationships.
    pub fn new() -> Self {
        Self::with_graph(
            vec![
                Person::new(1, 1).at(100.0, 100.0),
                Person::new(2, 1).at(200.0, 100.0),
                Person::new(3, 2).at(600.0, 400.0),
            ],
            vec![],
        )
    }

    pub fn with_graph(people: Vec<Person>, relationships: Vec<Relationship>) -> Self {
        let ctrl = GraphViewController::default();
        let tracker = EventTracker::new();
        ctrl.on_event({
            let tracker = tracker.clone();
            move |event| tracker.record(event)
        });
        ctrl.set_viewport(VIEWPORT.0, VIEWPORT.1);

        let rows = people
            .iter()
            .map(|p| PersonRow { id: p.id, x: p.x.unwrap_or(0.0), y: p.y.unwrap_or(0.0) })
            .collect::<Vec<_>>();
        ctrl.set_snapshot(GraphSnapshot::new(people, relationships));

        let harness = Self {
            ctrl,
            people: Rc::new(VecModel::from(rows)),
            selection: Rc::new(VecModel::default()),
            tracker,
        };
        harness.sync_models();
        harness
    }

    /// Push view state into the models, as a frame callback would.
    pub fn sync_models(&self) {
        self.ctrl.sync_people_model(&self.people);
        self.ctrl.sync_selection_model(&self.selection);
    }

    /// Run `frames` solver frames of 1/60 s.
    pub fn run_frames(&self, frames: usize) {
        for _ in 0..frames {
            self.ctrl.frame(1.0 / 60.0);
        }
        self.sync_models();
    }

    /// Run frames until nothing moves, up to `max` frames. Returns frames run.
    pub fn settle(&self, max: usize) -> usize {
        let mut frames = 0;
        while frames < max && self.ctrl.frame(1.0 / 60.0) {
            frames += 1;
        }
        self.sync_models();
        frames
    }

    /// Solver position of a person.
    pub fn position(&self, id: PersonId) -> Option<(f32, f32)> {
        let view = self.ctrl.view();
        let view = view.borrow();
        view.arena().node(id).map(|n| n.position())
    }

    /// Screen position of a person under the current camera.
    pub fn screen_position(&self, id: PersonId) -> Option<(f32, f32)> {
        let (x, y) = self.position(id)?;
        let view = self.ctrl.view();
        let view = view.borrow();
        Some(view.camera().world_to_screen(x, y))
    }

    pub fn is_pinned(&self, id: PersonId) -> bool {
        let view = self.ctrl.view();
        let view = view.borrow();
        view.arena().node(id).is_some_and(|n| n.is_pinned())
    }

    /// Row data for a person from the host model.
    pub fn row(&self, id: PersonId) -> Option<PersonRow> {
        self.people.iter().find(|row| row.id == id)
    }

    /// Selected ids as seen through the selection model.
    pub fn selected(&self) -> Vec<PersonId> {
        self.ctrl.sync_selection_model(&self.selection);
        self.selection.iter().collect()
    }

    // === Pointer helpers ===

    pub fn click(&self, x: f32, y: f32) {
        self.ctrl.pointer_down(x, y, false);
        self.ctrl.pointer_up(x, y, false);
        self.sync_models();
    }

    pub fn shift_click(&self, x: f32, y: f32) {
        self.ctrl.pointer_down(x, y, true);
        self.ctrl.pointer_up(x, y, true);
        self.sync_models();
    }

    pub fn click_person(&self, id: PersonId) {
        let (x, y) = self.screen_position(id).expect("person in view");
        self.click(x, y);
    }

    /// Press at `from`, move to `to` in `steps` increments, release at `to`.
    pub fn drag(&self, from: (f32, f32), to: (f32, f32), steps: usize) {
        self.drag_with(from, to, steps, false);
    }

    /// Shift-drag on empty canvas draws a brush.
    pub fn brush(&self, from: (f32, f32), to: (f32, f32)) {
        self.drag_with(from, to, 4, true);
    }

    fn drag_with(&self, from: (f32, f32), to: (f32, f32), steps: usize, shift: bool) {
        self.ctrl.pointer_down(from.0, from.1, shift);
        let steps = steps.max(1);
        for i in 1..=steps {
            let t = i as f32 / steps as f32;
            self.ctrl.pointer_move(from.0 + (to.0 - from.0) * t, from.1 + (to.1 - from.1) * t);
        }
        self.ctrl.pointer_up(to.0, to.1, shift);
        self.sync_models();
    }
}
