//! Common test utilities for integration tests.

#![allow(dead_code)]

pub mod harness;

use slint_relation_graph::{GraphEvent, MovedPerson, PersonId};
use std::cell::RefCell;
use std::rc::Rc;

/// Records every event the controller forwards to its handler.
#[derive(Default, Clone)]
pub struct EventTracker {
    pub events: Rc<RefCell<Vec<GraphEvent>>>,
}

impl EventTracker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&self, event: &GraphEvent) {
        self.events.borrow_mut().push(event.clone());
    }

    /// Clear all recorded events.
    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    pub fn all(&self) -> Vec<GraphEvent> {
        self.events.borrow().clone()
    }

    pub fn node_clicks(&self) -> Vec<PersonId> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                GraphEvent::NodeClicked(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn edge_clicks(&self) -> Vec<i32> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                GraphEvent::EdgeClicked(id) => Some(*id),
                _ => None,
            })
            .collect()
    }

    pub fn canvas_clicks(&self) -> usize {
        self.events.borrow().iter().filter(|e| **e == GraphEvent::CanvasClicked).count()
    }

    /// Every `NodesMoved` batch, in order.
    pub fn move_batches(&self) -> Vec<Vec<MovedPerson>> {
        self.events
            .borrow()
            .iter()
            .filter_map(|e| match e {
                GraphEvent::NodesMoved(batch) => Some(batch.clone()),
                _ => None,
            })
            .collect()
    }
}
