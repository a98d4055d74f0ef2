//! Slint-facing controller for a relationship graph view.
//!
//! The [`GraphViewController`] wraps a [`GraphView`] and turns it into
//! callbacks a Slint window can bind directly, plus `sync_*` helpers that
//! push solver output into `VecModel`s.
//!
//! # Example
//!
//! ```ignore
//! use slint_relation_graph::{GraphViewController, GraphEvent};
//!
//! slint::include_modules!();
//!
//! fn main() {
//!     let window = MainWindow::new().unwrap();
//!     let ctrl = GraphViewController::default();
//!
//!     window.on_pointer_down(ctrl.pointer_down_callback());
//!     window.on_pointer_move(ctrl.pointer_move_callback());
//!     window.on_pointer_up(ctrl.pointer_up_callback());
//!     window.on_wheel(ctrl.wheel_callback());
//!     window.on_compute_edge_path(ctrl.compute_edge_path_callback());
//!
//!     ctrl.on_event(|event| match event {
//!         GraphEvent::NodesMoved(moved) => { /* persist positions */ }
//!         _ => {}
//!     });
//!
//!     // Once per frame
//!     let people = std::rc::Rc::new(slint::VecModel::from(load_people()));
//!     window.on_frame({
//!         let ctrl = ctrl.clone();
//!         let people = people.clone();
//!         move |dt| {
//!             let running = ctrl.frame(dt);
//!             ctrl.sync_people_model(&people);
//!             running
//!         }
//!     });
//!
//!     window.run().unwrap();
//! }
//! ```

use slint::{Model, SharedString, VecModel};
use std::cell::RefCell;
use std::rc::Rc;

use crate::camera::FocusRequest;
use crate::config::EngineConfig;
use crate::error::ConfigError;
use crate::interaction::{GraphEvent, Modifiers};
use crate::kinship::FilterState;
use crate::model::{EdgeId, GraphSnapshot, MovablePerson, PersonId, RelationTaxonomy};
use crate::view::{GraphView, ViewMode};

/// Trait for UI-side edge rows the controller can write routed geometry into.
pub trait EdgeRow: Clone + 'static {
    fn id(&self) -> EdgeId;
    fn set_path(&mut self, path: SharedString);
    fn set_label(&mut self, x: f32, y: f32, angle: f32);
}

type EventHandler = Box<dyn Fn(&GraphEvent)>;

/// Controller that owns a graph view and provides callback implementations.
///
/// Clone this controller to share it across callbacks.
#[derive(Clone)]
pub struct GraphViewController {
    view: Rc<RefCell<GraphView>>,
    handler: Rc<RefCell<Option<EventHandler>>>,
}

impl Default for GraphViewController {
    fn default() -> Self {
        Self::with_view(GraphView::default())
    }
}

impl GraphViewController {
    /// Create a controller after validating `config`.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        Ok(Self::with_view(GraphView::new(config)?))
    }

    pub fn with_view(view: GraphView) -> Self {
        Self {
            view: Rc::new(RefCell::new(view)),
            handler: Rc::new(RefCell::new(None)),
        }
    }

    /// Shared access to the underlying view.
    pub fn view(&self) -> Rc<RefCell<GraphView>> {
        self.view.clone()
    }

    /// Register the handler that receives every notification.
    pub fn on_event(&self, handler: impl Fn(&GraphEvent) + 'static) {
        *self.handler.borrow_mut() = Some(Box::new(handler));
    }

    /// Forward `events` to the handler. Called with no view borrow held, so
    /// the handler may call back into the controller.
    fn dispatch(&self, events: Vec<GraphEvent>) -> Vec<GraphEvent> {
        if let Some(handler) = self.handler.borrow().as_ref() {
            for event in &events {
                handler(event);
            }
        }
        events
    }

    // === Callback factories ===

    /// Returns a callback for `pointer-down(x, y, shift)`.
    pub fn pointer_down_callback(&self) -> impl Fn(f32, f32, bool) {
        let ctrl = self.clone();
        move |x, y, shift| {
            ctrl.pointer_down(x, y, shift);
        }
    }

    /// Returns a callback for `pointer-move(x, y)`.
    pub fn pointer_move_callback(&self) -> impl Fn(f32, f32) {
        let ctrl = self.clone();
        move |x, y| {
            ctrl.pointer_move(x, y);
        }
    }

    /// Returns a callback for `pointer-up(x, y, shift)`.
    pub fn pointer_up_callback(&self) -> impl Fn(f32, f32, bool) {
        let ctrl = self.clone();
        move |x, y, shift| {
            ctrl.pointer_up(x, y, shift);
        }
    }

    /// Returns a callback for `wheel(x, y, delta-y)`.
    pub fn wheel_callback(&self) -> impl Fn(f32, f32, f32) {
        let view = self.view.clone();
        move |x, y, delta_y| view.borrow_mut().wheel(x, y, delta_y)
    }

    /// Returns a callback for `compute-edge-path(edge-id, version)`.
    ///
    /// Produces the screen-space SVG path of the routed edge, or an empty
    /// string for an edge that is not in view.
    pub fn compute_edge_path_callback(&self) -> impl Fn(i32, i32) -> SharedString {
        let ctrl = self.clone();
        move |edge, _version| ctrl.edge_path(edge)
    }

    // === Direct handlers ===

    pub fn pointer_down(&self, x: f32, y: f32, shift: bool) -> Vec<GraphEvent> {
        let events = self.view.borrow_mut().pointer_down(x, y, Modifiers { shift });
        self.dispatch(events)
    }

    pub fn pointer_move(&self, x: f32, y: f32) -> Vec<GraphEvent> {
        let events = self.view.borrow_mut().pointer_move(x, y);
        self.dispatch(events)
    }

    pub fn pointer_up(&self, x: f32, y: f32, shift: bool) -> Vec<GraphEvent> {
        let events = self.view.borrow_mut().pointer_up(x, y, Modifiers { shift });
        self.dispatch(events)
    }

    pub fn escape(&self) -> Vec<GraphEvent> {
        let events = self.view.borrow_mut().escape();
        self.dispatch(events)
    }

    pub fn select_all(&self) {
        self.view.borrow_mut().select_all();
    }

    pub fn tidy(&self) -> Vec<GraphEvent> {
        let events = self.view.borrow_mut().tidy();
        self.dispatch(events)
    }

    /// Advance one animation frame. Returns whether another frame is needed.
    pub fn frame(&self, dt: f32) -> bool {
        self.view.borrow_mut().frame(dt)
    }

    pub fn set_viewport(&self, width: f32, height: f32) {
        self.view.borrow_mut().set_viewport(width, height);
    }

    pub fn set_snapshot(&self, snapshot: GraphSnapshot) {
        self.view.borrow_mut().set_snapshot(snapshot);
    }

    pub fn set_taxonomy(&self, taxonomy: RelationTaxonomy) {
        self.view.borrow_mut().set_taxonomy(taxonomy);
    }

    pub fn set_filter(&self, filter: FilterState) {
        self.view.borrow_mut().set_filter(filter);
    }

    pub fn set_view_mode(&self, mode: ViewMode) {
        self.view.borrow_mut().set_view_mode(mode);
    }

    pub fn set_genealogy(&self, genealogy: bool) {
        self.view.borrow_mut().set_genealogy(genealogy);
    }

    pub fn enter_lineage_focus(&self, person: PersonId) -> bool {
        self.view.borrow_mut().enter_lineage_focus(person)
    }

    pub fn focus(&self, target: PersonId, trigger: u64) -> bool {
        self.view.borrow_mut().focus(FocusRequest { target, trigger })
    }

    pub fn fit_view(&self) {
        self.view.borrow_mut().fit_view();
    }

    /// Screen-space SVG path of one routed edge.
    pub fn edge_path(&self, edge: EdgeId) -> SharedString {
        let view = self.view.borrow();
        let transform = view.camera().transform();
        view.routes()
            .iter()
            .find(|r| r.id == edge)
            .map(|r| r.shape.map(|p| transform.apply(p)).to_svg_path())
            .unwrap_or_default()
            .into()
    }

    // === Model sync ===

    /// Write solver positions into person rows. Rows for persons not in
    /// view are left untouched.
    pub fn sync_people_model<T: MovablePerson>(&self, model: &VecModel<T>) {
        let view = self.view.borrow();
        let arena = view.arena();
        for row in 0..model.row_count() {
            let Some(mut person) = model.row_data(row) else {
                continue;
            };
            let Some(node) = arena.node(person.id()) else {
                continue;
            };
            if person.x() != node.x || person.y() != node.y {
                person.set_x(node.x);
                person.set_y(node.y);
                model.set_row_data(row, person);
            }
        }
    }

    pub fn sync_selection_model(&self, model: &VecModel<PersonId>) {
        self.view.borrow().selection().sync_to_model(model);
    }

    /// Import a selection edited on the UI side.
    pub fn sync_selection_from_model(&self, model: &dyn Model<Data = PersonId>) {
        self.view.borrow_mut().selection_mut().sync_from_model(model);
    }

    /// Write screen-space paths and label anchors into edge rows.
    pub fn sync_edge_model<E: EdgeRow>(&self, model: &VecModel<E>) {
        let view = self.view.borrow();
        let transform = view.camera().transform();
        for row in 0..model.row_count() {
            let Some(mut edge) = model.row_data(row) else {
                continue;
            };
            let Some(route) = view.routes().iter().find(|r| r.id == edge.id()) else {
                edge.set_path(SharedString::default());
                model.set_row_data(row, edge);
                continue;
            };
            let (lx, ly) = transform.apply((route.label.x, route.label.y));
            edge.set_path(route.shape.map(|p| transform.apply(p)).to_svg_path().into());
            edge.set_label(lx, ly, route.label.angle);
            model.set_row_data(row, edge);
        }
    }
}
