//! One graph view: the filter → generations → arena → solver pipeline plus
//! selection, pointer and camera state.
//!
//! [`GraphView`] owns everything a view needs and hands each subsystem the
//! arena by reference. It is single-threaded and frame-driven: the host calls
//! [`GraphView::frame`] once per animation frame and forwards pointer and key
//! input between frames.

use log::debug;
use std::collections::BTreeSet;

use crate::arena::{GraphArena, PinPolicy};
use crate::camera::{Camera, FocusRequest};
use crate::config::EngineConfig;
use crate::error::ConfigError;
use crate::generation::{compute_generations, GenerationMap, GenerationRelations};
use crate::interaction::{GraphEvent, Modifiers, PointerMachine, PointerState, Scene};
use crate::kinship::{apply_filter, FilterState};
use crate::model::{EdgeId, GraphSnapshot, PersonId, RelationTaxonomy};
use crate::router::{decollide_labels, route_edges, EdgeRoute, FallbackMeasure, LabelMeasure};
use crate::selection::{Selection, SelectionManager};
use crate::simulation::{LayoutMode, Reheat, Simulation};

/// Which view the data owner shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    #[default]
    Graph,
    Tree,
}

/// Force configuration for a view mode and the genealogy flag.
///
/// The tree view is always generation-banded; the graph view is banded only
/// with the genealogy flag set.
pub fn layout_mode_for(view: ViewMode, genealogy: bool) -> LayoutMode {
    match (view, genealogy) {
        (ViewMode::Tree, _) => LayoutMode::Tree,
        (ViewMode::Graph, true) => LayoutMode::Genealogy,
        (ViewMode::Graph, false) => LayoutMode::Free,
    }
}

/// State saved on entering lineage focus.
#[derive(Debug, Clone)]
struct LineageFocus {
    person: PersonId,
    saved_filter: FilterState,
    saved_selection: BTreeSet<PersonId>,
}

pub struct GraphView {
    config: EngineConfig,
    snapshot: GraphSnapshot,
    taxonomy: RelationTaxonomy,
    relations: GenerationRelations,
    view_mode: ViewMode,
    genealogy: bool,
    filter: FilterState,
    lineage: Option<LineageFocus>,
    layout_mode: LayoutMode,
    arena: GraphArena,
    simulation: Simulation,
    selection: SelectionManager,
    pointer: PointerMachine,
    camera: Camera,
    routes: Vec<EdgeRoute>,
    measure: Box<dyn LabelMeasure>,
}

impl Default for GraphView {
    fn default() -> Self {
        Self::build(EngineConfig::default())
    }
}

impl GraphView {
    /// Create a view after validating `config`.
    pub fn new(config: EngineConfig) -> Result<Self, ConfigError> {
        config.validate()?;
        Ok(Self::build(config))
    }

    fn build(config: EngineConfig) -> Self {
        let layout_mode = LayoutMode::Free;
        Self {
            simulation: Simulation::new(&config, layout_mode),
            camera: Camera::new(&config.camera),
            config,
            snapshot: GraphSnapshot::default(),
            taxonomy: RelationTaxonomy::new(),
            relations: GenerationRelations::default(),
            view_mode: ViewMode::Graph,
            genealogy: false,
            filter: FilterState::default(),
            lineage: None,
            layout_mode,
            arena: GraphArena::new(),
            selection: SelectionManager::new(),
            pointer: PointerMachine::new(),
            routes: Vec::new(),
            measure: Box::new(FallbackMeasure),
        }
    }

    // === Inputs from the data owner ===

    /// Size of the drawing surface. The solver centres on its middle.
    pub fn set_viewport(&mut self, width: f32, height: f32) {
        self.camera.set_viewport(width, height);
        self.simulation.set_center(width / 2.0, height / 2.0);
    }

    /// Replace the data. The solver restarts fully only when person or
    /// relationship ids changed; position-only updates reheat gently.
    pub fn set_snapshot(&mut self, snapshot: GraphSnapshot) {
        let changed = snapshot.identity() != self.snapshot.identity();
        self.snapshot = snapshot;
        self.rebuild(changed);
    }

    pub fn set_taxonomy(&mut self, taxonomy: RelationTaxonomy) {
        self.taxonomy = taxonomy;
        self.refresh();
    }

    pub fn set_generation_relations(&mut self, relations: GenerationRelations) {
        self.relations = relations;
        self.refresh();
    }

    pub fn set_view_mode(&mut self, mode: ViewMode) {
        self.view_mode = mode;
        self.refresh();
    }

    pub fn set_genealogy(&mut self, genealogy: bool) {
        self.genealogy = genealogy;
        self.refresh();
    }

    /// Replace the filter. An active lineage focus is abandoned.
    pub fn set_filter(&mut self, filter: FilterState) {
        self.lineage = None;
        self.filter = filter;
        self.refresh();
    }

    pub fn set_label_measure(&mut self, measure: Box<dyn LabelMeasure>) {
        self.measure = measure;
        self.update_routes();
    }

    // === Pipeline ===

    /// Rebuild after a filter, taxonomy or mode change.
    fn refresh(&mut self) {
        self.rebuild(false);
    }

    /// Re-run filter, generations and arena rebuild, then restart the solver.
    ///
    /// `data_changed` marks a new person or relationship set. Filter-driven
    /// rebuilds reheat gently even when people enter or leave the view.
    fn rebuild(&mut self, data_changed: bool) {
        let mode = layout_mode_for(self.view_mode, self.genealogy);
        let mode_changed = mode != self.layout_mode;
        let pins = match mode {
            LayoutMode::Genealogy if mode_changed => PinPolicy::Clear,
            LayoutMode::Genealogy => PinPolicy::KeepExisting,
            _ => PinPolicy::Inherit,
        };

        let lineage_filter;
        let filter = match &self.lineage {
            Some(focus) => {
                lineage_filter = FilterState::lineage(focus.saved_filter.mode, focus.person);
                &lineage_filter
            }
            None => &self.filter,
        };
        let graph = apply_filter(&self.snapshot, filter, &self.taxonomy);

        self.simulation.stop();
        let report = self.arena.rebuild(&graph, pins, self.simulation.center());

        let generations = if mode.uses_generations() {
            compute_generations(self.arena.ids(), &self.snapshot.relationships, &self.relations)
        } else {
            GenerationMap::default()
        };
        self.arena.set_generations(generations);

        #[cfg(feature = "layout")]
        if mode.uses_generations() {
            crate::layout::seed_layered(
                &mut self.arena,
                &report.unplaced,
                self.relations.ancestor,
                self.simulation.center(),
                &crate::layout::LayeredSeedConfig::default(),
            );
        }

        let arena = &self.arena;
        self.selection.retain(|id| arena.contains(id));

        if mode_changed {
            self.simulation.set_mode(&self.config, mode);
            self.layout_mode = mode;
        }
        let reheat = if data_changed || mode_changed { Reheat::Full } else { Reheat::Gentle };
        self.simulation.reheat(reheat);

        debug!(
            "rebuilt view: {} people, {} edges, +{} -{} ({} dangling), {:?} {:?}",
            self.arena.len(),
            self.arena.edges().len(),
            report.added.len(),
            report.removed,
            report.dangling,
            mode,
            reheat
        );
        self.update_routes();
    }

    fn update_routes(&mut self) {
        self.routes = route_edges(&self.arena, &self.config.router, self.measure.as_ref());
        decollide_labels(&mut self.routes, &self.config.router);
    }

    /// Advance the solver one tick and the camera by `dt` seconds.
    ///
    /// Returns whether anything is still moving.
    pub fn frame(&mut self, dt: f32) -> bool {
        let solving = self.simulation.tick(&mut self.arena);
        if solving {
            self.update_routes();
        }
        let animating = self.camera.advance(dt);
        solving || animating
    }

    // === Pointer and keyboard ===

    pub fn pointer_down(&mut self, x: f32, y: f32, modifiers: Modifiers) -> Vec<GraphEvent> {
        let scene = Scene {
            arena: &mut self.arena,
            selection: &mut self.selection,
            camera: &mut self.camera,
            simulation: &mut self.simulation,
            routes: &self.routes,
            config: &self.config.interaction,
        };
        self.pointer.pointer_down(scene, (x, y), modifiers)
    }

    pub fn pointer_move(&mut self, x: f32, y: f32) -> Vec<GraphEvent> {
        let scene = Scene {
            arena: &mut self.arena,
            selection: &mut self.selection,
            camera: &mut self.camera,
            simulation: &mut self.simulation,
            routes: &self.routes,
            config: &self.config.interaction,
        };
        let events = self.pointer.pointer_move(scene, (x, y));
        if matches!(self.pointer.state(), PointerState::Dragging { .. }) {
            self.update_routes();
        }
        events
    }

    pub fn pointer_up(&mut self, x: f32, y: f32, modifiers: Modifiers) -> Vec<GraphEvent> {
        let scene = Scene {
            arena: &mut self.arena,
            selection: &mut self.selection,
            camera: &mut self.camera,
            simulation: &mut self.simulation,
            routes: &self.routes,
            config: &self.config.interaction,
        };
        let events = self.pointer.pointer_up(scene, (x, y), modifiers);
        if events.contains(&GraphEvent::CanvasClicked) && self.lineage.is_some() {
            self.leave_lineage(false);
        }
        events
    }

    /// Wheel zoom anchored at the cursor.
    pub fn wheel(&mut self, x: f32, y: f32, delta_y: f32) {
        self.camera.wheel(x, y, delta_y);
    }

    pub fn select_all(&mut self) {
        self.selection.replace_selection(self.arena.ids());
    }

    /// Leave lineage focus if active, otherwise clear the selection.
    pub fn escape(&mut self) -> Vec<GraphEvent> {
        self.pointer.cancel(&mut self.arena, &mut self.simulation);
        if self.lineage.is_some() {
            self.leave_lineage(true);
            Vec::new()
        } else {
            self.selection.clear();
            vec![GraphEvent::CanvasClicked]
        }
    }

    // === Lineage focus ===

    /// Filter the view down to `person`'s kinship closure.
    ///
    /// The current selection is saved and restored on exit. Returns `false`
    /// when `person` is not part of the snapshot.
    pub fn enter_lineage_focus(&mut self, person: PersonId) -> bool {
        if !self.snapshot.people.iter().any(|p| p.id == person) {
            return false;
        }
        let focus = match self.lineage.take() {
            Some(previous) => LineageFocus { person, ..previous },
            None => LineageFocus {
                person,
                saved_filter: self.filter.clone(),
                saved_selection: self.selection.ids().clone(),
            },
        };
        debug!("entering lineage focus on {}", person);
        self.lineage = Some(focus);
        self.selection.select_only(person);
        self.refresh();
        true
    }

    pub fn exit_lineage_focus(&mut self) {
        self.leave_lineage(true);
    }

    fn leave_lineage(&mut self, restore_selection: bool) {
        let Some(focus) = self.lineage.take() else {
            return;
        };
        debug!("leaving lineage focus on {}", focus.person);
        self.filter = focus.saved_filter;
        if restore_selection {
            self.selection.replace_selection(focus.saved_selection);
        }
        self.refresh();
    }

    pub fn lineage_focus(&self) -> Option<PersonId> {
        self.lineage.as_ref().map(|f| f.person)
    }

    // === Tidy, focus, fit ===

    /// Release pins.
    ///
    /// With nothing selected every pin is released and the data owner is
    /// asked to do the same; otherwise only the selected persons are
    /// unpinned and each is reported.
    pub fn tidy(&mut self) -> Vec<GraphEvent> {
        let events = if self.selection.is_empty() {
            self.arena.release_all_pins();
            vec![GraphEvent::ReleaseAllPins]
        } else {
            self.selection
                .iter()
                .filter_map(|id| {
                    let node = self.arena.node_mut(id)?;
                    node.unpin();
                    Some(GraphEvent::NodeMoved { id, x: node.x, y: node.y, pinned: false })
                })
                .collect()
        };
        self.simulation.reheat(Reheat::Gentle);
        events
    }

    pub fn focus(&mut self, request: FocusRequest) -> bool {
        self.camera.request_focus(request, &self.arena)
    }

    pub fn fit_view(&mut self) {
        self.camera.fit(&self.arena);
    }

    // === Output ===

    pub fn routes(&self) -> &[EdgeRoute] {
        &self.routes
    }

    /// SVG path per routed edge, in screen coordinates.
    pub fn edge_paths(&self) -> Vec<(EdgeId, String)> {
        let transform = self.camera.transform();
        self.routes
            .iter()
            .map(|r| (r.id, r.shape.map(|p| transform.apply(p)).to_svg_path()))
            .collect()
    }

    pub fn arena(&self) -> &GraphArena {
        &self.arena
    }

    pub fn generations(&self) -> &GenerationMap {
        self.arena.generations()
    }

    pub fn selection(&self) -> &SelectionManager {
        &self.selection
    }

    pub fn selection_mut(&mut self) -> &mut SelectionManager {
        &mut self.selection
    }

    pub fn selection_state(&self) -> Selection {
        self.selection.state()
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn camera_mut(&mut self) -> &mut Camera {
        &mut self.camera
    }

    pub fn simulation(&self) -> &Simulation {
        &self.simulation
    }

    pub fn pointer_state(&self) -> &PointerState {
        self.pointer.state()
    }

    /// The live brush as a world-space `(min, max)` rectangle, tracking the
    /// current camera.
    pub fn brush_world_rect(&self) -> Option<((f32, f32), (f32, f32))> {
        let (origin, current) = self.pointer.brush_rect()?;
        let a = self.camera.screen_to_world(origin.0, origin.1);
        let b = self.camera.screen_to_world(current.0, current.1);
        Some(((a.0.min(b.0), a.1.min(b.1)), (a.0.max(b.0), a.1.max(b.1))))
    }

    pub fn layout_mode(&self) -> LayoutMode {
        self.layout_mode
    }

    pub fn filter(&self) -> &FilterState {
        &self.filter
    }

    pub fn snapshot(&self) -> &GraphSnapshot {
        &self.snapshot
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }
}
