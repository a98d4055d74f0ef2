//! Pointer state machine: click, drag-to-move, brush select and pan.
//!
//! Every handler takes the pieces of the view it needs through
//! [`Scene`] and returns the notifications the gesture produced.

use log::trace;

use crate::arena::GraphArena;
use crate::camera::Camera;
use crate::config::InteractionConfig;
use crate::hit_test::{find_edge_at, find_person_at, people_in_brush};
use crate::model::{EdgeId, PersonId};
use crate::router::EdgeRoute;
use crate::selection::SelectionManager;
use crate::simulation::Simulation;

/// Final position of a person after a move.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MovedPerson {
    pub id: PersonId,
    pub x: f32,
    pub y: f32,
}

/// Notifications for the data owner.
#[derive(Debug, Clone, PartialEq)]
pub enum GraphEvent {
    NodeClicked(PersonId),
    EdgeClicked(EdgeId),
    CanvasClicked,
    /// One person's position or pin changed.
    NodeMoved { id: PersonId, x: f32, y: f32, pinned: bool },
    /// A drag finished; every moved person, pinned where dropped.
    NodesMoved(Vec<MovedPerson>),
    /// Tidy with nothing selected.
    ReleaseAllPins,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Modifiers {
    pub shift: bool,
}

impl Modifiers {
    pub const NONE: Modifiers = Modifiers { shift: false };
    pub const SHIFT: Modifiers = Modifiers { shift: true };
}

/// A drag-group member and the pin it had before the press.
#[derive(Debug, Clone, PartialEq)]
pub struct DragMember {
    pub id: PersonId,
    prior_fx: Option<f32>,
    prior_fy: Option<f32>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub enum PointerState {
    #[default]
    Idle,
    /// Pressed on a person, not yet moved past the click tolerance.
    Pressed {
        person: PersonId,
        was_member: bool,
        group: Vec<DragMember>,
        origin: (f32, f32),
        last_world: (f32, f32),
    },
    /// Moving a group of pinned persons.
    Dragging {
        group: Vec<DragMember>,
        last_world: (f32, f32),
    },
    /// Shift-drag on empty canvas; corners in screen space.
    Brushing {
        origin: (f32, f32),
        current: (f32, f32),
    },
    /// Plain press on empty canvas (or on an edge).
    Panning {
        origin: (f32, f32),
        last: (f32, f32),
        edge: Option<EdgeId>,
        moved: bool,
    },
}

/// Borrowed view state a pointer handler works on.
pub struct Scene<'a> {
    pub arena: &'a mut GraphArena,
    pub selection: &'a mut SelectionManager,
    pub camera: &'a mut Camera,
    pub simulation: &'a mut Simulation,
    pub routes: &'a [EdgeRoute],
    pub config: &'a InteractionConfig,
}

fn travel(a: (f32, f32), b: (f32, f32)) -> f32 {
    (b.0 - a.0).hypot(b.1 - a.1)
}

#[derive(Debug, Clone, Default)]
pub struct PointerMachine {
    state: PointerState,
}

impl PointerMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &PointerState {
        &self.state
    }

    pub fn is_idle(&self) -> bool {
        self.state == PointerState::Idle
    }

    /// Brush rectangle corners in screen space, while brushing.
    pub fn brush_rect(&self) -> Option<((f32, f32), (f32, f32))> {
        match self.state {
            PointerState::Brushing { origin, current } => Some((origin, current)),
            _ => None,
        }
    }

    pub fn pointer_down(&mut self, scene: Scene<'_>, screen: (f32, f32), modifiers: Modifiers) -> Vec<GraphEvent> {
        if !self.is_idle() || !scene.camera.is_ready() {
            trace!("pointer down ignored in {:?}", self.state);
            return Vec::new();
        }
        let world = scene.camera.screen_to_world(screen.0, screen.1);
        let hit = find_person_at(world.0, world.1, scene.arena.nodes(), scene.config.node_hit_radius);

        self.state = match hit {
            Some(person) => {
                let was_member = scene.selection.contains(person);
                let ids: Vec<PersonId> = if was_member && scene.selection.len() > 1 {
                    scene.selection.iter().filter(|&id| scene.arena.contains(id)).collect()
                } else {
                    if modifiers.shift {
                        scene.selection.insert(person);
                    }
                    vec![person]
                };
                let group = ids
                    .into_iter()
                    .filter_map(|id| {
                        let node = scene.arena.node_mut(id)?;
                        let member = DragMember { id, prior_fx: node.fx, prior_fy: node.fy };
                        node.pin();
                        Some(member)
                    })
                    .collect();
                PointerState::Pressed { person, was_member, group, origin: screen, last_world: world }
            }
            None if modifiers.shift => PointerState::Brushing { origin: screen, current: screen },
            None => {
                let edge = find_edge_at(
                    world.0,
                    world.1,
                    scene.routes,
                    scene.config.edge_hit_distance / scene.camera.transform().k,
                    scene.config.hit_samples,
                );
                PointerState::Panning { origin: screen, last: screen, edge, moved: false }
            }
        };
        Vec::new()
    }

    pub fn pointer_move(&mut self, scene: Scene<'_>, screen: (f32, f32)) -> Vec<GraphEvent> {
        let tolerance = scene.config.click_tolerance;
        let world = scene.camera.screen_to_world(screen.0, screen.1);

        match &mut self.state {
            PointerState::Idle => {}
            PointerState::Pressed { group, origin, last_world, .. } => {
                if travel(*origin, screen) > tolerance {
                    let group = std::mem::take(group);
                    let from = *last_world;
                    scene.simulation.begin_drag();
                    move_group(scene.arena, &group, from, world);
                    trace!("drag started with {} person(s)", group.len());
                    self.state = PointerState::Dragging { group, last_world: world };
                }
            }
            PointerState::Dragging { group, last_world } => {
                move_group(scene.arena, group, *last_world, world);
                *last_world = world;
            }
            PointerState::Brushing { current, .. } => {
                *current = screen;
            }
            PointerState::Panning { origin, last, moved, .. } => {
                if *moved || travel(*origin, screen) > tolerance {
                    *moved = true;
                    scene.camera.pan_by(screen.0 - last.0, screen.1 - last.1);
                    *last = screen;
                }
            }
        }
        Vec::new()
    }

    pub fn pointer_up(&mut self, scene: Scene<'_>, screen: (f32, f32), modifiers: Modifiers) -> Vec<GraphEvent> {
        let tolerance = scene.config.click_tolerance;
        match std::mem::take(&mut self.state) {
            PointerState::Idle => Vec::new(),
            PointerState::Pressed { person, was_member, group, .. } => {
                restore_pins(scene.arena, &group);
                if modifiers.shift {
                    // A shift-press on a non-member already added it
                    if was_member {
                        scene.selection.toggle(person);
                    }
                } else {
                    scene.selection.handle_click(person, false);
                }
                vec![GraphEvent::NodeClicked(person)]
            }
            PointerState::Dragging { group, .. } => {
                scene.simulation.end_drag();
                let moved: Vec<MovedPerson> = group
                    .iter()
                    .filter_map(|m| scene.arena.node(m.id))
                    .map(|n| MovedPerson { id: n.id, x: n.x, y: n.y })
                    .collect();
                vec![GraphEvent::NodesMoved(moved)]
            }
            PointerState::Brushing { origin, .. } => {
                if travel(origin, screen) <= tolerance {
                    scene.selection.clear();
                } else {
                    let a = scene.camera.screen_to_world(origin.0, origin.1);
                    let b = scene.camera.screen_to_world(screen.0, screen.1);
                    let hits = people_in_brush(a, b, scene.arena.nodes());
                    trace!("brush selected {} person(s)", hits.len());
                    scene.selection.replace_selection(hits);
                }
                Vec::new()
            }
            PointerState::Panning { edge, moved, .. } => {
                if moved {
                    Vec::new()
                } else if let Some(edge) = edge {
                    vec![GraphEvent::EdgeClicked(edge)]
                } else {
                    scene.selection.clear();
                    vec![GraphEvent::CanvasClicked]
                }
            }
        }
    }

    /// Abandon the current gesture, restoring pins taken by a press or drag.
    pub fn cancel(&mut self, arena: &mut GraphArena, simulation: &mut Simulation) {
        match std::mem::take(&mut self.state) {
            PointerState::Pressed { group, .. } => restore_pins(arena, &group),
            PointerState::Dragging { group, .. } => {
                simulation.end_drag();
                restore_pins(arena, &group);
            }
            _ => {}
        }
    }
}

fn move_group(arena: &mut GraphArena, group: &[DragMember], from: (f32, f32), to: (f32, f32)) {
    let (dx, dy) = (to.0 - from.0, to.1 - from.1);
    for member in group {
        if let Some(node) = arena.node_mut(member.id) {
            let x = node.fx.unwrap_or(node.x) + dx;
            let y = node.fy.unwrap_or(node.y) + dy;
            node.pin_at(x, y);
        }
    }
}

fn restore_pins(arena: &mut GraphArena, group: &[DragMember]) {
    for member in group {
        if let Some(node) = arena.node_mut(member.id) {
            node.fx = member.prior_fx;
            node.fy = member.prior_fy;
        }
    }
}
