//! The owned node/edge arena one view lays out.
//!
//! [`GraphArena`] is the single source of truth for positions during a layout
//! pass. The simulation, router, interaction state machine and camera all
//! receive it by reference; nothing else holds node state.

use log::trace;
use std::collections::{BTreeSet, HashMap};
use std::f32::consts::PI;

use crate::generation::GenerationMap;
use crate::kinship::FilteredGraph;
use crate::model::{EdgeId, FamilyId, Person, PersonId, RelationType};
use crate::router::assign_parallel_groups;

/// Spacing of the initial phyllotaxis spiral.
const INITIAL_RADIUS: f32 = 10.0;

/// Solver state of one person.
#[derive(Debug, Clone, PartialEq)]
pub struct SimNode {
    pub id: PersonId,
    pub family_id: FamilyId,
    pub x: f32,
    pub y: f32,
    pub vx: f32,
    pub vy: f32,
    pub fx: Option<f32>,
    pub fy: Option<f32>,
}

impl SimNode {
    pub fn position(&self) -> (f32, f32) {
        (self.x, self.y)
    }

    pub fn is_pinned(&self) -> bool {
        self.fx.is_some() || self.fy.is_some()
    }

    /// Pin at the current position.
    pub fn pin(&mut self) {
        self.fx = Some(self.x);
        self.fy = Some(self.y);
    }

    /// Pin at `(x, y)` and move there.
    pub fn pin_at(&mut self, x: f32, y: f32) {
        self.x = x;
        self.y = y;
        self.fx = Some(x);
        self.fy = Some(y);
    }

    pub fn unpin(&mut self) {
        self.fx = None;
        self.fy = None;
    }
}

/// An edge whose endpoints are both present in the arena.
#[derive(Debug, Clone, PartialEq)]
pub struct ActiveEdge {
    pub id: EdgeId,
    pub source: PersonId,
    pub target: PersonId,
    /// Arena index of `source`.
    pub source_index: usize,
    /// Arena index of `target`.
    pub target_index: usize,
    pub relation: RelationType,
    pub strength: f32,
    /// Position within the parallel group sharing this endpoint pair.
    pub group_ordinal: usize,
    /// Number of edges sharing this endpoint pair.
    pub group_size: usize,
}

impl ActiveEdge {
    pub fn pair_key(&self) -> (PersonId, PersonId) {
        if self.source <= self.target {
            (self.source, self.target)
        } else {
            (self.target, self.source)
        }
    }
}

/// How pins survive a rebuild.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PinPolicy {
    /// Keep pins of surviving nodes; new nodes take the owner's stored pin.
    Inherit,
    /// Keep pins of surviving nodes; new nodes start unpinned.
    KeepExisting,
    /// Drop every pin.
    Clear,
}

/// What a rebuild changed.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RebuildReport {
    /// Persons with no previous solver state.
    pub added: Vec<PersonId>,
    /// The subset of `added` with no stored or pinned position, placed on
    /// the seeding spiral.
    pub unplaced: Vec<PersonId>,
    /// Number of persons that were dropped.
    pub removed: usize,
    /// Edges skipped because an endpoint was missing.
    pub dangling: usize,
}

/// Owned node and edge storage for one view.
#[derive(Debug, Clone, Default)]
pub struct GraphArena {
    nodes: Vec<SimNode>,
    index: HashMap<PersonId, usize>,
    edges: Vec<ActiveEdge>,
    generations: GenerationMap,
}

impl GraphArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the contents with `graph`, carrying solver state over by id.
    ///
    /// Surviving nodes keep position, velocity and (per `pins`) their pin.
    /// New nodes take the owner's stored position, or a point on a spiral
    /// around `origin` when they have none.
    pub fn rebuild(&mut self, graph: &FilteredGraph<'_>, pins: PinPolicy, origin: (f32, f32)) -> RebuildReport {
        let previous: HashMap<PersonId, SimNode> =
            self.nodes.drain(..).map(|node| (node.id, node)).collect();
        self.index.clear();

        let mut report = RebuildReport::default();
        for person in &graph.people {
            if self.index.contains_key(&person.id) {
                continue;
            }
            let node = match previous.get(&person.id) {
                Some(prev) => {
                    let mut node = prev.clone();
                    node.family_id = person.family_id;
                    if pins == PinPolicy::Clear {
                        node.unpin();
                    }
                    node
                }
                None => {
                    report.added.push(person.id);
                    if !Self::has_stored_position(person) {
                        report.unplaced.push(person.id);
                    }
                    Self::fresh_node(person, pins, self.nodes.len(), origin)
                }
            };
            self.index.insert(node.id, self.nodes.len());
            self.nodes.push(node);
        }
        report.removed = previous.keys().filter(|id| !self.index.contains_key(id)).count();

        self.edges.clear();
        for rel in &graph.relationships {
            let (Some(&source_index), Some(&target_index)) =
                (self.index.get(&rel.source), self.index.get(&rel.target))
            else {
                trace!("dropping relationship {} with a missing endpoint", rel.id);
                report.dangling += 1;
                continue;
            };
            self.edges.push(ActiveEdge {
                id: rel.id,
                source: rel.source,
                target: rel.target,
                source_index,
                target_index,
                relation: rel.relation,
                strength: rel.strength,
                group_ordinal: 0,
                group_size: 1,
            });
        }
        assign_parallel_groups(&mut self.edges);

        report
    }

    fn has_stored_position(person: &Person) -> bool {
        (person.x.is_some() && person.y.is_some()) || (person.fx.is_some() && person.fy.is_some())
    }

    fn fresh_node(person: &Person, pins: PinPolicy, slot: usize, origin: (f32, f32)) -> SimNode {
        let (x, y) = match (person.x, person.y) {
            (Some(x), Some(y)) => (x, y),
            _ => phyllotaxis(slot, origin),
        };
        let (fx, fy) = match pins {
            PinPolicy::Inherit => (person.fx, person.fy),
            PinPolicy::KeepExisting | PinPolicy::Clear => (None, None),
        };
        SimNode {
            id: person.id,
            family_id: person.family_id,
            x: fx.unwrap_or(x),
            y: fy.unwrap_or(y),
            vx: 0.0,
            vy: 0.0,
            fx,
            fy,
        }
    }

    pub fn nodes(&self) -> &[SimNode] {
        &self.nodes
    }

    pub fn nodes_mut(&mut self) -> &mut [SimNode] {
        &mut self.nodes
    }

    pub fn edges(&self) -> &[ActiveEdge] {
        &self.edges
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn contains(&self, id: PersonId) -> bool {
        self.index.contains_key(&id)
    }

    pub fn index_of(&self, id: PersonId) -> Option<usize> {
        self.index.get(&id).copied()
    }

    pub fn node(&self, id: PersonId) -> Option<&SimNode> {
        self.index.get(&id).map(|&i| &self.nodes[i])
    }

    pub fn node_mut(&mut self, id: PersonId) -> Option<&mut SimNode> {
        self.index.get(&id).map(|&i| &mut self.nodes[i])
    }

    pub fn ids(&self) -> impl Iterator<Item = PersonId> + '_ {
        self.nodes.iter().map(|n| n.id)
    }

    /// Node and edge id sets, used to tell structural changes apart.
    pub fn identity(&self) -> (BTreeSet<PersonId>, BTreeSet<EdgeId>) {
        (self.ids().collect(), self.edges.iter().map(|e| e.id).collect())
    }

    /// Endpoint positions of `edge`.
    pub fn endpoints(&self, edge: &ActiveEdge) -> ((f32, f32), (f32, f32)) {
        (
            self.nodes[edge.source_index].position(),
            self.nodes[edge.target_index].position(),
        )
    }

    pub fn generations(&self) -> &GenerationMap {
        &self.generations
    }

    pub fn set_generations(&mut self, generations: GenerationMap) {
        self.generations = generations;
    }

    /// Drop every pin.
    pub fn release_all_pins(&mut self) {
        for node in &mut self.nodes {
            node.unpin();
        }
    }

    /// Axis-aligned bounds of all node centres as `(min_x, min_y, max_x, max_y)`.
    pub fn bounds(&self) -> Option<(f32, f32, f32, f32)> {
        let first = self.nodes.first()?;
        let init = (first.x, first.y, first.x, first.y);
        Some(self.nodes.iter().fold(init, |(x0, y0, x1, y1), n| {
            (x0.min(n.x), y0.min(n.y), x1.max(n.x), y1.max(n.y))
        }))
    }
}

/// Deterministic sunflower placement for nodes without a position.
fn phyllotaxis(slot: usize, origin: (f32, f32)) -> (f32, f32) {
    let angle_step = PI * (3.0 - 5.0f32.sqrt());
    let radius = INITIAL_RADIUS * (0.5 + slot as f32).sqrt();
    let angle = slot as f32 * angle_step;
    (origin.0 + radius * angle.cos(), origin.1 + radius * angle.sin())
}
