//! Layered seeding for tree and genealogy views.
//!
//! Persons entering a generation-constrained layout without a prior position
//! are placed from a Sugiyama layered drawing of the ancestry edges (parents
//! above children) instead of the default spiral, so the solver starts close
//! to its banded equilibrium.
//!
//! `rust-sugiyama` works in `f64`; positions are converted to `f32` once
//! they are applied to the arena.
//!
//! Requires the `layout` feature to be enabled.

use log::debug;
use std::collections::{HashMap, HashSet};

use crate::arena::GraphArena;
use crate::model::{PersonId, RelationType};

/// Parameters for [`layered_positions`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayeredSeedConfig {
    /// Box reserved for each person.
    pub node_size: (f64, f64),
    /// Minimum spacing between vertices in a layer (0 uses the crate default).
    pub vertex_spacing: f64,
    /// Horizontal gap between disconnected components.
    pub component_gap: f64,
}

impl Default for LayeredSeedConfig {
    fn default() -> Self {
        Self { node_size: (60.0, 60.0), vertex_spacing: 40.0, component_gap: 80.0 }
    }
}

/// Layered positions for `people`, given `(upper, lower)` ancestry pairs.
///
/// Pairs naming persons outside `people` are skipped, as are self-loops and
/// duplicates. Disconnected components are placed side by side.
pub fn layered_positions(
    people: &[PersonId],
    ancestry: &[(PersonId, PersonId)],
    config: &LayeredSeedConfig,
) -> HashMap<PersonId, (f64, f64)> {
    if people.is_empty() {
        return HashMap::new();
    }

    let mut index: HashMap<PersonId, u32> = HashMap::with_capacity(people.len());
    let mut ids: Vec<PersonId> = Vec::with_capacity(people.len());
    for &id in people {
        index.entry(id).or_insert_with(|| {
            ids.push(id);
            ids.len() as u32 - 1
        });
    }

    let vertices: Vec<(u32, (f64, f64))> = (0..ids.len() as u32).map(|i| (i, config.node_size)).collect();
    let edges: Vec<(u32, u32)> = ancestry
        .iter()
        .filter_map(|&(upper, lower)| Some((*index.get(&upper)?, *index.get(&lower)?)))
        .filter(|(a, b)| a != b)
        .collect::<HashSet<_>>()
        .into_iter()
        .collect();

    let mut sg_config = rust_sugiyama::configure::Config::default();
    if config.vertex_spacing > 0.0 {
        sg_config.vertex_spacing = config.vertex_spacing;
    }

    let components = rust_sugiyama::from_vertices_and_edges(&vertices, &edges, &sg_config);

    let mut positions = HashMap::with_capacity(ids.len());
    let mut offset_x = 0.0;
    for (layout, _width, _height) in &components {
        let min_x = layout.iter().map(|&(_, (x, _))| x).fold(f64::INFINITY, f64::min);
        let mut max_x = offset_x;
        for &(idx, (x, y)) in layout {
            if let Some(&id) = ids.get(idx) {
                let px = offset_x + (x - min_x);
                max_x = max_x.max(px);
                positions.insert(id, (px, y));
            }
        }
        offset_x = max_x + config.node_size.0 + config.component_gap;
    }
    positions
}

/// `(parent, child)` pairs from the arena's active `ancestor` edges.
///
/// Ancestor edges run child → parent; the layered drawing wants parents on top.
pub fn ancestry_pairs(arena: &GraphArena, ancestor: RelationType) -> Vec<(PersonId, PersonId)> {
    arena
        .edges()
        .iter()
        .filter(|e| e.relation == ancestor)
        .map(|e| (e.target, e.source))
        .collect()
}

/// Move the persons in `fresh` to layered positions centred on `origin`.
///
/// Persons already in the arena keep their positions; only `fresh` ones are
/// placed. Callers pass [`RebuildReport::unplaced`](crate::arena::RebuildReport::unplaced)
/// so owner-stored positions survive. Returns how many were moved.
pub fn seed_layered(
    arena: &mut GraphArena,
    fresh: &[PersonId],
    ancestor: RelationType,
    origin: (f32, f32),
    config: &LayeredSeedConfig,
) -> usize {
    if fresh.is_empty() {
        return 0;
    }
    let people: Vec<PersonId> = arena.ids().collect();
    let positions = layered_positions(&people, &ancestry_pairs(arena, ancestor), config);
    if positions.is_empty() {
        return 0;
    }

    let n = positions.len() as f64;
    let (sum_x, sum_y) = positions.values().fold((0.0, 0.0), |(sx, sy), &(x, y)| (sx + x, sy + y));
    let (cx, cy) = (sum_x / n, sum_y / n);

    let mut moved = 0;
    for &id in fresh {
        let (Some(&(x, y)), Some(node)) = (positions.get(&id), arena.node_mut(id)) else {
            continue;
        };
        if node.is_pinned() {
            continue;
        }
        node.x = origin.0 + (x - cx) as f32;
        node.y = origin.1 + (y - cy) as f32;
        moved += 1;
    }
    debug!("layered seeding placed {} of {} new person(s)", moved, fresh.len());
    moved
}
