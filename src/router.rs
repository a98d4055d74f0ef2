//! Parallel-edge routing and edge-label placement.
//!
//! Edges sharing an unordered endpoint pair form a parallel group. Within a
//! group, edges fan out symmetrically: the middle edge of an odd-sized group
//! (or a lone edge) is a straight chord, the others are quadratic curves bent
//! to alternating sides by a fixed spacing per step.
//!
//! Everything here is a pure function of the current arena snapshot, so it
//! can be tested without running the solver.

use log::trace;
use std::collections::HashMap;
use std::f32::consts::{FRAC_PI_2, PI};

use crate::arena::{ActiveEdge, GraphArena};
use crate::config::RouterConfig;
use crate::model::{EdgeId, PersonId};
use crate::path::EdgeShape;

/// Below this chord length the perpendicular is undefined.
const MIN_CHORD: f32 = 1e-6;

/// Sort edges by (source, target) and number each parallel group.
///
/// Every edge receives its ordinal inside the group and the group size.
pub fn assign_parallel_groups(edges: &mut [ActiveEdge]) {
    edges.sort_by_key(|e| (e.source, e.target, e.id));

    let mut counts: HashMap<(PersonId, PersonId), usize> = HashMap::new();
    for edge in edges.iter_mut() {
        let count = counts.entry(edge.pair_key()).or_insert(0);
        edge.group_ordinal = *count;
        *count += 1;
    }
    for edge in edges.iter_mut() {
        edge.group_size = counts.get(&edge.pair_key()).copied().unwrap_or(1);
    }
}

/// Signed curve offset in spacing units, or `None` for a straight chord.
///
/// Offsets are symmetric around the group centre: for four edges they are
/// -1.5, -0.5, 0.5, 1.5.
pub fn curve_offset(ordinal: usize, group_size: usize) -> Option<f32> {
    let middle = group_size % 2 == 1 && ordinal == (group_size - 1) / 2;
    if group_size <= 1 || middle {
        None
    } else {
        Some(ordinal as f32 - (group_size as f32 - 1.0) / 2.0)
    }
}

/// Geometry of one edge between `from` (its source) and `to` (its target).
pub fn route_edge(edge: &ActiveEdge, from: (f32, f32), to: (f32, f32), spacing: f32) -> EdgeShape {
    let Some(offset) = curve_offset(edge.group_ordinal, edge.group_size) else {
        return EdgeShape::Line { from, to };
    };

    // Perpendicular of the canonical (lower id -> higher id) chord, so edges of
    // both directions in one group bend relative to the same side.
    let (a, b) = if edge.source <= edge.target { (from, to) } else { (to, from) };
    let (dx, dy) = (b.0 - a.0, b.1 - a.1);
    let len = (dx * dx + dy * dy).sqrt();
    let (px, py) = if len < MIN_CHORD { (0.0, 1.0) } else { (-dy / len, dx / len) };

    let mid = ((from.0 + to.0) * 0.5, (from.1 + to.1) * 0.5);
    let control = (mid.0 + px * spacing * offset, mid.1 + py * spacing * offset);
    EdgeShape::Quadratic { from, control, to }
}

/// Source of measured label sizes.
///
/// Returning `None` means the label is not measurable yet; the router falls
/// back to a fixed box.
pub trait LabelMeasure {
    fn measure(&self, edge: EdgeId) -> Option<(f32, f32)>;
}

/// Measurement source that never has a size available.
#[derive(Debug, Clone, Copy, Default)]
pub struct FallbackMeasure;

impl LabelMeasure for FallbackMeasure {
    fn measure(&self, _edge: EdgeId) -> Option<(f32, f32)> {
        None
    }
}

impl<F> LabelMeasure for F
where
    F: Fn(EdgeId) -> Option<(f32, f32)>,
{
    fn measure(&self, edge: EdgeId) -> Option<(f32, f32)> {
        self(edge)
    }
}

/// Where an edge label sits and how it is rotated.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelAnchor {
    pub x: f32,
    pub y: f32,
    /// Rotation in radians, kept within (-π/2, π/2] so text reads upright.
    pub angle: f32,
    pub width: f32,
    pub height: f32,
}

/// Routed geometry of one active edge.
#[derive(Debug, Clone, PartialEq)]
pub struct EdgeRoute {
    pub id: EdgeId,
    pub shape: EdgeShape,
    pub label: LabelAnchor,
}

/// Label anchor at the parametric midpoint of `shape`, oriented along its tangent.
pub fn label_anchor(shape: &EdgeShape, size: (f32, f32)) -> LabelAnchor {
    let (x, y) = shape.eval(0.5);
    let (tx, ty) = shape.tangent(0.5);
    LabelAnchor { x, y, angle: upright(ty.atan2(tx)), width: size.0, height: size.1 }
}

fn upright(angle: f32) -> f32 {
    if angle > FRAC_PI_2 {
        angle - PI
    } else if angle <= -FRAC_PI_2 {
        angle + PI
    } else {
        angle
    }
}

/// Route every active edge of `arena` at its current positions.
pub fn route_edges<M>(arena: &GraphArena, config: &RouterConfig, measure: &M) -> Vec<EdgeRoute>
where
    M: LabelMeasure + ?Sized,
{
    let fallback = (config.label_fallback_width, config.label_fallback_height);
    arena
        .edges()
        .iter()
        .map(|edge| {
            let (from, to) = arena.endpoints(edge);
            let shape = route_edge(edge, from, to, config.curve_spacing);
            let size = measure.measure(edge.id).unwrap_or(fallback);
            EdgeRoute { id: edge.id, shape, label: label_anchor(&shape, size) }
        })
        .collect()
}

/// Push overlapping label boxes apart.
///
/// Runs `config.decollide_passes` relaxation passes. Each overlapping pair is
/// separated along whichever axis needs the smaller move, split evenly
/// between the two. Approximate by nature: a later push can create a new
/// overlap. Returns `false` when skipped because there are more than
/// `config.decollide_max_edges` routes.
pub fn decollide_labels(routes: &mut [EdgeRoute], config: &RouterConfig) -> bool {
    if routes.len() > config.decollide_max_edges {
        trace!("skipping label decollision for {} edges", routes.len());
        return false;
    }
    let window = routes.iter().map(|r| r.label.width).fold(0.0f32, f32::max);

    for _ in 0..config.decollide_passes {
        let mut order: Vec<usize> = (0..routes.len()).collect();
        order.sort_by(|&a, &b| routes[a].label.x.total_cmp(&routes[b].label.x));

        for (pos, &i) in order.iter().enumerate() {
            for &j in &order[pos + 1..] {
                if routes[j].label.x - routes[i].label.x > window {
                    break;
                }
                separate(routes, i, j);
            }
        }
    }
    true
}

fn separate(routes: &mut [EdgeRoute], i: usize, j: usize) {
    let a = routes[i].label;
    let b = routes[j].label;
    let (dx, dy) = (b.x - a.x, b.y - a.y);
    let overlap_x = (a.width + b.width) * 0.5 - dx.abs();
    let overlap_y = (a.height + b.height) * 0.5 - dy.abs();
    if overlap_x <= 0.0 || overlap_y <= 0.0 {
        return;
    }

    if overlap_x < overlap_y {
        let shift = overlap_x * 0.5 * if dx < 0.0 { -1.0 } else { 1.0 };
        routes[i].label.x -= shift;
        routes[j].label.x += shift;
    } else {
        let shift = overlap_y * 0.5 * if dy < 0.0 { -1.0 } else { 1.0 };
        routes[i].label.y -= shift;
        routes[j].label.y += shift;
    }
}
