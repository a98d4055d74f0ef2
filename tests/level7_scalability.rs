//! Level 7: Scalability Tests
//!
//! These tests verify that the engine handles large graphs (hundreds of
//! simulated people, thousands of people for the pure passes) without
//! blowing up. Tests use generous timing thresholds to avoid CI flakiness
//! while still catching accidental quadratic-or-worse regressions in the
//! linear passes.
//!
//! **IMPORTANT:** Run with `cargo test level7 --release` for realistic performance.
//! Debug mode is 10-50x slower and timing assertions will be skipped.

mod common;

use common::harness::GraphHarness;
use slint::{Model, VecModel};
use slint_relation_graph::{
    apply_filter, compute_generations, find_edge_at, find_person_at, kinship_closure,
    kinship_types, people_in_brush, EngineConfig, FilterState, GenerationRelations, GraphSnapshot,
    KinshipMode, Person, RelationTaxonomy, RelationType, Relationship, SelectionManager,
    SimplePersonGeometry,
};
use std::rc::Rc;
use std::time::{Duration, Instant};

// ============================================================================
// Debug Mode Detection
// ============================================================================

/// Returns true if running in debug mode (without optimizations)
const fn is_debug_mode() -> bool {
    cfg!(debug_assertions)
}

/// Assert that elapsed time is within threshold, but skip in debug mode.
/// In debug mode, prints a warning instead of failing.
macro_rules! assert_timing {
    ($elapsed:expr, $threshold:expr, $($msg:tt)+) => {
        if is_debug_mode() {
            if $elapsed > $threshold {
                eprintln!(
                    "SKIPPED (debug mode): {} - took {:?}, threshold {:?}. Run with --release for accurate timing.",
                    format!($($msg)+),
                    $elapsed,
                    $threshold
                );
            }
        } else {
            assert!(
                $elapsed <= $threshold,
                "{} took {:?}, expected <= {:?}",
                format!($($msg)+),
                $elapsed,
                $threshold
            );
        }
    };
}

// ============================================================================
// Constants
// ============================================================================

/// People simulated by the force solver
const SCALE_SIM: usize = 200;

/// People for the linear passes
const SCALE_LARGE: usize = 4_095;

/// Hit-test population
const SCALE_HIT: usize = 10_000;

// ============================================================================
// Generators
// ============================================================================

/// People on a square grid, `spacing` apart, ids from 0.
fn generate_grid_people(count: usize, spacing: f32) -> Vec<Person> {
    let cols = (count as f32).sqrt().ceil() as usize;
    (0..count)
        .map(|i| {
            let (col, row) = (i % cols, i / cols);
            Person::new(i as i32, (i % 7) as i32).at(col as f32 * spacing, row as f32 * spacing)
        })
        .collect()
}

/// Binary family tree: person `i` is a child of `(i - 1) / 2`.
fn generate_binary_tree(count: usize) -> Vec<Relationship> {
    (1..count)
        .map(|i| Relationship::new(i as i32, i as i32, ((i - 1) / 2) as i32, RelationType::Parent))
        .collect()
}

/// Chain of `kind` edges 0-1-2-...
fn generate_chain(count: usize, kind: RelationType) -> Vec<Relationship> {
    (1..count)
        .map(|i| Relationship::new(i as i32, (i - 1) as i32, i as i32, kind))
        .collect()
}

fn generate_hit_people(count: usize, spacing: f32) -> Vec<SimplePersonGeometry> {
    let cols = (count as f32).sqrt().ceil() as usize;
    (0..count)
        .map(|i| SimplePersonGeometry {
            id: i as i32,
            x: (i % cols) as f32 * spacing,
            y: (i / cols) as f32 * spacing,
        })
        .collect()
}

// ============================================================================
// Generations
// ============================================================================

#[test]
fn test_generations_binary_tree_4k() {
    let edges = generate_binary_tree(SCALE_LARGE);
    let start = Instant::now();
    let map = compute_generations(0..SCALE_LARGE as i32, &edges, &GenerationRelations::default());
    let elapsed = start.elapsed();

    assert_eq!(map.len(), SCALE_LARGE);
    // Heap numbering: the root is the oldest ancestor, so levels grow downward
    assert_eq!(map.get(0), Some(0));
    assert_eq!(map.get(1), Some(1));
    assert_eq!(map.get(6), Some(2));
    assert_eq!(map.get(SCALE_LARGE as i32 - 1), Some(11));
    assert_eq!(map.depth(), 11);
    assert_timing!(elapsed, Duration::from_millis(100), "generations for {} people", SCALE_LARGE);
}

#[test]
fn test_generations_deep_chain() {
    // 0 is the child of 1, 1 of 2, ...
    let edges: Vec<Relationship> = (0..499)
        .map(|i| Relationship::new(i, i, i + 1, RelationType::Parent))
        .collect();
    let map = compute_generations(0..500, &edges, &GenerationRelations::default());

    assert_eq!(map.get(499), Some(0));
    assert_eq!(map.get(0), Some(499));
}

#[test]
fn test_generations_spouse_ring_terminates() {
    let mut edges = generate_chain(1_000, RelationType::Spouse);
    edges.push(Relationship::new(5_000, 999, 0, RelationType::Spouse));
    edges.push(Relationship::new(5_001, 500, 2_000, RelationType::Parent));
    let map = compute_generations((0..1_000).chain([2_000]), &edges, &GenerationRelations::default());

    // 500 has a parent; the whole ring of spouses is synchronised to it
    assert_eq!(map.get(500), Some(1));
    assert!((0..1_000).all(|id| map.get(id) == Some(1)));
}

// ============================================================================
// Kinship filter
// ============================================================================

#[test]
fn test_kinship_closure_long_chain() {
    let people: Vec<Person> = (0..SCALE_LARGE as i32).map(|id| Person::new(id, 0)).collect();
    let mut edges = generate_chain(SCALE_LARGE, RelationType::Parent);
    // Break the chain with a friendship in the middle
    edges[SCALE_LARGE / 2].relation = RelationType::Friend;
    let allowed = kinship_types(KinshipMode::Strict, &RelationTaxonomy::new());

    let start = Instant::now();
    let closure = kinship_closure(&people, &edges, [0], &allowed);
    let elapsed = start.elapsed();

    assert_eq!(closure.len(), SCALE_LARGE / 2 + 1);
    assert!(closure.contains(&0));
    assert!(!closure.contains(&(SCALE_LARGE as i32 - 1)));
    assert_timing!(elapsed, Duration::from_millis(50), "closure over {} people", SCALE_LARGE);
}

#[test]
fn test_family_filter_large_snapshot() {
    let people = generate_grid_people(SCALE_LARGE, 50.0);
    let edges = generate_binary_tree(SCALE_LARGE);
    let snapshot = GraphSnapshot::new(people, edges);

    let start = Instant::now();
    let graph = apply_filter(&snapshot, &FilterState::families(KinshipMode::Strict, [3]), &RelationTaxonomy::new());
    let elapsed = start.elapsed();

    // The tree is connected through blood edges, so any seed reaches everyone
    assert_eq!(graph.people.len(), SCALE_LARGE);
    assert_eq!(graph.relationships.len(), SCALE_LARGE - 1);
    assert_timing!(elapsed, Duration::from_millis(100), "filter over {} people", SCALE_LARGE);
}

// ============================================================================
// Solver
// ============================================================================

#[test]
fn test_simulation_settles_with_200_people() {
    let people = generate_grid_people(SCALE_SIM, 30.0);
    let edges = generate_chain(SCALE_SIM, RelationType::Friend);
    let harness = GraphHarness::with_graph(people, edges);

    let start = Instant::now();
    let frames = harness.settle(1_000);
    let elapsed = start.elapsed();

    assert!(frames < 1_000, "solver should cool on its own");
    assert!(!harness.ctrl.view().borrow().simulation().is_running());
    for id in 0..SCALE_SIM as i32 {
        let (x, y) = harness.position(id).unwrap();
        assert!(x.is_finite() && y.is_finite(), "person {} diverged", id);
    }
    assert_timing!(elapsed, Duration::from_secs(2), "settling {} people", SCALE_SIM);
}

#[test]
fn test_genealogy_settles_large_tree() {
    let harness = GraphHarness::with_graph(
        (0..SCALE_SIM as i32).map(|id| Person::new(id, id % 3)).collect(),
        generate_binary_tree(SCALE_SIM),
    );
    harness.ctrl.set_genealogy(true);
    harness.settle(1_000);

    let view = harness.ctrl.view();
    let view = view.borrow();
    assert_eq!(view.generations().depth(), 7);
    assert!(view.arena().nodes().iter().all(|n| n.x.is_finite() && n.y.is_finite()));
}

#[test]
fn test_people_model_sync_200() {
    let harness = GraphHarness::with_graph(generate_grid_people(SCALE_SIM, 30.0), vec![]);
    harness.run_frames(10);

    for row in harness.people.iter() {
        assert_eq!(Some((row.x, row.y)), harness.position(row.id));
    }
}

// ============================================================================
// Routing
// ============================================================================

#[test]
fn test_label_decollision_skipped_above_threshold() {
    let people = generate_grid_people(400, 80.0);
    let edges = generate_chain(320, RelationType::Friend);
    let harness = GraphHarness::with_graph(people, edges);

    let view = harness.ctrl.view();
    let view = view.borrow();
    assert_eq!(view.routes().len(), 319);
    assert!(view.routes().len() > view.config().router.decollide_max_edges);
    // Labels stay exactly on their anchors
    for route in view.routes() {
        assert_eq!((route.label.x, route.label.y), route.shape.eval(0.5));
    }
}

#[test]
fn test_many_parallel_edges_between_one_pair() {
    let edges: Vec<Relationship> = (0..25)
        .map(|i| Relationship::new(i, i % 2, 1 - i % 2, RelationType::Other))
        .collect();
    let harness = GraphHarness::with_graph(
        vec![Person::new(0, 0).at(100.0, 300.0), Person::new(1, 0).at(700.0, 300.0)],
        edges,
    );

    let view = harness.ctrl.view();
    let view = view.borrow();
    let straight = view.routes().iter().filter(|r| r.shape.is_straight()).count();
    assert_eq!(straight, 1);
    assert!(view.arena().edges().iter().all(|e| e.group_size == 25));
}

// ============================================================================
// Hit testing
// ============================================================================

#[test]
fn test_find_person_at_10k() {
    let people = generate_hit_people(SCALE_HIT, 50.0);

    let start = Instant::now();
    let hit = find_person_at(1_005.0, 498.0, &people, 24.0);
    let elapsed = start.elapsed();

    // Column 20, row 10 of a 100-wide grid
    assert_eq!(hit, Some(10 * 100 + 20));
    assert_eq!(find_person_at(1_025.0, 525.0, &people, 24.0), None);
    assert_timing!(elapsed, Duration::from_millis(5), "person hit test over {}", SCALE_HIT);
}

#[test]
fn test_find_edge_at_many_routes() {
    let harness = GraphHarness::with_graph(generate_grid_people(SCALE_SIM, 100.0), generate_chain(SCALE_SIM, RelationType::Friend));
    let view = harness.ctrl.view();
    let view = view.borrow();

    let start = Instant::now();
    // Edge 1 runs from person 0 (0, 0) to person 1 (100, 0)
    let hit = find_edge_at(50.0, 2.0, view.routes(), 6.0, 20);
    let elapsed = start.elapsed();

    assert_eq!(hit, Some(1));
    assert_timing!(elapsed, Duration::from_millis(10), "edge hit test over {} routes", view.routes().len());
}

#[test]
fn test_brush_over_10k() {
    let people = generate_hit_people(SCALE_HIT, 50.0);

    let start = Instant::now();
    let hits = people_in_brush((-1.0, -1.0), (251.0, 151.0), &people);
    let elapsed = start.elapsed();

    // 6 columns x 4 rows
    assert_eq!(hits.len(), 24);
    assert_timing!(elapsed, Duration::from_millis(5), "brush over {}", SCALE_HIT);
}

// ============================================================================
// Selection
// ============================================================================

#[test]
fn test_selection_replace_and_sync_10k() {
    let mut selection = SelectionManager::new();
    let model = Rc::new(VecModel::default());

    let start = Instant::now();
    selection.replace_selection(0..SCALE_HIT as i32);
    selection.sync_to_model(&model);
    let elapsed = start.elapsed();

    assert_eq!(model.row_count(), SCALE_HIT);
    assert_eq!(model.row_data(SCALE_HIT - 1), Some(SCALE_HIT as i32 - 1));
    assert_timing!(elapsed, Duration::from_millis(50), "selection sync of {}", SCALE_HIT);
}

#[test]
fn test_default_config_validates() {
    assert!(EngineConfig::default().validate().is_ok());
}
