//! Level 5: Keyboard & Command Tests
//!
//! Tests Escape, select-all, tidy and lineage focus.

mod common;

use common::harness::GraphHarness;
use slint_relation_graph::{
    FilterState, GraphEvent, KinshipMode, Person, PointerState, RelationType, Relationship,
};

/// 1 -parent-> 2, 2 -spouse- 4, 3 -friend- 1. Family 1: 1, 2, 3; family 2: 4.
fn family() -> GraphHarness {
    GraphHarness::with_graph(
        vec![
            Person::new(1, 1).at(100.0, 100.0),
            Person::new(2, 1).at(200.0, 100.0),
            Person::new(3, 1).at(300.0, 300.0),
            Person::new(4, 2).at(500.0, 100.0),
        ],
        vec![
            Relationship::new(10, 1, 2, RelationType::Parent),
            Relationship::new(11, 2, 4, RelationType::Spouse),
            Relationship::new(12, 3, 1, RelationType::Friend),
        ],
    )
}

fn active_ids(harness: &GraphHarness) -> Vec<i32> {
    let mut ids: Vec<i32> = harness.ctrl.view().borrow().arena().ids().collect();
    ids.sort();
    ids
}

// ============================================================================
// Escape
// ============================================================================

#[test]
fn test_escape_clears_selection() {
    let harness = GraphHarness::new();
    harness.ctrl.select_all();

    let events = harness.ctrl.escape();
    assert_eq!(events, vec![GraphEvent::CanvasClicked]);
    assert!(harness.selected().is_empty());
    assert_eq!(harness.tracker.all(), vec![GraphEvent::CanvasClicked]);
}

#[test]
fn test_escape_cancels_drag_and_restores_pins() {
    let harness = GraphHarness::new();
    harness.ctrl.pointer_down(100.0, 100.0, false);
    harness.ctrl.pointer_move(140.0, 100.0);
    assert!(harness.is_pinned(1));

    harness.ctrl.escape();
    let view = harness.ctrl.view();
    let view = view.borrow();
    assert_eq!(*view.pointer_state(), PointerState::Idle);
    assert!(!view.arena().node(1).unwrap().is_pinned());
    assert_eq!(view.simulation().alpha_target(), 0.0);
}

#[test]
fn test_release_after_escape_is_ignored() {
    let harness = GraphHarness::new();
    harness.ctrl.pointer_down(100.0, 100.0, false);
    harness.ctrl.pointer_move(140.0, 100.0);
    harness.ctrl.escape();
    harness.tracker.clear();

    assert!(harness.ctrl.pointer_up(140.0, 100.0, false).is_empty());
    assert!(harness.tracker.move_batches().is_empty());
}

// ============================================================================
// Tidy
// ============================================================================

#[test]
fn test_tidy_without_selection_releases_all_pins() {
    let harness = GraphHarness::with_graph(
        vec![Person::new(1, 1).pinned_at(0.0, 0.0), Person::new(2, 1).pinned_at(50.0, 0.0)],
        vec![],
    );
    harness.settle(1000);

    let events = harness.ctrl.tidy();
    assert_eq!(events, vec![GraphEvent::ReleaseAllPins]);
    assert!(!harness.is_pinned(1));
    assert!(!harness.is_pinned(2));

    let view = harness.ctrl.view();
    let view = view.borrow();
    assert!(view.simulation().is_running());
    assert_eq!(view.simulation().alpha(), view.config().simulation.gentle_alpha);
}

#[test]
fn test_tidy_with_selection_unpins_only_selected() {
    let harness = GraphHarness::with_graph(
        vec![Person::new(1, 1).pinned_at(100.0, 100.0), Person::new(2, 1).pinned_at(300.0, 100.0)],
        vec![],
    );
    harness.click_person(1);
    assert!(harness.is_pinned(1), "a click keeps the existing pin");

    let events = harness.ctrl.tidy();
    assert_eq!(events, vec![GraphEvent::NodeMoved { id: 1, x: 100.0, y: 100.0, pinned: false }]);
    assert!(!harness.is_pinned(1));
    assert!(harness.is_pinned(2));
}

#[test]
fn test_tidy_events_reach_handler() {
    let harness = GraphHarness::new();
    harness.ctrl.tidy();

    assert_eq!(harness.tracker.all(), vec![GraphEvent::ReleaseAllPins]);
}

// ============================================================================
// Lineage focus
// ============================================================================

#[test]
fn test_lineage_focus_filters_to_kinship_closure() {
    let harness = family();
    assert!(harness.ctrl.enter_lineage_focus(1));

    // Strict: parent edge only; spouse and friend are not blood
    assert_eq!(active_ids(&harness), vec![1, 2]);
    assert_eq!(harness.selected(), vec![1]);
    assert_eq!(harness.ctrl.view().borrow().lineage_focus(), Some(1));
}

#[test]
fn test_lineage_focus_uses_saved_kinship_mode() {
    let harness = family();
    harness.ctrl.set_filter(FilterState { mode: KinshipMode::Expanded, ..FilterState::default() });
    harness.ctrl.enter_lineage_focus(1);

    assert_eq!(active_ids(&harness), vec![1, 2, 4]);
}

#[test]
fn test_lineage_focus_unknown_person_is_rejected() {
    let harness = family();
    assert!(!harness.ctrl.enter_lineage_focus(99));
    assert_eq!(active_ids(&harness), vec![1, 2, 3, 4]);
}

#[test]
fn test_escape_leaves_lineage_and_restores_selection() {
    let harness = family();
    harness.click_person(3);
    harness.ctrl.enter_lineage_focus(1);
    harness.tracker.clear();

    let events = harness.ctrl.escape();
    assert!(events.is_empty());
    assert_eq!(harness.ctrl.view().borrow().lineage_focus(), None);
    assert_eq!(active_ids(&harness), vec![1, 2, 3, 4]);
    assert_eq!(harness.selected(), vec![3]);
}

#[test]
fn test_canvas_click_leaves_lineage_without_restoring_selection() {
    let harness = family();
    harness.click_person(3);
    harness.ctrl.enter_lineage_focus(1);

    harness.click(700.0, 500.0);
    assert_eq!(harness.ctrl.view().borrow().lineage_focus(), None);
    assert_eq!(active_ids(&harness), vec![1, 2, 3, 4]);
    assert!(harness.selected().is_empty());
}

#[test]
fn test_refocusing_keeps_original_filter() {
    let harness = family();
    harness.ctrl.set_filter(FilterState::families(KinshipMode::Strict, [1]));
    assert_eq!(active_ids(&harness), vec![1, 2, 3]);

    harness.ctrl.enter_lineage_focus(1);
    harness.ctrl.enter_lineage_focus(2);
    assert_eq!(harness.ctrl.view().borrow().lineage_focus(), Some(2));

    harness.ctrl.escape();
    assert_eq!(*harness.ctrl.view().borrow().filter(), FilterState::families(KinshipMode::Strict, [1]));
    assert_eq!(active_ids(&harness), vec![1, 2, 3]);
}

#[test]
fn test_set_filter_abandons_lineage() {
    let harness = family();
    harness.ctrl.enter_lineage_focus(1);
    harness.ctrl.set_filter(FilterState::default());

    assert_eq!(harness.ctrl.view().borrow().lineage_focus(), None);
    assert_eq!(active_ids(&harness), vec![1, 2, 3, 4]);
}
