//! Integration Tests for the Visualizer Pipeline
//!
//! These tests drive build, layout and matching together through the public
//! API, the way a visualizer host would.

use std::sync::Arc;

use objgraph_core::config::{BuilderConfig, LayoutConfig, VisualizerConfig};
use objgraph_core::debuggee::{HeapDebuggee, HeapValue, ObjectHandle};
use objgraph_core::expanded::Expanded;
use objgraph_core::graph::{
    content_path, NodeId, NodeIdentity, ObjectGraph, ObjectGraphBuilder, PropertyRef,
};
use objgraph_core::layout::{GraphAction, LayoutDirection, TreeLayout};
use objgraph_core::matcher::GraphMatcher;
use objgraph_core::view::{ObjectGraphView, ViewState};

/// `myList` holds three `Item`s; item 1 points back at the list.
fn my_list() -> (HeapDebuggee, Vec<ObjectHandle>) {
    let mut heap = HeapDebuggee::new();
    let list = heap.alloc_list("List<Item>");
    let mut items = Vec::new();
    for index in 0..3 {
        let item = heap.alloc("Item");
        heap.set_field(item, "id", HeapValue::atomic("int", index.to_string()));
        heap.push_element(list, item);
        items.push(item);
    }
    heap.set_field(items[1], "owner", list);
    heap.set_local("myList", list);
    (heap, items)
}

fn edge_set(graph: &ObjectGraph) -> Vec<(PropertyRef, NodeId)> {
    graph.edges().map(|edge| (edge.from, edge.target)).collect()
}

/// Test the collapsed-list scenario end to end.
#[test]
fn collapsed_list_builds_one_node_with_three_rows() {
    let (heap, _) = my_list();
    let expanded = Expanded::new();

    let graph = ObjectGraphBuilder::new(&heap, BuilderConfig::default())
        .build_graph_for_expression("myList", &expanded)
        .unwrap();
    assert_eq!(graph.node_count(), 1);
    let root = graph.node(graph.root().unwrap()).unwrap();
    assert_eq!(root.properties().len(), 3);
    assert!(root.properties().iter().all(|p| p.is_content() && p.target().is_none()));

    let config = LayoutConfig::default();
    let positioned = TreeLayout::new(LayoutDirection::TopBottom, config.clone())
        .calculate_layout(&graph, &expanded)
        .unwrap();
    assert_eq!(positioned.nodes().len(), 1);
    assert_eq!(
        positioned.nodes()[0].bounds.height,
        config.header_height + 3.0 * config.row_height
    );

    let diff = GraphMatcher::new().match_graphs(None, &positioned).unwrap();
    assert_eq!(diff.nodes.created.len(), 1);
    assert_eq!(diff.properties.created.len(), 3);
    assert!(diff.nodes.moved.is_empty() && diff.nodes.destroyed.is_empty());
    assert!(diff.properties.moved.is_empty() && diff.properties.destroyed.is_empty());
    assert!(diff.edges.created.is_empty());
}

/// Test expanding one content entry through the view.
#[test]
fn expanding_an_entry_adds_one_node_and_one_edge() {
    let (heap, items) = my_list();
    let mut view = ObjectGraphView::new(heap, VisualizerConfig::default());
    view.refresh("myList").unwrap();
    let list_identity = view.current().unwrap().nodes()[0].identity.clone();

    let root = view.graph().unwrap().root().unwrap();
    let action = view
        .current()
        .unwrap()
        .toggle_action(PropertyRef { node: root, index: 1 })
        .unwrap();
    assert!(matches!(
        &action,
        GraphAction::ExpandContent { path, .. } if path == &content_path("myList", 1)
    ));

    let evaluations = view.debuggee().evaluation_count();
    let transition = view.apply(&action).unwrap();
    // The expanded item and its two members; nothing else is re-walked.
    assert_eq!(view.debuggee().evaluation_count() - evaluations, 3);

    let diff = &transition.diff;
    assert_eq!(diff.nodes.created, vec![NodeIdentity::Handle(items[1])]);
    assert_eq!(diff.edges.created.len(), 1);
    assert_eq!(diff.edges.created[0].row.name, "[1]");
    assert!(diff.nodes.destroyed.is_empty() && diff.edges.destroyed.is_empty());
    assert!(diff.nodes.moved.iter().any(|moved| moved.key == list_identity));

    let graph = view.graph().unwrap();
    assert_eq!(graph.node_count(), 2);
    assert!(view.expanded().read().is_content_expanded(&content_path("myList", 1)));
}

/// Test that expand followed by collapse restores the edge set.
#[test]
fn expand_then_collapse_round_trips() {
    let (heap, _) = my_list();
    let mut view = ObjectGraphView::new(heap, VisualizerConfig::default());
    view.expanded().write().set_content_expanded(content_path("myList", 0));
    view.refresh("myList").unwrap();
    let before = edge_set(view.graph().unwrap());
    assert_eq!(before.len(), 1);

    let root = view.graph().unwrap().root().unwrap();
    let row = PropertyRef { node: root, index: 2 };
    let expand = view.current().unwrap().toggle_action(row).unwrap();
    view.apply(&expand).unwrap();
    assert_eq!(edge_set(view.graph().unwrap()).len(), 2);

    let collapse = view.current().unwrap().toggle_action(row).unwrap();
    assert!(!collapse.is_expand());
    let transition = view.apply(&collapse).unwrap();

    assert_eq!(edge_set(view.graph().unwrap()), before);
    assert_eq!(transition.diff.nodes.destroyed.len(), 1);
    assert_eq!(transition.diff.edges.destroyed.len(), 1);
    assert!(transition.diff.nodes.created.is_empty());
    assert!(view.expanded().read().is_content_expanded(&content_path("myList", 0)));
    assert!(!view.expanded().read().is_content_expanded(&content_path("myList", 2)));
}

/// Test that aliases and cycles collapse onto one node per object.
#[test]
fn aliasing_and_cycles_share_nodes() {
    let (heap, _) = my_list();
    let mut expanded = Expanded::new();
    expanded.set_content_expanded(content_path("myList", 1));
    expanded.set_property_expanded("myList[1].owner");

    let graph = ObjectGraphBuilder::new(&heap, BuilderConfig::default())
        .build_graph_for_expression("myList", &expanded)
        .unwrap();
    assert_eq!(graph.node_count(), 2);
    let root = graph.root().unwrap();
    let owner_edge = graph.edges().find(|edge| !edge.content).unwrap();
    assert_eq!(owner_edge.target, root);

    let positioned = TreeLayout::new(LayoutDirection::LeftRight, LayoutConfig::default())
        .calculate_layout(&graph, &expanded)
        .unwrap();
    assert_eq!(positioned.nodes().len(), 2);
    assert_eq!(positioned.edge_count(), 2);
}

/// Test that a rebuild picks up expansion state and matches by identity.
#[test]
fn rebuild_matches_nodes_across_builds() {
    let (heap, _) = my_list();
    let mut view = ObjectGraphView::new(heap, VisualizerConfig::default());
    view.refresh("myList").unwrap();
    view.expanded().write().set_content_expanded(content_path("myList", 2));

    let transition = view.rebuild().unwrap();
    assert_eq!(view.state(), ViewState::HasGraph);
    assert_eq!(transition.diff.nodes.created.len(), 1);
    assert_eq!(transition.diff.nodes.moved.len(), 1);
    assert_eq!(transition.diff.properties.moved.len(), 3);
    assert_ne!(
        transition.previous.unwrap().graph(),
        view.current().unwrap().graph()
    );
}

/// Test that two views see each other's expansion state.
#[test]
fn views_can_share_expansion_state() {
    let shared = Expanded::new().shared();
    let (first_heap, _) = my_list();
    let (second_heap, _) = my_list();
    let config = VisualizerConfig::default();
    let mut first = ObjectGraphView::with_expanded(first_heap, config.clone(), Arc::clone(&shared));
    let mut second = ObjectGraphView::with_expanded(second_heap, config, shared);

    first.refresh("myList").unwrap();
    let root = first.graph().unwrap().root().unwrap();
    let action = first
        .current()
        .unwrap()
        .toggle_action(PropertyRef { node: root, index: 0 })
        .unwrap();
    first.apply(&action).unwrap();

    second.refresh("myList").unwrap();
    assert_eq!(second.graph().unwrap().node_count(), 2);
}

/// Test that layout output is reproducible for every direction.
#[test]
fn layout_is_reproducible() {
    let (heap, _) = my_list();
    let mut expanded = Expanded::new();
    for index in 0..3 {
        expanded.set_content_expanded(content_path("myList", index));
    }
    let graph = ObjectGraphBuilder::new(&heap, BuilderConfig::default())
        .build_graph_for_expression("myList", &expanded)
        .unwrap();

    for direction in LayoutDirection::ALL {
        let layout = TreeLayout::new(direction, LayoutConfig::default());
        let positioned = layout.calculate_layout(&graph, &expanded).unwrap();
        let again = layout.calculate_layout(&graph, &expanded).unwrap();
        let first = serde_json::to_vec(&positioned).unwrap();
        let second = serde_json::to_vec(&again).unwrap();
        assert_eq!(first, second, "{direction}");

        let siblings = &positioned.nodes()[1..];
        for (i, a) in siblings.iter().enumerate() {
            for b in &siblings[i + 1..] {
                assert!(!a.bounds.intersects(&b.bounds), "{direction}");
            }
        }
    }
}

/// Test the error surface of the view.
#[test]
fn errors_are_user_facing() {
    let (heap, _) = my_list();
    let mut view = ObjectGraphView::new(heap, VisualizerConfig::default());

    let err = view.refresh("nothing").unwrap_err();
    assert!(err.to_string().starts_with("Expression cannot be evaluated - "));
    assert_eq!(view.state(), ViewState::Empty);

    view.debuggee().set_running(true);
    let err = view.refresh("myList").unwrap_err();
    assert_eq!(err.to_string(), "Cannot inspect when the process is running.");
}
