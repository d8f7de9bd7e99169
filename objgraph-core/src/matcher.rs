//! Graph Matcher
//!
//! Correlates two successive positioned graphs so a renderer can tween from
//! the old geometry to the new one instead of redrawing.
//!
//! Matching is an exact identity join, done separately for three kinds of
//! entities:
//!
//! - nodes, keyed by [`NodeIdentity`]
//! - rows, keyed by owner identity and property name ([`RowKey`])
//! - edges, keyed by row and target identity ([`EdgeKey`])
//!
//! Every entity of the new graph ends up either created or moved; entities
//! only in the old graph are destroyed. "Moved" means present in both, and
//! carries both geometries even when they are equal.

use std::hash::Hash;

use indexmap::IndexMap;
use serde::Serialize;

use crate::error::LayoutError;
use crate::graph::NodeIdentity;
use crate::layout::{PositionedGraph, Rect, Route};

/// Identity of a row across builds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct RowKey {
    pub owner: NodeIdentity,
    pub name: String,
}

/// Identity of an edge across builds.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct EdgeKey {
    pub row: RowKey,
    pub target: NodeIdentity,
}

/// An entity present in both graphs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Moved<K, G> {
    pub key: K,
    pub from: G,
    pub to: G,
}

impl<K, G: PartialEq> Moved<K, G> {
    /// Geometry did not change.
    pub fn is_stationary(&self) -> bool {
        self.from == self.to
    }
}

/// Created/destroyed/moved sets for one kind of entity.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EntityDiff<K, G> {
    pub created: Vec<K>,
    pub destroyed: Vec<K>,
    pub moved: Vec<Moved<K, G>>,
}

impl<K, G> Default for EntityDiff<K, G> {
    fn default() -> Self {
        Self {
            created: Vec::new(),
            destroyed: Vec::new(),
            moved: Vec::new(),
        }
    }
}

impl<K, G> EntityDiff<K, G> {
    pub fn is_unchanged(&self) -> bool {
        self.created.is_empty() && self.destroyed.is_empty()
    }
}

/// Correspondence between two positioned graphs.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GraphDiff {
    pub nodes: EntityDiff<NodeIdentity, Rect>,
    pub properties: EntityDiff<RowKey, Rect>,
    pub edges: EntityDiff<EdgeKey, Route>,
}

#[derive(Default)]
struct Entities {
    nodes: IndexMap<NodeIdentity, Rect>,
    rows: IndexMap<RowKey, Rect>,
    edges: IndexMap<EdgeKey, Route>,
}

impl Entities {
    fn collect(graph: &PositionedGraph) -> Result<Self, LayoutError> {
        let mut entities = Entities::default();
        for node in graph.nodes() {
            entities.nodes.insert(node.identity.clone(), node.bounds);
            for row in &node.properties {
                let key = RowKey {
                    owner: node.identity.clone(),
                    name: row.name.clone(),
                };
                if let Some(edge) = &row.edge {
                    if graph.node(&edge.target_identity).is_none() {
                        return Err(LayoutError::MissingGeometry {
                            owner: node.expression.clone(),
                            property: row.name.clone(),
                            target: edge.target_identity.to_string(),
                        });
                    }
                    entities.edges.insert(
                        EdgeKey {
                            row: key.clone(),
                            target: edge.target_identity.clone(),
                        },
                        edge.route.clone(),
                    );
                }
                entities.rows.insert(key, row.bounds);
            }
        }
        Ok(entities)
    }
}

fn join<K, G>(old: &IndexMap<K, G>, new: &IndexMap<K, G>) -> EntityDiff<K, G>
where
    K: Hash + Eq + Clone,
    G: Clone,
{
    let mut diff = EntityDiff::default();
    for (key, to) in new {
        match old.get(key) {
            Some(from) => diff.moved.push(Moved {
                key: key.clone(),
                from: from.clone(),
                to: to.clone(),
            }),
            None => diff.created.push(key.clone()),
        }
    }
    diff.destroyed = old.keys().filter(|key| !new.contains_key(*key)).cloned().collect();
    diff
}

/// Computes [`GraphDiff`]s. Stateless.
#[derive(Debug, Clone, Copy, Default)]
pub struct GraphMatcher;

impl GraphMatcher {
    pub fn new() -> Self {
        Self
    }

    /// Diff `new` against its predecessor. With no predecessor everything is
    /// created.
    ///
    /// Fails only if a graph is malformed: an edge whose target node has no
    /// geometry.
    pub fn match_graphs(
        &self,
        old: Option<&PositionedGraph>,
        new: &PositionedGraph,
    ) -> Result<GraphDiff, LayoutError> {
        let old = match old {
            Some(old) => Entities::collect(old)?,
            None => Entities::default(),
        };
        let new = Entities::collect(new)?;

        let diff = GraphDiff {
            nodes: join(&old.nodes, &new.nodes),
            properties: join(&old.rows, &new.rows),
            edges: join(&old.edges, &new.edges),
        };
        tracing::debug!(
            created_nodes = diff.nodes.created.len(),
            destroyed_nodes = diff.nodes.destroyed.len(),
            moved_nodes = diff.nodes.moved.len(),
            created_edges = diff.edges.created.len(),
            destroyed_edges = diff.edges.destroyed.len(),
            "graphs matched"
        );
        Ok(diff)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BuilderConfig, LayoutConfig};
    use crate::debuggee::{HeapDebuggee, HeapValue};
    use crate::expanded::Expanded;
    use crate::graph::ObjectGraphBuilder;
    use crate::layout::{LayoutDirection, TreeLayout};

    fn heap() -> HeapDebuggee {
        let mut heap = HeapDebuggee::new();
        let order = heap.alloc("Order");
        let customer = heap.alloc("Customer");
        heap.set_field(order, "id", HeapValue::atomic("int", "42"));
        heap.set_field(order, "customer", customer);
        heap.set_field(customer, "name", HeapValue::atomic("string", "\"Grace\""));
        heap.set_local("order", order);
        heap
    }

    fn positioned(heap: &HeapDebuggee, expanded: &Expanded) -> PositionedGraph {
        let graph = ObjectGraphBuilder::new(heap, BuilderConfig::default())
            .build_graph_for_expression("order", expanded)
            .unwrap();
        TreeLayout::new(LayoutDirection::TopBottom, LayoutConfig::default())
            .calculate_layout(&graph, expanded)
            .unwrap()
    }

    #[test]
    fn no_predecessor_means_everything_created() {
        let heap = heap();
        let mut expanded = Expanded::new();
        expanded.set_property_expanded("order.customer");
        let graph = positioned(&heap, &expanded);

        let diff = GraphMatcher::new().match_graphs(None, &graph).unwrap();
        assert_eq!(diff.nodes.created.len(), 2);
        assert_eq!(diff.properties.created.len(), 3);
        assert_eq!(diff.edges.created.len(), 1);
        assert!(diff.nodes.moved.is_empty() && diff.nodes.destroyed.is_empty());
        assert!(diff.edges.moved.is_empty() && diff.edges.destroyed.is_empty());
    }

    #[test]
    fn same_graph_is_all_moved() {
        let heap = heap();
        let mut expanded = Expanded::new();
        expanded.set_property_expanded("order.customer");
        let graph = positioned(&heap, &expanded);

        let diff = GraphMatcher::new().match_graphs(Some(&graph), &graph).unwrap();
        assert!(diff.nodes.is_unchanged());
        assert!(diff.properties.is_unchanged());
        assert!(diff.edges.is_unchanged());
        assert_eq!(diff.nodes.moved.len(), 2);
        assert_eq!(diff.properties.moved.len(), 3);
        assert_eq!(diff.edges.moved.len(), 1);
        assert!(diff.nodes.moved.iter().all(Moved::is_stationary));
    }

    #[test]
    fn collapsing_destroys_subtree() {
        let heap = heap();
        let mut expanded = Expanded::new();
        expanded.set_property_expanded("order.customer");
        let before = positioned(&heap, &expanded);
        let after = positioned(&heap, &Expanded::new());

        let diff = GraphMatcher::new().match_graphs(Some(&before), &after).unwrap();
        assert!(diff.nodes.created.is_empty());
        assert_eq!(diff.nodes.destroyed.len(), 1);
        assert_eq!(diff.nodes.moved.len(), 1);
        assert_eq!(diff.edges.destroyed.len(), 1);
        assert_eq!(
            diff.properties.destroyed,
            vec![RowKey {
                owner: before.nodes()[1].identity.clone(),
                name: "name".into(),
            }]
        );
    }

    #[test]
    fn every_new_entity_is_created_or_moved_never_both() {
        let heap = heap();
        let mut expanded = Expanded::new();
        let before = positioned(&heap, &expanded);
        expanded.set_property_expanded("order.customer");
        let after = positioned(&heap, &expanded);

        let diff = GraphMatcher::new().match_graphs(Some(&before), &after).unwrap();
        for node in after.nodes() {
            let created = diff.nodes.created.contains(&node.identity);
            let moved = diff.nodes.moved.iter().any(|m| m.key == node.identity);
            assert!(created ^ moved);
            assert!(!diff.nodes.destroyed.contains(&node.identity));
        }
    }
}
