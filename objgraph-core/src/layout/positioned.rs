//! Positioned Graph
//!
//! The output of a layout pass: every visible node and row with geometry,
//! and every visible edge with a route. Immutable once built.
//!
//! Instead of raising expand/collapse events, rows hand out [`GraphAction`]
//! values that the caller applies to the expansion state and feeds back into
//! the pipeline.

use indexmap::IndexMap;
use serde::Serialize;
use smallvec::SmallVec;

use super::direction::LayoutDirection;
use crate::graph::{GraphId, NodeId, NodeIdentity, PropertyKind, PropertyRef};

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    pub fn center(&self) -> Point {
        Point::new(self.x + self.width / 2.0, self.y + self.height / 2.0)
    }

    /// Interiors overlap; touching edges do not count.
    pub fn intersects(&self, other: &Rect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}

/// Polyline of an edge, from the source row to the target node.
pub type Route = SmallVec<[Point; 6]>;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedEdge {
    pub target: NodeId,
    pub target_identity: NodeIdentity,
    pub route: Route,
}

/// One row of a node: a member property or a content entry.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedProperty {
    pub property: PropertyRef,
    pub name: String,
    pub expression: String,
    pub kind: PropertyKind,
    pub text: String,
    pub bounds: Rect,
    /// Marked expanded in the expansion store.
    pub is_expanded: bool,
    /// The row refers to an object and can be toggled.
    pub is_expandable: bool,
    /// Present when the row's edge is laid out.
    pub edge: Option<PositionedEdge>,
}

impl PositionedProperty {
    /// The action that flips this row, or `None` for rows that cannot be
    /// expanded (atomic values, null, evaluation errors).
    pub fn toggle_action(&self, graph: GraphId) -> Option<GraphAction> {
        if !self.is_expandable {
            return None;
        }
        let property = self.property;
        let expand = !self.is_expanded;
        Some(match (&self.kind, expand) {
            (PropertyKind::Member, true) => GraphAction::ExpandProperty {
                graph,
                property,
                expression: self.expression.clone(),
            },
            (PropertyKind::Member, false) => GraphAction::CollapseProperty {
                graph,
                property,
                expression: self.expression.clone(),
            },
            (PropertyKind::ContentEntry { path, .. }, true) => GraphAction::ExpandContent {
                graph,
                property,
                path: path.clone(),
            },
            (PropertyKind::ContentEntry { path, .. }, false) => GraphAction::CollapseContent {
                graph,
                property,
                path: path.clone(),
            },
        })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PositionedNode {
    pub node: NodeId,
    pub identity: NodeIdentity,
    pub expression: String,
    pub type_name: String,
    pub is_content: bool,
    pub bounds: Rect,
    pub properties: Vec<PositionedProperty>,
}

impl PositionedNode {
    pub fn edges(&self) -> impl Iterator<Item = (&PositionedProperty, &PositionedEdge)> {
        self.properties
            .iter()
            .filter_map(|property| property.edge.as_ref().map(|edge| (property, edge)))
    }
}

/// A user request to expand or collapse one row, addressed to the graph it
/// was produced from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GraphAction {
    ExpandProperty {
        graph: GraphId,
        property: PropertyRef,
        expression: String,
    },
    CollapseProperty {
        graph: GraphId,
        property: PropertyRef,
        expression: String,
    },
    ExpandContent {
        graph: GraphId,
        property: PropertyRef,
        path: String,
    },
    CollapseContent {
        graph: GraphId,
        property: PropertyRef,
        path: String,
    },
}

impl GraphAction {
    pub fn graph(&self) -> GraphId {
        match self {
            GraphAction::ExpandProperty { graph, .. }
            | GraphAction::CollapseProperty { graph, .. }
            | GraphAction::ExpandContent { graph, .. }
            | GraphAction::CollapseContent { graph, .. } => *graph,
        }
    }

    /// The row the action applies to; `property.node` is the owning node.
    pub fn property(&self) -> PropertyRef {
        match self {
            GraphAction::ExpandProperty { property, .. }
            | GraphAction::CollapseProperty { property, .. }
            | GraphAction::ExpandContent { property, .. }
            | GraphAction::CollapseContent { property, .. } => *property,
        }
    }

    pub fn is_expand(&self) -> bool {
        matches!(self, GraphAction::ExpandProperty { .. } | GraphAction::ExpandContent { .. })
    }
}

/// A laid-out snapshot of an object graph.
#[derive(Debug, Clone, Serialize)]
pub struct PositionedGraph {
    graph: GraphId,
    direction: LayoutDirection,
    bounds: Rect,
    nodes: Vec<PositionedNode>,
    #[serde(skip)]
    index: IndexMap<NodeIdentity, usize>,
}

impl PositionedGraph {
    pub(crate) fn new(
        graph: GraphId,
        direction: LayoutDirection,
        bounds: Rect,
        nodes: Vec<PositionedNode>,
    ) -> Self {
        let index = nodes
            .iter()
            .enumerate()
            .map(|(position, node)| (node.identity.clone(), position))
            .collect();
        Self {
            graph,
            direction,
            bounds,
            nodes,
            index,
        }
    }

    pub(crate) fn empty(graph: GraphId, direction: LayoutDirection) -> Self {
        Self::new(graph, direction, Rect::default(), Vec::new())
    }

    /// The object graph this snapshot was laid out from.
    pub fn graph(&self) -> GraphId {
        self.graph
    }

    pub fn direction(&self) -> LayoutDirection {
        self.direction
    }

    /// Bounding box of the whole drawing, anchored at the origin.
    pub fn bounds(&self) -> Rect {
        self.bounds
    }

    /// Nodes in layout (depth-first pre-order) order; the root comes first.
    pub fn nodes(&self) -> &[PositionedNode] {
        &self.nodes
    }

    pub fn node(&self, identity: &NodeIdentity) -> Option<&PositionedNode> {
        self.index.get(identity).map(|&position| &self.nodes[position])
    }

    pub fn node_by_id(&self, node: NodeId) -> Option<&PositionedNode> {
        self.nodes.iter().find(|candidate| candidate.node == node)
    }

    pub fn property(&self, property: PropertyRef) -> Option<&PositionedProperty> {
        self.node_by_id(property.node)?.properties.get(property.index)
    }

    /// Action toggling the given row, see [`PositionedProperty::toggle_action`].
    pub fn toggle_action(&self, property: PropertyRef) -> Option<GraphAction> {
        self.property(property)?.toggle_action(self.graph)
    }

    pub fn edge_count(&self) -> usize {
        self.nodes.iter().map(|node| node.edges().count()).sum()
    }

    pub fn property_count(&self) -> usize {
        self.nodes.iter().map(|node| node.properties.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}
