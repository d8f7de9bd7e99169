//! Tree Layout
//!
//! Lays an object graph out as a tree grown from the root.
//!
//! # Algorithm
//!
//! 1. Depth-first pre-order walk from the root, following rows in property
//!    order. A node is placed under the first row that reaches it; later
//!    rows reaching the same node (aliases, back edges, `a.self`) are only
//!    routed to that placement.
//! 2. Measure each node: a header plus one fixed-height row per property,
//!    as wide as its longest text.
//! 3. Post-order: the extent of a subtree along the secondary axis is the
//!    larger of the node's own size and its children's extents plus spacing.
//! 4. Pre-order: children start one parent size plus the layer gap further
//!    along the primary axis and are packed side by side along the secondary
//!    axis; the parent is centered on them.
//! 5. Reversed directions mirror the primary axis, then edges are routed.
//!
//! Everything iterates in model order, so output is reproducible exactly.

use indexmap::IndexMap;
use smallvec::smallvec;

use super::direction::LayoutDirection;
use super::positioned::{
    Point, PositionedEdge, PositionedGraph, PositionedNode, PositionedProperty, Rect, Route,
};
use crate::config::LayoutConfig;
use crate::error::LayoutError;
use crate::expanded::Expanded;
use crate::graph::{NodeId, ObjectGraph, ObjectGraphNode, ObjectGraphProperty, PropertyRef};

/// Tree-style layout engine for one direction.
#[derive(Debug, Clone)]
pub struct TreeLayout {
    direction: LayoutDirection,
    config: LayoutConfig,
}

/// Size of a node split into primary/secondary axis components.
#[derive(Debug, Clone, Copy, Default)]
struct AxisSize {
    primary: f64,
    secondary: f64,
}

/// Placement of a node's box in axis space.
#[derive(Debug, Clone, Copy, Default)]
struct AxisPlacement {
    primary: f64,
    /// Start of the whole subtree's secondary interval.
    subtree_start: f64,
    /// Start of the node box itself.
    secondary: f64,
}

fn node_of(graph: &ObjectGraph, id: NodeId) -> Result<&ObjectGraphNode, LayoutError> {
    graph.node(id).ok_or(LayoutError::UnknownNode(id))
}

fn visible_target(property: &ObjectGraphProperty, expanded: &Expanded) -> Option<NodeId> {
    property.target().filter(|_| property.is_expanded_in(expanded))
}

impl TreeLayout {
    pub fn new(direction: LayoutDirection, config: LayoutConfig) -> Self {
        Self { direction, config }
    }

    pub fn direction(&self) -> LayoutDirection {
        self.direction
    }

    /// Lay out everything reachable from the root of `graph` through edges
    /// that `expanded` marks as expanded. The graph is not modified.
    pub fn calculate_layout(
        &self,
        graph: &ObjectGraph,
        expanded: &Expanded,
    ) -> Result<PositionedGraph, LayoutError> {
        tracing::debug!(direction = %self.direction, "calculating graph layout");
        let Some(root) = graph.root() else {
            return Ok(PositionedGraph::empty(graph.id(), self.direction));
        };

        let children = spanning_tree(graph, root, expanded)?;

        let mut sizes = vec![AxisSize::default(); graph.node_count()];
        for &id in children.keys() {
            sizes[id.index()] = self.measure(node_of(graph, id)?);
        }

        // Children follow their parent in pre-order, so reverse is post-order.
        let mut extents = vec![0.0f64; graph.node_count()];
        for (&id, kids) in children.iter().rev() {
            let span = self.children_span(kids, &extents);
            extents[id.index()] = sizes[id.index()].secondary.max(span);
        }

        let mut placements = vec![AxisPlacement::default(); graph.node_count()];
        placements[root.index()] = AxisPlacement {
            primary: 0.0,
            subtree_start: 0.0,
            secondary: (extents[root.index()] - sizes[root.index()].secondary) / 2.0,
        };
        for (&id, kids) in &children {
            let parent = placements[id.index()];
            let extent = extents[id.index()];
            let child_primary = parent.primary + sizes[id.index()].primary + self.config.layer_gap;
            let span = self.children_span(kids, &extents);
            let mut cursor = parent.subtree_start + (extent - span) / 2.0;
            for &kid in kids {
                placements[kid.index()] = AxisPlacement {
                    primary: child_primary,
                    subtree_start: cursor,
                    secondary: cursor + (extents[kid.index()] - sizes[kid.index()].secondary) / 2.0,
                };
                cursor += extents[kid.index()] + self.config.sibling_spacing;
            }
        }

        let primary_end = children
            .keys()
            .map(|id| placements[id.index()].primary + sizes[id.index()].primary)
            .fold(0.0, f64::max);
        let secondary_end = extents[root.index()];

        let mut rects: Vec<Option<Rect>> = vec![None; graph.node_count()];
        for &id in children.keys() {
            let placement = placements[id.index()];
            let size = sizes[id.index()];
            let primary = if self.direction.is_reversed() {
                primary_end - placement.primary - size.primary
            } else {
                placement.primary
            };
            rects[id.index()] = Some(self.to_screen(primary, placement.secondary, size));
        }

        let mut nodes = Vec::with_capacity(children.len());
        for &id in children.keys() {
            let node = node_of(graph, id)?;
            let bounds = rects[id.index()].ok_or(LayoutError::UnknownNode(id))?;
            nodes.push(self.position_node(node, bounds, &rects, graph, expanded)?);
        }

        let bounds = if self.direction.is_horizontal() {
            Rect::new(0.0, 0.0, primary_end, secondary_end)
        } else {
            Rect::new(0.0, 0.0, secondary_end, primary_end)
        };
        tracing::debug!(nodes = nodes.len(), "graph layout done");
        Ok(PositionedGraph::new(graph.id(), self.direction, bounds, nodes))
    }

    fn measure(&self, node: &ObjectGraphNode) -> AxisSize {
        let longest = node
            .properties()
            .iter()
            .map(|property| property.text().chars().count())
            .chain(std::iter::once(node.type_name().chars().count()))
            .max()
            .unwrap_or(0);
        let width = (longest as f64 * self.config.char_width + 2.0 * self.config.node_padding)
            .max(self.config.min_node_width);
        let rows = node.properties().len() as f64;
        let height = self.config.header_height + rows * self.config.row_height;
        if self.direction.is_horizontal() {
            AxisSize {
                primary: width,
                secondary: height,
            }
        } else {
            AxisSize {
                primary: height,
                secondary: width,
            }
        }
    }

    fn children_span(&self, kids: &[NodeId], extents: &[f64]) -> f64 {
        if kids.is_empty() {
            return 0.0;
        }
        let total: f64 = kids.iter().map(|kid| extents[kid.index()]).sum();
        total + self.config.sibling_spacing * (kids.len() - 1) as f64
    }

    fn to_screen(&self, primary: f64, secondary: f64, size: AxisSize) -> Rect {
        if self.direction.is_horizontal() {
            Rect::new(primary, secondary, size.primary, size.secondary)
        } else {
            Rect::new(secondary, primary, size.secondary, size.primary)
        }
    }

    fn position_node(
        &self,
        node: &ObjectGraphNode,
        bounds: Rect,
        rects: &[Option<Rect>],
        graph: &ObjectGraph,
        expanded: &Expanded,
    ) -> Result<PositionedNode, LayoutError> {
        let mut properties = Vec::with_capacity(node.properties().len());
        for (index, property) in node.properties().iter().enumerate() {
            let row = Rect::new(
                bounds.x,
                bounds.y + self.config.header_height + index as f64 * self.config.row_height,
                bounds.width,
                self.config.row_height,
            );
            let edge = match visible_target(property, expanded) {
                Some(target) => {
                    let target_node = graph.node(target).ok_or(LayoutError::UnknownNode(target))?;
                    let target_rect = rects
                        .get(target.index())
                        .copied()
                        .flatten()
                        .ok_or_else(|| LayoutError::MissingGeometry {
                            owner: node.expression().to_string(),
                            property: property.name().to_string(),
                            target: target_node.identity().to_string(),
                        })?;
                    Some(PositionedEdge {
                        target,
                        target_identity: target_node.identity().clone(),
                        route: self.route(row, target_rect),
                    })
                }
                None => None,
            };
            properties.push(PositionedProperty {
                property: PropertyRef { node: node.id(), index },
                name: property.name().to_string(),
                expression: property.expression().to_string(),
                kind: property.kind().clone(),
                text: property.text(),
                bounds: row,
                is_expanded: property.is_expanded_in(expanded),
                is_expandable: property.is_expandable(),
                edge,
            });
        }
        Ok(PositionedNode {
            node: node.id(),
            identity: node.identity().clone(),
            expression: node.expression().to_string(),
            type_name: node.type_name().to_string(),
            is_content: node.is_content(),
            bounds,
            properties,
        })
    }

    /// Orthogonal route from a row to the side of the target facing back
    /// towards the root.
    fn route(&self, row: Rect, target: Rect) -> Route {
        let stub = self.config.edge_stub;
        let row_mid = row.y + row.height / 2.0;
        let center = target.center();
        match self.direction {
            LayoutDirection::LeftRight => {
                let start = Point::new(row.right(), row_mid);
                let end = Point::new(target.x, center.y);
                let bend = start.x + stub;
                smallvec![start, Point::new(bend, start.y), Point::new(bend, end.y), end]
            }
            LayoutDirection::RightLeft => {
                let start = Point::new(row.x, row_mid);
                let end = Point::new(target.right(), center.y);
                let bend = start.x - stub;
                smallvec![start, Point::new(bend, start.y), Point::new(bend, end.y), end]
            }
            LayoutDirection::TopBottom | LayoutDirection::BottomTop => {
                let start = Point::new(row.right(), row_mid);
                let bend = start.x + stub;
                let (end, lane) = if self.direction == LayoutDirection::TopBottom {
                    (Point::new(center.x, target.y), target.y - self.config.layer_gap / 2.0)
                } else {
                    let bottom = target.bottom();
                    (Point::new(center.x, bottom), bottom + self.config.layer_gap / 2.0)
                };
                smallvec![
                    start,
                    Point::new(bend, start.y),
                    Point::new(bend, lane),
                    Point::new(end.x, lane),
                    end
                ]
            }
        }
    }
}

/// First-visit spanning tree in depth-first pre-order.
///
/// Keys are in pre-order; values are the children placed under each node.
fn spanning_tree(
    graph: &ObjectGraph,
    root: NodeId,
    expanded: &Expanded,
) -> Result<IndexMap<NodeId, Vec<NodeId>>, LayoutError> {
    graph.node(root).ok_or(LayoutError::UnknownNode(root))?;
    let mut children: IndexMap<NodeId, Vec<NodeId>> = IndexMap::new();
    children.insert(root, Vec::new());
    let mut stack = vec![(root, 0usize)];

    while let Some(&(node, start)) = stack.last() {
        let properties = graph.node(node).ok_or(LayoutError::UnknownNode(node))?.properties();
        let next = properties
            .iter()
            .enumerate()
            .skip(start)
            .find_map(|(index, property)| {
                visible_target(property, expanded).map(|target| (index, target))
            });

        let Some((index, target)) = next else {
            stack.pop();
            continue;
        };
        if let Some(top) = stack.last_mut() {
            top.1 = index + 1;
        }
        if children.contains_key(&target) {
            continue;
        }
        graph.node(target).ok_or(LayoutError::UnknownNode(target))?;
        children.insert(target, Vec::new());
        if let Some(siblings) = children.get_mut(&node) {
            siblings.push(target);
        }
        stack.push((target, 0));
    }
    Ok(children)
}
