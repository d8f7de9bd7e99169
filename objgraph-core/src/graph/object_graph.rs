//! Object Graph
//!
//! The arena that owns every node of one build.
//!
//! Nodes are addressed by [`NodeId`]; an identity index guarantees that each
//! [`NodeIdentity`] maps to exactly one node, so aliasing and cycles are
//! ordinary edges between existing nodes rather than duplicated subtrees.

use std::collections::VecDeque;

use indexmap::IndexMap;

use super::node::{
    GraphId, NodeId, NodeIdentity, NodeSeed, ObjectGraphNode, ObjectGraphProperty, PropertyRef,
    PropertyValue,
};
use crate::error::{Error, LayoutError, VisualizerError};

/// A resolved property edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Edge {
    pub from: PropertyRef,
    pub target: NodeId,
    /// The edge leaves a content entry rather than a member.
    pub content: bool,
}

/// The logical object graph of one build.
#[derive(Debug, Clone)]
pub struct ObjectGraph {
    id: GraphId,
    root: Option<NodeId>,
    nodes: Vec<ObjectGraphNode>,
    by_identity: IndexMap<NodeIdentity, NodeId>,
}

impl ObjectGraph {
    /// Create a new empty graph.
    pub fn new() -> Self {
        Self {
            id: GraphId::new(),
            root: None,
            nodes: Vec::new(),
            by_identity: IndexMap::new(),
        }
    }

    pub fn id(&self) -> GraphId {
        self.id
    }

    pub fn root(&self) -> Option<NodeId> {
        self.root
    }

    pub fn set_root(&mut self, root: NodeId) -> Result<(), LayoutError> {
        if root.index() >= self.nodes.len() {
            return Err(LayoutError::UnknownNode(root));
        }
        self.root = Some(root);
        Ok(())
    }

    /// Look up the node for an identity, creating it from `seed` if absent.
    ///
    /// Returns the node id and whether it was newly created. `seed` is only
    /// called on creation.
    pub fn get_or_insert_with<F>(
        &mut self,
        identity: NodeIdentity,
        seed: F,
    ) -> Result<(NodeId, bool), LayoutError>
    where
        F: FnOnce() -> NodeSeed,
    {
        if let Some(&id) = self.by_identity.get(&identity) {
            return Ok((id, false));
        }
        let id = NodeId::from_index(self.nodes.len())?;
        self.nodes.push(ObjectGraphNode::from_seed(id, identity.clone(), seed()));
        self.by_identity.insert(identity, id);
        Ok((id, true))
    }

    pub fn find(&self, identity: &NodeIdentity) -> Option<NodeId> {
        self.by_identity.get(identity).copied()
    }

    pub fn node(&self, id: NodeId) -> Option<&ObjectGraphNode> {
        self.nodes.get(id.index())
    }

    pub fn property(&self, property: PropertyRef) -> Option<&ObjectGraphProperty> {
        self.node(property.node)?.properties().get(property.index)
    }

    fn property_mut(
        &mut self,
        property: PropertyRef,
    ) -> Result<&mut ObjectGraphProperty, VisualizerError> {
        self.nodes
            .get_mut(property.node.index())
            .and_then(|node| node.properties_mut().get_mut(property.index))
            .ok_or(VisualizerError::UnknownProperty {
                node: property.node,
                index: property.index,
            })
    }

    /// Point a property at a node, or collapse it with `None`.
    ///
    /// Returns the previous target.
    pub fn set_target(
        &mut self,
        property: PropertyRef,
        target: Option<NodeId>,
    ) -> Result<Option<NodeId>, Error> {
        if let Some(target) = target {
            if target.index() >= self.nodes.len() {
                return Err(LayoutError::UnknownNode(target).into());
            }
        }
        Ok(self.property_mut(property)?.set_target(target))
    }

    pub(crate) fn set_property_value(
        &mut self,
        property: PropertyRef,
        value: PropertyValue,
    ) -> Result<(), VisualizerError> {
        self.property_mut(property)?.set_value(value);
        Ok(())
    }

    /// All nodes in creation order, including ones no longer reachable
    /// after a collapse.
    pub fn nodes(&self) -> impl Iterator<Item = &ObjectGraphNode> {
        self.nodes.iter()
    }

    /// All resolved edges, in node creation then property order.
    pub fn edges(&self) -> impl Iterator<Item = Edge> + '_ {
        self.nodes.iter().flat_map(|node| {
            node.properties()
                .iter()
                .enumerate()
                .filter_map(move |(index, property)| {
                    property.target().map(|target| Edge {
                        from: PropertyRef { node: node.id(), index },
                        target,
                        content: property.is_content(),
                    })
                })
        })
    }

    /// Number of resolved edges on the shortest path from the root to
    /// `node`, or `None` when it is not reachable.
    pub fn depth(&self, node: NodeId) -> Option<usize> {
        let root = self.root?;
        let mut depths = vec![None; self.nodes.len()];
        *depths.get_mut(root.index())? = Some(0);
        let mut queue = VecDeque::from([(root, 0usize)]);

        while let Some((current, depth)) = queue.pop_front() {
            if current == node {
                return Some(depth);
            }
            let targets = self.node(current)?.properties().iter().filter_map(|p| p.target());
            for target in targets {
                match depths.get_mut(target.index()) {
                    Some(slot) if slot.is_none() => {
                        *slot = Some(depth + 1);
                        queue.push_back((target, depth + 1));
                    }
                    _ => {}
                }
            }
        }
        None
    }

    /// Get the total number of nodes in the graph.
    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }
}

impl Default for ObjectGraph {
    fn default() -> Self {
        Self::new()
    }
}
