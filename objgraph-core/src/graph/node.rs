//! Graph Nodes
//!
//! This module defines the node and property types that live in an
//! [`ObjectGraph`](super::ObjectGraph).

use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::debuggee::ObjectHandle;
use crate::error::{EvaluationError, LayoutError};
use crate::expanded::Expanded;

/// Unique identifier of one object graph instance.
///
/// Every build produces a new id, so anything derived from an older build
/// can be told apart from the current one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GraphId(u64);

impl GraphId {
    /// Generate a new unique graph ID.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }

    /// Get the raw ID value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl Default for GraphId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GraphId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "g{}", self.0)
    }
}

/// Index of a node within its object graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(u32);

impl NodeId {
    pub(crate) fn from_index(index: usize) -> Result<Self, LayoutError> {
        u32::try_from(index)
            .map(Self)
            .map_err(|_| LayoutError::NodeIndexOverflow(index))
    }

    /// Get the arena index.
    pub fn index(&self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for NodeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// What makes two evaluated objects "the same node".
///
/// Prefer the debugger's object handle; fall back to the expression text for
/// debuggees that cannot report one. Identities are stable across builds,
/// which is what lets the matcher correlate successive layouts.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeIdentity {
    Handle(ObjectHandle),
    Expression(String),
}

impl std::fmt::Display for NodeIdentity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            NodeIdentity::Handle(handle) => write!(f, "{handle}"),
            NodeIdentity::Expression(expression) => f.write_str(expression),
        }
    }
}

/// The kind of relation a property models.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PropertyKind {
    /// A named field or property; expansion is keyed by expression.
    Member,

    /// A positional element of a collection; expansion is keyed by `path`.
    ContentEntry { index: usize, path: String },
}

/// The evaluated value shown on a property row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PropertyValue {
    Atomic(String),
    Null,
    Object {
        type_name: String,
        handle: Option<ObjectHandle>,
    },
    /// The debuggee failed to evaluate this property. Shown as an error
    /// marker; the rest of the graph is unaffected.
    Error(EvaluationError),
}

impl PropertyValue {
    pub fn handle(&self) -> Option<ObjectHandle> {
        match self {
            PropertyValue::Object { handle, .. } => *handle,
            _ => None,
        }
    }
}

/// Address of a property: owning node plus position in its property list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PropertyRef {
    pub node: NodeId,
    pub index: usize,
}

/// A relation from an owning node to a possible target node.
#[derive(Debug, Clone)]
pub struct ObjectGraphProperty {
    name: String,
    expression: String,
    kind: PropertyKind,
    value: PropertyValue,
    /// `None` until the builder resolves the expression; set back to `None`
    /// to collapse the edge.
    target: Option<NodeId>,
}

impl ObjectGraphProperty {
    pub fn member(
        name: impl Into<String>,
        expression: impl Into<String>,
        value: PropertyValue,
    ) -> Self {
        Self {
            name: name.into(),
            expression: expression.into(),
            kind: PropertyKind::Member,
            value,
            target: None,
        }
    }

    pub fn content_entry(
        index: usize,
        expression: impl Into<String>,
        path: impl Into<String>,
        value: PropertyValue,
    ) -> Self {
        Self {
            name: format!("[{index}]"),
            expression: expression.into(),
            kind: PropertyKind::ContentEntry {
                index,
                path: path.into(),
            },
            value,
            target: None,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn kind(&self) -> &PropertyKind {
        &self.kind
    }

    pub fn value(&self) -> &PropertyValue {
        &self.value
    }

    pub fn target(&self) -> Option<NodeId> {
        self.target
    }

    pub fn is_content(&self) -> bool {
        matches!(self.kind, PropertyKind::ContentEntry { .. })
    }

    /// Only object-valued properties can lead to another node.
    pub fn is_expandable(&self) -> bool {
        matches!(self.value, PropertyValue::Object { .. })
    }

    /// The key under which the expansion store remembers this property.
    pub fn expansion_key(&self) -> &str {
        match &self.kind {
            PropertyKind::Member => &self.expression,
            PropertyKind::ContentEntry { path, .. } => path,
        }
    }

    pub fn is_expanded_in(&self, expanded: &Expanded) -> bool {
        match &self.kind {
            PropertyKind::Member => expanded.is_property_expanded(&self.expression),
            PropertyKind::ContentEntry { path, .. } => expanded.is_content_expanded(path),
        }
    }

    /// Row text: `name = value`.
    pub fn text(&self) -> String {
        match &self.value {
            PropertyValue::Atomic(text) => format!("{} = {}", self.name, text),
            PropertyValue::Null => format!("{} = null", self.name),
            PropertyValue::Object { type_name, .. } => format!("{} = {{{}}}", self.name, type_name),
            PropertyValue::Error(err) => format!("{} = <error: {}>", self.name, err.message),
        }
    }

    pub(crate) fn set_target(&mut self, target: Option<NodeId>) -> Option<NodeId> {
        std::mem::replace(&mut self.target, target)
    }

    pub(crate) fn set_value(&mut self, value: PropertyValue) {
        self.value = value;
    }
}

/// Everything needed to create a node; the graph assigns id and identity.
#[derive(Debug, Clone)]
pub struct NodeSeed {
    pub expression: String,
    pub type_name: String,
    pub is_content: bool,
    pub properties: Vec<ObjectGraphProperty>,
}

/// One evaluated object reachable from the root.
#[derive(Debug, Clone)]
pub struct ObjectGraphNode {
    id: NodeId,
    identity: NodeIdentity,
    /// Expression the node was first reached by.
    expression: String,
    type_name: String,
    /// Reached through a content entry rather than a named member.
    is_content: bool,
    properties: Vec<ObjectGraphProperty>,
}

impl ObjectGraphNode {
    pub(crate) fn from_seed(id: NodeId, identity: NodeIdentity, seed: NodeSeed) -> Self {
        Self {
            id,
            identity,
            expression: seed.expression,
            type_name: seed.type_name,
            is_content: seed.is_content,
            properties: seed.properties,
        }
    }

    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn identity(&self) -> &NodeIdentity {
        &self.identity
    }

    pub fn expression(&self) -> &str {
        &self.expression
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn is_content(&self) -> bool {
        self.is_content
    }

    pub fn properties(&self) -> &[ObjectGraphProperty] {
        &self.properties
    }

    pub(crate) fn properties_mut(&mut self) -> &mut [ObjectGraphProperty] {
        &mut self.properties
    }
}
