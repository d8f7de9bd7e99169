//! Object Graph
//!
//! This module implements the logical graph of evaluated objects and the
//! builder that populates it from a debuggee.
//!
//! # Overview
//!
//! - Nodes are evaluated objects, owned by the [`ObjectGraph`] arena and
//!   addressed by [`NodeId`].
//! - Properties are directed relations from a node to a possible target.
//!   A property with no target is displayed but not traversed.
//!
//! # Design Decisions
//!
//! 1. Nodes are deduplicated by [`NodeIdentity`], so two properties aliasing
//!    the same object point at one shared node, and cycles are plain edges.
//!
//! 2. Edges are stored as target ids on the property. Collapsing an edge is
//!    clearing that id; the rest of the graph is untouched.
//!
//! 3. Members and collection entries share one property type, told apart by
//!    [`PropertyKind`].

mod builder;
mod node;
mod object_graph;

pub use builder::{content_path, ObjectGraphBuilder};
pub use node::{
    GraphId, NodeId, NodeIdentity, NodeSeed, ObjectGraphNode, ObjectGraphProperty, PropertyKind,
    PropertyRef, PropertyValue,
};
pub use object_graph::{Edge, ObjectGraph};
