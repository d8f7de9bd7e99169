//! Layout Engine
//!
//! Assigns non-overlapping geometry to the visible part of an object graph
//! and routes its edges.
//!
//! # Overview
//!
//! [`TreeLayout`] treats the graph as a tree rooted at the build's root node
//! and grows it along a configurable [`LayoutDirection`]. Nodes shared by
//! several rows are placed once, under the first row that reaches them, and
//! the other rows are routed to that placement.
//!
//! The result is a [`PositionedGraph`]: an immutable snapshot that the
//! [matcher](crate::matcher) compares against its predecessor.

mod direction;
mod positioned;
mod tree;

pub use direction::LayoutDirection;
pub use positioned::{
    GraphAction, Point, PositionedEdge, PositionedGraph, PositionedNode, PositionedProperty, Rect,
    Route,
};
pub use tree::TreeLayout;
