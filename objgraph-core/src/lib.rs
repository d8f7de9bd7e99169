//! Objgraph Core
//!
//! This crate provides the engine behind a debugger's object graph
//! visualizer. It implements:
//!
//! - Graph construction from a paused debuggee, driven by expansion state
//! - Incremental expansion of single properties without a rebuild
//! - A deterministic tree layout in four directions
//! - Graph matching between successive layouts, for animation
//!
//! Rendering, input handling and the live debugger connection are left to
//! the host; the debugger is reached only through the
//! [`Debuggee`](debuggee::Debuggee) trait.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `graph`: Object graph model and builder
//! - `expanded`: Expansion state that outlives individual builds
//! - `layout`: Tree layout and positioned graphs
//! - `matcher`: Diffing of positioned graphs
//! - `view`: The per-view build → layout → match pipeline
//! - `debuggee`: Debugger interface and an in-memory heap debuggee
//!
//! # Example
//!
//! ```rust,ignore
//! use objgraph_core::config::VisualizerConfig;
//! use objgraph_core::view::ObjectGraphView;
//!
//! let mut view = ObjectGraphView::new(debuggee, VisualizerConfig::default());
//!
//! // Build, lay out and diff against nothing: everything is created.
//! let transition = view.refresh("order")?;
//!
//! // The user clicks a row; the view resolves just that edge.
//! let graph = view.current().unwrap();
//! let row = &graph.nodes()[0].properties[1];
//! if let Some(action) = row.toggle_action(graph.graph()) {
//!     let transition = view.apply(&action)?;
//!     // transition.diff drives the animation from transition.previous
//! }
//! ```

pub mod config;
pub mod debuggee;
pub mod error;
pub mod expanded;
pub mod graph;
pub mod layout;
pub mod matcher;
pub mod view;

pub use error::{Error, EvaluationError, LayoutError, Result, VisualizerError};
