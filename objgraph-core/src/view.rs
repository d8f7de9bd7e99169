//! Object Graph View
//!
//! Owns the build → layout → match pipeline for one visualizer view.
//!
//! # State
//!
//! A view starts [`ViewState::Empty`]. The first successful
//! [`refresh`](ObjectGraphView::refresh) moves it to
//! [`ViewState::HasGraph`], where it stays: every later refresh, applied
//! [`GraphAction`], or direction change re-runs layout and matching against
//! the previous snapshot.
//!
//! A failed run leaves the displayed graph exactly as it was.
//!
//! # Expansion State
//!
//! The view reads expansion state through a [`SharedExpanded`] handle, so
//! several views of one debugger session can share it. Actions update it
//! only after the model change they describe succeeded.

use crate::config::{LayoutConfig, VisualizerConfig};
use crate::debuggee::Debuggee;
use crate::error::{Result, VisualizerError};
use crate::expanded::{Expanded, SharedExpanded};
use crate::graph::{ObjectGraph, ObjectGraphBuilder};
use crate::layout::{GraphAction, LayoutDirection, PositionedGraph, TreeLayout};
use crate::matcher::{GraphDiff, GraphMatcher};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ViewState {
    Empty,
    HasGraph,
}

/// What the renderer needs to animate one pipeline run: the snapshot being
/// replaced and its diff against the new one (available from
/// [`ObjectGraphView::current`]).
#[derive(Debug, Clone)]
pub struct Transition {
    pub previous: Option<PositionedGraph>,
    pub diff: GraphDiff,
}

#[derive(Debug)]
pub struct ObjectGraphView<D> {
    builder: ObjectGraphBuilder<D>,
    layout: LayoutConfig,
    direction: LayoutDirection,
    expanded: SharedExpanded,
    expression: Option<String>,
    graph: Option<ObjectGraph>,
    current: Option<PositionedGraph>,
}

impl<D: Debuggee> ObjectGraphView<D> {
    /// Create a view with its own, initially empty, expansion state.
    pub fn new(debuggee: D, config: VisualizerConfig) -> Self {
        Self::with_expanded(debuggee, config, Expanded::new().shared())
    }

    pub fn with_expanded(
        debuggee: D,
        config: VisualizerConfig,
        expanded: SharedExpanded,
    ) -> Self {
        Self {
            builder: ObjectGraphBuilder::new(debuggee, config.builder),
            layout: config.layout,
            direction: LayoutDirection::default(),
            expanded,
            expression: None,
            graph: None,
            current: None,
        }
    }

    pub fn state(&self) -> ViewState {
        if self.current.is_some() {
            ViewState::HasGraph
        } else {
            ViewState::Empty
        }
    }

    pub fn expanded(&self) -> &SharedExpanded {
        &self.expanded
    }

    pub fn direction(&self) -> LayoutDirection {
        self.direction
    }

    /// Root expression of the displayed graph.
    pub fn expression(&self) -> Option<&str> {
        self.expression.as_deref()
    }

    pub fn graph(&self) -> Option<&ObjectGraph> {
        self.graph.as_ref()
    }

    /// The snapshot currently on screen.
    pub fn current(&self) -> Option<&PositionedGraph> {
        self.current.as_ref()
    }

    pub fn debuggee(&self) -> &D {
        self.builder.debuggee()
    }

    /// Rebuild the graph for `expression` and lay it out.
    pub fn refresh(&mut self, expression: &str) -> Result<Transition> {
        let graph = {
            let expanded = self.expanded.read();
            self.builder.build_graph_for_expression(expression, &expanded)?
        };
        let (positioned, diff) = self.present(&graph, self.direction)?;

        self.expression = Some(expression.trim().to_string());
        self.graph = Some(graph);
        Ok(self.commit(positioned, diff))
    }

    /// Rebuild the displayed expression, e.g. after the debuggee stopped at
    /// a new location.
    pub fn rebuild(&mut self) -> Result<Transition> {
        let expression = self.expression.clone().ok_or(VisualizerError::NoGraph)?;
        self.refresh(&expression)
    }

    /// Fold a user action into the model and the expansion state, then lay
    /// out again. Expanding resolves the one property, plus whatever the
    /// expansion state already expands below a newly created node.
    pub fn apply(&mut self, action: &GraphAction) -> Result<Transition> {
        let graph = self.graph.as_mut().ok_or(VisualizerError::NoGraph)?;
        if action.graph() != graph.id() {
            return Err(VisualizerError::StaleAction {
                action: action.graph(),
                current: graph.id(),
            }
            .into());
        }

        let property = action.property();
        tracing::debug!(?action, "applying graph action");
        match action {
            GraphAction::ExpandProperty { expression, .. } => {
                {
                    let expanded = self.expanded.read();
                    self.builder.expand_property(graph, property, &expanded)?;
                }
                self.expanded.write().set_property_expanded(expression.clone());
            }
            GraphAction::CollapseProperty { expression, .. } => {
                graph.set_target(property, None)?;
                self.expanded.write().set_property_collapsed(expression);
            }
            GraphAction::ExpandContent { path, .. } => {
                {
                    let expanded = self.expanded.read();
                    self.builder.expand_property(graph, property, &expanded)?;
                }
                self.expanded.write().set_content_expanded(path.clone());
            }
            GraphAction::CollapseContent { path, .. } => {
                graph.set_target(property, None)?;
                self.expanded.write().set_content_collapsed(path);
            }
        }
        self.relayout()
    }

    /// Change the layout direction. Lays out the existing model again
    /// without rebuilding it; `None` while the view is empty.
    ///
    /// On failure the previous direction stays in effect.
    pub fn set_direction(&mut self, direction: LayoutDirection) -> Result<Option<Transition>> {
        let Some(graph) = self.graph.as_ref() else {
            self.direction = direction;
            return Ok(None);
        };
        let (positioned, diff) = self.present(graph, direction)?;
        self.direction = direction;
        Ok(Some(self.commit(positioned, diff)))
    }

    /// Forget the displayed graph. Expansion state is kept.
    pub fn clear(&mut self) {
        self.expression = None;
        self.graph = None;
        self.current = None;
    }

    fn relayout(&mut self) -> Result<Transition> {
        let graph = self.graph.as_ref().ok_or(VisualizerError::NoGraph)?;
        let (positioned, diff) = self.present(graph, self.direction)?;
        Ok(self.commit(positioned, diff))
    }

    fn present(
        &self,
        graph: &ObjectGraph,
        direction: LayoutDirection,
    ) -> Result<(PositionedGraph, GraphDiff)> {
        let positioned = {
            let expanded = self.expanded.read();
            TreeLayout::new(direction, self.layout.clone()).calculate_layout(graph, &expanded)?
        };
        let diff = GraphMatcher::new().match_graphs(self.current.as_ref(), &positioned)?;
        Ok((positioned, diff))
    }

    fn commit(&mut self, positioned: PositionedGraph, diff: GraphDiff) -> Transition {
        let previous = self.current.replace(positioned);
        Transition { previous, diff }
    }
}
