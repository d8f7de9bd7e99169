//! Error Types
//!
//! Failures are split by who is at fault:
//!
//! - [`EvaluationError`]: the debuggee could not evaluate an expression.
//!   Fatal for the root expression, recorded inline for a single property.
//! - [`VisualizerError`]: a precondition was violated by the caller.
//! - [`LayoutError`]: an internal invariant of the model or of a positioned
//!   graph does not hold. These indicate a defect and are always propagated.
//!
//! [`Error`] unifies the three for the view pipeline.

use serde::{Deserialize, Serialize};

use crate::graph::{GraphId, NodeId};

/// The debuggee failed to evaluate an expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct EvaluationError {
    /// The expression that was being evaluated.
    pub expression: String,
    /// Message reported by the debuggee.
    pub message: String,
}

impl EvaluationError {
    pub fn new(expression: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            expression: expression.into(),
            message: message.into(),
        }
    }
}

/// A precondition of the visualizer was violated.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VisualizerError {
    #[error("Cannot inspect when the process is running.")]
    ProcessRunning,

    #[error("No expression to inspect.")]
    EmptyExpression,

    /// Atomic values and null have no members to draw.
    #[error("'{expression}' is not an object (type {type_name})")]
    NotAnObject {
        expression: String,
        type_name: String,
    },

    #[error("action targets graph {action} but the current graph is {current}")]
    StaleAction { action: GraphId, current: GraphId },

    #[error("node {node} has no property at index {index}")]
    UnknownProperty { node: NodeId, index: usize },

    /// The graph already holds `max_nodes` nodes and the expression names a
    /// new object.
    #[error("the graph already holds the maximum of {max_nodes} nodes")]
    NodeLimit { max_nodes: usize },

    #[error("no graph has been built yet")]
    NoGraph,
}

/// An internal invariant of the layout pipeline does not hold.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LayoutError {
    #[error("node {0} is referenced but not present in the object graph")]
    UnknownNode(NodeId),

    #[error("node index {0} does not fit in a node id")]
    NodeIndexOverflow(usize),

    #[error("edge from '{owner}.{property}' targets '{target}', which has no geometry")]
    MissingGeometry {
        owner: String,
        property: String,
        target: String,
    },
}

/// Any failure of the build → layout → match pipeline.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error("Expression cannot be evaluated - {0}")]
    Evaluation(#[from] EvaluationError),

    #[error(transparent)]
    Visualizer(#[from] VisualizerError),

    #[error(transparent)]
    Layout(#[from] LayoutError),
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_evaluation_message_is_user_facing() {
        let err: Error = EvaluationError::new("foo.bar", "member 'bar' not found").into();
        assert_eq!(
            err.to_string(),
            "Expression cannot be evaluated - member 'bar' not found"
        );
    }

    #[test]
    fn process_running_message() {
        let err: Error = VisualizerError::ProcessRunning.into();
        assert_eq!(err.to_string(), "Cannot inspect when the process is running.");
    }
}
