//! Graph Builder
//!
//! Turns a root expression into an [`ObjectGraph`] by evaluating expressions
//! against the debuggee.
//!
//! # Algorithm
//!
//! 1. Evaluate the root and create its node. Every node is created with all
//!    of its properties evaluated once, so rows can show values and the
//!    builder knows which ones refer to objects.
//! 2. Walk breadth-first from the root. For each object-valued property that
//!    the expansion store marks expanded, resolve its target:
//!    - if the target's identity is already in the graph, link to it
//!      (this is what terminates cycles such as `a.self == a`)
//!    - otherwise evaluate it, create the node, and queue it
//! 3. Properties that fail to evaluate keep an inline error value; the walk
//!    carries on.
//!
//! [`ObjectGraphBuilder::expand_property`] is the incremental counterpart
//! used when the user expands a single property. It runs the same walk, but
//! starts from the one node the expansion created, so the result matches a
//! full rebuild without re-evaluating anything already in the graph.

use std::collections::VecDeque;

use super::node::{
    NodeId, NodeIdentity, NodeSeed, ObjectGraphProperty, PropertyRef, PropertyValue,
};
use super::object_graph::ObjectGraph;
use crate::config::BuilderConfig;
use crate::debuggee::{Debuggee, ObjectHandle, ObjectValue, Value, ValueKind};
use crate::error::{Error, EvaluationError, LayoutError, Result, VisualizerError};
use crate::expanded::Expanded;

/// Builds and extends object graphs from a debuggee.
#[derive(Debug)]
pub struct ObjectGraphBuilder<D> {
    debuggee: D,
    config: BuilderConfig,
}

/// Outcome of resolving one property's target.
enum Resolved {
    Node { id: NodeId, created: bool },
    /// The node bound was reached and the identity is new.
    Skipped,
}

/// Outcome of inserting an evaluated value into the graph.
enum Inserted {
    Node { id: NodeId, created: bool },
    NotAnObject(Value),
}

/// Nodes still to walk, with their depth below the root.
type Worklist = VecDeque<(NodeId, usize)>;

impl<D: Debuggee> ObjectGraphBuilder<D> {
    pub fn new(debuggee: D, config: BuilderConfig) -> Self {
        Self { debuggee, config }
    }

    pub fn debuggee(&self) -> &D {
        &self.debuggee
    }

    pub fn config(&self) -> &BuilderConfig {
        &self.config
    }

    fn ensure_stopped(&self) -> Result<(), VisualizerError> {
        if self.debuggee.is_process_running() {
            return Err(VisualizerError::ProcessRunning);
        }
        Ok(())
    }

    /// Build the graph for `expression`, eagerly resolving every property
    /// that `expanded` marks as expanded.
    pub fn build_graph_for_expression(
        &self,
        expression: &str,
        expanded: &Expanded,
    ) -> Result<ObjectGraph> {
        let expression = expression.trim();
        if expression.is_empty() {
            return Err(VisualizerError::EmptyExpression.into());
        }
        self.ensure_stopped()?;
        tracing::debug!(expression, "building graph for expression");

        let mut graph = ObjectGraph::new();
        let value = self.debuggee.evaluate(expression)?;
        let root = match self.insert_value(&mut graph, expression, value, false)? {
            Inserted::Node { id, .. } => id,
            Inserted::NotAnObject(value) => return Err(not_an_object(expression, value)),
        };
        graph.set_root(root)?;
        self.walk(&mut graph, Worklist::from([(root, 0)]), expanded)?;

        tracing::debug!(
            nodes = graph.node_count(),
            edges = graph.edges().count(),
            "graph built"
        );
        Ok(graph)
    }

    /// Resolve a single expression into `graph`, reusing the node when its
    /// identity is already present. Does not walk the new node's properties.
    pub fn obtain_node_for_expression(
        &self,
        graph: &mut ObjectGraph,
        expression: &str,
    ) -> Result<NodeId> {
        let (id, _) = self.obtain(graph, expression.trim(), false)?;
        Ok(id)
    }

    /// Expand one property of an existing graph: resolve its target and link
    /// the edge. When the target is new, its own properties that `expanded`
    /// marks as expanded are resolved as a build would.
    ///
    /// The expansion store itself is the caller's business.
    pub fn expand_property(
        &self,
        graph: &mut ObjectGraph,
        property_ref: PropertyRef,
        expanded: &Expanded,
    ) -> Result<NodeId> {
        let property = graph.property(property_ref).ok_or(VisualizerError::UnknownProperty {
            node: property_ref.node,
            index: property_ref.index,
        })?;
        let expression = property.expression().to_string();
        let is_content = property.is_content();

        let (target, created) = self.obtain(graph, &expression, is_content)?;
        graph.set_target(property_ref, Some(target))?;
        if created {
            let depth = graph.depth(property_ref.node).map_or(1, |depth| depth + 1);
            self.walk(graph, Worklist::from([(target, depth)]), expanded)?;
        }
        Ok(target)
    }

    /// Breadth-first resolution of expanded properties, starting from
    /// `queue`. Known identities are linked, never walked again.
    fn walk(
        &self,
        graph: &mut ObjectGraph,
        mut queue: Worklist,
        expanded: &Expanded,
    ) -> Result<()> {
        while let Some((node, depth)) = queue.pop_front() {
            let count = graph.node(node).map_or(0, |n| n.properties().len());
            for index in 0..count {
                let property_ref = PropertyRef { node, index };
                let Some(property) = graph.property(property_ref) else {
                    continue;
                };
                if !property.is_expandable() || !property.is_expanded_in(expanded) {
                    continue;
                }
                if depth >= self.config.max_depth {
                    tracing::warn!(
                        expression = property.expression(),
                        max_depth = self.config.max_depth,
                        "expanded property left unresolved: depth bound reached"
                    );
                    continue;
                }

                let property_expression = property.expression().to_string();
                let handle = property.value().handle();
                let is_content = property.is_content();

                match self.resolve(graph, &property_expression, handle, is_content) {
                    Ok(Resolved::Node { id, created }) => {
                        graph.set_target(property_ref, Some(id))?;
                        if created {
                            queue.push_back((id, depth + 1));
                        }
                    }
                    Ok(Resolved::Skipped) => {
                        tracing::warn!(
                            expression = %property_expression,
                            max_nodes = self.config.max_nodes,
                            "expanded property left unresolved: node bound reached"
                        );
                    }
                    Err(Error::Evaluation(err)) => {
                        tracing::warn!(
                            expression = %property_expression,
                            error = %err,
                            "property evaluation failed"
                        );
                        graph.set_property_value(property_ref, PropertyValue::Error(err))?;
                    }
                    Err(err) => return Err(err),
                }
            }
        }
        Ok(())
    }

    fn obtain(
        &self,
        graph: &mut ObjectGraph,
        expression: &str,
        is_content: bool,
    ) -> Result<(NodeId, bool)> {
        self.ensure_stopped()?;
        let value = self.debuggee.evaluate(expression)?;
        let is_new = identity_of(expression, &value)
            .is_some_and(|identity| graph.find(&identity).is_none());
        if is_new && graph.node_count() >= self.config.max_nodes {
            return Err(VisualizerError::NodeLimit {
                max_nodes: self.config.max_nodes,
            }
            .into());
        }

        match self.insert_value(graph, expression, value, is_content)? {
            Inserted::Node { id, created } => Ok((id, created)),
            Inserted::NotAnObject(value) => Err(not_an_object(expression, value)),
        }
    }

    fn resolve(
        &self,
        graph: &mut ObjectGraph,
        expression: &str,
        handle: Option<ObjectHandle>,
        is_content: bool,
    ) -> Result<Resolved> {
        if let Some(id) = handle.and_then(|handle| graph.find(&NodeIdentity::Handle(handle))) {
            return Ok(Resolved::Node { id, created: false });
        }

        let value = self.debuggee.evaluate(expression)?;
        let identity = identity_of(expression, &value);
        if let Some(id) = identity.as_ref().and_then(|identity| graph.find(identity)) {
            return Ok(Resolved::Node { id, created: false });
        }
        if graph.node_count() >= self.config.max_nodes {
            return Ok(Resolved::Skipped);
        }

        match self.insert_value(graph, expression, value, is_content)? {
            Inserted::Node { id, created } => Ok(Resolved::Node { id, created }),
            Inserted::NotAnObject(value) => Err(EvaluationError::new(
                expression,
                format!("value of type {} is no longer an object", value.type_name),
            )
            .into()),
        }
    }

    /// Create (or find) the node for an object value. Non-object values are
    /// handed back unchanged.
    fn insert_value(
        &self,
        graph: &mut ObjectGraph,
        expression: &str,
        value: Value,
        is_content: bool,
    ) -> Result<Inserted, LayoutError> {
        let Some(identity) = identity_of(expression, &value) else {
            return Ok(Inserted::NotAnObject(value));
        };
        let (type_name, object) = match value {
            Value {
                type_name,
                kind: ValueKind::Object(object),
            } => (type_name, object),
            other => return Ok(Inserted::NotAnObject(other)),
        };
        let (id, created) = graph.get_or_insert_with(identity, || NodeSeed {
            expression: expression.to_string(),
            type_name,
            is_content,
            properties: self.read_properties(expression, &object),
        })?;
        Ok(Inserted::Node { id, created })
    }

    fn read_properties(&self, expression: &str, object: &ObjectValue) -> Vec<ObjectGraphProperty> {
        let element_count = object.element_count.unwrap_or(0);
        let mut properties = Vec::with_capacity(object.members.len() + element_count);
        for member in &object.members {
            let member_expression = format!("{expression}.{member}");
            let value = self.read_value(&member_expression);
            properties.push(ObjectGraphProperty::member(member.clone(), member_expression, value));
        }
        for index in 0..element_count {
            let entry_expression = format!("{expression}[{index}]");
            let value = self.read_value(&entry_expression);
            properties.push(ObjectGraphProperty::content_entry(
                index,
                entry_expression,
                content_path(expression, index),
                value,
            ));
        }
        properties
    }

    fn read_value(&self, expression: &str) -> PropertyValue {
        match self.debuggee.evaluate(expression) {
            Ok(Value { kind: ValueKind::Null, .. }) => PropertyValue::Null,
            Ok(Value { kind: ValueKind::Atomic(text), .. }) => PropertyValue::Atomic(text),
            Ok(Value { type_name, kind: ValueKind::Object(object) }) => PropertyValue::Object {
                type_name,
                handle: object.handle,
            },
            Err(err) => {
                tracing::debug!(expression, error = %err, "property evaluation failed");
                PropertyValue::Error(err)
            }
        }
    }
}

/// Content path of the `index`-th entry of the object reached by `owner`.
pub fn content_path(owner: &str, index: usize) -> String {
    format!("{owner}/[{index}]")
}

fn identity_of(expression: &str, value: &Value) -> Option<NodeIdentity> {
    let object = value.as_object()?;
    Some(match object.handle {
        Some(handle) => NodeIdentity::Handle(handle),
        None => NodeIdentity::Expression(expression.to_string()),
    })
}

fn not_an_object(expression: &str, value: Value) -> Error {
    VisualizerError::NotAnObject {
        expression: expression.to_string(),
        type_name: value.type_name,
    }
    .into()
}
