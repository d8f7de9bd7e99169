//! Debuggee Interface
//!
//! The visualizer never talks to a live process directly. Everything it needs
//! from the debugger session goes through the [`Debuggee`] trait: evaluating
//! an expression to a [`Value`], and asking whether the process is running.
//!
//! [`HeapDebuggee`] is an in-memory implementation over a captured heap
//! snapshot.

mod heap;

use serde::{Deserialize, Serialize};

use crate::error::EvaluationError;

pub use heap::{HeapDebuggee, HeapValue};

/// Stable handle of an object in the debugged process.
///
/// Two expressions that evaluate to the same object yield the same handle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ObjectHandle(u64);

impl ObjectHandle {
    pub fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Get the raw handle value.
    pub fn raw(&self) -> u64 {
        self.0
    }
}

impl std::fmt::Display for ObjectHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:x}", self.0)
    }
}

/// An evaluated value as reported by the debuggee.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Value {
    pub type_name: String,
    pub kind: ValueKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ValueKind {
    Null,

    /// A primitive, displayed inline as text.
    Atomic(String),

    /// A reference-typed object with members and optionally elements.
    Object(ObjectValue),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ObjectValue {
    /// `None` when the debuggee cannot provide object identity.
    pub handle: Option<ObjectHandle>,

    /// Member names in declaration order.
    pub members: Vec<String>,

    /// Number of indexable elements, if the object is a collection.
    pub element_count: Option<usize>,
}

impl Value {
    pub fn null(type_name: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            kind: ValueKind::Null,
        }
    }

    pub fn atomic(type_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            type_name: type_name.into(),
            kind: ValueKind::Atomic(text.into()),
        }
    }

    pub fn object(type_name: impl Into<String>, object: ObjectValue) -> Self {
        Self {
            type_name: type_name.into(),
            kind: ValueKind::Object(object),
        }
    }

    pub fn as_object(&self) -> Option<&ObjectValue> {
        match &self.kind {
            ValueKind::Object(object) => Some(object),
            _ => None,
        }
    }
}

/// The debugger session as seen by the visualizer.
pub trait Debuggee {
    /// Evaluate an expression in the current stack frame.
    fn evaluate(&self, expression: &str) -> Result<Value, EvaluationError>;

    /// Whether the process is currently running. Evaluation is only
    /// possible while it is stopped.
    fn is_process_running(&self) -> bool;
}

impl<D: Debuggee + ?Sized> Debuggee for &D {
    fn evaluate(&self, expression: &str) -> Result<Value, EvaluationError> {
        (**self).evaluate(expression)
    }

    fn is_process_running(&self) -> bool {
        (**self).is_process_running()
    }
}

impl<D: Debuggee + ?Sized> Debuggee for std::sync::Arc<D> {
    fn evaluate(&self, expression: &str) -> Result<Value, EvaluationError> {
        (**self).evaluate(expression)
    }

    fn is_process_running(&self) -> bool {
        (**self).is_process_running()
    }
}
