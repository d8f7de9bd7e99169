//! In-memory Debuggee
//!
//! A [`Debuggee`] backed by a captured heap snapshot: a table of objects with
//! named fields and optional elements, plus a set of local variables that act
//! as expression roots.
//!
//! Expressions are member paths: `local(.field|[index])*`, for example
//! `order.lines[2].product`.
//!
//! Faults can be injected per expression to simulate the debuggee failing to
//! evaluate a specific property, and the running flag can be toggled to
//! exercise the stopped-process precondition.

use std::collections::HashSet;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use indexmap::IndexMap;
use parking_lot::RwLock;

use super::{Debuggee, ObjectHandle, ObjectValue, Value};
use crate::error::EvaluationError;

/// First handle handed out, so handles look like addresses in output.
const FIRST_HANDLE: u64 = 0x1000;
const HANDLE_STRIDE: u64 = 0x10;

/// A slot value in the heap snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HeapValue {
    Null { type_name: String },
    Atomic { type_name: String, text: String },
    Ref(ObjectHandle),
}

impl HeapValue {
    pub fn null(type_name: impl Into<String>) -> Self {
        Self::Null {
            type_name: type_name.into(),
        }
    }

    pub fn atomic(type_name: impl Into<String>, text: impl Into<String>) -> Self {
        Self::Atomic {
            type_name: type_name.into(),
            text: text.into(),
        }
    }
}

impl From<ObjectHandle> for HeapValue {
    fn from(handle: ObjectHandle) -> Self {
        Self::Ref(handle)
    }
}

#[derive(Debug)]
struct HeapObject {
    type_name: String,
    fields: IndexMap<String, HeapValue>,
    /// `Some` for collections.
    elements: Option<Vec<HeapValue>>,
}

enum Segment<'a> {
    Field(&'a str),
    Index(usize),
}

/// A debuggee over an in-memory heap snapshot.
#[derive(Debug)]
pub struct HeapDebuggee {
    objects: IndexMap<ObjectHandle, HeapObject>,
    locals: IndexMap<String, HeapValue>,
    next_handle: u64,
    running: AtomicBool,
    faults: RwLock<HashSet<String>>,
    evaluations: AtomicUsize,
}

impl HeapDebuggee {
    /// Create an empty, stopped debuggee.
    pub fn new() -> Self {
        Self {
            objects: IndexMap::new(),
            locals: IndexMap::new(),
            next_handle: FIRST_HANDLE,
            running: AtomicBool::new(false),
            faults: RwLock::new(HashSet::new()),
            evaluations: AtomicUsize::new(0),
        }
    }

    /// Allocate a plain object.
    pub fn alloc(&mut self, type_name: impl Into<String>) -> ObjectHandle {
        self.insert(type_name.into(), None)
    }

    /// Allocate an (initially empty) collection object.
    pub fn alloc_list(&mut self, type_name: impl Into<String>) -> ObjectHandle {
        self.insert(type_name.into(), Some(Vec::new()))
    }

    fn insert(&mut self, type_name: String, elements: Option<Vec<HeapValue>>) -> ObjectHandle {
        let handle = ObjectHandle::new(self.next_handle);
        self.next_handle += HANDLE_STRIDE;
        self.objects.insert(
            handle,
            HeapObject {
                type_name,
                fields: IndexMap::new(),
                elements,
            },
        );
        handle
    }

    /// Set (or overwrite) a field. Fields keep their first insertion order.
    pub fn set_field(
        &mut self,
        handle: ObjectHandle,
        name: impl Into<String>,
        value: impl Into<HeapValue>,
    ) {
        match self.objects.get_mut(&handle) {
            Some(object) => {
                object.fields.insert(name.into(), value.into());
            }
            None => tracing::warn!(%handle, "set_field on unknown object ignored"),
        }
    }

    /// Append an element. Turns a plain object into a collection.
    pub fn push_element(&mut self, handle: ObjectHandle, value: impl Into<HeapValue>) {
        match self.objects.get_mut(&handle) {
            Some(object) => object.elements.get_or_insert_with(Vec::new).push(value.into()),
            None => tracing::warn!(%handle, "push_element on unknown object ignored"),
        }
    }

    /// Bind a local variable usable as an expression root.
    pub fn set_local(&mut self, name: impl Into<String>, value: impl Into<HeapValue>) {
        self.locals.insert(name.into(), value.into());
    }

    pub fn set_running(&self, running: bool) {
        self.running.store(running, Ordering::SeqCst);
    }

    /// Make every evaluation of `expression` fail.
    pub fn inject_fault(&self, expression: impl Into<String>) {
        self.faults.write().insert(expression.into());
    }

    pub fn clear_faults(&self) {
        self.faults.write().clear();
    }

    /// Number of `evaluate` calls served so far.
    pub fn evaluation_count(&self) -> usize {
        self.evaluations.load(Ordering::Relaxed)
    }

    fn object(
        &self,
        handle: ObjectHandle,
        expression: &str,
    ) -> Result<&HeapObject, EvaluationError> {
        self.objects.get(&handle).ok_or_else(|| {
            EvaluationError::new(expression, format!("dangling object handle {handle}"))
        })
    }

    fn step<'a>(
        &'a self,
        current: &'a HeapValue,
        segment: &Segment<'_>,
        expression: &str,
    ) -> Result<&'a HeapValue, EvaluationError> {
        let handle = match current {
            HeapValue::Ref(handle) => *handle,
            HeapValue::Null { .. } => {
                return Err(EvaluationError::new(
                    expression,
                    "Object reference not set to an instance of an object",
                ))
            }
            HeapValue::Atomic { type_name, .. } => {
                return Err(EvaluationError::new(
                    expression,
                    format!("type {type_name} has no members"),
                ))
            }
        };
        let object = self.object(handle, expression)?;
        match segment {
            Segment::Field(name) => object.fields.get(*name).ok_or_else(|| {
                EvaluationError::new(
                    expression,
                    format!("member '{name}' not found on type {}", object.type_name),
                )
            }),
            Segment::Index(index) => {
                let elements = object.elements.as_ref().ok_or_else(|| {
                    EvaluationError::new(
                        expression,
                        format!("type {} has no indexer", object.type_name),
                    )
                })?;
                elements.get(*index).ok_or_else(|| {
                    EvaluationError::new(
                        expression,
                        format!("index {index} is out of range (count {})", elements.len()),
                    )
                })
            }
        }
    }

    fn describe(&self, value: &HeapValue, expression: &str) -> Result<Value, EvaluationError> {
        match value {
            HeapValue::Null { type_name } => Ok(Value::null(type_name.clone())),
            HeapValue::Atomic { type_name, text } => {
                Ok(Value::atomic(type_name.clone(), text.clone()))
            }
            HeapValue::Ref(handle) => {
                let object = self.object(*handle, expression)?;
                Ok(Value::object(
                    object.type_name.clone(),
                    ObjectValue {
                        handle: Some(*handle),
                        members: object.fields.keys().cloned().collect(),
                        element_count: object.elements.as_ref().map(Vec::len),
                    },
                ))
            }
        }
    }
}

impl Default for HeapDebuggee {
    fn default() -> Self {
        Self::new()
    }
}

impl Debuggee for HeapDebuggee {
    fn evaluate(&self, expression: &str) -> Result<Value, EvaluationError> {
        self.evaluations.fetch_add(1, Ordering::Relaxed);
        let expression = expression.trim();

        if self.faults.read().contains(expression) {
            return Err(EvaluationError::new(
                expression,
                "the debuggee reported an evaluation fault",
            ));
        }

        let (root, segments) =
            parse_path(expression).map_err(|message| EvaluationError::new(expression, message))?;
        let mut current = self.locals.get(root).ok_or_else(|| {
            EvaluationError::new(
                expression,
                format!("the name '{root}' does not exist in the current context"),
            )
        })?;
        for segment in &segments {
            current = self.step(current, segment, expression)?;
        }
        self.describe(current, expression)
    }

    fn is_process_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }
}

fn is_identifier(text: &str) -> bool {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) if first.is_alphabetic() || first == '_' => {
            chars.all(|c| c.is_alphanumeric() || c == '_')
        }
        _ => false,
    }
}

/// Split `root.a[3].b` into the root name and its access segments.
fn parse_path(expression: &str) -> Result<(&str, Vec<Segment<'_>>), String> {
    let end = expression.find(['.', '[']).unwrap_or(expression.len());
    let (root, mut rest) = expression.split_at(end);
    if !is_identifier(root) {
        return Err(format!("'{root}' is not a valid identifier"));
    }

    let mut segments = Vec::new();
    while !rest.is_empty() {
        if let Some(after) = rest.strip_prefix('.') {
            let end = after.find(['.', '[']).unwrap_or(after.len());
            let (name, tail) = after.split_at(end);
            if !is_identifier(name) {
                return Err(format!("'{name}' is not a valid member name"));
            }
            segments.push(Segment::Field(name));
            rest = tail;
        } else if let Some(after) = rest.strip_prefix('[') {
            let close = after.find(']').ok_or_else(|| "unterminated indexer".to_string())?;
            let raw = after[..close].trim();
            let index = raw
                .parse::<usize>()
                .map_err(|_| format!("'{raw}' is not a valid index"))?;
            segments.push(Segment::Index(index));
            rest = &after[close + 1..];
        } else {
            return Err(format!("unexpected input '{rest}'"));
        }
    }
    Ok((root, segments))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::debuggee::ValueKind;

    fn sample() -> (HeapDebuggee, ObjectHandle, ObjectHandle) {
        let mut heap = HeapDebuggee::new();
        let list = heap.alloc_list("List<Person>");
        let person = heap.alloc("Person");
        heap.set_field(person, "name", HeapValue::atomic("string", "\"Ada\""));
        heap.set_field(person, "friend", HeapValue::null("Person"));
        heap.push_element(list, person);
        heap.set_local("people", list);
        (heap, list, person)
    }

    #[test]
    fn evaluates_member_paths() {
        let (heap, _, person) = sample();

        let value = heap.evaluate("people[0]").unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(value.type_name, "Person");
        assert_eq!(object.handle, Some(person));
        assert_eq!(object.members, vec!["name", "friend"]);
        assert_eq!(object.element_count, None);

        let name = heap.evaluate("people[0].name").unwrap();
        assert_eq!(name.kind, ValueKind::Atomic("\"Ada\"".into()));
    }

    #[test]
    fn collections_report_element_count() {
        let (heap, list, _) = sample();
        let value = heap.evaluate("people").unwrap();
        let object = value.as_object().unwrap();
        assert_eq!(object.handle, Some(list));
        assert_eq!(object.element_count, Some(1));
    }

    #[test]
    fn reports_evaluation_failures() {
        let (heap, _, _) = sample();
        assert!(heap.evaluate("nobody").is_err());
        assert!(heap.evaluate("people[3]").is_err());
        assert!(heap.evaluate("people[0].friend.name").is_err());
        assert!(heap.evaluate("people[0].name.length").is_err());
        assert!(heap.evaluate("people[").is_err());
        assert!(heap.evaluate("people..x").is_err());
    }

    #[test]
    fn injected_faults_fail_only_that_expression() {
        let (heap, _, _) = sample();
        heap.inject_fault("people[0].name");
        assert!(heap.evaluate("people[0].name").is_err());
        assert!(heap.evaluate("people[0]").is_ok());

        heap.clear_faults();
        assert!(heap.evaluate("people[0].name").is_ok());
    }

    #[test]
    fn counts_evaluations() {
        let (heap, _, _) = sample();
        assert_eq!(heap.evaluation_count(), 0);
        let _ = heap.evaluate("people");
        let _ = heap.evaluate("missing");
        assert_eq!(heap.evaluation_count(), 2);
    }
}
