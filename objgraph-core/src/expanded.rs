//! Expansion State
//!
//! Remembers which properties and which content entries the user expanded,
//! so that a rebuild of the object graph resolves them again eagerly.
//!
//! The store is keyed by stable text, not by graph instances:
//!
//! - member properties by their expression (`order.customer`)
//! - content entries by their content path (`order.lines/[2]`)
//!
//! Absence means collapsed. Nothing in the pipeline clears the store; only
//! explicit user actions change it.

use std::collections::BTreeSet;
use std::sync::Arc;

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

/// Expansion state shared between views of the same debugger session.
pub type SharedExpanded = Arc<RwLock<Expanded>>;

/// One set of expanded keys.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ExpandedSet {
    keys: BTreeSet<String>,
}

impl ExpandedSet {
    pub fn is_expanded(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn set_expanded(&mut self, key: impl Into<String>) {
        self.keys.insert(key.into());
    }

    pub fn set_collapsed(&mut self, key: &str) {
        self.keys.remove(key);
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

/// Which graph edges and content entries the user expanded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Expanded {
    /// Expanded member properties, by expression.
    pub expressions: ExpandedSet,
    /// Expanded content entries, by content path.
    pub content_nodes: ExpandedSet,
}

impl Expanded {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap into a handle that several views can share.
    pub fn shared(self) -> SharedExpanded {
        Arc::new(RwLock::new(self))
    }

    pub fn is_property_expanded(&self, expression: &str) -> bool {
        self.expressions.is_expanded(expression)
    }

    pub fn set_property_expanded(&mut self, expression: impl Into<String>) {
        self.expressions.set_expanded(expression);
    }

    pub fn set_property_collapsed(&mut self, expression: &str) {
        self.expressions.set_collapsed(expression);
    }

    pub fn is_content_expanded(&self, path: &str) -> bool {
        self.content_nodes.is_expanded(path)
    }

    pub fn set_content_expanded(&mut self, path: impl Into<String>) {
        self.content_nodes.set_expanded(path);
    }

    pub fn set_content_collapsed(&mut self, path: &str) {
        self.content_nodes.set_collapsed(path);
    }

    /// Encode for persistence between debugger sessions.
    pub fn to_msgpack(&self) -> Result<Vec<u8>, rmp_serde::encode::Error> {
        rmp_serde::to_vec_named(self)
    }

    pub fn from_msgpack(bytes: &[u8]) -> Result<Self, rmp_serde::decode::Error> {
        rmp_serde::from_slice(bytes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn absent_means_collapsed() {
        let expanded = Expanded::new();
        assert!(!expanded.is_property_expanded("a.b"));
        assert!(!expanded.is_content_expanded("a/[0]"));
    }

    #[test]
    fn property_and_content_sets_are_independent() {
        let mut expanded = Expanded::new();
        expanded.set_property_expanded("list[0]");
        assert!(expanded.is_property_expanded("list[0]"));
        assert!(!expanded.is_content_expanded("list[0]"));

        expanded.set_content_expanded("list/[0]");
        expanded.set_property_collapsed("list[0]");
        assert!(!expanded.is_property_expanded("list[0]"));
        assert!(expanded.is_content_expanded("list/[0]"));
    }

    #[test]
    fn expanding_twice_is_idempotent() {
        let mut expanded = Expanded::new();
        expanded.set_property_expanded("a.b");
        expanded.set_property_expanded("a.b");
        assert_eq!(expanded.expressions.len(), 1);

        expanded.set_property_collapsed("a.b");
        assert!(expanded.expressions.is_empty());
    }

    #[test]
    fn survives_persistence() {
        let mut expanded = Expanded::new();
        expanded.set_property_expanded("order.customer");
        expanded.set_content_expanded("order.lines/[2]");

        let bytes = expanded.to_msgpack().unwrap();
        let restored = Expanded::from_msgpack(&bytes).unwrap();
        assert_eq!(restored, expanded);
    }

    #[test]
    fn shared_handle_sees_writes() {
        let shared = Expanded::new().shared();
        let other = Arc::clone(&shared);
        shared.write().set_property_expanded("x.y");
        assert!(other.read().is_property_expanded("x.y"));
    }
}
