//! Identity and cycle tracking
//!
//! [`IdentityTracker`] lives for exactly one materialize or serialize call.
//! An entry moves through two states once registered:
//!
//! ```text
//! unseen → InProgress (registered, attributes being populated) → Complete
//! ```
//!
//! A node or object seen again while `InProgress` is a cycle; seen again
//! while `Complete` it is a shared sub-object. Both resolve to the first
//! occurrence.
//!
//! [`LinkableEntities`] is the long-lived counterpart used across records:
//! it remembers where linkable objects (contacts...) were persisted so a
//! later record can link to them instead of copying them. It holds weak
//! references only and never keeps an object graph alive.

use crate::models::{NodeId, ObjectRef, Value, WeakObjectRef};
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryState {
    InProgress,
    Complete,
}

#[derive(Debug, Default)]
pub struct IdentityTracker {
    read: HashMap<(String, NodeId), (Value, EntryState)>,
    // Holding the ObjectRef pins the address used as key for the call.
    written: HashMap<usize, (ObjectRef, NodeId, EntryState)>,
}

impl IdentityTracker {
    pub fn new() -> Self {
        Self::default()
    }

    // Read direction

    pub fn begin_read(&mut self, record: &str, node: NodeId, value: Value) {
        self.read
            .insert((record.to_string(), node), (value, EntryState::InProgress));
    }

    pub fn complete_read(&mut self, record: &str, node: NodeId) {
        if let Some(entry) = self.read.get_mut(&(record.to_string(), node)) {
            entry.1 = EntryState::Complete;
        }
    }

    /// Value already produced for a node, whatever its state
    pub fn lookup_read(&self, record: &str, node: NodeId) -> Option<Value> {
        self.read
            .get(&(record.to_string(), node))
            .map(|(value, _)| value.clone())
    }

    pub fn read_state(&self, record: &str, node: NodeId) -> Option<EntryState> {
        self.read.get(&(record.to_string(), node)).map(|(_, state)| *state)
    }

    // Write direction

    pub fn begin_write(&mut self, object: &ObjectRef, node: NodeId) {
        self.written.insert(
            object.identity(),
            (object.clone(), node, EntryState::InProgress),
        );
    }

    pub fn complete_write(&mut self, object: &ObjectRef) {
        if let Some(entry) = self.written.get_mut(&object.identity()) {
            entry.2 = EntryState::Complete;
        }
    }

    /// Node written for an object earlier in this call
    pub fn lookup_write(&self, object: &ObjectRef) -> Option<NodeId> {
        self.written
            .get(&object.identity())
            .map(|(_, node, _)| *node)
    }

    pub fn write_state(&self, object: &ObjectRef) -> Option<EntryState> {
        self.written.get(&object.identity()).map(|(_, _, state)| *state)
    }

    pub fn len(&self) -> usize {
        self.read.len() + self.written.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone)]
struct LinkableEntry {
    object: WeakObjectRef,
    record: String,
    node: NodeId,
}

/// Where linkable objects were persisted, shared across calls
#[derive(Debug, Default)]
pub struct LinkableEntities {
    entries: RwLock<HashMap<usize, LinkableEntry>>,
}

impl LinkableEntities {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, object: &ObjectRef, record: &str, node: NodeId) {
        tracing::debug!("{:?} linkable as {}{}", object, record, node);
        self.entries
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(
                object.identity(),
                LinkableEntry {
                    object: object.downgrade(),
                    record: record.to_string(),
                    node,
                },
            );
    }

    /// Record and node holding `object`, if it is still alive and registered
    pub fn lookup(&self, object: &ObjectRef) -> Option<(String, NodeId)> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        let entry = entries.get(&object.identity())?;
        // A dead entry may share its address with a newer object.
        match entry.object.upgrade() {
            Some(live) if live.ptr_eq(object) => Some((entry.record.clone(), entry.node)),
            _ => None,
        }
    }

    /// Drop every entry pointing into `record`; returns how many were dropped
    pub fn forget_record(&self, record: &str) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| entry.record != record);
        before - entries.len()
    }

    /// Drop entries whose object no longer exists
    pub fn prune(&self) -> usize {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        let before = entries.len();
        entries.retain(|_, entry| entry.object.upgrade().is_some());
        before - entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
