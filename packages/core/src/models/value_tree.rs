//! Value Tree Model
//!
//! The generic persisted representation of a metadata record. A [`Record`]
//! owns an arena of [`ValueNode`]s; each node carries its schema [`Path`],
//! its ordinal among siblings reached through the same path, its schema
//! class and one of three payloads:
//!
//! - `Composite` - an object whose attributes are the child nodes
//! - `Text` - a literal leaf value
//! - `Linked` - a reference to a node written earlier (shared sub-objects,
//!   cycles, or entities persisted in another record)
//!
//! Parent back-references are arena indices, so the tree has no ownership
//! cycles and serializes as a flat node list.

use crate::models::path::Path;
use crate::models::schema::ClassKey;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap, HashSet};
use std::fmt;
use thiserror::Error;

/// Index of a node inside its record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub usize);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Target of a linked node
///
/// `record` is `None` for links inside the same record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LinkTarget {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<String>,
    pub node: NodeId,
}

impl LinkTarget {
    pub fn local(node: NodeId) -> Self {
        Self { record: None, node }
    }

    pub fn external(record: impl Into<String>, node: NodeId) -> Self {
        Self {
            record: Some(record.into()),
            node,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "payload", rename_all = "camelCase")]
pub enum NodeKind {
    Composite,
    Text(String),
    Linked(LinkTarget),
}

/// One attribute occurrence in a record's tree
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValueNode {
    pub id: NodeId,
    pub path: Path,
    /// 1-based position among siblings sharing `path` under `parent`
    pub ordinal: u32,
    pub schema_class: Option<ClassKey>,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    pub kind: NodeKind,
}

impl ValueNode {
    pub fn text(&self) -> Option<&str> {
        match &self.kind {
            NodeKind::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn link(&self) -> Option<&LinkTarget> {
        match &self.kind {
            NodeKind::Linked(target) => Some(target),
            _ => None,
        }
    }

    pub fn is_composite(&self) -> bool {
        matches!(self.kind, NodeKind::Composite)
    }

    /// Property through which the parent reaches this node
    pub fn property(&self) -> Option<&str> {
        self.path.property()
    }
}

/// Structural problems detected by [`Record::validate`]
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TreeError {
    #[error("Unknown node {0}")]
    UnknownNode(NodeId),

    #[error("Node {parent} cannot hold children: it is not a composite")]
    NotComposite { parent: NodeId },

    #[error("Duplicate ordinal {ordinal} for path '{path}' under {parent:?}")]
    DuplicateOrdinal {
        parent: Option<NodeId>,
        path: String,
        ordinal: u32,
    },

    #[error("Link {link} points to {target}, which is not written before it")]
    ForwardLink { link: NodeId, target: NodeId },

    #[error("Linked node {0} has children")]
    LinkWithChildren(NodeId),
}

/// A persisted metadata document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub identifier: String,
    pub record_set: String,
    pub profile: String,
    /// User the record was written on behalf of
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub owner: Option<String>,
    pub root: Option<NodeId>,
    nodes: Vec<ValueNode>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Record {
    pub fn new(
        identifier: impl Into<String>,
        record_set: impl Into<String>,
        profile: impl Into<String>,
    ) -> Self {
        let now = Utc::now();
        Self {
            identifier: identifier.into(),
            record_set: record_set.into(),
            profile: profile.into(),
            owner: None,
            root: None,
            nodes: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Add the root node; replaces any previous root reference
    pub fn add_root(
        &mut self,
        path: Path,
        schema_class: Option<ClassKey>,
        kind: NodeKind,
    ) -> NodeId {
        let id = self.push(ValueNode {
            id: NodeId(self.nodes.len()),
            path,
            ordinal: 1,
            schema_class,
            parent: None,
            children: Vec::new(),
            kind,
        });
        self.root = Some(id);
        id
    }

    /// Add a child node under `parent`
    ///
    /// The ordinal is one more than the number of siblings already reached
    /// through the same path, so multi-valued properties keep insertion order.
    pub fn add_child(
        &mut self,
        parent: NodeId,
        path: Path,
        schema_class: Option<ClassKey>,
        kind: NodeKind,
    ) -> Result<NodeId, TreeError> {
        let parent_node = self.node(parent).ok_or(TreeError::UnknownNode(parent))?;
        if !parent_node.is_composite() {
            return Err(TreeError::NotComposite { parent });
        }
        let ordinal = parent_node
            .children
            .iter()
            .filter(|child| self.nodes[child.0].path == path)
            .count() as u32
            + 1;

        let id = self.push(ValueNode {
            id: NodeId(self.nodes.len()),
            path,
            ordinal,
            schema_class,
            parent: Some(parent),
            children: Vec::new(),
            kind,
        });
        self.nodes[parent.0].children.push(id);
        Ok(id)
    }

    fn push(&mut self, node: ValueNode) -> NodeId {
        let id = node.id;
        self.nodes.push(node);
        id
    }

    pub fn node(&self, id: NodeId) -> Option<&ValueNode> {
        self.nodes.get(id.0)
    }

    pub fn root_node(&self) -> Option<&ValueNode> {
        self.root.and_then(|id| self.node(id))
    }

    pub fn nodes(&self) -> &[ValueNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn children(&self, id: NodeId) -> impl Iterator<Item = &ValueNode> + '_ {
        self.node(id)
            .map(|node| node.children.as_slice())
            .unwrap_or(&[])
            .iter()
            .filter_map(move |child| self.node(*child))
    }

    /// Children reached through `property`, in ordinal order
    pub fn children_by_property<'a>(
        &'a self,
        id: NodeId,
        property: &'a str,
    ) -> impl Iterator<Item = &'a ValueNode> + 'a {
        self.children(id)
            .filter(move |child| child.property() == Some(property))
    }

    /// Literal of the first text child reached through `property`
    pub fn child_text(&self, id: NodeId, property: &str) -> Option<&str> {
        self.children(id)
            .filter(|child| child.property() == Some(property))
            .find_map(|child| child.text())
    }

    /// Nodes whose rendered path equals `path`
    pub fn find_by_path(&self, path: &str) -> Vec<NodeId> {
        self.nodes
            .iter()
            .filter(|node| node.path.to_string() == path)
            .map(|node| node.id)
            .collect()
    }

    /// Pre-order traversal from the root
    pub fn walk(&self) -> Vec<NodeId> {
        let mut order = Vec::with_capacity(self.nodes.len());
        let mut stack: Vec<NodeId> = self.root.into_iter().collect();
        while let Some(id) = stack.pop() {
            order.push(id);
            if let Some(node) = self.node(id) {
                stack.extend(node.children.iter().rev().copied());
            }
        }
        order
    }

    /// Identifiers of other records referenced by linked nodes
    pub fn external_links(&self) -> BTreeSet<String> {
        self.nodes
            .iter()
            .filter_map(|node| node.link())
            .filter_map(|target| target.record.clone())
            .filter(|record| record != &self.identifier)
            .collect()
    }

    /// Check ordinal uniqueness and link ordering
    pub fn validate(&self) -> Result<(), TreeError> {
        let order = self.walk();
        let position: HashMap<NodeId, usize> =
            order.iter().enumerate().map(|(i, id)| (*id, i)).collect();

        let mut seen: HashSet<(Option<NodeId>, &Path, u32)> = HashSet::new();
        for id in &order {
            let node = self.node(*id).ok_or(TreeError::UnknownNode(*id))?;
            if !seen.insert((node.parent, &node.path, node.ordinal)) {
                return Err(TreeError::DuplicateOrdinal {
                    parent: node.parent,
                    path: node.path.to_string(),
                    ordinal: node.ordinal,
                });
            }

            if let NodeKind::Linked(target) = &node.kind {
                if !node.children.is_empty() {
                    return Err(TreeError::LinkWithChildren(node.id));
                }
                let local = target
                    .record
                    .as_deref()
                    .map_or(true, |record| record == self.identifier);
                if local {
                    match position.get(&target.node) {
                        Some(p) if *p < position[id] => {}
                        _ => {
                            return Err(TreeError::ForwardLink {
                                link: node.id,
                                target: target.node,
                            })
                        }
                    }
                }
            }
        }
        Ok(())
    }
}
