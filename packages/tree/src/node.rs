//! Node data stored in the tree arena.

use crate::events::ListenerHandle;
use generational_arena::Index;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Stable handle to a node.
///
/// Identity is by handle, never by name. Handles are generational: once a
/// detached subtree has been purged its handles stop resolving and are never
/// reused for a different node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub(crate) Index);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let (slot, generation) = self.0.into_raw_parts();
        write!(f, "#{}v{}", slot, generation)
    }
}

/// A `key='value'` pair owned by an entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attribute {
    key: String,
    value: String,
}

impl Attribute {
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// The key is fixed at creation
    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn value(&self) -> &str {
        &self.value
    }

    pub(crate) fn replace_value(&mut self, value: String) -> String {
        std::mem::replace(&mut self.value, value)
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}='{}'", self.key, self.value)
    }
}

/// What a node holds besides its name
#[derive(Debug, Clone)]
pub enum NodeKind {
    /// Container: ordered children and ordered attributes, no text
    Entity {
        children: Vec<NodeId>,
        attributes: Vec<Attribute>,
    },

    /// Leaf: text fixed at construction
    Text { text: String },
}

impl NodeKind {
    pub(crate) fn entity() -> Self {
        NodeKind::Entity {
            children: Vec::new(),
            attributes: Vec::new(),
        }
    }
}

/// Arena slot for a single node
pub(crate) struct Node {
    pub(crate) name: String,
    pub(crate) parent: Option<NodeId>,
    pub(crate) kind: NodeKind,
    pub(crate) listeners: Vec<ListenerHandle>,
}

impl Node {
    pub(crate) fn new(name: String, parent: Option<NodeId>, kind: NodeKind) -> Self {
        Self {
            name,
            parent,
            kind,
            listeners: Vec::new(),
        }
    }

    pub(crate) fn children(&self) -> &[NodeId] {
        match &self.kind {
            NodeKind::Entity { children, .. } => children,
            NodeKind::Text { .. } => &[],
        }
    }

    pub(crate) fn attributes(&self) -> &[Attribute] {
        match &self.kind {
            NodeKind::Entity { attributes, .. } => attributes,
            NodeKind::Text { .. } => &[],
        }
    }
}

impl fmt::Debug for Node {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Node")
            .field("name", &self.name)
            .field("parent", &self.parent)
            .field("kind", &self.kind)
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

/// Read-only view of a node, borrowed from its tree
#[derive(Clone, Copy)]
pub struct NodeRef<'a> {
    pub(crate) id: NodeId,
    pub(crate) node: &'a Node,
}

impl<'a> NodeRef<'a> {
    pub fn id(&self) -> NodeId {
        self.id
    }

    pub fn name(&self) -> &'a str {
        &self.node.name
    }

    /// `None` for the document root and for detached subtree heads
    pub fn parent(&self) -> Option<NodeId> {
        self.node.parent
    }

    pub fn is_entity(&self) -> bool {
        matches!(self.node.kind, NodeKind::Entity { .. })
    }

    pub fn is_text(&self) -> bool {
        matches!(self.node.kind, NodeKind::Text { .. })
    }

    pub fn kind(&self) -> &'a NodeKind {
        &self.node.kind
    }

    /// Children in sibling order; empty for text entities
    pub fn children(&self) -> &'a [NodeId] {
        self.node.children()
    }

    /// Attributes in insertion order; empty for text entities
    pub fn attributes(&self) -> &'a [Attribute] {
        self.node.attributes()
    }

    pub fn has_attributes(&self) -> bool {
        !self.node.attributes().is_empty()
    }

    /// Value of the first attribute named `key`
    pub fn attribute(&self, key: &str) -> Option<&'a str> {
        self.node
            .attributes()
            .iter()
            .find(|a| a.key() == key)
            .map(|a| a.value())
    }

    pub fn text(&self) -> Option<&'a str> {
        match &self.node.kind {
            NodeKind::Text { text } => Some(text),
            NodeKind::Entity { .. } => None,
        }
    }
}

impl fmt::Debug for NodeRef<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NodeRef")
            .field("id", &self.id)
            .field("name", &self.node.name)
            .finish()
    }
}
