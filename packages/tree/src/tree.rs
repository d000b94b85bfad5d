//! # Tree
//!
//! Arena-backed document tree. The arena owns every node, including subtrees
//! that have been detached but may still be reattached by an undo. Parent and
//! child links are plain [`NodeId`]s and are always updated together, before
//! any listener is notified.
//!
//! ## Construction
//!
//! ```rust
//! use xmledit_tree::Tree;
//!
//! let mut tree = Tree::new("library");
//! let book = tree.add_child_entity(tree.root(), "book").unwrap();
//! tree.add_attribute(book, "genre", "fantasy").unwrap();
//! tree.add_child_text(book, "chapter1", "Once upon a time").unwrap();
//!
//! assert_eq!(tree.get(book).unwrap().attribute("genre"), Some("fantasy"));
//! ```

use crate::error::{DomError, DomResult};
use crate::events::{self, ListenerHandle, TreeEvent};
use crate::node::{Attribute, Node, NodeId, NodeKind, NodeRef};
use generational_arena::Arena;
use tracing::{debug, trace};

/// Where a subtree was attached before [`Tree::remove_subtree`] detached it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Detached {
    pub node: NodeId,
    pub parent: NodeId,
    /// Position among the parent's children at the time of removal
    pub index: usize,
}

/// Mutable hierarchical document rooted at a single container
#[derive(Debug)]
pub struct Tree {
    arena: Arena<Node>,
    root: NodeId,
}

impl Tree {
    /// Create a tree holding only a root container
    pub fn new(root_name: impl Into<String>) -> Self {
        let mut arena = Arena::new();
        let root = NodeId(arena.insert(Node::new(root_name.into(), None, NodeKind::entity())));
        Self { arena, root }
    }

    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of live nodes, detached subtrees included
    pub fn len(&self) -> usize {
        self.arena.len()
    }

    pub fn is_empty(&self) -> bool {
        self.arena.is_empty()
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.arena.contains(id.0)
    }

    pub fn get(&self, id: NodeId) -> Option<NodeRef<'_>> {
        self.arena.get(id.0).map(|node| NodeRef { id, node })
    }

    /// Like [`Tree::get`], but a missing node is an error
    pub fn node(&self, id: NodeId) -> DomResult<NodeRef<'_>> {
        self.get(id).ok_or(DomError::NodeNotFound(id))
    }

    /// True when following parents from `id` reaches the document root
    pub fn is_attached(&self, id: NodeId) -> bool {
        self.ancestors(id).last() == Some(self.root)
    }

    /// Number of edges between `id` and the top of its subtree
    pub fn depth(&self, id: NodeId) -> Option<usize> {
        if !self.contains(id) {
            return None;
        }
        Some(self.ancestors(id).count() - 1)
    }

    /// `node` followed by each of its ancestors, nearest first
    pub fn ancestors(&self, node: NodeId) -> Ancestors<'_> {
        Ancestors {
            tree: self,
            next: self.contains(node).then_some(node),
        }
    }

    /// True if `ancestor` is `node` or lies on its parent chain
    pub fn is_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        self.ancestors(node).any(|id| id == ancestor)
    }

    // Notification channel

    /// Register a listener on `node`. Returns false if it was already registered.
    pub fn subscribe(&mut self, node: NodeId, listener: ListenerHandle) -> DomResult<bool> {
        let slot = self.slot_mut(node)?;
        Ok(events::insert_listener(&mut slot.listeners, listener))
    }

    /// Drop a listener from `node`. Returns false if it was not registered.
    pub fn unsubscribe(&mut self, node: NodeId, listener: &ListenerHandle) -> DomResult<bool> {
        let slot = self.slot_mut(node)?;
        Ok(events::remove_listener(&mut slot.listeners, listener))
    }

    pub fn listener_count(&self, node: NodeId) -> usize {
        self.arena
            .get(node.0)
            .map(|n| n.listeners.len())
            .unwrap_or(0)
    }

    fn notify(&mut self, event: TreeEvent) {
        let mut listeners: Vec<ListenerHandle> = Vec::new();
        for id in event.audience() {
            if let Some(node) = self.arena.get(id.0) {
                for listener in &node.listeners {
                    events::insert_listener(&mut listeners, listener.clone());
                }
            }
        }

        for listener in &listeners {
            event.deliver(listener.as_ref(), self);
        }
    }

    // Names and attributes

    /// Set the node's name and return the previous one
    pub fn rename(&mut self, id: NodeId, name: impl Into<String>) -> DomResult<String> {
        let slot = self.slot_mut(id)?;
        let previous = std::mem::replace(&mut slot.name, name.into());
        let name = slot.name.clone();

        debug!(node = %id, from = %previous, to = %name, "rename");
        self.notify(TreeEvent::Renamed { node: id, name });
        Ok(previous)
    }

    /// Append an attribute. Duplicate keys are not rejected.
    pub fn add_attribute(
        &mut self,
        id: NodeId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> DomResult<()> {
        let attributes = self.attributes_mut(id)?;
        let index = attributes.len();
        self.insert_attribute(id, index, Attribute::new(key, value))
    }

    /// Insert an attribute at `index` (clamped to the attribute count)
    pub fn insert_attribute(&mut self, id: NodeId, index: usize, attribute: Attribute) -> DomResult<()> {
        let attributes = self.attributes_mut(id)?;
        let at = index.min(attributes.len());
        let event = TreeEvent::AttributeSet {
            node: id,
            key: attribute.key().to_string(),
            value: attribute.value().to_string(),
        };
        attributes.insert(at, attribute);

        trace!(node = %id, index = at, "attribute set");
        self.notify(event);
        Ok(())
    }

    /// Position of the first attribute named `key`
    pub fn attribute_position(&self, id: NodeId, key: &str) -> DomResult<Option<usize>> {
        let node = self.slot(id)?;
        Ok(node.attributes().iter().position(|a| a.key() == key))
    }

    /// Replace the value of the first attribute named `key`.
    ///
    /// Returns the replaced value, or `None` (and fires nothing) when no such
    /// attribute exists.
    pub fn edit_attribute(
        &mut self,
        id: NodeId,
        key: &str,
        value: impl Into<String>,
    ) -> DomResult<Option<String>> {
        let NodeKind::Entity { attributes, .. } = &mut self.slot_mut(id)?.kind else {
            return Ok(None);
        };
        let Some(attribute) = attributes.iter_mut().find(|a| a.key() == key) else {
            return Ok(None);
        };

        let value = value.into();
        let previous = attribute.replace_value(value.clone());

        trace!(node = %id, key, "attribute edited");
        self.notify(TreeEvent::AttributeEdited {
            node: id,
            key: key.to_string(),
            value,
        });
        Ok(Some(previous))
    }

    /// Detach the first attribute named `key`
    pub fn remove_attribute(&mut self, id: NodeId, key: &str) -> DomResult<Option<Attribute>> {
        match self.attribute_position(id, key)? {
            Some(index) => self.remove_attribute_at(id, index),
            None => Ok(None),
        }
    }

    /// Detach the attribute at `index`, if there is one
    pub fn remove_attribute_at(&mut self, id: NodeId, index: usize) -> DomResult<Option<Attribute>> {
        let NodeKind::Entity { attributes, .. } = &mut self.slot_mut(id)?.kind else {
            return Ok(None);
        };
        if index >= attributes.len() {
            return Ok(None);
        }
        let attribute = attributes.remove(index);

        trace!(node = %id, index, "attribute removed");
        self.notify(TreeEvent::AttributeRemoved {
            node: id,
            attribute: attribute.clone(),
        });
        Ok(Some(attribute))
    }

    // Structure

    /// Append a new container under `parent`
    pub fn add_child_entity(&mut self, parent: NodeId, name: impl Into<String>) -> DomResult<NodeId> {
        self.add_child(parent, name.into(), NodeKind::entity())
    }

    /// Append a new text leaf under `parent`
    pub fn add_child_text(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        text: impl Into<String>,
    ) -> DomResult<NodeId> {
        self.add_child(parent, name.into(), NodeKind::Text { text: text.into() })
    }

    fn add_child(&mut self, parent: NodeId, name: String, kind: NodeKind) -> DomResult<NodeId> {
        // Fail before allocating so a rejected call leaves no orphan slot
        self.children_mut(parent)?;

        let child = NodeId(self.arena.insert(Node::new(name, Some(parent), kind)));
        self.children_mut(parent)?.push(child);

        debug!(parent = %parent, child = %child, "child added");
        self.notify(TreeEvent::ChildAdded { parent, child });
        Ok(child)
    }

    /// Detach `id` and everything beneath it from its parent.
    ///
    /// The subtree stays in the arena, unchanged, so it can be handed back to
    /// [`Tree::reattach_subtree`].
    pub fn remove_subtree(&mut self, id: NodeId) -> DomResult<Detached> {
        if id == self.root {
            return Err(DomError::RootRemoval);
        }
        let parent = self.slot(id)?.parent.ok_or(DomError::NotAttached(id))?;

        let siblings = self.children_mut(parent)?;
        let index = siblings
            .iter()
            .position(|child| *child == id)
            .ok_or(DomError::NotAttached(id))?;
        siblings.remove(index);
        self.slot_mut(id)?.parent = None;

        debug!(parent = %parent, node = %id, index, "subtree removed");
        self.notify(TreeEvent::SubtreeRemoved { parent, node: id });
        Ok(Detached {
            node: id,
            parent,
            index,
        })
    }

    /// Attach a detached subtree under `parent` at `index` (clamped to the
    /// child count). Returns the position actually used.
    pub fn reattach_subtree(&mut self, parent: NodeId, node: NodeId, index: usize) -> DomResult<usize> {
        if self.slot(node)?.parent.is_some() {
            return Err(DomError::AlreadyAttached(node));
        }
        if node == self.root || self.is_ancestor(node, parent) {
            return Err(DomError::cycle(node, parent));
        }

        let children = self.children_mut(parent)?;
        let at = index.min(children.len());
        children.insert(at, node);
        self.slot_mut(node)?.parent = Some(parent);

        debug!(parent = %parent, node = %node, index = at, "subtree reattached");
        self.notify(TreeEvent::ChildAdded { parent, child: node });
        Ok(at)
    }

    /// Free a detached subtree. Attached nodes are left alone.
    ///
    /// Returns the number of nodes released.
    pub fn purge(&mut self, id: NodeId) -> usize {
        match self.arena.get(id.0) {
            Some(node) if node.parent.is_none() && id != self.root => {}
            _ => return 0,
        }

        let mut pending = vec![id];
        let mut released = 0;
        while let Some(next) = pending.pop() {
            if let Some(node) = self.arena.remove(next.0) {
                pending.extend_from_slice(node.children());
                released += 1;
            }
        }

        debug!(node = %id, released, "detached subtree purged");
        released
    }

    // Slot access

    fn slot(&self, id: NodeId) -> DomResult<&Node> {
        self.arena.get(id.0).ok_or(DomError::NodeNotFound(id))
    }

    fn slot_mut(&mut self, id: NodeId) -> DomResult<&mut Node> {
        self.arena.get_mut(id.0).ok_or(DomError::NodeNotFound(id))
    }

    fn children_mut(&mut self, id: NodeId) -> DomResult<&mut Vec<NodeId>> {
        match &mut self.slot_mut(id)?.kind {
            NodeKind::Entity { children, .. } => Ok(children),
            NodeKind::Text { .. } => Err(DomError::NotAContainer(id)),
        }
    }

    fn attributes_mut(&mut self, id: NodeId) -> DomResult<&mut Vec<Attribute>> {
        match &mut self.slot_mut(id)?.kind {
            NodeKind::Entity { attributes, .. } => Ok(attributes),
            NodeKind::Text { .. } => Err(DomError::NotAContainer(id)),
        }
    }
}

/// Iterator over a node and its ancestors
pub struct Ancestors<'a> {
    tree: &'a Tree,
    next: Option<NodeId>,
}

impl Iterator for Ancestors<'_> {
    type Item = NodeId;

    fn next(&mut self) -> Option<NodeId> {
        let current = self.next?;
        self.next = self.tree.arena.get(current.0).and_then(|n| n.parent);
        Some(current)
    }
}
