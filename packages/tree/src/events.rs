//! # Notification Channel
//!
//! Every node carries an ordered list of listeners. Mutations on the tree
//! complete first, then fire exactly one event to the listeners of the node
//! that changed. A new child is announced to its parent; a removed subtree is
//! announced to its own head and then to its former parent. A listener
//! subscribed on both hears the removal once.
//!
//! Delivery iterates over a snapshot of the listener list, so a listener may
//! subscribe, unsubscribe or edit the tree from inside a hook without
//! disturbing the delivery in progress.

use crate::{Attribute, NodeId, Tree};
use std::rc::Rc;

/// Shared handle to a listener. Identity is pointer identity.
pub type ListenerHandle = Rc<dyn NodeListener>;

/// Capability set of a tree observer.
///
/// All hooks default to no-ops. Each hook receives the tree so the listener
/// can read, or re-enter and mutate, the model.
pub trait NodeListener {
    fn on_renamed(&self, _tree: &mut Tree, _node: NodeId, _new_name: &str) {}

    fn on_attribute_set(&self, _tree: &mut Tree, _node: NodeId, _key: &str, _value: &str) {}

    fn on_attribute_edited(&self, _tree: &mut Tree, _node: NodeId, _key: &str, _new_value: &str) {}

    fn on_attribute_removed(&self, _tree: &mut Tree, _node: NodeId, _attribute: &Attribute) {}

    fn on_child_added(&self, _tree: &mut Tree, _parent: NodeId, _child: NodeId) {}

    fn on_subtree_removed(&self, _tree: &mut Tree, _parent: NodeId, _node: NodeId) {}
}

/// A change that has already been applied to the tree
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TreeEvent {
    Renamed {
        node: NodeId,
        name: String,
    },
    AttributeSet {
        node: NodeId,
        key: String,
        value: String,
    },
    AttributeEdited {
        node: NodeId,
        key: String,
        value: String,
    },
    AttributeRemoved {
        node: NodeId,
        attribute: Attribute,
    },
    ChildAdded {
        parent: NodeId,
        child: NodeId,
    },
    SubtreeRemoved {
        parent: NodeId,
        node: NodeId,
    },
}

impl TreeEvent {
    /// Nodes whose listeners receive this event, in delivery order.
    ///
    /// A removed subtree hears about its own removal before its former
    /// parent does.
    pub fn audience(&self) -> Vec<NodeId> {
        match self {
            TreeEvent::Renamed { node, .. }
            | TreeEvent::AttributeSet { node, .. }
            | TreeEvent::AttributeEdited { node, .. }
            | TreeEvent::AttributeRemoved { node, .. } => vec![*node],
            TreeEvent::ChildAdded { parent, .. } => vec![*parent],
            TreeEvent::SubtreeRemoved { parent, node } => vec![*node, *parent],
        }
    }

    pub(crate) fn deliver(&self, listener: &dyn NodeListener, tree: &mut Tree) {
        match self {
            TreeEvent::Renamed { node, name } => listener.on_renamed(tree, *node, name),
            TreeEvent::AttributeSet { node, key, value } => {
                listener.on_attribute_set(tree, *node, key, value)
            }
            TreeEvent::AttributeEdited { node, key, value } => {
                listener.on_attribute_edited(tree, *node, key, value)
            }
            TreeEvent::AttributeRemoved { node, attribute } => {
                listener.on_attribute_removed(tree, *node, attribute)
            }
            TreeEvent::ChildAdded { parent, child } => {
                listener.on_child_added(tree, *parent, *child)
            }
            TreeEvent::SubtreeRemoved { parent, node } => {
                listener.on_subtree_removed(tree, *parent, *node)
            }
        }
    }
}

/// Ordered, duplicate-free listener list
pub(crate) fn insert_listener(listeners: &mut Vec<ListenerHandle>, listener: ListenerHandle) -> bool {
    if listeners.iter().any(|l| same_listener(l, &listener)) {
        return false;
    }
    listeners.push(listener);
    true
}

pub(crate) fn remove_listener(listeners: &mut Vec<ListenerHandle>, listener: &ListenerHandle) -> bool {
    let before = listeners.len();
    listeners.retain(|l| !same_listener(l, listener));
    listeners.len() != before
}

fn same_listener(a: &ListenerHandle, b: &ListenerHandle) -> bool {
    std::ptr::addr_eq(Rc::as_ptr(a), Rc::as_ptr(b))
}

/// Listener that records every event it receives, in order.
///
/// Useful for presentation layers that batch redraws and for tests.
#[derive(Debug, Default)]
pub struct EventLog {
    events: std::cell::RefCell<Vec<TreeEvent>>,
}

impl EventLog {
    pub fn new() -> Rc<Self> {
        Rc::new(Self::default())
    }

    pub fn events(&self) -> Vec<TreeEvent> {
        self.events.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.events.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.borrow().is_empty()
    }

    pub fn clear(&self) {
        self.events.borrow_mut().clear();
    }

    fn record(&self, event: TreeEvent) {
        self.events.borrow_mut().push(event);
    }
}

impl NodeListener for EventLog {
    fn on_renamed(&self, _tree: &mut Tree, node: NodeId, new_name: &str) {
        self.record(TreeEvent::Renamed {
            node,
            name: new_name.to_string(),
        });
    }

    fn on_attribute_set(&self, _tree: &mut Tree, node: NodeId, key: &str, value: &str) {
        self.record(TreeEvent::AttributeSet {
            node,
            key: key.to_string(),
            value: value.to_string(),
        });
    }

    fn on_attribute_edited(&self, _tree: &mut Tree, node: NodeId, key: &str, new_value: &str) {
        self.record(TreeEvent::AttributeEdited {
            node,
            key: key.to_string(),
            value: new_value.to_string(),
        });
    }

    fn on_attribute_removed(&self, _tree: &mut Tree, node: NodeId, attribute: &Attribute) {
        self.record(TreeEvent::AttributeRemoved {
            node,
            attribute: attribute.clone(),
        });
    }

    fn on_child_added(&self, _tree: &mut Tree, parent: NodeId, child: NodeId) {
        self.record(TreeEvent::ChildAdded { parent, child });
    }

    fn on_subtree_removed(&self, _tree: &mut Tree, parent: NodeId, node: NodeId) {
        self.record(TreeEvent::SubtreeRemoved { parent, node });
    }
}
