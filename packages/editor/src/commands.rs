//! # Commands
//!
//! Reversible edits on a [`Tree`].
//!
//! ## Semantics
//!
//! ### Add (container or leaf)
//! - First run creates the node and records where it landed
//! - Undo detaches it; the subtree stays in the arena
//! - Redo reattaches the *same* node at the recorded position
//!
//! ### RemoveSubtree
//! - Detaches the node with all descendants
//! - Undo puts it back under the same parent at the same position
//!
//! ### Attributes
//! - Add remembers the position it appended to
//! - Edit remembers the previous value (or that there was nothing to edit)
//! - Remove remembers the detached attribute and its position
//!
//! Every command targets nodes that are attached to the document; edits on
//! detached subtrees are rejected before anything changes.

use thiserror::Error;
use tracing::trace;
use xmledit_tree::{Attribute, Detached, DomError, NodeId, Tree};

#[derive(Error, Debug, Clone, PartialEq)]
pub enum CommandError {
    #[error("Tree error: {0}")]
    Dom(#[from] DomError),

    #[error("Node {0} is not part of the document")]
    Detached(NodeId),

    #[error("Cannot undo a command that never ran: {0}")]
    NotExecuted(String),

    /// A batch failed part-way and putting back the commands already
    /// applied failed too; the tree is left partly reverted.
    #[error("{error} (rollback also failed: {rollback})")]
    RollbackFailed {
        error: Box<CommandError>,
        rollback: Box<CommandError>,
    },
}

/// Where a created node was placed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placed {
    pub node: NodeId,
    pub index: usize,
}

/// A reversible unit of work
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    AddContainer {
        parent: NodeId,
        name: String,
        created: Option<Placed>,
    },
    AddLeaf {
        parent: NodeId,
        name: String,
        text: String,
        created: Option<Placed>,
    },
    RemoveSubtree {
        node: NodeId,
        removed: Option<Detached>,
    },
    Rename {
        node: NodeId,
        name: String,
        previous: Option<String>,
    },
    AddAttribute {
        node: NodeId,
        key: String,
        value: String,
        index: Option<usize>,
    },
    EditAttribute {
        node: NodeId,
        key: String,
        value: String,
        /// Outer `None` until run; inner `None` when the key was absent
        previous: Option<Option<String>>,
    },
    RemoveAttribute {
        node: NodeId,
        key: String,
        /// Outer `None` until run; inner `None` when the key was absent
        removed: Option<Option<(usize, Attribute)>>,
    },
}

impl Command {
    pub fn add_container(parent: NodeId, name: impl Into<String>) -> Self {
        Command::AddContainer {
            parent,
            name: name.into(),
            created: None,
        }
    }

    pub fn add_leaf(parent: NodeId, name: impl Into<String>, text: impl Into<String>) -> Self {
        Command::AddLeaf {
            parent,
            name: name.into(),
            text: text.into(),
            created: None,
        }
    }

    pub fn remove_subtree(node: NodeId) -> Self {
        Command::RemoveSubtree { node, removed: None }
    }

    pub fn rename(node: NodeId, name: impl Into<String>) -> Self {
        Command::Rename {
            node,
            name: name.into(),
            previous: None,
        }
    }

    pub fn add_attribute(node: NodeId, key: impl Into<String>, value: impl Into<String>) -> Self {
        Command::AddAttribute {
            node,
            key: key.into(),
            value: value.into(),
            index: None,
        }
    }

    pub fn edit_attribute(node: NodeId, key: impl Into<String>, value: impl Into<String>) -> Self {
        Command::EditAttribute {
            node,
            key: key.into(),
            value: value.into(),
            previous: None,
        }
    }

    pub fn remove_attribute(node: NodeId, key: impl Into<String>) -> Self {
        Command::RemoveAttribute {
            node,
            key: key.into(),
            removed: None,
        }
    }

    /// The node the command acts on (the parent, for additions)
    pub fn target(&self) -> NodeId {
        match self {
            Command::AddContainer { parent, .. } | Command::AddLeaf { parent, .. } => *parent,
            Command::RemoveSubtree { node, .. }
            | Command::Rename { node, .. }
            | Command::AddAttribute { node, .. }
            | Command::EditAttribute { node, .. }
            | Command::RemoveAttribute { node, .. } => *node,
        }
    }

    /// Human-readable summary, used for history labels
    pub fn description(&self) -> String {
        match self {
            Command::AddContainer { name, .. } => format!("Add container '{name}'"),
            Command::AddLeaf { name, .. } => format!("Add leaf '{name}'"),
            Command::RemoveSubtree { node, .. } => format!("Remove node {node}"),
            Command::Rename { name, .. } => format!("Rename to '{name}'"),
            Command::AddAttribute { key, value, .. } => format!("Set {key}='{value}'"),
            Command::EditAttribute { key, value, .. } => format!("Edit {key}='{value}'"),
            Command::RemoveAttribute { key, .. } => format!("Remove attribute '{key}'"),
        }
    }

    /// Apply the command. A failed run leaves the tree untouched.
    pub fn run(&mut self, tree: &mut Tree) -> Result<(), CommandError> {
        let target = self.target();
        tree.node(target)?;
        if !tree.is_attached(target) {
            return Err(CommandError::Detached(target));
        }
        trace!(command = %self.description(), target = %target, "run");

        match self {
            Command::AddContainer {
                parent,
                name,
                created,
            } => {
                let placed = match created {
                    Some(placed) => reattach(tree, *parent, *placed)?,
                    None => {
                        let node = tree.add_child_entity(*parent, name.as_str())?;
                        placed_under(tree, *parent, node)
                    }
                };
                *created = Some(placed);
            }
            Command::AddLeaf {
                parent,
                name,
                text,
                created,
            } => {
                let placed = match created {
                    Some(placed) => reattach(tree, *parent, *placed)?,
                    None => {
                        let node = tree.add_child_text(*parent, name.as_str(), text.as_str())?;
                        placed_under(tree, *parent, node)
                    }
                };
                *created = Some(placed);
            }
            Command::RemoveSubtree { node, removed } => {
                *removed = Some(tree.remove_subtree(*node)?);
            }
            Command::Rename {
                node,
                name,
                previous,
            } => {
                *previous = Some(tree.rename(*node, name.as_str())?);
            }
            Command::AddAttribute {
                node,
                key,
                value,
                index,
            } => {
                let at = tree.node(*node)?.attributes().len();
                tree.insert_attribute(*node, at, Attribute::new(key.as_str(), value.as_str()))?;
                *index = Some(at);
            }
            Command::EditAttribute {
                node,
                key,
                value,
                previous,
            } => {
                *previous = Some(tree.edit_attribute(*node, key, value.as_str())?);
            }
            Command::RemoveAttribute { node, key, removed } => {
                let position = tree.attribute_position(*node, key)?;
                let detached = match position {
                    Some(index) => tree
                        .remove_attribute_at(*node, index)?
                        .map(|attribute| (index, attribute)),
                    None => None,
                };
                *removed = Some(detached);
            }
        }
        Ok(())
    }

    /// Reverse a previous [`Command::run`]
    pub fn undo(&mut self, tree: &mut Tree) -> Result<(), CommandError> {
        if !self.has_run() {
            return Err(CommandError::NotExecuted(self.description()));
        }
        trace!(command = %self.description(), "undo");

        match self {
            Command::AddContainer { created, .. } | Command::AddLeaf { created, .. } => {
                if let Some(placed) = created {
                    let detached = tree.remove_subtree(placed.node)?;
                    // Position may have shifted since the node was created
                    placed.index = detached.index;
                }
            }
            Command::RemoveSubtree { removed, .. } => {
                if let Some(detached) = removed {
                    tree.reattach_subtree(detached.parent, detached.node, detached.index)?;
                }
            }
            Command::Rename { node, previous, .. } => {
                if let Some(name) = previous {
                    tree.rename(*node, name.as_str())?;
                }
            }
            Command::AddAttribute { node, index, .. } => {
                if let Some(at) = index {
                    tree.remove_attribute_at(*node, *at)?;
                }
            }
            Command::EditAttribute {
                node, key, previous, ..
            } => {
                if let Some(Some(value)) = previous {
                    tree.edit_attribute(*node, key, value.as_str())?;
                }
            }
            Command::RemoveAttribute { node, removed, .. } => {
                if let Some(Some((index, attribute))) = removed {
                    tree.insert_attribute(*node, *index, attribute.clone())?;
                }
            }
        }
        Ok(())
    }

    /// True once [`Command::run`] has succeeded at least once
    pub fn has_run(&self) -> bool {
        match self {
            Command::AddContainer { created, .. } | Command::AddLeaf { created, .. } => {
                created.is_some()
            }
            Command::RemoveSubtree { removed, .. } => removed.is_some(),
            Command::Rename { previous, .. } => previous.is_some(),
            Command::AddAttribute { index, .. } => index.is_some(),
            Command::EditAttribute { previous, .. } => previous.is_some(),
            Command::RemoveAttribute { removed, .. } => removed.is_some(),
        }
    }

    /// Free any detached subtree that only this command could bring back.
    ///
    /// `undone` says whether the command leaves history from the redo side
    /// (its effect is currently reverted) or from the undo side. Returns the
    /// number of nodes freed.
    pub fn release(&self, tree: &mut Tree, undone: bool) -> usize {
        match (self, undone) {
            (Command::AddContainer { created: Some(placed), .. }, true)
            | (Command::AddLeaf { created: Some(placed), .. }, true) => tree.purge(placed.node),
            (Command::RemoveSubtree { removed: Some(detached), .. }, false) => {
                tree.purge(detached.node)
            }
            _ => 0,
        }
    }

    /// Node created by an add command that has run
    pub fn created_node(&self) -> Option<NodeId> {
        match self {
            Command::AddContainer { created, .. } | Command::AddLeaf { created, .. } => {
                created.map(|placed| placed.node)
            }
            _ => None,
        }
    }

    /// Where a remove command detached its subtree from
    pub fn detached(&self) -> Option<Detached> {
        match self {
            Command::RemoveSubtree { removed, .. } => *removed,
            _ => None,
        }
    }

    /// Name a rename replaced
    pub fn previous_name(&self) -> Option<&str> {
        match self {
            Command::Rename { previous, .. } => previous.as_deref(),
            _ => None,
        }
    }

    /// Value an attribute edit replaced, if the key was present
    pub fn previous_value(&self) -> Option<&str> {
        match self {
            Command::EditAttribute {
                previous: Some(previous),
                ..
            } => previous.as_deref(),
            _ => None,
        }
    }

    /// Attribute a remove command detached, if the key was present
    pub fn removed_attribute(&self) -> Option<&Attribute> {
        match self {
            Command::RemoveAttribute {
                removed: Some(Some((_, attribute))),
                ..
            } => Some(attribute),
            _ => None,
        }
    }
}

fn reattach(tree: &mut Tree, parent: NodeId, placed: Placed) -> Result<Placed, CommandError> {
    let index = tree.reattach_subtree(parent, placed.node, placed.index)?;
    Ok(Placed {
        node: placed.node,
        index,
    })
}

/// Position of a freshly appended child. A listener may have appended more
/// siblings after it, so look it up rather than assume the last slot.
fn placed_under(tree: &Tree, parent: NodeId, node: NodeId) -> Placed {
    let index = tree
        .get(parent)
        .and_then(|p| p.children().iter().position(|c| *c == node))
        .unwrap_or_default();
    Placed { node, index }
}
