//! # Edit Session
//!
//! The single entry point for undoable edits. Each method wraps one
//! [`Command`] and hands it to the session's [`UndoStack`]; nothing here
//! touches the tree directly.

use crate::commands::{Command, CommandError};
use crate::document::Document;
use crate::errors::EditorError;
use crate::undo_stack::UndoStack;
use xmledit_tree::{Attribute, Detached, ListenerHandle, NodeId};

/// A document together with its edit history
pub struct EditSession {
    /// Document being edited
    document: Document,

    history: UndoStack,
}

impl EditSession {
    /// Create new edit session with default history settings
    pub fn new(document: Document) -> Self {
        Self::with_history(document, UndoStack::new())
    }

    pub fn with_history(document: Document, history: UndoStack) -> Self {
        Self { document, history }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn history(&self) -> &UndoStack {
        &self.history
    }

    pub fn root(&self) -> NodeId {
        self.document.root()
    }

    /// First node named `name`, in document order
    pub fn find(&self, name: &str) -> Option<NodeId> {
        self.document.find_by_name(name)
    }

    /// Register a listener on `node`. Returns false if it was already registered.
    pub fn subscribe(&mut self, node: NodeId, listener: ListenerHandle) -> Result<bool, EditorError> {
        Ok(self.document.tree_mut().subscribe(node, listener)?)
    }

    pub fn unsubscribe(&mut self, node: NodeId, listener: &ListenerHandle) -> Result<bool, EditorError> {
        Ok(self.document.tree_mut().unsubscribe(node, listener)?)
    }

    /// Append a new container under `parent`
    pub fn add_container(&mut self, parent: NodeId, name: impl Into<String>) -> Result<NodeId, EditorError> {
        let command = self.execute(Command::add_container(parent, name))?;
        Ok(command.created_node().ok_or_else(|| not_recorded(command))?)
    }

    /// Append a new text leaf under `parent`
    pub fn add_leaf(
        &mut self,
        parent: NodeId,
        name: impl Into<String>,
        text: impl Into<String>,
    ) -> Result<NodeId, EditorError> {
        let command = self.execute(Command::add_leaf(parent, name, text))?;
        Ok(command.created_node().ok_or_else(|| not_recorded(command))?)
    }

    /// Rename `node`, returning its previous name
    pub fn rename(&mut self, node: NodeId, name: impl Into<String>) -> Result<String, EditorError> {
        let command = self.execute(Command::rename(node, name))?;
        let previous = command.previous_name().ok_or_else(|| not_recorded(command))?;
        Ok(previous.to_string())
    }

    /// Append an attribute to `node`
    pub fn set_attribute(
        &mut self,
        node: NodeId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<(), EditorError> {
        self.execute(Command::add_attribute(node, key, value))?;
        Ok(())
    }

    /// Change the first attribute named `key`. Returns the replaced value, or
    /// `None` when `node` has no such attribute (the no-op is still recorded).
    pub fn edit_attribute(
        &mut self,
        node: NodeId,
        key: impl Into<String>,
        value: impl Into<String>,
    ) -> Result<Option<String>, EditorError> {
        let command = self.execute(Command::edit_attribute(node, key, value))?;
        Ok(command.previous_value().map(str::to_string))
    }

    /// Remove the first attribute named `key`, if any
    pub fn remove_attribute(
        &mut self,
        node: NodeId,
        key: impl Into<String>,
    ) -> Result<Option<Attribute>, EditorError> {
        let command = self.execute(Command::remove_attribute(node, key))?;
        Ok(command.removed_attribute().cloned())
    }

    /// Remove `node` and everything beneath it
    pub fn delete(&mut self, node: NodeId) -> Result<Detached, EditorError> {
        let command = self.execute(Command::remove_subtree(node))?;
        Ok(command.detached().ok_or_else(|| not_recorded(command))?)
    }

    pub fn undo(&mut self) -> Result<bool, EditorError> {
        let undone = self.history.undo(self.document.tree_mut())?;
        if undone {
            self.document.version += 1;
        }
        Ok(undone)
    }

    pub fn redo(&mut self) -> Result<bool, EditorError> {
        let redone = self.history.redo(self.document.tree_mut())?;
        if redone {
            self.document.version += 1;
        }
        Ok(redone)
    }

    /// Group the following edits into one undo step
    pub fn begin_batch(&mut self, description: Option<&str>) {
        self.history.begin_batch();
        if let Some(description) = description {
            self.history.set_batch_description(description);
        }
    }

    pub fn end_batch(&mut self) {
        self.history.end_batch(self.document.tree_mut());
    }

    /// Drop all history, freeing detached subtrees it kept alive
    pub fn clear_history(&mut self) {
        self.history.clear(self.document.tree_mut());
    }

    /// Close any open batch and hand back the document
    pub fn into_document(mut self) -> Document {
        self.end_batch();
        self.document
    }

    fn execute(&mut self, command: Command) -> Result<&Command, CommandError> {
        let command = self.history.execute(self.document.tree_mut(), command)?;
        self.document.version += 1;
        Ok(command)
    }
}

fn not_recorded(command: &Command) -> CommandError {
    CommandError::NotExecuted(command.description())
}
