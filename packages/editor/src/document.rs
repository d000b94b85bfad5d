//! # Document Handle
//!
//! A named tree plus the operations that read it as a whole: lookup,
//! filtering into a new document, and serialization with the XML header.
//!
//! ## Lifecycle
//!
//! ```text
//! Construct → Edit (EditSession) → Serialize → Print / Save
//!     ↓             ↓                  ↓
//!   Tree        Commands            String
//! ```

use crate::errors::EditorError;
use std::fmt;
use std::io::Write;
use std::path::Path;
use tracing::{debug, instrument};
use xmledit_common::{filter, find_by_name, serialize};
use xmledit_tree::{NodeId, NodeRef, Tree};

/// First line of every serialized document
pub const XML_HEADER: &str = "<?xml version='1.0' encoding='UTF-8'?>";

/// Editable XML-like document
#[derive(Debug)]
pub struct Document {
    name: String,

    /// Number of edits applied, undo and redo included
    pub version: u64,

    tree: Tree,
}

impl Document {
    /// Create a document holding only a root container
    pub fn new(name: impl Into<String>, root_name: impl Into<String>) -> Self {
        Self::from_tree(name, Tree::new(root_name))
    }

    /// Wrap an existing tree
    pub fn from_tree(name: impl Into<String>, tree: Tree) -> Self {
        Self {
            name: name.into(),
            version: 0,
            tree,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn root(&self) -> NodeId {
        self.tree.root()
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    /// Direct access for construction and listener registration. Changes made
    /// here bypass history and cannot be undone.
    pub fn tree_mut(&mut self) -> &mut Tree {
        &mut self.tree
    }

    pub fn into_tree(self) -> Tree {
        self.tree
    }

    /// First node named `name`, in document order
    pub fn find_by_name(&self, name: &str) -> Option<NodeId> {
        find_by_name(&self.tree, self.tree.root(), name)
    }

    /// New document with only the nodes accepted by `predicate`, named
    /// `<name>-filtered`. `None` when no container survives.
    #[instrument(level = "debug", skip(self, predicate), fields(document = %self.name))]
    pub fn filter<F>(&self, predicate: F) -> Option<Document>
    where
        F: FnMut(NodeRef<'_>) -> bool,
    {
        let tree = filter(&self.tree, self.tree.root(), predicate)?;
        debug!(kept = tree.len(), "filtered");
        Some(Document::from_tree(format!("{}-filtered", self.name), tree))
    }

    /// Header line followed by the serialized tree
    pub fn serialize(&self) -> String {
        format!("{XML_HEADER}\n{}", serialize(&self.tree, self.tree.root()))
    }

    /// Print the serialized document to stdout
    pub fn print(&self) {
        print!("{}", self.serialize());
    }

    pub fn write_to(&self, mut writer: impl Write) -> Result<(), EditorError> {
        writer.write_all(self.serialize().as_bytes())?;
        Ok(())
    }

    /// Write the serialized document to `path`
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), EditorError> {
        std::fs::write(path, self.serialize())?;
        Ok(())
    }
}

impl fmt::Display for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.serialize())
    }
}
