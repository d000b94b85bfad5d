//! # xmledit Editor
//!
//! Undoable editing on top of the xmledit tree.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────┐
//! │ EditSession: named edit operations          │
//! └─────────────────────────────────────────────┘
//!                     ↓ one Command per edit
//! ┌─────────────────────────────────────────────┐
//! │ UndoStack: run, record, undo, redo          │
//! │  - Bounded history (default 100 levels)     │
//! │  - Batches undone as one step               │
//! │  - Frees subtrees no entry can restore      │
//! └─────────────────────────────────────────────┘
//!                     ↓
//! ┌─────────────────────────────────────────────┐
//! │ tree: nodes, attributes, listeners          │
//! └─────────────────────────────────────────────┘
//! ```
//!
//! ## Usage
//!
//! ```rust
//! use xmledit_editor::{Document, EditSession};
//!
//! let mut session = EditSession::new(Document::new("books", "library"));
//! let root = session.root();
//!
//! let book = session.add_container(root, "book").unwrap();
//! session.set_attribute(book, "genre", "fantasy").unwrap();
//! session.add_leaf(book, "chapter1", "Once upon a time").unwrap();
//!
//! session.undo().unwrap();
//! assert!(session.find("chapter1").is_none());
//!
//! session.redo().unwrap();
//! assert!(session.document().serialize().contains("<chapter1> Once upon a time </chapter1>"));
//! ```

mod commands;
mod document;
mod errors;
mod session;
mod undo_stack;

pub use commands::{Command, CommandError, Placed};
pub use document::{Document, XML_HEADER};
pub use errors::EditorError;
pub use session::EditSession;
pub use undo_stack::{CommandBatch, UndoStack, DEFAULT_MAX_LEVELS};
