//! # xmledit tree
//!
//! In-memory node model for xmledit documents: containers (entities) holding
//! ordered children and attributes, text leaves, and the per-node listener
//! channel through which every change is announced.

pub mod error;
pub mod events;
pub mod node;
pub mod tree;

pub use error::{DomError, DomResult};
pub use events::{EventLog, ListenerHandle, NodeListener, TreeEvent};
pub use node::{Attribute, NodeId, NodeKind, NodeRef};
pub use tree::{Ancestors, Detached, Tree};
