//! JSON-lines edit scripts
//!
//! One operation per line, tagged by `op`:
//!
//! ```text
//! {"op": "add_container", "parent": "library", "name": "book"}
//! {"op": "set_attribute", "node": "book", "key": "genre", "value": "fantasy"}
//! {"op": "undo"}
//! ```
//!
//! Nodes are addressed by name; the first match in document order wins.
//! Blank lines and lines starting with `#` are skipped.

use anyhow::{anyhow, Context, Result};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use std::io::Write;
use tracing::debug;
use xmledit_editor::EditSession;
use xmledit_tree::{Attribute, NodeId, NodeRef};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum ScriptOp {
    AddContainer {
        parent: String,
        name: String,
    },
    AddLeaf {
        parent: String,
        name: String,
        text: String,
    },
    Rename {
        node: String,
        name: String,
    },
    SetAttribute {
        node: String,
        key: String,
        value: String,
    },
    EditAttribute {
        node: String,
        key: String,
        value: String,
    },
    RemoveAttribute {
        node: String,
        key: String,
    },
    Delete {
        node: String,
    },
    Undo,
    Redo,
    Print,
    Find {
        name: String,
    },
    BeginBatch {
        #[serde(default)]
        description: Option<String>,
    },
    EndBatch,
}

/// Parse a whole script, reporting the line of the first bad entry
pub fn parse_script(source: &str) -> Result<Vec<ScriptOp>> {
    source
        .lines()
        .enumerate()
        .map(|(i, line)| (i + 1, line.trim()))
        .filter(|(_, line)| !line.is_empty() && !line.starts_with('#'))
        .map(|(number, line)| {
            serde_json::from_str(line).with_context(|| format!("line {number}: invalid operation"))
        })
        .collect()
}

/// What `find` reports about a node
#[derive(Debug, Serialize)]
pub struct NodeSummary<'a> {
    pub name: &'a str,
    pub kind: &'static str,
    pub depth: usize,
    pub attributes: &'a [Attribute],
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<&'a str>,
    pub children: usize,
}

impl<'a> NodeSummary<'a> {
    fn new(node: NodeRef<'a>, depth: usize) -> Self {
        Self {
            name: node.name(),
            kind: if node.is_text() { "text" } else { "container" },
            depth,
            attributes: node.attributes(),
            text: node.text(),
            children: node.children().len(),
        }
    }
}

/// Replays script operations against a session
pub struct ScriptRunner<'s, W: Write> {
    session: &'s mut EditSession,
    out: W,
    quiet: bool,
}

impl<'s, W: Write> ScriptRunner<'s, W> {
    pub fn new(session: &'s mut EditSession, out: W, quiet: bool) -> Self {
        Self {
            session,
            out,
            quiet,
        }
    }

    pub fn run_all(&mut self, ops: &[ScriptOp]) -> Result<()> {
        for (i, op) in ops.iter().enumerate() {
            self.run(op)
                .with_context(|| format!("operation {} ({})", i + 1, op_name(op)))?;
        }
        self.session.end_batch();
        Ok(())
    }

    pub fn run(&mut self, op: &ScriptOp) -> Result<()> {
        debug!(?op, "script op");

        match op {
            ScriptOp::AddContainer { parent, name } => {
                let parent = self.resolve(parent)?;
                self.session.add_container(parent, name.as_str())?;
            }
            ScriptOp::AddLeaf { parent, name, text } => {
                let parent = self.resolve(parent)?;
                self.session.add_leaf(parent, name.as_str(), text.as_str())?;
            }
            ScriptOp::Rename { node, name } => {
                let node = self.resolve(node)?;
                self.session.rename(node, name.as_str())?;
            }
            ScriptOp::SetAttribute { node, key, value } => {
                let node = self.resolve(node)?;
                self.session.set_attribute(node, key.as_str(), value.as_str())?;
            }
            ScriptOp::EditAttribute { node, key, value } => {
                let id = self.resolve(node)?;
                if self.session.edit_attribute(id, key.as_str(), value.as_str())?.is_none() {
                    self.note(&format!("{node} has no attribute '{key}'"))?;
                }
            }
            ScriptOp::RemoveAttribute { node, key } => {
                let id = self.resolve(node)?;
                if self.session.remove_attribute(id, key.as_str())?.is_none() {
                    self.note(&format!("{node} has no attribute '{key}'"))?;
                }
            }
            ScriptOp::Delete { node } => {
                let node = self.resolve(node)?;
                self.session.delete(node)?;
            }
            ScriptOp::Undo => {
                if !self.session.undo()? {
                    self.note("nothing to undo")?;
                }
            }
            ScriptOp::Redo => {
                if !self.session.redo()? {
                    self.note("nothing to redo")?;
                }
            }
            ScriptOp::Print => {
                write!(self.out, "{}", self.session.document())?;
            }
            ScriptOp::Find { name } => {
                let json = match self.session.find(name) {
                    Some(id) => self.summary_json(id)?,
                    None => "null".to_string(),
                };
                writeln!(self.out, "{json}")?;
            }
            ScriptOp::BeginBatch { description } => {
                self.session.begin_batch(description.as_deref());
            }
            ScriptOp::EndBatch => self.session.end_batch(),
        }
        Ok(())
    }

    fn resolve(&self, name: &str) -> Result<NodeId> {
        self.session
            .find(name)
            .ok_or_else(|| anyhow!("no node named '{name}'"))
    }

    fn summary_json(&self, id: NodeId) -> Result<String> {
        let tree = self.session.document().tree();
        let node = tree.node(id)?;
        let depth = tree.depth(id).unwrap_or_default();
        Ok(serde_json::to_string(&NodeSummary::new(node, depth))?)
    }

    fn note(&mut self, message: &str) -> Result<()> {
        if !self.quiet {
            writeln!(self.out, "{} {}", "note:".yellow(), message)?;
        }
        Ok(())
    }
}

fn op_name(op: &ScriptOp) -> &'static str {
    match op {
        ScriptOp::AddContainer { .. } => "add_container",
        ScriptOp::AddLeaf { .. } => "add_leaf",
        ScriptOp::Rename { .. } => "rename",
        ScriptOp::SetAttribute { .. } => "set_attribute",
        ScriptOp::EditAttribute { .. } => "edit_attribute",
        ScriptOp::RemoveAttribute { .. } => "remove_attribute",
        ScriptOp::Delete { .. } => "delete",
        ScriptOp::Undo => "undo",
        ScriptOp::Redo => "redo",
        ScriptOp::Print => "print",
        ScriptOp::Find { .. } => "find",
        ScriptOp::BeginBatch { .. } => "begin_batch",
        ScriptOp::EndBatch => "end_batch",
    }
}
