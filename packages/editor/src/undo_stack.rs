//! # Undo/Redo Stack
//!
//! Tracks command history and enables undo/redo operations.
//!
//! ## Design
//!
//! - Each command captures what it needs to invert itself while it runs
//! - Undo reverts the most recent entry and moves it to the redo stack
//! - Redo runs the command again, reusing what it captured
//! - New commands clear the redo stack
//! - Supports batched operations (group multiple commands as one undo step)
//! - Entries leaving history for good release detached subtrees they held
//!
//! ## Example
//!
//! ```rust
//! use xmledit_editor::{Command, UndoStack};
//! use xmledit_tree::Tree;
//!
//! let mut tree = Tree::new("library");
//! let mut stack = UndoStack::new();
//!
//! let root = tree.root();
//! stack.execute(&mut tree, Command::add_container(root, "book")).unwrap();
//! assert_eq!(tree.get(root).unwrap().children().len(), 1);
//!
//! stack.undo(&mut tree).unwrap();
//! assert!(tree.get(root).unwrap().children().is_empty());
//!
//! stack.redo(&mut tree).unwrap();
//! assert_eq!(tree.get(root).unwrap().children().len(), 1);
//! ```

use crate::commands::{Command, CommandError};
use tracing::{debug, instrument, warn};
use xmledit_tree::Tree;

/// Default number of undo levels kept
pub const DEFAULT_MAX_LEVELS: usize = 100;

/// A group of commands that should be undone/redone together
#[derive(Debug, Clone, Default)]
pub struct CommandBatch {
    /// The commands in this batch (in application order)
    pub commands: Vec<Command>,

    /// Optional description of this batch
    pub description: Option<String>,
}

impl CommandBatch {
    /// Add a description
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Undo every command, newest first. If one fails, the ones already
    /// undone are run again so the batch stays whole.
    fn undo(&mut self, tree: &mut Tree) -> Result<(), CommandError> {
        for i in (0..self.commands.len()).rev() {
            if let Err(error) = self.commands[i].undo(tree) {
                let rollback = self.commands[i + 1..]
                    .iter_mut()
                    .try_for_each(|command| command.run(tree));
                return Err(self.rolled_back(error, rollback));
            }
        }
        Ok(())
    }

    /// Run every command again, oldest first, rolling back on failure
    fn redo(&mut self, tree: &mut Tree) -> Result<(), CommandError> {
        for i in 0..self.commands.len() {
            if let Err(error) = self.commands[i].run(tree) {
                let rollback = self.commands[..i]
                    .iter_mut()
                    .rev()
                    .try_for_each(|command| command.undo(tree));
                return Err(self.rolled_back(error, rollback));
            }
        }
        Ok(())
    }

    fn rolled_back(&self, error: CommandError, rollback: Result<(), CommandError>) -> CommandError {
        match rollback {
            Ok(()) => error,
            Err(rollback) => {
                warn!(
                    description = ?self.description,
                    %error,
                    %rollback,
                    "batch rollback failed, dropping it from history"
                );
                CommandError::RollbackFailed {
                    error: Box::new(error),
                    rollback: Box::new(rollback),
                }
            }
        }
    }

    fn release(&self, tree: &mut Tree, undone: bool) -> usize {
        self.commands
            .iter()
            .map(|command| command.release(tree, undone))
            .sum()
    }
}

/// Undo/redo stack for document editing
#[derive(Debug)]
pub struct UndoStack {
    /// Stack of applied batches (most recent last)
    undo_stack: Vec<CommandBatch>,

    /// Stack of undone batches (most recent last)
    redo_stack: Vec<CommandBatch>,

    /// Maximum number of undo levels (0 = unlimited)
    max_levels: usize,

    /// When false, undone commands are dropped instead of kept for redo
    redo_enabled: bool,

    /// Currently building a batch
    current_batch: Option<CommandBatch>,
}

impl UndoStack {
    /// Create a new undo stack with default max levels (100)
    pub fn new() -> Self {
        Self::with_max_levels(DEFAULT_MAX_LEVELS)
    }

    /// Create an undo stack with custom max levels
    pub fn with_max_levels(max_levels: usize) -> Self {
        Self::with_options(max_levels, true)
    }

    pub fn with_options(max_levels: usize, redo_enabled: bool) -> Self {
        Self {
            undo_stack: Vec::new(),
            redo_stack: Vec::new(),
            max_levels,
            redo_enabled,
            current_batch: None,
        }
    }

    /// Run a command and record it for undo.
    ///
    /// A command that fails is not recorded and leaves history as it was.
    /// Returns the recorded command, with everything it captured.
    #[instrument(level = "debug", skip_all, fields(command = %command.description()))]
    pub fn execute(&mut self, tree: &mut Tree, mut command: Command) -> Result<&Command, CommandError> {
        command.run(tree)?;
        self.clear_redo(tree);

        if self.current_batch.is_none() {
            let batch = CommandBatch::default().with_description(command.description());
            self.push_batch(tree, batch);
        }

        let batch = match self.current_batch.as_mut() {
            Some(batch) => batch,
            None => self
                .undo_stack
                .last_mut()
                .ok_or_else(|| CommandError::NotExecuted(command.description()))?,
        };
        let index = batch.commands.len();
        batch.commands.push(command);
        Ok(&batch.commands[index])
    }

    /// Start a batch of commands (will be undone/redone together)
    pub fn begin_batch(&mut self) {
        if self.current_batch.is_none() {
            self.current_batch = Some(CommandBatch::default());
        }
    }

    /// End the current batch and push it to the undo stack
    pub fn end_batch(&mut self, tree: &mut Tree) {
        if let Some(mut batch) = self.current_batch.take() {
            if batch.commands.is_empty() {
                return;
            }
            if batch.description.is_none() {
                batch.description = match batch.commands.as_slice() {
                    [only] => Some(only.description()),
                    commands => Some(format!("{} edits", commands.len())),
                };
            }
            self.push_batch(tree, batch);
        }
    }

    /// Set description for current batch (if batching)
    pub fn set_batch_description(&mut self, description: impl Into<String>) {
        if let Some(batch) = &mut self.current_batch {
            batch.description = Some(description.into());
        }
    }

    pub fn is_batching(&self) -> bool {
        self.current_batch.is_some()
    }

    /// Push a batch to the undo stack
    fn push_batch(&mut self, tree: &mut Tree, batch: CommandBatch) {
        self.undo_stack.push(batch);
        self.trim(tree);
    }

    /// Drop the oldest entries beyond `max_levels`
    fn trim(&mut self, tree: &mut Tree) {
        if self.max_levels == 0 || self.undo_stack.len() <= self.max_levels {
            return;
        }
        let excess = self.undo_stack.len() - self.max_levels;
        for batch in self.undo_stack.drain(..excess) {
            let released = batch.release(tree, false);
            debug!(released, "history trimmed");
        }
    }

    fn clear_redo(&mut self, tree: &mut Tree) {
        for batch in self.redo_stack.drain(..) {
            batch.release(tree, true);
        }
    }

    /// Undo the most recent command/batch. An open batch is closed first.
    pub fn undo(&mut self, tree: &mut Tree) -> Result<bool, CommandError> {
        self.end_batch(tree);

        let Some(mut batch) = self.undo_stack.pop() else {
            return Ok(false); // Nothing to undo
        };
        if let Err(err) = batch.undo(tree) {
            if !matches!(err, CommandError::RollbackFailed { .. }) {
                self.undo_stack.push(batch);
            }
            return Err(err);
        }
        debug!(description = ?batch.description, "undo");

        if self.redo_enabled {
            self.redo_stack.push(batch);
        } else {
            batch.release(tree, true);
        }
        Ok(true)
    }

    /// Redo the most recently undone command/batch. An open batch is closed first.
    pub fn redo(&mut self, tree: &mut Tree) -> Result<bool, CommandError> {
        self.end_batch(tree);
        if !self.redo_enabled {
            return Ok(false);
        }

        let Some(mut batch) = self.redo_stack.pop() else {
            return Ok(false); // Nothing to redo
        };
        if let Err(err) = batch.redo(tree) {
            if !matches!(err, CommandError::RollbackFailed { .. }) {
                self.redo_stack.push(batch);
            }
            return Err(err);
        }
        debug!(description = ?batch.description, "redo");

        self.undo_stack.push(batch);
        Ok(true)
    }

    /// Check if undo is available
    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
            || self
                .current_batch
                .as_ref()
                .is_some_and(|batch| !batch.commands.is_empty())
    }

    /// Check if redo is available
    pub fn can_redo(&self) -> bool {
        self.redo_enabled && !self.redo_stack.is_empty()
    }

    /// Get the number of undo levels available
    pub fn undo_levels(&self) -> usize {
        self.undo_stack.len()
    }

    /// Get the number of redo levels available
    pub fn redo_levels(&self) -> usize {
        self.redo_stack.len()
    }

    pub fn max_levels(&self) -> usize {
        self.max_levels
    }

    pub fn redo_enabled(&self) -> bool {
        self.redo_enabled
    }

    /// Clear all undo/redo history, releasing every subtree it held
    pub fn clear(&mut self, tree: &mut Tree) {
        self.end_batch(tree);
        for batch in self.undo_stack.drain(..) {
            batch.release(tree, false);
        }
        self.clear_redo(tree);
    }

    /// Get description of the next undo operation
    pub fn undo_description(&self) -> Option<&str> {
        self.undo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }

    /// Get description of the next redo operation
    pub fn redo_description(&self) -> Option<&str> {
        self.redo_stack
            .last()
            .and_then(|batch| batch.description.as_deref())
    }
}

impl Default for UndoStack {
    fn default() -> Self {
        Self::new()
    }
}
