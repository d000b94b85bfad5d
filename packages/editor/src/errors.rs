//! Error types for the editor

use crate::commands::CommandError;
use thiserror::Error;
use xmledit_tree::DomError;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Command error: {0}")]
    Command(#[from] CommandError),

    #[error("Tree error: {0}")]
    Dom(#[from] DomError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
