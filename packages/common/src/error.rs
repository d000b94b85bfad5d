use thiserror::Error;
use xmledit_tree::DomError;

/// Error type shared by the tree algorithms and the generator
#[derive(Error, Debug)]
pub enum CommonError {
    #[error("Tree error: {0}")]
    Dom(#[from] DomError),

    #[error("No identifier field among {0}")]
    MissingIdentifier(String),

    #[error("Text node '{0}' cannot be a document root")]
    TextRoot(String),
}
