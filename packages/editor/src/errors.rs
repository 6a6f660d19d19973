//! Error types for the editor

use scribe_model::{MutationError, Path};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EditorError {
    #[error("Parse error: {0}")]
    Parse(#[from] scribe_parser::ParseError),

    #[error("Mutation error: {0}")]
    Mutation(#[from] MutationError),

    #[error("No node at path {0}")]
    NodeNotFound(Path),

    #[error("Cannot lift node at {0}: it has no parent element")]
    CannotLift(Path),

    #[error("Invalid hotkey '{0}'")]
    InvalidHotkey(String),

    #[error("Editor is not mounted")]
    NotMounted,
}

pub type EditorResult<T> = Result<T, EditorError>;
