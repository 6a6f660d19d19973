use crate::Path;
use thiserror::Error;

pub type MutationResult<T> = Result<T, MutationError>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MutationError {
    #[error("Node not found: {0}")]
    NodeNotFound(Path),

    #[error("Parent not found: {0}")]
    ParentNotFound(Path),

    #[error("Would create cycle moving {from} into {to}")]
    CycleDetected { from: Path, to: Path },

    #[error("Offset {offset} is out of bounds for text at {path}")]
    OffsetOutOfBounds { path: Path, offset: usize },

    #[error("Cannot merge {0} into its previous sibling")]
    IncompatibleMerge(Path),

    #[error("Node at {0} is not an element")]
    NotAnElement(Path),

    #[error("Node at {0} is not text")]
    NotText(Path),

    #[error("Operation not applicable to the root")]
    RootPath,
}
