use thiserror::Error;

use crate::re::matcher::GroupId;

/// Errors returned by this crate.
#[derive(Error, Debug)]
pub enum Error {
    /// The pattern is not valid.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// A group name that is not declared by the pattern.
    #[error("unknown group: \"{0}\"")]
    UnknownGroup(String),

    /// A numeric group id that doesn't correspond to any group or
    /// pseudo-group.
    #[error("illegal group id: {0}")]
    IllegalGroupId(i32),

    /// The group didn't participate in the current match.
    #[error("group {0} is not assigned")]
    Unassigned(GroupId),

    #[error("index {index} is out of bounds for a group of length {len}")]
    OutOfBounds { index: usize, len: usize },

    /// The sink a replacement was being written to failed.
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Error produced while compiling a pattern.
///
/// Contains a human-readable description of the problem and the offset,
/// in characters, within the pattern where it was detected.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{message} at offset {offset}")]
pub struct SyntaxError {
    message: String,
    offset: usize,
}

impl SyntaxError {
    pub(crate) fn new<M: Into<String>>(message: M, offset: usize) -> Self {
        Self { message: message.into(), offset }
    }

    /// Description of the error, without the offset.
    pub fn message(&self) -> &str {
        self.message.as_str()
    }

    /// Offset within the pattern where the error was detected.
    pub fn offset(&self) -> usize {
        self.offset
    }
}
