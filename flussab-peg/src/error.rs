use std::{fmt, io};

use thiserror::Error;

use crate::Position;

/// A fatal parse error containing a message and a source location.
///
/// This is produced by a failing [`Must`][crate::rules::Must] (or any other raising rule) and
/// by controls that escalate a failure. It is never retried by enclosing choices.
#[derive(Debug)]
pub struct SyntaxError {
    /// The label of the parsed input.
    pub source: String,
    /// The position where the error was raised.
    pub position: Position,
    /// The error message.
    pub msg: String,
}

impl fmt::Display for SyntaxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}: {}", self.source, self.position, self.msg)
    }
}

impl std::error::Error for SyntaxError {}

/// The look-ahead or backtracking distance exceeded the retention capacity of a
/// [`BufferInput`][crate::BufferInput].
#[derive(Debug)]
pub struct BufferExhausted {
    /// The label of the parsed input.
    pub source: String,
    /// The position at which more data was requested.
    pub position: Position,
    /// Number of bytes that would have to be retained to satisfy the request.
    pub required: usize,
    /// Maximal number of bytes the input can retain.
    pub capacity: usize,
}

impl fmt::Display for BufferExhausted {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}: input buffer exhausted, retaining {} bytes exceeds the capacity of {} bytes",
            self.source, self.position, self.required, self.capacity
        )
    }
}

impl std::error::Error for BufferExhausted {}

/// Any condition that aborts a match.
///
/// This is used via [`Error`], which wraps this in a [`Box`].
#[derive(Error, Debug)]
pub enum InnerError {
    /// A fatal syntax error.
    #[error(transparent)]
    Syntax(SyntaxError),
    /// The retention capacity of a buffered input was exceeded.
    #[error(transparent)]
    BufferExhausted(BufferExhausted),
    /// An IO error.
    #[error("IO error during parsing: {}", .0)]
    Io(#[source] io::Error),
}

/// Boxed version of [`InnerError`].
pub type Error = Box<InnerError>;

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Box::new(InnerError::Io(err))
    }
}

impl From<SyntaxError> for Error {
    fn from(err: SyntaxError) -> Self {
        Box::new(InnerError::Syntax(err))
    }
}

impl From<BufferExhausted> for Error {
    fn from(err: BufferExhausted) -> Self {
        Box::new(InnerError::BufferExhausted(err))
    }
}
