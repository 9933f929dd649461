//! Error types for the synchronization core.
//!
//! - [`SyncError`] - Outcome taxonomy of every remote operation
//! - [`InputError`] - Client-side validation, raised before any request
//! - [`PathError`] - Malformed workspace path segments
//! - [`FrameError`] - Undecodable push-channel frames

use thiserror::Error;

/// Failure outcome of a remote operation or a rejected workspace action.
///
/// Transport problems (network errors, unexpected status codes, unreadable
/// bodies) are collapsed into [`SyncError::Transport`]; the
/// string is kept for logging only.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SyncError {
    /// The target name is already used (HTTP 409).
    #[error("name already in use")]
    NameConflict,
    /// The addressed resource or working directory is missing (HTTP 404).
    #[error("resource not found")]
    NotFound,
    /// The process is in the wrong state for this action (HTTP 405).
    #[error("precondition failed")]
    PreconditionFailed,
    /// Rejected locally before a request was sent.
    #[error("invalid input: {0}")]
    InvalidInput(#[from] InputError),
    /// Network failure or any status outside the operation's contract.
    #[error("request failed: {0}")]
    Transport(String),
}

impl SyncError {
    pub fn transport(detail: impl Into<String>) -> Self {
        Self::Transport(detail.into())
    }
}

/// Client-side validation failures.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InputError {
    #[error("the name is empty")]
    EmptyName,
    #[error("the name may not contain '/'")]
    NameContainsSeparator,
    #[error("no directory is selected")]
    NoDirectory,
    #[error("nothing is selected")]
    EmptySelection,
    #[error("no move or copy is pending")]
    NothingToPaste,
    #[error("the command is empty")]
    EmptyCommand,
    #[error("the working directory is empty")]
    EmptyWorkingDirectory,
}

/// Malformed workspace path.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("empty path segment")]
    EmptySegment,
    #[error("path segment contains '/': {0}")]
    Separator(String),
}

impl From<PathError> for InputError {
    fn from(err: PathError) -> Self {
        match err {
            PathError::EmptySegment => Self::EmptyName,
            PathError::Separator(_) => Self::NameContainsSeparator,
        }
    }
}

/// Push-channel frame decoding errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameError {
    #[error("frame has no command line")]
    MissingCommand,
    #[error("unknown frame command: {0}")]
    UnknownCommand(String),
    #[error("malformed header line: {0}")]
    MalformedHeader(String),
    #[error("frame is missing the NUL terminator")]
    Unterminated,
}
