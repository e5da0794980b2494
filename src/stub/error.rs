//! Stub server error types.

use thiserror::Error;

use crate::bolt::BoltError;
use crate::framing::FrameError;
use crate::packstream::PackstreamError;
use crate::script::ScriptError;

#[derive(Error, Debug)]
pub enum StubError {
    #[error(transparent)]
    Script(#[from] ScriptError),

    #[error(transparent)]
    Bolt(#[from] BoltError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Packstream(#[from] PackstreamError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type StubResult<T> = Result<T, StubError>;

impl StubError {
    /// Process exit code this error should produce: 1 for a script
    /// mismatch, 2 for anything else unexpected.
    pub fn exit_code(&self) -> i32 {
        match self {
            StubError::Script(ScriptError::Mismatch { .. }) => 1,
            _ => 2,
        }
    }
}
