//! Connection state machine error types.

use thiserror::Error;

use super::version::BoltVersion;

#[derive(Error, Debug)]
pub enum BoltError {
    #[error("handshake magic {found:02X?} does not match expected 60 60 B0 17")]
    HandshakeMagicMismatch { found: [u8; 4] },

    #[error("no proposed version is supported (proposed: {proposed:?})")]
    NoCommonVersion { proposed: Vec<BoltVersion> },

    #[error("tag 0x{0:02X} is not a known message in this version's table")]
    UnknownMessage(u8),

    #[error("message received while connection is in state {state}, which does not accept it")]
    InvalidState { state: &'static str },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type BoltResult<T> = Result<T, BoltError>;

impl BoltError {
    pub fn invalid_state(state: &'static str) -> Self {
        BoltError::InvalidState { state }
    }
}
