//! Chunked-framing error types.

use thiserror::Error;

#[derive(Error, Debug)]
pub enum FrameError {
    #[error("chunk payload is {0} bytes, which exceeds the maximum of 65535")]
    OversizeChunk(usize),

    #[error("connection ended while a message was only partially framed")]
    TruncatedFrame,

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FrameResult<T> = Result<T, FrameError>;
