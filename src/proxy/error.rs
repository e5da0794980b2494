//! Proxy error types.

use thiserror::Error;

use crate::bolt::BoltError;
use crate::framing::FrameError;
use crate::packstream::PackstreamError;

#[derive(Error, Debug)]
pub enum ProxyError {
    #[error("failed to connect to upstream {addr}: {source}")]
    UpstreamConnect {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error(transparent)]
    Bolt(#[from] BoltError),

    #[error(transparent)]
    Frame(#[from] FrameError),

    #[error(transparent)]
    Packstream(#[from] PackstreamError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type ProxyResult<T> = Result<T, ProxyError>;
