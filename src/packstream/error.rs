//! PackStream codec error types.

use thiserror::Error;

/// Errors produced while packing or unpacking a [`Value`](super::Value).
#[derive(Error, Debug)]
pub enum PackstreamError {
    #[error("integer {0} is out of the packable range [-2^63, 2^63)")]
    IntOutOfRange(i128),

    #[error("container has {size} elements, which exceeds the maximum of {max}")]
    ContainerTooLarge { size: usize, max: u64 },

    #[error("structure has {size} fields, which exceeds the maximum of {max}")]
    StructureTooLarge { size: usize, max: u64 },

    #[error("structure tag 0x{0:02X} has its high bit set")]
    StructureTagOutOfRange(u8),

    #[error("reserved or unknown marker byte 0x{0:02X}")]
    BadMarker(u8),

    #[error("string payload is not valid UTF-8: {0}")]
    BadUtf8(#[from] std::str::Utf8Error),

    #[error("buffer ended while decoding a value, needed {needed} more byte(s)")]
    Truncated { needed: usize },

    #[error("dictionary key is not a string (marker 0x{0:02X})")]
    NonStringKey(u8),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type PackstreamResult<T> = Result<T, PackstreamError>;
