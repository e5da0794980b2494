//! PackStream: the self-describing binary value format carried by Bolt messages.

mod decode;
mod encode;
mod error;
mod value;

pub use decode::{unpack, unpack_all, Decoder};
pub use encode::{encode, pack};
pub use error::{PackstreamError, PackstreamResult};
pub use value::Value;
