//! The transparent Bolt proxy: relays and decodes a framed message
//! exchange between a client and a real server.

mod error;
mod pair;
mod service;

pub use error::{ProxyError, ProxyResult};
pub use pair::run_pair;
pub use service::{ProxyConfig, ProxyServer};
