//! boltkit-rs - a Bolt protocol toolkit.
//!
//! Three tightly coupled pieces: a bit-exact PackStream codec, a scriptable
//! stub server that impersonates a Bolt database by replaying an ordered
//! script, and a transparent proxy that relays and decodes a live Bolt
//! exchange between a client and a real server.

pub mod bolt;
pub mod config;
pub mod framing;
pub mod packstream;
pub mod proxy;
pub mod script;
pub mod stub;
