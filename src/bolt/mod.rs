//! Bolt connection state machine: handshake, version tables, and the
//! READY/STREAMING/FAILED lifecycle.

mod error;
mod handshake;
mod state;
mod version;

pub use error::{BoltError, BoltResult};
pub use handshake::{negotiate, perform as perform_handshake, read_preamble, write_reply, ProposedVersions, MAGIC};
pub use state::{ConnectionState, ServerOutcome};
pub use version::{
    client_name, client_tag, is_known_elsewhere, server_name, server_tag, table_for, BoltVersion,
    VersionTable, SUPPORTED_VERSIONS, V1_0, V2_0, V3_0, V4_0,
};
